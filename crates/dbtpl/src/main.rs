use anyhow::Result;

use dbtpl::{telemetry, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    telemetry::init(config.verbose)?;
    dbtpl::run(config).await
}
