//! Runner for the dbtpl query loader: connects, loads one query and writes
//! the generated set as JSON.

pub mod config;
pub mod telemetry;

use std::path::Path;

use anyhow::{Context, Result};
use dbtpl_query::{connect, load_query, logger, LoadContext, Set};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::info;

pub use config::AppConfig;

pub async fn run(mut config: AppConfig) -> Result<()> {
    if config.query.query.is_empty() {
        config.query.query = read_stdin().await?;
    }
    let set = generate(&config).await?;
    write_output(&set, config.out.as_deref()).await
}

/// Loads the configured query into a fresh set.
pub async fn generate(config: &AppConfig) -> Result<Set> {
    let loader = connect(&config.database_url)
        .await
        .context("failed to open database")?;

    let ctx = LoadContext::new(config.schema.clone())
        .with_logger(logger::for_verbosity(config.verbose));
    let ctx = if ctx.schema.is_empty() {
        let schema = loader
            .current_schema(&ctx)
            .await
            .context("failed to determine current schema")?;
        LoadContext { schema, ..ctx }
    } else {
        ctx
    };
    info!(driver = %loader.driver(), schema = %ctx.schema, "database opened");

    let mut set = Set::default();
    load_query(&mut set, loader.as_ref(), &ctx, &config.query).await?;
    Ok(set)
}

/// Writes `set` as pretty JSON to `out`, or stdout when `out` is `None`.
pub async fn write_output(set: &Set, out: Option<&Path>) -> Result<()> {
    let mut json = serde_json::to_string_pretty(set)?;
    json.push('\n');
    match out {
        Some(path) => tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(json.as_bytes()).await?;
            stdout.flush().await?;
            Ok(())
        }
    }
}

async fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("failed to read query from stdin")?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}
