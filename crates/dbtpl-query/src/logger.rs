//! SQL statement logging handed explicitly to the components issuing SQL.

use std::sync::Arc;

use tracing::info;

/// Receives every statement sent to the database plus its bound values.
pub trait SqlLogger: Send + Sync {
    fn log(&self, sql: &str, params: &[&str]);
}

/// Shared handle passed through requests and loaders.
pub type SharedLogger = Arc<dyn SqlLogger>;

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl SqlLogger for NoopLogger {
    fn log(&self, _sql: &str, _params: &[&str]) {}
}

/// Emits statements as `tracing` events on the `dbtpl::sql` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl SqlLogger for TracingLogger {
    fn log(&self, sql: &str, params: &[&str]) {
        if params.is_empty() {
            info!(target: "dbtpl::sql", %sql, "SQL");
        } else {
            info!(target: "dbtpl::sql", %sql, ?params, "SQL");
        }
    }
}

pub fn noop() -> SharedLogger {
    Arc::new(NoopLogger)
}

/// Logger selected by the verbose switch.
pub fn for_verbosity(verbose: bool) -> SharedLogger {
    if verbose {
        Arc::new(TracingLogger)
    } else {
        noop()
    }
}
