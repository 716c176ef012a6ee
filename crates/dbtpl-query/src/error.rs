//! Error taxonomy of the query loader.

use std::fmt;

use thiserror::Error;

/// Loader or type mapper step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Strip,
    Create,
    Schema,
    Columns,
    Truncate,
    Drop,
    TypeMapping,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Strip => "strip casts",
            Stage::Create => "create temporary view",
            Stage::Schema => "temporary view schema",
            Stage::Columns => "temporary view columns",
            Stage::Truncate => "truncate temporary view",
            Stage::Drop => "drop temporary view",
            Stage::TypeMapping => "type mapping",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned while loading a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Malformed placeholder, unknown option or disabled interpolation.
    #[error("{0}")]
    Syntax(String),

    /// A loader capability or the type mapper failed.
    #[error("{stage}: {source}")]
    Introspection {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0}")]
    Configuration(String),
}

impl QueryError {
    pub(crate) fn introspection(stage: Stage) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| QueryError::Introspection { stage, source }
    }

    /// Stage of a failed introspection, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            QueryError::Introspection { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T, E = QueryError> = std::result::Result<T, E>;
