//! Immutable inputs of a query load.

use std::fmt;

use crate::{
    logger::{self, SharedLogger},
    params::DEFAULT_DELIMITER,
};

/// Per-query options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    /// Annotated SQL text.
    pub query: String,
    /// Generated result type name and comment.
    pub type_name: String,
    pub type_comment: String,
    /// Generated function name and comment.
    pub func: String,
    pub func_comment: String,
    /// Trim surrounding whitespace of every line.
    pub trim: bool,
    /// Strip `::<type> AS <name>` casts where the driver supports it.
    pub strip: bool,
    pub one: bool,
    pub flat: bool,
    /// Statement without result rows; disables result introspection.
    pub exec: bool,
    /// Allow the `interpolate` placeholder option.
    pub interpolate: bool,
    pub delimiter: String,
    /// Manual result fields (`name[ type],...`); empty means introspect.
    pub fields: String,
    /// Propagate column nullability into result types.
    pub allow_nulls: bool,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            type_name: String::new(),
            type_comment: String::new(),
            func: String::new(),
            func_comment: String::new(),
            trim: false,
            strip: false,
            one: false,
            flat: false,
            exec: false,
            interpolate: false,
            delimiter: DEFAULT_DELIMITER.to_string(),
            fields: String::new(),
            allow_nulls: false,
        }
    }
}

impl QueryParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Connection level context shared by every component of a load. The
/// driver is not part of it; it always comes from the loader.
#[derive(Clone)]
pub struct LoadContext {
    /// Active schema; the resolver may override it for a single lookup.
    pub schema: String,
    pub logger: SharedLogger,
}

impl LoadContext {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            logger: logger::noop(),
        }
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadContext")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
