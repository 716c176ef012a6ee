//! Intermediate representation handed to the template stage.

use serde::{Deserialize, Serialize};

use crate::driver::Driver;

/// Generic type used when a manual field omits its type.
pub const DEFAULT_FIELD_TYPE: &str = "string";

/// Canonical (driver independent) type of a value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Type {
    #[serde(rename = "type")]
    pub type_name: String,
    pub prec: usize,
    pub scale: usize,
    pub nullable: bool,
    pub is_array: bool,
    pub unsigned: bool,
}

impl Type {
    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }
}

/// A query parameter or a result column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    /// Spliced into the SQL text instead of being bound.
    pub interpolate: bool,
    /// Spliced as a newline joined list. Only meaningful with `interpolate`.
    pub join: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: Type::named(type_name),
            ..Self::default()
        }
    }
}

/// Column metadata reported by a loader for a temporary object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub column_name: String,
    pub data_type: String,
    pub not_null: bool,
}

/// One loaded query, ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    pub driver: Driver,
    pub name: String,
    pub comment: String,
    pub exec: bool,
    pub flat: bool,
    pub one: bool,
    pub interpolate: bool,
    #[serde(rename = "type")]
    pub type_name: String,
    pub type_comment: String,
    /// Result row shape; empty in exec mode.
    pub fields: Vec<Field>,
    pub manual_fields: bool,
    /// Parameters in order of first appearance, unique by name.
    pub params: Vec<Field>,
    /// Executable query, one entry per source line.
    pub query: Vec<String>,
    /// Per line comments, parallel to `query`.
    pub comments: Vec<String>,
}

/// Output of a generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Set {
    pub queries: Vec<Query>,
}
