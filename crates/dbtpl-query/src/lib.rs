//! Query loading front end of the dbtpl code generator.
//!
//! Turns an annotated SQL query into a [`Query`] record: an executable,
//! driver specific query, a `NULL`-substituted introspection variant, the
//! typed parameters declared by `%%name type[,option...]%%` placeholders and
//! the result columns, either given manually or discovered by creating a
//! temporary view on the live database.
//!
//! ```text
//! query text ─▶ params ─▶ variant ─▶ fields ─▶ assemble ─▶ Set
//!                                      │
//!                                      └─▶ Loader (create, schema, columns, truncate, drop)
//! ```

pub mod assemble;
pub mod driver;
pub mod error;
pub mod fields;
pub mod ident;
pub mod loader;
pub mod logger;
pub mod params;
pub mod request;
pub mod typemap;
pub mod types;
pub mod variant;

pub use assemble::load_query;
pub use driver::Driver;
pub use error::{QueryError, Stage};
pub use fields::{introspect, load_query_fields, split_fields};
pub use loader::{connect, Loader, MysqlLoader, PostgresLoader, SqliteLoader};
pub use logger::{NoopLogger, SharedLogger, SqlLogger, TracingLogger};
pub use params::{parse_query_fields, BoundQuery, DEFAULT_DELIMITER};
pub use request::{LoadContext, QueryParams};
pub use typemap::{NativeTypeMapper, TypeMapper};
pub use types::{Column, Field, Query, Set, Type};
pub use variant::{parse_query, QueryVariants};
