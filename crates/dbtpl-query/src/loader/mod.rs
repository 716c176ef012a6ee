//! Database capabilities used by the query loader.
//!
//! A [`Loader`] materialises the introspection query as a temporary object and
//! reports its columns. All calls are issued one at a time by the resolver;
//! implementations keep a single session so temporary objects stay visible
//! between calls.

mod mysql;
mod postgres;
mod sqlite;

#[cfg(test)]
pub(crate) mod recording;

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    driver::{passthrough_strip, Driver, NthParam, StripOutput},
    error::QueryError,
    request::LoadContext,
    types::Column,
};

pub use mysql::MysqlLoader;
pub use postgres::PostgresLoader;
pub use sqlite::SqliteLoader;

#[async_trait]
pub trait Loader: Send + Sync {
    fn driver(&self) -> Driver;

    /// Positional parameter syntax of the driver.
    fn nth_param(&self) -> NthParam {
        self.driver().nth_param()
    }

    /// Cast stripping transform; drivers without one return the lines
    /// unchanged with empty comments.
    fn view_strip(&self, query: Vec<String>, inspect: Vec<String>) -> Result<StripOutput> {
        match self.driver().profile().strip {
            Some(strip) => strip(query, inspect),
            None => Ok(passthrough_strip(query, inspect)),
        }
    }

    async fn current_schema(&self, ctx: &LoadContext) -> Result<String>;

    async fn view_create(&self, ctx: &LoadContext, id: &str, query: &[String]) -> Result<()>;

    /// Schema the temporary object landed in, empty when it is the active one.
    async fn view_schema(&self, ctx: &LoadContext, id: &str) -> Result<String>;

    async fn table_columns(&self, ctx: &LoadContext, id: &str) -> Result<Vec<Column>>;

    async fn view_truncate(&self, ctx: &LoadContext, id: &str) -> Result<()>;

    async fn view_drop(&self, ctx: &LoadContext, id: &str) -> Result<()>;
}

/// Opens a live loader for `url`, selected by its scheme.
pub async fn connect(url: &str) -> Result<Box<dyn Loader>> {
    let driver = Driver::from_url(url)?;
    match driver {
        Driver::Postgres => Ok(Box::new(
            PostgresLoader::connect(&with_scheme(url, "postgres")).await?,
        )),
        Driver::Mysql => Ok(Box::new(
            MysqlLoader::connect(&with_scheme(url, "mysql")).await?,
        )),
        Driver::Sqlite3 => Ok(Box::new(
            SqliteLoader::connect(&with_scheme(url, "sqlite")).await?,
        )),
        Driver::Sqlserver | Driver::Oracle => Err(QueryError::Configuration(format!(
            "no live loader available for driver '{driver}'"
        ))
        .into()),
    }
}

/// Replaces the url scheme (alias or `+` modifier) with the connector's own.
fn with_scheme(url: &str, scheme: &str) -> String {
    match url.split_once(':') {
        Some((_, rest)) => format!("{scheme}:{rest}"),
        None => url.to_string(),
    }
}

/// Joins query lines into one statement.
pub(crate) fn join_lines(query: &[String]) -> String {
    query.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_aliases_are_normalised() {
        assert_eq!(with_scheme("pg://u@h/db", "postgres"), "postgres://u@h/db");
        assert_eq!(with_scheme("file:test.db", "sqlite"), "sqlite:test.db");
        assert_eq!(with_scheme("sqlite::memory:", "sqlite"), "sqlite::memory:");
    }

    #[tokio::test]
    async fn unsupported_live_driver_is_rejected() {
        let err = connect("oracle://user@localhost/xe").await.err().unwrap();
        assert!(err.to_string().contains("no live loader"));
    }
}
