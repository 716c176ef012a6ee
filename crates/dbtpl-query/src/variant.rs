//! Executable and introspection variants of a query.

use anyhow::anyhow;
use tracing::debug;

use crate::{
    error::{QueryError, Result, Stage},
    loader::Loader,
    params::parse_query_fields,
    request::QueryParams,
    types::Field,
};

/// Line-split query variants with their parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryVariants {
    /// Executable query with driver placeholders.
    pub query: Vec<String>,
    /// Query with every parameter replaced by `NULL`.
    pub inspect: Vec<String>,
    /// Per-line comments, parallel to `query`.
    pub comments: Vec<String>,
    pub params: Vec<Field>,
}

/// Builds both variants of `params.query`, using the loader's positional
/// formatter and (when `strip` is set) its cast stripping transform.
pub fn parse_query(loader: &dyn Loader, params: &QueryParams) -> Result<QueryVariants> {
    let bound = parse_query_fields(
        &params.query,
        &params.delimiter,
        params.interpolate,
        true,
        loader.nth_param(),
    )?;
    let inspect = parse_query_fields(
        &params.query,
        &params.delimiter,
        params.interpolate,
        false,
        |_| "NULL".to_string(),
    )?;
    debug!(query = %bound.sql, inspect = %inspect.sql, "query variants built");

    let mut query = split_lines(&bound.sql, params.trim);
    let mut inspect = split_lines(&inspect.sql, params.trim);
    let mut comments = vec![String::new(); query.len()];

    if params.strip {
        (query, inspect, comments) = loader
            .view_strip(query, inspect)
            .map_err(QueryError::introspection(Stage::Strip))?;
        if query.len() != comments.len() || inspect.len() != query.len() {
            return Err(QueryError::Introspection {
                stage: Stage::Strip,
                source: anyhow!(
                    "strip returned {} query, {} inspect and {} comment lines",
                    query.len(),
                    inspect.len(),
                    comments.len()
                ),
            });
        }
    }

    Ok(QueryVariants {
        query,
        inspect,
        comments,
        params: bound.params,
    })
}

/// Splits on line breaks. With `trim`, every line is trimmed and all but the
/// last get a single trailing space so tokens stay separated once rejoined.
pub fn split_lines(sql: &str, trim: bool) -> Vec<String> {
    let lines: Vec<&str> = sql.split('\n').collect();
    if !trim {
        return lines.into_iter().map(str::to_string).collect();
    }
    let last = lines.len() - 1;
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let line = line.trim();
            if i < last {
                format!("{line} ")
            } else {
                line.to_string()
            }
        })
        .collect()
}
