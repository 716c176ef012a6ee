use std::{env, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use dbtpl_query::{QueryParams, DEFAULT_DELIMITER};

/// Runner configuration read from `DBTPL_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Active schema; empty asks the database for its current schema.
    pub schema: String,
    /// Output file for the generated set; stdout when unset.
    pub out: Option<PathBuf>,
    pub verbose: bool,
    pub query: QueryParams,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str| lookup(key).unwrap_or_default();
        let flag = |key: &str| -> Result<bool> {
            match lookup(key) {
                None => Ok(false),
                Some(value) => parse_bool(&value).with_context(|| format!("invalid {key}")),
            }
        };

        let database_url = lookup("DBTPL_DATABASE_URL")
            .filter(|url| !url.is_empty())
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|url| !url.is_empty())
            .context("DBTPL_DATABASE_URL or DATABASE_URL must be configured")?;

        let delimiter = lookup("DBTPL_DELIMITER")
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DELIMITER.to_string());

        let query = QueryParams {
            query: string("DBTPL_QUERY"),
            type_name: string("DBTPL_TYPE"),
            type_comment: string("DBTPL_TYPE_COMMENT"),
            func: string("DBTPL_FUNC"),
            func_comment: string("DBTPL_FUNC_COMMENT"),
            trim: flag("DBTPL_TRIM")?,
            strip: flag("DBTPL_STRIP")?,
            one: flag("DBTPL_ONE")?,
            flat: flag("DBTPL_FLAT")?,
            exec: flag("DBTPL_EXEC")?,
            interpolate: flag("DBTPL_INTERPOLATE")?,
            delimiter,
            fields: string("DBTPL_FIELDS"),
            allow_nulls: flag("DBTPL_ALLOW_NULLS")?,
        };

        Ok(Self {
            database_url,
            schema: string("DBTPL_SCHEMA"),
            out: lookup("DBTPL_OUT")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            verbose: flag("DBTPL_VERBOSE")?,
            query,
        })
    }
}

pub fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => Err(anyhow!("'{other}' is not a boolean")),
    }
}
