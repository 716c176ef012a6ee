//! Supported database drivers and their static capabilities.
//!
//! Each [`Driver`] owns one [`DriverProfile`] entry. Adding a driver means
//! adding a variant, a profile and (optionally) a live loader in
//! [`crate::loader::connect`]; the binder, resolver and assembler never match
//! on driver names.

use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::QueryError,
    typemap::{NativeTypeMapper, TypeMapper},
};

/// Positional placeholder formatter, receives the 0-based parameter position.
pub type NthParam = fn(usize) -> String;

/// Cast/comment stripping transform: `(query, inspect) -> (query, inspect, comments)`.
pub type StripFn = fn(Vec<String>, Vec<String>) -> anyhow::Result<StripOutput>;

/// Rewritten executable lines, introspection lines and per-line comments.
pub type StripOutput = (Vec<String>, Vec<String>, Vec<String>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    Postgres,
    Mysql,
    Sqlite3,
    Sqlserver,
    Oracle,
}

/// Capability table entry for a driver.
pub struct DriverProfile {
    pub name: &'static str,
    /// Prefix of temporary introspection objects.
    pub object_prefix: &'static str,
    pub nth: NthParam,
    pub strip: Option<StripFn>,
    pub type_mapper: &'static (dyn TypeMapper + Sync),
}

static NATIVE_TYPES: NativeTypeMapper = NativeTypeMapper;

static POSTGRES: DriverProfile = DriverProfile {
    name: "postgres",
    object_prefix: "_xo_",
    nth: dollar_nth,
    strip: Some(strip_postgres_casts),
    type_mapper: &NATIVE_TYPES,
};

static MYSQL: DriverProfile = DriverProfile {
    name: "mysql",
    object_prefix: "_xo_",
    nth: question_nth,
    strip: None,
    type_mapper: &NATIVE_TYPES,
};

static SQLITE3: DriverProfile = DriverProfile {
    name: "sqlite3",
    object_prefix: "_xo_",
    nth: dollar_nth,
    strip: None,
    type_mapper: &NATIVE_TYPES,
};

static SQLSERVER: DriverProfile = DriverProfile {
    name: "sqlserver",
    object_prefix: "_xo_",
    nth: at_nth,
    strip: None,
    type_mapper: &NATIVE_TYPES,
};

// oracle folds unquoted identifiers to upper case and rejects a leading underscore
static ORACLE: DriverProfile = DriverProfile {
    name: "oracle",
    object_prefix: "XO$",
    nth: colon_nth,
    strip: None,
    type_mapper: &NATIVE_TYPES,
};

impl Driver {
    pub const ALL: [Driver; 5] = [
        Driver::Postgres,
        Driver::Mysql,
        Driver::Sqlite3,
        Driver::Sqlserver,
        Driver::Oracle,
    ];

    pub fn profile(self) -> &'static DriverProfile {
        match self {
            Driver::Postgres => &POSTGRES,
            Driver::Mysql => &MYSQL,
            Driver::Sqlite3 => &SQLITE3,
            Driver::Sqlserver => &SQLSERVER,
            Driver::Oracle => &ORACLE,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.profile().name
    }

    pub fn nth_param(self) -> NthParam {
        self.profile().nth
    }

    pub fn object_prefix(self) -> &'static str {
        self.profile().object_prefix
    }

    pub fn type_mapper(self) -> &'static (dyn TypeMapper + Sync) {
        self.profile().type_mapper
    }

    /// Resolves the driver from the scheme of a database URL.
    pub fn from_url(url: &str) -> Result<Self, QueryError> {
        let scheme = url
            .split_once(':')
            .map(|(scheme, _)| scheme)
            .filter(|scheme| !scheme.is_empty())
            .ok_or_else(|| {
                QueryError::Configuration(format!("database url '{url}' has no scheme"))
            })?;
        scheme.parse()
    }
}

impl FromStr for Driver {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // scheme modifiers such as `postgres+unix` only matter to the connector
        let base = s.split('+').next().unwrap_or(s).to_ascii_lowercase();
        match base.as_str() {
            "postgres" | "postgresql" | "pg" | "pgsql" => Ok(Driver::Postgres),
            "mysql" | "my" | "mariadb" => Ok(Driver::Mysql),
            "sqlite" | "sqlite3" | "file" => Ok(Driver::Sqlite3),
            "sqlserver" | "mssql" | "ms" => Ok(Driver::Sqlserver),
            "oracle" | "or" | "ora" => Ok(Driver::Oracle),
            other => Err(QueryError::Configuration(format!(
                "unsupported database driver '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn dollar_nth(i: usize) -> String {
    format!("${}", i + 1)
}

fn question_nth(_: usize) -> String {
    "?".to_string()
}

fn at_nth(i: usize) -> String {
    format!("@p{}", i + 1)
}

fn colon_nth(i: usize) -> String {
    format!(":{}", i + 1)
}

/// Passes both sequences through untouched with empty comments.
pub fn passthrough_strip(query: Vec<String>, inspect: Vec<String>) -> StripOutput {
    let comments = vec![String::new(); query.len()];
    (query, inspect, comments)
}

/// Removes `::<type> AS <name>` from executable lines, keeping the removed
/// span as the line comment. Introspection lines keep the cast so the view
/// columns carry the intended type and name.
pub fn strip_postgres_casts(
    query: Vec<String>,
    inspect: Vec<String>,
) -> anyhow::Result<StripOutput> {
    static CAST_AS_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = CAST_AS_REGEX.get_or_init(|| {
        Regex::new(r"(?i)::[a-z][a-z0-9_\.]+\s+AS\s+[a-z][a-z0-9_\.]+")
            .expect("valid cast-as regex")
    });

    let mut comments = vec![String::new(); query.len()];
    let query = query
        .into_iter()
        .zip(comments.iter_mut())
        .map(|(line, comment)| match re.find(&line) {
            Some(m) => {
                *comment = m.as_str().to_string();
                format!("{}{}", &line[..m.start()], &line[m.end()..])
            }
            None => line,
        })
        .collect();
    Ok((query, inspect, comments))
}
