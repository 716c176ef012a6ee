use std::{str::FromStr, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Executor, Row, SqlitePool,
};

use super::{join_lines, Loader};
use crate::{driver::Driver, request::LoadContext, types::Column};

/// Busy timeout in milliseconds when the database is locked by another writer.
const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema holding session temporary objects.
const TEMP_SCHEMA: &str = "temp";

/// SQLite loader. Temporary views live in the connection's `temp` schema.
#[derive(Clone, Debug)]
pub struct SqliteLoader {
    pool: SqlitePool,
}

impl SqliteLoader {
    /// Connects to an existing database at the given URL (e.g. `sqlite://app.db`).
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .busy_timeout(Duration::from_millis(SQLITE_BUSY_TIMEOUT_MS));
        Self::connect_with(options).await
    }

    async fn connect_with(options: SqliteConnectOptions) -> Result<Self> {
        // temporary views are per connection
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Wraps an existing single-connection pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Loader for SqliteLoader {
    fn driver(&self) -> Driver {
        Driver::Sqlite3
    }

    async fn current_schema(&self, _ctx: &LoadContext) -> Result<String> {
        Ok("main".to_string())
    }

    async fn view_create(&self, ctx: &LoadContext, id: &str, query: &[String]) -> Result<()> {
        let sql = format!("CREATE TEMPORARY VIEW {id} AS {}", join_lines(query));
        ctx.logger.log(&sql, &[]);
        self.pool.execute(sql.as_str()).await?;
        Ok(())
    }

    async fn view_schema(&self, ctx: &LoadContext, id: &str) -> Result<String> {
        let sql = "SELECT name FROM sqlite_temp_master WHERE type = 'view' AND name = ?";
        ctx.logger.log(sql, &[id]);
        let found = sqlx::query(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.map(|_| TEMP_SCHEMA.to_string()).unwrap_or_default())
    }

    async fn table_columns(&self, ctx: &LoadContext, id: &str) -> Result<Vec<Column>> {
        let sql = if ctx.schema.is_empty() {
            format!("PRAGMA table_info({id})")
        } else {
            format!("PRAGMA {}.table_info({id})", ctx.schema)
        };
        ctx.logger.log(&sql, &[]);

        let mut rows = sqlx::query(&sql).fetch(&self.pool);
        let mut out = Vec::new();
        while let Some(row) = rows.try_next().await? {
            let data_type: String = row.try_get("type")?;
            out.push(Column {
                column_name: row.try_get("name")?,
                // columns without a declared type have BLOB affinity
                data_type: if data_type.trim().is_empty() {
                    "blob".to_string()
                } else {
                    data_type
                },
                not_null: row.try_get::<i64, _>("notnull")? != 0,
            });
        }
        Ok(out)
    }

    async fn view_truncate(&self, _ctx: &LoadContext, _id: &str) -> Result<()> {
        Ok(())
    }

    async fn view_drop(&self, ctx: &LoadContext, id: &str) -> Result<()> {
        let sql = format!("DROP VIEW {id}");
        ctx.logger.log(&sql, &[]);
        self.pool.execute(sql.as_str()).await?;
        Ok(())
    }
}
