use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Executor, PgPool, Row,
};

use super::{join_lines, Loader};
use crate::{driver::Driver, request::LoadContext, types::Column};

const VIEW_SCHEMA_SQL: &str = r#"
SELECT n.nspname
FROM pg_catalog.pg_class c
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
WHERE c.relname = $1
  AND n.oid = pg_catalog.pg_my_temp_schema()
"#;

const TABLE_COLUMNS_SQL: &str = r#"
SELECT a.attname,
       pg_catalog.format_type(a.atttypid, a.atttypmod),
       a.attnotnull
FROM pg_catalog.pg_attribute a
JOIN ONLY pg_catalog.pg_class c ON c.oid = a.attrelid
JOIN ONLY pg_catalog.pg_namespace n ON n.oid = c.relnamespace
WHERE a.attisdropped = false
  AND a.attnum > 0
  AND n.nspname = $1
  AND c.relname = $2
ORDER BY a.attnum
"#;

/// PostgreSQL loader. Temporary views land in the session's `pg_temp_N`
/// schema, which is reported back for the column lookup.
#[derive(Clone, Debug)]
pub struct PostgresLoader {
    pool: PgPool,
}

impl PostgresLoader {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = PgConnectOptions::from_str(database_url)?;
        // temporary views are per session
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Loader for PostgresLoader {
    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    async fn current_schema(&self, ctx: &LoadContext) -> Result<String> {
        let sql = "SELECT current_schema()";
        ctx.logger.log(sql, &[]);
        let row = sqlx::query(sql).fetch_one(&self.pool).await?;
        Ok(row.try_get::<Option<String>, _>(0)?.unwrap_or_default())
    }

    async fn view_create(&self, ctx: &LoadContext, id: &str, query: &[String]) -> Result<()> {
        let sql = format!("CREATE TEMPORARY VIEW {id} AS {}", join_lines(query));
        ctx.logger.log(&sql, &[]);
        self.pool.execute(sql.as_str()).await?;
        Ok(())
    }

    async fn view_schema(&self, ctx: &LoadContext, id: &str) -> Result<String> {
        ctx.logger.log(VIEW_SCHEMA_SQL, &[id]);
        let row = sqlx::query(VIEW_SCHEMA_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(row.try_get(0)?),
            None => Ok(String::new()),
        }
    }

    async fn table_columns(&self, ctx: &LoadContext, id: &str) -> Result<Vec<Column>> {
        ctx.logger.log(TABLE_COLUMNS_SQL, &[ctx.schema.as_str(), id]);
        let rows = sqlx::query(TABLE_COLUMNS_SQL)
            .bind(ctx.schema.as_str())
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| -> Result<Column> {
                Ok(Column {
                    column_name: row.try_get(0)?,
                    data_type: row.try_get(1)?,
                    not_null: row.try_get(2)?,
                })
            })
            .collect()
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
