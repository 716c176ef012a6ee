use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    Executor, MySqlPool, Row,
};

use super::{join_lines, Loader};
use crate::{driver::Driver, request::LoadContext, types::Column};

const TABLE_COLUMNS_SQL: &str = r#"
SELECT column_name, column_type, is_nullable
FROM information_schema.columns
WHERE table_schema = ?
  AND table_name = ?
ORDER BY ordinal_position
"#;

/// MySQL / MariaDB loader. MySQL has no temporary views, so a regular view
/// is created in the active schema and dropped afterwards.
#[derive(Clone, Debug)]
pub struct MysqlLoader {
    pool: MySqlPool,
}

impl MysqlLoader {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = MySqlConnectOptions::from_str(database_url)?;
        let pool = MySqlPoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Loader for MysqlLoader {
    fn driver(&self) -> Driver {
        Driver::Mysql
    }

    async fn current_schema(&self, ctx: &LoadContext) -> Result<String> {
        let sql = "SELECT DATABASE()";
        ctx.logger.log(sql, &[]);
        let row = sqlx::query(sql).fetch_one(&self.pool).await?;
        Ok(row.try_get::<Option<String>, _>(0)?.unwrap_or_default())
    }

    async fn view_create(&self, ctx: &LoadContext, id: &str, query: &[String]) -> Result<()> {
        let sql = format!("CREATE VIEW {id} AS {}", join_lines(query));
        ctx.logger.log(&sql, &[]);
        self.pool.execute(sql.as_str()).await?;
        Ok(())
    }

    async fn view_schema(&self, _ctx: &LoadContext, _id: &str) -> Result<String> {
        Ok(String::new())
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
                let nullable: String = row.try_get(2)?;
                Ok(Column {
                    column_name: row.try_get(0)?,
                    data_type: row.try_get(1)?,
                    not_null: nullable.eq_ignore_ascii_case("NO"),
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
