//! In-memory loader recording every call, for unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use super::Loader;
use crate::{
    driver::{passthrough_strip, Driver, StripFn, StripOutput},
    error::Stage,
    request::LoadContext,
    types::Column,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { id: String, query: Vec<String> },
    Schema { id: String },
    Columns { id: String, schema: String },
    Truncate { id: String },
    Drop { id: String },
}

impl Call {
    pub fn stage(&self) -> Stage {
        match self {
            Call::Create { .. } => Stage::Create,
            Call::Schema { .. } => Stage::Schema,
            Call::Columns { .. } => Stage::Columns,
            Call::Truncate { .. } => Stage::Truncate,
            Call::Drop { .. } => Stage::Drop,
        }
    }
}

pub struct RecordingLoader {
    pub driver: Driver,
    pub columns: Vec<Column>,
    pub view_schema: String,
    pub fail_at: Option<Stage>,
    /// Replaces the driver's strip transform.
    pub strip: Option<StripFn>,
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingLoader {
    pub fn new(driver: Driver, columns: Vec<Column>) -> Self {
        Self {
            driver,
            columns,
            view_schema: String::new(),
            fail_at: None,
            strip: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_at(mut self, stage: Stage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    pub fn with_strip(mut self, strip: StripFn) -> Self {
        self.strip = Some(strip);
        self
    }

    pub fn with_view_schema(mut self, schema: &str) -> Self {
        self.view_schema = schema.to_string();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.calls.lock().iter().map(Call::stage).collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        let stage = call.stage();
        self.calls.lock().push(call);
        if self.fail_at == Some(stage) {
            return Err(anyhow!("injected failure at {stage}"));
        }
        Ok(())
    }
}

pub fn column(name: &str, data_type: &str, not_null: bool) -> Column {
    Column {
        column_name: name.to_string(),
        data_type: data_type.to_string(),
        not_null,
    }
}

#[async_trait]
impl Loader for RecordingLoader {
    fn driver(&self) -> Driver {
        self.driver
    }

    fn view_strip(&self, query: Vec<String>, inspect: Vec<String>) -> Result<StripOutput> {
        match self.strip.or(self.driver.profile().strip) {
            Some(strip) => strip(query, inspect),
            None => Ok(passthrough_strip(query, inspect)),
        }
    }

    async fn current_schema(&self, _ctx: &LoadContext) -> Result<String> {
        Ok("public".to_string())
    }

    async fn view_create(&self, _ctx: &LoadContext, id: &str, query: &[String]) -> Result<()> {
        self.record(Call::Create {
            id: id.to_string(),
            query: query.to_vec(),
        })
    }

    async fn view_schema(&self, _ctx: &LoadContext, id: &str) -> Result<String> {
        self.record(Call::Schema { id: id.to_string() })?;
        Ok(self.view_schema.clone())
    }

    async fn table_columns(&self, ctx: &LoadContext, id: &str) -> Result<Vec<Column>> {
        self.record(Call::Columns {
            id: id.to_string(),
            schema: ctx.schema.clone(),
        })?;
        Ok(self.columns.clone())
    }

    async fn view_truncate(&self, _ctx: &LoadContext, id: &str) -> Result<()> {
        self.record(Call::Truncate { id: id.to_string() })
    }

    async fn view_drop(&self, _ctx: &LoadContext, id: &str) -> Result<()> {
        self.record(Call::Drop { id: id.to_string() })
    }
}
