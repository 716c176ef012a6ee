//! Result row shape: manual field lists or live introspection.

use tracing::{debug, instrument, warn};

use crate::{
    error::{QueryError, Result, Stage},
    ident::temporary_object_id,
    loader::Loader,
    request::{LoadContext, QueryParams},
    types::{Field, DEFAULT_FIELD_TYPE},
};

/// Resolves the result fields of a query.
///
/// A manual field list always wins. Otherwise flat queries get no fields and
/// everything else is introspected through the loader.
pub async fn load_query_fields(
    loader: &dyn Loader,
    ctx: &LoadContext,
    inspect: &[String],
    params: &QueryParams,
) -> Result<Vec<Field>> {
    if !params.fields.is_empty() {
        return Ok(split_fields(&params.fields));
    }
    if params.flat {
        return Ok(Vec::new());
    }
    introspect(loader, ctx, inspect, params.allow_nulls).await
}

/// Parses `name[ type],...`; a missing type defaults to `string`.
///
/// Entries are not validated: an empty entry yields a field with an empty
/// name, and the type is kept verbatim after the first space.
pub fn split_fields(s: &str) -> Vec<Field> {
    s.split(',')
        .map(str::trim)
        .map(|field| match field.split_once(' ') {
            Some((name, typ)) => Field::new(name, typ),
            None => Field::new(field, DEFAULT_FIELD_TYPE),
        })
        .collect()
}

/// Creates a temporary view of `inspect`, reads its columns and drops it.
///
/// Stages run strictly in order and stop at the first failure. A view created
/// before a later stage fails is left behind; its name is logged.
#[instrument(skip_all, fields(driver = %loader.driver()))]
pub async fn introspect(
    loader: &dyn Loader,
    ctx: &LoadContext,
    inspect: &[String],
    allow_nulls: bool,
) -> Result<Vec<Field>> {
    let driver = loader.driver();
    let id = temporary_object_id(driver.object_prefix());
    debug!(%id, "creating introspection view");

    loader
        .view_create(ctx, &id, inspect)
        .await
        .map_err(QueryError::introspection(Stage::Create))?;

    let columns = async {
        let schema = loader
            .view_schema(ctx, &id)
            .await
            .map_err(QueryError::introspection(Stage::Schema))?;

        // the reported schema applies to the column lookup only
        let view_ctx = (!schema.is_empty()).then(|| LoadContext {
            schema,
            ..ctx.clone()
        });
        let columns = loader
            .table_columns(view_ctx.as_ref().unwrap_or(ctx), &id)
            .await
            .map_err(QueryError::introspection(Stage::Columns))?;

        loader
            .view_truncate(ctx, &id)
            .await
            .map_err(QueryError::introspection(Stage::Truncate))?;
        loader
            .view_drop(ctx, &id)
            .await
            .map_err(QueryError::introspection(Stage::Drop))?;

        Ok::<_, QueryError>(columns)
    }
    .await
    .map_err(|err| {
        warn!(%id, error = %err, "introspection aborted; temporary view not removed");
        err
    })?;

    let mapper = driver.type_mapper();
    columns
        .into_iter()
        .map(|col| -> Result<Field> {
            let mut ty = mapper
                .canonical_type(&col.data_type, driver)
                .map_err(QueryError::introspection(Stage::TypeMapping))?;
            // without allow_nulls every result column is treated as non-null
            if allow_nulls {
                ty.nullable = !col.not_null;
            }
            Ok(Field {
                name: col.column_name,
                ty,
                ..Field::default()
            })
        })
        .collect()
}
