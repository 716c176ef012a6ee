//! Query loading: binds parameters, resolves fields and records the query.

use tracing::{info, instrument};

use crate::{
    error::Result,
    fields::load_query_fields,
    loader::Loader,
    request::{LoadContext, QueryParams},
    types::{Query, Set},
    variant::parse_query,
};

/// Loads `params.query` and appends the resulting [`Query`] to `set`.
///
/// Nothing is appended when any step fails.
#[instrument(skip_all, fields(driver = %loader.driver(), func = %params.func))]
pub async fn load_query(
    set: &mut Set,
    loader: &dyn Loader,
    ctx: &LoadContext,
    params: &QueryParams,
) -> Result<()> {
    let variants = parse_query(loader, params)?;

    let fields = if params.exec {
        Vec::new()
    } else {
        load_query_fields(loader, ctx, &variants.inspect, params).await?
    };

    info!(
        params = variants.params.len(),
        fields = fields.len(),
        "query loaded"
    );

    set.queries.push(Query {
        driver: loader.driver(),
        name: params.func.clone(),
        comment: params.func_comment.clone(),
        exec: params.exec,
        flat: params.flat,
        one: params.one,
        interpolate: params.interpolate,
        type_name: params.type_name.clone(),
        type_comment: params.type_comment.clone(),
        fields,
        manual_fields: !params.fields.is_empty(),
        params: variants.params,
        query: variants.query,
        comments: variants.comments,
    });
    Ok(())
}
