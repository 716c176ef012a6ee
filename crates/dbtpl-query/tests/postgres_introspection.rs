//! Requires a reachable PostgreSQL server in `DATABASE_URL`; run with
//! `cargo test -- --ignored`.

use anyhow::Result;
use dbtpl_query::{
    connect, load_query, logger, Driver, LoadContext, Loader, QueryParams, Set,
};

async fn setup() -> Result<(Box<dyn Loader>, LoadContext)> {
    let database_url = std::env::var("DATABASE_URL")?;
    let loader = connect(&database_url).await?;
    let ctx = LoadContext::new("").with_logger(logger::for_verbosity(true));
    let schema = loader.current_schema(&ctx).await?;
    Ok((loader, LoadContext { schema, ..ctx }))
}

#[tokio::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn introspects_casts_and_nullability() -> Result<()> {
    if Driver::from_url(&std::env::var("DATABASE_URL")?)? != Driver::Postgres {
        return Ok(());
    }
    let (loader, ctx) = setup().await?;

    let mut params = QueryParams::new(
        "SELECT 1::integer AS id,\n\
         'x'::varchar(20) AS label,\n\
         NULL::numeric(12,4) AS amount\n\
         WHERE 1 = %%one int%%",
    );
    params.strip = true;
    params.allow_nulls = true;

    let mut set = Set::default();
    load_query(&mut set, loader.as_ref(), &ctx, &params).await?;

    let query = &set.queries[0];
    assert_eq!(query.query[0], "SELECT 1,");
    assert_eq!(query.comments[0], "::integer AS id");
    assert_eq!(query.query[3], "WHERE 1 = $1");

    let names: Vec<_> = query.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["id", "label", "amount"]);
    assert_eq!(query.fields[1].ty.type_name, "character varying");
    assert_eq!(query.fields[1].ty.prec, 20);
    assert_eq!(
        (query.fields[2].ty.prec, query.fields[2].ty.scale),
        (12, 4)
    );
    assert!(query.fields.iter().all(|f| f.ty.nullable));
    Ok(())
}
