mod common;

use std::sync::Arc;

use anyhow::Result;
use common::{FakeAdmin, FakeQuery, target};
use schemalift_accessor::change_stream::create_change_stream_statement;
use schemalift_accessor::{AccessorError, ChangeStreams};
use schemalift_core::Dialect;
use serde_json::Value;

fn streams(admin: &FakeAdmin, query: &Arc<FakeQuery>) -> ChangeStreams {
    ChangeStreams::new(admin.client(), query.clone())
}

#[tokio::test]
async fn finds_stream_by_name() -> Result<()> {
    let admin = FakeAdmin::new();
    let query = Arc::new(
        FakeQuery::new().respond("change_streams", vec![vec!["audit"], vec!["orders_cs"]]),
    );
    let streams = streams(&admin, &query);

    assert!(streams.exists("orders_cs", &target()).await?);
    assert!(!streams.exists("missing", &target()).await?);
    Ok(())
}

#[tokio::test]
async fn rejects_wrong_value_capture_type() {
    let admin = FakeAdmin::new();
    let query = Arc::new(FakeQuery::new().respond(
        "change_stream_options",
        vec![vec!["OLD_AND_NEW_VALUES"]],
    ));

    let err = streams(&admin, &query)
        .validate_options("orders_cs", &target())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AccessorError::ChangeStreamOption { ref name, ref found }
            if name == "orders_cs" && found == "OLD_AND_NEW_VALUES"
    ));
    let seen = query.statements();
    assert_eq!(seen[0].params.get("p1"), Some(&Value::from("orders_cs")));
}

#[tokio::test]
async fn query_failures_carry_context() {
    let admin = FakeAdmin::new();
    let query = Arc::new(FakeQuery::new().fail("change_streams", "session expired"));

    let err = streams(&admin, &query)
        .exists("orders_cs", &target())
        .await
        .unwrap_err();

    assert!(matches!(err, AccessorError::Query { .. }));
    assert!(err.to_string().contains("session expired"));
}

#[tokio::test]
async fn ensure_creates_missing_stream() -> Result<()> {
    let admin = FakeAdmin::new().with_database(&target(), Dialect::GoogleStandardSql);
    let query = Arc::new(FakeQuery::new());

    streams(&admin, &query).ensure("orders_cs", &target()).await?;

    let state = admin.state();
    assert_eq!(state.ddl_requests.len(), 1);
    assert_eq!(
        state.ddl_requests[0].statements,
        vec![create_change_stream_statement("orders_cs")]
    );
    Ok(())
}

#[tokio::test]
async fn ensure_validates_existing_stream() -> Result<()> {
    let admin = FakeAdmin::new().with_database(&target(), Dialect::GoogleStandardSql);
    let query = Arc::new(
        FakeQuery::new()
            .respond("change_stream_options", vec![vec!["NEW_ROW"]])
            .respond("change_streams", vec![vec!["orders_cs"]]),
    );

    streams(&admin, &query).ensure("orders_cs", &target()).await?;

    assert!(admin.state().ddl_requests.is_empty());
    assert_eq!(query.statements().len(), 2);
    Ok(())
}
