//! Live-database pipeline tests.
//!
//! These tests require a running PostgreSQL database and are skipped
//! unless DATABASE_URL is set.

use std::sync::Arc;

use sqlgate::config::ConnectionConfig;
use sqlgate::db::{self, DatabaseClient, QueryParams, Value};
use sqlgate::query::{QueryExecutor, QueryMode, QueryRequest, QueryRouter};
use sqlgate::safety::SqlValidator;
use sqlgate::translate::PatternTranslator;

async fn get_test_db() -> Option<Arc<dyn DatabaseClient>> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    db::connect(&config).await.ok()
}

fn router_over(db: Arc<dyn DatabaseClient>) -> QueryRouter {
    let executor = QueryExecutor::new(db, SqlValidator::new().unwrap());
    QueryRouter::new(
        executor,
        Arc::new(PatternTranslator::new("users").unwrap()),
    )
}

#[tokio::test]
async fn test_select_one_round_trip() {
    let Some(db) = get_test_db().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let router = router_over(db.clone());

    let env = router.handle(&QueryRequest::sql("SELECT 1 AS one")).await;

    assert!(env.success, "error: {:?}", env.error);
    assert_eq!(env.row_count, 1);
    assert_eq!(env.mode, Some(QueryMode::Sql));
    assert_eq!(env.value(0, "one"), Some(&Value::Int(1)));
    assert!(env.execution_time_ms >= 0.0);

    db.close().await.unwrap();
}

#[tokio::test]
async fn test_named_parameters_bind() {
    let Some(db) = get_test_db().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let router = router_over(db.clone());

    let params = QueryParams::from([("greeting".to_string(), Value::from("hello"))]);
    let env = router
        .execute_sql("SELECT :greeting::text AS greeting", Some(&params))
        .await;

    assert!(env.success, "error: {:?}", env.error);
    assert_eq!(env.value(0, "greeting"), Some(&Value::from("hello")));

    db.close().await.unwrap();
}

#[tokio::test]
async fn test_driver_error_leaves_pool_usable() {
    let Some(db) = get_test_db().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let router = router_over(db.clone());

    let env = router
        .handle(&QueryRequest::sql("SELECT * FROM nonexistent_table_xyz"))
        .await;

    assert!(!env.success);
    assert!(env.error.unwrap().starts_with("database error:"));
    assert_eq!(env.row_count, 0);

    // The connection handle must be back in the pool; a follow-up query
    // on the same client succeeds
    let env = router.handle(&QueryRequest::sql("SELECT 2 AS two")).await;
    assert!(env.success, "error: {:?}", env.error);
    assert_eq!(env.value(0, "two"), Some(&Value::Int(2)));

    db.close().await.unwrap();
}

#[tokio::test]
async fn test_nl_round_trip() {
    let Some(db) = get_test_db().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let router = router_over(db.clone());

    // The pattern strategy's fallback always selects from the default
    // table; against an arbitrary test database the table may not exist,
    // so both envelope shapes are acceptable. What matters is that the
    // call returns a well-formed envelope with the generated SQL recorded.
    let env = router
        .handle(&QueryRequest::nl("show top 3 from pg_tables"))
        .await;

    assert_eq!(env.mode, Some(QueryMode::Nl));
    assert_eq!(
        env.generated_sql.as_deref(),
        Some("SELECT * FROM pg_tables LIMIT 3")
    );
    if env.success {
        assert!(env.row_count <= 3);
    } else {
        assert!(env.error.is_some());
    }

    db.close().await.unwrap();
}
