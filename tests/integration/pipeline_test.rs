//! End-to-end pipeline tests over in-memory doubles.
//!
//! Exercises the router -> translator -> validator -> executor chain
//! without a running database or generation service.

use std::sync::Arc;

use sqlgate::db::{
    ColumnInfo, DatabaseClient, FailingDatabaseClient, MockDatabaseClient, QueryResult, Value,
};
use sqlgate::llm::MockGenerator;
use sqlgate::query::{QueryExecutor, QueryMode, QueryRequest, QueryRouter};
use sqlgate::safety::SqlValidator;
use sqlgate::translate::{GenerativeTranslator, PatternTranslator, Translator};

fn router(db: Arc<MockDatabaseClient>, translator: Arc<dyn Translator>) -> QueryRouter {
    let executor = QueryExecutor::new(
        db as Arc<dyn DatabaseClient>,
        SqlValidator::new().unwrap(),
    );
    QueryRouter::new(executor, translator)
}

fn pattern_router(db: Arc<MockDatabaseClient>, default_table: &str) -> QueryRouter {
    router(db, Arc::new(PatternTranslator::new(default_table).unwrap()))
}

fn employee_count_result() -> QueryResult {
    QueryResult::with_data(
        vec![ColumnInfo::new("count", "int8")],
        vec![vec![Value::Int(5)]],
    )
}

#[tokio::test]
async fn test_sql_round_trip() {
    let db = Arc::new(MockDatabaseClient::new());
    let router = pattern_router(db.clone(), "users");

    let env = router.handle(&QueryRequest::sql("SELECT 1")).await;

    assert!(env.success);
    assert_eq!(env.row_count, 1);
    assert_eq!(env.mode, Some(QueryMode::Sql));
    assert!(env.error.is_none());
}

#[tokio::test]
async fn test_injection_attempt_is_denied_before_execution() {
    let db = Arc::new(MockDatabaseClient::new());
    let router = pattern_router(db.clone(), "users");

    let env = router
        .handle(&QueryRequest::sql("SELECT * FROM users; DROP TABLE users;"))
        .await;

    assert!(!env.success);
    let error = env.error.unwrap();
    assert!(error.contains("forbidden keyword") || error.contains("suspicious pattern"));
    assert_eq!(db.call_count(), 0, "the store must never see the statement");
}

#[tokio::test]
async fn test_nl_count_scenario_via_pattern_strategy() {
    // "how many employees are there" names no table inline, so the
    // configured default table supplies it; the store holds 5 employees
    let db = Arc::new(
        MockDatabaseClient::new().with_response("count(*)", employee_count_result()),
    );
    let router = pattern_router(db.clone(), "employees");

    let env = router
        .handle(&QueryRequest::nl("how many employees are there"))
        .await;

    assert!(env.success);
    assert_eq!(env.mode, Some(QueryMode::Nl));
    assert_eq!(
        env.generated_sql.as_deref(),
        Some("SELECT COUNT(*) as count FROM employees")
    );
    assert_eq!(env.row_count, 1);
    assert_eq!(env.value(0, "count"), Some(&Value::Int(5)));
}

#[tokio::test]
async fn test_nl_top_n_scenario_via_pattern_strategy() {
    let db = Arc::new(MockDatabaseClient::new());
    let router = pattern_router(db.clone(), "users");

    let env = router
        .handle(&QueryRequest::nl("show top 5 from projects"))
        .await;

    assert!(env.success);
    assert_eq!(
        env.generated_sql.as_deref(),
        Some("SELECT * FROM projects LIMIT 5")
    );
    assert_eq!(db.executed_queries(), vec!["SELECT * FROM projects LIMIT 5"]);
}

#[tokio::test]
async fn test_nl_via_generative_strategy() {
    let db = Arc::new(
        MockDatabaseClient::new().with_response("count(*)", employee_count_result()),
    );
    let translator = GenerativeTranslator::new(
        Arc::new(MockGenerator::new()),
        "CREATE TABLE employees (id int, name text);",
    );
    let router = router(db.clone(), Arc::new(translator));

    let env = router
        .handle(&QueryRequest::nl("how many employees are there"))
        .await;

    assert!(env.success);
    assert_eq!(env.mode, Some(QueryMode::Nl));
    assert_eq!(
        env.generated_sql.as_deref(),
        Some("SELECT COUNT(*) as count FROM employees;")
    );
    assert_eq!(env.value(0, "count"), Some(&Value::Int(5)));
}

#[tokio::test]
async fn test_generative_output_is_revalidated() {
    // A generator that suggests a destructive statement is stopped by the
    // validator; the generated SQL is still reported for debugging
    let db = Arc::new(MockDatabaseClient::new());
    let generator = MockGenerator::new()
        .with_response("clean up the users table", "```sql\nDELETE FROM users;\n```");
    let translator = GenerativeTranslator::new(Arc::new(generator), "");
    let router = router(db.clone(), Arc::new(translator));

    let env = router
        .handle(&QueryRequest::nl("please clean up the users table"))
        .await;

    assert!(!env.success);
    assert_eq!(
        env.error.as_deref(),
        Some("validation failed: forbidden keyword DELETE")
    );
    assert_eq!(env.generated_sql.as_deref(), Some("DELETE FROM users;"));
    assert_eq!(db.call_count(), 0);
}

#[tokio::test]
async fn test_driver_failure_surfaces_as_envelope() {
    let db: Arc<dyn DatabaseClient> = Arc::new(FailingDatabaseClient::new("server closed"));
    let executor = QueryExecutor::new(db, SqlValidator::new().unwrap());
    let router = QueryRouter::new(
        executor,
        Arc::new(PatternTranslator::new("users").unwrap()),
    );

    let env = router.handle(&QueryRequest::sql("SELECT 1")).await;

    assert!(!env.success);
    assert!(env.error.unwrap().starts_with("database error:"));
    assert_eq!(env.row_count, 0);
    assert!(env.rows.is_none());
}

#[tokio::test]
async fn test_envelope_serializes_rows_as_objects() {
    let db = Arc::new(MockDatabaseClient::new().with_response(
        "from users",
        QueryResult::with_data(
            vec![
                ColumnInfo::new("id", "int4"),
                ColumnInfo::new("name", "text"),
            ],
            vec![vec![Value::Int(1), Value::String("Alice".to_string())]],
        ),
    ));
    let router = pattern_router(db, "users");

    let env = router
        .handle(&QueryRequest::sql("SELECT id, name FROM users"))
        .await;
    let json = serde_json::to_value(&env).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["mode"], "sql");
    assert_eq!(json["rows"][0]["id"], 1);
    assert_eq!(json["rows"][0]["name"], "Alice");
    assert_eq!(json["columns"], serde_json::json!(["id", "name"]));
    assert_eq!(json["row_count"], 1);
}

#[tokio::test]
async fn test_columns_match_row_width() {
    let db = Arc::new(MockDatabaseClient::new());
    let router = pattern_router(db, "users");

    let env = router.handle(&QueryRequest::sql("SELECT 1")).await;

    assert!(env.success);
    for row in env.rows.as_ref().unwrap() {
        assert_eq!(row.len(), env.columns.len());
    }
}
