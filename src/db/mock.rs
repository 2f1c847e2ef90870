//! Mock database clients for testing.
//!
//! Provides in-memory implementations that return predefined results or
//! predictable failures without a running server.

use super::{ColumnInfo, DatabaseClient, QueryParams, QueryResult, Value};
use crate::error::{GateError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// A mock database client that returns predefined results.
///
/// Executed statements are recorded so tests can assert how many times
/// (and with what text) the store was reached.
pub struct MockDatabaseClient {
    /// Pattern -> canned result, checked in insertion order.
    responses: Vec<(String, QueryResult)>,
    executed: Mutex<Vec<String>>,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with default responses.
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Adds a canned result returned when the statement contains `pattern`
    /// (case-insensitive).
    pub fn with_response(mut self, pattern: impl Into<String>, result: QueryResult) -> Self {
        self.responses.push((pattern.into(), result));
        self
    }

    /// Returns the statements executed so far.
    pub fn executed_queries(&self) -> Vec<String> {
        self.executed.lock().map(|q| q.clone()).unwrap_or_default()
    }

    /// Returns how many statements reached the store.
    pub fn call_count(&self) -> usize {
        self.executed.lock().map(|q| q.len()).unwrap_or(0)
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(
        &self,
        sql: &str,
        _params: Option<&QueryParams>,
    ) -> Result<QueryResult> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.to_string());
        }

        let sql_lower = sql.to_lowercase();
        for (pattern, result) in &self.responses {
            if sql_lower.contains(&pattern.to_lowercase()) {
                return Ok(result.clone());
            }
        }

        if sql_lower.trim_start().starts_with("select") {
            // Default: a single row with one text column
            let columns = vec![ColumnInfo::new("result", "text")];
            let rows = vec![vec![Value::String(format!("Mock result for: {sql}"))]];
            Ok(QueryResult::with_data(columns, rows))
        } else {
            Ok(QueryResult::new())
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A database client whose every execution fails with a driver error.
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a failing client with the given driver error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingDatabaseClient {
    fn default() -> Self {
        Self::new("connection closed unexpectedly")
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(
        &self,
        _sql: &str,
        _params: Option<&QueryParams>,
    ) -> Result<QueryResult> {
        Err(GateError::database(self.message.clone()))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
