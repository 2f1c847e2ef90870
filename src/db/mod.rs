//! Database abstraction layer for sqlgate.
//!
//! Provides a trait-based interface for statement execution, allowing the
//! real PostgreSQL backend and the in-memory test doubles to be used
//! interchangeably.

mod mock;
mod postgres;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use postgres::PostgresClient;
pub use types::{ColumnInfo, QueryParams, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Creates a database client for the given configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Arc<dyn DatabaseClient>> {
    let client = PostgresClient::connect(config).await?;
    Ok(Arc::new(client))
}

/// Trait defining the interface for database clients.
///
/// Implementations own a bounded connection pool; each `execute_query`
/// call uses exactly one pooled connection, returned on every exit path.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a single read statement and returns the materialized result.
    ///
    /// Named `:name` placeholders in the statement are bound from `params`.
    async fn execute_query(&self, sql: &str, params: Option<&QueryParams>)
        -> Result<QueryResult>;

    /// Closes the database connection pool.
    async fn close(&self) -> Result<()>;
}
