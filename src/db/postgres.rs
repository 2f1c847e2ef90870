//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient`
//! trait using a bounded sqlx connection pool.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseClient, QueryParams, QueryResult, Row, Value};
use crate::error::{GateError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column as SqlxColumn, Postgres, Row as SqlxRow, TypeInfo};
use std::time::Duration;
use tracing::{debug, warn};

/// Statement execution timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// Timeout for acquiring a pooled connection.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Maximum number of connection retry attempts.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// PostgreSQL database client.
#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Opens a bounded connection pool against the configured server.
    ///
    /// Transient connect failures are retried with exponential backoff.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;

        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Connection attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            let result = PgPoolOptions::new()
                .min_connections(config.pool_min)
                .max_connections(config.pool_max)
                .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
                .connect(&conn_str)
                .await;

            match result {
                Ok(pool) => {
                    debug!("Successfully connected to database");
                    return Ok(Self { pool });
                }
                Err(e) => {
                    let is_transient = is_transient_error(&e);
                    last_error = Some(e);

                    if attempt < MAX_RETRY_ATTEMPTS && is_transient {
                        warn!(
                            "Connection attempt {} failed (transient error), retrying in {:?}",
                            attempt, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2; // Exponential backoff
                    }
                }
            }
        }

        // All retries exhausted
        match last_error {
            Some(e) => Err(map_connection_error(e, config)),
            None => Err(GateError::internal("connection loop made no attempt")),
        }
    }

    /// Creates a new PostgresClient from an existing connection pool.
    ///
    /// This is primarily useful for testing.
    #[allow(dead_code)]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    async fn execute_query(
        &self,
        sql: &str,
        params: Option<&QueryParams>,
    ) -> Result<QueryResult> {
        // One pooled connection per call. The handle is returned on every
        // exit path (including unwinds) when it drops.
        let mut conn = self.pool.acquire().await.map_err(|e| match e {
            sqlx::Error::PoolTimedOut => {
                GateError::infrastructure("connection pool exhausted; acquire timed out")
            }
            other => GateError::infrastructure(format!("failed to acquire connection: {other}")),
        })?;

        let (rewritten, binds) = rewrite_named_params(sql, params)?;

        let mut query = sqlx::query(&rewritten);
        for value in &binds {
            query = bind_value(query, value);
        }

        let rows = tokio::time::timeout(
            Duration::from_secs(QUERY_TIMEOUT_SECS),
            query.fetch_all(&mut *conn),
        )
        .await
        .map_err(|_| {
            GateError::execution(format!("query timed out after {QUERY_TIMEOUT_SECS} seconds"))
        })?
        .map_err(|e| match e {
            sqlx::Error::Database(_) => GateError::database(format_query_error(e)),
            other => GateError::execution(other.to_string()),
        })?;

        // Column metadata comes from the first row; an empty result set has
        // no reliable metadata without re-preparing, so columns stay empty.
        let columns: Vec<ColumnInfo> = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<Row> = rows.iter().map(convert_row).collect();

        Ok(QueryResult::with_data(columns, rows))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Rewrites `:name` placeholders to positional `$n` binds.
///
/// Quoted literals and identifiers are copied verbatim and `::` casts are
/// left alone. Repeated names reuse the same ordinal. A placeholder with no
/// matching parameter is an error; there is no implicit interpolation.
fn rewrite_named_params(
    sql: &str,
    params: Option<&QueryParams>,
) -> Result<(String, Vec<Value>)> {
    let Some(params) = params.filter(|p| !p.is_empty()) else {
        return Ok((sql.to_string(), Vec::new()));
    };

    let mut out = String::with_capacity(sql.len());
    let mut binds: Vec<Value> = Vec::new();
    let mut ordinals: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();

    let mut chars = sql.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            // Quoted string literal or identifier: copy until the closing
            // quote. A doubled quote is an escape and stays inside.
            '\'' | '"' => {
                out.push(c);
                while let Some((_, inner)) = chars.next() {
                    out.push(inner);
                    if inner == c {
                        if chars.peek().map(|&(_, next)| next) == Some(c) {
                            let (_, next) = chars.next().unwrap_or((0, c));
                            out.push(next);
                        } else {
                            break;
                        }
                    }
                }
            }
            ':' => {
                // `::` is a Postgres cast, not a placeholder.
                if chars.peek().map(|&(_, next)| next) == Some(':') {
                    chars.next();
                    out.push_str("::");
                    continue;
                }

                let rest = &sql[idx + 1..];
                let name_len = rest
                    .char_indices()
                    .take_while(|(i, ch)| {
                        if *i == 0 {
                            ch.is_ascii_alphabetic() || *ch == '_'
                        } else {
                            ch.is_ascii_alphanumeric() || *ch == '_'
                        }
                    })
                    .count();

                if name_len == 0 {
                    out.push(':');
                    continue;
                }

                let name = &rest[..name_len];
                for _ in 0..name_len {
                    chars.next();
                }

                let ordinal = match ordinals.get(name) {
                    Some(n) => *n,
                    None => {
                        let value = params.get(name).ok_or_else(|| {
                            GateError::execution(format!("no value bound for parameter :{name}"))
                        })?;
                        binds.push(value.clone());
                        ordinals.insert(name, binds.len());
                        binds.len()
                    }
                };

                out.push('$');
                out.push_str(&ordinal.to_string());
            }
            _ => out.push(c),
        }
    }

    Ok((out, binds))
}

/// Binds a single scalar onto a query.
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::String(s) => query.bind(s.clone()),
        Value::Timestamp(ts) => query.bind(*ts),
        Value::Bytes(b) => query.bind(b.clone()),
    }
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    // Try to get the value based on the type
    // We use a match on type name and try to decode appropriately
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Timestamp)
            .unwrap_or(Value::Null),

        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Timestamp(Utc.from_utc_datetime(&v)))
            .unwrap_or(Value::Null),

        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),

        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // For all other types, try to get as string
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Determines if a connect error is transient and worth retrying.
fn is_transient_error(error: &sqlx::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    // Connection refused or timeout are often transient
    if error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("timeout")
        || error_str.contains("temporarily unavailable")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
    {
        return true;
    }

    // Authentication and database-not-found errors are not transient
    if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
        || error_str.contains("does not exist")
        || error_str.contains("ssl")
        || error_str.contains("tls")
    {
        return false;
    }

    // Default to not retrying unknown errors
    false
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> GateError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        GateError::infrastructure(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        GateError::infrastructure(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        GateError::infrastructure(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        GateError::infrastructure(
            "Server requires SSL. Add '?sslmode=require' to connection string.".to_string(),
        )
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        GateError::infrastructure(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        GateError::infrastructure(error.to_string())
    }
}

/// Formats a query error with Postgres details if available.
fn format_query_error(error: sqlx::Error) -> String {
    let error_str = error.to_string();

    // PostgreSQL errors carry structured detail/hint fields worth surfacing
    let mut result = String::new();

    if let Some(db_error) = error.as_database_error() {
        result.push_str(db_error.message());

        if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
            if let Some(detail) = pg_error.detail() {
                result.push_str("; detail: ");
                result.push_str(detail);
            }

            if let Some(hint) = pg_error.hint() {
                result.push_str("; hint: ");
                result.push_str(hint);
            }

            if let Some(table) = pg_error.table() {
                result.push_str("; table: ");
                result.push_str(table);
            }

            if let Some(column) = pg_error.column() {
                result.push_str("; column: ");
                result.push_str(column);
            }

            if let Some(constraint) = pg_error.constraint() {
                result.push_str("; constraint: ");
                result.push_str(constraint);
            }
        }
    } else {
        // Fallback for non-database errors
        result = error_str;
    }

    result
}
