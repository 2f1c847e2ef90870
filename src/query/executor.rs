//! Validated statement execution.
//!
//! The executor is the only component that touches the database boundary.
//! Every statement goes through the safety validator first; a denied
//! statement never acquires a connection.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::db::{DatabaseClient, QueryParams};
use crate::error::GateError;
use crate::query::ResultEnvelope;
use crate::safety::SqlValidator;

/// Query executor that gates and runs SQL statements.
pub struct QueryExecutor {
    db: Arc<dyn DatabaseClient>,
    validator: SqlValidator,
}

impl QueryExecutor {
    /// Creates a new executor over the given database client and validator.
    pub fn new(db: Arc<dyn DatabaseClient>, validator: SqlValidator) -> Self {
        Self { db, validator }
    }

    /// Validates and executes a single statement.
    ///
    /// Always returns an envelope; failures are captured, never thrown.
    pub async fn execute(&self, sql: &str, params: Option<&QueryParams>) -> ResultEnvelope {
        let start = Instant::now();

        let verdict = self.validator.validate(sql);
        if let Some(reason) = verdict.denial() {
            warn!(reason, "statement rejected by validator");
            return ResultEnvelope::failure(&GateError::validation(reason), 0.0);
        }

        match self.db.execute_query(sql, params).await {
            Ok(result) => {
                let elapsed = elapsed_ms(start);
                debug!(row_count = result.row_count, elapsed_ms = elapsed, "statement executed");
                ResultEnvelope::success(result, elapsed)
            }
            Err(e) => {
                let elapsed = elapsed_ms(start);
                warn!(error = %e, "statement failed");
                ResultEnvelope::failure(&e, elapsed)
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
