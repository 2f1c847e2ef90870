//! Request routing.
//!
//! The router is the sole public entry point of the pipeline: it dispatches
//! a request either straight to the executor (SQL mode) or through the
//! translator first (NL mode), and tags every envelope with the mode that
//! produced it.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::db::QueryParams;
use crate::query::{QueryExecutor, QueryMode, QueryRequest, ResultEnvelope};
use crate::translate::{QueryContext, Translator};

/// Routes queries to the appropriate execution path.
///
/// Owns its executor (which owns the validator) and translator; nothing is
/// reached through ambient globals.
pub struct QueryRouter {
    executor: QueryExecutor,
    translator: Arc<dyn Translator>,
}

impl QueryRouter {
    /// Creates a router over the given executor and translator.
    pub fn new(executor: QueryExecutor, translator: Arc<dyn Translator>) -> Self {
        Self {
            executor,
            translator,
        }
    }

    /// Handles a single request, dispatching on its mode.
    pub async fn handle(&self, request: &QueryRequest) -> ResultEnvelope {
        match request.mode {
            QueryMode::Sql => {
                self.execute_sql(&request.text, request.parameters.as_ref())
                    .await
            }
            QueryMode::Nl => self.execute_nlp(&request.text, request.context.as_ref()).await,
        }
    }

    /// Executes caller-supplied SQL.
    pub async fn execute_sql(
        &self,
        query: &str,
        parameters: Option<&QueryParams>,
    ) -> ResultEnvelope {
        self.executor
            .execute(query, parameters)
            .await
            .with_mode(QueryMode::Sql)
    }

    /// Translates a natural-language question and executes the result.
    ///
    /// The generated SQL is recorded on the envelope even when execution
    /// fails, to aid debugging. A translation failure short-circuits
    /// without invoking the executor.
    pub async fn execute_nlp(
        &self,
        question: &str,
        context: Option<&QueryContext>,
    ) -> ResultEnvelope {
        let sql = match self.translator.translate(question, context).await {
            Ok(sql) => sql,
            Err(e) => {
                warn!(error = %e, "translation failed");
                return ResultEnvelope::failure(&e, 0.0).with_mode(QueryMode::Nl);
            }
        };

        debug!(%sql, "translated question");

        self.executor
            .execute(&sql, None)
            .await
            .with_mode(QueryMode::Nl)
            .with_generated_sql(sql)
    }
}
