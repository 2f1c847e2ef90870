//! Request and result envelope types.
//!
//! Every execution, successful or not, is reported through the same
//! `ResultEnvelope` shape so callers never see a raw error path.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::db::{QueryParams, QueryResult, Row, Value};
use crate::error::GateError;
use crate::translate::QueryContext;

/// How a request's text should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// The text is raw SQL.
    Sql,
    /// The text is a natural-language question.
    Nl,
}

impl QueryMode {
    /// Returns the mode as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Nl => "nl",
        }
    }
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single inbound query request. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Raw SQL or a natural-language question, depending on `mode`.
    pub text: String,

    /// Interpretation mode.
    pub mode: QueryMode,

    /// Named statement parameters (SQL mode only).
    pub parameters: Option<QueryParams>,

    /// Free-form context forwarded to the translator (NL mode only).
    pub context: Option<QueryContext>,
}

impl QueryRequest {
    /// Creates a raw-SQL request.
    pub fn sql(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: QueryMode::Sql,
            parameters: None,
            context: None,
        }
    }

    /// Creates a natural-language request.
    pub fn nl(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: QueryMode::Nl,
            parameters: None,
            context: None,
        }
    }

    /// Attaches named statement parameters.
    pub fn with_parameters(mut self, parameters: QueryParams) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Attaches translator context.
    pub fn with_context(mut self, context: QueryContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// Uniform wrapper returned for every query execution.
///
/// Invariants: a failed envelope carries no rows and a zero row count; a
/// successful envelope carries no error.
#[derive(Debug, Clone)]
pub struct ResultEnvelope {
    /// Whether the execution produced a result.
    pub success: bool,

    /// Materialized rows, in result order. None on failure.
    pub rows: Option<Vec<Row>>,

    /// Column names in result order.
    pub columns: Vec<String>,

    /// Number of returned rows; 0 on failure.
    pub row_count: usize,

    /// Wall-clock execution time in milliseconds.
    pub execution_time_ms: f64,

    /// Human-readable failure message. None on success.
    pub error: Option<String>,

    /// The SQL produced by translation, when the request was NL.
    pub generated_sql: Option<String>,

    /// The mode the router handled the request in.
    pub mode: Option<QueryMode>,
}

impl ResultEnvelope {
    /// Builds a success envelope from a materialized query result.
    pub fn success(result: QueryResult, execution_time_ms: f64) -> Self {
        let columns = result.column_names();
        Self {
            success: true,
            rows: Some(result.rows),
            columns,
            row_count: result.row_count,
            execution_time_ms,
            error: None,
            generated_sql: None,
            mode: None,
        }
    }

    /// Builds a failure envelope from a pipeline error.
    pub fn failure(error: &GateError, execution_time_ms: f64) -> Self {
        Self {
            success: false,
            rows: None,
            columns: Vec::new(),
            row_count: 0,
            execution_time_ms,
            error: Some(error.envelope_message()),
            generated_sql: None,
            mode: None,
        }
    }

    /// Tags the envelope with the mode it was handled in.
    pub fn with_mode(mut self, mode: QueryMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Records the SQL a translator produced for this request.
    pub fn with_generated_sql(mut self, sql: impl Into<String>) -> Self {
        self.generated_sql = Some(sql.into());
        self
    }

    /// Looks up a value by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let column_index = self.columns.iter().position(|c| c == column)?;
        self.rows.as_ref()?.get(row)?.get(column_index)
    }
}

impl Serialize for ResultEnvelope {
    /// Serializes rows as an ordered sequence of column->scalar objects,
    /// zipping the column names with each row's values.
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ResultEnvelope", 8)?;
        state.serialize_field("success", &self.success)?;

        match &self.rows {
            Some(rows) => {
                let projected: Vec<serde_json::Map<String, serde_json::Value>> = rows
                    .iter()
                    .map(|row| {
                        self.columns
                            .iter()
                            .zip(row.iter())
                            .map(|(column, value)| (column.clone(), value.to_json()))
                            .collect()
                    })
                    .collect();
                state.serialize_field("rows", &projected)?;
            }
            None => state.serialize_field("rows", &Option::<Vec<serde_json::Value>>::None)?,
        }

        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("row_count", &self.row_count)?;
        state.serialize_field("execution_time_ms", &self.execution_time_ms)?;
        state.serialize_field("error", &self.error)?;
        state.serialize_field("generated_sql", &self.generated_sql)?;
        state.serialize_field("mode", &self.mode)?;
        state.end()
    }
}
