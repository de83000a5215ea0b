//! OLAP boundary: the query-client trait the core executes against, and the
//! result shapes the live-schema loader decodes.

pub mod influx;

use async_trait::async_trait;
use serde::Deserialize;

/// Errors surfaced by a query client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP transport itself failed (connection refused, TLS, timeout).
    #[error("Failed to reach the InfluxDB server")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("InfluxDB returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The server reported an error for the submitted statement.
    #[error("InfluxDB rejected the statement: {0}")]
    Server(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected response from InfluxDB: {0}")]
    UnexpectedResponse(String),
}

/// One series of a query result, as InfluxDB reports it: a name, a column
/// header, and rows of JSON values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl Series {
    /// Index of a named column, or an error naming the missing column.
    pub fn column_index(&self, column: &str) -> Result<usize, ClientError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| {
                ClientError::UnexpectedResponse(format!(
                    "missing column '{}' in series '{}'",
                    column, self.name
                ))
            })
    }
}

/// The successful payload of one query: the flattened series of all result
/// entries. Result-level error fields are promoted to [`ClientError::Server`]
/// by the client before this is returned.
#[derive(Debug, Clone, Default)]
pub struct QueryResults {
    pub series: Vec<Series>,
}

/// Trait defining the single operation the core needs from a database client.
///
/// The reconciliation pipeline is generic over this trait so the executor and
/// the live-schema loader can be tested against in-memory mocks.
#[async_trait]
pub trait QueryClient {
    /// Submits one statement and returns its parsed results.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the transport fails, the server answers with
    /// a non-success status, or any result carries a server-side error field.
    async fn query(&self, statement: &str) -> Result<QueryResults, ClientError>;
}
