//! Client errors.

use serde::Deserialize;
use thiserror::Error;

/// An error entry from a GraphQL response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<serde_json::Value>>,
}

/// Errors produced by clients and the helpers built on them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport failed to deliver the request or a frame.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request was cancelled through its abort signal.
    #[error("request aborted")]
    Aborted,

    /// The server answered with errors.
    #[error("{}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// The response carried neither data nor errors.
    #[error("response contains no data")]
    MissingData,

    /// The field a function unwraps is absent from the response.
    #[error("response has no field `{0}`")]
    MissingField(String),

    /// Data did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    format!("graphql errors: {}", messages.join("; "))
}

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
