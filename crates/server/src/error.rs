use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Fulfillment admin is disabled in this deployment")]
    AdminDisabled,

    #[error("Invalid request data")]
    Validation(Vec<ValidationIssue>),

    #[error("Reconciliation cycle failed: {0}")]
    Cycle(#[from] shipdesk::CycleError),

    #[error("Status store failure: {0}")]
    Store(#[from] store::StoreError),

    #[error("Label export failed: {0}")]
    Export(#[from] export::ExportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

/// One field-level problem in a rejected mutation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::AdminDisabled => StatusCode::FORBIDDEN,
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Cycle(_) => StatusCode::BAD_GATEWAY,
            ServerError::Store(_) | ServerError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Config(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        // Every outward payload is tagged the same way the success payloads
        // are, so callers branch on one `success` field.
        let body = match &self {
            ServerError::Validation(issues) => Json(json!({
                "success": false,
                "error": message,
                "details": issues,
            })),
            _ => Json(json!({
                "success": false,
                "error": message,
            })),
        };

        (status, body).into_response()
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<upstream::UpstreamError> for ServerError {
    fn from(err: upstream::UpstreamError) -> Self {
        ServerError::Cycle(shipdesk::CycleError::Upstream(err))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}
