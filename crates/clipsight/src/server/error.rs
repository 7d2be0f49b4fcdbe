//! HTTP error type and its JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clipsight_core::ClipsightError;
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Errors surfaced by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Missing or malformed request input
    #[error("{0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    /// Failure of the classification pipeline
    #[error(transparent)]
    Analysis(#[from] ClipsightError),

    /// Analysis did not finish within the request time budget
    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Failure of the server machinery itself
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            ServerError::Analysis(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::Analysis(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed: {}", message);
        } else if let ServerError::Timeout { .. } = self {
            tracing::warn!("{}", message);
        } else {
            tracing::debug!("Rejected request: {}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("Worker task failed: {err}"))
    }
}
