//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Server error type.
///
/// Responses carry a plain-text body; details only go to the log.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No readable document at the requested path.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The document could not be rendered.
    #[error("Render error: {0}")]
    Render(#[from] mdview_site::DocumentError),

    /// The blocking render task panicked or was aborted.
    #[error("Render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Invalid server configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            Self::NotFound(path) => {
                tracing::debug!(path = %path, "Document not found");
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
            Self::Render(_) | Self::Task(_) | Self::Config(_) => {
                tracing::error!(error = %self, "Failed to serve document");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
