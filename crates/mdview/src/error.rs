//! CLI error types.

use mdview_config::ConfigError;
use mdview_server::ServerError;
use mdview_site::DocumentError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Setup(#[from] ServerError),

    #[error("{0}")]
    Server(String),
}
