//! HTTP server for mdview.
//!
//! Serves a document root over HTTP using axum:
//! - `*.md` paths are rendered to HTML pages with diagrams inlined
//! - every other path is served as a static file from the same root
//!
//! # Quick Start
//!
//! ```no_run
//! use mdview_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         doc_root: "docs".into(),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (mdview-server)
//!                        │
//!                        ├─► *.md ──► spawn_blocking ──► DocumentRenderer
//!                        │                                   │
//!                        │                                   ├─► RenderCache (hit)
//!                        │                                   └─► Kroki (miss)
//!                        │
//!                        └─► Static files (tower-http ServeDir)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod static_files;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mdview_diagrams::{
    DEFAULT_KROKI_URL, DEFAULT_TIMEOUT, DiagramFormat, DiagramLanguage, KrokiClient,
};
use mdview_site::{DEFAULT_STYLESHEET_URL, DocumentRenderer, DocumentRendererConfig};

pub use error::ServerError;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory that request paths are resolved against.
    pub doc_root: PathBuf,
    /// Kroki URL for diagrams (`None` disables diagrams).
    pub kroki_url: Option<String>,
    /// Fence label rendered as a diagram.
    pub diagram_language: DiagramLanguage,
    pub diagram_format: DiagramFormat,
    /// Timeout for one Kroki request.
    pub diagram_timeout: Duration,
    /// Stylesheet linked from rendered pages.
    pub stylesheet_url: String,
    /// Application version (part of the page `ETag`).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 18080,
            doc_root: PathBuf::from("."),
            kroki_url: Some(DEFAULT_KROKI_URL.to_owned()),
            diagram_language: DiagramLanguage::default(),
            diagram_format: DiagramFormat::default(),
            diagram_timeout: DEFAULT_TIMEOUT,
            stylesheet_url: DEFAULT_STYLESHEET_URL.to_owned(),
            version: String::new(),
        }
    }
}

/// Build the document renderer described by `config`, with an empty cache.
#[must_use]
pub fn document_renderer(config: &ServerConfig) -> DocumentRenderer {
    let renderer_config = DocumentRendererConfig {
        language: config.diagram_language,
        format: config.diagram_format,
        stylesheet_url: config.stylesheet_url.clone(),
        ..DocumentRendererConfig::default()
    };
    let renderer = DocumentRenderer::new(renderer_config);

    match &config.kroki_url {
        Some(url) => renderer.with_diagrams(Arc::new(KrokiClient::with_timeout(
            url.as_str(),
            config.diagram_timeout,
        ))),
        None => renderer,
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let renderer = Arc::new(document_renderer(&config));
    let state = Arc::new(AppState {
        renderer,
        doc_root: config.doc_root.clone(),
        version: config.version.clone(),
    });

    let app = app::create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        doc_root = %config.doc_root.display(),
        diagrams = config.kroki_url.as_deref().unwrap_or("disabled"),
        "Starting server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from mdview config.
///
/// # Errors
///
/// Returns [`ServerError::Config`] if the diagram language or format is not
/// supported.
pub fn server_config_from_config(
    config: &mdview_config::Config,
    version: String,
) -> Result<ServerConfig, ServerError> {
    let diagrams = &config.diagrams;

    let diagram_language = DiagramLanguage::parse(&diagrams.language).ok_or_else(|| {
        ServerError::Config(format!(
            "unsupported diagram language '{}'",
            diagrams.language
        ))
    })?;
    let diagram_format = DiagramFormat::parse(&diagrams.format).ok_or_else(|| {
        ServerError::Config(format!("unsupported diagram format '{}'", diagrams.format))
    })?;

    Ok(ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        doc_root: config.docs_resolved.root.clone(),
        kroki_url: diagrams.enabled.then(|| diagrams.kroki_url.clone()),
        diagram_language,
        diagram_format,
        diagram_timeout: Duration::from_secs(diagrams.timeout_secs),
        stylesheet_url: config.page.stylesheet_url.clone(),
        version,
    })
}
