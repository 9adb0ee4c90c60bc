//! Kroki HTTP client.
//!
//! Sends diagram source to a Kroki-compatible service and returns the
//! rendered image bytes. Requests are synchronous; callers on an async
//! runtime run the whole document render on a blocking thread.

use std::time::Duration;

use ureq::Agent;

use crate::consts::{DEFAULT_KROKI_URL, DEFAULT_TIMEOUT};
use crate::language::{DiagramFormat, DiagramLanguage};

/// One diagram to render.
#[derive(Debug, Clone, Copy)]
pub struct DiagramRequest<'a> {
    /// Literal diagram source from the fenced block.
    pub source: &'a str,
    pub language: DiagramLanguage,
    pub format: DiagramFormat,
}

/// Remote rendering failure.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("HTTP error: {0}")]
    Http(String),
    /// The service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// Reading the response body failed.
    #[error("I/O error: {0}")]
    Io(String),
    /// The service answered with an empty body.
    #[error("empty response from diagram service")]
    EmptyResponse,
}

/// Anything that can turn diagram source into image bytes.
///
/// Implemented by [`KrokiClient`]; tests substitute counting or failing
/// stubs.
pub trait DiagramRenderer: Send + Sync {
    /// Render one diagram.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the diagram could not be rendered.
    fn render(&self, request: &DiagramRequest<'_>) -> Result<Vec<u8>, RenderError>;
}

/// Create HTTP agent with the specified timeout.
///
/// Non-2xx responses are returned as ordinary responses so the error body
/// can be reported.
#[must_use]
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Client for a Kroki server.
///
/// Holds a pooled agent. Share one client across requests through `Arc`.
#[derive(Debug)]
pub struct KrokiClient {
    base_url: String,
    timeout: Duration,
    agent: Agent,
}

impl KrokiClient {
    /// Create a client for the given server URL with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    #[must_use]
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            timeout,
            agent: create_agent(timeout),
        }
    }

    /// Server URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL a request is posted to, e.g. `https://kroki.io/mermaid/svg`.
    #[must_use]
    pub fn endpoint_url(&self, language: DiagramLanguage, format: DiagramFormat) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            language.kroki_endpoint(),
            format.as_str()
        )
    }
}

impl Default for KrokiClient {
    fn default() -> Self {
        Self::new(DEFAULT_KROKI_URL)
    }
}

impl DiagramRenderer for KrokiClient {
    fn render(&self, request: &DiagramRequest<'_>) -> Result<Vec<u8>, RenderError> {
        let url = self.endpoint_url(request.language, request.format);

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .send(request.source.as_bytes())
            .map_err(|e| RenderError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if !(200..300).contains(&status) {
            let body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(RenderError::Status { status, body });
        }

        let data = body
            .read_to_vec()
            .map_err(|e| RenderError::Io(e.to_string()))?;

        if data.is_empty() {
            return Err(RenderError::EmptyResponse);
        }

        Ok(data)
    }
}
