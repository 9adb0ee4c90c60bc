//! Document rendering.
//!
//! Provides [`DocumentRenderer`], which turns a Markdown file's bytes into a
//! complete HTML page with diagram blocks embedded as inline images.

use std::sync::Arc;

use mdview_diagrams::{
    CancelFlag, DiagramFormat, DiagramLanguage, DiagramProcessor, DiagramRenderer, RenderCache,
};
use mdview_renderer::{MarkdownRenderer, RenderResult};

use crate::template::{DEFAULT_STYLESHEET_URL, render_page};

/// Error returned when a document cannot be rendered.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Document bytes are not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Configuration for [`DocumentRenderer`].
#[derive(Clone, Debug)]
pub struct DocumentRendererConfig {
    /// Fence label intercepted as a diagram.
    pub language: DiagramLanguage,
    /// Image format requested from the diagram service.
    pub format: DiagramFormat,
    /// Stylesheet linked from the page shell. Empty disables the link.
    pub stylesheet_url: String,
    /// Page title used when the document has no H1 heading.
    pub fallback_title: String,
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,
}

impl Default for DocumentRendererConfig {
    fn default() -> Self {
        Self {
            language: DiagramLanguage::default(),
            format: DiagramFormat::default(),
            stylesheet_url: DEFAULT_STYLESHEET_URL.to_owned(),
            fallback_title: "mdview".to_owned(),
            gfm: true,
        }
    }
}

/// Renders Markdown documents to HTML pages.
///
/// Holds the diagram client and the shared [`RenderCache`]; a fresh
/// [`MarkdownRenderer`] and [`DiagramProcessor`] are built for each call, so
/// one `DocumentRenderer` serves concurrent requests.
///
/// Without a diagram client, diagram blocks render as ordinary code blocks.
///
/// # Example
///
/// ```
/// use mdview_site::{DocumentRenderer, DocumentRendererConfig};
///
/// let renderer = DocumentRenderer::new(DocumentRendererConfig::default());
/// let page = renderer.render(b"# Hello\n\nWorld\n").unwrap();
///
/// assert!(page.contains("<title>Hello</title>"));
/// assert!(page.contains("<p>World</p>"));
/// ```
pub struct DocumentRenderer {
    client: Option<Arc<dyn DiagramRenderer>>,
    cache: Arc<RenderCache>,
    config: DocumentRendererConfig,
}

impl DocumentRenderer {
    /// Create a renderer with diagrams disabled and an empty cache.
    #[must_use]
    pub fn new(config: DocumentRendererConfig) -> Self {
        Self {
            client: None,
            cache: Arc::new(RenderCache::new()),
            config,
        }
    }

    /// Render diagram blocks through `client`.
    #[must_use]
    pub fn with_diagrams(mut self, client: Arc<dyn DiagramRenderer>) -> Self {
        self.client = Some(client);
        self
    }

    /// Use an existing cache instead of a private one.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<RenderCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The diagram cache shared by all renders.
    #[must_use]
    pub fn cache(&self) -> &Arc<RenderCache> {
        &self.cache
    }

    #[must_use]
    pub fn diagrams_enabled(&self) -> bool {
        self.client.is_some()
    }

    #[must_use]
    pub fn config(&self) -> &DocumentRendererConfig {
        &self.config
    }

    /// Render a document to a complete HTML page.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidUtf8`] if `document` is not UTF-8.
    /// Diagram failures are not errors; see [`DiagramProcessor`].
    pub fn render(&self, document: &[u8]) -> Result<String, DocumentError> {
        self.render_cancellable(document, &CancelFlag::new())
    }

    /// Render a document, skipping remote diagram calls once `cancel` is set.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidUtf8`] if `document` is not UTF-8.
    pub fn render_cancellable(
        &self,
        document: &[u8],
        cancel: &CancelFlag,
    ) -> Result<String, DocumentError> {
        let result = self.render_fragment(document, cancel)?;
        let title = result
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.config.fallback_title);

        Ok(render_page(title, &self.config.stylesheet_url, &result.html))
    }

    /// Render a document to body HTML, returning title and warnings too.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidUtf8`] if `document` is not UTF-8.
    pub fn render_fragment(
        &self,
        document: &[u8],
        cancel: &CancelFlag,
    ) -> Result<RenderResult, DocumentError> {
        let markdown = std::str::from_utf8(document)?;

        let mut renderer = MarkdownRenderer::new()
            .with_gfm(self.config.gfm)
            .with_title_extraction();

        if let Some(client) = &self.client {
            let processor = DiagramProcessor::new(Arc::clone(client), Arc::clone(&self.cache))
                .with_language(self.config.language)
                .with_format(self.config.format)
                .with_cancel_flag(cancel.clone());
            renderer = renderer.with_processor(processor);
        }

        let result = renderer.render_markdown(markdown);
        if !result.warnings.is_empty() {
            tracing::debug!(warnings = result.warnings.len(), "Document rendered with warnings");
        }

        Ok(result)
    }
}
