//! Code block processor for diagram languages.
//!
//! [`DiagramProcessor`] implements [`CodeBlockProcessor`]: blocks in the
//! designated language are rendered through the cache and the remote service
//! and replaced with an inline `<img>`; every other block is left to the
//! default renderer.

use std::fmt::Write;
use std::sync::Arc;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use mdview_renderer::{CodeBlockProcessor, FencedCodeBlock, ProcessResult};

use crate::cache::RenderCache;
use crate::cancel::CancelFlag;
use crate::consts::IMAGE_CLASS;
use crate::fingerprint::Fingerprint;
use crate::kroki::{DiagramRenderer, DiagramRequest};
use crate::language::{DiagramFormat, DiagramLanguage};

/// Build the `<img>` element embedding a base64 payload.
///
/// An empty payload yields a broken image, which is how failed renders show
/// up in the page.
#[must_use]
pub fn image_tag(format: DiagramFormat, payload: &str) -> String {
    let mut html = String::with_capacity(payload.len() + 96);
    let _ = write!(
        html,
        r#"<img class="{IMAGE_CLASS}" src="data:{};base64,{payload}" alt="diagram" />"#,
        format.mime_type()
    );
    html
}

/// Renders diagram blocks into inline images, consulting a shared cache.
///
/// Create one per document render; the client and cache are shared across
/// renders through `Arc`.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use mdview_diagrams::{DiagramProcessor, KrokiClient, RenderCache};
/// use mdview_renderer::MarkdownRenderer;
///
/// let client = Arc::new(KrokiClient::new("https://kroki.io"));
/// let cache = Arc::new(RenderCache::new());
///
/// let mut renderer = MarkdownRenderer::new()
///     .with_processor(DiagramProcessor::new(client, Arc::clone(&cache)));
/// let result = renderer.render_markdown("```mermaid\ngraph TD\n  A --> B\n```\n");
///
/// assert!(result.html.contains("mermaid-image"));
/// ```
pub struct DiagramProcessor {
    client: Arc<dyn DiagramRenderer>,
    cache: Arc<RenderCache>,
    language: DiagramLanguage,
    format: DiagramFormat,
    cancel: CancelFlag,
    warnings: Vec<String>,
}

impl DiagramProcessor {
    /// Create a processor for Mermaid blocks rendered as SVG.
    #[must_use]
    pub fn new(client: Arc<dyn DiagramRenderer>, cache: Arc<RenderCache>) -> Self {
        Self {
            client,
            cache,
            language: DiagramLanguage::default(),
            format: DiagramFormat::default(),
            cancel: CancelFlag::new(),
            warnings: Vec::new(),
        }
    }

    /// Intercept blocks of this language instead of Mermaid.
    #[must_use]
    pub fn with_language(mut self, language: DiagramLanguage) -> Self {
        self.language = language;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: DiagramFormat) -> Self {
        self.format = format;
        self
    }

    /// Skip remote calls once `cancel` is set.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Base64 payload for a block: cached, freshly rendered, or empty on failure.
    fn payload(&mut self, block: &FencedCodeBlock) -> String {
        if block.source.trim().is_empty() {
            self.warnings
                .push(format!("diagram {}: empty diagram source", block.index));
            return String::new();
        }

        let key = Fingerprint::of(&block.source);

        if let Some(encoded) = self.cache.get(&key) {
            tracing::debug!(fingerprint = %key, "Diagram cache hit");
            return encoded;
        }

        if self.cancel.is_cancelled() {
            tracing::debug!(fingerprint = %key, "Request cancelled, skipping diagram render");
            self.warnings
                .push(format!("diagram {}: render cancelled", block.index));
            return String::new();
        }

        tracing::debug!(fingerprint = %key, "Diagram cache miss");
        let request = DiagramRequest {
            source: &block.source,
            language: self.language,
            format: self.format,
        };

        match self.client.render(&request) {
            Ok(bytes) => {
                let encoded = BASE64_STANDARD.encode(&bytes);
                self.cache.put(key, encoded.clone());
                tracing::debug!(fingerprint = %key, size = bytes.len(), "Stored rendered diagram");
                encoded
            }
            Err(e) => {
                tracing::warn!(
                    fingerprint = %key,
                    index = block.index,
                    error = %e,
                    "Failed to render diagram"
                );
                self.warnings.push(format!("diagram {}: {e}", block.index));
                String::new()
            }
        }
    }
}

impl CodeBlockProcessor for DiagramProcessor {
    fn process(&mut self, block: &FencedCodeBlock) -> ProcessResult {
        if !self.language.matches(&block.language) {
            return ProcessResult::NotHandled;
        }

        let payload = self.payload(block);
        ProcessResult::Handled(image_tag(self.format, &payload))
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::kroki::RenderError;

    /// Returns `<svg>{source}</svg>` and counts calls.
    #[derive(Default)]
    struct CountingRenderer {
        calls: AtomicUsize,
        requests: Mutex<Vec<(String, DiagramLanguage, DiagramFormat)>>,
    }

    impl CountingRenderer {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DiagramRenderer for CountingRenderer {
        fn render(&self, request: &DiagramRequest<'_>) -> Result<Vec<u8>, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push((
                request.source.to_owned(),
                request.language,
                request.format,
            ));
            Ok(format!("<svg>{}</svg>", request.source).into_bytes())
        }
    }

    struct FailingRenderer {
        calls: AtomicUsize,
    }

    impl DiagramRenderer for FailingRenderer {
        fn render(&self, _request: &DiagramRequest<'_>) -> Result<Vec<u8>, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(RenderError::Http("connection refused".to_owned()))
        }
    }

    fn block(language: &str, source: &str, index: usize) -> FencedCodeBlock {
        FencedCodeBlock {
            index,
            language: language.to_owned(),
            attrs: HashMap::new(),
            source: source.to_owned(),
        }
    }

    fn expected_svg_tag(source: &str) -> String {
        let encoded = BASE64_STANDARD.encode(format!("<svg>{source}</svg>"));
        format!(
            r#"<img class="mermaid-image" src="data:image/svg+xml;base64,{encoded}" alt="diagram" />"#
        )
    }

    #[test]
    fn test_image_tag() {
        assert_eq!(
            image_tag(DiagramFormat::Svg, "PHN2Zz4="),
            r#"<img class="mermaid-image" src="data:image/svg+xml;base64,PHN2Zz4=" alt="diagram" />"#
        );
        assert_eq!(
            image_tag(DiagramFormat::Png, ""),
            r#"<img class="mermaid-image" src="data:image/png;base64," alt="diagram" />"#
        );
    }

    #[test]
    fn test_non_diagram_block_not_handled() {
        let client = Arc::new(CountingRenderer::default());
        let cache = Arc::new(RenderCache::new());
        let mut processor = DiagramProcessor::new(Arc::<CountingRenderer>::clone(&client), Arc::clone(&cache));

        let result = processor.process(&block("rust", "fn main() {}\n", 0));

        assert_eq!(result, ProcessResult::NotHandled);
        assert_eq!(client.calls(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_miss_renders_and_caches() {
        let client = Arc::new(CountingRenderer::default());
        let cache = Arc::new(RenderCache::new());
        let mut processor = DiagramProcessor::new(Arc::<CountingRenderer>::clone(&client), Arc::clone(&cache));
        let source = "graph TD\n  A --> B\n";

        let result = processor.process(&block("mermaid", source, 0));

        assert_eq!(result, ProcessResult::Handled(expected_svg_tag(source)));
        assert_eq!(client.calls(), 1);
        assert_eq!(
            cache.get(&Fingerprint::of(source)),
            Some(BASE64_STANDARD.encode(format!("<svg>{source}</svg>")))
        );
        assert!(processor.warnings().is_empty());
    }

    #[test]
    fn test_cache_hit_avoids_remote_call() {
        let client = Arc::new(CountingRenderer::default());
        let cache = Arc::new(RenderCache::new());
        let source = "graph TD\n  A --> B\n";
        cache.put(Fingerprint::of(source), "Y2FjaGVk".to_owned());

        let mut processor = DiagramProcessor::new(Arc::<CountingRenderer>::clone(&client), Arc::clone(&cache));
        let result = processor.process(&block("mermaid", source, 0));

        assert_eq!(client.calls(), 0);
        assert_eq!(
            result,
            ProcessResult::Handled(image_tag(DiagramFormat::Svg, "Y2FjaGVk"))
        );
    }

    #[test]
    fn test_repeated_block_calls_remote_once() {
        let client = Arc::new(CountingRenderer::default());
        let cache = Arc::new(RenderCache::new());
        let mut processor = DiagramProcessor::new(Arc::<CountingRenderer>::clone(&client), Arc::clone(&cache));

        let first = processor.process(&block("mermaid", "A --> B", 0));
        let second = processor.process(&block("mermaid", "A --> B", 1));

        assert_eq!(first, second);
        assert_eq!(client.calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failure_degrades_to_empty_payload() {
        let client = Arc::new(FailingRenderer {
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(RenderCache::new());
        let mut processor = DiagramProcessor::new(Arc::<FailingRenderer>::clone(&client), Arc::clone(&cache));

        let result = processor.process(&block("mermaid", "graph TD", 3));

        assert_eq!(
            result,
            ProcessResult::Handled(
                r#"<img class="mermaid-image" src="data:image/svg+xml;base64," alt="diagram" />"#
                    .to_owned()
            )
        );
        assert!(cache.is_empty());
        assert_eq!(
            processor.warnings(),
            ["diagram 3: HTTP error: connection refused".to_owned()]
        );
    }

    #[test]
    fn test_failure_is_retried_on_next_render() {
        let client = Arc::new(FailingRenderer {
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(RenderCache::new());

        for _ in 0..2 {
            let mut processor = DiagramProcessor::new(Arc::<FailingRenderer>::clone(&client), Arc::clone(&cache));
            processor.process(&block("mermaid", "graph TD", 0));
        }

        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cancelled_skips_remote_but_uses_cache() {
        let client = Arc::new(CountingRenderer::default());
        let cache = Arc::new(RenderCache::new());
        cache.put(Fingerprint::of("cached"), "Y2FjaGVk".to_owned());

        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut processor = DiagramProcessor::new(Arc::<CountingRenderer>::clone(&client), Arc::clone(&cache))
            .with_cancel_flag(cancel);

        let cached = processor.process(&block("mermaid", "cached", 0));
        let fresh = processor.process(&block("mermaid", "fresh", 1));

        assert_eq!(
            cached,
            ProcessResult::Handled(image_tag(DiagramFormat::Svg, "Y2FjaGVk"))
        );
        assert_eq!(fresh, ProcessResult::Handled(image_tag(DiagramFormat::Svg, "")));
        assert_eq!(client.calls(), 0);
        assert_eq!(cache.len(), 1);
        assert_eq!(processor.warnings(), ["diagram 1: render cancelled".to_owned()]);
    }

    #[test]
    fn test_configured_language_and_format() {
        let client = Arc::new(CountingRenderer::default());
        let cache = Arc::new(RenderCache::new());
        let mut processor = DiagramProcessor::new(Arc::<CountingRenderer>::clone(&client), cache)
            .with_language(DiagramLanguage::GraphViz)
            .with_format(DiagramFormat::Png);

        assert_eq!(
            processor.process(&block("mermaid", "graph TD", 0)),
            ProcessResult::NotHandled
        );

        let result = processor.process(&block("dot", "digraph { a -> b }", 1));
        let ProcessResult::Handled(html) = result else {
            panic!("dot block should be handled");
        };

        assert!(html.starts_with(r#"<img class="mermaid-image" src="data:image/png;base64,"#));
        assert_eq!(
            client.requests.lock().unwrap().as_slice(),
            [(
                "digraph { a -> b }".to_owned(),
                DiagramLanguage::GraphViz,
                DiagramFormat::Png
            )]
        );
    }

    #[test]
    fn test_empty_block_is_not_sent() {
        let client = Arc::new(CountingRenderer::default());
        let cache = Arc::new(RenderCache::new());
        let mut processor = DiagramProcessor::new(Arc::<CountingRenderer>::clone(&client), Arc::clone(&cache));

        let empty = processor.process(&block("mermaid", "", 0));
        let blank = processor.process(&block("mermaid", "  \n\t\n", 1));

        assert_eq!(empty, ProcessResult::Handled(image_tag(DiagramFormat::Svg, "")));
        assert_eq!(blank, ProcessResult::Handled(image_tag(DiagramFormat::Svg, "")));
        assert_eq!(client.calls(), 0);
        assert!(cache.is_empty());
        assert_eq!(
            processor.warnings(),
            [
                "diagram 0: empty diagram source".to_owned(),
                "diagram 1: empty diagram source".to_owned()
            ]
        );
    }

    #[test]
    fn test_kroki_prefixed_label_is_handled() {
        let client = Arc::new(CountingRenderer::default());
        let cache = Arc::new(RenderCache::new());
        let mut processor = DiagramProcessor::new(Arc::<CountingRenderer>::clone(&client), cache);

        let result = processor.process(&block("kroki-mermaid", "graph TD", 0));

        assert!(matches!(result, ProcessResult::Handled(_)));
        assert_eq!(client.calls(), 1);
    }
}
