//! Markdown renderer with a code block hook.
//!
//! The parser's event stream is passed through two adapters before reaching
//! `pulldown-cmark`'s HTML writer:
//!
//! - [`CodeBlockHook`] buffers each fenced code block, offers it to the
//!   registered processors and either substitutes their HTML or replays the
//!   original events unchanged.
//! - [`TitleCapture`] records the text of the first H1 heading.

use std::collections::VecDeque;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::code_block::{CodeBlockProcessor, FencedCodeBlock, ProcessResult, parse_fence_info};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML fragment.
    pub html: String,
    /// Title extracted from first H1 heading (if title extraction was enabled).
    pub title: Option<String>,
    /// Warnings generated by processors during this render.
    pub warnings: Vec<String>,
}

/// Markdown renderer with pluggable code block processors.
///
/// Processors are consulted in registration order; the first returning
/// [`ProcessResult::Handled`] wins. Everything else is rendered by
/// `pulldown-cmark`'s HTML writer.
///
/// # Example
///
/// ```
/// use mdview_renderer::MarkdownRenderer;
///
/// let result = MarkdownRenderer::new()
///     .with_title_extraction()
///     .render_markdown("# Hello\n\n**Bold** text");
///
/// assert_eq!(result.title.as_deref(), Some("Hello"));
/// assert!(result.html.contains("<strong>Bold</strong>"));
/// ```
pub struct MarkdownRenderer {
    processors: Vec<Box<dyn CodeBlockProcessor>>,
    gfm: bool,
    extract_title: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a new renderer with GFM enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
            gfm: true,
            extract_title: false,
        }
    }

    /// Enable title extraction from first H1 heading.
    ///
    /// The heading is still rendered; the title is reported in
    /// [`RenderResult::title`].
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.extract_title = true;
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Alerts (`> [!NOTE]`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Add a code block processor.
    ///
    /// # Example
    ///
    /// ```
    /// use mdview_renderer::{
    ///     CodeBlockProcessor, FencedCodeBlock, MarkdownRenderer, ProcessResult,
    /// };
    ///
    /// struct Hidden;
    ///
    /// impl CodeBlockProcessor for Hidden {
    ///     fn process(&mut self, block: &FencedCodeBlock) -> ProcessResult {
    ///         if block.language == "secret" {
    ///             ProcessResult::Handled("<p>[hidden]</p>".to_owned())
    ///         } else {
    ///             ProcessResult::NotHandled
    ///         }
    ///     }
    /// }
    ///
    /// let result = MarkdownRenderer::new()
    ///     .with_processor(Hidden)
    ///     .render_markdown("```secret\npassword\n```\n");
    ///
    /// assert!(!result.html.contains("password"));
    /// ```
    #[must_use]
    pub fn with_processor<P: CodeBlockProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Create a configured parser for the given markdown text.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str) -> Parser<'a> {
        Parser::new_ext(markdown, self.parser_options())
    }

    /// Render markdown text directly using configured parser options.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        let parser = self.create_parser(markdown);
        self.render(parser)
    }

    /// Get all warnings from all processors.
    pub fn processor_warnings(&self) -> impl Iterator<Item = String> + '_ {
        self.processors.iter().flat_map(|p| p.warnings()).cloned()
    }

    /// Render markdown events and return the result.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        let hooked = CodeBlockHook::new(events, &mut self.processors);
        let mut titled = TitleCapture::new(hooked, self.extract_title);

        let mut html = String::with_capacity(4096);
        pulldown_cmark::html::push_html(&mut html, titled.by_ref());
        let title = titled.into_title();

        RenderResult {
            html,
            title,
            warnings: self.processor_warnings().collect(),
        }
    }
}

/// Iterator adapter presenting fenced code blocks to processors.
struct CodeBlockHook<'a, 'p, I: Iterator<Item = Event<'a>>> {
    events: I,
    processors: &'p mut [Box<dyn CodeBlockProcessor>],
    replay: VecDeque<Event<'a>>,
    next_index: usize,
}

impl<'a, 'p, I: Iterator<Item = Event<'a>>> CodeBlockHook<'a, 'p, I> {
    fn new(events: I, processors: &'p mut [Box<dyn CodeBlockProcessor>]) -> Self {
        Self {
            events,
            processors,
            replay: VecDeque::new(),
            next_index: 0,
        }
    }

    /// Collect a fenced block and offer it to the processors.
    ///
    /// Returns the event to emit next. Unhandled blocks are replayed verbatim.
    fn intercept(&mut self, info: CowStr<'a>) -> Event<'a> {
        let start = Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info.clone())));

        let mut rest = Vec::new();
        let mut source = String::new();
        for event in self.events.by_ref() {
            let is_end = matches!(event, Event::End(TagEnd::CodeBlock));
            if let Event::Text(text) = &event {
                source.push_str(text);
            }
            rest.push(event);
            if is_end {
                break;
            }
        }

        let (language, attrs) = parse_fence_info(&info);
        let block = FencedCodeBlock {
            index: self.next_index,
            language,
            attrs,
            source,
        };
        self.next_index += 1;

        if !block.language.is_empty() {
            for processor in self.processors.iter_mut() {
                if let ProcessResult::Handled(mut html) = processor.process(&block) {
                    html.push('\n');
                    return Event::Html(CowStr::from(html));
                }
            }
        }

        self.replay.extend(rest);
        start
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for CodeBlockHook<'a, '_, I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.replay.pop_front() {
            return Some(event);
        }

        match self.events.next()? {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))
                if !self.processors.is_empty() =>
            {
                Some(self.intercept(info))
            }
            event => Some(event),
        }
    }
}

/// Iterator adapter recording the plain text of the first H1 heading.
struct TitleCapture<I> {
    events: I,
    enabled: bool,
    capturing: bool,
    buffer: String,
    title: Option<String>,
}

impl<I> TitleCapture<I> {
    fn new(events: I, enabled: bool) -> Self {
        Self {
            events,
            enabled,
            capturing: false,
            buffer: String::new(),
            title: None,
        }
    }

    fn into_title(self) -> Option<String> {
        self.title
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for TitleCapture<I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.events.next()?;
        if !self.enabled {
            return Some(event);
        }

        match &event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if self.title.is_none() => {
                self.capturing = true;
            }
            Event::Text(text) | Event::Code(text) if self.capturing => {
                self.buffer.push_str(text);
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if self.capturing => {
                self.capturing = false;
                let title = self.buffer.trim();
                if !title.is_empty() {
                    self.title = Some(title.to_owned());
                }
                self.buffer.clear();
            }
            _ => {}
        }

        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Replaces `upper` blocks with their uppercased source.
    struct UpperProcessor {
        warnings: Vec<String>,
    }

    impl UpperProcessor {
        fn new() -> Self {
            Self {
                warnings: Vec::new(),
            }
        }
    }

    impl CodeBlockProcessor for UpperProcessor {
        fn process(&mut self, block: &FencedCodeBlock) -> ProcessResult {
            if block.language == "upper" {
                self.warnings.push(format!("block {} uppercased", block.index));
                ProcessResult::Handled(format!("<div>{}</div>", block.source.trim().to_uppercase()))
            } else {
                ProcessResult::NotHandled
            }
        }

        fn warnings(&self) -> &[String] {
            &self.warnings
        }
    }

    struct Fixed(&'static str, &'static str);

    impl CodeBlockProcessor for Fixed {
        fn process(&mut self, block: &FencedCodeBlock) -> ProcessResult {
            if block.language == self.0 {
                ProcessResult::Handled(self.1.to_owned())
            } else {
                ProcessResult::NotHandled
            }
        }
    }

    fn plain_html(markdown: &str) -> String {
        let mut html = String::new();
        let renderer = MarkdownRenderer::new();
        pulldown_cmark::html::push_html(&mut html, renderer.create_parser(markdown));
        html
    }

    #[test]
    fn test_render_without_processors_matches_plain_html() {
        let markdown = "# Title\n\n```rust\nfn main() {}\n```\n\nSome *text*.\n";
        let result = MarkdownRenderer::new().render_markdown(markdown);

        assert_eq!(result.html, plain_html(markdown));
        assert!(result.title.is_none());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_handled_block_replaced() {
        let markdown = "# Title\n\n```upper\nhello\n```\n\nSome text.\n";
        let result = MarkdownRenderer::new()
            .with_processor(UpperProcessor::new())
            .render_markdown(markdown);

        assert_eq!(
            result.html,
            "<h1>Title</h1>\n<div>HELLO</div>\n<p>Some text.</p>\n"
        );
        assert_eq!(result.warnings, vec!["block 0 uppercased".to_owned()]);
    }

    #[test]
    fn test_unhandled_block_rendered_verbatim() {
        let markdown = "```rust\nfn main() {\n    println!(\"<hi>\");\n}\n```\n";
        let result = MarkdownRenderer::new()
            .with_processor(UpperProcessor::new())
            .render_markdown(markdown);

        assert_eq!(result.html, plain_html(markdown));
        assert!(result.html.contains(r#"<code class="language-rust">"#));
        assert!(result.html.contains("&lt;hi&gt;"));
    }

    #[test]
    fn test_blocks_substituted_in_document_order() {
        let markdown = "```upper\none\n```\n\ntext\n\n```rust\nlet x = 1;\n```\n\n```upper\ntwo\n```\n";
        let result = MarkdownRenderer::new()
            .with_processor(UpperProcessor::new())
            .render_markdown(markdown);

        let one = result.html.find("<div>ONE</div>").unwrap();
        let code = result.html.find("let x = 1;").unwrap();
        let two = result.html.find("<div>TWO</div>").unwrap();
        assert!(one < code && code < two);
    }

    #[test]
    fn test_processor_receives_literal_source_and_attrs() {
        use std::sync::{Arc, Mutex};

        struct Recorder(Arc<Mutex<Vec<FencedCodeBlock>>>);

        impl CodeBlockProcessor for Recorder {
            fn process(&mut self, block: &FencedCodeBlock) -> ProcessResult {
                self.0.lock().unwrap().push(block.clone());
                ProcessResult::NotHandled
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let markdown = "```mermaid format=png\nA --> B \n```\n\n```python\nb = 1\n```\n";
        MarkdownRenderer::new()
            .with_processor(Recorder(Arc::clone(&seen)))
            .render_markdown(markdown);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].index, 0);
        assert_eq!(seen[0].language, "mermaid");
        assert_eq!(seen[0].source, "A --> B \n");
        assert_eq!(seen[0].attrs.get("format"), Some(&"png".to_owned()));
        assert_eq!(seen[1].index, 1);
        assert_eq!(seen[1].language, "python");
    }

    #[test]
    fn test_first_handling_processor_wins() {
        let result = MarkdownRenderer::new()
            .with_processor(Fixed("x", "<p>first</p>"))
            .with_processor(Fixed("x", "<p>second</p>"))
            .render_markdown("```x\n\n```\n");

        assert!(result.html.contains("first"));
        assert!(!result.html.contains("second"));
    }

    #[test]
    fn test_later_processor_consulted_after_not_handled() {
        let result = MarkdownRenderer::new()
            .with_processor(Fixed("a", "<p>A</p>"))
            .with_processor(Fixed("b", "<p>B</p>"))
            .render_markdown("```b\nsource\n```\n");

        assert_eq!(result.html, "<p>B</p>\n");
    }

    #[test]
    fn test_indented_and_unlabelled_blocks_pass_through() {
        let markdown = "    indented code\n\n```\nno language\n```\n";
        let result = MarkdownRenderer::new()
            .with_processor(Fixed("", "<p>never</p>"))
            .render_markdown(markdown);

        assert_eq!(result.html, plain_html(markdown));
    }

    #[test]
    fn test_nested_block_in_list() {
        let markdown = "- item\n\n  ```upper\n  nested\n  ```\n";
        let result = MarkdownRenderer::new()
            .with_processor(UpperProcessor::new())
            .render_markdown(markdown);

        assert!(result.html.contains("<div>NESTED</div>"));
        assert!(result.html.contains("<li>"));
    }

    #[test]
    fn test_title_extraction() {
        let result = MarkdownRenderer::new()
            .with_title_extraction()
            .render_markdown("Intro\n\n# The `mdview` Guide\n\n# Second\n");

        assert_eq!(result.title.as_deref(), Some("The mdview Guide"));
        assert!(result.html.contains("<h1>Second</h1>"));
    }

    #[test]
    fn test_title_extraction_ignores_lower_headings() {
        let result = MarkdownRenderer::new()
            .with_title_extraction()
            .render_markdown("## Not a title\n\ntext\n");

        assert!(result.title.is_none());
    }

    #[test]
    fn test_gfm_tables() {
        let markdown = "| a | b |\n|---|---|\n| 1 | 2 |\n";

        let gfm = MarkdownRenderer::new().render_markdown(markdown);
        assert!(gfm.html.contains("<table>"));

        let plain = MarkdownRenderer::new().with_gfm(false).render_markdown(markdown);
        assert!(!plain.html.contains("<table>"));
    }
}
