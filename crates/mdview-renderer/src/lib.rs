//! Markdown to HTML rendering with pluggable code block processors.
//!
//! This crate wraps `pulldown-cmark` with a single extension point: fenced
//! code blocks are offered to [`CodeBlockProcessor`]s before the default HTML
//! writer renders them. A processor either handles the block (its HTML is
//! substituted in place) or leaves it to the default renderer.
//!
//! # Example
//!
//! ```
//! use mdview_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new()
//!     .with_title_extraction()
//!     .render_markdown("# Hello\n\n```rust\nfn main() {}\n```\n");
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.html.contains(r#"<code class="language-rust">"#));
//! ```

mod code_block;
mod renderer;
mod util;

pub use code_block::{CodeBlockProcessor, FencedCodeBlock, ProcessResult};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use util::escape_html;
