//! Document rendering for mdview.
//!
//! Wires the Markdown renderer and the diagram processor together and wraps
//! the result in a page:
//! - [`DocumentRenderer`]: document bytes to HTML page
//! - [`render_page`]: page shell with title, stylesheet and inline styles

mod document;
mod template;

pub use document::{DocumentError, DocumentRenderer, DocumentRendererConfig};
pub use template::{DEFAULT_STYLESHEET_URL, render_page};
