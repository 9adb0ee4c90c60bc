//! Diagram rendering via Kroki for mdview.
//!
//! Fenced blocks in the designated diagram language are rendered by a
//! remote Kroki service and embedded as base64 `data:` images:
//! - [`DiagramProcessor`] implements `CodeBlockProcessor` and performs the
//!   lookup, render and substitution for each block
//! - [`RenderCache`] maps a [`Fingerprint`] of the block source to the
//!   encoded image, so each distinct diagram is rendered once per process
//! - [`KrokiClient`] is the HTTP implementation of [`DiagramRenderer`]
//! - [`CancelFlag`] lets a dropped request stop further remote calls
//!
//! Failed renders never fail the document: the block becomes an image with
//! an empty payload and a warning is logged.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use mdview_diagrams::{
//!     DiagramProcessor, DiagramRenderer, DiagramRequest, RenderCache, RenderError,
//! };
//! use mdview_renderer::MarkdownRenderer;
//!
//! struct Fixed;
//!
//! impl DiagramRenderer for Fixed {
//!     fn render(&self, _request: &DiagramRequest<'_>) -> Result<Vec<u8>, RenderError> {
//!         Ok(b"<svg/>".to_vec())
//!     }
//! }
//!
//! let cache = Arc::new(RenderCache::new());
//! let mut renderer = MarkdownRenderer::new()
//!     .with_processor(DiagramProcessor::new(Arc::new(Fixed), Arc::clone(&cache)));
//!
//! let result = renderer.render_markdown("```mermaid\nA --> B\n```\n");
//!
//! assert!(result.html.contains("data:image/svg+xml;base64,PHN2Zy8+"));
//! assert_eq!(cache.len(), 1);
//! ```

mod cache;
mod cancel;
mod consts;
mod fingerprint;
mod kroki;
mod language;
mod processor;

pub use cache::RenderCache;
pub use cancel::{CancelFlag, CancelOnDrop};
pub use consts::{DEFAULT_KROKI_URL, DEFAULT_TIMEOUT, IMAGE_CLASS};
pub use fingerprint::Fingerprint;
pub use kroki::{DiagramRenderer, DiagramRequest, KrokiClient, RenderError, create_agent};
pub use language::{DiagramFormat, DiagramLanguage};
pub use processor::{DiagramProcessor, image_tag};
