//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use mdview_site::DocumentRenderer;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Renderer holding the diagram client and the shared render cache.
    pub(crate) renderer: Arc<DocumentRenderer>,
    /// Directory that request paths are resolved against.
    pub(crate) doc_root: PathBuf,
    /// Application version for `ETag` computation.
    pub(crate) version: String,
}
