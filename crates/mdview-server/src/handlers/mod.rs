//! HTTP request handlers.

pub(crate) mod documents;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;

use crate::state::AppState;
use crate::static_files;

/// Route a request by its path: Markdown documents are rendered, anything
/// else is served from the document root as is.
pub(crate) async fn dispatch(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let path = request.uri().path().to_owned();

    if is_document_path(&path) {
        documents::get_document(&state, &path, request.headers())
            .await
            .into_response()
    } else {
        static_files::serve_static(&state.doc_root, request).await
    }
}

/// Whether the decoded request path names a Markdown document.
fn is_document_path(path: &str) -> bool {
    percent_decode_str(path)
        .decode_utf8_lossy()
        .ends_with(".md")
}
