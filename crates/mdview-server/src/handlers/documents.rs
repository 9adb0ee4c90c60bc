//! Markdown document endpoint.
//!
//! Reads a `*.md` file under the document root, renders it on a blocking
//! thread and returns the HTML page.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use md5::{Digest, Md5};
use mdview_diagrams::CancelFlag;
use percent_encoding::percent_decode_str;

use crate::error::ServerError;
use crate::state::AppState;

/// Render the document named by the request path.
///
/// Dropping the returned future (client disconnect) cancels remote diagram
/// calls that have not started yet.
pub(crate) async fn get_document(
    state: &Arc<AppState>,
    request_path: &str,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let relative = resolve_document_path(request_path)
        .ok_or_else(|| ServerError::NotFound(request_path.to_owned()))?;
    let file_path = state.doc_root.join(&relative);

    tracing::info!(path = %file_path.display(), "Requested document");

    let document = tokio::fs::read(&file_path).await.map_err(|e| {
        tracing::debug!(path = %file_path.display(), error = %e, "Failed to read document");
        ServerError::NotFound(request_path.to_owned())
    })?;

    let cancel = CancelFlag::new();
    let guard = cancel.cancel_on_drop();
    let renderer = Arc::clone(&state.renderer);
    let page =
        tokio::task::spawn_blocking(move || renderer.render_cancellable(&document, &cancel))
            .await??;
    guard.disarm();

    let etag = compute_etag(&state.version, &page);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_owned()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        page,
    )
        .into_response())
}

/// Map a URL path to a relative file path under the document root.
///
/// The path is percent-decoded. Returns `None` for paths that would leave
/// the root (`..`, absolute or prefixed components) or name nothing.
fn resolve_document_path(request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;

    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment.contains('\\') || segment.contains('\0') {
            return None;
        }
        for component in Path::new(segment).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
    }

    (!relative.as_os_str().is_empty()).then_some(relative)
}

/// Compute `ETag` from version and content.
///
/// MD5 truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
