//! Static file serving.
//!
//! Non-document paths are served from the document root with `tower-http`'s
//! `ServeDir`. Responses are marked uncacheable so that edits show up on
//! reload instead of being answered with `304` from the browser cache.

use std::path::Path;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderValue, header};
use axum::response::Response;
use tower::ServiceExt;
use tower_http::services::ServeDir;

const NO_STORE: &str = "no-cache, no-store, must-revalidate";

/// Serve a file from `root`.
pub(crate) async fn serve_static(root: &Path, request: Request) -> Response {
    let response = ServeDir::new(root)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});

    let mut response = response.map(Body::new);
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    response
}
