//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// Every path goes through one fallback handler: the request path, not a
/// route pattern, decides between document rendering and static files.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let stylesheet_url = state.renderer.config().stylesheet_url.clone();

    Router::new()
        .fallback(handlers::dispatch)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer(&stylesheet_url))
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
