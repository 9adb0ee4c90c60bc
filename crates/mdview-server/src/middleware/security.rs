//! Security headers middleware.
//!
//! Adds security headers to all responses:
//! - Content-Security-Policy
//! - X-Content-Type-Options
//! - X-Frame-Options

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;
use url::Url;

/// Build the Content-Security-Policy value.
///
/// Diagrams are `data:` images and the page carries an inline `<style>`.
/// The origin of the configured stylesheet, if any, is allowed for styles
/// and the fonts it references.
fn csp(stylesheet_origin: Option<&str>) -> String {
    let extra = stylesheet_origin.map(|o| format!(" {o}")).unwrap_or_default();
    format!(
        "default-src 'self'; \
         script-src 'self'; \
         style-src 'self' 'unsafe-inline'{extra}; \
         font-src 'self' data:{extra}; \
         img-src 'self' data:; \
         frame-ancestors 'none'"
    )
}

/// Serialized origin (`scheme://host[:port]`) of an http(s) URL.
fn origin_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(|u| u.origin().ascii_serialization())
}

/// Create layer that adds Content-Security-Policy header.
pub(crate) fn csp_layer(stylesheet_url: &str) -> SetResponseHeaderLayer<HeaderValue> {
    let value = HeaderValue::from_str(&csp(origin_of(stylesheet_url).as_deref()))
        .unwrap_or_else(|_| HeaderValue::from_static("default-src 'self'; img-src 'self' data:"));

    SetResponseHeaderLayer::overriding(HeaderName::from_static("content-security-policy"), value)
}

/// Create layer that adds X-Content-Type-Options header.
pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}

/// Create layer that adds X-Frame-Options header.
pub(crate) fn frame_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    )
}
