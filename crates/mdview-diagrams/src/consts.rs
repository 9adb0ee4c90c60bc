//! Internal constants for diagram rendering.

use std::time::Duration;

/// Public Kroki instance used when no server is configured.
pub const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// Default HTTP timeout for Kroki requests (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// CSS class applied to every embedded diagram image.
pub const IMAGE_CLASS: &str = "mermaid-image";
