//! Configuration management for mdview.
//!
//! Parses `mdview.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `diagrams.kroki_url`
//! - `page.stylesheet_url`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Override the document root (not resolved against the config file).
    pub doc_root: Option<PathBuf>,
    pub kroki_url: Option<String>,
    /// `Some(false)` disables diagram rendering.
    pub diagrams_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdview.toml";

/// Default Kroki server, same as `mdview_diagrams::DEFAULT_KROKI_URL`.
pub const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// Default stylesheet linked from rendered pages, same as
/// `mdview_site::DEFAULT_STYLESHEET_URL`.
pub const DEFAULT_STYLESHEET_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/github-markdown-css/5.2.0/github-markdown-light.min.css";

const MAX_TIMEOUT_SECS: u64 = 300;
const SUPPORTED_FORMATS: &[&str] = &["svg", "png"];

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// Raw docs section; relative paths are resolved into `docs_resolved`.
    docs: DocsConfigRaw,
    pub diagrams: DiagramsConfig,
    pub page: PageConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 18080,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    root: Option<String>,
}

/// Resolved documentation configuration.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Directory that request paths are resolved against.
    pub root: PathBuf,
}

/// Diagram rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Render diagram blocks. When false they stay code blocks.
    pub enabled: bool,
    /// Kroki server URL.
    pub kroki_url: String,
    /// Fence label intercepted as a diagram.
    pub language: String,
    /// Requested image format: `svg` or `png`.
    pub format: String,
    /// Timeout for one Kroki request, in seconds.
    pub timeout_secs: u64,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kroki_url: DEFAULT_KROKI_URL.to_owned(),
            language: "mermaid".to_owned(),
            format: "svg".to_owned(),
            timeout_secs: 10,
        }
    }
}

/// Rendered page configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Stylesheet linked from every page. Empty disables the link.
    pub stylesheet_url: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            stylesheet_url: DEFAULT_STYLESHEET_URL.to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.kroki_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdview.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution, then the
    /// result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// Relative paths are resolved against `base`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml_str(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(doc_root) = &settings.doc_root {
            self.docs_resolved.root.clone_from(doc_root);
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams.kroki_url.clone_from(kroki_url);
        }
        if let Some(enabled) = settings.diagrams_enabled {
            self.diagrams.enabled = enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            docs: DocsConfigRaw::default(),
            diagrams: DiagramsConfig::default(),
            page: PageConfig::default(),
            docs_resolved: DocsConfig {
                root: base.to_path_buf(),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_diagrams()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 would bind a random port nobody knows to open.
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        let diagrams = &self.diagrams;

        require_non_empty(&diagrams.kroki_url, "diagrams.kroki_url")?;
        require_http_url(&diagrams.kroki_url, "diagrams.kroki_url")?;
        require_non_empty(&diagrams.language, "diagrams.language")?;

        if !SUPPORTED_FORMATS.contains(&diagrams.format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "diagrams.format must be one of: {}",
                SUPPORTED_FORMATS.join(", ")
            )));
        }

        if diagrams.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if diagrams.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "diagrams.timeout_secs cannot exceed {MAX_TIMEOUT_SECS}"
            )));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.diagrams.kroki_url = expand::expand_env(&self.diagrams.kroki_url, "diagrams.kroki_url")?;
        self.page.stylesheet_url =
            expand::expand_env(&self.page.stylesheet_url, "page.stylesheet_url")?;
        Ok(())
    }

    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            root: config_dir.join(self.docs.root.as_deref().unwrap_or(".")),
        };
    }
}
