//! `mdview serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdview_config::{CliSettings, Config};
use mdview_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover mdview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve documents from (overrides config).
    #[arg(short, long, env = "MDVIEW_DOC_ROOT")]
    doc_root: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long, env = "MDVIEW_PORT")]
    port: Option<u16>,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long, env = "MDVIEW_KROKI_URL")]
    kroki_url: Option<String>,

    /// Leave diagram blocks as plain code.
    #[arg(long)]
    no_diagrams: bool,

    /// Enable verbose output (request and diagram logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            doc_root: self.doc_root.clone(),
            kroki_url: self.kroki_url.clone(),
            diagrams_enabled: self.no_diagrams.then_some(false),
        }
    }

    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        output.info(&format!(
            "Serving {} on http://{}:{}",
            config.docs_resolved.root.display(),
            config.server.host,
            config.server.port
        ));
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }
        if config.diagrams.enabled {
            output.info(&format!(
                "Diagrams: {} as {} via {}",
                config.diagrams.language, config.diagrams.format, config.diagrams.kroki_url
            ));
        } else {
            output.warning("Diagrams: disabled");
        }

        let server_config = server_config_from_config(&config, version.to_owned())?;
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
