//! `mdview render` command implementation.
//!
//! Renders a single Markdown file to a standalone HTML page, using the same
//! pipeline as the server.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use mdview_config::{CliSettings, Config};
use mdview_server::{document_renderer, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    file: PathBuf,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kroki server URL for diagram rendering (overrides config).
    #[arg(long, env = "MDVIEW_KROKI_URL")]
    kroki_url: Option<String>,

    /// Leave diagram blocks as plain code.
    #[arg(long)]
    no_diagrams: bool,

    /// Enable verbose output (diagram logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the file cannot be read or
    /// the output cannot be written.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let settings = CliSettings {
            kroki_url: self.kroki_url.clone(),
            diagrams_enabled: self.no_diagrams.then_some(false),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        let html = render_file(&config, &self.file, version)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html)?;
                Output::new().success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}

fn render_file(config: &Config, file: &Path, version: &str) -> Result<String, CliError> {
    let server_config = server_config_from_config(config, version.to_owned())?;
    let renderer = document_renderer(&server_config);

    let source = std::fs::read(file)?;
    let html = renderer.render(&source)?;
    tracing::debug!(file = %file.display(), bytes = html.len(), "Rendered document");

    Ok(html)
}
