//! `vellum build` command implementation.

use std::path::PathBuf;

use clap::Args;
use vellum_config::{CliSettings, Config};
use vellum_site::BuildContext;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Output directory for the generated site (default: <source>/_build/html).
    #[arg(short, long)]
    pub(crate) output_dir: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    pub(crate) source_dir: Option<PathBuf>,

    /// Project version (overrides config).
    #[arg(long, env = "VELLUM_VERSION")]
    pub(crate) project_version: Option<String>,

    /// Path to configuration file (default: auto-discover vellum.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            version: self.project_version,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(config = ?config.config_path, "Starting build");

        output.setting("Source", &config.docs_resolved.source_dir);
        output.setting("Output", &config.docs_resolved.output_dir);

        let mut current = None;
        let report = vellum_site::build_observed(BuildContext::new(config), |stage| {
            output.stage(stage);
            current = Some(stage);
        })
        .map_err(|source| match current {
            Some(stage) => CliError::Stage { stage, source },
            None => CliError::Build(source),
        })?;

        output.build_finished(&report);
        Ok(())
    }
}
