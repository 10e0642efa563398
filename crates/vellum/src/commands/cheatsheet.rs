//! `vellum cheatsheet` command implementation.

use std::path::PathBuf;

use clap::Args;
use vellum_cheatsheet::{CheatsheetOptions, build_cheatsheet};
use vellum_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the cheatsheet command.
#[derive(Args)]
pub(crate) struct CheatsheetArgs {
    /// Output directory (the PDF lands in its `_static` folder).
    #[arg(short, long)]
    pub(crate) output_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover vellum.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
}

impl CheatsheetArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.output_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let Some(options) = CheatsheetOptions::from_theme(&config.theme)? else {
            output.warning("No [theme.cheatsheet] table in the configuration");
            return Ok(());
        };
        let docs = &config.docs_resolved;
        match build_cheatsheet(&options, &docs.source_dir, &docs.output_dir)? {
            Some(built) => {
                output.cheatsheet_built(&docs.output_dir.join(&built.pdf), &docs.output_dir.join(&built.thumbnail));
            }
            None => output.warning("No cheat sheet file configured"),
        }
        Ok(())
    }
}
