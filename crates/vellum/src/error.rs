//! CLI error types.

use vellum_cheatsheet::CheatsheetError;
use vellum_config::ConfigError;
use vellum_site::BuildError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Build(#[from] BuildError),

    /// Build error tagged with the stage that raised it.
    #[error("{stage} failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: BuildError,
    },

    #[error("{0}")]
    Cheatsheet(#[from] CheatsheetError),
}
