//! Vellum CLI - documentation theme build engine.
//!
//! Provides commands for:
//! - `build`: Build the static documentation site
//! - `cheatsheet`: Build only the cheat sheet PDF and thumbnail

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CheatsheetArgs};
use output::Output;

/// Vellum - documentation theme build engine.
#[derive(Parser)]
#[command(name = "vellum", version, about)]
struct Cli {
    /// Enable info-level logging (otherwise `RUST_LOG` applies).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the documentation site.
    Build(BuildArgs),
    /// Build the cheat sheet.
    Cheatsheet(CheatsheetArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Cheatsheet(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_parse_build_args() {
        let cli = Cli::try_parse_from([
            "vellum",
            "build",
            "--config",
            "docs/vellum.toml",
            "-o",
            "site",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.config, Some(PathBuf::from("docs/vellum.toml")));
        assert_eq!(args.output_dir, Some(PathBuf::from("site")));
        assert_eq!(args.source_dir, None);
    }

    #[test]
    fn test_parse_cheatsheet_args() {
        let cli = Cli::try_parse_from(["vellum", "cheatsheet"]).unwrap();
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Cheatsheet(_)));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["vellum"]).is_err());
    }
}
