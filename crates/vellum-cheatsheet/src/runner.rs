//! External tool invocation.

use std::path::Path;
use std::process::Command;

use crate::CheatsheetError;

/// Runs external programs.
pub trait ToolRunner {
    /// Run `program` with `args` in `cwd` and wait for it.
    ///
    /// # Errors
    ///
    /// Returns `CheatsheetError::Spawn` if the program cannot be started and
    /// `CheatsheetError::CommandFailed` on a non-zero exit.
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<(), CheatsheetError>;
}

/// Runs programs as child processes, logging their output.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<(), CheatsheetError> {
        let command = command_line(program, args);
        tracing::debug!(command = %command, cwd = %cwd.display(), "Running");

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|source| CheatsheetError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(CheatsheetError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: stderr.trim().to_owned(),
            });
        }
        // Quarto reports progress on stderr.
        for stream in [stdout.trim(), stderr.trim()] {
            if !stream.is_empty() {
                tracing::info!(command = %command, "{stream}");
            }
        }
        Ok(())
    }
}

/// `quarto` subcommands run from the cheat sheet's directory.
pub struct QuartoRunner<'a, R: ToolRunner + ?Sized> {
    runner: &'a R,
    cwd: &'a Path,
}

impl<'a, R: ToolRunner + ?Sized> QuartoRunner<'a, R> {
    pub fn new(runner: &'a R, cwd: &'a Path) -> Self {
        Self { runner, cwd }
    }

    /// Run `quarto <args>`.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying runner.
    pub fn run<I, S>(&self, args: I) -> Result<(), CheatsheetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.runner.run("quarto", &args, self.cwd)
    }
}

fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_command_line() {
        assert_eq!(
            command_line("quarto", &["add".to_owned(), "--no-prompt".to_owned()]),
            "quarto add --no-prompt"
        );
    }

    #[test]
    fn test_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let err = ProcessRunner
            .run("vellum-no-such-program", &[], dir.path())
            .unwrap_err();
        assert!(matches!(err, CheatsheetError::Spawn { ref command, .. } if command == "vellum-no-such-program"));
    }
}
