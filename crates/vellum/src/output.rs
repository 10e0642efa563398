//! Build progress and summaries on the terminal.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};
use vellum_site::BuildReport;

/// Terminal reporter for `vellum` commands, writing to stderr.
pub(crate) struct Output {
    term: Term,
    label: Style,
    stage: Style,
    done: Style,
    warn: Style,
    fail: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().bold(),
            stage: Style::new().cyan(),
            done: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red(),
        }
    }

    fn line(&self, line: impl Display) {
        let _ = self.term.write_line(&line.to_string());
    }

    /// `Source  /path` style setting line.
    pub(crate) fn setting(&self, label: &str, value: &Path) {
        self.line(format_args!("{} {}", self.label.apply_to(format!("{label:<7}")), value.display()));
    }

    /// A pipeline stage has started.
    pub(crate) fn stage(&self, name: &str) {
        self.line(format_args!("  {} {name}", self.stage.apply_to("→")));
    }

    pub(crate) fn build_finished(&self, report: &BuildReport) {
        self.line(self.done.apply_to(build_summary(report)));
    }

    pub(crate) fn cheatsheet_built(&self, pdf: &Path, thumbnail: &Path) {
        self.line(self.done.apply_to(format!("Cheat sheet: {}", pdf.display())));
        self.setting("Preview", thumbnail);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(self.warn.apply_to(msg));
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(self.fail.apply_to(msg));
    }
}

/// One-line summary of a finished build.
pub(crate) fn build_summary(report: &BuildReport) -> String {
    format!(
        "Built {} to {} ({})",
        counted(report.pages, "page", "pages"),
        report.output_dir.display(),
        counted(report.search_records, "search record", "search records")
    )
}

fn counted(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}
