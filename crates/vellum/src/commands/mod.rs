//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod cheatsheet;

pub(crate) use build::BuildArgs;
pub(crate) use cheatsheet::CheatsheetArgs;
