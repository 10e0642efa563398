//! Page templates from the theme bundle.

use minijinja::Environment;
use serde::Serialize;

use crate::BuildError;

/// Templates loaded from the theme.
pub const TEMPLATE_NAMES: [&str; 3] = ["layout.html", "page.html", "404.html"];

/// Template sources, compiled on demand into a [`minijinja`] environment.
///
/// Auto-escaping is on for every template (all names end in `.html`).
#[derive(Debug)]
pub struct Templates {
    sources: Vec<(&'static str, String)>,
}

impl Templates {
    /// Load the theme's templates.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Asset` if a template is missing from the theme.
    pub fn load() -> Result<Self, BuildError> {
        let sources = TEMPLATE_NAMES
            .iter()
            .map(|&name| -> Result<_, BuildError> { Ok((name, vellum_assets::template(name)?)) })
            .collect::<Result<_, _>>()?;
        Ok(Self { sources })
    }

    /// Templates from explicit sources.
    pub fn from_sources(sources: Vec<(&'static str, String)>) -> Self {
        Self { sources }
    }

    /// Compile all templates.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Template` on a syntax error.
    pub fn environment(&self) -> Result<Environment<'_>, BuildError> {
        let mut env = Environment::new();
        for (name, source) in &self.sources {
            env.add_template(name, source)?;
        }
        Ok(env)
    }
}

/// Render `name` with `context`.
///
/// # Errors
///
/// Returns `BuildError::Template` if the template is unknown or fails.
pub fn render<S: Serialize>(env: &Environment<'_>, name: &str, context: &S) -> Result<String, BuildError> {
    Ok(env.get_template(name)?.render(context)?)
}
