//! GitHub source URLs for documented objects.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use vellum_config::Config;

use crate::LinkcodeError;
use crate::locator::{PythonSourceLocator, SourceLocator};

/// Branch linked to when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Repository coordinates used in source links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkcodeSettings {
    /// `{user}/{repo}` on GitHub.
    pub library: String,
    /// Package source directory inside the repository (e.g. `src`).
    pub source: String,
    pub branch: String,
    /// Local directory the locator scans for modules.
    pub source_root: PathBuf,
}

impl LinkcodeSettings {
    /// Settings from `[link_code]`, falling back to `[html_context]`.
    ///
    /// `source_root` is resolved against the config file's directory and
    /// defaults to the `source` directory there.
    ///
    /// # Errors
    ///
    /// Returns `LinkcodeError::MissingLibrary` if neither `link_code.library`
    /// nor `html_context.github_user`/`github_repo` are set.
    pub fn from_config(config: &Config) -> Result<Self, LinkcodeError> {
        let link_code = config.link_code.clone().unwrap_or_default();
        let context = &config.html_context;

        let library = link_code
            .library
            .filter(|l| !l.is_empty())
            .or_else(|| context.library())
            .ok_or(LinkcodeError::MissingLibrary)?;
        let source = link_code
            .source
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| context.source_path.clone());
        let branch = link_code
            .branch
            .filter(|b| !b.is_empty())
            .or_else(|| Some(context.github_version.clone()).filter(|v| !v.is_empty()))
            .unwrap_or_else(|| DEFAULT_BRANCH.to_owned());

        let base = config
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .or_else(|| config.docs_resolved.source_dir.parent())
            .unwrap_or_else(|| Path::new("."));
        let source_root = match link_code.source_root {
            Some(root) => base.join(root),
            None => base.join(&source),
        };

        Ok(Self {
            library,
            source,
            branch,
            source_root,
        })
    }
}

/// Resolves documented objects to GitHub URLs.
pub struct LinkcodeResolver {
    settings: LinkcodeSettings,
    locator: Box<dyn SourceLocator>,
}

impl LinkcodeResolver {
    /// Resolver scanning Python sources under `settings.source_root`.
    #[must_use]
    pub fn new(settings: LinkcodeSettings) -> Self {
        let locator = PythonSourceLocator::new(settings.source_root.clone());
        Self::with_locator(settings, Box::new(locator))
    }

    #[must_use]
    pub fn with_locator(settings: LinkcodeSettings, locator: Box<dyn SourceLocator>) -> Self {
        Self { settings, locator }
    }

    pub fn settings(&self) -> &LinkcodeSettings {
        &self.settings
    }

    /// URL of an object's source, or `None` if it cannot be located.
    ///
    /// Only the `py` domain is resolvable. In view mode the URL carries the
    /// line range; in edit mode it opens the GitHub editor.
    pub fn resolve(&self, domain: &str, info: &BTreeMap<String, String>, edit: bool) -> Option<String> {
        if domain != "py" {
            return None;
        }
        let module = info.get("module").map_or("", String::as_str);
        let fullname = info.get("fullname").map_or("", String::as_str);
        if module.is_empty() || fullname.is_empty() {
            return None;
        }
        let fullname = fullname
            .strip_prefix(module)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(fullname);

        let Some(span) = self.locator.locate(module, fullname) else {
            tracing::debug!(module, fullname, "Source not found");
            return None;
        };
        let path = repository_path(&span.file, module, &self.settings.source)?;

        let mode = if edit { "edit" } else { "blob" };
        let linespec = if edit {
            String::new()
        } else {
            format!("#L{}-L{}", span.start_line, span.end_line)
        };
        Some(format!(
            "https://github.com/{}/{mode}/{}/{path}{linespec}",
            self.settings.library, self.settings.branch
        ))
    }
}

/// Repository-relative path of a located file.
///
/// The path starts at the `source` directory when it is part of the file
/// path, otherwise at the top-level package with `source` put before it.
fn repository_path(file: &str, module: &str, source: &str) -> Option<String> {
    let mut components: Vec<&str> = file.split('/').filter(|c| !c.is_empty() && *c != ".").collect();
    let package = module.split('.').next().unwrap_or(module);

    let anchor = if source.is_empty() {
        components.iter().position(|c| *c == package)?
    } else if let Some(idx) = components.iter().position(|c| *c == source) {
        idx
    } else {
        let idx = components.iter().position(|c| *c == package)?;
        components.insert(idx, source);
        idx
    };
    Some(components[anchor..].join("/"))
}
