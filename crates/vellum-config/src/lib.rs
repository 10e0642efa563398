//! Configuration management for Vellum.
//!
//! Parses `vellum.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `project.version`
//! - `html_context.github_user`
//! - `html_context.github_repo`
//! - `html_context.github_version`
//! - `link_code.library`
//! - `link_code.branch`
//! - `theme.github_url`
//! - `theme.switcher.json_url`

mod expand;
mod theme;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use theme::{SWITCHER_NAVBAR_END, SwitcherOptions, ThemeOptions, search_index_version, version_match};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override project version.
    pub version: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "vellum.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project metadata.
    pub project: ProjectConfig,
    /// Documentation paths (relative strings from TOML).
    docs: DocsConfigRaw,
    /// Repository context for "edit this page" links.
    pub html_context: HtmlContext,
    /// Link-to-source settings (optional section).
    pub link_code: Option<LinkCodeConfig>,
    /// Theme options.
    pub theme: ThemeOptions,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Project metadata.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name (package name on GitHub issues links).
    pub name: String,
    /// HTML title; defaults to the project name.
    pub title: Option<String>,
    /// Release being documented.
    pub version: String,
    pub author: Option<String>,
    pub copyright: Option<String>,
}

impl ProjectConfig {
    /// Title shown in page headers.
    pub fn html_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    master_doc: Option<String>,
    exclude: Vec<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Source directory for Markdown files.
    pub source_dir: PathBuf,
    /// Output directory for the rendered site.
    pub output_dir: PathBuf,
    /// Root document name.
    pub master_doc: String,
    /// Glob patterns (relative to the source directory) of files to skip.
    pub exclude: Vec<String>,
}

impl DocsConfig {
    /// Static files directory inside the output directory.
    #[must_use]
    pub fn static_dir(&self) -> PathBuf {
        self.output_dir.join("_static")
    }
}

/// Repository context injected into page templates.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HtmlContext {
    pub github_user: String,
    pub github_repo: String,
    /// Branch used in generated GitHub links.
    pub github_version: String,
    /// Path of the docs source directory inside the repository.
    pub doc_path: String,
    /// Path of the package sources inside the repository.
    pub source_path: String,
}

impl HtmlContext {
    /// `{user}/{repo}` when both are set.
    pub fn library(&self) -> Option<String> {
        if self.github_user.is_empty() || self.github_repo.is_empty() {
            None
        } else {
            Some(format!("{}/{}", self.github_user, self.github_repo))
        }
    }
}

/// Link-to-source configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LinkCodeConfig {
    /// `{user}/{repo}` on GitHub.
    pub library: Option<String>,
    /// Package source directory inside the repository.
    pub source: Option<String>,
    /// Branch to link to.
    pub branch: Option<String>,
    /// Local directory containing the package sources.
    pub source_root: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Feature table does not match its expected shape.
    #[error("Invalid {section}: {source}")]
    Section {
        section: String,
        #[source]
        source: toml::de::Error,
    },
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Option that is no longer supported.
    #[error("{option} is no longer supported, use {replacement} instead")]
    Deprecated { option: String, replacement: String },
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`theme.github_url`").
        field: String,
        /// Error message (e.g., "${`DOCS_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
pub(crate) fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
pub(crate) fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `vellum.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            tracing::debug!("no {CONFIG_FILENAME} found, using defaults");
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from TOML text, resolving paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.docs_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(version) = &settings.version {
            self.project.version.clone_from(version);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            project: ProjectConfig::default(),
            docs: DocsConfigRaw::default(),
            html_context: HtmlContext::default(),
            link_code: None,
            theme: ThemeOptions::default(),
            docs_resolved: DocsConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` or `ConfigError::Deprecated` if any
    /// check fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.docs_resolved.master_doc, "docs.master_doc")?;
        if let Some(link_code) = &self.link_code
            && let Some(library) = &link_code.library
            && library.split('/').filter(|part| !part.is_empty()).count() != 2
        {
            return Err(ConfigError::Validation(
                "link_code.library must be of the form user/repo".to_owned(),
            ));
        }
        self.theme.validate()
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.project.version = expand::expand_env(&self.project.version, "project.version")?;

        let context = &mut self.html_context;
        context.github_user = expand::expand_env(&context.github_user, "html_context.github_user")?;
        context.github_repo = expand::expand_env(&context.github_repo, "html_context.github_repo")?;
        context.github_version =
            expand::expand_env(&context.github_version, "html_context.github_version")?;

        if let Some(ref mut link_code) = self.link_code {
            expand::expand_opt(&mut link_code.library, "link_code.library")?;
            expand::expand_opt(&mut link_code.branch, "link_code.branch")?;
        }

        expand::expand_opt(&mut self.theme.github_url, "theme.github_url")?;
        if let Some(ref mut switcher) = self.theme.switcher {
            switcher.json_url = expand::expand_env(&switcher.json_url, "theme.switcher.json_url")?;
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));
        let source_dir = resolve(self.docs.source_dir.as_deref(), "docs");
        let output_dir = match self.docs.output_dir.as_deref() {
            Some(dir) => config_dir.join(dir),
            None => source_dir.join("_build").join("html"),
        };

        self.docs_resolved = DocsConfig {
            source_dir,
            output_dir,
            master_doc: self.docs.master_doc.clone().unwrap_or_else(|| "index".to_owned()),
            exclude: self.docs.exclude.clone(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(
            config.docs_resolved.output_dir,
            PathBuf::from("/test/docs/_build/html")
        );
        assert_eq!(
            config.docs_resolved.static_dir(),
            PathBuf::from("/test/docs/_build/html/_static")
        );
        assert_eq!(config.docs_resolved.master_doc, "index");
        assert!(config.link_code.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_toml("", Path::new("/p")).unwrap();
        assert_eq!(config.project.name, "");
        assert!(!config.theme.use_edit_page_button);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[project]
name = "ansys-sphinx-theme"
title = "Ansys Sphinx Theme"
version = "1.2.3"

[docs]
source_dir = "doc/source"
output_dir = "build/html"
exclude = ["links.md"]

[html_context]
github_user = "ansys"
github_repo = "ansys-sphinx-theme"
github_version = "main"
doc_path = "doc/source"

[link_code]
source = "src"

[theme]
github_url = "https://github.com/ansys/ansys-sphinx-theme"
use_edit_page_button = true
additional_breadcrumbs = [["PyAnsys", "https://docs.pyansys.com/"]]

[theme.static_search]
threshold = 0.5
"#;
        let config = Config::from_toml(toml, Path::new("/project")).unwrap();
        assert_eq!(config.project.html_title(), "Ansys Sphinx Theme");
        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/doc/source")
        );
        assert_eq!(
            config.docs_resolved.output_dir,
            PathBuf::from("/project/build/html")
        );
        assert_eq!(config.docs_resolved.exclude, vec!["links.md".to_owned()]);
        assert_eq!(
            config.html_context.library(),
            Some("ansys/ansys-sphinx-theme".to_owned())
        );
        assert_eq!(
            config.theme.additional_breadcrumbs,
            vec![("PyAnsys".to_owned(), "https://docs.pyansys.com/".to_owned())]
        );
        assert!(config.theme.section("static_search").is_some());
    }

    #[test]
    fn test_html_title_falls_back_to_name() {
        let project = ProjectConfig {
            name: "demo".to_owned(),
            ..ProjectConfig::default()
        };
        assert_eq!(project.html_title(), "demo");
    }

    #[test]
    fn test_invalid_github_url() {
        let err = Config::from_toml("[theme]\ngithub_url = \"github.com/x\"\n", Path::new("/p")).unwrap_err();
        assert!(err.to_string().contains("theme.github_url"));
    }

    #[test]
    fn test_invalid_link_code_library() {
        let err = Config::from_toml("[link_code]\nlibrary = \"just-a-name\"\n", Path::new("/p")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_deprecated_option_fails_load() {
        let err = Config::from_toml("[theme.use_meilisearch]\napi_key = \"\"\n", Path::new("/p")).unwrap_err();
        assert!(matches!(err, ConfigError::Deprecated { .. }));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/vellum.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_with_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[project]\nname = \"demo\"\nversion = \"0.1.0\"\n").unwrap();

        let settings = CliSettings {
            output_dir: Some(PathBuf::from("/out")),
            version: Some("0.2.0".to_owned()),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.project.name, "demo");
        assert_eq!(config.project.version, "0.2.0");
        assert_eq!(config.docs_resolved.output_dir, PathBuf::from("/out"));
        assert_eq!(config.docs_resolved.source_dir, dir.path().join("docs"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_parse_error() {
        let err = Config::from_toml("[project\n", Path::new("/p")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
