//! Theme assets for Vellum sites.
//!
//! Provides a single API for the theme's static files and page templates in
//! both embedded and filesystem modes:
//!
//! - **`embed` feature on**: assets are compiled into the binary via `rust-embed`
//! - **`embed` feature off**: assets are read from the crate's `theme/` directory

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Embedded theme assets (only available with `embed` feature).
#[cfg(feature = "embed")]
#[derive(rust_embed::RustEmbed)]
#[folder = "theme"]
#[prefix = ""]
struct Assets;

/// Theme directory for filesystem-based assets.
#[cfg(not(feature = "embed"))]
const THEME_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/theme");

/// Prefix of files copied to the output's `_static` directory.
pub const STATIC_PREFIX: &str = "static/";
/// Prefix of page templates.
pub const TEMPLATE_PREFIX: &str = "templates/";
/// Main stylesheet; a theme without it cannot style any page.
pub const MAIN_STYLESHEET: &str = "static/css/vellum.css";

/// Asset error.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Theme stylesheet {0} is missing")]
    MissingStylesheet(String),
    #[error("Theme template {0} is missing")]
    MissingTemplate(String),
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Get a theme asset by path (relative to `theme/`).
///
/// Returns the file contents if the asset exists, `None` otherwise.
#[cfg(feature = "embed")]
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|f| f.data)
}

/// Get a theme asset by path (relative to `theme/`).
///
/// Returns the file contents if the asset exists, `None` otherwise.
#[cfg(not(feature = "embed"))]
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    fs::read(Path::new(THEME_DIR).join(path)).ok().map(Cow::Owned)
}

/// Iterate all available asset paths.
#[cfg(feature = "embed")]
pub fn iter() -> impl Iterator<Item = Cow<'static, str>> {
    Assets::iter()
}

/// Iterate all available asset paths.
#[cfg(not(feature = "embed"))]
pub fn iter() -> impl Iterator<Item = Cow<'static, str>> {
    walk_dir(Path::new(THEME_DIR)).into_iter().map(Cow::Owned)
}

/// Page template source by name (e.g. `page.html`).
///
/// # Errors
///
/// Returns `AssetError::MissingTemplate` if the theme has no such template.
pub fn template(name: &str) -> Result<String, AssetError> {
    get(&format!("{TEMPLATE_PREFIX}{name}"))
        .map(|data| String::from_utf8_lossy(&data).into_owned())
        .ok_or_else(|| AssetError::MissingTemplate(name.to_owned()))
}

/// Copy the theme's static files into `<outdir>/_static`.
///
/// Returns the written paths relative to `outdir`, sorted.
///
/// # Errors
///
/// Returns `AssetError::MissingStylesheet` if the main stylesheet is absent
/// and `AssetError::Io` if a file cannot be written.
pub fn copy_static(outdir: &Path) -> Result<Vec<String>, AssetError> {
    if get(MAIN_STYLESHEET).is_none() {
        return Err(AssetError::MissingStylesheet(MAIN_STYLESHEET.to_owned()));
    }

    let mut written = Vec::new();
    for path in iter() {
        let Some(relative) = path.strip_prefix(STATIC_PREFIX) else {
            continue;
        };
        let Some(data) = get(&path) else {
            continue;
        };
        let target = outdir.join("_static").join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| AssetError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, &data).map_err(|source| AssetError::Io {
            path: target.clone(),
            source,
        })?;
        tracing::debug!(asset = relative, bytes = data.len(), "Copied theme asset");
        written.push(format!("_static/{relative}"));
    }
    written.sort();
    Ok(written)
}

/// Recursively walk a directory and return paths relative to `base`.
#[cfg(not(feature = "embed"))]
fn walk_dir(base: &Path) -> Vec<String> {
    let mut result = Vec::new();
    walk_dir_inner(base, base, &mut result);
    result
}

#[cfg(not(feature = "embed"))]
fn walk_dir_inner(base: &Path, dir: &Path, result: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_dir_inner(base, &path, result);
        } else if let Ok(rel) = path.strip_prefix(base) {
            result.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}
