//! Dropdown navigation bar for Vellum sites.
//!
//! The navbar is declared in a YAML layout file (`navigation_dropdown.layout_file`
//! in the theme options):
//!
//! ```yaml
//! - title: User guide
//!   file: user_guide/index
//!   caption: How to use the library
//!   sections:
//!     - title: Setup
//!       file: user_guide/setup
//! - title: Issues
//!   link: https://github.com/example/project/issues
//! ```
//!
//! Each page gets the list rendered with links relative to itself; entries
//! with sections get a chevron icon.

mod chevron;
mod fragment;
mod layout;
mod nodes;
mod renderer;

use std::path::PathBuf;

use serde::Deserialize;
use vellum_config::{ConfigError, ThemeOptions};

pub use chevron::{CHEVRON_CLASS, add_navbar_chevrons};
pub use fragment::{FragmentNode, parse_fragment, serialize_fragment};
pub use layout::{NavEntry, load_navbar_layout};
pub use nodes::build_navbar_nodes;
pub use renderer::NavbarRenderer;

/// Theme table holding these options.
pub const SECTION: &str = "navigation_dropdown";

/// `[theme.navigation_dropdown]` options.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavigationOptions {
    /// Layout file relative to the source directory.
    pub layout_file: Option<String>,
}

impl NavigationOptions {
    /// Read the options from the theme.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Section` for a malformed table.
    pub fn from_theme(theme: &ThemeOptions) -> Result<Option<Self>, ConfigError> {
        theme.parse_section(SECTION)
    }
}

/// Navbar error.
#[derive(Debug, thiserror::Error)]
pub enum NavbarError {
    #[error("Could not find navbar layout {0}")]
    NotFound(String),
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error parsing '{file}': {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Navbar configuration is missing, set theme.navigation_dropdown.layout_file")]
    MissingLayout,
    #[error("Invalid navbar markup: {0}")]
    Markup(#[from] quick_xml::Error),
    #[error("Invalid navbar markup encoding: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}
