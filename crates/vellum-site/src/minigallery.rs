//! Example gallery shown on every page (`[theme.minigallery]`).

use std::fmt::Write as _;

use serde::Deserialize;
use vellum_config::{ConfigError, ThemeOptions};
use vellum_doctree::escape_html;

/// Theme table holding these options.
pub const SECTION: &str = "minigallery";

/// One gallery card.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct GalleryExample {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Image URL; cards without one show text only.
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default = "default_link")]
    pub link: String,
}

fn default_title() -> String {
    "Example".to_owned()
}

fn default_link() -> String {
    "#".to_owned()
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MinigalleryOptions {
    pub enabled: bool,
    pub examples: Vec<GalleryExample>,
}

impl MinigalleryOptions {
    /// Read the options; `None` unless the gallery is enabled and has
    /// examples.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Section` for a malformed table.
    pub fn from_theme(theme: &ThemeOptions) -> Result<Option<Self>, ConfigError> {
        Ok(theme
            .parse_section::<Self>(SECTION)?
            .filter(|options| options.enabled && !options.examples.is_empty()))
    }

    /// Thumbnail URLs of the examples that have one.
    pub fn thumbnails(&self) -> Vec<&str> {
        self.examples
            .iter()
            .map(|example| example.thumbnail.as_str())
            .filter(|thumbnail| !thumbnail.is_empty())
            .collect()
    }

    /// Gallery markup for the page template.
    pub fn render_html(&self) -> String {
        let mut html = String::from("<div class=\"minigallery\">\n");
        for example in &self.examples {
            let title = escape_html(&example.title);
            html.push_str("  <div class=\"minigallery-item\">\n");
            let _ = writeln!(html, "    <a href=\"{}\">", escape_html(&example.link));
            if !example.thumbnail.is_empty() {
                let _ = writeln!(
                    html,
                    "      <img src=\"{}\" alt=\"{title} thumbnail\"/>",
                    escape_html(&example.thumbnail)
                );
            }
            let _ = writeln!(html, "      <h3>{title}</h3>");
            if !example.description.is_empty() {
                let _ = writeln!(html, "      <p>{}</p>", escape_html(&example.description));
            }
            html.push_str("    </a>\n  </div>\n");
        }
        html.push_str("</div>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn theme(toml: &str) -> ThemeOptions {
        toml::from_str(toml).unwrap()
    }

    const GALLERY: &str = r#"
[minigallery]
enabled = true

[[minigallery.examples]]
title = "Plot <fast>"
description = "Draws a plot."
thumbnail = "_static/plot.png"
link = "examples/plot.html"

[[minigallery.examples]]
description = "No picture."
"#;

    #[test]
    fn test_disabled_or_empty_gallery() {
        assert_eq!(MinigalleryOptions::from_theme(&theme("")).unwrap(), None);
        assert_eq!(
            MinigalleryOptions::from_theme(&theme("[minigallery]\nenabled = true\n")).unwrap(),
            None
        );
        let disabled = GALLERY.replace("enabled = true", "enabled = false");
        assert_eq!(MinigalleryOptions::from_theme(&theme(&disabled)).unwrap(), None);
    }

    #[test]
    fn test_example_defaults_and_thumbnails() {
        let options = MinigalleryOptions::from_theme(&theme(GALLERY)).unwrap().unwrap();
        assert_eq!(options.examples[1].title, "Example");
        assert_eq!(options.examples[1].link, "#");
        assert_eq!(options.thumbnails(), vec!["_static/plot.png"]);
    }

    #[test]
    fn test_render_html() {
        let options = MinigalleryOptions::from_theme(&theme(GALLERY)).unwrap().unwrap();
        assert_eq!(
            options.render_html(),
            concat!(
                "<div class=\"minigallery\">\n",
                "  <div class=\"minigallery-item\">\n",
                "    <a href=\"examples/plot.html\">\n",
                "      <img src=\"_static/plot.png\" alt=\"Plot &lt;fast&gt; thumbnail\"/>\n",
                "      <h3>Plot &lt;fast&gt;</h3>\n",
                "      <p>Draws a plot.</p>\n",
                "    </a>\n  </div>\n",
                "  <div class=\"minigallery-item\">\n",
                "    <a href=\"#\">\n",
                "      <h3>Example</h3>\n",
                "      <p>No picture.</p>\n",
                "    </a>\n  </div>\n",
                "</div>\n",
            )
        );
    }

    #[test]
    fn test_malformed_table() {
        let err = MinigalleryOptions::from_theme(&theme("[minigallery]\nenabled = \"yes\"\n")).unwrap_err();
        assert!(matches!(err, ConfigError::Section { .. }));
    }
}
