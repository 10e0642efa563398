//! Per-page navbar rendering.

use std::cell::RefCell;
use std::collections::HashMap;

use vellum_doctree::{Attrs, Element, Node, render_nodes};

use crate::NavbarError;
use crate::chevron::add_navbar_chevrons;
use crate::layout::NavEntry;
use crate::nodes::build_navbar_nodes;

/// Renders the navbar HTML for pages, memoized per page for one build.
#[derive(Debug, Default)]
pub struct NavbarRenderer {
    layout: Option<Vec<NavEntry>>,
    cache: RefCell<HashMap<String, String>>,
}

impl NavbarRenderer {
    #[must_use]
    pub fn new(layout: Option<Vec<NavEntry>>) -> Self {
        Self {
            layout,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Whether a layout was loaded.
    pub fn is_configured(&self) -> bool {
        self.layout.is_some()
    }

    /// Navbar markup for `current_page`.
    ///
    /// # Errors
    ///
    /// Returns `NavbarError::MissingLayout` when no layout was loaded and
    /// `NavbarError::Markup` if the rendered list cannot be post-processed.
    pub fn render(&self, current_page: &str) -> Result<String, NavbarError> {
        if let Some(html) = self.cache.borrow().get(current_page) {
            return Ok(html.clone());
        }
        let layout = self.layout.as_deref().ok_or(NavbarError::MissingLayout)?;

        let content = Node::Container(Element::with_attrs(
            Attrs::with_classes(["navbar-content"]),
            vec![build_navbar_nodes(layout, current_page, true)],
        ));
        let html = add_navbar_chevrons(&render_nodes(&[content]))?;
        tracing::debug!(page = current_page, "Rendered navbar");

        self.cache
            .borrow_mut()
            .insert(current_page.to_owned(), html.clone());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Vec<NavEntry> {
        vec![NavEntry {
            title: Some("Guide".to_owned()),
            file: Some("guide/index".to_owned()),
            sections: Some(vec![NavEntry {
                title: Some("Setup".to_owned()),
                file: Some("guide/setup".to_owned()),
                ..NavEntry::default()
            }]),
            ..NavEntry::default()
        }]
    }

    #[test]
    fn test_render_adds_chevrons() {
        let renderer = NavbarRenderer::new(Some(layout()));
        let html = renderer.render("index").unwrap();
        assert!(html.starts_with(r#"<div class="navbar-content"><ul class="navbar-toplevel">"#));
        assert_eq!(html.matches("fa-chevron-down").count(), 1);
        assert!(html.contains(r#"href="guide/setup.html""#));
    }

    #[test]
    fn test_entry_without_sections_has_no_chevron() {
        let plain = NavEntry {
            title: Some("Home".to_owned()),
            file: Some("index".to_owned()),
            ..NavEntry::default()
        };
        let renderer = NavbarRenderer::new(Some(vec![plain.clone()]));
        let html = renderer.render("guide/setup").unwrap();
        assert!(html.contains(r#"href="../index.html""#));
        assert!(!html.contains("fa-chevron-down"));

        let mut mixed = vec![plain];
        mixed.extend(layout());
        let html = NavbarRenderer::new(Some(mixed)).render("index").unwrap();
        assert_eq!(html.matches("fa-chevron-down").count(), 1);
    }

    #[test]
    fn test_render_is_memoized_per_page() {
        let renderer = NavbarRenderer::new(Some(layout()));
        let first = renderer.render("guide/setup").unwrap();
        assert_eq!(renderer.cache.borrow().len(), 1);
        assert_eq!(renderer.render("guide/setup").unwrap(), first);
        assert!(first.contains(r#"href="setup.html""#));

        renderer.render("index").unwrap();
        assert_eq!(renderer.cache.borrow().len(), 2);
    }

    #[test]
    fn test_missing_layout() {
        let renderer = NavbarRenderer::default();
        assert!(!renderer.is_configured());
        assert!(matches!(renderer.render("index"), Err(NavbarError::MissingLayout)));
    }
}
