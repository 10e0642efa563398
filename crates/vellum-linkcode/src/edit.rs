//! "Edit this page" links.

use vellum_config::HtmlContext;
use vellum_doctree::{Document, Node};

use crate::resolver::{DEFAULT_BRANCH, LinkcodeResolver};
use crate::signature_info;

/// Pages generated from API descriptions.
const API_PAGES: &[&str] = &["api", "autoapi"];

/// Builds "edit this page" URLs.
///
/// API pages link to the source of their first documented Python object;
/// other pages link to their Markdown source.
pub struct EditLinkResolver<'a> {
    context: &'a HtmlContext,
    linkcode: Option<&'a LinkcodeResolver>,
}

impl<'a> EditLinkResolver<'a> {
    #[must_use]
    pub fn new(context: &'a HtmlContext, linkcode: Option<&'a LinkcodeResolver>) -> Self {
        Self { context, linkcode }
    }

    /// Edit URL for a page, or `None` without a GitHub repository.
    pub fn edit_url(&self, page: &str, document: &Document) -> Option<String> {
        if is_api_page(page)
            && let Some(url) = self.api_source_url(document)
        {
            return Some(url);
        }
        self.page_source_url(page, document)
    }

    fn api_source_url(&self, document: &Document) -> Option<String> {
        let linkcode = self.linkcode?;
        let first = document.traverse().find_map(|node| match node {
            Node::Desc(desc) => Some(desc),
            _ => None,
        })?;
        first.children.iter().find_map(|child| {
            let Node::DescSignature(signature) = child else {
                return None;
            };
            let info = signature_info(&first.domain, signature)?;
            linkcode.resolve(&first.domain, &info, true)
        })
    }

    fn page_source_url(&self, page: &str, document: &Document) -> Option<String> {
        let library = self.context.library()?;
        let branch = if self.context.github_version.is_empty() {
            DEFAULT_BRANCH
        } else {
            &self.context.github_version
        };
        let suffix = document
            .source_path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let doc_path = self.context.doc_path.trim_matches('/');
        let path = if doc_path.is_empty() {
            format!("{page}{suffix}")
        } else {
            format!("{doc_path}/{page}{suffix}")
        };
        Some(format!("https://github.com/{library}/edit/{branch}/{path}"))
    }
}

fn is_api_page(page: &str) -> bool {
    API_PAGES.contains(&page) || page.contains("_autosummary")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{SourceLocator, SourceSpan};
    use crate::resolver::LinkcodeSettings;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};
    use vellum_doctree::parse_document;

    struct StubLocator;

    impl SourceLocator for StubLocator {
        fn locate(&self, module: &str, _fullname: &str) -> Option<SourceSpan> {
            Some(SourceSpan {
                file: format!("{}.py", module.replace('.', "/")),
                start_line: 1,
                end_line: 1,
            })
        }
    }

    fn context() -> HtmlContext {
        HtmlContext {
            github_user: "example".to_owned(),
            github_repo: "project".to_owned(),
            github_version: "main".to_owned(),
            doc_path: "doc/source".to_owned(),
            source_path: "src".to_owned(),
        }
    }

    fn linkcode() -> LinkcodeResolver {
        let settings = LinkcodeSettings {
            library: "example/project".to_owned(),
            source: "src".to_owned(),
            branch: "main".to_owned(),
            source_root: PathBuf::from("."),
        };
        LinkcodeResolver::with_locator(settings, Box::new(StubLocator))
    }

    #[test]
    fn test_regular_page_links_markdown_source() {
        let context = context();
        let document = parse_document("user/setup", Path::new("/docs/user/setup.md"), "# Setup\n");
        let resolver = EditLinkResolver::new(&context, None);
        assert_eq!(
            resolver.edit_url("user/setup", &document).as_deref(),
            Some("https://github.com/example/project/edit/main/doc/source/user/setup.md")
        );
    }

    #[test]
    fn test_api_page_links_first_object_source() {
        let context = context();
        let linkcode = linkcode();
        let document = parse_document(
            "api",
            Path::new("/docs/api.md"),
            "# API\n\n```{py:class} pkg.core.Engine\nEngine.\n```\n\n```{py:function} pkg.util.run()\n```\n",
        );
        let resolver = EditLinkResolver::new(&context, Some(&linkcode));
        assert_eq!(
            resolver.edit_url("api", &document).as_deref(),
            Some("https://github.com/example/project/edit/main/src/pkg/core.py")
        );
    }

    #[test]
    fn test_autosummary_page_without_objects_falls_back() {
        let context = context();
        let linkcode = linkcode();
        let document = parse_document("api/_autosummary/pkg", Path::new("/docs/x.md"), "# Pkg\n");
        let resolver = EditLinkResolver::new(&context, Some(&linkcode));
        assert_eq!(
            resolver.edit_url("api/_autosummary/pkg", &document).as_deref(),
            Some("https://github.com/example/project/edit/main/doc/source/api/_autosummary/pkg.md")
        );
    }

    #[test]
    fn test_no_repository() {
        let context = HtmlContext::default();
        let document = parse_document("index", Path::new("/docs/index.md"), "# Home\n");
        assert_eq!(EditLinkResolver::new(&context, None).edit_url("index", &document), None);
    }
}
