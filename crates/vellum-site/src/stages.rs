//! The standard build stages, named after the build events they model.

use std::fs;

use vellum_assets::{AssetError, MAIN_STYLESHEET};
use vellum_cheatsheet::{CheatsheetOptions, build_cheatsheet_with, cheatsheet_sidebar_pages};
use vellum_config::{search_index_version, version_match};
use vellum_doctree::{parse_document, render_nodes};
use vellum_linkcode::{EditLinkResolver, LinkcodeResolver, LinkcodeSettings, link_code};
use vellum_navbar::{NavbarRenderer, NavigationOptions, load_navbar_layout};
use vellum_search::{SearchIndexer, SearchOptions, write_search_index};
use vellum_whatsnew::{
    WhatsnewOptions, WhatsnewPaths, add_whatsnew_changelog, extract_whatsnew, load_fragments, whatsnew_sidebar_pages,
};

use crate::BuildError;
use crate::autoapi::{AutoapiOptions, ICON_FONT_CSS, unescape_api_pages};
use crate::context::{BuildContext, copy_tree};
use crate::page::{CheatsheetData, PageContext, PageData, issue_page, page_breadcrumbs, page_toc, root_prefix};
use crate::minigallery::MinigalleryOptions;
use crate::pipeline::Stage;
use crate::scanner::Scanner;
use crate::templates::{Templates, render};

/// Back-fills theme defaults and reads the feature options.
///
/// Reads `config`. Writes `config.theme`, `search`, `whatsnew`,
/// `whatsnew_paths`, `cheatsheet`, `autoapi`, `minigallery`.
pub struct ConfigInited;

impl Stage for ConfigInited {
    fn name(&self) -> &'static str {
        "config-inited"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        if vellum_assets::get(MAIN_STYLESHEET).is_none() {
            return Err(AssetError::MissingStylesheet(MAIN_STYLESHEET.to_owned()).into());
        }

        let theme = &mut ctx.config.theme;
        theme.apply_defaults();
        if let Some(switcher) = theme.switcher.as_mut()
            && switcher.version_match.is_none()
        {
            switcher.version_match = Some(version_match(&ctx.config.project.version));
        }

        let search = SearchOptions::from_theme(&ctx.config.theme)?;
        search.apply_to_theme(&mut ctx.config.theme)?;
        ctx.search = search;

        ctx.whatsnew = WhatsnewOptions::from_theme(&ctx.config.theme)?;
        ctx.whatsnew_paths = ctx
            .whatsnew
            .as_ref()
            .and_then(|options| WhatsnewPaths::resolve(options, &ctx.config.docs_resolved.source_dir));
        ctx.cheatsheet = CheatsheetOptions::from_theme(&ctx.config.theme)?;

        ctx.autoapi = AutoapiOptions::from_theme(&ctx.config.theme)?;
        if let Some(autoapi) = &ctx.autoapi {
            autoapi.apply_to_theme(&mut ctx.config.theme)?;
        }
        ctx.minigallery = MinigalleryOptions::from_theme(&ctx.config.theme)?;

        tracing::debug!(
            project = %ctx.config.project.name,
            version = %ctx.config.project.version,
            "Configuration initialized"
        );
        Ok(())
    }
}

/// Loads the navbar layout, builds the cheat sheet and sets up source links.
///
/// Reads `config`, `cheatsheet`. Writes `navbar`, `cheatsheet`,
/// `config.theme` (cheat sheet outputs), `linkcode`.
pub struct BuilderInited;

impl Stage for BuilderInited {
    fn name(&self) -> &'static str {
        "builder-inited"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        let navigation = NavigationOptions::from_theme(&ctx.config.theme)?;
        let layout = load_navbar_layout(&ctx.config.docs_resolved.source_dir, navigation.as_ref())?;
        ctx.navbar = NavbarRenderer::new(layout);

        if let Some(options) = ctx.cheatsheet.as_mut()
            && let Some(output) = build_cheatsheet_with(
                ctx.tool_runner.as_ref(),
                options,
                &ctx.config.docs_resolved.source_dir,
                &ctx.config.docs_resolved.output_dir,
            )?
        {
            options.apply_output(&output, &mut ctx.config.theme)?;
        }

        // Source links need a repository; edit links only use one if present.
        ctx.linkcode = if ctx.config.link_code.is_some() {
            Some(LinkcodeResolver::new(LinkcodeSettings::from_config(&ctx.config)?))
        } else if ctx.config.theme.use_edit_page_button {
            LinkcodeSettings::from_config(&ctx.config)
                .ok()
                .map(LinkcodeResolver::new)
        } else {
            None
        };
        Ok(())
    }
}

/// Reads and transforms every source document.
///
/// Reads `config`, `linkcode`, `whatsnew_paths`. Writes `documents`.
pub struct DoctreeRead;

impl Stage for DoctreeRead {
    fn name(&self) -> &'static str {
        "doctree-read"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        let scanner = Scanner::new(&ctx.config.docs_resolved)?;
        let fragments = match ctx
            .whatsnew_paths
            .as_ref()
            .and_then(|paths| paths.fragments_file.as_deref())
        {
            Some(path) => load_fragments(path)?,
            None => None,
        };
        let changelog = ctx
            .whatsnew_paths
            .as_ref()
            .map(|paths| paths.changelog_docname.clone());
        let link_sources = ctx.config.link_code.is_some();

        for file in scanner.scan() {
            let text = fs::read_to_string(&file.path).map_err(|source| BuildError::Io {
                path: file.path.clone(),
                source,
            })?;
            let mut document = parse_document(&file.docname, &file.path, &text);

            if link_sources && let Some(resolver) = &ctx.linkcode {
                link_code(&mut document, resolver);
            }
            if changelog.as_deref() == Some(document.docname.as_str()) {
                let versions = add_whatsnew_changelog(&mut document, fragments.as_ref());
                tracing::info!(docname = %document.docname, versions = versions.len(), "Grouped changelog");
            }
            ctx.documents.insert(document);
        }

        if let Some(changelog) = changelog
            && !ctx.documents.contains(&changelog)
        {
            tracing::debug!(docname = %changelog, "Changelog not found, skipping what's new");
        }
        tracing::info!(documents = ctx.documents.len(), "Read documents");
        Ok(())
    }
}

/// Collects the what's new sidebar from the transformed changelog.
///
/// Reads `documents`, `whatsnew`, `whatsnew_paths`. Writes `whatsnew_entries`.
pub struct EnvUpdated;

impl Stage for EnvUpdated {
    fn name(&self) -> &'static str {
        "env-updated"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        let (Some(options), Some(paths)) = (&ctx.whatsnew, &ctx.whatsnew_paths) else {
            return Ok(());
        };
        let Some(changelog) = ctx.documents.get(&paths.changelog_docname) else {
            return Ok(());
        };
        let entries = extract_whatsnew(changelog, options, ctx.config.project.html_title());
        tracing::debug!(entries = entries.len(), "Extracted what's new entries");
        ctx.whatsnew_entries = entries;
        Ok(())
    }
}

/// Renders and writes one page per document.
///
/// Reads everything above. Writes `pages` and the page files.
pub struct HtmlPageContext;

impl Stage for HtmlPageContext {
    fn name(&self) -> &'static str {
        "html-page-context"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        let templates = Templates::load()?;
        let env = templates.environment()?;
        let search_options = serde_json::to_string(&ctx.search)?;
        let edit_links = EditLinkResolver::new(&ctx.config.html_context, ctx.linkcode.as_ref());
        let whatsnew_pages = whatsnew_sidebar_pages(ctx.whatsnew.as_ref());
        let cheatsheet_pages = cheatsheet_sidebar_pages(ctx.cheatsheet.as_ref());
        let minigallery_html = ctx.minigallery.as_ref().map(MinigalleryOptions::render_html);

        let mut pages = Vec::with_capacity(ctx.documents.len());
        for document in &ctx.documents {
            let docname = document.docname.as_str();
            let mut context = PageContext::new(&ctx.config, root_prefix(docname), search_options.clone());
            if ctx.autoapi.is_some() {
                context.css_files.push(ICON_FONT_CSS);
            }
            context.minigallery_html.clone_from(&minigallery_html);

            if ctx.navbar.is_configured() {
                context.navbar_html = Some(ctx.navbar.render(docname)?);
            }
            if whatsnew_pages.iter().any(|page| page == docname) && !ctx.whatsnew_entries.is_empty() {
                context.whatsnew = Some(ctx.whatsnew_entries.as_slice());
            }
            if cheatsheet_pages.iter().any(|page| page == docname) {
                context.cheatsheet = ctx.cheatsheet.as_ref().and_then(CheatsheetData::from_options);
            }
            let edit_url = if ctx.config.theme.use_edit_page_button {
                edit_links.edit_url(docname, document)
            } else {
                None
            };
            context.page = Some(PageData {
                name: docname.to_owned(),
                title: document.title().unwrap_or_else(|| docname.to_owned()),
                body: render_nodes(&document.children),
                breadcrumbs: page_breadcrumbs(docname, &ctx.documents, &ctx.config.theme.additional_breadcrumbs),
                toc: page_toc(document),
                edit_url,
            });

            let html = render(&env, "page.html", &context)?;
            let path = document.html_path();
            ctx.write_output(&path, &html)?;
            tracing::debug!(page = %path, "Wrote page");
            pages.push(path);
        }

        tracing::info!(pages = pages.len(), "Wrote pages");
        ctx.pages = pages;
        Ok(())
    }
}

/// Writes the search index, theme assets and the 404 page.
///
/// Reads `documents`, `search`, `config`. Writes `search_records`, `pages`.
pub struct BuildFinished;

impl Stage for BuildFinished {
    fn name(&self) -> &'static str {
        "build-finished"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        let indexer = SearchIndexer::new(ctx.search.clone())?;
        let records = indexer.build_index(&ctx.documents);
        write_search_index(&records, ctx.output_dir())?;
        ctx.search_records = records.len();

        let assets = vellum_assets::copy_static(ctx.output_dir())?;
        let user_assets = copy_tree(&ctx.source_dir().join("_static"), &ctx.config.docs_resolved.static_dir())?;
        tracing::debug!(theme = assets.len(), user = user_assets, "Copied static files");

        let templates = Templates::load()?;
        let env = templates.environment()?;
        let mut context = PageContext::new(&ctx.config, "/".to_owned(), serde_json::to_string(&ctx.search)?);
        context.issue_page = issue_page(&ctx.config);
        let html = render(&env, "404.html", &context)?;
        ctx.write_output("404.html", &html)?;
        ctx.pages.push("404.html".to_owned());

        tracing::info!(
            pages = ctx.pages.len(),
            records = ctx.search_records,
            index = %search_index_version(&ctx.config.project.version),
            output = %ctx.output_dir().display(),
            "Build finished"
        );
        Ok(())
    }
}

/// Repairs the markup of the generated API pages.
///
/// Reads `autoapi`. Rewrites the pages under the API output folder.
pub struct ApiPagesFinished;

impl Stage for ApiPagesFinished {
    fn name(&self) -> &'static str {
        "api-pages-finished"
    }

    fn run(&self, ctx: &mut BuildContext) -> Result<(), BuildError> {
        let Some(autoapi) = &ctx.autoapi else {
            return Ok(());
        };
        let rewritten = unescape_api_pages(ctx.output_dir(), &autoapi.output)?;
        tracing::debug!(folder = %autoapi.output, pages = rewritten, "Unescaped API pages");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::path::Path;
    use vellum_cheatsheet::{CheatsheetError, ToolRunner};
    use vellum_config::Config;

    fn context(root: &Path, toml: &str) -> BuildContext {
        let mut config = Config::from_toml(toml, root).unwrap();
        config.docs_resolved.output_dir = root.join("out");
        BuildContext::new(config)
    }

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Fakes the files produced by `quarto render` and `pdftoppm`.
    #[derive(Default)]
    struct FakeTools {
        calls: RefCell<Vec<String>>,
    }

    impl ToolRunner for FakeTools {
        fn run(&self, program: &str, args: &[String], _cwd: &Path) -> Result<(), CheatsheetError> {
            self.calls.borrow_mut().push(program.to_owned());
            match (program, args.first().map(String::as_str)) {
                ("quarto", Some("render")) => {
                    let outdir = Path::new(&args[5]);
                    fs::create_dir_all(outdir).unwrap();
                    fs::write(outdir.join("cheat.pdf"), b"%PDF").unwrap();
                }
                ("pdftoppm", _) => fs::write(format!("{}.png", args[9]), b"png").unwrap(),
                _ => {}
            }
            Ok(())
        }
    }

    #[test]
    fn test_config_inited_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(
            dir.path(),
            r#"
[project]
version = "1.4.2"

[theme.switcher]
json_url = "https://docs.example.com/versions.json"

[theme.static_search]
threshold = 0.5

[theme.whatsnew]
whatsnew_file_name = "whatsnew.yml"
changelog_file_name = "changelog.md"
"#,
        );

        ConfigInited.run(&mut ctx).unwrap();

        let theme = &ctx.config.theme;
        assert_eq!(theme.switcher.as_ref().unwrap().version_match.as_deref(), Some("1.4"));
        assert_eq!(theme.collapse_navigation, Some(true));
        assert!(theme.navbar_end.is_some());
        assert_eq!(
            theme.section("static_search").unwrap().get("keys"),
            Some(&toml::Value::Array(vec!["title".into(), "text".into()]))
        );
        assert!((ctx.search.threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(ctx.whatsnew_paths.as_ref().unwrap().changelog_docname, "changelog");
        assert!(ctx.cheatsheet.is_none());
    }

    #[test]
    fn test_config_inited_keeps_version_match() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(
            dir.path(),
            "[project]\nversion = \"2.0.dev0\"\n[theme.switcher]\njson_url = \"x\"\nversion_match = \"latest\"\n",
        );
        ConfigInited.run(&mut ctx).unwrap();
        assert_eq!(
            ctx.config.theme.switcher.unwrap().version_match.as_deref(),
            Some("latest")
        );
    }

    #[test]
    fn test_builder_inited_builds_cheatsheet() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "docs/cheat.qmd", "---\ntitle: Cheat\n---\n");
        let mut ctx = context(dir.path(), "[theme.cheatsheet]\nfile = \"cheat.qmd\"\npages = \"index\"\n")
            .with_tool_runner(FakeTools::default());

        ConfigInited.run(&mut ctx).unwrap();
        BuilderInited.run(&mut ctx).unwrap();

        let cheatsheet = ctx.cheatsheet.as_ref().unwrap();
        assert_eq!(cheatsheet.output_dir.as_deref(), Some("_static/cheat.pdf"));
        assert_eq!(cheatsheet.thumbnail.as_deref(), Some("_static/cheat.png"));
        assert_eq!(
            ctx.config.theme.section("cheatsheet").unwrap().get("thumbnail"),
            Some(&toml::Value::String("_static/cheat.png".to_owned()))
        );
        assert!(!ctx.navbar.is_configured());
        assert!(ctx.linkcode.is_none());
    }

    #[test]
    fn test_builder_inited_missing_navbar_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path(), "[theme.navigation_dropdown]\nlayout_file = \"navbar.yml\"\n");
        ConfigInited.run(&mut ctx).unwrap();
        let err = BuilderInited.run(&mut ctx).unwrap_err();
        assert!(matches!(err, BuildError::Navbar(_)));
    }

    #[test]
    fn test_builder_inited_link_code_requires_library() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path(), "[link_code]\nsource = \"src\"\n");
        ConfigInited.run(&mut ctx).unwrap();
        assert!(matches!(BuilderInited.run(&mut ctx), Err(BuildError::Linkcode(_))));
    }

    #[test]
    fn test_doctree_read_and_env_updated_build_whatsnew() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "docs/changelog.md",
            "# Changelog\n\n## [0.3.1](https://example.com/v0.3.1)\n\nFixes.\n\n## [0.3.0](https://example.com/v0.3.0)\n\nFeatures.\n",
        );
        write(
            dir.path(),
            "docs/whatsnew.yml",
            "fragments:\n  - version: 0.3.0\n    title: Dark mode\n    content: Switch **themes**.\n",
        );
        let mut ctx = context(
            dir.path(),
            "[theme.whatsnew]\nwhatsnew_file_name = \"whatsnew.yml\"\nchangelog_file_name = \"changelog.md\"\n",
        );

        ConfigInited.run(&mut ctx).unwrap();
        DoctreeRead.run(&mut ctx).unwrap();
        EnvUpdated.run(&mut ctx).unwrap();

        let changelog = ctx.documents.get("changelog").unwrap();
        let headers: Vec<_> = changelog
            .sections()
            .filter_map(|s| s.id())
            .filter(|id| id.starts_with("version-"))
            .collect();
        assert_eq!(headers, vec!["version-0.3", "version-0.3-whatsnew"]);
        assert_eq!(ctx.whatsnew_entries.len(), 1);
        assert_eq!(ctx.whatsnew_entries[0].children[0].title, "Dark mode");
    }

    #[test]
    fn test_env_updated_without_changelog_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path(), "[theme.whatsnew]\nchangelog_file_name = \"changelog.md\"\n");
        ConfigInited.run(&mut ctx).unwrap();
        DoctreeRead.run(&mut ctx).unwrap();
        EnvUpdated.run(&mut ctx).unwrap();
        assert!(ctx.whatsnew_entries.is_empty());
    }

    const API_AND_GALLERY: &str = r#"
[theme.autoapi]
project = "widgets"

[theme.minigallery]
enabled = true

[[theme.minigallery.examples]]
title = "Plot"
link = "plot.html"
"#;

    #[test]
    fn test_config_inited_reads_api_and_gallery_options() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path(), API_AND_GALLERY);

        ConfigInited.run(&mut ctx).unwrap();

        assert_eq!(ctx.autoapi.as_ref().unwrap().output, "api");
        assert_eq!(
            ctx.config.theme.section("autoapi").unwrap().get("own_page_level"),
            Some(&toml::Value::String("class".to_owned()))
        );
        assert_eq!(ctx.minigallery.as_ref().unwrap().examples.len(), 1);
    }

    #[test]
    fn test_gallery_on_pages_and_api_pages_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "docs/index.md", "# Home\n\nWelcome.\n");
        write(dir.path(), "docs/api/widgets.md", "# Widgets\n\nReturns x < y.\n");
        let mut ctx = context(dir.path(), API_AND_GALLERY);

        ConfigInited.run(&mut ctx).unwrap();
        DoctreeRead.run(&mut ctx).unwrap();
        HtmlPageContext.run(&mut ctx).unwrap();

        let index = fs::read_to_string(dir.path().join("out/index.html")).unwrap();
        assert!(index.contains(r#"<div class="minigallery">"#));
        assert!(index.contains("<h3>Plot</h3>"));
        assert!(index.contains("nerdfonts.com"));

        let api_page = dir.path().join("out/api/widgets.html");
        assert!(fs::read_to_string(&api_page).unwrap().contains("x &lt; y"));
        ApiPagesFinished.run(&mut ctx).unwrap();
        assert!(fs::read_to_string(&api_page).unwrap().contains("x < y"));
    }

    #[test]
    fn test_api_pages_finished_without_autoapi_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "out/api/widgets.html", "x &lt; y");
        let mut ctx = context(dir.path(), "");

        ConfigInited.run(&mut ctx).unwrap();
        ApiPagesFinished.run(&mut ctx).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("out/api/widgets.html")).unwrap(), "x &lt; y");
        assert!(ctx.minigallery.is_none());
    }
}
