use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};

use crate::config::{RenderConfig, SiteConfig};
use crate::content::{ContentStore, DocRequest};
use crate::nav::{NavRow, NavTree};
use crate::outline::Outline;
use crate::pipeline::Document;
use crate::postprocess::highlight_stylesheet;
use crate::viewer::{DocViewer, ERROR_TITLE, Failure, LOADING_TITLE, ViewState};

const BUILTIN: [(&str, &str); 6] = [
    ("base.html", include_str!("../templates/base.html")),
    ("document.html", include_str!("../templates/document.html")),
    ("toc.html", include_str!("../templates/toc.html")),
    ("sidebar.html", include_str!("../templates/sidebar.html")),
    ("error.html", include_str!("../templates/error.html")),
    ("loading.html", include_str!("../templates/loading.html")),
];

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("template error: {0}")]
    Tera(#[from] tera::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One table of contents line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
    /// CSS length the entry is indented by.
    pub indent: String,
    pub active: bool,
}

pub fn toc_entries(outline: &Outline, active: Option<&str>) -> Vec<TocEntry> {
    outline
        .items()
        .iter()
        .map(|item| TocEntry {
            id: item.id.clone(),
            text: item.text.clone(),
            level: item.level,
            indent: format!("{}rem", f64::from(item.level.saturating_sub(1)) * 0.75),
            active: active == Some(item.id.as_str()),
        })
        .collect()
}

pub fn section_count(count: usize) -> String {
    match count {
        1 => "1 section".to_string(),
        n => format!("{n} sections"),
    }
}

/// Location line shown under the title, `/<docset>/<path>`.
pub fn breadcrumb(request: &DocRequest) -> String {
    match request.remainder() {
        "" => format!("/{}/(root)", request.docset),
        _ => request.route(),
    }
}

// Same as tera's escaping except that `/` is left alone, so hrefs stay readable.
fn escape(input: &str) -> String {
    html_escape::encode_quoted_attribute(input).into_owned()
}

/// Page templates plus the highlight stylesheet they embed.
pub struct Theme {
    tera: Tera,
    stylesheet: String,
}

impl Theme {
    pub fn builtin(render: &RenderConfig) -> Result<Self, ViewError> {
        let tera = builtin_tera()?;
        Ok(Self::with_tera(tera, render))
    }

    /// Templates from `dir` (any `*.html` below it); missing ones fall back
    /// to the built-in set.
    pub fn from_dir<P: AsRef<Path>>(dir: P, render: &RenderConfig) -> Result<Self, ViewError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ViewError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("theme directory {} does not exist", dir.display()),
            )));
        }

        let glob = format!("{}/**/*.html", dir.display());
        let mut tera = Tera::new(&glob)?;
        tera.extend(&builtin_tera()?)?;
        tracing::info!(dir = %dir.display(), templates = tera.get_template_names().count(), "loaded theme");

        Ok(Self::with_tera(tera, render))
    }

    fn with_tera(mut tera: Tera, render: &RenderConfig) -> Self {
        tera.set_escape_fn(escape);
        Self {
            tera,
            stylesheet: highlight_stylesheet(&render.light_theme, &render.dark_theme, &render.dark_scope),
        }
    }

    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    fn base_context(&self, site: &SiteConfig, title: &str, nav: Option<Vec<NavRow>>) -> Context {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("page_title", title);
        context.insert("stylesheet", &self.stylesheet);
        context.insert("nav", &nav.unwrap_or_default());
        context
    }

    /// Full page for a loaded document, with the heading `active` marked.
    pub fn render_document(
        &self,
        site: &SiteConfig,
        document: &Document,
        nav: Option<&NavTree>,
        active: Option<&str>,
    ) -> Result<String, ViewError> {
        let route = document.request.route();
        let rows = nav.map(|tree| tree.rows(&route));
        let mut context = self.base_context(site, document.display_title(), rows);

        context.insert("description", &document.metadata.description());
        context.insert("tags", &document.metadata.tags().unwrap_or_default());
        context.insert("breadcrumb", &breadcrumb(&document.request));
        context.insert("content", document.html());
        context.insert("toc", &toc_entries(&document.outline, active));
        context.insert("toc_count", &section_count(document.outline.len()));

        Ok(self.tera.render("document.html", &context)?)
    }

    pub fn render_error(
        &self,
        site: &SiteConfig,
        failure: &Failure,
        nav: Option<&NavTree>,
    ) -> Result<String, ViewError> {
        let route = failure.request.route();
        let rows = nav.map(|tree| tree.rows(&route));
        let mut context = self.base_context(site, ERROR_TITLE, rows);

        context.insert("message", &failure.message());
        context.insert("home", &failure.home);
        context.insert("default_document", &failure.default_document);

        Ok(self.tera.render("error.html", &context)?)
    }

    pub fn render_loading(&self, site: &SiteConfig, nav: Option<&NavTree>) -> Result<String, ViewError> {
        let rows = nav.map(|tree| tree.rows(""));
        let context = self.base_context(site, LOADING_TITLE, rows);
        Ok(self.tera.render("loading.html", &context)?)
    }

    /// Whatever the viewer currently shows.
    pub fn render_viewer<S: ContentStore>(
        &self,
        site: &SiteConfig,
        viewer: &DocViewer<S>,
        nav: Option<&NavTree>,
    ) -> Result<String, ViewError> {
        match viewer.state() {
            ViewState::Ready(document) => {
                self.render_document(site, document, nav, viewer.spy().active())
            }
            ViewState::Failed(failure) => self.render_error(site, failure, nav),
            ViewState::Idle | ViewState::Loading(_) => self.render_loading(site, nav),
        }
    }
}

fn builtin_tera() -> Result<Tera, ViewError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(BUILTIN)?;
    Ok(tera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentConfig;
    use crate::content::{DocSet, FetchError};
    use crate::nav::NavTrees;
    use crate::pipeline::Pipeline;

    fn document(raw: &str) -> Document {
        Pipeline::new(&ContentConfig::default())
            .process(&DocRequest::new(DocSet::Public, "guide/setup"), raw)
    }

    fn nav() -> NavTree {
        NavTrees::from_json(
            r#"{ "public": [
                { "title": "Welcome", "path": "/public/welcome" },
                { "section": "Guide", "pages": [ { "title": "Setup", "path": "/public/guide/setup" } ] }
            ] }"#,
        )
        .unwrap()
        .public
    }

    #[test]
    fn test_toc_entries_indent_and_active() {
        let doc = document("# A\n\n## B\n\n### C\n");
        let entries = toc_entries(&doc.outline, Some("b"));
        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.id.as_str(), e.indent.as_str(), e.active))
            .collect();
        assert_eq!(
            summary,
            vec![("a", "0rem", false), ("b", "0.75rem", true), ("c", "1.5rem", false)]
        );
    }

    #[test]
    fn test_section_count() {
        assert_eq!(section_count(1), "1 section");
        assert_eq!(section_count(4), "4 sections");
    }

    #[test]
    fn test_breadcrumb_root() {
        assert_eq!(breadcrumb(&DocRequest::new(DocSet::Internal, "")), "/internal/(root)");
        assert_eq!(breadcrumb(&DocRequest::new(DocSet::Public, "a/b")), "/public/a/b");
    }

    #[test]
    fn test_render_document_page() {
        let theme = Theme::builtin(&RenderConfig::default()).unwrap();
        let doc = document(
            "---\ntitle: Setup <guide>\ndescription: How to install\ntags: [install, ops]\n---\n# Install\n\n## Configure\n",
        );
        let html = theme
            .render_document(&SiteConfig::default(), &doc, Some(&nav()), Some("configure"))
            .unwrap();

        assert!(html.contains("<h1>Setup &lt;guide&gt;</h1>"));
        assert!(html.contains("<p class=\"doc-description\">How to install</p>"));
        assert!(html.contains("<span class=\"doc-tag\">ops</span>"));
        assert!(html.contains("<h1 id=\"install\">Install</h1>"));
        assert!(html.contains("toc-level-2 active"));
        assert!(html.contains("2 sections"));
        assert!(html.contains("<span>/public/guide/setup</span>"));
        assert!(html.contains("aria-current=\"page\">Setup</a>"));
        assert!(html.contains(".hl-"));
    }

    #[test]
    fn test_empty_outline_omits_toc() {
        let theme = Theme::builtin(&RenderConfig::default()).unwrap();
        let doc = document("just text\n");
        let html = theme
            .render_document(&SiteConfig::default(), &doc, None, None)
            .unwrap();
        assert!(!html.contains("class=\"toc\""));
        assert!(!html.contains("class=\"sidebar\""));
        assert!(html.contains("<h1>Untitled document</h1>"));
    }

    #[test]
    fn test_render_error_page() {
        let theme = Theme::builtin(&RenderConfig::default()).unwrap();
        let failure = Failure {
            request: DocRequest::new(DocSet::Public, "missing"),
            error: FetchError::new("/docs/public/missing.md", "Not Found"),
            home: "/".into(),
            default_document: Some("/public/welcome".into()),
        };
        let html = theme
            .render_error(&SiteConfig::default(), &failure, None)
            .unwrap();
        assert!(html.contains("<h1>Error</h1>"));
        assert!(html.contains("Not Found"));
        assert!(html.contains("/docs/public/missing.md"));
        assert!(html.contains("href=\"/public/welcome\""));
    }

    #[test]
    fn test_theme_dir_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("error.html"), "custom: {{ message }}").unwrap();
        let theme = Theme::from_dir(dir.path(), &RenderConfig::default()).unwrap();

        let failure = Failure {
            request: DocRequest::new(DocSet::Public, "x"),
            error: FetchError::new("/docs/public/x.md", "Not Found"),
            home: "/".into(),
            default_document: None,
        };
        let html = theme
            .render_error(&SiteConfig::default(), &failure, None)
            .unwrap();
        assert!(html.starts_with("custom: "));

        let doc = document("# Still builtin\n");
        let page = theme
            .render_document(&SiteConfig::default(), &doc, None, None)
            .unwrap();
        assert!(page.contains("<h1 id=\"still-builtin\">Still builtin</h1>"));
    }

    #[test]
    fn test_missing_theme_dir() {
        let err = Theme::from_dir("/no/such/theme", &RenderConfig::default()).err().unwrap();
        assert!(matches!(err, ViewError::Io(_)));
    }
}
