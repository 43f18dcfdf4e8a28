use serde::Serialize;

use crate::config::ContentConfig;
use crate::content::DocRequest;
use crate::frontmatter::{self, DocumentMetadata, ParsedDocument};
use crate::markdown::{MarkdownRenderer, to_html};
use crate::outline::Outline;
use crate::postprocess::{highlight_code_blocks, rewrite_images};

pub const UNTITLED: &str = "Untitled document";

/// Final HTML of a document, safe to inject as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub html: String,
}

/// Everything the viewer shows for one loaded document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub request: DocRequest,
    /// Logical path the document was requested under.
    pub locator: String,
    pub metadata: DocumentMetadata,
    pub rendered: RenderedDocument,
    pub outline: Outline,
}

impl Document {
    pub fn html(&self) -> &str {
        &self.rendered.html
    }

    /// Title for display, falling back when the front matter has none.
    pub fn display_title(&self) -> &str {
        self.metadata.title().unwrap_or(UNTITLED)
    }
}

/// Raw text in, rendered document out.
#[derive(Debug, Clone)]
pub struct Pipeline {
    renderer: MarkdownRenderer,
    prefix: String,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&ContentConfig::default())
    }
}

impl Pipeline {
    pub fn new(content: &ContentConfig) -> Self {
        Self {
            renderer: MarkdownRenderer::new(),
            prefix: content.prefix.clone(),
        }
    }

    /// Render a parsed body for the document living at `request_path`.
    pub fn render(&self, parsed: &ParsedDocument, request_path: &str) -> (RenderedDocument, Outline) {
        let (mut events, outline) = self.renderer.events(&parsed.body);
        rewrite_images(&mut events, request_path);
        let events = highlight_code_blocks(events);

        let rendered = RenderedDocument {
            html: to_html(events),
        };
        tracing::debug!(
            %request_path,
            bytes = rendered.html.len(),
            headings = outline.len(),
            "rendered document"
        );
        (rendered, outline)
    }

    pub fn process(&self, request: &DocRequest, raw: &str) -> Document {
        let locator = request.locator(&self.prefix);
        let parsed = frontmatter::parse(raw);
        let (rendered, outline) = self.render(&parsed, &locator);

        Document {
            request: request.clone(),
            locator,
            metadata: parsed.metadata,
            rendered,
            outline,
        }
    }
}
