use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use regex::{Captures, Regex};

use crate::outline::{Outline, Slugger};

static HTML_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<h([1-6])\b([^>]*)>(.*?)(</h[1-6]\s*>)").expect("valid heading regex")
});
static ID_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\sid\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).expect("valid id regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Markdown converted to HTML together with the headings it contains.
#[derive(Debug, Clone)]
pub struct RenderedMarkdown {
    pub html: String,
    pub outline: Outline,
}

/// CommonMark renderer with the fixed extension set used for docs.
///
/// The renderer knows nothing about where a document lives; path dependent
/// fixes happen in [`crate::postprocess`].
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_HEADING_ATTRIBUTES,
        }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Parse `body` into events, giving every heading a unique id.
    pub fn events<'a>(&self, body: &'a str) -> (Vec<Event<'a>>, Outline) {
        let events: Vec<Event> = Parser::new_ext(body, self.options).collect();
        let mut slugger = Slugger::new();
        let mut processed = Vec::with_capacity(events.len());
        let mut i = 0;

        while i < events.len() {
            match &events[i] {
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    // Gather the heading's inline events to read its text
                    let mut inner = Vec::new();
                    let mut text = String::new();
                    i += 1;
                    while i < events.len() {
                        match &events[i] {
                            Event::End(TagEnd::Heading(_)) => break,
                            Event::Text(t) | Event::Code(t) => text.push_str(t),
                            Event::SoftBreak | Event::HardBreak => text.push(' '),
                            _ => {}
                        }
                        inner.push(events[i].clone());
                        i += 1;
                    }

                    let assigned = slugger.assign(id.as_deref(), &text, *level as u8);
                    processed.push(Event::Start(Tag::Heading {
                        level: *level,
                        id: Some(CowStr::from(assigned)),
                        classes: classes.clone(),
                        attrs: attrs.clone(),
                    }));
                    processed.extend(inner);
                    processed.push(Event::End(TagEnd::Heading(*level)));
                }
                Event::Html(raw) => match anchor_html_headings(raw, &mut slugger) {
                    Some(anchored) => processed.push(Event::Html(anchored.into())),
                    None => processed.push(Event::Html(raw.clone())),
                },
                Event::InlineHtml(raw) => match anchor_html_headings(raw, &mut slugger) {
                    Some(anchored) => processed.push(Event::InlineHtml(anchored.into())),
                    None => processed.push(Event::InlineHtml(raw.clone())),
                },
                event => processed.push(event.clone()),
            }
            i += 1;
        }

        (processed, slugger.finish())
    }

    pub fn render(&self, body: &str) -> RenderedMarkdown {
        let (events, outline) = self.events(body);
        RenderedMarkdown {
            html: to_html(events),
            outline,
        }
    }
}

/// Give `<h1>`..`<h6>` tags written as raw HTML an id and record them in
/// the outline. An id already on the tag is kept unless it collides.
fn anchor_html_headings(raw: &str, slugger: &mut Slugger) -> Option<String> {
    if !HTML_HEADING.is_match(raw) {
        return None;
    }

    let anchored = HTML_HEADING.replace_all(raw, |caps: &Captures| {
        let level: u8 = caps[1].parse().unwrap_or(1);
        let attrs = &caps[2];
        let stripped = TAG.replace_all(&caps[3], "");
        let text = html_escape::decode_html_entities(&stripped);

        let existing = ID_ATTR
            .captures(attrs)
            .and_then(|id| id.get(2).or_else(|| id.get(3)))
            .map(|m| m.as_str().to_string());
        let id = slugger.assign(existing.as_deref(), &text, level);
        let escaped = html_escape::encode_double_quoted_attribute(&id);

        let attrs = match existing {
            Some(_) => ID_ATTR
                .replace(attrs, |id_caps: &Captures| format!("{}\"{escaped}\"", &id_caps[1]))
                .into_owned(),
            None => format!(" id=\"{escaped}\"{attrs}"),
        };
        format!("<h{level}{attrs}>{}{}", &caps[3], &caps[4])
    });

    Some(anchored.into_owned())
}

/// Serialize an event stream to HTML.
pub fn to_html<'a, I>(events: I) -> String
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out
}

/// Convenience wrapper: markdown in, HTML out.
pub fn render_markdown(body: &str) -> String {
    MarkdownRenderer::new().render(body).html
}
