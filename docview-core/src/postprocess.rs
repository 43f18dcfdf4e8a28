//! Path and presentation fixes applied to a rendered event stream.
//!
//! Both passes leave anything they do not understand untouched, so running
//! them twice or in either order gives the same HTML.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};
use regex::{Captures, Regex};
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid scheme regex"));
static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").expect("valid img regex"));
static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\bsrc\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).expect("valid src regex")
});

/// Class prefix for highlighted spans.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

pub const DEFAULT_LIGHT_THEME: &str = "InspiredGitHub";
pub const DEFAULT_DARK_THEME: &str = "base16-ocean.dark";

/// Directory part of a request path: everything before the last `/`.
pub fn base_dir(request_path: &str) -> &str {
    match request_path.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => "",
    }
}

fn is_absolute(src: &str) -> bool {
    src.starts_with('/') || SCHEME.is_match(src)
}

/// Resolve a relative image reference against the document's request path.
///
/// Returns `None` when the source should stay as written: absolute URLs,
/// site-absolute paths, fragments, empty sources, and references that climb
/// above the site root.
pub fn resolve_image_src(request_path: &str, src: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.starts_with('#') || is_absolute(src) {
        return None;
    }

    let mut segments: Vec<&str> = base_dir(request_path)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    for segment in src.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                if segments.pop().is_none() {
                    tracing::debug!(%src, %request_path, "image path escapes the site root");
                    return None;
                }
            }
            other => segments.push(other),
        }
    }

    let mut resolved = format!("/{}", segments.join("/"));
    if src.ends_with('/') {
        resolved.push('/');
    }
    Some(resolved)
}

/// Rewrite relative image sources in markdown images and raw `<img>` tags.
pub fn rewrite_images(events: &mut [Event<'_>], request_path: &str) {
    for event in events.iter_mut() {
        match event {
            Event::Start(Tag::Image { dest_url, .. }) => {
                if let Some(resolved) = resolve_image_src(request_path, dest_url) {
                    tracing::debug!(from = %dest_url, to = %resolved, "rewrote image path");
                    *dest_url = CowStr::from(resolved);
                }
            }
            Event::Html(raw) | Event::InlineHtml(raw) => {
                if let Some(rewritten) = rewrite_html_images(raw, request_path) {
                    *raw = CowStr::from(rewritten);
                }
            }
            _ => {}
        }
    }
}

fn rewrite_html_images(raw: &str, request_path: &str) -> Option<String> {
    if !IMG_TAG.is_match(raw) {
        return None;
    }

    let rewritten = IMG_TAG.replace_all(raw, |tag: &Captures| {
        SRC_ATTR
            .replace(&tag[0], |attr: &Captures| {
                let (quote, src) = match (attr.get(2), attr.get(3)) {
                    (Some(src), _) => ('"', src.as_str()),
                    (None, Some(src)) => ('\'', src.as_str()),
                    (None, None) => return attr[0].to_string(),
                };
                match resolve_image_src(request_path, src) {
                    Some(resolved) => format!("{}{quote}{resolved}{quote}", &attr[1]),
                    None => attr[0].to_string(),
                }
            })
            .into_owned()
    });

    match rewritten {
        std::borrow::Cow::Owned(html) if html != raw => Some(html),
        _ => None,
    }
}

/// Replace every code block with class-highlighted HTML.
pub fn highlight_code_blocks<'a>(events: Vec<Event<'a>>) -> Vec<Event<'a>> {
    let mut processed = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let mut code = String::new();
                for inner in iter.by_ref() {
                    match inner {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => code.push_str(&text),
                        _ => {}
                    }
                }

                let language = match &kind {
                    CodeBlockKind::Fenced(info) => fence_language(info),
                    CodeBlockKind::Indented => None,
                };
                processed.push(Event::Html(highlight(&code, language).into()));
            }
            other => processed.push(other),
        }
    }

    processed
}

/// Language token of a fence info string: `rust,ignore title="x"` gives `rust`.
fn fence_language(info: &str) -> Option<&str> {
    info.split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .map(|token| token.trim_start_matches('{').trim_start_matches('.').trim_end_matches('}'))
        .filter(|token| !token.is_empty())
}

fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    SYNTAX_SET.find_syntax_by_token(language).or_else(|| {
        // Languages missing from the default set, mapped to a close relative
        match language.to_ascii_lowercase().as_str() {
            "ts" | "tsx" | "typescript" | "jsx" | "json5" => {
                SYNTAX_SET.find_syntax_by_name("JavaScript")
            }
            "shell" | "console" | "zsh" | "sh-session" => SYNTAX_SET.find_syntax_by_token("bash"),
            "toml" => SYNTAX_SET.find_syntax_by_name("YAML"),
            "dockerfile" => SYNTAX_SET.find_syntax_by_token("sh"),
            _ => None,
        }
    })
}

fn detect_syntax(code: &str) -> Option<&'static SyntaxReference> {
    let first_line = code.lines().next()?;
    SYNTAX_SET
        .find_syntax_by_first_line(first_line)
        .filter(|syntax| syntax.name != "Plain Text")
}

/// Highlight one code block.
///
/// Unknown languages and highlighter failures yield an escaped, plain block.
pub fn highlight(code: &str, language: Option<&str>) -> String {
    let syntax = match language {
        Some(lang) => find_syntax(lang),
        None => detect_syntax(code),
    };

    let Some(syntax) = syntax else {
        if let Some(lang) = language {
            tracing::debug!(language = %lang, "no syntax for code block, leaving it plain");
        }
        return plain_block(code, language);
    };

    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::debug!(error = %e, syntax = %syntax.name, "highlighting failed");
            return plain_block(code, language);
        }
    }

    let class = language
        .map(str::to_string)
        .or_else(|| syntax.file_extensions.first().cloned())
        .unwrap_or_else(|| syntax.name.to_lowercase());

    format!(
        "<pre class=\"highlight hl-code\"><code class=\"language-{}\">{}</code></pre>\n",
        html_escape::encode_double_quoted_attribute(&class),
        generator.finalize()
    )
}

fn plain_block(code: &str, language: Option<&str>) -> String {
    match language {
        Some(lang) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            html_escape::encode_double_quoted_attribute(lang),
            html_escape::encode_text(code)
        ),
        None => format!("<pre><code>{}</code></pre>\n", html_escape::encode_text(code)),
    }
}

/// Stylesheet for highlighted code: the light theme as the base and the
/// dark theme scoped under `dark_scope` (for example `.dark`).
pub fn highlight_stylesheet(light: &str, dark: &str, dark_scope: &str) -> String {
    let mut css = theme_css(light, DEFAULT_LIGHT_THEME);
    css.push('\n');
    css.push_str(&scope_selectors(
        &theme_css(dark, DEFAULT_DARK_THEME),
        dark_scope,
    ));
    css
}

fn theme_css(name: &str, fallback: &str) -> String {
    let theme = THEME_SET.themes.get(name).or_else(|| {
        tracing::warn!(theme = %name, %fallback, "unknown highlight theme, using fallback");
        THEME_SET.themes.get(fallback)
    });

    theme
        .and_then(|theme| {
            css_for_theme_with_class_style(theme, CLASS_STYLE)
                .map_err(|e| tracing::warn!(error = %e, "failed to generate theme css"))
                .ok()
        })
        .unwrap_or_default()
}

/// Prefix every selector of a flat stylesheet with `scope`.
fn scope_selectors(css: &str, scope: &str) -> String {
    let mut out = String::with_capacity(css.len() + 64);
    for line in css.lines() {
        match line.trim_end().strip_suffix('{') {
            Some(selectors) if !line.trim_start().starts_with('@') => {
                let scoped: Vec<String> = selectors
                    .split(',')
                    .map(|s| format!("{scope} {}", s.trim()))
                    .collect();
                out.push_str(&scoped.join(", "));
                out.push_str(" {");
            }
            _ => out.push_str(line),
        }
        out.push('\n');
    }
    out
}

/// Names of the bundled highlight themes.
pub fn theme_names() -> impl Iterator<Item = &'static str> {
    THEME_SET.themes.keys().map(String::as_str)
}
