//! Front-matter splitting.
//!
//! A document may open with a YAML block fenced by `---` (closed by `---` or
//! `...`) or a TOML block fenced by `+++`. Anything wrong with the block is
//! logged and treated as "no metadata"; the body always survives.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Free-form document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DocumentMetadata(BTreeMap<String, Value>);

impl DocumentMetadata {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.get("description").and_then(Value::as_str)
    }

    /// Tags, when `tags` is a list. Non-string entries are skipped.
    pub fn tags(&self) -> Option<Vec<&str>> {
        self.get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for DocumentMetadata {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// Metadata plus the markdown that follows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocument {
    pub metadata: DocumentMetadata,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Toml,
}

impl Format {
    fn from_opening(line: &str) -> Option<Self> {
        match line {
            "---" => Some(Format::Yaml),
            "+++" => Some(Format::Toml),
            _ => None,
        }
    }

    fn closes(self, line: &str) -> bool {
        match self {
            Format::Yaml => line == "---" || line == "...",
            Format::Toml => line == "+++",
        }
    }
}

struct Block<'a> {
    format: Format,
    content: &'a str,
    body: &'a str,
}

/// Split raw document text into metadata and body.
pub fn parse(raw: &str) -> ParsedDocument {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let Some(block) = split_block(text) else {
        return ParsedDocument {
            metadata: DocumentMetadata::default(),
            body: raw.to_string(),
        };
    };

    let metadata = match block.format {
        Format::Yaml => parse_yaml(block.content),
        Format::Toml => parse_toml(block.content),
    }
    .unwrap_or_default();

    ParsedDocument {
        metadata,
        body: block.body.to_string(),
    }
}

fn split_block(text: &str) -> Option<Block<'_>> {
    let mut lines = text.split_inclusive('\n');
    let opening = lines.next()?;
    if !opening.ends_with('\n') {
        return None;
    }
    let format = Format::from_opening(opening.trim_end())?;

    let content_start = opening.len();
    let mut offset = content_start;
    for line in lines {
        let line_start = offset;
        offset += line.len();
        if format.closes(line.trim_end()) {
            return Some(Block {
                format,
                content: &text[content_start..line_start],
                body: &text[offset..],
            });
        }
    }

    tracing::warn!("front matter block is not terminated, rendering it as body");
    None
}

fn parse_yaml(content: &str) -> Option<DocumentMetadata> {
    if content.trim().is_empty() {
        return None;
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| tracing::warn!(error = %e, "ignoring unparsable YAML front matter"))
        .ok()?;
    into_metadata(serde_json::to_value(yaml).ok()?)
}

fn parse_toml(content: &str) -> Option<DocumentMetadata> {
    if content.trim().is_empty() {
        return None;
    }

    let table: toml::Table = toml::from_str(content)
        .map_err(|e| tracing::warn!(error = %e, "ignoring unparsable TOML front matter"))
        .ok()?;
    into_metadata(serde_json::to_value(table).ok()?)
}

fn into_metadata(value: Value) -> Option<DocumentMetadata> {
    match value {
        Value::Object(map) => Some(DocumentMetadata(map.into_iter().collect())),
        Value::Null => None,
        other => {
            tracing::warn!(kind = ?other, "front matter is not a key/value mapping");
            None
        }
    }
}
