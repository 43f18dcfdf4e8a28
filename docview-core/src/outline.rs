//! Heading outline and anchor ids.
//!
//! Ids are handed out while the markdown is rendered, so every heading in
//! the final HTML already carries the anchor the outline points at.

use std::collections::HashSet;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineItem {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// Ordered headings of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Outline {
    items: Vec<OutlineItem>,
}

impl Outline {
    pub fn items(&self) -> &[OutlineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Position of `id` in document order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

/// Turn heading text into an anchor-safe slug.
///
/// Only ASCII lowercase letters, digits and single hyphens survive; the
/// result never starts or ends with a hyphen and may be empty.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
        // anything else is dropped without breaking the word
    }

    slug
}

/// Assigns unique ids to the headings of a single document and records the
/// outline as it goes.
#[derive(Debug, Default)]
pub struct Slugger {
    used: HashSet<String>,
    outline: Outline,
}

impl Slugger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the next heading and return the id it should carry.
    ///
    /// An explicit id wins when it is still free. Otherwise the slug of the
    /// text is used, `heading-<index>` when that slug is empty, and
    /// `<slug>-<index>` when it collides with an earlier id.
    pub fn assign(&mut self, explicit: Option<&str>, text: &str, level: u8) -> String {
        let index = self.outline.items.len();
        let text = text.trim();

        let base = match explicit.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let slug = slugify(text);
                if slug.is_empty() {
                    format!("heading-{index}")
                } else {
                    slug
                }
            }
        };

        let id = self.claim(base, index);
        self.outline.items.push(OutlineItem {
            id: id.clone(),
            text: text.to_string(),
            level: level.clamp(1, 6),
        });
        id
    }

    fn claim(&mut self, base: String, index: usize) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }

        let mut candidate = format!("{base}-{index}");
        let mut counter = 1;
        while !self.used.insert(candidate.clone()) {
            candidate = format!("{base}-{index}-{counter}");
            counter += 1;
        }
        tracing::debug!(%base, id = %candidate, "disambiguated duplicate heading id");
        candidate
    }

    pub fn finish(self) -> Outline {
        self.outline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
        assert_eq!(slugify("a -- b"), "a-b");
    }

    #[test]
    fn test_slugify_character_set() {
        let slug = slugify("Step 1: Déjà Vu!");
        assert!(!slug.is_empty());
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        );
        assert!(!slug.starts_with('-'));
        assert!(!slug.ends_with('-'));
        assert!(!slug.contains("--"));
    }

    #[test]
    fn test_slugify_only_symbols() {
        assert_eq!(slugify("!!! ???"), "");
        assert_eq!(slugify("-"), "");
    }

    #[test]
    fn test_duplicate_text_gets_distinct_ids() {
        let mut slugger = Slugger::new();
        let first = slugger.assign(None, "Intro", 2);
        let second = slugger.assign(None, "Intro", 2);
        assert_eq!(first, "intro");
        assert_eq!(second, "intro-1");
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_slug_uses_position() {
        let mut slugger = Slugger::new();
        slugger.assign(None, "Overview", 1);
        assert_eq!(slugger.assign(None, "???", 2), "heading-1");
    }

    #[test]
    fn test_positional_suffix_collision_falls_back_to_counter() {
        let mut slugger = Slugger::new();
        slugger.assign(None, "a", 1);
        slugger.assign(Some("a-2"), "x", 2);
        // index 2 would give "a-2", which the explicit id already took
        assert_eq!(slugger.assign(None, "a", 2), "a-2-1");
    }

    #[test]
    fn test_explicit_id_kept() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.assign(Some("custom"), "Whatever", 3), "custom");
        let outline = slugger.finish();
        assert_eq!(outline.items()[0].text, "Whatever");
        assert_eq!(outline.items()[0].level, 3);
    }

    #[test]
    fn test_outline_lookup() {
        let mut slugger = Slugger::new();
        slugger.assign(None, "Intro", 1);
        slugger.assign(None, "Setup", 2);
        let outline = slugger.finish();
        assert_eq!(outline.len(), 2);
        assert_eq!(outline.position("setup"), Some(1));
        assert!(!outline.contains("missing"));
        assert_eq!(outline.ids().collect::<Vec<_>>(), vec!["intro", "setup"]);
    }
}
