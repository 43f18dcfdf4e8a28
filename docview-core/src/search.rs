//! Sidebar search.
//!
//! The viewer talks to search through [`SearchProvider`] only. [`NavSearch`]
//! is the built-in provider: a plain matcher over the pages of a navigation
//! tree. [`SearchBox`] keeps the input state that sits in front of any
//! provider.

use serde::Serialize;

use crate::nav::{NavPage, NavTree};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Anything that turns a query into a list of hits.
///
/// Providers must accept empty and partial queries. A provider that builds
/// its index in the background reports it through `is_indexing` and may
/// return no results until it is done.
pub trait SearchProvider {
    fn set_query(&mut self, term: &str);

    fn results(&self) -> &[SearchHit];

    fn is_indexing(&self) -> bool {
        false
    }
}

struct Entry {
    hit: SearchHit,
    title: String,
    // lowercased description and tags
    extra: String,
}

/// Case-insensitive matcher over page titles, descriptions and tags.
///
/// Every whitespace separated word of the query has to occur somewhere in
/// the page; pages matching by title come first, otherwise tree order is
/// kept.
pub struct NavSearch {
    entries: Vec<Entry>,
    results: Vec<SearchHit>,
}

impl NavSearch {
    pub fn new(tree: &NavTree) -> Self {
        let entries = tree.pages().into_iter().map(Entry::from).collect();
        Self {
            entries,
            results: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&NavPage> for Entry {
    fn from(page: &NavPage) -> Self {
        let mut extra = page.description.clone().unwrap_or_default();
        for tag in page.tags.iter().flatten() {
            extra.push(' ');
            extra.push_str(tag);
        }

        Self {
            hit: SearchHit {
                title: page.title.clone(),
                path: page.path.clone(),
                description: page.description.clone(),
            },
            title: page.title.to_lowercase(),
            extra: extra.to_lowercase(),
        }
    }
}

impl SearchProvider for NavSearch {
    fn set_query(&mut self, term: &str) {
        let words: Vec<String> = term.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            self.results.clear();
            return;
        }

        let mut by_title = Vec::new();
        let mut by_other = Vec::new();
        for entry in &self.entries {
            let in_title = words.iter().all(|w| entry.title.contains(w.as_str()));
            if in_title {
                by_title.push(entry.hit.clone());
            } else if words
                .iter()
                .all(|w| entry.title.contains(w.as_str()) || entry.extra.contains(w.as_str()))
            {
                by_other.push(entry.hit.clone());
            }
        }

        by_title.extend(by_other);
        tracing::debug!(%term, hits = by_title.len(), "search");
        self.results = by_title;
    }

    fn results(&self) -> &[SearchHit] {
        &self.results
    }
}

/// Search input with its results popup.
pub struct SearchBox<P> {
    provider: P,
    term: String,
    visible: bool,
}

impl<P: SearchProvider> SearchBox<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            term: String::new(),
            visible: false,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_indexing(&self) -> bool {
        self.provider.is_indexing()
    }

    pub fn results(&self) -> &[SearchHit] {
        self.provider.results()
    }

    /// The reader typed; the popup shows only for a non-blank term.
    pub fn input(&mut self, term: &str) {
        self.term = term.to_string();
        self.visible = !term.trim().is_empty();
        self.provider.set_query(term);
    }

    /// Focus returns to the box, reopening the popup if there is a term.
    pub fn focus(&mut self) {
        self.visible = !self.term.trim().is_empty();
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn clear(&mut self) {
        self.term.clear();
        self.visible = false;
        self.provider.set_query("");
    }
}
