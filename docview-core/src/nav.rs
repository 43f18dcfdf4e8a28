//! Static navigation trees.
//!
//! The tree JSON keeps the shape the sidebar has always used: sections are
//! objects with `section` and `pages`, pages carry `title` and `path`.

use std::borrow::Cow;
use std::path::Path;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::content::DocSet;

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("failed to read navigation tree: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid navigation tree: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavPage {
    pub title: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavSection {
    #[serde(rename = "section")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "pages", default)]
    pub children: Vec<NavNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavNode {
    Section(NavSection),
    Page(NavPage),
}

/// Percent-decode a URL path, keeping invalid UTF-8 sequences visible.
pub fn decode_path(path: &str) -> Cow<'_, str> {
    percent_decode_str(path).decode_utf8_lossy()
}

/// Whether `candidate` names the page at `current`.
///
/// Both sides are percent-decoded and compared whole; a shared prefix is
/// never enough.
pub fn is_active(current: &str, candidate: &str) -> bool {
    decode_path(current) == decode_path(candidate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Section,
    Page,
}

/// One line of a flattened tree, ready for a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavRow {
    pub kind: RowKind,
    pub depth: usize,
    pub label: String,
    pub path: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavTree {
    nodes: Vec<NavNode>,
}

impl NavTree {
    pub fn new(nodes: Vec<NavNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[NavNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The page whose path matches `current`, if any.
    pub fn active_page(&self, current: &str) -> Option<&NavPage> {
        fn find<'a>(nodes: &'a [NavNode], current: &str) -> Option<&'a NavPage> {
            nodes.iter().find_map(|node| match node {
                NavNode::Page(page) => is_active(current, &page.path).then_some(page),
                NavNode::Section(section) => find(&section.children, current),
            })
        }
        find(&self.nodes, current)
    }

    /// First reachable path in depth-first order, used as the landing page.
    ///
    /// A section with pages is entered; an empty section counts only when it
    /// has its own path.
    pub fn first_page(&self) -> Option<&str> {
        fn first(nodes: &[NavNode]) -> Option<&str> {
            nodes.iter().find_map(|node| match node {
                NavNode::Page(page) => Some(page.path.as_str()),
                NavNode::Section(section) if !section.children.is_empty() => {
                    first(&section.children)
                }
                NavNode::Section(section) => section.path.as_deref(),
            })
        }
        first(&self.nodes)
    }

    /// Every page in tree order.
    pub fn pages(&self) -> Vec<&NavPage> {
        fn collect<'a>(nodes: &'a [NavNode], out: &mut Vec<&'a NavPage>) {
            for node in nodes {
                match node {
                    NavNode::Page(page) => out.push(page),
                    NavNode::Section(section) => collect(&section.children, out),
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.nodes, &mut out);
        out
    }

    /// Flatten the tree into rows, marking the page that matches `current`.
    pub fn rows(&self, current: &str) -> Vec<NavRow> {
        fn walk(nodes: &[NavNode], depth: usize, current: &str, out: &mut Vec<NavRow>) {
            for node in nodes {
                match node {
                    NavNode::Page(page) => out.push(NavRow {
                        kind: RowKind::Page,
                        depth,
                        label: page.title.clone(),
                        path: Some(page.path.clone()),
                        active: is_active(current, &page.path),
                    }),
                    NavNode::Section(section) => {
                        out.push(NavRow {
                            kind: RowKind::Section,
                            depth,
                            label: section.name.clone(),
                            path: section.path.clone(),
                            active: false,
                        });
                        walk(&section.children, depth + 1, current, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, 0, current, &mut out);
        out
    }
}

/// Both navigation trees, as shipped in the site's docs map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavTrees {
    #[serde(default)]
    pub public: NavTree,
    #[serde(default)]
    pub internal: NavTree,
}

impl NavTrees {
    pub fn from_json(json: &str) -> Result<Self, NavError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NavError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let trees = Self::from_json(&data)?;
        tracing::info!(
            path = %path.as_ref().display(),
            public = trees.public.pages().len(),
            internal = trees.internal.pages().len(),
            "loaded navigation trees"
        );
        Ok(trees)
    }

    pub fn get(&self, docset: DocSet) -> &NavTree {
        match docset {
            DocSet::Public => &self.public,
            DocSet::Internal => &self.internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCS_MAP: &str = r#"{
        "public": [
            { "title": "Welcome", "path": "/public/welcome" },
            {
                "section": "Guides",
                "pages": [
                    { "title": "A B", "path": "/public/guides/a%20b", "order": 1 },
                    {
                        "section": "Advanced",
                        "path": "/public/guides/advanced",
                        "pages": [
                            { "title": "Tuning", "path": "/public/guides/advanced/tuning", "tags": ["perf"] }
                        ]
                    }
                ]
            }
        ],
        "internal": [
            { "section": "Empty", "path": "/internal/empty", "pages": [] },
            { "title": "Ops", "path": "/internal/ops" }
        ]
    }"#;

    fn trees() -> NavTrees {
        NavTrees::from_json(DOCS_MAP).unwrap()
    }

    #[test]
    fn test_is_active_decodes_both_sides() {
        assert!(is_active("/public/a b", "/public/a%20b"));
        assert!(is_active("/public/a%20b", "/public/a b"));
        assert!(!is_active("/public/ab", "/public/a"));
        assert!(!is_active("/public/a", "/public/ab"));
    }

    #[test]
    fn test_variants_parsed() {
        let trees = trees();
        let nodes = trees.public.nodes();
        assert!(matches!(&nodes[0], NavNode::Page(p) if p.title == "Welcome"));
        match &nodes[1] {
            NavNode::Section(section) => {
                assert_eq!(section.name, "Guides");
                assert_eq!(section.path, None);
                assert_eq!(section.children.len(), 2);
            }
            NavNode::Page(_) => panic!("expected a section"),
        }
    }

    #[test]
    fn test_active_page_nested() {
        let trees = trees();
        let page = trees.public.active_page("/public/guides/a b").unwrap();
        assert_eq!(page.title, "A B");
        let deep = trees
            .public
            .active_page("/public/guides/advanced/tuning")
            .unwrap();
        assert_eq!(deep.tags.as_deref(), Some(&["perf".to_string()][..]));
        assert!(trees.public.active_page("/public/guides").is_none());
    }

    #[test]
    fn test_section_path_never_active() {
        let trees = trees();
        let rows = trees.public.rows("/public/guides/advanced");
        assert!(rows.iter().all(|row| !row.active));
    }

    #[test]
    fn test_rows_depth_and_active() {
        let trees = trees();
        let rows = trees.public.rows("/public/guides/advanced/tuning");
        let summary: Vec<_> = rows
            .iter()
            .map(|r| (r.kind, r.depth, r.label.as_str(), r.active))
            .collect();
        assert_eq!(
            summary,
            vec![
                (RowKind::Page, 0, "Welcome", false),
                (RowKind::Section, 0, "Guides", false),
                (RowKind::Page, 1, "A B", false),
                (RowKind::Section, 1, "Advanced", false),
                (RowKind::Page, 2, "Tuning", true),
            ]
        );
    }

    #[test]
    fn test_first_page() {
        let trees = trees();
        assert_eq!(trees.public.first_page(), Some("/public/welcome"));
        assert_eq!(trees.internal.first_page(), Some("/internal/empty"));
        assert_eq!(NavTree::default().first_page(), None);
    }

    #[test]
    fn test_pages_in_order() {
        let trees = trees();
        let titles: Vec<_> = trees.public.pages().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Welcome", "A B", "Tuning"]);
        assert_eq!(trees.get(DocSet::Internal).pages().len(), 1);
    }

    #[test]
    fn test_round_trip_shape() {
        let trees = trees();
        let json = serde_json::to_value(&trees.internal).unwrap();
        assert_eq!(json[0]["section"], "Empty");
        assert_eq!(json[1]["title"], "Ops");
    }
}
