pub mod config;
pub mod content;
pub mod frontmatter;
pub mod markdown;
pub mod nav;
pub mod outline;
pub mod pipeline;
pub mod postprocess;
pub mod scroll;
pub mod search;
pub mod view;
pub mod viewer;

// Re-export main types
pub use config::Config;
pub use content::{ContentStore, DocRequest, DocSet, FetchError, FsStore, HttpStore};
pub use frontmatter::{DocumentMetadata, ParsedDocument, parse};
pub use markdown::{MarkdownRenderer, RenderedMarkdown};
pub use nav::{NavNode, NavTree, NavTrees, is_active};
pub use outline::{Outline, OutlineItem, Slugger, slugify};
pub use pipeline::{Document, Pipeline, RenderedDocument};
pub use scroll::{HeadingBox, Intersection, ScrollCommand, ScrollSpy, Viewport};
pub use search::{NavSearch, SearchBox, SearchProvider};
pub use view::{Theme, ViewError};
pub use viewer::{DocViewer, ViewState};
