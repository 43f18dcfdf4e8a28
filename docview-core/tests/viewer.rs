use docview_core::scroll::{HeadingBox, Intersection, Viewport};
use docview_core::viewer::{ERROR_TITLE, ViewState};
use docview_core::{Config, DocRequest, DocSet, DocViewer, FsStore, Theme};
use tempfile::TempDir;

fn site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs/public/guide");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(
        docs.join("a.md"),
        "---\ntitle: Document A\n---\n# Intro\n\nSome text.\n\n## Setup\n\nMore text.\n",
    )
    .unwrap();
    std::fs::write(
        docs.join("b.md"),
        "---\ntitle: Document B\n---\n# Overview\n\n## Usage\n",
    )
    .unwrap();
    dir
}

fn viewer(dir: &TempDir) -> DocViewer<FsStore> {
    DocViewer::new(FsStore::new(dir.path()), &Config::default())
}

#[test]
fn missing_document_shows_error_without_stale_content() {
    let dir = site();
    let mut viewer = viewer(&dir);

    viewer.load(DocRequest::new(DocSet::Public, "guide/a"));
    assert_eq!(viewer.title(), "Document A");

    viewer.load(DocRequest::new(DocSet::Public, "guide/missing"));
    assert_eq!(viewer.title(), ERROR_TITLE);
    assert!(viewer.document().is_none());
    assert!(viewer.outline().is_none());
    assert_eq!(viewer.spy().active(), None);

    let failure = viewer.failure().unwrap();
    let message = failure.message();
    assert!(message.contains("Not Found"));
    assert!(message.contains("/docs/public/guide/missing.md"));

    let config = Config::default();
    let page = Theme::builtin(&config.render)
        .unwrap()
        .render_viewer(&config.site, &viewer, None)
        .unwrap();
    assert!(page.contains("<h1>Error</h1>"));
    assert!(!page.contains("Some text."));
    assert!(!page.contains("Document A"));
}

#[test]
fn switching_documents_leaves_no_active_heading() {
    let dir = site();
    let mut viewer = viewer(&dir);

    viewer.load(DocRequest::new(DocSet::Public, "guide/a"));
    let ids: Vec<_> = viewer.outline().unwrap().ids().collect();
    assert_eq!(ids, vec!["intro", "setup"]);

    viewer
        .spy_mut()
        .on_intersections(&[Intersection::enter("setup")]);
    assert_eq!(viewer.spy().active(), Some("setup"));

    viewer.load(DocRequest::new(DocSet::Public, "guide/b"));
    assert_eq!(viewer.spy().active(), None);
    assert!(!viewer.spy().is_observing("setup"));

    // late events from A's layout are ignored
    assert!(!viewer
        .spy_mut()
        .on_intersections(&[Intersection::enter("setup")]));
    assert_eq!(viewer.spy().active(), None);

    // B's own headings still work
    let layout = [
        HeadingBox::new("overview", 0.0, 40.0),
        HeadingBox::new("usage", 700.0, 30.0),
    ];
    let viewport = Viewport {
        top: 400.0,
        height: 1000.0,
    };
    assert!(viewer.spy_mut().on_scroll(viewport, &layout));
    assert_eq!(viewer.spy().active(), Some("usage"));
}

#[test]
fn superseded_load_never_overwrites_newer_document() {
    let dir = site();
    let mut viewer = viewer(&dir);

    let slow = viewer.begin(DocRequest::new(DocSet::Public, "guide/a"));
    let fast = viewer.begin(DocRequest::new(DocSet::Public, "guide/b"));

    let fast_result = viewer.fetch(&fast);
    assert!(viewer.complete(fast, fast_result));
    let slow_result = viewer.fetch(&slow);
    assert!(!viewer.complete(slow, slow_result));

    assert_eq!(viewer.title(), "Document B");
    assert!(matches!(viewer.state(), ViewState::Ready(_)));
}

#[test]
fn jump_marks_heading_and_offsets_scroll() {
    let dir = site();
    let mut viewer = viewer(&dir);
    viewer.load(DocRequest::new(DocSet::Public, "guide/a"));

    let layout = [
        HeadingBox::new("intro", 0.0, 40.0),
        HeadingBox::new("setup", 1200.0, 30.0),
    ];
    let command = viewer.spy_mut().jump_to("setup", None, &layout).unwrap();
    assert_eq!(command.top, 1100.0);
    assert_eq!(viewer.spy().active(), Some("setup"));
}

#[test]
fn jump_ignores_heading_left_over_from_previous_document() {
    let dir = site();
    let mut viewer = viewer(&dir);
    viewer.load(DocRequest::new(DocSet::Public, "guide/a"));
    viewer.load(DocRequest::new(DocSet::Public, "guide/b"));

    let stale_layout = [HeadingBox::new("setup", 1200.0, 30.0)];
    assert!(viewer.spy_mut().jump_to("setup", None, &stale_layout).is_none());
    assert_eq!(viewer.spy().active(), None);
}
