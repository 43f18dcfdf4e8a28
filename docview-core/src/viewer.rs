//! Per-view load state.
//!
//! A [`DocViewer`] shows one document at a time. Every navigation starts a
//! new generation; a result that arrives for an older generation is dropped,
//! so a slow response can never overwrite the document the reader asked for
//! last.

use crate::config::{Config, ContentConfig, SiteConfig};
use crate::content::{ContentStore, DocRequest, FetchError};
use crate::outline::Outline;
use crate::pipeline::{Document, Pipeline};
use crate::scroll::ScrollSpy;

pub const LOADING_TITLE: &str = "Loading...";
pub const ERROR_TITLE: &str = "Error";

/// What the viewer shows for a failed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub request: DocRequest,
    pub error: FetchError,
    pub home: String,
    pub default_document: Option<String>,
}

impl Failure {
    /// Message naming both the cause and the location that was tried.
    pub fn message(&self) -> String {
        format!(
            "Failed to load the document: {}. Check that the path '{}' is correct.",
            self.error.reason, self.error.locator
        )
    }
}

#[derive(Debug, Clone)]
pub enum ViewState {
    Idle,
    Loading(DocRequest),
    Ready(Box<Document>),
    Failed(Failure),
}

/// Handle for one pending load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    request: DocRequest,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &DocRequest {
        &self.request
    }
}

pub struct DocViewer<S> {
    store: S,
    pipeline: Pipeline,
    content: ContentConfig,
    site: SiteConfig,
    state: ViewState,
    generation: u64,
    spy: ScrollSpy,
}

impl<S: ContentStore> DocViewer<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            pipeline: Pipeline::new(&config.content),
            content: config.content.clone(),
            site: config.site.clone(),
            state: ViewState::Idle,
            generation: 0,
            spy: ScrollSpy::new(config.scroll),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn spy(&self) -> &ScrollSpy {
        &self.spy
    }

    /// The scroll-spy, for feeding it intersection and scroll events.
    pub fn spy_mut(&mut self) -> &mut ScrollSpy {
        &mut self.spy
    }

    pub fn document(&self) -> Option<&Document> {
        match &self.state {
            ViewState::Ready(document) => Some(document),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.state {
            ViewState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn outline(&self) -> Option<&Outline> {
        self.document().map(|document| &document.outline)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading(_))
    }

    pub fn title(&self) -> &str {
        match &self.state {
            ViewState::Idle | ViewState::Loading(_) => LOADING_TITLE,
            ViewState::Ready(document) => document.display_title(),
            ViewState::Failed(_) => ERROR_TITLE,
        }
    }

    /// Locator of the source text for `request`.
    pub fn source_locator(&self, request: &DocRequest) -> String {
        request.source_locator(&self.content.prefix, self.content.extension.as_deref())
    }

    /// Start loading `request`.
    ///
    /// Whatever was shown before is cleared and the scroll-spy stops
    /// observing it, even if the new load later fails.
    pub fn begin(&mut self, request: DocRequest) -> Ticket {
        self.generation += 1;
        self.spy.disconnect();
        self.state = ViewState::Loading(request.clone());
        tracing::debug!(generation = self.generation, route = %request.route(), "loading document");

        Ticket {
            generation: self.generation,
            request,
        }
    }

    /// Fetch the raw text for a ticket from the store.
    pub fn fetch(&self, ticket: &Ticket) -> Result<String, FetchError> {
        self.store.fetch(&self.source_locator(&ticket.request))
    }

    /// Apply the outcome of a load.
    ///
    /// Returns `false`, leaving the state untouched, when `ticket` has been
    /// superseded by a later [`begin`](Self::begin).
    pub fn complete(&mut self, ticket: Ticket, result: Result<String, FetchError>) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded load"
            );
            return false;
        }

        match result {
            Ok(raw) => {
                let document = self.pipeline.process(&ticket.request, &raw);
                self.spy.observe(&document.outline);
                tracing::info!(
                    route = %ticket.request.route(),
                    title = document.display_title(),
                    "document ready"
                );
                self.state = ViewState::Ready(Box::new(document));
            }
            Err(error) => {
                tracing::warn!(%error, "document failed to load");
                self.spy.disconnect();
                self.state = ViewState::Failed(Failure {
                    request: ticket.request,
                    error,
                    home: self.site.home.clone(),
                    default_document: self.site.default_document.clone(),
                });
            }
        }
        true
    }

    /// Begin, fetch and complete in one go.
    pub fn load(&mut self, request: DocRequest) -> &ViewState {
        let ticket = self.begin(request);
        let result = self.fetch(&ticket);
        self.complete(ticket, result);
        &self.state
    }
}
