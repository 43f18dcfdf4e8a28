//! Scroll-spy for the table of contents.
//!
//! [`ScrollSpy`] owns the single "active heading" slot. It changes only
//! when an intersection batch arrives (directly, or derived from a scroll
//! position by [`ScrollSpy::on_scroll`]) or when the reader jumps to a
//! heading. Installing a new outline always tears the old observation down
//! first, so nothing from the previous document can become active again.

use std::collections::HashSet;

use crate::config::ScrollConfig;
use crate::outline::Outline;

/// Visible part of the document, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top: f64,
    pub height: f64,
}

/// Where a heading sits in the laid out document.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingBox {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl HeadingBox {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Visibility change of one observed heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intersection {
    pub id: String,
    pub is_intersecting: bool,
}

impl Intersection {
    pub fn enter(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_intersecting: true,
        }
    }

    pub fn leave(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_intersecting: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Scroll request for the host; nothing waits for it to finish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone)]
pub struct ScrollSpy {
    config: ScrollConfig,
    observed: Vec<String>,
    inside: HashSet<String>,
    active: Option<String>,
}

impl Default for ScrollSpy {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

impl ScrollSpy {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            observed: Vec::new(),
            inside: HashSet::new(),
            active: None,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_observing(&self, id: &str) -> bool {
        self.observed.iter().any(|observed| observed == id)
    }

    pub fn observed(&self) -> &[String] {
        &self.observed
    }

    /// Start tracking `outline`, dropping whatever was tracked before.
    pub fn observe(&mut self, outline: &Outline) {
        self.disconnect();
        self.observed = outline.ids().map(str::to_string).collect();
        tracing::debug!(headings = self.observed.len(), "observing outline");
    }

    /// Stop tracking. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        if !self.observed.is_empty() || self.active.is_some() {
            tracing::debug!(headings = self.observed.len(), "observer disconnected");
        }
        self.observed.clear();
        self.inside.clear();
        self.active = None;
    }

    /// Trigger band `[start, end]` for a viewport, in document coordinates.
    pub fn band(&self, viewport: Viewport) -> (f64, f64) {
        let start = viewport.top + viewport.height * self.config.top_margin;
        let end = viewport.top + viewport.height * (1.0 - self.config.bottom_margin);
        (start, end)
    }

    /// Apply one batch of visibility changes.
    ///
    /// Entries for headings that are not observed are ignored. When several
    /// headings enter in the same batch, the one first in document order
    /// wins. Returns `true` if the active heading changed.
    pub fn on_intersections(&mut self, entries: &[Intersection]) -> bool {
        let mut winner: Option<usize> = None;

        for entry in entries {
            let Some(position) = self.observed.iter().position(|id| *id == entry.id) else {
                tracing::trace!(id = %entry.id, "ignoring entry for unobserved heading");
                continue;
            };

            if entry.is_intersecting {
                self.inside.insert(entry.id.clone());
                winner = Some(winner.map_or(position, |best| best.min(position)));
            } else {
                self.inside.remove(&entry.id);
            }
        }

        let Some(position) = winner else {
            return false;
        };
        let id = &self.observed[position];
        if self.active.as_deref() == Some(id.as_str()) {
            return false;
        }

        tracing::debug!(%id, "active heading");
        self.active = Some(id.clone());
        true
    }

    /// Derive intersection changes from a scroll position and apply them.
    ///
    /// `layout` holds the current boxes of the document's headings; boxes
    /// for ids that are not observed are skipped.
    pub fn on_scroll(&mut self, viewport: Viewport, layout: &[HeadingBox]) -> bool {
        let (start, end) = self.band(viewport);
        let mut entries = Vec::new();

        for id in &self.observed {
            let Some(heading) = layout.iter().find(|b| b.id == *id) else {
                continue;
            };
            let now = heading.top <= end && heading.bottom() >= start;
            if now != self.inside.contains(id) {
                entries.push(Intersection {
                    id: id.clone(),
                    is_intersecting: now,
                });
            }
        }

        self.on_intersections(&entries)
    }

    /// Scroll so the heading sits `offset` pixels below the viewport top
    /// (the configured jump offset when `None`), and mark it active now
    /// instead of waiting for the next intersection.
    pub fn jump_to(
        &mut self,
        id: &str,
        offset: Option<f64>,
        layout: &[HeadingBox],
    ) -> Option<ScrollCommand> {
        if !self.is_observing(id) {
            tracing::debug!(%id, "jump target is not in the observed outline");
            return None;
        }
        let Some(heading) = layout.iter().find(|b| b.id == id) else {
            tracing::debug!(%id, "jump target not found");
            return None;
        };

        let offset = offset.unwrap_or(self.config.jump_offset);
        let top = (heading.top - offset).max(0.0);
        tracing::debug!(%id, top, offset, "jumping to heading");

        self.active = Some(id.to_string());
        Some(ScrollCommand {
            top,
            behavior: ScrollBehavior::Smooth,
        })
    }
}
