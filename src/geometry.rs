//! Viewport metrics and read-only element geometry.
//!
//! Everything here is expressed in document pixels with the y axis pointing
//! down the page. The core never measures anything itself; hosts hand it a
//! [`LayoutSource`] and the session copies what it needs into a snapshot.

use std::collections::HashMap;
use std::fmt;

/// Identifier of a laid-out element (an anchor, a card, a heading).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Read-only access to element positions.
pub trait LayoutSource {
    /// Document-space top edge of `id`, or `None` when it is not displayed.
    fn element_top(&self, id: &ElementId) -> Option<f32>;
}

impl<T: LayoutSource + ?Sized> LayoutSource for &T {
    fn element_top(&self, id: &ElementId) -> Option<f32> {
        (**self).element_top(id)
    }
}

/// Fixed table of element positions, handy for hosts that precompute layout.
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    tops: HashMap<ElementId, f32>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<ElementId>, top: f32) -> Self {
        self.insert(id, top);
        self
    }

    pub fn insert(&mut self, id: impl Into<ElementId>, top: f32) {
        self.tops.insert(id.into(), sanitize_px(top));
    }

    pub fn remove(&mut self, id: &ElementId) -> Option<f32> {
        self.tops.remove(id)
    }

    pub fn len(&self) -> usize {
        self.tops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tops.is_empty()
    }
}

impl LayoutSource for StaticLayout {
    fn element_top(&self, id: &ElementId) -> Option<f32> {
        self.tops.get(id).copied()
    }
}

/// Visible window height and total scrollable document height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    height: f32,
    document_height: f32,
}

impl Viewport {
    pub fn new(height: f32, document_height: f32) -> Self {
        Self {
            height: sanitize_px(height).max(0.0),
            document_height: sanitize_px(document_height).max(0.0),
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn document_height(&self) -> f32 {
        self.document_height
    }

    /// Largest reachable scroll offset.
    pub fn max_scroll(&self) -> f32 {
        (self.document_height - self.height).max(0.0)
    }

    /// Clamp a raw scroll offset into `[0, max_scroll]`.
    pub fn clamp_scroll(&self, scroll_y: f32) -> f32 {
        sanitize_px(scroll_y).clamp(0.0, self.max_scroll())
    }

    /// `scroll_y / (document_height - viewport_height)` clamped to `[0, 1]`.
    ///
    /// A document that fits entirely inside the viewport reports `0.0`.
    pub fn scroll_progress(&self, scroll_y: f32) -> f32 {
        let range = self.max_scroll();
        if range <= f32::EPSILON {
            return 0.0;
        }
        (self.clamp_scroll(scroll_y) / range).clamp(0.0, 1.0)
    }
}

pub(crate) fn sanitize_px(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}
