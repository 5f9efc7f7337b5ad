//! Active section tracking.
//!
//! Sections are scanned bottom-most first; the first one whose top edge sits
//! at or above the threshold (px below the viewport top) is active. When
//! several qualify, the one furthest down the page wins.

use crate::geometry::Viewport;
use crate::section::{SectionId, SectionList};
use tracing::debug;

pub const DEFAULT_ACTIVE_THRESHOLD_PX: f32 = 150.0;

#[derive(Debug)]
pub struct SectionActivityTracker {
    sections: SectionList,
    /// Document-space tops, parallel to `sections`; `None` when not laid out.
    tops: Vec<Option<f32>>,
    threshold_px: f32,
    viewport: Viewport,
    current: Option<SectionId>,
}

impl SectionActivityTracker {
    pub fn new(sections: SectionList, threshold_px: f32, viewport: Viewport) -> Self {
        let tops = vec![None; sections.len()];
        Self {
            sections,
            tops,
            threshold_px: if threshold_px.is_finite() {
                threshold_px
            } else {
                DEFAULT_ACTIVE_THRESHOLD_PX
            },
            viewport,
            current: None,
        }
    }

    pub fn sections(&self) -> &SectionList {
        &self.sections
    }

    pub fn threshold_px(&self) -> f32 {
        self.threshold_px
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Replace measured section tops. Extra values are ignored and missing
    /// ones treated as "not laid out".
    pub fn set_tops(&mut self, tops: impl IntoIterator<Item = Option<f32>>) {
        let mut tops: Vec<Option<f32>> = tops
            .into_iter()
            .take(self.sections.len())
            .map(|top| top.filter(|v| v.is_finite()))
            .collect();
        tops.resize(self.sections.len(), None);
        self.tops = tops;
    }

    pub fn set_top(&mut self, id: &SectionId, top: Option<f32>) {
        if let Some(position) = self.sections.position(id) {
            self.tops[position] = top.filter(|v| v.is_finite());
        }
    }

    /// Currently active section.
    pub fn active(&self) -> Option<&SectionId> {
        self.current.as_ref()
    }

    /// Recompute the active section for `scroll_y` (clamped to the
    /// document). Repeated calls with the same input are no-ops.
    pub fn update(&mut self, scroll_y: f32) -> Option<SectionId> {
        let scroll_y = self.viewport.clamp_scroll(scroll_y);
        let next = self.resolve(scroll_y);
        if next != self.current {
            debug!(
                scroll_y,
                from = ?self.current.as_ref().map(SectionId::as_str),
                to = ?next.as_ref().map(SectionId::as_str),
                "Active section changed"
            );
            self.current = next;
        }
        self.current.clone()
    }

    fn resolve(&self, scroll_y: f32) -> Option<SectionId> {
        self.sections
            .iter()
            .zip(&self.tops)
            .rev()
            .find(|(section, top)| {
                let threshold = section.trigger_offset.unwrap_or(self.threshold_px);
                matches!(top, Some(top) if *top - scroll_y <= threshold)
            })
            .map(|(section, _)| section.id.clone())
    }
}
