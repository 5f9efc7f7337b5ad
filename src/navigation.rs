//! State consumed by the navigation bar.
//!
//! The session writes into [`NavigationState`] after each mutation pass;
//! presenters read it (or a serialized [`NavigationSnapshot`]) to style the
//! active link, draw the progress bar and show the mobile menu.

use crate::geometry::Viewport;
use crate::section::SectionId;
use serde::Serialize;
use ts_rs::TS;

pub const DEFAULT_SCROLLED_THRESHOLD_PX: f32 = 100.0;

/// Element id animated when the mobile menu opens.
pub const MOBILE_MENU_ELEMENT: &str = "mobile-menu";

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct NavigationSnapshot {
    pub active_section: Option<String>,
    pub progress: f32,
    pub scrolled: bool,
    pub mobile_menu_open: bool,
}

/// Which pieces of navigation state changed in one write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationChanges {
    pub active: bool,
    pub progress: bool,
    pub scrolled: bool,
}

#[derive(Debug)]
pub struct NavigationState {
    active: Option<SectionId>,
    progress: f32,
    scrolled: bool,
    mobile_menu_open: bool,
    scrolled_threshold_px: f32,
}

impl NavigationState {
    pub fn new(scrolled_threshold_px: f32) -> Self {
        Self {
            active: None,
            progress: 0.0,
            scrolled: false,
            mobile_menu_open: false,
            scrolled_threshold_px: if scrolled_threshold_px.is_finite() {
                scrolled_threshold_px
            } else {
                DEFAULT_SCROLLED_THRESHOLD_PX
            },
        }
    }

    pub fn active_section(&self) -> Option<&SectionId> {
        self.active.as_ref()
    }

    pub fn is_link_active(&self, id: &SectionId) -> bool {
        self.active.as_ref() == Some(id)
    }

    /// Scroll progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    pub fn is_mobile_menu_open(&self) -> bool {
        self.mobile_menu_open
    }

    /// Record tracker output and scroll metrics in a single write.
    pub fn apply(
        &mut self,
        active: Option<SectionId>,
        scroll_y: f32,
        viewport: &Viewport,
    ) -> NavigationChanges {
        let progress = viewport.scroll_progress(scroll_y);
        let scrolled = viewport.clamp_scroll(scroll_y) > self.scrolled_threshold_px;

        let changes = NavigationChanges {
            active: active != self.active,
            progress: (progress - self.progress).abs() > f32::EPSILON,
            scrolled: scrolled != self.scrolled,
        };
        self.active = active;
        self.progress = progress;
        self.scrolled = scrolled;
        changes
    }

    /// Returns the new open state.
    pub fn toggle_mobile_menu(&mut self) -> bool {
        self.mobile_menu_open = !self.mobile_menu_open;
        self.mobile_menu_open
    }

    /// Returns `true` when the menu was open.
    pub fn close_mobile_menu(&mut self) -> bool {
        std::mem::replace(&mut self.mobile_menu_open, false)
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot {
            active_section: self.active.as_ref().map(|id| id.as_str().to_string()),
            progress: self.progress,
            scrolled: self.scrolled,
            mobile_menu_open: self.mobile_menu_open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_only_what_changed() {
        let viewport = Viewport::new(900.0, 2900.0);
        let mut nav = NavigationState::new(DEFAULT_SCROLLED_THRESHOLD_PX);

        let first = nav.apply(Some("hero".into()), 50.0, &viewport);
        assert!(first.active);
        assert!(first.progress);
        assert!(!first.scrolled);

        let second = nav.apply(Some("hero".into()), 50.0, &viewport);
        assert_eq!(second, NavigationChanges::default());

        let third = nav.apply(Some("hero".into()), 150.0, &viewport);
        assert!(!third.active);
        assert!(third.scrolled);
        assert!(nav.is_scrolled());
    }

    #[test]
    fn progress_is_clamped() {
        let viewport = Viewport::new(900.0, 2900.0);
        let mut nav = NavigationState::new(100.0);
        nav.apply(None, 10_000.0, &viewport);
        assert_eq!(nav.progress(), 1.0);
        nav.apply(None, -10.0, &viewport);
        assert_eq!(nav.progress(), 0.0);
        assert!(!nav.is_scrolled());
    }

    #[test]
    fn active_link_matches_section() {
        let viewport = Viewport::new(900.0, 2900.0);
        let mut nav = NavigationState::new(100.0);
        nav.apply(Some("skills".into()), 1200.0, &viewport);
        assert!(nav.is_link_active(&"skills".into()));
        assert!(!nav.is_link_active(&"about".into()));
        assert_eq!(nav.snapshot().active_section.as_deref(), Some("skills"));
    }

    #[test]
    fn mobile_menu_toggles_and_closes() {
        let mut nav = NavigationState::new(100.0);
        assert!(nav.toggle_mobile_menu());
        assert!(nav.close_mobile_menu());
        assert!(!nav.close_mobile_menu());
        assert!(!nav.is_mobile_menu_open());
    }
}
