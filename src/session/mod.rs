//! Page session.
//!
//! A [`ScrollSession`] is created explicitly for one page, owns the observer,
//! tracker, controller and navigation state, and is torn down explicitly with
//! [`ScrollSession::teardown`]. Hosts feed it [`Message`]s and execute the
//! returned [`Effect`]s.

mod messages;
mod scope;
mod snapshot;
mod update;

pub use messages::Message;
pub use scope::ScrollScope;
pub use update::Effect;

use crate::controller::{AnimationPlaybackController, AnimationSpec};
use crate::ease::{Ease, EaseKind};
use crate::geometry::{ElementId, LayoutSource, Viewport};
use crate::navigation::{DEFAULT_SCROLLED_THRESHOLD_PX, NavigationSnapshot, NavigationState};
use crate::observer::{Subscription, ViewportObserver};
use crate::section::{SectionId, SectionList};
use crate::timeline::{Timeline, VisualState};
use crate::tracker::{DEFAULT_ACTIVE_THRESHOLD_PX, SectionActivityTracker};
use tracing::{debug, info};

const INTRO_KEY: &str = "intro";
const MOBILE_MENU_KEY: &str = "mobile-menu";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub active_threshold_px: f32,
    pub scrolled_threshold_px: f32,
    pub smooth_navigation: bool,
    /// Entrance played on the mobile menu each time it opens.
    pub mobile_menu: AnimationSpec,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            active_threshold_px: DEFAULT_ACTIVE_THRESHOLD_PX,
            scrolled_threshold_px: DEFAULT_SCROLLED_THRESHOLD_PX,
            smooth_navigation: true,
            mobile_menu: AnimationSpec::default()
                .from_state(VisualState::hidden().with_y(-20.0))
                .to_state(VisualState::IDENTITY)
                .duration(0.3)
                .ease(Ease::Power {
                    degree: 2,
                    kind: EaseKind::Out,
                }),
        }
    }
}

#[derive(Debug)]
pub struct ScrollSession {
    settings: SessionSettings,
    observer: ViewportObserver,
    tracker: SectionActivityTracker,
    controller: AnimationPlaybackController,
    navigation: NavigationState,
    viewport: Viewport,
    scroll_y: f32,
    /// Scroll or layout changed since the last measurement pass.
    dirty: bool,
    /// A frame has been requested and not yet delivered.
    frame_requested: bool,
    clock: f64,
}

impl ScrollSession {
    pub fn new(settings: SessionSettings, sections: SectionList, viewport: Viewport) -> Self {
        info!(
            sections = sections.len(),
            viewport_height = viewport.height(),
            document_height = viewport.document_height(),
            "Scroll session started"
        );
        let tracker = SectionActivityTracker::new(sections, settings.active_threshold_px, viewport);
        let navigation = NavigationState::new(settings.scrolled_threshold_px);
        Self {
            settings,
            observer: ViewportObserver::new(),
            tracker,
            controller: AnimationPlaybackController::new(),
            navigation,
            viewport,
            scroll_y: 0.0,
            dirty: true,
            frame_requested: false,
            clock: 0.0,
        }
    }

    /// Animate `element` when it scrolls past its trigger line.
    pub fn register_scroll_animation(
        &mut self,
        element: impl Into<ElementId>,
        spec: &AnimationSpec,
    ) -> Subscription {
        self.register_group(element, Vec::new(), spec)
    }

    /// Animate `targets` in list order, `spec.stagger` apart, when `trigger`
    /// scrolls past its trigger line.
    pub fn register_group(
        &mut self,
        trigger: impl Into<ElementId>,
        targets: Vec<ElementId>,
        spec: &AnimationSpec,
    ) -> Subscription {
        let trigger = trigger.into();
        let subscription = self.observer.register(trigger.clone(), spec.trigger_fraction);
        self.controller.install(trigger, targets, spec);
        self.dirty = true;
        subscription
    }

    /// Stop observing and cancel any playback for the subscription's element.
    /// Stale subscriptions (already released or replaced) are ignored.
    pub fn unregister(&mut self, subscription: &Subscription) -> bool {
        if !self.observer.unregister(subscription) {
            return false;
        }
        self.controller.cancel(subscription.element());
        true
    }

    pub fn is_registered(&self, subscription: &Subscription) -> bool {
        self.observer.is_active(subscription)
    }

    /// Play the page intro timeline once.
    pub fn play_intro(&mut self, timeline: Timeline) {
        self.controller.play_one_shot(INTRO_KEY, timeline);
    }

    pub fn active_section(&self) -> Option<&SectionId> {
        self.navigation.active_section()
    }

    pub fn scroll_progress(&self) -> f32 {
        self.navigation.progress()
    }

    /// Smooth-scroll request for `section`; see [`Message::Navigate`].
    pub fn navigate_to(&mut self, section: SectionId, layout: &impl LayoutSource) -> Vec<Effect> {
        self.reduce(Message::Navigate(section), layout)
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn navigation_snapshot(&self) -> NavigationSnapshot {
        self.navigation.snapshot()
    }

    pub fn controller(&self) -> &AnimationPlaybackController {
        &self.controller
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Seconds of frame time delivered so far.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// End the session, releasing every registration and timeline. Returns
    /// the number of registrations that were still active.
    pub fn teardown(mut self) -> usize {
        let released = self.observer.clear();
        self.controller.clear();
        debug!(released, "Released scroll registrations");
        info!(clock = self.clock, "Scroll session torn down");
        released
    }
}
