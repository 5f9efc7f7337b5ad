//! Viewport crossing detection.
//!
//! Each registered element has a trigger line at `trigger_fraction *
//! viewport_height` below the viewport top. The element is "entered" once
//! its top edge is at or above that line, and "exited" when it drops back
//! below it. Only transitions are reported.

use crate::geometry::{ElementId, LayoutSource};
use anyhow::{Result, anyhow};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEventKind {
    Enter,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportEvent {
    pub element: ElementId,
    pub kind: ViewportEventKind,
    /// Session clock, seconds.
    pub timestamp: f64,
}

/// Handle returned by [`ViewportObserver::register`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    key: u64,
    element: ElementId,
}

impl Subscription {
    pub fn element(&self) -> &ElementId {
        &self.element
    }
}

#[derive(Debug)]
struct Registration {
    key: u64,
    element: ElementId,
    trigger_fraction: f32,
    /// `None` until the element has been measured once.
    inside: Option<bool>,
}

#[derive(Debug, Default)]
pub struct ViewportObserver {
    registrations: Vec<Registration>,
    next_key: u64,
}

impl ViewportObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `element`. Registering an element twice replaces the earlier
    /// registration; the earlier subscription becomes inert.
    pub fn register(&mut self, element: impl Into<ElementId>, trigger_fraction: f32) -> Subscription {
        let element = element.into();
        let trigger_fraction = sanitize_fraction(trigger_fraction);
        self.next_key += 1;
        let key = self.next_key;

        if let Some(existing) = self.registrations.iter_mut().find(|r| r.element == element) {
            debug!(
                element = %element,
                replaced = existing.key,
                key,
                "Replacing existing viewport registration"
            );
            existing.key = key;
            existing.trigger_fraction = trigger_fraction;
            existing.inside = None;
        } else {
            debug!(element = %element, key, trigger_fraction, "Registered viewport element");
            self.registrations.push(Registration {
                key,
                element: element.clone(),
                trigger_fraction,
                inside: None,
            });
        }

        Subscription { key, element }
    }

    /// Stop watching. Returns `false` for a subscription that was already
    /// released or replaced.
    pub fn unregister(&mut self, subscription: &Subscription) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.key != subscription.key);
        let removed = self.registrations.len() != before;
        if removed {
            debug!(element = %subscription.element, key = subscription.key, "Unregistered viewport element");
        }
        removed
    }

    /// Release every registration, returning how many were active.
    pub fn clear(&mut self) -> usize {
        let released = self.registrations.len();
        self.registrations.clear();
        released
    }

    pub fn is_active(&self, subscription: &Subscription) -> bool {
        self.registrations.iter().any(|r| r.key == subscription.key)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementId> + '_ {
        self.registrations.iter().map(|r| &r.element)
    }

    /// Compare every registered element against its trigger line and report
    /// transitions in registration order. Elements missing from `layout`
    /// keep their previous state and report nothing.
    pub fn evaluate(
        &mut self,
        scroll_y: f32,
        viewport_height: f32,
        layout: &impl LayoutSource,
        timestamp: f64,
    ) -> Vec<ViewportEvent> {
        let mut events = Vec::new();
        for registration in &mut self.registrations {
            let Some(top) = layout.element_top(&registration.element) else {
                trace!(element = %registration.element, "Skipping element without layout");
                continue;
            };
            let line = registration.trigger_fraction * viewport_height;
            let inside = top - scroll_y <= line;

            let kind = match (registration.inside, inside) {
                (None, true) | (Some(false), true) => Some(ViewportEventKind::Enter),
                (Some(true), false) => Some(ViewportEventKind::Exit),
                _ => None,
            };
            registration.inside = Some(inside);

            if let Some(kind) = kind {
                trace!(element = %registration.element, ?kind, top, scroll_y, line, "Viewport crossing");
                events.push(ViewportEvent {
                    element: registration.element.clone(),
                    kind,
                    timestamp,
                });
            }
        }
        events
    }
}

fn sanitize_fraction(fraction: f32) -> f32 {
    if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Parse a `"top 80%"` style start marker into a trigger fraction.
///
/// The first word names the element edge and must be `top`; the second is a
/// viewport position: a percentage, `top`, `center` or `bottom`.
pub fn parse_trigger_start(start: &str) -> Result<f32> {
    let mut parts = start.split_whitespace();
    let edge = parts.next().unwrap_or("top");
    if edge != "top" {
        return Err(anyhow!("unsupported trigger edge `{edge}` in `{start}`"));
    }
    let position = parts.next().unwrap_or("bottom");
    if parts.next().is_some() {
        return Err(anyhow!("unexpected trailing tokens in trigger `{start}`"));
    }
    let fraction = match position {
        "top" => 0.0,
        "center" => 0.5,
        "bottom" => 1.0,
        pct => pct
            .strip_suffix('%')
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v / 100.0)
            .ok_or_else(|| anyhow!("invalid viewport position `{pct}` in `{start}`"))?,
    };
    Ok(fraction.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::StaticLayout;

    const VIEWPORT: f32 = 900.0;

    fn kinds(events: &[ViewportEvent]) -> Vec<(&str, ViewportEventKind)> {
        events
            .iter()
            .map(|e| (e.element.as_str(), e.kind))
            .collect()
    }

    #[test]
    fn enters_when_top_crosses_trigger_line() {
        let layout = StaticLayout::new().with("cards", 1500.0);
        let mut observer = ViewportObserver::new();
        observer.register("cards", 0.8);

        // Line sits at 720px: top 1500 - 700 = 800 is still below it.
        assert!(observer.evaluate(700.0, VIEWPORT, &layout, 0.0).is_empty());
        let events = observer.evaluate(780.0, VIEWPORT, &layout, 0.1);
        assert_eq!(kinds(&events), [("cards", ViewportEventKind::Enter)]);
        assert_eq!(events[0].timestamp, 0.1);
    }

    #[test]
    fn exits_when_scrolling_back_up() {
        let layout = StaticLayout::new().with("cards", 1500.0);
        let mut observer = ViewportObserver::new();
        observer.register("cards", 0.8);

        observer.evaluate(900.0, VIEWPORT, &layout, 0.0);
        let events = observer.evaluate(600.0, VIEWPORT, &layout, 1.0);
        assert_eq!(kinds(&events), [("cards", ViewportEventKind::Exit)]);
    }

    #[test]
    fn never_repeats_the_same_kind() {
        let layout = StaticLayout::new().with("cards", 1500.0);
        let mut observer = ViewportObserver::new();
        observer.register("cards", 0.8);

        let mut all = Vec::new();
        for y in [900.0, 950.0, 1000.0, 1000.0, 1200.0] {
            all.extend(observer.evaluate(y, VIEWPORT, &layout, 0.0));
        }
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn element_already_past_line_enters_on_first_measure() {
        let layout = StaticLayout::new().with("hero-heading", 100.0);
        let mut observer = ViewportObserver::new();
        observer.register("hero-heading", 0.8);
        let events = observer.evaluate(0.0, VIEWPORT, &layout, 0.0);
        assert_eq!(kinds(&events), [("hero-heading", ViewportEventKind::Enter)]);
    }

    #[test]
    fn unregistered_before_scroll_emits_nothing() {
        let layout = StaticLayout::new().with("cards", 0.0);
        let mut observer = ViewportObserver::new();
        let subscription = observer.register("cards", 0.8);
        assert!(observer.unregister(&subscription));
        assert!(observer.evaluate(500.0, VIEWPORT, &layout, 0.0).is_empty());
        assert!(observer.is_empty());
    }

    #[test]
    fn duplicate_registration_replaces_previous() {
        let layout = StaticLayout::new().with("cards", 1500.0);
        let mut observer = ViewportObserver::new();
        let first = observer.register("cards", 0.8);
        let second = observer.register("cards", 0.5);

        assert_eq!(observer.len(), 1);
        assert!(!observer.is_active(&first));
        assert!(observer.is_active(&second));
        assert!(!observer.unregister(&first));
        assert_eq!(observer.len(), 1);

        // New fraction applies: line at 450px, top 1500 - 1000 = 500.
        assert!(observer.evaluate(1000.0, VIEWPORT, &layout, 0.0).is_empty());
    }

    #[test]
    fn missing_layout_is_silent() {
        let layout = StaticLayout::new();
        let mut observer = ViewportObserver::new();
        observer.register("ghost", 0.8);
        assert!(observer.evaluate(5000.0, VIEWPORT, &layout, 0.0).is_empty());
    }

    #[test]
    fn events_follow_registration_order() {
        let layout = StaticLayout::new().with("b", 10.0).with("a", 20.0);
        let mut observer = ViewportObserver::new();
        observer.register("b", 0.8);
        observer.register("a", 0.8);
        let events = observer.evaluate(0.0, VIEWPORT, &layout, 0.0);
        assert_eq!(
            kinds(&events),
            [("b", ViewportEventKind::Enter), ("a", ViewportEventKind::Enter)]
        );
    }

    #[test]
    fn parses_trigger_starts() {
        assert!((parse_trigger_start("top 80%").unwrap() - 0.8).abs() < 1e-6);
        assert_eq!(parse_trigger_start("top center").unwrap(), 0.5);
        assert_eq!(parse_trigger_start("top bottom").unwrap(), 1.0);
        assert_eq!(parse_trigger_start("top 150%").unwrap(), 1.0);
        assert!(parse_trigger_start("bottom 80%").is_err());
        assert!(parse_trigger_start("top eighty").is_err());
    }
}
