//! Animation playback driven by viewport events.
//!
//! Each observed trigger element owns one [`AnimationHandle`] whose timeline
//! covers the trigger itself or a staggered group of targets. `Enter` plays
//! the timeline forward; `Exit` applies the handle's [`TogglePolicy`].

use crate::ease::Ease;
use crate::geometry::{ElementId, LayoutSource};
use crate::observer::{ViewportEvent, ViewportEventKind};
use crate::timeline::{Playback, Timeline, Tween, VisualState};
use anyhow::{Result, anyhow};
use std::str::FromStr;
use tracing::{debug, trace};

/// What happens when a played element leaves through its trigger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TogglePolicy {
    /// Play the timeline backward to the initial state.
    #[default]
    Reverse,
    /// Snap straight back to the initial state.
    Reset,
    /// Keep the final state.
    None,
}

impl FromStr for TogglePolicy {
    type Err = anyhow::Error;

    /// Accepts a bare action (`"reverse"`) or a four-slot toggle list
    /// (`"play none none reverse"`), whose last slot governs leaving back.
    fn from_str(s: &str) -> Result<Self> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let action = match tokens.as_slice() {
            [action] => *action,
            [_, _, _, action] => *action,
            _ => return Err(anyhow!("toggle actions `{s}` need one or four entries")),
        };
        match action {
            "reverse" => Ok(TogglePolicy::Reverse),
            "reset" => Ok(TogglePolicy::Reset),
            "none" => Ok(TogglePolicy::None),
            other => Err(anyhow!("unsupported toggle action `{other}` in `{s}`")),
        }
    }
}

/// How one trigger element animates.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSpec {
    pub initial: VisualState,
    pub final_state: VisualState,
    pub duration: f32,
    pub ease: Ease,
    pub delay: f32,
    /// Seconds between consecutive targets of a group.
    pub stagger: f32,
    pub trigger_fraction: f32,
    pub toggle: TogglePolicy,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            initial: VisualState::hidden(),
            final_state: VisualState::IDENTITY,
            duration: 0.8,
            ease: Ease::default(),
            delay: 0.0,
            stagger: 0.0,
            trigger_fraction: 0.8,
            toggle: TogglePolicy::Reverse,
        }
    }
}

impl AnimationSpec {
    pub fn from_state(mut self, initial: VisualState) -> Self {
        self.initial = initial;
        self
    }

    pub fn to_state(mut self, final_state: VisualState) -> Self {
        self.final_state = final_state;
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn stagger(mut self, seconds: f32) -> Self {
        self.stagger = seconds;
        self
    }

    pub fn trigger_fraction(mut self, fraction: f32) -> Self {
        self.trigger_fraction = fraction;
        self
    }

    pub fn toggle(mut self, toggle: TogglePolicy) -> Self {
        self.toggle = toggle;
        self
    }

    pub fn tween(&self) -> Tween {
        Tween::new(self.initial, self.final_state, self.duration, self.ease)
    }

    pub fn timeline(&self, targets: &[ElementId]) -> Timeline {
        Timeline::staggered(targets, self.tween(), self.stagger).with_delay(self.delay)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleUpdate {
    pub element: ElementId,
    pub state: VisualState,
}

#[derive(Debug)]
pub struct AnimationHandle {
    pub element: ElementId,
    timeline: Timeline,
    toggle: TogglePolicy,
    played_forward: bool,
    needs_render: bool,
    scheduled: Vec<(ElementId, f64)>,
}

impl AnimationHandle {
    pub fn played_forward(&self) -> bool {
        self.played_forward
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Start times of the most recent forward play from the beginning.
    pub fn scheduled_starts(&self) -> &[(ElementId, f64)] {
        &self.scheduled
    }

    fn render(&self, layout: &impl LayoutSource, out: &mut Vec<StyleUpdate>) {
        collect_states(&self.timeline, layout, out);
    }
}

#[derive(Debug)]
struct OneShot {
    key: String,
    timeline: Timeline,
    needs_render: bool,
}

#[derive(Debug, Default)]
pub struct AnimationPlaybackController {
    handles: Vec<AnimationHandle>,
    one_shots: Vec<OneShot>,
}

impl AnimationPlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an animation to `trigger`, replacing any existing one. The
    /// initial state is rendered on the next [`advance`](Self::advance).
    pub fn install(&mut self, trigger: ElementId, targets: Vec<ElementId>, spec: &AnimationSpec) {
        let targets = if targets.is_empty() {
            vec![trigger.clone()]
        } else {
            targets
        };
        let handle = AnimationHandle {
            element: trigger.clone(),
            timeline: spec.timeline(&targets),
            toggle: spec.toggle,
            played_forward: false,
            needs_render: true,
            scheduled: Vec::new(),
        };
        if let Some(existing) = self.handles.iter_mut().find(|h| h.element == trigger) {
            debug!(element = %trigger, "Replacing animation handle");
            *existing = handle;
        } else {
            debug!(element = %trigger, targets = targets.len(), "Installed animation handle");
            self.handles.push(handle);
        }
    }

    /// Drop the handle for `trigger`, abandoning any in-flight playback.
    pub fn cancel(&mut self, trigger: &ElementId) -> bool {
        let before = self.handles.len();
        self.handles.retain(|h| &h.element != trigger);
        let removed = self.handles.len() != before;
        if removed {
            debug!(element = %trigger, "Cancelled animation handle");
        }
        removed
    }

    /// Drop every handle and one-shot timeline.
    pub fn clear(&mut self) {
        self.handles.clear();
        self.one_shots.clear();
    }

    pub fn handle(&self, trigger: &ElementId) -> Option<&AnimationHandle> {
        self.handles.iter().find(|h| &h.element == trigger)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Every element whose style this controller may write.
    pub fn targets(&self) -> impl Iterator<Item = &ElementId> + '_ {
        self.handles
            .iter()
            .flat_map(|h| h.timeline.entries().iter().map(|e| &e.target))
            .chain(
                self.one_shots
                    .iter()
                    .flat_map(|s| s.timeline.entries().iter().map(|e| &e.target)),
            )
    }

    pub fn on_viewport_event(&mut self, event: &ViewportEvent, layout: &impl LayoutSource) {
        let Some(handle) = self.handles.iter_mut().find(|h| h.element == event.element) else {
            trace!(element = %event.element, "No animation for viewport event");
            return;
        };
        if layout.element_top(&event.element).is_none() {
            trace!(element = %event.element, "Animation target gone; ignoring event");
            return;
        }

        match event.kind {
            ViewportEventKind::Enter => {
                let from_start = handle.timeline.playback() == Playback::AtStart;
                if handle.timeline.play() {
                    handle.played_forward = true;
                    if from_start {
                        handle.scheduled = handle.timeline.start_times(event.timestamp);
                    }
                    debug!(element = %event.element, from_start, "Playing entrance");
                }
            }
            ViewportEventKind::Exit => match handle.toggle {
                TogglePolicy::Reverse => {
                    if handle.timeline.reverse() {
                        handle.played_forward = false;
                        debug!(element = %event.element, "Reversing entrance");
                    }
                }
                TogglePolicy::Reset => {
                    handle.timeline.reset();
                    handle.played_forward = false;
                    handle.needs_render = true;
                }
                TogglePolicy::None => {}
            },
        }
    }

    /// Play a timeline that is not bound to a trigger (page intro, menus).
    /// A running timeline with the same key is replaced.
    pub fn play_one_shot(&mut self, key: impl Into<String>, mut timeline: Timeline) {
        let key = key.into();
        timeline.play();
        self.one_shots.retain(|s| s.key != key);
        debug!(%key, duration = timeline.duration(), "Playing one-shot timeline");
        self.one_shots.push(OneShot {
            key,
            timeline,
            needs_render: true,
        });
    }

    pub fn stop_one_shot(&mut self, key: &str) -> bool {
        let before = self.one_shots.len();
        self.one_shots.retain(|s| s.key != key);
        self.one_shots.len() != before
    }

    pub fn is_animating(&self) -> bool {
        self.handles
            .iter()
            .any(|h| h.needs_render || h.timeline.is_running())
            || !self.one_shots.is_empty()
    }

    /// Timelines currently moving or waiting out a delay.
    pub fn running_count(&self) -> usize {
        self.handles
            .iter()
            .filter(|h| h.timeline.is_running())
            .count()
            + self
                .one_shots
                .iter()
                .filter(|s| s.timeline.is_running())
                .count()
    }

    /// Advance every timeline by `dt` seconds and collect the styles that
    /// changed. Targets missing from `layout` are skipped.
    pub fn advance(&mut self, dt: f32, layout: &impl LayoutSource) -> Vec<StyleUpdate> {
        let mut updates = Vec::new();

        for handle in &mut self.handles {
            let moved = handle.timeline.advance(dt);
            if moved || handle.needs_render {
                handle.needs_render = false;
                handle.render(layout, &mut updates);
            }
        }

        for shot in &mut self.one_shots {
            let moved = shot.timeline.advance(dt);
            if moved || shot.needs_render {
                shot.needs_render = false;
                collect_states(&shot.timeline, layout, &mut updates);
            }
        }
        self.one_shots.retain(|s| s.timeline.is_running());

        updates
    }

    /// Render handles whose state was reset or freshly installed, without
    /// moving any playhead.
    pub fn flush(&mut self, layout: &impl LayoutSource) -> Vec<StyleUpdate> {
        let mut updates = Vec::new();
        for handle in self.handles.iter_mut().filter(|h| h.needs_render) {
            handle.needs_render = false;
            handle.render(layout, &mut updates);
        }
        updates
    }
}

fn collect_states(timeline: &Timeline, layout: &impl LayoutSource, out: &mut Vec<StyleUpdate>) {
    for (target, state) in timeline.states() {
        if layout.element_top(target).is_none() {
            trace!(element = %target, "Skipping style for missing element");
            continue;
        }
        out.push(StyleUpdate {
            element: target.clone(),
            state,
        });
    }
}
