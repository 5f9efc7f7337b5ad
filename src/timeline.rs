//! Tweens and timelines.
//!
//! A [`Timeline`] owns a set of entries, each animating one target element
//! from an initial [`VisualState`] to a final one, placed at an offset inside
//! the timeline. The playhead moves forward on `play` and backward on
//! `reverse`; the visual state of every entry is a pure function of the
//! playhead, so replaying always reproduces the same frames.

use crate::ease::Ease;
use crate::geometry::ElementId;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

/// Natural width, in percent of the element's container.
const FULL_WIDTH_PCT: f32 = 100.0;

/// Animatable properties of an element.
///
/// `scale_x` and `scale_y` multiply the uniform `scale`, so a timeline can
/// grow a line along one axis only. `width` is a percentage of the container;
/// `None` leaves the element's own width alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct VisualState {
    pub opacity: f32,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotate_x: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

impl Default for VisualState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl VisualState {
    /// Fully visible, untransformed.
    pub const IDENTITY: VisualState = VisualState {
        opacity: 1.0,
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        scale_x: 1.0,
        scale_y: 1.0,
        rotate_x: 0.0,
        width: None,
    };

    /// Transparent, otherwise untransformed.
    pub fn hidden() -> Self {
        Self {
            opacity: 0.0,
            ..Self::IDENTITY
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_scale_x(mut self, scale_x: f32) -> Self {
        self.scale_x = scale_x;
        self
    }

    pub fn with_scale_y(mut self, scale_y: f32) -> Self {
        self.scale_y = scale_y;
        self
    }

    pub fn with_rotate_x(mut self, degrees: f32) -> Self {
        self.rotate_x = degrees;
        self
    }

    pub fn with_width(mut self, percent: f32) -> Self {
        self.width = Some(percent);
        self
    }

    /// Horizontal and vertical scale factors a renderer should apply.
    pub fn effective_scale(&self) -> (f32, f32) {
        (self.scale * self.scale_x, self.scale * self.scale_y)
    }

    pub fn lerp(&self, to: &VisualState, t: f32) -> VisualState {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        let width = match (self.width, to.width) {
            (None, None) => None,
            (a, b) => Some(mix(
                a.unwrap_or(FULL_WIDTH_PCT),
                b.unwrap_or(FULL_WIDTH_PCT),
            )),
        };
        VisualState {
            opacity: mix(self.opacity, to.opacity),
            x: mix(self.x, to.x),
            y: mix(self.y, to.y),
            scale: mix(self.scale, to.scale),
            scale_x: mix(self.scale_x, to.scale_x),
            scale_y: mix(self.scale_y, to.scale_y),
            rotate_x: mix(self.rotate_x, to.rotate_x),
            width,
        }
    }
}

/// A single from/to interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub from: VisualState,
    pub to: VisualState,
    pub duration: f32,
    pub ease: Ease,
}

impl Tween {
    pub fn new(from: VisualState, to: VisualState, duration: f32, ease: Ease) -> Self {
        let duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        Self {
            from,
            to,
            duration,
            ease,
        }
    }

    /// State `local_time` seconds after this tween starts.
    pub fn sample(&self, local_time: f32) -> VisualState {
        if local_time <= 0.0 && self.duration > 0.0 {
            return self.from;
        }
        if local_time >= self.duration {
            return self.to;
        }
        let eased = self.ease.apply(local_time / self.duration);
        self.from.lerp(&self.to, eased)
    }
}

/// Where an entry lands inside its timeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    /// Right after the previous entry ends.
    #[default]
    Sequential,
    /// Seconds from the timeline start.
    Absolute(f32),
    /// Seconds relative to the end of the previous entry (`"-=0.5"`).
    Relative(f32),
    /// Same start as the previous entry (`"<"`).
    WithPrevious,
}

impl FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parse = |raw: &str| {
            raw.trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| anyhow!("invalid timeline position `{s}`"))
        };
        if s.is_empty() {
            Ok(Position::Sequential)
        } else if s == "<" {
            Ok(Position::WithPrevious)
        } else if let Some(rest) = s.strip_prefix("-=") {
            Ok(Position::Relative(-parse(rest)?))
        } else if let Some(rest) = s.strip_prefix("+=") {
            Ok(Position::Relative(parse(rest)?))
        } else {
            Ok(Position::Absolute(parse(s)?.max(0.0)))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub target: ElementId,
    pub tween: Tween,
    /// Seconds from the timeline start.
    pub start: f32,
}

impl TimelineEntry {
    pub fn end(&self) -> f32 {
        self.start + self.tween.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Playhead at zero, not moving.
    AtStart,
    Forward,
    /// Playhead at the end, not moving.
    Completed,
    Reverse,
}

#[derive(Debug, Clone)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    delay: f32,
    playhead: f32,
    delay_remaining: f32,
    playback: Playback,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            delay: 0.0,
            playhead: 0.0,
            delay_remaining: 0.0,
            playback: Playback::AtStart,
        }
    }

    /// Wait applied whenever playback starts from the beginning.
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        self
    }

    pub fn then(mut self, target: impl Into<ElementId>, tween: Tween, position: Position) -> Self {
        self.push(target.into(), tween, position);
        self
    }

    /// One copy of `tween` per target, each starting `stagger` seconds after
    /// the previous one, in list order.
    pub fn staggered(targets: &[ElementId], tween: Tween, stagger: f32) -> Self {
        let stagger = if stagger.is_finite() { stagger.max(0.0) } else { 0.0 };
        let entries = targets
            .iter()
            .enumerate()
            .map(|(idx, target)| TimelineEntry {
                target: target.clone(),
                tween,
                start: idx as f32 * stagger,
            })
            .collect();
        Self {
            entries,
            ..Self::new()
        }
    }

    pub fn push(&mut self, target: ElementId, tween: Tween, position: Position) {
        let previous = self.entries.last();
        let previous_end = previous.map(TimelineEntry::end).unwrap_or(0.0);
        let start = match position {
            Position::Sequential => previous_end,
            Position::Absolute(at) => at,
            Position::Relative(offset) => previous_end + offset,
            Position::WithPrevious => previous.map(|entry| entry.start).unwrap_or(0.0),
        }
        .max(0.0);
        self.entries.push(TimelineEntry {
            target,
            tween,
            start,
        });
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Length of the timeline, excluding the start delay.
    pub fn duration(&self) -> f32 {
        self.entries
            .iter()
            .map(TimelineEntry::end)
            .fold(0.0, f32::max)
    }

    pub fn playhead(&self) -> f32 {
        self.playhead
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn is_running(&self) -> bool {
        matches!(self.playback, Playback::Forward | Playback::Reverse)
    }

    /// Start or resume forward playback. Returns `false` when already playing
    /// forward or finished.
    pub fn play(&mut self) -> bool {
        match self.playback {
            Playback::Forward | Playback::Completed => false,
            Playback::AtStart => {
                self.delay_remaining = self.delay;
                self.playback = Playback::Forward;
                true
            }
            Playback::Reverse => {
                self.delay_remaining = 0.0;
                self.playback = Playback::Forward;
                true
            }
        }
    }

    /// Run the playhead back toward zero. Returns `false` when already there
    /// or already reversing.
    pub fn reverse(&mut self) -> bool {
        match self.playback {
            Playback::AtStart | Playback::Reverse => false,
            Playback::Forward | Playback::Completed => {
                self.delay_remaining = 0.0;
                self.playback = if self.playhead <= 0.0 {
                    Playback::AtStart
                } else {
                    Playback::Reverse
                };
                true
            }
        }
    }

    /// Jump back to the initial state without animating.
    pub fn reset(&mut self) {
        self.playhead = 0.0;
        self.delay_remaining = 0.0;
        self.playback = Playback::AtStart;
    }

    /// Move the playhead by `dt` seconds. Returns `true` when the playhead
    /// moved or playback changed state.
    pub fn advance(&mut self, dt: f32) -> bool {
        let mut dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        match self.playback {
            Playback::AtStart | Playback::Completed => false,
            Playback::Forward => {
                if self.delay_remaining > 0.0 {
                    let waited = dt.min(self.delay_remaining);
                    self.delay_remaining -= waited;
                    dt -= waited;
                    if self.delay_remaining > 0.0 {
                        return false;
                    }
                }
                let duration = self.duration();
                self.playhead = (self.playhead + dt).min(duration);
                if self.playhead >= duration {
                    self.playback = Playback::Completed;
                }
                true
            }
            Playback::Reverse => {
                self.playhead = (self.playhead - dt).max(0.0);
                if self.playhead <= 0.0 {
                    self.playback = Playback::AtStart;
                }
                true
            }
        }
    }

    /// Current state of every entry, in entry order.
    pub fn states(&self) -> impl Iterator<Item = (&ElementId, VisualState)> + '_ {
        self.entries.iter().map(|entry| {
            let state = if self.playback == Playback::AtStart {
                entry.tween.from
            } else {
                entry.tween.sample(self.playhead - entry.start)
            };
            (&entry.target, state)
        })
    }

    /// Absolute start time of each entry if forward playback begins at `at`.
    pub fn start_times(&self, at: f64) -> Vec<(ElementId, f64)> {
        self.entries
            .iter()
            .map(|entry| {
                (
                    entry.target.clone(),
                    at + f64::from(self.delay) + f64::from(entry.start),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fade_up() -> Tween {
        Tween::new(
            VisualState::hidden().with_y(50.0),
            VisualState::IDENTITY,
            0.6,
            Ease::default(),
        )
    }

    fn ids(names: &[&str]) -> Vec<ElementId> {
        names.iter().map(|name| ElementId::from(*name)).collect()
    }

    #[test]
    fn single_axis_scale_leaves_other_axis_alone() {
        let from = VisualState::IDENTITY.with_scale_y(0.0);
        let half = from.lerp(&VisualState::IDENTITY, 0.5);
        assert_eq!(half.effective_scale(), (1.0, 0.5));
        assert_eq!(
            VisualState::IDENTITY.with_scale(0.5).with_scale_x(0.5).effective_scale(),
            (0.25, 0.5)
        );
    }

    #[test]
    fn width_interpolates_in_percent() {
        let from = VisualState::IDENTITY.with_width(0.0);
        let to = VisualState::IDENTITY.with_width(90.0);
        assert_eq!(from.lerp(&to, 0.5).width, Some(45.0));
        assert_eq!(from.lerp(&VisualState::IDENTITY, 1.0).width, Some(100.0));
        assert_eq!(VisualState::IDENTITY.lerp(&VisualState::hidden(), 0.5).width, None);
    }

    #[test]
    fn parses_positions() {
        assert_eq!("".parse::<Position>().unwrap(), Position::Sequential);
        assert_eq!("-=0.5".parse::<Position>().unwrap(), Position::Relative(-0.5));
        assert_eq!("+=0.2".parse::<Position>().unwrap(), Position::Relative(0.2));
        assert_eq!("<".parse::<Position>().unwrap(), Position::WithPrevious);
        assert_eq!("1.25".parse::<Position>().unwrap(), Position::Absolute(1.25));
        assert!("-=soon".parse::<Position>().is_err());
    }

    #[test]
    fn overlapping_positions_follow_previous_end() {
        let timeline = Timeline::new()
            .with_delay(0.3)
            .then(
                "name",
                Tween::new(VisualState::hidden(), VisualState::IDENTITY, 1.0, Ease::default()),
                Position::Sequential,
            )
            .then(
                "title",
                Tween::new(VisualState::hidden(), VisualState::IDENTITY, 0.8, Ease::default()),
                Position::Relative(-0.5),
            )
            .then(
                "image",
                Tween::new(VisualState::hidden(), VisualState::IDENTITY, 0.8, Ease::default()),
                Position::Relative(-0.6),
            );

        let starts: Vec<f32> = timeline.entries().iter().map(|e| e.start).collect();
        assert!((starts[0] - 0.0).abs() < 1e-6);
        assert!((starts[1] - 0.5).abs() < 1e-6);
        assert!((starts[2] - 0.7).abs() < 1e-6);
        assert!((timeline.duration() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn stagger_places_entries_in_list_order() {
        let timeline = Timeline::staggered(&ids(&["a", "b", "c", "d"]), fade_up(), 0.15);
        let starts = timeline.start_times(2.0);
        let expected = [2.0, 2.15, 2.30, 2.45];
        for ((target, at), (want_target, want_at)) in starts.iter().zip(["a", "b", "c", "d"].iter().zip(expected)) {
            assert_eq!(target.as_str(), *want_target);
            assert!((at - want_at).abs() < 1e-5, "{target} starts at {at}");
        }
    }

    #[test]
    fn delay_holds_initial_state() {
        let mut timeline = Timeline::staggered(&ids(&["card"]), fade_up(), 0.0).with_delay(0.5);
        assert!(timeline.play());
        assert!(!timeline.advance(0.4));
        assert_eq!(timeline.playhead(), 0.0);
        assert!(timeline.advance(0.2));
        assert!((timeline.playhead() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn play_is_idempotent() {
        let mut timeline = Timeline::staggered(&ids(&["card"]), fade_up(), 0.0);
        assert!(timeline.play());
        assert!(!timeline.play());
        timeline.advance(10.0);
        assert_eq!(timeline.playback(), Playback::Completed);
        assert!(!timeline.play());
    }

    #[test]
    fn reverse_restores_initial_state_exactly() {
        let tween = fade_up();
        let mut timeline = Timeline::staggered(&ids(&["card"]), tween, 0.0);
        timeline.play();
        timeline.advance(0.25);
        assert!(timeline.reverse());
        timeline.advance(1.0);
        assert_eq!(timeline.playback(), Playback::AtStart);
        let (_, state) = timeline.states().next().unwrap();
        assert_eq!(state, tween.from);
    }

    #[test]
    fn replay_after_reverse_reaches_same_final_state() {
        let tween = fade_up();
        let mut once = Timeline::staggered(&ids(&["card"]), tween, 0.0);
        once.play();
        once.advance(1.0);

        let mut toggled = Timeline::staggered(&ids(&["card"]), tween, 0.0);
        toggled.play();
        toggled.advance(0.3);
        toggled.reverse();
        toggled.advance(0.1);
        toggled.play();
        toggled.advance(1.0);

        let a: Vec<VisualState> = once.states().map(|(_, s)| s).collect();
        let b: Vec<VisualState> = toggled.states().map(|(_, s)| s).collect();
        assert_eq!(a, b);
        assert_eq!(a[0], VisualState::IDENTITY);
    }

    #[test]
    fn reverse_before_delay_elapses_returns_to_start() {
        let mut timeline = Timeline::staggered(&ids(&["card"]), fade_up(), 0.0).with_delay(1.0);
        timeline.play();
        timeline.advance(0.5);
        assert!(timeline.reverse());
        assert_eq!(timeline.playback(), Playback::AtStart);
        assert!(!timeline.is_running());
    }

    #[test]
    fn zero_duration_tween_completes_on_first_tick() {
        let tween = Tween::new(VisualState::hidden(), VisualState::IDENTITY, 0.0, Ease::Linear);
        let mut timeline = Timeline::staggered(&ids(&["flag"]), tween, 0.0);
        timeline.play();
        assert!(timeline.advance(0.0));
        assert_eq!(timeline.playback(), Playback::Completed);
        assert_eq!(timeline.states().next().unwrap().1, VisualState::IDENTITY);
    }
}
