//! Scroll-synchronized page state.
//!
//! The crate tracks which page section is active as the document scrolls,
//! detects elements crossing a viewport trigger line, and plays entrance
//! timelines for them. It owns no renderer: hosts feed a
//! [`ScrollSession`] scroll, resize and frame messages, supply geometry
//! through [`LayoutSource`], and apply the returned [`Effect`]s.

pub mod cache;
pub mod cancellation;
pub mod config;
pub mod controller;
pub mod ease;
pub mod geometry;
pub mod navigation;
pub mod observer;
pub mod section;
pub mod session;
pub mod timeline;
pub mod tracker;
pub mod visitors;

pub use controller::{AnimationPlaybackController, AnimationSpec, StyleUpdate, TogglePolicy};
pub use ease::{Ease, EaseKind};
pub use geometry::{ElementId, LayoutSource, StaticLayout, Viewport};
pub use navigation::{NavigationSnapshot, NavigationState};
pub use observer::{Subscription, ViewportEvent, ViewportEventKind, ViewportObserver};
pub use section::{Section, SectionId, SectionList};
pub use session::{Effect, Message, ScrollScope, ScrollSession, SessionSettings};
pub use timeline::{Position, Timeline, Tween, VisualState};
pub use tracker::SectionActivityTracker;
