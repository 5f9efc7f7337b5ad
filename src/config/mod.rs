//! Page configuration.
//!
//! Tracking thresholds, animation defaults, the section layout and the
//! optional visitor counter are loaded from `conf/page.toml` if present.
//! Missing or invalid entries fall back to defaults so a page can always be
//! driven.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{
    AnimationBinding, AnimationEntry, ElementEntry, LogLevel, PageConfig, SectionEntry,
};
