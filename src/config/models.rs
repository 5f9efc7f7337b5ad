use crate::controller::{AnimationSpec, TogglePolicy};
use crate::ease::Ease;
use crate::geometry::{ElementId, StaticLayout, Viewport};
use crate::observer::parse_trigger_start;
use crate::section::{Section, SectionList};
use crate::session::SessionSettings;
use crate::timeline::VisualState;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Flattened page configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct PageConfig {
    #[serde(default = "crate::config::defaults::default_active_threshold_px")]
    pub active_threshold_px: f32,
    #[serde(default = "crate::config::defaults::default_scrolled_threshold_px")]
    pub scrolled_threshold_px: f32,
    #[serde(default = "crate::config::defaults::default_smooth_navigation")]
    pub smooth_navigation: bool,
    /// Default trigger start, `"top 80%"` style.
    #[serde(default = "crate::config::defaults::default_trigger")]
    pub trigger: String,
    #[serde(default = "crate::config::defaults::default_duration_secs")]
    pub duration_secs: f32,
    #[serde(default = "crate::config::defaults::default_ease")]
    pub ease: Ease,
    #[serde(default = "crate::config::defaults::default_stagger_secs")]
    pub stagger_secs: f32,
    #[serde(default = "crate::config::defaults::default_toggle_actions")]
    pub toggle_actions: String,
    #[serde(default = "crate::config::defaults::default_viewport_height")]
    pub viewport_height: f32,
    #[serde(default = "crate::config::defaults::default_document_height")]
    pub document_height: f32,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_visitors_enabled")]
    pub visitors_enabled: bool,
    #[serde(default = "crate::config::defaults::default_visitors_namespace")]
    pub visitors_namespace: String,
    #[serde(default = "crate::config::defaults::default_visitors_key")]
    pub visitors_key: String,
    #[serde(default = "crate::config::defaults::default_visitors_api_base")]
    pub visitors_api_base: String,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "default_sections")]
    pub sections: Vec<SectionEntry>,
    #[serde(default)]
    pub elements: Vec<ElementEntry>,
    #[serde(default)]
    pub animations: Vec<AnimationEntry>,
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            active_threshold_px: crate::config::defaults::default_active_threshold_px(),
            scrolled_threshold_px: crate::config::defaults::default_scrolled_threshold_px(),
            smooth_navigation: crate::config::defaults::default_smooth_navigation(),
            trigger: crate::config::defaults::default_trigger(),
            duration_secs: crate::config::defaults::default_duration_secs(),
            ease: crate::config::defaults::default_ease(),
            stagger_secs: crate::config::defaults::default_stagger_secs(),
            toggle_actions: crate::config::defaults::default_toggle_actions(),
            viewport_height: crate::config::defaults::default_viewport_height(),
            document_height: crate::config::defaults::default_document_height(),
            log_level: crate::config::defaults::default_log_level(),
            visitors_enabled: crate::config::defaults::default_visitors_enabled(),
            visitors_namespace: crate::config::defaults::default_visitors_namespace(),
            visitors_key: crate::config::defaults::default_visitors_key(),
            visitors_api_base: crate::config::defaults::default_visitors_api_base(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            sections: default_sections(),
            elements: Vec::new(),
            animations: Vec::new(),
        }
    }
}

pub(crate) fn default_sections() -> Vec<SectionEntry> {
    ["hero", "about", "experience", "skills", "contact"]
        .into_iter()
        .enumerate()
        .map(|(idx, id)| SectionEntry {
            id: id.to_string(),
            top: Some(idx as f32 * 800.0),
            trigger_offset_px: None,
        })
        .collect()
}

impl PageConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_height, self.document_height)
    }

    /// Sections in file order.
    pub fn section_list(&self) -> Result<SectionList> {
        let sections = self
            .sections
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let section = Section::new(entry.id.as_str(), idx);
                match entry.trigger_offset_px {
                    Some(offset) => section.with_trigger_offset(offset),
                    None => section,
                }
            })
            .collect();
        SectionList::new(sections).context("invalid [[sections]] table")
    }

    /// Layout described by the file: section anchors plus `[[elements]]`.
    pub fn layout(&self) -> StaticLayout {
        let mut layout = StaticLayout::new();
        for section in &self.sections {
            if let Some(top) = section.top {
                layout.insert(section.id.as_str(), top);
            }
        }
        for element in &self.elements {
            layout.insert(element.id.as_str(), element.top);
        }
        layout
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            active_threshold_px: self.active_threshold_px,
            scrolled_threshold_px: self.scrolled_threshold_px,
            smooth_navigation: self.smooth_navigation,
            ..SessionSettings::default()
        }
    }

    /// Spec applied to every animation that does not override a field.
    pub fn animation_defaults(&self) -> Result<AnimationSpec> {
        let trigger_fraction = parse_trigger_start(&self.trigger)
            .with_context(|| format!("invalid [animation] trigger `{}`", self.trigger))?;
        let toggle = self
            .toggle_actions
            .parse::<TogglePolicy>()
            .context("invalid [animation] toggle_actions")?;
        Ok(AnimationSpec::default()
            .duration(self.duration_secs)
            .ease(self.ease)
            .stagger(self.stagger_secs)
            .trigger_fraction(trigger_fraction)
            .toggle(toggle))
    }

    /// Every `[[animations]]` entry resolved against `[animation]`. Fails on
    /// the first invalid entry, so callers can validate before registering
    /// anything.
    pub fn animation_bindings(&self) -> Result<Vec<AnimationBinding>> {
        let base = self.animation_defaults()?;
        self.animations
            .iter()
            .map(|entry| {
                Ok(AnimationBinding {
                    trigger: entry.trigger_id(),
                    targets: entry.target_ids(),
                    spec: entry.spec(&base)?,
                })
            })
            .collect()
    }
}

/// A resolved animation, ready to register with a session.
#[derive(Debug, Clone)]
pub struct AnimationBinding {
    pub trigger: ElementId,
    pub targets: Vec<ElementId>,
    pub spec: AnimationSpec,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct SectionEntry {
    pub id: String,
    /// Document offset of the section element, when known up front.
    #[serde(default)]
    pub top: Option<f32>,
    #[serde(default)]
    pub trigger_offset_px: Option<f32>,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct ElementEntry {
    pub id: String,
    pub top: f32,
}

/// One scroll-triggered animation. Unset fields inherit `[animation]`.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct AnimationEntry {
    pub trigger: String,
    /// Staggered targets; empty animates the trigger itself.
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub duration_secs: Option<f32>,
    #[serde(default)]
    pub ease: Option<Ease>,
    #[serde(default)]
    pub delay_secs: f32,
    #[serde(default)]
    pub stagger_secs: Option<f32>,
    #[serde(default)]
    pub toggle_actions: Option<String>,
    #[serde(default = "crate::config::defaults::default_from_state")]
    pub from: VisualState,
    #[serde(default)]
    pub to: VisualState,
}

impl AnimationEntry {
    pub fn trigger_id(&self) -> ElementId {
        ElementId::new(self.trigger.as_str())
    }

    pub fn target_ids(&self) -> Vec<ElementId> {
        self.targets.iter().map(|id| ElementId::new(id.as_str())).collect()
    }

    pub fn spec(&self, base: &AnimationSpec) -> Result<AnimationSpec> {
        let mut spec = base
            .clone()
            .from_state(self.from)
            .to_state(self.to)
            .delay(self.delay_secs);
        if let Some(start) = &self.start {
            let fraction = parse_trigger_start(start)
                .with_context(|| format!("invalid start for animation `{}`", self.trigger))?;
            spec = spec.trigger_fraction(fraction);
        }
        if let Some(duration) = self.duration_secs {
            spec = spec.duration(duration);
        }
        if let Some(ease) = self.ease {
            spec = spec.ease(ease);
        }
        if let Some(stagger) = self.stagger_secs {
            spec = spec.stagger(stagger);
        }
        if let Some(actions) = &self.toggle_actions {
            let toggle = actions
                .parse::<TogglePolicy>()
                .with_context(|| format!("invalid toggle_actions for animation `{}`", self.trigger))?;
            spec = spec.toggle(toggle);
        }
        Ok(spec)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
