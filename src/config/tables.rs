use super::defaults;
use super::models::{AnimationEntry, ElementEntry, LogLevel, PageConfig, SectionEntry, default_sections};
use crate::ease::Ease;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    tracking: TrackingConfig,
    #[serde(default)]
    animation: AnimationConfig,
    #[serde(default)]
    viewport: ViewportConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    visitors: VisitorsConfig,
    #[serde(default = "default_sections")]
    sections: Vec<SectionEntry>,
    #[serde(default)]
    elements: Vec<ElementEntry>,
    #[serde(default)]
    animations: Vec<AnimationEntry>,
}

impl From<ConfigTables> for PageConfig {
    fn from(tables: ConfigTables) -> Self {
        PageConfig {
            active_threshold_px: tables.tracking.active_threshold_px,
            scrolled_threshold_px: tables.tracking.scrolled_threshold_px,
            smooth_navigation: tables.tracking.smooth_navigation,
            trigger: tables.animation.trigger,
            duration_secs: tables.animation.duration_secs,
            ease: tables.animation.ease,
            stagger_secs: tables.animation.stagger_secs,
            toggle_actions: tables.animation.toggle_actions,
            viewport_height: tables.viewport.height,
            document_height: tables.viewport.document_height,
            log_level: tables.logging.log_level,
            visitors_enabled: tables.visitors.enabled,
            visitors_namespace: tables.visitors.namespace,
            visitors_key: tables.visitors.key,
            visitors_api_base: tables.visitors.api_base,
            cache_dir: tables.visitors.cache_dir,
            sections: tables.sections,
            elements: tables.elements,
            animations: tables.animations,
        }
    }
}

impl From<&PageConfig> for ConfigTables {
    fn from(config: &PageConfig) -> Self {
        ConfigTables {
            tracking: TrackingConfig {
                active_threshold_px: config.active_threshold_px,
                scrolled_threshold_px: config.scrolled_threshold_px,
                smooth_navigation: config.smooth_navigation,
            },
            animation: AnimationConfig {
                trigger: config.trigger.clone(),
                duration_secs: config.duration_secs,
                ease: config.ease,
                stagger_secs: config.stagger_secs,
                toggle_actions: config.toggle_actions.clone(),
            },
            viewport: ViewportConfig {
                height: config.viewport_height,
                document_height: config.document_height,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            visitors: VisitorsConfig {
                enabled: config.visitors_enabled,
                namespace: config.visitors_namespace.clone(),
                key: config.visitors_key.clone(),
                api_base: config.visitors_api_base.clone(),
                cache_dir: config.cache_dir.clone(),
            },
            sections: config.sections.clone(),
            elements: config.elements.clone(),
            animations: config.animations.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct TrackingConfig {
    #[serde(default = "defaults::default_active_threshold_px")]
    active_threshold_px: f32,
    #[serde(default = "defaults::default_scrolled_threshold_px")]
    scrolled_threshold_px: f32,
    #[serde(default = "defaults::default_smooth_navigation")]
    smooth_navigation: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            active_threshold_px: defaults::default_active_threshold_px(),
            scrolled_threshold_px: defaults::default_scrolled_threshold_px(),
            smooth_navigation: defaults::default_smooth_navigation(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct AnimationConfig {
    #[serde(default = "defaults::default_trigger")]
    trigger: String,
    #[serde(default = "defaults::default_duration_secs")]
    duration_secs: f32,
    #[serde(default = "defaults::default_ease")]
    ease: Ease,
    #[serde(default = "defaults::default_stagger_secs")]
    stagger_secs: f32,
    #[serde(default = "defaults::default_toggle_actions")]
    toggle_actions: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            trigger: defaults::default_trigger(),
            duration_secs: defaults::default_duration_secs(),
            ease: defaults::default_ease(),
            stagger_secs: defaults::default_stagger_secs(),
            toggle_actions: defaults::default_toggle_actions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ViewportConfig {
    #[serde(default = "defaults::default_viewport_height")]
    height: f32,
    #[serde(default = "defaults::default_document_height")]
    document_height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            height: defaults::default_viewport_height(),
            document_height: defaults::default_document_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct VisitorsConfig {
    #[serde(default = "defaults::default_visitors_enabled")]
    enabled: bool,
    #[serde(default = "defaults::default_visitors_namespace")]
    namespace: String,
    #[serde(default = "defaults::default_visitors_key")]
    key: String,
    #[serde(default = "defaults::default_visitors_api_base")]
    api_base: String,
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
}

impl Default for VisitorsConfig {
    fn default() -> Self {
        VisitorsConfig {
            enabled: defaults::default_visitors_enabled(),
            namespace: defaults::default_visitors_namespace(),
            key: defaults::default_visitors_key(),
            api_base: defaults::default_visitors_api_base(),
            cache_dir: defaults::default_cache_dir(),
        }
    }
}
