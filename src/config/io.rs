use super::models::PageConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load the page config, falling back to defaults when the file is missing
/// or invalid.
pub fn load_config(path: &Path) -> PageConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded page config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default page config: {err}"
            );
            return PageConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!(
                sections = cfg.sections.len(),
                animations = cfg.animations.len(),
                "Parsed page configuration from disk"
            );
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid page config TOML: {err:#}");
            PageConfig::default()
        }
    }
}

pub fn parse_config(contents: &str) -> Result<PageConfig> {
    let tables: ConfigTables = toml::from_str(contents).context("failed to parse page config")?;
    Ok(tables.into())
}

pub fn serialize_config(config: &PageConfig) -> Result<String> {
    toml::to_string_pretty(&ConfigTables::from(config)).context("failed to serialize page config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::TogglePolicy;
    use crate::ease::{Ease, EaseKind};
    use crate::section::SectionId;
    use crate::timeline::VisualState;

    const PORTFOLIO: &str = r#"
[tracking]
active_threshold_px = 120

[animation]
trigger = "top 75%"
ease = "power2.out"

[viewport]
height = 800
document_height = 5000

[logging]
log_level = "debug"

[[sections]]
id = "hero"
top = 0

[[sections]]
id = "about"
top = 900
trigger_offset_px = 200

[[elements]]
id = "skills-grid"
top = 2600

[[animations]]
trigger = "skills-grid"
targets = ["skill-0", "skill-1"]
ease = "back.out(1.7)"
stagger_secs = 0.1
toggle_actions = "play none none none"
from = { opacity = 0, scale = 0.8 }
"#;

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.active_threshold_px, 150.0);
        assert_eq!(config.scrolled_threshold_px, 100.0);
        assert!(config.smooth_navigation);
        assert_eq!(config.trigger, "top 80%");
        assert_eq!(config.stagger_secs, 0.15);
        assert!(!config.visitors_enabled);
        assert_eq!(config.sections.len(), 5);
        assert_eq!(config.sections[4].id, "contact");
    }

    #[test]
    fn reads_tables_into_flat_model() {
        let config = parse_config(PORTFOLIO).unwrap();
        assert_eq!(config.active_threshold_px, 120.0);
        assert_eq!(config.scrolled_threshold_px, 100.0);
        assert_eq!(
            config.ease,
            Ease::Power {
                degree: 2,
                kind: EaseKind::Out
            }
        );
        assert_eq!(config.log_level.as_filter_str(), "debug");
        assert_eq!(config.viewport().max_scroll(), 4200.0);

        let sections = config.section_list().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections.position(&SectionId::from("about")), Some(1));
        assert_eq!(sections.get(1).unwrap().trigger_offset, Some(200.0));
    }

    #[test]
    fn animation_entries_inherit_defaults() {
        let config = parse_config(PORTFOLIO).unwrap();
        let base = config.animation_defaults().unwrap();
        assert!((base.trigger_fraction - 0.75).abs() < 1e-6);
        assert_eq!(base.toggle, TogglePolicy::Reverse);

        let entry = &config.animations[0];
        let spec = entry.spec(&base).unwrap();
        assert_eq!(entry.target_ids().len(), 2);
        assert_eq!(spec.toggle, TogglePolicy::None);
        assert_eq!(spec.stagger, 0.1);
        assert_eq!(spec.duration, 0.8);
        assert_eq!(spec.initial, VisualState::hidden().with_scale(0.8));
        assert_eq!(spec.final_state, VisualState::IDENTITY);
        assert!((spec.trigger_fraction - 0.75).abs() < 1e-6);
    }

    #[test]
    fn layout_includes_sections_and_elements() {
        use crate::geometry::LayoutSource;

        let config = parse_config(PORTFOLIO).unwrap();
        let layout = config.layout();
        assert_eq!(layout.element_top(&"about".into()), Some(900.0));
        assert_eq!(layout.element_top(&"skills-grid".into()), Some(2600.0));
        assert_eq!(layout.element_top(&"skill-0".into()), None);
    }

    #[test]
    fn duplicate_sections_are_rejected() {
        let config = parse_config(
            r#"
[[sections]]
id = "about"

[[sections]]
id = "about"
"#,
        )
        .unwrap();
        assert!(config.section_list().is_err());
    }

    #[test]
    fn bad_trigger_is_reported() {
        let config = parse_config("[animation]\ntrigger = \"center 50%\"\n").unwrap();
        assert!(config.animation_defaults().is_err());
    }

    #[test]
    fn unknown_ease_fails_parse() {
        assert!(parse_config("[animation]\nease = \"wobble.out\"\n").is_err());
    }

    #[test]
    fn serialized_config_parses_back() {
        let config = parse_config(PORTFOLIO).unwrap();
        let text = serialize_config(&config).unwrap();
        let reparsed = parse_config(&text).unwrap();
        assert_eq!(reparsed.sections, config.sections);
        assert_eq!(reparsed.animations, config.animations);
        assert_eq!(reparsed.ease, config.ease);
    }

    #[test]
    fn bundled_page_config_is_valid() {
        let config = parse_config(include_str!("../../conf/page.toml")).unwrap();
        let bindings = config.animation_bindings().unwrap();
        assert_eq!(bindings.len(), config.animations.len());
        assert_eq!(config.section_list().unwrap().len(), 5);
        assert!(!config.visitors_enabled);

        let find = |trigger: &str| {
            bindings
                .iter()
                .find(|binding| binding.trigger.as_str() == trigger)
                .unwrap()
        };
        let line = &find("experience-line").spec;
        assert_eq!(line.initial.effective_scale(), (1.0, 0.0));
        assert_eq!(line.initial.opacity, 1.0);
        let bar = &find("skill-bar-0").spec;
        assert_eq!(bar.initial.width, Some(0.0));
        assert_eq!(bar.final_state.width, Some(95.0));
        assert_eq!(bar.final_state.effective_scale(), (1.0, 1.0));
    }

    #[test]
    fn axis_scale_and_width_parse_from_toml() {
        let config = parse_config(
            r#"
[[animations]]
trigger = "line"
from = { opacity = 1, scale_y = 0 }

[[animations]]
trigger = "bar"
from = { width = 0 }
to = { width = 80 }
"#,
        )
        .unwrap();
        let line = &config.animations[0];
        assert_eq!(line.from, VisualState::IDENTITY.with_scale_y(0.0));
        assert_eq!(line.from.scale, 1.0);
        assert_eq!(line.from.width, None);
        let bar = &config.animations[1];
        assert_eq!(bar.from, VisualState::IDENTITY.with_width(0.0));
        assert_eq!(bar.to, VisualState::IDENTITY.with_width(80.0));

        let reparsed = parse_config(&serialize_config(&config).unwrap()).unwrap();
        assert_eq!(reparsed.animations, config.animations);
    }

    #[test]
    fn one_bad_animation_rejects_all_bindings() {
        let config = parse_config(
            r#"
[[animations]]
trigger = "about-heading"

[[animations]]
trigger = "skills-grid"
start = "middle 50%"
"#,
        )
        .unwrap();
        let err = config.animation_bindings().unwrap_err();
        assert!(format!("{err:#}").contains("skills-grid"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Path::new("does/not/exist/page.toml"));
        assert_eq!(config.viewport_height, 900.0);
    }
}
