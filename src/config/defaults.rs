pub(crate) fn default_active_threshold_px() -> f32 {
    crate::tracker::DEFAULT_ACTIVE_THRESHOLD_PX
}

pub(crate) fn default_scrolled_threshold_px() -> f32 {
    crate::navigation::DEFAULT_SCROLLED_THRESHOLD_PX
}

pub(crate) fn default_smooth_navigation() -> bool {
    true
}

pub(crate) fn default_trigger() -> String {
    "top 80%".to_string()
}

pub(crate) fn default_duration_secs() -> f32 {
    0.8
}

pub(crate) fn default_ease() -> crate::ease::Ease {
    crate::ease::Ease::default()
}

pub(crate) fn default_stagger_secs() -> f32 {
    0.15
}

pub(crate) fn default_toggle_actions() -> String {
    "play none none reverse".to_string()
}

pub(crate) fn default_viewport_height() -> f32 {
    900.0
}

pub(crate) fn default_document_height() -> f32 {
    4100.0
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}

pub(crate) fn default_visitors_enabled() -> bool {
    false
}

pub(crate) fn default_visitors_namespace() -> String {
    "portfolio_synectron".to_string()
}

pub(crate) fn default_visitors_key() -> String {
    "unique_visitors".to_string()
}

pub(crate) fn default_visitors_api_base() -> String {
    "https://api.countapi.xyz".to_string()
}

pub(crate) fn default_cache_dir() -> String {
    crate::cache::CACHE_DIR.to_string()
}

pub(crate) fn default_from_state() -> crate::timeline::VisualState {
    crate::timeline::VisualState::hidden()
}
