//! Headless driver for a scroll session.
//!
//! Responsibilities here are intentionally minimal:
//! - Load the page configuration from `conf/page.toml` (or the first argument).
//! - Register the configured scroll animations and play the hero intro.
//! - Replay a scripted scroll through the page at 60 frames per second,
//!   logging every effect the session emits.
//! - Optionally count the visit in the background.

use anyhow::{Context, Result};
use scroll_sync::cancellation::CancellationToken;
use scroll_sync::config::{PageConfig, load_config};
use scroll_sync::visitors::{VisitorCounter, record_visit};
use scroll_sync::{
    Ease, EaseKind, Effect, LayoutSource, Message, Position, ScrollScope, ScrollSession, SectionId,
    Timeline, Tween, VisualState,
};
use std::env;
use std::path::PathBuf;
use std::thread;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const FRAME_SECS: f32 = 1.0 / 60.0;
/// Upper bound on frames pumped after one input, about ten seconds.
const MAX_FRAMES_PER_INPUT: usize = 600;
const SCROLL_SCRIPT: [f32; 8] = [0.0, 400.0, 900.0, 1700.0, 2500.0, 3200.0, 1200.0, 0.0];

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let config_path = parse_args();
    let config = load_config(&config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %config_path.display(),
        level = %config.log_level,
        "Starting scroll session"
    );

    let visits = spawn_visitor_count(&config);
    let outcome = drive_session(&config);

    if let Some((token, worker)) = visits {
        if outcome.is_err() {
            token.cancel();
        }
        match worker.join() {
            Ok(Ok(count)) => info!(count = ?count, "Visitor counter finished"),
            Ok(Err(err)) => warn!("Visitor counter failed: {err:#}"),
            Err(_) => warn!("Visitor counter thread panicked"),
        }
    }
    outcome
}

fn drive_session(config: &PageConfig) -> Result<()> {
    let layout = config.layout();
    let sections = config.section_list()?;
    let bindings = config.animation_bindings()?;
    let mut session = ScrollSession::new(config.session_settings(), sections, config.viewport());
    let mut scope = ScrollScope::new("page");
    for binding in bindings {
        scope.register_group(&mut session, binding.trigger, binding.targets, &binding.spec);
    }
    info!(animations = scope.len(), "Registered scroll animations");

    session.play_intro(hero_intro());
    let mut host = Host::default();
    host.send(&mut session, &layout, Message::Refresh);

    for scroll_y in SCROLL_SCRIPT {
        host.send(&mut session, &layout, Message::Scrolled { scroll_y });
    }
    host.send(&mut session, &layout, Message::ToggleMobileMenu);
    host.send(
        &mut session,
        &layout,
        Message::Navigate(SectionId::from("contact")),
    );

    let snapshot = serde_json::to_string(&session.navigation_snapshot())
        .context("Failed to serialize navigation snapshot")?;
    info!(%snapshot, "Final navigation state");

    let released = scope.dispose(&mut session);
    let leaked = session.teardown();
    debug!(released, leaked, "Session closed");
    Ok(())
}

fn parse_args() -> PathBuf {
    env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("conf/page.toml"))
}

/// Name, title and portrait, overlapping the way the landing page does.
fn hero_intro() -> Timeline {
    let power3 = Ease::Power {
        degree: 3,
        kind: EaseKind::Out,
    };
    Timeline::new()
        .with_delay(0.3)
        .then(
            "hero-name",
            Tween::new(
                VisualState::hidden().with_y(50.0),
                VisualState::IDENTITY,
                1.0,
                power3,
            ),
            Position::Sequential,
        )
        .then(
            "hero-title",
            Tween::new(
                VisualState::hidden().with_y(30.0),
                VisualState::IDENTITY,
                0.8,
                power3,
            ),
            Position::Relative(-0.5),
        )
        .then(
            "hero-image",
            Tween::new(
                VisualState::hidden().with_scale(0.8),
                VisualState::IDENTITY,
                0.8,
                Ease::Back {
                    overshoot: 1.7,
                    kind: EaseKind::Out,
                },
            ),
            Position::Relative(-0.6),
        )
}

type VisitorWorker = thread::JoinHandle<Result<Option<u64>>>;

fn spawn_visitor_count(config: &PageConfig) -> Option<(CancellationToken, VisitorWorker)> {
    if !config.visitors_enabled {
        debug!("Visitor counter disabled");
        return None;
    }
    let counter = match VisitorCounter::new(
        &config.visitors_api_base,
        config.visitors_namespace.clone(),
        config.visitors_key.clone(),
    ) {
        Ok(counter) => counter,
        Err(err) => {
            warn!("Visitor counter unavailable: {err:#}");
            return None;
        }
    };
    let token = CancellationToken::new();
    let worker_token = token.clone();
    let cache_dir = PathBuf::from(&config.cache_dir);
    let worker = thread::spawn(move || record_visit(&counter, &cache_dir, &worker_token));
    Some((token, worker))
}

/// Stand-in for a browser: delivers requested frames and applies effects.
#[derive(Debug, Default)]
struct Host {
    frame_pending: bool,
    scroll_y: f32,
}

impl Host {
    fn send(&mut self, session: &mut ScrollSession, layout: &impl LayoutSource, message: Message) {
        if let Message::Scrolled { scroll_y } = &message {
            self.scroll_y = *scroll_y;
        }
        let effects = session.reduce(message, layout);
        self.apply(session, layout, effects);

        let mut frames = 0;
        while self.frame_pending && frames < MAX_FRAMES_PER_INPUT {
            self.frame_pending = false;
            frames += 1;
            let effects = session.reduce(Message::Frame { dt: FRAME_SECS }, layout);
            self.apply(session, layout, effects);
        }
        if self.frame_pending {
            warn!(frames, "Session still animating after frame budget");
        }
    }

    fn apply(&mut self, session: &mut ScrollSession, layout: &impl LayoutSource, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RequestFrame => self.frame_pending = true,
                Effect::ApplyStyle(update) => debug!(
                    element = %update.element,
                    opacity = update.state.opacity,
                    x = update.state.x,
                    y = update.state.y,
                    scale = update.state.scale,
                    scale_y = update.state.scale_y,
                    width = ?update.state.width,
                    "Style"
                ),
                Effect::ActiveSectionChanged(section) => info!(
                    section = section.as_ref().map(SectionId::as_str).unwrap_or("none"),
                    scroll_y = self.scroll_y,
                    "Active section"
                ),
                Effect::ProgressChanged(progress) => debug!(progress, "Scroll progress"),
                Effect::HeaderScrolledChanged(scrolled) => info!(scrolled, "Header scrolled"),
                Effect::MobileMenuChanged(open) => info!(open, "Mobile menu"),
                Effect::ScrollTo { y, smooth } => {
                    info!(y, smooth, "Scrolling to section");
                    self.scroll_y = y;
                    let follow = session.reduce(Message::Scrolled { scroll_y: y }, layout);
                    self.apply(session, layout, follow);
                }
            }
        }
    }
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    debug!("Logging initialized; override level with logging.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
