use super::messages::Message;
use super::snapshot::FrameSnapshot;
use super::{MOBILE_MENU_KEY, ScrollSession};
use crate::controller::StyleUpdate;
use crate::geometry::{ElementId, LayoutSource, Viewport, sanitize_px};
use crate::navigation::MOBILE_MENU_ELEMENT;
use crate::section::SectionId;
use tracing::{debug, trace};

/// Describes work the host must perform outside the pure reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Schedule exactly one `Message::Frame` on the next animation frame.
    RequestFrame,
    ApplyStyle(StyleUpdate),
    ActiveSectionChanged(Option<SectionId>),
    ProgressChanged(f32),
    HeaderScrolledChanged(bool),
    MobileMenuChanged(bool),
    ScrollTo { y: f32, smooth: bool },
}

impl ScrollSession {
    pub fn reduce(&mut self, message: Message, layout: &impl LayoutSource) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::Scrolled { scroll_y } => self.handle_scrolled(scroll_y, &mut effects),
            Message::Resized {
                viewport_height,
                document_height,
            } => self.handle_resized(viewport_height, document_height, &mut effects),
            Message::Refresh => {
                self.dirty = true;
                self.request_frame(&mut effects);
            }
            Message::Frame { dt } => self.handle_frame(dt, layout, &mut effects),
            Message::Navigate(section) => self.handle_navigate(section, layout, &mut effects),
            Message::ToggleMobileMenu => self.handle_toggle_mobile_menu(&mut effects),
            Message::CloseMobileMenu => self.handle_close_mobile_menu(&mut effects),
        }

        effects
    }

    fn request_frame(&mut self, effects: &mut Vec<Effect>) {
        if !self.frame_requested {
            self.frame_requested = true;
            effects.push(Effect::RequestFrame);
        }
    }

    fn handle_scrolled(&mut self, scroll_y: f32, effects: &mut Vec<Effect>) {
        self.scroll_y = sanitize_px(scroll_y);
        self.dirty = true;
        self.request_frame(effects);
    }

    fn handle_resized(&mut self, viewport_height: f32, document_height: f32, effects: &mut Vec<Effect>) {
        self.viewport = Viewport::new(viewport_height, document_height);
        debug!(
            viewport_height = self.viewport.height(),
            document_height = self.viewport.document_height(),
            "Viewport resized"
        );
        self.dirty = true;
        self.request_frame(effects);
    }

    fn handle_frame(&mut self, dt: f32, layout: &impl LayoutSource, effects: &mut Vec<Effect>) {
        self.frame_requested = false;
        let dt = sanitize_px(dt).max(0.0);
        self.clock += f64::from(dt);

        if !self.dirty && !self.controller.is_animating() {
            trace!("Idle frame");
            return;
        }

        let snapshot = FrameSnapshot::measure(
            layout,
            self.tracker.sections(),
            self.observer.elements().chain(self.controller.targets()),
        );

        let mut styles = self.controller.advance(dt, &snapshot);

        if std::mem::take(&mut self.dirty) {
            let scroll_y = self.viewport.clamp_scroll(self.scroll_y);
            self.tracker.set_viewport(self.viewport);
            self.tracker.set_tops(snapshot.section_tops().iter().copied());
            let active = self.tracker.update(scroll_y);

            let changes = self.navigation.apply(active, scroll_y, &self.viewport);
            if changes.active {
                effects.push(Effect::ActiveSectionChanged(
                    self.navigation.active_section().cloned(),
                ));
            }
            if changes.progress {
                effects.push(Effect::ProgressChanged(self.navigation.progress()));
            }
            if changes.scrolled {
                effects.push(Effect::HeaderScrolledChanged(self.navigation.is_scrolled()));
            }

            let events =
                self.observer
                    .evaluate(scroll_y, self.viewport.height(), &snapshot, self.clock);
            for event in &events {
                self.controller.on_viewport_event(event, &snapshot);
            }
            styles.extend(self.controller.flush(&snapshot));
        }

        effects.extend(styles.into_iter().map(Effect::ApplyStyle));

        if self.controller.is_animating() {
            self.request_frame(effects);
        }
    }

    fn handle_navigate(&mut self, section: SectionId, layout: &impl LayoutSource, effects: &mut Vec<Effect>) {
        self.handle_close_mobile_menu(effects);

        if !self.tracker.sections().contains(&section) {
            debug!(section = %section, "Ignoring navigation to unknown section");
            return;
        }
        let Some(top) = layout.element_top(&section.anchor()) else {
            trace!(section = %section, "Navigation target not laid out");
            return;
        };
        let y = self.viewport.clamp_scroll(top);
        debug!(section = %section, y, "Navigating to section");
        effects.push(Effect::ScrollTo {
            y,
            smooth: self.settings.smooth_navigation,
        });
    }

    fn handle_toggle_mobile_menu(&mut self, effects: &mut Vec<Effect>) {
        let open = self.navigation.toggle_mobile_menu();
        effects.push(Effect::MobileMenuChanged(open));
        if open {
            let timeline = self
                .settings
                .mobile_menu
                .timeline(&[ElementId::from(MOBILE_MENU_ELEMENT)]);
            self.controller.play_one_shot(MOBILE_MENU_KEY, timeline);
            self.request_frame(effects);
        } else {
            self.controller.stop_one_shot(MOBILE_MENU_KEY);
        }
    }

    fn handle_close_mobile_menu(&mut self, effects: &mut Vec<Effect>) {
        if self.navigation.close_mobile_menu() {
            self.controller.stop_one_shot(MOBILE_MENU_KEY);
            effects.push(Effect::MobileMenuChanged(false));
        }
    }
}
