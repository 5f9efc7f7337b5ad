use crate::section::SectionId;

/// Input delivered by the host (scroll/resize listeners, frame callbacks,
/// navigation clicks).
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Scrolled {
        scroll_y: f32,
    },
    Resized {
        viewport_height: f32,
        document_height: f32,
    },
    /// Re-measure everything on the next frame, e.g. after registering
    /// animations or once the page has loaded.
    Refresh,
    /// Animation frame callback; `dt` is seconds since the previous frame.
    Frame {
        dt: f32,
    },
    Navigate(SectionId),
    ToggleMobileMenu,
    CloseMobileMenu,
}
