use super::ScrollSession;
use crate::controller::AnimationSpec;
use crate::geometry::ElementId;
use crate::observer::Subscription;
use tracing::{debug, warn};

/// Registrations owned by one page section.
///
/// Call [`ScrollScope::dispose`] when the section goes away; a scope dropped
/// while still holding subscriptions logs a warning and leaves them active
/// until the session is torn down.
#[derive(Debug)]
pub struct ScrollScope {
    name: String,
    subscriptions: Vec<Subscription>,
}

impl ScrollScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscriptions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn register(
        &mut self,
        session: &mut ScrollSession,
        element: impl Into<ElementId>,
        spec: &AnimationSpec,
    ) -> Subscription {
        let subscription = session.register_scroll_animation(element, spec);
        self.subscriptions.push(subscription.clone());
        subscription
    }

    pub fn register_group(
        &mut self,
        session: &mut ScrollSession,
        trigger: impl Into<ElementId>,
        targets: Vec<ElementId>,
        spec: &AnimationSpec,
    ) -> Subscription {
        let subscription = session.register_group(trigger, targets, spec);
        self.subscriptions.push(subscription.clone());
        subscription
    }

    /// Unregister everything this scope registered. Returns how many
    /// subscriptions were still live.
    pub fn dispose(mut self, session: &mut ScrollSession) -> usize {
        let subscriptions = std::mem::take(&mut self.subscriptions);
        let released = subscriptions
            .iter()
            .filter(|subscription| session.unregister(subscription))
            .count();
        debug!(scope = %self.name, released, "Disposed scroll scope");
        released
    }
}

impl Drop for ScrollScope {
    fn drop(&mut self) {
        if !self.subscriptions.is_empty() {
            warn!(
                scope = %self.name,
                remaining = self.subscriptions.len(),
                "Scroll scope dropped without dispose"
            );
        }
    }
}
