//! Cooperative cancellation for background work started by the driver
//! (the visitor counter request runs off the frame loop).

use anyhow::{Result, bail};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared flag; clones observe the same cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Fail with the name of the step that noticed the cancellation.
    pub fn check(&self, step: &'static str) -> Result<()> {
        if self.is_cancelled() {
            bail!("cancelled before {step}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_cancellation() {
        let token = CancellationToken::new();
        let worker = token.clone();
        assert!(worker.check("hit").is_ok());
        token.cancel();
        assert!(worker.is_cancelled());
        let err = worker.check("hit").unwrap_err();
        assert!(err.to_string().contains("hit"));
    }
}
