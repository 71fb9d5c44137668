//! Cooperative cancellation for long-running stages.
//!
//! RANSAC trials and A* expansion are unbounded on adversarial input, so both
//! poll a [`CancelToken`] between units of work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared cancellation flag with an optional deadline.
///
/// Clones share the same flag, so one clone can be handed to a worker while
/// another stays with the caller.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Token that never fires unless [`cancel`](Self::cancel) is called
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that also fires once `timeout` has elapsed from now
    pub fn with_deadline(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once cancelled or past the deadline
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::Relaxed) {
            return true;
        }
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// True once [`cancel`](Self::cancel) was called. Ignores the deadline,
    /// so it costs a single atomic load.
    #[inline]
    pub fn is_flagged(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Return `Cancelled { stage }` if the token has fired
    #[inline]
    pub fn check(&self, stage: &'static str) -> crate::Result<()> {
        if self.is_cancelled() {
            Err(crate::NavError::Cancelled { stage })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_shared_between_clones() {
        let token = CancelToken::new();
        let worker = token.clone();
        assert!(!worker.is_cancelled());
        token.cancel();
        assert!(worker.is_cancelled());
        assert!(worker.check("test").is_err());
    }

    #[test]
    fn test_expired_deadline() {
        let token = CancelToken::with_deadline(Duration::ZERO);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_flag_ignores_deadline() {
        let token = CancelToken::with_deadline(Duration::ZERO);
        assert!(!token.is_flagged());
        token.cancel();
        assert!(token.is_flagged());
    }

    #[test]
    fn test_far_deadline() {
        let token = CancelToken::with_deadline(Duration::from_secs(3600));
        assert!(!token.is_cancelled());
        assert!(token.check("test").is_ok());
    }
}
