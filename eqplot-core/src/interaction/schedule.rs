//! Redraw coalescing and upload debouncing.
//!
//! Time is passed in as [`Instant`] values so hosts drive both from their own
//! event loop and tests can step through time without sleeping.

use std::time::{Duration, Instant};

/// Coalesces redraw requests so at most one frame is drawn per display refresh
#[derive(Debug, Clone, Default)]
pub struct RenderThrottle {
    pending: bool,
    coalesced: u64,
}

impl RenderThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a redraw. Returns false if one was already pending.
    pub fn request(&mut self) -> bool {
        if self.pending {
            self.coalesced += 1;
            false
        } else {
            self.pending = true;
            true
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Called once per display refresh; true when a frame should be drawn
    pub fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Requests folded into an already pending frame so far
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

/// Trailing-edge debounce for config uploads. Every schedule call restarts the
/// quiet period; the upload fires once the period passes with no new calls.
#[derive(Debug, Clone)]
pub struct UploadDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl UploadDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True exactly once when the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending upload. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_coalesces_requests() {
        let mut throttle = RenderThrottle::new();
        assert!(!throttle.take_frame());
        assert!(throttle.request());
        assert!(!throttle.request());
        assert!(!throttle.request());
        assert!(throttle.take_frame());
        assert!(!throttle.take_frame());
        assert_eq!(throttle.coalesced(), 2);
    }

    #[test]
    fn test_debounce_restarts_quiet_period() {
        let start = Instant::now();
        let mut debouncer = UploadDebouncer::new(Duration::from_millis(100));
        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(80));
        assert!(!debouncer.poll(start + Duration::from_millis(150)));
        assert!(debouncer.poll(start + Duration::from_millis(180)));
        assert!(!debouncer.poll(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_debounce_cancel() {
        let start = Instant::now();
        let mut debouncer = UploadDebouncer::new(Duration::from_millis(100));
        assert!(!debouncer.cancel());
        debouncer.schedule(start);
        assert!(debouncer.cancel());
        assert!(!debouncer.poll(start + Duration::from_secs(1)));
    }
}
