use std::time::{Duration, Instant};

/// Coalesces viewport sizes around fullscreen transitions.
///
/// Browsers report intermediate sizes while the fullscreen animation runs, so
/// a fullscreen change arms a settle window: sizes offered during it are held
/// as pending and only the last one is released once the window elapses.
/// Outside a settle window sizes pass straight through. All decisions take an
/// explicit `now` so callers (and tests) own the clock.
#[derive(Debug)]
pub struct ResizeDebouncer {
    settle: Duration,
    deadline: Option<Instant>,
    pending: Option<(u32, u32)>,
}

impl ResizeDebouncer {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            deadline: None,
            pending: None,
        }
    }

    /// A fullscreen transition started; hold incoming sizes until it settles.
    pub fn note_fullscreen_change(&mut self, now: Instant) {
        self.deadline = Some(now + self.settle);
    }

    /// Offer a viewport size. Returns the size to apply immediately, or
    /// `None` when it was deferred into the settle window.
    pub fn offer(&mut self, width: u32, height: u32, now: Instant) -> Option<(u32, u32)> {
        match self.deadline {
            Some(deadline) if now < deadline => {
                self.pending = Some((width, height));
                None
            }
            _ => {
                self.deadline = None;
                self.pending = None;
                Some((width, height))
            }
        }
    }

    /// Release the pending size once the settle window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<(u32, u32)> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    pub fn is_settling(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }
}
