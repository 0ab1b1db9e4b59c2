use std::cell::Cell;
use std::rc::Rc;

// ============================================================================
// Clock
// ============================================================================

/// Millisecond time source for the indexer. Tests drive a [`ManualClock`].
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Virtual time. Clones share the same instant, so a test can keep one
/// handle and give another to the collector.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ============================================================================
// Debounce with timeout
// ============================================================================

/// Trailing debounce with a hard deadline. Every `touch` restarts the quiet
/// window; the task becomes due once the window elapses without a touch, or
/// once `max_wait_ms` has passed since the first touch, whichever is earlier.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_ms: u64,
    max_wait_ms: u64,
    first_touch: Option<u64>,
    last_touch: Option<u64>,
}

impl Debouncer {
    pub fn new(quiet_ms: u64, max_wait_ms: u64) -> Self {
        Self {
            quiet_ms,
            max_wait_ms,
            first_touch: None,
            last_touch: None,
        }
    }

    pub fn touch(&mut self, now: u64) {
        if self.first_touch.is_none() {
            self.first_touch = Some(now);
        }
        self.last_touch = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.first_touch.is_some()
    }

    /// Earliest instant at which the task fires.
    pub fn deadline(&self) -> Option<u64> {
        let first = self.first_touch?;
        let last = self.last_touch.unwrap_or(first);
        Some((last + self.quiet_ms).min(first + self.max_wait_ms))
    }

    pub fn is_due(&self, now: u64) -> bool {
        self.deadline().map(|d| now >= d).unwrap_or(false)
    }

    /// Consume the pending task if it is due.
    pub fn take_due(&mut self, now: u64) -> bool {
        if self.is_due(now) {
            self.cancel();
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.first_touch = None;
        self.last_touch = None;
    }
}
