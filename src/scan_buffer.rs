use log::debug;
use std::time::{Duration, Instant};

use crate::inputs::ScanKey;

/// Longest pause between two keys of the same scanner burst
pub const DEFAULT_GAP_THRESHOLD_MS: u64 = 100;
/// Inactivity after which a partial burst is thrown away
pub const DEFAULT_IDLE_RESET_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTimings {
    pub gap_threshold: Duration,
    pub idle_reset: Duration,
}

impl Default for ScanTimings {
    fn default() -> Self {
        Self {
            gap_threshold: Duration::from_millis(DEFAULT_GAP_THRESHOLD_MS),
            idle_reset: Duration::from_millis(DEFAULT_IDLE_RESET_MS),
        }
    }
}

/// A single pending reset deadline. Scheduling replaces whatever was pending.
#[derive(Debug, Default)]
pub struct IdleTimer {
    deadline: Option<Instant>,
}

impl IdleTimer {
    pub fn schedule(&mut self, at: Instant) {
        self.deadline = Some(at);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarms the timer and returns true if its deadline has passed
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Accumulating,
}

/// What the caller should do after a key press
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The key's default action (Enter submitting whatever has focus) must not run.
    ///
    /// In a raw-mode terminal the listener owns every key, so there is nothing
    /// further to suppress; the flag tells callers the key was consumed.
    pub default_prevented: bool,
    /// A completed burst, ready for submission
    pub code: Option<String>,
}

/// Accumulates keyboard-wedge scanner bursts.
///
/// A scanner types a whole code within a few milliseconds and finishes with
/// Enter. Keys separated by more than the gap threshold start a new burst, so
/// slow human typing never reaches a submission, and an armed idle timer drops
/// a partial burst that never got its Enter.
#[derive(Debug)]
pub struct ScanBuffer {
    buffer: String,
    last_key: Option<Instant>,
    idle_timer: IdleTimer,
    timings: ScanTimings,
}

impl Default for ScanBuffer {
    fn default() -> Self {
        Self::new(ScanTimings::default())
    }
}

impl ScanBuffer {
    pub fn new(timings: ScanTimings) -> Self {
        Self {
            buffer: String::new(),
            last_key: None,
            idle_timer: IdleTimer::default(),
            timings,
        }
    }

    pub fn on_key_press(&mut self, key: ScanKey, now: Instant) -> KeyOutcome {
        // A reset that came due before this key runs first, whoever drives the timer
        self.fire_idle_timer(now);

        if self.gap_exceeded(now) && !self.buffer.is_empty() {
            debug!(
                "Key gap over {:?}, dropping {} buffered chars",
                self.timings.gap_threshold,
                self.buffer.chars().count()
            );
            self.buffer.clear();
        }
        self.last_key = Some(now);

        match key {
            ScanKey::Enter => {
                let code = if self.buffer.is_empty() {
                    None
                } else {
                    Some(std::mem::take(&mut self.buffer))
                };
                return KeyOutcome {
                    default_prevented: true,
                    code,
                };
            }
            ScanKey::Printable(c) => self.buffer.push(c),
            ScanKey::Other => {}
        }

        self.idle_timer.schedule(now + self.timings.idle_reset);
        KeyOutcome::default()
    }

    /// Runs the idle reset if it is due. Returns whether it fired.
    pub fn fire_idle_timer(&mut self, now: Instant) -> bool {
        if !self.idle_timer.take_if_due(now) {
            return false;
        }
        if !self.buffer.is_empty() {
            debug!(
                "Idle for {:?}, dropping partial scan of {} chars",
                self.timings.idle_reset,
                self.buffer.chars().count()
            );
        }
        self.buffer.clear();
        true
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.idle_timer.deadline()
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }

    pub fn state(&self) -> ScanState {
        if self.buffer.is_empty() {
            ScanState::Idle
        } else {
            ScanState::Accumulating
        }
    }

    pub fn timings(&self) -> ScanTimings {
        self.timings
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_key = None;
        self.idle_timer.cancel();
    }

    fn gap_exceeded(&self, now: Instant) -> bool {
        match self.last_key {
            Some(last) => now.saturating_duration_since(last) > self.timings.gap_threshold,
            None => true,
        }
    }
}
