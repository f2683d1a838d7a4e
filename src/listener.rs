use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, error, info};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::event_source::EventSource;
use crate::inputs::ScanKey;
use crate::page::{CODE_FIELD, Page};
use crate::scan_buffer::{KeyOutcome, ScanBuffer, ScanTimings};
use crate::submit::Submitter;

/// How long the loop waits for input when no idle reset is pending
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Wires a scan buffer to the page's scan form
pub struct ScanListener {
    buffer: ScanBuffer,
    page: Page,
    submitter: Submitter,
}

impl ScanListener {
    pub fn new(timings: ScanTimings, page: Page, submitter: Submitter) -> Self {
        Self {
            buffer: ScanBuffer::new(timings),
            page,
            submitter,
        }
    }

    pub fn on_key_press(&mut self, key: &KeyEvent, now: Instant) -> KeyOutcome {
        let Some(scan_key) = ScanKey::from_key_event(key) else {
            return KeyOutcome::default();
        };

        let outcome = self.buffer.on_key_press(scan_key, now);
        match &outcome.code {
            Some(code) => self.submit(code),
            None if outcome.default_prevented => {
                debug!("Enter with nothing buffered, swallowed");
            }
            None => {}
        }
        outcome
    }

    /// Fill the scan form's code field and send the form.
    ///
    /// Pages without a scan form, or with one lacking a code field, are
    /// normal: the listener runs everywhere and the code is dropped.
    pub fn submit(&mut self, code: &str) {
        let Some(form) = self.page.scan_form_mut() else {
            debug!("No scan form on page, dropping scanned code");
            return;
        };
        let Some(input) = form.input_mut(CODE_FIELD) else {
            debug!("Scan form has no '{CODE_FIELD}' input, dropping scanned code");
            return;
        };
        input.value = code.to_string();
        debug!("Scanned code {code:?}");

        let strategy = self.submitter.select();
        if let Err(e) = strategy.submit(form) {
            error!("Scan submission via {} failed: {e}", strategy.name());
        }
    }

    pub fn on_idle(&mut self, now: Instant) -> bool {
        self.buffer.fire_idle_timer(now)
    }

    /// How long the loop may block before the idle reset is due
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        match self.buffer.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => IDLE_POLL_INTERVAL,
        }
    }

    pub fn buffer(&self) -> &ScanBuffer {
        &self.buffer
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
        && key.code == KeyCode::Char('c')
        && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Runs the listener until the session ends (Ctrl+C)
pub fn run_listener_with_event_source<E: EventSource, C: Clock>(
    listener: &mut ScanListener,
    event_source: &mut E,
    clock: &C,
) -> Result<()> {
    loop {
        listener.on_idle(clock.now());

        let timeout = listener.poll_timeout(clock.now());
        if !event_source.poll(timeout)? {
            continue;
        }

        match event_source.read()? {
            Event::Key(key) if is_quit_key(&key) => {
                info!("Quit requested, stopping scan listener");
                return Ok(());
            }
            Event::Key(key) => {
                listener.on_key_press(&key, clock.now());
            }
            _ => {}
        }
    }
}
