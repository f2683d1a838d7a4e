use anyhow::Result;
pub use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::clock::ManualClock;

/// Trait for abstracting event sources to enable testing
pub trait EventSource {
    /// Poll for events with a timeout
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Read the next event
    fn read(&mut self) -> Result<Event>;
}

/// Real keyboard event source using crossterm
pub struct KeyboardEventSource;

impl EventSource for KeyboardEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        Ok(crossterm::event::poll(timeout)?)
    }

    fn read(&mut self) -> Result<Event> {
        Ok(crossterm::event::read()?)
    }
}

/// An event that arrives `delay` after the previous one
#[derive(Debug, Clone)]
pub struct TimedEvent {
    pub delay: Duration,
    pub event: Event,
}

impl TimedEvent {
    pub fn new(delay: Duration, event: Event) -> Self {
        Self { delay, event }
    }

    pub fn immediate(event: Event) -> Self {
        Self::new(Duration::ZERO, event)
    }
}

/// Simulated event source for testing.
///
/// Time only passes through `poll`: waiting for an event advances the shared
/// clock by the event's delay, or by the poll timeout when that is shorter,
/// so idle deadlines expire exactly as they would between real key presses.
pub struct SimulatedEventSource {
    pub(crate) events: Vec<TimedEvent>,
    current_index: usize,
    remaining: Option<Duration>,
    clock: ManualClock,
}

impl SimulatedEventSource {
    pub fn new(clock: ManualClock, events: Vec<TimedEvent>) -> Self {
        Self {
            events,
            current_index: 0,
            remaining: None,
            clock,
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Helper method to create a key event
    pub fn key_event(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: crossterm::event::KeyEventKind::Press,
            state: crossterm::event::KeyEventState::empty(),
        })
    }

    /// Helper method to create a simple character key event
    pub fn char_key(c: char) -> Event {
        Self::key_event(KeyCode::Char(c), KeyModifiers::empty())
    }

    /// Helper method to create a Ctrl+char key event
    pub fn ctrl_char_key(c: char) -> Event {
        Self::key_event(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    pub fn enter_key() -> Event {
        Self::key_event(KeyCode::Enter, KeyModifiers::empty())
    }
}

impl EventSource for SimulatedEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        let Some(next) = self.events.get(self.current_index) else {
            // Exhausted: read() hands out the quit chord
            return Ok(true);
        };

        let remaining = self.remaining.get_or_insert(next.delay);
        if *remaining <= timeout {
            self.clock.advance(*remaining);
            *remaining = Duration::ZERO;
            Ok(true)
        } else {
            self.clock.advance(timeout);
            *remaining -= timeout;
            Ok(false)
        }
    }

    fn read(&mut self) -> Result<Event> {
        if let Some(next) = self.events.get(self.current_index) {
            if let Some(remaining) = self.remaining.take() {
                self.clock.advance(remaining);
            } else {
                self.clock.advance(next.delay);
            }
            self.current_index += 1;
            Ok(next.event.clone())
        } else {
            // Return a quit event if we've exhausted all events
            Ok(SimulatedEventSource::ctrl_char_key('c'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;

    #[test]
    fn test_simulated_event_source() {
        let clock = ManualClock::new();
        let events = vec![
            TimedEvent::immediate(SimulatedEventSource::char_key('1')),
            TimedEvent::immediate(SimulatedEventSource::char_key('2')),
            TimedEvent::immediate(SimulatedEventSource::enter_key()),
        ];

        let mut source = SimulatedEventSource::new(clock, events);

        assert!(source.poll(Duration::from_millis(0)).unwrap());

        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('1'));
            assert!(key.modifiers.is_empty());
        }

        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('2'));
        }

        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Enter);
        }

        // Exhausted sources end the session with Ctrl+C
        assert!(source.poll(Duration::from_millis(0)).unwrap());
        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('c'));
            assert!(key.modifiers.contains(KeyModifiers::CONTROL));
        } else {
            panic!("Expected quit key");
        }
    }

    #[test]
    fn test_poll_advances_clock_by_timeout_when_event_is_later() {
        let clock = ManualClock::new();
        let start = clock.now();
        let events = vec![TimedEvent::new(
            Duration::from_millis(350),
            SimulatedEventSource::enter_key(),
        )];
        let mut source = SimulatedEventSource::new(clock.clone(), events);

        assert!(!source.poll(Duration::from_millis(300)).unwrap());
        assert_eq!(clock.now() - start, Duration::from_millis(300));

        assert!(source.poll(Duration::from_millis(300)).unwrap());
        assert_eq!(clock.now() - start, Duration::from_millis(350));

        // Polling again before reading does not move time
        assert!(source.poll(Duration::from_millis(300)).unwrap());
        source.read().unwrap();
        assert_eq!(clock.now() - start, Duration::from_millis(350));
    }

    #[test]
    fn test_read_without_poll_still_waits_for_delay() {
        let clock = ManualClock::new();
        let start = clock.now();
        let events = vec![TimedEvent::new(
            Duration::from_millis(40),
            SimulatedEventSource::char_key('9'),
        )];
        let mut source = SimulatedEventSource::new(clock.clone(), events);

        source.read().unwrap();
        assert_eq!(clock.now() - start, Duration::from_millis(40));
    }
}
