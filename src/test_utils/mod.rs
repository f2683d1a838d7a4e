pub mod test_helpers {
    use crate::clock::ManualClock;
    use crate::event_source::{
        Event, KeyCode, KeyEvent, KeyModifiers, SimulatedEventSource, TimedEvent,
    };
    use crate::listener::ScanListener;
    use crate::page::Page;
    use crate::scan_buffer::ScanTimings;
    use crate::submit::{MockSubmitStrategy, Submitter};
    use std::time::Duration;

    /// Builder for creating test scenarios with simulated, timed key presses
    pub struct TestScenarioBuilder {
        events: Vec<TimedEvent>,
        pending_delay: Duration,
        clock: ManualClock,
    }

    impl Default for TestScenarioBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self {
                events: Vec::new(),
                pending_delay: Duration::ZERO,
                clock: ManualClock::new(),
            }
        }

        /// The clock the built event source advances
        pub fn clock(&self) -> ManualClock {
            self.clock.clone()
        }

        /// Let time pass before the next key
        pub fn wait_ms(mut self, ms: u64) -> Self {
            self.pending_delay += Duration::from_millis(ms);
            self
        }

        fn push(mut self, event: Event) -> Self {
            let delay = std::mem::take(&mut self.pending_delay);
            self.events.push(TimedEvent::new(delay, event));
            self
        }

        /// Add a character key press
        pub fn press_char(self, c: char) -> Self {
            self.push(SimulatedEventSource::char_key(c))
        }

        /// Add a Ctrl+character key press
        pub fn press_ctrl_char(self, c: char) -> Self {
            self.push(SimulatedEventSource::ctrl_char_key(c))
        }

        /// Type every character of `text`, `gap_ms` apart, the first one right away
        pub fn type_burst(mut self, text: &str, gap_ms: u64) -> Self {
            for (i, c) in text.chars().enumerate() {
                if i > 0 {
                    self = self.wait_ms(gap_ms);
                }
                self = self.press_char(c);
            }
            self
        }

        /// Press Enter
        pub fn press_enter(self) -> Self {
            self.push(SimulatedEventSource::enter_key())
        }

        /// Press Tab
        pub fn press_tab(self) -> Self {
            self.push(Event::Key(KeyEvent {
                code: KeyCode::Tab,
                modifiers: KeyModifiers::empty(),
                kind: crossterm::event::KeyEventKind::Press,
                state: crossterm::event::KeyEventState::empty(),
            }))
        }

        /// Press Shift
        pub fn press_shift(self) -> Self {
            self.push(SimulatedEventSource::key_event(
                KeyCode::Modifier(crossterm::event::ModifierKeyCode::LeftShift),
                KeyModifiers::SHIFT,
            ))
        }

        /// End the session (Ctrl+C)
        pub fn quit(self) -> Self {
            self.press_ctrl_char('c')
        }

        /// Build the simulated event source
        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.clock, self.events)
        }
    }

    /// Listener with recording strategies; `ajax` decides whether the page has
    /// its AJAX helper
    pub fn create_test_listener(page: Page, ajax: bool) -> ScanListener {
        let native = Box::new(MockSubmitStrategy::new("native"));
        let submitter = if ajax {
            Submitter::new(Some(Box::new(MockSubmitStrategy::new("ajax"))), native)
        } else {
            Submitter::native_only(native)
        };
        ScanListener::new(ScanTimings::default(), page, submitter)
    }

    /// Codes received by the strategy the listener currently selects
    pub fn submitted_codes(listener: &ScanListener) -> Vec<String> {
        listener
            .submitter()
            .select()
            .as_any()
            .downcast_ref::<MockSubmitStrategy>()
            .map(MockSubmitStrategy::get_submitted_codes)
            .unwrap_or_default()
    }
}
