pub mod event_source;
pub mod scan_key;

pub use event_source::{EventSource, KeyboardEventSource, SimulatedEventSource, TimedEvent};
pub use scan_key::ScanKey;
