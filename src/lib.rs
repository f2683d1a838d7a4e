pub mod clock;
pub mod config;
pub mod inputs;
pub mod listener;
pub mod page;
pub mod panic_handler;
pub mod scan_buffer;
pub mod submit;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use inputs::event_source;
