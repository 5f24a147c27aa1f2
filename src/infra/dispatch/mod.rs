//! Dispatcher backends.

pub mod memory;

pub use memory::RecordingDispatcher;
