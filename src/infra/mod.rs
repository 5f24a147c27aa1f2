//! In-memory adapters for the host probe and dispatch boundaries.

pub mod dispatch;
pub mod probe;
pub use dispatch::RecordingDispatcher;
pub use probe::InMemoryProbe;
