//! Host probe backends.

pub mod memory;

pub use memory::InMemoryProbe;
