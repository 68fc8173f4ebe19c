//! Driver backends.

pub mod memory;

pub use memory::{DriverCall, InMemoryDriver};
