//! Framework message handlers.

pub mod memory;

pub use memory::{FrameworkMessage, InMemoryInbox};
