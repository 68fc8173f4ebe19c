//! Infrastructure adapters: in-memory driver and message inbox.

pub mod driver;
pub mod inbox;

pub use driver::{DriverCall, InMemoryDriver};
pub use inbox::{FrameworkMessage, InMemoryInbox};
