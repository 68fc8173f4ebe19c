//! Shared utilities.

pub mod clock;
pub mod ids;
pub mod resources;
pub mod telemetry;

pub use clock::*;
pub use ids::*;
pub use resources::*;
pub use telemetry::*;
