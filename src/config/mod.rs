//! Configuration models for the scheduler and its task template.

pub mod scheduler;

pub use scheduler::{ResidualPolicy, SchedulerConfig, TaskTemplate};
