//! # Offer Scheduler
//!
//! A framework scheduler for offer-based cluster resource managers.
//!
//! The resource manager periodically offers bundles of resources (CPU, memory,
//! disk, port ranges) on individual nodes. This crate decides which queued
//! work units go onto which offer, launches them, and follows every unit
//! through its lifecycle until it finishes, fails or is lost.
//!
//! ## Core Problem Solved
//!
//! - **Placement**: waiting tasks are matched greedily against each offer in
//!   submission order; an offer never receives more than it holds
//! - **Lifecycle**: every task is in exactly one of waiting, running or finished
//! - **Recovery**: rescinded offers, lost nodes and lost executors put their
//!   tasks back at the front of the waiting queue
//! - **Registration barrier**: submitters can block until the framework is
//!   registered with a manager
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use offer_scheduler::builders::build_scheduler;
//! use offer_scheduler::config::{SchedulerConfig, TaskTemplate};
//! use offer_scheduler::core::SubmitInfo;
//! use offer_scheduler::runtime::EventPump;
//!
//! let scheduler = Arc::new(build_scheduler(&SchedulerConfig::default(), template, driver)?);
//! let pump = EventPump::start(Arc::clone(&scheduler), 256)?;
//!
//! // Manager callbacks are fed into the pump...
//! scheduler.await_registration_default()?;
//! scheduler.submit(&SubmitInfo {
//!     instances: 3,
//!     config_path: "/etc/worker.json".into(),
//!     id: "job-42".into(),
//!     package_path: "/opt/worker.tar.gz".into(),
//! })?;
//! ```
//!
//! For complete examples, see `tests/scheduler_lifecycle_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling: task lifecycle, matching and the callback protocol.
pub mod core;
/// Configuration models for the scheduler and task template.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters: in-memory driver and message inbox.
pub mod infra;
/// Runtime adapters (event pumps) and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
