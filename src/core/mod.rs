//! Core scheduling abstractions: task model, queues, matching and the
//! callback-driven scheduler.

pub mod audit;
pub mod error;
pub mod matcher;
pub mod protocol;
pub mod queue;
pub mod scheduler;
pub mod task;

pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink};
pub use error::{AppResult, SchedulerError};
pub use matcher::{FirstFitMatcher, MatchPlan, OfferAssignment, OfferMatcher};
pub use protocol::{
    Filters, MasterInfo, MessageHandler, Offer, Scheduler, SchedulerDriver, SchedulerEvent,
    StatusKind, TaskStatusUpdate,
};
pub use queue::{QueueSnapshot, TaskQueue};
pub use scheduler::{ConnectionState, SchedulerCore, SchedulerSnapshot, Spawn};
pub use task::{
    expand_submission, CommandInfo, ContainerInfo, ContainerKind, ExecutorInfo, SubmitInfo,
    TaskOutcome, TaskPayload, TaskRecord, TaskRequest, TaskState,
};
