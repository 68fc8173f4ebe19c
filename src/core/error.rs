//! Error types for scheduler operations.

use thiserror::Error;

use crate::core::TaskState;
use crate::util::TaskId;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A lifecycle operation was applied to a task in the wrong state.
    /// Raised when a matching plan references a task that is not waiting.
    #[error("invalid transition for task {task_id}: cannot {action} from {from:?}")]
    InvalidTransition {
        /// Task the operation targeted.
        task_id: TaskId,
        /// State the task was in.
        from: TaskState,
        /// Operation that was attempted.
        action: &'static str,
    },
    /// A matching plan referenced an offer outside the batch or claimed a task twice.
    #[error("invalid match plan: {0}")]
    InvalidPlan(String),
    /// No task with this id was ever submitted (or it was purged).
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),
    /// A task with this id is already tracked.
    #[error("duplicate task: {0}")]
    DuplicateTask(TaskId),
    /// Submission request failed validation.
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
    /// The framework did not register within the allotted time.
    #[error("registration timed out")]
    RegistrationTimeout,
    /// Unrecoverable resource-manager error; the connection is gone.
    #[error("fatal manager error: {0}")]
    Fatal(String),
    /// The driver refused an outbound request.
    #[error("driver error: {0}")]
    Driver(String),
    /// Configuration failed validation.
    #[error("config invalid: {0}")]
    Config(String),
    /// The event loop delivering callbacks has stopped.
    #[error("event pump closed")]
    PumpClosed,
}

impl SchedulerError {
    /// True for errors the owning process must handle by restarting or failing over.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
