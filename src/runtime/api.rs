//! API-facing request/response models.

use serde::{Deserialize, Serialize};

use crate::core::{
    ConnectionState, OfferMatcher, SchedulerCore, SchedulerDriver, SchedulerError,
    SchedulerSnapshot, SubmitInfo, TaskRecord,
};
use crate::util::{FrameworkId, TaskId};

/// Task submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Submission identifier; task ids are derived from it.
    pub id: String,
    /// Number of task instances.
    pub instances: u32,
    /// Configuration file path handed to each task.
    #[serde(default)]
    pub config_path: String,
    /// Package path handed to each task.
    #[serde(default)]
    pub package_path: String,
}

impl From<SubmitRequest> for SubmitInfo {
    fn from(req: SubmitRequest) -> Self {
        Self {
            instances: req.instances,
            config_path: req.config_path,
            id: req.id,
            package_path: req.package_path,
        }
    }
}

/// Submission result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Submission identifier.
    pub id: String,
    /// Ids of the queued tasks.
    pub task_ids: Vec<TaskId>,
}

/// Counts and records for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    /// Connection state.
    pub connection: ConnectionState,
    /// Framework id, once registered.
    pub framework_id: Option<FrameworkId>,
    /// Fatal manager error, if any.
    pub fatal: Option<String>,
    /// Number of waiting tasks.
    pub waiting: usize,
    /// Number of launching or running tasks.
    pub running: usize,
    /// Number of terminal tasks.
    pub finished: usize,
    /// All records, waiting first.
    pub tasks: Vec<TaskRecord>,
}

impl From<SchedulerSnapshot> for SnapshotResponse {
    fn from(snap: SchedulerSnapshot) -> Self {
        let waiting = snap.waiting.len();
        let running = snap.running.len();
        let finished = snap.finished.len();
        let mut tasks = snap.waiting;
        tasks.extend(snap.running);
        tasks.extend(snap.finished);
        Self {
            connection: snap.connection,
            framework_id: snap.framework_id,
            fatal: snap.fatal,
            waiting,
            running,
            finished,
            tasks,
        }
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag: registered and no fatal error.
    pub ok: bool,
    /// Connection state.
    pub connection: ConnectionState,
}

/// Submit a request to a scheduler.
pub fn submit_task<D, M>(
    scheduler: &SchedulerCore<D, M>,
    req: SubmitRequest,
) -> Result<SubmitResponse, SchedulerError>
where
    D: SchedulerDriver,
    M: OfferMatcher,
{
    let id = req.id.clone();
    let task_ids = scheduler.submit(&req.into())?;
    Ok(SubmitResponse { id, task_ids })
}

/// Build a listing from the scheduler state.
pub fn snapshot<D, M>(scheduler: &SchedulerCore<D, M>) -> SnapshotResponse
where
    D: SchedulerDriver,
    M: OfferMatcher,
{
    scheduler.snapshot().into()
}

/// Return a health payload.
pub fn health<D, M>(scheduler: &SchedulerCore<D, M>) -> Health
where
    D: SchedulerDriver,
    M: OfferMatcher,
{
    let connection = scheduler.connection();
    Health {
        ok: connection == ConnectionState::Registered && scheduler.fatal_error().is_none(),
        connection,
    }
}
