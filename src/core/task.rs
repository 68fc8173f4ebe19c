//! Work-unit model: immutable requests and their mutable lifecycle records.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::TaskTemplate;
use crate::core::{SchedulerError, StatusKind};
use crate::util::{ExecutorId, NodeId, OfferId, Resources, TaskId};

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Queued, not yet matched to an offer.
    Waiting,
    /// Matched and a launch was requested; not yet confirmed.
    Launching,
    /// Confirmed running by the manager.
    Running,
    /// Completed successfully.
    Finished,
    /// Failed, killed or errored.
    Failed,
    /// Lost together with its node or executor.
    Lost,
}

impl TaskState {
    /// True for states that never change again.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Lost)
    }

    /// True while the task holds an offer and a node assignment.
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Launching | Self::Running)
    }
}

/// Terminal outcome applied by [`TaskQueue::finish`](crate::core::TaskQueue::finish).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    /// Completed successfully.
    Finished,
    /// Failed, killed or errored.
    Failed,
    /// Lost with its node or executor.
    Lost,
}

impl From<TaskOutcome> for TaskState {
    fn from(outcome: TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Finished => Self::Finished,
            TaskOutcome::Failed => Self::Failed,
            TaskOutcome::Lost => Self::Lost,
        }
    }
}

/// Command an executor runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInfo {
    /// Shell command line.
    pub value: String,
    /// Artifacts fetched into the sandbox before the command starts.
    #[serde(default)]
    pub uris: Vec<String>,
}

/// Executor descriptor shared by every task of a scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorInfo {
    /// Executor identifier, unique per node.
    pub executor_id: ExecutorId,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Command that starts the executor.
    pub command: CommandInfo,
}

/// Isolation technology for launched tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Manager-native containerizer.
    #[default]
    Mesos,
    /// Docker containerizer.
    Docker,
}

/// Container/isolation descriptor shared by every task of a scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Containerizer to use.
    #[serde(default)]
    pub kind: ContainerKind,
    /// Image to run, if any.
    #[serde(default)]
    pub image: Option<String>,
    /// Network mode or name, if any.
    #[serde(default)]
    pub network: Option<String>,
}

/// Opaque per-task data handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    /// Submission the task was expanded from.
    pub submission_id: String,
    /// Configuration file the worker reads.
    pub config_path: String,
    /// Command the worker runs.
    pub command: String,
    /// Worker package to deploy.
    pub package_path: String,
}

/// Immutable request for one work unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Unique task id.
    pub id: TaskId,
    /// Resources the task needs from one offer.
    pub resources: Resources,
    /// Executor that runs the task.
    pub executor: Arc<ExecutorInfo>,
    /// Container the task runs in.
    pub container: Arc<ContainerInfo>,
    /// Opaque payload.
    pub payload: TaskPayload,
}

impl TaskRequest {
    /// Encode the payload as JSON bytes for the launch's data field.
    pub fn encode_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.payload)
    }
}

/// Request to start `instances` copies of a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitInfo {
    /// Number of instances.
    pub instances: u32,
    /// Path to the configuration file.
    pub config_path: String,
    /// Submission id; task ids are derived from it.
    pub id: String,
    /// Full path of the worker package to deploy.
    pub package_path: String,
}

/// Expand a submission into one request per instance, ids `"{id}-{index}"`.
pub fn expand_submission(
    info: &SubmitInfo,
    template: &TaskTemplate,
) -> Result<Vec<TaskRequest>, SchedulerError> {
    if info.instances == 0 {
        return Err(SchedulerError::InvalidSubmission(
            "instances must be greater than 0".into(),
        ));
    }
    if info.id.trim().is_empty() {
        return Err(SchedulerError::InvalidSubmission("id must not be empty".into()));
    }

    let executor = Arc::new(template.executor.clone());
    let container = Arc::new(template.container.clone());
    Ok((0..info.instances)
        .map(|index| TaskRequest {
            id: TaskId::new(format!("{}-{index}", info.id)),
            resources: template.resources_per_task.clone(),
            executor: Arc::clone(&executor),
            container: Arc::clone(&container),
            payload: TaskPayload {
                submission_id: info.id.clone(),
                config_path: info.config_path.clone(),
                command: template.executor.command.value.clone(),
                package_path: info.package_path.clone(),
            },
        })
        .collect())
}

/// Lifecycle record wrapping one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// The immutable request.
    pub request: TaskRequest,
    pub(crate) state: TaskState,
    pub(crate) assigned_node: Option<NodeId>,
    pub(crate) offer_id: Option<OfferId>,
    pub(crate) last_node: Option<NodeId>,
    pub(crate) last_status: Option<StatusKind>,
    pub(crate) message: Option<String>,
    pub(crate) launch_attempts: u32,
}

impl TaskRecord {
    /// New waiting record.
    pub const fn new(request: TaskRequest) -> Self {
        Self {
            request,
            state: TaskState::Waiting,
            assigned_node: None,
            offer_id: None,
            last_node: None,
            last_status: None,
            message: None,
            launch_attempts: 0,
        }
    }

    /// Task id.
    pub const fn id(&self) -> &TaskId {
        &self.request.id
    }

    /// Current state.
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Node the task is launching/running on.
    pub const fn assigned_node(&self) -> Option<&NodeId> {
        self.assigned_node.as_ref()
    }

    /// Offer the task was matched to while launching/running.
    pub const fn offer_id(&self) -> Option<&OfferId> {
        self.offer_id.as_ref()
    }

    /// Node of the most recent launch, kept after the task leaves it.
    pub const fn last_node(&self) -> Option<&NodeId> {
        self.last_node.as_ref()
    }

    /// Last status kind reported by the manager.
    pub const fn last_status(&self) -> Option<StatusKind> {
        self.last_status
    }

    /// Last status message reported by the manager.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// How many times the task was matched to an offer.
    pub const fn launch_attempts(&self) -> u32 {
        self.launch_attempts
    }
}
