//! Callback protocol between the scheduler and the resource manager.
//!
//! Inbound: the manager (or a [`runtime`](crate::runtime) pump) invokes the
//! fixed method set of [`Scheduler`], one callback at a time. Outbound: the
//! scheduler issues launch/decline/acknowledge requests through a
//! [`SchedulerDriver`].

use serde::{Deserialize, Serialize};

use crate::core::{SchedulerError, TaskOutcome, TaskRequest};
use crate::util::{ExecutorId, FrameworkId, NodeId, OfferId, Resources, TaskId};

/// Resources offered on one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Offer id, valid until accepted, declined or rescinded.
    pub id: OfferId,
    /// Node the resources live on.
    pub node_id: NodeId,
    /// Node hostname.
    #[serde(default)]
    pub hostname: String,
    /// Offered resources.
    pub resources: Resources,
}

/// Address of the currently elected manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterInfo {
    /// Manager instance id.
    pub id: String,
    /// Hostname.
    pub hostname: String,
    /// Port.
    pub port: u16,
}

/// Task state reported by a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Accepted by the node, not yet started.
    Staging,
    /// Executor is starting the task.
    Starting,
    /// Task is running.
    Running,
    /// Kill requested, not yet complete.
    Killing,
    /// Finished successfully.
    Finished,
    /// Failed.
    Failed,
    /// Killed.
    Killed,
    /// Invalid task description.
    Error,
    /// Lost (node or executor gone).
    Lost,
    /// Dropped before launch.
    Dropped,
    /// Node permanently gone.
    Gone,
    /// Node unreachable.
    Unreachable,
    /// Manager has no knowledge of the task.
    Unknown,
}

impl StatusKind {
    /// Terminal outcome for this status, `None` while the task is still alive.
    pub const fn outcome(self) -> Option<TaskOutcome> {
        match self {
            Self::Staging | Self::Starting | Self::Running | Self::Killing => None,
            Self::Finished => Some(TaskOutcome::Finished),
            Self::Failed | Self::Killed | Self::Error => Some(TaskOutcome::Failed),
            Self::Lost | Self::Dropped | Self::Gone | Self::Unreachable | Self::Unknown => {
                Some(TaskOutcome::Lost)
            }
        }
    }
}

/// A task status update delivered by the manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusUpdate {
    /// Task the update is about.
    pub task_id: TaskId,
    /// Reported state.
    pub state: StatusKind,
    /// Node that produced the update, when known.
    #[serde(default)]
    pub node_id: Option<NodeId>,
    /// Executor that produced the update, when known.
    #[serde(default)]
    pub executor_id: Option<ExecutorId>,
    /// Human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
    /// Acknowledgement id; present when the manager expects an explicit ack.
    #[serde(default)]
    pub ack_id: Option<String>,
}

impl TaskStatusUpdate {
    /// Minimal update with no node, executor, message or ack id.
    pub fn new(task_id: impl Into<TaskId>, state: StatusKind) -> Self {
        Self {
            task_id: task_id.into(),
            state,
            node_id: None,
            executor_id: None,
            message: None,
            ack_id: None,
        }
    }

    /// Builder-style node setter.
    #[must_use]
    pub fn on_node(mut self, node_id: impl Into<NodeId>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    /// Builder-style acknowledgement id setter.
    #[must_use]
    pub fn with_ack(mut self, ack_id: impl Into<String>) -> Self {
        self.ack_id = Some(ack_id.into());
        self
    }

    /// Builder-style message setter.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Offer filters attached to a launch or decline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    /// Seconds the manager should wait before re-offering the declined
    /// resources; `None` leaves the manager's default.
    pub refuse_seconds: Option<f64>,
}

impl Filters {
    /// Suppress re-offers for `seconds`.
    pub const fn refuse_for(seconds: f64) -> Self {
        Self {
            refuse_seconds: Some(seconds),
        }
    }
}

/// Outbound verbs the scheduler needs from the manager driver.
pub trait SchedulerDriver: Send + Sync {
    /// Launch `tasks` on the resources of `offer_id`; unused resources are
    /// declined according to `filters`.
    fn launch(
        &self,
        offer_id: &OfferId,
        tasks: &[TaskRequest],
        filters: &Filters,
    ) -> Result<(), SchedulerError>;

    /// Decline the whole offer.
    fn decline(&self, offer_id: &OfferId, filters: &Filters) -> Result<(), SchedulerError>;

    /// Acknowledge a status update (explicit acknowledgement mode only).
    fn acknowledge(&self, update: &TaskStatusUpdate) -> Result<(), SchedulerError>;
}

/// Receiver for best-effort executor messages.
pub trait MessageHandler: Send + Sync {
    /// Handle one message; must not block for long.
    fn handle(&self, executor_id: &ExecutorId, node_id: &NodeId, data: &[u8]);
}

/// The callback protocol. The manager never runs two callbacks of one
/// scheduler concurrently.
pub trait Scheduler: Send + Sync {
    /// First registration with a manager.
    fn on_registered(
        &self,
        framework_id: FrameworkId,
        master: MasterInfo,
    ) -> Result<(), SchedulerError>;

    /// Registration with a newly elected manager.
    fn on_reregistered(&self, master: MasterInfo) -> Result<(), SchedulerError>;

    /// Connection to the manager lost.
    fn on_disconnected(&self) -> Result<(), SchedulerError>;

    /// New resource offers, one node each.
    fn on_offers(&self, offers: Vec<Offer>) -> Result<(), SchedulerError>;

    /// A previously delivered offer is no longer valid.
    fn on_offer_rescinded(&self, offer_id: &OfferId) -> Result<(), SchedulerError>;

    /// Task status changed.
    fn on_status(&self, update: TaskStatusUpdate) -> Result<(), SchedulerError>;

    /// Executor sent a framework message.
    fn on_message(
        &self,
        executor_id: &ExecutorId,
        node_id: &NodeId,
        data: &[u8],
    ) -> Result<(), SchedulerError>;

    /// A node became unreachable.
    fn on_node_lost(&self, node_id: &NodeId) -> Result<(), SchedulerError>;

    /// An executor exited with `status`.
    fn on_executor_lost(
        &self,
        executor_id: &ExecutorId,
        node_id: &NodeId,
        status: i32,
    ) -> Result<(), SchedulerError>;

    /// Unrecoverable manager error; the connection is already torn down.
    fn on_error(&self, message: &str) -> Result<(), SchedulerError>;
}

/// One callback, as a value that can travel over a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerEvent {
    /// See [`Scheduler::on_registered`].
    Registered {
        /// Assigned framework id.
        framework_id: FrameworkId,
        /// Manager address.
        master: MasterInfo,
    },
    /// See [`Scheduler::on_reregistered`].
    Reregistered {
        /// Manager address.
        master: MasterInfo,
    },
    /// See [`Scheduler::on_disconnected`].
    Disconnected,
    /// See [`Scheduler::on_offers`].
    Offers {
        /// Offers in delivery order.
        offers: Vec<Offer>,
    },
    /// See [`Scheduler::on_offer_rescinded`].
    OfferRescinded {
        /// Rescinded offer.
        offer_id: OfferId,
    },
    /// See [`Scheduler::on_status`].
    Status {
        /// The update.
        update: TaskStatusUpdate,
    },
    /// See [`Scheduler::on_message`].
    Message {
        /// Sending executor.
        executor_id: ExecutorId,
        /// Node of the executor.
        node_id: NodeId,
        /// Opaque bytes.
        data: Vec<u8>,
    },
    /// See [`Scheduler::on_node_lost`].
    NodeLost {
        /// Lost node.
        node_id: NodeId,
    },
    /// See [`Scheduler::on_executor_lost`].
    ExecutorLost {
        /// Lost executor.
        executor_id: ExecutorId,
        /// Node of the executor.
        node_id: NodeId,
        /// Exit status.
        status: i32,
    },
    /// See [`Scheduler::on_error`].
    Error {
        /// Manager-provided description.
        message: String,
    },
}

impl SchedulerEvent {
    /// Short name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "registered",
            Self::Reregistered { .. } => "reregistered",
            Self::Disconnected => "disconnected",
            Self::Offers { .. } => "offers",
            Self::OfferRescinded { .. } => "offer_rescinded",
            Self::Status { .. } => "status",
            Self::Message { .. } => "message",
            Self::NodeLost { .. } => "node_lost",
            Self::ExecutorLost { .. } => "executor_lost",
            Self::Error { .. } => "error",
        }
    }

    /// Invoke the matching callback on `scheduler`.
    pub fn dispatch<S: Scheduler + ?Sized>(self, scheduler: &S) -> Result<(), SchedulerError> {
        match self {
            Self::Registered {
                framework_id,
                master,
            } => scheduler.on_registered(framework_id, master),
            Self::Reregistered { master } => scheduler.on_reregistered(master),
            Self::Disconnected => scheduler.on_disconnected(),
            Self::Offers { offers } => scheduler.on_offers(offers),
            Self::OfferRescinded { offer_id } => scheduler.on_offer_rescinded(&offer_id),
            Self::Status { update } => scheduler.on_status(update),
            Self::Message {
                executor_id,
                node_id,
                data,
            } => scheduler.on_message(&executor_id, &node_id, &data),
            Self::NodeLost { node_id } => scheduler.on_node_lost(&node_id),
            Self::ExecutorLost {
                executor_id,
                node_id,
                status,
            } => scheduler.on_executor_lost(&executor_id, &node_id, status),
            Self::Error { message } => scheduler.on_error(&message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_outcomes() {
        assert_eq!(StatusKind::Running.outcome(), None);
        assert_eq!(StatusKind::Staging.outcome(), None);
        assert_eq!(StatusKind::Finished.outcome(), Some(TaskOutcome::Finished));
        assert_eq!(StatusKind::Killed.outcome(), Some(TaskOutcome::Failed));
        assert_eq!(StatusKind::Error.outcome(), Some(TaskOutcome::Failed));
        assert_eq!(StatusKind::Unreachable.outcome(), Some(TaskOutcome::Lost));
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = SchedulerEvent::NodeLost {
            node_id: NodeId::from("n1"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "node_lost");
        assert_eq!(json["node_id"], "n1");
        assert_eq!(event.name(), "node_lost");
    }

    #[test]
    fn test_status_builder() {
        let update = TaskStatusUpdate::new("t1", StatusKind::Lost)
            .on_node("n1")
            .with_ack("ack-1")
            .with_message("agent removed");
        assert_eq!(update.node_id.unwrap().as_str(), "n1");
        assert_eq!(update.ack_id.as_deref(), Some("ack-1"));
        assert_eq!(update.message.as_deref(), Some("agent removed"));
    }
}
