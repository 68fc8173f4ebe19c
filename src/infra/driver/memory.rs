//! In-memory driver that records outbound requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::{Filters, SchedulerDriver, SchedulerError, TaskRequest, TaskStatusUpdate};
use crate::util::{OfferId, TaskId};

/// One recorded outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    /// Tasks launched on an offer.
    Launch {
        /// Offer consumed.
        offer_id: OfferId,
        /// Launched tasks, in launch order.
        task_ids: Vec<TaskId>,
        /// Filters for the unused part of the offer.
        filters: Filters,
    },
    /// Offer declined.
    Decline {
        /// Offer declined.
        offer_id: OfferId,
        /// Re-offer suppression.
        filters: Filters,
    },
    /// Status update acknowledged.
    Acknowledge {
        /// Task the update was about.
        task_id: TaskId,
        /// Acknowledgement id.
        ack_id: String,
    },
}

/// Driver for development and testing: records every call instead of
/// talking to a manager. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDriver {
    calls: Arc<Mutex<Vec<DriverCall>>>,
    reject_launches: Arc<AtomicBool>,
}

impl InMemoryDriver {
    /// Create a driver that accepts every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent launches fail with [`SchedulerError::Driver`].
    pub fn reject_launches(&self, reject: bool) {
        self.reject_launches.store(reject, Ordering::Release);
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().clone()
    }

    /// Recorded launches as `(offer, tasks)` pairs.
    pub fn launches(&self) -> Vec<(OfferId, Vec<TaskId>)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                DriverCall::Launch {
                    offer_id, task_ids, ..
                } => Some((offer_id.clone(), task_ids.clone())),
                _ => None,
            })
            .collect()
    }

    /// Recorded declines as `(offer, filters)` pairs.
    pub fn declines(&self) -> Vec<(OfferId, Filters)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                DriverCall::Decline { offer_id, filters } => Some((offer_id.clone(), *filters)),
                _ => None,
            })
            .collect()
    }

    /// Recorded acknowledgement ids.
    pub fn acknowledgements(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                DriverCall::Acknowledge { ack_id, .. } => Some(ack_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl SchedulerDriver for InMemoryDriver {
    fn launch(
        &self,
        offer_id: &OfferId,
        tasks: &[TaskRequest],
        filters: &Filters,
    ) -> Result<(), SchedulerError> {
        if self.reject_launches.load(Ordering::Acquire) {
            return Err(SchedulerError::Driver(format!("launch on {offer_id} rejected")));
        }
        for task in tasks {
            task.encode_payload()
                .map_err(|e| SchedulerError::Driver(format!("encoding task {}: {e}", task.id)))?;
        }
        self.calls.lock().push(DriverCall::Launch {
            offer_id: offer_id.clone(),
            task_ids: tasks.iter().map(|t| t.id.clone()).collect(),
            filters: *filters,
        });
        Ok(())
    }

    fn decline(&self, offer_id: &OfferId, filters: &Filters) -> Result<(), SchedulerError> {
        self.calls.lock().push(DriverCall::Decline {
            offer_id: offer_id.clone(),
            filters: *filters,
        });
        Ok(())
    }

    fn acknowledge(&self, update: &TaskStatusUpdate) -> Result<(), SchedulerError> {
        let ack_id = update
            .ack_id
            .clone()
            .ok_or_else(|| SchedulerError::Driver(format!("update for {} has no ack id", update.task_id)))?;
        self.calls.lock().push(DriverCall::Acknowledge {
            task_id: update.task_id.clone(),
            ack_id,
        });
        Ok(())
    }
}
