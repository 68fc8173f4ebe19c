//! Waiting / running / finished task collections.
//!
//! Every tracked task id lives in exactly one collection. Waiting keeps
//! submission order (tasks reverted from a lost launch go to the front),
//! running holds `Launching`/`Running` records, finished holds terminal ones.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::core::{SchedulerError, TaskOutcome, TaskRecord, TaskRequest, TaskState};
use crate::util::{ExecutorId, NodeId, OfferId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Waiting,
    Running,
    Finished,
}

/// Cloned view of the three collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Waiting records, front first.
    pub waiting: Vec<TaskRecord>,
    /// Launching and running records.
    pub running: Vec<TaskRecord>,
    /// Terminal records.
    pub finished: Vec<TaskRecord>,
}

/// Task collections with lifecycle transitions.
#[derive(Debug, Default)]
pub struct TaskQueue {
    waiting: VecDeque<TaskRecord>,
    running: Vec<TaskRecord>,
    finished: Vec<TaskRecord>,
    index: HashMap<TaskId, Collection>,
}

impl TaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append requests as waiting records, keeping their order.
    ///
    /// The batch is rejected as a whole if any id is already tracked or
    /// repeated inside the batch.
    pub fn enqueue(&mut self, requests: Vec<TaskRequest>) -> Result<Vec<TaskId>, SchedulerError> {
        let mut seen = std::collections::HashSet::with_capacity(requests.len());
        for request in &requests {
            if self.index.contains_key(&request.id) || !seen.insert(&request.id) {
                return Err(SchedulerError::DuplicateTask(request.id.clone()));
            }
        }

        let mut ids = Vec::with_capacity(requests.len());
        for request in requests {
            ids.push(request.id.clone());
            self.index.insert(request.id.clone(), Collection::Waiting);
            self.waiting.push_back(TaskRecord::new(request));
        }
        Ok(ids)
    }

    /// Waiting records in matching order.
    pub fn peek_waiting(&self) -> impl Iterator<Item = &TaskRecord> {
        self.waiting.iter()
    }

    /// Waiting → Launching on `node` through `offer_id`.
    pub fn promote(
        &mut self,
        id: &TaskId,
        node: NodeId,
        offer_id: OfferId,
    ) -> Result<(), SchedulerError> {
        match self.locate(id)? {
            Collection::Waiting => {}
            _ => return Err(self.invalid(id, "promote")),
        }
        let pos = self
            .waiting
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| SchedulerError::UnknownTask(id.clone()))?;
        let mut record = self
            .waiting
            .remove(pos)
            .ok_or_else(|| SchedulerError::UnknownTask(id.clone()))?;

        record.state = TaskState::Launching;
        record.last_node = Some(node.clone());
        record.assigned_node = Some(node);
        record.offer_id = Some(offer_id);
        record.launch_attempts += 1;
        self.running.push(record);
        self.index.insert(id.clone(), Collection::Running);
        Ok(())
    }

    /// Launching/Running → Running. Returns `false` when it was already running.
    pub fn confirm_running(&mut self, id: &TaskId) -> Result<bool, SchedulerError> {
        if self.locate(id)? != Collection::Running {
            return Err(self.invalid(id, "confirm running"));
        }
        let record = self
            .running
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| SchedulerError::UnknownTask(id.clone()))?;
        let changed = record.state != TaskState::Running;
        record.state = TaskState::Running;
        Ok(changed)
    }

    /// Move a non-terminal task to the finished collection.
    ///
    /// Returns `false` without changing anything when the task is already
    /// terminal, so duplicate terminal updates are harmless.
    pub fn finish(&mut self, id: &TaskId, outcome: TaskOutcome) -> Result<bool, SchedulerError> {
        let mut record = match self.locate(id)? {
            Collection::Finished => return Ok(false),
            Collection::Waiting => {
                let pos = self
                    .waiting
                    .iter()
                    .position(|r| r.id() == id)
                    .ok_or_else(|| SchedulerError::UnknownTask(id.clone()))?;
                self.waiting
                    .remove(pos)
                    .ok_or_else(|| SchedulerError::UnknownTask(id.clone()))?
            }
            Collection::Running => self.take_running(id)?,
        };

        record.state = outcome.into();
        record.assigned_node = None;
        record.offer_id = None;
        self.finished.push(record);
        self.index.insert(id.clone(), Collection::Finished);
        Ok(true)
    }

    /// Launching/Running → Waiting at the front, clearing the assignment.
    pub fn revert_to_waiting(&mut self, id: &TaskId) -> Result<(), SchedulerError> {
        if self.locate(id)? != Collection::Running {
            return Err(self.invalid(id, "revert to waiting"));
        }
        let mut record = self.take_running(id)?;
        record.state = TaskState::Waiting;
        record.assigned_node = None;
        record.offer_id = None;
        self.waiting.push_front(record);
        self.index.insert(id.clone(), Collection::Waiting);
        Ok(())
    }

    /// Running-collection ids assigned to `node`, in launch order.
    pub fn by_node(&self, node: &NodeId) -> Vec<TaskId> {
        self.running_where(|r| r.assigned_node() == Some(node))
    }

    /// Running-collection ids matched through `offer_id`.
    pub fn by_offer(&self, offer_id: &OfferId) -> Vec<TaskId> {
        self.running_where(|r| r.offer_id() == Some(offer_id))
    }

    /// Running-collection ids using `executor` on `node`.
    pub fn by_executor(&self, executor: &ExecutorId, node: &NodeId) -> Vec<TaskId> {
        self.running_where(|r| {
            r.assigned_node() == Some(node) && &r.request.executor.executor_id == executor
        })
    }

    /// Remove a terminal record for good.
    pub fn purge(&mut self, id: &TaskId) -> Result<TaskRecord, SchedulerError> {
        if self.locate(id)? != Collection::Finished {
            return Err(self.invalid(id, "purge"));
        }
        let pos = self
            .finished
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| SchedulerError::UnknownTask(id.clone()))?;
        self.index.remove(id);
        Ok(self.finished.remove(pos))
    }

    /// Look up a record in any collection.
    pub fn get(&self, id: &TaskId) -> Option<&TaskRecord> {
        match self.index.get(id)? {
            Collection::Waiting => self.waiting.iter().find(|r| r.id() == id),
            Collection::Running => self.running.iter().find(|r| r.id() == id),
            Collection::Finished => self.finished.iter().find(|r| r.id() == id),
        }
    }

    pub(crate) fn get_mut(&mut self, id: &TaskId) -> Option<&mut TaskRecord> {
        match self.index.get(id)? {
            Collection::Waiting => self.waiting.iter_mut().find(|r| r.id() == id),
            Collection::Running => self.running.iter_mut().find(|r| r.id() == id),
            Collection::Finished => self.finished.iter_mut().find(|r| r.id() == id),
        }
    }

    /// Number of tracked tasks across all collections.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Waiting count.
    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    /// Launching + running count.
    pub fn running_len(&self) -> usize {
        self.running.len()
    }

    /// Terminal count.
    pub fn finished_len(&self) -> usize {
        self.finished.len()
    }

    /// Clone all three collections.
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            waiting: self.waiting.iter().cloned().collect(),
            running: self.running.clone(),
            finished: self.finished.clone(),
        }
    }

    fn locate(&self, id: &TaskId) -> Result<Collection, SchedulerError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| SchedulerError::UnknownTask(id.clone()))
    }

    fn take_running(&mut self, id: &TaskId) -> Result<TaskRecord, SchedulerError> {
        let pos = self
            .running
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| SchedulerError::UnknownTask(id.clone()))?;
        Ok(self.running.remove(pos))
    }

    fn running_where(&self, pred: impl Fn(&TaskRecord) -> bool) -> Vec<TaskId> {
        self.running
            .iter()
            .filter(|r| pred(r))
            .map(|r| r.id().clone())
            .collect()
    }

    fn invalid(&self, id: &TaskId, action: &'static str) -> SchedulerError {
        match self.get(id) {
            Some(record) => SchedulerError::InvalidTransition {
                task_id: id.clone(),
                from: record.state(),
                action,
            },
            None => SchedulerError::UnknownTask(id.clone()),
        }
    }
}
