//! In-memory inbox for executor messages.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::MessageHandler;
use crate::util::{now_ms, ExecutorId, NodeId};

/// A message an executor sent to the framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkMessage {
    /// Sending executor.
    pub executor_id: ExecutorId,
    /// Node the executor runs on.
    pub node_id: NodeId,
    /// Opaque bytes.
    pub data: Vec<u8>,
    /// Receive time in milliseconds since epoch.
    pub received_at_ms: u128,
}

/// Bounded inbox; clones share one buffer. The oldest message is dropped
/// once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct InMemoryInbox {
    messages: Arc<Mutex<Vec<FrameworkMessage>>>,
    capacity: usize,
}

impl InMemoryInbox {
    /// Create an inbox holding at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            capacity,
        }
    }

    /// Remove and return all buffered messages.
    pub fn drain(&self) -> Vec<FrameworkMessage> {
        std::mem::take(&mut *self.messages.lock())
    }

    /// Number of buffered messages.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// True when no message is buffered.
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl MessageHandler for InMemoryInbox {
    fn handle(&self, executor_id: &ExecutorId, node_id: &NodeId, data: &[u8]) {
        if self.capacity == 0 {
            return;
        }
        let mut messages = self.messages.lock();
        if messages.len() >= self.capacity {
            messages.remove(0);
        }
        messages.push(FrameworkMessage {
            executor_id: executor_id.clone(),
            node_id: node_id.clone(),
            data: data.to_vec(),
            received_at_ms: now_ms(),
        });
    }
}
