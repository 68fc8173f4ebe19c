//! Serialized callback delivery as a task on an async runtime.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::core::{Scheduler, SchedulerError, SchedulerEvent, Spawn};

/// Handle to an event loop running on a [`Spawn`] runtime.
pub struct AsyncPump {
    tx: mpsc::UnboundedSender<SchedulerEvent>,
    done: oneshot::Receiver<Result<(), SchedulerError>>,
}

impl AsyncPump {
    /// Queue one event.
    pub fn deliver(&self, event: SchedulerEvent) -> Result<(), SchedulerError> {
        self.tx.send(event).map_err(|_| SchedulerError::PumpClosed)
    }

    /// A sender for feeding events from elsewhere.
    pub fn sender(&self) -> mpsc::UnboundedSender<SchedulerEvent> {
        self.tx.clone()
    }

    /// True once the loop has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Close the channel, let queued events drain and return the loop result.
    pub async fn finish(self) -> Result<(), SchedulerError> {
        drop(self.tx);
        self.done.await.unwrap_or(Err(SchedulerError::PumpClosed))
    }
}

/// Spawn an event loop feeding `scheduler` on `spawner`.
pub fn spawn_async_pump<S, R>(scheduler: Arc<S>, spawner: &R) -> AsyncPump
where
    S: Scheduler + ?Sized + 'static,
    R: Spawn,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<SchedulerEvent>();
    let (done_tx, done) = oneshot::channel();

    spawner.spawn(async move {
        let mut result = Ok(());
        while let Some(event) = rx.recv().await {
            let name = event.name();
            if let Err(e) = event.dispatch(&*scheduler) {
                error!(event = name, error = %e, "callback failed; stopping async event loop");
                result = Err(e);
                break;
            }
        }
        rx.close();
        debug!(ok = result.is_ok(), "async event loop finished");
        let _ = done_tx.send(result);
    });

    AsyncPump { tx, done }
}
