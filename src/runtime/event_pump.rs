//! Serialized callback delivery on a dedicated OS thread.
//!
//! Events are queued on a bounded crossbeam channel and dispatched one at a
//! time, so the scheduler never sees two callbacks at once. The loop ends when
//! every sender is dropped, or on the first callback that returns an error
//! (fatal manager error, matcher defect).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::core::{Scheduler, SchedulerError, SchedulerEvent};

/// Handle to a running event loop.
pub struct EventPump {
    tx: Mutex<Option<Sender<SchedulerEvent>>>,
    handle: Mutex<Option<JoinHandle<Result<(), SchedulerError>>>>,
    stopped: Arc<AtomicBool>,
}

impl EventPump {
    /// Start a loop feeding `scheduler`, with room for `capacity` queued events.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn start<S>(scheduler: Arc<S>, capacity: usize) -> std::io::Result<Self>
    where
        S: Scheduler + ?Sized + 'static,
    {
        let (tx, rx) = bounded(capacity.max(1));
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);

        let handle = thread::Builder::new()
            .name("offer-scheduler-events".into())
            .spawn(move || run_loop(&*scheduler, &rx, &flag))?;

        Ok(Self {
            tx: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            stopped,
        })
    }

    /// Queue one event, blocking while the channel is full.
    pub fn deliver(&self, event: SchedulerEvent) -> Result<(), SchedulerError> {
        let tx = self.sender().ok_or(SchedulerError::PumpClosed)?;
        tx.send(event).map_err(|_| SchedulerError::PumpClosed)
    }

    /// A sender for feeding events from other threads, `None` once the loop ended.
    pub fn sender(&self) -> Option<Sender<SchedulerEvent>> {
        if self.is_stopped() {
            return None;
        }
        self.tx.lock().clone()
    }

    /// True once the loop has exited.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Stop accepting events, drain what is queued and return the loop result.
    ///
    /// Outstanding [`sender`](Self::sender) clones keep the loop alive until
    /// they are dropped.
    pub fn shutdown(&self) -> Result<(), SchedulerError> {
        self.tx.lock().take();
        self.join()
    }

    /// Wait for the loop to exit on its own and return its result.
    pub fn join(&self) -> Result<(), SchedulerError> {
        let Some(handle) = self.handle.lock().take() else {
            return Ok(());
        };
        handle
            .join()
            .unwrap_or_else(|_| Err(SchedulerError::Fatal("event loop panicked".into())))
    }
}

impl Drop for EventPump {
    fn drop(&mut self) {
        // Closing the channel ends the loop; the thread is left detached.
        self.tx.lock().take();
    }
}

fn run_loop<S>(
    scheduler: &S,
    rx: &Receiver<SchedulerEvent>,
    stopped: &AtomicBool,
) -> Result<(), SchedulerError>
where
    S: Scheduler + ?Sized,
{
    debug!("event loop started");
    let result = rx.iter().try_for_each(|event| {
        let name = event.name();
        event.dispatch(scheduler).inspect_err(|e| {
            error!(event = name, error = %e, "callback failed; stopping event loop");
        })
    });
    stopped.store(true, Ordering::Release);
    if result.is_ok() {
        info!("event loop finished");
    }
    result
}
