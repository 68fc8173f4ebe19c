//! Runtime adapters (native thread, tokio) and API surface.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod async_pump;
#[cfg(not(target_arch = "wasm32"))]
pub mod event_pump;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_spawner;

pub use api::{health, snapshot, submit_task, Health, SnapshotResponse, SubmitRequest, SubmitResponse};
#[cfg(feature = "tokio-runtime")]
pub use async_pump::{spawn_async_pump, AsyncPump};
#[cfg(not(target_arch = "wasm32"))]
pub use event_pump::EventPump;
#[cfg(feature = "tokio-runtime")]
pub use tokio_spawner::TokioSpawner;
