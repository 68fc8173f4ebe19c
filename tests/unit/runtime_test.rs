//! Tests for runtime adapters and API models

use std::sync::Arc;

use offer_scheduler::config::{SchedulerConfig, TaskTemplate};
use offer_scheduler::core::{
    CommandInfo, ConnectionState, ContainerInfo, ExecutorInfo, MasterInfo, Scheduler,
    SchedulerCore, SchedulerError, Spawn,
};
use offer_scheduler::infra::InMemoryDriver;
use offer_scheduler::runtime::api::{health, snapshot, submit_task, SubmitRequest};
use offer_scheduler::runtime::tokio_spawner::TokioSpawner;
use offer_scheduler::util::{ExecutorId, Resources, CPUS};

fn scheduler() -> SchedulerCore<InMemoryDriver> {
    let template = TaskTemplate {
        executor: ExecutorInfo {
            executor_id: ExecutorId::from("exec"),
            name: String::new(),
            command: CommandInfo::default(),
        },
        resources_per_task: Resources::new().with_scalar(CPUS, 1.0),
        container: ContainerInfo::default(),
    };
    SchedulerCore::new(SchedulerConfig::default(), Arc::new(template), InMemoryDriver::new())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_tokio_spawner_owned_runtime() {
    let spawner = TokioSpawner::with_worker_threads(1).unwrap();
    let (tx, rx) = std::sync::mpsc::channel();
    spawner.spawn(async move {
        tx.send("done").unwrap();
    });
    assert_eq!(rx.recv().unwrap(), "done");
}

#[test]
fn test_submit_task_and_snapshot() {
    let s = scheduler();
    let req: SubmitRequest =
        serde_json::from_str(r#"{"id": "job", "instances": 2, "config_path": "/etc/w.json"}"#)
            .unwrap();

    let resp = submit_task(&s, req).unwrap();
    assert_eq!(resp.id, "job");
    assert_eq!(resp.task_ids.len(), 2);

    let listing = snapshot(&s);
    assert_eq!(listing.waiting, 2);
    assert_eq!(listing.running, 0);
    assert_eq!(listing.tasks[0].request.payload.config_path, "/etc/w.json");

    let json = serde_json::to_value(&listing).unwrap();
    assert_eq!(json["connection"], "disconnected");
}

#[test]
fn test_submit_task_rejects_zero_instances() {
    let s = scheduler();
    let err = submit_task(
        &s,
        SubmitRequest {
            id: "job".into(),
            instances: 0,
            config_path: String::new(),
            package_path: String::new(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidSubmission(_)));
}

#[test]
fn test_health_follows_connection() {
    let s = scheduler();
    assert!(!health(&s).ok);

    s.on_registered("fw".into(), MasterInfo::default()).unwrap();
    let h = health(&s);
    assert!(h.ok);
    assert_eq!(h.connection, ConnectionState::Registered);

    let _ = s.on_error("removed");
    assert!(!health(&s).ok);
}
