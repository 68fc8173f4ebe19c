//! Tests for builder modules

use std::io::Write;

use offer_scheduler::builders::{build_scheduler, load_and_build};
use offer_scheduler::config::{SchedulerConfig, TaskTemplate};
use offer_scheduler::core::{CommandInfo, ContainerInfo, ExecutorInfo, SchedulerError};
use offer_scheduler::infra::InMemoryDriver;
use offer_scheduler::util::{ExecutorId, Resources, CPUS};

fn template() -> TaskTemplate {
    TaskTemplate {
        executor: ExecutorInfo {
            executor_id: ExecutorId::from("exec"),
            name: "worker".into(),
            command: CommandInfo::default(),
        },
        resources_per_task: Resources::new().with_scalar(CPUS, 1.0),
        container: ContainerInfo::default(),
    }
}

#[test]
fn test_build_scheduler_defaults() {
    let scheduler =
        build_scheduler(&SchedulerConfig::default(), template(), InMemoryDriver::new()).unwrap();
    assert_eq!(scheduler.config().framework_name, "offer-scheduler");
    assert_eq!(scheduler.template().executor.name, "worker");
}

#[test]
fn test_build_scheduler_rejects_bad_config() {
    let cfg = SchedulerConfig {
        decline_refuse_secs: -1.0,
        ..SchedulerConfig::default()
    };
    let err = build_scheduler(&cfg, template(), InMemoryDriver::new()).err().unwrap();
    assert!(matches!(err, SchedulerError::Config(_)));
}

#[test]
fn test_build_scheduler_rejects_empty_template() {
    let mut bad = template();
    bad.resources_per_task = Resources::new();
    let err = build_scheduler(&SchedulerConfig::default(), bad, InMemoryDriver::new())
        .err()
        .unwrap();
    assert!(err.to_string().contains("task template"));
}

#[test]
fn test_load_and_build_from_files() {
    let dir = std::env::temp_dir().join(format!("offer-scheduler-build-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let cfg_path = dir.join("scheduler.json");
    let template_path = dir.join("template.json");

    std::fs::File::create(&cfg_path)
        .unwrap()
        .write_all(br#"{"framework_name": "batch", "explicit_acknowledgements": true}"#)
        .unwrap();
    std::fs::File::create(&template_path)
        .unwrap()
        .write_all(
            br#"{
                "executor": {"executor_id": "exec", "name": "w", "command": {"value": "./w", "uris": []}},
                "resources_per_task": {"cpus": {"scalar": 0.5}, "ports": {"ranges": [{"begin": 31000, "end": 31000}]}}
            }"#,
        )
        .unwrap();

    let scheduler = load_and_build(&cfg_path, &template_path, InMemoryDriver::new()).unwrap();
    assert_eq!(scheduler.config().framework_name, "batch");
    assert!(scheduler.config().explicit_acknowledgements);
    assert!((scheduler.template().resources_per_task.cpus() - 0.5).abs() < f64::EPSILON);

    let missing = load_and_build(dir.join("nope.json"), &template_path, InMemoryDriver::new());
    assert!(missing.is_err());
    std::fs::remove_dir_all(&dir).unwrap();
}
