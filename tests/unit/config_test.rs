//! Tests for configuration validation

use offer_scheduler::config::{ResidualPolicy, SchedulerConfig, TaskTemplate};
use offer_scheduler::core::ContainerKind;

#[test]
fn test_scheduler_config_defaults() {
    let cfg = SchedulerConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.residual_policy, ResidualPolicy::Decline);
    assert!((cfg.decline_refuse_secs - 5.0).abs() < f64::EPSILON);
    assert!((cfg.residual_refuse_secs - 1.0).abs() < f64::EPSILON);
    assert!(!cfg.explicit_acknowledgements);
    assert_eq!(cfg.registration_timeout_secs, 30);
}

#[test]
fn test_scheduler_config_invalid_values() {
    let empty_name = SchedulerConfig {
        framework_name: "  ".into(),
        ..SchedulerConfig::default()
    };
    assert!(empty_name.validate().is_err());

    let nan = SchedulerConfig {
        residual_refuse_secs: f64::NAN,
        ..SchedulerConfig::default()
    };
    assert!(nan.validate().is_err());

    let no_timeout = SchedulerConfig {
        registration_timeout_secs: 0,
        ..SchedulerConfig::default()
    };
    assert!(no_timeout.validate().is_err());
}

#[test]
fn test_scheduler_config_json() {
    let cfg = SchedulerConfig::from_json_str(
        r#"{"framework_name": "etl", "decline_refuse_secs": 30.0, "registration_timeout_secs": 5}"#,
    )
    .unwrap();
    assert_eq!(cfg.framework_name, "etl");
    assert_eq!(cfg.registration_timeout_secs, 5);

    assert!(SchedulerConfig::from_json_str("{not json").is_err());
    assert!(SchedulerConfig::from_json_str(r#"{"residual_policy": "keep"}"#).is_err());
}

#[test]
fn test_scheduler_config_from_env() {
    std::env::set_var("OFFER_SCHEDULER_FRAMEWORK_NAME", "env-fw");
    std::env::set_var("OFFER_SCHEDULER_RESIDUAL_POLICY", "Release");
    std::env::set_var("OFFER_SCHEDULER_EXPLICIT_ACKS", "true");

    let cfg = SchedulerConfig::from_env().unwrap();

    std::env::remove_var("OFFER_SCHEDULER_FRAMEWORK_NAME");
    std::env::remove_var("OFFER_SCHEDULER_RESIDUAL_POLICY");
    std::env::remove_var("OFFER_SCHEDULER_EXPLICIT_ACKS");

    assert_eq!(cfg.framework_name, "env-fw");
    assert_eq!(cfg.residual_policy, ResidualPolicy::Release);
    assert!(cfg.explicit_acknowledgements);
}

#[test]
fn test_task_template_json() {
    let template = TaskTemplate::from_json_str(
        r#"{
            "executor": {"executor_id": "exec", "name": "worker", "command": {"value": "./run", "uris": ["http://pkg/w.tgz"]}},
            "resources_per_task": {"cpus": {"scalar": 1.0}, "mem": {"scalar": 512.0}},
            "container": {"kind": "docker", "image": "worker:1.2", "network": "host"}
        }"#,
    )
    .unwrap();
    assert_eq!(template.executor.command.uris.len(), 1);
    assert!((template.resources_per_task.mem() - 512.0).abs() < f64::EPSILON);
    assert_eq!(template.container.kind, ContainerKind::Docker);
}

#[test]
fn test_task_template_requires_executor_id() {
    let err = TaskTemplate::from_json_str(
        r#"{
            "executor": {"executor_id": "", "name": "w", "command": {"value": "", "uris": []}},
            "resources_per_task": {"cpus": {"scalar": 1.0}}
        }"#,
    )
    .unwrap_err();
    assert!(err.contains("executor_id"));
}
