//! Tests for error types

use offer_scheduler::core::{SchedulerError, TaskState};
use offer_scheduler::util::TaskId;

#[test]
fn test_invalid_transition_error() {
    let err = SchedulerError::InvalidTransition {
        task_id: TaskId::from("job-0"),
        from: TaskState::Running,
        action: "promote",
    };
    assert_eq!(
        format!("{err}"),
        "invalid transition for task job-0: cannot promote from Running"
    );
}

#[test]
fn test_unknown_and_duplicate_task_errors() {
    assert_eq!(
        SchedulerError::UnknownTask(TaskId::from("x")).to_string(),
        "unknown task: x"
    );
    assert_eq!(
        SchedulerError::DuplicateTask(TaskId::from("x")).to_string(),
        "duplicate task: x"
    );
}

#[test]
fn test_config_error() {
    let err = SchedulerError::Config("framework_name must not be empty".to_string());
    assert_eq!(format!("{err}"), "config invalid: framework_name must not be empty");
}

#[test]
fn test_only_fatal_is_fatal() {
    assert!(SchedulerError::Fatal("gone".into()).is_fatal());
    assert!(!SchedulerError::RegistrationTimeout.is_fatal());
    assert!(!SchedulerError::PumpClosed.is_fatal());
    assert!(!SchedulerError::Driver("refused".into()).is_fatal());
}

#[test]
fn test_converts_into_anyhow() {
    fn run() -> offer_scheduler::core::AppResult<()> {
        Err(SchedulerError::RegistrationTimeout)?;
        Ok(())
    }
    assert_eq!(run().unwrap_err().to_string(), "registration timed out");
}
