//! Scheduler and task-template configuration structures.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, ContainerInfo, ExecutorInfo};
use crate::util::Resources;

/// What happens to the unused part of an offer that received tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualPolicy {
    /// Decline the residual with `residual_refuse_secs` of re-offer suppression.
    #[default]
    Decline,
    /// Hand the residual back with the manager's default filter.
    Release,
}

/// Root scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Framework name used in logs and audit events.
    pub framework_name: String,
    /// Re-offer suppression for offers that matched nothing (seconds).
    pub decline_refuse_secs: f64,
    /// Handling of the unused part of partially matched offers.
    pub residual_policy: ResidualPolicy,
    /// Re-offer suppression for residuals under [`ResidualPolicy::Decline`] (seconds).
    pub residual_refuse_secs: f64,
    /// Send explicit acknowledgements for status updates that carry an ack id.
    pub explicit_acknowledgements: bool,
    /// Default wait for the first registration (seconds).
    pub registration_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            framework_name: "offer-scheduler".into(),
            decline_refuse_secs: 5.0,
            residual_policy: ResidualPolicy::Decline,
            residual_refuse_secs: 1.0,
            explicit_acknowledgements: false,
            registration_timeout_secs: 30,
        }
    }
}

impl SchedulerConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.framework_name.trim().is_empty() {
            return Err("framework_name must not be empty".into());
        }
        if !self.decline_refuse_secs.is_finite() || self.decline_refuse_secs < 0.0 {
            return Err("decline_refuse_secs must be a non-negative number".into());
        }
        if !self.residual_refuse_secs.is_finite() || self.residual_refuse_secs < 0.0 {
            return Err("residual_refuse_secs must be a non-negative number".into());
        }
        if self.registration_timeout_secs == 0 {
            return Err("registration_timeout_secs must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON configuration file.
    pub fn load_from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scheduler config {}", path.display()))?;
        Self::from_json_str(&raw)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("loading scheduler config {}", path.display()))
    }

    /// Defaults overridden by `OFFER_SCHEDULER_*` environment variables,
    /// after loading a `.env` file if one is present.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();

        if let Ok(name) = std::env::var("OFFER_SCHEDULER_FRAMEWORK_NAME") {
            cfg.framework_name = name;
        }
        if let Some(v) = env_parse("OFFER_SCHEDULER_DECLINE_REFUSE_SECS")? {
            cfg.decline_refuse_secs = v;
        }
        if let Some(v) = env_parse("OFFER_SCHEDULER_RESIDUAL_REFUSE_SECS")? {
            cfg.residual_refuse_secs = v;
        }
        if let Ok(policy) = std::env::var("OFFER_SCHEDULER_RESIDUAL_POLICY") {
            cfg.residual_policy = match policy.to_ascii_lowercase().as_str() {
                "decline" => ResidualPolicy::Decline,
                "release" => ResidualPolicy::Release,
                other => return Err(format!("unknown residual policy `{other}`")),
            };
        }
        if let Some(v) = env_parse("OFFER_SCHEDULER_EXPLICIT_ACKS")? {
            cfg.explicit_acknowledgements = v;
        }
        if let Some(v) = env_parse("OFFER_SCHEDULER_REGISTRATION_TIMEOUT_SECS")? {
            cfg.registration_timeout_secs = v;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| format!("{key}: {e}")),
        Err(_) => Ok(None),
    }
}

/// Descriptors replicated into every task a scheduler launches. Immutable
/// for the scheduler's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// Executor that runs the tasks.
    pub executor: ExecutorInfo,
    /// Resources each task needs.
    pub resources_per_task: Resources,
    /// Container the tasks run in.
    #[serde(default)]
    pub container: ContainerInfo,
}

impl TaskTemplate {
    /// Validate template values.
    pub fn validate(&self) -> Result<(), String> {
        if self.executor.executor_id.as_str().trim().is_empty() {
            return Err("executor_id must not be empty".into());
        }
        if self.resources_per_task.is_empty() {
            return Err("resources_per_task must request at least one resource".into());
        }
        Ok(())
    }

    /// Parse a task template from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let template: Self =
            serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        template.validate()?;
        Ok(template)
    }
}
