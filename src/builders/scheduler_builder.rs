//! Builders to construct a scheduler from configuration.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::config::{SchedulerConfig, TaskTemplate};
use crate::core::{AppResult, SchedulerCore, SchedulerDriver, SchedulerError};

/// Validate `cfg` and `template` and build a first-fit scheduler around `driver`.
pub fn build_scheduler<D>(
    cfg: &SchedulerConfig,
    template: TaskTemplate,
    driver: D,
) -> Result<SchedulerCore<D>, SchedulerError>
where
    D: SchedulerDriver,
{
    cfg.validate().map_err(SchedulerError::Config)?;
    template
        .validate()
        .map_err(|e| SchedulerError::Config(format!("task template: {e}")))?;

    tracing::debug!(
        framework = %cfg.framework_name,
        executor = %template.executor.executor_id,
        resources = %template.resources_per_task,
        "building scheduler"
    );
    Ok(SchedulerCore::new(cfg.clone(), Arc::new(template), driver))
}

/// Load the scheduler config and task template from JSON files and build.
pub fn load_and_build<D>(
    config_path: impl AsRef<Path>,
    template_path: impl AsRef<Path>,
    driver: D,
) -> AppResult<SchedulerCore<D>>
where
    D: SchedulerDriver,
{
    let cfg = SchedulerConfig::load_from_file(config_path)?;
    let template_path = template_path.as_ref();
    let raw = std::fs::read_to_string(template_path)
        .with_context(|| format!("reading task template {}", template_path.display()))?;
    let template = TaskTemplate::from_json_str(&raw)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("loading task template {}", template_path.display()))?;
    Ok(build_scheduler(&cfg, template, driver)?)
}
