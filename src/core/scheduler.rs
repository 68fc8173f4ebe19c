//! Scheduler core: callback handling, offer matching and the submission API.
//!
//! All mutable state (task collections, connection state, framework id,
//! fatal flag) sits behind one `parking_lot::Mutex`, held for the duration
//! of a single transition. Launch/decline/acknowledge requests are captured
//! while the lock is held and issued after it is released, so a slow driver
//! never blocks submissions or the next callback.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{ResidualPolicy, SchedulerConfig, TaskTemplate};
use crate::core::{
    build_audit_event, expand_submission, AuditEvent, AuditSink, Filters, FirstFitMatcher,
    MasterInfo, MatchPlan, MessageHandler, Offer, OfferMatcher, Scheduler, SchedulerDriver,
    SchedulerError, StatusKind, SubmitInfo, TaskQueue, TaskRecord, TaskRequest, TaskState,
    TaskStatusUpdate,
};
use crate::util::{ExecutorId, FrameworkId, NodeId, OfferId, TaskId};

/// Abstraction for spawning futures on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Connection to the resource manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Not registered (initial state, or after a disconnect).
    Disconnected,
    /// Registered with a manager; offers are accepted.
    Registered,
}

/// Read-only diagnostic view of the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    /// Connection state.
    pub connection: ConnectionState,
    /// Framework id, once registered.
    pub framework_id: Option<FrameworkId>,
    /// Current manager, once registered.
    pub master: Option<MasterInfo>,
    /// Fatal manager error, if one occurred.
    pub fatal: Option<String>,
    /// Waiting records, front first.
    pub waiting: Vec<TaskRecord>,
    /// Launching and running records.
    pub running: Vec<TaskRecord>,
    /// Terminal records.
    pub finished: Vec<TaskRecord>,
}

struct SchedulerState {
    queue: TaskQueue,
    connection: ConnectionState,
    framework_id: Option<FrameworkId>,
    master: Option<MasterInfo>,
    fatal: Option<String>,
}

/// Outbound request decided under the lock, issued after it is released.
enum Outbound {
    Launch {
        offer_id: OfferId,
        tasks: Vec<TaskRequest>,
        filters: Filters,
    },
    Decline {
        offer_id: OfferId,
        filters: Filters,
    },
}

/// The scheduler: implements [`Scheduler`] for the manager and exposes
/// submission and inspection to the application.
pub struct SchedulerCore<D, M = FirstFitMatcher> {
    config: SchedulerConfig,
    template: Arc<TaskTemplate>,
    driver: D,
    matcher: M,
    state: Mutex<SchedulerState>,
    registered: Condvar,
    audit: Option<Mutex<Box<dyn AuditSink>>>,
    messages: Option<Box<dyn MessageHandler>>,
}

impl<D: SchedulerDriver> SchedulerCore<D, FirstFitMatcher> {
    /// Create a scheduler using first-fit matching.
    pub fn new(config: SchedulerConfig, template: Arc<TaskTemplate>, driver: D) -> Self {
        Self::with_matcher(config, template, driver, FirstFitMatcher)
    }
}

impl<D, M> SchedulerCore<D, M>
where
    D: SchedulerDriver,
    M: OfferMatcher,
{
    /// Create a scheduler with a custom matcher.
    pub fn with_matcher(
        config: SchedulerConfig,
        template: Arc<TaskTemplate>,
        driver: D,
        matcher: M,
    ) -> Self {
        Self {
            config,
            template,
            driver,
            matcher,
            state: Mutex::new(SchedulerState {
                queue: TaskQueue::new(),
                connection: ConnectionState::Disconnected,
                framework_id: None,
                master: None,
                fatal: None,
            }),
            registered: Condvar::new(),
            audit: None,
            messages: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(Mutex::new(audit));
        self
    }

    /// Attach a handler for executor messages.
    #[must_use]
    pub fn with_message_handler(mut self, handler: Box<dyn MessageHandler>) -> Self {
        self.messages = Some(handler);
        self
    }

    /// Scheduler configuration.
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Task template replicated into every submission.
    pub fn template(&self) -> &TaskTemplate {
        &self.template
    }

    /// Outbound driver.
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Expand `info` into tasks and queue them as waiting.
    ///
    /// Never fails because of the manager's state; tasks simply wait until
    /// matching offers arrive.
    pub fn submit(&self, info: &SubmitInfo) -> Result<Vec<TaskId>, SchedulerError> {
        let requests = expand_submission(info, &self.template)?;
        let ids = {
            let mut state = self.state.lock();
            state.queue.enqueue(requests)?
        };

        info!(
            submission = %info.id,
            instances = info.instances,
            "submission queued"
        );
        self.flush_audit(
            ids.iter()
                .map(|id| self.audit_event(id, None, "submit", None))
                .collect(),
        );
        Ok(ids)
    }

    /// Block until the framework is registered, then return its id.
    ///
    /// Returns immediately while registered; after a disconnect it blocks
    /// again until the next registration.
    pub fn await_registration(&self, timeout: Duration) -> Result<FrameworkId, SchedulerError> {
        let mut state = self.state.lock();
        self.registered.wait_while_for(
            &mut state,
            |s| !Self::is_registered(s) && s.fatal.is_none(),
            timeout,
        );

        if let Some(reason) = &state.fatal {
            return Err(SchedulerError::Fatal(reason.clone()));
        }
        if Self::is_registered(&state) {
            if let Some(id) = &state.framework_id {
                return Ok(id.clone());
            }
        }
        Err(SchedulerError::RegistrationTimeout)
    }

    /// [`await_registration`](Self::await_registration) with the configured timeout.
    pub fn await_registration_default(&self) -> Result<FrameworkId, SchedulerError> {
        self.await_registration(Duration::from_secs(self.config.registration_timeout_secs))
    }

    /// Clone the current state for inspection.
    pub fn snapshot(&self) -> SchedulerSnapshot {
        let state = self.state.lock();
        let queues = state.queue.snapshot();
        SchedulerSnapshot {
            connection: state.connection,
            framework_id: state.framework_id.clone(),
            master: state.master.clone(),
            fatal: state.fatal.clone(),
            waiting: queues.waiting,
            running: queues.running,
            finished: queues.finished,
        }
    }

    /// Current connection state.
    pub fn connection(&self) -> ConnectionState {
        self.state.lock().connection
    }

    /// Framework id assigned at registration.
    pub fn framework_id(&self) -> Option<FrameworkId> {
        self.state.lock().framework_id.clone()
    }

    /// Fatal manager error, if one was reported.
    pub fn fatal_error(&self) -> Option<String> {
        self.state.lock().fatal.clone()
    }

    /// Clone one task record.
    pub fn task(&self, id: &TaskId) -> Option<TaskRecord> {
        self.state.lock().queue.get(id).cloned()
    }

    /// Remove a terminal task record; the scheduler never does this on its own.
    pub fn purge(&self, id: &TaskId) -> Result<TaskRecord, SchedulerError> {
        let record = self.state.lock().queue.purge(id)?;
        self.flush_audit(vec![self.audit_event(id, None, "purge", None)]);
        Ok(record)
    }

    fn is_registered(state: &SchedulerState) -> bool {
        state.connection == ConnectionState::Registered && state.framework_id.is_some()
    }

    fn audit_event(
        &self,
        task_id: &TaskId,
        node: Option<&NodeId>,
        action: &str,
        payload: Option<String>,
    ) -> AuditEvent {
        build_audit_event(
            task_id.to_string(),
            self.config.framework_name.clone(),
            node.map(ToString::to_string),
            action,
            payload,
        )
    }

    fn flush_audit(&self, events: Vec<AuditEvent>) {
        if events.is_empty() {
            return;
        }
        if let Some(audit) = &self.audit {
            let mut sink = audit.lock();
            for event in events {
                sink.record(event);
            }
        }
    }

    /// Every task in the plan must be waiting and claimed once; every
    /// assignment must name an offer from the batch.
    fn validate_plan(
        queue: &TaskQueue,
        plan: &MatchPlan,
        offers: &[Offer],
    ) -> Result<(), SchedulerError> {
        let offered: HashSet<&OfferId> = offers.iter().map(|o| &o.id).collect();
        let mut planned_offers = HashSet::new();
        let mut claimed = HashSet::new();

        for assignment in &plan.assignments {
            if !offered.contains(&assignment.offer_id) {
                return Err(SchedulerError::InvalidPlan(format!(
                    "offer {} is not part of the batch",
                    assignment.offer_id
                )));
            }
            if !planned_offers.insert(&assignment.offer_id) {
                return Err(SchedulerError::InvalidPlan(format!(
                    "offer {} planned twice",
                    assignment.offer_id
                )));
            }
            for id in &assignment.task_ids {
                let record = queue
                    .get(id)
                    .ok_or_else(|| SchedulerError::UnknownTask(id.clone()))?;
                if record.state() != TaskState::Waiting {
                    return Err(SchedulerError::InvalidTransition {
                        task_id: id.clone(),
                        from: record.state(),
                        action: "promote",
                    });
                }
                if !claimed.insert(id) {
                    return Err(SchedulerError::InvalidTransition {
                        task_id: id.clone(),
                        from: TaskState::Launching,
                        action: "promote",
                    });
                }
            }
        }
        Ok(())
    }

    fn residual_filters(&self, residual_is_empty: bool) -> Filters {
        if residual_is_empty {
            return Filters::default();
        }
        match self.config.residual_policy {
            ResidualPolicy::Decline => Filters::refuse_for(self.config.residual_refuse_secs),
            ResidualPolicy::Release => Filters::default(),
        }
    }

    fn decline_all(&self, offers: &[Offer]) -> Vec<Outbound> {
        offers
            .iter()
            .map(|o| Outbound::Decline {
                offer_id: o.id.clone(),
                filters: Filters::refuse_for(self.config.decline_refuse_secs),
            })
            .collect()
    }

    /// Promote matched tasks and turn the plan into outbound requests.
    fn apply_plan(
        &self,
        state: &mut MutexGuard<'_, SchedulerState>,
        plan: MatchPlan,
        offers: &[Offer],
        audit: &mut Vec<AuditEvent>,
    ) -> Result<Vec<Outbound>, SchedulerError> {
        let mut outbound = Vec::with_capacity(offers.len());
        let mut planned: HashSet<OfferId> = HashSet::new();

        for assignment in plan.assignments {
            planned.insert(assignment.offer_id.clone());
            if assignment.is_unused() {
                debug!(offer_id = %assignment.offer_id, "no waiting task fits offer; declining");
                outbound.push(Outbound::Decline {
                    offer_id: assignment.offer_id,
                    filters: Filters::refuse_for(self.config.decline_refuse_secs),
                });
                continue;
            }

            let mut tasks = Vec::with_capacity(assignment.task_ids.len());
            for id in &assignment.task_ids {
                state
                    .queue
                    .promote(id, assignment.node_id.clone(), assignment.offer_id.clone())?;
                if let Some(record) = state.queue.get(id) {
                    tasks.push(record.request.clone());
                }
                audit.push(self.audit_event(
                    id,
                    Some(&assignment.node_id),
                    "launch",
                    Some(assignment.offer_id.to_string()),
                ));
            }

            info!(
                offer_id = %assignment.offer_id,
                node_id = %assignment.node_id,
                tasks = tasks.len(),
                residual = %assignment.residual,
                "tasks matched to offer"
            );
            outbound.push(Outbound::Launch {
                offer_id: assignment.offer_id,
                tasks,
                filters: self.residual_filters(assignment.residual.is_empty()),
            });
        }

        // Offers the matcher left out of the plan are still ours to decline.
        for offer in offers.iter().filter(|o| !planned.contains(&o.id)) {
            outbound.push(Outbound::Decline {
                offer_id: offer.id.clone(),
                filters: Filters::refuse_for(self.config.decline_refuse_secs),
            });
        }
        Ok(outbound)
    }

    fn issue(&self, calls: Vec<Outbound>) {
        for call in calls {
            match call {
                Outbound::Launch {
                    offer_id,
                    tasks,
                    filters,
                } => match self.driver.launch(&offer_id, &tasks, &filters) {
                    Ok(()) => debug!(offer_id = %offer_id, tasks = tasks.len(), "launch requested"),
                    Err(e) => {
                        warn!(offer_id = %offer_id, error = %e, "launch request failed; reverting tasks");
                        self.revert_launching(&offer_id, "launch_failed");
                    }
                },
                Outbound::Decline { offer_id, filters } => {
                    if let Err(e) = self.driver.decline(&offer_id, &filters) {
                        warn!(offer_id = %offer_id, error = %e, "decline request failed");
                    }
                }
            }
        }
    }

    /// Revert tasks still launching through `offer_id`.
    fn revert_launching(&self, offer_id: &OfferId, reason: &str) -> usize {
        let mut audit = Vec::new();
        let reverted = {
            let mut state = self.state.lock();
            let ids: Vec<TaskId> = state
                .queue
                .by_offer(offer_id)
                .into_iter()
                .filter(|id| {
                    state
                        .queue
                        .get(id)
                        .is_some_and(|r| r.state() == TaskState::Launching)
                })
                .collect();
            self.revert_all(&mut state, &ids, reason, &mut audit)
        };
        self.flush_audit(audit);
        reverted
    }

    /// Revert `ids` (in running order) so that they land at the front of
    /// waiting in that same order.
    fn revert_all(
        &self,
        state: &mut MutexGuard<'_, SchedulerState>,
        ids: &[TaskId],
        reason: &str,
        audit: &mut Vec<AuditEvent>,
    ) -> usize {
        let mut reverted = 0;
        for id in ids.iter().rev() {
            let node = state.queue.get(id).and_then(|r| r.assigned_node().cloned());
            match state.queue.revert_to_waiting(id) {
                Ok(()) => {
                    reverted += 1;
                    info!(task_id = %id, reason, "task reverted to waiting");
                    audit.push(self.audit_event(id, node.as_ref(), "revert", Some(reason.to_string())));
                }
                Err(e) => error!(task_id = %id, error = %e, "failed to revert task"),
            }
        }
        reverted
    }

    fn apply_status(
        &self,
        state: &mut MutexGuard<'_, SchedulerState>,
        update: &TaskStatusUpdate,
        audit: &mut Vec<AuditEvent>,
    ) {
        let id = &update.task_id;
        let Some(record) = state.queue.get(id) else {
            warn!(task_id = %id, status = ?update.state, "status update for unknown task; ignoring");
            return;
        };
        let current = record.state();
        let assigned = record.assigned_node().cloned();

        if current.is_terminal() {
            debug!(task_id = %id, status = ?update.state, "task already terminal; ignoring update");
            return;
        }
        if current == TaskState::Waiting {
            warn!(task_id = %id, status = ?update.state, "stale update for waiting task; ignoring");
            return;
        }
        if let (Some(reported), Some(assigned)) = (&update.node_id, &assigned) {
            if reported != assigned {
                warn!(
                    task_id = %id,
                    reported = %reported,
                    assigned = %assigned,
                    "update from a previous placement; ignoring"
                );
                return;
            }
        }

        if let Some(record) = state.queue.get_mut(id) {
            record.last_status = Some(update.state);
            record.message.clone_from(&update.message);
        }

        match update.state.outcome() {
            None if update.state == StatusKind::Running => match state.queue.confirm_running(id) {
                Ok(true) => {
                    info!(task_id = %id, "task running");
                    audit.push(self.audit_event(id, assigned.as_ref(), "running", None));
                }
                Ok(false) => debug!(task_id = %id, "task already running"),
                Err(e) => error!(task_id = %id, error = %e, "failed to confirm task"),
            },
            None => debug!(task_id = %id, status = ?update.state, "task progressing"),
            Some(outcome) => match state.queue.finish(id, outcome) {
                Ok(true) => {
                    info!(task_id = %id, outcome = ?outcome, detail = ?update.message, "task terminal");
                    audit.push(self.audit_event(
                        id,
                        assigned.as_ref(),
                        "finish",
                        Some(format!("{outcome:?}")),
                    ));
                }
                Ok(false) => debug!(task_id = %id, "duplicate terminal update"),
                Err(e) => error!(task_id = %id, error = %e, "failed to finish task"),
            },
        }
    }

    fn revert_where(
        &self,
        select: impl FnOnce(&TaskQueue) -> Vec<TaskId>,
        reason: &str,
    ) -> usize {
        let mut audit = Vec::new();
        let reverted = {
            let mut state = self.state.lock();
            let ids = select(&state.queue);
            self.revert_all(&mut state, &ids, reason, &mut audit)
        };
        self.flush_audit(audit);
        reverted
    }
}

impl<D, M> Scheduler for SchedulerCore<D, M>
where
    D: SchedulerDriver,
    M: OfferMatcher,
{
    fn on_registered(
        &self,
        framework_id: FrameworkId,
        master: MasterInfo,
    ) -> Result<(), SchedulerError> {
        {
            let mut state = self.state.lock();
            if state.connection == ConnectionState::Registered {
                warn!(framework_id = %framework_id, "registered while already registered");
            }
            state.framework_id = Some(framework_id.clone());
            state.master = Some(master.clone());
            state.connection = ConnectionState::Registered;
        }
        self.registered.notify_all();
        info!(
            framework_id = %framework_id,
            master = %master.hostname,
            port = master.port,
            "framework registered"
        );
        Ok(())
    }

    fn on_reregistered(&self, master: MasterInfo) -> Result<(), SchedulerError> {
        {
            let mut state = self.state.lock();
            if state.framework_id.is_none() {
                warn!("re-registered before any registration");
            }
            state.master = Some(master.clone());
            state.connection = ConnectionState::Registered;
        }
        self.registered.notify_all();
        info!(master = %master.hostname, port = master.port, "framework re-registered");
        Ok(())
    }

    fn on_disconnected(&self) -> Result<(), SchedulerError> {
        self.state.lock().connection = ConnectionState::Disconnected;
        warn!("disconnected from manager; task state kept");
        Ok(())
    }

    fn on_offers(&self, mut offers: Vec<Offer>) -> Result<(), SchedulerError> {
        let mut seen = HashSet::with_capacity(offers.len());
        offers.retain(|o| {
            let first = seen.insert(o.id.clone());
            if !first {
                warn!(offer_id = %o.id, node_id = %o.node_id, "offer repeated in batch; dropping copy");
            }
            first
        });

        let mut audit = Vec::new();
        let outbound = {
            let mut state = self.state.lock();
            if let Some(reason) = &state.fatal {
                warn!(offers = offers.len(), reason = %reason, "offers after fatal error; ignoring");
                return Ok(());
            }
            if !Self::is_registered(&state) {
                warn!(offers = offers.len(), "offers while not registered; ignoring");
                return Ok(());
            }

            let plan = {
                let waiting: Vec<&TaskRequest> =
                    state.queue.peek_waiting().map(|r| &r.request).collect();
                self.matcher.plan(&waiting, &offers)
            };

            if let Err(e) = Self::validate_plan(&state.queue, &plan, &offers) {
                drop(state);
                error!(error = %e, "matcher produced an invalid plan; declining batch");
                self.issue(self.decline_all(&offers));
                return Err(e);
            }
            self.apply_plan(&mut state, plan, &offers, &mut audit)?
        };

        self.flush_audit(audit);
        self.issue(outbound);
        Ok(())
    }

    fn on_offer_rescinded(&self, offer_id: &OfferId) -> Result<(), SchedulerError> {
        let reverted = self.revert_launching(offer_id, "offer_rescinded");
        info!(offer_id = %offer_id, reverted, "offer rescinded");
        Ok(())
    }

    fn on_status(&self, update: TaskStatusUpdate) -> Result<(), SchedulerError> {
        let mut audit = Vec::new();
        {
            let mut state = self.state.lock();
            self.apply_status(&mut state, &update, &mut audit);
        }
        self.flush_audit(audit);

        if self.config.explicit_acknowledgements && update.ack_id.is_some() {
            if let Err(e) = self.driver.acknowledge(&update) {
                warn!(task_id = %update.task_id, error = %e, "acknowledgement failed");
            }
        }
        Ok(())
    }

    fn on_message(
        &self,
        executor_id: &ExecutorId,
        node_id: &NodeId,
        data: &[u8],
    ) -> Result<(), SchedulerError> {
        match &self.messages {
            Some(handler) => handler.handle(executor_id, node_id, data),
            None => debug!(
                executor_id = %executor_id,
                node_id = %node_id,
                bytes = data.len(),
                "framework message dropped; no handler"
            ),
        }
        Ok(())
    }

    fn on_node_lost(&self, node_id: &NodeId) -> Result<(), SchedulerError> {
        let reverted = self.revert_where(|q| q.by_node(node_id), "node_lost");
        warn!(node_id = %node_id, reverted, "node lost");
        Ok(())
    }

    fn on_executor_lost(
        &self,
        executor_id: &ExecutorId,
        node_id: &NodeId,
        status: i32,
    ) -> Result<(), SchedulerError> {
        let reverted = self.revert_where(|q| q.by_executor(executor_id, node_id), "executor_lost");
        warn!(
            executor_id = %executor_id,
            node_id = %node_id,
            status,
            reverted,
            "executor lost"
        );
        Ok(())
    }

    fn on_error(&self, message: &str) -> Result<(), SchedulerError> {
        {
            let mut state = self.state.lock();
            state.fatal = Some(message.to_string());
            state.connection = ConnectionState::Disconnected;
        }
        self.registered.notify_all();
        error!(reason = message, "fatal manager error");
        Err(SchedulerError::Fatal(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CommandInfo, ContainerInfo, ExecutorInfo};
    use crate::infra::{DriverCall, InMemoryDriver};
    use crate::util::{Resources, CPUS};

    fn core() -> SchedulerCore<InMemoryDriver> {
        let template = TaskTemplate {
            executor: ExecutorInfo {
                executor_id: ExecutorId::from("exec"),
                name: String::new(),
                command: CommandInfo::default(),
            },
            resources_per_task: Resources::new().with_scalar(CPUS, 1.0),
            container: ContainerInfo::default(),
        };
        SchedulerCore::new(
            SchedulerConfig::default(),
            Arc::new(template),
            InMemoryDriver::new(),
        )
    }

    fn offer(id: &str, cpus: f64) -> Offer {
        Offer {
            id: OfferId::from(id),
            node_id: NodeId::from("n1"),
            hostname: "n1.local".into(),
            resources: Resources::new().with_scalar(CPUS, cpus),
        }
    }

    fn submit(core: &SchedulerCore<InMemoryDriver>, n: u32) {
        core.submit(&SubmitInfo {
            instances: n,
            config_path: String::new(),
            id: "job".into(),
            package_path: String::new(),
        })
        .unwrap();
    }

    struct ClaimsEverything;

    impl OfferMatcher for ClaimsEverything {
        fn plan(&self, waiting: &[&TaskRequest], offers: &[Offer]) -> MatchPlan {
            MatchPlan {
                assignments: offers
                    .iter()
                    .map(|o| crate::core::OfferAssignment {
                        offer_id: o.id.clone(),
                        node_id: o.node_id.clone(),
                        task_ids: waiting.iter().map(|t| t.id.clone()).collect(),
                        residual: Resources::new(),
                    })
                    .collect(),
            }
        }
    }

    #[test]
    fn test_offers_ignored_until_registered() {
        let core = core();
        submit(&core, 1);
        core.on_offers(vec![offer("o1", 4.0)]).unwrap();
        assert!(core.driver().calls().is_empty());
        assert_eq!(core.snapshot().waiting.len(), 1);
    }

    #[test]
    fn test_invalid_plan_is_a_defect() {
        let template = core().template().clone();
        let core = SchedulerCore::with_matcher(
            SchedulerConfig::default(),
            Arc::new(template),
            InMemoryDriver::new(),
            ClaimsEverything,
        );
        core.on_registered("fw".into(), MasterInfo::default()).unwrap();
        core.submit(&SubmitInfo {
            instances: 1,
            config_path: String::new(),
            id: "job".into(),
            package_path: String::new(),
        })
        .unwrap();

        let err = core
            .on_offers(vec![offer("o1", 4.0), offer("o2", 4.0)])
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidTransition { action: "promote", .. }));
        // Nothing was promoted and every offer went back.
        assert_eq!(core.snapshot().waiting.len(), 1);
        let declines = core
            .driver()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, DriverCall::Decline { .. }))
            .count();
        assert_eq!(declines, 2);
    }

    #[test]
    fn test_repeated_offer_id_is_answered_once() {
        let core = core();
        core.on_registered("fw".into(), MasterInfo::default()).unwrap();
        submit(&core, 2);

        core.on_offers(vec![offer("o1", 1.0), offer("o1", 1.0)]).unwrap();
        let calls = core.driver().calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], DriverCall::Launch { task_ids, .. } if task_ids.len() == 1));
        assert_eq!(core.snapshot().waiting.len(), 1);
    }

    #[test]
    fn test_offers_ignored_without_framework_id() {
        let core = core();
        submit(&core, 1);
        core.on_reregistered(MasterInfo::default()).unwrap();
        assert_eq!(core.connection(), ConnectionState::Registered);

        core.on_offers(vec![offer("o1", 4.0)]).unwrap();
        assert!(core.driver().calls().is_empty());
        assert_eq!(core.snapshot().waiting.len(), 1);
    }

    #[test]
    fn test_residual_filter_follows_policy() {
        let core = core();
        assert_eq!(core.residual_filters(true), Filters::default());
        assert_eq!(core.residual_filters(false), Filters::refuse_for(1.0));
    }
}
