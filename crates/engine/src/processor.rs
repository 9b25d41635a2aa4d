// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event processor: turns registered triggers into fired jobs.
//!
//! One instance per manager runs a single background task. Each cycle
//! scans persisted job events against status history and polls remote
//! jobs; data events are evaluated inline at INFO emission, not here. The
//! cycle period adapts: busy cycles reset it to the minimum, idle cycles
//! stretch it toward the maximum. Emitters can `wake()` the task,
//! rate-limited so status storms cannot thrash the scanner.
//!
//! Firing is at-most-once: the event row is deleted before dispatch, so a
//! wake racing the timer cannot double-fire, and a crash mid-dispatch
//! loses the firing rather than repeating it.

use crate::manager::LwfManager;
use crate::error::EngineError;
use lwf_core::{
    codec, EventPillar, JobContext, JobEvent, JobState, JobStatus, LogLevel, MetadataEvent,
    Metasheet, Midware, RemoteJobEvent, WorkflowEvent, WorkflowId,
};
use lwf_storage::query;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tracing::{info, warn};

/// Cadence knobs; defaults are the production values.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub min_interval: Duration,
    pub max_interval: Duration,
    pub step: Duration,
    /// Minimum spacing between wake-induced checks.
    pub wake_guard: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(300),
            step: Duration::from_secs(10),
            wake_guard: Duration::from_secs(30),
        }
    }
}

struct TimerState {
    interval: Duration,
    last_wake: Option<Instant>,
}

/// Singleton scheduler evaluating triggers against persisted history.
pub struct EventProcessor {
    mgr: Arc<LwfManager>,
    cfg: ProcessorConfig,
    state: Mutex<TimerState>,
    notify: Notify,
    stopped: AtomicBool,
}

impl EventProcessor {
    pub(crate) fn new(mgr: Arc<LwfManager>, cfg: ProcessorConfig) -> Arc<Self> {
        let interval = cfg.min_interval;
        Arc::new(Self {
            mgr,
            cfg,
            state: Mutex::new(TimerState {
                interval,
                last_wake: None,
            }),
            notify: Notify::new(),
            stopped: AtomicBool::new(false),
        })
    }

    /// Spawn the background scan loop on the current runtime.
    pub(crate) fn spawn(self: &Arc<Self>) {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run().await });
    }

    /// Current scan interval (stretches while idle).
    pub fn interval(&self) -> Duration {
        self.state.lock().interval
    }

    /// Stop the scan loop. In-flight dispatches are not awaited; persisted
    /// events are re-evaluated on the next start.
    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Hint that new status history exists: schedule a near-immediate scan
    /// and reset the cadence, unless a wake already happened recently.
    pub fn wake(&self) {
        {
            let mut state = self.state.lock();
            if let Some(last) = state.last_wake {
                if last.elapsed() < self.cfg.wake_guard {
                    return;
                }
            }
            state.last_wake = Some(Instant::now());
            state.interval = self.cfg.min_interval;
        }
        self.notify.notify_one();
    }

    async fn run(self: Arc<Self>) {
        info!("event processor started");
        loop {
            let interval = self.state.lock().interval;
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.notify.notified() => {}
            }
            if self.stopped.load(Ordering::SeqCst) {
                break;
            }
            let busy = self.check_cycle().await;
            let mut state = self.state.lock();
            if busy {
                state.interval = self.cfg.min_interval;
            } else if state.interval < self.cfg.max_interval {
                state.interval = (state.interval + self.cfg.step).min(self.cfg.max_interval);
            }
        }
        info!("event processor stopped");
    }

    /// One full scan: job events, then remote polls. Returns whether any
    /// trigger fired or any remote poll advanced.
    pub async fn check_cycle(&self) -> bool {
        let jobs = self.check_job_events().await;
        let remote = self.check_remote_events().await;
        jobs || remote
    }

    async fn check_job_events(&self) -> bool {
        let events = self.mgr.db().events(EventPillar::Job);
        if events.is_empty() {
            return false;
        }
        self.mgr
            .log(LogLevel::Info, "", "", &format!("job events: {}", events.len()))
            .await;
        let mut fired = false;
        for event in events {
            let WorkflowEvent::Job(trigger) = event else {
                continue;
            };
            if self.try_fire_job_event(&trigger).await {
                fired = true;
            }
        }
        fired
    }

    /// Evaluate one job trigger; fires and consumes it when satisfied.
    async fn try_fire_job_event(&self, trigger: &JobEvent) -> bool {
        let history = self.mgr.db().all_job_statuses(&trigger.rule_job_id);
        let satisfied = history.iter().any(|s| s.status() == trigger.rule_status);
        if !satisfied {
            return false;
        }
        // The freshest record carries the context the child inherits.
        let Some(latest) = self.mgr.db().job_status(&trigger.rule_job_id) else {
            self.mgr.log(
                LogLevel::Error,
                "",
                trigger.rule_job_id.as_str(),
                "satisfied trigger has no readable status",
            ).await;
            return false;
        };
        // Consume before dispatch; a concurrent scan that loses this
        // delete must not fire.
        match self.mgr.db().delete_event(trigger.event_id()).await {
            Ok(true) => {}
            Ok(false) => return false,
            Err(e) => {
                warn!(event = %trigger.event_id(), error = %e, "event delete failed");
                return false;
            }
        }
        let context = make_fire_context(trigger, latest.context(), &self.mgr);
        self.mgr.log(
            LogLevel::Info,
            context.workflow_id().as_str(),
            context.job_id().as_str(),
            &format!(
                "triggered job {} on site {}",
                context.job_id(),
                trigger.fire_site
            ),
        ).await;
        self.dispatch(trigger.fire_defn.clone(), trigger.fire_site.clone(), context);
        true
    }

    async fn check_remote_events(&self) -> bool {
        let events = self.mgr.db().events(EventPillar::Remote);
        if events.is_empty() {
            return false;
        }
        self.mgr.log(
            LogLevel::Info,
            "",
            "",
            &format!("remote events: {}", events.len()),
        ).await;
        let mut advanced = false;
        for event in events {
            let WorkflowEvent::Remote(tracker) = event else {
                continue;
            };
            match self.poll_remote(&tracker).await {
                Ok(()) => advanced = true,
                Err(e) => {
                    self.mgr.log(
                        LogLevel::Error,
                        "",
                        tracker.fire_job_id.as_str(),
                        &format!("remote poll failed: {e}"),
                    ).await;
                }
            }
        }
        advanced
    }

    async fn poll_remote(&self, tracker: &RemoteJobEvent) -> Result<(), EngineError> {
        let midware: Arc<dyn Midware> = self.mgr.clone() as Arc<dyn Midware>;
        match self
            .mgr
            .bridge()
            .poll_status(&tracker.fire_site, &tracker.fire_job_id, midware)
            .await
        {
            Ok(status) => {
                if status.is_terminal() {
                    self.unset_event_by_id(tracker.event_id()).await;
                }
                Ok(())
            }
            Err(EngineError::RemoteJobNotFound(_)) => {
                // Some sites purge completed jobs; treat as terminal.
                self.mgr.log(
                    LogLevel::Info,
                    "",
                    tracker.fire_job_id.as_str(),
                    &format!(
                        "remote job {} not found on {}, assuming terminal and removing tracker",
                        tracker.fire_job_id, tracker.fire_site
                    ),
                ).await;
                self.unset_event_by_id(tracker.event_id()).await;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Evaluate data triggers against a just-emitted INFO status. Called
    /// inline from the emit pipeline, never from the timer.
    pub async fn check_data_status_event(&self, status: &JobStatus) -> bool {
        let Some(props) = info_props(status) else {
            return false;
        };
        let mut fired = false;
        for event in self.mgr.db().events(EventPillar::Data) {
            let WorkflowEvent::Metadata(trigger) = event else {
                continue;
            };
            if !query::props_match(&props, &trigger.query_reg_exs) {
                continue;
            }
            match self.mgr.db().delete_event(trigger.event_id()).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(event = %trigger.event_id(), error = %e, "event delete failed");
                    continue;
                }
            }
            let context = make_data_fire_context(&trigger, status.context(), &self.mgr);
            self.mgr.log(
                LogLevel::Info,
                context.workflow_id().as_str(),
                context.job_id().as_str(),
                &format!(
                    "data triggered job {} on site {}",
                    context.job_id(),
                    trigger.fire_site
                ),
            ).await;
            self.dispatch(trigger.fire_defn.clone(), trigger.fire_site.clone(), context);
            fired = true;
        }
        fired
    }

    /// Fire asynchronously; the event is already consumed, so a dispatch
    /// failure is recorded against the pre-allocated job id instead of
    /// retried.
    fn dispatch(&self, defn: lwf_core::JobDefn, fire_site: String, context: JobContext) {
        let mgr = Arc::clone(&self.mgr);
        tokio::spawn(async move {
            let result = mgr.fire(&defn, &fire_site, &context).await;
            if let Err(e) = result {
                mgr.log(
                    LogLevel::Error,
                    context.workflow_id().as_str(),
                    context.job_id().as_str(),
                    &format!("dispatch failed: {e}"),
                ).await;
                mgr.emit_status_with(&context, JobState::Failed, None, Some(&e.to_string()), true)
                    .await;
            }
        });
    }

    /// Register a trigger: pre-allocate the future job, emit its READY
    /// status, and persist the event. Returns the pre-allocated job id.
    pub async fn set_event(&self, mut event: WorkflowEvent) -> Option<lwf_core::JobId> {
        match &mut event {
            WorkflowEvent::Job(trigger) => {
                let context = self.init_job_event_context(trigger).await;
                trigger.fire_job_id = Some(context.job_id().clone());
            }
            WorkflowEvent::Metadata(trigger) => {
                let context = self.init_metadata_event_context(trigger).await;
                trigger.fire_job_id = Some(context.job_id().clone());
            }
            WorkflowEvent::Remote(_) => {}
        }
        let fire_job_id = event.fire_job_id().cloned();
        if let Err(e) = self.mgr.db().put_event(&event).await {
            self.mgr.log(
                LogLevel::Error,
                "",
                "",
                &format!("set_event persist failed: {e}"),
            ).await;
            return None;
        }
        fire_job_id
    }

    /// Unregister a trigger by id.
    pub async fn unset_event_by_id(&self, event_id: &lwf_core::EventId) {
        if let Err(e) = self.mgr.db().delete_event(event_id).await {
            self.mgr.log(
                LogLevel::Error,
                "",
                "",
                &format!("unset_event failed: {e}"),
            ).await;
        }
    }

    /// The future job of a job trigger runs on the fire site, parented to
    /// the rule job, in the rule job's workflow (as far as it is known at
    /// registration time).
    async fn init_job_event_context(&self, trigger: &JobEvent) -> JobContext {
        let mut context = JobContext::with_id(self.mgr.generate_id());
        context.set_site_name(trigger.fire_site.clone());
        context.set_parent_job_id(trigger.rule_job_id.clone());
        context.set_workflow_id(self.workflow_of(&trigger.rule_job_id));
        self.mgr
            .emit_status_with(&context, JobState::Ready, None, None, true)
            .await;
        context
    }

    async fn init_metadata_event_context(&self, trigger: &MetadataEvent) -> JobContext {
        let mut context = JobContext::with_id(self.mgr.generate_id());
        context.set_site_name(trigger.fire_site.clone());
        if let Some(origin) = &trigger.context {
            context.set_workflow_id(origin.workflow_id().clone());
            context.set_parent_job_id(origin.job_id().clone());
        }
        self.mgr
            .emit_status_with(&context, JobState::Ready, None, None, false)
            .await;
        context
    }

    fn workflow_of(&self, job_id: &lwf_core::JobId) -> WorkflowId {
        match self.mgr.db().job_status(job_id) {
            Some(status) => status.context().workflow_id().clone(),
            None => WorkflowId::new(job_id.as_str()),
        }
    }
}

/// Child context for a satisfied job trigger. The workflow id always comes
/// from the satisfying status's context, never from the event, so chains
/// keep their workflow identity.
fn make_fire_context(trigger: &JobEvent, parent: &JobContext, mgr: &LwfManager) -> JobContext {
    let job_id = trigger
        .fire_job_id
        .clone()
        .unwrap_or_else(|| lwf_core::JobId::new(mgr.generate_id()));
    let mut context = JobContext::with_id(job_id.as_str()).child_of(parent);
    context.set_site_name(trigger.fire_site.clone());
    context.set_parent_job_id(trigger.rule_job_id.clone());
    context.set_workflow_id(parent.workflow_id().clone());
    context
}

/// Child context for a satisfied data trigger, parented to the notating job.
fn make_data_fire_context(
    trigger: &MetadataEvent,
    info_context: &JobContext,
    mgr: &LwfManager,
) -> JobContext {
    let job_id = trigger
        .fire_job_id
        .clone()
        .unwrap_or_else(|| lwf_core::JobId::new(mgr.generate_id()));
    let mut context = JobContext::with_id(job_id.as_str()).child_of(info_context);
    context.set_site_name(trigger.fire_site.clone());
    context.set_parent_job_id(info_context.job_id().clone());
    context.set_workflow_id(info_context.workflow_id().clone());
    context
}

/// Property map carried by an INFO status, when its payload is a metasheet.
fn info_props(status: &JobStatus) -> Option<std::collections::BTreeMap<String, String>> {
    let info = status.native_info()?;
    let sheet: Metasheet = codec::decode(info).ok()?;
    Some(sheet.props().clone())
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
