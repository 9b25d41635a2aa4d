// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The LwfManager façade: the verb set consumed by workflows and by the
//! boundary transport.
//!
//! Owns id generation, context inheritance (including the environment-
//! carried job id), the emit pipeline, event registration, synchronous
//! wait, the notate provenance glue, and workflow-dump aggregation.
//! Failures are absorbed: callers observe them as `None`/empty returns,
//! FAILED statuses on expected job ids, or log records. The event loop
//! itself never crashes on bad input.

use crate::bridge::SiteBridge;
use crate::config::SiteConfig;
use crate::error::EngineError;
use crate::processor::{EventProcessor, ProcessorConfig};
use crate::registry::SiteRegistry;
use async_trait::async_trait;
use chrono::Utc;
use lwf_core::metasheet::reserved;
use lwf_core::{
    codec, EntryPointType, EventId, EventPillar, IdGen, JobContext, JobDefn, JobId, JobState,
    JobStatus, LogLevel, LogRecord, Metasheet, Midware, Pillar, RemoteJobEvent, Site, UuidGen,
    Workflow, WorkflowEvent, WorkflowId, JOB_ID_ENV,
};
use lwf_storage::Database;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;
use tracing::{error, info};

/// One job's place in a workflow dump: its selected status plus the state
/// the dashboard should show for it.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub status: JobStatus,
    /// Selected state with the presentation rule applied: a job whose
    /// entire history is INFO reads as Complete.
    pub effective_state: JobState,
}

/// Aggregated view of a workflow: the record, latest-per-job statuses, and
/// every metasheet tagged to it.
#[derive(Debug, Clone)]
pub struct WorkflowDump {
    pub workflow: Workflow,
    pub jobs: Vec<JobSummary>,
    pub metasheets: Vec<Metasheet>,
}

/// The middleware façade. One per process, constructed through [`start`].
///
/// [`start`]: LwfManager::start
pub struct LwfManager {
    db: Database,
    config: Arc<SiteConfig>,
    bridge: SiteBridge,
    ids: Arc<dyn IdGen>,
    processor: OnceLock<Arc<EventProcessor>>,
    ambient: Mutex<Option<JobContext>>,
    self_ref: Weak<LwfManager>,
}

impl LwfManager {
    /// Construct the manager with the stock driver registry and production
    /// cadence, and spawn its event processor on the current runtime.
    pub fn start(db: Database, config: SiteConfig) -> Arc<Self> {
        Self::start_with(
            db,
            config,
            SiteRegistry::with_defaults(),
            Arc::new(UuidGen),
            ProcessorConfig::default(),
        )
    }

    /// Fully parameterized construction, used by tests to inject a
    /// deterministic id generator and a fast cadence.
    pub fn start_with(
        db: Database,
        config: SiteConfig,
        registry: SiteRegistry,
        ids: Arc<dyn IdGen>,
        processor_cfg: ProcessorConfig,
    ) -> Arc<Self> {
        let config = Arc::new(config);
        let registry = Arc::new(registry);
        let mgr = Arc::new_cyclic(|weak: &Weak<LwfManager>| Self {
            db,
            config: Arc::clone(&config),
            bridge: SiteBridge::new(config, registry),
            ids,
            processor: OnceLock::new(),
            ambient: Mutex::new(None),
            self_ref: weak.clone(),
        });
        let processor = EventProcessor::new(Arc::clone(&mgr), processor_cfg);
        let _ = mgr.processor.set(Arc::clone(&processor));
        processor.spawn();
        mgr
    }

    pub(crate) fn db(&self) -> &Database {
        &self.db
    }

    pub(crate) fn bridge(&self) -> &SiteBridge {
        &self.bridge
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// The processor owned by this manager.
    pub fn processor(&self) -> Option<&Arc<EventProcessor>> {
        self.processor.get()
    }

    /// Stop the event processor. Persisted events survive for the next
    /// start to re-evaluate.
    pub fn shutdown(&self) {
        if let Some(p) = self.processor.get() {
            p.shutdown();
        }
    }

    fn midware(&self) -> Result<Arc<dyn Midware>, EngineError> {
        match self.self_ref.upgrade() {
            Some(mgr) => Ok(mgr),
            None => Err(EngineError::InvalidRequest(
                "manager is shutting down".into(),
            )),
        }
    }

    /// Generate an opaque unique id.
    pub fn generate_id(&self) -> String {
        self.ids.generate()
    }

    /// Write a log record to the logging store and the tracing stream.
    pub(crate) async fn log(&self, level: LogLevel, workflow_id: &str, job_id: &str, message: &str) {
        let record = LogRecord::new(level, message)
            .with_workflow(workflow_id)
            .with_job(job_id);
        match level {
            LogLevel::Info => info!(workflow_id, job_id, "{message}"),
            LogLevel::Error => error!(workflow_id, job_id, "{message}"),
        }
        self.db.put_log(&record).await;
    }

    //***********************************************************************
    // context

    /// Pin the ambient context used when verbs are called without one.
    pub fn set_context(&self, context: JobContext) {
        *self.ambient.lock() = Some(context);
    }

    /// The ambient context: explicitly set, else reconstructed from the
    /// process environment.
    pub fn context(&self) -> Option<JobContext> {
        if let Some(ctx) = self.ambient.lock().clone() {
            return Some(ctx);
        }
        let ctx = self.context_from_env()?;
        *self.ambient.lock() = Some(ctx.clone());
        Some(ctx)
    }

    //***********************************************************************
    // sites

    /// Resolve a named site's in-process drivers.
    pub fn get_site(&self, name: &str) -> Result<Site, EngineError> {
        let name = if name.is_empty() { "local" } else { name };
        self.bridge.resolve(name, self.midware()?)
    }

    //***********************************************************************
    // jobs

    /// Submit a definition: establish the job's context, emit READY, and
    /// dispatch to the site (which carries the status lifecycle from
    /// PENDING onward). Returns the job's current status.
    pub async fn submit(
        &self,
        defn: &JobDefn,
        parent: Option<&JobContext>,
        compute_type: Option<&str>,
    ) -> Option<JobStatus> {
        let site_name = defn
            .site_name()
            .map(str::to_string)
            .or_else(|| parent.map(|p| p.site_name().to_string()))
            .unwrap_or_else(|| "local".to_string());

        let context = match parent {
            // A provided context IS the job's identity (e.g. a trigger's
            // pre-allocated context); run under it verbatim.
            Some(ctx) => ctx.clone(),
            None => match self.context_from_env() {
                Some(ctx) => ctx,
                None => {
                    let mut ctx = JobContext::with_id(self.generate_id());
                    ctx.set_site_name(site_name.clone());
                    if let Some(ct) = compute_type {
                        ctx.set_compute_type(ct);
                    }
                    self.emit_status(&ctx, JobState::Ready, None, None).await;
                    ctx
                }
            },
        };

        if let Err(e) = self
            .bridge
            .submit(&site_name, defn, &context, self.midware().ok()?)
            .await
        {
            self.log(
                LogLevel::Error,
                context.workflow_id().as_str(),
                context.job_id().as_str(),
                &format!("submit to {site_name} failed: {e}"),
            ).await;
            self.emit_status(&context, JobState::Failed, None, Some(&e.to_string()))
                .await;
        }
        self.get_status(context.job_id())
    }

    /// Latest persisted status of a job.
    pub fn get_status(&self, job_id: &JobId) -> Option<JobStatus> {
        self.db.job_status(job_id)
    }

    /// Full status history of a job, newest first.
    pub fn all_statuses(&self, job_id: &JobId) -> Vec<JobStatus> {
        self.db.all_job_statuses(job_id)
    }

    /// Poll until the job reaches a terminal state. Progressive sleep: 1 s
    /// growing by 3 s per poll to a minute, then by a minute per poll.
    /// Never times out on its own; callers needing a bound bring a timer.
    pub async fn wait(&self, job_id: &JobId) -> Option<JobStatus> {
        let status = self.get_status(job_id)?;
        if status.is_terminal() {
            return Some(status);
        }
        let mut sleep_secs = 1u64;
        loop {
            tokio::time::sleep(Duration::from_secs(sleep_secs)).await;
            if sleep_secs < 60 {
                sleep_secs += 3;
            } else if sleep_secs < 6000 {
                sleep_secs += 60;
            }
            if let Some(s) = self.get_status(job_id) {
                if s.is_terminal() {
                    return Some(s);
                }
            }
        }
    }

    /// Ask the job's site to cancel it. Sites may refuse.
    pub async fn cancel(&self, job_id: &JobId) -> bool {
        let Some(status) = self.get_status(job_id) else {
            self.log(
                LogLevel::Error,
                "",
                job_id.as_str(),
                "cancel: no status for job",
            ).await;
            return false;
        };
        let site_name = status.context().site_name().to_string();
        let Ok(midware) = self.midware() else {
            return false;
        };
        match self.bridge.cancel(&site_name, job_id, midware).await {
            Ok(cancelled) => cancelled,
            Err(e) => {
                self.log(
                    LogLevel::Error,
                    status.context().workflow_id().as_str(),
                    job_id.as_str(),
                    &format!("cancel failed: {e}"),
                ).await;
                false
            }
        }
    }

    //***********************************************************************
    // events

    /// Register a trigger. Pre-allocates the future job id, emits its READY
    /// status, and returns that initial status.
    pub async fn set_event(&self, event: WorkflowEvent) -> Option<JobStatus> {
        let processor = self.processor.get()?;
        let job_id = processor.set_event(event).await?;
        self.get_status(&job_id)
    }

    /// Unregister a trigger.
    pub async fn unset_event(&self, event: &WorkflowEvent) {
        self.unset_event_id(event.event_id()).await;
    }

    pub async fn unset_event_id(&self, event_id: &EventId) {
        if let Some(p) = self.processor.get() {
            p.unset_event_by_id(event_id).await;
        }
    }

    /// Every registered trigger, newest first.
    pub fn active_events(&self) -> Vec<WorkflowEvent> {
        self.db.all_events()
    }

    //***********************************************************************
    // workflows

    /// Write a workflow record and read back the stored copy.
    pub async fn put_workflow(&self, workflow: &Workflow) -> Option<Workflow> {
        self.db.put_workflow(workflow).await;
        self.get_workflow(workflow.workflow_id())
    }

    pub fn get_workflow(&self, workflow_id: &WorkflowId) -> Option<Workflow> {
        self.db.workflow(workflow_id)
    }

    pub fn all_workflows(&self) -> Vec<Workflow> {
        self.db.all_workflows()
    }

    pub fn find_workflows(&self, query: &BTreeMap<String, String>) -> Vec<Workflow> {
        self.db.find_workflows(query)
    }

    /// Every status for every job in a workflow, newest first.
    pub fn all_statuses_for_workflow(&self, workflow_id: &WorkflowId) -> Vec<JobStatus> {
        self.db.statuses_for_workflow(workflow_id)
    }

    /// Latest status per job in a workflow, newest first, preferring a
    /// terminal status over any later non-terminal one; a late INFO must
    /// not unfinish a job.
    pub fn latest_statuses_for_workflow(&self, workflow_id: &WorkflowId) -> Vec<JobStatus> {
        latest_per_job(self.all_statuses_for_workflow(workflow_id))
    }

    /// Aggregate a workflow: record, latest-per-job statuses (with the
    /// INFO-only-reads-as-Complete presentation rule), and its metasheets.
    pub fn dump_workflow(&self, workflow_id: &WorkflowId) -> Option<WorkflowDump> {
        let workflow = self.get_workflow(workflow_id)?;
        let all = self.all_statuses_for_workflow(workflow_id);
        let jobs = latest_per_job(all.clone())
            .into_iter()
            .map(|status| {
                let info_only = all
                    .iter()
                    .filter(|s| s.job_id() == status.job_id())
                    .all(|s| s.status() == JobState::Info);
                JobSummary {
                    effective_state: if info_only {
                        JobState::Complete
                    } else {
                        status.status()
                    },
                    status,
                }
            })
            .collect();
        let metasheets = self.find(&BTreeMap::from([(
            reserved::WORKFLOW_ID.to_string(),
            regex_literal(workflow_id.as_str()),
        )]));
        Some(WorkflowDump {
            workflow,
            jobs,
            metasheets,
        })
    }

    //***********************************************************************
    // data

    pub fn find(&self, query: &BTreeMap<String, String>) -> Vec<Metasheet> {
        self.db.find_metasheets(query)
    }

    /// Author-facing notate: attribute the put to a workflow (or to the
    /// ambient context when no workflow is named).
    pub async fn notate_put_in(
        &self,
        local_path: &str,
        workflow_id: Option<&WorkflowId>,
        props: BTreeMap<String, String>,
    ) -> Option<Metasheet> {
        let context = self.notation_context(workflow_id);
        let sheet = Metasheet::new(context.site_name(), local_path, "", props);
        self.notate_put(local_path, "", &context, Some(sheet)).await
    }

    /// Author-facing notate for a get.
    pub async fn notate_get_in(
        &self,
        local_path: &str,
        workflow_id: Option<&WorkflowId>,
    ) -> Option<Metasheet> {
        let context = self.notation_context(workflow_id);
        self.notate_get(local_path, "", &context).await
    }

    fn notation_context(&self, workflow_id: Option<&WorkflowId>) -> JobContext {
        match workflow_id {
            Some(wf) => {
                let mut ctx = JobContext::with_id(self.generate_id());
                ctx.set_workflow_id(wf.clone());
                ctx
            }
            None => self
                .context()
                .unwrap_or_else(|| JobContext::with_id(self.generate_id())),
        }
    }

    /// Shared notation path: stamp the reserved props, persist the sheet,
    /// and emit the INFO status that carries it to data triggers.
    async fn notate(
        &self,
        direction: &str,
        local_path: &str,
        site_obj_path: &str,
        context: &JobContext,
        sheet: Option<Metasheet>,
    ) -> Option<Metasheet> {
        let mut sheet = sheet.unwrap_or_else(|| {
            Metasheet::new(context.site_name(), local_path, site_obj_path, BTreeMap::new())
        });
        sheet.set_job_id(context.job_id().clone());
        sheet.set_reserved(reserved::DIRECTION, direction);
        sheet.set_reserved(reserved::SITE_NAME, context.site_name());
        sheet.set_reserved(reserved::LOCAL_PATH, local_path);
        sheet.set_reserved(reserved::SITE_OBJ_PATH, site_obj_path);
        sheet.set_reserved(reserved::WORKFLOW_ID, context.workflow_id().as_str());
        sheet.set_reserved(reserved::JOB_ID, context.job_id().as_str());
        self.db.put_metasheet(&sheet).await;
        match codec::encode(&sheet) {
            Ok(blob) => {
                self.emit_status(context, JobState::Info, None, Some(&blob))
                    .await;
            }
            Err(e) => {
                self.log(
                    LogLevel::Error,
                    context.workflow_id().as_str(),
                    context.job_id().as_str(),
                    &format!("notate: sheet encode failed: {e}"),
                ).await;
            }
        }
        Some(sheet)
    }

    //***********************************************************************
    // logs

    pub fn logs_for_workflow(&self, workflow_id: &WorkflowId) -> Vec<LogRecord> {
        self.db.logs_for_workflow(workflow_id)
    }

    pub fn logs_for_job(&self, job_id: &JobId) -> Vec<LogRecord> {
        self.db.logs_for_job(job_id)
    }

    pub fn all_logs(&self) -> Vec<LogRecord> {
        self.db.all_logs()
    }

    //***********************************************************************
    // site endpoints

    /// Execute a `pillar.method` site endpoint, reshaping arguments per the
    /// method's convention, optionally managing the PENDING → RUNNING →
    /// COMPLETE/FAILED emission sequence. Returns the method's result as a
    /// codec blob; failures are absorbed to `None`.
    pub async fn exec_site_endpoint(
        &self,
        defn: &JobDefn,
        context: Option<JobContext>,
        manage_status: bool,
    ) -> Option<String> {
        if defn.entry_point_type() != EntryPointType::Site {
            self.log(
                LogLevel::Error,
                "",
                "",
                "exec_site_endpoint: definition is not a site endpoint",
            ).await;
            return None;
        }
        let Some((pillar, method)) = defn.site_method() else {
            self.log(
                LogLevel::Error,
                "",
                "",
                &format!("exec_site_endpoint: bad entry point: {}", defn.entry_point()),
            ).await;
            return None;
        };
        let context = context
            .or_else(|| self.context_from_env())
            .unwrap_or_else(|| JobContext::with_id(self.generate_id()));
        let site_name = defn
            .site_name()
            .unwrap_or_else(|| context.site_name())
            .to_string();
        self.log(
            LogLevel::Info,
            context.workflow_id().as_str(),
            context.job_id().as_str(),
            &format!("exec site endpoint {}.{method} on {site_name}", pillar),
        ).await;

        // Isolated sites run the whole managed sequence in their own
        // environment; hand the serialized call over and relay the value.
        if let Some(venv) = self.config.venv(&site_name) {
            let request = crate::bridge::InvokeRequest::ExecEndpoint {
                defn: codec::encode(defn).ok()?,
                context: codec::encode(&context).ok()?,
            };
            return match self
                .bridge
                .invoke_isolated(venv, &site_name, &request)
                .await
            {
                Ok(value) => value,
                Err(e) => {
                    self.log(
                        LogLevel::Error,
                        context.workflow_id().as_str(),
                        context.job_id().as_str(),
                        &format!("isolated endpoint failed: {e}"),
                    ).await;
                    None
                }
            };
        }

        if manage_status {
            self.emit_status(&context, JobState::Pending, None, None).await;
        }
        let result = self
            .invoke_endpoint(&site_name, pillar, method, defn, &context, manage_status)
            .await;
        match result {
            Ok(value) => {
                if manage_status {
                    self.emit_status(&context, JobState::Complete, None, None).await;
                }
                value
            }
            Err(e) => {
                if manage_status {
                    self.emit_status(&context, JobState::Failed, None, Some(&e.to_string()))
                        .await;
                }
                self.log(
                    LogLevel::Error,
                    context.workflow_id().as_str(),
                    context.job_id().as_str(),
                    &format!("exec site endpoint {}.{method} failed: {e}", pillar),
                ).await;
                None
            }
        }
    }

    /// In-process endpoint invocation with per-method argument reshaping.
    async fn invoke_endpoint(
        &self,
        site_name: &str,
        pillar: Pillar,
        method: &str,
        defn: &JobDefn,
        context: &JobContext,
        manage_status: bool,
    ) -> Result<Option<String>, EngineError> {
        let site = self.bridge.resolve(site_name, self.midware()?)?;
        if manage_status {
            self.emit_status(context, JobState::Running, None, None).await;
        }
        let args = defn.job_args();
        let arg = |i: usize| -> Result<&str, EngineError> {
            args.get(i)
                .map(String::as_str)
                .ok_or_else(|| EngineError::InvalidRequest(format!("{pillar}.{method}: missing arg {i}")))
        };
        match (pillar, method) {
            (Pillar::Run, "submit") => {
                // First arg is the nested command; the rest are its args.
                let nested = JobDefn::new(arg(0)?, EntryPointType::String, args[1..].to_vec());
                let status = site.run.submit(&nested, context).await?;
                Ok(Some(codec::encode(&status)?))
            }
            (Pillar::Run, "get_status") => {
                let job_id = JobId::new(arg(0)?);
                let status = site.run.get_status(&job_id).await?;
                Ok(Some(codec::encode(&status)?))
            }
            (Pillar::Run, "cancel") => {
                let job_id = JobId::new(arg(0)?);
                let cancelled = site.run.cancel(&job_id).await?;
                Ok(Some(codec::encode(&cancelled)?))
            }
            (Pillar::Repo, "put") => {
                let sheet = site.repo.put(arg(0)?, arg(1)?, context).await?;
                Ok(Some(codec::encode(&sheet)?))
            }
            (Pillar::Repo, "get") => {
                let local = site.repo.get(arg(0)?, arg(1)?, context).await?;
                Ok(Some(codec::encode(&local)?))
            }
            (Pillar::Repo, "find") => {
                let query: BTreeMap<String, String> = serde_json::from_str(arg(0)?)
                    .map_err(|e| EngineError::InvalidRequest(format!("find query: {e}")))?;
                let sheets = site.repo.find(&query).await?;
                Ok(Some(codec::encode(&sheets)?))
            }
            (Pillar::Auth, "login") => {
                let ok = site.auth.login(false).await?;
                Ok(Some(codec::encode(&ok)?))
            }
            (Pillar::Auth, "is_auth_current") => {
                let ok = site.auth.is_auth_current().await?;
                Ok(Some(codec::encode(&ok)?))
            }
            (Pillar::Spin, "list_compute_types") => {
                let types = site.spin.list_compute_types().await?;
                Ok(Some(codec::encode(&types)?))
            }
            _ => Err(EngineError::InvalidRequest(format!(
                "unknown site endpoint: {pillar}.{method}"
            ))),
        }
    }

    /// Fire a trigger's definition. Site endpoints run managed; anything
    /// else goes to the fire site's run pillar.
    pub(crate) async fn fire(
        &self,
        defn: &JobDefn,
        fire_site: &str,
        context: &JobContext,
    ) -> Result<(), EngineError> {
        match defn.entry_point_type() {
            EntryPointType::Site => {
                // Managed execution records its own COMPLETE/FAILED.
                self.exec_site_endpoint(defn, Some(context.clone()), true)
                    .await;
                Ok(())
            }
            _ => {
                self.bridge
                    .submit(fire_site, defn, context, self.midware()?)
                    .await
            }
        }
    }
}

#[async_trait]
impl Midware for LwfManager {
    fn generate_id(&self) -> String {
        LwfManager::generate_id(self)
    }

    async fn emit_status_with(
        &self,
        context: &JobContext,
        status: JobState,
        native_status: Option<&str>,
        native_info: Option<&str>,
        from_event: bool,
    ) {
        let mut record = JobStatus::with_ids(self.ids.as_ref(), context.clone(), status);
        if let Some(native) = native_status {
            record = record.with_native(native);
        }
        if let Some(info) = native_info {
            record = record.with_info(info);
        }
        record.mark_received(Utc::now());
        self.db.put_job_status(&record).await;
        info!(
            job_id = %context.job_id(),
            status = %status,
            site = context.site_name(),
            "status emitted"
        );

        // A first READY/PENDING under an unknown workflow id creates the
        // workflow record.
        if matches!(status, JobState::Ready | JobState::Pending)
            && self.db.workflow(context.workflow_id()).is_none()
        {
            self.db
                .put_workflow(&Workflow::new(context.workflow_id().clone()))
                .await;
        }

        // The middleware, not the author, owns tracking remote jobs to
        // completion.
        if self.config.is_remote(context.site_name()) && !from_event {
            let tracked = self
                .db
                .events(EventPillar::Remote)
                .iter()
                .any(|e| e.fire_job_id() == Some(context.job_id()));
            if !tracked {
                self.log(
                    LogLevel::Info,
                    context.workflow_id().as_str(),
                    context.job_id().as_str(),
                    &format!("installing remote tracking for job {}", context.job_id()),
                ).await;
                if let Some(p) = self.processor.get() {
                    p.set_event(WorkflowEvent::Remote(RemoteJobEvent::for_context(context)))
                        .await;
                }
            }
        }

        // Data triggers see INFO payloads the moment they are emitted.
        if status == JobState::Info {
            if let Some(p) = self.processor.get() {
                if p.check_data_status_event(&record).await {
                    self.log(
                        LogLevel::Info,
                        context.workflow_id().as_str(),
                        context.job_id().as_str(),
                        "data trigger fired",
                    ).await;
                }
            }
        }

        if let Some(p) = self.processor.get() {
            p.wake();
        }
    }

    fn get_status(&self, job_id: &JobId) -> Option<JobStatus> {
        LwfManager::get_status(self, job_id)
    }

    fn find_metasheets(&self, query: &BTreeMap<String, String>) -> Vec<Metasheet> {
        self.find(query)
    }

    async fn notate_put(
        &self,
        local_path: &str,
        site_obj_path: &str,
        context: &JobContext,
        sheet: Option<Metasheet>,
    ) -> Option<Metasheet> {
        self.notate("put", local_path, site_obj_path, context, sheet)
            .await
    }

    async fn notate_get(
        &self,
        local_path: &str,
        site_obj_path: &str,
        context: &JobContext,
    ) -> Option<Metasheet> {
        self.notate("get", local_path, site_obj_path, context, None)
            .await
    }

    fn context_from_env(&self) -> Option<JobContext> {
        let job_id = std::env::var(JOB_ID_ENV).ok()?;
        if job_id.is_empty() {
            return None;
        }
        match self.db.job_status(&JobId::new(&job_id)) {
            Some(status) => Some(status.context().clone()),
            None => Some(JobContext::with_id(job_id)),
        }
    }
}

/// Latest status per job, preferring a terminal record over any later
/// non-terminal one; input and output are newest-first.
fn latest_per_job(statuses: Vec<JobStatus>) -> Vec<JobStatus> {
    let mut picked: Vec<JobStatus> = Vec::new();
    for status in statuses {
        match picked.iter_mut().find(|p| p.job_id() == status.job_id()) {
            None => picked.push(status),
            Some(current) => {
                // Inputs arrive newest-first, so `status` is older than
                // `current`; it only wins by being terminal.
                if status.is_terminal() && !current.is_terminal() {
                    *current = status;
                }
            }
        }
    }
    picked
}

/// Escape a literal value for use as a find clause.
fn regex_literal(value: &str) -> String {
    regex::escape(value)
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
