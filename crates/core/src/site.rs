// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Site-driver contract: the four pillar traits and the middleware surface
//! drivers call back into.
//!
//! A site is any place work can run: the local shell, an HPC scheduler, a
//! cloud backend. Drivers implement the pillars; the engine resolves them
//! by name and invokes them either in-process or through an isolated
//! subprocess, so nothing here may assume it shares an address space with
//! the middleware.

use crate::context::JobContext;
use crate::defn::JobDefn;
use crate::id::JobId;
use crate::metasheet::Metasheet;
use crate::status::{JobState, JobStatus, StatusMap};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Environment variable conveying the ambient job id into child processes,
/// so nested executions attribute work to their parent without plumbing.
pub const JOB_ID_ENV: &str = "LWF_JOB_ID";

/// Errors surfaced by site drivers.
#[derive(Debug, Error)]
pub enum SiteError {
    /// The site has no record of the job. For remote sites this is treated
    /// as terminal; some schedulers purge completed jobs.
    #[error("job not found: {0}")]
    JobNotFound(JobId),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("execution failed: {0}")]
    Exec(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} is not supported by this site")]
    Unsupported(String),
}

/// Authentication pillar.
#[async_trait]
pub trait SiteAuth: Send + Sync {
    async fn login(&self, force: bool) -> Result<bool, SiteError>;
    async fn is_auth_current(&self) -> Result<bool, SiteError>;
}

/// Job execution pillar.
#[async_trait]
pub trait SiteRun: Send + Sync {
    /// Instantiate the definition as a running job. Emits the job's
    /// lifecycle statuses through the middleware as it progresses.
    async fn submit(&self, defn: &JobDefn, context: &JobContext) -> Result<JobStatus, SiteError>;

    /// Current canonical status of a job as the site sees it.
    async fn get_status(&self, job_id: &JobId) -> Result<JobStatus, SiteError>;

    /// Ask the site to cancel a job. Sites may refuse; `Ok(false)` means
    /// the request was understood but not honored.
    async fn cancel(&self, job_id: &JobId) -> Result<bool, SiteError>;
}

/// Data management pillar.
#[async_trait]
pub trait SiteRepo: Send + Sync {
    async fn put(
        &self,
        local_path: &str,
        site_obj_path: &str,
        context: &JobContext,
    ) -> Result<Metasheet, SiteError>;

    async fn get(
        &self,
        site_obj_path: &str,
        local_path: &str,
        context: &JobContext,
    ) -> Result<String, SiteError>;

    async fn find(&self, query: &BTreeMap<String, String>) -> Result<Vec<Metasheet>, SiteError>;
}

/// Resource provisioning pillar.
#[async_trait]
pub trait SiteSpin: Send + Sync {
    async fn list_compute_types(&self) -> Result<Vec<String>, SiteError>;
}

/// A named site: its four pillar drivers plus descriptor flags.
#[derive(Clone)]
pub struct Site {
    pub name: String,
    /// Remote sites get automatic status polling installed on submit.
    pub remote: bool,
    pub status_map: StatusMap,
    pub auth: Arc<dyn SiteAuth>,
    pub run: Arc<dyn SiteRun>,
    pub repo: Arc<dyn SiteRepo>,
    pub spin: Arc<dyn SiteSpin>,
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("name", &self.name)
            .field("remote", &self.remote)
            .finish()
    }
}

/// The middleware surface drivers call back into.
///
/// Status emission never fails from the caller's point of view: persistence
/// errors are logged and swallowed so a driver's control flow cannot hinge
/// on the store.
#[async_trait]
pub trait Midware: Send + Sync {
    /// Generate an opaque unique id.
    fn generate_id(&self) -> String;

    /// Persist a status observation and run the emit pipeline (workflow
    /// auto-create, remote tracking, data triggers, processor wake).
    /// `from_event` suppresses remote-tracking auto-install for emissions
    /// originating inside event handling.
    async fn emit_status_with(
        &self,
        context: &JobContext,
        status: JobState,
        native_status: Option<&str>,
        native_info: Option<&str>,
        from_event: bool,
    );

    /// Persist a status observation (the common, non-event path).
    async fn emit_status(
        &self,
        context: &JobContext,
        status: JobState,
        native_status: Option<&str>,
        native_info: Option<&str>,
    ) {
        self.emit_status_with(context, status, native_status, native_info, false)
            .await;
    }

    /// Most recent persisted status for a job, if any.
    fn get_status(&self, job_id: &JobId) -> Option<JobStatus>;

    /// Metasheets whose properties satisfy every clause of the query.
    fn find_metasheets(&self, query: &BTreeMap<String, String>) -> Vec<Metasheet>;

    /// Record a data put with metadata; emits the INFO status that makes
    /// the notation visible to data triggers.
    async fn notate_put(
        &self,
        local_path: &str,
        site_obj_path: &str,
        context: &JobContext,
        sheet: Option<Metasheet>,
    ) -> Option<Metasheet>;

    /// Record a data get with metadata.
    async fn notate_get(
        &self,
        local_path: &str,
        site_obj_path: &str,
        context: &JobContext,
    ) -> Option<Metasheet>;

    /// Reconstruct the ambient job context conveyed through the process
    /// environment, if one is set.
    fn context_from_env(&self) -> Option<JobContext>;
}
