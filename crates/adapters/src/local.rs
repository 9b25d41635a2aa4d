// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The local site: shell execution and filesystem data management.
//!
//! Unsecured: the jobs run as the invoking user on the
//! invoking machine. The native status vocabulary is the canonical one,
//! so the status map is the identity.

use async_trait::async_trait;
use lwf_core::{
    JobContext, JobDefn, JobId, JobState, JobStatus, Metasheet, Midware, Site, SiteAuth, SiteError,
    SiteRepo, SiteRun, SiteSpin, StatusMap, JOB_ID_ENV,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

/// Build the local site's pillar drivers.
pub fn local_site(name: &str, midware: Arc<dyn Midware>) -> Site {
    Site {
        name: name.to_string(),
        remote: false,
        status_map: StatusMap::identity(),
        auth: Arc::new(LocalSiteAuth),
        run: Arc::new(LocalSiteRun {
            midware: Arc::clone(&midware),
        }),
        repo: Arc::new(LocalSiteRepo { midware }),
        spin: Arc::new(LocalSiteSpin),
    }
}

/// Local execution needs no authentication; the user is themselves already.
struct LocalSiteAuth;

#[async_trait]
impl SiteAuth for LocalSiteAuth {
    async fn login(&self, _force: bool) -> Result<bool, SiteError> {
        Ok(true)
    }

    async fn is_auth_current(&self) -> Result<bool, SiteError> {
        Ok(true)
    }
}

struct LocalSiteRun {
    midware: Arc<dyn Midware>,
}

#[async_trait]
impl SiteRun for LocalSiteRun {
    /// Queue the command and return immediately; a background task carries
    /// the status lifecycle to a terminal state.
    async fn submit(&self, defn: &JobDefn, context: &JobContext) -> Result<JobStatus, SiteError> {
        self.midware
            .emit_status(context, JobState::Pending, None, None)
            .await;
        let midware = Arc::clone(&self.midware);
        let command = defn.command_line();
        let job_context = context.clone();
        tokio::spawn(async move {
            run_job(midware, command, job_context).await;
        });
        self.midware
            .get_status(context.job_id())
            .ok_or_else(|| SiteError::Exec("submitted job has no recorded status".to_string()))
    }

    /// The store is the local site's source of truth.
    async fn get_status(&self, job_id: &JobId) -> Result<JobStatus, SiteError> {
        self.midware
            .get_status(job_id)
            .ok_or_else(|| SiteError::JobNotFound(job_id.clone()))
    }

    /// Local jobs are not tracked for cancellation once spawned.
    async fn cancel(&self, job_id: &JobId) -> Result<bool, SiteError> {
        warn!(job_id = %job_id, "local site does not cancel running jobs");
        Ok(false)
    }
}

/// Run the shell command and emit the rest of the job's lifecycle.
///
/// The job id rides into the child environment so nested lwf calls
/// attribute their work to this job.
async fn run_job(midware: Arc<dyn Midware>, command: String, context: JobContext) {
    midware
        .emit_status(&context, JobState::Running, None, None)
        .await;
    debug!(job_id = %context.job_id(), command, "running local job");
    let result = Command::new("sh")
        .arg("-c")
        .arg(&command)
        .env(JOB_ID_ENV, context.job_id().as_str())
        .kill_on_drop(false)
        .output()
        .await;
    match result {
        Ok(output) if output.status.success() => {
            midware
                .emit_status(&context, JobState::Finishing, None, None)
                .await;
            midware
                .emit_status(&context, JobState::Complete, None, None)
                .await;
        }
        Ok(output) => {
            let detail = format!(
                "exit {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim(),
            );
            midware
                .emit_status(&context, JobState::Failed, None, Some(&detail))
                .await;
        }
        Err(e) => {
            midware
                .emit_status(&context, JobState::Failed, None, Some(&e.to_string()))
                .await;
        }
    }
}

/// Local put/get is a filesystem copy plus the notation that makes the
/// data visible to triggers.
struct LocalSiteRepo {
    midware: Arc<dyn Midware>,
}

impl LocalSiteRepo {
    async fn copy(&self, from: &str, to: &str) -> Result<(), SiteError> {
        if let Some(parent) = Path::new(to).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::copy(from, to).await?;
        Ok(())
    }
}

#[async_trait]
impl SiteRepo for LocalSiteRepo {
    async fn put(
        &self,
        local_path: &str,
        site_obj_path: &str,
        context: &JobContext,
    ) -> Result<Metasheet, SiteError> {
        if !local_path.is_empty() && !site_obj_path.is_empty() {
            self.copy(local_path, site_obj_path).await?;
        }
        self.midware
            .notate_put(local_path, site_obj_path, context, None)
            .await
            .ok_or_else(|| SiteError::Exec("notate failed".to_string()))
    }

    async fn get(
        &self,
        site_obj_path: &str,
        local_path: &str,
        context: &JobContext,
    ) -> Result<String, SiteError> {
        if !site_obj_path.is_empty() && !local_path.is_empty() {
            self.copy(site_obj_path, local_path).await?;
        }
        self.midware
            .notate_get(local_path, site_obj_path, context)
            .await;
        Ok(local_path.to_string())
    }

    async fn find(&self, query: &BTreeMap<String, String>) -> Result<Vec<Metasheet>, SiteError> {
        Ok(self.midware.find_metasheets(query))
    }
}

/// The local site has nothing to provision.
struct LocalSiteSpin;

#[async_trait]
impl SiteSpin for LocalSiteSpin {
    async fn list_compute_types(&self) -> Result<Vec<String>, SiteError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
