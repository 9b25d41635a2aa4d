// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable site for tests: records submissions, serves canned statuses
//! and not-found conditions.

use async_trait::async_trait;
use lwf_core::{
    JobContext, JobDefn, JobId, JobState, JobStatus, Metasheet, Midware, Site, SiteAuth, SiteError,
    SiteRepo, SiteRun, SiteSpin, StatusMap,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

#[derive(Default)]
struct FakeState {
    submissions: Vec<(JobDefn, JobContext)>,
    canned: HashMap<JobId, JobState>,
    not_found: HashSet<JobId>,
    /// When set, submissions emit RUNNING then COMPLETE immediately.
    auto_complete: bool,
}

/// Handle shared between a test and the fake site it registered.
#[derive(Clone, Default)]
pub struct FakeSiteHandle {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSiteHandle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                auto_complete: true,
                ..FakeState::default()
            })),
        }
    }

    /// Build the site's pillar drivers around this handle.
    pub fn build_site(&self, name: &str, midware: Arc<dyn Midware>) -> Site {
        Site {
            name: name.to_string(),
            remote: false,
            status_map: StatusMap::identity(),
            auth: Arc::new(FakeAuth),
            run: Arc::new(FakeRun {
                state: Arc::clone(&self.state),
                midware: Arc::clone(&midware),
            }),
            repo: Arc::new(FakeRepo { midware }),
            spin: Arc::new(FakeSpin),
        }
    }

    pub fn submissions(&self) -> Vec<(JobDefn, JobContext)> {
        self.state.lock().submissions.clone()
    }

    /// Script `get_status` to report a fixed state for a job.
    pub fn set_status(&self, job_id: JobId, state: JobState) {
        self.state.lock().canned.insert(job_id, state);
    }

    /// Script `get_status` to raise the distinguished not-found condition.
    pub fn set_not_found(&self, job_id: JobId) {
        self.state.lock().not_found.insert(job_id);
    }

    /// Control whether submissions complete themselves.
    pub fn set_auto_complete(&self, auto: bool) {
        self.state.lock().auto_complete = auto;
    }
}

struct FakeAuth;

#[async_trait]
impl SiteAuth for FakeAuth {
    async fn login(&self, _force: bool) -> Result<bool, SiteError> {
        Ok(true)
    }

    async fn is_auth_current(&self) -> Result<bool, SiteError> {
        Ok(true)
    }
}

struct FakeRun {
    state: Arc<Mutex<FakeState>>,
    midware: Arc<dyn Midware>,
}

#[async_trait]
impl SiteRun for FakeRun {
    async fn submit(&self, defn: &JobDefn, context: &JobContext) -> Result<JobStatus, SiteError> {
        let auto = {
            let mut state = self.state.lock();
            state.submissions.push((defn.clone(), context.clone()));
            state.auto_complete
        };
        self.midware
            .emit_status(context, JobState::Pending, None, None)
            .await;
        if auto {
            self.midware
                .emit_status(context, JobState::Running, None, None)
                .await;
            self.midware
                .emit_status(context, JobState::Complete, None, None)
                .await;
        }
        self.midware
            .get_status(context.job_id())
            .ok_or_else(|| SiteError::Exec("no status recorded".to_string()))
    }

    async fn get_status(&self, job_id: &JobId) -> Result<JobStatus, SiteError> {
        {
            let state = self.state.lock();
            if state.not_found.contains(job_id) {
                return Err(SiteError::JobNotFound(job_id.clone()));
            }
            if let Some(canned) = state.canned.get(job_id) {
                let context = self
                    .midware
                    .get_status(job_id)
                    .map(|s| s.context().clone())
                    .unwrap_or_else(|| JobContext::with_id(job_id.as_str()));
                return Ok(JobStatus::new(context, *canned));
            }
        }
        self.midware
            .get_status(job_id)
            .ok_or_else(|| SiteError::JobNotFound(job_id.clone()))
    }

    async fn cancel(&self, _job_id: &JobId) -> Result<bool, SiteError> {
        Ok(false)
    }
}

struct FakeRepo {
    midware: Arc<dyn Midware>,
}

#[async_trait]
impl SiteRepo for FakeRepo {
    async fn put(
        &self,
        local_path: &str,
        site_obj_path: &str,
        context: &JobContext,
    ) -> Result<Metasheet, SiteError> {
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
        self.midware
            .notate_get(local_path, site_obj_path, context)
            .await;
        Ok(local_path.to_string())
    }

    async fn find(&self, query: &BTreeMap<String, String>) -> Result<Vec<Metasheet>, SiteError> {
        Ok(self.midware.find_metasheets(query))
    }
}

struct FakeSpin;

#[async_trait]
impl SiteSpin for FakeSpin {
    async fn list_compute_types(&self) -> Result<Vec<String>, SiteError> {
        Ok(vec!["default".to_string()])
    }
}
