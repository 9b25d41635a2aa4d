// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution identity of a single job instance.

use crate::id::{IdGen, JobId, WorkflowId};
use serde::{Deserialize, Serialize};

/// The runtime execution context of a job: its id, the site it targets, and
/// its ancestry links.
///
/// A context is created when a job is submitted or when an event handler
/// pre-allocates a future job. The job id is assigned once and never
/// changes; the workflow id self-roots to the job id until a parent (or an
/// explicit workflow) claims the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobContext {
    job_id: JobId,
    /// Site-local identifier; defaults to the canonical job id.
    native_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_job_id: Option<JobId>,
    workflow_id: WorkflowId,
    name: String,
    compute_type: String,
    site_name: String,
}

impl JobContext {
    /// Create a fresh, self-rooted context with a generated job id.
    pub fn new(ids: &dyn IdGen) -> Self {
        Self::with_id(ids.generate())
    }

    /// Create a self-rooted context around a known job id.
    pub fn with_id(job_id: impl Into<String>) -> Self {
        let job_id: String = job_id.into();
        Self {
            native_id: job_id.clone(),
            workflow_id: WorkflowId::new(&job_id),
            name: job_id.clone(),
            job_id: JobId::new(job_id),
            parent_job_id: None,
            compute_type: "default".to_string(),
            site_name: "local".to_string(),
        }
    }

    /// Inherit ancestry from a parent context: parent job id, workflow id,
    /// site, and a derived name.
    pub fn child_of(mut self, parent: &JobContext) -> Self {
        self.parent_job_id = Some(parent.job_id.clone());
        self.workflow_id = parent.workflow_id.clone();
        self.site_name = parent.site_name.clone();
        self.name = format!("{}_{}", parent.name, self.name);
        self
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn native_id(&self) -> &str {
        &self.native_id
    }

    pub fn set_native_id(&mut self, native_id: impl Into<String>) {
        self.native_id = native_id.into();
    }

    pub fn parent_job_id(&self) -> Option<&JobId> {
        self.parent_job_id.as_ref()
    }

    pub fn set_parent_job_id(&mut self, parent: JobId) {
        self.parent_job_id = Some(parent);
    }

    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }

    pub fn set_workflow_id(&mut self, workflow_id: WorkflowId) {
        self.workflow_id = workflow_id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn compute_type(&self) -> &str {
        &self.compute_type
    }

    pub fn set_compute_type(&mut self, compute_type: impl Into<String>) {
        self.compute_type = compute_type.into();
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn set_site_name(&mut self, site_name: impl Into<String>) {
        self.site_name = site_name.into();
    }
}

impl std::fmt::Display for JobContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[job:{} native:{} parent:{} wf:{} site:{} compute:{}]",
            self.job_id,
            self.native_id,
            self.parent_job_id
                .as_ref()
                .map(|p| p.as_str())
                .unwrap_or("-"),
            self.workflow_id,
            self.site_name,
            self.compute_type,
        )
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
