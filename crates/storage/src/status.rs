// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job status bucket: append-only, newest-first reads.

use crate::db::{Database, StoreError};
use lwf_core::{codec, JobId, JobStatus, WorkflowId};
use tracing::error;

const TABLE: &str = "JobStatusStore";
const PILLAR: &str = "run.status";

impl Database {
    /// Append a status record. Failures are logged, never raised; the
    /// emitter's control flow must not depend on persistence succeeding.
    pub async fn put_job_status(&self, status: &JobStatus) {
        let blob = match codec::encode(status) {
            Ok(b) => b,
            Err(e) => {
                self.log_write_error("put_job_status", &StoreError::Codec(e));
                return;
            }
        };
        if let Err(e) = self
            .put(
                TABLE,
                status.context().site_name(),
                PILLAR,
                status.job_id().as_str(),
                &blob,
            )
            .await
        {
            self.log_write_error("put_job_status", &e);
        }
    }

    /// Full status history for a job, newest first.
    pub fn all_job_statuses(&self, job_id: &JobId) -> Vec<JobStatus> {
        let result = self.reading(|conn| {
            let mut stmt = conn.prepare(
                "SELECT data FROM JobStatusStore WHERE pillar = ?1 AND key = ?2 \
                 ORDER BY ts DESC, id DESC",
            )?;
            let rows = stmt.query_map([PILLAR, job_id.as_str()], |r| r.get::<_, String>(0))?;
            let mut out = Vec::new();
            for row in rows {
                out.push(codec::decode(&row?)?);
            }
            Ok(out)
        });
        match result {
            Ok(v) => v,
            Err(e) => {
                error!(job_id = %job_id, error = %e, "all_job_statuses failed");
                Vec::new()
            }
        }
    }

    /// Most recent status for a job, if any.
    pub fn job_status(&self, job_id: &JobId) -> Option<JobStatus> {
        let result = self.reading(|conn| {
            let mut stmt = conn.prepare(
                "SELECT data FROM JobStatusStore WHERE pillar = ?1 AND key = ?2 \
                 ORDER BY ts DESC, id DESC LIMIT 1",
            )?;
            let mut rows = stmt.query_map([PILLAR, job_id.as_str()], |r| r.get::<_, String>(0))?;
            match rows.next() {
                Some(row) => Ok(Some(codec::decode::<JobStatus>(&row?)?)),
                None => Ok(None),
            }
        });
        match result {
            Ok(v) => v,
            Err(e) => {
                error!(job_id = %job_id, error = %e, "job_status failed");
                None
            }
        }
    }

    /// Every status whose context carries the workflow id, newest first.
    ///
    /// The workflow id lives inside the serialized payload, so this decodes
    /// and filters; workflows are expected to stay small enough for that.
    pub fn statuses_for_workflow(&self, workflow_id: &WorkflowId) -> Vec<JobStatus> {
        let result = self.reading(|conn| {
            let mut stmt = conn.prepare(
                "SELECT data FROM JobStatusStore WHERE pillar = ?1 ORDER BY ts DESC, id DESC",
            )?;
            let rows = stmt.query_map([PILLAR], |r| r.get::<_, String>(0))?;
            let mut out = Vec::new();
            for row in rows {
                let status: JobStatus = codec::decode(&row?)?;
                if status.context().workflow_id() == workflow_id {
                    out.push(status);
                }
            }
            Ok(out)
        });
        match result {
            Ok(v) => v,
            Err(e) => {
                error!(workflow_id = %workflow_id, error = %e, "statuses_for_workflow failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
