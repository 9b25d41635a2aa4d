// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging bucket: append-only records attributable to a workflow and job.
//!
//! The row key carries the attribution ids as JSON so the per-workflow and
//! per-job queries can use the same substring-regex machinery as metasheet
//! find.

use crate::db::Database;
use crate::query;
use lwf_core::{codec, JobId, LogRecord, WorkflowId};
use tracing::error;

const TABLE: &str = "LoggingStore";

impl Database {
    /// Append a log record under `run.log.{LEVEL}`.
    pub async fn put_log(&self, record: &LogRecord) {
        let pillar = format!("run.log.{}", record.level);
        let key = format!(
            "{{\"workflowId\": \"{}\", \"jobId\": \"{}\"}}",
            record.workflow_id, record.job_id,
        );
        let blob = match codec::encode(record) {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, "put_log encode failed");
                return;
            }
        };
        if let Err(e) = self.put(TABLE, &record.site, &pillar, &key, &blob).await {
            self.log_write_error("put_log", &e);
        }
    }

    /// Records attributed to a workflow, newest first.
    pub fn logs_for_workflow(&self, workflow_id: &WorkflowId) -> Vec<LogRecord> {
        self.read_logs(Some(("workflowId", workflow_id.as_str())))
    }

    /// Records attributed to a job, newest first.
    pub fn logs_for_job(&self, job_id: &JobId) -> Vec<LogRecord> {
        self.read_logs(Some(("jobId", job_id.as_str())))
    }

    /// Every log record, newest first.
    pub fn all_logs(&self) -> Vec<LogRecord> {
        self.read_logs(None)
    }

    fn read_logs(&self, clause: Option<(&str, &str)>) -> Vec<LogRecord> {
        let result = self.reading(|conn| {
            let mut out = Vec::new();
            match clause {
                Some((field, value)) => {
                    let pattern = query::key_clause(field, &regex::escape(value));
                    let mut stmt = conn.prepare(
                        "SELECT data FROM LoggingStore WHERE key REGEXP ?1 \
                         ORDER BY ts DESC, id DESC",
                    )?;
                    let rows = stmt.query_map([pattern], |r| r.get::<_, String>(0))?;
                    for row in rows {
                        out.push(codec::decode(&row?)?);
                    }
                }
                None => {
                    let mut stmt =
                        conn.prepare("SELECT data FROM LoggingStore ORDER BY ts DESC, id DESC")?;
                    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
                    for row in rows {
                        out.push(codec::decode(&row?)?);
                    }
                }
            }
            Ok(out)
        });
        match result {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "read_logs failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
