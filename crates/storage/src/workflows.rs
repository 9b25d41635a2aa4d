// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow bucket: append-on-update, newest row wins on read.

use crate::db::{Database, StoreError};
use crate::query;
use lwf_core::{codec, Workflow, WorkflowId};
use std::collections::BTreeMap;
use tracing::error;

const TABLE: &str = "WorkflowStore";
const PILLAR: &str = "run.wf";

impl Database {
    /// Write a workflow record. Updates append a new row; readers take the
    /// newest, so history is retained.
    pub async fn put_workflow(&self, workflow: &Workflow) {
        let blob = match codec::encode(workflow) {
            Ok(b) => b,
            Err(e) => {
                self.log_write_error("put_workflow", &StoreError::Codec(e));
                return;
            }
        };
        if let Err(e) = self
            .put(TABLE, "local", PILLAR, workflow.workflow_id().as_str(), &blob)
            .await
        {
            self.log_write_error("put_workflow", &e);
        }
    }

    /// Latest record for a workflow id, if any.
    pub fn workflow(&self, workflow_id: &WorkflowId) -> Option<Workflow> {
        let result = self.reading(|conn| {
            let mut stmt = conn.prepare(
                "SELECT data FROM WorkflowStore WHERE pillar = ?1 AND key = ?2 \
                 ORDER BY ts DESC, id DESC LIMIT 1",
            )?;
            let mut rows =
                stmt.query_map([PILLAR, workflow_id.as_str()], |r| r.get::<_, String>(0))?;
            match rows.next() {
                Some(row) => Ok(Some(codec::decode::<Workflow>(&row?)?)),
                None => Ok(None),
            }
        });
        match result {
            Ok(v) => v,
            Err(e) => {
                error!(workflow_id = %workflow_id, error = %e, "workflow read failed");
                None
            }
        }
    }

    /// Latest record per workflow id, newest first.
    pub fn all_workflows(&self) -> Vec<Workflow> {
        let result = self.reading(|conn| {
            let mut stmt = conn
                .prepare("SELECT data FROM WorkflowStore WHERE pillar = ?1 ORDER BY ts DESC, id DESC")?;
            let rows = stmt.query_map([PILLAR], |r| r.get::<_, String>(0))?;
            let mut seen = std::collections::HashSet::new();
            let mut out = Vec::new();
            for row in rows {
                let wf: Workflow = codec::decode(&row?)?;
                if seen.insert(wf.workflow_id().clone()) {
                    out.push(wf);
                }
            }
            Ok(out)
        });
        match result {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "all_workflows failed");
                Vec::new()
            }
        }
    }

    /// Find workflows whose props (plus name/description/id pseudo-fields)
    /// satisfy every clause of the query.
    pub fn find_workflows(&self, query_regexs: &BTreeMap<String, String>) -> Vec<Workflow> {
        self.all_workflows()
            .into_iter()
            .filter(|wf| {
                let mut fields = wf.props().clone();
                fields.insert("workflowId".to_string(), wf.workflow_id().to_string());
                if let Some(name) = wf.name() {
                    fields.insert("name".to_string(), name.to_string());
                }
                if let Some(desc) = wf.description() {
                    fields.insert("description".to_string(), desc.to_string());
                }
                query::props_match(&fields, query_regexs)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "workflows_tests.rs"]
mod tests;
