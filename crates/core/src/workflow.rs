// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A named grouping of jobs.

use crate::id::WorkflowId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A workflow groups the jobs that share a common root. One is auto-created
/// the first time a status is emitted under an unknown workflow id; authors
/// may also create and annotate them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    workflow_id: WorkflowId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// User-supplied metadata
    #[serde(default)]
    props: BTreeMap<String, String>,
}

impl Workflow {
    pub fn new(workflow_id: WorkflowId) -> Self {
        Self {
            workflow_id,
            name: None,
            description: None,
            props: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_props(mut self, props: BTreeMap<String, String>) -> Self {
        self.props = props;
        self
    }

    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn props(&self) -> &BTreeMap<String, String> {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.props
    }
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[workflow {} name:{}]",
            self.workflow_id,
            self.name.as_deref().unwrap_or("-"),
        )
    }
}
