// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registered workflow triggers.
//!
//! Three kinds of trigger exist: a job reaching a canonical state, data
//! published with a matching metadata profile, and middleware-internal
//! polling of a job running on a remote site. Each is consumed (deleted)
//! when it fires; at most one fire per event.

use crate::context::JobContext;
use crate::defn::JobDefn;
use crate::id::{EventId, JobId};
use crate::status::JobState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Storage pillar tag for each event variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPillar {
    Job,
    Data,
    Remote,
}

impl EventPillar {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventPillar::Job => "run.event.JOB",
            EventPillar::Data => "run.event.DATA",
            EventPillar::Remote => "run.event.REMOTE",
        }
    }
}

impl fmt::Display for EventPillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fire `fire_defn` on `fire_site` when `rule_job_id` reaches `rule_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEvent {
    event_id: EventId,
    pub rule_job_id: JobId,
    pub rule_status: JobState,
    pub fire_defn: JobDefn,
    pub fire_site: String,
    /// Pre-allocated id of the future job, assigned at registration so the
    /// workflow author can reference it before it runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_job_id: Option<JobId>,
    /// Originating context, when the registering job wants the fired job to
    /// inherit its workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<JobContext>,
}

impl JobEvent {
    pub fn new(
        rule_job_id: JobId,
        rule_status: JobState,
        fire_defn: JobDefn,
        fire_site: impl Into<String>,
    ) -> Self {
        Self {
            event_id: EventId::new(uuid::Uuid::new_v4().to_string()),
            rule_job_id,
            rule_status,
            fire_defn,
            fire_site: fire_site.into(),
            fire_job_id: None,
            context: None,
        }
    }

    pub fn with_context(mut self, context: JobContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }
}

/// Fire on publication of metadata matching every clause in `query_reg_exs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEvent {
    event_id: EventId,
    /// `{field: pattern}` clauses, AND-combined; values are regexes after
    /// wildcard translation.
    pub query_reg_exs: BTreeMap<String, String>,
    pub fire_defn: JobDefn,
    pub fire_site: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_job_id: Option<JobId>,
    /// Originating context, when the registering job wants the fired job to
    /// inherit its workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<JobContext>,
}

impl MetadataEvent {
    pub fn new(
        query_reg_exs: BTreeMap<String, String>,
        fire_defn: JobDefn,
        fire_site: impl Into<String>,
    ) -> Self {
        Self {
            event_id: EventId::new(uuid::Uuid::new_v4().to_string()),
            query_reg_exs,
            fire_defn,
            fire_site: fire_site.into(),
            fire_job_id: None,
            context: None,
        }
    }

    pub fn with_context(mut self, context: JobContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }
}

/// Internal tracking event for a job submitted to a remote site; drives
/// recurring status polling until the job is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteJobEvent {
    event_id: EventId,
    pub fire_site: String,
    /// Canonical id of the tracked job
    pub fire_job_id: JobId,
    /// The site's own id for the tracked job
    pub native_job_id: String,
}

impl RemoteJobEvent {
    /// Track the job identified by `context` on its own site.
    pub fn for_context(context: &JobContext) -> Self {
        Self {
            event_id: EventId::new(uuid::Uuid::new_v4().to_string()),
            fire_site: context.site_name().to_string(),
            fire_job_id: context.job_id().clone(),
            native_job_id: context.native_id().to_string(),
        }
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }
}

/// A registered trigger awaiting its firing condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowEvent {
    Job(JobEvent),
    Metadata(MetadataEvent),
    Remote(RemoteJobEvent),
}

impl WorkflowEvent {
    pub fn event_id(&self) -> &EventId {
        match self {
            WorkflowEvent::Job(e) => &e.event_id,
            WorkflowEvent::Metadata(e) => &e.event_id,
            WorkflowEvent::Remote(e) => &e.event_id,
        }
    }

    pub fn pillar(&self) -> EventPillar {
        match self {
            WorkflowEvent::Job(_) => EventPillar::Job,
            WorkflowEvent::Metadata(_) => EventPillar::Data,
            WorkflowEvent::Remote(_) => EventPillar::Remote,
        }
    }

    pub fn fire_site(&self) -> &str {
        match self {
            WorkflowEvent::Job(e) => &e.fire_site,
            WorkflowEvent::Metadata(e) => &e.fire_site,
            WorkflowEvent::Remote(e) => &e.fire_site,
        }
    }

    pub fn fire_job_id(&self) -> Option<&JobId> {
        match self {
            WorkflowEvent::Job(e) => e.fire_job_id.as_ref(),
            WorkflowEvent::Metadata(e) => e.fire_job_id.as_ref(),
            WorkflowEvent::Remote(e) => Some(&e.fire_job_id),
        }
    }

    /// Record the pre-allocated id of the future job. No-op for remote
    /// tracking events, whose job already exists.
    pub fn set_fire_job_id(&mut self, job_id: JobId) {
        match self {
            WorkflowEvent::Job(e) => e.fire_job_id = Some(job_id),
            WorkflowEvent::Metadata(e) => e.fire_job_id = Some(job_id),
            WorkflowEvent::Remote(_) => {}
        }
    }
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowEvent::Job(e) => write!(
                f,
                "[event {} rule:{}={} fire:{}@{}]",
                e.event_id,
                e.rule_job_id,
                e.rule_status,
                e.fire_job_id.as_ref().map(|j| j.as_str()).unwrap_or("-"),
                e.fire_site,
            ),
            WorkflowEvent::Metadata(e) => write!(
                f,
                "[event {} meta:{:?} fire:{}@{}]",
                e.event_id,
                e.query_reg_exs,
                e.fire_job_id.as_ref().map(|j| j.as_str()).unwrap_or("-"),
                e.fire_site,
            ),
            WorkflowEvent::Remote(e) => write!(
                f,
                "[event {} remote:{} native:{}@{}]",
                e.event_id, e.fire_job_id, e.native_job_id, e.fire_site,
            ),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
