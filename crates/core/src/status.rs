// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical job states and the status records jobs emit.
//!
//! Sites express job state in their own native vocabulary; lwf normalizes
//! everything into one canonical set so jobs can be chained across sites.
//! A job may emit many status records over its lifetime; INFO in particular
//! may repeat, carrying an opaque payload.

use crate::context::JobContext;
use crate::id::IdGen;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The canonical job state set. Each site provides a map from its native
/// status strings into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Unknown,
    /// On the shelf, known but not yet queued
    Ready,
    /// Queued at the site
    Pending,
    Running,
    /// Informational; non-terminal and may repeat
    Info,
    Finishing,
    /// Terminal
    Complete,
    /// Terminal
    Failed,
    /// Terminal
    Cancelled,
}

impl JobState {
    /// True for the three terminal states.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Complete | JobState::Failed | JobState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Unknown => "UNKNOWN",
            JobState::Ready => "READY",
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Info => "INFO",
            JobState::Finishing => "FINISHING",
            JobState::Complete => "COMPLETE",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
        }
    }

    /// Parse a canonical state name; unknown strings normalize to `Unknown`.
    pub fn parse(s: &str) -> JobState {
        match s {
            "READY" => JobState::Ready,
            "PENDING" => JobState::Pending,
            "RUNNING" => JobState::Running,
            "INFO" => JobState::Info,
            "FINISHING" => JobState::Finishing,
            "COMPLETE" => JobState::Complete,
            "FAILED" => JobState::Failed,
            "CANCELLED" => JobState::Cancelled,
            _ => JobState::Unknown,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-site mapping of native status strings to canonical states.
///
/// The identity map covers sites (like the local site) whose native strings
/// are already canonical. Unmapped native strings resolve to `Unknown`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMap {
    map: BTreeMap<String, JobState>,
}

impl StatusMap {
    /// The pass-through map: canonical names map to themselves.
    pub fn identity() -> Self {
        let mut map = BTreeMap::new();
        for state in [
            JobState::Unknown,
            JobState::Ready,
            JobState::Pending,
            JobState::Running,
            JobState::Info,
            JobState::Finishing,
            JobState::Complete,
            JobState::Failed,
            JobState::Cancelled,
        ] {
            map.insert(state.as_str().to_string(), state);
        }
        Self { map }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, JobState)>) -> Self {
        Self {
            map: pairs.into_iter().collect(),
        }
    }

    /// Map a native status string to its canonical state.
    pub fn normalize(&self, native: &str) -> JobState {
        self.map.get(native).copied().unwrap_or(JobState::Unknown)
    }
}

impl Default for StatusMap {
    fn default() -> Self {
        Self::identity()
    }
}

/// A single state observation of a job at a moment in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Unique per emission
    status_id: String,
    context: JobContext,
    status: JobState,
    /// Free-form status string from the site
    native_status: String,
    /// Opaque payload; e.g. a serialized metasheet for INFO
    #[serde(default, skip_serializing_if = "Option::is_none")]
    native_info: Option<String>,
    emit_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    received_time: Option<DateTime<Utc>>,
}

impl JobStatus {
    /// Build a status record with the native string defaulted to the
    /// canonical name and the emit time stamped now.
    pub fn new(context: JobContext, status: JobState) -> Self {
        Self {
            status_id: uuid::Uuid::new_v4().to_string(),
            context,
            status,
            native_status: status.as_str().to_string(),
            native_info: None,
            emit_time: Utc::now(),
            received_time: None,
        }
    }

    /// Build a status record with an explicit status id from the generator.
    pub fn with_ids(ids: &dyn IdGen, context: JobContext, status: JobState) -> Self {
        Self {
            status_id: ids.generate(),
            ..Self::new(context, status)
        }
    }

    pub fn with_native(mut self, native_status: impl Into<String>) -> Self {
        self.native_status = native_status.into();
        self
    }

    pub fn with_info(mut self, native_info: impl Into<String>) -> Self {
        self.native_info = Some(native_info.into());
        self
    }

    pub fn status_id(&self) -> &str {
        &self.status_id
    }

    pub fn context(&self) -> &JobContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut JobContext {
        &mut self.context
    }

    pub fn job_id(&self) -> &crate::id::JobId {
        self.context.job_id()
    }

    pub fn status(&self) -> JobState {
        self.status
    }

    pub fn native_status(&self) -> &str {
        &self.native_status
    }

    pub fn native_info(&self) -> Option<&str> {
        self.native_info.as_deref()
    }

    pub fn emit_time(&self) -> DateTime<Utc> {
        self.emit_time
    }

    pub fn set_emit_time(&mut self, t: DateTime<Utc>) {
        self.emit_time = t;
    }

    pub fn received_time(&self) -> Option<DateTime<Utc>> {
        self.received_time
    }

    pub fn mark_received(&mut self, t: DateTime<Utc>) {
        self.received_time = Some(t);
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[status ctx:{} value:{} native:{}]",
            self.context, self.status, self.native_status
        )
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
