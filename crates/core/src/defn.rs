// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inert description of work, instantiated at runtime by a site.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a [`JobDefn`] entry point is interpreted by the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryPointType {
    /// A shell command line
    Shell,
    /// A `pillar.method` dotted name on the site driver
    Site,
    /// A site/app-specific opaque string
    String,
}

/// The four site capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    Auth,
    Run,
    Repo,
    Spin,
}

impl Pillar {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pillar::Auth => "auth",
            Pillar::Run => "run",
            Pillar::Repo => "repo",
            Pillar::Spin => "spin",
        }
    }

    pub fn parse(s: &str) -> Option<Pillar> {
        match s {
            "auth" => Some(Pillar::Auth),
            "run" => Some(Pillar::Run),
            "repo" => Some(Pillar::Repo),
            "spin" => Some(Pillar::Spin),
            _ => None,
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The static definition of a job.
///
/// Arbitrary site-specific arguments can be baked in; it is ultimately the
/// site's run subsystem that interprets the definition. No portability
/// across sites is presumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefn {
    entry_point: String,
    entry_point_type: EntryPointType,
    #[serde(default)]
    job_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compute_type: Option<String>,
    #[serde(default)]
    name: String,
}

impl JobDefn {
    /// A shell-command definition.
    pub fn shell(entry_point: impl Into<String>) -> Self {
        Self::new(entry_point, EntryPointType::Shell, Vec::new())
    }

    /// A `pillar.method` site-endpoint definition.
    pub fn site_endpoint(entry_point: impl Into<String>, job_args: Vec<String>) -> Self {
        Self::new(entry_point, EntryPointType::Site, job_args)
    }

    pub fn new(
        entry_point: impl Into<String>,
        entry_point_type: EntryPointType,
        job_args: Vec<String>,
    ) -> Self {
        Self {
            entry_point: entry_point.into(),
            entry_point_type,
            job_args,
            site_name: None,
            compute_type: None,
            name: String::new(),
        }
    }

    pub fn with_args(mut self, job_args: Vec<String>) -> Self {
        self.job_args = job_args;
        self
    }

    pub fn with_site(mut self, site_name: impl Into<String>) -> Self {
        self.site_name = Some(site_name.into());
        self
    }

    pub fn with_compute_type(mut self, compute_type: impl Into<String>) -> Self {
        self.compute_type = Some(compute_type.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn entry_point_type(&self) -> EntryPointType {
        self.entry_point_type
    }

    pub fn job_args(&self) -> &[String] {
        &self.job_args
    }

    pub fn site_name(&self) -> Option<&str> {
        self.site_name.as_deref()
    }

    pub fn compute_type(&self) -> Option<&str> {
        self.compute_type.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Split a Site-type entry point into its pillar and method parts.
    ///
    /// Returns `None` for non-Site definitions, unknown pillars, or entry
    /// points without a dot.
    pub fn site_method(&self) -> Option<(Pillar, &str)> {
        if self.entry_point_type != EntryPointType::Site {
            return None;
        }
        let (pillar, method) = self.entry_point.split_once('.')?;
        if method.is_empty() {
            return None;
        }
        Some((Pillar::parse(pillar)?, method))
    }

    /// The full command line for a Shell-type definition: entry point with
    /// the job args appended.
    pub fn command_line(&self) -> String {
        let mut cmd = self.entry_point.clone();
        for arg in &self.job_args {
            cmd.push(' ');
            cmd.push_str(arg);
        }
        cmd
    }
}

impl fmt::Display for JobDefn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[defn entry:{} type:{:?} args:{:?} site:{}]",
            self.entry_point,
            self.entry_point_type,
            self.job_args,
            self.site_name.as_deref().unwrap_or("-"),
        )
    }
}

#[cfg(test)]
#[path = "defn_tests.rs"]
mod tests;
