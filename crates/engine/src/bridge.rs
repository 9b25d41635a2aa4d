// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uniform site-driver invocation, in-process or isolated.
//!
//! A site whose descriptor carries a `venv` path runs under its own
//! dependency closure: the bridge spawns `<venv>/bin/lwf-site` with one
//! serialized request envelope and reads a serialized reply from stdout.
//! The reply follows a sentinel marker so the callee is free to log to
//! stdout before returning. Sites without a `venv` are constructed from
//! the driver registry and called directly.

use crate::config::SiteConfig;
use crate::error::EngineError;
use crate::registry::SiteRegistry;
use lwf_core::{codec, JobContext, JobDefn, JobId, JobStatus, Midware, Site, SiteError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

/// Separates incidental stdout from the serialized reply in isolated mode.
pub const RESULT_MARKER: &str = "RESULT_MARKER: ";

/// One invocation of a site-driver method, serializable for the isolated
/// transport. Non-primitive arguments travel as codec blobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InvokeRequest {
    /// `run.submit`: instantiate the definition under the given context.
    Submit { defn: String, context: String },
    /// Resolve a `pillar.method` entry point with managed status emission.
    ExecEndpoint { defn: String, context: String },
    /// `run.get_status` for a tracked job.
    GetStatus { job_id: JobId },
    /// `run.cancel`.
    Cancel { job_id: JobId },
}

/// Reply envelope from an isolated invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InvokeReply {
    /// Success, with an optional codec blob of the return value.
    Ok { value: Option<String> },
    /// The distinguished job-not-found condition.
    NotFound { job_id: String },
    /// Any other driver failure.
    Err { message: String },
}

/// Invokes site drivers on behalf of the processor and the façade.
pub struct SiteBridge {
    config: Arc<SiteConfig>,
    registry: Arc<SiteRegistry>,
}

impl SiteBridge {
    pub fn new(config: Arc<SiteConfig>, registry: Arc<SiteRegistry>) -> Self {
        Self { config, registry }
    }

    /// Construct the named site's in-process drivers.
    pub fn resolve(&self, name: &str, midware: Arc<dyn Midware>) -> Result<Site, EngineError> {
        let props = self
            .config
            .site(name)
            .ok_or_else(|| EngineError::SiteNotFound(name.to_string()))?;
        self.registry.build(name, props, midware)
    }

    /// Submit a definition to a site, isolated or not.
    pub async fn submit(
        &self,
        site_name: &str,
        defn: &JobDefn,
        context: &JobContext,
        midware: Arc<dyn Midware>,
    ) -> Result<(), EngineError> {
        if let Some(venv) = self.config.venv(site_name) {
            let request = InvokeRequest::Submit {
                defn: codec::encode(defn)?,
                context: codec::encode(context)?,
            };
            self.invoke_isolated(venv, site_name, &request).await?;
            return Ok(());
        }
        let site = self.resolve(site_name, midware)?;
        site.run.submit(defn, context).await?;
        Ok(())
    }

    /// Current status of a job as its site reports it.
    /// `EngineError::RemoteJobNotFound` is the distinguished terminal case.
    pub async fn poll_status(
        &self,
        site_name: &str,
        job_id: &JobId,
        midware: Arc<dyn Midware>,
    ) -> Result<JobStatus, EngineError> {
        if let Some(venv) = self.config.venv(site_name) {
            let request = InvokeRequest::GetStatus {
                job_id: job_id.clone(),
            };
            let value = self.invoke_isolated(venv, site_name, &request).await?;
            let blob = value.ok_or_else(|| {
                EngineError::InvalidRequest("isolated get_status returned no value".into())
            })?;
            return Ok(codec::decode(&blob)?);
        }
        let site = self.resolve(site_name, midware)?;
        match site.run.get_status(job_id).await {
            Ok(status) => Ok(status),
            Err(SiteError::JobNotFound(id)) => Err(EngineError::RemoteJobNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Ask a site to cancel a job; sites may refuse.
    pub async fn cancel(
        &self,
        site_name: &str,
        job_id: &JobId,
        midware: Arc<dyn Midware>,
    ) -> Result<bool, EngineError> {
        if let Some(venv) = self.config.venv(site_name) {
            let request = InvokeRequest::Cancel {
                job_id: job_id.clone(),
            };
            let value = self.invoke_isolated(venv, site_name, &request).await?;
            return match value {
                Some(blob) => Ok(codec::decode(&blob)?),
                None => Ok(false),
            };
        }
        let site = self.resolve(site_name, midware)?;
        Ok(site.run.cancel(job_id).await?)
    }

    /// Run one serialized invocation in the site's isolated environment and
    /// return the reply payload.
    pub async fn invoke_isolated(
        &self,
        venv: &Path,
        site_name: &str,
        request: &InvokeRequest,
    ) -> Result<Option<String>, EngineError> {
        let helper = venv.join("bin").join("lwf-site");
        let envelope = codec::encode(request)?;
        info!(site = site_name, helper = %helper.display(), "isolated invocation");

        let output = Command::new(&helper)
            .arg(&envelope)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| EngineError::Isolated {
                code: None,
                detail: format!("spawn {}: {e}", helper.display()),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(EngineError::Isolated {
                code: output.status.code(),
                detail: format!("stdout: {stdout}\nstderr: {stderr}"),
            });
        }

        let reply_blob = parse_marked_reply(&stdout).ok_or_else(|| EngineError::Isolated {
            code: output.status.code(),
            detail: format!("no result marker in output: {stdout}"),
        })?;
        debug!(site = site_name, "isolated reply received");
        match codec::decode::<InvokeReply>(reply_blob)? {
            InvokeReply::Ok { value } => Ok(value),
            InvokeReply::NotFound { job_id } => Err(EngineError::RemoteJobNotFound(job_id)),
            InvokeReply::Err { message } => Err(EngineError::Isolated {
                code: output.status.code(),
                detail: message,
            }),
        }
    }
}

/// Extract the serialized reply following the last result marker.
pub fn parse_marked_reply(stdout: &str) -> Option<&str> {
    stdout
        .rsplit(RESULT_MARKER)
        .next()
        .filter(|rest| *rest != stdout)
        .map(str::trim)
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
