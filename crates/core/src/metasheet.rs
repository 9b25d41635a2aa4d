// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metadata attached to a data object under management.

use crate::id::{JobId, SheetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Framework-controlled property keys. Clients may extend a sheet's props
/// but must not rewrite these.
pub mod reserved {
    pub const DIRECTION: &str = "_direction";
    pub const WORKFLOW_ID: &str = "_workflowId";
    pub const JOB_ID: &str = "_jobId";
    pub const SITE_NAME: &str = "_siteName";
    pub const LOCAL_PATH: &str = "_localPath";
    pub const SITE_OBJ_PATH: &str = "_siteObjPath";
}

/// A collection of name=value pairs describing one data object, attributed
/// to the job that touched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metasheet {
    sheet_id: SheetId,
    job_id: JobId,
    site_name: String,
    local_url: String,
    site_url: String,
    #[serde(default)]
    props: BTreeMap<String, String>,
}

impl Metasheet {
    pub fn new(
        site_name: impl Into<String>,
        local_url: impl Into<String>,
        site_url: impl Into<String>,
        props: BTreeMap<String, String>,
    ) -> Self {
        Self {
            sheet_id: SheetId::new(uuid::Uuid::new_v4().to_string()),
            job_id: JobId::default(),
            site_name: site_name.into(),
            local_url: local_url.into(),
            site_url: site_url.into(),
            props,
        }
    }

    pub fn sheet_id(&self) -> &SheetId {
        &self.sheet_id
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn set_job_id(&mut self, job_id: JobId) {
        self.job_id = job_id;
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn local_url(&self) -> &str {
        &self.local_url
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn props(&self) -> &BTreeMap<String, String> {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.props
    }

    /// Insert a framework-reserved property.
    pub fn set_reserved(&mut self, key: &'static str, value: impl Into<String>) {
        self.props.insert(key.to_string(), value.into());
    }
}

impl std::fmt::Display for Metasheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.props)
    }
}

#[cfg(test)]
#[path = "metasheet_tests.rs"]
mod tests;
