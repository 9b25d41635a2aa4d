// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered site configuration.
//!
//! Compiled-in defaults describe the local site and the service section; a
//! user file at `~/.lwf/sites.toml` can define custom sites or override a
//! shipped one. Overrides replace whole site tables, matching how the user
//! file is meant to be authored (one `[site]` table per site).

use crate::error::EngineError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Built-in descriptor set: the service section plus the local site.
const BUILTIN_TOML: &str = r#"
[lwf]
host = "127.0.0.1"
port = 3000

[local]
class = "local"
remote = false
"#;

/// Environment variable letting boundary clients target a non-default
/// service endpoint instead of the configured `[lwf]` host/port.
pub const SERVICE_URL_ENV: &str = "LWF_SERVICE_URL";

/// The per-user lwf state directory (`~/.lwf`).
pub fn state_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lwf")
}

/// Service section of the configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LwfSection {
    pub host: String,
    pub port: u16,
}

impl Default for LwfSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Descriptor for one named site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteProps {
    /// Driver class in the process driver registry.
    #[serde(default)]
    pub class: Option<String>,
    /// Remote sites get automatic status polling installed on submit.
    #[serde(default)]
    pub remote: bool,
    /// Isolation path; presence routes invocations through a subprocess
    /// with its own dependency closure.
    #[serde(default)]
    pub venv: Option<PathBuf>,
    /// Site-specific free-form properties.
    #[serde(flatten)]
    pub extra: BTreeMap<String, toml::Value>,
}

/// The combined, layered site configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    lwf: LwfSection,
    sites: BTreeMap<String, SiteProps>,
}

impl SiteConfig {
    /// Load defaults overlaid with the user file at its well-known path.
    pub fn load() -> Result<Self, EngineError> {
        Self::load_from(&state_dir().join("sites.toml"))
    }

    /// Load defaults overlaid with a specific user file (absent is fine).
    pub fn load_from(user_path: &Path) -> Result<Self, EngineError> {
        let user = if user_path.exists() {
            Some(
                std::fs::read_to_string(user_path)
                    .map_err(|e| EngineError::Config(format!("{}: {e}", user_path.display())))?,
            )
        } else {
            None
        };
        Self::parse(user.as_deref())
    }

    /// Built-in defaults only.
    pub fn builtin() -> Self {
        // The compiled-in descriptor set always parses.
        Self::parse(None).unwrap_or_else(|_| Self {
            lwf: LwfSection::default(),
            sites: BTreeMap::new(),
        })
    }

    /// Parse the builtin descriptors with an optional user overlay.
    pub fn parse(user_toml: Option<&str>) -> Result<Self, EngineError> {
        let mut table: toml::Table = toml::from_str(BUILTIN_TOML)
            .map_err(|e| EngineError::Config(format!("builtin config: {e}")))?;
        if let Some(user) = user_toml {
            let user_table: toml::Table =
                toml::from_str(user).map_err(|e| EngineError::Config(format!("user config: {e}")))?;
            // Site-table granularity: a user [site] replaces the default one.
            for (name, value) in user_table {
                table.insert(name, value);
            }
        }

        let mut lwf = LwfSection::default();
        let mut sites = BTreeMap::new();
        for (name, value) in table {
            if name == "lwf" {
                lwf = value
                    .try_into()
                    .map_err(|e| EngineError::Config(format!("[lwf]: {e}")))?;
            } else {
                let props: SiteProps = value
                    .try_into()
                    .map_err(|e| EngineError::Config(format!("[{name}]: {e}")))?;
                sites.insert(name, props);
            }
        }
        Ok(Self { lwf, sites })
    }

    pub fn lwf(&self) -> &LwfSection {
        &self.lwf
    }

    /// Descriptor for a named site.
    pub fn site(&self, name: &str) -> Option<&SiteProps> {
        self.sites.get(name)
    }

    /// True when the named site is flagged remote.
    pub fn is_remote(&self, name: &str) -> bool {
        self.sites.get(name).map(|s| s.remote).unwrap_or(false)
    }

    /// Isolation path for the named site, when configured.
    pub fn venv(&self, name: &str) -> Option<&Path> {
        self.sites.get(name).and_then(|s| s.venv.as_deref())
    }

    pub fn site_names(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
