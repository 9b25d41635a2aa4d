// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver registry: maps a descriptor's `class` key to a site constructor.
//!
//! The config names drivers by class; the registry holds the constructors
//! compiled into this process. Unknown classes fail site resolution.

use crate::config::SiteProps;
use crate::error::EngineError;
use lwf_core::{Midware, Site};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds a [`Site`] from its name, descriptor, and a middleware handle.
pub type DriverFactory =
    Arc<dyn Fn(&str, &SiteProps, Arc<dyn Midware>) -> Site + Send + Sync>;

/// Process-local registry of driver classes.
pub struct SiteRegistry {
    factories: RwLock<BTreeMap<String, DriverFactory>>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registry preloaded with the drivers that ship in this workspace.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(
            "local",
            Arc::new(|name, _props, midware| lwf_adapters::local_site(name, midware)),
        );
        registry
    }

    pub fn register(&self, class: &str, factory: DriverFactory) {
        self.factories.write().insert(class.to_string(), factory);
    }

    /// Construct the named site from its descriptor.
    pub fn build(
        &self,
        name: &str,
        props: &SiteProps,
        midware: Arc<dyn Midware>,
    ) -> Result<Site, EngineError> {
        let class = props
            .class
            .clone()
            .ok_or_else(|| EngineError::Config(format!("site {name} has no class")))?;
        let factory = self
            .factories
            .read()
            .get(&class)
            .cloned()
            .ok_or(EngineError::DriverNotFound(class))?;
        let mut site = factory(name, props, midware);
        site.remote = props.remote;
        Ok(site)
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
