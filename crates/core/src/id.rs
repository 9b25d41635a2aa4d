// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque identifiers for jobs, workflows, events, and metasheets.
//!
//! Ids are plain strings under the hood: they cross the codec, the store's
//! key column, and child-process environments, so nothing richer than a
//! newtype survives the trip. Each kind gets its own type so a workflow id
//! cannot be handed to a status lookup by accident.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

opaque_id! {
    /// Canonical id of a job instance. Assigned once, when the job's
    /// context is created or a trigger pre-allocates its future job, and
    /// never reassigned.
    JobId
}

opaque_id! {
    /// Id of a workflow, the grouping a chain of jobs shares. A fresh
    /// context self-roots its workflow id to its own job id.
    WorkflowId
}

opaque_id! {
    /// Id of a registered trigger; the handle used to unregister it.
    EventId
}

opaque_id! {
    /// Id of one metasheet emission.
    SheetId
}

/// Source of fresh opaque identifiers.
pub trait IdGen: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUIDs; the production source. Collision-safe across sites
/// without coordination.
#[derive(Clone, Default)]
pub struct UuidGen;

impl IdGen for UuidGen {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Prefixed counter for deterministic ids in tests.
#[derive(Clone)]
pub struct CountingGen {
    prefix: String,
    next: Arc<AtomicU64>,
}

impl CountingGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl IdGen for CountingGen {
    fn generate(&self) -> String {
        format!("{}-{}", self.prefix, self.next.fetch_add(1, Ordering::SeqCst))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
