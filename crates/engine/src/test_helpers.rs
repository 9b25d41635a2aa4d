// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup for engine tests: a manager over a temp database with the
//! fake site registered and a fast processor cadence.

use crate::{LwfManager, ProcessorConfig, SiteConfig, SiteRegistry};
use lwf_adapters::FakeSiteHandle;
use lwf_core::CountingGen;
use lwf_storage::Database;
use std::sync::Arc;
use std::time::Duration;

/// Site config used by most tests: the builtin local site, a fake site,
/// and a remote fake site.
pub const TEST_SITES: &str = r#"
[fake]
class = "fake"
remote = false

[faraway]
class = "fake"
remote = true
"#;

pub fn fast_processor() -> ProcessorConfig {
    ProcessorConfig {
        min_interval: Duration::from_millis(25),
        max_interval: Duration::from_millis(200),
        step: Duration::from_millis(25),
        wake_guard: Duration::ZERO,
    }
}

pub struct TestRig {
    // Held for the lifetime of the rig so the database stays on disk.
    #[allow(dead_code)]
    pub dir: tempfile::TempDir,
    pub mgr: Arc<LwfManager>,
    pub fake: FakeSiteHandle,
}

/// Build a manager over a temp database. Must be called inside a tokio
/// runtime (the processor loop spawns immediately).
pub fn rig() -> TestRig {
    rig_with(TEST_SITES, fast_processor())
}

pub fn rig_with(user_toml: &str, processor_cfg: ProcessorConfig) -> TestRig {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("lwf.db")).unwrap();
    let config = SiteConfig::parse(Some(user_toml)).unwrap();
    let registry = SiteRegistry::with_defaults();
    let fake = FakeSiteHandle::new();
    let handle = fake.clone();
    registry.register(
        "fake",
        Arc::new(move |name, _props, midware| handle.build_site(name, midware)),
    );
    let mgr = LwfManager::start_with(
        db,
        config,
        registry,
        Arc::new(CountingGen::new("id")),
        processor_cfg,
    );
    TestRig { dir, mgr, fake }
}

/// Poll until `pred` holds or the timeout lapses.
pub async fn wait_until(timeout: Duration, mut pred: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if pred() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
