// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test rig: a manager over a temp database with the local site,
//! a scriptable fake site, and a remote fake site.

use lwf_adapters::FakeSiteHandle;
use lwf_core::CountingGen;
use lwf_engine::{LwfManager, ProcessorConfig, SiteConfig, SiteRegistry};
use lwf_storage::Database;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_SITES: &str = r#"
[fake]
class = "fake"
remote = false

[faraway]
class = "fake"
remote = true
"#;

pub struct Rig {
    #[allow(dead_code)]
    pub dir: tempfile::TempDir,
    pub mgr: Arc<LwfManager>,
    pub fake: FakeSiteHandle,
}

pub fn rig() -> Rig {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("lwf.db")).unwrap();
    let config = SiteConfig::parse(Some(TEST_SITES)).unwrap();
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
        ProcessorConfig {
            min_interval: Duration::from_millis(25),
            max_interval: Duration::from_millis(200),
            step: Duration::from_millis(25),
            wake_guard: Duration::ZERO,
        },
    );
    Rig { dir, mgr, fake }
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
