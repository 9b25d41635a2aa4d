// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote-site tracking: auto-installed polling events and the
//! job-not-found terminal clause.

use crate::prelude::{rig, wait_until};
use lwf_core::{EventPillar, JobContext, JobId, JobState, Midware};
use std::time::Duration;

#[tokio::test]
async fn first_status_from_remote_site_installs_tracker() {
    let rig = rig();
    let mut ctx = JobContext::with_id("r-1");
    ctx.set_site_name("faraway");
    rig.mgr.emit_status(&ctx, JobState::Pending, None, None).await;

    let trackers: Vec<_> = rig
        .mgr
        .active_events()
        .into_iter()
        .filter(|e| e.pillar() == EventPillar::Remote)
        .collect();
    assert_eq!(trackers.len(), 1);
}

#[tokio::test]
async fn local_site_installs_no_tracker() {
    let rig = rig();
    let ctx = JobContext::with_id("l-1");
    rig.mgr.emit_status(&ctx, JobState::Pending, None, None).await;
    assert!(rig
        .mgr
        .active_events()
        .iter()
        .all(|e| e.pillar() != EventPillar::Remote));
}

#[tokio::test]
async fn not_found_poll_removes_tracker_without_forcing_status() {
    let rig = rig();
    let mut ctx = JobContext::with_id("r-gone");
    ctx.set_site_name("faraway");
    rig.mgr.emit_status(&ctx, JobState::Running, None, None).await;
    rig.fake.set_not_found(JobId::new("r-gone"));

    assert!(
        wait_until(Duration::from_secs(10), || {
            rig.mgr
                .active_events()
                .iter()
                .all(|e| e.pillar() != EventPillar::Remote)
        })
        .await,
        "tracker never removed"
    );
    // no status was forced onto the job
    let latest = rig.mgr.get_status(&JobId::new("r-gone")).unwrap();
    assert_eq!(latest.status(), JobState::Running);
    // the removal left a log record
    let logs = rig.mgr.logs_for_job(&JobId::new("r-gone"));
    assert!(logs.iter().any(|l| l.message.contains("not found")));
}

#[tokio::test]
async fn terminal_poll_removes_tracker() {
    let rig = rig();
    let mut ctx = JobContext::with_id("r-done");
    ctx.set_site_name("faraway");
    rig.mgr.emit_status(&ctx, JobState::Running, None, None).await;
    rig.fake.set_status(JobId::new("r-done"), JobState::Complete);

    assert!(
        wait_until(Duration::from_secs(10), || {
            rig.mgr
                .active_events()
                .iter()
                .all(|e| e.pillar() != EventPillar::Remote)
        })
        .await
    );
}
