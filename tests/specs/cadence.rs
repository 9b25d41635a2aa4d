// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adaptive processor cadence: idle stretches, activity resets.

use crate::prelude::{rig, wait_until};
use lwf_core::{JobContext, JobState, Midware};
use std::time::Duration;

#[tokio::test]
async fn idle_cycles_stretch_to_the_maximum() {
    let rig = rig();
    let processor = rig.mgr.processor().unwrap().clone();
    assert!(
        wait_until(Duration::from_secs(10), || {
            processor.interval() >= Duration::from_millis(200)
        })
        .await,
        "interval never reached the maximum"
    );
}

#[tokio::test]
async fn emit_wakes_the_processor_and_resets_cadence() {
    let rig = rig();
    let processor = rig.mgr.processor().unwrap().clone();
    // stretch first
    assert!(
        wait_until(Duration::from_secs(10), || {
            processor.interval() >= Duration::from_millis(200)
        })
        .await
    );
    // any emission wakes the scanner and resets the interval
    let ctx = JobContext::with_id("j-wake");
    rig.mgr.emit_status(&ctx, JobState::Running, None, None).await;
    assert_eq!(processor.interval(), Duration::from_millis(25));
}

#[tokio::test]
async fn busy_cycles_hold_the_minimum() {
    let rig = rig();
    let processor = rig.mgr.processor().unwrap().clone();
    // a remote job being polled keeps every cycle busy
    let mut ctx = JobContext::with_id("r-busy");
    ctx.set_site_name("faraway");
    rig.mgr.emit_status(&ctx, JobState::Running, None, None).await;
    rig.fake
        .set_status(lwf_core::JobId::new("r-busy"), JobState::Running);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(processor.interval(), Duration::from_millis(25));
}
