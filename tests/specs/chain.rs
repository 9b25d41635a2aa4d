// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job chaining: A completes, which fires B, which fires C.

use crate::prelude::{rig, wait_until};
use lwf_core::{JobDefn, JobEvent, JobState, WorkflowEvent};
use std::time::Duration;

#[tokio::test]
async fn chain_of_three_shares_one_workflow() {
    let rig = rig();

    // Submit A and register the chain before it finishes.
    let a = rig
        .mgr
        .submit(&JobDefn::shell("echo A"), None, None)
        .await
        .unwrap();
    let a_id = a.job_id().clone();

    let b_ready = rig
        .mgr
        .set_event(WorkflowEvent::Job(JobEvent::new(
            a_id.clone(),
            JobState::Complete,
            JobDefn::shell("echo B"),
            "local",
        )))
        .await
        .unwrap();
    let b_id = b_ready.job_id().clone();

    let c_ready = rig
        .mgr
        .set_event(WorkflowEvent::Job(JobEvent::new(
            b_id.clone(),
            JobState::Complete,
            JobDefn::shell("echo C"),
            "local",
        )))
        .await
        .unwrap();
    let c_id = c_ready.job_id().clone();

    // All three jobs run to completion.
    for job_id in [&a_id, &b_id, &c_id] {
        assert!(
            wait_until(Duration::from_secs(30), || {
                rig.mgr
                    .get_status(job_id)
                    .map(|s| s.status() == JobState::Complete)
                    .unwrap_or(false)
            })
            .await,
            "job {job_id} never completed"
        );
    }

    // One workflow threads the chain, rooted at A.
    let a_final = rig.mgr.get_status(&a_id).unwrap();
    let b_final = rig.mgr.get_status(&b_id).unwrap();
    let c_final = rig.mgr.get_status(&c_id).unwrap();
    let wf = a_final.context().workflow_id().clone();
    assert_eq!(b_final.context().workflow_id(), &wf);
    assert_eq!(c_final.context().workflow_id(), &wf);

    // Parent links follow the chain.
    assert_eq!(b_final.context().parent_job_id(), Some(&a_id));
    assert_eq!(c_final.context().parent_job_id(), Some(&b_id));

    // Both triggers were consumed.
    assert!(wait_until(Duration::from_secs(5), || {
        rig.mgr.active_events().is_empty()
    })
    .await);
}

#[tokio::test]
async fn trigger_registered_after_completion_still_fires() {
    let rig = rig();
    let a = rig
        .mgr
        .submit(&JobDefn::shell("true"), None, None)
        .await
        .unwrap();
    let a_id = a.job_id().clone();
    assert!(
        wait_until(Duration::from_secs(30), || {
            rig.mgr
                .get_status(&a_id)
                .map(|s| s.status() == JobState::Complete)
                .unwrap_or(false)
        })
        .await
    );

    // The rule status is already history when the trigger registers.
    let b_ready = rig
        .mgr
        .set_event(WorkflowEvent::Job(JobEvent::new(
            a_id.clone(),
            JobState::Complete,
            JobDefn::shell("true"),
            "local",
        )))
        .await
        .unwrap();
    assert_eq!(b_ready.status(), JobState::Ready);
    let b_id = b_ready.job_id().clone();
    assert!(
        wait_until(Duration::from_secs(30), || {
            rig.mgr
                .get_status(&b_id)
                .map(|s| s.status() == JobState::Complete)
                .unwrap_or(false)
        })
        .await
    );
}
