// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow aggregation: latest-per-job selection and the dashboard's
//! INFO-only presentation rule.

use crate::prelude::rig;
use lwf_core::{JobContext, JobState, Midware, WorkflowId};

#[tokio::test]
async fn info_only_job_presents_as_complete() {
    let rig = rig();
    let ctx = JobContext::with_id("j-info");
    rig.mgr
        .emit_status(&ctx, JobState::Info, None, Some("payload"))
        .await;
    // the workflow record is created by hand; INFO does not auto-create
    rig.mgr
        .put_workflow(&lwf_core::Workflow::new(WorkflowId::new("j-info")))
        .await
        .unwrap();

    let dump = rig.mgr.dump_workflow(&WorkflowId::new("j-info")).unwrap();
    assert_eq!(dump.jobs.len(), 1);
    assert_eq!(dump.jobs[0].status.status(), JobState::Info);
    assert_eq!(dump.jobs[0].effective_state, JobState::Complete);
}

#[tokio::test]
async fn late_info_does_not_unfinish_a_job() {
    let rig = rig();
    let ctx = JobContext::with_id("j-done");
    rig.mgr.emit_status(&ctx, JobState::Ready, None, None).await;
    rig.mgr.emit_status(&ctx, JobState::Complete, None, None).await;
    rig.mgr
        .emit_status(&ctx, JobState::Info, None, Some("trailing"))
        .await;

    let dump = rig.mgr.dump_workflow(&WorkflowId::new("j-done")).unwrap();
    assert_eq!(dump.jobs.len(), 1);
    assert_eq!(dump.jobs[0].status.status(), JobState::Complete);
    assert_eq!(dump.jobs[0].effective_state, JobState::Complete);
}

#[tokio::test]
async fn status_history_is_newest_first() {
    let rig = rig();
    let ctx = JobContext::with_id("j-hist");
    for state in [
        JobState::Ready,
        JobState::Pending,
        JobState::Running,
        JobState::Complete,
    ] {
        rig.mgr.emit_status(&ctx, state, None, None).await;
    }
    let history = rig.mgr.all_statuses(ctx.job_id());
    assert_eq!(history.len(), 4);
    for pair in history.windows(2) {
        assert!(pair[0].emit_time() >= pair[1].emit_time());
    }
    assert_eq!(history[0].status(), JobState::Complete);
}

#[tokio::test]
async fn dump_groups_multiple_jobs() {
    let rig = rig();
    let root = JobContext::with_id("wf");
    rig.mgr.emit_status(&root, JobState::Ready, None, None).await;
    rig.mgr.emit_status(&root, JobState::Complete, None, None).await;

    let mut worker = JobContext::with_id("wf-worker");
    worker.set_workflow_id(WorkflowId::new("wf"));
    rig.mgr.emit_status(&worker, JobState::Running, None, None).await;

    let dump = rig.mgr.dump_workflow(&WorkflowId::new("wf")).unwrap();
    assert_eq!(dump.jobs.len(), 2);
    let states: Vec<JobState> = dump.jobs.iter().map(|j| j.effective_state).collect();
    assert!(states.contains(&JobState::Complete));
    assert!(states.contains(&JobState::Running));
}
