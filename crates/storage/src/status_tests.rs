// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::Database;
use chrono::{Duration, Utc};
use lwf_core::{JobContext, JobId, JobState, JobStatus, WorkflowId};

fn temp_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("lwf.db")).unwrap();
    (dir, db)
}

fn status(job: &str, state: JobState) -> JobStatus {
    JobStatus::new(JobContext::with_id(job), state)
}

#[tokio::test]
async fn put_then_get_latest() {
    let (_dir, db) = temp_db();
    db.put_job_status(&status("j1", JobState::Ready)).await;
    db.put_job_status(&status("j1", JobState::Running)).await;
    let latest = db.job_status(&JobId::new("j1")).unwrap();
    assert_eq!(latest.status(), JobState::Running);
}

#[tokio::test]
async fn missing_job_has_no_status() {
    let (_dir, db) = temp_db();
    assert!(db.job_status(&JobId::new("nope")).is_none());
}

#[tokio::test]
async fn history_is_newest_first() {
    let (_dir, db) = temp_db();
    for state in [JobState::Ready, JobState::Pending, JobState::Running, JobState::Complete] {
        db.put_job_status(&status("j1", state)).await;
    }
    let history = db.all_job_statuses(&JobId::new("j1"));
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].status(), JobState::Complete);
    assert_eq!(history[3].status(), JobState::Ready);
    // Monotonically non-increasing emit times
    for pair in history.windows(2) {
        assert!(pair[0].emit_time() >= pair[1].emit_time());
    }
}

#[tokio::test]
async fn history_is_per_job() {
    let (_dir, db) = temp_db();
    db.put_job_status(&status("j1", JobState::Running)).await;
    db.put_job_status(&status("j2", JobState::Complete)).await;
    assert_eq!(db.all_job_statuses(&JobId::new("j1")).len(), 1);
    assert_eq!(db.all_job_statuses(&JobId::new("j2")).len(), 1);
}

#[tokio::test]
async fn terminal_then_info_is_still_recorded() {
    let (_dir, db) = temp_db();
    db.put_job_status(&status("j1", JobState::Complete)).await;
    db.put_job_status(&status("j1", JobState::Info)).await;
    let history = db.all_job_statuses(&JobId::new("j1"));
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn statuses_for_workflow_filters_by_context() {
    let (_dir, db) = temp_db();
    let a = JobContext::with_id("a");
    let b = JobContext::with_id("b").child_of(&a);
    let other = JobContext::with_id("other");
    db.put_job_status(&JobStatus::new(a.clone(), JobState::Complete)).await;
    db.put_job_status(&JobStatus::new(b, JobState::Running)).await;
    db.put_job_status(&JobStatus::new(other, JobState::Running)).await;
    let wf = db.statuses_for_workflow(&WorkflowId::new("a"));
    assert_eq!(wf.len(), 2);
    assert!(wf.iter().all(|s| s.context().workflow_id().as_str() == "a"));
}

#[tokio::test]
async fn roundtrip_preserves_emit_time() {
    let (_dir, db) = temp_db();
    let mut s = status("j1", JobState::Info);
    let emit = Utc::now() - Duration::seconds(30);
    s.set_emit_time(emit);
    db.put_job_status(&s).await;
    let back = db.job_status(&JobId::new("j1")).unwrap();
    assert_eq!(back.emit_time(), emit);
}
