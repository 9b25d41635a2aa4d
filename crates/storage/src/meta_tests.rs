// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::Database;
use lwf_core::metasheet::reserved;
use lwf_core::{JobId, Metasheet};
use std::collections::BTreeMap;

fn temp_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("lwf.db")).unwrap();
    (dir, db)
}

fn sheet(pairs: &[(&str, &str)]) -> Metasheet {
    let props: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut m = Metasheet::new("local", "/tmp/f", "", props);
    m.set_job_id(JobId::new("j-1"));
    m
}

fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn find_matches_single_clause() {
    let (_dir, db) = temp_db();
    db.put_metasheet(&sheet(&[("sampleId", "X7")])).await;
    db.put_metasheet(&sheet(&[("sampleId", "Z9")])).await;
    let found = db.find_metasheets(&query(&[("sampleId", "X7")]));
    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].props().get("sampleId").map(String::as_str),
        Some("X7")
    );
}

#[tokio::test]
async fn find_and_combines_clauses() {
    let (_dir, db) = temp_db();
    db.put_metasheet(&sheet(&[("sampleId", "X7"), ("stage", "raw")])).await;
    db.put_metasheet(&sheet(&[("sampleId", "X7"), ("stage", "cooked")])).await;
    let found = db.find_metasheets(&query(&[("sampleId", "X7"), ("stage", "raw")]));
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn find_with_wildcard() {
    let (_dir, db) = temp_db();
    db.put_metasheet(&sheet(&[("case", "put1")])).await;
    db.put_metasheet(&sheet(&[("case", "get1")])).await;
    db.put_metasheet(&sheet(&[("case", "other")])).await;
    let found = db.find_metasheets(&query(&[("case", "*1")]));
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn find_empty_query_returns_everything() {
    let (_dir, db) = temp_db();
    db.put_metasheet(&sheet(&[("a", "1")])).await;
    db.put_metasheet(&sheet(&[("b", "2")])).await;
    assert_eq!(db.find_metasheets(&BTreeMap::new()).len(), 2);
}

#[tokio::test]
async fn find_on_attribution_fields() {
    let (_dir, db) = temp_db();
    db.put_metasheet(&sheet(&[("x", "1")])).await;
    let found = db.find_metasheets(&query(&[("jobId", "j-1")]));
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn find_on_reserved_workflow_prop() {
    let (_dir, db) = temp_db();
    let mut m = sheet(&[("x", "1")]);
    m.set_reserved(reserved::WORKFLOW_ID, "wf-9");
    db.put_metasheet(&m).await;
    db.put_metasheet(&sheet(&[("x", "2")])).await;
    let found = db.find_metasheets(&query(&[("_workflowId", "wf-9")]));
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn notate_twice_appends_two_sheets() {
    let (_dir, db) = temp_db();
    db.put_metasheet(&sheet(&[("sampleId", "X7")])).await;
    db.put_metasheet(&sheet(&[("sampleId", "X7")])).await;
    let found = db.find_metasheets(&query(&[("sampleId", "X7")]));
    assert_eq!(found.len(), 2);
    assert_ne!(found[0].sheet_id(), found[1].sheet_id());
}
