// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Regex-capable metadata find with wildcard translation.

use crate::prelude::rig;
use std::collections::BTreeMap;

fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn wildcard_find_matches_suffix() {
    let rig = rig();
    for case in ["put1", "get1", "other"] {
        rig.mgr
            .notate_put_in("/tmp/f", None, props(&[("case", case)]))
            .await
            .unwrap();
    }
    let found = rig.mgr.find(&props(&[("case", "*1")]));
    assert_eq!(found.len(), 2);
    for sheet in &found {
        assert!(sheet.props().get("case").map(|v| v.ends_with('1')).unwrap_or(false));
    }
}

#[tokio::test]
async fn question_mark_matches_single_character() {
    let rig = rig();
    for case in ["put1", "put22", "pit1"] {
        rig.mgr
            .notate_put_in("/tmp/f", None, props(&[("case", case)]))
            .await
            .unwrap();
    }
    let found = rig.mgr.find(&props(&[("case", "put?")]));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].props().get("case").map(String::as_str), Some("put1"));
}

#[tokio::test]
async fn clauses_and_together() {
    let rig = rig();
    rig.mgr
        .notate_put_in("/tmp/a", None, props(&[("case", "put1"), ("stage", "raw")]))
        .await
        .unwrap();
    rig.mgr
        .notate_put_in("/tmp/b", None, props(&[("case", "put1"), ("stage", "cooked")]))
        .await
        .unwrap();
    let found = rig.mgr.find(&props(&[("case", "*1"), ("stage", "raw")]));
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn find_by_reserved_direction() {
    let rig = rig();
    rig.mgr.notate_put_in("/tmp/a", None, BTreeMap::new()).await.unwrap();
    rig.mgr.notate_get_in("/tmp/b", None).await.unwrap();
    let puts = rig.mgr.find(&props(&[("_direction", "put")]));
    let gets = rig.mgr.find(&props(&[("_direction", "get")]));
    assert_eq!(puts.len(), 1);
    assert_eq!(gets.len(), 1);
}

#[tokio::test]
async fn find_workflows_by_prop() {
    let rig = rig();
    let wf = lwf_core::Workflow::new(lwf_core::WorkflowId::new("wf-1"))
        .with_props(props(&[("metaprop1", "value1")]));
    rig.mgr.put_workflow(&wf).await.unwrap();
    rig.mgr
        .put_workflow(&lwf_core::Workflow::new(lwf_core::WorkflowId::new("wf-2")))
        .await
        .unwrap();
    let found = rig.mgr.find_workflows(&props(&[("metaprop1", "value?")]));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].workflow_id().as_str(), "wf-1");
}
