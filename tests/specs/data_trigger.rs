// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data triggers: notated metadata fires a registered MetadataEvent.

use crate::prelude::{rig, wait_until};
use lwf_core::{JobDefn, JobState, MetadataEvent, Workflow, WorkflowEvent, WorkflowId};
use std::collections::BTreeMap;
use std::time::Duration;

#[tokio::test]
async fn notated_metadata_fires_exactly_one_job_in_the_workflow() {
    let rig = rig();
    let wf = WorkflowId::new("W");
    rig.mgr.put_workflow(&Workflow::new(wf.clone())).await.unwrap();

    let ready = rig
        .mgr
        .set_event(WorkflowEvent::Metadata(MetadataEvent::new(
            BTreeMap::from([("sampleId".to_string(), "X7".to_string())]),
            JobDefn::shell("echo hit"),
            "local",
        )))
        .await
        .unwrap();
    let fired_id = ready.job_id().clone();

    rig.mgr
        .notate_put_in(
            "/tmp/f",
            Some(&wf),
            BTreeMap::from([("sampleId".to_string(), "X7".to_string())]),
        )
        .await
        .unwrap();

    // Exactly one fired job, carrying the notating workflow.
    assert!(
        wait_until(Duration::from_secs(30), || {
            rig.mgr
                .get_status(&fired_id)
                .map(|s| s.status() == JobState::Complete)
                .unwrap_or(false)
        })
        .await,
        "data trigger never fired"
    );
    let final_status = rig.mgr.get_status(&fired_id).unwrap();
    assert_eq!(final_status.context().workflow_id(), &wf);

    // The event was consumed.
    assert!(wait_until(Duration::from_secs(5), || {
        rig.mgr.active_events().is_empty()
    })
    .await);
}

#[tokio::test]
async fn non_matching_notation_leaves_event_registered() {
    let rig = rig();
    rig.mgr
        .set_event(WorkflowEvent::Metadata(MetadataEvent::new(
            BTreeMap::from([("sampleId".to_string(), "X7".to_string())]),
            JobDefn::shell("echo hit"),
            "local",
        )))
        .await
        .unwrap();

    rig.mgr
        .notate_put_in(
            "/tmp/f",
            None,
            BTreeMap::from([("sampleId".to_string(), "Z9".to_string())]),
        )
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rig
        .mgr
        .active_events()
        .iter()
        .any(|e| e.pillar() == lwf_core::EventPillar::Data));
}

#[tokio::test]
async fn second_matching_notation_does_not_refire() {
    let rig = rig();
    let wf = WorkflowId::new("W");
    rig.mgr
        .set_event(WorkflowEvent::Metadata(MetadataEvent::new(
            BTreeMap::from([("sampleId".to_string(), "X7".to_string())]),
            JobDefn::shell("echo hit"),
            "fake",
        )))
        .await
        .unwrap();

    let props = BTreeMap::from([("sampleId".to_string(), "X7".to_string())]);
    rig.mgr.notate_put_in("/tmp/a", Some(&wf), props.clone()).await.unwrap();
    assert!(
        wait_until(Duration::from_secs(5), || rig.fake.submissions().len() == 1).await
    );
    rig.mgr.notate_put_in("/tmp/b", Some(&wf), props).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(rig.fake.submissions().len(), 1);
}
