// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::id::CountingGen;

#[test]
fn new_context_self_roots() {
    let ids = CountingGen::new("job");
    let ctx = JobContext::new(&ids);
    assert_eq!(ctx.job_id().as_str(), "job-1");
    assert_eq!(ctx.native_id(), "job-1");
    assert_eq!(ctx.workflow_id().as_str(), "job-1");
    assert_eq!(ctx.name(), "job-1");
    assert!(ctx.parent_job_id().is_none());
    assert_eq!(ctx.site_name(), "local");
    assert_eq!(ctx.compute_type(), "default");
}

#[test]
fn child_inherits_workflow_and_parent() {
    let parent = JobContext::with_id("a");
    let child = JobContext::with_id("b").child_of(&parent);
    assert_eq!(child.job_id().as_str(), "b");
    assert_eq!(child.parent_job_id().map(|p| p.as_str()), Some("a"));
    assert_eq!(child.workflow_id().as_str(), "a");
    assert_eq!(child.name(), "a_b");
}

#[test]
fn child_inherits_site() {
    let mut parent = JobContext::with_id("a");
    parent.set_site_name("hpc");
    let child = JobContext::with_id("b").child_of(&parent);
    assert_eq!(child.site_name(), "hpc");
}

#[test]
fn grandchild_keeps_root_workflow() {
    let a = JobContext::with_id("a");
    let b = JobContext::with_id("b").child_of(&a);
    let c = JobContext::with_id("c").child_of(&b);
    assert_eq!(c.workflow_id().as_str(), "a");
    assert_eq!(c.parent_job_id().map(|p| p.as_str()), Some("b"));
}

#[test]
fn display_includes_ids() {
    let ctx = JobContext::with_id("xyz");
    let s = format!("{}", ctx);
    assert!(s.contains("job:xyz"));
    assert!(s.contains("wf:xyz"));
    assert!(s.contains("parent:-"));
}
