// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn shell_defn_builds_command_line() {
    let defn = JobDefn::shell("echo hello").with_args(vec!["a".into(), "b".into()]);
    assert_eq!(defn.command_line(), "echo hello a b");
    assert_eq!(defn.entry_point_type(), EntryPointType::Shell);
}

#[test]
fn command_line_without_args_is_entry_point() {
    let defn = JobDefn::shell("true");
    assert_eq!(defn.command_line(), "true");
}

#[parameterized(
    auth = { "auth.login", Pillar::Auth, "login" },
    run = { "run.submit", Pillar::Run, "submit" },
    repo = { "repo.put", Pillar::Repo, "put" },
    spin = { "spin.list_compute_types", Pillar::Spin, "list_compute_types" },
)]
fn site_method_splits_dotted_names(entry: &str, pillar: Pillar, method: &str) {
    let defn = JobDefn::site_endpoint(entry, vec![]);
    assert_eq!(defn.site_method(), Some((pillar, method)));
}

#[test]
fn site_method_rejects_unknown_pillar() {
    let defn = JobDefn::site_endpoint("warp.engage", vec![]);
    assert_eq!(defn.site_method(), None);
}

#[test]
fn site_method_rejects_undotted_entry() {
    let defn = JobDefn::site_endpoint("submit", vec![]);
    assert_eq!(defn.site_method(), None);
}

#[test]
fn site_method_requires_site_type() {
    let defn = JobDefn::shell("run.submit");
    assert_eq!(defn.site_method(), None);
}

#[test]
fn builders_set_site_and_compute_type() {
    let defn = JobDefn::shell("echo hi")
        .with_site("hpc")
        .with_compute_type("gpu")
        .with_name("hello");
    assert_eq!(defn.site_name(), Some("hpc"));
    assert_eq!(defn.compute_type(), Some("gpu"));
    assert_eq!(defn.name(), "hello");
}

#[test]
fn serde_roundtrip() {
    let defn = JobDefn::site_endpoint("run.submit", vec!["echo x".into()]).with_site("local");
    let json = serde_json::to_string(&defn).unwrap();
    let back: JobDefn = serde_json::from_str(&json).unwrap();
    assert_eq!(back, defn);
}
