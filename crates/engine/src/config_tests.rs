// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn builtin_has_local_site() {
    let cfg = SiteConfig::builtin();
    let local = cfg.site("local").unwrap();
    assert_eq!(local.class.as_deref(), Some("local"));
    assert!(!local.remote);
    assert!(local.venv.is_none());
}

#[test]
fn builtin_service_section() {
    let cfg = SiteConfig::builtin();
    assert_eq!(cfg.lwf().host, "127.0.0.1");
    assert_eq!(cfg.lwf().port, 3000);
}

#[test]
fn user_overlay_adds_sites() {
    let cfg = SiteConfig::parse(Some(
        r#"
        [hpc]
        class = "slurm"
        remote = true
        account = "m1234"
        "#,
    ))
    .unwrap();
    let hpc = cfg.site("hpc").unwrap();
    assert!(hpc.remote);
    assert_eq!(hpc.class.as_deref(), Some("slurm"));
    assert_eq!(
        hpc.extra.get("account").and_then(|v| v.as_str()),
        Some("m1234")
    );
    // defaults survive
    assert!(cfg.site("local").is_some());
}

#[test]
fn user_overlay_replaces_whole_site_table() {
    let cfg = SiteConfig::parse(Some(
        r#"
        [local]
        class = "local"
        remote = true
        "#,
    ))
    .unwrap();
    assert!(cfg.is_remote("local"));
}

#[test]
fn user_overlay_replaces_service_section() {
    let cfg = SiteConfig::parse(Some(
        r#"
        [lwf]
        host = "0.0.0.0"
        port = 8080
        "#,
    ))
    .unwrap();
    assert_eq!(cfg.lwf().host, "0.0.0.0");
    assert_eq!(cfg.lwf().port, 8080);
}

#[test]
fn venv_marks_site_isolated() {
    let cfg = SiteConfig::parse(Some(
        r#"
        [qpu]
        class = "qpu"
        venv = "/opt/qpu-env"
        "#,
    ))
    .unwrap();
    assert_eq!(cfg.venv("qpu"), Some(Path::new("/opt/qpu-env")));
    assert_eq!(cfg.venv("local"), None);
}

#[test]
fn unknown_site_is_none() {
    let cfg = SiteConfig::builtin();
    assert!(cfg.site("nope").is_none());
    assert!(!cfg.is_remote("nope"));
}

#[test]
fn load_from_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = SiteConfig::load_from(&dir.path().join("sites.toml")).unwrap();
    assert!(cfg.site("local").is_some());
}

#[test]
fn load_from_reads_user_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sites.toml");
    std::fs::write(&path, "[faraway]\nclass = \"fake\"\nremote = true\n").unwrap();
    let cfg = SiteConfig::load_from(&path).unwrap();
    assert!(cfg.is_remote("faraway"));
}

#[test]
fn malformed_user_file_is_an_error() {
    assert!(SiteConfig::parse(Some("not [ valid toml")).is_err());
}
