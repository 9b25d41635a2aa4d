// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::context::JobContext;
use crate::status::{JobState, JobStatus};

#[test]
fn encode_produces_printable_ascii() {
    let ctx = JobContext::with_id("j-1");
    let blob = encode(&ctx).unwrap();
    assert!(blob.chars().all(|c| c.is_ascii_graphic()));
}

#[test]
fn context_roundtrip() {
    let ctx = JobContext::with_id("j-roundtrip");
    let blob = encode(&ctx).unwrap();
    let back: JobContext = decode(&blob).unwrap();
    assert_eq!(back, ctx);
}

#[test]
fn status_roundtrip_is_byte_exact() {
    let ctx = JobContext::with_id("j-2");
    let status = JobStatus::new(ctx, JobState::Running);
    let blob = encode(&status).unwrap();
    let back: JobStatus = decode(&blob).unwrap();
    let blob2 = encode(&back).unwrap();
    assert_eq!(blob, blob2);
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode::<JobContext>("not base64 at all!!!").is_err());
}

#[test]
fn decode_tolerates_surrounding_whitespace() {
    let ctx = JobContext::with_id("j-3");
    let blob = format!("  {}\n", encode(&ctx).unwrap());
    let back: JobContext = decode(&blob).unwrap();
    assert_eq!(back, ctx);
}
