// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use lwf_core::{CodecError, SiteError};
use lwf_storage::StoreError;
use thiserror::Error;

/// Errors that can occur in the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("site not found: {0}")]
    SiteNotFound(String),
    #[error("no driver registered for class: {0}")]
    DriverNotFound(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("site error: {0}")]
    Site(#[from] SiteError),
    /// The polled site has no record of the job; treated as terminal.
    #[error("remote job not found: {0}")]
    RemoteJobNotFound(String),
    #[error("isolated invocation failed (exit {code:?}): {detail}")]
    Isolated { code: Option<i32>, detail: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
