// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Object ↔ opaque-string codec for transport and storage.
//!
//! Domain objects cross process and storage boundaries as printable opaque
//! strings: JSON via serde, wrapped in base64 so the payload survives
//! form-encoded transports and shell argument vectors unmangled. The
//! encoding is deterministic, so `encode(decode(s)) == s` for any string
//! this module produced.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors from encoding or decoding an opaque payload.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serialize a domain object to an opaque string.
pub fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
    let json = serde_json::to_string(value)?;
    Ok(B64.encode(json.as_bytes()))
}

/// Reconstruct a domain object from an opaque string produced by [`encode`].
pub fn decode<T: DeserializeOwned>(blob: &str) -> Result<T, CodecError> {
    let bytes = B64.decode(blob.trim().as_bytes())?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
