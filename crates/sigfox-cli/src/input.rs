// crates/sigfox-cli/src/input.rs
// ============================================================================
// Module: CLI Input Readers
// Description: Size-bounded file reads for triggers and callback bodies.
// Purpose: Fail closed on oversized or malformed operator inputs.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`read_bytes_with_limit`] refuses files over a byte limit before and
//! after reading. [`read_json_object`] layers JSON object parsing on top.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of a callback body file.
pub const MAX_CALLBACK_BODY_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug, Error)]
pub enum ReadLimitError {
    /// File I/O failure.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// File size exceeds the configured limit.
    #[error("{size} bytes exceeds limit {limit}")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
    /// Contents are not valid JSON.
    #[error("{0}")]
    Json(String),
    /// Contents are JSON but not an object.
    #[error("expected a JSON object")]
    NotObject,
}

// ============================================================================
// SECTION: Readers
// ============================================================================

/// Reads a file from disk while enforcing a hard size limit.
///
/// # Errors
///
/// Returns [`ReadLimitError::Io`] when the file cannot be read and
/// [`ReadLimitError::TooLarge`] when it exceeds `max_bytes`.
pub fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads a size-bounded file holding one JSON object.
///
/// # Errors
///
/// Returns [`ReadLimitError`] when the read fails, the file is too large, or
/// the contents are not a JSON object.
pub fn read_json_object(path: &Path, max_bytes: usize) -> Result<Map<String, Value>, ReadLimitError> {
    let bytes = read_bytes_with_limit(path, max_bytes)?;
    match serde_json::from_slice(&bytes).map_err(|err| ReadLimitError::Json(err.to_string()))? {
        Value::Object(map) => Ok(map),
        _ => Err(ReadLimitError::NotObject),
    }
}
