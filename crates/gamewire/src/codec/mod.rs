// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire-level encoding/decoding primitives for the game protocol.
//!
//! Provides the bounds-checked [`Cursor`] reader, the continuation-bit
//! [`varint`] codec and the [`FieldValue`] scalar/vector codec. All multi-byte
//! scalars use big-endian byte order, matching the captured traffic.

pub mod cursor;
pub mod value;
pub mod varint;

pub use cursor::Cursor;
pub use value::FieldValue;

use std::fmt;

/// Wire-level error used within the codec layer.
///
/// Malformed input is an expected condition here, not a bug: every decoder
/// returns one of these instead of panicking, so bulk fuzz sweeps survive
/// arbitrary garbage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Buffer ended before the field (or varint terminator) was complete.
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    /// Varint exceeded the caller-requested byte cap.
    Overlong { offset: usize, max_bytes: usize },
    /// Bytes were present but not decodable (e.g. invalid UTF-8).
    InvalidData { offset: usize, reason: String },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::TruncatedInput {
                offset,
                needed,
                remaining,
            } => write!(
                f,
                "truncated input at offset {}: need {} bytes, {} remaining",
                offset, needed, remaining
            ),
            WireError::Overlong { offset, max_bytes } => write!(
                f,
                "overlong varint at offset {}: exceeds {} bytes",
                offset, max_bytes
            ),
            WireError::InvalidData { offset, reason } => {
                write!(f, "invalid data at offset {}: {}", offset, reason)
            }
        }
    }
}

impl std::error::Error for WireError {}

pub type WireResult<T> = core::result::Result<T, WireError>;
