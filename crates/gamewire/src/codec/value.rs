// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed field values and the scalar/vector codec.
//!
//! [`FieldValue`] carries exactly one variant per [`FieldType`], replacing
//! the free-form values of ad-hoc dissectors with a tagged union enforced at
//! this boundary. Decoding is driven by the declared type; encoding is
//! infallible because every variant has a defined wire form.

use super::{varint, Cursor, WireError, WireResult};
use crate::schema::FieldType;
use std::fmt;

/// One decoded (or to-be-encoded) field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Identifier16([u8; 16]),
    Vector3f([f32; 3]),
    Vector3i([i32; 3]),
    Str(String),
    VarInt(u64),
}

impl FieldValue {
    /// The field type this variant belongs to.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::U8(_) => FieldType::U8,
            FieldValue::U16(_) => FieldType::U16,
            FieldValue::U32(_) => FieldType::U32,
            FieldValue::U64(_) => FieldType::U64,
            FieldValue::F32(_) => FieldType::F32,
            FieldValue::F64(_) => FieldType::F64,
            FieldValue::Identifier16(_) => FieldType::Identifier16,
            FieldValue::Vector3f(_) => FieldType::Vector3f,
            FieldValue::Vector3i(_) => FieldType::Vector3i,
            FieldValue::Str(_) => FieldType::VarLenString,
            FieldValue::VarInt(_) => FieldType::VarInt,
        }
    }

    /// Zero-value default for a field type, used when an encode caller omits
    /// a field or supplies an incompatible value.
    pub fn zero(field_type: FieldType) -> FieldValue {
        match field_type {
            FieldType::U8 => FieldValue::U8(0),
            FieldType::U16 => FieldValue::U16(0),
            FieldType::U32 => FieldValue::U32(0),
            FieldType::U64 => FieldValue::U64(0),
            FieldType::F32 => FieldValue::F32(0.0),
            FieldType::F64 => FieldValue::F64(0.0),
            FieldType::Identifier16 => FieldValue::Identifier16([0u8; 16]),
            FieldType::Vector3f => FieldValue::Vector3f([0.0; 3]),
            FieldType::Vector3i => FieldValue::Vector3i([0; 3]),
            FieldType::VarLenString => FieldValue::Str(String::new()),
            FieldType::VarInt => FieldValue::VarInt(0),
        }
    }

    /// Decode one value of the declared type at the cursor position.
    pub fn decode(field_type: FieldType, cursor: &mut Cursor) -> WireResult<FieldValue> {
        match field_type {
            FieldType::U8 => Ok(FieldValue::U8(cursor.read_u8()?)),
            FieldType::U16 => Ok(FieldValue::U16(cursor.read_u16_be()?)),
            FieldType::U32 => Ok(FieldValue::U32(cursor.read_u32_be()?)),
            FieldType::U64 => Ok(FieldValue::U64(cursor.read_u64_be()?)),
            FieldType::F32 => Ok(FieldValue::F32(cursor.read_f32_be()?)),
            FieldType::F64 => Ok(FieldValue::F64(cursor.read_f64_be()?)),
            FieldType::Identifier16 => {
                let bytes = cursor.read_bytes(16)?;
                let mut id = [0u8; 16];
                id.copy_from_slice(bytes);
                Ok(FieldValue::Identifier16(id))
            }
            FieldType::Vector3f => {
                let x = cursor.read_f32_be()?;
                let y = cursor.read_f32_be()?;
                let z = cursor.read_f32_be()?;
                Ok(FieldValue::Vector3f([x, y, z]))
            }
            FieldType::Vector3i => {
                let x = cursor.read_i32_be()?;
                let y = cursor.read_i32_be()?;
                let z = cursor.read_i32_be()?;
                Ok(FieldValue::Vector3i([x, y, z]))
            }
            FieldType::VarLenString => {
                let offset = cursor.offset();
                let len = varint::decode(cursor)?;
                // A 64-bit length is attacker-controlled; read_bytes bounds it
                // against the actual buffer before any allocation happens.
                let bytes = cursor.read_bytes(len as usize)?;
                match std::str::from_utf8(bytes) {
                    Ok(s) => Ok(FieldValue::Str(s.to_string())),
                    Err(e) => Err(WireError::InvalidData {
                        offset,
                        reason: format!("invalid utf-8 in string: {}", e),
                    }),
                }
            }
            FieldType::VarInt => Ok(FieldValue::VarInt(varint::decode(cursor)?)),
        }
    }

    /// Append the wire form of this value to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            FieldValue::U8(v) => out.push(*v),
            FieldValue::U16(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::U32(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::U64(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::F32(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::F64(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::Identifier16(id) => out.extend_from_slice(id),
            FieldValue::Vector3f(v) => {
                for component in v {
                    out.extend_from_slice(&component.to_be_bytes());
                }
            }
            FieldValue::Vector3i(v) => {
                for component in v {
                    out.extend_from_slice(&component.to_be_bytes());
                }
            }
            FieldValue::Str(s) => {
                varint::encode_into(s.len() as u64, out);
                out.extend_from_slice(s.as_bytes());
            }
            FieldValue::VarInt(v) => varint::encode_into(*v, out),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::U8(v) => write!(f, "{}", v),
            FieldValue::U16(v) => write!(f, "{}", v),
            FieldValue::U32(v) => write!(f, "{}", v),
            FieldValue::U64(v) => write!(f, "{}", v),
            FieldValue::F32(v) => write!(f, "{}", v),
            FieldValue::F64(v) => write!(f, "{}", v),
            FieldValue::Identifier16(id) => f.write_str(&hex::encode(id)),
            FieldValue::Vector3f([x, y, z]) => write!(f, "({}, {}, {})", x, y, z),
            FieldValue::Vector3i([x, y, z]) => write!(f, "({}, {}, {})", x, y, z),
            FieldValue::Str(s) => write!(f, "{:?}", s),
            FieldValue::VarInt(v) => write!(f, "{}", v),
        }
    }
}
