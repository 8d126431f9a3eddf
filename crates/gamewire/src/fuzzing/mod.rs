// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-driven mutation engine.
//!
//! For each field of a packet layout, for each requested mutation kind, the
//! type-indexed table derives one adversarial value; the mutated field is
//! overlaid onto the baseline map and reassembled through the packet codec
//! into a shape-valid but hostile packet. Generation is lazy (one case per
//! iterator step), finite and deterministic: re-running with identical
//! inputs reproduces identical cases in identical order, which is what makes
//! a crash reproducible.
//!
//! A (type, kind) pair without a table entry is skipped, an explicit "not
//! applicable" outcome rather than an error.

use crate::codec::FieldValue;
use crate::packet::{self, EncodeError};
use crate::schema::{FieldType, PacketSchema, Registry};
use std::fmt;

// Bulk sweeps pair `fuzz` with structured decode reporting.
pub use crate::packet::{analyze, Analysis};

/// Categories of adversarial value substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Overflow,
    Underflow,
    Null,
    EdgeCase,
}

impl MutationKind {
    /// All kinds, in the canonical generation order.
    pub const ALL: [MutationKind; 4] = [
        MutationKind::Overflow,
        MutationKind::Underflow,
        MutationKind::Null,
        MutationKind::EdgeCase,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MutationKind::Overflow => "overflow",
            MutationKind::Underflow => "underflow",
            MutationKind::Null => "null",
            MutationKind::EdgeCase => "edge_case",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A derived adversarial value.
///
/// `OutOfRange` keeps integer intents that exceed the field's native domain
/// (256 for a u8, -1 for any unsigned, 2^32 for a u32) exactly as intended;
/// they reach the wire by two's-complement truncation to the field width,
/// the bytes an attacker would actually send.
#[derive(Debug, Clone, PartialEq)]
pub enum MutatedValue {
    Value(FieldValue),
    OutOfRange(i128),
}

impl MutatedValue {
    /// The wire rendition of this mutation for the given field type.
    pub fn to_wire(&self, field_type: FieldType) -> FieldValue {
        match self {
            MutatedValue::Value(value) => value.clone(),
            MutatedValue::OutOfRange(n) => match field_type {
                FieldType::U8 => FieldValue::U8(*n as u8),
                FieldType::U16 => FieldValue::U16(*n as u16),
                FieldType::U32 => FieldValue::U32(*n as u32),
                FieldType::U64 => FieldValue::U64(*n as u64),
                FieldType::VarInt => FieldValue::VarInt(*n as u64),
                // Out-of-range intents only exist for integer types.
                _ => FieldValue::zero(field_type),
            },
        }
    }
}

impl fmt::Display for MutatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutatedValue::Value(value) => write!(f, "{}", value),
            MutatedValue::OutOfRange(n) => write!(f, "{}", n),
        }
    }
}

/// Machine-readable description of one applied mutation. The schema and the
/// baseline map it was derived from are never modified (copy-on-mutate).
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub packet_id: u64,
    pub packet_name: String,
    pub field_name: String,
    pub original_value: FieldValue,
    pub mutated_value: MutatedValue,
    pub mutation_kind: MutationKind,
}

/// Type-indexed mutation table.
///
/// Returns `None` for undefined (type, kind) pairs, the "not applicable"
/// outcome. Entries follow what actually breaks servers: width overflows,
/// unsigned underflow, IEEE 754 specials, zeroed identifiers, oversized
/// strings.
pub fn mutate_value(field_type: FieldType, kind: MutationKind) -> Option<MutatedValue> {
    use FieldType as T;
    use MutationKind as K;

    match (field_type, kind) {
        (T::U8, K::Overflow) => Some(MutatedValue::OutOfRange(1 << 8)),
        (T::U16, K::Overflow) => Some(MutatedValue::OutOfRange(1 << 16)),
        (T::U32, K::Overflow) => Some(MutatedValue::OutOfRange(1 << 32)),
        (T::U64, K::Overflow) => Some(MutatedValue::OutOfRange(1 << 64)),
        (T::F32, K::Overflow) => Some(MutatedValue::Value(FieldValue::F32(f32::INFINITY))),
        (T::F64, K::Overflow) => Some(MutatedValue::Value(FieldValue::F64(f64::INFINITY))),
        (T::VarInt, K::Overflow) => Some(MutatedValue::Value(FieldValue::VarInt(0xFFFF_FFFF))),

        (T::U8 | T::U16 | T::U32 | T::U64, K::Underflow) => Some(MutatedValue::OutOfRange(-1)),
        (T::F32, K::Underflow) => Some(MutatedValue::Value(FieldValue::F32(f32::NEG_INFINITY))),
        (T::F64, K::Underflow) => Some(MutatedValue::Value(FieldValue::F64(f64::NEG_INFINITY))),

        (T::Identifier16, K::Null) => Some(MutatedValue::Value(FieldValue::Identifier16([0u8; 16]))),
        (T::VarLenString, K::Null) => Some(MutatedValue::Value(FieldValue::Str(String::new()))),
        (T::Vector3f, K::Null) => Some(MutatedValue::Value(FieldValue::Vector3f([0.0; 3]))),
        (T::Vector3i, K::Null) => Some(MutatedValue::Value(FieldValue::Vector3i([0; 3]))),

        (T::F32, K::EdgeCase) => Some(MutatedValue::Value(FieldValue::F32(f32::NAN))),
        (T::F64, K::EdgeCase) => Some(MutatedValue::Value(FieldValue::F64(f64::NAN))),
        (T::U32, K::EdgeCase) => Some(MutatedValue::Value(FieldValue::U32(u32::MAX))),
        (T::VarLenString, K::EdgeCase) => {
            Some(MutatedValue::Value(FieldValue::Str("A".repeat(10_000))))
        }
        (T::Vector3f, K::EdgeCase) => Some(MutatedValue::Value(FieldValue::Vector3f([
            f32::INFINITY,
            f32::NAN,
            0.0,
        ]))),

        _ => None,
    }
}

/// Lazy, restartable sequence of mutated packets: field-major, kinds in
/// request order, one case per defined table entry.
pub struct FuzzCases<'a> {
    registry: &'a Registry,
    schema: &'a PacketSchema,
    base: &'a [(String, FieldValue)],
    kinds: Vec<MutationKind>,
    field_idx: usize,
    kind_idx: usize,
}

impl<'a> FuzzCases<'a> {
    fn base_value(&self, field_name: &str, field_type: FieldType) -> FieldValue {
        self.base
            .iter()
            .find(|(name, _)| name == field_name)
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| FieldValue::zero(field_type))
    }
}

impl Iterator for FuzzCases<'_> {
    type Item = (Vec<u8>, MutationRecord);

    fn next(&mut self) -> Option<Self::Item> {
        while self.field_idx < self.schema.fields.len() {
            if self.kind_idx >= self.kinds.len() {
                self.field_idx += 1;
                self.kind_idx = 0;
                continue;
            }

            let field_schema = &self.schema.fields[self.field_idx];
            let kind = self.kinds[self.kind_idx];
            self.kind_idx += 1;

            let Some(mutated) = mutate_value(field_schema.field_type, kind) else {
                continue;
            };

            // Overlay the single mutated field onto the baseline, filling
            // every other declared field so the packet keeps a valid shape.
            let mut overlay = Vec::with_capacity(self.schema.fields.len());
            for fs in &self.schema.fields {
                let value = if fs.name == field_schema.name {
                    mutated.to_wire(fs.field_type)
                } else {
                    self.base_value(&fs.name, fs.field_type)
                };
                overlay.push((fs.name.clone(), value));
            }

            let bytes = match packet::encode(self.registry, self.schema.packet_id, &overlay) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::debug!("[fuzzing] failed to assemble mutated packet: {}", e);
                    continue;
                }
            };

            let record = MutationRecord {
                packet_id: self.schema.packet_id,
                packet_name: self.schema.name.clone(),
                field_name: field_schema.name.clone(),
                original_value: self.base_value(&field_schema.name, field_schema.field_type),
                mutated_value: mutated,
                mutation_kind: kind,
            };
            return Some((bytes, record));
        }
        None
    }
}

/// Generate adversarial variants of one packet.
///
/// Each call re-derives from the same baseline deterministically, so two
/// calls with identical inputs reproduce identical output order. The caller
/// can stop consuming at any point; nothing past the cursor is computed.
pub fn fuzz<'a>(
    registry: &'a Registry,
    packet_id: u64,
    base: &'a [(String, FieldValue)],
    kinds: &[MutationKind],
) -> Result<FuzzCases<'a>, EncodeError> {
    let Some(schema) = registry.lookup(packet_id) else {
        return Err(EncodeError::UnknownPacketId { packet_id });
    };
    Ok(FuzzCases {
        registry,
        schema,
        base,
        kinds: kinds.to_vec(),
        field_idx: 0,
        kind_idx: 0,
    })
}
