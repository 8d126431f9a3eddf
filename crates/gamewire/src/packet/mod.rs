// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-driven packet decode/encode.
//!
//! Wire format of one packet: `varint(packet_id) || field_1 || ... ||
//! field_n`, fields strictly in schema order, no padding and no length
//! prefix (payload boundaries come from the transport datagram).
//!
//! Decoding never raises an unrecoverable fault: malformed input is the
//! expected case during a fuzz sweep, so failures are folded into the
//! returned [`DecodedPacket`] alongside whatever fields were already
//! recovered.

use crate::codec::{varint, Cursor, FieldValue, WireError};
use crate::schema::Registry;
use std::fmt;

/// Ordered field map handed to [`encode`] and produced by [`decode`].
pub type FieldMap = Vec<(String, FieldValue)>;

/// Build one `(name, value)` entry for a [`FieldMap`].
pub fn field(name: &str, value: FieldValue) -> (String, FieldValue) {
    (name.to_string(), value)
}

/// Where and why a decode stopped early.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeFailure {
    /// The packet-id varint itself was unreadable.
    Header { error: WireError },
    /// The identifier decoded but is absent from the registry.
    UnknownPacketId { packet_id: u64 },
    /// A field failed partway through the layout.
    Field {
        field: String,
        offset: usize,
        error: WireError,
    },
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeFailure::Header { error } => write!(f, "unreadable packet id: {}", error),
            DecodeFailure::UnknownPacketId { packet_id } => {
                write!(f, "unknown packet id 0x{:02X}", packet_id)
            }
            DecodeFailure::Field {
                field,
                offset,
                error,
            } => write!(f, "field {:?} at offset {}: {}", field, offset, error),
        }
    }
}

/// Result of decoding one raw payload. Read-only after construction; the
/// `error` marker replaces exceptions so partial decodes keep their
/// recovered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPacket {
    pub packet_id: u64,
    /// Schema name, when the identifier was known.
    pub name: Option<String>,
    /// Recovered fields in schema order.
    pub fields: Vec<(String, FieldValue)>,
    pub error: Option<DecodeFailure>,
}

impl DecodedPacket {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Look up a recovered field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for DecodedPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Packet ID: 0x{:02X}", self.packet_id)?;
        writeln!(f, "Type: {}", self.name.as_deref().unwrap_or("UNKNOWN"))?;
        for (name, value) in &self.fields {
            writeln!(f, "  {}: {}", name, value)?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "  error: {}", error)?;
        }
        Ok(())
    }
}

/// Encode-side failure. Missing or incompatible field values degrade to
/// defaults instead; only an identifier the registry has never seen is
/// unanswerable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    UnknownPacketId { packet_id: u64 },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::UnknownPacketId { packet_id } => {
                write!(f, "unknown packet id 0x{:02X}", packet_id)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Decode a raw payload against the registry.
///
/// Walks the schema's field list in order, advancing a single cursor; the
/// first field failure stops the walk and is recorded with the field name
/// and byte offset. Never panics on hostile input.
pub fn decode(registry: &Registry, raw: &[u8]) -> DecodedPacket {
    let mut cursor = Cursor::new(raw);

    let packet_id = match varint::decode(&mut cursor) {
        Ok(id) => id,
        Err(error) => {
            return DecodedPacket {
                packet_id: 0,
                name: None,
                fields: Vec::new(),
                error: Some(DecodeFailure::Header { error }),
            }
        }
    };

    let Some(schema) = registry.lookup(packet_id) else {
        log::debug!("[packet] unknown packet id 0x{:02X}", packet_id);
        return DecodedPacket {
            packet_id,
            name: None,
            fields: Vec::new(),
            error: Some(DecodeFailure::UnknownPacketId { packet_id }),
        };
    };

    let mut fields = Vec::with_capacity(schema.fields.len());
    for field_schema in &schema.fields {
        let offset = cursor.offset();
        match FieldValue::decode(field_schema.field_type, &mut cursor) {
            Ok(value) => fields.push((field_schema.name.clone(), value)),
            Err(error) => {
                log::debug!(
                    "[packet] {} decode stopped at field {:?}, offset {}: {}",
                    schema.name,
                    field_schema.name,
                    offset,
                    error
                );
                return DecodedPacket {
                    packet_id,
                    name: Some(schema.name.clone()),
                    fields,
                    error: Some(DecodeFailure::Field {
                        field: field_schema.name.clone(),
                        offset,
                        error,
                    }),
                };
            }
        }
    }

    DecodedPacket {
        packet_id,
        name: Some(schema.name.clone()),
        fields,
        error: None,
    }
}

/// Encode a field map against the registry.
///
/// Fields are encoded strictly in schema order, prefixed by the varint
/// identifier. A missing field or a value of the wrong type degrades to the
/// type's zero default with a logged warning; aborting the whole packet over
/// one field would gut fuzzing throughput.
pub fn encode(
    registry: &Registry,
    packet_id: u64,
    values: &[(String, FieldValue)],
) -> Result<Vec<u8>, EncodeError> {
    let Some(schema) = registry.lookup(packet_id) else {
        return Err(EncodeError::UnknownPacketId { packet_id });
    };

    let mut out = Vec::with_capacity(64);
    varint::encode_into(packet_id, &mut out);

    for field_schema in &schema.fields {
        let supplied = values
            .iter()
            .find(|(name, _)| *name == field_schema.name)
            .map(|(_, value)| value);

        match supplied {
            Some(value) if value.field_type() == field_schema.field_type => {
                value.encode_into(&mut out);
            }
            Some(value) => {
                log::warn!(
                    "[packet] {}.{}: {} value for {} field, substituting default",
                    schema.name,
                    field_schema.name,
                    value.field_type(),
                    field_schema.field_type
                );
                FieldValue::zero(field_schema.field_type).encode_into(&mut out);
            }
            None => {
                log::warn!(
                    "[packet] {}.{}: missing value, substituting default",
                    schema.name,
                    field_schema.name
                );
                FieldValue::zero(field_schema.field_type).encode_into(&mut out);
            }
        }
    }

    Ok(out)
}

/// Structured decode report for bulk sweeps: a caller pushing thousands of
/// mutated packets through [`decode`] gets data, not faults.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub success: bool,
    pub packet_id: u64,
    pub packet: DecodedPacket,
}

/// Decode `raw` and report the outcome as plain data.
pub fn analyze(registry: &Registry, raw: &[u8]) -> Analysis {
    let packet = decode(registry, raw);
    Analysis {
        success: packet.is_complete(),
        packet_id: packet.packet_id,
        packet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn registry() -> Registry {
        Registry::builtin()
    }

    #[test]
    fn test_decode_unknown_packet_id() {
        let packet = decode(&registry(), &[0x7E, 0x01, 0x02]);
        assert_eq!(packet.packet_id, 0x7E);
        assert!(packet.fields.is_empty());
        assert_eq!(
            packet.error,
            Some(DecodeFailure::UnknownPacketId { packet_id: 0x7E })
        );
    }

    #[test]
    fn test_decode_empty_buffer() {
        let packet = decode(&registry(), &[]);
        assert!(matches!(packet.error, Some(DecodeFailure::Header { .. })));
    }

    #[test]
    fn test_decode_truncated_field_preserves_prefix() {
        // Chat packet: full playerID, then a string whose body is cut short.
        let mut raw = vec![0x03];
        raw.extend_from_slice(&[0x11; 16]);
        raw.push(0x0B); // declared length 11
        raw.extend_from_slice(b"Hell"); // only 4 bytes present

        let packet = decode(&registry(), &raw);
        assert_eq!(packet.name.as_deref(), Some("ChatMessage"));
        assert_eq!(packet.fields.len(), 1);
        assert_eq!(
            packet.get("playerID"),
            Some(&FieldValue::Identifier16([0x11; 16]))
        );
        match &packet.error {
            Some(DecodeFailure::Field { field, offset, error }) => {
                assert_eq!(field, "message");
                assert_eq!(*offset, 17);
                assert!(matches!(error, WireError::TruncatedInput { .. }));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_encode_missing_fields_default_to_zero() {
        let reg = registry();
        let bytes = encode(&reg, 0x03, &[field("message", FieldValue::Str("hi".into()))])
            .expect("encode");

        let packet = decode(&reg, &bytes);
        assert!(packet.is_complete());
        assert_eq!(
            packet.get("playerID"),
            Some(&FieldValue::Identifier16([0u8; 16]))
        );
        assert_eq!(packet.get("message"), Some(&FieldValue::Str("hi".into())));
        assert_eq!(packet.get("timestamp"), Some(&FieldValue::U64(0)));
    }

    #[test]
    fn test_encode_type_mismatch_degrades_to_default() {
        let reg = registry();
        // yaw is f32; a string value is fundamentally incompatible.
        let bytes = encode(
            &reg,
            0x01,
            &[
                field("yaw", FieldValue::Str("sideways".into())),
                field("tick", FieldValue::U32(1000)),
            ],
        )
        .expect("encode");

        let packet = decode(&reg, &bytes);
        assert!(packet.is_complete());
        assert_eq!(packet.get("yaw"), Some(&FieldValue::F32(0.0)));
        assert_eq!(packet.get("tick"), Some(&FieldValue::U32(1000)));
    }

    #[test]
    fn test_encode_unknown_packet_id_is_an_error() {
        let err = encode(&registry(), 0x7E, &[]).unwrap_err();
        assert_eq!(err, EncodeError::UnknownPacketId { packet_id: 0x7E });
    }

    #[test]
    fn test_fields_come_back_in_schema_order() {
        let reg = registry();
        let bytes = encode(
            &reg,
            0x01,
            &[
                // Supplied out of order on purpose.
                field("tick", FieldValue::U32(7)),
                field("playerID", FieldValue::Identifier16([0xAA; 16])),
            ],
        )
        .expect("encode");
        let packet = decode(&reg, &bytes);
        let names: Vec<&str> = packet.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["playerID", "position", "velocity", "yaw", "pitch", "flags", "tick"]
        );
    }

    #[test]
    fn test_analyze_reports_instead_of_faulting() {
        let reg = registry();
        let good = analyze(&reg, &encode(&reg, 0x0F, &[]).expect("encode"));
        assert!(good.success);
        assert_eq!(good.packet_id, 0x0F);

        let bad = analyze(&reg, &[0x01, 0xFF]);
        assert!(!bad.success);
        assert_eq!(bad.packet_id, 0x01);
    }

    #[test]
    fn test_display_includes_type_and_fields() {
        let reg = registry();
        let bytes = encode(&reg, 0x03, &[field("message", FieldValue::Str("yo".into()))])
            .expect("encode");
        let rendered = decode(&reg, &bytes).to_string();
        assert!(rendered.contains("Packet ID: 0x03"));
        assert!(rendered.contains("Type: ChatMessage"));
        assert!(rendered.contains("message: \"yo\""));
    }

    #[test]
    fn test_game_phase_change_layout() {
        let reg = registry();
        let bytes = encode(
            &reg,
            0x0F,
            &[
                field("newPhase", FieldValue::U8(2)),
                field("durationMs", FieldValue::U32(30_000)),
                field("announcement", FieldValue::Str("Voting begins".into())),
            ],
        )
        .expect("encode");
        // varint id (1) + u8 (1) + u32 (4) + varint len (1) + 13 body bytes
        assert_eq!(bytes.len(), 20);
        let packet = decode(&reg, &bytes);
        assert!(packet.is_complete());
        assert_eq!(packet.get("durationMs"), Some(&FieldValue::U32(30_000)));
        assert_eq!(
            packet
                .get("announcement")
                .map(|v| v.field_type()),
            Some(FieldType::VarLenString)
        );
    }
}
