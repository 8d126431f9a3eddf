// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Immutable packet-schema registry.
//!
//! Loaded once from a declarative JSON source (the same shape as the
//! recovered structure dumps), or constructed from the builtin layouts. The
//! registry is read-only after construction and safe to share across threads
//! without synchronization.
//!
//! # Source format
//!
//! ```json
//! {
//!   "0x01": {
//!     "name": "MovementInput",
//!     "fields": [
//!       {"name": "playerID", "type": "UUID", "size": 16},
//!       {"name": "position", "type": "Vector3f", "size": 12}
//!     ]
//!   }
//! }
//! ```
//!
//! `size` is informative only; the wire width comes from `type`.

use super::{FieldSchema, FieldType, PacketSchema, SchemaError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Raw JSON shape of one packet entry.
#[derive(Debug, Deserialize)]
struct RawPacket {
    name: String,
    #[serde(default)]
    fields: Vec<RawField>,
}

/// Raw JSON shape of one field entry.
#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    type_tag: String,
    /// Informative only; fixed widths are implied by the type.
    #[serde(default)]
    #[allow(dead_code)]
    size: Option<u32>,
}

/// Immutable mapping from packet identifier to field layout.
#[derive(Debug, Clone)]
pub struct Registry {
    schemas: BTreeMap<u64, PacketSchema>,
}

impl Registry {
    /// Load a registry from a JSON schema source.
    ///
    /// The error is escalated rather than swallowed: the caller decides
    /// whether to proceed with [`Registry::fallback`].
    pub fn from_file(path: &Path) -> Result<Registry, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|error| SchemaError::Io {
            path: path.display().to_string(),
            error,
        })?;
        let registry = Self::from_json(&text).map_err(|e| match e {
            SchemaError::Parse { reason, .. } => SchemaError::Parse {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        log::info!(
            "[schema] loaded {} packet layouts from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Load from a file, degrading to the minimal builtin fallback (movement
    /// and chat) when the source is missing or malformed. The failure is
    /// logged, not hidden.
    pub fn from_file_or_fallback(path: &Path) -> Registry {
        match Self::from_file(path) {
            Ok(registry) => registry,
            Err(e) => {
                log::warn!("[schema] {}; using builtin fallback layouts", e);
                Self::fallback()
            }
        }
    }

    /// Parse a registry from JSON text.
    pub fn from_json(text: &str) -> Result<Registry, SchemaError> {
        let raw: BTreeMap<String, RawPacket> =
            serde_json::from_str(text).map_err(|e| SchemaError::Parse {
                path: String::new(),
                reason: e.to_string(),
            })?;

        let mut schemas = BTreeMap::new();
        for (key, packet) in raw {
            let packet_id = parse_packet_id(&key)?;
            let mut fields = Vec::with_capacity(packet.fields.len());
            for field in packet.fields {
                let field_type = FieldType::parse_tag(&field.type_tag).ok_or_else(|| {
                    SchemaError::UnknownFieldType {
                        packet: packet.name.clone(),
                        field: field.name.clone(),
                        tag: field.type_tag.clone(),
                    }
                })?;
                fields.push(FieldSchema {
                    name: field.name,
                    field_type,
                });
            }
            schemas.insert(packet_id, PacketSchema::new(packet_id, &packet.name, fields));
        }
        Ok(Registry { schemas })
    }

    /// The five packet layouts recovered from captured traffic.
    pub fn builtin() -> Registry {
        let mut schemas = BTreeMap::new();
        for schema in [
            movement_schema(),
            chat_schema(),
            block_interaction_schema(),
            entity_spawn_schema(),
            game_phase_change_schema(),
        ] {
            schemas.insert(schema.packet_id, schema);
        }
        Registry { schemas }
    }

    /// Minimal fallback set used when no schema source is available:
    /// movement and chat only.
    pub fn fallback() -> Registry {
        let mut schemas = BTreeMap::new();
        for schema in [movement_schema(), chat_schema()] {
            schemas.insert(schema.packet_id, schema);
        }
        Registry { schemas }
    }

    pub fn lookup(&self, packet_id: u64) -> Option<&PacketSchema> {
        self.schemas.get(&packet_id)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Iterate layouts in ascending packet-id order.
    pub fn iter(&self) -> impl Iterator<Item = &PacketSchema> {
        self.schemas.values()
    }
}

/// Parse a `"0xNN"` packet-id key.
fn parse_packet_id(key: &str) -> Result<u64, SchemaError> {
    let digits = key
        .strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))
        .ok_or_else(|| SchemaError::InvalidPacketId {
            key: key.to_string(),
        })?;
    u64::from_str_radix(digits, 16).map_err(|_| SchemaError::InvalidPacketId {
        key: key.to_string(),
    })
}

fn movement_schema() -> PacketSchema {
    PacketSchema::new(
        0x01,
        "MovementInput",
        vec![
            FieldSchema::new("playerID", FieldType::Identifier16),
            FieldSchema::new("position", FieldType::Vector3f),
            FieldSchema::new("velocity", FieldType::Vector3f),
            FieldSchema::new("yaw", FieldType::F32),
            FieldSchema::new("pitch", FieldType::F32),
            FieldSchema::new("flags", FieldType::U8),
            FieldSchema::new("tick", FieldType::U32),
        ],
    )
}

fn chat_schema() -> PacketSchema {
    PacketSchema::new(
        0x03,
        "ChatMessage",
        vec![
            FieldSchema::new("playerID", FieldType::Identifier16),
            FieldSchema::new("message", FieldType::VarLenString),
            FieldSchema::new("timestamp", FieldType::U64),
        ],
    )
}

fn block_interaction_schema() -> PacketSchema {
    PacketSchema::new(
        0x05,
        "BlockInteraction",
        vec![
            FieldSchema::new("playerID", FieldType::Identifier16),
            FieldSchema::new("blockPosition", FieldType::Vector3i),
            FieldSchema::new("face", FieldType::U8),
            FieldSchema::new("action", FieldType::U8),
        ],
    )
}

fn entity_spawn_schema() -> PacketSchema {
    PacketSchema::new(
        0x08,
        "EntitySpawn",
        vec![
            FieldSchema::new("entityID", FieldType::U32),
            FieldSchema::new("entityType", FieldType::U16),
            FieldSchema::new("position", FieldType::Vector3f),
            FieldSchema::new("yaw", FieldType::F32),
            FieldSchema::new("pitch", FieldType::F32),
        ],
    )
}

fn game_phase_change_schema() -> PacketSchema {
    PacketSchema::new(
        0x0F,
        "GamePhaseChange",
        vec![
            FieldSchema::new("newPhase", FieldType::U8),
            FieldSchema::new("durationMs", FieldType::U32),
            FieldSchema::new("announcement", FieldType::VarLenString),
        ],
    )
}
