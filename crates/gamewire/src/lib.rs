// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # gamewire - game-protocol reverse engineering and stress testing
//!
//! Decodes raw byte payloads of an undocumented, length-prefixed binary game
//! protocol into structured fields, synthesizes adversarial variants of valid
//! packets, and tracks whether a stream of protocol events respects the
//! declared game-phase state machine. Built for protocol-level vulnerability
//! hunting (overflow, type confusion, illegal state transitions) without
//! server source access.
//!
//! ## Quick Start
//!
//! ```rust
//! use gamewire::packet::{self, field};
//! use gamewire::schema::Registry;
//! use gamewire::codec::FieldValue;
//! use gamewire::fuzzing::{self, MutationKind};
//!
//! let registry = Registry::builtin();
//!
//! // Decode a captured payload
//! let bytes = packet::encode(&registry, 0x03, &[
//!     field("message", FieldValue::Str("Hello World".into())),
//! ]).unwrap();
//! let decoded = packet::decode(&registry, &bytes);
//! assert!(decoded.is_complete());
//!
//! // Derive adversarial variants of it
//! let base = vec![field("message", FieldValue::Str("Hello World".into()))];
//! for (hostile, record) in fuzzing::fuzz(&registry, 0x03, &base, &MutationKind::ALL).unwrap() {
//!     let _ = (hostile, record); // hand bytes to the transport collaborator
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------------+
//! |                        Collaborators (external)                    |
//! |     transport sockets | live capture | report files | CLI shell    |
//! +--------------------------------------------------------------------+
//! |                          Analysis Layer                            |
//! |    fuzzing (mutation engine) | phase (tracker) | findings (log)    |
//! +--------------------------------------------------------------------+
//! |                           Packet Layer                             |
//! |        schema (registry) | packet (schema-driven codec)            |
//! +--------------------------------------------------------------------+
//! |                            Wire Layer                              |
//! |        codec (varint, cursor, scalar/vector field values)          |
//! +--------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`schema::Registry`] | Immutable packet-id to field-layout mapping |
//! | [`codec::FieldValue`] | Tagged union of wire field values |
//! | [`packet::DecodedPacket`] | Decode result with recoverable error marker |
//! | [`fuzzing::FuzzCases`] | Lazy deterministic adversarial packet stream |
//! | [`phase::Tracker`] | Append-only transition log with anomaly heuristics |
//! | [`findings::FindingLog`] | Structured vulnerability record aggregation |
//!
//! The core is synchronous and I/O-free: no sockets, no locks, no clocks
//! except the optional wall-clock stamp in [`phase::Tracker::record`].

/// Wire-level primitives: varint, bounds-checked cursor, field values.
pub mod codec;
/// Finding aggregation and report rendering.
pub mod findings;
/// Schema-driven mutation engine.
pub mod fuzzing;
/// Whole-packet decode/encode against a schema registry.
pub mod packet;
/// Game-phase state machine and transition tracker.
pub mod phase;
/// Packet schemas and the immutable registry.
pub mod schema;

pub use codec::{Cursor, FieldValue, WireError, WireResult};
pub use findings::{Finding, FindingKind, FindingLog, Severity};
pub use fuzzing::{FuzzCases, MutatedValue, MutationKind, MutationRecord};
pub use packet::{Analysis, DecodeFailure, DecodedPacket, EncodeError};
pub use phase::{Anomaly, AnomalyKind, Phase, Tracker, Transition};
pub use schema::{FieldSchema, FieldType, PacketSchema, Registry, SchemaError};
