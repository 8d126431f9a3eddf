// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for schema-driven packet decoding
//!
//! Malformed packets are the expected input here: decode must fold every
//! failure into the result marker, never panic or abort.

#![no_main]

use libfuzzer_sys::fuzz_target;

use gamewire::packet;
use gamewire::schema::Registry;

fuzz_target!(|data: &[u8]| {
    let registry = Registry::builtin();

    let decoded = packet::decode(&registry, data);
    // Partial decodes keep their recovered prefix; rendering must not panic.
    let _ = decoded.to_string();

    let analysis = packet::analyze(&registry, data);
    assert_eq!(analysis.success, analysis.packet.error.is_none());
});
