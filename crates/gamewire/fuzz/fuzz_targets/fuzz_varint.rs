// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for the varint codec
//!
//! The decoder must terminate and never panic on any input, including
//! endless continuation runs and truncated buffers.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut cursor = gamewire::codec::Cursor::new(data);
    if let Ok(value) = gamewire::codec::varint::decode(&mut cursor) {
        // Whatever decoded must re-encode without panicking.
        let _ = gamewire::codec::varint::encode(value);
    }

    let mut cursor = gamewire::codec::Cursor::new(data);
    let _ = gamewire::codec::varint::decode_capped(
        &mut cursor,
        gamewire::codec::varint::MAX_VARINT_LEN,
    );
});
