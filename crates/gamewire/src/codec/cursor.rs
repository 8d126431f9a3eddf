// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked read cursor for raw packet buffers.
//!
//! The protocol carries all multi-byte scalars big-endian, so only `_be`
//! readers exist. Every read reports the exact failure offset so a decode
//! error can name the byte where a hostile packet fell apart.

use super::{WireError, WireResult};

/// Generate read methods for fixed-width big-endian primitives.
///
/// Each generated method:
/// 1. Checks buffer bounds (returns `WireError::TruncatedInput` if short)
/// 2. Reads N bytes from the buffer
/// 3. Converts via `from_be_bytes()`
/// 4. Advances the offset
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> WireResult<$type> {
            if $size > self.remaining() {
                return Err(WireError::TruncatedInput {
                    offset: self.offset,
                    needed: $size,
                    remaining: self.remaining(),
                });
            }
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(&self.buffer[self.offset..self.offset + $size]);
            self.offset += $size;
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

/// Immutable cursor over a raw packet buffer (bounds-checked, zero-copy).
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_be!(read_u8, u8, 1);
    impl_read_be!(read_u16_be, u16, 2);
    impl_read_be!(read_u32_be, u32, 4);
    impl_read_be!(read_u64_be, u64, 8);
    impl_read_be!(read_i32_be, i32, 4);

    pub fn read_f32_be(&mut self) -> WireResult<f32> {
        Ok(f32::from_bits(self.read_u32_be()?))
    }

    pub fn read_f64_be(&mut self) -> WireResult<f64> {
        Ok(f64::from_bits(self.read_u64_be()?))
    }

    /// Read exactly `len` bytes. The length comparison goes through
    /// `remaining()` so an attacker-controlled length near `usize::MAX`
    /// cannot overflow the bounds check.
    pub fn read_bytes(&mut self, len: usize) -> WireResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(WireError::TruncatedInput {
                offset: self.offset,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_overflow_reports_offset() {
        let buffer = [0u8; 1];
        let mut cursor = Cursor::new(&buffer);
        assert_eq!(cursor.read_u8().expect("Read u8 should succeed"), 0);

        let err = cursor.read_u8().unwrap_err();
        match err {
            WireError::TruncatedInput {
                offset,
                needed,
                remaining,
            } => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 1);
                assert_eq!(remaining, 0);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_read_primitives_big_endian() {
        let buffer = [
            0xAB, // u8
            0xCD, 0xEF, // u16
            0x12, 0x34, 0x56, 0x78, // u32
            0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, // u64
            0xFF, 0xFF, 0xFF, 0xD6, // i32 = -42
        ];
        let mut cursor = Cursor::new(&buffer);
        assert_eq!(cursor.read_u8().expect("u8"), 0xAB);
        assert_eq!(cursor.read_u16_be().expect("u16"), 0xCDEF);
        assert_eq!(cursor.read_u32_be().expect("u32"), 0x1234_5678);
        assert_eq!(cursor.read_u64_be().expect("u64"), 0x1122_3344_5566_7788);
        assert_eq!(cursor.read_i32_be().expect("i32"), -42);
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_read_f32_big_endian() {
        // 180.0f32 = 0x43340000
        let buffer = [0x43, 0x34, 0x00, 0x00];
        let mut cursor = Cursor::new(&buffer);
        assert_eq!(cursor.read_f32_be().expect("f32"), 180.0);
    }

    #[test]
    fn test_read_bytes_and_remaining() {
        let buffer = [0xDE, 0xAD, 0xBE, 0xEF, 0x00];
        let mut cursor = Cursor::new(&buffer);
        assert_eq!(cursor.read_bytes(4).expect("bytes"), &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.offset(), 4);
    }

    #[test]
    fn test_read_bytes_huge_length_no_overflow() {
        let buffer = [0u8; 4];
        let mut cursor = Cursor::new(&buffer);
        cursor.read_u8().expect("u8");
        let err = cursor.read_bytes(usize::MAX).unwrap_err();
        match err {
            WireError::TruncatedInput { offset, remaining, .. } => {
                assert_eq!(offset, 1);
                assert_eq!(remaining, 3);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
