/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! `FaxBitReader` API
//!
//! Fax codes are packed most significant bit first, so unlike the deflate
//! bit reader the buffer keeps unread bits at the top of a `u64`.

#[derive(Clone)]
pub struct FaxBitReader<'src> {
    // buffer we are pulling bits from
    src:       &'src [u8],
    // position in our buffer
    position:  usize,
    bits_left: u8,
    // unread bits, left aligned
    buffer:    u64
}

impl<'src> FaxBitReader<'src> {
    pub const fn new(in_buffer: &'src [u8]) -> FaxBitReader<'src> {
        FaxBitReader {
            src:       in_buffer,
            position:  0,
            bits_left: 0,
            buffer:    0
        }
    }

    /// Top up the buffer so it holds at least 57 bits, or everything left
    /// in the source
    #[inline(always)]
    pub fn refill(&mut self) {
        while self.bits_left <= 56 {
            match self.src.get(self.position) {
                Some(byte) => {
                    self.buffer |= u64::from(*byte) << (56 - self.bits_left);
                    self.bits_left += 8;
                    self.position += 1;
                }
                None => break
            }
        }
    }

    /// Return the next `bits` bits without consuming them
    ///
    /// Bits past the end of the stream read as zero.
    #[inline(always)]
    pub fn peek_bits(&mut self, bits: u8) -> u32 {
        debug_assert!(bits > 0 && bits <= 32);

        if self.bits_left < bits {
            self.refill();
        }
        (self.buffer >> (64 - u32::from(bits))) as u32
    }

    #[inline(always)]
    pub fn drop_bits(&mut self, bits: u8) {
        let bits = bits.min(self.bits_left);

        self.buffer = self.buffer.checked_shl(u32::from(bits)).unwrap_or(0);
        self.bits_left -= bits;
    }

    /// Read a single bit, `None` once the stream is exhausted
    #[inline(always)]
    pub fn get_bit(&mut self) -> Option<u8> {
        if self.bits_left == 0 {
            self.refill();

            if self.bits_left == 0 {
                return None;
            }
        }
        let bit = (self.buffer >> 63) as u8;
        self.drop_bits(1);

        Some(bit)
    }

    /// Bits left before the next byte boundary
    pub const fn bits_to_byte_boundary(&self) -> u8 {
        // whole bytes are loaded, so the partial byte is what is left over
        self.bits_left & 7
    }

    /// Number of unread bits, buffered or not
    pub const fn bits_remaining(&self) -> usize {
        self.bits_left as usize + (self.src.len() - self.position) * 8
    }

    pub const fn is_exhausted(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Consume an end of line marker if one starts here
    ///
    /// Any number of zero fill bits may precede the eleven zeros and the
    /// terminating one. When `align` is set, zero bits up to the next byte
    /// boundary following the marker are consumed too.
    pub fn skip_eol(&mut self, align: bool) -> bool {
        let mut lookahead = self.clone();
        let mut zeros = 0_usize;

        loop {
            match lookahead.get_bit() {
                Some(0) => zeros += 1,
                Some(_) if zeros >= 11 => break,
                _ => return false
            }
        }
        *self = lookahead;

        if align {
            let pending = self.bits_to_byte_boundary();

            if pending > 0 && self.peek_bits(pending) == 0 {
                self.drop_bits(pending);
            }
        }
        true
    }
}
