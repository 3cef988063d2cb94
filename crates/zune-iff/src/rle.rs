/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! ByteRun1 run length coding
//!
//! Each run starts with a signed control byte `n`
//! - `0..=127`: copy the next `n + 1` bytes literally
//! - `-127..=-1`: repeat the next byte `-n + 1` times
//! - `-128`: no operation
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZReader};

use crate::errors::IffDecodeErrors;

/// Decode ByteRun1 data from `reader` until `dest` is full
///
/// Input past the point where `dest` is filled is left unread so the
/// next row can continue from it.
pub fn decompress<T: ZByteReaderTrait>(
    reader: &mut ZReader<T>, dest: &mut [u8]
) -> Result<(), IffDecodeErrors> {
    decompress_units(reader, dest, 1)
}

/// Decode ByteRun1 data where every literal and repeat count refers to
/// `unit` byte groups rather than single bytes
///
/// A `unit` of 1 is plain ByteRun1.
pub fn decompress_units<T: ZByteReaderTrait>(
    reader: &mut ZReader<T>, dest: &mut [u8], unit: usize
) -> Result<(), IffDecodeErrors> {
    if unit == 0 {
        return Err(IffDecodeErrors::Generic("zero sized ByteRun1 unit"));
    }
    let mut position = 0;

    while position < dest.len() {
        let control = reader.read_u8_err()?;

        match control {
            0..=127 => {
                let count = (usize::from(control) + 1) * unit;
                let end = position + count;

                if end > dest.len() {
                    return Err(IffDecodeErrors::RleOverflow);
                }
                reader.read_exact_bytes(&mut dest[position..end])?;
                position = end;
            }
            128 => {}
            _ => {
                let count = 257 - usize::from(control);
                let end = position + count * unit;

                if end > dest.len() {
                    return Err(IffDecodeErrors::RleOverflow);
                }
                reader.read_exact_bytes(&mut dest[position..position + unit])?;

                for start in (position + unit..end).step_by(unit) {
                    dest.copy_within(position..position + unit, start);
                }
                position = end;
            }
        }
    }
    Ok(())
}

/// Pack `src` with ByteRun1
///
/// Runs of three or more equal bytes become repeat runs, everything else
/// is emitted as literals of at most 128 bytes.
pub fn compress(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() + src.len() / 128 + 1);
    let mut literal_start = 0;
    let mut i = 0;

    let flush_literals = |out: &mut Vec<u8>, literals: &[u8]| {
        for chunk in literals.chunks(128) {
            out.push((chunk.len() - 1) as u8);
            out.extend_from_slice(chunk);
        }
    };

    while i < src.len() {
        let value = src[i];
        let mut run = 1;

        while i + run < src.len() && src[i + run] == value && run < 128 {
            run += 1;
        }
        if run >= 3 {
            flush_literals(&mut out, &src[literal_start..i]);
            out.push((257 - run) as u8);
            out.push(value);
            i += run;
            literal_start = i;
        } else {
            i += run;
        }
    }
    flush_literals(&mut out, &src[literal_start..]);

    out
}
