/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Modified Huffman and Modified READ page decoding
//!
//! A scanline is kept as its list of changing elements, the columns where
//! the color flips. Lines start white, so even entries switch to black and
//! odd entries back to white.
use alloc::vec::Vec;

use zune_core::log::{trace, warn};

use crate::errors::IffDecodeErrors;
use crate::fax::bitstream::FaxBitReader;
use crate::fax::tables::{lookup_mode, lookup_run, Mode, RunCode, MAX_CODE_LEN, MAX_MODE_LEN};
use crate::headers::{FaxCompression, FaxHeader};
use crate::pixels::{checked_size, try_alloc};

const WHITE: u8 = 255;
const BLACK: u8 = 0;

/// Why a scanline stopped early
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum LineError {
    /// The input ran out
    Exhausted,
    /// Bits that match no code
    BadCode
}

pub(crate) struct FaxLineDecoder<'src> {
    reader: FaxBitReader<'src>,
    width:  usize
}

impl<'src> FaxLineDecoder<'src> {
    pub fn new(data: &'src [u8], width: usize) -> FaxLineDecoder<'src> {
        FaxLineDecoder {
            reader: FaxBitReader::new(data),
            width
        }
    }

    fn read_run_code(&mut self, white: bool) -> Result<RunCode, LineError> {
        let mut code = 0_u16;

        for len in 1..=MAX_CODE_LEN {
            let bit = self.reader.get_bit().ok_or(LineError::Exhausted)?;
            code = (code << 1) | u16::from(bit);

            if let Some(run) = lookup_run(code, len, white) {
                return Ok(run);
            }
        }
        Err(LineError::BadCode)
    }

    /// Read one run length, makeup codes chain until a terminating code
    pub fn read_run(&mut self, white: bool) -> Result<usize, LineError> {
        let mut total = 0;

        loop {
            match self.read_run_code(white)? {
                RunCode::Makeup(run) => total += usize::from(run),
                RunCode::Terminating(run) => return Ok(total + usize::from(run))
            }
        }
    }

    fn read_mode(&mut self) -> Result<Mode, LineError> {
        let mut code = 0_u8;

        for len in 1..=MAX_MODE_LEN {
            let bit = self.reader.get_bit().ok_or(LineError::Exhausted)?;
            code = (code << 1) | bit;

            if let Some(mode) = lookup_mode(code, len) {
                return Ok(mode);
            }
        }
        Err(LineError::BadCode)
    }

    /// Decode a one dimensional line into `changes`
    ///
    /// On error `changes` holds what was decoded so far.
    pub fn decode_1d(&mut self, changes: &mut Vec<usize>) -> Result<(), LineError> {
        changes.clear();

        let mut a0 = 0;
        let mut white = true;

        while a0 < self.width {
            let run = self.read_run(white)?;

            a0 = (a0 + run).min(self.width);
            changes.push(a0);
            white = !white;
        }
        Ok(())
    }

    /// Decode a two dimensional line predicted from `reference`
    ///
    /// `reference` must be normalized, see [`normalize_changes`].
    pub fn decode_2d(
        &mut self, reference: &[usize], changes: &mut Vec<usize>
    ) -> Result<(), LineError> {
        changes.clear();

        let width = self.width as isize;
        // a0 starts on an imaginary white pixel left of the line
        let mut a0: isize = -1;
        let mut white = true;

        while a0 < width {
            let (b1, b2) = find_b1_b2(reference, a0, white, self.width);

            match self.read_mode()? {
                Mode::Pass => {
                    a0 = b2 as isize;
                }
                Mode::Horizontal => {
                    let start = a0.max(0) as usize;
                    let a1 = (start + self.read_run(white)?).min(self.width);
                    changes.push(a1);

                    let a2 = (a1 + self.read_run(!white)?).min(self.width);
                    changes.push(a2);

                    a0 = a2 as isize;
                }
                Mode::Vertical(offset) => {
                    let a1 = b1 as isize + isize::from(offset);

                    if a1 <= a0 || a1 > width {
                        return Err(LineError::BadCode);
                    }
                    changes.push(a1 as usize);
                    a0 = a1;
                    white = !white;
                }
            }
        }
        Ok(())
    }

    pub fn skip_eol(&mut self, align: bool) -> bool {
        self.reader.skip_eol(align)
    }

    pub fn get_bit(&mut self) -> Option<u8> {
        self.reader.get_bit()
    }

    pub const fn is_exhausted(&self) -> bool {
        self.reader.is_exhausted()
    }
}

/// Locate `b1`, the first change on the reference line right of `a0`
/// that switches to the color opposite `white`, and the change after it
fn find_b1_b2(reference: &[usize], a0: isize, white: bool, width: usize) -> (usize, usize) {
    // even entries switch to black
    let wanted_parity = if white { 0 } else { 1 };

    let position = reference
        .iter()
        .enumerate()
        .position(|(i, change)| *change as isize > a0 && i & 1 == wanted_parity);

    match position {
        Some(i) => (
            reference[i],
            reference.get(i + 1).copied().unwrap_or(width)
        ),
        None => (width, width)
    }
}

/// Drop changes at or past `width` and cancel out empty runs, leaving a
/// strictly increasing list
pub(crate) fn normalize_changes(changes: &mut Vec<usize>, width: usize) {
    let mut out = 0;

    for i in 0..changes.len() {
        let change = changes[i];

        if change >= width {
            break;
        }
        if out > 0 && changes[out - 1] == change {
            out -= 1;
        } else {
            changes[out] = change;
            out += 1;
        }
    }
    changes.truncate(out);
}

/// Write a normalized line as RGB
fn paint_line(changes: &[usize], row: &mut [u8]) {
    let width = row.len() / 3;
    let mut white = true;
    let mut x = 0;

    for end in changes.iter().copied().chain(core::iter::once(width)) {
        let end = end.clamp(x, width);
        let color = if white { WHITE } else { BLACK };

        row[x * 3..end * 3].fill(color);
        x = end;
        white = !white;
    }
}

fn decode_raw(data: &[u8], width: usize, pixels: &mut [u8]) {
    let stride = (width + 7) / 8;

    for (row, line) in pixels
        .chunks_exact_mut(width * 3)
        .zip(data.chunks_exact(stride))
    {
        for (x, pix) in row.chunks_exact_mut(3).enumerate() {
            // set bits are black
            if line[x >> 3] & (0x80 >> (x & 7)) != 0 {
                pix.fill(BLACK);
            }
        }
    }
    if data.len() / stride < pixels.len() / (width * 3) {
        warn!("Fax page ends early, filling remaining lines with white");
    }
}

/// Decode a `PAGE` body into RGB
///
/// Running out of data fills the rest of the page with white. Bits that
/// match no code do the same unless `strict` is set.
pub(crate) fn decode_fax(
    data: &[u8], header: &FaxHeader, strict: bool
) -> Result<Vec<u8>, IffDecodeErrors> {
    let width = usize::from(header.width);
    let height = usize::from(header.height);

    let two_dimensional = match header.compression {
        FaxCompression::None => false,
        FaxCompression::ModifiedHuffman => false,
        FaxCompression::ModifiedRead => true,
        c => return Err(IffDecodeErrors::UnsupportedCompression(c.to_u8()))
    };

    let mut pixels = try_alloc(checked_size(width, height, 3)?)?;
    pixels.fill(WHITE);

    if header.compression == FaxCompression::None {
        decode_raw(data, width, &mut pixels);
        return Ok(pixels);
    }
    trace!("Decoding fax page, two dimensional: {}", two_dimensional);

    let mut decoder = FaxLineDecoder::new(data, width);
    let mut reference = Vec::new();
    let mut changes = Vec::new();

    for (y, row) in pixels.chunks_exact_mut(width * 3).enumerate() {
        if decoder.is_exhausted() {
            warn!("Fax data ends at line {}, filling the rest with white", y);
            break;
        }
        let had_eol = decoder.skip_eol(!two_dimensional);

        let result = if !two_dimensional {
            decoder.decode_1d(&mut changes)
        } else if y == 0 {
            // the first line is always one dimensional, its tag only
            // exists when the line is introduced by an EOL
            if had_eol {
                decoder.get_bit();
            }
            decoder.decode_1d(&mut changes)
        } else {
            match decoder.get_bit() {
                Some(1) => decoder.decode_1d(&mut changes),
                Some(_) => decoder.decode_2d(&reference, &mut changes),
                None => {
                    changes.clear();
                    Err(LineError::Exhausted)
                }
            }
        };
        normalize_changes(&mut changes, width);
        paint_line(&changes, row);

        match result {
            Ok(()) => {}
            Err(LineError::Exhausted) => {
                warn!("Fax data ends at line {}, filling the rest with white", y);
                break;
            }
            Err(LineError::BadCode) => {
                if strict {
                    return Err(IffDecodeErrors::FaxCode(y));
                }
                warn!("Invalid fax code at line {}, filling the rest with white", y);
                break;
            }
        }
        core::mem::swap(&mut reference, &mut changes);
    }
    Ok(pixels)
}
