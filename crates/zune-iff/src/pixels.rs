/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Output buffers and the bitplane helpers shared by the raster decoders
use alloc::vec;
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZReader};
use zune_core::colorspace::ColorSpace;

use crate::errors::IffDecodeErrors;
use crate::headers::BitMapHeader;
use crate::rle;

/// The result of a successful decode
pub(crate) struct DecodedPixels {
    pub pixels:     Vec<u8>,
    /// One palette index per pixel, only for indexed sources
    pub indices:    Option<Vec<u8>>,
    pub colorspace: ColorSpace
}

/// Allocate a zeroed buffer, reporting failure instead of aborting
pub(crate) fn try_alloc(size: usize) -> Result<Vec<u8>, IffDecodeErrors> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(size)
        .map_err(|_| IffDecodeErrors::NoMemory(size))?;
    buffer.resize(size, 0);

    Ok(buffer)
}

/// `width * height * components` with overflow reported as an error
pub(crate) fn checked_size(
    width: usize, height: usize, components: usize
) -> Result<usize, IffDecodeErrors> {
    width
        .checked_mul(height)
        .and_then(|x| x.checked_mul(components))
        .ok_or(IffDecodeErrors::LargeDimensions(usize::MAX, width))
}

/// Reject compression codes the bitmap variants cannot decode
pub(crate) fn check_bitmap_compression(header: &BitMapHeader) -> Result<(), IffDecodeErrors> {
    match header.compression {
        0 | 1 => Ok(()),
        c => Err(IffDecodeErrors::UnsupportedCompression(c))
    }
}

/// Fill `out` with the next plane row, decompressing if needed
pub(crate) fn read_plane_row<T: ZByteReaderTrait>(
    reader: &mut ZReader<T>, compressed: bool, out: &mut [u8]
) -> Result<(), IffDecodeErrors> {
    if compressed {
        rle::decompress(reader, out)
    } else {
        reader.read_exact_bytes(out)?;
        Ok(())
    }
}

/// Or bit `column` of `plane_row` into bit `bit` of each value
///
/// Bits are stored most significant first, the leftmost pixel is bit 7
/// of byte 0.
#[inline]
pub(crate) fn gather_plane<T>(plane_row: &[u8], bit: u32, values: &mut [T])
where
    T: Copy + core::ops::BitOrAssign + From<u8> + core::ops::Shl<u32, Output = T>
{
    let one = T::from(1);

    for (column, value) in values.iter_mut().enumerate() {
        if plane_row[column >> 3] & (0x80 >> (column & 7)) != 0 {
            *value |= one << bit;
        }
    }
}

/// Convert a mask plane row into alpha bytes
pub(crate) fn mask_to_alpha(plane_row: &[u8], alpha: &mut [u8]) {
    for (column, value) in alpha.iter_mut().enumerate() {
        *value = if plane_row[column >> 3] & (0x80 >> (column & 7)) != 0 {
            255
        } else {
            0
        };
    }
}

/// Scale an unsigned value of `bits` bits to the 0..=255 range
pub(crate) fn scale_to_u8(value: u32, bits: u32) -> u8 {
    match bits {
        0 => 0,
        8 => value as u8,
        1..=7 => {
            let max = (1_u32 << bits) - 1;
            ((value.min(max) * 255) / max) as u8
        }
        _ => (value >> (bits - 8)) as u8
    }
}

/// Scratch space for one scanline of bitplanes
pub(crate) struct ScanlinePlanes {
    pub rows:      Vec<u8>,
    pub row_bytes: usize
}

impl ScanlinePlanes {
    pub fn new(planes: usize, row_bytes: usize) -> Result<ScanlinePlanes, IffDecodeErrors> {
        let size = planes
            .checked_mul(row_bytes)
            .ok_or(IffDecodeErrors::LargeDimensions(usize::MAX, row_bytes))?;

        Ok(ScanlinePlanes {
            rows: try_alloc(size)?,
            row_bytes
        })
    }

    /// Read `planes` consecutive plane rows from `reader`
    pub fn read<T: ZByteReaderTrait>(
        &mut self, reader: &mut ZReader<T>, compressed: bool
    ) -> Result<(), IffDecodeErrors> {
        for row in self.rows.chunks_exact_mut(self.row_bytes) {
            read_plane_row(reader, compressed, row)?;
        }
        Ok(())
    }

    pub fn plane(&self, plane: usize) -> &[u8] {
        &self.rows[plane * self.row_bytes..(plane + 1) * self.row_bytes]
    }

    pub fn plane_mut(&mut self, plane: usize) -> &mut [u8] {
        &mut self.rows[plane * self.row_bytes..(plane + 1) * self.row_bytes]
    }

    /// Combine planes `start..start + count` into one value per pixel,
    /// plane `start` becoming bit 0
    pub fn combine<T>(&self, start: usize, count: usize, values: &mut [T])
    where
        T: Copy + Default + core::ops::BitOrAssign + From<u8> + core::ops::Shl<u32, Output = T>
    {
        values.iter_mut().for_each(|x| *x = T::default());

        for bit in 0..count {
            gather_plane(self.plane(start + bit), bit as u32, values);
        }
    }
}

/// Allocate an index buffer and return it zeroed
pub(crate) fn index_buffer(width: usize, height: usize) -> Result<Vec<u8>, IffDecodeErrors> {
    try_alloc(checked_size(width, height, 1)?)
}

/// Per pixel scratch values for one scanline
pub(crate) fn scanline_values<T: Clone + Default>(width: usize) -> Vec<T> {
    vec![T::default(); width]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gathers_msb_first() {
        let mut values = [0_u8; 10];

        gather_plane(&[0b1010_0000, 0b0100_0000], 0, &mut values);
        gather_plane(&[0b1100_0000, 0b0000_0000], 1, &mut values);

        assert_eq!(values, [3, 2, 1, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn scaling() {
        assert_eq!(scale_to_u8(15, 4), 255);
        assert_eq!(scale_to_u8(1, 4), 17);
        assert_eq!(scale_to_u8(1, 1), 255);
        assert_eq!(scale_to_u8(200, 8), 200);
        assert_eq!(scale_to_u8(0xABCD, 16), 0xAB);
    }

    #[test]
    fn mask_plane() {
        let mut alpha = [9; 4];
        mask_to_alpha(&[0b0110_0000], &mut alpha);
        assert_eq!(alpha, [0, 255, 255, 0]);
    }
}
