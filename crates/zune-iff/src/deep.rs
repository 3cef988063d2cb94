/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Component tagged `DEEP` bodies (`DGBL` + `DPEL` + `DBOD`)
//!
//! Every pixel is the list of elements described by `DPEL`, one byte each.
//! Rows are either stored raw, packed with ByteRun1 over whole pixels, or
//! delta coded with the sixteen entry `TVDC` table.
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZCursor, ZReader};
use zune_core::colorspace::ColorSpace;
use zune_core::log::{trace, warn};

use crate::constants::ID_TVDC;
use crate::errors::IffDecodeErrors;
use crate::headers::{DeepCompression, DeepCompressionTable, DeepComponent, DeepPixelElement};
use crate::pixels::{checked_size, try_alloc, DecodedPixels};
use crate::rle;

/// Where each element of a source pixel lands in the output pixel
fn element_targets(
    elements: &[DeepPixelElement]
) -> Result<(Vec<Option<usize>>, bool), IffDecodeErrors> {
    let has_alpha = elements
        .iter()
        .any(|e| e.component == DeepComponent::Alpha);

    let mut targets = Vec::with_capacity(elements.len());

    for element in elements {
        if element.bit_depth != 8 {
            return Err(IffDecodeErrors::UnsupportedPlaneCount(element.bit_depth));
        }
        let target = match element.component {
            DeepComponent::Red => Some(0),
            DeepComponent::Green => Some(1),
            DeepComponent::Blue => Some(2),
            DeepComponent::Alpha => Some(3),
            DeepComponent::Unknown(value) => {
                warn!("Unknown DEEP element type {}, skipping", value);
                None
            }
            _ => None
        };
        targets.push(target);
    }
    Ok((targets, has_alpha))
}

/// Four bit codes, high nibble first
struct Nibbles<'r, T: ZByteReaderTrait> {
    reader:  &'r mut ZReader<T>,
    pending: Option<u8>
}

impl<T: ZByteReaderTrait> Nibbles<'_, T> {
    fn next(&mut self) -> Result<u8, IffDecodeErrors> {
        match self.pending.take() {
            Some(low) => Ok(low),
            None => {
                let byte = self.reader.read_u8_err()?;
                self.pending = Some(byte & 0x0F);
                Ok(byte >> 4)
            }
        }
    }
}

/// Decode the `TVDC` delta coding of a single row
///
/// The row holds one run of `width` values per element, each starting
/// from zero on a byte boundary.
fn decode_tvdc_row<T: ZByteReaderTrait>(
    reader: &mut ZReader<T>, table: &DeepCompressionTable, width: usize, element_count: usize,
    row: &mut [u8]
) -> Result<(), IffDecodeErrors> {
    for element in 0..element_count {
        // a fresh reader drops any unread low nibble, which is padding
        let mut nibbles = Nibbles {
            reader:  &mut *reader,
            pending: None
        };
        let mut pixel = 0_u8;
        let mut x = 0;

        while x < width {
            let delta = table.deltas[usize::from(nibbles.next()?)];

            if delta != 0 {
                pixel = pixel.wrapping_add(delta as u8);
                row[x * element_count + element] = pixel;
                x += 1;
            } else {
                let count = (usize::from(nibbles.next()?) + 1).min(width - x);

                for _ in 0..count {
                    row[x * element_count + element] = pixel;
                    x += 1;
                }
            }
        }
    }
    Ok(())
}

/// Decode a chunky `DEEP` body
pub(crate) fn decode_deep_chunky(
    width: usize, height: usize, compression: DeepCompression, elements: &[DeepPixelElement],
    table: Option<&DeepCompressionTable>, body: &[u8]
) -> Result<DecodedPixels, IffDecodeErrors> {
    let (targets, has_alpha) = element_targets(elements)?;
    let unit = elements.len();
    let components = if has_alpha { 4 } else { 3 };

    trace!(
        "Decoding chunky DEEP, {} elements per pixel, compression {:?}",
        unit,
        compression
    );

    let table = match compression {
        DeepCompression::None | DeepCompression::RunLength => None,
        DeepCompression::TvDelta => Some(table.ok_or(IffDecodeErrors::MissingChunk(ID_TVDC))?),
        DeepCompression::Huffman => return Err(IffDecodeErrors::UnsupportedCompression(2)),
        DeepCompression::DynamicHuffman => return Err(IffDecodeErrors::UnsupportedCompression(3)),
        DeepCompression::Jpeg => return Err(IffDecodeErrors::UnsupportedCompression(4)),
        DeepCompression::Unknown(v) => {
            return Err(IffDecodeErrors::UnsupportedCompression(v.min(255) as u8))
        }
    };

    if width == 0 || height == 0 {
        return Err(IffDecodeErrors::ZeroDimensions);
    }
    let mut reader = ZReader::new(ZCursor::new(body));
    let mut pixels = try_alloc(checked_size(width, height, components)?)?;
    let mut row = try_alloc(checked_size(width, unit, 1)?)?;

    for out_row in pixels.chunks_exact_mut(width * components) {
        match (compression, table) {
            (DeepCompression::RunLength, _) => {
                rle::decompress_units(&mut reader, &mut row, unit)?;
            }
            (DeepCompression::TvDelta, Some(table)) => {
                decode_tvdc_row(&mut reader, table, width, unit, &mut row)?;
            }
            _ => reader.read_exact_bytes(&mut row)?
        }

        for (out, source) in out_row
            .chunks_exact_mut(components)
            .zip(row.chunks_exact(unit))
        {
            for (value, target) in source.iter().zip(targets.iter()) {
                if let Some(position) = target {
                    if *position < components {
                        out[*position] = *value;
                    }
                }
            }
        }
    }
    let colorspace = if has_alpha {
        ColorSpace::RGBA
    } else {
        ColorSpace::RGB
    };

    Ok(DecodedPixels {
        pixels,
        indices: None,
        colorspace
    })
}
