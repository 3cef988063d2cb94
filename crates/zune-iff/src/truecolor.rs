/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! True color bitplane decoders, `RGBN`, `RGB8` and planar `DEEP`
//!
//! Each scanline holds the red planes, then green, then blue, least
//! significant plane first, optionally followed by a single alpha plane.
use zune_core::bytestream::{ZCursor, ZReader};
use zune_core::colorspace::ColorSpace;
use zune_core::log::trace;

use crate::errors::IffDecodeErrors;
use crate::headers::BitMapHeader;
use crate::pixels::{
    check_bitmap_compression, checked_size, scale_to_u8, scanline_values, try_alloc,
    DecodedPixels, ScanlinePlanes
};

/// Plane arrangement of a true color body
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct ChannelLayout {
    /// Planes for each of red, green and blue
    pub bits:        usize,
    /// A trailing alpha plane follows the color planes
    pub alpha_plane: bool
}

impl ChannelLayout {
    /// 4 bits per channel, 12 or 13 planes
    pub fn rgbn(planes: u8) -> Result<ChannelLayout, IffDecodeErrors> {
        match planes {
            12 | 13 => Ok(ChannelLayout {
                bits:        4,
                alpha_plane: planes == 13
            }),
            p => Err(IffDecodeErrors::UnsupportedPlaneCount(u16::from(p)))
        }
    }

    /// 8 bits per channel, 24 or 25 planes
    pub fn rgb8(planes: u8) -> Result<ChannelLayout, IffDecodeErrors> {
        match planes {
            24 | 25 => Ok(ChannelLayout {
                bits:        8,
                alpha_plane: planes == 25
            }),
            p => Err(IffDecodeErrors::UnsupportedPlaneCount(u16::from(p)))
        }
    }

    /// Planes split evenly in three, up to 16 bits per channel
    pub fn deep(planes: u8) -> Result<ChannelLayout, IffDecodeErrors> {
        if planes == 0 || planes % 3 != 0 || planes / 3 > 16 {
            return Err(IffDecodeErrors::UnsupportedPlaneCount(u16::from(planes)));
        }
        Ok(ChannelLayout {
            bits:        usize::from(planes / 3),
            alpha_plane: false
        })
    }

    const fn planes(&self) -> usize {
        self.bits * 3 + self.alpha_plane as usize
    }
}

/// Decode a true color bitplane body into RGB
pub(crate) fn decode_truecolor(
    header: &BitMapHeader, layout: ChannelLayout, body: &[u8]
) -> Result<DecodedPixels, IffDecodeErrors> {
    check_bitmap_compression(header)?;

    let width = usize::from(header.width);
    let height = usize::from(header.height);

    if width == 0 || height == 0 {
        return Err(IffDecodeErrors::ZeroDimensions);
    }
    let mut reader = ZReader::new(ZCursor::new(body));

    trace!(
        "Decoding true color planes, {} bits per channel, alpha plane: {}",
        layout.bits,
        layout.alpha_plane
    );

    let mut pixels = try_alloc(checked_size(width, height, 3)?)?;
    // the alpha plane is read so the stream stays in step, then dropped
    let mut scanline = ScanlinePlanes::new(layout.planes(), header.row_bytes())?;
    let mut values = scanline_values::<u32>(width);

    for out_row in pixels.chunks_exact_mut(width * 3) {
        scanline.read(&mut reader, header.is_compressed())?;

        for channel in 0..3 {
            scanline.combine(channel * layout.bits, layout.bits, &mut values);

            for (pix, value) in out_row.chunks_exact_mut(3).zip(values.iter()) {
                pix[channel] = scale_to_u8(*value, layout.bits as u32);
            }
        }
    }

    Ok(DecodedPixels {
        pixels,
        indices: None,
        colorspace: ColorSpace::RGB
    })
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::headers::Masking;

    fn header(width: u16, height: u16, planes: u8) -> BitMapHeader {
        BitMapHeader {
            width,
            height,
            x: 0,
            y: 0,
            planes,
            masking: Masking::None,
            compression: 0,
            pad: 0,
            transparent_color: 0,
            x_aspect: 1,
            y_aspect: 1,
            page_width: 0,
            page_height: 0
        }
    }

    /// Build one uncompressed scanline from per pixel plane values
    fn planes_for(values: &[u32], planes: usize) -> Vec<u8> {
        let mut out = Vec::new();

        for plane in 0..planes {
            let mut row = [0_u8; 2];
            for (column, value) in values.iter().enumerate() {
                if value & (1 << plane) != 0 {
                    row[column >> 3] |= 0x80 >> (column & 7);
                }
            }
            out.extend_from_slice(&row);
        }
        out
    }

    #[test]
    fn rgbn_scales_by_17() {
        // r = 15, g = 1, b = 8 packed as 12 bits plus an alpha plane
        let value = 15 | (1 << 4) | (8 << 8) | (1 << 12);
        let body = planes_for(&[value], 13);

        let layout = ChannelLayout::rgbn(13).unwrap();
        let decoded = decode_truecolor(&header(1, 1, 13), layout, &body).unwrap();

        assert_eq!(decoded.pixels, [255, 17, 136]);
        // the alpha plane must be present even though it is dropped
        let short = decode_truecolor(&header(1, 1, 13), layout, &body[..24]);
        assert!(matches!(short, Err(IffDecodeErrors::Truncated(..))));
    }

    #[test]
    fn rgb8_is_identity() {
        let value = 0x12 | (0x34 << 8) | (0x56 << 16);
        let body = planes_for(&[value, 0], 24);

        let layout = ChannelLayout::rgb8(24).unwrap();
        let decoded = decode_truecolor(&header(2, 1, 24), layout, &body).unwrap();

        assert_eq!(decoded.pixels, [0x12, 0x34, 0x56, 0, 0, 0]);
    }

    #[test]
    fn plane_counts() {
        assert!(ChannelLayout::rgbn(14).is_err());
        assert!(ChannelLayout::rgb8(23).is_err());
        assert!(ChannelLayout::deep(25).is_err());
        assert_eq!(ChannelLayout::deep(36).unwrap().bits, 12);
    }
}
