/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Palette based bitplane decoders
//!
//! `ILBM` stores every plane of a scanline back to back, `ACBM` stores all
//! rows of plane 0 followed by all rows of plane 1 and so on. Both end up
//! as one palette index per pixel which is then mapped to color either
//! directly, through the Extra-Half-Brite fold or through Hold-and-Modify.
//!
//! `PBM ` is chunky, one index byte per pixel.
use zune_core::bytestream::{ZCursor, ZReader};
use zune_core::colorspace::ColorSpace;
use zune_core::log::trace;

use crate::constants::{HAM_CODE_BLUE, HAM_CODE_GREEN, HAM_CODE_RED};
use crate::errors::IffDecodeErrors;
use crate::headers::{BitMapHeader, Palette};
use crate::pixels::{
    check_bitmap_compression, checked_size, index_buffer, mask_to_alpha, read_plane_row,
    scanline_values, try_alloc, DecodedPixels, ScanlinePlanes
};

/// How a combined plane value becomes a color
#[derive(Copy, Clone)]
pub(crate) enum PixelMapping<'p> {
    /// Straight palette lookup
    Palette(&'p Palette),
    /// Indices 32..=63 are entries 0..=31 at half brightness
    HalfBrite(&'p Palette),
    /// Hold-and-Modify with `planes - 2` value bits
    HoldAndModify(Option<&'p Palette>)
}

/// Where scanline planes come from
#[derive(Copy, Clone)]
pub(crate) enum PlaneLayout<'a> {
    /// All planes of a row together, optionally ByteRun1 packed
    Interleaved(&'a [u8], bool),
    /// Every row of a plane together, never packed
    Contiguous(&'a [u8])
}

impl PixelMapping<'_> {
    const fn keeps_indices(&self) -> bool {
        !matches!(self, PixelMapping::HoldAndModify(_))
    }
}

/// Check the plane count fits the display mode
fn validate_planes(header: &BitMapHeader, mapping: &PixelMapping) -> Result<(), IffDecodeErrors> {
    let planes = header.planes;

    let valid = match mapping {
        PixelMapping::Palette(_) => (1..=8).contains(&planes),
        PixelMapping::HalfBrite(_) => planes == 6,
        PixelMapping::HoldAndModify(_) => (6..=8).contains(&planes)
    };
    if !valid {
        return Err(IffDecodeErrors::UnsupportedPlaneCount(u16::from(planes)));
    }
    Ok(())
}

/// Decode an `ILBM` or `ACBM` body
pub(crate) fn decode_bitplanes(
    header: &BitMapHeader, mapping: PixelMapping, layout: PlaneLayout
) -> Result<DecodedPixels, IffDecodeErrors> {
    validate_planes(header, &mapping)?;

    let width = usize::from(header.width);
    let height = usize::from(header.height);
    let row_bytes = header.row_bytes();
    let data_planes = usize::from(header.planes);
    let has_mask = header.has_mask_plane();
    let total_planes = data_planes + usize::from(has_mask);

    let (components, colorspace) = if has_mask {
        (4, ColorSpace::RGBA)
    } else {
        (3, ColorSpace::RGB)
    };
    trace!(
        "Decoding {} bitplanes, mask plane: {}, {}x{}",
        data_planes,
        has_mask,
        width,
        height
    );

    let mut reader = match layout {
        PlaneLayout::Interleaved(body, _) => {
            check_bitmap_compression(header)?;
            ZReader::new(ZCursor::new(body))
        }
        PlaneLayout::Contiguous(data) => {
            if header.compression != 0 {
                return Err(IffDecodeErrors::UnsupportedCompression(header.compression));
            }
            let plane_size = checked_size(row_bytes, height, 1)?;
            let needed = checked_size(plane_size, total_planes, 1)?;

            if data.len() < needed {
                return Err(IffDecodeErrors::Truncated(needed, data.len()));
            }
            ZReader::new(ZCursor::new(data))
        }
    };

    let mut pixels = try_alloc(checked_size(width, height, components)?)?;
    let mut indices = if mapping.keeps_indices() {
        Some(index_buffer(width, height)?)
    } else {
        None
    };
    let mut scanline = ScanlinePlanes::new(total_planes, row_bytes)?;
    let mut values = scanline_values::<u8>(width);
    let mut alpha = scanline_values::<u8>(width);

    for row in 0..height {
        match layout {
            PlaneLayout::Interleaved(_, compressed) => {
                scanline.read(&mut reader, compressed)?;
            }
            PlaneLayout::Contiguous(data) => {
                let plane_size = row_bytes * height;

                for plane in 0..total_planes {
                    let start = plane * plane_size + row * row_bytes;
                    scanline
                        .plane_mut(plane)
                        .copy_from_slice(&data[start..start + row_bytes]);
                }
            }
        }
        scanline.combine(0, data_planes, &mut values);

        if has_mask {
            mask_to_alpha(scanline.plane(data_planes), &mut alpha);
        }
        let out_row = &mut pixels[row * width * components..(row + 1) * width * components];

        map_row(&mapping, header.planes, &values, out_row, components);

        if has_mask {
            out_row
                .chunks_exact_mut(4)
                .zip(alpha.iter())
                .for_each(|(pix, a)| pix[3] = *a);
        }
        if let Some(indices) = indices.as_mut() {
            indices[row * width..(row + 1) * width].copy_from_slice(&values);
        }
    }

    Ok(DecodedPixels {
        pixels,
        indices,
        colorspace
    })
}

/// Turn one scanline of plane values into color
fn map_row(mapping: &PixelMapping, planes: u8, values: &[u8], out: &mut [u8], components: usize) {
    match mapping {
        PixelMapping::Palette(palette) => {
            for (pix, index) in out.chunks_exact_mut(components).zip(values) {
                pix[..3].copy_from_slice(&palette.color(usize::from(*index)));
            }
        }
        PixelMapping::HalfBrite(palette) => {
            for (pix, index) in out.chunks_exact_mut(components).zip(values) {
                pix[..3].copy_from_slice(&half_brite(palette, *index));
            }
        }
        PixelMapping::HoldAndModify(palette) => {
            let bits = u32::from(planes - 2);
            let shift = 8 - bits;
            let mask = (1_u8 << bits) - 1;
            // a modify code replaces the high bits and holds the low ones
            let held = (1_u8 << shift) - 1;
            let modify = |old: u8, value: u8| (old & held) | (value << shift);

            // every scanline starts from black
            let mut rgb = [0_u8; 3];

            for (pix, value) in out.chunks_exact_mut(components).zip(values) {
                let code = (value >> bits) & 0x03;
                let level = value & mask;

                match code {
                    HAM_CODE_BLUE => rgb[2] = modify(rgb[2], level),
                    HAM_CODE_RED => rgb[0] = modify(rgb[0], level),
                    HAM_CODE_GREEN => rgb[1] = modify(rgb[1], level),
                    // palette lookup
                    _ => match palette {
                        Some(p) if usize::from(level) < p.len() => {
                            rgb = p.color(usize::from(level));
                        }
                        _ => {
                            let grey = (level << shift) | ((level << shift) >> bits);
                            rgb = [grey; 3];
                        }
                    }
                }
                pix[..3].copy_from_slice(&rgb);
            }
        }
    }
}

/// Look up an Extra-Half-Brite index
pub(crate) fn half_brite(palette: &Palette, index: u8) -> [u8; 3] {
    if index < 32 {
        palette.color(usize::from(index))
    } else {
        let [r, g, b] = palette.color(usize::from(index - 32));
        [r >> 1, g >> 1, b >> 1]
    }
}

/// Decode a `PBM ` body, one palette index byte per pixel
pub(crate) fn decode_pbm(
    header: &BitMapHeader, palette: &Palette, body: &[u8]
) -> Result<DecodedPixels, IffDecodeErrors> {
    check_bitmap_compression(header)?;

    if header.planes != 8 {
        return Err(IffDecodeErrors::UnsupportedPlaneCount(u16::from(header.planes)));
    }
    let width = usize::from(header.width);
    let height = usize::from(header.height);

    if width == 0 || height == 0 {
        return Err(IffDecodeErrors::ZeroDimensions);
    }
    let mut reader = ZReader::new(ZCursor::new(body));
    let mut pixels = try_alloc(checked_size(width, height, 3)?)?;
    let mut indices = index_buffer(width, height)?;

    // rows are exactly `width` bytes, with no padding
    for (row, out_row) in indices
        .chunks_exact_mut(width)
        .zip(pixels.chunks_exact_mut(width * 3))
    {
        read_plane_row(&mut reader, header.is_compressed(), row)?;

        for (pix, index) in out_row.chunks_exact_mut(3).zip(row.iter()) {
            pix.copy_from_slice(&palette.color(usize::from(*index)));
        }
    }

    Ok(DecodedPixels {
        pixels,
        indices: Some(indices),
        colorspace: ColorSpace::RGB
    })
}

#[cfg(test)]
mod tests {
    use alloc::vec;
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
            page_width: width as i16,
            page_height: height as i16
        }
    }

    fn gray_palette(entries: usize) -> Palette {
        Palette::new((0..entries).map(|i| [i as u8 * 4; 3]).collect())
    }

    #[test]
    fn ham_holds_untouched_components() {
        // 6 planes, one pixel per value; row bytes are 2 per plane
        // pixel 0: palette entry 1, pixel 1: modify red to 15,
        // pixel 2: modify green to 8, pixel 3: modify blue to 0
        // the low nibble of each modified component is held
        let values: [u8; 4] = [0b00_0001, 0b10_1111, 0b11_1000, 0b01_0000];
        let palette = Palette::new(vec![[0, 0, 0], [10, 20, 30]]);

        let mut body = Vec::new();
        for plane in 0..6 {
            let mut byte = 0_u8;
            for (column, value) in values.iter().enumerate() {
                if value & (1 << plane) != 0 {
                    byte |= 0x80 >> column;
                }
            }
            body.extend_from_slice(&[byte, 0]);
        }
        let decoded = decode_bitplanes(
            &header(4, 1, 6),
            PixelMapping::HoldAndModify(Some(&palette)),
            PlaneLayout::Interleaved(&body, false)
        )
        .unwrap();

        assert_eq!(
            decoded.pixels,
            [10, 20, 30, 0xFA, 20, 30, 0xFA, 0x84, 30, 0xFA, 0x84, 0x0E]
        );
        assert!(decoded.indices.is_none());
    }

    #[test]
    fn ham_without_palette_is_gray() {
        let mut body = [0_u8; 12];
        // value 0b00_1111 at column 0, planes 0..4 set
        for plane in 0..4 {
            body[plane * 2] = 0x80;
        }
        let decoded = decode_bitplanes(
            &header(1, 1, 6),
            PixelMapping::HoldAndModify(None),
            PlaneLayout::Interleaved(&body, false)
        )
        .unwrap();

        assert_eq!(decoded.pixels, [255, 255, 255]);
    }

    #[test]
    fn half_brite_folds_upper_indices() {
        let mut entries = vec![[0_u8; 3]; 32];
        entries[8] = [201, 100, 51];
        let palette = Palette::new(entries);

        assert_eq!(half_brite(&palette, 40), [100, 50, 25]);
        assert_eq!(half_brite(&palette, 8), [201, 100, 51]);
    }

    #[test]
    fn ham_rejects_few_planes() {
        let result = decode_bitplanes(
            &header(1, 1, 5),
            PixelMapping::HoldAndModify(None),
            PlaneLayout::Interleaved(&[], false)
        );
        assert!(matches!(
            result,
            Err(IffDecodeErrors::UnsupportedPlaneCount(5))
        ));
    }

    #[test]
    fn contiguous_planes_match_interleaved() {
        // 2 planes, 3x2 image
        let palette = gray_palette(4);
        let plane0 = [[0b1010_0000_u8, 0], [0b0110_0000, 0]];
        let plane1 = [[0b0110_0000_u8, 0], [0b1100_0000, 0]];

        let mut interleaved = Vec::new();
        let mut contiguous = Vec::new();

        for row in 0..2 {
            interleaved.extend_from_slice(&plane0[row]);
            interleaved.extend_from_slice(&plane1[row]);
        }
        for plane in [plane0, plane1] {
            for row in plane {
                contiguous.extend_from_slice(&row);
            }
        }
        let a = decode_bitplanes(
            &header(3, 2, 2),
            PixelMapping::Palette(&palette),
            PlaneLayout::Interleaved(&interleaved, false)
        )
        .unwrap();
        let b = decode_bitplanes(
            &header(3, 2, 2),
            PixelMapping::Palette(&palette),
            PlaneLayout::Contiguous(&contiguous)
        )
        .unwrap();

        assert_eq!(a.pixels, b.pixels);
        assert_eq!(a.indices, b.indices);
        assert_eq!(a.indices.unwrap(), [1, 2, 3, 2, 3, 1]);
    }

    #[test]
    fn ham_keeps_low_bits_of_held_color() {
        // 8 planes, six value bits: modify codes replace the top six bits
        let palette = Palette::new(vec![[0, 0, 0], [0x1F, 0x2F, 0x3F]]);
        let values: [u8; 2] = [0b00_000001, 0b10_000011];

        let mut body = Vec::new();
        for plane in 0..8 {
            let mut byte = 0_u8;
            for (column, value) in values.iter().enumerate() {
                if value & (1 << plane) != 0 {
                    byte |= 0x80 >> column;
                }
            }
            body.extend_from_slice(&[byte, 0]);
        }
        let decoded = decode_bitplanes(
            &header(2, 1, 8),
            PixelMapping::HoldAndModify(Some(&palette)),
            PlaneLayout::Interleaved(&body, false)
        )
        .unwrap();

        // red: (0x1F & 0b11) | (3 << 2)
        assert_eq!(decoded.pixels, [0x1F, 0x2F, 0x3F, 0x0F, 0x2F, 0x3F]);
    }

    #[test]
    fn pbm_odd_width_rows_are_unpadded() {
        let palette = gray_palette(4);
        let body = [1, 2, 3, 3, 2, 1];

        let decoded = decode_pbm(&header(3, 2, 8), &palette, &body).unwrap();

        assert_eq!(decoded.indices.unwrap(), [1, 2, 3, 3, 2, 1]);
        assert_eq!(&decoded.pixels[..3], &[4, 4, 4]);
        assert_eq!(&decoded.pixels[15..], &[4, 4, 4]);
    }

    #[test]
    fn pbm_compressed_rows() {
        let palette = gray_palette(4);
        // row 0 literal, row 1 a repeat of index 2
        let body = [0x02, 1, 2, 3, 0xFE, 2];

        let mut compressed = header(3, 2, 8);
        compressed.compression = 1;

        let decoded = decode_pbm(&compressed, &palette, &body).unwrap();
        assert_eq!(decoded.indices.unwrap(), [1, 2, 3, 2, 2, 2]);
    }
}
