/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! `YUVN` pictures
//!
//! Luma, the two chroma planes and an optional alpha plane arrive as
//! separate `DATY`, `DATU`, `DATV` and `DATA` chunks, each holding whole
//! rows of one byte samples.
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZCursor, ZReader};
use zune_core::colorspace::ColorSpace;
use zune_core::log::{trace, warn};

use crate::chunks::PropertyStore;
use crate::constants::{id_to_str, ID_DATA, ID_DATU, ID_DATV, ID_DATY, ID_YCHD};
use crate::errors::IffDecodeErrors;
use crate::headers::YuvHeader;
use crate::pixels::{checked_size, try_alloc, DecodedPixels};

// Bt.601 full range inverse coefficients, 14 bits of precision
const Y_CF: i32 = 16384;
const CR_CF: i32 = 22970;
const CB_CF: i32 = 29032;
const C_G_CR_COEF_1: i32 = -11700;
const C_G_CB_COEF_2: i32 = -5638;
const YUV_PREC: i32 = 14;
const YUV_RND: i32 = (1 << (YUV_PREC - 1)) - 1;

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp(a: i32) -> u8 {
    a.clamp(0, 255) as u8
}

#[inline]
fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8, out: &mut [u8]) {
    let cr = i32::from(cr) - 128;
    let cb = i32::from(cb) - 128;

    let y0 = i32::from(y) * Y_CF + YUV_RND;

    out[0] = clamp((y0 + cr * CR_CF) >> YUV_PREC);
    out[1] = clamp((y0 + cr * C_G_CR_COEF_1 + cb * C_G_CB_COEF_2) >> YUV_PREC);
    out[2] = clamp((y0 + cb * CB_CF) >> YUV_PREC);
}

/// Sample planes of a YUVN picture
#[derive(Default)]
pub(crate) struct YuvPlanes {
    pub luma:  Option<Vec<u8>>,
    pub u:     Option<Vec<u8>>,
    pub v:     Option<Vec<u8>>,
    pub alpha: Option<Vec<u8>>
}

impl YuvPlanes {
    /// Collect the data chunks, starting at the stop chunk the store is
    /// positioned on
    pub fn collect<T: ZByteReaderTrait>(
        store: &mut PropertyStore<T>
    ) -> Result<YuvPlanes, IffDecodeErrors> {
        let mut planes = YuvPlanes::default();
        let mut current = store.current_chunk();

        while let Some(header) = current {
            let slot = match header.id {
                ID_DATY => &mut planes.luma,
                ID_DATU => &mut planes.u,
                ID_DATV => &mut planes.v,
                ID_DATA => &mut planes.alpha,
                _ => {
                    current = store.scan_next()?;
                    continue;
                }
            };
            if slot.is_some() {
                warn!("Duplicate {} chunk, keeping the last", id_to_str(&header.id));
            }
            *slot = Some(store.read_body()?);
            current = store.scan_next()?;
        }
        Ok(planes)
    }
}

/// Convert the sample planes to RGB, or RGBA when an alpha plane exists
pub(crate) fn decode_yuv(
    header: &YuvHeader, planes: &YuvPlanes
) -> Result<DecodedPixels, IffDecodeErrors> {
    if header.compression != 0 {
        return Err(IffDecodeErrors::UnsupportedCompression(header.compression));
    }
    let width = usize::from(header.width);
    let height = usize::from(header.height);

    if width == 0 || height == 0 {
        return Err(IffDecodeErrors::ZeroDimensions);
    }
    let luma = planes
        .luma
        .as_deref()
        .ok_or(IffDecodeErrors::MissingChunk(ID_DATY))?;

    let chroma = match header.mode.chroma_shift() {
        Some(shift) => {
            let u = planes
                .u
                .as_deref()
                .ok_or(IffDecodeErrors::MissingChunk(ID_DATU))?;
            let v = planes
                .v
                .as_deref()
                .ok_or(IffDecodeErrors::MissingChunk(ID_DATV))?;
            Some((shift, u, v))
        }
        None if header.mode.is_luma_only() => None,
        None => {
            return Err(IffDecodeErrors::MalformedChunk(
                ID_YCHD,
                "Unknown YUV sampling mode"
            ))
        }
    };
    let components = if planes.alpha.is_some() { 4 } else { 3 };

    trace!(
        "Decoding YUV {:?}, chroma shift {:?}, alpha: {}",
        header.mode,
        chroma.map(|(shift, _, _)| shift),
        planes.alpha.is_some()
    );

    let mut pixels = try_alloc(checked_size(width, height, components)?)?;

    let mut luma = ZReader::new(ZCursor::new(luma));
    let mut alpha = planes
        .alpha
        .as_deref()
        .map(|a| ZReader::new(ZCursor::new(a)));
    let mut chroma = chroma.map(|(shift, u, v)| {
        (
            shift,
            ZReader::new(ZCursor::new(u)),
            ZReader::new(ZCursor::new(v))
        )
    });

    let chroma_width = chroma
        .as_ref()
        .map_or(0, |(shift, _, _)| (width + (1 << *shift) - 1) >> *shift);

    let mut y_row = try_alloc(width)?;
    let mut u_row = try_alloc(chroma_width)?;
    let mut v_row = try_alloc(chroma_width)?;
    let mut a_row = try_alloc(if alpha.is_some() { width } else { 0 })?;

    for out_row in pixels.chunks_exact_mut(width * components) {
        luma.read_exact_bytes(&mut y_row)?;

        match &mut chroma {
            Some((shift, u, v)) => {
                u.read_exact_bytes(&mut u_row)?;
                v.read_exact_bytes(&mut v_row)?;

                for (x, (pix, y)) in out_row
                    .chunks_exact_mut(components)
                    .zip(y_row.iter())
                    .enumerate()
                {
                    ycbcr_to_rgb(*y, u_row[x >> *shift], v_row[x >> *shift], pix);
                }
            }
            None => {
                for (pix, y) in out_row.chunks_exact_mut(components).zip(y_row.iter()) {
                    pix[..3].fill(*y);
                }
            }
        }

        if let Some(alpha) = &mut alpha {
            alpha.read_exact_bytes(&mut a_row)?;

            for (pix, a) in out_row.chunks_exact_mut(4).zip(a_row.iter()) {
                pix[3] = *a;
            }
        }
    }
    let colorspace = if components == 4 {
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
