/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Grayscale detection and output format recommendation
//!
//! Nothing here touches pixels except the transparent index lookup, which
//! scans the palette index buffer of the decoded picture.
use alloc::vec::Vec;

use zune_core::log::trace;

use crate::constants::FormType;
use crate::headers::{Masking, Palette};

/// Pixel layout recommended for storing a decoded picture
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColorMode {
    Gray,
    Palette,
    Rgb,
    Rgba
}

/// What [`IffDecoder::output_format`](crate::IffDecoder::output_format)
/// recommends for re-encoding a picture
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputFormat {
    pub color_mode:        ColorMode,
    /// Bits per sample, or per index in palette mode
    pub bit_depth:         u8,
    /// Expanded palette, only present in palette mode
    pub palette:           Option<Vec<[u8; 3]>>,
    pub transparent_index: Option<u8>
}

/// The facts about a picture the analyzer works from
pub(crate) struct PictureTraits<'p> {
    pub form:              FormType,
    pub ham:               bool,
    pub ehb:               bool,
    pub planes:            u8,
    pub has_alpha:         bool,
    pub luma_only:         bool,
    pub masking:           Masking,
    pub transparent_color: u16,
    pub palette:           Option<&'p Palette>,
    pub indices:           Option<&'p [u8]>
}

impl PictureTraits<'_> {
    /// Pixels are palette lookups
    fn is_indexed(&self) -> bool {
        matches!(self.form, FormType::ILBM | FormType::PBM | FormType::ACBM)
            && !self.ham
            && self.palette.is_some()
    }

    fn is_true_color(&self) -> bool {
        self.ham
            || matches!(self.form, FormType::RGBN | FormType::RGB8 | FormType::DEEP)
            || (self.form == FormType::YUVN && !self.luma_only)
    }
}

/// Whether every pixel of the picture is a shade of grey
pub(crate) fn is_grayscale(traits: &PictureTraits) -> bool {
    if traits.is_true_color() {
        return false;
    }
    match traits.palette {
        Some(palette) if traits.is_indexed() => {
            // half brite colors are the palette halved, so grey stays grey
            palette.colors().iter().all(|[r, g, b]| r == g && g == b)
        }
        Some(_) => false,
        None => traits.luma_only || traits.planes == 1
    }
}

/// Smallest index width that can address `colors` entries
fn index_depth(colors: usize) -> u8 {
    match colors {
        0..=2 => 1,
        3..=4 => 2,
        5..=16 => 4,
        _ => 8
    }
}

fn transparent_index(traits: &PictureTraits, keep_index_zero_opaque: bool) -> Option<u8> {
    if traits.masking != Masking::TransparentColor {
        return None;
    }
    let index = u8::try_from(traits.transparent_color).ok()?;

    if keep_index_zero_opaque && index == 0 {
        trace!("Keeping index 0 opaque");
        return None;
    }
    // only worth a transparency entry if some pixel uses it
    traits
        .indices
        .filter(|indices| indices.contains(&index))
        .map(|_| index)
}

/// Recommend how the decoded picture should be stored
pub(crate) fn output_format(traits: &PictureTraits, keep_index_zero_opaque: bool) -> OutputFormat {
    let rgb = |has_alpha: bool| OutputFormat {
        color_mode:        if has_alpha { ColorMode::Rgba } else { ColorMode::Rgb },
        bit_depth:         8,
        palette:           None,
        transparent_index: None
    };

    if traits.is_true_color() || traits.ehb || traits.has_alpha {
        return rgb(traits.has_alpha);
    }
    let grayscale = is_grayscale(traits);

    match traits.palette {
        Some(palette) if traits.is_indexed() => {
            let bit_depth = index_depth(palette.len());
            let transparent_index = transparent_index(traits, keep_index_zero_opaque);

            if grayscale {
                OutputFormat {
                    color_mode: ColorMode::Gray,
                    bit_depth,
                    palette: None,
                    transparent_index
                }
            } else {
                OutputFormat {
                    color_mode: ColorMode::Palette,
                    bit_depth,
                    palette: Some(palette.colors()),
                    transparent_index
                }
            }
        }
        _ if grayscale => {
            let bit_depth = if traits.luma_only {
                8
            } else {
                traits.planes.clamp(1, 8)
            };
            OutputFormat {
                color_mode: ColorMode::Gray,
                bit_depth,
                palette: None,
                transparent_index: None
            }
        }
        _ => rgb(false)
    }
}
