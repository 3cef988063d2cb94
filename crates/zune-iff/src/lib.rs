/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! An EA-IFF-85 picture decoder
//!
//! Decodes the raster variants found in Amiga era IFF files into RGB(A)
//! pixels
//!
//! | FORM   | Contents                                              |
//! |--------|-------------------------------------------------------|
//! | `ILBM` | Interleaved bitplanes, with HAM and Extra-Half-Brite  |
//! | `PBM ` | One palette index byte per pixel                      |
//! | `ACBM` | Contiguous bitplanes                                  |
//! | `RGBN` | 4 bits per channel true color planes                  |
//! | `RGB8` | 8 bits per channel true color planes                  |
//! | `DEEP` | Planar true color or component tagged chunky pixels   |
//! | `FAXX` | Bi-level fax pages, raw, Modified Huffman or READ     |
//! | `YUVN` | Separate luma and chroma planes                       |
//!
//! Metadata chunks (`ANNO`, `AUTH`, `EXIF`, `ICCP` ...) are kept verbatim
//! and exposed through [`IffMetadata`].
//!
//! # Features
//! - `no_std` by default with `alloc`
//! - `std`: implements `std::error::Error` for [`IffDecodeErrors`]
//! - `log`: forwards trace output to the `log` crate
//!
//! # Example
//! ```no_run
//! use zune_core::bytestream::ZCursor;
//! use zune_iff::IffDecoder;
//!
//! let data = std::fs::read("picture.iff").unwrap();
//! let mut decoder = IffDecoder::new(ZCursor::new(&data));
//!
//! decoder.decode().unwrap();
//! let pixels = decoder.pixels().unwrap();
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

pub use zune_core;

pub use crate::analyzer::{ColorMode, OutputFormat};
pub use crate::chunks::{ChunkHeader, ChunkKind, ChunkReader, PropertyStore};
pub use crate::constants::*;
pub use crate::decoder::{probe_iff, IffDecoder, IffImageInfo};
pub use crate::errors::{IffDecodeErrors, IffErrorKind};
pub use crate::headers::*;
pub use crate::metadata::*;

mod analyzer;
mod chunks;
mod constants;
mod decoder;
mod deep;
mod errors;
mod fax;
mod headers;
mod metadata;
mod pixels;
mod planar;
pub mod rle;
mod truecolor;
mod yuv;
