/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::upper_case_acronyms)]

//! Chunk identifiers and flag values used by EA-IFF-85 pictures

/// A four character chunk identifier, stored exactly as it appears
/// in the stream
pub type ChunkId = [u8; 4];

pub const ID_FORM: ChunkId = *b"FORM";
pub const ID_LIST: ChunkId = *b"LIST";
pub const ID_CAT: ChunkId = *b"CAT ";
pub const ID_PROP: ChunkId = *b"PROP";

// FORM variants
pub const ID_ILBM: ChunkId = *b"ILBM";
pub const ID_PBM: ChunkId = *b"PBM ";
pub const ID_RGBN: ChunkId = *b"RGBN";
pub const ID_RGB8: ChunkId = *b"RGB8";
pub const ID_DEEP: ChunkId = *b"DEEP";
pub const ID_ACBM: ChunkId = *b"ACBM";
pub const ID_FAXX: ChunkId = *b"FAXX";
pub const ID_YUVN: ChunkId = *b"YUVN";
pub const ID_META: ChunkId = *b"META";

// bitmap chunks
pub const ID_BMHD: ChunkId = *b"BMHD";
pub const ID_CMAP: ChunkId = *b"CMAP";
pub const ID_CAMG: ChunkId = *b"CAMG";
pub const ID_BODY: ChunkId = *b"BODY";
pub const ID_ABIT: ChunkId = *b"ABIT";

// fax chunks
pub const ID_FXHD: ChunkId = *b"FXHD";
pub const ID_PAGE: ChunkId = *b"PAGE";
pub const ID_FLOG: ChunkId = *b"FLOG";
pub const ID_GPHD: ChunkId = *b"GPHD";

// yuv chunks
pub const ID_YCHD: ChunkId = *b"YCHD";
pub const ID_DATY: ChunkId = *b"DATY";
pub const ID_DATU: ChunkId = *b"DATU";
pub const ID_DATV: ChunkId = *b"DATV";
pub const ID_DATA: ChunkId = *b"DATA";

// deep chunks
pub const ID_DGBL: ChunkId = *b"DGBL";
pub const ID_DPEL: ChunkId = *b"DPEL";
pub const ID_DLOC: ChunkId = *b"DLOC";
pub const ID_DBOD: ChunkId = *b"DBOD";
pub const ID_DCHG: ChunkId = *b"DCHG";
pub const ID_TVDC: ChunkId = *b"TVDC";

// metadata chunks
pub const ID_GRAB: ChunkId = *b"GRAB";
pub const ID_DEST: ChunkId = *b"DEST";
pub const ID_SPRT: ChunkId = *b"SPRT";
pub const ID_CRNG: ChunkId = *b"CRNG";
pub const ID_COPYRIGHT: ChunkId = *b"(c) ";
pub const ID_AUTH: ChunkId = *b"AUTH";
pub const ID_ANNO: ChunkId = *b"ANNO";
pub const ID_TEXT: ChunkId = *b"TEXT";
pub const ID_FVER: ChunkId = *b"FVER";
pub const ID_EXIF: ChunkId = *b"EXIF";
pub const ID_IPTC: ChunkId = *b"IPTC";
pub const ID_XMP0: ChunkId = *b"XMP0";
pub const ID_XMP1: ChunkId = *b"XMP1";
pub const ID_ICCP: ChunkId = *b"ICCP";
pub const ID_ICCN: ChunkId = *b"ICCN";
pub const ID_GEOT: ChunkId = *b"GEOT";
pub const ID_GEOF: ChunkId = *b"GEOF";

/// Metadata chunks kept as a single value, a later instance replaces
/// an earlier one
pub(crate) const METADATA_PROPERTIES: [ChunkId; 7] = [
    ID_GRAB,
    ID_DEST,
    ID_SPRT,
    ID_COPYRIGHT,
    ID_AUTH,
    ID_FVER,
    ID_XMP1
];

/// Metadata chunks that may appear more than once, all instances are kept
pub(crate) const METADATA_COLLECTIONS: [ChunkId; 10] = [
    ID_CRNG, ID_ANNO, ID_TEXT, ID_EXIF, ID_IPTC, ID_XMP0, ID_ICCP, ID_ICCN, ID_GEOT, ID_GEOF
];

/// Amiga viewport mode bits found in a `CAMG` chunk
pub const CAMG_LACE: u32 = 0x0004;
pub const CAMG_EXTRA_HALFBRITE: u32 = 0x0080;
pub const CAMG_HAM: u32 = 0x0800;
pub const CAMG_HIRES: u32 = 0x8000;

/// HAM control codes held in the two top bits of a pixel, code 0 is a
/// palette lookup
pub(crate) const HAM_CODE_BLUE: u8 = 1;
pub(crate) const HAM_CODE_RED: u8 = 2;
pub(crate) const HAM_CODE_GREEN: u8 = 3;

/// The picture variants a `FORM` may carry
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FormType {
    /// Interleaved bitplanes
    ILBM,
    /// Packed, one byte per pixel
    PBM,
    /// 4 bits per channel true color bitplanes
    RGBN,
    /// 8 bits per channel true color bitplanes
    RGB8,
    /// Deep, either planar or component tagged
    DEEP,
    /// Contiguous bitplanes
    ACBM,
    /// Bi-level facsimile
    FAXX,
    /// MacroSystem YUV
    YUVN,
    /// Metadata only, carries no pixels
    META
}

impl FormType {
    pub fn from_id(id: ChunkId) -> Option<FormType> {
        match &id {
            b"ILBM" => Some(FormType::ILBM),
            b"PBM " => Some(FormType::PBM),
            b"RGBN" => Some(FormType::RGBN),
            b"RGB8" => Some(FormType::RGB8),
            b"DEEP" => Some(FormType::DEEP),
            b"ACBM" => Some(FormType::ACBM),
            b"FAXX" => Some(FormType::FAXX),
            b"YUVN" => Some(FormType::YUVN),
            b"META" => Some(FormType::META),
            _ => None
        }
    }

    pub const fn id(self) -> ChunkId {
        match self {
            FormType::ILBM => ID_ILBM,
            FormType::PBM => ID_PBM,
            FormType::RGBN => ID_RGBN,
            FormType::RGB8 => ID_RGB8,
            FormType::DEEP => ID_DEEP,
            FormType::ACBM => ID_ACBM,
            FormType::FAXX => ID_FAXX,
            FormType::YUVN => ID_YUVN,
            FormType::META => ID_META
        }
    }

    /// Whether the variant stores its raster in a `BMHD` described body
    pub const fn has_bitmap_header(self) -> bool {
        matches!(
            self,
            FormType::ILBM
                | FormType::PBM
                | FormType::RGBN
                | FormType::RGB8
                | FormType::ACBM
        )
    }
}

/// Render a chunk id for messages, non printable ids are shown as `????`
pub(crate) fn id_to_str(id: &ChunkId) -> &str {
    match core::str::from_utf8(id) {
        Ok(s) if id.iter().all(|c| (0x20..0x7f).contains(c)) => s,
        _ => "????"
    }
}
