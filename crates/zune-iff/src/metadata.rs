/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Auxiliary chunks carried alongside the raster
//!
//! The small fixed layout records (`GRAB`, `DEST`, `SPRT`, `CRNG`) are
//! parsed, everything else is kept as the raw chunk payload.
use alloc::vec::Vec;

use zune_core::bytestream::ZByteReaderTrait;
use zune_core::log::warn;

use crate::chunks::PropertyStore;
use crate::constants::{
    id_to_str, ChunkId, ID_ANNO, ID_AUTH, ID_COPYRIGHT, ID_CRNG, ID_DEST, ID_EXIF, ID_FVER,
    ID_GEOF, ID_GEOT, ID_GRAB, ID_ICCN, ID_ICCP, ID_IPTC, ID_SPRT, ID_TEXT, ID_XMP0, ID_XMP1
};
use crate::errors::IffDecodeErrors;
use crate::headers::chunk_reader;

/// A `GRAB` hotspot
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Point2D {
    pub x: i16,
    pub y: i16
}

/// A `DEST` merge description
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DestMerge {
    pub depth:        u8,
    pub pad1:         u8,
    pub plane_pick:   u16,
    pub plane_on_off: u16,
    pub plane_mask:   u16
}

/// Color cycling is active
pub const RNG_ACTIVE: i16 = 1;
/// Color cycling runs downwards
pub const RNG_REVERSE: i16 = 2;

/// A `CRNG` color cycling range
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ColorRange {
    pub pad1:  i16,
    pub rate:  i16,
    pub flags: i16,
    pub low:   u8,
    pub high:  u8
}

impl ColorRange {
    pub const fn is_active(&self) -> bool {
        self.flags & RNG_ACTIVE != 0
    }

    pub const fn is_reversed(&self) -> bool {
        self.flags & RNG_REVERSE != 0
    }
}

/// Everything besides pixels a picture may carry
///
/// Blobs are returned exactly as stored.
#[derive(Clone, Debug, Default)]
pub struct IffMetadata {
    pub(crate) grab:            Option<Point2D>,
    pub(crate) dest:            Option<DestMerge>,
    pub(crate) sprite_order:    Option<u16>,
    pub(crate) color_ranges:    Vec<ColorRange>,
    pub(crate) copyright:       Option<Vec<u8>>,
    pub(crate) author:          Option<Vec<u8>>,
    pub(crate) annotations:     Vec<Vec<u8>>,
    pub(crate) texts:           Vec<Vec<u8>>,
    pub(crate) version:         Option<Vec<u8>>,
    pub(crate) exif:            Vec<Vec<u8>>,
    pub(crate) iptc:            Vec<Vec<u8>>,
    pub(crate) xmp0:            Vec<Vec<u8>>,
    pub(crate) xmp1:            Option<Vec<u8>>,
    pub(crate) icc_profiles:    Vec<Vec<u8>>,
    pub(crate) icc_names:       Vec<Vec<u8>>,
    pub(crate) geotiff:         Vec<Vec<u8>>,
    /// `GEOF` payloads, the id of the format the `GEOT` data came from
    pub(crate) geotiff_origins: Vec<ChunkId>
}

fn first(blobs: &[Vec<u8>]) -> Option<&[u8]> {
    blobs.first().map(Vec::as_slice)
}

fn all(blobs: &[Vec<u8>]) -> Vec<&[u8]> {
    blobs.iter().map(Vec::as_slice).collect()
}

fn short_chunk(id: ChunkId, strict: bool, reason: &'static str) -> Result<(), IffDecodeErrors> {
    if strict {
        return Err(IffDecodeErrors::MalformedChunk(id, reason));
    }
    warn!("Ignoring {} chunk: {}", id_to_str(&id), reason);
    Ok(())
}

impl IffMetadata {
    /// Move the metadata chunks out of a store that has finished scanning
    pub(crate) fn from_store<T: ZByteReaderTrait>(
        store: &mut PropertyStore<T>, strict: bool
    ) -> Result<IffMetadata, IffDecodeErrors> {
        let mut metadata = IffMetadata::default();

        if let Some(bytes) = store.find_property(ID_GRAB) {
            if bytes.len() < 4 {
                short_chunk(ID_GRAB, strict, "GRAB shorter than 4 bytes")?;
            } else {
                let mut stream = chunk_reader(bytes);
                metadata.grab = Some(Point2D {
                    x: stream.get_u16_be_err()? as i16,
                    y: stream.get_u16_be_err()? as i16
                });
            }
        }
        if let Some(bytes) = store.find_property(ID_DEST) {
            if bytes.len() < 8 {
                short_chunk(ID_DEST, strict, "DEST shorter than 8 bytes")?;
            } else {
                let mut stream = chunk_reader(bytes);
                metadata.dest = Some(DestMerge {
                    depth:        stream.read_u8_err()?,
                    pad1:         stream.read_u8_err()?,
                    plane_pick:   stream.get_u16_be_err()?,
                    plane_on_off: stream.get_u16_be_err()?,
                    plane_mask:   stream.get_u16_be_err()?
                });
            }
        }
        if let Some(bytes) = store.find_property(ID_SPRT) {
            if bytes.len() < 2 {
                short_chunk(ID_SPRT, strict, "SPRT shorter than 2 bytes")?;
            } else {
                metadata.sprite_order = Some(u16::from_be_bytes([bytes[0], bytes[1]]));
            }
        }
        for bytes in store.find_collection(ID_CRNG) {
            if bytes.len() < 8 {
                short_chunk(ID_CRNG, strict, "CRNG shorter than 8 bytes")?;
                continue;
            }
            let mut stream = chunk_reader(bytes);

            metadata.color_ranges.push(ColorRange {
                pad1:  stream.get_u16_be_err()? as i16,
                rate:  stream.get_u16_be_err()? as i16,
                flags: stream.get_u16_be_err()? as i16,
                low:   stream.read_u8_err()?,
                high:  stream.read_u8_err()?
            });
        }
        for bytes in store.find_collection(ID_GEOF) {
            if bytes.len() < 4 {
                short_chunk(ID_GEOF, strict, "GEOF shorter than 4 bytes")?;
                continue;
            }
            metadata
                .geotiff_origins
                .push([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }

        metadata.copyright = store.take_property(ID_COPYRIGHT);
        metadata.author = store.take_property(ID_AUTH);
        metadata.version = store.take_property(ID_FVER);
        metadata.xmp1 = store.take_property(ID_XMP1);

        metadata.annotations = store.take_collection(ID_ANNO);
        metadata.texts = store.take_collection(ID_TEXT);
        metadata.exif = store.take_collection(ID_EXIF);
        metadata.iptc = store.take_collection(ID_IPTC);
        metadata.xmp0 = store.take_collection(ID_XMP0);
        metadata.icc_profiles = store.take_collection(ID_ICCP);
        metadata.icc_names = store.take_collection(ID_ICCN);
        metadata.geotiff = store.take_collection(ID_GEOT);

        Ok(metadata)
    }

    /// The `GRAB` hotspot
    pub const fn grab(&self) -> Option<Point2D> {
        self.grab
    }

    /// The `DEST` merge description
    pub const fn dest(&self) -> Option<DestMerge> {
        self.dest
    }

    /// The `SPRT` sprite precedence
    pub const fn sprite_order(&self) -> Option<u16> {
        self.sprite_order
    }

    /// The first `CRNG` chunk
    pub fn color_range(&self) -> Option<ColorRange> {
        self.color_ranges.first().copied()
    }

    /// Every `CRNG` chunk in file order
    pub fn color_ranges(&self) -> Vec<ColorRange> {
        self.color_ranges.clone()
    }

    /// The `(c) ` chunk
    pub fn copyright(&self) -> Option<&[u8]> {
        self.copyright.as_deref()
    }

    /// The `AUTH` chunk
    pub fn author(&self) -> Option<&[u8]> {
        self.author.as_deref()
    }

    /// The first `ANNO` chunk
    pub fn annotation(&self) -> Option<&[u8]> {
        first(&self.annotations)
    }

    /// Every `ANNO` chunk in file order
    pub fn annotations(&self) -> Vec<&[u8]> {
        all(&self.annotations)
    }

    /// The first `TEXT` chunk
    pub fn text(&self) -> Option<&[u8]> {
        first(&self.texts)
    }

    /// Every `TEXT` chunk in file order
    pub fn texts(&self) -> Vec<&[u8]> {
        all(&self.texts)
    }

    /// The `FVER` version string
    pub fn version(&self) -> Option<&[u8]> {
        self.version.as_deref()
    }

    pub fn exif(&self) -> Option<&[u8]> {
        first(&self.exif)
    }

    pub fn all_exif(&self) -> Vec<&[u8]> {
        all(&self.exif)
    }

    pub fn iptc(&self) -> Option<&[u8]> {
        first(&self.iptc)
    }

    pub fn all_iptc(&self) -> Vec<&[u8]> {
        all(&self.iptc)
    }

    /// The first `XMP0` packet, limited to 64K by the writer
    pub fn xmp0(&self) -> Option<&[u8]> {
        first(&self.xmp0)
    }

    pub fn all_xmp0(&self) -> Vec<&[u8]> {
        all(&self.xmp0)
    }

    /// The `XMP1` packet, only one may exist
    pub fn xmp1(&self) -> Option<&[u8]> {
        self.xmp1.as_deref()
    }

    /// The first `ICCP` profile
    pub fn icc_profile(&self) -> Option<&[u8]> {
        first(&self.icc_profiles)
    }

    pub fn icc_profiles(&self) -> Vec<&[u8]> {
        all(&self.icc_profiles)
    }

    /// The first `ICCN` profile name
    pub fn icc_name(&self) -> Option<&[u8]> {
        first(&self.icc_names)
    }

    pub fn icc_names(&self) -> Vec<&[u8]> {
        all(&self.icc_names)
    }

    /// The first `GEOT` GeoTIFF blob
    pub fn geotiff(&self) -> Option<&[u8]> {
        first(&self.geotiff)
    }

    pub fn all_geotiff(&self) -> Vec<&[u8]> {
        all(&self.geotiff)
    }

    /// Where the GeoTIFF data came from, the first `GEOF` chunk
    ///
    /// This is a four character format id such as `TIFF`, `PNG ` or
    /// `JFIF`, four spaces when the origin is unknown.
    pub fn geotiff_origin(&self) -> Option<ChunkId> {
        self.geotiff_origins.first().copied()
    }

    /// Every `GEOF` origin id in file order
    pub fn geotiff_origins(&self) -> &[ChunkId] {
        &self.geotiff_origins
    }
}
