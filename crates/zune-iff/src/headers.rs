/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Typed records parsed out of property chunks
use alloc::vec::Vec;

use zune_core::bytestream::{ZCursor, ZReader};
use zune_core::log::{trace, warn};

use crate::constants::{
    CAMG_EXTRA_HALFBRITE, CAMG_HAM, CAMG_HIRES, CAMG_LACE, ID_BMHD, ID_CAMG, ID_CMAP, ID_DGBL,
    ID_DLOC, ID_DPEL, ID_FXHD, ID_TVDC, ID_YCHD
};
use crate::errors::IffDecodeErrors;

/// A big endian reader over a stored chunk payload
pub(crate) fn chunk_reader(bytes: &[u8]) -> ZReader<ZCursor<&[u8]>> {
    ZReader::new(ZCursor::new(bytes))
}

/// How transparency is expressed in a bitmap
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Masking {
    None,
    /// An extra bitplane per row holds a 1 bit mask
    HasMask,
    /// Pixels equal to the transparent index are see through
    TransparentColor,
    Lasso,
    Unknown(u8)
}

impl Masking {
    pub const fn from_u8(value: u8) -> Masking {
        match value {
            0 => Masking::None,
            1 => Masking::HasMask,
            2 => Masking::TransparentColor,
            3 => Masking::Lasso,
            v => Masking::Unknown(v)
        }
    }
}

/// The `BMHD` chunk
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BitMapHeader {
    pub width:             u16,
    pub height:            u16,
    pub x:                 i16,
    pub y:                 i16,
    pub planes:            u8,
    pub masking:           Masking,
    pub compression:       u8,
    pub pad:               u8,
    pub transparent_color: u16,
    pub x_aspect:          u8,
    pub y_aspect:          u8,
    pub page_width:        i16,
    pub page_height:       i16
}

impl BitMapHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<BitMapHeader, IffDecodeErrors> {
        if bytes.len() < 20 {
            return Err(IffDecodeErrors::MalformedChunk(
                ID_BMHD,
                "BMHD shorter than 20 bytes"
            ));
        }
        let mut stream = chunk_reader(bytes);

        let header = BitMapHeader {
            width:             stream.get_u16_be_err()?,
            height:            stream.get_u16_be_err()?,
            x:                 stream.get_u16_be_err()? as i16,
            y:                 stream.get_u16_be_err()? as i16,
            planes:            stream.read_u8_err()?,
            masking:           Masking::from_u8(stream.read_u8_err()?),
            compression:       stream.read_u8_err()?,
            pad:               stream.read_u8_err()?,
            transparent_color: stream.get_u16_be_err()?,
            x_aspect:          stream.read_u8_err()?,
            y_aspect:          stream.read_u8_err()?,
            page_width:        stream.get_u16_be_err()? as i16,
            page_height:       stream.get_u16_be_err()? as i16
        };
        trace!("Width: {}", header.width);
        trace!("Height: {}", header.height);
        trace!("Planes: {}", header.planes);
        trace!("Masking: {:?}", header.masking);
        trace!("Compression: {}", header.compression);

        Ok(header)
    }

    /// Bytes in one row of a single bitplane, rows are padded to 16 bits
    pub const fn row_bytes(&self) -> usize {
        ((self.width as usize + 15) >> 4) << 1
    }

    pub const fn has_mask_plane(&self) -> bool {
        matches!(self.masking, Masking::HasMask)
    }

    pub const fn is_compressed(&self) -> bool {
        self.compression != 0
    }
}

/// The `CMAP` chunk
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Palette {
    entries: Vec<[u8; 3]>,
    is_4bit: bool
}

impl Palette {
    /// Parse a palette, an empty chunk gives `None`
    pub fn from_bytes(bytes: &[u8]) -> Result<Option<Palette>, IffDecodeErrors> {
        if bytes.is_empty() {
            warn!("Empty CMAP chunk, ignoring");
            return Ok(None);
        }
        if bytes.len() % 3 != 0 {
            return Err(IffDecodeErrors::MalformedChunk(
                ID_CMAP,
                "CMAP size is not a multiple of 3"
            ));
        }
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(bytes.len() / 3)
            .map_err(|_| IffDecodeErrors::NoMemory(bytes.len()))?;

        entries.extend(bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]));

        // old writers stored 4 bit guns in the high nibble
        let is_4bit = bytes.iter().all(|x| x & 0x0F == 0);

        trace!("Palette entries: {}, 4 bit: {}", entries.len(), is_4bit);

        Ok(Some(Palette { entries, is_4bit }))
    }

    pub fn new(entries: Vec<[u8; 3]>) -> Palette {
        Palette {
            entries,
            is_4bit: false
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn is_4bit(&self) -> bool {
        self.is_4bit
    }

    /// Entries as stored in the file
    pub fn raw_entries(&self) -> &[[u8; 3]] {
        &self.entries
    }

    /// Return the 8 bit color at `index`
    ///
    /// Indices past the end clamp to the last entry.
    pub fn color(&self, index: usize) -> [u8; 3] {
        let Some(last) = self.entries.len().checked_sub(1) else {
            return [0; 3];
        };
        let [r, g, b] = self.entries[index.min(last)];

        if self.is_4bit {
            [r | (r >> 4), g | (g >> 4), b | (b >> 4)]
        } else {
            [r, g, b]
        }
    }

    /// All entries expanded to 8 bits
    pub fn colors(&self) -> Vec<[u8; 3]> {
        (0..self.entries.len()).map(|i| self.color(i)).collect()
    }
}

/// Amiga viewport modes from a `CAMG` chunk
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ViewportModes(pub u32);

impl ViewportModes {
    pub fn from_bytes(bytes: &[u8]) -> Result<ViewportModes, IffDecodeErrors> {
        if bytes.len() < 4 {
            return Err(IffDecodeErrors::MalformedChunk(
                ID_CAMG,
                "CAMG shorter than 4 bytes"
            ));
        }
        let modes = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

        trace!("Viewport modes: {:#x}", modes);

        Ok(ViewportModes(modes))
    }

    pub const fn is_ham(self) -> bool {
        self.0 & CAMG_HAM != 0
    }

    pub const fn is_extra_halfbrite(self) -> bool {
        self.0 & CAMG_EXTRA_HALFBRITE != 0
    }

    pub const fn is_interlaced(self) -> bool {
        self.0 & CAMG_LACE != 0
    }

    pub const fn is_hires(self) -> bool {
        self.0 & CAMG_HIRES != 0
    }
}

/// Fax compression schemes
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FaxCompression {
    /// Uncompressed, one bit per pixel
    None,
    /// Modified Huffman, T.4 one dimensional
    ModifiedHuffman,
    /// Modified READ, T.4 two dimensional
    ModifiedRead,
    /// Modified Modified READ, T.6
    ModifiedModifiedRead,
    Unknown(u8)
}

impl FaxCompression {
    pub const fn from_u8(value: u8) -> FaxCompression {
        match value {
            0 => FaxCompression::None,
            1 => FaxCompression::ModifiedHuffman,
            2 => FaxCompression::ModifiedRead,
            4 => FaxCompression::ModifiedModifiedRead,
            v => FaxCompression::Unknown(v)
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            FaxCompression::None => 0,
            FaxCompression::ModifiedHuffman => 1,
            FaxCompression::ModifiedRead => 2,
            FaxCompression::ModifiedModifiedRead => 4,
            FaxCompression::Unknown(v) => v
        }
    }
}

/// The `FXHD` chunk
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FaxHeader {
    pub width:       u16,
    pub height:      u16,
    pub line_length: u16,
    pub v_res:       u16,
    pub compression: FaxCompression
}

impl FaxHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<FaxHeader, IffDecodeErrors> {
        if bytes.len() < 9 {
            return Err(IffDecodeErrors::MalformedChunk(
                ID_FXHD,
                "FXHD shorter than 9 bytes"
            ));
        }
        let mut stream = chunk_reader(bytes);

        let header = FaxHeader {
            width:       stream.get_u16_be_err()?,
            height:      stream.get_u16_be_err()?,
            line_length: stream.get_u16_be_err()?,
            v_res:       stream.get_u16_be_err()?,
            compression: FaxCompression::from_u8(stream.read_u8_err()?)
        };
        trace!("Fax width: {}", header.width);
        trace!("Fax height: {}", header.height);
        trace!("Fax compression: {:?}", header.compression);

        Ok(header)
    }
}

/// Chroma subsampling of a YUVN picture
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum YuvMode {
    /// Luma only
    Yuv400,
    Yuv411,
    Yuv422,
    Yuv444,
    /// Lores luma only
    Yuv200,
    /// Lores 4:2:2
    Yuv211,
    /// Lores 4:4:4
    Yuv222,
    Unknown(u8)
}

impl YuvMode {
    pub const fn from_u8(value: u8) -> YuvMode {
        match value {
            0 => YuvMode::Yuv400,
            1 => YuvMode::Yuv411,
            2 => YuvMode::Yuv422,
            3 => YuvMode::Yuv444,
            8 => YuvMode::Yuv200,
            9 => YuvMode::Yuv211,
            10 => YuvMode::Yuv222,
            v => YuvMode::Unknown(v)
        }
    }

    /// Horizontal chroma decimation factor, `None` for luma only modes
    pub const fn chroma_shift(self) -> Option<usize> {
        match self {
            YuvMode::Yuv400 | YuvMode::Yuv200 | YuvMode::Unknown(_) => None,
            YuvMode::Yuv411 => Some(2),
            YuvMode::Yuv422 | YuvMode::Yuv211 => Some(1),
            YuvMode::Yuv444 | YuvMode::Yuv222 => Some(0)
        }
    }

    pub const fn is_luma_only(self) -> bool {
        matches!(self, YuvMode::Yuv400 | YuvMode::Yuv200)
    }
}

/// Television norm of a YUVN picture
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TvNorm {
    Unknown,
    Pal,
    Ntsc,
    Other(u8)
}

impl TvNorm {
    pub const fn from_u8(value: u8) -> TvNorm {
        match value {
            0 => TvNorm::Unknown,
            1 => TvNorm::Pal,
            2 => TvNorm::Ntsc,
            v => TvNorm::Other(v)
        }
    }
}

/// The `YCHD` chunk
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct YuvHeader {
    pub width:       u16,
    pub height:      u16,
    pub page_width:  u16,
    pub page_height: u16,
    pub left_edge:   u16,
    pub top_edge:    u16,
    pub aspect_x:    u8,
    pub aspect_y:    u8,
    pub compression: u8,
    pub flags:       u8,
    pub mode:        YuvMode,
    pub norm:        TvNorm,
    pub reserved2:   i16,
    pub reserved3:   i32
}

impl YuvHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<YuvHeader, IffDecodeErrors> {
        if bytes.len() < 24 {
            return Err(IffDecodeErrors::MalformedChunk(
                ID_YCHD,
                "YCHD shorter than 24 bytes"
            ));
        }
        let mut stream = chunk_reader(bytes);

        let header = YuvHeader {
            width:       stream.get_u16_be_err()?,
            height:      stream.get_u16_be_err()?,
            page_width:  stream.get_u16_be_err()?,
            page_height: stream.get_u16_be_err()?,
            left_edge:   stream.get_u16_be_err()?,
            top_edge:    stream.get_u16_be_err()?,
            aspect_x:    stream.read_u8_err()?,
            aspect_y:    stream.read_u8_err()?,
            compression: stream.read_u8_err()?,
            flags:       stream.read_u8_err()?,
            mode:        YuvMode::from_u8(stream.read_u8_err()?),
            norm:        TvNorm::from_u8(stream.read_u8_err()?),
            reserved2:   stream.get_u16_be_err()? as i16,
            reserved3:   stream.get_u32_be_err()? as i32
        };
        trace!("YUV width: {}", header.width);
        trace!("YUV height: {}", header.height);
        trace!("YUV mode: {:?}", header.mode);
        trace!("YUV norm: {:?}", header.norm);

        Ok(header)
    }

    pub const fn is_interlaced(&self) -> bool {
        self.flags & 1 != 0
    }
}

/// Compression schemes a chunky DEEP body may use
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DeepCompression {
    None,
    RunLength,
    Huffman,
    DynamicHuffman,
    Jpeg,
    TvDelta,
    Unknown(u16)
}

impl DeepCompression {
    pub const fn from_u16(value: u16) -> DeepCompression {
        match value {
            0 => DeepCompression::None,
            1 => DeepCompression::RunLength,
            2 => DeepCompression::Huffman,
            3 => DeepCompression::DynamicHuffman,
            4 => DeepCompression::Jpeg,
            5 => DeepCompression::TvDelta,
            v => DeepCompression::Unknown(v)
        }
    }
}

/// The `DGBL` chunk
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DeepGlobalHeader {
    pub display_width:  u16,
    pub display_height: u16,
    pub compression:    DeepCompression,
    pub x_aspect:       u8,
    pub y_aspect:       u8
}

impl DeepGlobalHeader {
    pub fn from_bytes(bytes: &[u8]) -> Result<DeepGlobalHeader, IffDecodeErrors> {
        if bytes.len() < 8 {
            return Err(IffDecodeErrors::MalformedChunk(
                ID_DGBL,
                "DGBL shorter than 8 bytes"
            ));
        }
        let mut stream = chunk_reader(bytes);

        let header = DeepGlobalHeader {
            display_width:  stream.get_u16_be_err()?,
            display_height: stream.get_u16_be_err()?,
            compression:    DeepCompression::from_u16(stream.get_u16_be_err()?),
            x_aspect:       stream.read_u8_err()?,
            y_aspect:       stream.read_u8_err()?
        };
        trace!("DEEP display size: {}x{}", header.display_width, header.display_height);
        trace!("DEEP compression: {:?}", header.compression);

        Ok(header)
    }
}

/// What a single DEEP pixel element holds
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DeepComponent {
    Red,
    Green,
    Blue,
    Alpha,
    Yellow,
    Cyan,
    Magenta,
    Black,
    Mask,
    ZBuffer,
    Opacity,
    LinearKey,
    BinaryKey,
    Unknown(u16)
}

impl DeepComponent {
    pub const fn from_u16(value: u16) -> DeepComponent {
        match value {
            1 => DeepComponent::Red,
            2 => DeepComponent::Green,
            3 => DeepComponent::Blue,
            4 => DeepComponent::Alpha,
            5 => DeepComponent::Yellow,
            6 => DeepComponent::Cyan,
            7 => DeepComponent::Magenta,
            8 => DeepComponent::Black,
            9 => DeepComponent::Mask,
            10 => DeepComponent::ZBuffer,
            11 => DeepComponent::Opacity,
            12 => DeepComponent::LinearKey,
            13 => DeepComponent::BinaryKey,
            v => DeepComponent::Unknown(v)
        }
    }
}

/// One entry of the `DPEL` chunk
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DeepPixelElement {
    pub component: DeepComponent,
    pub bit_depth: u16
}

/// Parse a `DPEL` chunk into its element list
pub fn parse_pixel_elements(bytes: &[u8]) -> Result<Vec<DeepPixelElement>, IffDecodeErrors> {
    let mut stream = chunk_reader(bytes);

    let count = stream.get_u32_be_err()? as usize;

    if count == 0 || count > bytes.len().saturating_sub(4) / 4 {
        return Err(IffDecodeErrors::MalformedChunk(
            ID_DPEL,
            "DPEL element count does not match chunk size"
        ));
    }
    let mut elements = Vec::with_capacity(count);

    for _ in 0..count {
        let component = DeepComponent::from_u16(stream.get_u16_be_err()?);
        let bit_depth = stream.get_u16_be_err()?;

        trace!("DEEP element {:?}, {} bits", component, bit_depth);

        elements.push(DeepPixelElement {
            component,
            bit_depth
        });
    }
    Ok(elements)
}

/// The `DLOC` chunk
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DeepLocation {
    pub width:  u16,
    pub height: u16,
    pub x:      i16,
    pub y:      i16
}

impl DeepLocation {
    pub fn from_bytes(bytes: &[u8]) -> Result<DeepLocation, IffDecodeErrors> {
        if bytes.len() < 8 {
            return Err(IffDecodeErrors::MalformedChunk(
                ID_DLOC,
                "DLOC shorter than 8 bytes"
            ));
        }
        let mut stream = chunk_reader(bytes);

        Ok(DeepLocation {
            width:  stream.get_u16_be_err()?,
            height: stream.get_u16_be_err()?,
            x:      stream.get_u16_be_err()? as i16,
            y:      stream.get_u16_be_err()? as i16
        })
    }
}

/// The `DCHG` chunk, frame rate of a DEEP animation
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DeepChange {
    pub frame_rate: i32
}

impl DeepChange {
    pub fn from_bytes(bytes: &[u8]) -> Result<DeepChange, IffDecodeErrors> {
        let mut stream = chunk_reader(bytes);

        Ok(DeepChange {
            frame_rate: stream.get_u32_be_err()? as i32
        })
    }
}

/// The `TVDC` chunk, sixteen deltas indexed by a four bit code
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DeepCompressionTable {
    pub deltas: [i16; 16]
}

impl DeepCompressionTable {
    pub fn from_bytes(bytes: &[u8]) -> Result<DeepCompressionTable, IffDecodeErrors> {
        if bytes.len() < 32 {
            return Err(IffDecodeErrors::MalformedChunk(
                ID_TVDC,
                "TVDC shorter than 32 bytes"
            ));
        }
        let mut stream = chunk_reader(bytes);
        let mut deltas = [0; 16];

        for delta in deltas.iter_mut() {
            *delta = stream.get_u16_be_err()? as i16;
        }
        Ok(DeepCompressionTable { deltas })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_header_fields() {
        let bytes = [
            0x01, 0x40, 0x00, 0xC8, 0xFF, 0xFF, 0x00, 0x02, 5, 2, 1, 0, 0x00, 0x03, 10, 11, 0x01,
            0x40, 0x00, 0xC8
        ];
        let header = BitMapHeader::from_bytes(&bytes).unwrap();

        assert_eq!(header.width, 320);
        assert_eq!(header.height, 200);
        assert_eq!(header.x, -1);
        assert_eq!(header.y, 2);
        assert_eq!(header.planes, 5);
        assert_eq!(header.masking, Masking::TransparentColor);
        assert!(header.is_compressed());
        assert_eq!(header.transparent_color, 3);
        assert_eq!(header.row_bytes(), 40);

        assert!(BitMapHeader::from_bytes(&bytes[..19]).is_err());
    }

    #[test]
    fn row_bytes_round_to_words() {
        let mut bytes = [0_u8; 20];
        bytes[1] = 17;
        let header = BitMapHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.row_bytes(), 4);
    }

    #[test]
    fn four_bit_palette_is_expanded() {
        let palette = Palette::from_bytes(&[0xF0, 0x80, 0x00, 0x10, 0x20, 0x30])
            .unwrap()
            .unwrap();

        assert!(palette.is_4bit());
        assert_eq!(palette.color(0), [0xFF, 0x88, 0x00]);
        // clamps to the last entry
        assert_eq!(palette.color(9), [0x11, 0x22, 0x33]);
    }

    #[test]
    fn palette_validation() {
        assert!(Palette::from_bytes(&[]).unwrap().is_none());
        assert!(Palette::from_bytes(&[1, 2, 3, 4]).is_err());

        let palette = Palette::from_bytes(&[0xF1, 0, 0]).unwrap().unwrap();
        assert!(!palette.is_4bit());
        assert_eq!(palette.color(0), [0xF1, 0, 0]);
    }

    #[test]
    fn viewport_flags() {
        let modes = ViewportModes::from_bytes(&[0, 0, 0x88, 0x04]).unwrap();

        assert!(modes.is_ham());
        assert!(modes.is_hires());
        assert!(modes.is_interlaced());
        assert!(!modes.is_extra_halfbrite());
        assert!(ViewportModes::from_bytes(&[0, 0, 8]).is_err());
    }

    #[test]
    fn pixel_elements() {
        let bytes = [0, 0, 0, 2, 0, 1, 0, 8, 0, 4, 0, 8];
        let elements = parse_pixel_elements(&bytes).unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].component, DeepComponent::Red);
        assert_eq!(elements[1].component, DeepComponent::Alpha);

        // count larger than the chunk
        assert!(parse_pixel_elements(&[0, 0, 0, 9, 0, 1, 0, 8]).is_err());
    }
}
