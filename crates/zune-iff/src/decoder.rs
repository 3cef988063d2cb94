/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec::Vec;

use zune_core::bytestream::ZByteReaderTrait;
use zune_core::colorspace::ColorSpace;
use zune_core::log::{trace, warn};
use zune_core::options::DecoderOptions;

use crate::analyzer::{is_grayscale, output_format, OutputFormat, PictureTraits};
use crate::chunks::PropertyStore;
use crate::constants::{
    id_to_str, ChunkId, FormType, ID_ABIT, ID_BMHD, ID_BODY, ID_CAMG, ID_CMAP, ID_DATA, ID_DATU,
    ID_DATV, ID_DATY, ID_DBOD, ID_DCHG, ID_DGBL, ID_DLOC, ID_DPEL, ID_FLOG, ID_FXHD, ID_GPHD,
    ID_META, ID_PAGE, ID_TVDC, ID_YCHD, METADATA_COLLECTIONS, METADATA_PROPERTIES
};
use crate::deep::decode_deep_chunky;
use crate::errors::IffDecodeErrors;
use crate::fax::decode_fax;
use crate::headers::{
    parse_pixel_elements, BitMapHeader, DeepChange, DeepComponent, DeepCompression,
    DeepCompressionTable, DeepGlobalHeader, DeepLocation, DeepPixelElement, FaxHeader, Masking,
    Palette, ViewportModes, YuvHeader
};
use crate::metadata::IffMetadata;
use crate::pixels::DecodedPixels;
use crate::planar::{decode_bitplanes, decode_pbm, PixelMapping, PlaneLayout};
use crate::truecolor::{decode_truecolor, ChannelLayout};
use crate::yuv::{decode_yuv, YuvPlanes};

/// Returns true if the buffer starts like an IFF picture
pub fn probe_iff(bytes: &[u8]) -> bool {
    if bytes.len() < 12 || &bytes[0..4] != b"FORM" {
        return false;
    }
    FormType::from_id([bytes[8], bytes[9], bytes[10], bytes[11]]).is_some()
}

/// A summary of a picture whose headers have been decoded
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IffImageInfo {
    pub width:           usize,
    pub height:          usize,
    /// Bits per pixel as stored
    pub depth:           u16,
    pub form_type:       FormType,
    pub viewport_modes:  ViewportModes,
    /// Size of the chunk holding the pixel data
    pub compressed_size: usize,
    /// Size of the decoded pixel buffer
    pub decoded_size:    usize,
    pub has_alpha:       bool,
    pub ham:             bool,
    pub ehb:             bool,
    pub compressed:      bool,
    pub indexed:         bool,
    pub grayscale:       bool,
    pub loaded:          bool,
    pub decoded:         bool
}

/// An IFF picture decoder
///
/// # Example
/// ```no_run
/// use zune_core::bytestream::ZCursor;
/// use zune_iff::IffDecoder;
///
/// fn main() -> Result<(), zune_iff::IffDecodeErrors> {
///     let data = std::fs::read("picture.iff").unwrap();
///     let mut decoder = IffDecoder::new(ZCursor::new(&data));
///     decoder.decode()?;
///
///     let (width, height) = decoder.dimensions().unwrap();
///     let pixels = decoder.pixels().unwrap();
///     assert_eq!(pixels.len(), width * height * decoder.colorspace().unwrap().num_components());
///     Ok(())
/// }
/// ```
pub struct IffDecoder<T: ZByteReaderTrait> {
    store:           PropertyStore<T>,
    options:         DecoderOptions,
    decoded_headers: bool,
    form:            Option<FormType>,
    width:           usize,
    height:          usize,
    bitmap_header:   Option<BitMapHeader>,
    palette:         Option<Palette>,
    viewport_modes:  ViewportModes,
    fax_header:      Option<FaxHeader>,
    yuv_header:      Option<YuvHeader>,
    yuv_planes:      YuvPlanes,
    deep_header:     Option<DeepGlobalHeader>,
    deep_elements:   Vec<DeepPixelElement>,
    deep_location:   Option<DeepLocation>,
    deep_change:     Option<DeepChange>,
    deep_table:      Option<DeepCompressionTable>,
    deep_chunky:     bool,
    metadata:        IffMetadata,
    stop_chunk_size: usize,
    decoded:         Option<DecodedPixels>
}

impl<T: ZByteReaderTrait> IffDecoder<T> {
    /// Create a new decoder reading from `source` with default options
    pub fn new(source: T) -> IffDecoder<T> {
        IffDecoder::new_with_options(source, DecoderOptions::default())
    }

    /// Create a new decoder instance with specified options
    ///
    /// The maximum width and height and strict mode are honoured.
    pub fn new_with_options(source: T, options: DecoderOptions) -> IffDecoder<T> {
        IffDecoder {
            store: PropertyStore::new(source, options.strict_mode()),
            options,
            decoded_headers: false,
            form: None,
            width: 0,
            height: 0,
            bitmap_header: None,
            palette: None,
            viewport_modes: ViewportModes::default(),
            fax_header: None,
            yuv_header: None,
            yuv_planes: YuvPlanes::default(),
            deep_header: None,
            deep_elements: Vec::new(),
            deep_location: None,
            deep_change: None,
            deep_table: None,
            deep_chunky: false,
            metadata: IffMetadata::default(),
            stop_chunk_size: 0,
            decoded: None
        }
    }

    fn register_chunks(&mut self, form: FormType) {
        let (properties, collections, stops): (&[ChunkId], &[ChunkId], &[ChunkId]) = match form {
            FormType::ILBM | FormType::PBM | FormType::RGBN | FormType::RGB8 => {
                (&[ID_BMHD, ID_CMAP, ID_CAMG], &[], &[ID_BODY])
            }
            FormType::ACBM => (&[ID_BMHD, ID_CMAP, ID_CAMG], &[], &[ID_ABIT]),
            FormType::DEEP => (
                &[ID_BMHD, ID_CMAP, ID_DGBL, ID_DPEL, ID_DLOC, ID_DCHG, ID_TVDC],
                &[],
                &[ID_BODY, ID_DBOD]
            ),
            FormType::FAXX => (&[ID_FXHD, ID_GPHD], &[ID_FLOG], &[ID_PAGE]),
            FormType::YUVN => (&[ID_YCHD, ID_CAMG], &[], &[ID_DATY, ID_DATU, ID_DATV, ID_DATA]),
            FormType::META => (&[], &[], &[])
        };
        let tag = form.id();

        for id in properties.iter().chain(METADATA_PROPERTIES.iter()) {
            self.store.register_property(tag, *id);
        }
        for id in collections.iter().chain(METADATA_COLLECTIONS.iter()) {
            self.store.register_collection(tag, *id);
        }
        for id in stops {
            self.store.register_stop(tag, *id);
        }
    }

    fn required(&self, id: ChunkId) -> Result<&[u8], IffDecodeErrors> {
        self.store
            .find_property(id)
            .ok_or(IffDecodeErrors::MissingChunk(id))
    }

    /// Decode headers stored in the picture and fill in the information
    /// fields
    ///
    /// The stream is scanned up to the chunk holding the pixels, so every
    /// header and the metadata preceding the pixels becomes available.
    ///
    /// # Returns
    /// - `Ok(())`: Headers were decoded
    /// - `Err`: The container is malformed or holds an unsupported variant
    pub fn decode_headers(&mut self) -> Result<(), IffDecodeErrors> {
        if self.decoded_headers {
            return Ok(());
        }
        let tag = self.store.open_container()?;
        let form = FormType::from_id(tag).ok_or(IffDecodeErrors::UnsupportedForm(tag))?;

        trace!("FORM type: {}", id_to_str(&tag));

        self.register_chunks(form);

        match form {
            // metadata only, read everything
            FormType::META => while self.store.scan_next()?.is_some() {},
            _ => self.store.scan()?
        }
        self.stop_chunk_size = self.store.current_chunk().map_or(0, |c| c.size);

        if let Some(bytes) = self.store.find_property(ID_CMAP) {
            self.palette = Palette::from_bytes(bytes)?;
        }
        if let Some(bytes) = self.store.find_property(ID_CAMG) {
            self.viewport_modes = ViewportModes::from_bytes(bytes)?;
        }

        // a DEEP form with a BODY instead of a DBOD holds BMHD planes
        let planar_deep =
            form == FormType::DEEP && self.store.current_chunk().map(|c| c.id) == Some(ID_BODY);

        let (width, height) = if form.has_bitmap_header() || planar_deep {
            let header = BitMapHeader::from_bytes(self.required(ID_BMHD)?)?;
            self.bitmap_header = Some(header);
            (usize::from(header.width), usize::from(header.height))
        } else {
            match form {
                FormType::DEEP => self.parse_deep_headers()?,
                FormType::FAXX => {
                    let header = FaxHeader::from_bytes(self.required(ID_FXHD)?)?;
                    self.fax_header = Some(header);
                    (usize::from(header.width), usize::from(header.height))
                }
                FormType::YUVN => {
                    let header = YuvHeader::from_bytes(self.required(ID_YCHD)?)?;
                    self.yuv_header = Some(header);
                    // the planes are separate stop chunks
                    self.yuv_planes = YuvPlanes::collect(&mut self.store)?;
                    (usize::from(header.width), usize::from(header.height))
                }
                _ => (0, 0)
            }
        };
        self.metadata = IffMetadata::from_store(&mut self.store, self.options.strict_mode())?;

        if form != FormType::META {
            self.check_dimensions(width, height)?;
        }
        self.width = width;
        self.height = height;
        self.form = Some(form);
        self.decoded_headers = true;

        log::info!(
            "IFF {} picture, {}x{}",
            id_to_str(&tag).trim_end(),
            width,
            height
        );
        Ok(())
    }

    fn parse_deep_headers(&mut self) -> Result<(usize, usize), IffDecodeErrors> {
        let global = DeepGlobalHeader::from_bytes(self.required(ID_DGBL)?)?;
        self.deep_elements = parse_pixel_elements(self.required(ID_DPEL)?)?;

        if let Some(bytes) = self.store.find_property(ID_DLOC) {
            self.deep_location = Some(DeepLocation::from_bytes(bytes)?);
        }
        if let Some(bytes) = self.store.find_property(ID_DCHG) {
            self.deep_change = Some(DeepChange::from_bytes(bytes)?);
        }
        if let Some(bytes) = self.store.find_property(ID_TVDC) {
            self.deep_table = Some(DeepCompressionTable::from_bytes(bytes)?);
        }
        self.deep_header = Some(global);
        self.deep_chunky = true;

        // the body covers the location rectangle when one is given
        Ok(match self.deep_location {
            Some(location) => (usize::from(location.width), usize::from(location.height)),
            None => (
                usize::from(global.display_width),
                usize::from(global.display_height)
            )
        })
    }

    fn check_dimensions(&self, width: usize, height: usize) -> Result<(), IffDecodeErrors> {
        if width == 0 || height == 0 {
            return Err(IffDecodeErrors::ZeroDimensions);
        }
        if width > self.options.max_width() {
            return Err(IffDecodeErrors::LargeDimensions(
                self.options.max_width(),
                width
            ));
        }
        if height > self.options.max_height() {
            return Err(IffDecodeErrors::LargeDimensions(
                self.options.max_height(),
                height
            ));
        }
        Ok(())
    }

    fn bitmap(&self) -> Result<&BitMapHeader, IffDecodeErrors> {
        self.bitmap_header
            .as_ref()
            .ok_or(IffDecodeErrors::MissingChunk(ID_BMHD))
    }

    fn is_ham(&self) -> bool {
        matches!(self.form, Some(FormType::ILBM | FormType::ACBM)) && self.viewport_modes.is_ham()
    }

    fn is_ehb(&self) -> bool {
        matches!(self.form, Some(FormType::ILBM | FormType::ACBM))
            && !self.viewport_modes.is_ham()
            && self.viewport_modes.is_extra_halfbrite()
            && self.bitmap_header.map(|h| h.planes) == Some(6)
    }

    /// Pick how plane values become colors, HAM first, then EHB
    fn pixel_mapping(&self, header: &BitMapHeader) -> Result<PixelMapping, IffDecodeErrors> {
        if self.viewport_modes.is_ham() {
            return Ok(PixelMapping::HoldAndModify(self.palette.as_ref()));
        }
        let palette = self
            .palette
            .as_ref()
            .ok_or(IffDecodeErrors::MissingChunk(ID_CMAP))?;

        if self.viewport_modes.is_extra_halfbrite() {
            if header.planes == 6 {
                return Ok(PixelMapping::HalfBrite(palette));
            }
            warn!(
                "Extra-Half-Brite needs 6 planes but picture has {}, ignoring the mode",
                header.planes
            );
        }
        Ok(PixelMapping::Palette(palette))
    }

    fn decode_pixels(&mut self, form: FormType) -> Result<DecodedPixels, IffDecodeErrors> {
        let body = match form {
            // planes were collected with the headers
            FormType::YUVN | FormType::META => Vec::new(),
            _ => self.store.read_body()?
        };

        match form {
            FormType::ILBM => {
                let header = self.bitmap()?;
                let layout = PlaneLayout::Interleaved(&body, header.is_compressed());

                decode_bitplanes(header, self.pixel_mapping(header)?, layout)
            }
            FormType::ACBM => {
                let header = self.bitmap()?;
                let layout = PlaneLayout::Contiguous(&body);

                decode_bitplanes(header, self.pixel_mapping(header)?, layout)
            }
            FormType::PBM => {
                let palette = self
                    .palette
                    .as_ref()
                    .ok_or(IffDecodeErrors::MissingChunk(ID_CMAP))?;

                decode_pbm(self.bitmap()?, palette, &body)
            }
            FormType::RGBN => {
                let header = self.bitmap()?;
                decode_truecolor(header, ChannelLayout::rgbn(header.planes)?, &body)
            }
            FormType::RGB8 => {
                let header = self.bitmap()?;
                decode_truecolor(header, ChannelLayout::rgb8(header.planes)?, &body)
            }
            FormType::DEEP => match (&self.deep_header, self.deep_chunky) {
                (Some(global), true) => decode_deep_chunky(
                    self.width,
                    self.height,
                    global.compression,
                    &self.deep_elements,
                    self.deep_table.as_ref(),
                    &body
                ),
                _ => {
                    let header = self.bitmap()?;
                    decode_truecolor(header, ChannelLayout::deep(header.planes)?, &body)
                }
            },
            FormType::FAXX => {
                let header = self
                    .fax_header
                    .as_ref()
                    .ok_or(IffDecodeErrors::MissingChunk(ID_FXHD))?;
                let pixels = decode_fax(&body, header, self.options.strict_mode())?;

                Ok(DecodedPixels {
                    pixels,
                    indices: None,
                    colorspace: ColorSpace::RGB
                })
            }
            FormType::YUVN => {
                let header = self
                    .yuv_header
                    .as_ref()
                    .ok_or(IffDecodeErrors::MissingChunk(ID_YCHD))?;

                decode_yuv(header, &self.yuv_planes)
            }
            FormType::META => Err(IffDecodeErrors::UnsupportedForm(ID_META))
        }
    }

    /// Decode the picture, decoding headers first if needed
    ///
    /// Pixels are kept on the decoder, see [`pixels`](Self::pixels) and
    /// [`into_pixels`](Self::into_pixels). Decoding twice is a no-op, and a
    /// failed decode leaves no pixels behind.
    pub fn decode(&mut self) -> Result<(), IffDecodeErrors> {
        self.decode_headers()?;

        if self.decoded.is_some() {
            return Ok(());
        }
        let form = self
            .form
            .ok_or(IffDecodeErrors::InvalidState("Headers not decoded"))?;

        let decoded = self.decode_pixels(form)?;

        trace!(
            "Decoded {} bytes of {:?}",
            decoded.pixels.len(),
            decoded.colorspace
        );
        self.decoded = Some(decoded);

        Ok(())
    }

    /// Decoded pixels, RGB or RGBA, row major
    ///
    /// Returns `None` before [`decode`](Self::decode) succeeds
    pub fn pixels(&self) -> Option<&[u8]> {
        self.decoded.as_ref().map(|d| d.pixels.as_slice())
    }

    /// One palette index per pixel for palette based pictures
    pub fn palette_indices(&self) -> Option<&[u8]> {
        self.decoded.as_ref()?.indices.as_deref()
    }

    /// Take the decoded pixels out of the decoder
    pub fn into_pixels(self) -> Option<Vec<u8>> {
        self.decoded.map(|d| d.pixels)
    }

    /// Get dimensions of the image
    ///
    /// # Returns
    /// - `Some((width,height))`: The image dimensions
    /// - `None`: Headers weren't decoded, or the picture carries no pixels
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        if !self.decoded_headers || self.form == Some(FormType::META) {
            return None;
        }
        Some((self.width, self.height))
    }

    /// Get the colorspace the pixels decode to, `None` if the headers
    /// weren't decoded or the picture carries no pixels
    pub fn colorspace(&self) -> Option<ColorSpace> {
        if let Some(decoded) = &self.decoded {
            return Some(decoded.colorspace);
        }
        let has_alpha = match self.form? {
            FormType::ILBM | FormType::ACBM => self.bitmap_header?.has_mask_plane(),
            FormType::DEEP if self.deep_chunky => self
                .deep_elements
                .iter()
                .any(|e| e.component == DeepComponent::Alpha),
            FormType::YUVN => self.yuv_planes.alpha.is_some(),
            FormType::META => return None,
            _ => false
        };
        if has_alpha {
            Some(ColorSpace::RGBA)
        } else {
            Some(ColorSpace::RGB)
        }
    }

    pub const fn form_type(&self) -> Option<FormType> {
        self.form
    }

    /// The `BMHD` header of bitmap variants
    pub const fn bitmap_header(&self) -> Option<&BitMapHeader> {
        self.bitmap_header.as_ref()
    }

    pub const fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub const fn viewport_modes(&self) -> ViewportModes {
        self.viewport_modes
    }

    pub const fn fax_header(&self) -> Option<&FaxHeader> {
        self.fax_header.as_ref()
    }

    /// Raw `FLOG` chunks of a fax, in file order
    pub fn fax_logs(&self) -> Vec<&[u8]> {
        self.store.find_collection(ID_FLOG)
    }

    /// The raw `GPHD` chunk of a fax
    pub fn fax_graphics_header(&self) -> Option<&[u8]> {
        self.store.find_property(ID_GPHD)
    }

    pub const fn yuv_header(&self) -> Option<&YuvHeader> {
        self.yuv_header.as_ref()
    }

    pub const fn deep_header(&self) -> Option<&DeepGlobalHeader> {
        self.deep_header.as_ref()
    }

    /// The `DPEL` element list of a chunky DEEP picture
    pub fn deep_elements(&self) -> &[DeepPixelElement] {
        &self.deep_elements
    }

    pub const fn deep_location(&self) -> Option<&DeepLocation> {
        self.deep_location.as_ref()
    }

    pub const fn deep_change(&self) -> Option<&DeepChange> {
        self.deep_change.as_ref()
    }

    pub const fn deep_compression_table(&self) -> Option<&DeepCompressionTable> {
        self.deep_table.as_ref()
    }

    /// Metadata found before the pixel data
    pub const fn metadata(&self) -> &IffMetadata {
        &self.metadata
    }

    fn traits(&self) -> Option<PictureTraits> {
        let form = self.form?;

        let (planes, masking, transparent_color) = match (&self.bitmap_header, form) {
            (Some(h), _) => (h.planes, h.masking, h.transparent_color),
            (None, FormType::FAXX) => (1, Masking::None, 0),
            _ => (8, Masking::None, 0)
        };
        Some(PictureTraits {
            form,
            ham: self.is_ham(),
            ehb: self.is_ehb(),
            planes,
            has_alpha: self.colorspace() == Some(ColorSpace::RGBA),
            luma_only: self.yuv_header.map_or(false, |h| h.mode.is_luma_only()),
            masking,
            transparent_color,
            palette: self.palette.as_ref(),
            indices: self.palette_indices()
        })
    }

    /// Whether the picture only holds shades of grey
    ///
    /// Returns `None` if headers weren't decoded.
    pub fn analyze(&self) -> Option<bool> {
        if self.form == Some(FormType::META) {
            return None;
        }
        self.traits().map(|t| is_grayscale(&t))
    }

    /// Recommend a storage format for the decoded pixels
    ///
    /// A transparent index is only suggested when some pixel uses it.
    /// With `keep_index_zero_opaque` set, index 0 is never made
    /// transparent.
    pub fn output_format(
        &self, keep_index_zero_opaque: bool
    ) -> Result<OutputFormat, IffDecodeErrors> {
        if self.decoded.is_none() {
            return Err(IffDecodeErrors::InvalidState("Pixels not decoded"));
        }
        let traits = self
            .traits()
            .ok_or(IffDecodeErrors::InvalidState("Headers not decoded"))?;

        Ok(output_format(&traits, keep_index_zero_opaque))
    }

    /// Return a summary of the picture, `None` if headers weren't decoded
    pub fn image_info(&self) -> Option<IffImageInfo> {
        let form = self.form?;

        let depth = match form {
            FormType::FAXX => 1,
            FormType::YUVN => {
                let luma_only = self.yuv_header.map_or(false, |h| h.mode.is_luma_only());
                let base = if luma_only { 8 } else { 24 };
                base + 8 * u16::from(self.yuv_planes.alpha.is_some())
            }
            FormType::DEEP if self.deep_chunky => self
                .deep_elements
                .iter()
                .fold(0_u16, |acc, e| acc.saturating_add(e.bit_depth)),
            FormType::META => 0,
            _ => self.bitmap_header.map_or(0, |h| u16::from(h.planes))
        };
        let compressed = match form {
            FormType::FAXX => self
                .fax_header
                .map_or(false, |h| h.compression.to_u8() != 0),
            FormType::YUVN => self.yuv_header.map_or(false, |h| h.compression != 0),
            FormType::DEEP if self.deep_chunky => self
                .deep_header
                .map_or(false, |h| h.compression != DeepCompression::None),
            _ => self.bitmap_header.map_or(false, |h| h.is_compressed())
        };
        let components = self.colorspace().map_or(0, |c| c.num_components());

        Some(IffImageInfo {
            width: self.width,
            height: self.height,
            depth,
            form_type: form,
            viewport_modes: self.viewport_modes,
            compressed_size: self.stop_chunk_size,
            decoded_size: self.width * self.height * components,
            has_alpha: components == 4,
            ham: self.is_ham(),
            ehb: self.is_ehb(),
            compressed,
            indexed: matches!(form, FormType::ILBM | FormType::PBM | FormType::ACBM)
                && !self.is_ham(),
            grayscale: self.analyze().unwrap_or(false),
            loaded: self.decoded_headers,
            decoded: self.decoded.is_some()
        })
    }
}
