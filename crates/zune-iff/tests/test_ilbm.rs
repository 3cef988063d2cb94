/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_core::bytestream::ZCursor;
use zune_core::colorspace::ColorSpace;
use zune_iff::{ColorMode, IffDecodeErrors, IffDecoder, CAMG_EXTRA_HALFBRITE, CAMG_HAM};

mod common;

use common::*;

const RGBK: [[u8; 3]; 4] = [[0, 0, 0], [255, 0, 0], [0, 255, 0], [0, 0, 255]];

fn two_by_two(compression: u8) -> Vec<u8> {
    let rows = [vec![0, 1], vec![2, 3]];
    let mut header = Bmhd::new(2, 2, 2);
    header.compression = compression;

    let body = if compression == 1 {
        let mut body = Vec::new();
        for row in &rows {
            for plane in 0..2 {
                body.extend_from_slice(&zune_iff::rle::compress(&plane_row(row, plane)));
            }
        }
        body
    } else {
        interleaved_body(&rows, 2)
    };

    form(
        b"ILBM",
        &[header.to_chunk(), cmap(&RGBK), chunk(b"BODY", &body)]
    )
}

#[test]
fn two_plane_picture() {
    let data = two_by_two(0);
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    decoder.decode().unwrap();

    assert_eq!(decoder.dimensions(), Some((2, 2)));
    assert_eq!(decoder.colorspace(), Some(ColorSpace::RGB));
    assert_eq!(
        decoder.pixels().unwrap(),
        &[0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255]
    );
    assert_eq!(decoder.palette_indices().unwrap(), &[0, 1, 2, 3]);
}

#[test]
fn compressed_rows_match_raw_rows() {
    let raw = two_by_two(0);
    let packed = two_by_two(1);

    let mut raw_decoder = IffDecoder::new(ZCursor::new(&raw));
    let mut packed_decoder = IffDecoder::new(ZCursor::new(&packed));

    raw_decoder.decode().unwrap();
    packed_decoder.decode().unwrap();

    assert_eq!(raw_decoder.pixels(), packed_decoder.pixels());
    assert!(packed_decoder.image_info().unwrap().compressed);
}

#[test]
fn headers_only() {
    let data = two_by_two(0);
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    decoder.decode_headers().unwrap();

    let info = decoder.image_info().unwrap();
    assert_eq!(info.width, 2);
    assert_eq!(info.depth, 2);
    assert!(info.loaded);
    assert!(info.indexed);
    assert!(!info.decoded);
    assert!(decoder.pixels().is_none());
    assert_eq!(decoder.bitmap_header().unwrap().planes, 2);
}

#[test]
fn hold_and_modify() {
    // code 0 palette, code 2 red, code 1 blue with 4 value bits, the low
    // bits of the held color survive a modify
    let rows = [vec![1, (2 << 4) | 8, 1 << 4]];
    let data = form(
        b"ILBM",
        &[
            Bmhd::new(3, 1, 6).to_chunk(),
            cmap(&[[0, 0, 0], [10, 20, 30]]),
            camg(CAMG_HAM),
            chunk(b"BODY", &interleaved_body(&rows, 6))
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));
    decoder.decode().unwrap();

    assert_eq!(
        decoder.pixels().unwrap(),
        &[10, 20, 30, 138, 20, 30, 138, 20, 14]
    );
    // no index buffer for HAM
    assert!(decoder.palette_indices().is_none());
    assert_eq!(decoder.analyze(), Some(false));
    assert_eq!(
        decoder.output_format(false).unwrap().color_mode,
        ColorMode::Rgb
    );
}

#[test]
fn hold_and_modify_plane_count() {
    let rows = [vec![0]];
    let data = form(
        b"ILBM",
        &[
            Bmhd::new(1, 1, 4).to_chunk(),
            cmap(&RGBK),
            camg(CAMG_HAM),
            chunk(b"BODY", &interleaved_body(&rows, 4))
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    assert!(matches!(
        decoder.decode(),
        Err(IffDecodeErrors::UnsupportedPlaneCount(4))
    ));
    assert!(decoder.pixels().is_none());
}

#[test]
fn extra_half_brite() {
    let mut palette = [[1_u8, 1, 1]; 32];
    palette[8] = [200, 100, 50];

    let rows = [vec![8, 40]];
    let data = form(
        b"ILBM",
        &[
            Bmhd::new(2, 1, 6).to_chunk(),
            cmap(&palette),
            camg(CAMG_EXTRA_HALFBRITE),
            chunk(b"BODY", &interleaved_body(&rows, 6))
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));
    decoder.decode().unwrap();

    assert_eq!(decoder.pixels().unwrap(), &[200, 100, 50, 100, 50, 25]);
    assert_eq!(decoder.palette_indices().unwrap(), &[8, 40]);
    assert!(decoder.image_info().unwrap().ehb);
}

#[test]
fn four_bit_palette_is_expanded() {
    let rows = [vec![0, 1, 3]];
    let data = form(
        b"ILBM",
        &[
            Bmhd::new(3, 1, 2).to_chunk(),
            cmap(&[[0xF0, 0, 0], [0, 0x70, 0]]),
            chunk(b"BODY", &interleaved_body(&rows, 2))
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));
    decoder.decode().unwrap();

    assert!(decoder.palette().unwrap().is_4bit());
    // index 3 is past the palette and clamps to the last entry
    assert_eq!(
        decoder.pixels().unwrap(),
        &[0xFF, 0, 0, 0, 0x77, 0, 0, 0x77, 0]
    );
}

#[test]
fn mask_plane_gives_alpha() {
    let mut header = Bmhd::new(2, 1, 1);
    header.masking = 1;

    let mut body = plane_row(&[1, 0], 0);
    body.extend_from_slice(&plane_row(&[1, 0], 0));

    let data = form(
        b"ILBM",
        &[
            header.to_chunk(),
            cmap(&[[0, 0, 0], [255, 255, 255]]),
            chunk(b"BODY", &body)
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    decoder.decode_headers().unwrap();
    assert_eq!(decoder.colorspace(), Some(ColorSpace::RGBA));

    decoder.decode().unwrap();
    assert_eq!(decoder.pixels().unwrap(), &[255, 255, 255, 255, 0, 0, 0, 0]);
    assert_eq!(
        decoder.output_format(false).unwrap().color_mode,
        ColorMode::Rgba
    );
}

#[test]
fn missing_palette() {
    let rows = [vec![0]];
    let data = form(
        b"ILBM",
        &[
            Bmhd::new(1, 1, 1).to_chunk(),
            chunk(b"BODY", &interleaved_body(&rows, 1))
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    assert!(matches!(
        decoder.decode(),
        Err(IffDecodeErrors::MissingChunk(id)) if &id == b"CMAP"
    ));
}

#[test]
fn grey_palette_with_transparent_index() {
    let mut header = Bmhd::new(2, 1, 1);
    header.masking = 2;
    header.transparent_color = 1;

    let rows = [vec![0, 1]];
    let data = form(
        b"ILBM",
        &[
            header.to_chunk(),
            cmap(&[[0, 0, 0], [255, 255, 255]]),
            chunk(b"BODY", &interleaved_body(&rows, 1))
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));
    decoder.decode().unwrap();

    assert_eq!(decoder.analyze(), Some(true));

    let format = decoder.output_format(false).unwrap();
    assert_eq!(format.color_mode, ColorMode::Gray);
    assert_eq!(format.bit_depth, 1);
    assert_eq!(format.transparent_index, Some(1));
}

#[test]
fn transparent_index_zero_can_stay_opaque() {
    let mut header = Bmhd::new(2, 1, 2);
    header.masking = 2;
    header.transparent_color = 0;

    let rows = [vec![0, 2]];
    let data = form(
        b"ILBM",
        &[
            header.to_chunk(),
            cmap(&RGBK),
            chunk(b"BODY", &interleaved_body(&rows, 2))
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));
    decoder.decode().unwrap();

    let format = decoder.output_format(true).unwrap();
    assert_eq!(format.color_mode, ColorMode::Palette);
    assert_eq!(format.bit_depth, 2);
    assert_eq!(format.palette.unwrap().len(), 4);
    assert_eq!(format.transparent_index, None);

    assert_eq!(decoder.output_format(false).unwrap().transparent_index, Some(0));
}

#[test]
fn output_format_needs_pixels() {
    let data = two_by_two(0);
    let mut decoder = IffDecoder::new(ZCursor::new(&data));
    decoder.decode_headers().unwrap();

    assert!(matches!(
        decoder.output_format(false),
        Err(IffDecodeErrors::InvalidState(_))
    ));
}

#[test]
fn contiguous_planes() {
    let rows = [vec![0_u32, 1], vec![2, 3]];
    let mut body = Vec::new();
    for plane in 0..2 {
        for row in &rows {
            body.extend_from_slice(&plane_row(row, plane));
        }
    }
    let data = form(
        b"ACBM",
        &[Bmhd::new(2, 2, 2).to_chunk(), cmap(&RGBK), chunk(b"ABIT", &body)]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));
    decoder.decode().unwrap();

    assert_eq!(
        decoder.pixels().unwrap(),
        &[0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255]
    );
}

#[test]
fn compressed_contiguous_planes_are_rejected() {
    let mut header = Bmhd::new(2, 2, 2);
    header.compression = 1;

    let data = form(
        b"ACBM",
        &[header.to_chunk(), cmap(&RGBK), chunk(b"ABIT", &[0; 16])]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    assert!(matches!(
        decoder.decode(),
        Err(IffDecodeErrors::UnsupportedCompression(1))
    ));
}

#[test]
fn packed_pixels() {
    // odd width, the rows carry no pad byte
    let body = [0, 1, 2, 2, 1, 0];
    let data = form(
        b"PBM ",
        &[
            Bmhd::new(3, 2, 8).to_chunk(),
            cmap(&RGBK[..3]),
            chunk(b"BODY", &body)
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));
    decoder.decode().unwrap();

    assert_eq!(
        decoder.pixels().unwrap(),
        &[0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 255, 0, 255, 0, 0, 0, 0, 0]
    );
    assert_eq!(decoder.palette_indices().unwrap(), &[0, 1, 2, 2, 1, 0]);
}
