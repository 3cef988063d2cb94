/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use zune_core::bytestream::ZCursor;
use zune_core::options::DecoderOptions;
use zune_iff::{probe_iff, FormType, IffDecodeErrors, IffDecoder, IffErrorKind};

mod common;

use common::*;

fn small_ilbm(extra: &[Vec<u8>]) -> Vec<u8> {
    let mut chunks = vec![Bmhd::new(2, 1, 1).to_chunk(), cmap(&[[0, 0, 0], [255, 255, 255]])];
    chunks.extend_from_slice(extra);
    chunks.push(chunk(b"BODY", &plane_row(&[1, 0], 0)));

    form(b"ILBM", &chunks)
}

fn crng(low: u8, high: u8) -> Vec<u8> {
    let mut out = Vec::new();
    for v in [0_i16, 0x4000, 1] {
        out.extend_from_slice(&v.to_be_bytes());
    }
    out.extend_from_slice(&[low, high]);
    chunk(b"CRNG", &out)
}

#[test]
fn probe() {
    assert!(probe_iff(&small_ilbm(&[])));
    assert!(!probe_iff(b"FORM\0\0\0\x04WAVE"));
    assert!(!probe_iff(b"RIFF"));
}

#[test]
fn wrong_magic() {
    let mut decoder = IffDecoder::new(ZCursor::new(b"RIFF\0\0\0\x04WAVE"));

    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, IffDecodeErrors::WrongMagicBytes(id) if &id == b"RIFF"));
    assert_eq!(err.kind(), IffErrorKind::BadContainer);
    assert_eq!(err.kind().code(), -3);
}

#[test]
fn unknown_form_type() {
    let data = form(b"WAVE", &[chunk(b"fmt ", &[0; 4])]);
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(err, IffDecodeErrors::UnsupportedForm(id) if &id == b"WAVE"));
    assert_eq!(err.kind(), IffErrorKind::Unsupported);
}

#[test]
fn missing_body() {
    let data = form(b"ILBM", &[Bmhd::new(2, 1, 1).to_chunk()]);
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    assert!(matches!(
        decoder.decode_headers(),
        Err(IffDecodeErrors::StopChunkNotFound(id)) if &id == b"BODY"
    ));
}

#[test]
fn missing_bitmap_header() {
    let data = form(b"ILBM", &[chunk(b"BODY", &[0; 2])]);
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    assert!(matches!(
        decoder.decode_headers(),
        Err(IffDecodeErrors::MissingChunk(id)) if &id == b"BMHD"
    ));
}

#[test]
fn decode_without_headers_first() {
    let data = small_ilbm(&[]);
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    decoder.decode().unwrap();

    assert_eq!(decoder.form_type(), Some(FormType::ILBM));
    assert_eq!(decoder.dimensions(), Some((2, 1)));
    assert_eq!(decoder.pixels().unwrap(), &[255, 255, 255, 0, 0, 0]);

    // a second decode keeps the pixels
    decoder.decode().unwrap();
    assert_eq!(decoder.into_pixels().unwrap().len(), 6);
}

#[test]
fn metadata_keeps_every_instance_in_order() {
    let data = small_ilbm(&[
        chunk(b"ANNO", b"first"),
        chunk(b"TEXT", b"text"),
        crng(1, 5),
        chunk(b"ANNO", b"second"),
        chunk(b"AUTH", b"old author"),
        chunk(b"AUTH", b"new author"),
        crng(6, 9),
        chunk(b"GRAB", &[0, 3, 0, 4])
    ]);
    let mut decoder = IffDecoder::new(ZCursor::new(&data));
    decoder.decode_headers().unwrap();

    let metadata = decoder.metadata();

    assert_eq!(
        metadata.annotations(),
        vec![&b"first"[..], &b"second"[..]]
    );
    assert_eq!(metadata.annotation(), Some(&b"first"[..]));
    assert_eq!(metadata.texts(), vec![&b"text"[..]]);
    // single value chunks keep the last instance
    assert_eq!(metadata.author(), Some(&b"new author"[..]));

    let ranges = metadata.color_ranges();
    assert_eq!(ranges.len(), 2);
    assert_eq!((ranges[0].low, ranges[0].high), (1, 5));
    assert_eq!((ranges[1].low, ranges[1].high), (6, 9));
    assert!(ranges[0].is_active());

    let grab = metadata.grab().unwrap();
    assert_eq!((grab.x, grab.y), (3, 4));
    assert!(metadata.copyright().is_none());
}

#[test]
fn geotiff_origin_names_the_source_format() {
    let data = small_ilbm(&[
        chunk(b"GEOT", b"tags"),
        chunk(b"GEOF", b"TIFF"),
        chunk(b"GEOF", b"PNG ")
    ]);
    let mut decoder = IffDecoder::new(ZCursor::new(&data));
    decoder.decode_headers().unwrap();

    let metadata = decoder.metadata();

    assert_eq!(metadata.geotiff(), Some(&b"tags"[..]));
    assert_eq!(metadata.geotiff_origin(), Some(*b"TIFF"));
    assert_eq!(metadata.geotiff_origins(), &[*b"TIFF", *b"PNG "]);
}

#[test]
fn short_fixed_metadata() {
    let data = small_ilbm(&[chunk(b"GRAB", &[0, 3])]);

    let mut lenient = IffDecoder::new(ZCursor::new(&data));
    lenient.decode_headers().unwrap();
    assert!(lenient.metadata().grab().is_none());

    let options = DecoderOptions::default().set_strict_mode(true);
    let mut strict = IffDecoder::new_with_options(ZCursor::new(&data), options);
    assert!(matches!(
        strict.decode_headers(),
        Err(IffDecodeErrors::MalformedChunk(..))
    ));
}

#[test]
fn metadata_only_form() {
    let data = form(
        b"META",
        &[
            chunk(b"ANNO", b"notes"),
            chunk(b"EXIF", b"blob one"),
            chunk(b"EXIF", b"blob two")
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    decoder.decode_headers().unwrap();
    assert_eq!(decoder.form_type(), Some(FormType::META));
    assert_eq!(decoder.dimensions(), None);
    assert_eq!(decoder.metadata().all_exif().len(), 2);
    assert_eq!(decoder.metadata().annotation(), Some(&b"notes"[..]));

    let err = decoder.decode().unwrap_err();
    assert_eq!(err.kind(), IffErrorKind::Unsupported);
}

#[test]
fn nested_groups_are_skipped() {
    let nested = form(b"ILBM", &[chunk(b"BODY", &[0xFF; 2])]);
    let data = small_ilbm(&[nested, chunk(b"JUNK", &[1, 2, 3])]);

    let mut decoder = IffDecoder::new(ZCursor::new(&data));
    decoder.decode().unwrap();

    assert_eq!(decoder.pixels().unwrap(), &[255, 255, 255, 0, 0, 0]);
}

#[test]
fn overlong_form_length() {
    let mut data = small_ilbm(&[]);
    // claim more bytes than exist
    data[4..8].copy_from_slice(&10_000_u32.to_be_bytes());

    let mut lenient = IffDecoder::new(ZCursor::new(&data));
    lenient.decode().unwrap();

    let options = DecoderOptions::default().set_strict_mode(true);
    let mut strict = IffDecoder::new_with_options(ZCursor::new(&data), options);
    assert!(matches!(
        strict.decode_headers(),
        Err(IffDecodeErrors::Truncated(..))
    ));
}

#[test]
fn dimension_limits() {
    let data = small_ilbm(&[]);
    let options = DecoderOptions::default().set_max_width(1);
    let mut decoder = IffDecoder::new_with_options(ZCursor::new(&data), options);

    assert!(matches!(
        decoder.decode_headers(),
        Err(IffDecodeErrors::LargeDimensions(1, 2))
    ));

    let zero = form(
        b"ILBM",
        &[
            Bmhd::new(0, 1, 1).to_chunk(),
            cmap(&[[0, 0, 0]]),
            chunk(b"BODY", &[])
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&zero));
    assert!(matches!(
        decoder.decode_headers(),
        Err(IffDecodeErrors::ZeroDimensions)
    ));
}

#[test]
fn truncated_body() {
    let data = form(
        b"ILBM",
        &[
            Bmhd::new(2, 4, 1).to_chunk(),
            cmap(&[[0, 0, 0], [255, 255, 255]]),
            chunk(b"BODY", &[0; 4])
        ]
    );
    let mut decoder = IffDecoder::new(ZCursor::new(&data));

    assert!(matches!(
        decoder.decode(),
        Err(IffDecodeErrors::Truncated(..))
    ));
    assert!(decoder.pixels().is_none());
}
