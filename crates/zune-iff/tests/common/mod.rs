/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Builders for synthetic IFF files
#![allow(dead_code)]

pub fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(id);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    if payload.len() & 1 == 1 {
        out.push(0);
    }
    out
}

pub fn form(form_type: &[u8; 4], chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut body = form_type.to_vec();
    for c in chunks {
        body.extend_from_slice(c);
    }
    chunk(b"FORM", &body)
}

pub struct Bmhd {
    pub width:             u16,
    pub height:            u16,
    pub planes:            u8,
    pub masking:           u8,
    pub compression:       u8,
    pub transparent_color: u16
}

impl Bmhd {
    pub fn new(width: u16, height: u16, planes: u8) -> Bmhd {
        Bmhd {
            width,
            height,
            planes,
            masking: 0,
            compression: 0,
            transparent_color: 0
        }
    }

    pub fn to_chunk(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.width.to_be_bytes());
        out.extend_from_slice(&self.height.to_be_bytes());
        // x, y
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.push(self.planes);
        out.push(self.masking);
        out.push(self.compression);
        // pad
        out.push(0);
        out.extend_from_slice(&self.transparent_color.to_be_bytes());
        // aspect
        out.extend_from_slice(&[10, 11]);
        out.extend_from_slice(&self.width.to_be_bytes());
        out.extend_from_slice(&self.height.to_be_bytes());
        chunk(b"BMHD", &out)
    }
}

pub fn cmap(colors: &[[u8; 3]]) -> Vec<u8> {
    let flat: Vec<u8> = colors.iter().flatten().copied().collect();
    chunk(b"CMAP", &flat)
}

pub fn camg(modes: u32) -> Vec<u8> {
    chunk(b"CAMG", &modes.to_be_bytes())
}

pub fn row_bytes(width: usize) -> usize {
    ((width + 15) >> 4) << 1
}

/// One bit plane row, bit `plane` of every value
pub fn plane_row(values: &[u32], plane: usize) -> Vec<u8> {
    let mut row = vec![0_u8; row_bytes(values.len())];

    for (column, value) in values.iter().enumerate() {
        if value & (1 << plane) != 0 {
            row[column >> 3] |= 0x80 >> (column & 7);
        }
    }
    row
}

/// An uncompressed interleaved body, all planes of row 0, then row 1 ...
pub fn interleaved_body(rows: &[Vec<u32>], planes: usize) -> Vec<u8> {
    let mut out = Vec::new();

    for row in rows {
        for plane in 0..planes {
            out.extend_from_slice(&plane_row(row, plane));
        }
    }
    out
}

/// MSB first bit packer
#[derive(Default)]
pub struct BitWriter {
    pub bytes: Vec<u8>,
    bits:      usize
}

impl BitWriter {
    pub fn put_str(&mut self, bits: &str) {
        for bit in bits.bytes() {
            if self.bits % 8 == 0 {
                self.bytes.push(0);
            }
            if bit == b'1' {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 0x80 >> (self.bits % 8);
            }
            self.bits += 1;
        }
    }
}
