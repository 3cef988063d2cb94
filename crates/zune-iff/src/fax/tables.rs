/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! ITU-T T.4 code tables
//!
//! Codes are stored right aligned, `len` is the number of significant bits.
#![allow(clippy::unusual_byte_groupings)]

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct FaxCode {
    pub code: u16,
    pub len:  u8,
    pub run:  u16
}

impl FaxCode {
    const fn new(code: u16, len: u8, run: u16) -> FaxCode {
        FaxCode { code, len, run }
    }
}

/// Longest run length code, in bits
pub(crate) const MAX_CODE_LEN: u8 = 13;

/// A decoded run length code
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum RunCode {
    /// A multiple of 64, more codes follow
    Makeup(u16),
    /// 0..=63, ends the run
    Terminating(u16)
}

/// Match `len` bits of `code` against the tables for one color
pub(crate) fn lookup_run(code: u16, len: u8, white: bool) -> Option<RunCode> {
    let (terminating, makeup): (&[FaxCode], &[FaxCode]) = if white {
        (&WHITE_TERMINATING, &WHITE_MAKEUP)
    } else {
        (&BLACK_TERMINATING, &BLACK_MAKEUP)
    };
    let matches = |c: &&FaxCode| c.len == len && c.code == code;

    if let Some(c) = terminating.iter().find(matches) {
        return Some(RunCode::Terminating(c.run));
    }
    makeup
        .iter()
        .chain(EXTENDED_MAKEUP.iter())
        .find(matches)
        .map(|c| RunCode::Makeup(c.run))
}

/// Two dimensional coding modes
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Mode {
    Pass,
    Horizontal,
    /// `a1 = b1 + offset`
    Vertical(i8)
}

/// Mode codes, longest is seven bits
pub(crate) const MODE_CODES: [(u8, u8, Mode); 9] = [
    (0b1, 1, Mode::Vertical(0)),
    (0b011, 3, Mode::Vertical(1)),
    (0b010, 3, Mode::Vertical(-1)),
    (0b001, 3, Mode::Horizontal),
    (0b0001, 4, Mode::Pass),
    (0b000011, 6, Mode::Vertical(2)),
    (0b000010, 6, Mode::Vertical(-2)),
    (0b0000011, 7, Mode::Vertical(3)),
    (0b0000010, 7, Mode::Vertical(-3))
];

pub(crate) const MAX_MODE_LEN: u8 = 7;

/// Match `len` bits of `code` against the mode codes
pub(crate) fn lookup_mode(code: u8, len: u8) -> Option<Mode> {
    MODE_CODES
        .iter()
        .find(|(c, l, _)| *l == len && *c == code)
        .map(|(_, _, mode)| *mode)
}

/// White runs 0..=63
pub(crate) const WHITE_TERMINATING: [FaxCode; 64] = [
    FaxCode::new(0b00110101, 8, 0),
    FaxCode::new(0b000111, 6, 1),
    FaxCode::new(0b0111, 4, 2),
    FaxCode::new(0b1000, 4, 3),
    FaxCode::new(0b1011, 4, 4),
    FaxCode::new(0b1100, 4, 5),
    FaxCode::new(0b1110, 4, 6),
    FaxCode::new(0b1111, 4, 7),
    FaxCode::new(0b10011, 5, 8),
    FaxCode::new(0b10100, 5, 9),
    FaxCode::new(0b00111, 5, 10),
    FaxCode::new(0b01000, 5, 11),
    FaxCode::new(0b001000, 6, 12),
    FaxCode::new(0b000011, 6, 13),
    FaxCode::new(0b110100, 6, 14),
    FaxCode::new(0b110101, 6, 15),
    FaxCode::new(0b101010, 6, 16),
    FaxCode::new(0b101011, 6, 17),
    FaxCode::new(0b0100111, 7, 18),
    FaxCode::new(0b0001100, 7, 19),
    FaxCode::new(0b0001000, 7, 20),
    FaxCode::new(0b0010111, 7, 21),
    FaxCode::new(0b0000011, 7, 22),
    FaxCode::new(0b0000100, 7, 23),
    FaxCode::new(0b0101000, 7, 24),
    FaxCode::new(0b0101011, 7, 25),
    FaxCode::new(0b0010011, 7, 26),
    FaxCode::new(0b0100100, 7, 27),
    FaxCode::new(0b0011000, 7, 28),
    FaxCode::new(0b00000010, 8, 29),
    FaxCode::new(0b00000011, 8, 30),
    FaxCode::new(0b00011010, 8, 31),
    FaxCode::new(0b00011011, 8, 32),
    FaxCode::new(0b00010010, 8, 33),
    FaxCode::new(0b00010011, 8, 34),
    FaxCode::new(0b00010100, 8, 35),
    FaxCode::new(0b00010101, 8, 36),
    FaxCode::new(0b00010110, 8, 37),
    FaxCode::new(0b00010111, 8, 38),
    FaxCode::new(0b00101000, 8, 39),
    FaxCode::new(0b00101001, 8, 40),
    FaxCode::new(0b00101010, 8, 41),
    FaxCode::new(0b00101011, 8, 42),
    FaxCode::new(0b00101100, 8, 43),
    FaxCode::new(0b00101101, 8, 44),
    FaxCode::new(0b00000100, 8, 45),
    FaxCode::new(0b00000101, 8, 46),
    FaxCode::new(0b00001010, 8, 47),
    FaxCode::new(0b00001011, 8, 48),
    FaxCode::new(0b01010010, 8, 49),
    FaxCode::new(0b01010011, 8, 50),
    FaxCode::new(0b01010100, 8, 51),
    FaxCode::new(0b01010101, 8, 52),
    FaxCode::new(0b00100100, 8, 53),
    FaxCode::new(0b00100101, 8, 54),
    FaxCode::new(0b01011000, 8, 55),
    FaxCode::new(0b01011001, 8, 56),
    FaxCode::new(0b01011010, 8, 57),
    FaxCode::new(0b01011011, 8, 58),
    FaxCode::new(0b01001010, 8, 59),
    FaxCode::new(0b01001011, 8, 60),
    FaxCode::new(0b00110010, 8, 61),
    FaxCode::new(0b00110011, 8, 62),
    FaxCode::new(0b00110100, 8, 63)
];

/// White runs 64..=1728 in steps of 64
pub(crate) const WHITE_MAKEUP: [FaxCode; 27] = [
    FaxCode::new(0b11011, 5, 64),
    FaxCode::new(0b10010, 5, 128),
    FaxCode::new(0b010111, 6, 192),
    FaxCode::new(0b0110111, 7, 256),
    FaxCode::new(0b00110110, 8, 320),
    FaxCode::new(0b00110111, 8, 384),
    FaxCode::new(0b01100100, 8, 448),
    FaxCode::new(0b01100101, 8, 512),
    FaxCode::new(0b01101000, 8, 576),
    FaxCode::new(0b01100111, 8, 640),
    FaxCode::new(0b011001100, 9, 704),
    FaxCode::new(0b011001101, 9, 768),
    FaxCode::new(0b011010010, 9, 832),
    FaxCode::new(0b011010011, 9, 896),
    FaxCode::new(0b011010100, 9, 960),
    FaxCode::new(0b011010101, 9, 1024),
    FaxCode::new(0b011010110, 9, 1088),
    FaxCode::new(0b011010111, 9, 1152),
    FaxCode::new(0b011011000, 9, 1216),
    FaxCode::new(0b011011001, 9, 1280),
    FaxCode::new(0b011011010, 9, 1344),
    FaxCode::new(0b011011011, 9, 1408),
    FaxCode::new(0b010011000, 9, 1472),
    FaxCode::new(0b010011001, 9, 1536),
    FaxCode::new(0b010011010, 9, 1600),
    FaxCode::new(0b011000, 6, 1664),
    FaxCode::new(0b010011011, 9, 1728)
];

/// Black runs 0..=63
pub(crate) const BLACK_TERMINATING: [FaxCode; 64] = [
    FaxCode::new(0b0000110111, 10, 0),
    FaxCode::new(0b010, 3, 1),
    FaxCode::new(0b11, 2, 2),
    FaxCode::new(0b10, 2, 3),
    FaxCode::new(0b011, 3, 4),
    FaxCode::new(0b0011, 4, 5),
    FaxCode::new(0b0010, 4, 6),
    FaxCode::new(0b00011, 5, 7),
    FaxCode::new(0b000101, 6, 8),
    FaxCode::new(0b000100, 6, 9),
    FaxCode::new(0b0000100, 7, 10),
    FaxCode::new(0b0000101, 7, 11),
    FaxCode::new(0b0000111, 7, 12),
    FaxCode::new(0b00000100, 8, 13),
    FaxCode::new(0b00000111, 8, 14),
    FaxCode::new(0b000011000, 9, 15),
    FaxCode::new(0b0000010111, 10, 16),
    FaxCode::new(0b0000011000, 10, 17),
    FaxCode::new(0b0000001000, 10, 18),
    FaxCode::new(0b00001100111, 11, 19),
    FaxCode::new(0b00001101000, 11, 20),
    FaxCode::new(0b00001101100, 11, 21),
    FaxCode::new(0b00000110111, 11, 22),
    FaxCode::new(0b00000101000, 11, 23),
    FaxCode::new(0b00000010111, 11, 24),
    FaxCode::new(0b00000011000, 11, 25),
    FaxCode::new(0b000011001010, 12, 26),
    FaxCode::new(0b000011001011, 12, 27),
    FaxCode::new(0b000011001100, 12, 28),
    FaxCode::new(0b000011001101, 12, 29),
    FaxCode::new(0b000001101000, 12, 30),
    FaxCode::new(0b000001101001, 12, 31),
    FaxCode::new(0b000001101010, 12, 32),
    FaxCode::new(0b000001101011, 12, 33),
    FaxCode::new(0b000011010010, 12, 34),
    FaxCode::new(0b000011010011, 12, 35),
    FaxCode::new(0b000011010100, 12, 36),
    FaxCode::new(0b000011010101, 12, 37),
    FaxCode::new(0b000011010110, 12, 38),
    FaxCode::new(0b000011010111, 12, 39),
    FaxCode::new(0b000001101100, 12, 40),
    FaxCode::new(0b000001101101, 12, 41),
    FaxCode::new(0b000011011010, 12, 42),
    FaxCode::new(0b000011011011, 12, 43),
    FaxCode::new(0b000001010100, 12, 44),
    FaxCode::new(0b000001010101, 12, 45),
    FaxCode::new(0b000001010110, 12, 46),
    FaxCode::new(0b000001010111, 12, 47),
    FaxCode::new(0b000001100100, 12, 48),
    FaxCode::new(0b000001100101, 12, 49),
    FaxCode::new(0b000001010010, 12, 50),
    FaxCode::new(0b000001010011, 12, 51),
    FaxCode::new(0b000000100100, 12, 52),
    FaxCode::new(0b000000110111, 12, 53),
    FaxCode::new(0b000000111000, 12, 54),
    FaxCode::new(0b000000100111, 12, 55),
    FaxCode::new(0b000000101000, 12, 56),
    FaxCode::new(0b000001011000, 12, 57),
    FaxCode::new(0b000001011001, 12, 58),
    FaxCode::new(0b000000101011, 12, 59),
    FaxCode::new(0b000000101100, 12, 60),
    FaxCode::new(0b000001011010, 12, 61),
    FaxCode::new(0b000001100110, 12, 62),
    FaxCode::new(0b000001100111, 12, 63)
];

/// Black runs 64..=1728 in steps of 64
pub(crate) const BLACK_MAKEUP: [FaxCode; 27] = [
    FaxCode::new(0b0000001111, 10, 64),
    FaxCode::new(0b000011001000, 12, 128),
    FaxCode::new(0b000011001001, 12, 192),
    FaxCode::new(0b000001011011, 12, 256),
    FaxCode::new(0b000000110011, 12, 320),
    FaxCode::new(0b000000110100, 12, 384),
    FaxCode::new(0b000000110101, 12, 448),
    FaxCode::new(0b0000001101100, 13, 512),
    FaxCode::new(0b0000001101101, 13, 576),
    FaxCode::new(0b0000001001010, 13, 640),
    FaxCode::new(0b0000001001011, 13, 704),
    FaxCode::new(0b0000001001100, 13, 768),
    FaxCode::new(0b0000001001101, 13, 832),
    FaxCode::new(0b0000001110010, 13, 896),
    FaxCode::new(0b0000001110011, 13, 960),
    FaxCode::new(0b0000001110100, 13, 1024),
    FaxCode::new(0b0000001110101, 13, 1088),
    FaxCode::new(0b0000001110110, 13, 1152),
    FaxCode::new(0b0000001110111, 13, 1216),
    FaxCode::new(0b0000001010010, 13, 1280),
    FaxCode::new(0b0000001010011, 13, 1344),
    FaxCode::new(0b0000001010100, 13, 1408),
    FaxCode::new(0b0000001010101, 13, 1472),
    FaxCode::new(0b0000001011010, 13, 1536),
    FaxCode::new(0b0000001011011, 13, 1600),
    FaxCode::new(0b0000001100100, 13, 1664),
    FaxCode::new(0b0000001100101, 13, 1728)
];

/// Runs 1792..=2560, shared by both colors
pub(crate) const EXTENDED_MAKEUP: [FaxCode; 13] = [
    FaxCode::new(0b00000001000, 11, 1792),
    FaxCode::new(0b00000001100, 11, 1856),
    FaxCode::new(0b00000001101, 11, 1920),
    FaxCode::new(0b000000010010, 12, 1984),
    FaxCode::new(0b000000010011, 12, 2048),
    FaxCode::new(0b000000010100, 12, 2112),
    FaxCode::new(0b000000010101, 12, 2176),
    FaxCode::new(0b000000010110, 12, 2240),
    FaxCode::new(0b000000010111, 12, 2304),
    FaxCode::new(0b000000011100, 12, 2368),
    FaxCode::new(0b000000011101, 12, 2432),
    FaxCode::new(0b000000011110, 12, 2496),
    FaxCode::new(0b000000011111, 12, 2560)
];
