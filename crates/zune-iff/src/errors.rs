/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;

use crate::constants::id_to_str;

/// Errors that can occur while decoding an IFF picture
pub enum IffDecodeErrors {
    /// The stream does not start with a `FORM` group
    ///
    /// The argument is the tag that was found instead
    WrongMagicBytes([u8; 4]),
    /// The `FORM` variant tag is not one we can decode
    UnsupportedForm([u8; 4]),
    /// A chunk the variant needs was not present
    MissingChunk([u8; 4]),
    /// A chunk was present but its contents are not valid
    ///
    /// # Arguments
    /// - chunk id
    /// - reason
    MalformedChunk([u8; 4], &'static str),
    /// Scanning reached the end of the container without meeting
    /// a registered stop chunk
    StopChunkNotFound([u8; 4]),
    /// The input ended before enough bytes were read
    ///
    /// # Arguments
    /// - number of bytes requested
    /// - number of bytes remaining in the stream
    Truncated(usize, usize),
    /// A ByteRun1 run would write past the end of the output row
    RleOverflow,
    /// The compression code is unknown or not decodable for this variant
    UnsupportedCompression(u8),
    /// The plane count does not fit the variant or display mode
    UnsupportedPlaneCount(u16),
    /// Dimensions exceed configured limits
    ///
    /// # Arguments
    /// - maximum allowed
    /// - value found
    LargeDimensions(usize, usize),
    /// Width or height is zero
    ZeroDimensions,
    /// An invalid Modified Huffman or Modified READ code was found
    ///
    /// Only raised in strict mode, otherwise the rest of the page is
    /// filled with white.
    ///
    /// The argument is the scanline the code was found on.
    FaxCode(usize),
    /// An allocation of the given size failed
    NoMemory(usize),
    /// The API was used out of order
    InvalidState(&'static str),
    Generic(&'static str),
    /// The underlying reader failed
    IoErrors(ZByteIoError)
}

/// The four broad classes an [`IffDecodeErrors`] falls into
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IffErrorKind {
    NoMemory,
    BadContainer,
    Unsupported,
    InvalidState
}

impl IffErrorKind {
    /// Numeric code used by the legacy C interface
    pub const fn code(self) -> i32 {
        match self {
            IffErrorKind::NoMemory => -2,
            IffErrorKind::BadContainer => -3,
            IffErrorKind::Unsupported => -4,
            IffErrorKind::InvalidState => -5
        }
    }
}

impl IffDecodeErrors {
    /// Return the broad class of this error
    pub const fn kind(&self) -> IffErrorKind {
        match self {
            IffDecodeErrors::NoMemory(_) => IffErrorKind::NoMemory,
            IffDecodeErrors::UnsupportedForm(_)
            | IffDecodeErrors::UnsupportedCompression(_)
            | IffDecodeErrors::UnsupportedPlaneCount(_)
            | IffDecodeErrors::LargeDimensions(..) => IffErrorKind::Unsupported,
            IffDecodeErrors::InvalidState(_) => IffErrorKind::InvalidState,
            IffDecodeErrors::WrongMagicBytes(_)
            | IffDecodeErrors::MissingChunk(_)
            | IffDecodeErrors::MalformedChunk(..)
            | IffDecodeErrors::StopChunkNotFound(_)
            | IffDecodeErrors::Truncated(..)
            | IffDecodeErrors::RleOverflow
            | IffDecodeErrors::ZeroDimensions
            | IffDecodeErrors::FaxCode(_)
            | IffDecodeErrors::Generic(_)
            | IffDecodeErrors::IoErrors(_) => IffErrorKind::BadContainer
        }
    }
}

impl Debug for IffDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            IffDecodeErrors::WrongMagicBytes(found) => {
                writeln!(
                    f,
                    "Expected FORM but found {:?}, not an IFF image",
                    id_to_str(found)
                )
            }
            IffDecodeErrors::UnsupportedForm(form) => {
                writeln!(f, "Unsupported FORM type {:?}", id_to_str(form))
            }
            IffDecodeErrors::MissingChunk(id) => {
                writeln!(f, "Required chunk {:?} not found", id_to_str(id))
            }
            IffDecodeErrors::MalformedChunk(id, reason) => {
                writeln!(f, "Malformed {:?} chunk: {reason}", id_to_str(id))
            }
            IffDecodeErrors::StopChunkNotFound(id) => {
                writeln!(
                    f,
                    "Reached end of container before {:?} chunk",
                    id_to_str(id)
                )
            }
            IffDecodeErrors::Truncated(wanted, remaining) => {
                writeln!(
                    f,
                    "Not enough bytes, requested {wanted} but only {remaining} remain"
                )
            }
            IffDecodeErrors::RleOverflow => {
                writeln!(f, "ByteRun1 run overflows the output buffer")
            }
            IffDecodeErrors::UnsupportedCompression(compression) => {
                writeln!(f, "Unsupported compression {compression}")
            }
            IffDecodeErrors::UnsupportedPlaneCount(planes) => {
                writeln!(f, "Unsupported number of bitplanes {planes}")
            }
            IffDecodeErrors::LargeDimensions(supported, found) => {
                writeln!(
                    f,
                    "Too large dimensions, supported {supported} but found {found}"
                )
            }
            IffDecodeErrors::ZeroDimensions => {
                writeln!(f, "Zero found where not expected")
            }
            IffDecodeErrors::FaxCode(line) => {
                writeln!(f, "Invalid fax code on scanline {line}")
            }
            IffDecodeErrors::NoMemory(size) => {
                writeln!(f, "Could not allocate {size} bytes")
            }
            IffDecodeErrors::InvalidState(reason) => {
                writeln!(f, "Invalid state: {reason}")
            }
            IffDecodeErrors::Generic(reason) => {
                writeln!(f, "{reason}")
            }
            IffDecodeErrors::IoErrors(err) => {
                writeln!(f, "{:?}", err)
            }
        }
    }
}

impl Display for IffDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IffDecodeErrors {}

impl From<&'static str> for IffDecodeErrors {
    fn from(r: &'static str) -> Self {
        Self::Generic(r)
    }
}

impl From<ZByteIoError> for IffDecodeErrors {
    fn from(value: ZByteIoError) -> Self {
        match value {
            // readers disagree on the argument order, the larger one is
            // always the request
            ZByteIoError::NotEnoughBytes(a, b) => Self::Truncated(a.max(b), a.min(b)),
            err => Self::IoErrors(err)
        }
    }
}
