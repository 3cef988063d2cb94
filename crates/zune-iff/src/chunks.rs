/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Container walking
//!
//! An IFF file is a `FORM` group holding a four byte variant tag followed
//! by sibling chunks. Each chunk is a four byte id, a big endian length
//! and the payload, padded with one byte when the length is odd.
//!
//! [`ChunkReader`] walks those chunks one at a time, [`PropertyStore`] sits
//! on top and decides, per chunk id, whether a chunk is stored, appended to a
//! list or halts the scan so a decoder can stream its body.
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZReader, ZSeekFrom};
use zune_core::log::{trace, warn};

use crate::constants::{id_to_str, ChunkId, ID_CAT, ID_FORM, ID_LIST, ID_PROP};
use crate::errors::IffDecodeErrors;
use crate::pixels::try_alloc;

/// Identifier and declared payload size of a chunk
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChunkHeader {
    pub id:   ChunkId,
    pub size: usize
}

/// Walks the sibling chunks of a single `FORM`
pub struct ChunkReader<T: ZByteReaderTrait> {
    stream:    ZReader<T>,
    form_type: Option<ChunkId>,
    form_end:  u64,
    current:   Option<ChunkHeader>,
    /// Unread bytes of the current chunk body
    body_left: usize,
    padded:    bool,
    strict:    bool
}

impl<T: ZByteReaderTrait> ChunkReader<T> {
    pub fn new(source: T, strict: bool) -> ChunkReader<T> {
        ChunkReader {
            stream: ZReader::new(source),
            form_type: None,
            form_end: 0,
            current: None,
            body_left: 0,
            padded: false,
            strict
        }
    }

    /// Read the outer `FORM` header and return its variant tag
    ///
    /// Calling this more than once returns the tag read the first time.
    pub fn open_container(&mut self) -> Result<ChunkId, IffDecodeErrors> {
        if let Some(form_type) = self.form_type {
            return Ok(form_type);
        }
        let magic = self.stream.read_fixed_bytes_or_error::<4>()?;

        if magic != ID_FORM {
            return Err(IffDecodeErrors::WrongMagicBytes(magic));
        }
        let length = self.stream.get_u32_be_err()?;

        if length < 4 {
            return Err(IffDecodeErrors::MalformedChunk(
                ID_FORM,
                "FORM too small to hold a type"
            ));
        }
        let start = self.stream.position()?;
        let stream_end = self.stream.seek(ZSeekFrom::End(0))?;
        self.stream.seek(ZSeekFrom::Start(start))?;

        let mut form_end = start + u64::from(length);

        if form_end > stream_end {
            let remaining = usize::try_from(stream_end - start).unwrap_or(usize::MAX);

            if self.strict {
                return Err(IffDecodeErrors::Truncated(length as usize, remaining));
            }
            warn!(
                "FORM declares {} bytes but only {} are present, clamping",
                length,
                remaining
            );
            form_end = stream_end;
        }
        let form_type = self.stream.read_fixed_bytes_or_error::<4>()?;

        trace!("FORM type: {}", id_to_str(&form_type));
        trace!("FORM length: {}", length);

        self.form_end = form_end;
        self.form_type = Some(form_type);

        Ok(form_type)
    }

    /// The variant tag of the container or `None` before
    /// [`open_container`](Self::open_container) succeeded
    pub const fn form_type(&self) -> Option<ChunkId> {
        self.form_type
    }

    /// Skip whatever is left of the current chunk and its pad byte
    fn skip_current(&mut self) -> Result<(), IffDecodeErrors> {
        if self.current.take().is_none() {
            return Ok(());
        }
        let mut skip = self.body_left;
        self.body_left = 0;

        // the pad byte may be missing on the last chunk of a truncated file
        if self.padded && self.stream.position()? + (skip as u64) < self.form_end {
            skip += 1;
        }
        if skip != 0 {
            self.stream.skip(skip)?;
        }
        Ok(())
    }

    /// Advance to the next sibling chunk
    ///
    /// Whatever is left of the current chunk, including its pad byte, is
    /// skipped. Returns `Ok(None)` at the end of the container.
    pub fn next_chunk(&mut self) -> Result<Option<ChunkHeader>, IffDecodeErrors> {
        if self.form_type.is_none() {
            return Err(IffDecodeErrors::InvalidState(
                "container must be opened before reading chunks"
            ));
        }
        self.skip_current()?;

        let left = self.form_end.saturating_sub(self.stream.position()?);

        if left < 8 {
            if left != 0 && self.strict {
                return Err(IffDecodeErrors::Truncated(8, left as usize));
            }
            // consume trailing garbage so repeated calls keep returning None
            self.stream.skip(left as usize)?;
            return Ok(None);
        }
        let id = self.stream.read_fixed_bytes_or_error::<4>()?;
        let size = self.stream.get_u32_be_err()? as usize;

        let available = usize::try_from(self.form_end - self.stream.position()?)
            .unwrap_or(usize::MAX);

        let body_len = if size > available {
            if self.strict {
                return Err(IffDecodeErrors::Truncated(size, available));
            }
            warn!(
                "Chunk {} declares {} bytes, only {} present",
                id_to_str(&id),
                size,
                available
            );
            available
        } else {
            size
        };
        let header = ChunkHeader { id, size };

        self.body_left = body_len;
        self.padded = size & 1 == 1;
        self.current = Some(header);

        Ok(Some(header))
    }

    /// The chunk the reader is positioned at
    pub const fn current_chunk(&self) -> Option<ChunkHeader> {
        self.current
    }

    /// Copy bytes from the current chunk into `buf`, returning
    /// the number of bytes copied
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, IffDecodeErrors> {
        let count = buf.len().min(self.body_left);

        self.stream.read_exact_bytes(&mut buf[..count])?;
        self.body_left -= count;

        Ok(count)
    }

    /// Read the unread part of the current chunk body
    pub fn read_body(&mut self) -> Result<Vec<u8>, IffDecodeErrors> {
        let mut body = try_alloc(self.body_left)?;

        self.stream.read_exact_bytes(&mut body)?;
        self.body_left = 0;

        Ok(body)
    }
}

/// How a registered chunk is treated during a scan
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChunkKind {
    /// Single instance, a later chunk replaces an earlier one
    Property,
    /// Every instance is kept in arrival order
    Collection,
    /// Scanning halts with the reader positioned at this chunk
    Stop
}

struct Registration {
    form: ChunkId,
    id:   ChunkId,
    kind: ChunkKind
}

/// Chunk registration and storage on top of a [`ChunkReader`]
pub struct PropertyStore<T: ZByteReaderTrait> {
    reader:        ChunkReader<T>,
    registrations: Vec<Registration>,
    properties:    Vec<(ChunkId, Vec<u8>)>,
    collections:   Vec<(ChunkId, Vec<u8>)>
}

impl<T: ZByteReaderTrait> PropertyStore<T> {
    pub fn new(source: T, strict: bool) -> PropertyStore<T> {
        PropertyStore {
            reader:        ChunkReader::new(source, strict),
            registrations: Vec::new(),
            properties:    Vec::new(),
            collections:   Vec::new()
        }
    }

    /// Read the outer `FORM` and return its variant tag
    pub fn open_container(&mut self) -> Result<ChunkId, IffDecodeErrors> {
        self.reader.open_container()
    }

    fn register(&mut self, form: ChunkId, id: ChunkId, kind: ChunkKind) {
        match self
            .registrations
            .iter_mut()
            .find(|r| r.form == form && r.id == id)
        {
            Some(registration) => registration.kind = kind,
            None => self.registrations.push(Registration { form, id, kind })
        }
    }

    /// Store chunks `id` inside `FORM form`, keeping only the last one
    pub fn register_property(&mut self, form: ChunkId, id: ChunkId) {
        self.register(form, id, ChunkKind::Property);
    }

    /// Store every chunk `id` inside `FORM form` in arrival order
    pub fn register_collection(&mut self, form: ChunkId, id: ChunkId) {
        self.register(form, id, ChunkKind::Collection);
    }

    /// Halt scanning when chunk `id` inside `FORM form` is reached
    pub fn register_stop(&mut self, form: ChunkId, id: ChunkId) {
        self.register(form, id, ChunkKind::Stop);
    }

    fn kind_of(&self, id: ChunkId) -> Option<ChunkKind> {
        let form = self.reader.form_type()?;

        self.registrations
            .iter()
            .find(|r| r.form == form && r.id == id)
            .map(|r| r.kind)
    }

    /// Scan forward until a stop chunk is reached
    ///
    /// Reaching the end of the container first is an error.
    pub fn scan(&mut self) -> Result<(), IffDecodeErrors> {
        match self.scan_next()? {
            Some(_) => Ok(()),
            None => {
                let form = self.reader.form_type().unwrap_or([0; 4]);
                let stop = self
                    .registrations
                    .iter()
                    .find(|r| r.form == form && r.kind == ChunkKind::Stop)
                    .map_or(form, |r| r.id);

                Err(IffDecodeErrors::StopChunkNotFound(stop))
            }
        }
    }

    /// Scan forward until a stop chunk or the end of the container
    ///
    /// When called while positioned at a stop chunk, scanning resumes
    /// after it. Returns `Ok(None)` at the end of the container.
    pub fn scan_next(&mut self) -> Result<Option<ChunkHeader>, IffDecodeErrors> {
        self.reader.open_container()?;

        while let Some(header) = self.reader.next_chunk()? {
            match self.kind_of(header.id) {
                Some(ChunkKind::Stop) => {
                    trace!(
                        "Stopping at {} chunk, {} bytes",
                        id_to_str(&header.id),
                        header.size
                    );
                    return Ok(Some(header));
                }
                Some(ChunkKind::Property) => {
                    trace!("Storing property {}", id_to_str(&header.id));
                    let body = self.reader.read_body()?;

                    match self.properties.iter_mut().find(|(id, _)| *id == header.id) {
                        Some(entry) => entry.1 = body,
                        None => self.properties.push((header.id, body))
                    }
                }
                Some(ChunkKind::Collection) => {
                    trace!("Collecting {}", id_to_str(&header.id));
                    let body = self.reader.read_body()?;
                    self.collections.push((header.id, body));
                }
                None => {
                    if matches!(header.id, ID_FORM | ID_LIST | ID_CAT | ID_PROP) {
                        trace!("Skipping nested {} group", id_to_str(&header.id));
                    } else {
                        trace!(
                            "Skipping chunk {}, {} bytes",
                            id_to_str(&header.id),
                            header.size
                        );
                    }
                }
            }
        }
        Ok(None)
    }

    /// The stored payload of property `id`
    pub fn find_property(&self, id: ChunkId) -> Option<&[u8]> {
        self.properties
            .iter()
            .find(|(chunk, _)| *chunk == id)
            .map(|(_, body)| body.as_slice())
    }

    /// Every stored payload of collection `id`, in arrival order
    pub fn find_collection(&self, id: ChunkId) -> Vec<&[u8]> {
        self.collections
            .iter()
            .filter(|(chunk, _)| *chunk == id)
            .map(|(_, body)| body.as_slice())
            .collect()
    }

    /// Remove and return the payload of property `id`
    pub fn take_property(&mut self, id: ChunkId) -> Option<Vec<u8>> {
        let position = self.properties.iter().position(|(chunk, _)| *chunk == id)?;

        Some(self.properties.remove(position).1)
    }

    /// Remove and return every payload of collection `id`, in arrival order
    pub fn take_collection(&mut self, id: ChunkId) -> Vec<Vec<u8>> {
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(self.collections.len());

        for (chunk, body) in self.collections.drain(..) {
            if chunk == id {
                taken.push(body);
            } else {
                kept.push((chunk, body));
            }
        }
        self.collections = kept;
        taken
    }

    /// The chunk scanning stopped at
    pub const fn current_chunk(&self) -> Option<ChunkHeader> {
        self.reader.current_chunk()
    }

    /// The variant tag of the container
    pub const fn form_type(&self) -> Option<ChunkId> {
        self.reader.form_type()
    }

    /// Copy bytes from the current stop chunk into `buf`
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, IffDecodeErrors> {
        self.reader.read_bytes(buf)
    }

    /// The unread part of the current stop chunk
    pub fn read_body(&mut self) -> Result<Vec<u8>, IffDecodeErrors> {
        self.reader.read_body()
    }
}
