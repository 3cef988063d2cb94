/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! ITU-T T.4 decoding for `FAXX` pages
mod bitstream;
mod decoder;
mod tables;

pub(crate) use decoder::decode_fax;
