// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! draft-11 HTTP/2 wire codec: the frame layer (marshal/unmarshal of the
//! ten frame kinds and the byte-stream scanner that splits them out of a
//! socket's read buffer) plus an HPACK draft-07 header-compression engine
//! (integer/literal/Huffman codecs, static and dynamic tables, the
//! reference set, and an encoder/decoder context pair). Connection
//! management, TLS, and HTTP semantics are the caller's concern.

#[macro_use]
extern crate bitflags;

pub mod config;
pub mod error;
pub mod frame;
pub mod header;
pub mod hpack;
pub mod scanner;

pub use error::{Http2Error, Reason, Result};
pub use header::{HeaderField, HeaderList, HeaderName, HeaderValue};
pub use hpack::{Decoder, Encoder};
pub use scanner::{Scanned, Scanner};
