// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! HPACK draft-07 header compression: integer/literal/Huffman codecs, the
//! static and dynamic header tables, the reference set, and the encoder/
//! decoder context built on top of them.

mod decoder;
mod dynamic_table;
mod encoder;
mod huffman;
mod integer;
mod literal;
mod reference_set;
mod static_table;

pub use decoder::Decoder;
pub use encoder::{Encoder, DEFAULT_DYNAMIC_TABLE_SIZE};
pub use huffman::HuffmanDecoderError;
pub use integer::{decode_integer, encode_integer, IntegerDecodingError};
pub use literal::{decode_string, encode_string, StringDecodingError};

pub use dynamic_table::DynamicTable;
pub use reference_set::ReferenceSet;
pub use static_table::STATIC_TABLE_LEN;
