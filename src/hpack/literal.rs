// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! The HPACK literal string representation: a 7-bit-prefixed length whose
//! high bit flags Huffman encoding, followed by that many octets of either
//! raw or Huffman-packed data.

use algorithm::buf::{BinaryMut, Bt, BtMut};

use super::huffman;
use super::huffman::HuffmanDecoderError;
use super::integer::{decode_integer, IntegerDecodingError};

#[derive(PartialEq, Copy, Clone, Debug)]
pub enum StringDecodingError {
    NotEnoughOctets,
    HuffmanDecoderError(HuffmanDecoderError),
}

impl From<HuffmanDecoderError> for StringDecodingError {
    fn from(e: HuffmanDecoderError) -> Self {
        StringDecodingError::HuffmanDecoderError(e)
    }
}

impl From<IntegerDecodingError> for StringDecodingError {
    fn from(_: IntegerDecodingError) -> Self {
        StringDecodingError::NotEnoughOctets
    }
}

/// Encodes `value` as a literal, using Huffman packing whenever it is not
/// larger than the raw representation.
pub fn encode_string<B: BtMut>(value: &[u8], dst: &mut B) -> usize {
    let huffman_len = huffman::encoded_len(value);
    let (payload, huffman_coded): (Vec<u8>, bool) = if huffman_len < value.len() {
        (huffman::encode(value), true)
    } else {
        (value.to_vec(), false)
    };

    // The H bit lives in bit 7 of the length prefix's first octet; build the
    // prefix in a scratch buffer so it can be OR'd in before copying out.
    let mut prefix = BinaryMut::new();
    super::integer::encode_integer(payload.len(), 7, &mut prefix);
    let mut prefix_bytes = prefix.chunk().to_vec();
    if huffman_coded {
        prefix_bytes[0] |= 0x80;
    }

    dst.put_slice(&prefix_bytes);
    dst.put_slice(&payload);
    prefix_bytes.len() + payload.len()
}

/// Decodes a literal string out of `buf`, returning the decoded bytes and
/// the number of octets of `buf` consumed (length prefix + payload).
pub fn decode_string(buf: &[u8]) -> Result<(Vec<u8>, usize), StringDecodingError> {
    if buf.is_empty() {
        return Err(StringDecodingError::NotEnoughOctets);
    }
    let (len, consumed) = decode_integer(buf, 7)?;
    if consumed + len > buf.len() {
        return Err(StringDecodingError::NotEnoughOctets);
    }
    let raw = &buf[consumed..consumed + len];
    if buf[0] & 0x80 == 0x80 {
        let mut decoder = huffman::HuffmanDecoder::new();
        let decoded = decoder.decode(raw)?;
        Ok((decoded, consumed + len))
    } else {
        Ok((raw.to_vec(), consumed + len))
    }
}

/// Decodes a literal string directly off a `Bt` cursor, advancing past it.
pub fn decode_string_from<B: Bt>(src: &mut B) -> Result<Vec<u8>, StringDecodingError> {
    let (decoded, consumed) = decode_string(src.chunk())?;
    src.advance(consumed);
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use algorithm::buf::BinaryMut;

    #[test]
    fn huffman_round_trip_for_common_header_value() {
        let value = b"www.example.com";
        let mut buf = BinaryMut::new();
        encode_string(value, &mut buf);
        // Huffman-packed is shorter for this value, so the H bit must be set.
        assert_eq!(buf.chunk()[0] & 0x80, 0x80);
        let (decoded, consumed) = decode_string(buf.chunk()).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(consumed, buf.remaining());
    }

    #[test]
    fn huffman_literal_matches_known_wire_bytes() {
        let mut buf = BinaryMut::new();
        encode_string(b"www.example.com", &mut buf);
        assert_eq!(
            buf.chunk(),
            &[0x8C, 0xE7, 0xCF, 0x9B, 0xEB, 0xE8, 0x9B, 0x6F, 0xB1, 0x6F, 0xA9, 0xB6, 0xFF]
        );
    }

    #[test]
    fn raw_round_trip_for_incompressible_value() {
        // A value whose Huffman packing wouldn't save space should be sent
        // raw, H bit clear.
        let value: Vec<u8> = (0u8..=255).collect();
        let mut buf = BinaryMut::new();
        encode_string(&value, &mut buf);
        let (decoded, _) = decode_string(buf.chunk()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn truncated_literal_is_an_error() {
        let err = decode_string(&[0x05, b'a', b'b']).unwrap_err();
        assert_eq!(err, StringDecodingError::NotEnoughOctets);
    }
}
