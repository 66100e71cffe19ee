// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

use algorithm::buf::{Bt, BtMut};

use crate::Result;

use super::{
    checked_length, padding_flags, read_padding, require_nonzero_stream_id, write_padding_prefix,
    write_zero_padding, Flag, FrameHeader, Kind, StreamIdentifier,
};

/// A CONTINUATION frame (kind 0x9): carries the next fragment of a header
/// block opened by a HEADERS or PUSH_PROMISE frame whose `END_HEADERS` bit
/// was unset. No priority block, but padding is defined the same way as
/// DATA/HEADERS/PUSH_PROMISE (§3, §4.H).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    stream_id: StreamIdentifier,
    flags: Flag,
    padding: usize,
    fragment: Vec<u8>,
}

impl Continuation {
    pub fn new(stream_id: StreamIdentifier, fragment: Vec<u8>) -> Continuation {
        Continuation {
            stream_id,
            flags: Flag::zero(),
            padding: 0,
            fragment,
        }
    }

    pub fn stream_id(&self) -> StreamIdentifier {
        self.stream_id
    }

    pub fn fragment(&self) -> &[u8] {
        &self.fragment
    }

    pub fn into_fragment(self) -> Vec<u8> {
        self.fragment
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn set_padding(&mut self, padding: usize) {
        self.padding = padding;
    }

    pub fn is_end_headers(&self) -> bool {
        self.flags.is_end_headers()
    }

    pub fn set_end_headers(&mut self, val: bool) {
        if val {
            self.flags.set_end_headers();
        }
    }

    pub fn parse<B: Bt>(header: &FrameHeader, buf: &mut B) -> Result<Continuation> {
        require_nonzero_stream_id(header.stream_id())?;
        let remaining = buf.remaining();
        let (padding, _) = read_padding(buf, header.flag(), remaining, 0)?;

        let fragment_len = buf.remaining() - padding;
        let mut fragment = vec![0u8; fragment_len];
        for byte in fragment.iter_mut() {
            *byte = buf.get_u8();
        }
        buf.advance(padding);

        Ok(Continuation {
            stream_id: header.stream_id(),
            flags: header.flag(),
            padding,
            fragment,
        })
    }

    pub fn encode<B: Bt + BtMut>(&self, dst: &mut B) -> Result<usize> {
        let flags = self.flags | padding_flags(self.padding);
        let prefix_len = if self.padding > 255 {
            2
        } else if self.padding > 0 {
            1
        } else {
            0
        };
        let payload_len = prefix_len + self.fragment.len() + self.padding;

        let mut head = FrameHeader::new(Kind::Continuation, flags, self.stream_id);
        head.set_length(checked_length(payload_len)?);

        let mut size = head.encode(dst);
        size += write_padding_prefix(dst, self.padding);
        dst.put_slice(&self.fragment);
        size += self.fragment.len();
        size += write_zero_padding(dst, self.padding);
        log::trace!(
            "encoding CONTINUATION; stream_id={:?} end_headers={} len={}",
            self.stream_id,
            self.is_end_headers(),
            size
        );
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algorithm::buf::BinaryMut;

    #[test]
    fn round_trips() {
        let mut frame = Continuation::new(StreamIdentifier(1), b"rest-of-block".to_vec());
        frame.set_end_headers(true);
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        assert!(header.flag().is_end_headers());
        let parsed = Continuation::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn round_trips_with_padding() {
        let mut frame = Continuation::new(StreamIdentifier(1), b"rest".to_vec());
        frame.set_end_headers(true);
        frame.set_padding(8);
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        assert!(header.flag().is_pad_low());
        let parsed = Continuation::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn padding_that_would_swallow_all_remaining_bytes_is_rejected() {
        // payload = [pad_len=5] with only the one prefix octet present;
        // PAD_LOW claims 5 padding octets but nothing follows.
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::Continuation, Flag::PAD_LOW, StreamIdentifier(1));
        head.set_length(1);
        head.encode(&mut buf);
        buf.put_u8(5);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Continuation::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, crate::error::Http2Error::TooMuchPadding(5));
    }

    #[test]
    fn zero_stream_id_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::Continuation, Flag::zero(), StreamIdentifier::zero());
        head.set_length(0);
        head.encode(&mut buf);
        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Continuation::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, crate::error::Http2Error::InvalidStreamId);
    }
}
