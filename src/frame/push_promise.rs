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

/// A PUSH_PROMISE frame (kind 0x5): reserves `promised_id` for a
/// server-initiated stream and carries the first fragment of its request
/// header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPromise {
    stream_id: StreamIdentifier,
    promised_id: StreamIdentifier,
    flags: Flag,
    padding: usize,
    fragment: Vec<u8>,
}

impl PushPromise {
    pub fn new(
        stream_id: StreamIdentifier,
        promised_id: StreamIdentifier,
        fragment: Vec<u8>,
    ) -> PushPromise {
        PushPromise {
            stream_id,
            promised_id,
            flags: Flag::zero(),
            padding: 0,
            fragment,
        }
    }

    pub fn stream_id(&self) -> StreamIdentifier {
        self.stream_id
    }

    pub fn promised_id(&self) -> StreamIdentifier {
        self.promised_id
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

    pub fn parse<B: Bt>(header: &FrameHeader, buf: &mut B) -> Result<PushPromise> {
        require_nonzero_stream_id(header.stream_id())?;
        let remaining = buf.remaining();
        let (padding, _) = read_padding(buf, header.flag(), remaining, 4)?;
        let promised_id = StreamIdentifier::parse(buf);

        let fragment_len = buf.remaining() - padding;
        let mut fragment = vec![0u8; fragment_len];
        for byte in fragment.iter_mut() {
            *byte = buf.get_u8();
        }
        buf.advance(padding);

        Ok(PushPromise {
            stream_id: header.stream_id(),
            promised_id,
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
        let payload_len = prefix_len + 4 + self.fragment.len() + self.padding;

        let mut head = FrameHeader::new(Kind::PushPromise, flags, self.stream_id);
        head.set_length(checked_length(payload_len)?);

        let mut size = head.encode(dst);
        size += write_padding_prefix(dst, self.padding);
        size += self.promised_id.encode(dst);
        dst.put_slice(&self.fragment);
        size += self.fragment.len();
        size += write_zero_padding(dst, self.padding);
        log::trace!(
            "encoding PUSH_PROMISE; stream_id={:?} promised_id={:?} len={}",
            self.stream_id,
            self.promised_id,
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
    fn round_trips_without_padding() {
        let mut frame = PushPromise::new(StreamIdentifier(1), StreamIdentifier(2), b"frag".to_vec());
        frame.set_end_headers(true);
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let parsed = PushPromise::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn round_trips_with_padding() {
        let mut frame = PushPromise::new(StreamIdentifier(1), StreamIdentifier(2), b"frag".to_vec());
        frame.set_padding(12);
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let parsed = PushPromise::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed.promised_id(), StreamIdentifier(2));
        assert_eq!(parsed.padding(), 12);
    }

    #[test]
    fn padding_that_would_swallow_the_promised_id_is_rejected() {
        // payload = [pad_len=1, 4 octets of promised_id]; PAD_LOW set. The
        // one-octet pad_len alone leaves exactly 4 octets, all of which
        // the mandatory promised_id field needs, so there is no room left
        // for even a single byte of padding or fragment.
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::PushPromise, Flag::PAD_LOW, StreamIdentifier(1));
        head.set_length(5);
        head.encode(&mut buf);
        buf.put_u8(1);
        buf.put_u32(2);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = PushPromise::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, crate::error::Http2Error::TooMuchPadding(1));
    }

    #[test]
    fn zero_stream_id_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::PushPromise, Flag::zero(), StreamIdentifier::zero());
        head.set_length(4);
        head.encode(&mut buf);
        StreamIdentifier(2).encode(&mut buf);
        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = PushPromise::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, crate::error::Http2Error::InvalidStreamId);
    }
}
