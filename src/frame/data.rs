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

/// A DATA frame (kind 0x0): opaque stream payload, optionally padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    stream_id: StreamIdentifier,
    flags: Flag,
    padding: usize,
    data: Vec<u8>,
}

impl Data {
    pub fn new(stream_id: StreamIdentifier, data: Vec<u8>) -> Data {
        Data {
            stream_id,
            flags: Flag::zero(),
            padding: 0,
            data,
        }
    }

    pub fn stream_id(&self) -> StreamIdentifier {
        self.stream_id
    }

    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.data
    }

    pub fn is_end_stream(&self) -> bool {
        self.flags.is_end_stream()
    }

    pub fn set_end_stream(&mut self, val: bool) {
        if val {
            self.flags.set_end_stream();
        }
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn set_padding(&mut self, padding: usize) {
        self.padding = padding;
    }

    pub fn parse<B: Bt>(header: &FrameHeader, buf: &mut B) -> Result<Data> {
        require_nonzero_stream_id(header.stream_id())?;
        let remaining = buf.remaining();
        let (padding, consumed) = read_padding(buf, header.flag(), remaining, 0)?;
        let data_len = buf.remaining() - padding;
        let mut data = vec![0u8; data_len];
        for byte in data.iter_mut() {
            *byte = buf.get_u8();
        }
        buf.advance(padding);
        let _ = consumed;
        Ok(Data {
            stream_id: header.stream_id(),
            flags: header.flag(),
            padding,
            data,
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
        let payload_len = prefix_len + self.data.len() + self.padding;
        let mut head = FrameHeader::new(Kind::Data, flags, self.stream_id);
        head.set_length(checked_length(payload_len)?);

        let mut size = head.encode(dst);
        size += write_padding_prefix(dst, self.padding);
        dst.put_slice(&self.data);
        size += self.data.len();
        size += write_zero_padding(dst, self.padding);
        log::trace!("encoding DATA; stream_id={:?} len={}", self.stream_id, size);
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algorithm::buf::BinaryMut;

    #[test]
    fn round_trips_without_padding() {
        let frame = Data::new(StreamIdentifier(1), b"hello".to_vec());
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let parsed = Data::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed.payload(), b"hello");
        assert_eq!(parsed, frame);
    }

    #[test]
    fn round_trips_with_small_padding() {
        let mut frame = Data::new(StreamIdentifier(1), b"hi".to_vec());
        frame.set_padding(10);
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        assert!(header.flag().is_pad_low());
        assert!(!header.flag().is_pad_high());
        let parsed = Data::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed.payload(), b"hi");
        assert_eq!(parsed.padding(), 10);
    }

    #[test]
    fn round_trips_with_large_padding_sets_pad_high() {
        let mut frame = Data::new(StreamIdentifier(1), b"hi".to_vec());
        frame.set_padding(300);
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        assert!(header.flag().is_pad_low());
        assert!(header.flag().is_pad_high());
        let parsed = Data::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed.padding(), 300);
    }

    #[test]
    fn zero_stream_id_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::Data, Flag::zero(), StreamIdentifier::zero());
        head.set_length(0);
        head.encode(&mut buf);
        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Data::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, crate::error::Http2Error::InvalidStreamId);
    }
}
