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

use crate::error::{Http2Error, Reason};
use crate::Result;

use super::{require_nonzero_stream_id, Flag, FrameHeader, Kind, StreamIdentifier};

/// A RST_STREAM frame (kind 0x3): immediately terminates a stream, carrying
/// the reason as a 4-octet code (§3, §7).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reset {
    stream_id: StreamIdentifier,
    error_code: Reason,
}

impl Reset {
    pub fn new(stream_id: StreamIdentifier, reason: Reason) -> Reset {
        Reset {
            stream_id,
            error_code: reason,
        }
    }

    pub fn stream_id(&self) -> StreamIdentifier {
        self.stream_id
    }

    pub fn reason(&self) -> Reason {
        self.error_code
    }

    pub fn parse<B: Bt>(header: &FrameHeader, buf: &mut B) -> Result<Reset> {
        require_nonzero_stream_id(header.stream_id())?;
        if buf.remaining() != 4 {
            return Err(Http2Error::InvalidPayloadLength);
        }
        let error_code = buf.get_u32();
        Ok(Reset {
            stream_id: header.stream_id(),
            error_code: error_code.into(),
        })
    }

    pub fn encode<B: Bt + BtMut>(&self, dst: &mut B) -> Result<usize> {
        let mut head = FrameHeader::new(Kind::RstStream, Flag::zero(), self.stream_id);
        head.set_length(4);

        let mut size = head.encode(dst);
        dst.put_u32(self.error_code.into());
        size += 4;
        log::trace!("encoding RST_STREAM; stream_id={:?} reason={}", self.stream_id, self.error_code);
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algorithm::buf::BinaryMut;

    #[test]
    fn round_trips() {
        let frame = Reset::new(StreamIdentifier(1), Reason::Cancel);
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let parsed = Reset::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn wrong_payload_length_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::RstStream, Flag::zero(), StreamIdentifier(1));
        head.set_length(3);
        head.encode(&mut buf);
        buf.put_u8(0);
        buf.put_u8(0);
        buf.put_u8(0);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Reset::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, Http2Error::InvalidPayloadLength);
    }

    #[test]
    fn zero_stream_id_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::RstStream, Flag::zero(), StreamIdentifier::zero());
        head.set_length(4);
        head.encode(&mut buf);
        buf.put_u32(0);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Reset::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, Http2Error::InvalidStreamId);
    }
}
