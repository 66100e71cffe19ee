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

use crate::error::Http2Error;
use crate::Result;

use super::{require_zero_stream_id, Flag, FrameHeader, Kind, StreamIdentifier};

/// A PING frame (kind 0x6): an 8-octet opaque payload, echoed back with the
/// `ACK` flag set (it shares bit 0x01 with `END_STREAM`, meaningless here).
/// Always connection-level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Ping {
    flags: Flag,
    payload: [u8; 8],
}

impl Ping {
    pub fn new(payload: [u8; 8]) -> Ping {
        Ping {
            flags: Flag::zero(),
            payload,
        }
    }

    pub fn pong(payload: [u8; 8]) -> Ping {
        Ping {
            flags: Flag::ack(),
            payload,
        }
    }

    pub fn payload(&self) -> [u8; 8] {
        self.payload
    }

    pub fn is_ack(&self) -> bool {
        self.flags.is_ack()
    }

    pub fn parse<B: Bt>(header: &FrameHeader, buf: &mut B) -> Result<Ping> {
        require_zero_stream_id(header.stream_id())?;
        if buf.remaining() != 8 {
            return Err(Http2Error::InvalidPayloadLength);
        }
        let mut payload = [0u8; 8];
        for byte in payload.iter_mut() {
            *byte = buf.get_u8();
        }
        Ok(Ping {
            flags: header.flag(),
            payload,
        })
    }

    pub fn encode<B: Bt + BtMut>(&self, dst: &mut B) -> Result<usize> {
        let mut head = FrameHeader::new(Kind::Ping, self.flags, StreamIdentifier::zero());
        head.set_length(8);

        let mut size = head.encode(dst);
        dst.put_slice(&self.payload);
        size += 8;
        log::trace!("encoding PING; ack={} len={}", self.is_ack(), size);
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algorithm::buf::BinaryMut;

    #[test]
    fn ack_round_trips_exact_bytes() {
        let frame = Ping::pong([0, 0, 0, 0, 3, 0x0C, 0xE8, 0xF0]);
        let mut buf = BinaryMut::new();
        let size = frame.encode(&mut buf).unwrap();
        assert_eq!(size, 16);

        let chunk = buf.chunk();
        assert_eq!(&chunk[0..3], &[0x00, 0x08, 0x06]);
        assert_eq!(chunk[3], 0x01);
        assert_eq!(&chunk[4..8], &[0, 0, 0, 0]);
        assert_eq!(&chunk[8..16], &[0, 0, 0, 0, 3, 0x0C, 0xE8, 0xF0]);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let parsed = Ping::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed, frame);
        assert!(parsed.is_ack());
    }

    #[test]
    fn wrong_payload_length_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::Ping, Flag::zero(), StreamIdentifier::zero());
        head.set_length(3);
        head.encode(&mut buf);
        buf.put_u8(0);
        buf.put_u8(0);
        buf.put_u8(0);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Ping::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, Http2Error::InvalidPayloadLength);
    }

    #[test]
    fn nonzero_stream_id_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::Ping, Flag::zero(), StreamIdentifier(1));
        head.set_length(8);
        head.encode(&mut buf);
        buf.put_slice(&[0u8; 8]);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Ping::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, Http2Error::InvalidStreamId);
    }
}
