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

use super::{Flag, FrameHeader, Kind, StreamIdentifier, MASK_U31};

/// A WINDOW_UPDATE frame (kind 0x8): a 31-bit flow-control increment, with
/// the reserved top bit masked on read and sent zero on write (§3, §4.H).
/// A zero increment is a protocol error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowUpdate {
    stream_id: StreamIdentifier,
    size_increment: u32,
}

impl WindowUpdate {
    pub fn new(stream_id: StreamIdentifier, size_increment: u32) -> WindowUpdate {
        WindowUpdate {
            stream_id,
            size_increment,
        }
    }

    pub fn stream_id(&self) -> StreamIdentifier {
        self.stream_id
    }

    pub fn size_increment(&self) -> u32 {
        self.size_increment
    }

    pub fn parse<B: Bt>(header: &FrameHeader, buf: &mut B) -> Result<WindowUpdate> {
        if buf.remaining() != 4 {
            return Err(Http2Error::InvalidPayloadLength);
        }
        let size_increment = buf.get_u32() & MASK_U31;
        if size_increment == 0 {
            return Err(Http2Error::InvalidWindowUpdateValue);
        }
        Ok(WindowUpdate {
            stream_id: header.stream_id(),
            size_increment,
        })
    }

    pub fn encode<B: Bt + BtMut>(&self, dst: &mut B) -> Result<usize> {
        let mut head = FrameHeader::new(Kind::WindowUpdate, Flag::zero(), self.stream_id);
        head.set_length(4);

        let mut size = head.encode(dst);
        dst.put_u32(self.size_increment & MASK_U31);
        size += 4;
        log::trace!(
            "encoding WINDOW_UPDATE; stream_id={:?} increment={}",
            self.stream_id,
            self.size_increment
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
        let frame = WindowUpdate::new(StreamIdentifier(1), 65535);
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let parsed = WindowUpdate::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn connection_level_round_trips() {
        let frame = WindowUpdate::new(StreamIdentifier::zero(), 100);
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let parsed = WindowUpdate::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed.stream_id(), StreamIdentifier::zero());
    }

    #[test]
    fn zero_increment_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::WindowUpdate, Flag::zero(), StreamIdentifier(1));
        head.set_length(4);
        head.encode(&mut buf);
        buf.put_u32(0);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = WindowUpdate::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, Http2Error::InvalidWindowUpdateValue);
    }

    #[test]
    fn wrong_payload_length_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::WindowUpdate, Flag::zero(), StreamIdentifier(1));
        head.set_length(3);
        head.encode(&mut buf);
        buf.put_u8(0);
        buf.put_u8(0);
        buf.put_u8(1);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = WindowUpdate::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, Http2Error::InvalidPayloadLength);
    }
}
