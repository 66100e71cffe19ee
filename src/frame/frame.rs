// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! The closed, tagged `Frame` union (§3) and the marshal/unmarshal pair
//! that turns it into/from the 8-octet-header wire format (§4.H, §6). The
//! codec itself holds no state across calls — everything it needs comes in
//! through the arguments.

use algorithm::buf::{Bt, BtMut};

use crate::error::Http2Error;
use crate::Result;

use super::{
    continuation::Continuation, data::Data, encode_length, go_away::GoAway, headers::Headers,
    ping::Ping, priority::Priority, push_promise::PushPromise, read_length, reset::Reset,
    settings::Settings, window_update::WindowUpdate, Flag, Kind, StreamIdentifier,
};

pub const FRAME_HEADER_LEN: usize = 8;

/// The 8-octet common header every frame starts with (§6).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameHeader {
    length: u16,
    kind_byte: u8,
    flag: Flag,
    id: StreamIdentifier,
}

impl FrameHeader {
    pub fn new(kind: Kind, flag: Flag, id: StreamIdentifier) -> FrameHeader {
        FrameHeader {
            length: 0,
            kind_byte: kind.encode(),
            flag,
            id,
        }
    }

    pub fn length(&self) -> u16 {
        self.length
    }

    pub fn set_length(&mut self, length: u16) {
        self.length = length;
    }

    /// `None` for a type outside `0..=9` — §4.H step 5 has the caller skip
    /// these rather than reject them.
    pub fn kind(&self) -> Option<Kind> {
        Kind::try_from(self.kind_byte).ok()
    }

    pub fn kind_byte(&self) -> u8 {
        self.kind_byte
    }

    pub fn flag(&self) -> Flag {
        self.flag
    }

    pub fn stream_id(&self) -> StreamIdentifier {
        self.id
    }

    /// Parses the 8-octet header, or `Ok(None)` if fewer than
    /// `FRAME_HEADER_LEN` octets are available (the scanner's
    /// "need more" sentinel — not an error).
    pub fn parse<B: Bt>(buf: &mut B) -> Result<Option<FrameHeader>> {
        if buf.remaining() < FRAME_HEADER_LEN {
            return Ok(None);
        }
        let length = read_length(buf);
        let kind_byte = buf.get_u8();
        let flag = Flag::new(buf.get_u8());
        let id = StreamIdentifier::parse(buf);
        Ok(Some(FrameHeader {
            length,
            kind_byte,
            flag,
            id,
        }))
    }

    pub fn encode<B: BtMut>(&self, dst: &mut B) -> usize {
        let mut size = encode_length(dst, self.length);
        dst.put_u8(self.kind_byte);
        dst.put_u8(self.flag.bits());
        size += 2;
        size += self.id.encode(dst);
        size
    }
}

/// One of the ten frame kinds this codec understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Data(Data),
    Headers(Headers),
    Priority(Priority),
    RstStream(Reset),
    Settings(Settings),
    PushPromise(PushPromise),
    Ping(Ping),
    GoAway(GoAway),
    WindowUpdate(WindowUpdate),
    Continuation(Continuation),
}

impl Frame {
    pub fn stream_id(&self) -> StreamIdentifier {
        match self {
            Frame::Data(f) => f.stream_id(),
            Frame::Headers(f) => f.stream_id(),
            Frame::Priority(f) => f.stream_id(),
            Frame::RstStream(f) => f.stream_id(),
            Frame::Settings(_) => StreamIdentifier::zero(),
            Frame::PushPromise(f) => f.stream_id(),
            Frame::Ping(_) => StreamIdentifier::zero(),
            Frame::GoAway(_) => StreamIdentifier::zero(),
            Frame::WindowUpdate(f) => f.stream_id(),
            Frame::Continuation(f) => f.stream_id(),
        }
    }

    pub fn is_end_headers(&self) -> bool {
        match self {
            Frame::Headers(f) => f.is_end_headers(),
            Frame::PushPromise(f) => f.is_end_headers(),
            Frame::Continuation(f) => f.is_end_headers(),
            _ => false,
        }
    }

    /// True for the frame kinds that open or continue a header block
    /// (§5's CONTINUATION-sequence rule).
    pub fn is_header_block_fragment(&self) -> bool {
        matches!(
            self,
            Frame::Headers(_) | Frame::PushPromise(_) | Frame::Continuation(_)
        )
    }

    pub fn encode<B: Bt + BtMut>(&self, dst: &mut B) -> Result<usize> {
        match self {
            Frame::Data(f) => f.encode(dst),
            Frame::Headers(f) => f.encode(dst),
            Frame::Priority(f) => f.encode(dst),
            Frame::RstStream(f) => f.encode(dst),
            Frame::Settings(f) => f.encode(dst),
            Frame::PushPromise(f) => f.encode(dst),
            Frame::Ping(f) => f.encode(dst),
            Frame::GoAway(f) => f.encode(dst),
            Frame::WindowUpdate(f) => f.encode(dst),
            Frame::Continuation(f) => f.encode(dst),
        }
    }
}

/// The result of attempting to unmarshal one frame from the front of a
/// buffer.
#[derive(Debug)]
pub enum Decoded {
    /// Fewer than a full frame's octets are available; nothing consumed.
    Incomplete,
    /// A structurally valid frame of an unrecognized type (outside
    /// `0..=9`) was present and has been consumed, but produced no value
    /// (§4.H step 5, §9 open question: skip rather than reject).
    Skipped { advance: usize },
    /// A frame was parsed; `advance` is how many octets of the input it
    /// occupied (header + payload).
    Parsed { advance: usize, frame: Frame },
}

/// Attempts to unmarshal one frame from the front of `buf`. Does not
/// consume anything itself — the caller (typically the frame scanner)
/// advances its own buffer by `Decoded::Parsed::advance` /
/// `Decoded::Skipped::advance` on success.
pub fn unmarshal(buf: &[u8]) -> Result<Decoded> {
    let mut cursor = buf;
    let header = match FrameHeader::parse(&mut cursor)? {
        Some(header) => header,
        None => return Ok(Decoded::Incomplete),
    };
    let payload_len = header.length() as usize;
    if buf.len() < FRAME_HEADER_LEN + payload_len {
        return Ok(Decoded::Incomplete);
    }
    let advance = FRAME_HEADER_LEN + payload_len;
    let mut payload = &buf[FRAME_HEADER_LEN..advance];

    let kind = match header.kind() {
        Some(kind) => kind,
        None => return Ok(Decoded::Skipped { advance }),
    };

    let frame = match kind {
        Kind::Data => Frame::Data(Data::parse(&header, &mut payload)?),
        Kind::Headers => Frame::Headers(Headers::parse(&header, &mut payload)?),
        Kind::Priority => Frame::Priority(Priority::parse(&header, &mut payload)?),
        Kind::RstStream => Frame::RstStream(Reset::parse(&header, &mut payload)?),
        Kind::Settings => Frame::Settings(Settings::parse(&header, &mut payload)?),
        Kind::PushPromise => Frame::PushPromise(PushPromise::parse(&header, &mut payload)?),
        Kind::Ping => Frame::Ping(Ping::parse(&header, &mut payload)?),
        Kind::GoAway => Frame::GoAway(GoAway::parse(&header, &mut payload)?),
        Kind::WindowUpdate => Frame::WindowUpdate(WindowUpdate::parse(&header, &mut payload)?),
        Kind::Continuation => Frame::Continuation(Continuation::parse(&header, &mut payload)?),
    };

    log::trace!("http2 frame decoded: {:?} ({} octets)", kind, advance);
    Ok(Decoded::Parsed { advance, frame })
}

pub(crate) fn require_nonzero_stream_id(id: StreamIdentifier) -> Result<()> {
    if id.is_zero() {
        Err(Http2Error::InvalidStreamId)
    } else {
        Ok(())
    }
}

pub(crate) fn require_zero_stream_id(id: StreamIdentifier) -> Result<()> {
    if id.is_zero() {
        Ok(())
    } else {
        Err(Http2Error::InvalidStreamId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algorithm::buf::BinaryMut;

    #[test]
    fn incomplete_header_does_not_error() {
        let decoded = unmarshal(&[0, 8, 6]).unwrap();
        assert!(matches!(decoded, Decoded::Incomplete));
    }

    #[test]
    fn incomplete_payload_does_not_error() {
        // claims an 8-octet PING payload but only carries 3.
        let bytes = [0x00, 0x08, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 1, 2, 3];
        let decoded = unmarshal(&bytes).unwrap();
        assert!(matches!(decoded, Decoded::Incomplete));
    }

    #[test]
    fn unknown_type_is_skipped_not_rejected() {
        let mut buf = BinaryMut::new();
        let mut header = FrameHeader::new(Kind::Data, Flag::zero(), StreamIdentifier(1));
        header.kind_byte = 0x7F;
        header.set_length(0);
        header.encode(&mut buf);
        let decoded = unmarshal(buf.chunk()).unwrap();
        match decoded {
            Decoded::Skipped { advance } => assert_eq!(advance, FRAME_HEADER_LEN),
            other => panic!("expected Skipped, got {:?}", other),
        }
    }
}
