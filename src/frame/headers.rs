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

use super::priority::PriorityBlock;
use super::{
    checked_length, padding_flags, read_padding, require_nonzero_stream_id, write_padding_prefix,
    write_zero_padding, Flag, FrameHeader, Kind, StreamIdentifier,
};

/// A HEADERS frame (kind 0x1): opens (or, with a trailing header block,
/// closes) a stream's header block. Carries the block's first fragment —
/// if `END_HEADERS` is unset, zero or more CONTINUATION frames follow with
/// the rest (§5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headers {
    stream_id: StreamIdentifier,
    flags: Flag,
    padding: usize,
    priority: Option<PriorityBlock>,
    fragment: Vec<u8>,
}

impl Headers {
    pub fn new(stream_id: StreamIdentifier, fragment: Vec<u8>) -> Headers {
        Headers {
            stream_id,
            flags: Flag::zero(),
            padding: 0,
            priority: None,
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

    pub fn priority(&self) -> Option<PriorityBlock> {
        self.priority
    }

    pub fn set_priority(&mut self, priority: PriorityBlock) {
        self.priority = Some(priority);
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

    pub fn is_end_stream(&self) -> bool {
        self.flags.is_end_stream()
    }

    pub fn set_end_stream(&mut self, val: bool) {
        if val {
            self.flags.set_end_stream();
        }
    }

    pub fn parse<B: Bt>(header: &FrameHeader, buf: &mut B) -> Result<Headers> {
        require_nonzero_stream_id(header.stream_id())?;
        if header.flag().has_both_priority_flags() {
            return Err(Http2Error::InvalidPriorityFlags);
        }

        let remaining = buf.remaining();
        let mandatory_len = PriorityBlock::mandatory_len(header.flag());
        let (padding, _) = read_padding(buf, header.flag(), remaining, mandatory_len)?;
        let priority = PriorityBlock::parse_optional(buf, header.flag())?;

        let fragment_len = buf.remaining() - padding;
        let mut fragment = vec![0u8; fragment_len];
        for byte in fragment.iter_mut() {
            *byte = buf.get_u8();
        }
        buf.advance(padding);

        Ok(Headers {
            stream_id: header.stream_id(),
            flags: header.flag(),
            padding,
            priority,
            fragment,
        })
    }

    pub fn encode<B: Bt + BtMut>(&self, dst: &mut B) -> Result<usize> {
        let mut flags = self.flags | padding_flags(self.padding);
        if let Some(priority) = &self.priority {
            priority.set_flag(&mut flags);
        }

        let prefix_len = if self.padding > 255 {
            2
        } else if self.padding > 0 {
            1
        } else {
            0
        };
        let priority_len = self.priority.map(|p| p.encoded_len()).unwrap_or(0);
        let payload_len = prefix_len + priority_len + self.fragment.len() + self.padding;

        let mut head = FrameHeader::new(Kind::Headers, flags, self.stream_id);
        head.set_length(checked_length(payload_len)?);

        let mut size = head.encode(dst);
        size += write_padding_prefix(dst, self.padding);
        if let Some(priority) = &self.priority {
            size += priority.encode(dst);
        }
        dst.put_slice(&self.fragment);
        size += self.fragment.len();
        size += write_zero_padding(dst, self.padding);
        log::trace!(
            "encoding HEADERS; stream_id={:?} end_headers={} len={}",
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
    use crate::frame::priority::{PriorityGroup, StreamDependency};
    use algorithm::buf::BinaryMut;

    #[test]
    fn round_trips_with_no_priority_no_padding() {
        let mut frame = Headers::new(StreamIdentifier(1), b"hpack-bytes".to_vec());
        frame.set_end_headers(true);
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        assert!(header.flag().is_end_headers());
        let parsed = Headers::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn round_trips_with_dependency_priority_and_padding() {
        let mut frame = Headers::new(StreamIdentifier(3), b"xyz".to_vec());
        frame.set_priority(PriorityBlock::Dependency(StreamDependency::new(
            StreamIdentifier(1),
            true,
        )));
        frame.set_padding(5);
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let parsed = Headers::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed.priority(), frame.priority());
        assert_eq!(parsed.padding(), 5);
        assert_eq!(parsed.fragment(), b"xyz");
    }

    #[test]
    fn round_trips_with_group_priority() {
        let mut frame = Headers::new(StreamIdentifier(3), b"xyz".to_vec());
        frame.set_priority(PriorityBlock::Group(PriorityGroup::new(StreamIdentifier(9), 16)));
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let parsed = Headers::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed.priority(), frame.priority());
    }

    #[test]
    fn padding_that_would_swallow_the_priority_block_is_rejected() {
        // payload = [pad_len=1, 4-octet dependency] with PAD_LOW and
        // PRIORITY_DEPENDENCY set; the mandatory 4-octet dependency field
        // leaves no room for the padding byte the prefix claims.
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(
            Kind::Headers,
            Flag::PAD_LOW | Flag::PRIORITY_DEPENDENCY,
            StreamIdentifier(1),
        );
        head.set_length(5);
        head.encode(&mut buf);
        buf.put_u8(1);
        buf.put_u32(2);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Headers::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, Http2Error::TooMuchPadding(1));
    }

    #[test]
    fn both_priority_flags_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(
            Kind::Headers,
            Flag::PRIORITY_GROUP | Flag::PRIORITY_DEPENDENCY,
            StreamIdentifier(1),
        );
        head.set_length(0);
        head.encode(&mut buf);
        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Headers::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, Http2Error::InvalidPriorityFlags);
    }
}
