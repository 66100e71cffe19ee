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

use super::{checked_length, require_zero_stream_id, Flag, FrameHeader, Kind, StreamIdentifier, MASK_U31};

/// A GOAWAY frame (kind 0x7): the sender will process no streams above
/// `last_stream_id` and is shutting the connection down, optionally with a
/// human-readable `debug_data` (§3, intended for diagnostics only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoAway {
    last_stream_id: StreamIdentifier,
    error_code: Reason,
    debug_data: Vec<u8>,
}

impl GoAway {
    pub fn new(last_stream_id: StreamIdentifier, reason: Reason) -> GoAway {
        GoAway {
            last_stream_id,
            error_code: reason,
            debug_data: Vec::new(),
        }
    }

    pub fn with_debug_data(last_stream_id: StreamIdentifier, reason: Reason, debug_data: Vec<u8>) -> GoAway {
        GoAway {
            last_stream_id,
            error_code: reason,
            debug_data,
        }
    }

    pub fn last_stream_id(&self) -> StreamIdentifier {
        self.last_stream_id
    }

    pub fn reason(&self) -> Reason {
        self.error_code
    }

    pub fn debug_data(&self) -> &[u8] {
        &self.debug_data
    }

    pub fn parse<B: Bt>(header: &FrameHeader, buf: &mut B) -> Result<GoAway> {
        require_zero_stream_id(header.stream_id())?;
        if buf.remaining() < 8 {
            return Err(Http2Error::InvalidPayloadLength);
        }
        let last_stream_id = StreamIdentifier(buf.get_u32() & MASK_U31);
        let error_code = buf.get_u32();
        let mut debug_data = vec![0u8; buf.remaining()];
        for byte in debug_data.iter_mut() {
            *byte = buf.get_u8();
        }
        Ok(GoAway {
            last_stream_id,
            error_code: error_code.into(),
            debug_data,
        })
    }

    pub fn encode<B: Bt + BtMut>(&self, dst: &mut B) -> Result<usize> {
        let payload_len = 8 + self.debug_data.len();
        let mut head = FrameHeader::new(Kind::GoAway, Flag::zero(), StreamIdentifier::zero());
        head.set_length(checked_length(payload_len)?);

        let mut size = head.encode(dst);
        dst.put_u32(self.last_stream_id.0 & MASK_U31);
        dst.put_u32(self.error_code.into());
        size += 8;
        dst.put_slice(&self.debug_data);
        size += self.debug_data.len();
        log::trace!(
            "encoding GOAWAY; last_stream_id={:?} reason={} len={}",
            self.last_stream_id,
            self.error_code,
            size
        );
        Ok(size)
    }
}
