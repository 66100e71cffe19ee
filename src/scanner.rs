// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! The stateful byte-stream splitter (§4.I) that sits between a socket and
//! the frame codec: feed it whatever slice sizes a `read()` happens to
//! return, and pull out complete frames one at a time.

use crate::error::Http2Error;
use crate::frame::{Decoded, Frame, StreamIdentifier};
use crate::Result;

/// What one call to [`Scanner::next`] produced.
#[derive(Debug)]
pub enum Scanned {
    /// Fewer than a full frame's octets are buffered yet; nothing was
    /// consumed. Not an error — call `feed` again and retry.
    Incomplete,
    /// A complete frame was parsed and removed from the internal buffer.
    Frame(Frame),
}

/// Splits an arbitrarily-chunked byte stream into `Frame` values.
///
/// Unknown frame types (§4.H step 5) are consumed and skipped internally —
/// callers only ever see real frames, `Incomplete`, or an `Err`. It also
/// owns the "expecting CONTINUATION for stream S" flag §5 assigns to the
/// surrounding connection: a HEADERS/PUSH_PROMISE without `END_HEADERS`
/// opens a header block, and every frame before the matching `END_HEADERS`
/// CONTINUATION must itself be a CONTINUATION on that same stream.
#[derive(Debug, Default)]
pub struct Scanner {
    buf: Vec<u8>,
    awaiting_continuation: Option<StreamIdentifier>,
}

impl Scanner {
    pub fn new() -> Scanner {
        Scanner {
            buf: Vec::new(),
            awaiting_continuation: None,
        }
    }

    /// Appends `bytes` to the internal buffer. Never blocks, never parses.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// How many unconsumed octets are currently buffered.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Attempts to unmarshal one frame from the front of the buffer. Loops
    /// past any number of consecutive `Skipped` (unrecognized-type) frames
    /// so a caller never has to special-case them.
    pub fn next(&mut self) -> Result<Scanned> {
        loop {
            match crate::frame::unmarshal(&self.buf)? {
                Decoded::Incomplete => return Ok(Scanned::Incomplete),
                Decoded::Skipped { advance } => {
                    self.buf.drain(..advance);
                    continue;
                }
                Decoded::Parsed { advance, frame } => {
                    self.buf.drain(..advance);
                    self.track_continuation(&frame)?;
                    return Ok(Scanned::Frame(frame));
                }
            }
        }
    }

    fn track_continuation(&mut self, frame: &Frame) -> Result<()> {
        match self.awaiting_continuation {
            Some(stream_id) => {
                if !matches!(frame, Frame::Continuation(_)) || frame.stream_id() != stream_id {
                    return Err(Http2Error::HeadersNotContinued);
                }
                if frame.is_end_headers() {
                    self.awaiting_continuation = None;
                }
            }
            None => {
                if matches!(frame, Frame::Continuation(_)) {
                    return Err(Http2Error::HeadersNotContinued);
                }
                if frame.is_header_block_fragment() && !frame.is_end_headers() {
                    self.awaiting_continuation = Some(frame.stream_id());
                }
            }
        }
        Ok(())
    }
}
