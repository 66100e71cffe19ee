// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! The draft-11 frame layer: the 8-octet common header (§6), the ten frame
//! kinds it introduces, and the marshal/unmarshal pair that turns one into
//! the other bit-exactly (§4.H).

mod continuation;
mod data;
mod flag;
mod frame;
mod go_away;
mod headers;
mod ping;
mod priority;
mod push_promise;
mod reset;
mod settings;
mod window_update;

pub use continuation::Continuation;
pub use data::Data;
pub use flag::Flag;
pub use frame::{unmarshal, Decoded, Frame, FrameHeader, FRAME_HEADER_LEN};
pub(crate) use frame::{require_nonzero_stream_id, require_zero_stream_id};
pub use go_away::GoAway;
pub use headers::Headers;
pub use ping::Ping;
pub use priority::{Priority, PriorityBlock, PriorityGroup, StreamDependency};
pub use push_promise::PushPromise;
pub use reset::Reset;
pub use settings::{Setting, Settings};
pub use window_update::WindowUpdate;

use std::cmp::Ordering;
use std::convert::TryFrom;

use algorithm::buf::{Bt, BtMut};

use crate::config::MAX_FRAME_PAYLOAD_LEN;
use crate::error::Http2Error;
use crate::Result;

/// The top two bits of a draft-11 length field, and the top bit of a
/// stream id, are reserved and MUST be ignored on receipt, MUST be sent as
/// zero (§6, §9 design note).
pub const MASK_U31: u32 = (1u32 << 31) - 1;
const MASK_LENGTH_14: u16 = (1u16 << 14) - 1;

/// One of the ten frame kinds this codec understands. Anything outside
/// `0..=9` is not represented here at all — §4.H step 5 has the codec
/// silently skip unrecognized types rather than reject them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    Data = 0x0,
    Headers = 0x1,
    Priority = 0x2,
    RstStream = 0x3,
    Settings = 0x4,
    PushPromise = 0x5,
    Ping = 0x6,
    GoAway = 0x7,
    WindowUpdate = 0x8,
    Continuation = 0x9,
}

impl Kind {
    pub fn encode(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Kind {
    type Error = ();

    fn try_from(byte: u8) -> std::result::Result<Kind, ()> {
        match byte {
            0x0 => Ok(Kind::Data),
            0x1 => Ok(Kind::Headers),
            0x2 => Ok(Kind::Priority),
            0x3 => Ok(Kind::RstStream),
            0x4 => Ok(Kind::Settings),
            0x5 => Ok(Kind::PushPromise),
            0x6 => Ok(Kind::Ping),
            0x7 => Ok(Kind::GoAway),
            0x8 => Ok(Kind::WindowUpdate),
            0x9 => Ok(Kind::Continuation),
            _ => Err(()),
        }
    }
}

/// A frame's 31-bit stream identifier (the top bit is reserved, masked on
/// read, sent as zero on write).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StreamIdentifier(pub u32);

impl StreamIdentifier {
    pub fn zero() -> StreamIdentifier {
        StreamIdentifier(0)
    }

    pub fn client_first() -> StreamIdentifier {
        StreamIdentifier(1)
    }

    pub fn server_first() -> StreamIdentifier {
        StreamIdentifier(2)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The next stream id a client/server would use on this identifier's
    /// parity (ids increase by 2 to stay same-parity).
    pub fn next_id(&self) -> StreamIdentifier {
        StreamIdentifier(self.0 + 2)
    }

    pub fn parse<B: Bt>(buf: &mut B) -> StreamIdentifier {
        StreamIdentifier(buf.get_u32() & MASK_U31)
    }

    pub fn encode<B: BtMut>(&self, dst: &mut B) -> usize {
        dst.put_u32(self.0 & MASK_U31);
        4
    }
}

impl From<u32> for StreamIdentifier {
    fn from(value: u32) -> Self {
        StreamIdentifier(value & MASK_U31)
    }
}

impl Ord for StreamIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for StreamIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reads a big-endian 14-bit length out of the first two octets of `buf`,
/// masking the two reserved bits (§6).
pub(crate) fn read_length<B: Bt>(buf: &mut B) -> u16 {
    let hi = buf.get_u8();
    let lo = buf.get_u8();
    (((hi as u16) << 8) | lo as u16) & MASK_LENGTH_14
}

pub(crate) fn encode_length<B: BtMut>(dst: &mut B, length: u16) -> usize {
    let length = length & MASK_LENGTH_14;
    dst.put_u8((length >> 8) as u8);
    dst.put_u8((length & 0xFF) as u8);
    2
}

/// Checked cast from a computed payload size down to the wire's 14-bit
/// length field. A frame whose payload would not fit is a caller error
/// (spec §4.H: "implementation should flag"), surfaced as `BadFrameSize`.
pub(crate) fn checked_length(len: usize) -> Result<u16> {
    if len > MAX_FRAME_PAYLOAD_LEN {
        return Err(Http2Error::BadFrameSize);
    }
    Ok(len as u16)
}

/// Reads a one- or two-octet padding length, per whether `PAD_HIGH` is set
/// (§4.H). Returns `PaddingFlagMismatch` if `PAD_HIGH` is set without
/// `PAD_LOW`, and `TooMuchPadding` if the decoded length leaves no room for
/// both the padding itself and `mandatory_len` more octets — the fixed-size
/// field every caller still has to read after the padding prefix but before
/// the fragment (HEADERS' optional priority block, PUSH_PROMISE's
/// `promised_id`; 0 for DATA and CONTINUATION, which have neither).
/// Without this, a `pad_len` that only overruns the fragment region once
/// the mandatory field is accounted for would pass here and then underflow
/// `fragment_len = buf.remaining() - padding` at the call site.
pub(crate) fn read_padding<B: Bt>(
    buf: &mut B,
    flags: Flag,
    remaining_payload: usize,
    mandatory_len: usize,
) -> Result<(usize, usize)> {
    if flags.is_pad_high() && !flags.is_pad_low() {
        return Err(Http2Error::PaddingFlagMismatch);
    }
    if !flags.is_padded() {
        return Ok((0, 0));
    }
    let (pad_len, consumed): (usize, usize) = if flags.is_pad_high() {
        if remaining_payload < 2 {
            return Err(Http2Error::InvalidPayloadLength);
        }
        let hi = buf.get_u8();
        let lo = buf.get_u8();
        (((hi as usize) << 8) | lo as usize, 2)
    } else {
        if remaining_payload < 1 {
            return Err(Http2Error::InvalidPayloadLength);
        }
        (buf.get_u8() as usize, 1)
    };
    let available = remaining_payload - consumed;
    if mandatory_len > available || pad_len > available - mandatory_len {
        return Err(Http2Error::TooMuchPadding(pad_len.min(255) as u8));
    }
    Ok((pad_len, consumed))
}

/// The `PAD_LOW`/`PAD_HIGH` bits `pad_len` requires (§4.H: `PAD_HIGH` once
/// the length needs more than one octet). A single octet only holds
/// 0..=255, so anything above that needs the second octet regardless of
/// the spec prose's literal "> 256" wording (see DESIGN.md).
pub(crate) fn padding_flags(pad_len: usize) -> Flag {
    let mut flags = Flag::zero();
    if pad_len > 0 {
        flags.set_pad_low();
        if pad_len > 255 {
            flags.set_pad_high();
        }
    }
    flags
}

/// Writes the padding-length prefix for `pad_len` (§4.H). The caller is
/// responsible for having already set the matching flags via
/// `padding_flags` on the frame header.
pub(crate) fn write_padding_prefix<B: BtMut>(dst: &mut B, pad_len: usize) -> usize {
    if pad_len == 0 {
        return 0;
    }
    if pad_len > 255 {
        dst.put_u8((pad_len >> 8) as u8);
        dst.put_u8((pad_len & 0xFF) as u8);
        2
    } else {
        dst.put_u8(pad_len as u8);
        1
    }
}

pub(crate) fn write_zero_padding<B: BtMut>(dst: &mut B, pad_len: usize) -> usize {
    for _ in 0..pad_len {
        dst.put_u8(0);
    }
    pad_len
}

#[cfg(test)]
mod tests {
    use super::*;
    use algorithm::buf::BinaryMut;

    #[test]
    fn pad_high_without_pad_low_is_rejected() {
        let mut flags = Flag::zero();
        flags.set_pad_high();
        let mut buf = BinaryMut::new();
        buf.put_u8(0);
        let err = read_padding(&mut buf, flags, 1, 0).unwrap_err();
        assert_eq!(err, Http2Error::PaddingFlagMismatch);
    }

    #[test]
    fn padding_length_exceeding_remaining_payload_is_rejected() {
        let mut flags = Flag::zero();
        flags.set_pad_low();
        let mut buf = BinaryMut::new();
        // claims 10 octets of padding but only 3 octets remain after the
        // one-octet length prefix itself.
        buf.put_u8(10);
        buf.put_slice(&[0u8; 3]);
        let err = read_padding(&mut buf, flags, 4, 0).unwrap_err();
        assert_eq!(err, Http2Error::TooMuchPadding(10));
    }

    #[test]
    fn padding_length_that_would_swallow_a_mandatory_field_is_rejected() {
        let mut flags = Flag::zero();
        flags.set_pad_low();
        let mut buf = BinaryMut::new();
        // one-octet prefix claims pad_len=1, leaving 4 octets — exactly
        // enough for a 4-octet mandatory field and nothing else.
        buf.put_u8(1);
        buf.put_slice(&[0u8; 4]);
        let err = read_padding(&mut buf, flags, 5, 4).unwrap_err();
        assert_eq!(err, Http2Error::TooMuchPadding(1));
    }

    #[test]
    fn no_padding_flag_reads_nothing() {
        let flags = Flag::zero();
        let mut buf = BinaryMut::new();
        buf.put_u8(0xFF);
        let (pad_len, consumed) = read_padding(&mut buf, flags, 1, 0).unwrap();
        assert_eq!((pad_len, consumed), (0, 0));
        assert_eq!(buf.remaining(), 1);
    }

    #[test]
    fn stream_identifier_masks_the_reserved_top_bit_on_parse() {
        let mut buf = BinaryMut::new();
        buf.put_u32(0x8000_0001);
        let id = StreamIdentifier::parse(&mut buf);
        assert_eq!(id, StreamIdentifier(1));
    }
}
