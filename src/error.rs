// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh
// -----
// Created Date: 2023/08/15 10:47:56

use std::{fmt, result};

use crate::hpack::{HuffmanDecoderError, IntegerDecodingError, StringDecodingError};

/// The GOAWAY/RST_STREAM error codes defined by the protocol. Stable across
/// the wire: `u32::from(reason)` is what actually gets sent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    NoError,
    ProtocolError,
    InternalError,
    FlowControlError,
    SettingsTimeout,
    StreamClosed,
    FrameSizeError,
    RefusedStream,
    Cancel,
    CompressionError,
    ConnectError,
    EnhanceYourCalm,
    InadequateSecurity,
    Other(u32),
}

impl From<u32> for Reason {
    fn from(value: u32) -> Self {
        match value {
            0 => Reason::NoError,
            1 => Reason::ProtocolError,
            2 => Reason::InternalError,
            3 => Reason::FlowControlError,
            4 => Reason::SettingsTimeout,
            5 => Reason::StreamClosed,
            6 => Reason::FrameSizeError,
            7 => Reason::RefusedStream,
            8 => Reason::Cancel,
            9 => Reason::CompressionError,
            10 => Reason::ConnectError,
            11 => Reason::EnhanceYourCalm,
            12 => Reason::InadequateSecurity,
            other => Reason::Other(other),
        }
    }
}

impl From<Reason> for u32 {
    fn from(reason: Reason) -> u32 {
        match reason {
            Reason::NoError => 0,
            Reason::ProtocolError => 1,
            Reason::InternalError => 2,
            Reason::FlowControlError => 3,
            Reason::SettingsTimeout => 4,
            Reason::StreamClosed => 5,
            Reason::FrameSizeError => 6,
            Reason::RefusedStream => 7,
            Reason::Cancel => 8,
            Reason::CompressionError => 9,
            Reason::ConnectError => 10,
            Reason::EnhanceYourCalm => 11,
            Reason::InadequateSecurity => 12,
            Reason::Other(v) => v,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Reason::NoError => "no error",
            Reason::ProtocolError => "protocol error",
            Reason::InternalError => "internal error",
            Reason::FlowControlError => "flow control error",
            Reason::SettingsTimeout => "settings timeout",
            Reason::StreamClosed => "stream closed",
            Reason::FrameSizeError => "frame size error",
            Reason::RefusedStream => "refused stream",
            Reason::Cancel => "cancel",
            Reason::CompressionError => "compression error",
            Reason::ConnectError => "connect error",
            Reason::EnhanceYourCalm => "enhance your calm",
            Reason::InadequateSecurity => "inadequate security",
            Reason::Other(_) => "unknown error code",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Http2Error {
    /// the frame length/payload did not match what the kind requires.
    BadFrameSize,
    InvalidPayloadLength,
    /// a frame that must carry a zero (or non-zero) stream id carried the other.
    InvalidStreamId,
    /// PRIORITY_GROUP and PRIORITY_DEPENDENCY were both set.
    InvalidPriorityFlags,
    /// a stream depends on itself.
    InvalidDependencyId,
    /// PAD_HIGH set without PAD_LOW, or decoded padding exceeds the payload.
    TooMuchPadding(u8),
    /// PAD_HIGH was set without PAD_LOW.
    PaddingFlagMismatch,
    /// a SETTINGS value failed its range check.
    InvalidSettingValue,
    /// a SETTINGS identifier outside the four known ids (0, or > 4).
    InvalidSettingId(u8),
    /// WINDOW_UPDATE carried a zero increment.
    InvalidWindowUpdateValue,
    /// CONTINUATION arrived outside of an open header block, or some other
    /// frame interleaved with one.
    HeadersNotContinued,
    /// a HEADERS/PUSH_PROMISE header list exceeded the configured limit.
    HeaderListTooBig,
    Decoder(DecoderError),
    Huffman(HuffmanDecoderError),
}

impl Http2Error {
    #[inline]
    pub fn description_str(&self) -> &'static str {
        match self {
            Http2Error::BadFrameSize => "frame payload size mismatch",
            Http2Error::InvalidPayloadLength => "invalid payload length",
            Http2Error::InvalidStreamId => "invalid stream identifier",
            Http2Error::InvalidPriorityFlags => "both priority-group and priority-dependency set",
            Http2Error::InvalidDependencyId => "stream depends on itself",
            Http2Error::TooMuchPadding(_) => "padding length exceeds payload",
            Http2Error::PaddingFlagMismatch => "PAD_HIGH set without PAD_LOW",
            Http2Error::InvalidSettingValue => "invalid settings value",
            Http2Error::InvalidSettingId(_) => "unknown settings identifier",
            Http2Error::InvalidWindowUpdateValue => "invalid window update increment",
            Http2Error::HeadersNotContinued => "header block interrupted by another frame",
            Http2Error::HeaderListTooBig => "header list exceeds configured limit",
            Http2Error::Decoder(_) => "hpack decoder error",
            Http2Error::Huffman(_) => "huffman decoder error",
        }
    }

    /// The GOAWAY/RST_STREAM code a caller should surface for this error.
    pub fn reason(&self) -> Reason {
        match self {
            Http2Error::BadFrameSize | Http2Error::InvalidPayloadLength => Reason::FrameSizeError,
            Http2Error::Decoder(_) | Http2Error::Huffman(_) => Reason::CompressionError,
            _ => Reason::ProtocolError,
        }
    }
}

impl fmt::Display for Http2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description_str())
    }
}

impl From<DecoderError> for Http2Error {
    fn from(e: DecoderError) -> Self {
        match e {
            DecoderError::HeaderListTooBig => Http2Error::HeaderListTooBig,
            other => Http2Error::Decoder(other),
        }
    }
}

impl From<HuffmanDecoderError> for Http2Error {
    fn from(e: HuffmanDecoderError) -> Self {
        Http2Error::Huffman(e)
    }
}

/// Errors raised while decoding an HPACK-compressed header block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecoderError {
    HeaderIndexOutOfBounds,
    IntegerDecodingError(IntegerDecodingError),
    StringDecodingError(StringDecodingError),
    /// a max-size update octet requested a size above what the protocol
    /// (SETTINGS_HEADER_TABLE_SIZE) allows.
    InvalidMaxDynamicSize,
    /// the decoded header list exceeded the configured `max_header_list_size`.
    HeaderListTooBig,
}

impl From<IntegerDecodingError> for DecoderError {
    fn from(e: IntegerDecodingError) -> Self {
        DecoderError::IntegerDecodingError(e)
    }
}

impl From<StringDecodingError> for DecoderError {
    fn from(e: StringDecodingError) -> Self {
        DecoderError::StringDecodingError(e)
    }
}

pub type Result<T> = result::Result<T, Http2Error>;
