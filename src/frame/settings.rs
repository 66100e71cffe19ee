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

use crate::config::MAX_INITIAL_WINDOW_SIZE;
use crate::error::Http2Error;
use crate::Result;

use super::{checked_length, require_zero_stream_id, Flag, FrameHeader, Kind, StreamIdentifier};

/// One SETTINGS record: draft-11 shrinks RFC7540's 2-octet id / 4-octet
/// value pair down to a 1-octet id, for a 5-octet record (§3). Only four
/// identifiers are defined.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Setting {
    HeaderTableSize(u32),
    EnablePush(u32),
    MaxConcurrentStreams(u32),
    InitialWindowSize(u32),
}

impl Setting {
    pub const ENCODED_LEN: usize = 5;

    fn from_id(id: u8, val: u32) -> Result<Setting> {
        use self::Setting::*;
        match id {
            1 => Ok(HeaderTableSize(val)),
            2 => Ok(EnablePush(val)),
            3 => Ok(MaxConcurrentStreams(val)),
            4 => Ok(InitialWindowSize(val)),
            _ => Err(Http2Error::InvalidSettingId(id)),
        }
    }

    fn parse<B: Bt>(buf: &mut B) -> Result<Setting> {
        let id = buf.get_u8();
        let val = buf.get_u32();
        Setting::from_id(id, val)
    }

    fn encode<B: BtMut>(&self, dst: &mut B) -> usize {
        use self::Setting::*;
        let (id, val) = match *self {
            HeaderTableSize(v) => (1u8, v),
            EnablePush(v) => (2u8, v),
            MaxConcurrentStreams(v) => (3u8, v),
            InitialWindowSize(v) => (4u8, v),
        };
        dst.put_u8(id);
        dst.put_u32(val);
        Self::ENCODED_LEN
    }
}

/// A SETTINGS frame (kind 0x4): either a set of configuration parameters,
/// or (with the `ACK` flag, which shares bit 0x01 with `END_STREAM`) the
/// acknowledgement of one. An ACK carries no payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    flags: Flag,
    header_table_size: Option<u32>,
    enable_push: Option<u32>,
    max_concurrent_streams: Option<u32>,
    initial_window_size: Option<u32>,
}

impl Settings {
    pub fn ack() -> Settings {
        Settings {
            flags: Flag::ack(),
            ..Settings::default()
        }
    }

    pub fn is_ack(&self) -> bool {
        self.flags.is_ack()
    }

    pub fn header_table_size(&self) -> Option<u32> {
        self.header_table_size
    }

    pub fn set_header_table_size(&mut self, size: Option<u32>) {
        self.header_table_size = size;
    }

    pub fn is_push_enabled(&self) -> Option<bool> {
        self.enable_push.map(|v| v != 0)
    }

    pub fn set_enable_push(&mut self, enable: bool) {
        self.enable_push = Some(enable as u32);
    }

    pub fn max_concurrent_streams(&self) -> Option<u32> {
        self.max_concurrent_streams
    }

    pub fn set_max_concurrent_streams(&mut self, max: Option<u32>) {
        self.max_concurrent_streams = max;
    }

    pub fn initial_window_size(&self) -> Option<u32> {
        self.initial_window_size
    }

    pub fn set_initial_window_size(&mut self, size: Option<u32>) {
        self.initial_window_size = size;
    }

    fn for_each<F: FnMut(Setting)>(&self, mut f: F) {
        use self::Setting::*;
        if let Some(v) = self.header_table_size {
            f(HeaderTableSize(v));
        }
        if let Some(v) = self.enable_push {
            f(EnablePush(v));
        }
        if let Some(v) = self.max_concurrent_streams {
            f(MaxConcurrentStreams(v));
        }
        if let Some(v) = self.initial_window_size {
            f(InitialWindowSize(v));
        }
    }

    fn payload_len(&self) -> usize {
        let mut len = 0;
        self.for_each(|_| len += Setting::ENCODED_LEN);
        len
    }

    pub fn parse<B: Bt>(header: &FrameHeader, buf: &mut B) -> Result<Settings> {
        require_zero_stream_id(header.stream_id())?;

        if header.flag().is_ack() {
            if buf.has_remaining() {
                return Err(Http2Error::InvalidPayloadLength);
            }
            return Ok(Settings::ack());
        }

        if buf.remaining() % Setting::ENCODED_LEN != 0 {
            return Err(Http2Error::InvalidPayloadLength);
        }

        let mut settings = Settings::default();
        let count = buf.remaining() / Setting::ENCODED_LEN;
        for _ in 0..count {
            match Setting::parse(buf)? {
                Setting::HeaderTableSize(v) => settings.header_table_size = Some(v),
                Setting::EnablePush(v) => match v {
                    0 | 1 => settings.enable_push = Some(v),
                    _ => return Err(Http2Error::InvalidSettingValue),
                },
                Setting::MaxConcurrentStreams(v) => settings.max_concurrent_streams = Some(v),
                Setting::InitialWindowSize(v) => {
                    if v as usize > MAX_INITIAL_WINDOW_SIZE {
                        return Err(Http2Error::InvalidSettingValue);
                    }
                    settings.initial_window_size = Some(v);
                }
            }
        }
        Ok(settings)
    }

    pub fn encode<B: Bt + BtMut>(&self, dst: &mut B) -> Result<usize> {
        let mut head = FrameHeader::new(Kind::Settings, self.flags, StreamIdentifier::zero());
        head.set_length(checked_length(self.payload_len())?);

        let mut size = head.encode(dst);
        self.for_each(|setting| {
            size += setting.encode(dst);
        });
        log::trace!("encoding SETTINGS; ack={} len={}", self.is_ack(), size);
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algorithm::buf::BinaryMut;

    #[test]
    fn ack_round_trips_with_empty_payload() {
        let frame = Settings::ack();
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        assert_eq!(header.length(), 0);
        let parsed = Settings::parse(&header, &mut buf).unwrap();
        assert!(parsed.is_ack());
    }

    #[test]
    fn round_trips_with_all_known_settings() {
        let mut frame = Settings::default();
        frame.set_header_table_size(Some(8192));
        frame.set_enable_push(false);
        frame.set_max_concurrent_streams(Some(10));
        frame.set_initial_window_size(Some(100));
        let mut buf = BinaryMut::new();
        frame.encode(&mut buf).unwrap();

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        assert_eq!(header.length() as usize, 4 * Setting::ENCODED_LEN);
        let parsed = Settings::parse(&header, &mut buf).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn ack_with_payload_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::Settings, Flag::ack(), StreamIdentifier::zero());
        head.set_length(Setting::ENCODED_LEN as u16);
        head.encode(&mut buf);
        Setting::HeaderTableSize(10).encode(&mut buf);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Settings::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, Http2Error::InvalidPayloadLength);
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::Settings, Flag::zero(), StreamIdentifier::zero());
        head.set_length(Setting::ENCODED_LEN as u16);
        head.encode(&mut buf);
        buf.put_u8(0x7);
        buf.put_u32(1);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Settings::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, Http2Error::InvalidSettingId(0x7));
    }

    #[test]
    fn nonzero_stream_id_is_rejected() {
        let mut buf = BinaryMut::new();
        let mut head = FrameHeader::new(Kind::Settings, Flag::zero(), StreamIdentifier(1));
        head.set_length(0);
        head.encode(&mut buf);

        let header = FrameHeader::parse(&mut buf).unwrap().unwrap();
        let err = Settings::parse(&header, &mut buf).unwrap_err();
        assert_eq!(err, Http2Error::InvalidStreamId);
    }
}
