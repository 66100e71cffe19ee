// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! draft-11's frame flags. Unlike the final RFC 7540, padding and priority
//! each split into two bits here (§3): `PAD_LOW`/`PAD_HIGH` select an 8- or
//! 16-bit padding-length field, and `PRIORITY_GROUP`/`PRIORITY_DEPENDENCY`
//! select which of the two priority encodings follows. Applicability of
//! any given bit is per frame kind; this type just holds the byte.

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Flag: u8 {
        const END_STREAM = 0x01;
        const ACK = 0x01;
        const END_SEGMENT = 0x02;
        const END_HEADERS = 0x04;
        const PAD_LOW = 0x08;
        const PAD_HIGH = 0x10;
        const PRIORITY_GROUP = 0x20;
        const PRIORITY_DEPENDENCY = 0x40;
    }
}

impl Flag {
    pub fn zero() -> Flag {
        Flag::default()
    }

    pub fn new(bits: u8) -> Flag {
        // draft-11 defines no reserved flag bits beyond the seven named
        // above; `from_bits_truncate` silently drops anything else rather
        // than rejecting the frame over an unrecognized flag (only the
        // combinations checked explicitly by the frame codec are errors).
        Flag::from_bits_truncate(bits)
    }

    pub fn ack() -> Flag {
        Flag::ACK
    }

    pub fn is_ack(&self) -> bool {
        self.contains(Flag::ACK)
    }

    pub fn end_stream() -> Flag {
        Flag::END_STREAM
    }

    pub fn is_end_stream(&self) -> bool {
        self.contains(Flag::END_STREAM)
    }

    pub fn set_end_stream(&mut self) {
        self.insert(Flag::END_STREAM);
    }

    pub fn is_end_segment(&self) -> bool {
        self.contains(Flag::END_SEGMENT)
    }

    pub fn end_headers() -> Flag {
        Flag::END_HEADERS
    }

    pub fn is_end_headers(&self) -> bool {
        self.contains(Flag::END_HEADERS)
    }

    pub fn set_end_headers(&mut self) {
        self.insert(Flag::END_HEADERS);
    }

    pub fn is_padded(&self) -> bool {
        self.contains(Flag::PAD_LOW) || self.contains(Flag::PAD_HIGH)
    }

    pub fn is_pad_low(&self) -> bool {
        self.contains(Flag::PAD_LOW)
    }

    pub fn is_pad_high(&self) -> bool {
        self.contains(Flag::PAD_HIGH)
    }

    pub fn set_pad_low(&mut self) {
        self.insert(Flag::PAD_LOW);
    }

    pub fn set_pad_high(&mut self) {
        self.insert(Flag::PAD_HIGH);
    }

    pub fn is_priority_group(&self) -> bool {
        self.contains(Flag::PRIORITY_GROUP)
    }

    pub fn is_priority_dependency(&self) -> bool {
        self.contains(Flag::PRIORITY_DEPENDENCY)
    }

    pub fn has_both_priority_flags(&self) -> bool {
        self.is_priority_group() && self.is_priority_dependency()
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self(Default::default())
    }
}

impl From<Flag> for u8 {
    fn from(flag: Flag) -> u8 {
        flag.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_and_end_stream_share_a_bit() {
        assert_eq!(Flag::ack().bits(), Flag::end_stream().bits());
    }

    #[test]
    fn both_priority_flags_detected() {
        let mut flags = Flag::zero();
        flags.insert(Flag::PRIORITY_GROUP);
        assert!(!flags.has_both_priority_flags());
        flags.insert(Flag::PRIORITY_DEPENDENCY);
        assert!(flags.has_both_priority_flags());
    }

    #[test]
    fn pad_high_without_pad_low_is_detectable() {
        let mut flags = Flag::zero();
        flags.insert(Flag::PAD_HIGH);
        assert!(flags.is_pad_high());
        assert!(!flags.is_pad_low());
    }
}
