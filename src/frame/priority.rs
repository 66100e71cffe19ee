// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! draft-11 carries two incompatible priority encodings side by side: the
//! legacy *priority-group* form (a 4-octet group id plus a weight octet)
//! and the newer *stream-dependency* form (a 4-octet dependency id whose
//! top bit doubles as the exclusive flag). A HEADERS frame may carry
//! either ahead of its header block fragment (flagged `PRIORITY_GROUP` /
//! `PRIORITY_DEPENDENCY`); a standalone PRIORITY frame carries exactly one
//! as its entire payload.

use algorithm::buf::{Bt, BtMut};

use crate::error::Http2Error;
use crate::Result;

use super::{Flag, FrameHeader, Kind, StreamIdentifier, MASK_U31};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PriorityGroup {
    pub group_id: StreamIdentifier,
    pub weight: u8,
}

impl PriorityGroup {
    pub const ENCODED_LEN: usize = 5;

    pub fn new(group_id: StreamIdentifier, weight: u8) -> PriorityGroup {
        PriorityGroup { group_id, weight }
    }

    pub fn parse<B: Bt>(buf: &mut B) -> Result<PriorityGroup> {
        if buf.remaining() < Self::ENCODED_LEN {
            return Err(Http2Error::InvalidPayloadLength);
        }
        let group_id = StreamIdentifier::parse(buf);
        let weight = buf.get_u8();
        Ok(PriorityGroup::new(group_id, weight))
    }

    pub fn encode<B: BtMut>(&self, dst: &mut B) -> usize {
        // The reserved top bit is set to 1 on the wire in draft-11;
        // decoders must still mask it on read (§4.H design note).
        dst.put_u32(self.group_id.0 | !MASK_U31);
        dst.put_u8(self.weight);
        Self::ENCODED_LEN
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StreamDependency {
    pub dependency_id: StreamIdentifier,
    pub is_exclusive: bool,
}

impl StreamDependency {
    pub const ENCODED_LEN: usize = 4;

    pub fn new(dependency_id: StreamIdentifier, is_exclusive: bool) -> StreamDependency {
        StreamDependency {
            dependency_id,
            is_exclusive,
        }
    }

    pub fn parse<B: Bt>(buf: &mut B) -> Result<StreamDependency> {
        if buf.remaining() < Self::ENCODED_LEN {
            return Err(Http2Error::InvalidPayloadLength);
        }
        let raw = buf.get_u32();
        let dependency_id = StreamIdentifier(raw & MASK_U31);
        let is_exclusive = raw & !MASK_U31 != 0;
        Ok(StreamDependency::new(dependency_id, is_exclusive))
    }

    pub fn encode<B: BtMut>(&self, dst: &mut B) -> usize {
        let exclusive_bit = if self.is_exclusive { !MASK_U31 } else { 0 };
        dst.put_u32((self.dependency_id.0 & MASK_U31) | exclusive_bit);
        Self::ENCODED_LEN
    }
}

/// Either priority encoding, tagged by which one it is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PriorityBlock {
    Group(PriorityGroup),
    Dependency(StreamDependency),
}

impl PriorityBlock {
    pub fn encoded_len(&self) -> usize {
        match self {
            PriorityBlock::Group(_) => PriorityGroup::ENCODED_LEN,
            PriorityBlock::Dependency(_) => StreamDependency::ENCODED_LEN,
        }
    }

    pub fn encode<B: BtMut>(&self, dst: &mut B) -> usize {
        match self {
            PriorityBlock::Group(g) => g.encode(dst),
            PriorityBlock::Dependency(d) => d.encode(dst),
        }
    }

    pub(crate) fn set_flag(&self, flags: &mut Flag) {
        match self {
            PriorityBlock::Group(_) => flags.insert(Flag::PRIORITY_GROUP),
            PriorityBlock::Dependency(_) => flags.insert(Flag::PRIORITY_DEPENDENCY),
        }
    }

    /// How many octets `parse_optional` will consume for this flag
    /// combination, without actually parsing anything — lets a caller
    /// reserve that many octets (e.g. ahead of padding-length validation)
    /// before the block itself is read.
    pub(crate) fn mandatory_len(flags: Flag) -> usize {
        if flags.is_priority_group() {
            PriorityGroup::ENCODED_LEN
        } else if flags.is_priority_dependency() {
            StreamDependency::ENCODED_LEN
        } else {
            0
        }
    }

    /// Parses whichever form `flags` indicates is present, or `Ok(None)`
    /// if neither priority flag is set. Errors if both are set (checked by
    /// the caller via `Flag::has_both_priority_flags` before this runs).
    pub(crate) fn parse_optional<B: Bt>(buf: &mut B, flags: Flag) -> Result<Option<PriorityBlock>> {
        if flags.is_priority_group() {
            Ok(Some(PriorityBlock::Group(PriorityGroup::parse(buf)?)))
        } else if flags.is_priority_dependency() {
            Ok(Some(PriorityBlock::Dependency(StreamDependency::parse(buf)?)))
        } else {
            Ok(None)
        }
    }
}

/// A standalone PRIORITY frame (kind 0x2): reprioritizes `stream_id`
/// without carrying a header block. Exactly one of `PRIORITY_GROUP` /
/// `PRIORITY_DEPENDENCY` must be set; having both, or neither, is a
/// protocol error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Priority {
    stream_id: StreamIdentifier,
    block: PriorityBlock,
}

impl Priority {
    pub fn new(stream_id: StreamIdentifier, block: PriorityBlock) -> Priority {
        Priority { stream_id, block }
    }

    pub fn stream_id(&self) -> StreamIdentifier {
        self.stream_id
    }

    pub fn block(&self) -> PriorityBlock {
        self.block
    }

    pub fn parse<B: Bt>(header: &FrameHeader, buf: &mut B) -> Result<Priority> {
        if header.stream_id().is_zero() {
            return Err(Http2Error::InvalidStreamId);
        }
        if header.flag().has_both_priority_flags() {
            return Err(Http2Error::InvalidPriorityFlags);
        }
        let block = match PriorityBlock::parse_optional(buf, header.flag())? {
            Some(block) => block,
            None => return Err(Http2Error::InvalidPriorityFlags),
        };
        if let PriorityBlock::Dependency(dep) = block {
            if dep.dependency_id == header.stream_id() {
                return Err(Http2Error::InvalidDependencyId);
            }
        }
        Ok(Priority::new(header.stream_id(), block))
    }

    pub fn encode<B: Bt + BtMut>(&self, dst: &mut B) -> Result<usize> {
        let mut flags = Flag::zero();
        self.block.set_flag(&mut flags);
        let mut head = FrameHeader::new(Kind::Priority, flags, self.stream_id);
        head.set_length(super::checked_length(self.block.encoded_len())?);

        let mut size = head.encode(dst);
        size += self.block.encode(dst);
        log::trace!("encoding PRIORITY; stream_id={:?} len={}", self.stream_id, size);
        Ok(size)
    }
}
