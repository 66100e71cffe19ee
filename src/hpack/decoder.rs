// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! The HPACK decoder half of the context: owns a dynamic table and a
//! reference set, and turns an HPACK-compressed header block back into a
//! `HeaderList` (draft-07 §3.2).

use crate::error::DecoderError;
use crate::header::{HeaderField, HeaderList, HeaderName, HeaderValue};

use super::dynamic_table::{entry_at_combined, DynamicTable};
use super::encoder::DEFAULT_DYNAMIC_TABLE_SIZE;
use super::integer::decode_integer;
use super::literal::decode_string;
use super::reference_set::ReferenceSet;
use super::static_table;

pub struct Decoder {
    dynamic_table: DynamicTable,
    reference_set: ReferenceSet,
    /// The bound `SETTINGS_HEADER_TABLE_SIZE` places on any max-size-update
    /// a peer may request; distinct from the table's current `max_size`,
    /// which may be smaller while staying under this ceiling.
    protocol_max_size: usize,
    /// Ceiling on the summed `HeaderField::size()` of one decoded header
    /// list, mirroring `LocalConfig::max_header_list_size`. `usize::MAX`
    /// (the default) disables the check.
    max_header_list_size: usize,
}

impl Decoder {
    pub fn new() -> Decoder {
        Decoder::with_dynamic_table_size(DEFAULT_DYNAMIC_TABLE_SIZE)
    }

    pub fn with_dynamic_table_size(max_size: usize) -> Decoder {
        Decoder {
            dynamic_table: DynamicTable::new(max_size),
            reference_set: ReferenceSet::new(),
            protocol_max_size: max_size,
            max_header_list_size: usize::MAX,
        }
    }

    pub fn dynamic_table(&self) -> &DynamicTable {
        &self.dynamic_table
    }

    pub fn reference_set(&self) -> &ReferenceSet {
        &self.reference_set
    }

    /// Updates the ceiling a peer's max-size-update octet is allowed to
    /// request, tracking the connection's own `SETTINGS_HEADER_TABLE_SIZE`.
    pub fn set_protocol_max_dynamic_table_size(&mut self, max_size: usize) {
        self.protocol_max_size = max_size;
    }

    /// Updates the ceiling on one decoded header list's summed
    /// `HeaderField::size()`, mirroring `LocalConfig::max_header_list_size`.
    pub fn set_max_header_list_size(&mut self, max_size: usize) {
        self.max_header_list_size = max_size;
    }

    /// Decodes one header block fragment, returning the headers in the
    /// order they became observable (explicit representations in wire
    /// order, then any still-referenced entries not re-emitted).
    pub fn decode(&mut self, buf: &[u8]) -> Result<HeaderList, DecoderError> {
        let mut emitted: Vec<HeaderField> = Vec::new();
        let mut remaining = buf;

        while !remaining.is_empty() {
            let first = remaining[0];

            if first == 0b0011_0000 {
                remaining = &remaining[1..];
                self.reference_set.clear();
                log::trace!("hpack decode: reference-set clear");
                continue;
            }

            if first & 0b1110_0000 == 0b0010_0000 {
                let (new_size, consumed) = decode_integer(remaining, 5)?;
                remaining = &remaining[consumed..];
                if new_size > self.protocol_max_size {
                    return Err(DecoderError::InvalidMaxDynamicSize);
                }
                let reference_set = &mut self.reference_set;
                self.dynamic_table
                    .resize(new_size, |id| reference_set.on_evict(id));
                log::trace!("hpack decode: resized dynamic table to {}", new_size);
                continue;
            }

            if first & 0x80 == 0x80 {
                let (index, consumed) = decode_integer(remaining, 7)?;
                remaining = &remaining[consumed..];
                if index == 0 {
                    return Err(DecoderError::HeaderIndexOutOfBounds);
                }

                // An index that currently names a *referenced* dynamic
                // entry is the mirror image of the encode side's step 3:
                // it extracts that entry from the reference set instead of
                // re-emitting it. Any other index behaves as a normal
                // inclusion (matches encode step 4.b).
                if index <= self.dynamic_table.len() {
                    let (field, id) = self
                        .dynamic_table
                        .entry_at(index)
                        .ok_or(DecoderError::HeaderIndexOutOfBounds)?;
                    if self.reference_set.contains(id) {
                        self.reference_set.remove(id);
                    } else {
                        let field = field.clone();
                        emitted.push(field.clone());
                        self.insert_and_reference(field);
                    }
                } else {
                    let field = static_table::entry_at(index - self.dynamic_table.len())
                        .cloned()
                        .ok_or(DecoderError::HeaderIndexOutOfBounds)?;
                    emitted.push(field.clone());
                    self.insert_and_reference(field);
                }
                continue;
            }

            if first & 0xC0 == 0x40 {
                let (name_index, consumed) = decode_integer(remaining, 6)?;
                remaining = &remaining[consumed..];
                let field = self.read_literal(name_index, &mut remaining)?;
                emitted.push(field.clone());
                self.insert_and_reference(field);
                continue;
            }

            // `0001xxxx` (never-indexed) and `0000xxxx` (without-indexing):
            // identical handling at this layer, neither touches the
            // dynamic table or reference set.
            let (name_index, consumed) = decode_integer(remaining, 4)?;
            remaining = &remaining[consumed..];
            let field = self.read_literal(name_index, &mut remaining)?;
            emitted.push(field);
        }

        for id in self.reference_set.iter() {
            if let Some(field) = self.dynamic_table.field_by_id(id) {
                let already_emitted = emitted
                    .iter()
                    .any(|e| e.name == field.name && e.value == field.value);
                if !already_emitted {
                    emitted.push(field.clone());
                }
            }
        }

        let total_size: usize = emitted.iter().map(HeaderField::size).sum();
        if total_size > self.max_header_list_size {
            return Err(DecoderError::HeaderListTooBig);
        }

        Ok(emitted.into_iter().collect())
    }

    fn read_literal(
        &self,
        name_index: usize,
        remaining: &mut &[u8],
    ) -> Result<HeaderField, DecoderError> {
        let name = if name_index == 0 {
            let (name_bytes, consumed) = decode_string(remaining)?;
            *remaining = &remaining[consumed..];
            HeaderName::try_from(name_bytes).expect("HeaderName::try_from<Vec<u8>> is infallible")
        } else {
            let existing = entry_at_combined(&self.dynamic_table, name_index)
                .ok_or(DecoderError::HeaderIndexOutOfBounds)?;
            existing.name.clone()
        };

        let (value_bytes, consumed) = decode_string(remaining)?;
        *remaining = &remaining[consumed..];
        let value =
            HeaderValue::try_from(value_bytes).expect("HeaderValue::try_from<Vec<u8>> is infallible");

        Ok(HeaderField::new(name, value))
    }

    fn insert_and_reference(&mut self, field: HeaderField) {
        let reference_set = &mut self.reference_set;
        if let Some(id) = self
            .dynamic_table
            .add(field, |evicted| reference_set.on_evict(evicted))
        {
            self.reference_set.add(id);
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}
