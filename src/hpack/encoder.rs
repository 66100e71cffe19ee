// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! The HPACK encoder half of the context: owns a dynamic table and a
//! reference set, and turns a `HeaderList` into an HPACK-compressed byte
//! string (draft-07 §3.2).

use algorithm::buf::{BinaryMut, Bt, BtMut};

use crate::header::{HeaderField, HeaderList};

use super::dynamic_table::DynamicTable;
use super::integer::encode_integer;
use super::literal::encode_string;
use super::reference_set::ReferenceSet;
use super::static_table;

/// `SETTINGS_HEADER_TABLE_SIZE`'s default, per the HPACK draft: 4096 octets
/// until the peer's SETTINGS frame says otherwise.
pub const DEFAULT_DYNAMIC_TABLE_SIZE: usize = 4096;

pub struct Encoder {
    dynamic_table: DynamicTable,
    reference_set: ReferenceSet,
    /// Emit a reference-set-clear (0x30) octet before the next header
    /// block. The draft makes this an encoder hint, not something the
    /// decoder requires; off by default, opt in explicitly.
    clear_reference_set_on_block: bool,
    pending_resize: Option<usize>,
}

impl Encoder {
    pub fn new() -> Encoder {
        Encoder::with_dynamic_table_size(DEFAULT_DYNAMIC_TABLE_SIZE)
    }

    pub fn with_dynamic_table_size(max_size: usize) -> Encoder {
        Encoder {
            dynamic_table: DynamicTable::new(max_size),
            reference_set: ReferenceSet::new(),
            clear_reference_set_on_block: false,
            pending_resize: None,
        }
    }

    pub fn dynamic_table_size(&self) -> usize {
        self.dynamic_table.size()
    }

    pub fn dynamic_table_max_size(&self) -> usize {
        self.dynamic_table.max_size()
    }

    pub fn dynamic_table(&self) -> &DynamicTable {
        &self.dynamic_table
    }

    pub fn reference_set(&self) -> &ReferenceSet {
        &self.reference_set
    }

    /// Schedules a `SETTINGS_HEADER_TABLE_SIZE`-driven resize to be emitted
    /// as a context-update octet ahead of the next encoded block.
    pub fn set_max_dynamic_table_size(&mut self, new_size: usize) {
        self.pending_resize = Some(new_size);
    }

    /// Opts into emitting a reference-set-clear (0x30) ahead of the next
    /// block.
    pub fn set_clear_reference_set_on_block(&mut self, clear: bool) {
        self.clear_reference_set_on_block = clear;
    }

    /// Encodes `headers`, appending the HPACK representation to `dst`.
    /// Returns the number of octets written.
    pub fn encode<B: BtMut>(&mut self, headers: &HeaderList, dst: &mut B) -> usize {
        let mut size = 0;

        // Step 1: pending reference-set-clear.
        if self.clear_reference_set_on_block {
            dst.put_u8(0x30);
            size += 1;
            self.reference_set.clear();
            self.clear_reference_set_on_block = false;
            log::trace!("hpack encode: emitted reference-set-clear");
        }

        // Step 2: pending max-table-size change.
        if let Some(new_size) = self.pending_resize.take() {
            size += encode_context_update(new_size, dst);
            let reference_set = &mut self.reference_set;
            self.dynamic_table
                .resize(new_size, |id| reference_set.on_evict(id));
            log::trace!("hpack encode: resized dynamic table to {}", new_size);
        }

        // Step 3: evict carried-over references not present in `headers`.
        let stale: Vec<u64> = self
            .reference_set
            .iter()
            .filter(|&id| match self.dynamic_table.field_by_id(id) {
                None => true,
                Some(field) => !headers
                    .iter()
                    .any(|h| h.name == field.name && h.value == field.value),
            })
            .collect();
        for id in stale {
            if let Some(relative_index) = self.dynamic_table.relative_index(id) {
                size += encode_indexed(relative_index, dst);
            }
            self.reference_set.remove(id);
        }

        // Step 4: encode each header.
        for field in headers.iter() {
            size += self.encode_field(field, dst);
        }

        log::trace!("hpack encode: {} octets for {} headers", size, headers.len());
        size
    }

    fn encode_field<B: BtMut>(&mut self, field: &HeaderField, dst: &mut B) -> usize {
        let name = field.name.as_str();
        let value = field.value.as_str();

        // 4.a: already implicitly present via a carried reference.
        if self
            .reference_set
            .find(&self.dynamic_table, &name, &value)
            .is_some()
        {
            return 0;
        }

        // 4.b: a combined-table entry matches name and value exactly.
        if let Some(index) = combined_lookup(&self.dynamic_table, &name, &value) {
            let size = encode_indexed(index, dst);
            self.insert_and_reference(field.clone());
            return size;
        }

        // 4.c: a combined-table entry matches the name only.
        if let Some(index) = combined_lookup_name(&self.dynamic_table, &name) {
            let mut size = encode_literal_indexed_name(index, dst);
            size += encode_string(field.value.as_bytes(), dst);
            self.insert_and_reference(field.clone());
            return size;
        }

        // 4.d: no match anywhere; literal with incremental indexing, new name.
        dst.put_u8(0x40);
        let mut size = 1;
        size += encode_string(field.name.as_bytes(), dst);
        size += encode_string(field.value.as_bytes(), dst);
        self.insert_and_reference(field.clone());
        size
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

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new()
    }
}

fn combined_lookup(table: &DynamicTable, name: &str, value: &str) -> Option<usize> {
    if let Some((_, relative)) = table.find(name, value) {
        return Some(relative);
    }
    let static_index = static_table::lookup_name_value(name, value);
    if static_index != 0 {
        return Some(table.len() + static_index);
    }
    None
}

fn combined_lookup_name(table: &DynamicTable, name: &str) -> Option<usize> {
    if let Some((_, relative)) = table.find_name(name) {
        return Some(relative);
    }
    let static_index = static_table::lookup_name(name);
    if static_index != 0 {
        return Some(table.len() + static_index);
    }
    None
}

/// `1xxxxxxx`: indexed representation, 7-bit prefix.
fn encode_indexed<B: BtMut>(index: usize, dst: &mut B) -> usize {
    tagged_integer(index, 7, 0x80, dst)
}

/// `01xxxxxx`: literal with incremental indexing, indexed name, 6-bit prefix.
fn encode_literal_indexed_name<B: BtMut>(index: usize, dst: &mut B) -> usize {
    tagged_integer(index, 6, 0x40, dst)
}

/// `001xxxxx`: dynamic-table max-size update, 5-bit prefix.
fn encode_context_update<B: BtMut>(new_size: usize, dst: &mut B) -> usize {
    tagged_integer(new_size, 5, 0x20, dst)
}

/// Since `dst` is append-only, the tag bits that go in the top of the
/// prefix octet can't be OR'd in after `encode_integer` has already
/// written it; encode into a scratch buffer first so the tag can be
/// applied to the first octet before it's copied out.
fn tagged_integer<B: BtMut>(value: usize, prefix_bits: u8, tag: u8, dst: &mut B) -> usize {
    let mut scratch = BinaryMut::new();
    encode_integer(value, prefix_bits, &mut scratch);
    let mut bytes = scratch.chunk().to_vec();
    bytes[0] |= tag;
    dst.put_slice(&bytes);
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{HeaderList, HeaderName, HeaderValue};
    use algorithm::buf::BinaryMut;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderList {
        pairs
            .iter()
            .map(|&(n, v)| (HeaderName::from_static(n), HeaderValue::from_static(v)))
            .collect()
    }

    #[test]
    fn indexed_method_get() {
        let mut encoder = Encoder::new();
        let mut dst = BinaryMut::new();
        encoder.encode(&headers(&[(":method", "GET")]), &mut dst);
        assert_eq!(dst.chunk(), &[0x82]);
    }

    #[test]
    fn second_identical_header_is_elided_via_reference_set() {
        let mut encoder = Encoder::new();
        let mut first = BinaryMut::new();
        encoder.encode(&headers(&[(":method", "GET")]), &mut first);
        assert_eq!(first.chunk(), &[0x82]);

        // ":method: GET" is still in the reference set, so encoding it
        // again emits nothing at all.
        let mut second = BinaryMut::new();
        let size = encoder.encode(&headers(&[(":method", "GET")]), &mut second);
        assert_eq!(size, 0);
        assert_eq!(second.chunk(), &[] as &[u8]);
    }

    #[test]
    fn dropping_a_header_emits_its_eviction_from_the_reference_set() {
        let mut encoder = Encoder::new();
        let mut first = BinaryMut::new();
        encoder.encode(
            &headers(&[(":method", "GET"), (":path", "/")]),
            &mut first,
        );

        // Second block doesn't repeat ":path: /"; the carried reference
        // for it must be explicitly evicted via its own indexed byte.
        let mut second = BinaryMut::new();
        encoder.encode(&headers(&[(":method", "GET")]), &mut second);
        assert_eq!(second.chunk().len(), 1);
        assert_eq!(second.chunk()[0] & 0x80, 0x80);
    }

    #[test]
    fn literal_with_incremental_indexing_new_name() {
        let mut encoder = Encoder::new();
        let mut dst = BinaryMut::new();
        encoder.encode(&headers(&[("x-custom", "value")]), &mut dst);
        assert_eq!(dst.chunk()[0], 0x40);
    }

    #[test]
    fn two_indexed_headers_on_a_fresh_context_match_known_wire_bytes() {
        let mut encoder = Encoder::new();
        let mut dst = BinaryMut::new();
        encoder.encode(&headers(&[(":method", "GET"), (":scheme", "http")]), &mut dst);
        // ":method: GET" is static index 2 (dynamic table still empty when
        // it's looked up); ":scheme: http" is static index 6, but by the
        // time it's looked up the first header has already been prepended
        // to the (now one-entry) dynamic table, so its combined index is
        // 1 + 6 = 7.
        assert_eq!(dst.chunk(), &[0x82, 0x87]);

        assert_eq!(encoder.dynamic_table().len(), 2);
        let (id, relative_index) = encoder.dynamic_table().find(":scheme", "http").unwrap();
        assert_eq!(relative_index, 1);
        assert_eq!(
            encoder.dynamic_table().field_by_id(id).unwrap().value.as_str().as_ref(),
            "http"
        );
    }

    #[test]
    fn eviction_keeps_the_table_within_its_bound_across_requests() {
        // draft-07 Appendix D.3-style sequence: a small max size forces
        // eviction partway through a run of realistic request headers, and
        // the reference set must never hold a dangling reference into an
        // evicted slot.
        let mut encoder = Encoder::with_dynamic_table_size(256);

        let first = headers(&[
            (":status", "302"),
            ("cache-control", "private"),
            ("date", "Mon, 21 Oct 2013 20:13:21 GMT"),
            ("location", "https://www.example.com"),
        ]);
        let mut dst1 = BinaryMut::new();
        encoder.encode(&first, &mut dst1);
        assert!(encoder.dynamic_table_size() <= 256);

        let second = headers(&[
            (":status", "200"),
            ("cache-control", "private"),
            ("date", "Mon, 21 Oct 2013 20:13:21 GMT"),
            ("location", "https://www.example.com"),
        ]);
        let mut dst2 = BinaryMut::new();
        encoder.encode(&second, &mut dst2);
        assert!(encoder.dynamic_table_size() <= 256);

        let third = headers(&[
            (":status", "200"),
            ("cache-control", "private"),
            ("date", "Mon, 21 Oct 2013 20:13:21 GMT"),
            ("location", "https://www.example.com"),
            ("set-cookie", "a-rather-long-cookie-value-to-force-eviction"),
        ]);
        let mut dst3 = BinaryMut::new();
        encoder.encode(&third, &mut dst3);
        assert!(encoder.dynamic_table_size() <= 256);

        // Every surviving reference set entry must still point at a live
        // dynamic-table slot; eviction along the way must have dropped the
        // rest synchronously rather than leaving dangling ids behind.
        for id in encoder.reference_set().iter() {
            assert!(encoder.dynamic_table().field_by_id(id).is_some());
        }
    }
}
