// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! The HPACK dynamic table: a FIFO of recently-used header fields, bounded
//! by total byte size. New entries are prepended at index 1; eviction takes
//! from the tail.
//!
//! Each entry also carries a generation id that never gets reused, so the
//! reference set (which otherwise has no stable way to name an entry whose
//! relative index shifts on every insertion) can track entries across
//! insertions and be notified synchronously on eviction.

use std::collections::VecDeque;

use crate::header::HeaderField;

use super::static_table;

#[derive(Debug, Clone)]
struct Entry {
    id: u64,
    field: HeaderField,
}

#[derive(Debug, Clone)]
pub struct DynamicTable {
    table: VecDeque<Entry>,
    size: usize,
    max_size: usize,
    next_id: u64,
}

impl DynamicTable {
    pub fn new(max_size: usize) -> DynamicTable {
        DynamicTable {
            table: VecDeque::new(),
            size: 0,
            max_size,
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Inserts `field` at the head of the table, evicting from the tail
    /// until the size invariant holds. Returns the generation id assigned
    /// to the new entry, or `None` if the entry alone exceeds `max_size`
    /// (in which case the table is cleared and nothing is stored, per the
    /// HPACK spec).
    ///
    /// `on_evict` is called with the id of every entry evicted in the
    /// process, so a reference set can drop dangling references.
    pub fn add<F: FnMut(u64)>(&mut self, field: HeaderField, mut on_evict: F) -> Option<u64> {
        let entry_size = field.size();
        if entry_size > self.max_size {
            for entry in self.table.drain(..) {
                on_evict(entry.id);
            }
            self.size = 0;
            return None;
        }

        while self.size + entry_size > self.max_size {
            let evicted = self.table.pop_back().expect("size > 0 implies entries remain");
            self.size -= evicted.field.size();
            on_evict(evicted.id);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.size += entry_size;
        self.table.push_front(Entry { id, field });
        Some(id)
    }

    /// Shrinks (or grows) the bound, evicting from the tail as needed.
    pub fn resize<F: FnMut(u64)>(&mut self, new_max_size: usize, mut on_evict: F) {
        self.max_size = new_max_size;
        while self.size > self.max_size {
            let evicted = self.table.pop_back().expect("size > 0 implies entries remain");
            self.size -= evicted.field.size();
            on_evict(evicted.id);
        }
    }

    /// 0-based relative position, most-recently-inserted first.
    fn position_of(&self, id: u64) -> Option<usize> {
        self.table.iter().position(|e| e.id == id)
    }

    /// Resolves a generation id to its current header field, if still live.
    pub fn field_by_id(&self, id: u64) -> Option<&HeaderField> {
        self.position_of(id).map(|pos| &self.table[pos].field)
    }

    /// 1-based relative index into just the dynamic table (not combined
    /// with the static table).
    pub fn relative_index(&self, id: u64) -> Option<usize> {
        self.position_of(id).map(|pos| pos + 1)
    }

    /// `entry_at(relative_index)`, 1-based, dynamic-table-only addressing.
    pub fn entry_at(&self, relative_index: usize) -> Option<(&HeaderField, u64)> {
        if relative_index == 0 {
            return None;
        }
        self.table
            .get(relative_index - 1)
            .map(|e| (&e.field, e.id))
    }

    /// Finds a structurally-equal field anywhere in the dynamic table,
    /// returning its generation id and 1-based relative index.
    pub fn find(&self, name: &str, value: &str) -> Option<(u64, usize)> {
        self.table
            .iter()
            .enumerate()
            .find(|(_, e)| e.field.name.as_bytes() == name.as_bytes() && e.field.value.as_bytes() == value.as_bytes())
            .map(|(pos, e)| (e.id, pos + 1))
    }

    pub fn find_name(&self, name: &str) -> Option<(u64, usize)> {
        self.table
            .iter()
            .enumerate()
            .find(|(_, e)| e.field.name.as_bytes() == name.as_bytes())
            .map(|(pos, e)| (e.id, pos + 1))
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderField> {
        self.table.iter().map(|e| &e.field)
    }
}

/// Combined addressing over dynamic-then-static, 1-based: index `i` refers
/// to `dynamic[i - 1]` when `i <= dynamic.len()`, else `static[i - 1 -
/// dynamic.len()]`.
pub fn entry_at_combined(dynamic: &DynamicTable, index: usize) -> Option<HeaderField> {
    if index == 0 {
        return None;
    }
    if index <= dynamic.len() {
        return dynamic.entry_at(index).map(|(f, _)| f.clone());
    }
    static_table::entry_at(index - dynamic.len()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{HeaderName, HeaderValue};

    fn field(name: &'static str, value: &'static str) -> HeaderField {
        HeaderField::new(HeaderName::from_static(name), HeaderValue::from_static(value))
    }

    #[test]
    fn insertion_prepends_and_evicts_from_tail() {
        let mut table = DynamicTable::new(256);
        let mut evicted = Vec::new();
        table.add(field("name1", "value1"), |id| evicted.push(id));
        table.add(field("name2", "value2"), |id| evicted.push(id));
        assert_eq!(table.entry_at(1).unwrap().0.name.as_bytes(), b"name2");
        assert_eq!(table.entry_at(2).unwrap().0.name.as_bytes(), b"name1");
        assert!(evicted.is_empty());
    }

    #[test]
    fn size_bound_is_respected_on_overflow() {
        // Each field costs name+value+32; pick sizes that force eviction.
        let mut table = DynamicTable::new(70);
        table.add(field("a", "1"), |_| {});
        assert_eq!(table.size(), 34);
        // second entry (34 bytes) would bring total to 68, still fits
        table.add(field("b", "2"), |_| {});
        assert_eq!(table.len(), 2);
        // third entry forces eviction of the oldest ("a")
        let mut evicted = Vec::new();
        table.add(field("c", "3"), |id| evicted.push(id));
        assert_eq!(table.len(), 2);
        assert_eq!(evicted.len(), 1);
        assert!(table.size() <= table.max_size());
    }

    #[test]
    fn entry_larger_than_max_size_clears_table_and_is_not_stored() {
        let mut table = DynamicTable::new(40);
        table.add(field("a", "1"), |_| {});
        assert_eq!(table.len(), 1);
        let mut evicted = Vec::new();
        let id = table.add(field("very-long-name", "and-a-long-value-too"), |i| evicted.push(i));
        assert!(id.is_none());
        assert_eq!(table.len(), 0);
        assert_eq!(table.size(), 0);
        assert_eq!(evicted.len(), 1);
    }

    #[test]
    fn resize_evicts_from_tail_until_within_bound() {
        let mut table = DynamicTable::new(256);
        table.add(field("name1", "value1"), |_| {});
        table.add(field("name2", "value2"), |_| {});
        let mut evicted = Vec::new();
        table.resize(34, |id| evicted.push(id));
        assert_eq!(table.len(), 1);
        assert_eq!(evicted.len(), 1);
        assert!(table.size() <= 34);
    }
}
