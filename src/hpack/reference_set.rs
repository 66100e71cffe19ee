// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! HPACK draft-07's reference set: entries considered "already emitted" on
//! the connection, carried over across header blocks to compress away
//! redundancy between consecutive requests/responses. Dropped from the
//! final HPACK spec (RFC 7541); still required by draft-07, which this
//! codec targets.

use std::collections::HashSet;

use super::dynamic_table::DynamicTable;

#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    ids: HashSet<u64>,
}

impl ReferenceSet {
    pub fn new() -> ReferenceSet {
        ReferenceSet { ids: HashSet::new() }
    }

    pub fn add(&mut self, id: u64) {
        self.ids.insert(id);
    }

    pub fn remove(&mut self, id: u64) {
        self.ids.remove(&id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.ids.iter().copied()
    }

    /// Scans the reference set for an entry structurally equal to
    /// `(name, value)`, resolving each id against `table`.
    pub fn find(&self, table: &DynamicTable, name: &str, value: &str) -> Option<u64> {
        self.ids.iter().copied().find(|&id| {
            table
                .field_by_id(id)
                .map(|f| f.name.as_bytes() == name.as_bytes() && f.value.as_bytes() == value.as_bytes())
                .unwrap_or(false)
        })
    }

    /// Called by the dynamic table on eviction: the invariant is that every
    /// contained reference points to a live entry, so an evicted id must be
    /// dropped synchronously.
    pub fn on_evict(&mut self, id: u64) {
        self.ids.remove(&id);
    }
}
