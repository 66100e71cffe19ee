// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

//! The HPACK draft-07 static table (Appendix A): 61 immutable entries,
//! process-wide and shared freely, addressed 1-based.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::header::{HeaderField, HeaderName, HeaderValue};

pub const STATIC_TABLE_LEN: usize = 61;

static STATIC_TABLE_RAW: &[(&str, &str)] = &[
    (":authority", ""),
    (":method", "GET"),
    (":method", "POST"),
    (":path", "/"),
    (":path", "/index.html"),
    (":scheme", "http"),
    (":scheme", "https"),
    (":status", "200"),
    (":status", "204"),
    (":status", "206"),
    (":status", "304"),
    (":status", "400"),
    (":status", "404"),
    (":status", "500"),
    ("accept-charset", ""),
    ("accept-encoding", "gzip, deflate"),
    ("accept-language", ""),
    ("accept-ranges", ""),
    ("accept", ""),
    ("access-control-allow-origin", ""),
    ("age", ""),
    ("allow", ""),
    ("authorization", ""),
    ("cache-control", ""),
    ("content-disposition", ""),
    ("content-encoding", ""),
    ("content-language", ""),
    ("content-length", ""),
    ("content-location", ""),
    ("content-range", ""),
    ("content-type", ""),
    ("cookie", ""),
    ("date", ""),
    ("etag", ""),
    ("expect", ""),
    ("expires", ""),
    ("from", ""),
    ("host", ""),
    ("if-match", ""),
    ("if-modified-since", ""),
    ("if-none-match", ""),
    ("if-range", ""),
    ("if-unmodified-since", ""),
    ("last-modified", ""),
    ("link", ""),
    ("location", ""),
    ("max-forwards", ""),
    ("proxy-authenticate", ""),
    ("proxy-authorization", ""),
    ("range", ""),
    ("referer", ""),
    ("refresh", ""),
    ("retry-after", ""),
    ("server", ""),
    ("set-cookie", ""),
    ("strict-transport-security", ""),
    ("transfer-encoding", ""),
    ("user-agent", ""),
    ("vary", ""),
    ("via", ""),
    ("www-authenticate", ""),
];

lazy_static! {
    static ref STATIC_TABLE: Vec<HeaderField> = STATIC_TABLE_RAW
        .iter()
        .map(|&(name, value)| HeaderField::new(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
        .collect();

    /// name -> (value -> 1-based index). Values are looked up first; a
    /// caller with only a name match falls back to the lowest index for
    /// that name (the first row with an empty value, by table layout).
    static ref STATIC_HASH: HashMap<&'static str, HashMap<&'static str, usize>> = {
        let mut h: HashMap<&'static str, HashMap<&'static str, usize>> = HashMap::new();
        for (idx, &(name, value)) in STATIC_TABLE_RAW.iter().enumerate() {
            h.entry(name).or_default().insert(value, idx + 1);
        }
        h
    };

    /// name -> lowest 1-based index with that name, for name-only lookups.
    static ref STATIC_NAME_INDEX: HashMap<&'static str, usize> = {
        let mut h: HashMap<&'static str, usize> = HashMap::new();
        for (idx, &(name, _)) in STATIC_TABLE_RAW.iter().enumerate() {
            h.entry(name).or_insert(idx + 1);
        }
        h
    };
}

/// `entry_at(1..=61)`, 1-based per the combined-addressing convention.
pub fn entry_at(index: usize) -> Option<&'static HeaderField> {
    if index == 0 || index > STATIC_TABLE.len() {
        return None;
    }
    Some(&STATIC_TABLE[index - 1])
}

/// `name_value_lookup(h) -> index | 0`.
pub fn lookup_name_value(name: &str, value: &str) -> usize {
    STATIC_HASH
        .get(name)
        .and_then(|values| values.get(value))
        .copied()
        .unwrap_or(0)
}

/// `name_lookup(name) -> index | 0`, lowest index preferred.
pub fn lookup_name(name: &str) -> usize {
    STATIC_NAME_INDEX.get(name).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_exactly_sixty_one_entries() {
        assert_eq!(STATIC_TABLE.len(), STATIC_TABLE_LEN);
    }

    #[test]
    fn method_get_is_index_two() {
        assert_eq!(lookup_name_value(":method", "GET"), 2);
    }

    #[test]
    fn name_only_lookup_prefers_lowest_index() {
        // ":status" first appears at index 8 (200).
        assert_eq!(lookup_name(":status"), 8);
    }

    #[test]
    fn unknown_name_is_zero() {
        assert_eq!(lookup_name("x-unknown"), 0);
        assert_eq!(lookup_name_value(":method", "PATCH"), 0);
    }
}
