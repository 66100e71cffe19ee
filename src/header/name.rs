// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

use std::{convert::Infallible, fmt, hash::{Hash, Hasher}};

/// A header field name. Stored either as a `'static` literal (the static
/// table and common callers construct names this way with zero allocation)
/// or as owned bytes decoded off the wire.
#[derive(Debug, Clone, Eq)]
pub enum HeaderName {
    Stand(&'static str),
    Value(Vec<u8>),
}

impl HeaderName {
    pub fn from_static(name: &'static str) -> HeaderName {
        HeaderName::Stand(name)
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            HeaderName::Stand(s) => s.as_bytes(),
            HeaderName::Value(v) => v.as_slice(),
        }
    }

    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// The `name_len` term of the HPACK entry-size formula (§4.D/E).
    pub fn bytes_len(&self) -> usize {
        self.as_bytes().len()
    }
}

impl TryFrom<&'static str> for HeaderName {
    type Error = Infallible;

    fn try_from(value: &'static str) -> Result<Self, Self::Error> {
        Ok(HeaderName::Stand(value))
    }
}

impl TryFrom<String> for HeaderName {
    type Error = Infallible;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(HeaderName::Value(value.into_bytes()))
    }
}

impl TryFrom<Vec<u8>> for HeaderName {
    type Error = Infallible;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Ok(HeaderName::Value(value))
    }
}

impl TryFrom<&[u8]> for HeaderName {
    type Error = Infallible;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Ok(HeaderName::Value(value.to_vec()))
    }
}

impl PartialEq for HeaderName {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Hash for HeaderName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state)
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
