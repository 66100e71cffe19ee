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

/// A header field value, opaque octets as far as HPACK is concerned.
#[derive(Debug, Clone, Eq)]
pub enum HeaderValue {
    Stand(&'static str),
    Value(Vec<u8>),
}

impl HeaderValue {
    pub fn from_static(value: &'static str) -> HeaderValue {
        HeaderValue::Stand(value)
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            HeaderValue::Stand(s) => s.as_bytes(),
            HeaderValue::Value(v) => v.as_slice(),
        }
    }

    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// The `value_len` term of the HPACK entry-size formula (§4.D/E).
    pub fn bytes_len(&self) -> usize {
        self.as_bytes().len()
    }
}

impl TryFrom<&'static str> for HeaderValue {
    type Error = Infallible;

    fn try_from(value: &'static str) -> Result<Self, Self::Error> {
        Ok(HeaderValue::Stand(value))
    }
}

impl TryFrom<String> for HeaderValue {
    type Error = Infallible;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(HeaderValue::Value(value.into_bytes()))
    }
}

impl TryFrom<Vec<u8>> for HeaderValue {
    type Error = Infallible;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Ok(HeaderValue::Value(value))
    }
}

impl TryFrom<&[u8]> for HeaderValue {
    type Error = Infallible;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Ok(HeaderValue::Value(value.to_vec()))
    }
}

impl PartialEq for HeaderValue {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Hash for HeaderValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state)
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
