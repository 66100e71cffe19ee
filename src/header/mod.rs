// Copyright 2022 - 2023 Wenmeng See the COPYRIGHT
// file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//
// Author: tickbh

mod field;
mod name;
mod value;

pub use field::{HeaderField, HeaderList, HEADER_FIELD_OVERHEAD};
pub use name::HeaderName;
pub use value::HeaderValue;
