// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use std::fmt::{Display, Formatter};

/// NaN can not be ordered and is therefore rejected at construction.
#[derive(Debug, PartialEq)]
pub struct OrderedFloatError;

impl Display for OrderedFloatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("NaN is not an ordered float")
    }
}

impl std::error::Error for OrderedFloatError {}
