// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::opaque::OpaqueCell;
use crate::ordered_float::OrderedF64;
use std::fmt::{Display, Formatter};

/// A single table cell, represented as a native Rust type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// Value is not defined (think null in common programming languages)
    Undefined,
    /// A boolean: true or false.
    Bool(bool),
    /// An 8-byte signed integer
    Int(i64),
    /// An 8-byte floating point
    Float(OrderedF64),
    /// A UTF-8 encoded text.
    Text(String),
    /// An externally defined value the engine carries but never interprets.
    Opaque(OpaqueCell),
}

impl Value {
    pub fn undefined() -> Self {
        Value::Undefined
    }

    pub fn bool(v: impl Into<bool>) -> Self {
        Value::Bool(v.into())
    }

    pub fn int(v: impl Into<i64>) -> Self {
        Value::Int(v.into())
    }

    /// NaN has no place in an ordered column and collapses to undefined.
    pub fn float(v: impl Into<f64>) -> Self {
        OrderedF64::try_from(v.into()).map(Value::Float).unwrap_or(Value::Undefined)
    }

    pub fn text(v: impl Into<String>) -> Self {
        Value::Text(v.into())
    }

    pub fn opaque(v: OpaqueCell) -> Self {
        Value::Opaque(v)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(v.value()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Bool(true) => f.write_str("true"),
            Value::Bool(false) => f.write_str("false"),
            Value::Int(value) => Display::fmt(value, f),
            Value::Float(value) => Display::fmt(value, f),
            Value::Text(value) => Display::fmt(value, f),
            Value::Opaque(value) => write!(f, "<{} {:x}>", value.kind(), value.identity()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<OpaqueCell> for Value {
    fn from(v: OpaqueCell) -> Self {
        Value::Opaque(v)
    }
}
