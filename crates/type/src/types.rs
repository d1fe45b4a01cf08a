// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// All possible column types
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// A boolean: true or false.
    Bool,
    /// An 8-byte signed integer
    Int,
    /// An 8-byte floating point
    Float,
    /// A UTF-8 encoded text.
    Text,
    /// An externally defined value, carried but never interpreted.
    Opaque,
    /// Type is not defined yet (a column holding only undefined cells)
    Undefined,
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Bool => f.write_str("BOOL"),
            Type::Int => f.write_str("INT"),
            Type::Float => f.write_str("FLOAT"),
            Type::Text => f.write_str("TEXT"),
            Type::Opaque => f.write_str("OPAQUE"),
            Type::Undefined => f.write_str("UNDEFINED"),
        }
    }
}

impl From<&Value> for Type {
    fn from(value: &Value) -> Self {
        match value {
            Value::Undefined => Type::Undefined,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Text(_) => Type::Text,
            Value::Opaque(_) => Type::Opaque,
        }
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("value '{value}' of type {found} can not be stored in a {expected} column")]
    Incompatible { value: String, found: Type, expected: Type },

    #[error("no common type for {left} and {right}")]
    NoCommonType { left: Type, right: Type },
}

impl Type {
    /// The narrowest type able to hold all given values, ignoring undefined
    /// cells. Int widens to Float when the two are mixed.
    pub fn common_of<'a>(values: impl IntoIterator<Item = &'a Value>) -> Result<Type, TypeError> {
        let mut common = Type::Undefined;
        for value in values {
            let ty = Type::from(value);
            common = Type::merge(common, ty)?;
        }
        Ok(common)
    }

    fn merge(left: Type, right: Type) -> Result<Type, TypeError> {
        use Type::*;
        match (left, right) {
            (Undefined, t) | (t, Undefined) => Ok(t),
            (l, r) if l == r => Ok(l),
            (Int, Float) | (Float, Int) => Ok(Float),
            (l, r) => Err(TypeError::NoCommonType { left: l, right: r }),
        }
    }

    /// Checked conversion of a cell into this column type. Undefined passes
    /// through, Int widens into Float columns, Opaque columns accept
    /// anything.
    pub fn coerce(&self, value: Value) -> Result<Value, TypeError> {
        match (self, value) {
            (_, Value::Undefined) => Ok(Value::Undefined),
            (Type::Opaque, value) => Ok(value),
            (Type::Bool, Value::Bool(v)) => Ok(Value::Bool(v)),
            (Type::Int, Value::Int(v)) => Ok(Value::Int(v)),
            (Type::Float, Value::Float(v)) => Ok(Value::Float(v)),
            (Type::Float, Value::Int(v)) => Ok(Value::float(v as f64)),
            (Type::Text, Value::Text(v)) => Ok(Value::Text(v)),
            (expected, value) => Err(TypeError::Incompatible {
                found: Type::from(&value),
                value: value.to_string(),
                expected: *expected,
            }),
        }
    }
}
