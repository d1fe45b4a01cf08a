// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use peaktable_type::{Value, compare_total};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Elementwise functions, string predicates and aggregate reducers usable
/// in expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Log,
    Exp,
    Sin,
    Cos,
    Sqrt,
    Contains,
    StartsWith,
    EndsWith,
    Sum,
    Mean,
    Min,
    Max,
    Count,
    Len,
}

impl Function {
    /// Aggregates reduce a whole column to one value; everything else maps
    /// elementwise.
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Function::Sum
                | Function::Mean
                | Function::Min
                | Function::Max
                | Function::Count
                | Function::Len
        )
    }

    pub(crate) fn arity(&self) -> usize {
        match self {
            Function::Contains | Function::StartsWith | Function::EndsWith => 2,
            _ => 1,
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Function::Log => f.write_str("log"),
            Function::Exp => f.write_str("exp"),
            Function::Sin => f.write_str("sin"),
            Function::Cos => f.write_str("cos"),
            Function::Sqrt => f.write_str("sqrt"),
            Function::Contains => f.write_str("contains"),
            Function::StartsWith => f.write_str("startswith"),
            Function::EndsWith => f.write_str("endswith"),
            Function::Sum => f.write_str("sum"),
            Function::Mean => f.write_str("mean"),
            Function::Min => f.write_str("min"),
            Function::Max => f.write_str("max"),
            Function::Count => f.write_str("count"),
            Function::Len => f.write_str("len"),
        }
    }
}

/// One elementwise math application. Undefined and non-numeric input, as
/// well as NaN results, come out as undefined.
pub(crate) fn apply_math(function: Function, value: &Value) -> Value {
    let Some(v) = value.as_f64() else {
        return Value::Undefined;
    };
    let result = match function {
        Function::Log => v.ln(),
        Function::Exp => v.exp(),
        Function::Sin => v.sin(),
        Function::Cos => v.cos(),
        Function::Sqrt => v.sqrt(),
        _ => unreachable!("not an elementwise math function"),
    };
    Value::float(result)
}

/// One string predicate application, three-valued over undefined input.
pub(crate) fn apply_text_predicate(function: Function, value: &Value, pattern: &Value) -> Value {
    match (value, pattern) {
        (Value::Text(v), Value::Text(p)) => {
            let hit = match function {
                Function::Contains => v.contains(p.as_str()),
                Function::StartsWith => v.starts_with(p.as_str()),
                Function::EndsWith => v.ends_with(p.as_str()),
                _ => unreachable!("not a text predicate"),
            };
            Value::Bool(hit)
        }
        _ => Value::Undefined,
    }
}

/// Reduces a column of values to a single cell. Undefined cells are
/// ignored by every reducer except `Len`; an empty or all-undefined input
/// reduces to undefined (except for the two counters).
pub(crate) fn reduce(function: Function, values: &[Value]) -> Value {
    match function {
        Function::Count => {
            return Value::Int(values.iter().filter(|v| !v.is_undefined()).count() as i64);
        }
        Function::Len => return Value::Int(values.len() as i64),
        _ => {}
    }

    let defined = values.iter().filter(|v| !v.is_undefined());
    match function {
        Function::Min => {
            defined.min_by(|a, b| compare_total(a, b)).cloned().unwrap_or(Value::Undefined)
        }
        Function::Max => {
            defined.max_by(|a, b| compare_total(a, b)).cloned().unwrap_or(Value::Undefined)
        }
        Function::Sum => sum(defined),
        Function::Mean => mean(defined),
        _ => unreachable!("not an aggregate function"),
    }
}

fn sum<'a>(values: impl Iterator<Item = &'a Value>) -> Value {
    let mut int_sum = 0i64;
    let mut float_sum = 0.0f64;
    let mut float = false;
    let mut any = false;
    for value in values {
        any = true;
        match value {
            Value::Int(v) => {
                float_sum += *v as f64;
                match int_sum.checked_add(*v) {
                    Some(s) => int_sum = s,
                    None => float = true,
                }
            }
            Value::Float(v) => {
                float = true;
                float_sum += v.value();
            }
            _ => return Value::Undefined,
        }
    }
    if !any {
        Value::Undefined
    } else if float {
        Value::float(float_sum)
    } else {
        Value::Int(int_sum)
    }
}

fn mean<'a>(values: impl Iterator<Item = &'a Value>) -> Value {
    let mut total = 0.0f64;
    let mut count = 0usize;
    for value in values {
        match value.as_f64() {
            Some(v) => {
                total += v;
                count += 1;
            }
            None => return Value::Undefined,
        }
    }
    if count == 0 { Value::Undefined } else { Value::float(total / count as f64) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_ints_stays_int() {
        let values = vec![Value::Int(1), Value::Undefined, Value::Int(2)];
        assert_eq!(reduce(Function::Sum, &values), Value::Int(3));
    }

    #[test]
    fn test_sum_mixed_widens() {
        let values = vec![Value::Int(1), Value::float(0.5)];
        assert_eq!(reduce(Function::Sum, &values), Value::float(1.5));
    }

    #[test]
    fn test_mean_skips_undefined() {
        let values = vec![Value::float(1.0), Value::Undefined, Value::float(3.0)];
        assert_eq!(reduce(Function::Mean, &values), Value::float(2.0));
    }

    #[test]
    fn test_count_and_len() {
        let values = vec![Value::Int(1), Value::Undefined];
        assert_eq!(reduce(Function::Count, &values), Value::Int(1));
        assert_eq!(reduce(Function::Len, &values), Value::Int(2));
    }

    #[test]
    fn test_min_max() {
        let values = vec![Value::Int(3), Value::Int(1), Value::Undefined, Value::Int(2)];
        assert_eq!(reduce(Function::Min, &values), Value::Int(1));
        assert_eq!(reduce(Function::Max, &values), Value::Int(3));
    }

    #[test]
    fn test_empty_aggregates_to_undefined() {
        assert_eq!(reduce(Function::Sum, &[]), Value::Undefined);
        assert_eq!(reduce(Function::Count, &[]), Value::Int(0));
    }

    #[test]
    fn test_sum_of_text_is_undefined() {
        let values = vec![Value::text("a")];
        assert_eq!(reduce(Function::Sum, &values), Value::Undefined);
    }

    #[test]
    fn test_math_on_undefined() {
        assert_eq!(apply_math(Function::Log, &Value::Undefined), Value::Undefined);
        assert_eq!(apply_math(Function::Sqrt, &Value::float(-1.0)), Value::Undefined);
        assert_eq!(apply_math(Function::Sqrt, &Value::float(4.0)), Value::float(2.0));
    }

    #[test]
    fn test_text_predicates() {
        assert_eq!(
            apply_text_predicate(Function::StartsWith, &Value::text("abc"), &Value::text("ab")),
            Value::Bool(true)
        );
        assert_eq!(
            apply_text_predicate(Function::Contains, &Value::text("abc"), &Value::Undefined),
            Value::Undefined
        );
    }
}
