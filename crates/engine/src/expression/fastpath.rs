// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::expression::CompareOp;
use peaktable_type::{Type, Value, compare_total};
use std::cmp::Ordering;

/// The fast path only fires where its mask is guaranteed to agree with the
/// elementwise comparison: defined, non-opaque targets, and for ordering
/// operators a target living in the column's domain (equality across
/// domains is decidable either way, an ordering is not).
pub(crate) fn applicable(op: CompareOp, column_ty: Type, target: &Value) -> bool {
    if target.is_undefined() || matches!(target, Value::Opaque(_)) {
        return false;
    }
    if matches!(column_ty, Type::Opaque | Type::Undefined) {
        return false;
    }
    match op {
        CompareOp::Eq | CompareOp::Ne => true,
        _ => domain_compatible(column_ty, target),
    }
}

fn domain_compatible(ty: Type, target: &Value) -> bool {
    matches!(
        (ty, target),
        (Type::Int | Type::Float, Value::Int(_) | Value::Float(_))
            | (Type::Text, Value::Text(_))
            | (Type::Bool, Value::Bool(_))
    )
}

/// Answers `values OP target` over a column sorted ascending in the total
/// cell order (undefined cells lead). Two binary searches give the bounds;
/// every operator's mask is one contiguous range, or its complement for
/// `!=`. Undefined cells stay undefined in the mask, exactly as the
/// elementwise comparison leaves them.
pub(crate) fn sorted_compare(op: CompareOp, values: &[Value], target: &Value) -> Vec<Value> {
    let n = values.len();
    let start = values.partition_point(|v| v.is_undefined());
    let defined = &values[start..];
    let lower = start + defined.partition_point(|v| compare_total(v, target) == Ordering::Less);
    let upper = start + defined.partition_point(|v| compare_total(v, target) != Ordering::Greater);

    let (range_start, range_end, negate) = match op {
        CompareOp::Lt => (start, lower, false),
        CompareOp::Le => (start, upper, false),
        CompareOp::Gt => (upper, n, false),
        CompareOp::Ge => (lower, n, false),
        CompareOp::Eq => (lower, upper, false),
        CompareOp::Ne => (lower, upper, true),
    };

    let mut mask = Vec::with_capacity(n);
    for i in 0..n {
        if i < start {
            mask.push(Value::Undefined);
        } else {
            let inside = i >= range_start && i < range_end;
            mask.push(Value::Bool(inside != negate));
        }
    }
    mask
}
