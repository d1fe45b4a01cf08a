// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::EvaluationError;
use crate::expression::context::Binding;
use crate::expression::function::{apply_math, apply_text_predicate, reduce};
use crate::expression::{
    CallExpression, ColumnExpression, CompareExpression, CompareOp, ConstantExpression,
    EvaluationContext, Expression, Function, LogicOp, fastpath,
};
use peaktable_type::{Type, Value, compare_values, value_eq};
use std::cmp::Ordering;

/// The outcome of one evaluation. `Scalar` broadcasts against columns of
/// any size; a one-element `Vector` is a genuine size-1 result and keeps
/// its length.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    Scalar(Value),
    Vector(Vec<Value>),
}

impl Evaluated {
    /// None for scalars, the element count for vectors.
    pub fn size(&self) -> Option<usize> {
        match self {
            Evaluated::Scalar(_) => None,
            Evaluated::Vector(values) => Some(values.len()),
        }
    }

    pub fn into_values(self) -> Vec<Value> {
        match self {
            Evaluated::Scalar(value) => vec![value],
            Evaluated::Vector(values) => values,
        }
    }
}

/// Evaluates an expression against bound columns. Pure: neither the
/// expression nor the context is modified, and re-evaluation yields the
/// same result.
pub fn evaluate(expr: &Expression, ctx: &EvaluationContext) -> crate::Result<Evaluated> {
    match expr {
        Expression::Constant(constant) => Ok(Evaluated::Scalar(constant.value.clone())),
        Expression::Column(column) => evaluate_column(column, ctx),
        Expression::Compare(compare) => evaluate_compare(compare, ctx),
        Expression::Arith(arith) => {
            let left = evaluate(&arith.left, ctx)?;
            let right = evaluate(&arith.right, ctx)?;
            broadcast(left, right, |a, b| Ok(arith_cell(arith.op, a, b)))
        }
        Expression::Logic(logic) => evaluate_logic(logic, ctx),
        Expression::Call(call) => evaluate_call(call, ctx),
    }
}

fn evaluate_column(column: &ColumnExpression, ctx: &EvaluationContext) -> crate::Result<Evaluated> {
    let binding = ctx
        .get(column.table, &column.name)
        .ok_or_else(|| EvaluationError::UnboundColumn { column: column.name.clone() })?;
    match &binding.values {
        Binding::Row(value) => Ok(Evaluated::Scalar(value.clone())),
        Binding::Column(values) => Ok(Evaluated::Vector(values.clone())),
    }
}

fn evaluate_compare(
    compare: &CompareExpression,
    ctx: &EvaluationContext,
) -> crate::Result<Evaluated> {
    // Sorted-column fast path, in both orientations.
    match (compare.left.as_ref(), compare.right.as_ref()) {
        (Expression::Column(column), Expression::Constant(constant)) => {
            if let Some(mask) = try_fast(compare.op, column, constant, ctx) {
                return Ok(mask);
            }
        }
        (Expression::Constant(constant), Expression::Column(column)) => {
            if let Some(mask) = try_fast(compare.op.flip(), column, constant, ctx) {
                return Ok(mask);
            }
        }
        _ => {}
    }

    let left = evaluate(&compare.left, ctx)?;
    let right = evaluate(&compare.right, ctx)?;
    broadcast(left, right, |a, b| Ok(compare_cell(compare.op, a, b)))
}

fn try_fast(
    op: CompareOp,
    column: &ColumnExpression,
    constant: &ConstantExpression,
    ctx: &EvaluationContext,
) -> Option<Evaluated> {
    let binding = ctx.get(column.table, &column.name)?;
    if !binding.sorted || !fastpath::applicable(op, binding.ty, &constant.value) {
        return None;
    }
    match &binding.values {
        Binding::Column(values) => {
            Some(Evaluated::Vector(fastpath::sorted_compare(op, values, &constant.value)))
        }
        Binding::Row(_) => None,
    }
}

fn evaluate_logic(
    logic: &crate::expression::LogicExpression,
    ctx: &EvaluationContext,
) -> crate::Result<Evaluated> {
    let left = evaluate(&logic.left, ctx)?;

    // A scalar false (resp. true) decides `and` (resp. `or`) without
    // looking at the right side; only its size is still needed.
    match (logic.op, &left) {
        (LogicOp::And, Evaluated::Scalar(Value::Bool(false))) => {
            return Ok(filled(size_of(&logic.right, ctx)?, Value::Bool(false)));
        }
        (LogicOp::Or, Evaluated::Scalar(Value::Bool(true))) => {
            return Ok(filled(size_of(&logic.right, ctx)?, Value::Bool(true)));
        }
        _ => {}
    }

    let right = evaluate(&logic.right, ctx)?;
    broadcast(left, right, |a, b| logic_cell(logic.op, a, b))
}

fn evaluate_call(call: &CallExpression, ctx: &EvaluationContext) -> crate::Result<Evaluated> {
    if call.args.len() != call.function.arity() {
        return Err(EvaluationError::FunctionArity {
            function: call.function.to_string(),
            expected: call.function.arity(),
            found: call.args.len(),
        }
        .into());
    }

    if call.function.is_aggregate() {
        let values = evaluate(&call.args[0], ctx)?.into_values();
        return Ok(Evaluated::Scalar(reduce(call.function, &values)));
    }

    match call.function {
        Function::Contains | Function::StartsWith | Function::EndsWith => {
            let value = evaluate(&call.args[0], ctx)?;
            let pattern = evaluate(&call.args[1], ctx)?;
            broadcast(value, pattern, |v, p| Ok(apply_text_predicate(call.function, v, p)))
        }
        function => {
            let child = evaluate(&call.args[0], ctx)?;
            Ok(match child {
                Evaluated::Scalar(value) => Evaluated::Scalar(apply_math(function, &value)),
                Evaluated::Vector(values) => {
                    Evaluated::Vector(values.iter().map(|v| apply_math(function, v)).collect())
                }
            })
        }
    }
}

/// The size an expression will evaluate to, without evaluating it: None for
/// scalars. Used by the logical short-circuit.
pub(crate) fn size_of(expr: &Expression, ctx: &EvaluationContext) -> crate::Result<Option<usize>> {
    match expr {
        Expression::Constant(_) => Ok(None),
        Expression::Column(column) => {
            let binding = ctx
                .get(column.table, &column.name)
                .ok_or_else(|| EvaluationError::UnboundColumn { column: column.name.clone() })?;
            match &binding.values {
                Binding::Row(_) => Ok(None),
                Binding::Column(values) => Ok(Some(values.len())),
            }
        }
        Expression::Compare(e) => combine_sizes(size_of(&e.left, ctx)?, size_of(&e.right, ctx)?),
        Expression::Arith(e) => combine_sizes(size_of(&e.left, ctx)?, size_of(&e.right, ctx)?),
        Expression::Logic(e) => combine_sizes(size_of(&e.left, ctx)?, size_of(&e.right, ctx)?),
        Expression::Call(e) => {
            if e.function.is_aggregate() {
                Ok(None)
            } else if e.args.len() == 2 {
                combine_sizes(size_of(&e.args[0], ctx)?, size_of(&e.args[1], ctx)?)
            } else {
                size_of(&e.args[0], ctx)
            }
        }
    }
}

fn combine_sizes(left: Option<usize>, right: Option<usize>) -> crate::Result<Option<usize>> {
    match (left, right) {
        (None, size) | (size, None) => Ok(size),
        (Some(1), Some(n)) | (Some(n), Some(1)) => Ok(Some(n)),
        (Some(l), Some(r)) if l == r => Ok(Some(l)),
        (Some(l), Some(r)) => Err(EvaluationError::SizeMismatch { left: l, right: r }.into()),
    }
}

fn filled(size: Option<usize>, value: Value) -> Evaluated {
    match size {
        None => Evaluated::Scalar(value),
        Some(n) => Evaluated::Vector(vec![value; n]),
    }
}

/// Elementwise combination with broadcasting: scalars and one-element
/// vectors stretch to the other side's length, unequal vector lengths are
/// a size mismatch.
fn broadcast(
    left: Evaluated,
    right: Evaluated,
    f: impl Fn(&Value, &Value) -> crate::Result<Value>,
) -> crate::Result<Evaluated> {
    match (left, right) {
        (Evaluated::Scalar(a), Evaluated::Scalar(b)) => Ok(Evaluated::Scalar(f(&a, &b)?)),
        (Evaluated::Scalar(a), Evaluated::Vector(bs)) => {
            Ok(Evaluated::Vector(bs.iter().map(|b| f(&a, b)).collect::<crate::Result<_>>()?))
        }
        (Evaluated::Vector(asv), Evaluated::Scalar(b)) => {
            Ok(Evaluated::Vector(asv.iter().map(|a| f(a, &b)).collect::<crate::Result<_>>()?))
        }
        (Evaluated::Vector(asv), Evaluated::Vector(bs)) => {
            if asv.len() == bs.len() {
                Ok(Evaluated::Vector(
                    asv.iter().zip(&bs).map(|(a, b)| f(a, b)).collect::<crate::Result<_>>()?,
                ))
            } else if asv.len() == 1 {
                Ok(Evaluated::Vector(
                    bs.iter().map(|b| f(&asv[0], b)).collect::<crate::Result<_>>()?,
                ))
            } else if bs.len() == 1 {
                Ok(Evaluated::Vector(
                    asv.iter().map(|a| f(a, &bs[0])).collect::<crate::Result<_>>()?,
                ))
            } else {
                Err(EvaluationError::SizeMismatch { left: asv.len(), right: bs.len() }.into())
            }
        }
    }
}

fn compare_cell(op: CompareOp, a: &Value, b: &Value) -> Value {
    match op {
        CompareOp::Eq => match value_eq(a, b) {
            Some(eq) => Value::Bool(eq),
            None => Value::Undefined,
        },
        CompareOp::Ne => match value_eq(a, b) {
            Some(eq) => Value::Bool(!eq),
            None => Value::Undefined,
        },
        _ => match compare_values(a, b) {
            None => Value::Undefined,
            Some(ord) => Value::Bool(match op {
                CompareOp::Lt => ord == Ordering::Less,
                CompareOp::Le => ord != Ordering::Greater,
                CompareOp::Gt => ord == Ordering::Greater,
                CompareOp::Ge => ord != Ordering::Less,
                CompareOp::Eq | CompareOp::Ne => unreachable!(),
            }),
        },
    }
}

fn arith_cell(op: crate::expression::ArithOp, a: &Value, b: &Value) -> Value {
    use crate::expression::ArithOp;

    if a.is_undefined() || b.is_undefined() {
        return Value::Undefined;
    }

    match (a, b) {
        (Value::Int(l), Value::Int(r)) => {
            let result = match op {
                ArithOp::Add => l.checked_add(*r),
                ArithOp::Sub => l.checked_sub(*r),
                ArithOp::Mul => l.checked_mul(*r),
                ArithOp::Div => l.checked_div(*r),
            };
            result.map(Value::Int).unwrap_or(Value::Undefined)
        }
        (Value::Text(l), Value::Text(r)) if op == ArithOp::Add => {
            Value::Text(format!("{}{}", l, r))
        }
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(l), Some(r)) => {
                let result = match op {
                    ArithOp::Add => l + r,
                    ArithOp::Sub => l - r,
                    ArithOp::Mul => l * r,
                    ArithOp::Div => l / r,
                };
                Value::float(result)
            }
            _ => Value::Undefined,
        },
    }
}

fn logic_cell(op: LogicOp, a: &Value, b: &Value) -> crate::Result<Value> {
    if a.is_undefined() || b.is_undefined() {
        return Ok(Value::Undefined);
    }
    match (a.as_bool(), b.as_bool()) {
        (Some(l), Some(r)) => Ok(Value::Bool(match op {
            LogicOp::And => l && r,
            LogicOp::Or => l || r,
            LogicOp::Xor => l != r,
        })),
        (None, _) => Err(EvaluationError::NotBoolean { ty: Type::from(a) }.into()),
        (_, None) => Err(EvaluationError::NotBoolean { ty: Type::from(b) }.into()),
    }
}
