// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::expression::{
    ArithExpression, ArithOp, CallExpression, CompareExpression, CompareOp, ConstantExpression,
    Expression, Function, LogicExpression, LogicOp,
};
use peaktable_type::Value;
use std::ops;

impl Expression {
    pub fn constant(value: impl Into<Value>) -> Expression {
        Expression::Constant(ConstantExpression { value: value.into() })
    }

    fn compare(self, op: CompareOp, other: impl Into<Expression>) -> Expression {
        Expression::Compare(CompareExpression {
            op,
            left: Box::new(self),
            right: Box::new(other.into()),
        })
    }

    fn logic(self, op: LogicOp, other: impl Into<Expression>) -> Expression {
        Expression::Logic(LogicExpression {
            op,
            left: Box::new(self),
            right: Box::new(other.into()),
        })
    }

    fn arith(self, op: ArithOp, other: impl Into<Expression>) -> Expression {
        Expression::Arith(ArithExpression {
            op,
            left: Box::new(self),
            right: Box::new(other.into()),
        })
    }

    pub fn call(function: Function, args: Vec<Expression>) -> Expression {
        Expression::Call(CallExpression { function, args })
    }

    pub fn lt(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::Lt, other)
    }

    pub fn le(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::Le, other)
    }

    pub fn gt(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::Gt, other)
    }

    pub fn ge(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::Ge, other)
    }

    pub fn eq(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::Eq, other)
    }

    pub fn ne(self, other: impl Into<Expression>) -> Expression {
        self.compare(CompareOp::Ne, other)
    }

    pub fn and(self, other: impl Into<Expression>) -> Expression {
        self.logic(LogicOp::And, other)
    }

    pub fn or(self, other: impl Into<Expression>) -> Expression {
        self.logic(LogicOp::Or, other)
    }

    pub fn xor(self, other: impl Into<Expression>) -> Expression {
        self.logic(LogicOp::Xor, other)
    }

    pub fn contains(self, other: impl Into<Expression>) -> Expression {
        Expression::call(Function::Contains, vec![self, other.into()])
    }

    pub fn starts_with(self, other: impl Into<Expression>) -> Expression {
        Expression::call(Function::StartsWith, vec![self, other.into()])
    }

    pub fn ends_with(self, other: impl Into<Expression>) -> Expression {
        Expression::call(Function::EndsWith, vec![self, other.into()])
    }

    pub fn sum(self) -> Expression {
        Expression::call(Function::Sum, vec![self])
    }

    pub fn mean(self) -> Expression {
        Expression::call(Function::Mean, vec![self])
    }

    pub fn min(self) -> Expression {
        Expression::call(Function::Min, vec![self])
    }

    pub fn max(self) -> Expression {
        Expression::call(Function::Max, vec![self])
    }

    /// Number of defined cells.
    pub fn count(self) -> Expression {
        Expression::call(Function::Count, vec![self])
    }

    /// Number of cells, defined or not.
    pub fn count_all(self) -> Expression {
        Expression::call(Function::Len, vec![self])
    }
}

pub fn log(expr: impl Into<Expression>) -> Expression {
    Expression::call(Function::Log, vec![expr.into()])
}

pub fn exp(expr: impl Into<Expression>) -> Expression {
    Expression::call(Function::Exp, vec![expr.into()])
}

pub fn sin(expr: impl Into<Expression>) -> Expression {
    Expression::call(Function::Sin, vec![expr.into()])
}

pub fn cos(expr: impl Into<Expression>) -> Expression {
    Expression::call(Function::Cos, vec![expr.into()])
}

pub fn sqrt(expr: impl Into<Expression>) -> Expression {
    Expression::call(Function::Sqrt, vec![expr.into()])
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::constant(value)
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        Expression::constant(value)
    }
}

impl From<i32> for Expression {
    fn from(value: i32) -> Self {
        Expression::constant(value)
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Expression::constant(value)
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::constant(value)
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Expression::constant(value)
    }
}

impl From<String> for Expression {
    fn from(value: String) -> Self {
        Expression::constant(value)
    }
}

impl<R: Into<Expression>> ops::Add<R> for Expression {
    type Output = Expression;

    fn add(self, rhs: R) -> Expression {
        self.arith(ArithOp::Add, rhs)
    }
}

impl<R: Into<Expression>> ops::Sub<R> for Expression {
    type Output = Expression;

    fn sub(self, rhs: R) -> Expression {
        self.arith(ArithOp::Sub, rhs)
    }
}

impl<R: Into<Expression>> ops::Mul<R> for Expression {
    type Output = Expression;

    fn mul(self, rhs: R) -> Expression {
        self.arith(ArithOp::Mul, rhs)
    }
}

impl<R: Into<Expression>> ops::Div<R> for Expression {
    type Output = Expression;

    fn div(self, rhs: R) -> Expression {
        self.arith(ArithOp::Div, rhs)
    }
}

impl<R: Into<Expression>> ops::BitAnd<R> for Expression {
    type Output = Expression;

    fn bitand(self, rhs: R) -> Expression {
        self.and(rhs)
    }
}

impl<R: Into<Expression>> ops::BitOr<R> for Expression {
    type Output = Expression;

    fn bitor(self, rhs: R) -> Expression {
        self.or(rhs)
    }
}

impl<R: Into<Expression>> ops::BitXor<R> for Expression {
    type Output = Expression;

    fn bitxor(self, rhs: R) -> Expression {
        self.xor(rhs)
    }
}
