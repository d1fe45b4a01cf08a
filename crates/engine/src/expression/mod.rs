// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::table::TableId;
use peaktable_type::Value;
use std::fmt;
use std::fmt::{Display, Formatter};

pub use context::{ColumnBinding, EvaluationContext};
pub use evaluate::{Evaluated, evaluate};
pub use function::Function;

mod build;
mod context;
mod evaluate;
mod fastpath;
mod function;

pub use build::{cos, exp, log, sin, sqrt};

/// A lazy query expression. Expressions are immutable, cheap to clone and
/// hold no table data, only the identity of the table a column reference
/// came from.
#[derive(Debug, Clone)]
pub enum Expression {
    Constant(ConstantExpression),

    Column(ColumnExpression),

    Compare(CompareExpression),

    Arith(ArithExpression),

    Logic(LogicExpression),

    Call(CallExpression),
}

#[derive(Debug, Clone)]
pub struct ConstantExpression {
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct ColumnExpression {
    pub table: TableId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CompareExpression {
    pub op: CompareOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone)]
pub struct ArithExpression {
    pub op: ArithOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone)]
pub struct LogicExpression {
    pub op: LogicOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone)]
pub struct CallExpression {
    pub function: Function,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    /// The operator seen from the other side: `literal OP column` is
    /// evaluated as `column flip(OP) literal`.
    pub(crate) fn flip(&self) -> CompareOp {
        match self {
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ne => CompareOp::Ne,
        }
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Lt => f.write_str("<"),
            CompareOp::Le => f.write_str("<="),
            CompareOp::Gt => f.write_str(">"),
            CompareOp::Ge => f.write_str(">="),
            CompareOp::Eq => f.write_str("=="),
            CompareOp::Ne => f.write_str("!="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl Display for ArithOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ArithOp::Add => f.write_str("+"),
            ArithOp::Sub => f.write_str("-"),
            ArithOp::Mul => f.write_str("*"),
            ArithOp::Div => f.write_str("/"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Xor,
}

impl Display for LogicOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LogicOp::And => f.write_str("&"),
            LogicOp::Or => f.write_str("|"),
            LogicOp::Xor => f.write_str("^"),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(expr) => match &expr.value {
                Value::Text(text) => write!(f, "\"{}\"", text),
                value => Display::fmt(value, f),
            },
            Expression::Column(expr) => write!(f, "{}.{}", expr.table, expr.name),
            Expression::Compare(expr) => write!(f, "({} {} {})", expr.left, expr.op, expr.right),
            Expression::Arith(expr) => write!(f, "({} {} {})", expr.left, expr.op, expr.right),
            Expression::Logic(expr) => write!(f, "({} {} {})", expr.left, expr.op, expr.right),
            Expression::Call(expr) => {
                write!(f, "{}(", expr.function)?;
                for (i, arg) in expr.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    Display::fmt(arg, f)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Expression {
    /// Every (table, column) pair this expression reads. The evaluation
    /// context is built from exactly these, and they are validated before
    /// any row is processed.
    pub fn needed_columns(&self) -> Vec<(TableId, String)> {
        let mut needed = Vec::new();
        self.collect_columns(&mut needed);
        needed
    }

    fn collect_columns(&self, into: &mut Vec<(TableId, String)>) {
        match self {
            Expression::Constant(_) => {}
            Expression::Column(expr) => into.push((expr.table, expr.name.clone())),
            Expression::Compare(expr) => {
                expr.left.collect_columns(into);
                expr.right.collect_columns(into);
            }
            Expression::Arith(expr) => {
                expr.left.collect_columns(into);
                expr.right.collect_columns(into);
            }
            Expression::Logic(expr) => {
                expr.left.collect_columns(into);
                expr.right.collect_columns(into);
            }
            Expression::Call(expr) => {
                for arg in &expr.args {
                    arg.collect_columns(into);
                }
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
pub(crate) enum JoinSide {
    Left,
    Right,
}

impl Expression {
    /// Disambiguates a self-join expression: references on the left-hand
    /// side of a comparison bind to the current left row, everything else
    /// binds to the right table (which gets the fresh `right` identity).
    pub(crate) fn bind_join_sides(
        &self,
        shared: TableId,
        right: TableId,
        side: JoinSide,
    ) -> Expression {
        match self {
            Expression::Constant(expr) => Expression::Constant(expr.clone()),
            Expression::Column(expr) => {
                if expr.table == shared && side == JoinSide::Right {
                    Expression::Column(ColumnExpression { table: right, name: expr.name.clone() })
                } else {
                    Expression::Column(expr.clone())
                }
            }
            Expression::Compare(expr) => Expression::Compare(CompareExpression {
                op: expr.op,
                left: Box::new(expr.left.bind_join_sides(shared, right, JoinSide::Left)),
                right: Box::new(expr.right.bind_join_sides(shared, right, JoinSide::Right)),
            }),
            Expression::Arith(expr) => Expression::Arith(ArithExpression {
                op: expr.op,
                left: Box::new(expr.left.bind_join_sides(shared, right, side)),
                right: Box::new(expr.right.bind_join_sides(shared, right, side)),
            }),
            Expression::Logic(expr) => Expression::Logic(LogicExpression {
                op: expr.op,
                left: Box::new(expr.left.bind_join_sides(shared, right, side)),
                right: Box::new(expr.right.bind_join_sides(shared, right, side)),
            }),
            Expression::Call(expr) => Expression::Call(CallExpression {
                function: expr.function,
                args: expr
                    .args
                    .iter()
                    .map(|arg| arg.bind_join_sides(shared, right, side))
                    .collect(),
            }),
        }
    }
}
