// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::EvaluationError;
use crate::expression::{
    EvaluationContext, Evaluated, Expression, JoinSide, evaluate,
};
use crate::table::postfix::build_join_schema;
use crate::table::{Table, TableId};
use peaktable_type::{Type, Value};
use tracing::debug;

impl Table {
    /// Inner join: the cross product of both tables filtered by `on`,
    /// evaluated once per left row against that row's values (size 1) and
    /// the right table's full columns. Pass `true.into()` for the plain
    /// cross product.
    pub fn join(&self, other: &Table, on: &Expression) -> crate::Result<Table> {
        self.join_inner(other, on, false)
    }

    /// Like `join`, but a left row without any match is still emitted
    /// once, with the right-hand cells undefined.
    pub fn left_join(&self, other: &Table, on: &Expression) -> crate::Result<Table> {
        self.join_inner(other, on, true)
    }

    fn join_inner(&self, other: &Table, on: &Expression, keep_unmatched: bool) -> crate::Result<Table> {
        let mut result = build_join_schema(self, other)?;

        // A self-join needs two identities for the one table: the left
        // occurrence pins the current row, the right occurrence stays a
        // full column. References on the left side of a comparison bind
        // left, everything else binds right.
        let (right_id, on) = if self.id == other.id {
            let right_id = TableId::next();
            (right_id, on.bind_join_sides(self.id, right_id, JoinSide::Right))
        } else {
            (other.id, on.clone())
        };

        let needed = on.needed_columns();
        for (tid, column) in &needed {
            if *tid == self.id {
                self.require_column(column)?;
            } else if *tid == right_id {
                other.require_column(column)?;
            } else {
                return Err(EvaluationError::ForeignTable { column: column.clone() }.into());
            }
        }

        debug!(left = self.len(), right = other.len(), on = %on, "join");

        let mut ctx = EvaluationContext::new();
        ctx.bind_columns(other, right_id, &needed)?;

        let filler = vec![Value::Undefined; other.names.len()];
        let mut rows = Vec::new();
        for left_row in &self.rows {
            ctx.bind_row(self, self.id, left_row, &needed)?;
            let matched = match evaluate(&on, &ctx)? {
                Evaluated::Scalar(value) => self.append_all(&mut rows, left_row, other, &value)?,
                Evaluated::Vector(mask) if mask.len() == 1 => {
                    self.append_all(&mut rows, left_row, other, &mask[0])?
                }
                Evaluated::Vector(mask) => {
                    if mask.len() != other.rows.len() {
                        return Err(EvaluationError::MaskLength {
                            mask: mask.len(),
                            rows: other.rows.len(),
                        }
                        .into());
                    }
                    let mut matched = 0;
                    for (right_row, keep) in other.rows.iter().zip(&mask) {
                        match keep {
                            Value::Bool(true) => {
                                rows.push(concat(left_row, right_row));
                                matched += 1;
                            }
                            Value::Bool(false) | Value::Undefined => {}
                            value => {
                                return Err(EvaluationError::NotBoolean {
                                    ty: Type::from(value),
                                }
                                .into());
                            }
                        }
                    }
                    matched
                }
            };
            if keep_unmatched && matched == 0 {
                rows.push(concat(left_row, &filler));
            }
        }

        debug!(rows = rows.len(), "join produced");
        result.rows = rows;
        Ok(result)
    }

    /// Scalar mask: every right row matches, or none does. Returns how
    /// many rows were appended.
    fn append_all(
        &self,
        rows: &mut Vec<Vec<Value>>,
        left_row: &[Value],
        other: &Table,
        mask: &Value,
    ) -> crate::Result<usize> {
        match mask {
            Value::Bool(true) => {
                for right_row in &other.rows {
                    rows.push(concat(left_row, right_row));
                }
                Ok(other.rows.len())
            }
            Value::Bool(false) | Value::Undefined => Ok(0),
            value => Err(EvaluationError::NotBoolean { ty: Type::from(value) }.into()),
        }
    }
}

fn concat(left: &[Value], right: &[Value]) -> Vec<Value> {
    let mut row = Vec::with_capacity(left.len() + right.len());
    row.extend_from_slice(left);
    row.extend_from_slice(right);
    row
}
