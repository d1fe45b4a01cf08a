// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::EvaluationError;
use crate::expression::{EvaluationContext, Evaluated, Expression, evaluate};
use crate::table::Table;
use peaktable_type::{Type, Value};

impl Table {
    /// The rows whose mask is true, in original order, as a new table with
    /// independent row storage. A scalar boolean keeps all rows or none; a
    /// vector mask must match the row count exactly. Undefined mask
    /// entries drop their row.
    pub fn filter(&self, expr: &Expression) -> crate::Result<Table> {
        let ctx = EvaluationContext::for_table(self, expr)?;
        let mask = evaluate(expr, &ctx)?;

        let mut filtered = self.empty_clone();
        filtered.primary_index = self.primary_index.clone();

        match mask {
            Evaluated::Scalar(Value::Bool(true)) => {
                filtered.rows = self.rows.clone();
            }
            Evaluated::Scalar(Value::Bool(false)) | Evaluated::Scalar(Value::Undefined) => {}
            Evaluated::Scalar(value) => {
                return Err(EvaluationError::NotBoolean { ty: Type::from(&value) }.into());
            }
            Evaluated::Vector(mask) => {
                if mask.len() != self.rows.len() {
                    return Err(EvaluationError::MaskLength {
                        mask: mask.len(),
                        rows: self.rows.len(),
                    }
                    .into());
                }
                for (row, keep) in self.rows.iter().zip(&mask) {
                    match keep {
                        Value::Bool(true) => filtered.rows.push(row.clone()),
                        Value::Bool(false) | Value::Undefined => {}
                        value => {
                            return Err(
                                EvaluationError::NotBoolean { ty: Type::from(value) }.into()
                            );
                        }
                    }
                }
            }
        }
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::small_table;
    use peaktable_type::{ColumnFormat, Value};

    #[test]
    fn test_filter_by_comparison() {
        let table = small_table();
        let filtered = table.filter(&table.col("n").ge(2)).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.value(0, "s").unwrap(), &Value::text("b"));
        assert_eq!(filtered.value(1, "s").unwrap(), &Value::text("c"));
    }

    #[test]
    fn test_filter_preserves_descending_order() {
        let mut table = small_table();
        table.sort_by("n", false).unwrap();
        let filtered = table.filter(&table.col("n").ge(2)).unwrap();
        assert_eq!(filtered.column_values("n").unwrap(), vec![Value::Int(3), Value::Int(2)]);
    }

    #[test]
    fn test_filter_scalar_true_and_false() {
        let table = small_table();
        assert_eq!(table.filter(&Expression::constant(true)).unwrap().len(), 3);
        assert_eq!(table.filter(&Expression::constant(false)).unwrap().len(), 0);
    }

    #[test]
    fn test_filter_scalar_non_boolean_fails() {
        let table = small_table();
        assert!(table.filter(&Expression::constant(1)).is_err());
    }

    #[test]
    fn test_filter_combined_conditions() {
        let table = small_table();
        let expr = table.col("n").ge(2) & table.col("s").ne("c");
        let filtered = table.filter(&expr).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.value(0, "s").unwrap(), &Value::text("b"));
    }

    #[test]
    fn test_filter_partitions_with_negation() {
        let table = small_table();
        let kept = table.filter(&table.col("n").gt(1)).unwrap();
        let dropped = table.filter(&table.col("n").le(1)).unwrap();
        assert_eq!(kept.len() + dropped.len(), table.len());
    }

    #[test]
    fn test_filter_undefined_drops_row() {
        let table = Table::new(
            vec!["v"],
            vec![peaktable_type::Type::Int],
            vec![ColumnFormat::Auto],
            vec![vec![Value::Int(1)], vec![Value::Undefined], vec![Value::Int(3)]],
        )
        .unwrap();
        let filtered = table.filter(&table.col("v").ge(0)).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_foreign_column_fails_up_front() {
        let table = small_table();
        let other = small_table();
        assert!(table.filter(&other.col("n").ge(1)).is_err());
    }

    #[test]
    fn test_filter_independent_storage() {
        let table = small_table();
        let mut filtered = table.filter(&Expression::constant(true)).unwrap();
        filtered.set_value(0, "n", Value::Int(42)).unwrap();
        assert_eq!(table.value(0, "n").unwrap(), &Value::Int(1));
    }

    #[test]
    fn test_filter_uses_sorted_fast_path_consistently() {
        let mut table = small_table();
        table.sort_by("n", true).unwrap();
        let slow = small_table();
        let fast = table.filter(&table.col("n").gt(1)).unwrap();
        let reference = slow.filter(&slow.col("n").gt(1)).unwrap();
        assert_eq!(fast.column_values("n").unwrap(), reference.column_values("n").unwrap());
    }
}
