// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::table::Table;
use peaktable_type::compare_total;

impl Table {
    /// Stable sort by one column, in place. An ascending sort establishes
    /// that column as the primary index, enabling binary-search fast paths
    /// in comparisons; only one column can hold that role at a time.
    /// Returns the applied permutation (new position -> old position).
    pub fn sort_by(&mut self, name: &str, ascending: bool) -> crate::Result<Vec<usize>> {
        let column = self.column_index(name)?;

        // 1. Create index indirection (0..n)
        let mut indices: Vec<usize> = (0..self.rows.len()).collect();

        // 2. Sort the indices using the total cell order
        indices.sort_by(|&a, &b| {
            let ord = compare_total(&self.rows[a][column], &self.rows[b][column]);
            if ascending { ord } else { ord.reverse() }
        });

        // 3. Reorder the rows using the sorted index
        let mut rows = Vec::with_capacity(self.rows.len());
        for &index in &indices {
            rows.push(std::mem::take(&mut self.rows[index]));
        }
        self.rows = rows;

        self.primary_index = if ascending { Some(name.to_string()) } else { None };
        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::small_table;
    use peaktable_type::{ColumnFormat, Type, Value};

    #[test]
    fn test_sort_ascending_sets_primary_index() {
        let mut table = small_table();
        table.sort_by("s", true).unwrap();
        assert_eq!(table.primary_index(), Some("s"));
    }

    #[test]
    fn test_sort_descending_clears_primary_index() {
        let mut table = small_table();
        table.sort_by("n", true).unwrap();
        let permutation = table.sort_by("n", false).unwrap();
        assert_eq!(table.primary_index(), None);
        assert_eq!(permutation, vec![2, 1, 0]);
        assert_eq!(table.value(0, "n").unwrap(), &Value::Int(3));
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut table = small_table();
        table.sort_by("n", true).unwrap();
        let rows = table.rows().to_vec();
        let permutation = table.sort_by("n", true).unwrap();
        assert_eq!(permutation, vec![0, 1, 2]);
        assert_eq!(table.rows(), rows.as_slice());
    }

    #[test]
    fn test_sort_is_stable() {
        let mut table = Table::new(
            vec!["k", "tag"],
            vec![Type::Int, Type::Text],
            vec![ColumnFormat::Auto, ColumnFormat::Auto],
            vec![
                vec![Value::Int(2), Value::text("first")],
                vec![Value::Int(1), Value::text("x")],
                vec![Value::Int(2), Value::text("second")],
            ],
        )
        .unwrap();
        table.sort_by("k", true).unwrap();
        assert_eq!(table.value(1, "tag").unwrap(), &Value::text("first"));
        assert_eq!(table.value(2, "tag").unwrap(), &Value::text("second"));
    }

    #[test]
    fn test_sort_puts_undefined_first() {
        let mut table = Table::new(
            vec!["v"],
            vec![Type::Int],
            vec![ColumnFormat::Auto],
            vec![vec![Value::Int(2)], vec![Value::Undefined], vec![Value::Int(1)]],
        )
        .unwrap();
        table.sort_by("v", true).unwrap();
        assert_eq!(
            table.column_values("v").unwrap(),
            vec![Value::Undefined, Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn test_sort_unknown_column() {
        let mut table = small_table();
        assert!(table.sort_by("missing", true).is_err());
    }
}
