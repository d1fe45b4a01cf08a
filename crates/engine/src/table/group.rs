// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::EvaluationError;
use crate::expression::{EvaluationContext, Evaluated, Expression, evaluate};
use crate::table::{AddColumn, Table};
use indexmap::IndexMap;
use peaktable_type::Value;
use std::collections::HashSet;

impl Table {
    /// Partitions the rows into one table per distinct key tuple over the
    /// named columns, preserving the first-seen order of keys and the row
    /// order within each group.
    pub fn split_by(&self, names: &[&str]) -> crate::Result<Vec<Table>> {
        let groups = self.group_rows(names)?;
        let mut tables = Vec::with_capacity(groups.len());
        for (_, indices) in groups {
            let mut group = self.empty_clone();
            group.rows = indices.iter().map(|&i| self.rows[i].clone()).collect();
            tables.push(group);
        }
        Ok(tables)
    }

    /// Row indices per distinct key tuple, in first-seen order.
    fn group_rows(&self, names: &[&str]) -> crate::Result<IndexMap<Vec<Value>, Vec<usize>>> {
        let mut key_columns = Vec::with_capacity(names.len());
        for name in names {
            key_columns.push(self.column_index(name)?);
        }

        let mut groups: IndexMap<Vec<Value>, Vec<usize>> = IndexMap::new();
        for (index, row) in self.rows.iter().enumerate() {
            let key: Vec<Value> = key_columns.iter().map(|&c| row[c].clone()).collect();
            groups.entry(key).or_default().push(index);
        }
        Ok(groups)
    }

    /// The rows with the first occurrence of each distinct cell tuple,
    /// suppressed columns included.
    pub fn unique_rows(&self) -> Table {
        let mut unique = self.empty_clone();
        let mut seen = HashSet::new();
        for row in &self.rows {
            if seen.insert(row.clone()) {
                unique.rows.push(row.clone());
            }
        }
        unique
    }

    /// Adds a column holding, for every row, the aggregate of `expr` over
    /// the row's group. With an empty `group_by` the whole table is one
    /// group. The expression must reduce each group to a single value.
    pub fn aggregate(
        &self,
        expr: &Expression,
        name: &str,
        group_by: &[&str],
    ) -> crate::Result<Table> {
        let needed = expr.needed_columns();
        for (tid, column) in &needed {
            if *tid != self.id {
                return Err(EvaluationError::ForeignTable { column: column.clone() }.into());
            }
            self.require_column(column)?;
        }

        let mut result = self.copy();
        if self.rows.is_empty() {
            result.add_column(name, Vec::new(), AddColumn::default())?;
            return Ok(result);
        }

        let groups = self.group_rows(group_by)?;
        let mut values: Vec<Option<Value>> = vec![None; self.rows.len()];
        for (_, indices) in &groups {
            let group = self.rows_subset(indices);
            let mut ctx = EvaluationContext::new();
            ctx.bind_columns(&group, self.id, &needed)?;

            let value = match evaluate(expr, &ctx)? {
                Evaluated::Scalar(value) => value,
                Evaluated::Vector(mut vector) => {
                    if vector.len() != 1 {
                        return Err(
                            EvaluationError::NotAggregated { size: vector.len() }.into()
                        );
                    }
                    vector.pop().expect("one element")
                }
            };
            for &index in indices {
                values[index] = Some(value.clone());
            }
        }

        let values: Vec<Value> = values.into_iter().map(|v| v.expect("every row grouped")).collect();
        result.add_column(name, values, AddColumn::default())?;
        Ok(result)
    }

    /// The given rows as a throwaway table sharing this table's schema.
    /// Used to evaluate per-group contexts; deliberately keeps this
    /// table's identity out of it.
    fn rows_subset(&self, indices: &[usize]) -> Table {
        let mut subset = self.empty_clone();
        subset.rows = indices.iter().map(|&i| self.rows[i].clone()).collect();
        subset
    }
}
