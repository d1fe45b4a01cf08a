// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::EvaluationError;
use crate::expression::Expression;
use crate::table::{Table, TableId};
use peaktable_type::{Type, Value};
use std::collections::HashMap;

/// What a column reference resolves to during one evaluation: either the
/// full column, or a single row's cell when a join pins the left row.
pub struct ColumnBinding {
    pub(crate) values: Binding,
    pub(crate) sorted: bool,
    pub(crate) ty: Type,
}

pub(crate) enum Binding {
    Column(Vec<Value>),
    Row(Value),
}

/// Binds table identities to the column data an expression needs. Built on
/// demand per evaluation from `Expression::needed_columns`, never cached.
#[derive(Default)]
pub struct EvaluationContext {
    tables: HashMap<TableId, HashMap<String, ColumnBinding>>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context over a single table. References to any other table fail
    /// here, before a single row is looked at.
    pub fn for_table(table: &Table, expr: &Expression) -> crate::Result<Self> {
        let needed = expr.needed_columns();
        for (tid, name) in &needed {
            if *tid != table.id() {
                return Err(EvaluationError::ForeignTable { column: name.clone() }.into());
            }
        }
        let mut ctx = Self::new();
        ctx.bind_columns(table, table.id(), &needed)?;
        Ok(ctx)
    }

    /// Binds the full columns of `table` for every needed entry carrying
    /// `as_id`. Sortedness is taken from the table's primary index.
    pub(crate) fn bind_columns(
        &mut self,
        table: &Table,
        as_id: TableId,
        needed: &[(TableId, String)],
    ) -> crate::Result<()> {
        let bindings = self.tables.entry(as_id).or_default();
        for (tid, name) in needed {
            if *tid != as_id || bindings.contains_key(name) {
                continue;
            }
            let values = table
                .column_values(name)
                .map_err(|_| EvaluationError::UnboundColumn { column: name.clone() })?;
            bindings.insert(
                name.clone(),
                ColumnBinding {
                    values: Binding::Column(values),
                    sorted: table.primary_index() == Some(name.as_str()),
                    ty: table.column_type(name)?,
                },
            );
        }
        Ok(())
    }

    /// Binds one row of `table` as scalar cells, the shape a join gives the
    /// left-hand side.
    pub(crate) fn bind_row(
        &mut self,
        table: &Table,
        as_id: TableId,
        row: &[Value],
        needed: &[(TableId, String)],
    ) -> crate::Result<()> {
        let bindings = self.tables.entry(as_id).or_default();
        bindings.clear();
        for (tid, name) in needed {
            if *tid != as_id {
                continue;
            }
            let position = table
                .column_position(name)
                .ok_or_else(|| EvaluationError::UnboundColumn { column: name.clone() })?;
            bindings.insert(
                name.clone(),
                ColumnBinding {
                    values: Binding::Row(row[position].clone()),
                    sorted: false,
                    ty: table.column_type(name)?,
                },
            );
        }
        Ok(())
    }

    pub(crate) fn get(&self, table: TableId, name: &str) -> Option<&ColumnBinding> {
        self.tables.get(&table).and_then(|bindings| bindings.get(name))
    }
}
