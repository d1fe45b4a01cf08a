// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::SchemaError;
use crate::expression::{ColumnExpression, Expression};
use indexmap::IndexMap;
use peaktable_type::{ColumnFormat, Type, Value};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

pub use columns::{AddColumn, ColumnSource, InsertAt};

mod append;
mod columns;
mod filter;
mod group;
mod join;
pub(crate) mod postfix;
mod render;
mod sort;

/// Process-unique identity of one table instance. Expressions reference
/// tables through this token instead of holding the table itself, so they
/// stay cheap and never keep row data alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TableId(u64);

impl TableId {
    pub(crate) fn next() -> TableId {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        TableId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for TableId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Rows of the same length under named, typed, formatted columns, plus a
/// title and free-form annotations. Every query operation returns a new
/// table with independent row storage; only opaque cell handles are shared.
pub struct Table {
    pub(crate) id: TableId,
    pub(crate) names: Vec<String>,
    pub(crate) types: Vec<Type>,
    pub(crate) formats: Vec<ColumnFormat>,
    pub(crate) rows: Vec<Vec<Value>>,
    /// The one column currently known to be sorted ascending. Cleared by
    /// everything that mutates or reorders rows, except the sort that set
    /// it.
    pub(crate) primary_index: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) annotations: IndexMap<String, String>,
}

impl Table {
    pub fn new(
        names: Vec<impl Into<String>>,
        types: Vec<Type>,
        formats: Vec<ColumnFormat>,
        rows: Vec<Vec<Value>>,
    ) -> crate::Result<Table> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();

        if names.len() != types.len() || names.len() != formats.len() {
            return Err(SchemaError::ColumnArity {
                names: names.len(),
                types: types.len(),
                formats: formats.len(),
            }
            .into());
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(SchemaError::DuplicateColumn { name: name.clone() }.into());
            }
        }

        let mut table = Table {
            id: TableId::next(),
            names,
            types,
            formats,
            rows: Vec::with_capacity(rows.len()),
            primary_index: None,
            title: None,
            annotations: IndexMap::new(),
        };
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// One-column table from a list of values; type and format are
    /// inferred.
    pub fn from_column(name: impl Into<String>, values: Vec<Value>) -> crate::Result<Table> {
        let name = name.into();
        let ty = Type::common_of(&values).map_err(crate::Error::from)?;
        let format = ColumnFormat::guess(&name, ty);
        let rows = values.into_iter().map(|v| vec![v]).collect();
        Table::new(vec![name], vec![ty], vec![format], rows)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Table {
        self.title = Some(title.into());
        self
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn annotations(&self) -> &IndexMap<String, String> {
        &self.annotations
    }

    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.annotations.insert(key.into(), value.into());
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column_types(&self) -> &[Type] {
        &self.types
    }

    pub fn column_formats(&self) -> &[ColumnFormat] {
        &self.formats
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn require_column(&self, name: &str) -> crate::Result<()> {
        self.column_index(name).map(|_| ())
    }

    pub fn column_index(&self, name: &str) -> crate::Result<usize> {
        self.column_position(name)
            .ok_or_else(|| SchemaError::UnknownColumn { name: name.to_string() }.into())
    }

    pub(crate) fn column_position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column_type(&self, name: &str) -> crate::Result<Type> {
        Ok(self.types[self.column_index(name)?])
    }

    pub fn column_format(&self, name: &str) -> crate::Result<ColumnFormat> {
        Ok(self.formats[self.column_index(name)?])
    }

    /// Names of the columns a textual rendering shows, i.e. those whose
    /// format is not suppressed.
    pub fn visible_columns(&self) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.formats)
            .filter(|(_, format)| !format.is_suppressed())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn value(&self, row: usize, name: &str) -> crate::Result<&Value> {
        let column = self.column_index(name)?;
        let row = self
            .rows
            .get(row)
            .ok_or(SchemaError::RowIndex { index: row, rows: self.rows.len() })?;
        Ok(&row[column])
    }

    /// Writes one cell after checked conversion to the column type. Any
    /// cell mutation invalidates the primary index.
    pub fn set_value(&mut self, row: usize, name: &str, value: Value) -> crate::Result<()> {
        let column = self.column_index(name)?;
        let rows = self.rows.len();
        let slot = self
            .rows
            .get_mut(row)
            .ok_or(SchemaError::RowIndex { index: row, rows })?;
        slot[column] = self.types[column].coerce(value).map_err(crate::Error::from)?;
        self.primary_index = None;
        Ok(())
    }

    /// Appends one row after checked conversion of every cell.
    pub fn add_row(&mut self, row: Vec<Value>) -> crate::Result<()> {
        self.push_row(row)?;
        self.primary_index = None;
        Ok(())
    }

    fn push_row(&mut self, row: Vec<Value>) -> crate::Result<()> {
        if row.len() != self.names.len() {
            return Err(
                SchemaError::RowArity { expected: self.names.len(), found: row.len() }.into()
            );
        }
        let mut converted = Vec::with_capacity(row.len());
        for (value, ty) in row.into_iter().zip(&self.types) {
            converted.push(ty.coerce(value).map_err(crate::Error::from)?);
        }
        self.rows.push(converted);
        Ok(())
    }

    pub fn column_values(&self, name: &str) -> crate::Result<Vec<Value>> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[index].clone()).collect())
    }

    pub fn primary_index(&self) -> Option<&str> {
        self.primary_index.as_deref()
    }

    /// A column reference for building expressions. The name is validated
    /// when the expression is evaluated, not here.
    pub fn col(&self, name: impl Into<String>) -> Expression {
        Expression::Column(ColumnExpression { table: self.id, name: name.into() })
    }

    /// Same schema, title and annotations, not a single row, fresh
    /// identity.
    pub fn empty_clone(&self) -> Table {
        Table {
            id: TableId::next(),
            names: self.names.clone(),
            types: self.types.clone(),
            formats: self.formats.clone(),
            rows: Vec::new(),
            primary_index: None,
            title: self.title.clone(),
            annotations: self.annotations.clone(),
        }
    }

    /// Semi-deep copy: new row storage, shared opaque cell handles.
    pub fn copy(&self) -> Table {
        let mut copy = self.empty_clone();
        copy.rows = self.rows.clone();
        copy.primary_index = self.primary_index.clone();
        copy
    }

    /// The rows of `range` as a new table. The range is clamped to the
    /// table, so an over-long range simply yields fewer rows.
    pub fn slice(&self, range: Range<usize>) -> Table {
        let start = range.start.min(self.rows.len());
        let end = range.end.min(self.rows.len()).max(start);
        let mut slice = self.empty_clone();
        slice.rows = self.rows[start..end].to_vec();
        slice.primary_index = self.primary_index.clone();
        slice
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("names", &self.names)
            .field("types", &self.types)
            .field("rows", &self.rows.len())
            .finish()
    }
}
