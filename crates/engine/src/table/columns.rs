// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::SchemaError;
use crate::expression::{EvaluationContext, Evaluated, Expression, evaluate};
use crate::table::Table;
use peaktable_type::{ColumnFormat, Type, Value};

/// Where the values of a new column come from.
pub enum ColumnSource {
    /// One value per existing row, in row order.
    Values(Vec<Value>),
    /// The same value in every row.
    Constant(Value),
    /// A callback invoked once per row.
    Computed(Box<dyn Fn(&Table, usize) -> Value>),
    /// An expression evaluated once against the table itself; a scalar
    /// result is broadcast over all rows.
    Expression(Expression),
}

impl From<Vec<Value>> for ColumnSource {
    fn from(values: Vec<Value>) -> Self {
        ColumnSource::Values(values)
    }
}

impl From<Value> for ColumnSource {
    fn from(value: Value) -> Self {
        ColumnSource::Constant(value)
    }
}

impl From<Expression> for ColumnSource {
    fn from(expr: Expression) -> Self {
        ColumnSource::Expression(expr)
    }
}

/// Position of a new column.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InsertAt {
    #[default]
    End,
    Index(usize),
    Before(String),
}

/// Optional parameters of `add_column`: a declared type (inferred from the
/// values otherwise), a display format (guessed from name and type
/// otherwise) and the insert position.
#[derive(Default)]
pub struct AddColumn {
    pub ty: Option<Type>,
    pub format: Option<ColumnFormat>,
    pub at: InsertAt,
}

impl AddColumn {
    pub fn typed(ty: Type) -> Self {
        AddColumn { ty: Some(ty), ..Default::default() }
    }

    pub fn with_format(mut self, format: ColumnFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn before(name: impl Into<String>) -> Self {
        AddColumn { at: InsertAt::Before(name.into()), ..Default::default() }
    }
}

impl Table {
    /// Adds a column in place. Fails without modifying the table if the
    /// name exists, the values do not line up with the rows, or no single
    /// type covers them.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        source: impl Into<ColumnSource>,
        options: AddColumn,
    ) -> crate::Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(SchemaError::DuplicateColumn { name }.into());
        }
        let values = self.materialize(source.into())?;
        let (ty, format, values) = self.prepare(&name, values, &options)?;
        let position = self.resolve_position(&options.at)?;

        self.names.insert(position, name);
        self.types.insert(position, ty);
        self.formats.insert(position, format);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(position, value);
        }
        Ok(())
    }

    /// Replaces the values (and type/format) of an existing column, keeping
    /// its position.
    pub fn replace_column(
        &mut self,
        name: &str,
        source: impl Into<ColumnSource>,
        options: AddColumn,
    ) -> crate::Result<()> {
        let position = self.column_index(name)?;
        let values = self.materialize(source.into())?;
        let (ty, format, values) = self.prepare(name, values, &options)?;

        self.types[position] = ty;
        self.formats[position] = format;
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[position] = value;
        }
        if self.primary_index.as_deref() == Some(name) {
            self.primary_index = None;
        }
        Ok(())
    }

    /// Replaces the column if it exists, adds it otherwise.
    pub fn update_column(
        &mut self,
        name: &str,
        source: impl Into<ColumnSource>,
        options: AddColumn,
    ) -> crate::Result<()> {
        if self.has_column(name) {
            self.replace_column(name, source, options)
        } else {
            self.add_column(name, source, options)
        }
    }

    fn materialize(&self, source: ColumnSource) -> crate::Result<Vec<Value>> {
        match source {
            ColumnSource::Values(values) => {
                if values.len() != self.rows.len() {
                    return Err(SchemaError::ColumnLength {
                        expected: self.rows.len(),
                        found: values.len(),
                    }
                    .into());
                }
                Ok(values)
            }
            ColumnSource::Constant(value) => Ok(vec![value; self.rows.len()]),
            ColumnSource::Computed(callback) => {
                Ok((0..self.rows.len()).map(|i| callback(self, i)).collect())
            }
            ColumnSource::Expression(expr) => {
                let ctx = EvaluationContext::for_table(self, &expr)?;
                match evaluate(&expr, &ctx)? {
                    Evaluated::Scalar(value) => Ok(vec![value; self.rows.len()]),
                    Evaluated::Vector(values) => {
                        if values.len() != self.rows.len() {
                            return Err(SchemaError::ColumnLength {
                                expected: self.rows.len(),
                                found: values.len(),
                            }
                            .into());
                        }
                        Ok(values)
                    }
                }
            }
        }
    }

    fn prepare(
        &self,
        name: &str,
        values: Vec<Value>,
        options: &AddColumn,
    ) -> crate::Result<(Type, ColumnFormat, Vec<Value>)> {
        let ty = match options.ty {
            Some(ty) => ty,
            None => Type::common_of(&values).map_err(crate::Error::from)?,
        };
        let format = options.format.unwrap_or_else(|| ColumnFormat::guess(name, ty));
        let mut converted = Vec::with_capacity(values.len());
        for value in values {
            converted.push(ty.coerce(value).map_err(crate::Error::from)?);
        }
        Ok((ty, format, converted))
    }

    fn resolve_position(&self, at: &InsertAt) -> crate::Result<usize> {
        match at {
            InsertAt::End => Ok(self.names.len()),
            InsertAt::Index(index) => Ok(*index.min(&self.names.len())),
            InsertAt::Before(name) => self.column_index(name),
        }
    }

    /// Removes the named columns in place. Atomic: every name is validated
    /// before the first one is removed.
    pub fn drop_columns(&mut self, names: &[&str]) -> crate::Result<()> {
        let mut indices = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(SchemaError::DuplicateColumn { name: name.to_string() }.into());
            }
            indices.push(self.column_index(name)?);
        }
        indices.sort_unstable();

        for &index in indices.iter().rev() {
            if self.primary_index.as_deref() == Some(self.names[index].as_str()) {
                self.primary_index = None;
            }
            self.names.remove(index);
            self.types.remove(index);
            self.formats.remove(index);
            for row in &mut self.rows {
                row.remove(index);
            }
        }
        Ok(())
    }

    /// Renames columns in place. Atomic: old names must all exist and be
    /// distinct, new names must be distinct and not collide with any
    /// current name.
    pub fn rename_columns(&mut self, mapping: &[(&str, &str)]) -> crate::Result<()> {
        for (i, (old, new)) in mapping.iter().enumerate() {
            if mapping[..i].iter().any(|(o, _)| o == old) {
                return Err(SchemaError::RenameCollision { name: old.to_string() }.into());
            }
            self.require_column(old)?;
            if mapping[..i].iter().any(|(_, n)| n == new) || self.has_column(new) {
                return Err(SchemaError::RenameCollision { name: new.to_string() }.into());
            }
        }

        for (old, new) in mapping {
            let index = self.column_position(old).expect("validated above");
            self.names[index] = new.to_string();
            if self.primary_index.as_deref() == Some(*old) {
                self.primary_index = Some(new.to_string());
            }
        }
        Ok(())
    }

    /// The named columns as a new table, in the given order.
    pub fn extract_columns(&self, names: &[&str]) -> crate::Result<Table> {
        let mut indices = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(SchemaError::DuplicateColumn { name: name.to_string() }.into());
            }
            indices.push(self.column_index(name)?);
        }

        let mut table = Table::new(
            names.iter().map(|n| n.to_string()).collect::<Vec<_>>(),
            indices.iter().map(|&i| self.types[i]).collect(),
            indices.iter().map(|&i| self.formats[i]).collect(),
            self.rows.iter().map(|row| indices.iter().map(|&i| row[i].clone()).collect()).collect(),
        )?;
        table.title = self.title.clone();
        table.annotations = self.annotations.clone();
        if let Some(primary) = &self.primary_index {
            if names.contains(&primary.as_str()) {
                table.primary_index = Some(primary.clone());
            }
        }
        Ok(table)
    }

    /// Prepends an integer column numbering the rows 0..n in current
    /// order.
    pub fn add_enumeration(&mut self, name: &str) -> crate::Result<()> {
        let values: Vec<Value> = (0..self.rows.len() as i64).map(Value::Int).collect();
        self.add_column(
            name,
            values,
            AddColumn { ty: Some(Type::Int), format: None, at: InsertAt::Index(0) },
        )
    }
}
