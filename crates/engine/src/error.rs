// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use peaktable_type::{OpaqueError, Type, TypeError};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("column '{name}' exists already")]
    DuplicateColumn { name: String },

    #[error("column '{name}' does not exist")]
    UnknownColumn { name: String },

    #[error("{names} column names, {types} types and {formats} formats do not align")]
    ColumnArity { names: usize, types: usize, formats: usize },

    #[error("row has {found} cells, table has {expected} columns")]
    RowArity { expected: usize, found: usize },

    #[error("new column has {found} values for {expected} rows")]
    ColumnLength { expected: usize, found: usize },

    #[error("renaming collides on '{name}'")]
    RenameCollision { name: String },

    #[error("row {index} out of range ({rows} rows)")]
    RowIndex { index: usize, rows: usize },

    #[error("invalid column name '{name}'")]
    InvalidName { name: String },

    #[error("tables do not align: {detail}")]
    Mismatch { detail: String },
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("column '{column}' is not bound in the evaluation context")]
    UnboundColumn { column: String },

    #[error("column '{column}' belongs to a table that is not part of this operation")]
    ForeignTable { column: String },

    #[error("sizes {left} and {right} do not fit")]
    SizeMismatch { left: usize, right: usize },

    #[error("mask of length {mask} does not match {rows} rows")]
    MaskLength { mask: usize, rows: usize },

    #[error("expected a boolean mask, got {ty}")]
    NotBoolean { ty: Type },

    #[error("expression did not aggregate to a single value (got {size})")]
    NotAggregated { size: usize },

    #[error("function '{function}' expects {expected} arguments, got {found}")]
    FunctionArity { function: String, expected: usize, found: usize },
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PersistenceError {
    #[error("'{path}' exists already")]
    AlreadyExists { path: String },

    #[error("missing or malformed version header")]
    MissingVersion,

    #[error("can not load table of version {version}")]
    UnsupportedVersion { version: String },

    #[error("invalid table payload: {detail}")]
    Corrupt { detail: String },

    #[error(transparent)]
    Opaque(#[from] OpaqueError),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
