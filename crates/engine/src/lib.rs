// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

pub use codec::FORMAT_VERSION;
pub use error::{Error, EvaluationError, PersistenceError, SchemaError};
pub use expression::{
    EvaluationContext, Evaluated, Expression, Function, cos, evaluate, exp, log, sin, sqrt,
};
pub use peaktable_type::{
    ColumnFormat, Opaque, OpaqueCell, OpaqueError, OpaqueRegistry, OrderedF64, Type, TypeError,
    Value,
};
pub use table::{AddColumn, ColumnSource, InsertAt, Table, TableId};

mod codec;
mod error;
pub mod expression;
mod table;

pub type Result<T> = std::result::Result<T, Error>;
