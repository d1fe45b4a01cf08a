// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::types::Type;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Per-column display directive. Formats are purely presentational and
/// never influence query semantics; a suppressed column is skipped by every
/// textual rendering but still fully queryable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnFormat {
    /// Hide the column from textual output.
    Suppressed,
    /// Default rendering for the column type.
    Auto,
    /// Fixed number of decimal places for numeric columns.
    Fixed(usize),
    /// Seconds rendered as floating point minutes, e.g. retention times.
    Minutes,
}

impl ColumnFormat {
    /// Default format by column name and type: mass columns get five
    /// decimal places, retention time columns are shown in minutes.
    pub fn guess(name: &str, ty: Type) -> ColumnFormat {
        if matches!(ty, Type::Int | Type::Float) {
            if name.starts_with("rt") {
                return ColumnFormat::Minutes;
            }
            if name.starts_with('m') {
                return ColumnFormat::Fixed(5);
            }
        }
        ColumnFormat::Auto
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, ColumnFormat::Suppressed)
    }

    /// Renders one cell, or None when the column is suppressed. Undefined
    /// cells render as "-".
    pub fn render(&self, value: &Value) -> Option<String> {
        if self.is_suppressed() {
            return None;
        }
        if value.is_undefined() {
            return Some("-".to_string());
        }
        let rendered = match self {
            ColumnFormat::Fixed(places) => match value.as_f64() {
                Some(v) => format!("{:.*}", *places, v),
                None => value.to_string(),
            },
            ColumnFormat::Minutes => match value.as_f64() {
                Some(seconds) => format!("{:.2}m", seconds / 60.0),
                None => value.to_string(),
            },
            ColumnFormat::Suppressed => unreachable!(),
            ColumnFormat::Auto => match value {
                Value::Float(v) => format!("{:.2}", v.value()),
                other => other.to_string(),
            },
        };
        Some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_by_name() {
        assert_eq!(ColumnFormat::guess("mz", Type::Float), ColumnFormat::Fixed(5));
        assert_eq!(ColumnFormat::guess("rtmin", Type::Float), ColumnFormat::Minutes);
        assert_eq!(ColumnFormat::guess("intensity", Type::Float), ColumnFormat::Auto);
        assert_eq!(ColumnFormat::guess("mz", Type::Text), ColumnFormat::Auto);
    }

    #[test]
    fn test_render_fixed() {
        assert_eq!(ColumnFormat::Fixed(3).render(&Value::float(1.5)), Some("1.500".to_string()));
    }

    #[test]
    fn test_render_minutes() {
        assert_eq!(ColumnFormat::Minutes.render(&Value::float(90.0)), Some("1.50m".to_string()));
    }

    #[test]
    fn test_render_undefined_as_dash() {
        assert_eq!(ColumnFormat::Auto.render(&Value::Undefined), Some("-".to_string()));
    }

    #[test]
    fn test_suppressed_renders_nothing() {
        assert_eq!(ColumnFormat::Suppressed.render(&Value::Int(1)), None);
    }
}
