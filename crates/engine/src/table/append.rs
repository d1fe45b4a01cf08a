// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::SchemaError;
use crate::table::Table;

impl Table {
    /// Appends the rows of `others` in place. Column names and types must
    /// match exactly; formats stay those of this table.
    pub fn append(&mut self, others: &[&Table]) -> crate::Result<()> {
        for other in others {
            if other.names != self.names {
                return Err(SchemaError::Mismatch {
                    detail: format!(
                        "column names [{}] vs [{}]",
                        self.names.join(", "),
                        other.names.join(", ")
                    ),
                }
                .into());
            }
            if other.types != self.types {
                return Err(SchemaError::Mismatch {
                    detail: format!("column types of '{}' differ", other.names.join(", ")),
                }
                .into());
            }
        }

        for other in others {
            self.rows.extend(other.rows.iter().cloned());
        }
        self.primary_index = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::table::tests::small_table;
    use peaktable_type::Value;

    #[test]
    fn test_append() {
        let mut left = small_table();
        let right = small_table();
        left.append(&[&right]).unwrap();
        assert_eq!(left.len(), 6);
        assert_eq!(left.value(3, "n").unwrap(), &Value::Int(1));
    }

    #[test]
    fn test_append_validates_all_before_mutating() {
        let mut left = small_table();
        let good = small_table();
        let mut bad = small_table();
        bad.rename_columns(&[("n", "m")]).unwrap();

        assert!(left.append(&[&good, &bad]).is_err());
        assert_eq!(left.len(), 3);
    }

    #[test]
    fn test_append_clears_primary_index() {
        let mut left = small_table();
        left.sort_by("n", true).unwrap();
        let right = small_table();
        left.append(&[&right]).unwrap();
        assert_eq!(left.primary_index(), None);
    }
}
