// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::SchemaError;
use crate::table::Table;
use std::collections::HashMap;

/// Postfix of a column name: `"mz__3"` carries postfix 3, a plain `"mz"`
/// carries the implicit postfix -1, and names starting with `__` are
/// internal and carry none at all. More than one `__` separator makes a
/// name invalid.
pub(crate) fn postfix_of(name: &str) -> crate::Result<Option<i64>> {
    if name.starts_with("__") {
        return Ok(None);
    }
    let mut fields = name.split("__");
    let _base = fields.next().expect("split yields at least one field");
    match fields.next() {
        None => Ok(Some(-1)),
        Some(postfix) => {
            if fields.next().is_some() {
                return Err(SchemaError::InvalidName { name: name.to_string() }.into());
            }
            postfix
                .parse::<i64>()
                .map(Some)
                .map_err(|_| SchemaError::InvalidName { name: name.to_string() }.into())
        }
    }
}

fn base_of(name: &str) -> &str {
    if name.starts_with("__") { name } else { name.split("__").next().unwrap_or(name) }
}

impl Table {
    /// The largest postfix over all non-internal columns, -1 when every
    /// column is unsuffixed.
    pub(crate) fn max_postfix(&self) -> crate::Result<i64> {
        let mut max = -1;
        for name in &self.names {
            if let Some(postfix) = postfix_of(name)? {
                max = max.max(postfix);
            }
        }
        Ok(max)
    }

    pub(crate) fn min_postfix(&self) -> crate::Result<i64> {
        let mut min = -1;
        for name in &self.names {
            if let Some(postfix) = postfix_of(name)? {
                min = min.min(postfix);
            }
        }
        Ok(min)
    }

    /// Every column name with its postfix shifted by `by`; internal names
    /// pass through unchanged.
    pub(crate) fn incremented_postfixes(&self, by: i64) -> crate::Result<Vec<String>> {
        let mut names = Vec::with_capacity(self.names.len());
        for name in &self.names {
            match postfix_of(name)? {
                None => names.push(name.clone()),
                Some(postfix) => names.push(format!("{}__{}", base_of(name), postfix + by)),
            }
        }
        Ok(names)
    }

    /// Strips the given postfixes from the column names in place; with no
    /// postfixes given, strips them all. Fails without renaming anything
    /// if the stripped names would collide.
    pub fn remove_postfixes(&mut self, postfixes: &[&str]) -> crate::Result<()> {
        let mut stripped = Vec::with_capacity(self.names.len());
        for name in &self.names {
            if postfixes.is_empty() {
                stripped.push(base_of(name).to_string());
            } else {
                match postfixes.iter().find(|p| name.ends_with(*p)) {
                    Some(postfix) => stripped.push(name[..name.len() - postfix.len()].to_string()),
                    None => stripped.push(name.clone()),
                }
            }
        }

        for (i, name) in stripped.iter().enumerate() {
            if stripped[..i].contains(name) {
                return Err(SchemaError::RenameCollision { name: name.clone() }.into());
            }
        }

        if let Some(primary) = &self.primary_index {
            if let Some(position) = self.column_position(primary) {
                self.primary_index = Some(stripped[position].clone());
            }
        }
        self.names = stripped;
        Ok(())
    }

    /// Renames postfixes in place, e.g. `[("__0", "_measured")]`.
    pub fn rename_postfixes(&mut self, mapping: &[(&str, &str)]) -> crate::Result<()> {
        let mut collected: Vec<(String, String)> = Vec::new();
        for (old, new) in mapping {
            for name in &self.names {
                if name.ends_with(old) {
                    let renamed = format!("{}{}", &name[..name.len() - old.len()], new);
                    collected.push((name.clone(), renamed));
                }
            }
        }
        let pairs: Vec<(&str, &str)> =
            collected.iter().map(|(o, n)| (o.as_str(), n.as_str())).collect();
        self.rename_columns(&pairs)
    }

    /// The postfixes under which every one of the given prefixes exists as
    /// a column, sorted. For columns `rt`, `rtmin`, `rt__1`, `rtmin__1`
    /// and prefixes `["rt", "rtmin"]` this is `["", "__1"]`.
    pub fn supported_postfixes(&self, prefixes: &[&str]) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for prefix in prefixes {
            for name in &self.names {
                if let Some(rest) = name.strip_prefix(prefix) {
                    *counts.entry(rest).or_default() += 1;
                }
            }
        }
        let mut supported: Vec<String> = counts
            .into_iter()
            .filter(|(_, count)| *count == prefixes.len())
            .map(|(postfix, _)| postfix.to_string())
            .collect();
        supported.sort();
        supported
    }
}

/// The schema of a join result: the left columns as they are, the right
/// columns with their postfixes shifted past the left's maximum. A pure
/// function of the two schemas, deterministic and collision free no matter
/// how many joins came before.
pub(crate) fn build_join_schema(left: &Table, right: &Table) -> crate::Result<Table> {
    let increment = left.max_postfix()? - right.min_postfix()? + 1;

    let mut names = left.names.clone();
    names.extend(right.incremented_postfixes(increment)?);
    let mut types = left.types.clone();
    types.extend(right.types.iter().copied());
    let mut formats = left.formats.clone();
    formats.extend(right.formats.iter().copied());

    let mut table = Table::new(names, types, formats, Vec::new())?;
    table.title = match (&left.title, &right.title) {
        (Some(l), Some(r)) => Some(format!("{} vs {}", l, r)),
        _ => None,
    };
    table.annotations = left.annotations.clone();
    for (key, value) in &right.annotations {
        table.annotations.entry(key.clone()).or_insert_with(|| value.clone());
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use peaktable_type::{ColumnFormat, Type};

    fn table_with(names: &[&str]) -> Table {
        Table::new(
            names.to_vec(),
            vec![Type::Int; names.len()],
            vec![ColumnFormat::Auto; names.len()],
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_postfix_of() {
        assert_eq!(postfix_of("mz").unwrap(), Some(-1));
        assert_eq!(postfix_of("mz__0").unwrap(), Some(0));
        assert_eq!(postfix_of("mz__12").unwrap(), Some(12));
        assert_eq!(postfix_of("__internal").unwrap(), None);
        assert!(postfix_of("a__b__c").is_err());
        assert!(postfix_of("a__x").is_err());
    }

    #[test]
    fn test_max_and_min_postfix() {
        let table = table_with(&["id", "mz__0", "rt__2"]);
        assert_eq!(table.max_postfix().unwrap(), 2);
        assert_eq!(table.min_postfix().unwrap(), -1);
    }

    #[test]
    fn test_incremented_postfixes() {
        let table = table_with(&["id", "mz__0", "__internal"]);
        assert_eq!(
            table.incremented_postfixes(2).unwrap(),
            vec!["id__1".to_string(), "mz__2".to_string(), "__internal".to_string()]
        );
    }

    #[test]
    fn test_build_join_schema_disambiguates() {
        let left = table_with(&["id", "mz"]);
        let right = table_with(&["id", "mz"]);
        let joined = build_join_schema(&left, &right).unwrap();
        assert_eq!(joined.column_names(), &["id", "mz", "id__0", "mz__0"]);
    }

    #[test]
    fn test_build_join_schema_stacks() {
        let once = build_join_schema(&table_with(&["id"]), &table_with(&["id"])).unwrap();
        let twice = build_join_schema(&once, &once).unwrap();
        assert_eq!(twice.column_names(), &["id", "id__0", "id__1", "id__2"]);

        let names = twice.column_names();
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_remove_postfixes() {
        let mut table = table_with(&["id", "mz__0"]);
        table.remove_postfixes(&[]).unwrap();
        assert_eq!(table.column_names(), &["id", "mz"]);
    }

    #[test]
    fn test_remove_postfixes_collision() {
        let mut table = table_with(&["mz", "mz__0"]);
        assert!(table.remove_postfixes(&[]).is_err());
        assert_eq!(table.column_names(), &["mz", "mz__0"]);
    }

    #[test]
    fn test_rename_postfixes() {
        let mut table = table_with(&["id__0", "mz__0", "rt"]);
        table.rename_postfixes(&[("__0", "_b")]).unwrap();
        assert_eq!(table.column_names(), &["id_b", "mz_b", "rt"]);
    }

    #[test]
    fn test_supported_postfixes() {
        let table = table_with(&["rt", "rtmin", "rt__1", "rtmin__1", "rtmax"]);
        assert_eq!(table.supported_postfixes(&["rt", "rtmin"]), vec!["", "__1"]);
        assert_eq!(table.supported_postfixes(&["rt", "rtmax"]), vec![""]);
    }
}
