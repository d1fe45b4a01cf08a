// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::error::PersistenceError;
use crate::table::Table;
use peaktable_type::{ColumnFormat, OpaqueRegistry, Type, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Version written into every stored table.
pub const FORMAT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Oldest version `load` still accepts.
const MIN_SUPPORTED: (u64, u64, u64) = (0, 1, 0);

#[derive(Serialize, Deserialize)]
struct TableDocument {
    names: Vec<String>,
    types: Vec<Type>,
    formats: Vec<ColumnFormat>,
    title: Option<String>,
    annotations: Vec<(String, String)>,
    /// Distinct opaque payloads; cells reference them by index so that
    /// cells sharing one object before storing share one again after
    /// loading.
    opaques: Vec<(String, Vec<u8>)>,
    rows: Vec<Vec<CellDocument>>,
}

#[derive(Serialize, Deserialize)]
enum CellDocument {
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Opaque(u32),
}

impl Table {
    /// Writes the table to `path`: a textual `version=X.Y.Z` header line
    /// followed by the binary payload. Refuses to overwrite an existing
    /// file unless `overwrite` is set.
    pub fn store(&self, path: impl AsRef<Path>, overwrite: bool) -> crate::Result<()> {
        let path = path.as_ref();
        if !overwrite && path.exists() {
            return Err(PersistenceError::AlreadyExists {
                path: path.display().to_string(),
            }
            .into());
        }
        info!(path = %path.display(), rows = self.len(), "storing table");

        let document = self.to_document();
        let payload = postcard::to_stdvec(&document)
            .map_err(|e| PersistenceError::Corrupt { detail: e.to_string() })?;

        let mut bytes = format!("version={}\n", FORMAT_VERSION).into_bytes();
        bytes.extend(payload);
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Loads a table stored with `store`. The version header is checked
    /// against the oldest supported version; opaque cells are rebuilt
    /// through `registry`. All derived state (primary index, caches) is
    /// re-derived, never trusted from disk.
    pub fn load(path: impl AsRef<Path>, registry: &OpaqueRegistry) -> crate::Result<Table> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;

        let newline = bytes
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(PersistenceError::MissingVersion)?;
        let header =
            std::str::from_utf8(&bytes[..newline]).map_err(|_| PersistenceError::MissingVersion)?;
        let version = header.strip_prefix("version=").ok_or(PersistenceError::MissingVersion)?;
        if parse_version(version)? < MIN_SUPPORTED {
            return Err(PersistenceError::UnsupportedVersion {
                version: version.to_string(),
            }
            .into());
        }

        let document: TableDocument = postcard::from_bytes(&bytes[newline + 1..])
            .map_err(|e| PersistenceError::Corrupt { detail: e.to_string() })?;
        let table = Table::from_document(document, registry, path)?;
        info!(path = %path.display(), rows = table.len(), version, "loaded table");
        Ok(table)
    }

    fn to_document(&self) -> TableDocument {
        let mut opaques = Vec::new();
        let mut seen: HashMap<usize, u32> = HashMap::new();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|value| match value {
                        Value::Undefined => CellDocument::Undefined,
                        Value::Bool(v) => CellDocument::Bool(*v),
                        Value::Int(v) => CellDocument::Int(*v),
                        Value::Float(v) => CellDocument::Float(v.value()),
                        Value::Text(v) => CellDocument::Text(v.clone()),
                        Value::Opaque(cell) => {
                            let index = *seen.entry(cell.identity()).or_insert_with(|| {
                                opaques.push((cell.kind().to_string(), cell.encode()));
                                (opaques.len() - 1) as u32
                            });
                            CellDocument::Opaque(index)
                        }
                    })
                    .collect()
            })
            .collect();

        TableDocument {
            names: self.names.clone(),
            types: self.types.clone(),
            formats: self.formats.clone(),
            title: self.title.clone(),
            annotations: self.annotations.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            opaques,
            rows,
        }
    }

    fn from_document(
        document: TableDocument,
        registry: &OpaqueRegistry,
        path: &Path,
    ) -> crate::Result<Table> {
        let mut cells = Vec::with_capacity(document.opaques.len());
        for (kind, payload) in &document.opaques {
            cells.push(
                registry.decode(kind, payload).map_err(PersistenceError::from)?,
            );
        }

        let mut rows = Vec::with_capacity(document.rows.len());
        for row in document.rows {
            let mut values = Vec::with_capacity(row.len());
            for cell in row {
                values.push(match cell {
                    CellDocument::Undefined => Value::Undefined,
                    CellDocument::Bool(v) => Value::Bool(v),
                    CellDocument::Int(v) => Value::Int(v),
                    CellDocument::Float(v) => Value::float(v),
                    CellDocument::Text(v) => Value::Text(v),
                    CellDocument::Opaque(index) => {
                        let cell = cells.get(index as usize).ok_or_else(|| {
                            PersistenceError::Corrupt {
                                detail: format!("opaque reference {} out of range", index),
                            }
                        })?;
                        Value::Opaque(cell.clone())
                    }
                });
            }
            rows.push(values);
        }

        let mut table = Table::new(document.names, document.types, document.formats, rows)?;
        table.title = document.title;
        for (key, value) in document.annotations {
            table.annotations.insert(key, value);
        }
        table.annotations.insert("loaded_from".to_string(), path.display().to_string());
        Ok(table)
    }
}

fn parse_version(version: &str) -> Result<(u64, u64, u64), PersistenceError> {
    let mut fields = version.split('.');
    let mut next = || {
        fields
            .next()
            .and_then(|f| f.parse::<u64>().ok())
            .ok_or(PersistenceError::MissingVersion)
    };
    Ok((next()?, next()?, next()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::small_table;
    use peaktable_testing::temp_dir;
    use peaktable_type::{Opaque, OpaqueCell};
    use std::any::Any;

    #[derive(Debug)]
    struct Spectrum(Vec<u8>);

    impl Opaque for Spectrum {
        fn kind(&self) -> &'static str {
            "spectrum"
        }

        fn encode(&self) -> Vec<u8> {
            self.0.clone()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn decode_spectrum(bytes: &[u8]) -> Result<OpaqueCell, peaktable_type::OpaqueError> {
        Ok(OpaqueCell::new(Spectrum(bytes.to_vec())))
    }

    fn registry() -> OpaqueRegistry {
        let mut registry = OpaqueRegistry::new();
        registry.register("spectrum", decode_spectrum);
        registry
    }

    #[test]
    fn test_round_trip() {
        temp_dir(|dir| {
            let path = dir.join("peaks.table");
            let mut table = small_table().with_title("peaks");
            table.set_annotation("instrument", "qtof");
            table.store(&path, false).unwrap();

            let loaded = Table::load(&path, &registry()).unwrap();
            assert_eq!(loaded.column_names(), table.column_names());
            assert_eq!(loaded.column_types(), table.column_types());
            assert_eq!(loaded.rows(), table.rows());
            assert_eq!(loaded.title(), Some("peaks"));
            assert_eq!(loaded.annotations().get("instrument").map(String::as_str), Some("qtof"));
            assert!(loaded.annotations().contains_key("loaded_from"));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_round_trip_opaque_cells_share_identity() {
        temp_dir(|dir| {
            let path = dir.join("spectra.table");
            let shared = OpaqueCell::new(Spectrum(vec![1, 2, 3]));
            let table = Table::new(
                vec!["id", "spectrum"],
                vec![Type::Int, Type::Opaque],
                vec![ColumnFormat::Auto, ColumnFormat::Auto],
                vec![
                    vec![Value::Int(0), Value::Opaque(shared.clone())],
                    vec![Value::Int(1), Value::Opaque(shared.clone())],
                    vec![Value::Int(2), Value::Opaque(OpaqueCell::new(Spectrum(vec![9])))],
                ],
            )
            .unwrap();
            table.store(&path, false).unwrap();

            let loaded = Table::load(&path, &registry()).unwrap();
            let a = loaded.value(0, "spectrum").unwrap();
            let b = loaded.value(1, "spectrum").unwrap();
            let c = loaded.value(2, "spectrum").unwrap();
            assert_eq!(a, b);
            assert_ne!(a, c);

            let Value::Opaque(cell) = a else { panic!("expected opaque cell") };
            assert_eq!(cell.downcast_ref::<Spectrum>().unwrap().0, vec![1, 2, 3]);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_store_refuses_overwrite() {
        temp_dir(|dir| {
            let path = dir.join("t.table");
            let table = small_table();
            table.store(&path, false).unwrap();
            assert!(table.store(&path, false).is_err());
            assert!(table.store(&path, true).is_ok());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_load_rejects_old_version() {
        temp_dir(|dir| {
            let path = dir.join("old.table");
            std::fs::write(&path, b"version=0.0.9\n").unwrap();

            let err = Table::load(&path, &registry()).unwrap_err();
            assert!(err.to_string().contains("0.0.9"));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_load_rejects_missing_header() {
        temp_dir(|dir| {
            let path = dir.join("garbage.table");
            std::fs::write(&path, b"not a table").unwrap();
            assert!(Table::load(&path, &registry()).is_err());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_load_does_not_trust_primary_index() {
        temp_dir(|dir| {
            let path = dir.join("sorted.table");
            let mut table = small_table();
            table.sort_by("n", true).unwrap();
            table.store(&path, false).unwrap();

            let loaded = Table::load(&path, &registry()).unwrap();
            assert_eq!(loaded.primary_index(), None);
            Ok(())
        })
        .unwrap();
    }
}
