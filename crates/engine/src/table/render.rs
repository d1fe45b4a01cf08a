// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use crate::table::Table;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

impl Table {
    /// Renders the visible columns as an aligned text block: names, types,
    /// a separator, then the formatted rows. Undefined cells show as "-".
    pub fn render(&self) -> String {
        let columns: Vec<usize> = (0..self.names.len())
            .filter(|&i| !self.formats[i].is_suppressed())
            .collect();

        let mut cells: Vec<Vec<String>> = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            cells.push(
                columns
                    .iter()
                    .map(|&i| self.formats[i].render(&row[i]).unwrap_or_default())
                    .collect(),
            );
        }

        let mut widths: Vec<usize> = columns
            .iter()
            .map(|&i| self.names[i].len().max(self.types[i].to_string().len()).max(6))
            .collect();
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }

        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(title);
            out.push('\n');
        }
        let push_line = |out: &mut String, fields: Vec<String>| {
            let line = fields
                .iter()
                .zip(&widths)
                .map(|(field, width)| format!("{:<width$}", field, width = *width))
                .collect::<Vec<_>>()
                .join("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        };

        push_line(&mut out, columns.iter().map(|&i| self.names[i].clone()).collect());
        push_line(&mut out, columns.iter().map(|&i| self.types[i].to_string()).collect());
        push_line(&mut out, columns.iter().map(|_| "------".to_string()).collect());
        for row in cells {
            push_line(&mut out, row);
        }
        out
    }

    /// Writes the visible columns as CSV with a `"; "` separator. An
    /// existing file is never overwritten; `path.1`, `path.2`, ... are
    /// probed until a free name is found, which is returned.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> crate::Result<PathBuf> {
        let path = free_path(path.as_ref());
        info!(path = %path.display(), rows = self.len(), "writing csv");

        let columns: Vec<usize> = (0..self.names.len())
            .filter(|&i| !self.formats[i].is_suppressed())
            .collect();

        let mut file = fs::File::create(&path)?;
        let header: Vec<&str> = columns.iter().map(|&i| self.names[i].as_str()).collect();
        writeln!(file, "{}", header.join("; "))?;
        for row in &self.rows {
            let cells: Vec<String> = columns
                .iter()
                .map(|&i| self.formats[i].render(&row[i]).unwrap_or_default())
                .collect();
            writeln!(file, "{}", cells.join("; "))?;
        }
        Ok(path)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

fn free_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    for i in 1.. {
        let candidate = PathBuf::from(format!("{}.{}", path.display(), i));
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!()
}

#[cfg(test)]
mod tests {
    use crate::table::Table;
    use peaktable_type::{ColumnFormat, Type, Value};
    use peaktable_testing::temp_dir;
    use std::fs;

    fn table() -> Table {
        Table::new(
            vec!["mz", "rt", "__hidden"],
            vec![Type::Float, Type::Float, Type::Int],
            vec![ColumnFormat::Fixed(5), ColumnFormat::Minutes, ColumnFormat::Suppressed],
            vec![
                vec![Value::float(100.5), Value::float(90.0), Value::Int(1)],
                vec![Value::float(200.25), Value::Undefined, Value::Int(2)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_render_skips_suppressed_columns() {
        let rendered = table().render();
        assert!(rendered.contains("mz"));
        assert!(!rendered.contains("__hidden"));
        assert!(rendered.contains("100.50000"));
        assert!(rendered.contains("1.50m"));
        assert!(rendered.contains("-"));
    }

    #[test]
    fn test_write_csv() {
        temp_dir(|dir| {
            let path = dir.join("out.csv");
            let written = table().write_csv(&path).unwrap();
            assert_eq!(written, path);

            let content = fs::read_to_string(&written).unwrap();
            let lines: Vec<&str> = content.lines().collect();
            assert_eq!(lines[0], "mz; rt");
            assert_eq!(lines[1], "100.50000; 1.50m");
            assert_eq!(lines[2], "200.25000; -");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_write_csv_never_overwrites() {
        temp_dir(|dir| {
            let path = dir.join("out.csv");
            let first = table().write_csv(&path).unwrap();
            let second = table().write_csv(&path).unwrap();
            let third = table().write_csv(&path).unwrap();

            assert_eq!(first, path);
            assert_eq!(second, dir.join("out.csv.1"));
            assert_eq!(third, dir.join("out.csv.2"));
            Ok(())
        })
        .unwrap();
    }
}
