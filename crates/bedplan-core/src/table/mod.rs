//! Row-oriented table abstraction over comma-separated inputs.
//!
//! Tables are read with the `csv` crate: `#` comment lines and blank lines
//! are skipped, short rows are padded with empty cells, and every row keeps
//! the source line it came from so validation errors can point at it.
//!
//! The validation helpers ([`Table::validate_required`],
//! [`Table::validate_required_where`], [`parse_number`]) are shared by
//! the assignment validator and the schedule loader.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::error::{Error, Result};

/// Data-shape errors: the table does not have the columns or values the
/// caller needs.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("{context} is empty")]
    Empty { context: String },

    #[error("{context} is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        context: String,
        columns: Vec<String>,
    },

    #[error("{context} has empty required values: {}", .columns.join(", "))]
    EmptyValues {
        context: String,
        columns: Vec<String>,
    },

    #[error("{context} has non-numeric {column} value {value:?} on line {line}")]
    NonNumeric {
        context: String,
        column: String,
        value: String,
        line: u64,
    },

    #[error("{context} has invalid {column} value {value:?} on line {line} (expected {expected})")]
    InvalidValue {
        context: String,
        column: String,
        value: String,
        line: u64,
        expected: String,
    },

    #[error("{context} line {line} has {found} fields, header declares {expected}")]
    RaggedRow {
        context: String,
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// One data row. Values are positionally aligned with the table's columns.
#[derive(Debug, Clone, PartialEq)]
struct Row {
    line: u64,
    values: Vec<String>,
}

/// An in-memory table: a header plus rows of string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

/// Borrowed view of a single row.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl<'a> Record<'a> {
    /// Cell value, or `None` when the column does not exist.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.row.values.get(idx))
            .map(String::as_str)
    }

    /// Cell value, with absent columns reading as the empty string.
    pub fn text(&self, column: &str) -> &'a str {
        self.get(column).unwrap_or("")
    }

    /// True when the column is absent or its cell is blank.
    pub fn is_blank(&self, column: &str) -> bool {
        self.get(column).is_none_or(is_blank)
    }

    /// True when every cell in the row is blank.
    pub fn is_all_blank(&self) -> bool {
        self.row.values.iter().all(|v| is_blank(v))
    }

    /// Source line of the row (1-based, counting comment lines).
    pub fn line(&self) -> u64 {
        self.row.line
    }
}

impl Table {
    /// Build a table from explicit columns and rows (used by tests and by
    /// callers that already hold parsed data).
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(idx, mut values)| {
                values.resize(width, String::new());
                Row {
                    line: idx as u64 + 2,
                    values,
                }
            })
            .collect();
        Self { columns, rows }
    }

    /// Read a comma-separated file from disk.
    ///
    /// `context` names the table in data-shape errors (e.g. "bed assignments").
    pub fn read_csv(path: &Path, context: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse_csv(&text, path, context)
    }

    /// Parse comma-separated text; `path` is only used for error messages.
    pub fn parse_csv(text: &str, path: &Path, context: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .flexible(true)
            .has_headers(true)
            .from_reader(text.as_bytes());

        let csv_err = |source| Error::Csv {
            path: path.to_path_buf(),
            source,
        };

        let columns: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        if columns.iter().all(|c| c.is_empty()) {
            return Err(TableError::Empty {
                context: context.to_owned(),
            }
            .into());
        }

        let width = columns.len();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let line = record.position().map_or(0, |p| p.line());
            if record.len() > width {
                let extra_blank = record.iter().skip(width).all(is_blank);
                if !extra_blank {
                    return Err(TableError::RaggedRow {
                        context: context.to_owned(),
                        line,
                        expected: width,
                        found: record.len(),
                    }
                    .into());
                }
            }
            let mut values: Vec<String> = record.iter().take(width).map(str::to_owned).collect();
            values.resize(width, String::new());
            rows.push(Row { line, values });
        }

        debug!(path = %path.display(), rows = rows.len(), "parsed {context}");
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Iterate rows in file order.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(|row| Record {
            columns: &self.columns,
            row,
        })
    }

    /// Keep only rows for which `keep` returns true. Returns how many rows
    /// were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(Record<'_>) -> bool) -> usize {
        let before = self.rows.len();
        let columns = &self.columns;
        self.rows.retain(|row| keep(Record { columns, row }));
        before - self.rows.len()
    }

    /// Drop rows whose every cell is blank.
    pub fn drop_blank_rows(&mut self) -> usize {
        self.retain(|r| !r.is_all_blank())
    }

    /// Add `column` if absent and fill every cell computed by `value`;
    /// if present, cells are overwritten only where `value` returns `Some`.
    pub fn fill_column(
        &mut self,
        column: &str,
        mut value: impl FnMut(Record<'_>) -> Option<String>,
    ) {
        let idx = match self.columns.iter().position(|c| c == column) {
            Some(idx) => idx,
            None => {
                self.columns.push(column.to_owned());
                for row in &mut self.rows {
                    row.values.push(String::new());
                }
                self.columns.len() - 1
            }
        };
        let columns = self.columns.clone();
        for row in &mut self.rows {
            let computed = value(Record {
                columns: &columns,
                row: &*row,
            });
            if let Some(v) = computed {
                row.values[idx] = v;
            }
        }
    }

    /// Fail with every missing column named together.
    pub fn require_columns(&self, required: &[&str], context: &str) -> Result<(), TableError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| (*c).to_owned())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TableError::MissingColumns {
                context: context.to_owned(),
                columns: missing,
            })
        }
    }

    /// Require columns to exist and to be non-blank on every row.
    pub fn validate_required(&self, required: &[&str], context: &str) -> Result<(), TableError> {
        self.validate_required_where(required, context, |_| true)
    }

    /// Like [`Table::validate_required`], but value checks only apply to rows
    /// selected by `applies`. Column presence is checked regardless.
    pub fn validate_required_where(
        &self,
        required: &[&str],
        context: &str,
        applies: impl Fn(Record<'_>) -> bool,
    ) -> Result<(), TableError> {
        self.require_columns(required, context)?;
        let empty: Vec<String> = required
            .iter()
            .filter(|c| {
                self.records()
                    .filter(|r| applies(*r))
                    .any(|r| r.is_blank(c))
            })
            .map(|c| (*c).to_owned())
            .collect();
        if empty.is_empty() {
            Ok(())
        } else {
            Err(TableError::EmptyValues {
                context: context.to_owned(),
                columns: empty,
            })
        }
    }
}

/// Whitespace-only cells count as blank.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Coerce a cell to a finite number. Blank and non-numeric cells yield `None`.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Table {
        Table::parse_csv(text, Path::new("t.csv"), "test").expect("should parse")
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let table = parse("# schema_version: 1\na,b\n\n1,2\n# note\n3,4\n");
        assert_eq!(table.columns(), ["a", "b"]);
        assert_eq!(table.len(), 2);
        let values: Vec<&str> = table.records().map(|r| r.text("b")).collect();
        assert_eq!(values, ["2", "4"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let table = parse("a,b,c\n1\n");
        let rec = table.records().next().unwrap();
        assert_eq!(rec.get("c"), Some(""));
        assert!(rec.is_blank("c"));
    }

    #[test]
    fn long_rows_with_content_are_rejected() {
        let err = Table::parse_csv("a,b\n1,2,3\n", Path::new("t.csv"), "test").unwrap_err();
        assert!(
            matches!(err, Error::DataShape(TableError::RaggedRow { expected: 2, found: 3, .. })),
            "expected RaggedRow, got: {err}"
        );
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let table = parse("a,b\n");
        assert!(table.is_empty());
    }

    #[test]
    fn missing_header_is_empty_table() {
        let err = Table::parse_csv("# schema_version: 1\n", Path::new("t.csv"), "things")
            .unwrap_err();
        assert_eq!(err.to_string(), "things is empty");
    }

    #[test]
    fn rows_remember_source_lines() {
        let table = parse("# schema_version: 1\na\n1\n\n2\n");
        let lines: Vec<u64> = table.records().map(|r| r.line()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0] > 1 && lines[1] > lines[0], "unexpected lines: {lines:?}");
    }

    #[test]
    fn drop_blank_rows_removes_comma_only_lines() {
        let mut table = parse("a,b\n1,2\n,\n , \n");
        assert_eq!(table.drop_blank_rows(), 2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn missing_columns_are_reported_together() {
        let table = parse("a\n1\n");
        let err = table.require_columns(&["a", "b", "c"], "test").unwrap_err();
        assert_eq!(err.to_string(), "test is missing required columns: b, c");
    }

    #[test]
    fn empty_required_values_are_reported() {
        let table = parse("a,b\n1,2\n,3\n");
        let err = table.validate_required(&["a", "b"], "test").unwrap_err();
        assert_eq!(err.to_string(), "test has empty required values: a");
    }

    #[test]
    fn value_checks_respect_row_filter() {
        let table = parse("kind,x\nskip,\nkeep,1\n");
        table
            .validate_required_where(&["x"], "test", |r| r.text("kind") == "keep")
            .expect("skipped row should not be checked");
    }

    #[test]
    fn fill_column_adds_and_overwrites() {
        let mut table = parse("a\n1\n\n2\n");
        table.fill_column("b", |r| Some(format!("{}!", r.text("a"))));
        let b: Vec<&str> = table.records().map(|r| r.text("b")).collect();
        assert_eq!(b, ["1!", "2!"]);

        table.fill_column("a", |r| (r.text("a") == "1").then(|| "one".to_owned()));
        let a: Vec<&str> = table.records().map(|r| r.text("a")).collect();
        assert_eq!(a, ["one", "2"]);
    }

    #[test]
    fn parse_number_accepts_floats_and_rejects_text() {
        assert_eq!(parse_number(" 10 "), Some(10.0));
        assert_eq!(parse_number("2.5"), Some(2.5));
        assert_eq!(parse_number("ten"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("inf"), None);
    }
}
