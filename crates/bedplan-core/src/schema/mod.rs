//! Schema guard: version markers on tabular inputs and JSONL configs.
//!
//! Row-oriented tables carry a leading comment line `# schema_version: N`.
//! JSONL configs carry a `schema_version` key in one of their records (the
//! first one that has it wins). Both are checked before any row data is
//! interpreted, so legacy or foreign files are rejected up front.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{parse_whole, whole_number};
use crate::error::{Error, Result};

/// Errors raised by the schema guard.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Missing schema_version header comment in {}", .path.display())]
    MissingHeader { path: PathBuf },

    #[error("Missing schema_version in {}", .path.display())]
    MissingKey { path: PathBuf },

    #[error("invalid schema_version {value:?} in {}", .path.display())]
    InvalidMarker { path: PathBuf, value: String },

    #[error(
        "Schema version mismatch in {}: expected {expected}, got {actual}",
        .path.display()
    )]
    Mismatch {
        path: PathBuf,
        expected: u32,
        actual: u32,
    },
}

/// On-disk flavour of a versioned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// Comma-separated table with a `# schema_version: N` comment.
    Csv,
    /// Line-delimited JSON records.
    Jsonl,
}

impl SchemaFormat {
    /// Pick the format from a file extension; anything not `.jsonl`/`.json`
    /// is treated as a table.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("json") => {
                Self::Jsonl
            }
            _ => Self::Csv,
        }
    }
}

/// Read the version marker of `path`, choosing the format by extension.
pub fn read_schema_version(path: &Path) -> Result<u32> {
    match SchemaFormat::from_path(path) {
        SchemaFormat::Csv => read_schema_version_from_csv(path),
        SchemaFormat::Jsonl => read_schema_version_from_jsonl(path),
    }
}

/// Return the version from a table's leading comment block.
///
/// Blank lines are skipped. The first non-blank line that is not a comment
/// ends the search: a marker appearing after data does not count.
pub fn read_schema_version_from_csv(path: &Path) -> Result<u32> {
    let text = read(path)?;
    csv_version(&text, path)
}

/// Return the first `schema_version` found among a JSONL file's records.
pub fn read_schema_version_from_jsonl(path: &Path) -> Result<u32> {
    let text = read(path)?;
    jsonl_version(&text, path)
}

/// Check a table's marker against `expected` and return it.
pub fn ensure_csv_schema(path: &Path, expected: u32) -> Result<u32> {
    let actual = read_schema_version_from_csv(path)?;
    check(path, actual, expected)
}

/// Check a JSONL config's marker against `expected` and return it.
pub fn ensure_jsonl_schema(path: &Path, expected: u32) -> Result<u32> {
    let actual = read_schema_version_from_jsonl(path)?;
    check(path, actual, expected)
}

/// Check any versioned input, choosing the format by extension.
pub fn ensure_schema(path: &Path, expected: u32) -> Result<u32> {
    let actual = read_schema_version(path)?;
    check(path, actual, expected)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn check(path: &Path, actual: u32, expected: u32) -> Result<u32> {
    if actual != expected {
        return Err(SchemaError::Mismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        }
        .into());
    }
    Ok(actual)
}

fn csv_version(text: &str, path: &Path) -> Result<u32> {
    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }
        let Some(comment) = stripped.strip_prefix('#') else {
            break;
        };
        let comment = comment.trim_start_matches('#').trim();
        let Some((key, value)) = comment.split_once(':') else {
            continue;
        };
        if key.trim() != "schema_version" {
            continue;
        }
        return parse_version(value.trim(), path);
    }
    Err(SchemaError::MissingHeader {
        path: path.to_path_buf(),
    }
    .into())
}

fn jsonl_version(text: &str, path: &Path) -> Result<u32> {
    for (idx, line) in text.lines().enumerate() {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }
        let record: serde_json::Value =
            serde_json::from_str(stripped).map_err(|source| Error::Json {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
        let Some(value) = record.get("schema_version") else {
            continue;
        };
        return match value {
            serde_json::Value::String(s) => parse_version(s, path),
            other => whole_number(other)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| invalid_marker(&other.to_string(), path)),
        };
    }
    Err(SchemaError::MissingKey {
        path: path.to_path_buf(),
    }
    .into())
}

/// Accepts `2`, `2.0` and surrounding whitespace.
fn parse_version(value: &str, path: &Path) -> Result<u32> {
    parse_whole(value)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| invalid_marker(value.trim(), path))
}

fn invalid_marker(value: &str, path: &Path) -> Error {
    SchemaError::InvalidMarker {
        path: path.to_path_buf(),
        value: value.to_owned(),
    }
    .into()
}
