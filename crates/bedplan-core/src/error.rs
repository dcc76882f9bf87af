//! Crate-level error type.
//!
//! Each concern owns a focused error enum ([`SchemaError`], [`TableError`],
//! [`GeometryError`], [`ConfigError`]); [`Error`] wraps them so the public
//! operations return a single type. Everything here is fatal: the one
//! recoverable condition (raster export) is reported through
//! [`crate::render::RasterOutcome`] instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::assign::GeometryError;
use crate::config::ConfigError;
use crate::schema::SchemaError;
use crate::table::TableError;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Version marker missing or mismatched.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Missing column, empty table, empty required value, or a value that
    /// failed numeric coercion.
    #[error(transparent)]
    DataShape(#[from] TableError),

    /// Out-of-bounds, misaligned, or overlapping assignment.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Geometry or visuals config is structurally invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Crop assignments reference waves the schedule does not contain.
    #[error("Unknown wave_id values: {}", format_list(.0))]
    UnknownWaves(Vec<String>),

    /// Crop assignments whose schedule entry carries no plant family.
    #[error("Missing family data for crop wave_id values: {}", format_list(.0))]
    MissingFamily(Vec<String>),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid JSON on line {line} of {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Render ids as `['a', 'b']` so a single message lists all of them.
fn format_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{s}'")).collect();
    format!("[{}]", quoted.join(", "))
}
