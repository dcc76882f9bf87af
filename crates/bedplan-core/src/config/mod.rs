//! Line-delimited JSON configs: bed geometry and grid visuals.
//!
//! A config file is a sequence of JSON objects, one per line. Objects are
//! merged left to right into a single key-value map (later keys win), then
//! deserialized into a typed struct. The schema version is checked before
//! anything else is read.

pub mod geometry;
pub mod visuals;

use std::path::{Path, PathBuf};

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::schema::ensure_jsonl_schema;

pub use geometry::BedGeometry;
pub use visuals::VisualsConfig;

/// Structural problems with a config after it parsed as JSON.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line} of {} is not a JSON object", .path.display())]
    NotAnObject { path: PathBuf, line: usize },

    #[error("{key} must be at least 1 in {}", .path.display())]
    NonPositive { path: PathBuf, key: &'static str },

    #[error("bed_length_ft must be divisible by block_size_ft ({bed_length_ft} % {block_size_ft} != 0)")]
    IndivisibleBedLength {
        bed_length_ft: u32,
        block_size_ft: u32,
    },
}

/// Validate the schema version, then merge every record into one map.
pub fn load_jsonl_map(path: &Path, schema_version: u32) -> Result<Map<String, Value>> {
    ensure_jsonl_schema(path, schema_version)?;
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    merge_records(&text, path)
}

/// Load a JSONL config and deserialize the merged map into `T`.
pub fn load_jsonl_config<T: DeserializeOwned>(path: &Path, schema_version: u32) -> Result<T> {
    let map = load_jsonl_map(path, schema_version)?;
    serde_json::from_value(Value::Object(map)).map_err(|source| {
        ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

/// A non-negative whole number written as a JSON integer, an integral
/// float (`12.0`), or a numeric string (`"12"`).
pub fn whole_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => parse_whole(s),
        _ => None,
    }
}

/// Text form of [`whole_number`].
pub fn parse_whole(text: &str) -> Option<u64> {
    let text = text.trim();
    text.parse::<u64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(integral))
}

fn integral(v: f64) -> Option<u64> {
    (v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64).then_some(v as u64)
}

/// `deserialize_with` helper accepting any [`whole_number`] form as `u32`.
pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    whole_number(&value)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| de::Error::custom(format!("expected a whole number, got {value}")))
}

fn merge_records(text: &str, path: &Path) -> Result<Map<String, Value>> {
    let mut merged = Map::new();
    for (idx, line) in text.lines().enumerate() {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(stripped).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        let Value::Object(record) = value else {
            return Err(ConfigError::NotAnObject {
                path: path.to_path_buf(),
                line: idx + 1,
            }
            .into());
        };
        merged.extend(record);
    }
    Ok(merged)
}
