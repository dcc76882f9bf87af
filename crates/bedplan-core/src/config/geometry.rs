//! Bed geometry: how many beds, how long, and how they split into blocks.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConfigError, load_jsonl_config};
use crate::error::Result;

/// Process-wide geometry constants for one planning run.
///
/// Reserved blocks (`flower_blocks`, `beneficial_block`) are block indices
/// that apply to every bed alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedGeometry {
    /// Number of beds; valid bed ids are `1..=bed_count`.
    #[serde(deserialize_with = "super::lenient_u32")]
    pub bed_count: u32,
    /// Length of every bed in feet.
    #[serde(deserialize_with = "super::lenient_u32")]
    pub bed_length_ft: u32,
    /// Size of one block in feet.
    #[serde(deserialize_with = "super::lenient_u32")]
    pub block_size_ft: u32,
    /// Block indices reserved for flower strips in every bed.
    #[serde(default)]
    pub flower_blocks: BTreeSet<usize>,
    /// Block index reserved for the beneficial-insect strip in every bed.
    #[serde(default)]
    pub beneficial_block: Option<usize>,
    /// Display text per reserved status (e.g. `"FLOWER": "Flowers"`).
    #[serde(default)]
    pub reserved_labels: BTreeMap<String, String>,
}

impl BedGeometry {
    /// Load and validate a geometry config.
    pub fn load(path: &Path, schema_version: u32) -> Result<Self> {
        let geometry: Self = load_jsonl_config(path, schema_version)?;
        for (key, value) in [
            ("bed_count", geometry.bed_count),
            ("bed_length_ft", geometry.bed_length_ft),
            ("block_size_ft", geometry.block_size_ft),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositive {
                    path: path.to_path_buf(),
                    key,
                }
                .into());
            }
        }
        Ok(geometry)
    }

    /// Number of blocks in each bed. Fails when the bed length is not a
    /// whole number of blocks.
    pub fn blocks_per_bed(&self) -> Result<usize, ConfigError> {
        if self.block_size_ft == 0 || self.bed_length_ft % self.block_size_ft != 0 {
            return Err(ConfigError::IndivisibleBedLength {
                bed_length_ft: self.bed_length_ft,
                block_size_ft: self.block_size_ft,
            });
        }
        Ok((self.bed_length_ft / self.block_size_ft) as usize)
    }

    /// Display label for a reserved status, falling back to the status name.
    pub fn reserved_label<'a>(&'a self, status: &'a str) -> &'a str {
        self.reserved_labels
            .get(status)
            .map(String::as_str)
            .unwrap_or(status)
    }

    pub fn is_flower_block(&self, block_idx: usize) -> bool {
        self.flower_blocks.contains(&block_idx)
    }

    pub fn is_beneficial_block(&self, block_idx: usize) -> bool {
        self.beneficial_block == Some(block_idx)
    }
}
