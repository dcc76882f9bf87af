//! Presentation-only settings for the grid image. Every key is optional.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::load_jsonl_config;
use crate::error::Result;

/// Colors, fonts, and cell sizing for the rendered grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualsConfig {
    /// Edge length of one block cell in pixels.
    pub cell_size: u32,
    pub font_family: String,
    /// Font size for crop labels.
    pub label_font_size: u32,
    /// Font size for conflict labels.
    pub conflict_font_size: u32,
    /// Font size for reserved labels, bed numbers, and notes.
    pub reserved_font_size: u32,
    /// Lines available to a conflict label, including the leading `!`.
    pub conflict_max_lines: usize,
    /// Width of the bed-number column; defaults to `cell_size`.
    pub row_label_width: Option<u32>,
    /// Notes column width as a fraction of the grid width.
    #[serde(rename = "notes_col_width_ratio")]
    pub notes_width_ratio: f64,
    /// Fill per plant family for crop cells.
    pub family_colors: BTreeMap<String, String>,
    /// Fill overrides per cell status.
    pub status_colors: BTreeMap<String, String>,
    /// Fill opacity per water requirement for crop cells.
    pub water_alpha: BTreeMap<String, f64>,
    /// Border style (`solid`, `dashed`, `dotted`) per water requirement.
    pub water_borders: BTreeMap<String, String>,
}

impl Default for VisualsConfig {
    fn default() -> Self {
        Self {
            cell_size: 40,
            font_family: "Helvetica".to_owned(),
            label_font_size: 10,
            conflict_font_size: 8,
            reserved_font_size: 9,
            conflict_max_lines: 4,
            row_label_width: None,
            notes_width_ratio: 0.33,
            family_colors: BTreeMap::new(),
            status_colors: BTreeMap::new(),
            water_alpha: BTreeMap::new(),
            water_borders: BTreeMap::new(),
        }
    }
}

impl VisualsConfig {
    pub fn load(path: &Path, schema_version: u32) -> Result<Self> {
        load_jsonl_config(path, schema_version)
    }

    pub fn row_label_width(&self) -> u32 {
        self.row_label_width.unwrap_or(self.cell_size)
    }
}
