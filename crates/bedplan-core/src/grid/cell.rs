use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Resolved status of one `(bed, block)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellStatus {
    Empty,
    Flower,
    Beneficial,
    Crop,
    Conflict,
}

impl CellStatus {
    pub const ALL: [Self; 5] = [
        Self::Empty,
        Self::Flower,
        Self::Beneficial,
        Self::Crop,
        Self::Conflict,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::Flower => "FLOWER",
            Self::Beneficial => "BENEFICIAL",
            Self::Crop => "CROP",
            Self::Conflict => "CONFLICT",
        }
    }
}

impl fmt::Display for CellStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellStatus {
    type Err = CellStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CellStatusParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`CellStatus`] string.
#[derive(Debug, Clone)]
pub struct CellStatusParseError(pub String);

impl fmt::Display for CellStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cell status: {:?}", self.0)
    }
}

impl std::error::Error for CellStatusParseError {}

// ---------------------------------------------------------------------------

/// A reserved strip: set aside by geometry or by a BENEFICIAL assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reserved {
    Flower,
    Beneficial,
}

impl Reserved {
    pub fn status(self) -> CellStatus {
        match self {
            Self::Flower => CellStatus::Flower,
            Self::Beneficial => CellStatus::Beneficial,
        }
    }
}

/// The slice of a crop assignment that falls in one cell, already joined
/// with its schedule entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CropOccupant {
    pub crop: String,
    pub variety: String,
    pub wave_id: String,
    pub family: String,
    pub water: String,
    pub notes: String,
}

/// Something claiming a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occupant {
    Reserved(Reserved),
    Crop(CropOccupant),
}

/// One row of the grid table.
///
/// Field order is the column order of the exported CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub bed_id: u32,
    pub block_idx: usize,
    pub status: CellStatus,
    pub crop: String,
    pub variety: String,
    pub wave_id: String,
    pub family: String,
    pub water: String,
    pub notes: String,
    /// Occupant descriptions joined with `" | "`; empty unless CONFLICT.
    pub conflict_details: String,
    pub color: String,
    pub alpha: f64,
    pub border_style: String,
    pub run_id: usize,
}

/// Separator between conflict descriptions in `conflict_details`.
pub const CONFLICT_SEPARATOR: &str = " | ";

impl GridCell {
    /// Conflict descriptions, in occupant order.
    pub fn conflict_list(&self) -> Vec<&str> {
        if self.conflict_details.is_empty() {
            Vec::new()
        } else {
            self.conflict_details.split(CONFLICT_SEPARATOR).collect()
        }
    }
}
