use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What an assignment places in a bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    /// A scheduled crop wave.
    Crop,
    /// A beneficial-insect strip; carries no crop fields.
    Beneficial,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Crop => "CROP",
            Self::Beneficial => "BENEFICIAL",
        };
        f.write_str(s)
    }
}

impl FromStr for AssignmentStatus {
    type Err = AssignmentStatusParseError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("crop") {
            Ok(Self::Crop)
        } else if trimmed.eq_ignore_ascii_case("beneficial") {
            Ok(Self::Beneficial)
        } else {
            Err(AssignmentStatusParseError(s.to_owned()))
        }
    }
}

/// Error returned when parsing an invalid [`AssignmentStatus`] string.
#[derive(Debug, Clone)]
pub struct AssignmentStatusParseError(pub String);

impl fmt::Display for AssignmentStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid assignment status: {:?}", self.0)
    }
}

impl std::error::Error for AssignmentStatusParseError {}

// ---------------------------------------------------------------------------

/// An assignment row after coercion but before geometric validation.
///
/// Positions are still floating point here: alignment has not been checked.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawAssignment {
    pub line: u64,
    pub bed_id: f64,
    pub start_ft: f64,
    pub length_ft: f64,
    pub status: AssignmentStatus,
    pub crop: String,
    pub variety: String,
    pub wave_id: String,
    pub plant_date: String,
    pub notes: Option<String>,
}

impl RawAssignment {
    pub fn end_ft(&self) -> f64 {
        self.start_ft + self.length_ft
    }
}

/// One validated placement, annotated with its block range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub bed_id: u32,
    pub start_ft: u32,
    pub length_ft: u32,
    pub status: AssignmentStatus,
    pub crop: String,
    pub variety: String,
    pub wave_id: String,
    pub plant_date: String,
    pub notes: Option<String>,
    /// First block covered.
    pub start_block: usize,
    /// One past the last block covered.
    pub end_block: usize,
}

impl Assignment {
    pub fn is_crop(&self) -> bool {
        self.status == AssignmentStatus::Crop
    }

    /// Block indices this assignment covers.
    pub fn blocks(&self) -> std::ops::Range<usize> {
        self.start_block..self.end_block
    }
}
