//! Succession schedule: the planned plantings assignments refer to.
//!
//! The schedule is produced upstream as a versioned table. Only the columns
//! the grid needs are interpreted; everything else is carried through
//! untouched by ignoring it.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::schema::ensure_csv_schema;
use crate::table::Table;
use crate::wave::{WAVE_ID_COLUMN, WAVE_SEQ_COLUMN, apply_wave_id, normalize_wave_seq};

/// Context string used in data-shape errors.
pub const SCHEDULE_CONTEXT: &str = "succession schedule";

/// Columns every schedule row must fill.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "crop",
    "variety",
    "plant_date",
    "succession_days",
    "row_feet",
    "water",
];

/// One planned succession planting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub crop: String,
    pub variety: String,
    pub plant_date: String,
    pub succession_days: String,
    pub row_feet: String,
    /// Water requirement category (e.g. `low`, `medium`, `high`).
    pub water: String,
    pub wave_seq: Option<String>,
    /// Plant family from the `plant_type` column, used for coloring.
    pub family: Option<String>,
    pub wave_id: String,
}

/// A parsed schedule, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    /// Check the schema marker, then parse and validate the table.
    pub fn load(path: &Path, schema_version: u32) -> Result<Self> {
        ensure_csv_schema(path, schema_version)?;
        let table = Table::read_csv(path, SCHEDULE_CONTEXT)?;
        let schedule = Self::from_table(table)?;
        debug!(
            path = %path.display(),
            entries = schedule.len(),
            waves = schedule.wave_ids().len(),
            "loaded succession schedule"
        );
        Ok(schedule)
    }

    /// Validate required columns and derive a wave id for every row.
    pub fn from_table(mut table: Table) -> Result<Self> {
        table.validate_required(&REQUIRED_COLUMNS, SCHEDULE_CONTEXT)?;
        apply_wave_id(&mut table);

        let entries = table
            .records()
            .map(|r| {
                let optional = |column: &str| {
                    let value = r.text(column).trim();
                    (!value.is_empty()).then(|| value.to_owned())
                };
                ScheduleEntry {
                    crop: r.text("crop").trim().to_owned(),
                    variety: r.text("variety").trim().to_owned(),
                    plant_date: r.text("plant_date").trim().to_owned(),
                    succession_days: r.text("succession_days").trim().to_owned(),
                    row_feet: r.text("row_feet").trim().to_owned(),
                    water: r.text("water").trim().to_owned(),
                    wave_seq: normalize_wave_seq(r.get(WAVE_SEQ_COLUMN)).map(str::to_owned),
                    family: optional("plant_type"),
                    wave_id: r.text(WAVE_ID_COLUMN).to_owned(),
                }
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every derived wave id.
    pub fn wave_ids(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.wave_id.as_str()).collect()
    }

    /// First entry carrying `wave_id`.
    pub fn find(&self, wave_id: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.wave_id == wave_id)
    }
}
