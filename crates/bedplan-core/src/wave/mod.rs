//! Wave identifiers: the composite key joining assignments to schedule rows.
//!
//! A wave id is `crop:variety:plant_date`, with `:wave_seq` appended when a
//! sequence number is present. Schedule rows and assignment rows must both
//! go through [`build_wave_id`] so the keys match byte for byte.

use crate::table::Table;

/// Column holding the derived id.
pub const WAVE_ID_COLUMN: &str = "wave_id";
/// Optional disambiguating sequence column.
pub const WAVE_SEQ_COLUMN: &str = "wave_seq";

/// Build the wave id for one planting event.
///
/// `crop`, `variety`, and `plant_date` are trimmed. A `wave_seq` that is
/// absent, blank, or a spreadsheet NaN marker is omitted, so all of those
/// forms produce the same id.
pub fn build_wave_id(crop: &str, variety: &str, plant_date: &str, wave_seq: Option<&str>) -> String {
    let base = format!("{}:{}:{}", crop.trim(), variety.trim(), plant_date.trim());
    match normalize_wave_seq(wave_seq) {
        Some(seq) => format!("{base}:{seq}"),
        None => base,
    }
}

/// Trimmed sequence value, or `None` when it should be left off the id.
pub fn normalize_wave_seq(wave_seq: Option<&str>) -> Option<&str> {
    let seq = wave_seq?.trim();
    if seq.is_empty() || seq.eq_ignore_ascii_case("nan") {
        None
    } else {
        Some(seq)
    }
}

/// Derive `wave_id` for every row of a schedule table.
///
/// `wave_seq` is read per row when the column exists; otherwise it is
/// omitted for all rows.
pub fn apply_wave_id(table: &mut Table) {
    let has_seq = table.has_column(WAVE_SEQ_COLUMN);
    table.fill_column(WAVE_ID_COLUMN, |row| {
        let seq = if has_seq { row.get(WAVE_SEQ_COLUMN) } else { None };
        Some(build_wave_id(
            row.text("crop"),
            row.text("variety"),
            row.text("plant_date"),
            seq,
        ))
    });
}
