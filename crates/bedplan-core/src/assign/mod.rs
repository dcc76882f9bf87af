//! Bed assignment validation.
//!
//! [`build_assignments`] loads user-authored bed assignments and the
//! succession schedule, validates them against the bed geometry, and
//! annotates every row with its block range. Checks run in a fixed order so
//! the reported error is deterministic:
//!
//! 1. schema markers and emptiness
//! 2. column presence and required values
//! 3. numeric coercion
//! 4. bounds, then alignment, then overlap
//! 5. wave ids against the schedule (all unknown ids in one error)
//!
//! The first failure aborts the whole call; nothing is partially returned.

mod checks;
mod types;

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info};

pub use checks::GeometryError;
pub use types::{Assignment, AssignmentStatus, AssignmentStatusParseError};

use crate::config::BedGeometry;
use crate::error::{Error, Result};
use crate::schedule::Schedule;
use crate::schema::ensure_csv_schema;
use crate::table::{Record, Table, TableError, parse_number};
use types::RawAssignment;

/// Context strings used in data-shape errors.
pub const ASSIGNMENTS_CONTEXT: &str = "bed assignments";
const CROP_ROWS_CONTEXT: &str = "bed assignments (crop rows)";

/// Columns every assignment row must fill.
pub const BASE_COLUMNS: [&str; 4] = ["bed_id", "start_ft", "length_ft", "status"];
/// Columns crop rows must additionally fill.
pub const CROP_COLUMNS: [&str; 4] = ["crop", "variety", "wave_id", "plant_date"];

/// Validated assignments plus the schedule they were checked against.
#[derive(Debug, Clone)]
pub struct ValidatedAssignments {
    pub assignments: Vec<Assignment>,
    pub schedule: Schedule,
}

impl ValidatedAssignments {
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Load the geometry config, then validate assignments against it.
pub fn build_assignments(
    assignments_path: &Path,
    schedule_path: &Path,
    config_path: &Path,
    schema_version: u32,
) -> Result<ValidatedAssignments> {
    let geometry = BedGeometry::load(config_path, schema_version)?;
    build_assignments_with_geometry(assignments_path, schedule_path, &geometry, schema_version)
}

/// Validate assignments against an already loaded geometry.
pub fn build_assignments_with_geometry(
    assignments_path: &Path,
    schedule_path: &Path,
    geometry: &BedGeometry,
    schema_version: u32,
) -> Result<ValidatedAssignments> {
    ensure_csv_schema(assignments_path, schema_version)?;
    let table = Table::read_csv(assignments_path, ASSIGNMENTS_CONTEXT)?;
    let rows = parse_assignment_rows(table)?;

    let schedule = Schedule::load(schedule_path, schema_version)?;
    let assignments = validate_rows(rows, &schedule, geometry)?;

    info!(
        path = %assignments_path.display(),
        rows = assignments.len(),
        "validated bed assignments"
    );
    Ok(ValidatedAssignments {
        assignments,
        schedule,
    })
}

/// Shape checks and coercion: table in, typed rows out.
pub(crate) fn parse_assignment_rows(mut table: Table) -> Result<Vec<RawAssignment>> {
    let blank = table.drop_blank_rows();
    if blank > 0 {
        debug!(rows = blank, "dropped blank assignment rows");
    }
    if table.is_empty() {
        return Err(TableError::Empty {
            context: ASSIGNMENTS_CONTEXT.to_owned(),
        }
        .into());
    }

    // Crop columns must exist even when every row is BENEFICIAL; their
    // values are only required on crop rows.
    let required: Vec<&str> = BASE_COLUMNS[..3]
        .iter()
        .chain(&CROP_COLUMNS)
        .copied()
        .collect();
    table.require_columns(&required, ASSIGNMENTS_CONTEXT)?;
    drop_stray_rows(&mut table)?;

    table.fill_column("status", |r| {
        r.is_blank("status")
            .then(|| AssignmentStatus::Crop.to_string())
    });
    table.validate_required(&BASE_COLUMNS, ASSIGNMENTS_CONTEXT)?;

    let statuses = table
        .records()
        .map(parse_status)
        .collect::<Result<Vec<_>, _>>()?;

    let positions = table
        .records()
        .map(|r| Ok((coerce(r, "start_ft")?, coerce(r, "length_ft")?)))
        .collect::<Result<Vec<_>, TableError>>()?;

    let crop_lines: BTreeSet<u64> = table
        .records()
        .zip(&statuses)
        .filter(|(_, s)| **s == AssignmentStatus::Crop)
        .map(|(r, _)| r.line())
        .collect();
    table.validate_required_where(&CROP_COLUMNS, CROP_ROWS_CONTEXT, |r| {
        crop_lines.contains(&r.line())
    })?;

    let rows = table
        .records()
        .zip(statuses)
        .zip(positions)
        .map(|((r, status), (start_ft, length_ft))| {
            let notes = r.text("notes").trim();
            RawAssignment {
                line: r.line(),
                bed_id: parse_number(r.text("bed_id")).unwrap_or_default(),
                start_ft,
                length_ft,
                status,
                crop: r.text("crop").trim().to_owned(),
                variety: r.text("variety").trim().to_owned(),
                wave_id: r.text("wave_id").trim().to_owned(),
                plant_date: r.text("plant_date").trim().to_owned(),
                notes: (!notes.is_empty()).then(|| notes.to_owned()),
            }
        })
        .collect();
    Ok(rows)
}

/// Rows whose `bed_id` is not a number and whose other cells are all blank
/// are leftovers from spreadsheet exports (a stray token below the data)
/// and are dropped. Any other non-numeric `bed_id` is an error.
fn drop_stray_rows(table: &mut Table) -> Result<(), TableError> {
    let others: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| c.as_str() != "bed_id")
        .cloned()
        .collect();
    let stray = table.retain(|r| {
        parse_number(r.text("bed_id")).is_some() || !others.iter().all(|c| r.is_blank(c))
    });
    if stray > 0 {
        debug!(rows = stray, "dropped stray assignment rows");
    }

    match table
        .records()
        .find(|r| parse_number(r.text("bed_id")).is_none())
    {
        Some(r) => Err(TableError::NonNumeric {
            context: ASSIGNMENTS_CONTEXT.to_owned(),
            column: "bed_id".to_owned(),
            value: r.text("bed_id").to_owned(),
            line: r.line(),
        }),
        None => Ok(()),
    }
}

fn parse_status(r: Record<'_>) -> Result<AssignmentStatus, TableError> {
    let value = r.text("status");
    value.parse().map_err(|_| TableError::InvalidValue {
        context: ASSIGNMENTS_CONTEXT.to_owned(),
        column: "status".to_owned(),
        value: value.to_owned(),
        line: r.line(),
        expected: "CROP or BENEFICIAL".to_owned(),
    })
}

fn coerce(r: Record<'_>, column: &str) -> Result<f64, TableError> {
    let value = r.text(column);
    parse_number(value).ok_or_else(|| TableError::NonNumeric {
        context: ASSIGNMENTS_CONTEXT.to_owned(),
        column: column.to_owned(),
        value: value.to_owned(),
        line: r.line(),
    })
}

/// Geometry and schedule checks, then block annotation.
pub(crate) fn validate_rows(
    rows: Vec<RawAssignment>,
    schedule: &Schedule,
    geometry: &BedGeometry,
) -> Result<Vec<Assignment>> {
    checks::validate_bounds(&rows, geometry)?;
    checks::validate_alignment(&rows, geometry.block_size_ft)?;
    checks::validate_overlaps(&rows)?;

    let known = schedule.wave_ids();
    let unknown: BTreeSet<&str> = rows
        .iter()
        .filter(|r| r.status == AssignmentStatus::Crop)
        .map(|r| r.wave_id.as_str())
        .filter(|id| !known.contains(id))
        .collect();
    if !unknown.is_empty() {
        return Err(Error::UnknownWaves(
            unknown.into_iter().map(str::to_owned).collect(),
        ));
    }

    let block = geometry.block_size_ft;
    Ok(rows
        .into_iter()
        .map(|r| {
            // Bounds and alignment passed: every position is a whole,
            // non-negative multiple of the block size.
            let start_ft = r.start_ft as u32;
            let length_ft = r.length_ft as u32;
            Assignment {
                bed_id: r.bed_id as u32,
                start_ft,
                length_ft,
                status: r.status,
                crop: r.crop,
                variety: r.variety,
                wave_id: r.wave_id,
                plant_date: r.plant_date,
                notes: r.notes,
                start_block: (start_ft / block) as usize,
                end_block: ((start_ft + length_ft) / block) as usize,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn geometry() -> BedGeometry {
        BedGeometry {
            bed_count: 12,
            bed_length_ft: 80,
            block_size_ft: 5,
            flower_blocks: BTreeSet::from([0, 15]),
            beneficial_block: Some(7),
            reserved_labels: BTreeMap::new(),
        }
    }

    fn schedule() -> Schedule {
        let text = "crop,variety,plant_date,succession_days,row_feet,water,plant_type\n\
                    Carrot,Bolero,2026-02-21,21,10,medium,Root\n\
                    Lettuce,Allstar,2026-03-01,14,20,high,Leafy\n";
        let table = Table::parse_csv(text, Path::new("s.csv"), "succession schedule").unwrap();
        Schedule::from_table(table).unwrap()
    }

    fn run(assignments: &str) -> Result<Vec<Assignment>> {
        let table = Table::parse_csv(assignments, Path::new("a.csv"), ASSIGNMENTS_CONTEXT)?;
        let rows = parse_assignment_rows(table)?;
        validate_rows(rows, &schedule(), &geometry())
    }

    const HEADER: &str = "bed_id,start_ft,length_ft,crop,variety,wave_id,plant_date,notes\n";

    #[test]
    fn computes_block_range() {
        let out = run(&format!(
            "{HEADER}1,0,10,Carrot,Bolero,Carrot:Bolero:2026-02-21,2026-02-21,\n"
        ))
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start_block, 0);
        assert_eq!(out[0].end_block, 2);
        assert_eq!(out[0].status, AssignmentStatus::Crop);
    }

    #[test]
    fn block_range_matches_length() {
        let out = run(&format!(
            "{HEADER}2,15,25,Lettuce,Allstar,Lettuce:Allstar:2026-03-01,2026-03-01,\n\
             2,40,5,Carrot,Bolero,Carrot:Bolero:2026-02-21,2026-02-21,\n"
        ))
        .unwrap();
        for a in &out {
            assert_eq!(a.start_block as u32, a.start_ft / 5);
            assert_eq!((a.end_block - a.start_block) as u32, a.length_ft / 5);
        }
    }

    #[test]
    fn beneficial_rows_skip_crop_fields() {
        let out = run(
            "bed_id,start_ft,length_ft,status,crop,variety,wave_id,plant_date,notes\n\
             1,10,5,BENEFICIAL,,,,,Center strip\n",
        )
        .unwrap();
        assert_eq!(out[0].status, AssignmentStatus::Beneficial);
        assert_eq!(out[0].status.to_string(), "BENEFICIAL");
        assert_eq!(out[0].notes.as_deref(), Some("Center strip"));
        assert_eq!((out[0].start_block, out[0].end_block), (2, 3));
    }

    #[test]
    fn beneficial_only_plan_still_needs_crop_columns() {
        let err = run("bed_id,start_ft,length_ft,status\n4,0,5,beneficial\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "bed assignments is missing required columns: crop, variety, wave_id, plant_date"
        );

        let out = run(
            "bed_id,start_ft,length_ft,status,crop,variety,wave_id,plant_date\n\
             4,0,5,beneficial,,,,\n",
        )
        .unwrap();
        assert_eq!(out[0].status, AssignmentStatus::Beneficial);
    }

    #[test]
    fn blank_status_defaults_to_crop() {
        let out = run(
            "bed_id,start_ft,length_ft,status,crop,variety,wave_id,plant_date\n\
             1,0,5,,Carrot,Bolero,Carrot:Bolero:2026-02-21,2026-02-21\n",
        )
        .unwrap();
        assert_eq!(out[0].status, AssignmentStatus::Crop);
    }

    #[test]
    fn status_other_than_crop_or_beneficial_is_an_error_not_a_crop() {
        let err = run(
            "bed_id,start_ft,length_ft,status,crop,variety,wave_id,plant_date\n\
             1,0,5,FALLOW,Carrot,Bolero,Carrot:Bolero:2026-02-21,2026-02-21\n",
        )
        .unwrap_err();
        assert!(
            matches!(err, Error::DataShape(TableError::InvalidValue { ref value, .. }) if value == "FALLOW"),
            "expected InvalidValue, got: {err}"
        );
    }

    #[test]
    fn header_only_table_is_empty() {
        let err = run(HEADER).unwrap_err();
        assert_eq!(err.to_string(), "bed assignments is empty");
    }

    #[test]
    fn crop_row_missing_wave_id_fails() {
        let err = run(&format!("{HEADER}1,0,10,Carrot,Bolero,,2026-02-21,\n")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bed assignments (crop rows) has empty required values: wave_id"
        );
    }

    #[test]
    fn crop_columns_required_when_crop_rows_exist() {
        let err = run("bed_id,start_ft,length_ft\n1,0,10\n").unwrap_err();
        assert!(
            matches!(err, Error::DataShape(TableError::MissingColumns { .. })),
            "expected MissingColumns, got: {err}"
        );
    }

    // Stray-token handling is a heuristic for hand-edited spreadsheet
    // exports: a non-numeric bed_id with nothing else on the row is
    // silently dropped rather than reported.
    #[test]
    fn stray_trailing_token_is_dropped() {
        let out = run(&format!(
            "{HEADER}1,0,10,Carrot,Bolero,Carrot:Bolero:2026-02-21,2026-02-21,\nx,,,,,,,\n"
        ))
        .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn non_numeric_bed_id_with_content_fails() {
        let err = run(&format!(
            "{HEADER}one,0,10,Carrot,Bolero,Carrot:Bolero:2026-02-21,2026-02-21,\n"
        ))
        .unwrap_err();
        assert!(
            matches!(err, Error::DataShape(TableError::NonNumeric { ref column, .. }) if column == "bed_id"),
            "expected NonNumeric bed_id, got: {err}"
        );
    }

    #[test]
    fn non_numeric_length_is_a_hard_failure() {
        let err = run(&format!(
            "{HEADER}1,0,ten,Carrot,Bolero,Carrot:Bolero:2026-02-21,2026-02-21,\n"
        ))
        .unwrap_err();
        assert!(
            matches!(err, Error::DataShape(TableError::NonNumeric { ref column, .. }) if column == "length_ft"),
            "expected NonNumeric length_ft, got: {err}"
        );
    }

    #[test]
    fn touching_assignments_are_accepted() {
        let out = run(&format!(
            "{HEADER}1,0,10,Carrot,Bolero,Carrot:Bolero:2026-02-21,2026-02-21,\n\
             1,10,10,Lettuce,Allstar,Lettuce:Allstar:2026-03-01,2026-03-01,\n"
        ))
        .unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn overlapping_assignments_fail() {
        let err = run(&format!(
            "{HEADER}1,0,10,Carrot,Bolero,Carrot:Bolero:2026-02-21,2026-02-21,\n\
             1,5,10,Lettuce,Allstar,Lettuce:Allstar:2026-03-01,2026-03-01,\n"
        ))
        .unwrap_err();
        assert!(
            matches!(err, Error::Geometry(GeometryError::Overlap { bed_id: 1, .. })),
            "expected Overlap, got: {err}"
        );
    }

    #[test]
    fn unknown_waves_are_reported_together_and_sorted() {
        let err = run(&format!(
            "{HEADER}1,0,10,Carrot,Bolero,Zeta,2026-02-21,\n\
             2,0,10,Carrot,Bolero,Alpha,2026-02-21,\n\
             3,0,10,Carrot,Bolero,Zeta,2026-02-21,\n"
        ))
        .unwrap_err();
        match err {
            Error::UnknownWaves(ids) => assert_eq!(ids, ["Alpha", "Zeta"]),
            other => panic!("expected UnknownWaves, got: {other}"),
        }
    }

    #[test]
    fn geometry_is_checked_before_waves() {
        let err = run(&format!("{HEADER}13,0,10,Carrot,Bolero,BadWave,2026-02-21,\n")).unwrap_err();
        assert!(
            matches!(err, Error::Geometry(GeometryError::BedOutOfBounds { .. })),
            "expected BedOutOfBounds, got: {err}"
        );
    }
}
