//! Integration tests for `build_assignments` against on-disk fixtures.
//!
//! Each test builds an isolated fixture directory (see `bedplan-test-utils`)
//! and runs the full validator: schema guard, table shape checks, geometry
//! checks, and the wave cross-reference.

use bedplan_core::assign::{GeometryError, build_assignments};
use bedplan_core::schema::SchemaError;
use bedplan_core::table::TableError;
use bedplan_core::{AssignmentStatus, Error};
use bedplan_test_utils::{CARROT_WAVE, Fixture, LETTUCE_WAVE, standard_geometry, write_file};
use serde_json::json;

fn run(fx: &Fixture) -> bedplan_core::Result<bedplan_core::ValidatedAssignments> {
    build_assignments(&fx.assignments, &fx.schedule, &fx.geometry, 1)
}

// -----------------------------------------------------------------------
// Happy paths
// -----------------------------------------------------------------------

#[test]
fn single_assignment_gets_block_range() {
    let fx = Fixture::new();
    let validated = run(&fx).expect("fixture should validate");
    assert_eq!(validated.len(), 1);
    let a = &validated.assignments[0];
    assert_eq!((a.bed_id, a.start_ft, a.length_ft), (1, 0, 10));
    assert_eq!((a.start_block, a.end_block), (0, 2));
    assert_eq!(validated.schedule.len(), 2);
}

#[test]
fn sequenced_wave_ids_match_schedule() {
    let fx = Fixture::new();
    fx.write_assignments(&[&format!(
        "4,20,15,,Lettuce,Allstar,{LETTUCE_WAVE},2026-03-01,thin early"
    )]);
    let validated = run(&fx).unwrap();
    let a = &validated.assignments[0];
    assert_eq!(a.status, AssignmentStatus::Crop);
    assert_eq!(a.blocks(), 4..7);
    assert_eq!(a.notes.as_deref(), Some("thin early"));
}

#[test]
fn beneficial_row_passes_without_crop_fields() {
    let fx = Fixture::new();
    fx.write_assignments(&["2,40,5,BENEFICIAL,,,,,"]);
    let validated = run(&fx).unwrap();
    assert_eq!(validated.assignments[0].status, AssignmentStatus::Beneficial);
    assert_eq!(validated.assignments[0].status.to_string(), "BENEFICIAL");
}

#[test]
fn comments_blank_lines_and_stray_rows_are_ignored() {
    let fx = Fixture::new();
    fx.write_assignments_raw(&format!(
        "# schema_version: 1\n\
         # exported from the planning sheet\n\
         bed_id,start_ft,length_ft,crop,variety,wave_id,plant_date\n\
         1,0,10,Carrot,Bolero,{CARROT_WAVE},2026-02-21\n\
         ,,,,,,\n\
         \n\
         Total,,,,,,\n"
    ));
    let validated = run(&fx).unwrap();
    assert_eq!(validated.len(), 1);
}

// -----------------------------------------------------------------------
// Failures, in check order
// -----------------------------------------------------------------------

#[test]
fn missing_schema_comment_fails_before_parsing() {
    let fx = Fixture::new();
    fx.write_assignments_raw("bed_id,start_ft,length_ft\nnot,even,numbers\n");
    let err = run(&fx).unwrap_err();
    assert!(
        matches!(err, Error::Schema(SchemaError::MissingHeader { .. })),
        "expected MissingHeader, got: {err}"
    );
}

#[test]
fn geometry_version_mismatch_fails() {
    let fx = Fixture::new();
    fx.write_geometry(&[standard_geometry(2)]);
    let err = run(&fx).unwrap_err();
    assert!(
        matches!(err, Error::Schema(SchemaError::Mismatch { expected: 1, actual: 2, .. })),
        "expected Mismatch, got: {err}"
    );
}

#[test]
fn schedule_version_is_checked() {
    let fx = Fixture::new();
    write_file(
        &fx.schedule,
        "crop,variety,plant_date,succession_days,row_feet,water\nKale,Red,2026-03-01,14,20,high\n",
    );
    let err = run(&fx).unwrap_err();
    assert!(matches!(err, Error::Schema(SchemaError::MissingHeader { .. })));
}

#[test]
fn header_only_assignments_are_empty() {
    let fx = Fixture::new();
    fx.write_assignments::<&str>(&[]);
    let err = run(&fx).unwrap_err();
    assert_eq!(err.to_string(), "bed assignments is empty");
}

#[test]
fn missing_geometry_key_is_a_config_error() {
    let fx = Fixture::new();
    fx.write_geometry(&[json!({"schema_version": 1, "bed_count": 12, "bed_length_ft": 80})]);
    let err = run(&fx).unwrap_err();
    assert!(matches!(err, Error::Config(_)), "expected Config, got: {err}");
    assert!(err.to_string().contains("block_size_ft"), "got: {err}");
}

#[test]
fn non_numeric_start_is_reported() {
    let fx = Fixture::new();
    fx.write_assignments(&[&format!("1,zero,10,,Carrot,Bolero,{CARROT_WAVE},2026-02-21,")]);
    let err = run(&fx).unwrap_err();
    assert!(
        matches!(err, Error::DataShape(TableError::NonNumeric { ref column, .. }) if column == "start_ft"),
        "expected NonNumeric start_ft, got: {err}"
    );
}

#[test]
fn bed_past_bed_count_is_out_of_bounds() {
    let fx = Fixture::new();
    fx.write_assignments(&[&format!("13,0,10,,Carrot,Bolero,{CARROT_WAVE},2026-02-21,")]);
    let err = run(&fx).unwrap_err();
    assert!(matches!(err, Error::Geometry(GeometryError::BedOutOfBounds { .. })));
}

#[test]
fn assignment_past_bed_end_fails() {
    let fx = Fixture::new();
    fx.write_assignments(&[&format!("3,75,10,,Carrot,Bolero,{CARROT_WAVE},2026-02-21,")]);
    let err = run(&fx).unwrap_err();
    assert!(matches!(err, Error::Geometry(GeometryError::ExceedsBedLength { .. })));
}

#[test]
fn misaligned_start_fails() {
    let fx = Fixture::new();
    fx.write_assignments(&[&format!("1,3,10,,Carrot,Bolero,{CARROT_WAVE},2026-02-21,")]);
    let err = run(&fx).unwrap_err();
    assert!(matches!(err, Error::Geometry(GeometryError::MisalignedStart { .. })));
}

#[test]
fn touching_is_fine_but_overlap_fails() {
    let fx = Fixture::new();
    fx.write_assignments(&[
        &format!("1,0,10,,Carrot,Bolero,{CARROT_WAVE},2026-02-21,"),
        &format!("1,10,10,,Carrot,Bolero,{CARROT_WAVE},2026-02-21,"),
    ]);
    assert!(run(&fx).is_ok());

    fx.write_assignments(&[
        &format!("1,0,10,,Carrot,Bolero,{CARROT_WAVE},2026-02-21,"),
        &format!("1,5,10,,Carrot,Bolero,{CARROT_WAVE},2026-02-21,"),
    ]);
    let err = run(&fx).unwrap_err();
    assert!(
        matches!(err, Error::Geometry(GeometryError::Overlap { bed_id: 1, .. })),
        "expected Overlap, got: {err}"
    );
}

#[test]
fn unknown_wave_is_listed_in_one_error() {
    let fx = Fixture::new();
    fx.write_assignments(&["1,0,10,,Carrot,Bolero,Carrot:Bolero:2026-09-01,2026-09-01,"]);
    let err = run(&fx).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown wave_id values: ['Carrot:Bolero:2026-09-01']"
    );
}

#[test]
fn missing_files_are_io_errors() {
    let fx = Fixture::new();
    let err = build_assignments(&fx.path("nope.csv"), &fx.schedule, &fx.geometry, 1).unwrap_err();
    assert!(matches!(err, Error::Io { .. }), "expected Io, got: {err}");
}
