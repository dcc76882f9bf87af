//! Shared test utilities for bedplan integration tests.
//!
//! Builds an isolated fixture directory with schema-versioned inputs: a
//! bed assignments table, a succession schedule, a geometry config and a
//! visuals config. Each test gets its own temporary directory, removed when
//! the [`Fixture`] is dropped.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Header used by [`Fixture::write_assignments`].
pub const ASSIGNMENTS_HEADER: &str =
    "bed_id,start_ft,length_ft,status,crop,variety,wave_id,plant_date,notes";

/// Header used by the default schedule.
pub const SCHEDULE_HEADER: &str =
    "crop,variety,plant_date,succession_days,row_feet,water,wave_seq,plant_type";

/// Default schedule rows: one carrot wave and one sequenced lettuce wave.
pub const SCHEDULE_ROWS: [&str; 2] = [
    "Carrot,Bolero,2026-02-21,21,10,medium,,Root",
    "Lettuce,Allstar,2026-03-01,14,20,high,2,Leafy",
];

/// Wave id of the default carrot schedule row.
pub const CARROT_WAVE: &str = "Carrot:Bolero:2026-02-21";
/// Wave id of the default lettuce schedule row.
pub const LETTUCE_WAVE: &str = "Lettuce:Allstar:2026-03-01:2";

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture directory");
    }
    fs::write(path, contents).expect("failed to write fixture file");
}

/// Write a table with a `# schema_version` comment, header, and rows.
pub fn write_table<S: AsRef<str>>(path: &Path, schema_version: u32, header: &str, rows: &[S]) {
    let mut text = format!("# schema_version: {schema_version}\n{header}\n");
    for row in rows {
        text.push_str(row.as_ref());
        text.push('\n');
    }
    write_file(path, &text);
}

/// Write one JSON object per line.
pub fn write_jsonl(path: &Path, records: &[Value]) {
    let mut text = String::new();
    for record in records {
        text.push_str(&record.to_string());
        text.push('\n');
    }
    write_file(path, &text);
}

/// Standard geometry: 12 beds of 80 ft in 5 ft blocks (16 blocks per bed).
pub fn standard_geometry(schema_version: u32) -> Value {
    json!({
        "schema_version": schema_version,
        "bed_count": 12,
        "bed_length_ft": 80,
        "block_size_ft": 5,
    })
}

/// A temporary project directory with every input in place.
pub struct Fixture {
    dir: TempDir,
    pub assignments: PathBuf,
    pub schedule: PathBuf,
    pub geometry: PathBuf,
    pub visuals: PathBuf,
}

impl Fixture {
    /// Standard geometry, default schedule, empty visuals, and a single
    /// carrot assignment in bed 1 covering blocks 0..2.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = dir.path();
        let fixture = Self {
            assignments: root.join("data/plans/bed-assignments.csv"),
            schedule: root.join("data/schedules/succession-schedule.csv"),
            geometry: root.join("data/plans/config/bed-geometry.jsonl"),
            visuals: root.join("data/plans/config/bed-visuals.jsonl"),
            dir,
        };
        fixture.write_geometry(&[standard_geometry(1)]);
        fixture.write_visuals(&[json!({"schema_version": 1})]);
        fixture.write_schedule(&SCHEDULE_ROWS);
        fixture.write_assignments(&["1,0,10,CROP,Carrot,Bolero,Carrot:Bolero:2026-02-21,2026-02-21,"]);
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `relative` inside the fixture directory.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Replace the assignments with `rows` under [`ASSIGNMENTS_HEADER`].
    pub fn write_assignments<S: AsRef<str>>(&self, rows: &[S]) {
        write_table(&self.assignments, 1, ASSIGNMENTS_HEADER, rows);
    }

    /// Replace the assignments file with raw text.
    pub fn write_assignments_raw(&self, text: &str) {
        write_file(&self.assignments, text);
    }

    /// Replace the schedule with `rows` under [`SCHEDULE_HEADER`].
    pub fn write_schedule<S: AsRef<str>>(&self, rows: &[S]) {
        write_table(&self.schedule, 1, SCHEDULE_HEADER, rows);
    }

    pub fn write_geometry(&self, records: &[Value]) {
        write_jsonl(&self.geometry, records);
    }

    pub fn write_visuals(&self, records: &[Value]) {
        write_jsonl(&self.visuals, records);
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_writes_versioned_inputs() {
        let fx = Fixture::new();
        let table = fs::read_to_string(&fx.assignments).unwrap();
        assert!(table.starts_with("# schema_version: 1\nbed_id,"));
        let geometry = fs::read_to_string(&fx.geometry).unwrap();
        assert!(geometry.contains("\"bed_count\":12"));
        assert!(fx.schedule.exists());
        assert!(fx.visuals.starts_with(fx.root()));
    }
}
