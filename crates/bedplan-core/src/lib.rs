//! Bed assignment validation and occupancy grid rendering.
//!
//! Assignments place crop waves (and beneficial-insect strips) into
//! fixed-length beds divided into blocks. [`assign::build_assignments`]
//! checks them against the bed geometry and the succession schedule;
//! [`render::render_grid`] turns validated assignments into a per-block
//! occupancy table, an SVG image, and optionally a PNG.

pub mod assign;
pub mod config;
pub mod error;
pub mod grid;
pub mod output;
pub mod render;
pub mod schedule;
pub mod schema;
pub mod table;
pub mod wave;

pub use assign::{Assignment, AssignmentStatus, ValidatedAssignments, build_assignments};
pub use config::{BedGeometry, VisualsConfig};
pub use error::{Error, Result};
pub use grid::{CellStatus, Grid, GridCell, build_grid};
pub use render::{GridPaths, RasterOutcome, RenderReport, SchemaVersions, render_grid};
pub use schedule::Schedule;
pub use wave::build_wave_id;
