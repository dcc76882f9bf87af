//! Grid rendering: the grid table, the SVG image, and an optional PNG.
//!
//! [`render_grid`] validates and builds everything in memory first. Files
//! are only written once every fatal check has passed, so a bad input never
//! leaves partial outputs behind.

mod raster;
mod svg;
mod text;

use std::path::PathBuf;

use tracing::{debug, info};

pub use raster::{RasterOutcome, RenderError, rasterize, write_png};
pub use svg::{SvgLayout, render_svg, svg_escape};
pub use text::{
    AverageGlyphWidth, TextMeasure, build_conflict_label_lines, build_crop_label_lines, fit_text,
    wrap_text,
};

use crate::assign::build_assignments_with_geometry;
use crate::config::{BedGeometry, VisualsConfig};
use crate::error::Result;
use crate::grid::{Grid, build_grid, grid_csv};
use crate::output::stage_write;

/// Input and output locations for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPaths {
    pub assignments: PathBuf,
    pub schedule: PathBuf,
    pub geometry: PathBuf,
    pub visuals: PathBuf,
    pub output_csv: PathBuf,
    pub output_svg: PathBuf,
    /// `None` skips raster export.
    pub output_png: Option<PathBuf>,
}

/// Expected schema versions for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaVersions {
    /// Tables and the geometry config.
    pub data: u32,
    /// The visuals config.
    pub visuals: u32,
}

impl SchemaVersions {
    /// The same version for every input.
    pub fn uniform(version: u32) -> Self {
        Self {
            data: version,
            visuals: version,
        }
    }
}

/// Result of a successful render.
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub grid: Grid,
    pub csv_path: PathBuf,
    pub svg_path: PathBuf,
    pub png: RasterOutcome,
}

/// Validate inputs, build the occupancy grid, and write CSV, SVG and
/// (optionally) PNG outputs.
pub fn render_grid(paths: &GridPaths, versions: SchemaVersions) -> Result<RenderReport> {
    render_grid_with(paths, versions, &AverageGlyphWidth::default())
}

/// Like [`render_grid`], with a caller-supplied text measure.
pub fn render_grid_with(
    paths: &GridPaths,
    versions: SchemaVersions,
    measure: &dyn TextMeasure,
) -> Result<RenderReport> {
    let geometry = BedGeometry::load(&paths.geometry, versions.data)?;
    let visuals = VisualsConfig::load(&paths.visuals, versions.visuals)?;
    let blocks_per_bed = geometry.blocks_per_bed()?;
    debug!(
        beds = geometry.bed_count,
        blocks_per_bed,
        "loaded grid geometry"
    );

    let validated = build_assignments_with_geometry(
        &paths.assignments,
        &paths.schedule,
        &geometry,
        versions.data,
    )?;
    let grid = build_grid(&validated, &geometry, &visuals)?;
    let svg = render_svg(&grid, &geometry, &visuals, measure);
    let csv = grid_csv(&grid.cells, &paths.output_csv)?;

    // Both files are staged before either replaces an existing output.
    let staged_csv = stage_write(&paths.output_csv, &csv)?;
    let staged_svg = stage_write(&paths.output_svg, svg.as_bytes())?;
    staged_csv.commit()?;
    info!(path = %paths.output_csv.display(), rows = grid.cells.len(), "wrote grid CSV");
    staged_svg.commit()?;
    info!(path = %paths.output_svg.display(), runs = grid.runs.len(), "wrote grid SVG");

    let png = write_png(&svg, paths.output_png.as_deref());

    Ok(RenderReport {
        grid,
        csv_path: paths.output_csv.clone(),
        svg_path: paths.output_svg.clone(),
        png,
    })
}
