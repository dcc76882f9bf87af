//! The bed/block occupancy grid.
//!
//! Building a grid takes validated assignments through four steps:
//! join each crop assignment to its schedule entry for family and water,
//! accumulate occupants per cell on top of the reserved geometry, resolve
//! every cell once, then style the cells and compress each bed into runs.

mod cell;
mod export;
mod occupancy;
mod runs;
mod style;

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

pub use cell::{
    CONFLICT_SEPARATOR, CellStatus, CellStatusParseError, CropOccupant, GridCell, Occupant,
    Reserved,
};
pub use export::{grid_csv, write_grid_csv};
pub use occupancy::{OccupancyMap, Resolved, resolve};
pub use runs::{Run, compress_runs};
pub use style::{CellStyle, DEFAULT_STATUS_COLORS, Palette, dash_array};

use crate::assign::{Assignment, ValidatedAssignments};
use crate::config::{BedGeometry, VisualsConfig};
use crate::error::{Error, Result};
use crate::schedule::Schedule;

/// Notes separator within a bed's merged notes.
pub const NOTES_SEPARATOR: &str = "; ";

/// A fully resolved grid: one cell per `(bed, block)` in bed-major order,
/// plus the runs that group them.
#[derive(Debug, Clone)]
pub struct Grid {
    pub bed_count: u32,
    pub blocks_per_bed: usize,
    pub cells: Vec<GridCell>,
    pub runs: Vec<Run>,
    /// Merged notes per bed; beds without notes are absent.
    pub bed_notes: BTreeMap<u32, String>,
}

impl Grid {
    pub fn cell(&self, bed_id: u32, block_idx: usize) -> Option<&GridCell> {
        if bed_id == 0 || bed_id > self.bed_count || block_idx >= self.blocks_per_bed {
            return None;
        }
        self.cells
            .get((bed_id as usize - 1) * self.blocks_per_bed + block_idx)
    }

    /// The first cell of `run`, which carries the run's content.
    pub fn run_cell(&self, run: &Run) -> &GridCell {
        &self.cells[run.first_cell]
    }

    pub fn runs_in_bed(&self, bed_id: u32) -> impl Iterator<Item = &Run> {
        self.runs.iter().filter(move |run| run.bed_id == bed_id)
    }

    pub fn bed_notes(&self, bed_id: u32) -> Option<&str> {
        self.bed_notes.get(&bed_id).map(String::as_str)
    }
}

/// Build the occupancy grid for validated assignments.
pub fn build_grid(
    validated: &ValidatedAssignments,
    geometry: &BedGeometry,
    visuals: &VisualsConfig,
) -> Result<Grid> {
    let blocks_per_bed = geometry.blocks_per_bed()?;
    let crops = join_schedule(&validated.assignments, &validated.schedule)?;

    let mut occupancy = OccupancyMap::seeded(geometry, blocks_per_bed);
    for (assignment, crop) in validated.assignments.iter().zip(&crops) {
        for block_idx in assignment.blocks() {
            let occupant = match crop {
                Some(crop) => Occupant::Crop(crop.clone()),
                None => Occupant::Reserved(Reserved::Beneficial),
            };
            occupancy.push(assignment.bed_id, block_idx, occupant);
        }
    }

    let palette = Palette::new(visuals);
    let mut cells: Vec<GridCell> = occupancy
        .iter()
        .map(|(bed_id, block_idx, occupants)| {
            let resolved = resolve(occupants, geometry);
            to_cell(bed_id, block_idx, resolved, &palette)
        })
        .collect();
    let runs = compress_runs(&mut cells);

    debug!(
        cells = cells.len(),
        runs = runs.len(),
        conflicts = cells
            .iter()
            .filter(|c| c.status == CellStatus::Conflict)
            .count(),
        "built occupancy grid"
    );

    Ok(Grid {
        bed_count: geometry.bed_count,
        blocks_per_bed,
        cells,
        runs,
        bed_notes: merge_bed_notes(&validated.assignments),
    })
}

/// Crop occupant per assignment (`None` for BENEFICIAL rows), with family
/// and water taken from the first schedule entry sharing its wave id.
fn join_schedule(
    assignments: &[Assignment],
    schedule: &Schedule,
) -> Result<Vec<Option<CropOccupant>>> {
    let mut missing = BTreeSet::new();
    let joined: Vec<Option<CropOccupant>> = assignments
        .iter()
        .map(|a| {
            if !a.is_crop() {
                return None;
            }
            let entry = schedule.find(&a.wave_id);
            let family = entry.and_then(|e| e.family.clone());
            if family.is_none() {
                missing.insert(a.wave_id.clone());
            }
            Some(CropOccupant {
                crop: a.crop.clone(),
                variety: a.variety.clone(),
                wave_id: a.wave_id.clone(),
                family: family.unwrap_or_default(),
                water: entry.map(|e| e.water.clone()).unwrap_or_default(),
                notes: a.notes.clone().unwrap_or_default(),
            })
        })
        .collect();

    if !missing.is_empty() {
        return Err(Error::MissingFamily(missing.into_iter().collect()));
    }
    Ok(joined)
}

/// Distinct non-empty notes per bed, sorted and joined.
fn merge_bed_notes(assignments: &[Assignment]) -> BTreeMap<u32, String> {
    let mut by_bed: BTreeMap<u32, BTreeSet<&str>> = BTreeMap::new();
    for a in assignments {
        if let Some(notes) = a.notes.as_deref().filter(|n| !n.is_empty()) {
            by_bed.entry(a.bed_id).or_default().insert(notes);
        }
    }
    by_bed
        .into_iter()
        .map(|(bed, notes)| (bed, notes.into_iter().collect::<Vec<_>>().join(NOTES_SEPARATOR)))
        .collect()
}

fn to_cell(bed_id: u32, block_idx: usize, resolved: Resolved, palette: &Palette<'_>) -> GridCell {
    let crop = resolved.crop.unwrap_or_default();
    let style = palette.style(resolved.status, &crop.family, &crop.water);
    GridCell {
        bed_id,
        block_idx,
        status: resolved.status,
        crop: crop.crop,
        variety: crop.variety,
        wave_id: crop.wave_id,
        family: crop.family,
        water: crop.water,
        notes: crop.notes,
        conflict_details: resolved.conflict_details,
        color: style.color,
        alpha: style.alpha,
        border_style: style.border_style,
        run_id: 0,
    }
}
