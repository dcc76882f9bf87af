//! Occupant accumulation and status resolution.
//!
//! Every cell collects a list of occupants first; status is then derived
//! from the final list in one pass. Nothing is decided while assignments
//! are still being placed, so placement order never changes the outcome.

use super::cell::{CONFLICT_SEPARATOR, CellStatus, CropOccupant, Occupant, Reserved};
use crate::config::BedGeometry;

/// Occupant lists for every cell, stored bed-major.
#[derive(Debug, Clone)]
pub struct OccupancyMap {
    bed_count: u32,
    blocks_per_bed: usize,
    cells: Vec<Vec<Occupant>>,
}

impl OccupancyMap {
    /// Create the map with reserved geometry seeded into every bed.
    pub fn seeded(geometry: &BedGeometry, blocks_per_bed: usize) -> Self {
        let bed_count = geometry.bed_count;
        let mut cells = Vec::with_capacity(bed_count as usize * blocks_per_bed);
        for _bed in 1..=bed_count {
            for block_idx in 0..blocks_per_bed {
                let mut occupants = Vec::new();
                if geometry.is_flower_block(block_idx) {
                    occupants.push(Occupant::Reserved(Reserved::Flower));
                }
                if geometry.is_beneficial_block(block_idx) {
                    occupants.push(Occupant::Reserved(Reserved::Beneficial));
                }
                cells.push(occupants);
            }
        }
        Self {
            bed_count,
            blocks_per_bed,
            cells,
        }
    }

    fn index(&self, bed_id: u32, block_idx: usize) -> Option<usize> {
        if bed_id == 0 || bed_id > self.bed_count || block_idx >= self.blocks_per_bed {
            return None;
        }
        Some((bed_id as usize - 1) * self.blocks_per_bed + block_idx)
    }

    /// Append `occupant` to the cell. Cells outside the grid are ignored.
    pub fn push(&mut self, bed_id: u32, block_idx: usize, occupant: Occupant) {
        if let Some(idx) = self.index(bed_id, block_idx) {
            self.cells[idx].push(occupant);
        }
    }

    pub fn occupants(&self, bed_id: u32, block_idx: usize) -> &[Occupant] {
        match self.index(bed_id, block_idx) {
            Some(idx) => &self.cells[idx],
            None => &[],
        }
    }

    /// Walk every cell in bed-major order with its coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (u32, usize, &[Occupant])> {
        let per_bed = self.blocks_per_bed;
        self.cells.iter().enumerate().map(move |(idx, occupants)| {
            let bed_id = (idx / per_bed) as u32 + 1;
            (bed_id, idx % per_bed, occupants.as_slice())
        })
    }
}

/// The content-bearing part of a cell after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub status: CellStatus,
    /// Set only for an uncontested crop cell.
    pub crop: Option<CropOccupant>,
    pub conflict_details: String,
}

/// Zero occupants: EMPTY. One: that occupant's status. Several: CONFLICT,
/// listing reserved occupants by their label and crops as `crop / variety`.
pub fn resolve(occupants: &[Occupant], geometry: &BedGeometry) -> Resolved {
    match occupants {
        [] => Resolved {
            status: CellStatus::Empty,
            crop: None,
            conflict_details: String::new(),
        },
        [Occupant::Reserved(slot)] => Resolved {
            status: slot.status(),
            crop: None,
            conflict_details: String::new(),
        },
        [Occupant::Crop(crop)] => Resolved {
            status: CellStatus::Crop,
            crop: Some(crop.clone()),
            conflict_details: String::new(),
        },
        many => {
            let details: Vec<String> = many
                .iter()
                .map(|occupant| match occupant {
                    Occupant::Reserved(slot) => {
                        geometry.reserved_label(slot.status().as_str()).to_owned()
                    }
                    Occupant::Crop(crop) => format!("{} / {}", crop.crop, crop.variety),
                })
                .collect();
            Resolved {
                status: CellStatus::Conflict,
                crop: None,
                conflict_details: details.join(CONFLICT_SEPARATOR),
            }
        }
    }
}
