//! Geometric checks over coerced assignment rows: bounds, block alignment,
//! and per-bed overlap. Each check scans every row and stops at the first
//! violation.

use std::collections::BTreeMap;

use thiserror::Error;

use super::types::RawAssignment;
use crate::config::BedGeometry;

/// A placement that does not fit the bed geometry.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("bed_id out of bounds: bed {bed_id} (expected 1..={bed_count})")]
    BedOutOfBounds { bed_id: f64, bed_count: u32 },

    #[error("start_ft must be >= 0 (bed {bed_id}, start_ft {start_ft})")]
    NegativeStart { bed_id: f64, start_ft: f64 },

    #[error("length_ft must be >= 0 (bed {bed_id}, length_ft {length_ft})")]
    NegativeLength { bed_id: f64, length_ft: f64 },

    #[error("assignment exceeds bed length in bed {bed_id}: ends at {end_ft} ft, bed is {bed_length_ft} ft")]
    ExceedsBedLength {
        bed_id: f64,
        end_ft: f64,
        bed_length_ft: u32,
    },

    #[error("start_ft must align to block size in bed {bed_id}: {start_ft} is not a multiple of {block_size_ft}")]
    MisalignedStart {
        bed_id: f64,
        start_ft: f64,
        block_size_ft: u32,
    },

    #[error("length_ft must align to block size in bed {bed_id}: {length_ft} is not a multiple of {block_size_ft}")]
    MisalignedLength {
        bed_id: f64,
        length_ft: f64,
        block_size_ft: u32,
    },

    #[error("overlap detected in bed {bed_id}: assignment at {start_ft} ft starts before {previous_end_ft} ft")]
    Overlap {
        bed_id: u32,
        start_ft: f64,
        previous_end_ft: f64,
    },
}

/// Bed ids in range, non-negative positions, and nothing past the bed end.
pub(crate) fn validate_bounds(
    rows: &[RawAssignment],
    geometry: &BedGeometry,
) -> Result<(), GeometryError> {
    let bed_count = geometry.bed_count;
    if let Some(row) = rows
        .iter()
        .find(|r| r.bed_id.fract() != 0.0 || r.bed_id < 1.0 || r.bed_id > f64::from(bed_count))
    {
        return Err(GeometryError::BedOutOfBounds {
            bed_id: row.bed_id,
            bed_count,
        });
    }
    if let Some(row) = rows.iter().find(|r| r.start_ft < 0.0) {
        return Err(GeometryError::NegativeStart {
            bed_id: row.bed_id,
            start_ft: row.start_ft,
        });
    }
    if let Some(row) = rows.iter().find(|r| r.length_ft < 0.0) {
        return Err(GeometryError::NegativeLength {
            bed_id: row.bed_id,
            length_ft: row.length_ft,
        });
    }
    let bed_length_ft = geometry.bed_length_ft;
    if let Some(row) = rows.iter().find(|r| r.end_ft() > f64::from(bed_length_ft)) {
        return Err(GeometryError::ExceedsBedLength {
            bed_id: row.bed_id,
            end_ft: row.end_ft(),
            bed_length_ft,
        });
    }
    Ok(())
}

/// Start and length must both be whole multiples of the block size.
pub(crate) fn validate_alignment(
    rows: &[RawAssignment],
    block_size_ft: u32,
) -> Result<(), GeometryError> {
    let block = f64::from(block_size_ft);
    if let Some(row) = rows.iter().find(|r| r.start_ft % block != 0.0) {
        return Err(GeometryError::MisalignedStart {
            bed_id: row.bed_id,
            start_ft: row.start_ft,
            block_size_ft,
        });
    }
    if let Some(row) = rows.iter().find(|r| r.length_ft % block != 0.0) {
        return Err(GeometryError::MisalignedLength {
            bed_id: row.bed_id,
            length_ft: row.length_ft,
            block_size_ft,
        });
    }
    Ok(())
}

/// Within each bed, sorted by start, no interval may begin before the
/// previous one ends. Intervals are closed-open, so touching is allowed
/// and a zero-length assignment overlaps nothing.
///
/// Expects bounds to have passed (bed ids are whole numbers).
pub(crate) fn validate_overlaps(rows: &[RawAssignment]) -> Result<(), GeometryError> {
    let mut by_bed: BTreeMap<u32, Vec<&RawAssignment>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.length_ft > 0.0) {
        by_bed.entry(row.bed_id as u32).or_default().push(row);
    }

    for (bed_id, mut group) in by_bed {
        group.sort_by(|a, b| {
            a.start_ft
                .total_cmp(&b.start_ft)
                .then(a.end_ft().total_cmp(&b.end_ft()))
        });
        let mut previous_end: Option<f64> = None;
        for row in group {
            if let Some(end) = previous_end {
                if row.start_ft < end {
                    return Err(GeometryError::Overlap {
                        bed_id,
                        start_ft: row.start_ft,
                        previous_end_ft: end,
                    });
                }
            }
            previous_end = Some(row.end_ft());
        }
    }
    Ok(())
}
