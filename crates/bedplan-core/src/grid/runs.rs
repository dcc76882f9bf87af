//! Run-length compression of each bed's block sequence.

use super::cell::GridCell;

/// A maximal contiguous span of identical cells in one bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub run_id: usize,
    pub bed_id: u32,
    pub start_block: usize,
    /// One past the last block.
    pub end_block: usize,
    /// Index of the run's first cell in the grid's cell list.
    pub first_cell: usize,
}

impl Run {
    pub fn len(&self) -> usize {
        self.end_block - self.start_block
    }

    pub fn is_empty(&self) -> bool {
        self.end_block == self.start_block
    }
}

fn same_content(a: &GridCell, b: &GridCell) -> bool {
    a.status == b.status
        && a.crop == b.crop
        && a.variety == b.variety
        && a.wave_id == b.wave_id
        && a.conflict_details == b.conflict_details
}

/// Group bed-major `cells` into runs and stamp each cell with its run id.
///
/// Ids are sequential across the whole grid starting at 0. A run never
/// spans two beds or a gap in block indices.
pub fn compress_runs(cells: &mut [GridCell]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for idx in 0..cells.len() {
        let extends = runs.last().is_some_and(|run| {
            let head = &cells[run.first_cell];
            let cell = &cells[idx];
            run.bed_id == cell.bed_id && run.end_block == cell.block_idx && same_content(head, cell)
        });
        if let (true, Some(run)) = (extends, runs.last_mut()) {
            run.end_block += 1;
        } else {
            runs.push(Run {
                run_id: runs.len(),
                bed_id: cells[idx].bed_id,
                start_block: cells[idx].block_idx,
                end_block: cells[idx].block_idx + 1,
                first_cell: idx,
            });
        }
        cells[idx].run_id = runs.len() - 1;
    }
    runs
}
