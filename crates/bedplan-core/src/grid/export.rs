use std::path::Path;

use super::cell::GridCell;
use crate::error::{Error, Result};
use crate::output::atomic_write;

/// Serialize the grid table to CSV bytes, one row per cell with a header.
pub fn grid_csv(cells: &[GridCell], path: &Path) -> Result<Vec<u8>> {
    let csv_err = |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    for cell in cells {
        writer.serialize(cell).map_err(csv_err)?;
    }
    writer.into_inner().map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e.into_error(),
    })
}

/// Write the grid table to `path`.
pub fn write_grid_csv(cells: &[GridCell], path: &Path) -> Result<()> {
    let bytes = grid_csv(cells, path)?;
    atomic_write(path, &bytes)
}
