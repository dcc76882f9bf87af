//! PNG export of the rendered SVG via `resvg`.
//!
//! Rasterizing depends on system fonts and the host renderer, so failures
//! here never fail a render: they are logged and reported as
//! [`RasterOutcome::Failed`].

use std::path::{Path, PathBuf};

use resvg::{tiny_skia, usvg};
use thiserror::Error;
use tracing::{info, warn};

use crate::output::atomic_write;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SVG parse error: {0}")]
    Parse(#[from] usvg::Error),

    #[error("cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error(transparent)]
    Write(#[from] crate::error::Error),
}

/// What happened to the optional raster output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterOutcome {
    /// No raster path was requested.
    Skipped,
    Written(PathBuf),
    /// Rasterizing or writing failed; the SVG and CSV are unaffected.
    Failed { path: PathBuf, reason: String },
}

impl RasterOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

/// Rasterize an SVG document at its intrinsic size.
pub fn rasterize(svg: &str) -> Result<Vec<u8>, RenderError> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options)?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or(
        RenderError::Pixmap {
            width: size.width(),
            height: size.height(),
        },
    )?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(e.to_string()))
}

fn rasterize_to(svg: &str, path: &Path) -> Result<(), RenderError> {
    let png = rasterize(svg)?;
    atomic_write(path, &png)?;
    Ok(())
}

/// Write a PNG of `svg` to `path`, downgrading any failure to a warning.
pub fn write_png(svg: &str, path: Option<&Path>) -> RasterOutcome {
    let Some(path) = path else {
        return RasterOutcome::Skipped;
    };
    match rasterize_to(svg, path) {
        Ok(()) => {
            info!(path = %path.display(), "wrote grid PNG");
            RasterOutcome::Written(path.to_path_buf())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "PNG rasterization failed");
            RasterOutcome::Failed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}
