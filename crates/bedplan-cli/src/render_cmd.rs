//! `bedplan render` command: build the occupancy grid and export it.

use std::path::PathBuf;

use anyhow::{Context, Result};

use bedplan_core::{GridPaths, RasterOutcome, SchemaVersions, render_grid};

use crate::config::ProjectConfig;

#[derive(Debug, clap::Args)]
pub struct RenderArgs {
    /// Bed assignments table
    #[arg(long)]
    pub assignments: Option<PathBuf>,
    /// Succession schedule table
    #[arg(long)]
    pub schedule: Option<PathBuf>,
    /// Bed geometry config (JSONL)
    #[arg(long)]
    pub geometry: Option<PathBuf>,
    /// Visuals config (JSONL)
    #[arg(long)]
    pub visuals: Option<PathBuf>,
    /// Where to write the per-block grid table
    #[arg(long)]
    pub output_csv: Option<PathBuf>,
    /// Where to write the SVG image
    #[arg(long)]
    pub output_svg: Option<PathBuf>,
    /// Where to write the PNG image
    #[arg(long, conflicts_with = "skip_png")]
    pub output_png: Option<PathBuf>,
    /// Do not export a PNG
    #[arg(long)]
    pub skip_png: bool,
    /// Expected schema version of tables and geometry
    #[arg(long)]
    pub schema_version: Option<u32>,
    /// Expected schema version of the visuals config (defaults to --schema-version)
    #[arg(long)]
    pub visuals_schema_version: Option<u32>,
}

/// Run the render command.
pub fn run_render(project: &ProjectConfig, args: RenderArgs) -> Result<()> {
    let data = project.schema_version(args.schema_version)?;
    let versions = SchemaVersions {
        data,
        visuals: project.visuals_schema_version(args.visuals_schema_version, data),
    };
    let paths = GridPaths {
        assignments: project.assignments(args.assignments),
        schedule: project.schedule(args.schedule),
        geometry: project.geometry(args.geometry),
        visuals: project.visuals(args.visuals),
        output_csv: project.output_csv(args.output_csv),
        output_svg: project.output_svg(args.output_svg),
        output_png: project.output_png(args.output_png, args.skip_png),
    };

    let report = render_grid(&paths, versions).context("failed to render bed grid")?;

    println!("Saved grid CSV to {}", report.csv_path.display());
    println!("Saved grid SVG to {}", report.svg_path.display());
    match &report.png {
        RasterOutcome::Written(path) => println!("Saved grid PNG to {}", path.display()),
        RasterOutcome::Failed { path, reason } => {
            println!("Skipped grid PNG {} ({reason})", path.display());
        }
        RasterOutcome::Skipped => {}
    }
    Ok(())
}
