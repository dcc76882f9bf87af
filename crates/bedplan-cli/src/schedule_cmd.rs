//! `bedplan schedule` command: load and check a succession schedule.

use std::path::PathBuf;

use anyhow::{Context, Result};

use bedplan_core::Schedule;

use crate::config::ProjectConfig;

#[derive(Debug, clap::Args)]
pub struct ScheduleArgs {
    /// Succession schedule table
    #[arg(long)]
    pub schedule: Option<PathBuf>,
    /// Expected schema version
    #[arg(long)]
    pub schema_version: Option<u32>,
}

/// Run the schedule command.
pub fn run_schedule(project: &ProjectConfig, args: ScheduleArgs) -> Result<()> {
    let path = project.schedule(args.schedule);
    let version = project.schema_version(args.schema_version)?;

    let schedule = Schedule::load(&path, version)
        .with_context(|| format!("invalid succession schedule in {}", path.display()))?;

    println!("Schedule: {}", path.display());
    println!("  Rows:   {}", schedule.len());
    println!("  Waves:  {}", schedule.wave_ids().len());
    Ok(())
}
