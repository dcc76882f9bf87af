//! `bedplan assign` command: validate bed assignments.

use std::path::PathBuf;

use anyhow::{Context, Result};

use bedplan_core::build_assignments;

use crate::config::ProjectConfig;

/// Flags accepted by `bedplan assign`.
#[derive(Debug, clap::Args)]
pub struct AssignArgs {
    /// Bed assignments table
    #[arg(long)]
    pub assignments: Option<PathBuf>,
    /// Succession schedule table
    #[arg(long)]
    pub schedule: Option<PathBuf>,
    /// Bed geometry config (JSONL)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Expected schema version of every input
    #[arg(long)]
    pub schema_version: Option<u32>,
}

/// Run the assign command.
pub fn run_assign(project: &ProjectConfig, args: AssignArgs) -> Result<()> {
    let assignments = project.assignments(args.assignments);
    let schedule = project.schedule(args.schedule);
    let geometry = project.geometry(args.config);
    let version = project.schema_version(args.schema_version)?;

    let validated = build_assignments(&assignments, &schedule, &geometry, version)
        .with_context(|| format!("invalid bed assignments in {}", assignments.display()))?;

    println!("Validated assignments: {} rows", validated.len());
    Ok(())
}
