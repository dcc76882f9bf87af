//! `bedplan schema` command: print or check a file's schema version.

use std::path::PathBuf;

use anyhow::{Context, Result};

use bedplan_core::schema::{ensure_schema, read_schema_version};

#[derive(Debug, clap::Args)]
pub struct SchemaArgs {
    /// Versioned table (.csv) or config (.jsonl)
    pub path: PathBuf,
    /// Fail unless the file carries this version
    #[arg(long)]
    pub expect: Option<u32>,
}

/// Run the schema command.
pub fn run_schema(args: SchemaArgs) -> Result<()> {
    let version = match args.expect {
        Some(expected) => ensure_schema(&args.path, expected),
        None => read_schema_version(&args.path),
    }
    .with_context(|| format!("schema check failed for {}", args.path.display()))?;

    println!("{version}");
    Ok(())
}
