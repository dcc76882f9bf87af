mod assign_cmd;
mod config;
mod render_cmd;
mod schedule_cmd;
mod schema_cmd;
#[cfg(test)]
mod test_util;

use clap::{Parser, Subcommand};

use assign_cmd::AssignArgs;
use config::ProjectConfig;
use render_cmd::RenderArgs;
use schedule_cmd::ScheduleArgs;
use schema_cmd::SchemaArgs;

#[derive(Parser)]
#[command(
    name = "bedplan",
    version,
    about = "Validate bed assignments and render the bed occupancy grid"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate bed assignments against geometry and the schedule
    Assign(AssignArgs),
    /// Render the occupancy grid as CSV, SVG and PNG
    Render(RenderArgs),
    /// Load and check a succession schedule
    Schedule(ScheduleArgs),
    /// Print the schema version of a table or JSONL config
    Schema(SchemaArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Assign(args) => assign_cmd::run_assign(&ProjectConfig::discover()?, args),
        Commands::Render(args) => render_cmd::run_render(&ProjectConfig::discover()?, args),
        Commands::Schedule(args) => {
            schedule_cmd::run_schedule(&ProjectConfig::discover()?, args)
        }
        Commands::Schema(args) => schema_cmd::run_schema(args),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_flags_parse() {
        let cli = Cli::try_parse_from([
            "bedplan",
            "render",
            "--skip-png",
            "--schema-version",
            "2",
            "--visuals-schema-version",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Render(args) => {
                assert!(args.skip_png);
                assert_eq!(args.schema_version, Some(2));
                assert_eq!(args.visuals_schema_version, Some(3));
                assert_eq!(args.output_png, None);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn skip_png_conflicts_with_output_png() {
        let result = Cli::try_parse_from([
            "bedplan",
            "render",
            "--skip-png",
            "--output-png",
            "grid.png",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn assign_config_flag_names_geometry() {
        let cli =
            Cli::try_parse_from(["bedplan", "assign", "--config", "geo.jsonl"]).unwrap();
        match cli.command {
            Commands::Assign(args) => {
                assert_eq!(args.config, Some(std::path::PathBuf::from("geo.jsonl")));
            }
            _ => panic!("expected assign"),
        }
    }
}
