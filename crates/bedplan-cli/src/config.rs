//! Project configuration for bedplan.
//!
//! An optional TOML file names the inputs, outputs and schema version of a
//! project. It is looked up at `./bedplan.toml`, then in the XDG config
//! directory. Every value resolves through the chain:
//! CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Project-local config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "bedplan.toml";

/// Env var overriding the expected schema version.
pub const SCHEMA_VERSION_ENV: &str = "BEDPLAN_SCHEMA_VERSION";

pub const DEFAULT_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_ASSIGNMENTS: &str = "data/plans/bed-assignments.csv";
pub const DEFAULT_SCHEDULE: &str = "data/schedules/succession-schedule.csv";
pub const DEFAULT_GEOMETRY: &str = "data/plans/config/bed-geometry.jsonl";
pub const DEFAULT_VISUALS: &str = "data/plans/config/bed-visuals.jsonl";
pub const DEFAULT_OUTPUT_CSV: &str = "data/plans/bed-grid.csv";
pub const DEFAULT_OUTPUT_SVG: &str = "exports/bed-grid.svg";
pub const DEFAULT_OUTPUT_PNG: &str = "exports/bed-grid.png";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub inputs: InputsSection,
    pub outputs: OutputsSection,
    pub schema: SchemaSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsSection {
    pub assignments: Option<PathBuf>,
    pub schedule: Option<PathBuf>,
    pub geometry: Option<PathBuf>,
    pub visuals: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputsSection {
    pub csv: Option<PathBuf>,
    pub svg: Option<PathBuf>,
    pub png: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaSection {
    pub version: Option<u32>,
    /// Expected version of the visuals config, when it moves separately.
    pub visuals_version: Option<u32>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the bedplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/bedplan` or `~/.config/bedplan`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("bedplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("bedplan")
}

/// Return the path to the user-level config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// First existing config file: `./bedplan.toml`, then the user config.
pub fn find_config() -> Option<PathBuf> {
    [PathBuf::from(PROJECT_CONFIG_FILE), config_path()]
        .into_iter()
        .find(|p| p.is_file())
}

// -----------------------------------------------------------------------
// Read
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// A project config, ready to resolve values against CLI flags.
#[derive(Debug, Default)]
pub struct ProjectConfig {
    file: ConfigFile,
}

impl ProjectConfig {
    /// Load the first config file found, or an empty config when none
    /// exists. A file that exists but does not parse is an error.
    pub fn discover() -> Result<Self> {
        match find_config() {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = load_config(path)?;
        tracing::debug!(path = %path.display(), "loaded project config");
        Ok(Self { file })
    }

    pub fn assignments(&self, cli: Option<PathBuf>) -> PathBuf {
        pick(cli, &self.file.inputs.assignments, DEFAULT_ASSIGNMENTS)
    }

    pub fn schedule(&self, cli: Option<PathBuf>) -> PathBuf {
        pick(cli, &self.file.inputs.schedule, DEFAULT_SCHEDULE)
    }

    pub fn geometry(&self, cli: Option<PathBuf>) -> PathBuf {
        pick(cli, &self.file.inputs.geometry, DEFAULT_GEOMETRY)
    }

    pub fn visuals(&self, cli: Option<PathBuf>) -> PathBuf {
        pick(cli, &self.file.inputs.visuals, DEFAULT_VISUALS)
    }

    pub fn output_csv(&self, cli: Option<PathBuf>) -> PathBuf {
        pick(cli, &self.file.outputs.csv, DEFAULT_OUTPUT_CSV)
    }

    pub fn output_svg(&self, cli: Option<PathBuf>) -> PathBuf {
        pick(cli, &self.file.outputs.svg, DEFAULT_OUTPUT_SVG)
    }

    /// `None` when raster export is skipped.
    pub fn output_png(&self, cli: Option<PathBuf>, skip: bool) -> Option<PathBuf> {
        (!skip).then(|| pick(cli, &self.file.outputs.png, DEFAULT_OUTPUT_PNG))
    }

    /// Resolve the schema version:
    /// `cli` > `BEDPLAN_SCHEMA_VERSION` env > `schema.version` > 1.
    pub fn schema_version(&self, cli: Option<u32>) -> Result<u32> {
        if let Some(version) = cli {
            return Ok(version);
        }
        if let Ok(raw) = std::env::var(SCHEMA_VERSION_ENV) {
            return raw
                .trim()
                .parse()
                .with_context(|| format!("{SCHEMA_VERSION_ENV} is not a valid version: {raw:?}"));
        }
        Ok(self.file.schema.version.unwrap_or(DEFAULT_SCHEMA_VERSION))
    }

    /// Resolve the visuals schema version, falling back to the main one.
    pub fn visuals_schema_version(&self, cli: Option<u32>, schema_version: u32) -> u32 {
        cli.or(self.file.schema.visuals_version)
            .unwrap_or(schema_version)
    }
}

fn pick(cli: Option<PathBuf>, file: &Option<PathBuf>, default: &str) -> PathBuf {
    cli.or_else(|| file.clone())
        .unwrap_or_else(|| PathBuf::from(default))
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, contents).unwrap();
        (tmp, path)
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = ProjectConfig::default();
        assert_eq!(config.assignments(None), PathBuf::from(DEFAULT_ASSIGNMENTS));
        assert_eq!(config.output_svg(None), PathBuf::from(DEFAULT_OUTPUT_SVG));
        assert_eq!(
            config.output_png(None, false),
            Some(PathBuf::from(DEFAULT_OUTPUT_PNG))
        );
        assert_eq!(config.output_png(None, true), None);
    }

    #[test]
    fn file_values_override_defaults_and_cli_overrides_file() {
        let (_tmp, path) = write_config(
            r#"
[inputs]
assignments = "plans/2027.csv"

[outputs]
png = "out/grid.png"
"#,
        );
        let config = ProjectConfig::from_path(&path).unwrap();
        assert_eq!(config.assignments(None), PathBuf::from("plans/2027.csv"));
        assert_eq!(
            config.assignments(Some(PathBuf::from("cli.csv"))),
            PathBuf::from("cli.csv")
        );
        assert_eq!(config.schedule(None), PathBuf::from(DEFAULT_SCHEDULE));
        assert_eq!(
            config.output_png(None, false),
            Some(PathBuf::from("out/grid.png"))
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let (_tmp, path) = write_config("[inputs]\nassignmnets = \"typo.csv\"\n");
        let err = ProjectConfig::from_path(&path).unwrap_err();
        assert!(
            format!("{err:#}").contains("failed to parse config file"),
            "got: {err:#}"
        );
    }

    #[test]
    fn schema_version_resolution_chain() {
        let _lock = lock_env();
        let (_tmp, path) = write_config("[schema]\nversion = 3\n");
        let config = ProjectConfig::from_path(&path).unwrap();

        unsafe { std::env::remove_var(SCHEMA_VERSION_ENV) };
        assert_eq!(config.schema_version(None).unwrap(), 3);
        assert_eq!(ProjectConfig::default().schema_version(None).unwrap(), 1);

        unsafe { std::env::set_var(SCHEMA_VERSION_ENV, "4") };
        assert_eq!(config.schema_version(None).unwrap(), 4);
        assert_eq!(config.schema_version(Some(5)).unwrap(), 5);

        unsafe { std::env::set_var(SCHEMA_VERSION_ENV, "four") };
        let err = config.schema_version(None).unwrap_err();
        assert!(err.to_string().contains(SCHEMA_VERSION_ENV));

        unsafe { std::env::remove_var(SCHEMA_VERSION_ENV) };
    }

    #[test]
    fn visuals_version_falls_back_to_main_version() {
        let (_tmp, path) = write_config("[schema]\nvisuals_version = 2\n");
        let config = ProjectConfig::from_path(&path).unwrap();
        assert_eq!(config.visuals_schema_version(None, 1), 2);
        assert_eq!(config.visuals_schema_version(Some(7), 1), 7);
        assert_eq!(ProjectConfig::default().visuals_schema_version(None, 1), 1);
    }

    #[test]
    fn config_dir_honours_xdg() {
        let _lock = lock_env();
        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", "/tmp/xdg-test") };

        let path = config_path();

        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }
        assert_eq!(path, PathBuf::from("/tmp/xdg-test/bedplan/config.toml"));
    }
}
