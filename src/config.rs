//! Configuration management for the xcontrol language server.
//!
//! Handles:
//! - Command-line argument parsing
//! - Schema selection (built-in or a schema file)
//! - The user settings file providing default rule severities

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;

use crate::schema::Schema;
use crate::validation::DiagnosticSettings;

/// Options shared by the server and the command-line checker
#[derive(Debug, Clone, clap::Args)]
pub struct CommonArgs {
    /// Schema file replacing the built-in xtb schema
    #[arg(long, help = "Schema TOML file to validate against instead of the built-in one")]
    pub schema: Option<PathBuf>,

    /// Settings file with default diagnostic severities
    #[arg(long, help = "Settings TOML file (default: <config dir>/xcontrol-ls/settings.toml)")]
    pub settings: Option<PathBuf>,

    /// Log level
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Command-line arguments for the xcontrol language server
#[derive(Debug, Parser)]
#[command(name = "xcontrol-language-server")]
#[command(about = "Language server for xtb xcontrol files")]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Layout of the settings file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SettingsFile {
    pub diagnostics: DiagnosticSettings,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Schema file given on the command line
    pub schema_path: Option<PathBuf>,
    /// Settings file to read, if any could be determined
    pub settings_path: Option<PathBuf>,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse().common)
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: CommonArgs) -> Result<Self> {
        if let Some(schema) = &args.schema {
            if !schema.is_file() {
                bail!("Schema file {} does not exist", schema.display());
            }
        }

        let settings_path = args.settings.or_else(Self::default_settings_path);

        Ok(Config {
            schema_path: args.schema,
            settings_path,
            log_level: args.log_level,
        })
    }

    /// `<config dir>/xcontrol-ls/settings.toml`
    pub fn default_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("xcontrol-ls").join("settings.toml"))
    }

    /// The schema to validate against
    pub fn load_schema(&self) -> Result<Arc<Schema>> {
        match &self.schema_path {
            Some(path) => Ok(Arc::new(Schema::from_path(path)?)),
            None => Ok(Arc::new(Schema::builtin().clone())),
        }
    }

    /// Diagnostic settings from the settings file.
    ///
    /// A missing file yields empty settings; an unreadable one is logged and ignored.
    pub fn load_settings(&self) -> DiagnosticSettings {
        let Some(path) = &self.settings_path else {
            return DiagnosticSettings::default();
        };
        if !path.exists() {
            return DiagnosticSettings::default();
        }

        match read_settings_file(path) {
            Ok(file) => {
                log::info!("Loaded settings from {}", path.display());
                file.diagnostics
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {:#}", e);
                DiagnosticSettings::default()
            }
        }
    }
}

fn read_settings_file(path: &Path) -> Result<SettingsFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid settings in {}", path.display()))
}

/// Initialise `env_logger` on stderr, honouring `RUST_LOG` over `level`
pub fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A second initialisation (e.g. in tests) is harmless
    let _ = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(schema: Option<PathBuf>, settings: Option<PathBuf>) -> CommonArgs {
        CommonArgs {
            schema,
            settings,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_missing_schema_file_is_an_error() {
        let result = Config::from_args(args(Some(PathBuf::from("/nonexistent/schema.toml")), None));
        assert!(result.is_err());
    }

    #[test]
    fn test_builtin_schema_by_default() {
        let config = Config::from_args(args(None, None)).unwrap();
        let schema = config.load_schema().unwrap();
        assert_eq!(schema.name, "xtb");
    }

    #[test]
    fn test_load_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[diagnostics]\nmissingEnd = \"off\"\nunknownOption = \"error\"").unwrap();

        let config = Config::from_args(args(None, Some(file.path().to_path_buf()))).unwrap();
        let settings = config.load_settings();
        assert_eq!(settings.missing_end.as_deref(), Some("off"));
        assert_eq!(settings.unknown_option.as_deref(), Some("error"));
        assert_eq!(settings.orphan_option, None);
    }

    #[test]
    fn test_missing_or_broken_settings_are_ignored() {
        let missing = PathBuf::from("/nonexistent/s.toml");
        let config = Config::from_args(args(None, Some(missing))).unwrap();
        assert_eq!(config.load_settings(), DiagnosticSettings::default());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[diagnostics\nbroken").unwrap();
        let config = Config::from_args(args(None, Some(file.path().to_path_buf()))).unwrap();
        assert_eq!(config.load_settings(), DiagnosticSettings::default());
    }
}
