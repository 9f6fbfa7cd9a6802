use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use xcontrol_language_server::config::{init_logging, CommonArgs, Config};
use xcontrol_language_server::core::Severity;
use xcontrol_language_server::validation::{validate_document, DiagnosticConfig};

/// Validate xcontrol files from the command line
#[derive(Debug, Parser)]
#[command(name = "xcontrol-check")]
#[command(about = "Report diagnostics for xtb xcontrol files")]
#[command(version)]
struct Args {
    /// Files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = Config::from_args(args.common)?;
    init_logging(&config.log_level);

    let schema = config.load_schema()?;
    let rules = DiagnosticConfig::from_settings(&config.load_settings());

    let mut errors = 0usize;
    for path in &args.files {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let result = validate_document(&text, &schema, &rules);

        for diagnostic in &result.diagnostics {
            println!(
                "{}:{}:{}: {} [{}] {}",
                path.display(),
                diagnostic.range.start.line + 1,
                diagnostic.range.start.character + 1,
                diagnostic.severity,
                diagnostic.code(),
                diagnostic.message
            );
            if diagnostic.severity == Severity::Error {
                errors += 1;
            }
        }
    }

    if errors > 0 {
        log::info!("{} error(s) found", errors);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
