//! Cross-format design token sync validator
//!
//! Usage:
//!   validate-sync [ROOT]
//!   RUST_LOG=token_sync=debug validate-sync ./web
//!
//! Writes `<reports_dir>/color-sync-report.json`, prints a summary and exits
//! with status 1 when any token is out of sync.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use token_sync::parsers::TokenSources;
use token_sync::validator::{self, SYNC_REPORT_FILE};
use token_sync::TokenSyncConfig;

#[derive(Parser)]
#[command(name = "validate-sync")]
#[command(about = "Check that the TypeScript, CSS and Tailwind tokens match the YAML source")]
struct Args {
    /// Project root containing token-sync.yaml and the token artifacts
    #[arg(env = "TOKEN_SYNC_ROOT", default_value = ".")]
    root: PathBuf,

    /// Print the JSON report instead of the summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    let config = TokenSyncConfig::load(&args.root)
        .with_context(|| format!("Failed to load config from {}", args.root.display()))?;

    let sources = TokenSources::load(&args.root, &config);
    let report = validator::validate(&sources);

    let report_path = config.reports_path(&args.root).join(SYNC_REPORT_FILE);
    report
        .write_json(&report_path)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", validator::render_summary(&report));
        println!("\nReport written to {}", report_path.display());
    }

    if report.summary.out_of_sync > 0 {
        std::process::exit(1);
    }
    Ok(())
}
