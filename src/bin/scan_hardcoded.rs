//! Hardcoded value scanner
//!
//! Usage:
//!   scan-hardcoded [ROOT] [--output report.json] [--markdown report.md] [--fail-on-errors]
//!
//! Reports default to `<reports_dir>/hardcoded-values-report.{json,md}`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use token_sync::scanner::{self, SCAN_MARKDOWN_FILE, SCAN_REPORT_FILE};
use token_sync::TokenSyncConfig;

#[derive(Parser)]
#[command(name = "scan-hardcoded")]
#[command(about = "Find colors, dimensions and styles that bypass the design tokens")]
struct Args {
    /// Directory to scan
    #[arg(env = "TOKEN_SYNC_ROOT", default_value = ".")]
    root: PathBuf,

    /// JSON report path
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Markdown summary path
    #[arg(long)]
    markdown: Option<PathBuf>,

    /// Exit with status 1 when anything is found
    #[arg(long)]
    fail_on_errors: bool,
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

    let report = scanner::scan(&args.root, &config);

    let reports = config.reports_path(&args.root);
    let json_path = args.output.unwrap_or_else(|| reports.join(SCAN_REPORT_FILE));
    let md_path = args.markdown.unwrap_or_else(|| reports.join(SCAN_MARKDOWN_FILE));
    report
        .write_json(&json_path)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;
    report
        .write_markdown(&md_path)
        .with_context(|| format!("Failed to write {}", md_path.display()))?;

    println!(
        "Scanned {} files ({} skipped): {} hardcoded values in {} files",
        report.files_scanned,
        report.files_skipped,
        report.total_findings,
        report.files_with_findings()
    );
    for (finding_type, count) in &report.by_type {
        println!("  {:<20} {}", finding_type.title(), count);
    }
    println!("JSON:     {}", json_path.display());
    println!("Markdown: {}", md_path.display());

    if args.fail_on_errors && report.has_findings() {
        std::process::exit(1);
    }
    Ok(())
}
