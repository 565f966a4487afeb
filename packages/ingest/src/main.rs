#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the dividend statement ingest tool.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use dividend_ledger_cli_utils::IndicatifProgress;
use dividend_ledger_ingest::IngestConfig;
use dividend_ledger_models::AmbiguityPolicy;

#[derive(Parser)]
#[command(
    name = "dividend_ledger_ingest",
    about = "Append dividend records from PDF statements to an xlsx ledger"
)]
struct Cli {
    /// Directory containing the PDF statements
    #[arg(long, env = "DIVIDEND_LEDGER_SOURCE_DIR")]
    source_dir: PathBuf,
    /// Ledger workbook to create or append to
    #[arg(long, env = "DIVIDEND_LEDGER_DEST_FILE")]
    dest_file: PathBuf,
    /// What to do when a page has several candidates for a field
    /// (`first-match` or `reject`)
    #[arg(
        long,
        env = "DIVIDEND_LEDGER_ON_AMBIGUOUS",
        default_value = "first-match",
        value_parser = parse_policy
    )]
    on_ambiguous: AmbiguityPolicy,
}

fn parse_policy(value: &str) -> Result<AmbiguityPolicy, String> {
    value
        .parse()
        .map_err(|_| format!("expected `first-match` or `reject`, got `{value}`"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = dividend_ledger_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = IngestConfig::new(cli.source_dir, cli.dest_file).with_ambiguity(cli.on_ambiguous);

    let start = Instant::now();
    let progress = IndicatifProgress::documents_bar(&multi, "Reading statements");
    let summary = dividend_ledger_ingest::run(&config, progress.as_ref())?;

    println!("{summary}");
    log::info!("Finished in {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}
