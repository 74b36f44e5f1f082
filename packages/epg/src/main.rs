#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for building `tvg-ids.json`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tv_ids_cli_utils::IndicatifProgress;
use tv_ids_epg::{DEFAULT_TIMEOUT_SECS, EpgConfig, PDF_URL};

#[derive(Parser)]
#[command(
    name = "tvg_ids",
    about = "Build a region-grouped channel ID table from the epgshare01 channel list PDF"
)]
struct Cli {
    /// URL of the channel list PDF
    #[arg(long, default_value = PDF_URL)]
    url: String,
    /// Path of the JSON file to write [default: tvg-ids.json next to this program]
    #[arg(long)]
    output: Option<PathBuf>,
    /// Seconds to wait for the PDF download before giving up
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = tv_ids_cli_utils::init_logger();
    let cli = Cli::parse();

    let defaults = EpgConfig::alongside(&tv_ids_cli_utils::program_dir()?);
    let config = EpgConfig {
        url: cli.url,
        output: cli.output.unwrap_or(defaults.output),
        timeout: Duration::from_secs(cli.timeout_secs),
    };

    let download = IndicatifProgress::bytes_bar(&multi, "Downloading PDF");
    let assign = IndicatifProgress::records_spinner(&multi, "Assigning channel IDs");

    let summary = tv_ids_epg::run(&config, &download, &assign).await?;

    println!(
        "{} written ({} channel IDs)",
        config.output.display(),
        summary.ids
    );

    Ok(())
}
