#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for building `logos.json`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tv_ids_cli_utils::IndicatifProgress;
use tv_ids_logos::{LogoConfig, ZIP_URL};

#[derive(Parser)]
#[command(
    name = "tv_logos",
    about = "Build a country-grouped logo ID table from the tv-logos repository archive"
)]
struct Cli {
    /// URL of the repository zip
    #[arg(long, default_value = ZIP_URL)]
    url: String,
    /// Path of the JSON file to write [default: logos.json next to this program]
    #[arg(long)]
    output: Option<PathBuf>,
    /// Directory to extract the archive into [default: this program's directory]
    #[arg(long)]
    extract_dir: Option<PathBuf>,
    /// Seconds to wait for the download before giving up (no limit if unset)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = tv_ids_cli_utils::init_logger();
    let cli = Cli::parse();

    let defaults = LogoConfig::alongside(&tv_ids_cli_utils::program_dir()?);
    let config = LogoConfig {
        url: cli.url,
        output: cli.output.unwrap_or(defaults.output),
        extract_dir: cli.extract_dir.unwrap_or(defaults.extract_dir),
        timeout: cli.timeout_secs.map(Duration::from_secs),
    };

    let download = IndicatifProgress::bytes_bar(&multi, "Downloading logo archive");

    let summary = tv_ids_logos::run(&config, &download).await?;

    println!("logos.json created in: {}", config.output.display());
    println!(
        "   Countries: {} | Total logos: {}",
        summary.countries, summary.logos
    );

    Ok(())
}
