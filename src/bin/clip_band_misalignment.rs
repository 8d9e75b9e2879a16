//! Clips the band misalignment of TM, ETM+, OLI and OLI/TIRS products stored
//! in the ESPA raw binary format.
//!
//! **Usage:**
//! ```bash
//! clip_band_misalignment --xml=LE07_L1TP_022033_20140228_20161028_01_T1.xml
//! ```

use anyhow::{Context, Result};
use bandclip::{MetadataReader, ClipOutcome, ProfileDispatcher};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Clip the SWIR and thermal bands so every band shares the same image
/// boundary, and flag the clipped pixels as fill in the quality band
#[derive(Parser, Debug)]
#[command(name = "clip_band_misalignment", version)]
struct Args {
    /// Input ESPA XML metadata file
    #[arg(long, value_name = "FILE")]
    xml: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ClipOutcome> {
    let metadata = MetadataReader::read_metadata_file(&args.xml)
        .with_context(|| format!("Reading metadata from {}", args.xml.display()))?;

    if let Some(date) = metadata.acquisition_date {
        log::info!(
            "Product {} {} acquired {}",
            metadata.satellite,
            metadata.instrument,
            date
        );
    }

    let outcome = ProfileDispatcher::default()
        .run(&metadata)
        .with_context(|| format!("Clipping band misalignment for {}", args.xml.display()))?;

    match &outcome {
        ClipOutcome::Applied(summary) => log::info!(
            "Clipped {} bands ({}), {} pixels set to fill",
            summary.band_count,
            summary.dimensions,
            summary.pixels_clipped
        ),
        ClipOutcome::NotApplicable { instrument } => {
            log::info!("Nothing to clip for instrument {}", instrument)
        }
    }

    Ok(outcome)
}
