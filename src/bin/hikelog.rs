use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use hikelog2geojson_wasm::converter::to_feature_collection;
use hikelog2geojson_wasm::error::HikeLogError;
use hikelog2geojson_wasm::options::ConvertOptions;
use hikelog2geojson_wasm::process_hike_log;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recover a hike telemetry log and export it as GeoJSON", long_about = None)]
struct Cli {
    /// Raw telemetry log to read
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output GeoJSON path (`-` for stdout)
    #[arg(short, long, default_value = "hike_path.geojson", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Also write the enriched samples and diagnostics as JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    records: Option<PathBuf>,

    /// Emit one point feature per sample
    #[arg(long, action = ArgAction::SetTrue)]
    samples: bool,

    /// Omit start/finish markers
    #[arg(long, action = ArgAction::SetTrue)]
    no_markers: bool,

    /// Omit per-vertex elevation colors
    #[arg(long, action = ArgAction::SetTrue)]
    no_colors: bool,

    /// Omit sensor readings
    #[arg(long, action = ArgAction::SetTrue)]
    no_sensors: bool,

    /// Verbose logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

impl Cli {
    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            include_markers: !self.no_markers,
            include_colors: !self.no_colors,
            include_sensors: !self.no_sensors,
            include_samples: self.samples,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let text = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let report = match process_hike_log(&text) {
        Ok(report) => report,
        Err(HikeLogError::NoValidData) => {
            println!("No valid data points found!");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let fc = to_feature_collection(&report.track, &cli.convert_options());
    let geojson = serde_json::to_string_pretty(&fc).context("failed to encode GeoJSON")?;
    write_output(&cli.output, &geojson)?;

    if let Some(path) = &cli.records {
        let json = serde_json::to_string_pretty(&report).context("failed to encode records")?;
        write_output(path, &json)?;
        info!("wrote enriched samples to {}", path.display());
    }

    let summary = &report.track.summary;
    let bounds = &report.track.altitude_bounds;
    info!(
        "{} points, {:.2} km, altitude {:.0}-{:.0} m, max speed {:.2} km/h ({} fragments skipped)",
        summary.point_count,
        summary.total_distance_km,
        bounds.min,
        bounds.max,
        summary.max_speed_kmh,
        report.skipped.len()
    );
    if cli.output.as_os_str() != "-" {
        println!(
            "Map data saved to {} with {} points",
            cli.output.display(),
            summary.point_count
        );
    }
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(contents.as_bytes())?;
        stdout.write_all(b"\n")?;
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
