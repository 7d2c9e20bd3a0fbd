//! Membrane simulator
//!
//! Loads a JSON membrane configuration, evaluates the displacement field
//! and writes a JSON summary. Optionally stores the full field as a
//! snapshot that can be reloaded with `MembraneSnapshot::load`.
//!
//! Usage:
//!   cargo run --release --bin membrane_simulator -- --config membrane.json
//!   cargo run --release --bin membrane_simulator -- --help

use clap::Parser;
use math_audio_wave_sim::{MeasuredData, MembraneConfig, MembraneSnapshot, summary_json};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "membrane-simulator")]
#[command(about = "Vibrating membrane simulator driven by dispersive wavepackets", long_about = None)]
struct Args {
    /// Path to JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON file path
    #[arg(short, long, default_value = "output.json")]
    output: PathBuf,

    /// Also save the full displacement field to this file
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Replace an existing snapshot file
    #[arg(long)]
    overwrite: bool,

    /// Evaluate sources on the thread pool
    #[arg(short, long)]
    parallel: bool,

    /// Number of parallel threads (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    #[cfg(feature = "parallel")]
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
        println!("Using {} threads\n", threads);
    }
    #[cfg(not(feature = "parallel"))]
    if args.threads.is_some() {
        log::warn!("built without the parallel feature, --threads is ignored");
    }

    let config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {}", config_path.display());
        MembraneConfig::from_file(config_path)?
    } else {
        println!("No configuration file specified, using the reference membrane");
        MembraneConfig::reference()
    };

    print_config_summary(&config);

    let mut membrane = config.to_membrane()?;
    membrane.set_parallel(args.parallel);

    println!("\n=== Running Simulation ===");
    println!(
        "Grid: {} x {}, {} time samples, {} placements ({} images)",
        membrane.xs().len(),
        membrane.ys().len(),
        membrane.time().len(),
        membrane.placement_count(),
        membrane.reflected_sources().len()
    );

    let start = Instant::now();
    membrane.eval()?;
    println!("Evaluated in {:.2?}", start.elapsed());

    let output_data = summary_json(&config, &membrane);
    println!("\nSaving results to: {}", args.output.display());
    fs::write(&args.output, serde_json::to_string_pretty(&output_data)?)?;

    if let Some(path) = &args.snapshot {
        println!("Saving snapshot to: {}", path.display());
        MembraneSnapshot::from_membrane(&membrane)?.save(path, args.overwrite)?;
    }

    println!("Done!");
    Ok(())
}

fn print_config_summary(config: &MembraneConfig) {
    let geometry = &config.membrane;
    println!("\n=== Configuration Summary ===");
    println!(
        "Membrane: {:.2}m × {:.2}m, dx = {} m, fs = {} Hz",
        geometry.width, geometry.height, geometry.spatial_step, geometry.sampling_frequency
    );
    println!("Boundary: {}", config.boundary);
    println!("Normalize: {}", config.normalize);

    println!("\nSources: {}", config.sources.len());
    for source in &config.sources {
        println!(
            "  - {}: ({:.2}, {:.2}), {} dispersion relation(s)",
            source.name,
            source.position[0],
            source.position[1],
            source.dispersion.len()
        );
    }
}
