//! Replays a recorded landmark trace through the repetition counter.

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use rep_counter::{config::Config, landmarks::Frame, session::Session};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded trace (YAML list of `{t, landmarks}` entries)
    #[arg(short, long, required_unless_present = "list")]
    trace: Option<PathBuf>,

    /// Exercise profile identifier
    #[arg(short, long, default_value = "squat")]
    exercise: String,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// List available exercises and exit
    #[arg(long)]
    list: bool,

    /// Print every frame's feedback
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// One recorded detector output
#[derive(Debug, Deserialize)]
struct TraceEntry {
    /// Capture time in seconds
    t: f64,
    landmarks: Frame,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => Config::default(),
    };
    config.validate()?;
    let registry = config.build_registry()?;

    if args.list {
        for profile in registry.iter() {
            println!(
                "{:<10} {:<10} down<{:.0} up>{:.0}",
                profile.id, profile.label, profile.down_threshold, profile.up_threshold
            );
        }
        return Ok(());
    }

    let trace_path = args.trace.context("--trace is required")?;
    let content = std::fs::read_to_string(&trace_path)
        .with_context(|| format!("Failed to read trace {}", trace_path.display()))?;
    let trace: Vec<TraceEntry> = serde_yaml::from_str(&content).context("Failed to parse trace")?;
    info!("Replaying {} frames from {}", trace.len(), trace_path.display());

    let start = trace.first().map_or(0.0, |entry| entry.t);
    let mut session = Session::from_config(&config, &registry, &args.exercise, start)?;

    let mut end = start;
    let mut skipped = 0usize;
    for entry in &trace {
        let output = session.process_frame(&entry.landmarks, entry.t);
        if let Some(reason) = output.skipped {
            debug!("Frame at {:.3}s skipped: {:?}", entry.t, reason);
            skipped += 1;
        }
        if args.verbose {
            println!(
                "{:>8.3}s {:?} reps={} {}",
                entry.t, output.phase, output.rep_count, output.feedback_text
            );
        }
        end = entry.t;
    }

    if skipped > 0 {
        info!("{skipped} of {} frames skipped", trace.len());
    }

    let summary = session.stop(end);
    print!("{}", serde_yaml::to_string(&summary)?);

    Ok(())
}
