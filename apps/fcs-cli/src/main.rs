use clap::{Parser, Subcommand};
use fcs_controls::StaticAircraftState;
use fcs_props::{PropertyError, normalize};
use fcs_system::{FlightControlSystem, SystemResult};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fcs-cli")]
#[command(about = "Flight control system component pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration and build every component
    Validate {
        /// Path to the YAML or JSON configuration
        config_path: PathBuf,
    },
    /// Run frames and print watched properties as CSV
    Run {
        /// Path to the YAML or JSON configuration
        config_path: PathBuf,
        /// Number of frames to run after trimming
        #[arg(long, default_value_t = 120)]
        frames: u64,
        /// Frames to run in trim mode first
        #[arg(long, default_value_t = 0)]
        trim_frames: u64,
        /// Set a property before running, as name=value
        #[arg(long = "set", value_parser = parse_assignment)]
        assignments: Vec<(String, f64)>,
        /// Property to print; defaults to every component output
        #[arg(long = "watch")]
        watch: Vec<String>,
    },
}

fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value in '{s}': {e}"))?;
    Ok((name.trim().to_string(), value))
}

fn main() -> SystemResult<()> {
    // stdout carries the CSV table
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run {
            config_path,
            frames,
            trim_frames,
            assignments,
            watch,
        } => cmd_run(&config_path, frames, trim_frames, &assignments, &watch),
    }
}

fn cmd_validate(config_path: &Path) -> SystemResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = fcs_config::load(config_path)?;
    let fcs = FlightControlSystem::from_config(&config)?;
    let components: usize = fcs.channels().map(|c| c.components().len()).sum();
    println!("✓ Configuration is valid");
    println!("  Channels: {}", fcs.channels().count());
    println!("  Components: {}", components);
    println!("  Properties: {}", fcs.properties().len());
    Ok(())
}

fn cmd_run(
    config_path: &Path,
    frames: u64,
    trim_frames: u64,
    assignments: &[(String, f64)],
    watch: &[String],
) -> SystemResult<()> {
    let mut fcs = FlightControlSystem::load(config_path)?;
    info!(system = fcs.name(), dt = fcs.dt(), "loaded configuration");

    for (name, value) in assignments {
        fcs.properties_mut().set_by_name(name, *value)?;
    }

    let watched: Vec<String> = if watch.is_empty() {
        fcs.channels()
            .flat_map(|c| c.components())
            .map(|c| c.core().property_name().to_string())
            .collect()
    } else {
        watch.iter().map(|w| normalize(w)).collect()
    };
    let ids = watched
        .iter()
        .map(|name| {
            fcs.properties()
                .resolve(name)
                .ok_or_else(|| PropertyError::NotFound { name: name.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let aircraft = StaticAircraftState::default();
    if trim_frames > 0 {
        fcs.set_trim(true);
        for _ in 0..trim_frames {
            fcs.run(&aircraft)?;
        }
        fcs.set_trim(false);
        info!(frames = trim_frames, "trim complete");
    }

    println!("{}", csv_header(&watched));
    for _ in 0..frames {
        fcs.run(&aircraft)?;
        let values: Vec<f64> = ids.iter().map(|id| fcs.properties().get(*id)).collect();
        println!("{}", csv_row(fcs.frame() - 1, fcs.dt(), &values));
    }
    info!(frames, "run complete");
    Ok(())
}

fn csv_header(watched: &[String]) -> String {
    let mut columns = vec!["frame".to_string(), "time".to_string()];
    columns.extend(watched.iter().cloned());
    columns.join(",")
}

/// One table row. `time` is the simulation time at the end of the frame.
fn csv_row(frame: u64, dt: f64, values: &[f64]) -> String {
    let mut fields = vec![frame.to_string(), format!("{:.6}", (frame + 1) as f64 * dt)];
    fields.extend(values.iter().map(f64::to_string));
    fields.join(",")
}
