//! SMZ Simulator CLI
//!
//! Evaluate simple mix zones over vehicular traces, sweep parameters and
//! prepare trace files.

use clap::{Parser, Subcommand};
use smz_core::{evaluate, summary_line, write_table_file, RunLabel, SmzConfig, SmzError};
use smz_env::{check_ordering, write_trace, FileTrace, Sample, TraceError, TraceSource};
use smz_sim::{
    interpolate, load_movements, DatasetId, InterpolateError, OracleError, SweepError, SweepExport,
    SweepRunner, TrafficConfig, TrafficOracle,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Smz(#[from] SmzError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error(transparent)]
    Interpolate(#[from] InterpolateError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

/// Simple mix zone (SMZ) privacy evaluation
#[derive(Parser, Debug)]
#[command(name = "smz-sim")]
#[command(about = "Evaluate simple mix zone privacy over vehicular traces", long_about = None)]
struct Args {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one (duration, radius) combination on one trace
    Run {
        /// Sorted, fully enumerated trace file
        #[arg(short, long)]
        trace: PathBuf,

        /// Mix zone bucket duration in seconds
        #[arg(short, long, default_value = "50")]
        duration: i64,

        /// Mix zone radius in meters
        #[arg(short, long, default_value = "50")]
        radius: f64,

        /// Dataset preset providing the mix zone center (rural, urban, city)
        #[arg(long)]
        dataset: Option<DatasetId>,

        /// Mix zone center x (overrides the dataset preset)
        #[arg(long)]
        center_x: Option<f64>,

        /// Mix zone center y (overrides the dataset preset)
        #[arg(long)]
        center_y: Option<f64>,

        /// Distance from the region edge counted as leaving (meters)
        #[arg(long, default_value = "20")]
        edge_threshold: f64,

        /// Write the per-vehicle table here
        #[arg(long)]
        table: Option<PathBuf>,

        /// Verify the trace is sorted by (time, vehicle) before running
        #[arg(long)]
        check_order: bool,
    },

    /// Sweep durations x radii over one or all datasets
    Sweep {
        /// Dataset to sweep (rural, urban, city, all)
        #[arg(short = 'S', long, default_value = "all")]
        dataset: String,

        /// Directory holding <dataset>.srt files
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        /// Bucket durations in seconds
        #[arg(long, value_delimiter = ',', default_value = "25,50,75,100")]
        durations: Vec<i64>,

        /// Radii in meters
        #[arg(long, value_delimiter = ',', default_value = "50,100,150")]
        radii: Vec<f64>,

        /// Write per-vehicle tables into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Export all summaries as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Run combinations in parallel
        #[arg(long)]
        parallel: bool,

        /// Verify each trace is sorted by (time, vehicle) before running
        #[arg(long)]
        check_order: bool,
    },

    /// Expand a GMSF/MMTS movement file into a fully enumerated trace
    Interpolate {
        /// Movement file (7 fields per line)
        #[arg(short, long)]
        input: PathBuf,

        /// Output trace file
        #[arg(short, long)]
        output: PathBuf,

        /// Sort output by (time, vehicle)
        #[arg(long)]
        sort: bool,
    },

    /// Generate a synthetic trace
    Synth {
        /// Output trace file
        #[arg(short, long)]
        output: PathBuf,

        /// Master seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Number of vehicles
        #[arg(long, default_value = "200")]
        vehicles: usize,

        /// Trace length in ticks
        #[arg(long, default_value = "2000")]
        ticks: i64,

        /// Hotspot x the traffic converges on
        #[arg(long, default_value = "1500")]
        hotspot_x: f64,

        /// Hotspot y the traffic converges on
        #[arg(long, default_value = "1500")]
        hotspot_y: f64,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
    }
}

fn load_checked(source: &dyn TraceSource, check_order: bool) -> Result<Vec<Sample>, CliError> {
    let samples = source.load()?;
    if check_order {
        check_ordering(&samples)?;
        info!("{}: {} samples in (time, vehicle) order", source.name(), samples.len());
    }
    Ok(samples)
}

#[allow(clippy::too_many_arguments)]
fn run_single(
    trace: &Path,
    duration: i64,
    radius: f64,
    dataset: Option<DatasetId>,
    center_x: Option<f64>,
    center_y: Option<f64>,
    edge_threshold: f64,
    table: Option<&Path>,
    check_order: bool,
) -> Result<(), CliError> {
    let preset = dataset.map(|d| d.center());
    let center = match (center_x, center_y, preset) {
        (Some(x), Some(y), _) => (x, y),
        (x, y, Some((px, py))) => (x.unwrap_or(px), y.unwrap_or(py)),
        _ => {
            return Err(CliError::Usage(
                "mix zone center needs --dataset or both --center-x and --center-y".to_string(),
            ))
        }
    };

    let source = match dataset {
        Some(d) => FileTrace::new(trace).with_name(d.name()),
        None => FileTrace::new(trace),
    };
    let samples = load_checked(&source, check_order)?;

    let config = SmzConfig::new(duration, radius, center).with_edge_threshold(edge_threshold);
    let (outcome, summary) = evaluate(&config, &samples)?;

    if let Some(path) = table {
        let rows = write_table_file(path, &outcome.table)?;
        info!("Wrote {} vehicle rows to {}", rows, path.display());
    }

    println!(
        "{}",
        summary_line(&RunLabel::new(source.name(), duration, radius), &summary)
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_sweep(
    dataset: &str,
    data_dir: &Path,
    durations: Vec<i64>,
    radii: Vec<f64>,
    out_dir: Option<&Path>,
    json: Option<&Path>,
    parallel: bool,
    check_order: bool,
) -> Result<(), CliError> {
    let datasets: Vec<DatasetId> = if dataset == "all" {
        DatasetId::all()
    } else {
        vec![dataset.parse().map_err(CliError::Usage)?]
    };

    let mut runner = SweepRunner::new()
        .with_durations(durations)
        .with_radii(radii)
        .with_parallel(parallel);
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)?;
        runner = runner.with_table_dir(dir);
    }

    let mut export = SweepExport::new();
    for id in datasets {
        info!("Dataset {}: {}", id, id.description());
        let source = id.trace(data_dir);
        let samples = load_checked(&source, check_order)?;
        let results = runner.run_samples(id.name(), id.center(), &samples)?;

        for result in &results {
            println!("{}", result.summary_line());
            if !result.summary.entries_consistent() {
                warn!(
                    "{} d={} r={}: {} anonymized vehicles vs {} mix zone entries",
                    id,
                    result.label.bucket_duration,
                    result.label.radius,
                    result.summary.anonymized.count,
                    result.summary.smz_total
                );
            }
        }
        export.extend(&results);
    }

    if let Some(path) = json {
        export.write_to_file(path)?;
        info!("Exported {} runs to {}", export.runs.len(), path.display());
    }
    Ok(())
}

fn run_interpolate(input: &Path, output: &Path, sort: bool) -> Result<(), CliError> {
    let records = load_movements(input)?;
    let samples = interpolate(&records, sort);

    write_trace(BufWriter::new(File::create(output)?), &samples)?;
    info!(
        "Expanded {} movements into {} samples -> {}",
        records.len(),
        samples.len(),
        output.display()
    );
    Ok(())
}

fn run_synth(output: &Path, config: TrafficConfig) -> Result<(), CliError> {
    let seed = config.seed;
    let samples = TrafficOracle::generate(config)?;

    write_trace(BufWriter::new(File::create(output)?), &samples)?;
    info!("Generated {} samples (seed={}) -> {}", samples.len(), seed, output.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Command::Run {
            trace,
            duration,
            radius,
            dataset,
            center_x,
            center_y,
            edge_threshold,
            table,
            check_order,
        } => run_single(
            &trace,
            duration,
            radius,
            dataset,
            center_x,
            center_y,
            edge_threshold,
            table.as_deref(),
            check_order,
        ),
        Command::Sweep {
            dataset,
            data_dir,
            durations,
            radii,
            out_dir,
            json,
            parallel,
            check_order,
        } => run_sweep(
            &dataset,
            &data_dir,
            durations,
            radii,
            out_dir.as_deref(),
            json.as_deref(),
            parallel,
            check_order,
        ),
        Command::Interpolate { input, output, sort } => run_interpolate(&input, &output, sort),
        Command::Synth {
            output,
            seed,
            vehicles,
            ticks,
            hotspot_x,
            hotspot_y,
        } => run_synth(
            &output,
            TrafficConfig {
                seed,
                vehicles,
                ticks,
                hotspot: (hotspot_x, hotspot_y),
                ..Default::default()
            },
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
