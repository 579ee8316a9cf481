//! Tracescope CLI
//!
//! Command-line interface over the trace model:
//! - Bin a CSV trace and print the bin table
//! - Shift, zoom or jump the window
//! - Locate a task's first and last entry in every bin
//! - Generate a default config file

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracescope::config::{generate_default_config, Config, LoggingConfig};
use tracescope::data::{convert_nano, freeze, load_csv, time_bounds, EntryFilter, FilterKind};
use tracescope::index::{CollectionRegistry, Lookup, Matcher};
use tracescope::model::{Bin, ModelState, TraceHistogram};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tracescope")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Windowed, binned views over kernel trace data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Trace file and initial window
#[derive(Args)]
struct WindowArgs {
    /// CSV trace (ts,cpu,pid,event_id,... with a header row)
    trace: PathBuf,

    /// Number of bins (default from config)
    #[arg(long)]
    bins: Option<usize>,

    /// Window start (default: first timestamp)
    #[arg(long)]
    min: Option<u64>,

    /// Window end (default: last timestamp)
    #[arg(long)]
    max: Option<u64>,

    /// Hide entries of these tasks from the graph
    #[arg(long = "hide-task")]
    hide_tasks: Vec<i32>,

    /// Hide entries of these events from the graph
    #[arg(long = "hide-event")]
    hide_events: Vec<i32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the bin table of a window
    Bins {
        #[command(flatten)]
        window: WindowArgs,
    },

    /// Shift the window by whole bins
    Shift {
        #[command(flatten)]
        window: WindowArgs,
        /// Bins to shift (default from config)
        #[arg(long)]
        by: Option<usize>,
        /// Shift towards earlier timestamps
        #[arg(long)]
        backward: bool,
    },

    /// Zoom the window around a bin
    Zoom {
        #[command(flatten)]
        window: WindowArgs,
        /// Fraction of the window to add or remove (default from config)
        #[arg(long)]
        ratio: Option<f64>,
        /// Bin to keep in view (default: centre bin)
        #[arg(long)]
        focus: Option<usize>,
        /// Zoom out instead of in
        #[arg(long)]
        out: bool,
    },

    /// Recenter the window on a timestamp
    Jump {
        #[command(flatten)]
        window: WindowArgs,
        /// Target timestamp
        #[arg(long)]
        to: u64,
    },

    /// First and last entry of a task in every bin
    Task {
        #[command(flatten)]
        window: WindowArgs,
        /// Task id
        #[arg(long)]
        pid: i32,
        /// Scan bins directly instead of through a collection
        #[arg(long)]
        no_collection: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_logging(&config.logging);

    match cli.command {
        Commands::Bins { window } => {
            let model = open(&window, &config)?;
            print_bins(&model, cli.format)?;
        }

        Commands::Shift {
            window,
            by,
            backward,
        } => {
            let mut model = open(&window, &config)?;
            let by = by.unwrap_or(config.model.shift_bins);
            if backward {
                model.shift_backward(by)?;
            } else {
                model.shift_forward(by)?;
            }
            print_bins(&model, cli.format)?;
        }

        Commands::Zoom {
            window,
            ratio,
            focus,
            out,
        } => {
            let mut model = open(&window, &config)?;
            let ratio = ratio.unwrap_or(config.model.zoom_ratio);
            if out {
                model.zoom_out(ratio, focus)?;
            } else {
                model.zoom_in(ratio, focus)?;
            }
            print_bins(&model, cli.format)?;
        }

        Commands::Jump { window, to } => {
            let mut model = open(&window, &config)?;
            model.jump_to(to)?;
            print_bins(&model, cli.format)?;
        }

        Commands::Task {
            window,
            pid,
            no_collection,
        } => {
            let model = open(&window, &config)?;
            print_task(&model, pid, !no_collection, &config, cli.format)?;
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tracescope={}", config.level)));

    // Logs go to stderr so JSON output on stdout stays clean
    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

/// Load, filter and bin a trace
fn open(window: &WindowArgs, config: &Config) -> anyhow::Result<TraceHistogram> {
    let mut entries = load_trace(&window.trace)?;

    let mut filter = EntryFilter::default();
    for &pid in &window.hide_tasks {
        filter.add_id(FilterKind::HideTask, pid);
    }
    for &event in &window.hide_events {
        filter.add_id(FilterKind::HideEvent, event);
    }
    if filter.is_set() {
        let hidden = filter.apply(&mut entries);
        tracing::info!("Filters hide {} entries", hidden);
    }

    let data = freeze(entries);
    let Some((first, last)) = time_bounds(&data) else {
        bail!("trace {:?} has no entries", window.trace);
    };

    let n = window.bins.unwrap_or(config.model.n_bins);
    let min = window.min.unwrap_or(first);
    let max = window.max.unwrap_or(last);

    let mut model = TraceHistogram::new();
    model.set_binning(n, min, max)?;
    model.fill(data);

    if model.state() != ModelState::Filled {
        bail!("cannot split [{}, {}] into {} bins", min, max, n);
    }

    Ok(model)
}

fn load_trace(path: &Path) -> anyhow::Result<Vec<tracescope::data::Entry>> {
    load_csv(path).with_context(|| format!("failed to load trace {:?}", path))
}

#[derive(Serialize)]
struct BinRow {
    bin: String,
    start_ts: Option<u64>,
    first: Option<usize>,
    count: usize,
}

#[derive(Serialize)]
struct BinReport {
    min: u64,
    max: u64,
    bin_size: u64,
    n_bins: usize,
    bins: Vec<BinRow>,
}

fn bin_report(model: &TraceHistogram) -> BinReport {
    let row = |bin: Bin, start_ts: Option<u64>| BinRow {
        bin: bin.to_string(),
        start_ts,
        first: model.first_index_at(bin),
        count: model.bin_count(bin),
    };

    let mut bins = vec![row(Bin::LowerOverflow, None)];
    bins.extend((0..model.n_bins()).map(|b| row(Bin::Regular(b), Some(model.bin_ts(b)))));
    bins.push(row(Bin::UpperOverflow, None));

    BinReport {
        min: model.min(),
        max: model.max(),
        bin_size: model.bin_size(),
        n_bins: model.n_bins(),
        bins,
    }
}

fn print_bins(model: &TraceHistogram, format: OutputFormat) -> anyhow::Result<()> {
    let report = bin_report(model);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Window [{}, {}]: {} bins of {}",
        report.min, report.max, report.n_bins, report.bin_size
    );
    println!();
    println!(
        "{:<8} {:>20} {:>18} {:>12} {:>10}",
        "Bin", "Start", "Start (s)", "First", "Count"
    );
    println!("{}", "-".repeat(72));

    for row in &report.bins {
        println!(
            "{:<8} {:>20} {:>18} {:>12} {:>10}",
            row.bin,
            cell(row.start_ts),
            cell(row.start_ts.map(seconds)),
            cell(row.first),
            row.count
        );
    }

    Ok(())
}

/// `sec.usec` rendering of a nanosecond timestamp
fn seconds(ts: u64) -> String {
    let (sec, usec) = convert_nano(ts);
    format!("{}.{:06}", sec, usec)
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn describe<T: ToString>(lookup: Lookup<T>) -> String {
    match lookup {
        Lookup::Found(v) => v.to_string(),
        Lookup::Filtered => "filtered".to_string(),
        Lookup::NotFound => "-".to_string(),
    }
}

#[derive(Serialize)]
struct TaskRow {
    bin: String,
    front: String,
    back: String,
    cpu: String,
}

fn print_task(
    model: &TraceHistogram,
    pid: i32,
    use_collection: bool,
    config: &Config,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let Some(data) = model.data().cloned() else {
        bail!("model has no data");
    };

    let mut registry = CollectionRegistry::new();
    let col = if use_collection {
        let policy = config.collections.policy();
        Some(registry.acquire(&data, Matcher::Pid, pid, &policy)?)
    } else {
        None
    };

    let mut bins = vec![Bin::LowerOverflow];
    bins.extend((0..model.n_bins()).map(Bin::Regular));
    bins.push(Bin::UpperOverflow);

    let rows: Vec<TaskRow> = bins
        .into_iter()
        .filter_map(|bin| {
            let (front, back, cpu) = match col {
                Some(col) => (
                    model.get_collection_entry_front(bin, true, Matcher::Pid, pid, col),
                    model.get_collection_entry_back(bin, true, Matcher::Pid, pid, col),
                    model.get_collection_cpu(bin, pid, true, col),
                ),
                None => (
                    model.get_entry_front(bin, true, Matcher::Pid, pid),
                    model.get_entry_back(bin, true, Matcher::Pid, pid),
                    model.get_cpu(bin, pid, true),
                ),
            };

            if front.is_not_found() && back.is_not_found() {
                return None;
            }

            Some(TaskRow {
                bin: bin.to_string(),
                front: describe(front),
                back: describe(back),
                cpu: describe(cpu),
            })
        })
        .collect();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("Task {} has no entries in the trace", pid);
        return Ok(());
    }

    println!("{:<8} {:>12} {:>12} {:>8}", "Bin", "First", "Last", "CPU");
    println!("{}", "-".repeat(43));
    for row in &rows {
        println!("{:<8} {:>12} {:>12} {:>8}", row.bin, row.front, row.back, row.cpu);
    }

    Ok(())
}
