use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use proximity::validate::{brute_force_sizes, grid_subsets, uniform_points};
use proximity::{cluster_sizes, cluster_sizes_observed, ClusterCfg, Instance, Stage};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

mod provenance;
mod table;
mod trace;

use trace::{InstanceTrace, Recorder};

/// Distances of the random validation trials (unit square clouds).
const RANDOM_DISTANCES: [f64; 4] = [0.1, 0.075, 0.05, 0.025];

#[derive(Parser)]
#[command(name = "proximity")]
#[command(about = "Component sizes of fixed-radius proximity graphs")]
struct Cmd {
    /// Debug-level logs on stderr (`RUST_LOG` takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Args, Clone, Copy, Debug)]
struct EngineArgs {
    /// Worker threads (0 = available parallelism, 1 = sequential)
    #[arg(long, default_value_t = 1)]
    workers: usize,
    /// Bands per distance (band height is d / M)
    #[arg(long, default_value_t = 1)]
    band_divisions: u32,
    /// Nearest bridge candidates per side (0 disables bridging)
    #[arg(long, default_value_t = 2)]
    bridge_fanout: usize,
}

impl From<EngineArgs> for ClusterCfg {
    fn from(a: EngineArgs) -> Self {
        ClusterCfg {
            workers: a.workers,
            band_divisions: a.band_divisions,
            bridge_fanout: a.bridge_fanout,
        }
    }
}

#[derive(Subcommand)]
enum Action {
    /// Print component sizes for each instance file
    Run {
        /// Instance files: distance on the first line, then "x, y" per line
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        engine: EngineArgs,
        /// Print a stage timing table on stderr
        #[arg(long)]
        timings: bool,
        /// Write a JSON trace of bands, edges and fusions (plus a provenance sidecar)
        #[arg(long)]
        trace_out: Option<PathBuf>,
        /// Write a per-instance result table (.csv or .parquet)
        #[arg(long)]
        table: Option<PathBuf>,
    },
    /// Compare the engine against brute force
    Validate {
        /// Side of the grid whose non-empty subsets are all checked (at most 4)
        #[arg(long, default_value_t = 4)]
        grid: usize,
        /// Threshold for the grid check
        #[arg(long, default_value_t = 1.0)]
        distance: f64,
        /// Points per random trial
        #[arg(long, default_value_t = 2_000)]
        random: usize,
        /// Random trials per distance
        #[arg(long, default_value_t = 5)]
        trials: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 2)]
        workers: usize,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let filter = log_filter(cmd.verbose, std::env::var("RUST_LOG").ok().as_deref())?;
    SubscriberBuilder::default()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Run {
            files,
            engine,
            timings,
            trace_out,
            table,
        } => run(&files, engine, timings, trace_out.as_deref(), table.as_deref()),
        Action::Validate {
            grid,
            distance,
            random,
            trials,
            seed,
            workers,
        } => validate(grid, distance, random, trials, seed, workers),
        Action::Report => report(),
    }
}

/// `RUST_LOG` directives when set, otherwise `info` (`debug` with `--verbose`).
fn log_filter(verbose: bool, rust_log: Option<&str>) -> Result<EnvFilter> {
    let directives = match rust_log {
        Some(env) if !env.trim().is_empty() => env,
        _ if verbose => "debug",
        _ => "info",
    };
    EnvFilter::try_new(directives).with_context(|| format!("parsing log filter {directives:?}"))
}

fn run(
    files: &[PathBuf],
    engine: EngineArgs,
    timings: bool,
    trace_out: Option<&Path>,
    table_out: Option<&Path>,
) -> Result<()> {
    let cfg = ClusterCfg::from(engine);
    let mut traces = Vec::with_capacity(files.len());
    for file in files {
        let trace = run_one(file, &cfg, trace_out.is_some())?;
        println!("{}", render_sizes(&trace.sizes));
        traces.push(trace);
    }

    if timings {
        eprint!("{}", timing_table(&traces));
    }
    if let Some(path) = table_out {
        table::write(path, &traces)?;
    }
    if let Some(path) = trace_out {
        write_trace(path, &traces, engine, files)?;
    }
    Ok(())
}

fn run_one(file: &Path, cfg: &ClusterCfg, events: bool) -> Result<InstanceTrace> {
    let instance =
        Instance::load(file).with_context(|| format!("loading instance {}", file.display()))?;
    tracing::info!(
        file = %file.display(),
        points = instance.points.len(),
        distance = instance.distance,
        "instance"
    );
    let recorder = Recorder::new(
        file.display().to_string(),
        instance.distance,
        instance.points.len(),
        events,
    );
    let sizes = cluster_sizes_observed(&instance.points, instance.distance, cfg, &recorder)
        .with_context(|| format!("clustering {}", file.display()))?;
    Ok(recorder.finish(sizes))
}

/// `[12, 7, 7, 3, 1]`
fn render_sizes(sizes: &[usize]) -> String {
    format!("{sizes:?}")
}

fn timing_table(traces: &[InstanceTrace]) -> String {
    let mut out = format!(
        "{:<32} {:>8} {:>10} {:>10} {:>10} {:>10}\n",
        "instance", "points", "prepare", "index", "sweep", "reduce"
    );
    for t in traces {
        out.push_str(&format!(
            "{:<32} {:>8} {:>10.3} {:>10.3} {:>10.3} {:>10.3}\n",
            t.instance,
            t.points,
            t.millis(Stage::Prepare),
            t.millis(Stage::Index),
            t.millis(Stage::Sweep),
            t.millis(Stage::Reduce),
        ));
    }
    out
}

fn write_trace(path: &Path, traces: &[InstanceTrace], engine: EngineArgs, files: &[PathBuf]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let doc = json!({ "instances": traces });
    std::fs::write(path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;

    let payload = provenance::Payload::new(json!({
        "workers": engine.workers,
        "band_divisions": engine.band_divisions,
        "bridge_fanout": engine.bridge_fanout,
    }))
    .with_inputs(files.iter().map(|f| f.display().to_string()));
    let sidecar = provenance::write_sidecar(path, payload)?;
    tracing::info!(trace = %path.display(), sidecar = %sidecar.display(), "trace written");
    Ok(())
}

fn validate(grid: usize, distance: f64, random: usize, trials: u64, seed: u64, workers: usize) -> Result<()> {
    if grid * grid > 24 {
        bail!("grid side {grid} has too many subsets to enumerate (max 4)");
    }
    let configs = [
        ClusterCfg::default(),
        ClusterCfg {
            workers,
            ..ClusterCfg::default()
        },
        ClusterCfg {
            band_divisions: 2,
            bridge_fanout: 0,
            ..ClusterCfg::default()
        },
    ];

    let mut checked = 0usize;
    for pts in grid_subsets(grid) {
        let expected = brute_force_sizes(&pts, distance);
        for cfg in &configs {
            let got = cluster_sizes(&pts, distance, cfg)?;
            if got != expected {
                bail!("grid mismatch with {cfg:?} on {pts:?}: got {got:?}, expected {expected:?}");
            }
        }
        checked += 1;
    }
    tracing::info!(grid, distance, subsets = checked, "grid subsets match brute force");

    for d in RANDOM_DISTANCES {
        for t in 0..trials {
            let pts = uniform_points(random, 1.0, seed.wrapping_add(t));
            let expected = brute_force_sizes(&pts, d);
            for cfg in &configs {
                let got = cluster_sizes(&pts, d, cfg)?;
                if got != expected {
                    bail!("random mismatch with {cfg:?}: d={d} trial={t} seed={}", seed.wrapping_add(t));
                }
            }
        }
        tracing::info!(d, trials, points = random, "random clouds match brute force");
    }
    println!("ok: {checked} grid subsets, {} random trials", trials as usize * RANDOM_DISTANCES.len());
    Ok(())
}

fn report() -> Result<()> {
    let doc = provenance::document(&provenance::Payload::new(json!({
        "defaults": {
            "workers": ClusterCfg::default().workers,
            "band_divisions": ClusterCfg::default().band_divisions,
            "bridge_fanout": ClusterCfg::default().bridge_fanout,
        }
    })));
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
