//! mknn CLI
//!
//! Reads a delimited point table, builds its mutual kNN graph, and writes
//! the graph as an ncol or pajek edge list.
//!
//! ```text
//! mknn -f data/iris.csv -k 5 -c -e pajek -vv
//! ```
//!
//! Exit code 1 on any error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use mknn::io::{default_output_path, read_points, write_graph_file, Delimiter, GraphFormat, ReadOptions};
use mknn::{
    build_mknn_graph, DistanceCombination, DistanceMetric, IndexKind, MknnError, MknnParams,
};

/// MkNN graph construction
#[derive(Parser, Debug)]
#[command(name = "mknn")]
#[command(version)]
#[command(about = "Build the mutual k-nearest-neighbor graph of a point table")]
struct Cli {
    /// Point table to load
    #[arg(short = 'f', long = "filename", value_name = "FILE")]
    filename: PathBuf,

    /// Output directory (default: directory of FILE), created if missing
    #[arg(short = 'd', long = "directory", value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Output file name inside DIR (default: <stem>-mknn<k>.<format>)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Neighbors per point (default: 3)
    #[arg(short = 'k', long = "k", allow_negative_numbers = true)]
    k: Option<i64>,

    /// Resolver threads, 0 = all cores (default: 0)
    #[arg(short = 't', long = "threads", allow_negative_numbers = true)]
    threads: Option<i64>,

    /// Output format
    #[arg(short = 'e', long = "format", default_value_t = GraphFormat::Ncol)]
    format: GraphFormat,

    /// Treat the last column as a label and ignore it
    #[arg(short = 'c', long = "drop-last-column")]
    drop_last_column: bool,

    /// Leading lines to skip, e.g. a header
    #[arg(long, default_value_t = 0)]
    skip_rows: usize,

    /// Field delimiter: a character, 'tab' or 'whitespace' (default: sniffed)
    #[arg(long)]
    delimiter: Option<Delimiter>,

    /// Distance metric: euclidean, manhattan, chebyshev
    #[arg(long)]
    metric: Option<DistanceMetric>,

    /// Neighbor index: kdtree, exhaustive
    #[arg(long)]
    index: Option<IndexKind>,

    /// Merge of the two directional distances: mean, min, max
    #[arg(long)]
    combine: Option<DistanceCombination>,

    /// JSON parameter file; explicit flags override it
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let params = resolve_params(&cli)?;

    let options = ReadOptions {
        delimiter: cli.delimiter,
        skip_rows: cli.skip_rows,
        drop_last_column: cli.drop_last_column,
    };
    let points = read_points(&cli.filename, &options)
        .with_context(|| format!("failed to load {}", cli.filename.display()))?;
    let output = output_path(&cli, params.k)?;

    let out = build_mknn_graph(&points, &params)?;
    write_graph_file(&output, &out.graph, cli.format)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        output = %output.display(),
        vertices = out.graph.num_vertices(),
        edges = out.graph.num_edges(),
        "graph written"
    );
    Ok(())
}

/// Config file as the base, explicit flags on top.
fn resolve_params(cli: &Cli) -> Result<MknnParams> {
    let mut params = match &cli.config {
        Some(path) => MknnParams::from_json_file(path)?,
        None => MknnParams::default(),
    };
    if let Some(k) = cli.k {
        params.k = non_negative("k", k)?;
    }
    if let Some(threads) = cli.threads {
        params.threads = non_negative("threads", threads)?;
    }
    if let Some(index) = cli.index {
        params.index = index;
    }
    if let Some(metric) = cli.metric {
        params.metric = metric;
    }
    if let Some(combine) = cli.combine {
        params.weighting.combine = combine;
    }
    Ok(params)
}

fn non_negative(name: &str, value: i64) -> Result<usize, MknnError> {
    usize::try_from(value)
        .map_err(|_| MknnError::InvalidParameter(format!("{name} must be >= 0, got {value}")))
}

fn output_path(cli: &Cli, k: usize) -> Result<PathBuf> {
    let dir = cli.directory.as_deref();
    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    Ok(match &cli.output {
        Some(name) => dir
            .or_else(|| cli.filename.parent())
            .map_or_else(|| name.clone(), |d: &Path| d.join(name)),
        None => default_output_path(&cli.filename, dir, k, cli.format),
    })
}
