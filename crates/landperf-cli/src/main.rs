/// Offline runner for the land-degradation indicator.
///
/// Reads an index stack and zone grid from a JSON request, computes the
/// indicator, and writes the result bundle as JSON (grids as row lists).
/// A request that also carries `baseline_stack` gets the baseline → reporting
/// change grid as well.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use landperf_core::{
    summarize, ClassificationGrid, FrequencyTable, Grid, IndexGrid, IndicatorConfig, IndicatorEngine,
    IndicatorResult, IndicatorSummary, IndicatorWarning,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "landperf", about = "Classify vegetation performance against per-zone reference values")]
struct Args {
    /// Request JSON with `index_stack` and `zone_grid`.
    #[arg(short, long)]
    input: PathBuf,

    /// Indicator configuration JSON. Missing fields take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the percentile rank used for zone references.
    #[arg(short, long)]
    percentile: Option<f64>,

    /// Override the nodata sentinel.
    #[arg(long, allow_hyphen_values = true)]
    nodata: Option<i32>,

    /// Add per-zone class counts to the output.
    #[arg(long)]
    summary: bool,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

// ── Request / response ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Request {
    index_stack: Vec<Vec<Vec<f64>>>,
    zone_grid: Vec<Vec<i32>>,
    #[serde(default)]
    baseline_stack: Option<Vec<Vec<Vec<f64>>>>,
}

#[derive(Debug, Serialize)]
struct Response {
    nodata: i32,
    classification: Vec<Vec<i32>>,
    mean_index: Vec<Vec<Option<f64>>>,
    ratios: Vec<Vec<Option<f64>>>,
    reference_grid: Vec<Vec<Option<f64>>>,
    references: BTreeMap<i32, f64>,
    frequencies: FrequencyTable,
    warnings: Vec<IndicatorWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    change: Option<Vec<Vec<i32>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<IndicatorSummary>,
}

impl Response {
    fn new(result: IndicatorResult, change: Option<ClassificationGrid>, summary: Option<IndicatorSummary>) -> Self {
        Self {
            nodata: result.nodata,
            classification: result.classification.to_rows(),
            mean_index: result.mean_index.to_option_rows(),
            ratios: result.ratios.to_option_rows(),
            reference_grid: result.reference_grid.to_option_rows(),
            references: result.references.iter().collect(),
            frequencies: result.frequencies,
            warnings: result.warnings,
            change: change.map(|g| g.to_rows()),
            summary,
        }
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

fn load_config(args: &Args) -> Result<IndicatorConfig> {
    let mut config = match &args.config {
        Some(path) => IndicatorConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => IndicatorConfig::default(),
    };
    if let Some(p) = args.percentile {
        config.percentile = p;
    }
    if let Some(n) = args.nodata {
        config.nodata = n;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn load_request(path: &Path) -> Result<Request> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing request {}", path.display()))
}

fn parse_stack(stack: Vec<Vec<Vec<f64>>>, label: &str) -> Result<Vec<IndexGrid>> {
    stack
        .into_iter()
        .enumerate()
        .map(|(i, rows)| Grid::from_rows(rows).with_context(|| format!("{label} grid {i}")))
        .collect()
}

fn run(args: &Args) -> Result<Response> {
    let config = load_config(args)?;
    let request = load_request(&args.input)?;

    let stack = parse_stack(request.index_stack, "index")?;
    let zones = Grid::from_rows(request.zone_grid).context("zone grid")?;

    info!(
        periods = stack.len(),
        rows = zones.height,
        cols = zones.width,
        percentile = config.percentile,
        "computing indicator"
    );

    let engine = IndicatorEngine::new(config)?;
    let result = engine.compute(&stack, &zones).context("indicator computation failed")?;
    for w in &result.warnings {
        info!(warning = %w, "non-fatal condition");
    }

    let change = match request.baseline_stack {
        Some(baseline) => {
            let baseline = parse_stack(baseline, "baseline")?;
            let base = engine.compute(&baseline, &zones).context("baseline computation failed")?;
            for w in &base.warnings {
                info!(warning = %w, period = "baseline", "non-fatal condition");
            }
            Some(engine.change(&base, &result)?)
        }
        None => None,
    };

    let summary = if args.summary { Some(summarize(&result, &zones)?) } else { None };
    Ok(Response::new(result, change, summary))
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let response = run(&args)?;
    let json = serde_json::to_string_pretty(&response)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "result written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
