//! GEO OS CLI - metric registry and scorecard reports

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Diagnostics go to stderr, results to stdout

use anyhow::Context;
use clap::{Parser, Subcommand};
use geoos_core::config::{self, ResolvedConfig};
use geoos_core::metrics::{self, MetricId};
use geoos_core::report::{render_registry_json, render_registry_text};
use geoos_core::tone::{evaluate, Direction, ToneEvaluation};
use geoos_core::{render_json, render_text, report_from_files};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "geoos")]
#[command(about = "Generative-engine-optimization metric registry and scorecard reports")]
#[command(version = env!("GEOOS_VERSION"))]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the metric registry
    Metrics {
        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Classify a signed delta or gap as good, bad or neutral
    Evaluate {
        /// Signed value to classify
        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// Direction of improvement
        #[arg(long, required_unless_present = "metric", conflicts_with = "metric")]
        direction: Option<DirectionArg>,

        /// Use the direction of this metric (e.g. reach, avgPosition)
        #[arg(long, value_parser = parse_metric_id)]
        metric: Option<MetricId>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Format a value with a metric's precision and unit
    Format {
        /// Metric id (e.g. reach, avgPosition)
        #[arg(value_parser = parse_metric_id)]
        metric: MetricId,

        /// Value to format
        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// Format as a signed change
        #[arg(long)]
        delta: bool,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Report period deltas and benchmark gaps for a scorecard
    Report {
        /// Path to the current scorecard JSON
        current: PathBuf,

        /// Path to the previous scorecard JSON (default: baseline report)
        #[arg(long)]
        previous: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Show only the N largest changes and gaps (overrides config file)
        #[arg(long)]
        top: Option<usize>,

        /// Neutral band for tone evaluation (overrides config file)
        #[arg(long)]
        neutral_band: Option<f64>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without building a report
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum DirectionArg {
    HigherBetter,
    LowerBetter,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::HigherBetter => Direction::HigherBetter,
            DirectionArg::LowerBetter => Direction::LowerBetter,
        }
    }
}

fn parse_metric_id(s: &str) -> Result<MetricId, String> {
    s.parse::<MetricId>().map_err(|e| e.to_string())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Metrics { format } => match format {
            OutputFormat::Text => print!("{}", render_registry_text(metrics::all())),
            OutputFormat::Json => println!("{}", render_registry_json(metrics::all())?),
        },
        Commands::Evaluate {
            value,
            direction,
            metric,
            format,
        } => {
            // clap guarantees exactly one of --direction / --metric
            let direction = match (direction, metric) {
                (Some(d), _) => Direction::from(d),
                (None, Some(id)) => metrics::get(id).direction,
                (None, None) => anyhow::bail!("either --direction or --metric is required"),
            };
            let evaluation = evaluate(value, direction);
            print_evaluation(&evaluation, format)?;
        }
        Commands::Format {
            metric,
            value,
            delta,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let rendered = if delta {
                resolved.formatter.format_delta(metric, value)
            } else {
                resolved.formatter.format(metric, value)
            };
            println!("{}", rendered);
        }
        Commands::Report {
            current,
            previous,
            format,
            top,
            neutral_band,
            config: config_path,
            output,
        } => {
            let current = normalize_path(current)?;
            let previous = previous.map(normalize_path).transpose()?;

            let mut resolved = load_config(config_path.as_deref())?;

            // CLI flags override config file values
            if let Some(top) = top {
                if top == 0 {
                    anyhow::bail!("--top must be at least 1");
                }
                resolved.top_n = Some(top);
            }
            if let Some(band) = neutral_band {
                if !band.is_finite() || band < 0.0 {
                    anyhow::bail!("--neutral-band must be a non-negative number (got {})", band);
                }
                resolved.neutral_band = band;
            }

            let report = report_from_files(&current, previous.as_deref(), &resolved)
                .context("failed to build scorecard report")?;

            let rendered = match format {
                OutputFormat::Text => render_text(&report, &resolved.formatter),
                OutputFormat::Json => format!("{}\n", render_json(&report)?),
            };

            match output {
                Some(path) => {
                    write_report(&path, &rendered)?;
                    eprintln!("Report written to: {}", path.display());
                }
                None => print!("{}", rendered),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = find_project_root(&std::env::current_dir()?);
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let resolved = load_config(path.as_deref())?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Load configuration, discovering it from the current directory upward
fn load_config(config_path: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let project_root = find_project_root(&std::env::current_dir()?);
    let resolved = config::load_and_resolve(&project_root, config_path)
        .context("failed to load configuration")?;
    if let Some(ref p) = resolved.config_path {
        tracing::info!(path = %p.display(), "using config");
    }
    Ok(resolved)
}

fn print_evaluation(evaluation: &ToneEvaluation, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => println!(
            "{} {} {}",
            evaluation.arrow.glyph(),
            evaluation.tone.as_str(),
            evaluation.arrow.as_str()
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(evaluation).context("failed to serialize evaluation")?
        ),
    }
    Ok(())
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!("Tone:");
    println!("  neutral_band: {}", resolved.neutral_band);
    println!();
    println!("Decimals:");
    for def in metrics::all() {
        let effective = resolved.formatter.decimals(def.id);
        let marker = if effective != def.decimals {
            " (override)"
        } else {
            ""
        };
        println!("  {}: {}{}", def.id, effective, marker);
    }
    println!();
    println!("Filters:");
    println!(
        "  metrics: {}",
        resolved
            .metrics
            .as_ref()
            .map(|ids| ids
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", "))
            .unwrap_or_else(|| "all".to_string())
    );
    println!(
        "  top: {}",
        resolved
            .top_n
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
}

/// Normalize a path to absolute and check that it exists
fn normalize_path(path: PathBuf) -> anyhow::Result<PathBuf> {
    let normalized = if path.is_relative() {
        std::env::current_dir()?.join(&path)
    } else {
        path
    };
    if !normalized.exists() {
        anyhow::bail!("Path does not exist: {}", normalized.display());
    }
    Ok(normalized)
}

/// Write report to file with atomic write pattern
fn write_report(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    // Atomic write (temp + rename pattern)
    let temp_path = temp_path_for(path)?;
    std::fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}

/// Sibling temp file for `path`: `report.json` becomes `report.json.tmp`
fn temp_path_for(path: &Path) -> anyhow::Result<PathBuf> {
    let mut name = path
        .file_name()
        .with_context(|| format!("Output path has no file name: {}", path.display()))?
        .to_os_string();
    name.push(".tmp");
    Ok(path.with_file_name(name))
}

/// Find the project root by searching up for a config file or `.git`
///
/// Falls back to `start_path` when nothing is found.
fn find_project_root(start_path: &Path) -> PathBuf {
    const MARKERS: &[&str] = &[".geoosrc.json", "geoos.config.json", "package.json", ".git"];

    let mut current = start_path.to_path_buf();
    loop {
        if MARKERS.iter().any(|m| current.join(m).exists()) {
            return current;
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return start_path.to_path_buf(),
        }
    }
}
