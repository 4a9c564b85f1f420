//! GEO OS core library - metric registry, tone evaluation and scorecard reports

#![deny(warnings)]

// Global invariants enforced in this crate:
// - The metric registry is static and immutable
// - Tone evaluation and formatting are pure and total
// - No global mutable state
// - No randomness, clocks, threads, or async
// - Identical input yields byte-for-byte identical output

pub mod config;
pub mod delta;
pub mod format;
pub mod gaps;
pub mod metrics;
pub mod report;
pub mod scorecard;
pub mod tone;

pub use config::ResolvedConfig;
pub use format::{format, format_delta, Formatter};
pub use metrics::{all, get, MetricDefinition, MetricId};
pub use report::{build_report, render_json, render_text, ScorecardReport};
pub use scorecard::Scorecard;
pub use tone::{evaluate, Arrow, Direction, Tone, ToneEvaluation};

use anyhow::Result;
use std::path::Path;

/// Load scorecards from disk and build a report with the given config
///
/// `previous` is optional; without it the report is a baseline.
pub fn report_from_files(
    current: &Path,
    previous: Option<&Path>,
    config: &ResolvedConfig,
) -> Result<ScorecardReport> {
    let current = scorecard::load_scorecard(current)?;
    let previous = delta::load_previous_scorecard(previous)?;
    build_report(&current, previous.as_ref(), config)
}
