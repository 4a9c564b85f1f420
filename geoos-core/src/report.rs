//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::config::ResolvedConfig;
use crate::delta::{Delta, MetricDeltaEntry, ReadingStatus};
use crate::format::Formatter;
use crate::gaps::{scorecard_gaps, GapEntry};
use crate::metrics::{get, MetricDefinition};
use crate::scorecard::Scorecard;
use crate::tone::{Arrow, Tone};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Complete scorecard report: period deltas plus benchmark gaps
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ScorecardReport {
    pub brand: String,
    pub period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_period: Option<String>,
    pub baseline: bool,
    /// Row limit applied to `deltas` and `gaps`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    pub deltas: Vec<MetricDeltaEntry>,
    pub gaps: Vec<GapEntry>,
}

/// Build a report for `current`, compared with `previous` when given
///
/// Applies the config's metric filter, neutral band and row limit.
pub fn build_report(
    current: &Scorecard,
    previous: Option<&Scorecard>,
    config: &ResolvedConfig,
) -> Result<ScorecardReport> {
    let delta = Delta::new(current, previous, config.neutral_band)
        .context("failed to compute scorecard delta")?;

    let mut deltas: Vec<MetricDeltaEntry> = delta
        .deltas
        .into_iter()
        .filter(|e| config.should_include(e.metric))
        .collect();
    let mut gaps: Vec<GapEntry> = scorecard_gaps(current, config.neutral_band)
        .into_iter()
        .filter(|g| config.should_include(g.metric))
        .collect();

    if let Some(top_n) = config.top_n {
        deltas = top_changed(deltas, top_n);
        gaps = top_gaps(gaps, top_n);
    }

    Ok(ScorecardReport {
        brand: delta.brand,
        period: delta.period,
        previous_period: delta.previous_period,
        baseline: delta.baseline,
        top_n: config.top_n,
        deltas,
        gaps,
    })
}

/// Keep the N changed entries with the largest absolute delta
///
/// Input is already in default order; the stable sort keeps it for ties.
fn top_changed(deltas: Vec<MetricDeltaEntry>, top_n: usize) -> Vec<MetricDeltaEntry> {
    let mut changed: Vec<MetricDeltaEntry> = deltas
        .into_iter()
        .filter(|e| e.status == ReadingStatus::Changed)
        .collect();
    changed.sort_by(|a, b| {
        let a = a.delta.unwrap_or(0.0).abs();
        let b = b.delta.unwrap_or(0.0).abs();
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });
    changed.truncate(top_n);
    changed
}

/// Keep the N gaps with the largest absolute gap
fn top_gaps(mut gaps: Vec<GapEntry>, top_n: usize) -> Vec<GapEntry> {
    gaps.sort_by(|a, b| {
        b.gap
            .abs()
            .partial_cmp(&a.gap.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    gaps.truncate(top_n);
    gaps
}

/// Render a report as text tables
pub fn render_text(report: &ScorecardReport, formatter: &Formatter) -> String {
    let mut output = String::new();

    match &report.previous_period {
        Some(previous) => output.push_str(&format!(
            "{} · {} vs {}\n",
            report.brand, report.period, previous
        )),
        None => output.push_str(&format!(
            "{} · {} (baseline)\n",
            report.brand, report.period
        )),
    }

    output.push('\n');
    output.push_str(&format!(
        "{:<24} {:<18} {:>8} {:>8} {:>8}  {}\n",
        "TOPIC", "METRIC", "BEFORE", "AFTER", "CHANGE", "TONE"
    ));
    if report.deltas.is_empty() {
        // --top keeps changed rows only
        if report.top_n.is_some() {
            output.push_str("(no changes)\n");
        } else {
            output.push_str("(no readings)\n");
        }
    }
    for entry in &report.deltas {
        let def = get(entry.metric);
        let before = entry
            .before
            .map(|v| formatter.format(entry.metric, v))
            .unwrap_or_else(|| "-".to_string());
        let after = entry
            .after
            .map(|v| formatter.format(entry.metric, v))
            .unwrap_or_else(|| "-".to_string());
        let change = match entry.delta {
            Some(d) => formatter.format_delta(entry.metric, d),
            None => entry.status.as_str().to_string(),
        };
        output.push_str(&format!(
            "{:<24} {:<18} {:>8} {:>8} {:>8}  {}\n",
            truncate_or_pad(&entry.topic, 24),
            def.title,
            before,
            after,
            change,
            tone_label(entry.tone, entry.arrow),
        ));
    }

    if !report.gaps.is_empty() {
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:<18} {:>8} {:>10} {:>8}  {}\n",
            "TOPIC", "GAP", "BRAND", "BENCHMARK", "GAP", "TONE"
        ));
        for gap in &report.gaps {
            let def = get(gap.metric);
            let base = def.calc.base.unwrap_or(gap.metric);
            output.push_str(&format!(
                "{:<24} {:<18} {:>8} {:>10} {:>8}  {}  vs {}\n",
                truncate_or_pad(&gap.topic, 24),
                def.title,
                formatter.format(base, gap.brand_value),
                formatter.format(base, gap.benchmark_value),
                formatter.format_delta(gap.metric, gap.gap),
                tone_label(gap.tone, gap.arrow),
                gap.benchmark,
            ));
        }
    }

    output
}

/// Render a report as JSON output
pub fn render_json(report: &ScorecardReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize report to JSON")
}

/// Render the metric registry as a text table
pub fn render_registry_text(definitions: &[MetricDefinition]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<16} {:<18} {:<18} {:<13} {:<8} {}\n",
        "ID", "TITLE", "UNIT", "DIRECTION", "DECIMALS", "FORMULA"
    ));
    for def in definitions {
        output.push_str(&format!(
            "{:<16} {:<18} {:<18} {:<13} {:<8} {}\n",
            def.id.as_str(),
            def.title,
            def.unit.as_str(),
            def.direction.as_str(),
            def.decimals,
            def.calc.formula,
        ));
    }
    output
}

/// Render the metric registry as JSON
pub fn render_registry_json(definitions: &[MetricDefinition]) -> Result<String> {
    serde_json::to_string_pretty(definitions).context("failed to serialize metric registry")
}

fn tone_label(tone: Tone, arrow: Arrow) -> String {
    format!("{} {}", arrow.glyph(), tone.as_str())
}

/// Truncate or pad string to fixed width (in chars)
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
