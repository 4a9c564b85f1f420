//! Period-over-period delta computation
//!
//! Computes deterministic deltas between a scorecard and the previous one.
//!
//! Global invariants enforced:
//! - Missing previous scorecards produce baselines, not errors
//! - Readings are matched by (topic, metric); a renamed topic is remove + new
//! - Entries are ordered by topic, then registry order
//! - Both scorecards must describe the same brand

use crate::metrics::{get, MetricId};
use crate::scorecard::{load_scorecard, Readings, Scorecard};
use crate::tone::{evaluate_with_band, Arrow, Tone};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Reading change status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    New,
    Removed,
    Changed,
    Unchanged,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::New => "new",
            ReadingStatus::Removed => "removed",
            ReadingStatus::Changed => "changed",
            ReadingStatus::Unchanged => "unchanged",
        }
    }
}

/// Single (topic, metric) delta entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct MetricDeltaEntry {
    pub topic: String,
    pub metric: MetricId,
    pub status: ReadingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    pub tone: Tone,
    pub arrow: Arrow,
}

/// Complete delta between two scorecards
#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    pub brand: String,
    pub period: String,
    pub previous_period: Option<String>,
    pub baseline: bool,
    pub deltas: Vec<MetricDeltaEntry>,
}

impl Delta {
    /// Create a delta between current and previous scorecards
    ///
    /// # Baseline Handling
    ///
    /// If `previous` is None, every reading in `current` is marked `new`
    /// and `baseline` is set to `true`.
    ///
    /// # Errors
    ///
    /// Returns error if the scorecards are for different brands.
    pub fn new(current: &Scorecard, previous: Option<&Scorecard>, neutral_band: f64) -> Result<Self> {
        let previous = match previous {
            Some(p) => p,
            None => return Ok(build_baseline_delta(current)),
        };

        if previous.brand != current.brand {
            anyhow::bail!(
                "cannot compare scorecards for different brands: '{}' vs '{}'",
                previous.brand,
                current.brand
            );
        }

        let previous_topics: HashMap<&str, &Readings> = previous
            .topics
            .iter()
            .map(|t| (t.topic.as_str(), &t.metrics))
            .collect();
        let current_topics: HashMap<&str, &Readings> = current
            .topics
            .iter()
            .map(|t| (t.topic.as_str(), &t.metrics))
            .collect();

        // Union of (topic, metric) keys; BTreeSet gives topic then registry order
        let keys: BTreeSet<(&str, MetricId)> = previous_topics
            .iter()
            .chain(current_topics.iter())
            .flat_map(|(topic, readings)| readings.keys().map(move |id| (*topic, *id)))
            .collect();

        let deltas = keys
            .into_iter()
            .map(|(topic, metric)| {
                let before = previous_topics
                    .get(topic)
                    .and_then(|r| r.get(&metric))
                    .copied();
                let after = current_topics
                    .get(topic)
                    .and_then(|r| r.get(&metric))
                    .copied();
                compute_entry(topic, metric, before, after, neutral_band)
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            brand = %current.brand,
            period = %current.period,
            previous_period = %previous.period,
            entries = deltas.len(),
            "computed scorecard delta"
        );

        Ok(Delta {
            brand: current.brand.clone(),
            period: current.period.clone(),
            previous_period: Some(previous.period.clone()),
            baseline: false,
            deltas,
        })
    }
}

fn build_baseline_delta(current: &Scorecard) -> Delta {
    let mut deltas: Vec<MetricDeltaEntry> = current
        .topics
        .iter()
        .flat_map(|t| {
            t.metrics
                .iter()
                .map(move |(id, value)| compute_entry(&t.topic, *id, None, Some(*value), 0.0))
        })
        .collect();
    deltas.sort_by(|a, b| a.topic.cmp(&b.topic).then_with(|| a.metric.cmp(&b.metric)));

    Delta {
        brand: current.brand.clone(),
        period: current.period.clone(),
        previous_period: None,
        baseline: true,
        deltas,
    }
}

/// Classify one (topic, metric) pair
///
/// Only `changed` entries carry a delta; `new` and `removed` readings are
/// not treated as moves from or to zero.
fn compute_entry(
    topic: &str,
    metric: MetricId,
    before: Option<f64>,
    after: Option<f64>,
    neutral_band: f64,
) -> MetricDeltaEntry {
    let (status, delta) = match (before, after) {
        (Some(b), Some(a)) if a == b => (ReadingStatus::Unchanged, None),
        (Some(b), Some(a)) => (ReadingStatus::Changed, Some(a - b)),
        (Some(_), None) => (ReadingStatus::Removed, None),
        (None, _) => (ReadingStatus::New, None),
    };
    let eval = match delta {
        Some(d) => evaluate_with_band(d, get(metric).direction, neutral_band),
        None => crate::tone::ToneEvaluation::NEUTRAL,
    };

    MetricDeltaEntry {
        topic: topic.to_string(),
        metric,
        status,
        before,
        after,
        delta,
        tone: eval.tone,
        arrow: eval.arrow,
    }
}

/// Load the previous scorecard if a path is given
///
/// Returns None when no path is given (baseline case).
///
/// # Errors
///
/// Returns error if the file exists but cannot be read or parsed.
pub fn load_previous_scorecard(path: Option<&Path>) -> Result<Option<Scorecard>> {
    match path {
        Some(p) => load_scorecard(p)
            .with_context(|| format!("failed to load previous scorecard: {}", p.display()))
            .map(Some),
        None => Ok(None),
    }
}
