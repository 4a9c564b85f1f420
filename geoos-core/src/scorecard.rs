//! Scorecard container and loading
//!
//! A scorecard holds one period's pre-computed metric readings for a brand,
//! grouped by topic, with an optional benchmark per topic.
//!
//! Global invariants enforced:
//! - Topic names are unique and non-empty within a scorecard
//! - Readings are finite and keyed by base metrics only (gaps are derived)
//! - Metric maps are ordered by registry order (BTreeMap over `MetricId`)

use crate::metrics::MetricId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Schema version for scorecards
pub const SCORECARD_SCHEMA_VERSION: u32 = 1;

/// Metric readings keyed by metric id
pub type Readings = BTreeMap<MetricId, f64>;

/// Benchmark (competitor or category average) readings for a topic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Benchmark {
    pub name: String,
    pub metrics: Readings,
}

/// Readings for one topic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct TopicScores {
    pub topic: String,
    pub metrics: Readings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<Benchmark>,
}

/// Complete scorecard for one brand and period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Scorecard {
    pub schema_version: u32,
    pub brand: String,
    pub period: String,
    pub topics: Vec<TopicScores>,
}

impl Scorecard {
    pub fn new(brand: impl Into<String>, period: impl Into<String>, topics: Vec<TopicScores>) -> Self {
        Scorecard {
            schema_version: SCORECARD_SCHEMA_VERSION,
            brand: brand.into(),
            period: period.into(),
            topics,
        }
    }

    /// Find a topic by name
    pub fn topic(&self, name: &str) -> Option<&TopicScores> {
        self.topics.iter().find(|t| t.topic == name)
    }

    /// Check schema version, topic uniqueness and reading validity
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SCORECARD_SCHEMA_VERSION {
            anyhow::bail!(
                "scorecard schema version mismatch: expected {}, got {}",
                SCORECARD_SCHEMA_VERSION,
                self.schema_version
            );
        }

        let mut seen = HashSet::new();
        for topic in &self.topics {
            if topic.topic.trim().is_empty() {
                anyhow::bail!("topic name must not be empty");
            }
            if !seen.insert(topic.topic.as_str()) {
                anyhow::bail!("duplicate topic: {}", topic.topic);
            }
            validate_readings(&topic.metrics)
                .with_context(|| format!("invalid readings for topic '{}'", topic.topic))?;
            if let Some(ref benchmark) = topic.benchmark {
                validate_readings(&benchmark.metrics).with_context(|| {
                    format!(
                        "invalid benchmark '{}' for topic '{}'",
                        benchmark.name, topic.topic
                    )
                })?;
            }
        }

        Ok(())
    }

    /// Serialize scorecard to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize scorecard to JSON")
    }

    /// Deserialize and validate a scorecard from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let scorecard: Scorecard =
            serde_json::from_str(json).context("failed to deserialize scorecard from JSON")?;
        scorecard.validate()?;
        Ok(scorecard)
    }
}

fn validate_readings(readings: &Readings) -> Result<()> {
    for (id, value) in readings {
        if id.is_gap() {
            anyhow::bail!(
                "{} is a gap metric; gaps are derived from benchmark readings",
                id
            );
        }
        if !value.is_finite() {
            anyhow::bail!("{} must be finite (got {})", id, value);
        }
    }
    Ok(())
}

/// Load a scorecard from a JSON file
pub fn load_scorecard(path: &Path) -> Result<Scorecard> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scorecard: {}", path.display()))?;
    let scorecard = Scorecard::from_json(&json)
        .with_context(|| format!("failed to parse scorecard: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        brand = %scorecard.brand,
        period = %scorecard.period,
        topics = scorecard.topics.len(),
        "loaded scorecard"
    );
    Ok(scorecard)
}
