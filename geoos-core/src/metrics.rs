//! Metric registry
//!
//! Global invariants enforced:
//! - The registry is a static table, defined once and never mutated
//! - `REGISTRY[id as usize].id == id` for every metric id
//! - A gap metric shares the direction of its base metric
//! - Calculation metadata is descriptive only; nothing here computes raw values

use crate::tone::{evaluate, Direction, ToneEvaluation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of metric identifiers
///
/// Declaration order is registry order, which is also the order used when
/// sorting report rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricId {
    Reach = 0,
    AvgPosition = 1,
    Sentiment = 2,
    Visibility = 3,
    GeoScore = 4,
    ReachGap = 5,
    AvgPositionGap = 6,
    SentimentGap = 7,
    VisibilityGap = 8,
    GeoScoreGap = 9,
}

impl MetricId {
    /// Every metric id, in registry order
    pub const ALL: [MetricId; 10] = [
        MetricId::Reach,
        MetricId::AvgPosition,
        MetricId::Sentiment,
        MetricId::Visibility,
        MetricId::GeoScore,
        MetricId::ReachGap,
        MetricId::AvgPositionGap,
        MetricId::SentimentGap,
        MetricId::VisibilityGap,
        MetricId::GeoScoreGap,
    ];

    /// Base (non-gap) metrics, in registry order
    pub const BASE: [MetricId; 5] = [
        MetricId::Reach,
        MetricId::AvgPosition,
        MetricId::Sentiment,
        MetricId::Visibility,
        MetricId::GeoScore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricId::Reach => "reach",
            MetricId::AvgPosition => "avgPosition",
            MetricId::Sentiment => "sentiment",
            MetricId::Visibility => "visibility",
            MetricId::GeoScore => "geoScore",
            MetricId::ReachGap => "reachGap",
            MetricId::AvgPositionGap => "avgPositionGap",
            MetricId::SentimentGap => "sentimentGap",
            MetricId::VisibilityGap => "visibilityGap",
            MetricId::GeoScoreGap => "geoScoreGap",
        }
    }

    pub fn is_gap(&self) -> bool {
        self.base().is_some()
    }

    /// Gap variant of a base metric (None for gap metrics)
    pub fn gap(&self) -> Option<MetricId> {
        match self {
            MetricId::Reach => Some(MetricId::ReachGap),
            MetricId::AvgPosition => Some(MetricId::AvgPositionGap),
            MetricId::Sentiment => Some(MetricId::SentimentGap),
            MetricId::Visibility => Some(MetricId::VisibilityGap),
            MetricId::GeoScore => Some(MetricId::GeoScoreGap),
            _ => None,
        }
    }

    /// Base metric of a gap metric (None for base metrics)
    pub fn base(&self) -> Option<MetricId> {
        get(*self).calc.base
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = MetricId::ALL.iter().map(|id| id.as_str()).collect();
                anyhow::anyhow!("unknown metric id '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Display unit of a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Unit {
    /// Share of a whole, 0-100
    Percent,
    /// Difference between two percentages
    PercentagePoints,
    /// Ordinal position, 1 is best
    Rank,
    /// Unitless 0-100 score
    Score,
    /// Difference between two scores
    Points,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Percent => "percent",
            Unit::PercentagePoints => "percentagePoints",
            Unit::Rank => "rank",
            Unit::Score => "score",
            Unit::Points => "points",
        }
    }

    /// Suffix appended to a formatted value
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::PercentagePoints => "pp",
            Unit::Rank | Unit::Score => "",
            Unit::Points => "pts",
        }
    }

    /// Suffix appended to a formatted change in this unit
    ///
    /// A change in a percentage is measured in percentage points.
    pub fn delta_suffix(&self) -> &'static str {
        match self {
            Unit::Percent => "pp",
            other => other.suffix(),
        }
    }
}

/// How a metric is aggregated from raw answer data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Ratio,
    Mean,
    Composite,
    Difference,
}

/// Descriptive calculation metadata, shown in tooltips and `geoos metrics`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalcSpec {
    pub formula: &'static str,
    pub aggregation: Aggregation,
    pub inputs: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<MetricId>,
}

/// Immutable definition of one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDefinition {
    pub id: MetricId,
    pub title: &'static str,
    pub unit: Unit,
    pub direction: Direction,
    pub decimals: u8,
    pub tooltip: &'static str,
    pub calc: CalcSpec,
}

impl MetricDefinition {
    /// Classify a delta or gap of this metric using its own direction
    pub fn evaluate(&self, value: f64) -> ToneEvaluation {
        evaluate(value, self.direction)
    }
}

static REGISTRY: [MetricDefinition; 10] = [
    MetricDefinition {
        id: MetricId::Reach,
        title: "Reach",
        unit: Unit::Percent,
        direction: Direction::HigherBetter,
        decimals: 0,
        tooltip: "Share of evaluated AI answers that mention the brand.",
        calc: CalcSpec {
            formula: "answers mentioning brand / evaluated answers * 100",
            aggregation: Aggregation::Ratio,
            inputs: &["answers mentioning brand", "evaluated answers"],
            base: None,
        },
    },
    MetricDefinition {
        id: MetricId::AvgPosition,
        title: "Avg Position",
        unit: Unit::Rank,
        direction: Direction::LowerBetter,
        decimals: 1,
        tooltip: "Mean rank of the brand within answers where it is mentioned. Lower is better.",
        calc: CalcSpec {
            formula: "sum(brand rank) / answers mentioning brand",
            aggregation: Aggregation::Mean,
            inputs: &["brand rank per answer", "answers mentioning brand"],
            base: None,
        },
    },
    MetricDefinition {
        id: MetricId::Sentiment,
        title: "Sentiment",
        unit: Unit::Score,
        direction: Direction::HigherBetter,
        decimals: 0,
        tooltip: "Average tone of brand mentions on a 0-100 scale.",
        calc: CalcSpec {
            formula: "mean(mention sentiment) scaled to 0-100",
            aggregation: Aggregation::Mean,
            inputs: &["sentiment per brand mention"],
            base: None,
        },
    },
    MetricDefinition {
        id: MetricId::Visibility,
        title: "Visibility",
        unit: Unit::Percent,
        direction: Direction::HigherBetter,
        decimals: 0,
        tooltip: "Brand share of all tracked-brand mentions across evaluated answers.",
        calc: CalcSpec {
            formula: "brand mentions / all tracked-brand mentions * 100",
            aggregation: Aggregation::Ratio,
            inputs: &["brand mentions", "all tracked-brand mentions"],
            base: None,
        },
    },
    MetricDefinition {
        id: MetricId::GeoScore,
        title: "GEO Score",
        unit: Unit::Score,
        direction: Direction::HigherBetter,
        decimals: 0,
        tooltip: "Composite 0-100 score blending reach, position, sentiment and visibility.",
        calc: CalcSpec {
            formula: "weighted blend of reach, inverted position, sentiment and visibility",
            aggregation: Aggregation::Composite,
            inputs: &["reach", "avgPosition", "sentiment", "visibility"],
            base: None,
        },
    },
    MetricDefinition {
        id: MetricId::ReachGap,
        title: "Reach Gap",
        unit: Unit::PercentagePoints,
        direction: Direction::HigherBetter,
        decimals: 0,
        tooltip: "Brand reach minus benchmark reach for the same topic.",
        calc: CalcSpec {
            formula: "brand reach - benchmark reach",
            aggregation: Aggregation::Difference,
            inputs: &["brand reach", "benchmark reach"],
            base: Some(MetricId::Reach),
        },
    },
    MetricDefinition {
        id: MetricId::AvgPositionGap,
        title: "Avg Position Gap",
        unit: Unit::Rank,
        direction: Direction::LowerBetter,
        decimals: 1,
        tooltip: "Brand average position minus benchmark average position. Negative means the brand ranks ahead.",
        calc: CalcSpec {
            formula: "brand avg position - benchmark avg position",
            aggregation: Aggregation::Difference,
            inputs: &["brand avg position", "benchmark avg position"],
            base: Some(MetricId::AvgPosition),
        },
    },
    MetricDefinition {
        id: MetricId::SentimentGap,
        title: "Sentiment Gap",
        unit: Unit::Points,
        direction: Direction::HigherBetter,
        decimals: 0,
        tooltip: "Brand sentiment minus benchmark sentiment for the same topic.",
        calc: CalcSpec {
            formula: "brand sentiment - benchmark sentiment",
            aggregation: Aggregation::Difference,
            inputs: &["brand sentiment", "benchmark sentiment"],
            base: Some(MetricId::Sentiment),
        },
    },
    MetricDefinition {
        id: MetricId::VisibilityGap,
        title: "Visibility Gap",
        unit: Unit::PercentagePoints,
        direction: Direction::HigherBetter,
        decimals: 0,
        tooltip: "Brand visibility minus benchmark visibility for the same topic.",
        calc: CalcSpec {
            formula: "brand visibility - benchmark visibility",
            aggregation: Aggregation::Difference,
            inputs: &["brand visibility", "benchmark visibility"],
            base: Some(MetricId::Visibility),
        },
    },
    MetricDefinition {
        id: MetricId::GeoScoreGap,
        title: "GEO Score Gap",
        unit: Unit::Points,
        direction: Direction::HigherBetter,
        decimals: 0,
        tooltip: "Brand GEO score minus benchmark GEO score for the same topic.",
        calc: CalcSpec {
            formula: "brand geo score - benchmark geo score",
            aggregation: Aggregation::Difference,
            inputs: &["brand geo score", "benchmark geo score"],
            base: Some(MetricId::GeoScore),
        },
    },
];

/// Look up the definition of a metric
pub fn get(id: MetricId) -> &'static MetricDefinition {
    &REGISTRY[id as usize]
}

/// All metric definitions, in registry order
pub fn all() -> &'static [MetricDefinition] {
    &REGISTRY
}
