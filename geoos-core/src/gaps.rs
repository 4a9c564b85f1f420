//! Benchmark gap calculation
//!
//! A gap is the brand's reading minus the benchmark's reading for the same
//! topic and base metric. It is classified with the gap metric's direction,
//! which always matches the base metric's direction.

use crate::metrics::{get, MetricId};
use crate::scorecard::{Scorecard, TopicScores};
use crate::tone::{evaluate_with_band, Arrow, Tone};
use serde::{Deserialize, Serialize};

/// Gap between brand and benchmark for one topic and metric
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct GapEntry {
    pub topic: String,
    pub benchmark: String,
    /// Gap metric id (e.g. `reachGap`)
    pub metric: MetricId,
    pub brand_value: f64,
    pub benchmark_value: f64,
    pub gap: f64,
    pub tone: Tone,
    pub arrow: Arrow,
}

/// Brand value minus benchmark value
pub fn compute_gap(brand: f64, benchmark: f64) -> f64 {
    brand - benchmark
}

/// Gaps for one topic, in registry order
///
/// Only base metrics present in both the brand readings and the benchmark
/// produce an entry. A topic without a benchmark yields nothing.
pub fn topic_gaps(topic: &TopicScores, neutral_band: f64) -> Vec<GapEntry> {
    let benchmark = match &topic.benchmark {
        Some(b) => b,
        None => return Vec::new(),
    };

    MetricId::BASE
        .iter()
        .filter_map(|base| {
            let brand_value = *topic.metrics.get(base)?;
            let benchmark_value = *benchmark.metrics.get(base)?;
            let gap_id = base.gap()?;
            let gap = compute_gap(brand_value, benchmark_value);
            let eval = evaluate_with_band(gap, get(gap_id).direction, neutral_band);
            Some(GapEntry {
                topic: topic.topic.clone(),
                benchmark: benchmark.name.clone(),
                metric: gap_id,
                brand_value,
                benchmark_value,
                gap,
                tone: eval.tone,
                arrow: eval.arrow,
            })
        })
        .collect()
}

/// Gaps for every topic of a scorecard, sorted by topic then registry order
pub fn scorecard_gaps(scorecard: &Scorecard, neutral_band: f64) -> Vec<GapEntry> {
    let mut gaps: Vec<GapEntry> = scorecard
        .topics
        .iter()
        .flat_map(|t| topic_gaps(t, neutral_band))
        .collect();
    gaps.sort_by(|a, b| a.topic.cmp(&b.topic).then_with(|| a.metric.cmp(&b.metric)));
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorecard::Benchmark;

    fn topic(name: &str, brand: &[(MetricId, f64)], bench: Option<&[(MetricId, f64)]>) -> TopicScores {
        TopicScores {
            topic: name.to_string(),
            metrics: brand.iter().copied().collect(),
            benchmark: bench.map(|b| Benchmark {
                name: "Globex".to_string(),
                metrics: b.iter().copied().collect(),
            }),
        }
    }

    #[test]
    fn test_compute_gap() {
        assert_eq!(compute_gap(58.0, 70.0), -12.0);
        assert_eq!(compute_gap(2.3, 2.3), 0.0);
    }

    #[test]
    fn test_reach_gap_behind_is_bad() {
        let t = topic(
            "crm",
            &[(MetricId::Reach, 58.0)],
            Some(&[(MetricId::Reach, 70.0)]),
        );
        let gaps = topic_gaps(&t, 0.0);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].metric, MetricId::ReachGap);
        assert_eq!(gaps[0].gap, -12.0);
        assert_eq!(gaps[0].tone, Tone::Bad);
        assert_eq!(gaps[0].arrow, Arrow::Down);
        assert_eq!(gaps[0].benchmark, "Globex");
    }

    #[test]
    fn test_position_gap_ahead_is_good() {
        let t = topic(
            "crm",
            &[(MetricId::AvgPosition, 2.0)],
            Some(&[(MetricId::AvgPosition, 3.5)]),
        );
        let gaps = topic_gaps(&t, 0.0);
        assert_eq!(gaps[0].metric, MetricId::AvgPositionGap);
        assert_eq!(gaps[0].tone, Tone::Good);
        assert_eq!(gaps[0].arrow, Arrow::Down);
    }

    #[test]
    fn test_equal_values_are_neutral() {
        let t = topic(
            "crm",
            &[(MetricId::Sentiment, 70.0)],
            Some(&[(MetricId::Sentiment, 70.0)]),
        );
        let gaps = topic_gaps(&t, 0.0);
        assert_eq!(gaps[0].tone, Tone::Neutral);
        assert_eq!(gaps[0].arrow, Arrow::None);
    }

    #[test]
    fn test_only_shared_metrics_produce_gaps() {
        let t = topic(
            "crm",
            &[(MetricId::Reach, 50.0), (MetricId::Sentiment, 60.0)],
            Some(&[(MetricId::Reach, 40.0), (MetricId::Visibility, 30.0)]),
        );
        let gaps = topic_gaps(&t, 0.0);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].metric, MetricId::ReachGap);
    }

    #[test]
    fn test_no_benchmark_no_gaps() {
        let t = topic("crm", &[(MetricId::Reach, 50.0)], None);
        assert!(topic_gaps(&t, 0.0).is_empty());
    }

    #[test]
    fn test_neutral_band_applies_to_gaps() {
        let t = topic(
            "crm",
            &[(MetricId::Reach, 50.5)],
            Some(&[(MetricId::Reach, 50.0)]),
        );
        assert_eq!(topic_gaps(&t, 1.0)[0].tone, Tone::Neutral);
        assert_eq!(topic_gaps(&t, 0.0)[0].tone, Tone::Good);
    }

    #[test]
    fn test_scorecard_gaps_sorted_by_topic() {
        let scorecard = Scorecard::new(
            "Acme",
            "2026-09",
            vec![
                topic(
                    "zeta",
                    &[(MetricId::Reach, 1.0)],
                    Some(&[(MetricId::Reach, 2.0)]),
                ),
                topic(
                    "alpha",
                    &[(MetricId::GeoScore, 1.0), (MetricId::Reach, 1.0)],
                    Some(&[(MetricId::GeoScore, 2.0), (MetricId::Reach, 2.0)]),
                ),
            ],
        );
        let gaps = scorecard_gaps(&scorecard, 0.0);
        let keys: Vec<(&str, MetricId)> = gaps.iter().map(|g| (g.topic.as_str(), g.metric)).collect();
        assert_eq!(
            keys,
            vec![
                ("alpha", MetricId::ReachGap),
                ("alpha", MetricId::GeoScoreGap),
                ("zeta", MetricId::ReachGap),
            ]
        );
    }
}
