//! Integration tests for scorecard reports

use geoos_core::config::{self, GeoosConfig};
use geoos_core::delta::ReadingStatus;
use geoos_core::scorecard::load_scorecard;
use geoos_core::{render_json, render_text, report_from_files, MetricId, ResolvedConfig, Tone};
use std::fs;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join("scorecards")
        .join(name)
}

fn defaults() -> ResolvedConfig {
    ResolvedConfig::defaults().unwrap()
}

#[test]
fn test_load_fixture_scorecards() {
    let current = load_scorecard(&fixture_path("acme-2026-09.json")).unwrap();
    assert_eq!(current.brand, "Acme");
    assert_eq!(current.topics.len(), 3);

    let crm = current.topic("crm software").unwrap();
    assert_eq!(crm.metrics.get(&MetricId::AvgPosition), Some(&2.3));
    assert_eq!(crm.benchmark.as_ref().unwrap().name, "Globex");
}

#[test]
fn test_period_over_period_report() {
    let report = report_from_files(
        &fixture_path("acme-2026-09.json"),
        Some(&fixture_path("acme-2026-08.json")),
        &defaults(),
    )
    .unwrap();

    assert!(!report.baseline);
    assert_eq!(report.previous_period.as_deref(), Some("2026-08"));
    assert_eq!(report.deltas.len(), 14);

    let topics: Vec<&str> = report.deltas.iter().map(|e| e.topic.as_str()).collect();
    let mut sorted = topics.clone();
    sorted.sort();
    assert_eq!(topics, sorted, "deltas should be ordered by topic");

    let find = |topic: &str, metric: MetricId| {
        report
            .deltas
            .iter()
            .find(|e| e.topic == topic && e.metric == metric)
            .unwrap()
    };

    let reach = find("crm software", MetricId::Reach);
    assert_eq!(reach.status, ReadingStatus::Changed);
    assert_eq!(reach.delta, Some(-12.0));
    assert_eq!(reach.tone, Tone::Bad);

    let position = find("crm software", MetricId::AvgPosition);
    assert_eq!(position.tone, Tone::Good);

    let sentiment = find("crm software", MetricId::Sentiment);
    assert_eq!(sentiment.status, ReadingStatus::Unchanged);
    assert_eq!(sentiment.tone, Tone::Neutral);

    assert_eq!(
        find("analytics", MetricId::Reach).status,
        ReadingStatus::New
    );
    assert_eq!(
        find("help desk", MetricId::Sentiment).status,
        ReadingStatus::Removed
    );
    assert_eq!(
        find("project management", MetricId::Sentiment).tone,
        Tone::Bad
    );
}

#[test]
fn test_benchmark_gaps_from_current_period() {
    let report = report_from_files(&fixture_path("acme-2026-09.json"), None, &defaults()).unwrap();

    let gaps: Vec<(MetricId, Tone)> = report.gaps.iter().map(|g| (g.metric, g.tone)).collect();
    assert_eq!(
        gaps,
        vec![
            (MetricId::ReachGap, Tone::Bad),
            (MetricId::AvgPositionGap, Tone::Good),
            (MetricId::SentimentGap, Tone::Good),
            (MetricId::VisibilityGap, Tone::Bad),
            (MetricId::GeoScoreGap, Tone::Bad),
        ]
    );
    assert!(report.gaps.iter().all(|g| g.topic == "crm software"));
}

#[test]
fn test_baseline_report_marks_everything_new() {
    let report = report_from_files(&fixture_path("acme-2026-09.json"), None, &defaults()).unwrap();

    assert!(report.baseline);
    assert_eq!(report.deltas.len(), 12);
    assert!(report
        .deltas
        .iter()
        .all(|e| e.status == ReadingStatus::New && e.tone == Tone::Neutral));
}

#[test]
fn test_top_limits_changes_by_magnitude() {
    let config: GeoosConfig = serde_json::from_str(r#"{"top": 3}"#).unwrap();
    let report = report_from_files(
        &fixture_path("acme-2026-09.json"),
        Some(&fixture_path("acme-2026-08.json")),
        &config.resolve().unwrap(),
    )
    .unwrap();

    let rows: Vec<(&str, MetricId)> = report
        .deltas
        .iter()
        .map(|e| (e.topic.as_str(), e.metric))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("crm software", MetricId::Reach),
            ("project management", MetricId::Reach),
            ("project management", MetricId::Sentiment),
        ]
    );
    assert_eq!(report.gaps.len(), 3);
    assert_eq!(report.gaps[0].metric, MetricId::ReachGap);
}

#[test]
fn test_top_ties_keep_topic_then_registry_order() {
    // Four changes of magnitude 2 compete for the last two slots
    let config: GeoosConfig = serde_json::from_str(r#"{"top": 5}"#).unwrap();
    let report = report_from_files(
        &fixture_path("acme-2026-09.json"),
        Some(&fixture_path("acme-2026-08.json")),
        &config.resolve().unwrap(),
    )
    .unwrap();

    let rows: Vec<(&str, MetricId)> = report
        .deltas
        .iter()
        .map(|e| (e.topic.as_str(), e.metric))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("crm software", MetricId::Reach),
            ("project management", MetricId::Reach),
            ("project management", MetricId::Sentiment),
            ("crm software", MetricId::Visibility),
            ("crm software", MetricId::GeoScore),
        ]
    );
}

#[test]
fn test_different_brands_are_rejected() {
    let result = report_from_files(
        &fixture_path("acme-2026-09.json"),
        Some(&fixture_path("globex-2026-09.json")),
        &defaults(),
    );
    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("different brands"));
}

#[test]
fn test_config_file_drives_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".geoosrc.json"),
        r#"{"neutral_band": 2.0, "metrics": ["visibility"], "decimals": {"visibility": 1}}"#,
    )
    .unwrap();
    let resolved = config::load_and_resolve(dir.path(), None).unwrap();

    let report = report_from_files(
        &fixture_path("acme-2026-09.json"),
        Some(&fixture_path("acme-2026-08.json")),
        &resolved,
    )
    .unwrap();

    // Visibility moved +2 in both topics, which is inside the band
    let changed: Vec<_> = report
        .deltas
        .iter()
        .filter(|e| e.status == ReadingStatus::Changed)
        .collect();
    assert_eq!(changed.len(), 2);
    assert!(changed.iter().all(|e| e.metric == MetricId::Visibility));
    assert!(changed.iter().all(|e| e.tone == Tone::Neutral));
    assert_eq!(report.gaps.len(), 1);
    assert_eq!(report.gaps[0].metric, MetricId::VisibilityGap);

    let text = render_text(&report, &resolved.formatter);
    assert!(text.contains("31.0%"));
    assert!(text.contains("+2.0pp"));
}

#[test]
fn test_json_report_is_deterministic() {
    let build = || {
        report_from_files(
            &fixture_path("acme-2026-09.json"),
            Some(&fixture_path("acme-2026-08.json")),
            &defaults(),
        )
        .unwrap()
    };
    let a = render_json(&build()).unwrap();
    let b = render_json(&build()).unwrap();
    assert_eq!(a, b);

    let value: serde_json::Value = serde_json::from_str(&a).unwrap();
    assert_eq!(value["brand"], "Acme");
    assert_eq!(value["deltas"][0]["topic"], "analytics");
    assert_eq!(value["deltas"][0]["status"], "new");
}

#[test]
fn test_missing_scorecard_is_an_error() {
    let result = report_from_files(&fixture_path("missing.json"), None, &defaults());
    assert!(result.is_err());
}
