//! Fixture-driven batch assessment and artifact loading tests

use gridwatch_core::classifier::{Classifier, LinearModel};
use gridwatch_core::location::LocationResolver;
use gridwatch_core::scoring::{InspectionAction, RiskCategory, ScoreThresholds};
use gridwatch_core::store::AnalysisPolicy;
use gridwatch_core::{assess_csv, encode, AssessOptions, Error};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn no_options() -> AssessOptions {
    AssessOptions {
        min_score: None,
        top_n: None,
    }
}

#[test]
fn test_heuristic_batch_over_fixture_csv() {
    let resolver = LocationResolver::from_csv_path(&fixture_path("locations.csv")).unwrap();
    let report = assess_csv(
        &fixture_path("meters.csv"),
        &resolver,
        &AnalysisPolicy::Heuristic,
        &ScoreThresholds::default(),
        &no_options(),
    )
    .unwrap();

    // The malformed MTR-1004 row is skipped.
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.high_risk, 1);
    assert_eq!(report.summary.low_risk, 2);

    let top = &report.assessments[0];
    assert_eq!(top.meter_id, "MTR-1002");
    assert_eq!(top.score, 100.0);
    assert_eq!(top.category, RiskCategory::HighRisk);
    assert_eq!(top.action, InspectionAction::Immediate);
    assert_eq!(top.area, "Hadapsar");

    assert_eq!(report.assessments[1].meter_id, "MTR-1001");
    assert_eq!(report.assessments[1].score, 16.0);
    assert_eq!(report.assessments[2].meter_id, "MTR-1003");
    assert_eq!(report.assessments[2].score, 11.6);

    let mean = report.summary.mean_score.unwrap();
    assert!((mean - 127.6 / 3.0).abs() < 1e-9);

    assert_eq!(report.high_risk.len(), 1);
    assert_eq!(report.high_risk[0].meter_id, "MTR-1002");
}

#[test]
fn test_location_enrichment_uses_first_row_and_fallback() {
    let resolver = LocationResolver::from_csv_path(&fixture_path("locations.csv")).unwrap();
    let report = assess_csv(
        &fixture_path("meters.csv"),
        &resolver,
        &AnalysisPolicy::Heuristic,
        &ScoreThresholds::default(),
        &no_options(),
    )
    .unwrap();

    let area_of = |id: &str| {
        report
            .assessments
            .iter()
            .find(|a| a.meter_id == id)
            .map(|a| a.area.clone())
            .unwrap()
    };
    // MTR-1001 appears twice in the table; the first row wins.
    assert_eq!(area_of("MTR-1001"), "Shivajinagar");
    // MTR-1003 is absent from the table and falls back.
    assert_eq!(area_of("MTR-1003"), "Unknown");
}

#[test]
fn test_display_filters_trim_the_result_list() {
    let resolver = LocationResolver::empty();
    let report = assess_csv(
        &fixture_path("meters.csv"),
        &resolver,
        &AnalysisPolicy::Heuristic,
        &ScoreThresholds::default(),
        &AssessOptions {
            min_score: Some(15.0),
            top_n: Some(1),
        },
    )
    .unwrap();

    assert_eq!(report.assessments.len(), 1);
    assert_eq!(report.assessments[0].meter_id, "MTR-1002");
    // The summary still covers the whole assessed batch.
    assert_eq!(report.summary.total, 3);
}

#[test]
fn test_artifact_separates_quiet_and_risky_meters() {
    let model = LinearModel::from_path(&fixture_path("model.json")).unwrap();

    let quiet = encode(
        gridwatch_core::MeterInput {
            meter_id: "MTR-1001".to_string(),
            usage_kwh: 50.0,
            time_of_day: gridwatch_core::TimeOfDay::Morning,
            voltage_fluctuation: 1.0,
            residents: 3,
            appliances: 5,
            industrial_area: gridwatch_core::Flag::No,
            theft_history: gridwatch_core::Flag::No,
            avg_daily_usage: 45.0,
            payment_delay_days: 5,
            usage_spike: gridwatch_core::Flag::No,
        },
        gridwatch_core::LocationInfo::fallback(),
    )
    .unwrap();
    let risky = encode(
        gridwatch_core::MeterInput {
            meter_id: "MTR-1002".to_string(),
            usage_kwh: 310.5,
            time_of_day: gridwatch_core::TimeOfDay::Night,
            voltage_fluctuation: 3.2,
            residents: 2,
            appliances: 4,
            industrial_area: gridwatch_core::Flag::Yes,
            theft_history: gridwatch_core::Flag::Yes,
            avg_daily_usage: 120.0,
            payment_delay_days: 40,
            usage_spike: gridwatch_core::Flag::Yes,
        },
        gridwatch_core::LocationInfo::fallback(),
    )
    .unwrap();

    let p_quiet = model.predict_probability(&quiet.features).unwrap();
    let p_risky = model.predict_probability(&risky.features).unwrap();

    assert!(p_quiet > 0.0 && p_quiet < 0.5);
    assert!(p_risky > 0.5 && p_risky < 1.0);
    assert_eq!(model.predict(&quiet.features).unwrap(), 0);
    assert_eq!(model.predict(&risky.features).unwrap(), 1);
}

#[test]
fn test_probability_batch_over_fixture_csv() {
    let model = LinearModel::from_path(&fixture_path("model.json")).unwrap();
    let resolver = LocationResolver::empty();
    let report = assess_csv(
        &fixture_path("meters.csv"),
        &resolver,
        &AnalysisPolicy::Probability { classifier: &model },
        &ScoreThresholds::default(),
        &no_options(),
    )
    .unwrap();

    assert_eq!(report.summary.total, 3);
    for assessment in &report.assessments {
        let probability = assessment.probability.unwrap();
        assert!((0.0..=1.0).contains(&probability));
        assert!((0.0..=100.0).contains(&assessment.score));
    }
    // MTR-1002 carries every risky attribute and must lead the ranking.
    assert_eq!(report.assessments[0].meter_id, "MTR-1002");
    assert_eq!(report.assessments[0].category, RiskCategory::HighRisk);
}

#[test]
fn test_missing_batch_file_is_a_resource_error() {
    let resolver = LocationResolver::empty();
    let err = assess_csv(
        &fixture_path("does-not-exist.csv"),
        &resolver,
        &AnalysisPolicy::Heuristic,
        &ScoreThresholds::default(),
        &no_options(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ResourceLoad { .. }));
}
