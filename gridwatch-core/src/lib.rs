//! Gridwatch core library - electricity theft risk assessment
//!
//! Transforms raw meter attributes into a fixed-order feature vector,
//! scores theft risk through a trained classifier or a transparent
//! heuristic, enriches results with meter locations, and aggregates
//! prioritized inspection reports.

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Feature order is a fixed contract with the trained classifier
// - Scoring policies are explicit and never blended
// - Aggregates are derived from the store, never cached incrementally
// - No global mutable state; the session object is threaded explicitly
// - Identical input yields identical output

pub mod classifier;
pub mod config;
pub mod errors;
pub mod features;
pub mod input;
pub mod location;
pub mod report;
pub mod scoring;
pub mod store;

pub use classifier::{Classifier, LinearModel};
pub use config::ResolvedConfig;
pub use errors::{Error, Result};
pub use features::{encode, MeterRecord, FEATURE_COUNT, FEATURE_ORDER};
pub use input::{read_meters_csv, Flag, MeterBatch, MeterInput, TimeOfDay};
pub use location::{LocationInfo, LocationResolver};
pub use report::{aggregate, render_json, render_text, Report};
pub use scoring::{RiskAssessment, RiskCategory, ScoreThresholds, ScoringPolicy};
pub use store::{AnalysisPolicy, Session, SessionState};

use std::path::Path;

/// Display filters for an assessment run.
pub struct AssessOptions {
    pub min_score: Option<f64>,
    pub top_n: Option<usize>,
}

/// Read a meter batch from CSV, run one analysis pass, and return the
/// report. Rows that fail validation are skipped with a warning; the
/// summary covers the full assessed set while `min_score`/`top_n` only
/// trim the displayed assessment list.
pub fn assess_csv(
    path: &Path,
    resolver: &LocationResolver,
    policy: &AnalysisPolicy<'_>,
    thresholds: &ScoreThresholds,
    options: &AssessOptions,
) -> Result<Report> {
    let batch = input::read_meters_csv(path)?;
    let mut skipped = batch.skipped;

    let mut session = store::Session::new();
    for meter in batch.meters {
        if let Err(e) = session.add_meter(meter, resolver) {
            tracing::warn!(error = %e, "skipping meter");
            skipped += 1;
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "skipped meter row(s) in batch");
    }

    let report = session.run_analysis(policy, thresholds)?.clone();
    Ok(apply_options(report, options))
}

fn apply_options(mut report: Report, options: &AssessOptions) -> Report {
    if let Some(min) = options.min_score {
        report.assessments.retain(|a| a.score >= min);
    }
    if let Some(top) = options.top_n {
        report.assessments.truncate(top);
    }
    report
}
