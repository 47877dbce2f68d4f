//! Report aggregation and rendering
//!
//! Global invariants enforced:
//! - Aggregates are strictly derived (never cached, always recomputed)
//! - Sorting is stable: equal scores keep insertion order
//! - Deterministic output ordering

use crate::scoring::{RiskAssessment, RiskCategory};
use serde::{Deserialize, Serialize};

/// Summary statistics across one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportSummary {
    pub total: usize,
    pub high_risk: usize,
    pub low_risk: usize,
    /// Omitted when the assessment set is empty.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mean_score: Option<f64>,
}

/// Identifier and score pair for the high-risk detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HighRiskEntry {
    pub meter_id: String,
    pub score: f64,
}

/// Aggregated result of one analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Report {
    pub summary: ReportSummary,
    /// Full result set, sorted by descending score.
    pub assessments: Vec<RiskAssessment>,
    /// High-risk subset of `assessments`, same order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub high_risk: Vec<HighRiskEntry>,
}

/// Sort assessments by descending score. `sort_by` is stable, so equal
/// scores keep their original insertion order.
pub fn sort_assessments(mut assessments: Vec<RiskAssessment>) -> Vec<RiskAssessment> {
    assessments.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    assessments
}

/// Aggregate one pass worth of assessments into a report.
pub fn aggregate(assessments: Vec<RiskAssessment>) -> Report {
    let total = assessments.len();
    let high_risk_count = assessments
        .iter()
        .filter(|a| a.category == RiskCategory::HighRisk)
        .count();
    let mean_score = if total == 0 {
        None
    } else {
        Some(assessments.iter().map(|a| a.score).sum::<f64>() / total as f64)
    };

    let sorted = sort_assessments(assessments);
    let high_risk = sorted
        .iter()
        .filter(|a| a.category == RiskCategory::HighRisk)
        .map(|a| HighRiskEntry {
            meter_id: a.meter_id.clone(),
            score: a.score,
        })
        .collect();

    Report {
        summary: ReportSummary {
            total,
            high_risk: high_risk_count,
            low_risk: total - high_risk_count,
            mean_score,
        },
        assessments: sorted,
        high_risk,
    }
}

/// Render a report as aligned text output.
pub fn render_text(report: &Report, explain: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<8} {:<10} {:<10} {:<20} {}\n",
        "SCORE", "CATEGORY", "ACTION", "METER", "AREA"
    ));
    for assessment in &report.assessments {
        output.push_str(&format!(
            "{:<8} {:<10} {:<10} {:<20} {}\n",
            format!("{:.2}", assessment.score),
            assessment.category.as_str(),
            assessment.action.as_str(),
            truncate_or_pad(&assessment.meter_id, 20),
            assessment.area,
        ));
        if explain {
            if assessment.factors.is_empty() {
                output.push_str("         Normal electricity consumption pattern\n");
            }
            for factor in &assessment.factors {
                output.push_str(&format!("         - {}\n", factor));
            }
            output.push_str(&format!("         => {}\n", assessment.recommendation));
        }
    }

    output.push_str(&format!(
        "\n{} meter(s): {} high risk, {} low risk",
        report.summary.total, report.summary.high_risk, report.summary.low_risk
    ));
    if let Some(mean) = report.summary.mean_score {
        output.push_str(&format!(", mean score {:.2}", mean));
    }
    output.push('\n');

    output
}

/// Render a report as JSON output.
pub fn render_json(report: &Report) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Truncate or pad to a fixed width. Meter identifiers are free text, so
/// truncation counts chars rather than slicing bytes.
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
