//! Risk scoring: policies, categories, and explanations
//!
//! Two independently valid policies are kept available and never blended:
//! probability-based scoring trusts the trained classifier, while heuristic
//! scoring derives a transparent, auditable score directly from risky
//! attributes. Category thresholding is monotonic in the score.

use crate::features::MeterRecord;
use crate::input::MeterInput;
use serde::{Deserialize, Serialize};

/// Two-level risk category derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    HighRisk,
    LowRisk,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::HighRisk => "high_risk",
            RiskCategory::LowRisk => "low_risk",
        }
    }
}

/// Three-tier inspection action derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionAction {
    Immediate,
    Monitor,
    None,
}

impl InspectionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionAction::Immediate => "immediate",
            InspectionAction::Monitor => "monitor",
            InspectionAction::None => "none",
        }
    }

    /// Recommendation text surfaced to analysts.
    pub fn recommendation(&self) -> &'static str {
        match self {
            InspectionAction::Immediate => "Immediate inspection recommended",
            InspectionAction::Monitor => "Monitor consumption closely",
            InspectionAction::None => "No action required",
        }
    }
}

/// Which scoring policy produced an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    Probability,
    Heuristic,
}

impl ScoringPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringPolicy::Probability => "probability",
            ScoringPolicy::Heuristic => "heuristic",
        }
    }
}

/// Score thresholds. Defaults are the canonical policy: high risk above 60,
/// immediate inspection at 70, monitoring at 40.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreThresholds {
    pub high_risk: f64,
    pub immediate: f64,
    pub monitor: f64,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        ScoreThresholds {
            high_risk: 60.0,
            immediate: 70.0,
            monitor: 40.0,
        }
    }
}

/// Weights of the heuristic formula.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicWeights {
    pub base: f64,
    pub spike: f64,
    pub history: f64,
    pub industrial: f64,
    pub delay_per_day: f64,
    pub delay_cap_days: f64,
    pub voltage_per_unit: f64,
    pub voltage_cap: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        HeuristicWeights {
            base: 10.0,
            spike: 25.0,
            history: 25.0,
            industrial: 15.0,
            delay_per_day: 0.4,
            delay_cap_days: 60.0,
            voltage_per_unit: 4.0,
            voltage_cap: 5.0,
        }
    }
}

/// Round to the two-decimal score precision.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Probability-based score: round(p * 100, 2).
pub fn probability_score(probability: f64) -> f64 {
    round2(probability * 100.0)
}

/// Heuristic score with default weights.
///
/// score = clamp(10 + 25*spike + 25*history + 15*industrial
///               + 0.4*min(delay, 60) + 4*min(voltage, 5), 0, 100)
pub fn heuristic_score(input: &MeterInput) -> f64 {
    heuristic_score_with_weights(input, &HeuristicWeights::default())
}

/// Heuristic score with custom weights.
pub fn heuristic_score_with_weights(input: &MeterInput, weights: &HeuristicWeights) -> f64 {
    let raw = weights.base
        + weights.spike * input.usage_spike.code()
        + weights.history * input.theft_history.code()
        + weights.industrial * input.industrial_area.code()
        + weights.delay_per_day * f64::from(input.payment_delay_days).min(weights.delay_cap_days)
        + weights.voltage_per_unit * input.voltage_fluctuation.min(weights.voltage_cap);
    round2(raw.clamp(0.0, 100.0))
}

/// Assign the risk category. Monotonic: a higher score never moves a meter
/// from high risk back to low risk.
pub fn categorize(score: f64, thresholds: &ScoreThresholds) -> RiskCategory {
    if score > thresholds.high_risk {
        RiskCategory::HighRisk
    } else {
        RiskCategory::LowRisk
    }
}

/// Assign the inspection action tier.
pub fn action_for(score: f64, thresholds: &ScoreThresholds) -> InspectionAction {
    if score >= thresholds.immediate {
        InspectionAction::Immediate
    } else if score >= thresholds.monitor {
        InspectionAction::Monitor
    } else {
        InspectionAction::None
    }
}

/// Ordered human-readable contributing factors, derived from raw attributes
/// only. Independent of which policy produced the numeric score; an empty
/// list means a normal consumption pattern.
pub fn risk_factors(input: &MeterInput) -> Vec<String> {
    let mut factors = Vec::new();
    if input.usage_spike.is_yes() {
        factors.push("Unusual usage spike detected".to_string());
    }
    if input.theft_history.is_yes() {
        factors.push("Previous theft history".to_string());
    }
    if input.payment_delay_days > 30 {
        factors.push("Long bill payment delay".to_string());
    }
    if input.industrial_area.is_yes() {
        factors.push("Industrial area nearby".to_string());
    }
    if input.voltage_fluctuation > 2.0 {
        factors.push("High voltage fluctuations".to_string());
    }
    factors
}

/// Complete assessment for one meter. Never mutated; recomputed from
/// scratch on every analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RiskAssessment {
    pub meter_id: String,
    pub area: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub probability: Option<f64>,
    pub score: f64,
    pub category: RiskCategory,
    pub action: InspectionAction,
    pub recommendation: String,
    pub policy: ScoringPolicy,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub factors: Vec<String>,
}

/// Assess one record from the classifier's probability.
pub fn assess_probability(
    record: &MeterRecord,
    probability: f64,
    thresholds: &ScoreThresholds,
) -> RiskAssessment {
    build_assessment(
        record,
        ScoringPolicy::Probability,
        Some(probability),
        probability_score(probability),
        thresholds,
    )
}

/// Assess one record with the heuristic formula; no model involved.
pub fn assess_heuristic(record: &MeterRecord, thresholds: &ScoreThresholds) -> RiskAssessment {
    build_assessment(
        record,
        ScoringPolicy::Heuristic,
        None,
        heuristic_score(&record.input),
        thresholds,
    )
}

fn build_assessment(
    record: &MeterRecord,
    policy: ScoringPolicy,
    probability: Option<f64>,
    score: f64,
    thresholds: &ScoreThresholds,
) -> RiskAssessment {
    let action = action_for(score, thresholds);
    RiskAssessment {
        meter_id: record.input.meter_id.clone(),
        area: record.location.area.clone(),
        probability,
        score,
        category: categorize(score, thresholds),
        action,
        recommendation: action.recommendation().to_string(),
        policy,
        factors: risk_factors(&record.input),
    }
}
