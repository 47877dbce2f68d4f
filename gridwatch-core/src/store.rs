//! Session state: the meter store and its explicit state machine
//!
//! Global invariants enforced:
//! - Insertion order preserved; the store is append-only
//! - A failed add never partially applies
//! - Assessments are recomputed from scratch on every analysis pass
//! - Recomputation happens on an explicit transition, never as a side effect
//!
//! The session is single-threaded and synchronous: each transition runs to
//! completion before the next is accepted. A host introducing concurrent
//! callers must add its own mutual exclusion around the session.

use crate::classifier::Classifier;
use crate::errors::{Error, Result};
use crate::features::{encode, MeterRecord};
use crate::input::MeterInput;
use crate::location::LocationResolver;
use crate::report::{aggregate, Report};
use crate::scoring::{assess_heuristic, assess_probability, ScoreThresholds};

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Populated,
    Analyzed,
}

/// Ordered, append-only collection of meter records. Duplicate identifiers
/// are permitted and appended as separate records.
#[derive(Debug, Default)]
pub struct MeterStore {
    records: Vec<MeterRecord>,
}

impl MeterStore {
    pub fn records(&self) -> &[MeterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Receipt for a successful add, carrying the resolved area name.
#[derive(Debug, Clone)]
pub struct AddReceipt {
    pub meter_id: String,
    pub area: String,
}

/// Scoring strategy for one analysis pass. The two policies are never
/// blended: a pass is scored either by the classifier's probability or by
/// the transparent heuristic formula.
pub enum AnalysisPolicy<'a> {
    /// Trust the trained classifier's probability.
    Probability { classifier: &'a dyn Classifier },
    /// Attribute-based formula, auditable without the model.
    Heuristic,
}

/// One working session: the store plus the last report, threaded explicitly
/// through every operation. The hosting caller owns its lifecycle; session
/// state lives exactly as long as the process.
#[derive(Debug, Default)]
pub struct Session {
    store: MeterStore,
    last_report: Option<Report>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        if self.store.is_empty() {
            SessionState::Empty
        } else if self.last_report.is_some() {
            SessionState::Analyzed
        } else {
            SessionState::Populated
        }
    }

    pub fn store(&self) -> &MeterStore {
        &self.store
    }

    pub fn last_report(&self) -> Option<&Report> {
        self.last_report.as_ref()
    }

    /// AddMeter transition. Rejects blank identifiers and invalid
    /// attributes without touching the store; adding after an analysis
    /// invalidates the previous report.
    pub fn add_meter(
        &mut self,
        input: MeterInput,
        resolver: &LocationResolver,
    ) -> Result<AddReceipt> {
        let location = resolver.resolve(&input.meter_id);
        let record = encode(input, location)?;
        let receipt = AddReceipt {
            meter_id: record.input.meter_id.clone(),
            area: record.location.area.clone(),
        };
        tracing::debug!(meter_id = %receipt.meter_id, area = %receipt.area, "meter added");
        self.store.records.push(record);
        self.last_report = None;
        Ok(receipt)
    }

    /// RunAnalysis transition: recompute every assessment and aggregate.
    /// The classifier is invoked once, batched across the whole store.
    /// An empty store yields `Error::EmptyStore` and no computation.
    pub fn run_analysis(
        &mut self,
        policy: &AnalysisPolicy<'_>,
        thresholds: &ScoreThresholds,
    ) -> Result<&Report> {
        if self.store.is_empty() {
            return Err(Error::EmptyStore);
        }

        let assessments = match policy {
            AnalysisPolicy::Probability { classifier } => {
                let vectors: Vec<Vec<f64>> = self
                    .store
                    .records
                    .iter()
                    .map(|record| record.features.clone())
                    .collect();
                let probabilities = classifier.predict_probability_batch(&vectors)?;
                self.store
                    .records
                    .iter()
                    .zip(probabilities)
                    .map(|(record, probability)| {
                        assess_probability(record, probability, thresholds)
                    })
                    .collect()
            }
            AnalysisPolicy::Heuristic => self
                .store
                .records
                .iter()
                .map(|record| assess_heuristic(record, thresholds))
                .collect(),
        };

        let report = aggregate(assessments);
        tracing::info!(
            total = report.summary.total,
            high_risk = report.summary.high_risk,
            "analysis pass complete"
        );
        Ok(self.last_report.insert(report))
    }

    /// Reset transition: clear-and-reinitialize. Idempotent.
    pub fn reset(&mut self) {
        self.store.records.clear();
        self.last_report = None;
        tracing::debug!("session reset");
    }
}
