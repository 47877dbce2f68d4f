//! Feature vector encoding
//!
//! Global invariants enforced:
//! - Feature order is fixed and identical to the classifier's training order
//! - Encoding is pure and deterministic
//! - A failed validation produces no record

use crate::errors::{Error, Result};
use crate::input::MeterInput;
use crate::location::LocationInfo;
use serde::{Deserialize, Serialize};

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 10;

/// Canonical feature order. This is a hard contract with the trained
/// classifier and must never be permuted.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "usage_kwh",
    "time_of_day",
    "voltage_fluctuation",
    "residents",
    "appliances",
    "industrial_area",
    "theft_history",
    "avg_daily_usage",
    "payment_delay_days",
    "usage_spike",
];

/// A meter input encoded for classification, with its resolved location.
/// Owned by the store once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeterRecord {
    pub input: MeterInput,
    pub location: LocationInfo,
    pub features: Vec<f64>,
}

fn validate(input: &MeterInput) -> Result<()> {
    let non_negative = |field: &'static str, value: f64| -> Result<()> {
        if value < 0.0 {
            return Err(Error::Validation {
                field,
                reason: format!("must be non-negative (got {})", value),
            });
        }
        Ok(())
    };

    if input.meter_id.trim().is_empty() {
        return Err(Error::Validation {
            field: "meter_id",
            reason: "identifier must not be blank".to_string(),
        });
    }
    non_negative("usage_kwh", input.usage_kwh)?;
    non_negative("voltage_fluctuation", input.voltage_fluctuation)?;
    non_negative("avg_daily_usage", input.avg_daily_usage)?;
    if input.residents < 1 {
        return Err(Error::Validation {
            field: "residents",
            reason: "must be at least 1".to_string(),
        });
    }
    if input.appliances < 1 {
        return Err(Error::Validation {
            field: "appliances",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Encode a validated input into the fixed-order feature vector.
///
/// Order: [usage, time-of-day code, voltage, residents, appliances,
/// industrial code, history code, avg usage, payment delay, spike code].
pub fn encode(input: MeterInput, location: LocationInfo) -> Result<MeterRecord> {
    validate(&input)?;
    let features = vec![
        input.usage_kwh,
        input.time_of_day.code(),
        input.voltage_fluctuation,
        f64::from(input.residents),
        f64::from(input.appliances),
        input.industrial_area.code(),
        input.theft_history.code(),
        input.avg_daily_usage,
        f64::from(input.payment_delay_days),
        input.usage_spike.code(),
    ];
    Ok(MeterRecord {
        input,
        location,
        features,
    })
}
