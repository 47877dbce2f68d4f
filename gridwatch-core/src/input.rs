//! Raw meter input: categorical enumerations and CSV batch reading
//!
//! Categorical codes are fixed by the classifier's training data and must
//! never be reordered.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Reading window for the submitted consumption figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Numeric encoding: Morning 0, Afternoon 1, Evening 2, Night 3.
    pub fn code(&self) -> f64 {
        match self {
            TimeOfDay::Morning => 0.0,
            TimeOfDay::Afternoon => 1.0,
            TimeOfDay::Evening => 2.0,
            TimeOfDay::Night => 3.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }

    /// Parse a raw categorical value, naming `field` on failure.
    pub fn parse(raw: &str, field: &'static str) -> Result<Self> {
        match raw.trim() {
            "Morning" => Ok(TimeOfDay::Morning),
            "Afternoon" => Ok(TimeOfDay::Afternoon),
            "Evening" => Ok(TimeOfDay::Evening),
            "Night" => Ok(TimeOfDay::Night),
            other => Err(Error::Validation {
                field,
                reason: format!(
                    "`{}` is not one of Morning, Afternoon, Evening, Night",
                    other
                ),
            }),
        }
    }
}

/// Yes/No flag. No encodes to 0, Yes to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    No,
    Yes,
}

impl Flag {
    pub fn code(&self) -> f64 {
        match self {
            Flag::No => 0.0,
            Flag::Yes => 1.0,
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Flag::Yes)
    }

    /// Parse a raw categorical value, naming `field` on failure.
    pub fn parse(raw: &str, field: &'static str) -> Result<Self> {
        match raw.trim() {
            "No" => Ok(Flag::No),
            "Yes" => Ok(Flag::Yes),
            other => Err(Error::Validation {
                field,
                reason: format!("`{}` is not one of No, Yes", other),
            }),
        }
    }
}

/// Raw attributes for one meter, as collected. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeterInput {
    pub meter_id: String,
    pub usage_kwh: f64,
    pub time_of_day: TimeOfDay,
    pub voltage_fluctuation: f64,
    pub residents: u32,
    pub appliances: u32,
    pub industrial_area: Flag,
    pub theft_history: Flag,
    pub avg_daily_usage: f64,
    pub payment_delay_days: u32,
    pub usage_spike: Flag,
}

/// Columns a meter batch CSV must carry (matched by header name).
const METER_COLUMNS: [&str; 11] = [
    "meter_id",
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

/// A parsed meter batch plus the number of malformed rows skipped.
#[derive(Debug)]
pub struct MeterBatch {
    pub meters: Vec<MeterInput>,
    pub skipped: usize,
}

/// Read a batch of meter rows from a CSV file.
///
/// A missing file or column is a `ResourceLoad` error. A row whose values
/// fail to parse is skipped with a warning and counted in `skipped`.
pub fn read_meters_csv(path: &Path) -> Result<MeterBatch> {
    let resource_err = |reason: String| Error::ResourceLoad {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| resource_err(e.to_string()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let headers = rdr
        .headers()
        .map_err(|e| resource_err(format!("failed to read CSV headers: {}", e)))?
        .clone();

    for column in METER_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(resource_err(format!("missing column `{}`", column)));
        }
    }

    let mut meters = Vec::new();
    let mut skipped = 0usize;
    for (row, result) in rdr.records().enumerate() {
        let record =
            result.map_err(|e| resource_err(format!("failed to read CSV record: {}", e)))?;
        match record_to_input(&record, &headers) {
            Ok(input) => meters.push(input),
            Err(e) => {
                // Row 1 is the header line.
                tracing::warn!(row = row + 2, error = %e, "skipping malformed meter row");
                skipped += 1;
            }
        }
    }

    Ok(MeterBatch { meters, skipped })
}

fn record_to_input(record: &csv::StringRecord, headers: &csv::StringRecord) -> Result<MeterInput> {
    let get = |name: &'static str| -> Result<&str> {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| record.get(idx))
            .ok_or_else(|| Error::Validation {
                field: name,
                reason: "missing value".to_string(),
            })
    };

    let parse_f64 = |name: &'static str| -> Result<f64> {
        let raw = get(name)?;
        raw.trim().parse().map_err(|_| Error::Validation {
            field: name,
            reason: format!("`{}` is not a number", raw.trim()),
        })
    };

    let parse_u32 = |name: &'static str| -> Result<u32> {
        let raw = get(name)?;
        raw.trim().parse().map_err(|_| Error::Validation {
            field: name,
            reason: format!("`{}` is not a non-negative integer", raw.trim()),
        })
    };

    Ok(MeterInput {
        meter_id: get("meter_id")?.trim().to_string(),
        usage_kwh: parse_f64("usage_kwh")?,
        time_of_day: TimeOfDay::parse(get("time_of_day")?, "time_of_day")?,
        voltage_fluctuation: parse_f64("voltage_fluctuation")?,
        residents: parse_u32("residents")?,
        appliances: parse_u32("appliances")?,
        industrial_area: Flag::parse(get("industrial_area")?, "industrial_area")?,
        theft_history: Flag::parse(get("theft_history")?, "theft_history")?,
        avg_daily_usage: parse_f64("avg_daily_usage")?,
        payment_delay_days: parse_u32("payment_delay_days")?,
        usage_spike: Flag::parse(get("usage_spike")?, "usage_spike")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_time_of_day_codes_are_fixed() {
        assert_eq!(TimeOfDay::Morning.code(), 0.0);
        assert_eq!(TimeOfDay::Afternoon.code(), 1.0);
        assert_eq!(TimeOfDay::Evening.code(), 2.0);
        assert_eq!(TimeOfDay::Night.code(), 3.0);
    }

    #[test]
    fn test_flag_codes_are_fixed() {
        assert_eq!(Flag::No.code(), 0.0);
        assert_eq!(Flag::Yes.code(), 1.0);
    }

    #[test]
    fn test_parse_rejects_unknown_variant_naming_the_field() {
        let err = TimeOfDay::parse("Midnight", "time_of_day").unwrap_err();
        match err {
            Error::Validation { field, .. } => assert_eq!(field, "time_of_day"),
            other => panic!("expected Validation, got {:?}", other),
        }

        let err = Flag::parse("Maybe", "usage_spike").unwrap_err();
        match err {
            Error::Validation { field, .. } => assert_eq!(field, "usage_spike"),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(
            TimeOfDay::parse("  Evening ", "time_of_day").unwrap(),
            TimeOfDay::Evening
        );
        assert_eq!(Flag::parse(" Yes", "usage_spike").unwrap(), Flag::Yes);
    }

    #[test]
    fn test_read_meters_csv_skips_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meters.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            "meter_id,usage_kwh,time_of_day,voltage_fluctuation,residents,appliances,\
             industrial_area,theft_history,avg_daily_usage,payment_delay_days,usage_spike"
        )
        .unwrap();
        writeln!(file, "M1,50,Morning,1.0,3,5,No,No,45,5,No").unwrap();
        writeln!(file, "M2,abc,Morning,1.0,3,5,No,No,45,5,No").unwrap();
        writeln!(file, "M3,60,Midnight,1.0,3,5,No,No,45,5,No").unwrap();
        drop(file);

        let batch = read_meters_csv(&path).unwrap();
        assert_eq!(batch.meters.len(), 1);
        assert_eq!(batch.skipped, 2);
        assert_eq!(batch.meters[0].meter_id, "M1");
    }

    #[test]
    fn test_read_meters_csv_rejects_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meters.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "meter_id,usage_kwh").unwrap();
        writeln!(file, "M1,50").unwrap();
        drop(file);

        let err = read_meters_csv(&path).unwrap_err();
        assert!(matches!(err, Error::ResourceLoad { .. }));
    }
}
