//! Meter location lookup
//!
//! A static table loaded once at startup, queried by exact identifier
//! match. Absence from the table is not an error: unknown meters resolve
//! to the documented fallback. The table exposes no mutation.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Area name and coordinates for a meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub area: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationInfo {
    /// Fallback for identifiers absent from the table.
    pub fn fallback() -> Self {
        LocationInfo {
            area: "Unknown".to_string(),
            latitude: 18.5204,
            longitude: 73.8567,
        }
    }
}

/// Read-only meter to location table.
#[derive(Debug, Default)]
pub struct LocationResolver {
    table: HashMap<String, LocationInfo>,
}

impl LocationResolver {
    /// Empty table: every meter resolves to the fallback.
    pub fn empty() -> Self {
        LocationResolver::default()
    }

    /// Load the table from a CSV file with columns meter_id, area,
    /// latitude, longitude. Duplicate identifiers keep the first row.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
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

        let column = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| resource_err(format!("missing column `{}`", name)))
        };
        let id_idx = column("meter_id")?;
        let area_idx = column("area")?;
        let lat_idx = column("latitude")?;
        let lon_idx = column("longitude")?;

        let mut table = HashMap::new();
        for result in rdr.records() {
            let record =
                result.map_err(|e| resource_err(format!("failed to read CSV record: {}", e)))?;
            let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

            let parse_coord = |idx: usize, name: &str| -> Result<f64> {
                cell(idx)
                    .parse()
                    .map_err(|_| resource_err(format!("invalid {}: `{}`", name, cell(idx))))
            };

            let info = LocationInfo {
                area: cell(area_idx).to_string(),
                latitude: parse_coord(lat_idx, "latitude")?,
                longitude: parse_coord(lon_idx, "longitude")?,
            };
            table.entry(cell(id_idx).to_string()).or_insert(info);
        }

        tracing::info!(path = %path.display(), entries = table.len(), "loaded location table");
        Ok(LocationResolver { table })
    }

    /// Resolve a meter identifier by exact match.
    pub fn resolve(&self, meter_id: &str) -> LocationInfo {
        self.table
            .get(meter_id)
            .cloned()
            .unwrap_or_else(LocationInfo::fallback)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
