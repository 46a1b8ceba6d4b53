//! Diagnostic time series recorded during a run.
//!
//! `RunDiagnostics` holds one row per requested year, stored column-wise so
//! each series can be handed straight to a plotting or export layer.

use crate::grid::Flowline;
use serde::{Deserialize, Serialize};

/// Glacier-wide diagnostics at a sequence of years
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    /// Model year of each record
    pub years: Vec<f64>,
    /// Glacier length (m)
    pub length_m: Vec<f64>,
    /// Ice-covered area (km²)
    pub area_km2: Vec<f64>,
    /// Ice volume (km³)
    pub volume_km3: Vec<f64>,
}

impl RunDiagnostics {
    /// Pre-allocate all series for `n` records.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            years: Vec::with_capacity(n),
            length_m: Vec::with_capacity(n),
            area_km2: Vec::with_capacity(n),
            volume_km3: Vec::with_capacity(n),
        }
    }

    /// Append the diagnostics of `flowline` at `year`.
    pub fn record(&mut self, year: f64, flowline: &Flowline) {
        self.years.push(year);
        self.length_m.push(flowline.length_m());
        self.area_km2.push(flowline.area_km2());
        self.volume_km3.push(flowline.volume_km3());
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_one_row() {
        let fl = Flowline::new(&[10.0, 5.0, 0.0], &[0.0; 3], &[1.0; 3], 100.0).unwrap();
        let mut diag = RunDiagnostics::with_capacity(2);
        assert!(diag.is_empty());

        diag.record(0.0, &fl);
        diag.record(5.0, &fl);

        assert_eq!(diag.len(), 2);
        assert_eq!(diag.years, vec![0.0, 5.0]);
        assert_eq!(diag.length_m, vec![200.0, 200.0]);
        assert_eq!(diag.volume_km3[0], fl.volume_km3());
    }
}
