//! Height-independent and step-profile mass-balance models

use super::MassBalanceModel;
use crate::core_types::error::Result;
use crate::core_types::units::m_ice_per_year_to_per_second;
use serde::{Deserialize, Serialize};

/// Same mass balance at every altitude and every year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantMassBalance {
    /// Rate in meters of ice per year
    pub rate_m_ice_per_year: f64,
}

impl ConstantMassBalance {
    /// Create a constant model from a rate in meters of ice per year
    pub fn new(rate_m_ice_per_year: f64) -> Self {
        Self {
            rate_m_ice_per_year,
        }
    }

    /// Model returning zero everywhere
    pub fn zero() -> Self {
        Self::new(0.0)
    }
}

impl MassBalanceModel for ConstantMassBalance {
    fn name(&self) -> &'static str {
        "ConstantMassBalance"
    }

    fn get_annual_mb(&mut self, heights: &[f64], _year: Option<f64>) -> Vec<f64> {
        vec![m_ice_per_year_to_per_second(self.rate_m_ice_per_year); heights.len()]
    }

    fn get_monthly_mb(&mut self, heights: &[f64], year: f64) -> Result<Vec<f64>> {
        Ok(self.get_annual_mb(heights, Some(year)))
    }
}

/// One rate above an altitude threshold, another at or below it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdMassBalance {
    /// Altitude separating the two regimes (m)
    pub threshold_h: f64,
    /// Rate strictly above the threshold (m ice / yr)
    pub above: f64,
    /// Rate at or below the threshold (m ice / yr)
    pub below: f64,
}

impl ThresholdMassBalance {
    /// Create a step-profile model
    ///
    /// # Arguments
    ///
    /// * `threshold_h` - Threshold altitude (m)
    /// * `above` - Rate above the threshold (m ice / yr)
    /// * `below` - Rate at or below the threshold (m ice / yr)
    pub fn new(threshold_h: f64, above: f64, below: f64) -> Self {
        Self {
            threshold_h,
            above,
            below,
        }
    }
}

impl MassBalanceModel for ThresholdMassBalance {
    fn name(&self) -> &'static str {
        "ThresholdMassBalance"
    }

    fn get_annual_mb(&mut self, heights: &[f64], _year: Option<f64>) -> Vec<f64> {
        heights
            .iter()
            .map(|&h| {
                let rate = if h > self.threshold_h {
                    self.above
                } else {
                    self.below
                };
                m_ice_per_year_to_per_second(rate)
            })
            .collect()
    }

    fn get_monthly_mb(&mut self, heights: &[f64], year: f64) -> Result<Vec<f64>> {
        Ok(self.get_annual_mb(heights, Some(year)))
    }
}
