//! Linear mass-balance profile around an equilibrium line altitude
//!
//! ```text
//! mb(h) = min((h - ELA) × grad, max_mb)      [mm w.e. yr⁻¹]
//! ```
//!
//! converted to meters of ice per second through the ice density.

use super::MassBalanceModel;
use crate::core_types::error::Result;
use crate::core_types::units::{mm_we_to_m_ice, SEC_IN_YEAR};
use serde::{Deserialize, Serialize};

/// Linear mass-balance profile as a function of altitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearMassBalance {
    /// Equilibrium line altitude (m)
    pub ela_h: f64,
    /// Mass-balance gradient (mm w.e. m⁻¹ yr⁻¹)
    pub grad: f64,
    /// Upper cap on the mass balance (mm w.e. yr⁻¹), if any
    pub max_mb: Option<f64>,
}

impl LinearMassBalance {
    /// Create an uncapped linear profile
    ///
    /// # Arguments
    ///
    /// * `ela_h` - Equilibrium line altitude (m)
    /// * `grad` - Gradient (mm w.e. m⁻¹ yr⁻¹)
    pub fn new(ela_h: f64, grad: f64) -> Self {
        Self {
            ela_h,
            grad,
            max_mb: None,
        }
    }

    /// Cap accumulation at `max_mb` mm w.e. per year
    pub fn with_max_mb(mut self, max_mb: f64) -> Self {
        self.max_mb = Some(max_mb);
        self
    }

    /// Shift the equilibrium line altitude
    ///
    /// Raising the ELA mimics a warmer climate.
    pub fn set_ela_h(&mut self, ela_h: f64) {
        self.ela_h = ela_h;
    }

    /// Mass balance in mm w.e. per year at one altitude for a given ELA
    #[inline]
    pub(crate) fn mm_we_per_year(h: f64, ela_h: f64, grad: f64, max_mb: Option<f64>) -> f64 {
        let mb = (h - ela_h) * grad;
        match max_mb {
            Some(cap) => mb.min(cap),
            None => mb,
        }
    }

    /// Convert a linear profile to meters of ice per second at each height
    pub(crate) fn profile(heights: &[f64], ela_h: f64, grad: f64, max_mb: Option<f64>) -> Vec<f64> {
        heights
            .iter()
            .map(|&h| mm_we_to_m_ice(Self::mm_we_per_year(h, ela_h, grad, max_mb)) / SEC_IN_YEAR)
            .collect()
    }
}

impl MassBalanceModel for LinearMassBalance {
    fn name(&self) -> &'static str {
        "LinearMassBalance"
    }

    fn get_annual_mb(&mut self, heights: &[f64], _year: Option<f64>) -> Vec<f64> {
        Self::profile(heights, self.ela_h, self.grad, self.max_mb)
    }

    // No seasonal cycle: every month sees the annual rate
    fn get_monthly_mb(&mut self, heights: &[f64], year: f64) -> Result<Vec<f64>> {
        Ok(self.get_annual_mb(heights, Some(year)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_at_ela() {
        let mut mb = LinearMassBalance::new(2800.0, 4.0);
        assert_eq!(mb.get_annual_mb(&[2800.0], None), vec![0.0]);
    }

    #[test]
    fn test_gradient_in_ice_units() {
        let mut mb = LinearMassBalance::new(3000.0, 3.0);
        let rates = mb.get_annual_mb(&[3300.0, 2700.0], None);
        // 300 m above ELA -> 900 mm w.e. -> 1 m ice per year
        assert_relative_eq!(rates[0] * SEC_IN_YEAR, 1.0, epsilon = 1e-12);
        assert_relative_eq!(rates[1] * SEC_IN_YEAR, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_max_mb_caps_accumulation_only() {
        let mut mb = LinearMassBalance::new(3000.0, 3.0).with_max_mb(450.0);
        let rates = mb.get_annual_mb(&[4000.0, 2000.0], None);
        assert_relative_eq!(rates[0] * SEC_IN_YEAR, 0.5, epsilon = 1e-12);
        assert_relative_eq!(rates[1] * SEC_IN_YEAR, -10.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_extrapolates_far_off_glacier() {
        let mut mb = LinearMassBalance::new(3000.0, 3.0);
        let rates = mb.get_annual_mb(&[-1000.0, 10_000.0], Some(1.0));
        assert!(rates.iter().all(|r| r.is_finite()));
    }

    #[test]
    fn test_monthly_equals_annual_and_ela_shift() {
        let mut mb = LinearMassBalance::new(3000.0, 3.0);
        let heights = [2900.0, 3100.0];
        let annual = mb.get_annual_mb(&heights, Some(5.0));
        assert_eq!(mb.get_monthly_mb(&heights, 5.5).unwrap(), annual);

        mb.set_ela_h(3200.0);
        let shifted = mb.get_annual_mb(&heights, Some(5.0));
        assert!(shifted[1] < annual[1]);
    }
}
