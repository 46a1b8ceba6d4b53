//! Mass-balance model trait definition
//!
//! This module defines the `MassBalanceModel` trait, the capability every
//! surface mass-balance provider offers to the flowline solver.

use crate::core_types::error::{FlowlineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Temporal resolution at which the solver queries mass balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MbResolution {
    /// One rate per model year
    #[default]
    Annual,
    /// One rate per model month
    Monthly,
}

/// Surface mass-balance provider
///
/// Rates are meters of ice equivalent per second; positive values mean
/// accumulation. Implementations must return a finite rate for any finite
/// height, including altitudes off the glacier: the solver queries every
/// grid point, ice-covered or not.
///
/// Providers take `&mut self` because stochastic variants advance an owned
/// random generator on each call. Callers must not assume two calls return
/// the same values unless [`MassBalanceModel::is_reproducible_by_year`]
/// says so.
pub trait MassBalanceModel: Send + fmt::Debug {
    /// Short provider name used in logs and errors
    fn name(&self) -> &'static str;

    /// Annual mass balance at each height
    ///
    /// # Arguments
    ///
    /// * `heights` - Surface altitudes (m)
    /// * `year` - Model year, or `None` for time-invariant evaluation
    ///
    /// # Returns
    ///
    /// One rate per height (m ice s⁻¹)
    fn get_annual_mb(&mut self, heights: &[f64], year: Option<f64>) -> Vec<f64>;

    /// Monthly mass balance at each height
    ///
    /// `year` is a floating year whose fractional part selects the month.
    ///
    /// # Errors
    ///
    /// The default implementation returns
    /// [`FlowlineError::UnsupportedResolution`]; the solver then falls back
    /// to annual resolution.
    fn get_monthly_mb(&mut self, heights: &[f64], year: f64) -> Result<Vec<f64>> {
        let _ = (heights, year);
        Err(FlowlineError::UnsupportedResolution {
            provider: self.name(),
        })
    }

    /// Whether repeated calls for the same year return identical values
    fn is_reproducible_by_year(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct AnnualOnly;

    impl MassBalanceModel for AnnualOnly {
        fn name(&self) -> &'static str {
            "AnnualOnly"
        }

        fn get_annual_mb(&mut self, heights: &[f64], _year: Option<f64>) -> Vec<f64> {
            vec![0.0; heights.len()]
        }
    }

    #[test]
    fn test_default_monthly_is_unsupported() {
        let mut mb = AnnualOnly;
        let err = mb.get_monthly_mb(&[1.0, 2.0], 3.5).unwrap_err();
        assert_eq!(
            err,
            FlowlineError::UnsupportedResolution {
                provider: "AnnualOnly"
            }
        );
        assert!(mb.is_reproducible_by_year());
    }

    #[test]
    fn test_resolution_default_is_annual() {
        assert_eq!(MbResolution::default(), MbResolution::Annual);
    }
}
