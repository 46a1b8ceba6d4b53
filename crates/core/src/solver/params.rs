//! Solver parameters and presets
//!
//! Physical constants of the ice flow law and the numerical controls of the
//! adaptive time step. Presets trade accuracy for speed the same way for
//! every glacier: a smaller CFL fraction and a shorter maximum step give a
//! smoother but slower integration.

use crate::core_types::error::{FlowlineError, Result};
use crate::core_types::units::{GLEN_A, GLEN_N, GRAVITY, ICE_DENSITY, SEC_IN_DAY};
use crate::massbalance::MbResolution;
use serde::{Deserialize, Serialize};

/// Physics and numerics of the flux-based solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverParams {
    /// Glen's rate factor A (Pa⁻ⁿ s⁻¹)
    pub glen_a: f64,
    /// Glen's exponent n
    pub glen_n: f64,
    /// Basal sliding parameter fs (Pa⁻ⁿ m² s⁻¹), 0 for no sliding
    pub sliding_fs: f64,
    /// Ice density (kg/m³)
    pub rho: f64,
    /// Gravitational acceleration (m/s²)
    pub g: f64,
    /// Fraction of the diffusive stability limit used as time step (0, 1]
    pub cfl_number: f64,
    /// Smallest acceptable stability step (s); below this the run fails
    pub min_dt: f64,
    /// Largest time step (s)
    pub max_dt: f64,
    /// Ice thickness above which the run is considered diverged (m)
    pub max_thickness: f64,
    /// Requested mass-balance resolution
    pub mb_resolution: MbResolution,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            glen_a: GLEN_A,
            glen_n: GLEN_N,
            sliding_fs: 0.0,
            rho: ICE_DENSITY,
            g: GRAVITY,
            cfl_number: 0.9,
            min_dt: 1.0,
            max_dt: 31.0 * SEC_IN_DAY,
            max_thickness: 5000.0,
            mb_resolution: MbResolution::Annual,
        }
    }
}

impl SolverParams {
    /// Larger steps for quick exploratory runs
    pub fn fast() -> Self {
        Self {
            cfl_number: 1.0,
            max_dt: 62.0 * SEC_IN_DAY,
            ..Self::default()
        }
    }

    /// Shorter steps for smooth, well-resolved trajectories
    pub fn accurate() -> Self {
        Self {
            cfl_number: 0.5,
            max_dt: SEC_IN_DAY,
            ..Self::default()
        }
    }

    /// Request monthly mass-balance evaluation
    pub fn with_mb_resolution(mut self, resolution: MbResolution) -> Self {
        self.mb_resolution = resolution;
        self
    }

    /// Check that every parameter is usable
    ///
    /// # Errors
    ///
    /// Returns [`FlowlineError::InvalidGeometry`] naming the first parameter
    /// that is non-finite or out of range.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("glen_a", self.glen_a),
            ("rho", self.rho),
            ("g", self.g),
            ("min_dt", self.min_dt),
            ("max_dt", self.max_dt),
            ("max_thickness", self.max_thickness),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(FlowlineError::invalid_geometry(format!(
                    "solver parameter {name} must be finite and positive, got {value}"
                )));
            }
        }
        if !self.glen_n.is_finite() || self.glen_n < 1.0 {
            return Err(FlowlineError::invalid_geometry(format!(
                "solver parameter glen_n must be >= 1, got {}",
                self.glen_n
            )));
        }
        if !self.sliding_fs.is_finite() || self.sliding_fs < 0.0 {
            return Err(FlowlineError::invalid_geometry(format!(
                "solver parameter sliding_fs must be >= 0, got {}",
                self.sliding_fs
            )));
        }
        if !self.cfl_number.is_finite() || self.cfl_number <= 0.0 || self.cfl_number > 1.0 {
            return Err(FlowlineError::invalid_geometry(format!(
                "solver parameter cfl_number must lie in (0, 1], got {}",
                self.cfl_number
            )));
        }
        if self.max_dt < self.min_dt {
            return Err(FlowlineError::invalid_geometry(format!(
                "solver parameter max_dt ({}) is smaller than min_dt ({})",
                self.max_dt, self.min_dt
            )));
        }
        Ok(())
    }
}
