//! Error types for flowline construction and time integration.

use thiserror::Error;

/// Errors raised by the flowline engine.
///
/// Construction errors are fatal and reported immediately. Stepping errors
/// halt the affected run and leave the flowline at its last committed state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowlineError {
    /// Malformed or physically inconsistent input (arrays, spacing, parameters).
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// The adaptive step collapsed or the ice thickness diverged.
    #[error("Numerical instability at year {year:.4}: {reason}")]
    NumericalInstability { year: f64, reason: String },

    /// A mass-balance provider was asked for a resolution it does not offer.
    #[error("Mass-balance model '{provider}' does not support monthly resolution")]
    UnsupportedResolution { provider: &'static str },

    /// An equilibrium search ran out of iterations.
    #[error("No equilibrium after {iterations} iterations (last relative volume change {rate:.3e})")]
    EquilibriumNotReached { iterations: u32, rate: f64 },

    /// The solver already failed and refuses to advance further.
    #[error("Solver failed earlier (clock stopped at year {year:.4}); construct a new solver")]
    SolverFailed { year: f64 },
}

impl FlowlineError {
    /// Create an invalid geometry error.
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Create a numerical instability error.
    pub fn instability(year: f64, reason: impl Into<String>) -> Self {
        Self::NumericalInstability {
            year,
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FlowlineError>;
