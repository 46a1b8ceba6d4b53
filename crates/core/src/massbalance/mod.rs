//! Mass-balance models
//!
//! A mass-balance model turns altitudes (and optionally a model year) into a
//! local rate of ice gain or loss, in meters of ice equivalent per second.
//! The solver only talks to the [`MassBalanceModel`] trait; concrete
//! behaviors are picked when the model is constructed.
//!
//! # Example
//!
//! ```rust
//! use glacier_flow_core::massbalance::{LinearMassBalance, MassBalanceModel};
//!
//! let mut mb = LinearMassBalance::new(3000.0, 3.0);
//! let rates = mb.get_annual_mb(&[2500.0, 3000.0, 3500.0], None);
//! assert!(rates[0] < 0.0 && rates[1] == 0.0 && rates[2] > 0.0);
//! ```

mod constant;
mod linear;
mod random;
#[allow(clippy::module_name_repetitions)]
mod r#trait;

pub use constant::{ConstantMassBalance, ThresholdMassBalance};
pub use linear::LinearMassBalance;
pub use r#trait::{MassBalanceModel, MbResolution};
pub use random::{DrawMode, RandomLinearMassBalance, RandomLinearParams};
