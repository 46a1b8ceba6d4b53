//! Flowline evolution solver module
//!
//! The core abstraction is the `FlowlineModel` trait; `FluxBasedModel` is
//! the explicit shallow-ice implementation. Flux kernels live in `flux` so
//! they can be tested and benchmarked without a full model.
//!
//! # Example
//!
//! ```rust
//! use glacier_flow_core::grid::Flowline;
//! use glacier_flow_core::massbalance::LinearMassBalance;
//! use glacier_flow_core::solver::{FluxBasedModel, SolverParams};
//!
//! let bed: Vec<f64> = (0..100).map(|i| 3400.0 - 20.0 * f64::from(i)).collect();
//! let flowline = Flowline::ice_free(&bed, &vec![3.0; 100], 100.0).unwrap();
//! let mb = LinearMassBalance::new(3000.0, 4.0);
//!
//! let mut model =
//!     FluxBasedModel::new(flowline, Box::new(mb), 0.0, SolverParams::default()).unwrap();
//! model.run_until(20.0).unwrap();
//! assert_eq!(model.yr(), 20.0);
//! ```

mod diagnostics;
pub mod flux;
mod model;
mod params;
#[allow(clippy::module_name_repetitions)]
mod r#trait;

// Re-exports
pub use diagnostics::RunDiagnostics;
pub use flux::{compute_staggered_flux, stable_dt, thickness_change, FluxParams};
pub use model::FluxBasedModel;
pub use params::SolverParams;
pub use r#trait::{FlowlineModel, SolverState};
