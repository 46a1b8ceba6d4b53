//! Flowline model trait definition
//!
//! This module defines the `FlowlineModel` trait, the interface the
//! simulation driver uses to advance any flowline evolution solver.

use crate::core_types::error::Result;
use crate::grid::Flowline;

/// Lifecycle of a solver's simulation clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverState {
    /// Constructed or returned from `run_until`; ready to advance
    Idle,
    /// Inside `run_until`
    Stepping,
    /// A numerical blow-up was detected; terminal
    Failed,
}

/// Time-stepping flowline evolution model
///
/// Implementations exclusively own the flowline they advance. Readers get
/// a shared borrow through [`FlowlineModel::flowline`] and must copy
/// anything they want to keep past the next `run_until`.
pub trait FlowlineModel: Send {
    /// Current model year
    fn yr(&self) -> f64;

    /// Current lifecycle state
    fn state(&self) -> SolverState;

    /// The flowline being evolved
    fn flowline(&self) -> &Flowline;

    /// Advance the clock to exactly `target_year`
    ///
    /// Does nothing if the clock is already at or past `target_year`.
    ///
    /// # Errors
    ///
    /// Returns `NumericalInstability` when the run blows up (the model is
    /// then `Failed`) and `SolverFailed` when called on a failed model.
    fn run_until(&mut self, target_year: f64) -> Result<()>;
}
