//! Glacier Flowline Simulation Core Library
//!
//! Forward time integration of a single glacier flowline under surface
//! mass-balance forcing, using the shallow-ice approximation on a
//! staggered 1-D grid with a stability-bounded adaptive time step.
//!
//! ## Components
//!
//! - [`grid::Flowline`]: bed, surface and width profiles with length, area
//!   and volume diagnostics
//! - [`massbalance::MassBalanceModel`]: pluggable surface mass balance
//!   (constant, step, linear, stochastic linear)
//! - [`solver::FluxBasedModel`]: explicit flux-based evolution solver
//! - [`simulation::SimulationDriver`]: checkpoint recording and parallel
//!   ensembles

// Core types and utilities
pub mod core_types;

pub mod grid;
pub mod massbalance;
pub mod simulation;
pub mod solver;

// Re-export core types
pub use core_types::{FlowlineError, Result};

// Re-export main types
pub use grid::{Flowline, ICE_FREE_THRESHOLD};
pub use massbalance::{
    ConstantMassBalance, DrawMode, LinearMassBalance, MassBalanceModel, MbResolution,
    RandomLinearMassBalance, RandomLinearParams, ThresholdMassBalance,
};
pub use simulation::{run_ensemble, Checkpoint, EnsembleSummary, SimulationDriver};
pub use solver::{FlowlineModel, FluxBasedModel, RunDiagnostics, SolverParams, SolverState};
