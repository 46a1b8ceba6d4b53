//! Simulation orchestration
//!
//! `SimulationDriver` advances one flowline model through target years and
//! records checkpoints; `run_ensemble` shards independent drivers across
//! threads.

mod driver;
mod ensemble;

pub use driver::{Checkpoint, Checkpoints, SimulationDriver};
pub use ensemble::{run_ensemble, EnsembleSummary};
