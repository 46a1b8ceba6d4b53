//! Parallel runs of independent flowlines
//!
//! Time steps within one flowline are strictly sequential, so parallelism
//! comes from sharding independent members (different seeds, climates or
//! geometries) across Rayon workers. Members share no mutable state.

use super::driver::{Checkpoint, SimulationDriver};
use crate::core_types::error::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Run every member through the same target years in parallel
///
/// # Arguments
///
/// * `members` - Independent drivers, consumed
/// * `target_years` - Ordered checkpoint years shared by all members
///
/// # Returns
///
/// One result per member, in member order
pub fn run_ensemble(
    members: Vec<SimulationDriver>,
    target_years: &[f64],
) -> Vec<Result<Vec<Checkpoint>>> {
    info!(
        "Running ensemble of {} members over {} checkpoints",
        members.len(),
        target_years.len()
    );

    let results: Vec<Result<Vec<Checkpoint>>> = members
        .into_par_iter()
        .map(|mut driver| driver.run_to_completion(target_years.iter().copied()))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        warn!("{} of {} ensemble members failed", failed, results.len());
    }
    results
}

/// Per-year statistics across the successful members of an ensemble
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSummary {
    /// Checkpoint years
    pub years: Vec<f64>,
    /// Mean ice volume per checkpoint (km³)
    pub mean_volume_km3: Vec<f64>,
    /// Smallest member volume per checkpoint (km³)
    pub min_volume_km3: Vec<f64>,
    /// Largest member volume per checkpoint (km³)
    pub max_volume_km3: Vec<f64>,
    /// Mean glacier length per checkpoint (m)
    pub mean_length_m: Vec<f64>,
    /// Members that ran to completion
    pub n_members: usize,
    /// Members that returned an error
    pub n_failed: usize,
}

impl EnsembleSummary {
    /// Summarise ensemble results checkpoint by checkpoint
    ///
    /// Failed members are counted but excluded from the statistics.
    pub fn from_results(results: &[Result<Vec<Checkpoint>>]) -> Self {
        let ok: Vec<&Vec<Checkpoint>> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let n_failed = results.len() - ok.len();
        let n_rows = ok.iter().map(|c| c.len()).min().unwrap_or(0);

        let mut summary = Self {
            n_members: ok.len(),
            n_failed,
            ..Self::default()
        };
        for row in 0..n_rows {
            let volumes: Vec<f64> = ok.iter().map(|c| c[row].volume_km3).collect();
            let n = volumes.len() as f64;
            summary.years.push(ok[0][row].year);
            summary.mean_volume_km3.push(volumes.iter().sum::<f64>() / n);
            summary
                .min_volume_km3
                .push(volumes.iter().copied().fold(f64::INFINITY, f64::min));
            summary
                .max_volume_km3
                .push(volumes.iter().copied().fold(f64::NEG_INFINITY, f64::max));
            summary
                .mean_length_m
                .push(ok.iter().map(|c| c[row].length_m).sum::<f64>() / n);
        }
        summary
    }
}
