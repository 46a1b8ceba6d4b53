//! Flux-based flowline evolution model
//!
//! `FluxBasedModel` advances a [`Flowline`] under a mass-balance forcing
//! with an explicit, adaptive time step. Each step:
//!
//! 1. computes shallow-ice fluxes on the staggered grid,
//! 2. picks `dt` from the diffusive stability limit, `max_dt` and the time
//!    left to the target year,
//! 3. evaluates the mass balance at the current surface and year,
//! 4. validates the candidate thickness and only then commits it and
//!    advances the clock.
//!
//! A step either commits completely or not at all, so a failed run leaves
//! the flowline at its last valid state.

use super::diagnostics::RunDiagnostics;
use super::flux::{compute_staggered_flux, stable_dt, thickness_change, FluxParams};
use super::params::SolverParams;
use super::r#trait::{FlowlineModel, SolverState};
use crate::core_types::error::{FlowlineError, Result};
use crate::core_types::units::SEC_IN_YEAR;
use crate::grid::Flowline;
use crate::massbalance::{MassBalanceModel, MbResolution};
use tracing::{debug, error, info, warn};

/// Volume (m³) under which a glacier counts as vanished for equilibrium runs
const VANISHED_VOLUME_M3: f64 = 1.0;

/// Consecutive vanished chunks after which an equilibrium search stops
const MAX_VANISHED_CHUNKS: u32 = 5;

/// Explicit flux-based solver for a single flowline
#[derive(Debug)]
pub struct FluxBasedModel {
    flowline: Flowline,
    mb_model: Box<dyn MassBalanceModel>,
    params: SolverParams,
    flux_params: FluxParams,

    // Scratch buffers reused by every step
    widths_m: Vec<f64>,
    flux: Vec<f64>,
    delta: Vec<f64>,

    // Clock
    yr: f64,
    state: SolverState,
    mb_resolution: MbResolution,

    // Statistics
    n_steps: u64,
    last_dt: f64,
    clamped_m3: f64,
    outflow_m3: f64,
}

impl FluxBasedModel {
    /// Create a solver owning `flowline`, with its clock at `y0`
    ///
    /// # Arguments
    ///
    /// * `flowline` - Initial geometry
    /// * `mb_model` - Surface mass-balance provider
    /// * `y0` - Starting year
    /// * `params` - Flow-law constants and step controls
    ///
    /// # Errors
    ///
    /// Returns [`FlowlineError::InvalidGeometry`] for a non-finite `y0` or
    /// unusable parameters.
    pub fn new(
        flowline: Flowline,
        mb_model: Box<dyn MassBalanceModel>,
        y0: f64,
        params: SolverParams,
    ) -> Result<Self> {
        params.validate()?;
        if !y0.is_finite() {
            return Err(FlowlineError::invalid_geometry(format!(
                "starting year must be finite, got {y0}"
            )));
        }

        let n = flowline.n_points();
        let flux_params = FluxParams::new(&params, flowline.dx());
        let widths_m = flowline.widths_m().as_slice().to_vec();

        info!(
            "Flux-based model: {} points, dx={:.1}m, y0={}, mb={}, cfl={}, max_dt={:.0}s",
            n,
            flowline.dx(),
            y0,
            mb_model.name(),
            params.cfl_number,
            params.max_dt
        );

        Ok(Self {
            flowline,
            mb_model,
            params,
            flux_params,
            widths_m,
            flux: vec![0.0; n + 1],
            delta: vec![0.0; n],
            yr: y0,
            state: SolverState::Idle,
            mb_resolution: params.mb_resolution,
            n_steps: 0,
            last_dt: 0.0,
            clamped_m3: 0.0,
            outflow_m3: 0.0,
        })
    }

    /// Current model year
    pub fn yr(&self) -> f64 {
        self.yr
    }

    /// Current lifecycle state
    pub fn state(&self) -> SolverState {
        self.state
    }

    /// The flowline being evolved
    pub fn flowline(&self) -> &Flowline {
        &self.flowline
    }

    /// Parameters the solver was built with
    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Mass-balance provider driving the run
    pub fn mb_model(&self) -> &dyn MassBalanceModel {
        self.mb_model.as_ref()
    }

    /// Resolution actually used for mass balance
    ///
    /// Differs from the requested one once a provider without monthly
    /// support forced a fallback to annual values.
    pub fn mb_resolution_in_use(&self) -> MbResolution {
        self.mb_resolution
    }

    /// Number of committed time steps
    pub fn n_steps(&self) -> u64 {
        self.n_steps
    }

    /// Length of the last committed step (s)
    pub fn last_dt(&self) -> f64 {
        self.last_dt
    }

    /// Total ice volume added back by thickness clamping (m³)
    pub fn clamped_m3(&self) -> f64 {
        self.clamped_m3
    }

    /// Total ice volume that left through the downstream boundary (m³)
    pub fn outflow_m3(&self) -> f64 {
        self.outflow_m3
    }

    /// Advance the clock to exactly `target_year`
    ///
    /// # Errors
    ///
    /// * [`FlowlineError::SolverFailed`] if an earlier run failed
    /// * [`FlowlineError::NumericalInstability`] if the step collapses or the
    ///   thickness diverges; the model is `Failed` afterwards
    pub fn run_until(&mut self, target_year: f64) -> Result<()> {
        if self.state == SolverState::Failed {
            return Err(FlowlineError::SolverFailed { year: self.yr });
        }
        if !target_year.is_finite() {
            return Err(FlowlineError::invalid_geometry(format!(
                "target year must be finite, got {target_year}"
            )));
        }
        if self.yr >= target_year {
            return Ok(());
        }

        let start_year = self.yr;
        let start_steps = self.n_steps;
        let mut smallest_dt = f64::INFINITY;

        self.state = SolverState::Stepping;
        while self.yr < target_year {
            match self.step(target_year) {
                Ok(dt) => smallest_dt = smallest_dt.min(dt),
                Err(err) => {
                    if matches!(err, FlowlineError::NumericalInstability { .. }) {
                        self.state = SolverState::Failed;
                        error!("Flowline run failed: {}", err);
                    } else {
                        self.state = SolverState::Idle;
                    }
                    return Err(err);
                }
            }
        }
        self.state = SolverState::Idle;

        debug!(
            "run_until: {:.3} -> {:.3} in {} steps, smallest dt={:.0}s, volume={:.6}km³",
            start_year,
            target_year,
            self.n_steps - start_steps,
            smallest_dt,
            self.flowline.volume_km3()
        );
        Ok(())
    }

    /// Run to each year in turn and record glacier-wide diagnostics
    ///
    /// Years at or before the current clock are recorded without stepping.
    ///
    /// # Errors
    ///
    /// Propagates the first `run_until` failure.
    pub fn run_until_and_store(&mut self, years: &[f64]) -> Result<RunDiagnostics> {
        let mut diagnostics = RunDiagnostics::with_capacity(years.len());
        for &year in years {
            self.run_until(year)?;
            diagnostics.record(self.yr, &self.flowline);
        }
        Ok(diagnostics)
    }

    /// Run in chunks of `ystep` years until the glacier stops changing
    ///
    /// Equilibrium is reached when the relative volume change over one chunk
    /// drops below `rate`, or when the glacier has stayed vanished for
    /// several consecutive chunks.
    ///
    /// # Errors
    ///
    /// * [`FlowlineError::EquilibriumNotReached`] after `max_ite` chunks
    /// * [`FlowlineError::InvalidGeometry`] for non-positive `ystep`
    /// * any `run_until` failure
    pub fn run_until_equilibrium(&mut self, rate: f64, ystep: f64, max_ite: u32) -> Result<()> {
        if !ystep.is_finite() || ystep <= 0.0 {
            return Err(FlowlineError::invalid_geometry(format!(
                "equilibrium step must be positive, got {ystep}"
            )));
        }

        let mut ite = 0;
        let mut vanished_chunks = 0;
        let mut t_rate = f64::INFINITY;
        while t_rate > rate && vanished_chunks < MAX_VANISHED_CHUNKS {
            if ite >= max_ite {
                return Err(FlowlineError::EquilibriumNotReached {
                    iterations: ite,
                    rate: t_rate,
                });
            }
            ite += 1;

            let v_before = self.flowline.volume_m3();
            self.run_until(self.yr + ystep)?;
            let v_after = self.flowline.volume_m3();

            if v_before.abs() < VANISHED_VOLUME_M3 {
                t_rate = f64::INFINITY;
                if v_after.abs() < VANISHED_VOLUME_M3 {
                    vanished_chunks += 1;
                }
            } else {
                t_rate = (v_after - v_before).abs() / v_before;
            }
        }

        info!(
            "Equilibrium after {} chunks at year {:.1}: volume={:.6}km³, length={:.0}m",
            ite,
            self.yr,
            self.flowline.volume_km3(),
            self.flowline.length_m()
        );
        Ok(())
    }

    /// One atomic step towards `target_year`; returns the step length (s)
    fn step(&mut self, target_year: f64) -> Result<f64> {
        let thick = self.flowline.thickness();
        let max_diffusivity = compute_staggered_flux(
            self.flowline.surface_h(),
            thick.as_slice(),
            &self.widths_m,
            &self.flux_params,
            &mut self.flux,
        );

        let dt_stable = stable_dt(self.flowline.dx(), max_diffusivity, self.params.cfl_number)
            .min(self.params.max_dt);
        if dt_stable.is_nan() || dt_stable < self.params.min_dt {
            return Err(FlowlineError::instability(
                self.yr,
                format!(
                    "time step {dt_stable:.3e}s fell below min_dt={}s (max diffusivity {max_diffusivity:.3e} m²/s)",
                    self.params.min_dt
                ),
            ));
        }

        let remaining = (target_year - self.yr) * SEC_IN_YEAR;
        let is_last = dt_stable >= remaining;
        let dt = if is_last { remaining } else { dt_stable };

        let mb = self.mass_balance()?;
        let dx = self.flowline.dx();
        thickness_change(&self.flux, &self.widths_m, &mb, dx, dt, &mut self.delta);

        // Validate before touching the flowline
        for (i, (h, d)) in thick.iter().zip(self.delta.iter()).enumerate() {
            let candidate = h + d;
            if !candidate.is_finite() || candidate > self.params.max_thickness {
                return Err(FlowlineError::instability(
                    self.yr,
                    format!(
                        "thickness {candidate:.3e}m at point {i} exceeds the sanity bound of {}m",
                        self.params.max_thickness
                    ),
                ));
            }
        }

        self.clamped_m3 += self.flowline.apply_delta(&self.delta)?;
        self.outflow_m3 += self.flux[self.flux.len() - 1] * dt;
        self.yr = if is_last {
            target_year
        } else {
            (self.yr + dt / SEC_IN_YEAR).min(target_year)
        };
        self.n_steps += 1;
        self.last_dt = dt;
        Ok(dt)
    }

    /// Mass balance at the current surface, degrading to annual if needed
    ///
    /// Rejects provider output that does not hold one rate per grid point.
    fn mass_balance(&mut self) -> Result<Vec<f64>> {
        let mb = self.query_mass_balance()?;
        let n = self.flowline.n_points();
        if mb.len() != n {
            return Err(FlowlineError::invalid_geometry(format!(
                "mass-balance model '{}' returned {} rates for {} grid points",
                self.mb_model.name(),
                mb.len(),
                n
            )));
        }
        Ok(mb)
    }

    fn query_mass_balance(&mut self) -> Result<Vec<f64>> {
        let heights = self.flowline.surface_h();
        if self.mb_resolution == MbResolution::Monthly {
            match self.mb_model.get_monthly_mb(heights, self.yr) {
                Ok(mb) => return Ok(mb),
                Err(FlowlineError::UnsupportedResolution { provider }) => {
                    warn!(
                        "Mass-balance model '{}' has no monthly resolution, falling back to annual",
                        provider
                    );
                    self.mb_resolution = MbResolution::Annual;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(self.mb_model.get_annual_mb(heights, Some(self.yr)))
    }
}

impl FlowlineModel for FluxBasedModel {
    fn yr(&self) -> f64 {
        self.yr
    }

    fn state(&self) -> SolverState {
        self.state
    }

    fn flowline(&self) -> &Flowline {
        &self.flowline
    }

    fn run_until(&mut self, target_year: f64) -> Result<()> {
        FluxBasedModel::run_until(self, target_year)
    }
}
