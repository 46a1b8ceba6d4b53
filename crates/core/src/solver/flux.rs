//! Shallow-ice flux on a staggered grid
//!
//! Fluxes live on the boundaries between grid points. For the boundary
//! between points `i-1` and `i`:
//!
//! ```text
//! H   = (H[i-1] + H[i]) / 2
//! α   = (s[i] - s[i-1]) / dx
//! D   = (fd·Hⁿ⁺² + fs·Hⁿ) · (ρg)ⁿ · |α|ⁿ⁻¹        fd = 2A / (n + 2)
//! q   = -D · α · w
//! ```
//!
//! `q` is a section flux (m³/s), positive downstream. Boundary 0 is the
//! glacier head and carries no flux; boundary `n` lets ice leave the domain
//! freely.
//!
//! The continuity update of point `i` over a step `dt` is
//!
//! ```text
//! ΔH[i] = dt · ( (q[i] - q[i+1]) / (w[i]·dx) + ṁ[i] )
//! ```
//!
//! which is stable for `dt <= dx² / (2·D_max)`, where `D_max` is the
//! largest boundary diffusivity weighted by `w_stag / w_point` over the two
//! points the boundary feeds. Narrow points next to wide boundaries
//! therefore shorten the step.

use super::params::SolverParams;

/// Flow-law constants folded into the two diffusivity prefactors
#[derive(Debug, Clone, Copy)]
pub struct FluxParams {
    /// Deformation prefactor `2A/(n+2) · (ρg)ⁿ`
    pub deformation: f64,
    /// Sliding prefactor `fs · (ρg)ⁿ`
    pub sliding: f64,
    /// Glen's exponent n
    pub glen_n: f64,
    /// Grid spacing (m)
    pub dx: f64,
}

impl FluxParams {
    /// Fold solver parameters for a grid with spacing `dx`
    pub fn new(params: &SolverParams, dx: f64) -> Self {
        let n = params.glen_n;
        let rho_g_n = (params.rho * params.g).powf(n);
        Self {
            deformation: 2.0 * params.glen_a / (n + 2.0) * rho_g_n,
            sliding: params.sliding_fs * rho_g_n,
            glen_n: n,
            dx,
        }
    }

    /// Diffusivity (m²/s) for a staggered thickness and surface slope
    #[inline]
    pub fn diffusivity(&self, thick: f64, slope: f64) -> f64 {
        if thick <= 0.0 {
            return 0.0;
        }
        let n = self.glen_n;
        let slope_term = slope.abs().powf(n - 1.0);
        (self.deformation * thick.powf(n + 2.0) + self.sliding * thick.powf(n)) * slope_term
    }
}

/// Compute staggered section fluxes
///
/// # Arguments
///
/// * `surface_h` - Surface elevation per point (m)
/// * `thick` - Ice thickness per point (m)
/// * `widths_m` - Width per point (m)
/// * `params` - Folded flow-law constants
/// * `flux_out` - Output, one flux per boundary (`n + 1` entries)
///
/// # Returns
///
/// Largest width-weighted diffusivity found on any boundary (m²/s), the
/// value [`stable_dt`] expects
pub fn compute_staggered_flux(
    surface_h: &[f64],
    thick: &[f64],
    widths_m: &[f64],
    params: &FluxParams,
    flux_out: &mut [f64],
) -> f64 {
    let n = surface_h.len();
    debug_assert_eq!(flux_out.len(), n + 1);

    let mut max_diffusivity = 0.0_f64;
    flux_out[0] = 0.0;
    for i in 1..n {
        let stag_thick = 0.5 * (thick[i - 1] + thick[i]);
        let slope = (surface_h[i] - surface_h[i - 1]) / params.dx;
        let stag_width = 0.5 * (widths_m[i - 1] + widths_m[i]);

        let diffusivity = params.diffusivity(stag_thick, slope);
        flux_out[i] = -diffusivity * slope * stag_width;

        let narrowest = [point_width(widths_m, i - 1), point_width(widths_m, i)]
            .into_iter()
            .filter(|&w| w > 0.0)
            .fold(f64::INFINITY, f64::min);
        let weighted = if narrowest.is_finite() {
            diffusivity * stag_width / narrowest
        } else {
            diffusivity
        };
        max_diffusivity = max_diffusivity.max(weighted);
    }

    // Free outflow: whatever crosses the last interior boundary downstream
    // also leaves through the terminal one
    flux_out[n] = flux_out[n - 1].max(0.0);

    max_diffusivity
}

/// Largest stable time step for a given diffusivity (s)
///
/// Returns `f64::INFINITY` when nothing flows.
#[inline]
pub fn stable_dt(dx: f64, max_diffusivity: f64, cfl_number: f64) -> f64 {
    if max_diffusivity > 0.0 {
        cfl_number * dx * dx / (2.0 * max_diffusivity)
    } else {
        f64::INFINITY
    }
}

/// Thickness change per point from flux divergence and mass balance
///
/// Points of zero width take the mean of their neighbouring boundary
/// widths so that ice flowing into them is not lost.
///
/// # Arguments
///
/// * `flux` - Staggered fluxes (`n + 1` entries, m³/s)
/// * `widths_m` - Width per point (m)
/// * `mb` - Mass balance per point (m ice / s)
/// * `dx` - Grid spacing (m)
/// * `dt` - Time step (s)
/// * `delta_out` - Output thickness change per point (m)
pub fn thickness_change(
    flux: &[f64],
    widths_m: &[f64],
    mb: &[f64],
    dx: f64,
    dt: f64,
    delta_out: &mut [f64],
) {
    for i in 0..widths_m.len() {
        let width = point_width(widths_m, i);
        let divergence = if width > 0.0 {
            (flux[i] - flux[i + 1]) / (width * dx)
        } else {
            0.0
        };
        delta_out[i] = dt * (divergence + mb[i]);
    }
}

/// Width a point uses in the continuity update (m)
///
/// Zero-width points take the mean of their neighbours.
#[inline]
fn point_width(widths_m: &[f64], i: usize) -> f64 {
    if widths_m[i] > 0.0 {
        return widths_m[i];
    }
    let left = if i > 0 { widths_m[i - 1] } else { 0.0 };
    let right = widths_m.get(i + 1).copied().unwrap_or(0.0);
    0.5 * (left + right)
}
