//! Single glacier flowline geometry
//!
//! A flowline is the 1-D along-flow profile of a glacier: an ordered row of
//! grid points, spaced `dx` meters apart from the head (index 0) down to the
//! lowest point. Each point carries an immutable bed elevation and width and
//! a mutable ice surface elevation.
//!
//! Widths are stored in grid units, so the width of a point in meters is
//! `widths[i] * dx`.

use crate::core_types::error::{FlowlineError, Result};
use crate::core_types::units::{M2_IN_KM2, M3_IN_KM3};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Thickness (m) at or below which a grid point counts as ice-free
pub const ICE_FREE_THRESHOLD: f64 = 1e-3;

/// Rectangular-bed flowline geometry
///
/// The flowline is created once from its initial arrays and afterwards only
/// mutated through [`Flowline::apply_delta`]. Every value is finite and
/// `surface_h[i] >= bed_h[i]` holds for every point at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flowline {
    /// Ice surface elevation (m)
    surface_h: DVector<f64>,
    /// Bedrock elevation (m)
    bed_h: DVector<f64>,
    /// Channel width in grid units
    widths: DVector<f64>,
    /// Grid spacing (m)
    dx: f64,
}

impl Flowline {
    /// Create a flowline from surface, bed and width profiles
    ///
    /// # Arguments
    ///
    /// * `surface_h` - Ice surface elevation per point (m)
    /// * `bed_h` - Bedrock elevation per point (m)
    /// * `widths` - Channel width per point in grid units
    /// * `dx` - Grid spacing (m)
    ///
    /// # Errors
    ///
    /// Returns [`FlowlineError::InvalidGeometry`] if the array lengths differ,
    /// there are fewer than two points, `dx` is not a positive finite number,
    /// any value is non-finite, any width is negative, or the surface lies
    /// below the bed anywhere.
    pub fn new(surface_h: &[f64], bed_h: &[f64], widths: &[f64], dx: f64) -> Result<Self> {
        let n = bed_h.len();
        if surface_h.len() != n || widths.len() != n {
            return Err(FlowlineError::invalid_geometry(format!(
                "array lengths differ: surface_h={}, bed_h={}, widths={}",
                surface_h.len(),
                n,
                widths.len()
            )));
        }
        if n < 2 {
            return Err(FlowlineError::invalid_geometry(format!(
                "a flowline needs at least 2 grid points, got {n}"
            )));
        }
        if !dx.is_finite() || dx <= 0.0 {
            return Err(FlowlineError::invalid_geometry(format!(
                "dx must be finite and positive, got {dx}"
            )));
        }

        for i in 0..n {
            let (s, b, w) = (surface_h[i], bed_h[i], widths[i]);
            if !(s.is_finite() && b.is_finite() && w.is_finite()) {
                return Err(FlowlineError::invalid_geometry(format!(
                    "non-finite value at point {i}: surface_h={s}, bed_h={b}, width={w}"
                )));
            }
            if w < 0.0 {
                return Err(FlowlineError::invalid_geometry(format!(
                    "negative width {w} at point {i}"
                )));
            }
            if s < b {
                return Err(FlowlineError::invalid_geometry(format!(
                    "surface below bed at point {i}: surface_h={s}, bed_h={b}"
                )));
            }
        }

        Ok(Self {
            surface_h: DVector::from_column_slice(surface_h),
            bed_h: DVector::from_column_slice(bed_h),
            widths: DVector::from_column_slice(widths),
            dx,
        })
    }

    /// Create an ice-free flowline whose surface lies on the bed
    ///
    /// # Errors
    ///
    /// Same validation as [`Flowline::new`].
    pub fn ice_free(bed_h: &[f64], widths: &[f64], dx: f64) -> Result<Self> {
        Self::new(bed_h, bed_h, widths, dx)
    }

    /// Number of grid points
    #[inline]
    pub fn n_points(&self) -> usize {
        self.bed_h.len()
    }

    /// Grid spacing (m)
    #[inline]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Bedrock elevation per point (m)
    pub fn bed_h(&self) -> &[f64] {
        self.bed_h.as_slice()
    }

    /// Ice surface elevation per point (m)
    ///
    /// Borrowed view of the live array; use [`Flowline::surface_snapshot`]
    /// for a copy that survives further time steps.
    pub fn surface_h(&self) -> &[f64] {
        self.surface_h.as_slice()
    }

    /// Owned copy of the surface elevation
    pub fn surface_snapshot(&self) -> Vec<f64> {
        self.surface_h.as_slice().to_vec()
    }

    /// Channel width per point in grid units
    pub fn widths(&self) -> &[f64] {
        self.widths.as_slice()
    }

    /// Channel width per point in meters
    pub fn widths_m(&self) -> DVector<f64> {
        &self.widths * self.dx
    }

    /// Ice thickness per point (m), `surface_h - bed_h`
    pub fn thickness(&self) -> DVector<f64> {
        &self.surface_h - &self.bed_h
    }

    /// Ice thickness at a single point (m)
    #[inline]
    pub fn thickness_at(&self, i: usize) -> f64 {
        self.surface_h[i] - self.bed_h[i]
    }

    /// Whether a point carries ice above [`ICE_FREE_THRESHOLD`]
    #[inline]
    pub fn is_ice_covered(&self, i: usize) -> bool {
        self.thickness_at(i) > ICE_FREE_THRESHOLD
    }

    /// Index of the last point of the glacier, if there is any ice
    ///
    /// The glacier is the contiguous run of ice-covered points that starts
    /// at the first ice-covered point seen from the head; the terminus is
    /// the last point of that run.
    pub fn terminus_index(&self) -> Option<usize> {
        let head = (0..self.n_points()).find(|&i| self.is_ice_covered(i))?;
        let mut terminus = head;
        while terminus + 1 < self.n_points() && self.is_ice_covered(terminus + 1) {
            terminus += 1;
        }
        Some(terminus)
    }

    /// Glacier length along the flowline (m)
    pub fn length_m(&self) -> f64 {
        let head = (0..self.n_points()).find(|&i| self.is_ice_covered(i));
        match (head, self.terminus_index()) {
            (Some(head), Some(terminus)) => (terminus - head + 1) as f64 * self.dx,
            _ => 0.0,
        }
    }

    /// Ice-covered area (m²)
    pub fn area_m2(&self) -> f64 {
        (0..self.n_points())
            .filter(|&i| self.is_ice_covered(i))
            .map(|i| self.widths[i] * self.dx * self.dx)
            .sum()
    }

    /// Ice-covered area (km²)
    pub fn area_km2(&self) -> f64 {
        self.area_m2() / M2_IN_KM2
    }

    /// Ice volume (m³)
    ///
    /// Integrates every point, including ice thinner than
    /// [`ICE_FREE_THRESHOLD`], so that volume is exactly the quantity the
    /// continuity equation conserves.
    pub fn volume_m3(&self) -> f64 {
        let cell_area = self.dx * self.dx;
        self.widths
            .iter()
            .zip(self.thickness().iter())
            .map(|(w, h)| w * cell_area * h)
            .sum()
    }

    /// Ice volume (km³)
    pub fn volume_km3(&self) -> f64 {
        self.volume_m3() / M3_IN_KM3
    }

    /// Add a thickness change to every point, clamping at the bed
    ///
    /// Points whose thickness would become negative are set to the bed
    /// elevation. The return value is the ice volume (m³) that clamping had
    /// to add back, i.e. the part of the requested removal that could not
    /// be honored because there was no ice left to remove.
    ///
    /// # Errors
    ///
    /// Returns [`FlowlineError::InvalidGeometry`] if `delta_thickness` does
    /// not have one entry per grid point or holds a non-finite value. The
    /// flowline is untouched then.
    pub fn apply_delta(&mut self, delta_thickness: &[f64]) -> Result<f64> {
        if delta_thickness.len() != self.n_points() {
            return Err(FlowlineError::invalid_geometry(format!(
                "thickness change has {} entries, flowline has {} points",
                delta_thickness.len(),
                self.n_points()
            )));
        }

        if let Some(i) = delta_thickness.iter().position(|d| !d.is_finite()) {
            return Err(FlowlineError::invalid_geometry(format!(
                "non-finite thickness change {} at point {i}",
                delta_thickness[i]
            )));
        }

        let cell_area = self.dx * self.dx;
        let mut clamped_m3 = 0.0;
        for (i, &delta) in delta_thickness.iter().enumerate() {
            let new_thick = self.thickness_at(i) + delta;
            if new_thick < 0.0 {
                clamped_m3 += -new_thick * self.widths[i] * cell_area;
                self.surface_h[i] = self.bed_h[i];
            } else {
                self.surface_h[i] = self.bed_h[i] + new_thick;
            }
        }
        Ok(clamped_m3)
    }
}
