//! Simulation driver recording checkpoints
//!
//! The driver owns a [`FlowlineModel`] and advances it through an ordered
//! list of target years. Each checkpoint copies the surface profile, so
//! later steps never alter a checkpoint that was already handed out.

use crate::core_types::error::Result;
use crate::grid::Flowline;
use crate::solver::FlowlineModel;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Glacier state at one target year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Model year of the checkpoint
    pub year: f64,
    /// Glacier length (m)
    pub length_m: f64,
    /// Ice-covered area (km²)
    pub area_km2: f64,
    /// Ice volume (km³)
    pub volume_km3: f64,
    /// Copy of the surface elevation (m)
    pub surface_h: Vec<f64>,
}

impl Checkpoint {
    /// Capture diagnostics and a surface copy of `flowline`
    pub fn capture(year: f64, flowline: &Flowline) -> Self {
        Self {
            year,
            length_m: flowline.length_m(),
            area_km2: flowline.area_km2(),
            volume_km3: flowline.volume_km3(),
            surface_h: flowline.surface_snapshot(),
        }
    }
}

/// Drives one flowline model through a sequence of target years
///
/// There is no rewind: to replay a run, build a fresh driver over a fresh
/// model.
pub struct SimulationDriver {
    model: Box<dyn FlowlineModel>,
    history: Vec<Checkpoint>,
}

impl SimulationDriver {
    /// Create a driver owning `model`
    pub fn new(model: impl FlowlineModel + 'static) -> Self {
        Self::from_boxed(Box::new(model))
    }

    /// Create a driver from an already boxed model
    pub fn from_boxed(model: Box<dyn FlowlineModel>) -> Self {
        debug!(
            "Simulation driver created at year {} ({} grid points)",
            model.yr(),
            model.flowline().n_points()
        );
        Self {
            model,
            history: Vec::new(),
        }
    }

    /// The driven model
    pub fn model(&self) -> &dyn FlowlineModel {
        self.model.as_ref()
    }

    /// Checkpoints produced so far, oldest first
    pub fn history(&self) -> &[Checkpoint] {
        &self.history
    }

    /// Give the model back, dropping the driver
    pub fn into_model(self) -> Box<dyn FlowlineModel> {
        self.model
    }

    /// Lazily advance to each target year, yielding one checkpoint per year
    ///
    /// Nothing runs until the returned iterator is polled. Targets at or
    /// before the current clock yield a checkpoint at the current year
    /// without stepping. After the first error the iterator yields that
    /// error and then ends; the model keeps its last valid state.
    ///
    /// Dropping the iterator between items leaves the model at the last
    /// yielded checkpoint, ready to continue or be discarded.
    pub fn advance_and_record<I>(&mut self, target_years: I) -> Checkpoints<'_, I::IntoIter>
    where
        I: IntoIterator<Item = f64>,
    {
        Checkpoints {
            driver: self,
            years: target_years.into_iter(),
            finished: false,
        }
    }

    /// Run every target year and collect the checkpoints
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the model.
    pub fn run_to_completion<I>(&mut self, target_years: I) -> Result<Vec<Checkpoint>>
    where
        I: IntoIterator<Item = f64>,
    {
        self.advance_and_record(target_years).collect()
    }
}

/// Lazy checkpoint sequence returned by [`SimulationDriver::advance_and_record`]
pub struct Checkpoints<'a, I> {
    driver: &'a mut SimulationDriver,
    years: I,
    finished: bool,
}

impl<I> Iterator for Checkpoints<'_, I>
where
    I: Iterator<Item = f64>,
{
    type Item = Result<Checkpoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let target = self.years.next()?;

        let model = &mut self.driver.model;
        if let Err(err) = model.run_until(target) {
            self.finished = true;
            return Some(Err(err));
        }

        let checkpoint = Checkpoint::capture(model.yr(), model.flowline());
        self.driver.history.push(checkpoint.clone());
        Some(Ok(checkpoint))
    }
}
