//! SOM training: the per-iteration algorithm and the background session that
//! drives it.
//!
//! - [`step`] - stateless BMU search, neighborhood update and border wrap
//! - [`Trainer`] - owns the lattice and advances it one iteration at a time
//! - [`session`] - runs a [`Trainer`] on a worker thread with pause/resume/stop

pub mod session;
pub mod step;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::TrainingConfig;
use crate::dataset::Dataset;
use crate::decay::{default_initial_radius, DecayParams, DecaySchedule};
use crate::error::Result;
use crate::lattice::Lattice;

pub use session::{SessionId, SessionMonitor, SessionState, Snapshot, TrainingSession};
pub use step::{find_bmu, nearest_node, update_neighborhood, wrap_borders};

/// Outcome of one training iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepResult {
  /// Iteration index the step ran at.
  pub iteration: u32,
  /// Row-major index of the best matching unit.
  pub bmu: usize,
  /// Squared distance from the sample to the BMU before the update.
  pub bmu_distance_sq: f32,
  pub learning_rate: f32,
  pub radius: f32,
}

/// Single-threaded SOM trainer.
pub struct Trainer<const D: usize> {
  lattice: Lattice<D>,
  dataset: Dataset<D>,
  schedule: Arc<dyn DecaySchedule>,
  params: DecayParams,
  rng: StdRng,
  t: u32,
}

impl<const D: usize> Trainer<D> {
  /// Build a trainer using the schedule named by `config.decay`.
  pub fn new(lattice: Lattice<D>, dataset: Dataset<D>, config: &TrainingConfig) -> Result<Self> {
    Self::with_schedule(lattice, dataset, config, config.decay.schedule())
  }

  /// Build a trainer with a caller-supplied decay schedule.
  pub fn with_schedule(
    lattice: Lattice<D>,
    dataset: Dataset<D>,
    config: &TrainingConfig,
    schedule: Arc<dyn DecaySchedule>,
  ) -> Result<Self> {
    config.validate()?;

    let params = DecayParams {
      tmax: config.max_iterations,
      initial_rate: config.learning_rate,
      initial_radius: config
        .initial_radius
        .unwrap_or_else(|| default_initial_radius(lattice.width(), lattice.height())),
    };
    let rng = match config.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_os_rng(),
    };

    Ok(Self {
      lattice,
      dataset,
      schedule,
      params,
      rng,
      t: 0,
    })
  }

  /// Run one iteration. Returns `None` once `tmax` is reached.
  pub fn step(&mut self) -> Option<StepResult> {
    if self.is_finished() {
      return None;
    }

    let t = self.t;
    let input = *self.dataset.sample(&mut self.rng);
    let radius = self.schedule.neighborhood_radius(&self.params, t);
    let rate = self.schedule.learning_rate(&self.params, t);

    let (bmu, bmu_distance_sq) = nearest_node(&self.lattice, &input);
    update_neighborhood(&mut self.lattice, bmu, &input, rate, radius);
    wrap_borders(&mut self.lattice);

    self.t += 1;

    Some(StepResult {
      iteration: t,
      bmu,
      bmu_distance_sq,
      learning_rate: rate,
      radius,
    })
  }

  /// Step until finished. Returns the number of iterations run.
  pub fn run(&mut self) -> u32 {
    let start = self.t;
    while self.step().is_some() {}
    self.t - start
  }

  #[inline]
  pub fn is_finished(&self) -> bool {
    self.t >= self.params.tmax
  }

  /// Iterations completed so far.
  #[inline]
  pub fn iteration(&self) -> u32 {
    self.t
  }

  /// Learning rate for the next iteration.
  pub fn learning_rate(&self) -> f32 {
    self.schedule.learning_rate(&self.params, self.t)
  }

  /// Neighborhood radius for the next iteration.
  pub fn neighborhood_radius(&self) -> f32 {
    self.schedule.neighborhood_radius(&self.params, self.t)
  }

  #[inline]
  pub fn params(&self) -> &DecayParams {
    &self.params
  }

  pub(crate) fn schedule(&self) -> &Arc<dyn DecaySchedule> {
    &self.schedule
  }

  #[inline]
  pub fn lattice(&self) -> &Lattice<D> {
    &self.lattice
  }

  #[inline]
  pub fn dataset(&self) -> &Dataset<D> {
    &self.dataset
  }

  pub fn into_lattice(self) -> Lattice<D> {
    self.lattice
  }
}
