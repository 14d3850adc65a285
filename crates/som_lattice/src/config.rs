//! TrainingConfig - iteration budget, decay schedule and worker settings.

use crate::decay::DecayKind;
use crate::error::{Result, SomError};

/// Settings for a training run.
#[derive(Clone, Debug)]
pub struct TrainingConfig {
  /// Number of iterations before the session finishes on its own.
  pub max_iterations: u32,

  /// Learning rate at iteration 0.
  pub learning_rate: f32,

  /// Starting neighborhood radius in grid units.
  /// `None` uses half the lattice diagonal.
  pub initial_radius: Option<f32>,

  /// Which closed-form decay to use.
  pub decay: DecayKind,

  /// RNG seed for sampling. `None` seeds from the OS.
  pub seed: Option<u64>,

  /// Publish a lattice snapshot every N iterations. Pauses, stops and
  /// completion always publish.
  pub snapshot_interval: u32,
}

impl Default for TrainingConfig {
  fn default() -> Self {
    Self {
      max_iterations: 100_000,
      learning_rate: 0.5,
      initial_radius: None,
      decay: DecayKind::default(),
      seed: None,
      snapshot_interval: 64,
    }
  }
}

impl TrainingConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
    self.max_iterations = max_iterations;
    self
  }

  pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
    self.learning_rate = learning_rate;
    self
  }

  pub fn with_initial_radius(mut self, radius: f32) -> Self {
    self.initial_radius = Some(radius);
    self
  }

  pub fn with_decay(mut self, decay: DecayKind) -> Self {
    self.decay = decay;
    self
  }

  pub fn with_seed(mut self, seed: u64) -> Self {
    self.seed = Some(seed);
    self
  }

  pub fn with_snapshot_interval(mut self, interval: u32) -> Self {
    self.snapshot_interval = interval;
    self
  }

  pub fn validate(&self) -> Result<()> {
    if self.max_iterations == 0 {
      return Err(SomError::invalid_param(
        "max_iterations",
        self.max_iterations,
        "must be at least 1",
      ));
    }
    if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
      return Err(SomError::invalid_param(
        "learning_rate",
        self.learning_rate,
        "must be finite and positive",
      ));
    }
    if let Some(radius) = self.initial_radius {
      if !(radius.is_finite() && radius > 0.0) {
        return Err(SomError::invalid_param(
          "initial_radius",
          radius,
          "must be finite and positive",
        ));
      }
    }
    if self.snapshot_interval == 0 {
      return Err(SomError::invalid_param(
        "snapshot_interval",
        self.snapshot_interval,
        "must be at least 1",
      ));
    }
    Ok(())
  }
}
