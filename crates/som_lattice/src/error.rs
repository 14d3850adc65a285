//! Error types for lattice construction, training sessions and batch jobs.

use thiserror::Error;

/// Result alias using [`SomError`].
pub type Result<T> = std::result::Result<T, SomError>;

#[derive(Error, Debug)]
pub enum SomError {
  /// A configuration value is outside its valid range.
  #[error("invalid parameter: {name} = {value} ({reason})")]
  InvalidParameter {
    name: &'static str,
    value: String,
    reason: &'static str,
  },

  /// Grid coordinate outside the lattice.
  #[error("lattice coordinate ({x}, {y}) out of bounds for {width}x{height} lattice")]
  OutOfBounds {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
  },

  /// Training requires at least one input point.
  #[error("dataset has no points")]
  EmptyDataset,

  /// The OS refused to start the worker thread.
  #[error("failed to spawn training worker: {0}")]
  WorkerSpawn(#[from] std::io::Error),

  /// The worker thread panicked before it could be joined.
  #[error("training worker panicked")]
  WorkerPanicked,

  /// A background job dropped its result channel without sending.
  #[error("background job ended without producing a result")]
  JobDisconnected,
}

impl SomError {
  pub fn invalid_param<T: std::fmt::Display>(
    name: &'static str,
    value: T,
    reason: &'static str,
  ) -> Self {
    SomError::InvalidParameter {
      name,
      value: value.to_string(),
      reason,
    }
  }
}
