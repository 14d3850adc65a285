//! Training metrics: iteration timing and quantization error.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use som_lattice::metrics::{TrainingMetrics, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // Read from a published snapshot:
//! let snapshot = session.snapshot();
//! println!("avg error {:.4}", snapshot.metrics.avg_quantization_error());
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Rolling window for storing recent values.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Push a new value, evicting the oldest if at capacity.
  pub fn push(&mut self, value: T) {
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
  }

  /// Iterate over values (oldest to newest).
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buffer.iter()
  }

  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }
}

impl RollingWindow<u64> {
  /// Mean of all values, 0 when empty.
  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      0.0
    } else {
      self.buffer.iter().sum::<u64>() as f64 / self.buffer.len() as f64
    }
  }

  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = *self.buffer.iter().min()?;
    let max = *self.buffer.iter().max()?;
    Some((min, max))
  }
}

impl RollingWindow<f32> {
  /// Mean of all values, 0 when empty.
  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      0.0
    } else {
      self.buffer.iter().map(|&v| v as f64).sum::<f64>() / self.buffer.len() as f64
    }
  }
}

/// Window size for the rolling statistics.
pub const METRICS_WINDOW: usize = 256;

/// Per-session training statistics, updated by the worker.
#[derive(Debug, Clone)]
pub struct TrainingMetrics {
  /// Rolling window of iteration times in microseconds.
  pub iteration_timings: RollingWindow<u64>,
  /// Rolling window of squared BMU distances (quantization error).
  pub quantization_errors: RollingWindow<f32>,
  /// Last iteration time in microseconds.
  pub last_iteration_us: u64,
  /// Iterations recorded while collection was enabled.
  pub recorded_iterations: u64,
}

impl Default for TrainingMetrics {
  fn default() -> Self {
    Self {
      iteration_timings: RollingWindow::new(METRICS_WINDOW),
      quantization_errors: RollingWindow::new(METRICS_WINDOW),
      last_iteration_us: 0,
      recorded_iterations: 0,
    }
  }
}

impl TrainingMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record one iteration's timing and BMU distance.
  pub fn record_iteration(&mut self, timing_us: u64, bmu_distance_sq: f32) {
    if !is_enabled() {
      return;
    }
    self.iteration_timings.push(timing_us);
    self.quantization_errors.push(bmu_distance_sq);
    self.last_iteration_us = timing_us;
    self.recorded_iterations += 1;
  }

  pub fn avg_iteration_us(&self) -> f64 {
    self.iteration_timings.average()
  }

  pub fn avg_quantization_error(&self) -> f64 {
    self.quantization_errors.average()
  }

  /// Reset all windows. `recorded_iterations` is cumulative and kept.
  pub fn reset(&mut self) {
    self.iteration_timings.clear();
    self.quantization_errors.clear();
    self.last_iteration_us = 0;
  }
}
