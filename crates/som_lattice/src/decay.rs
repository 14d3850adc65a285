//! Learning-rate and neighborhood-radius schedules.
//!
//! A schedule is a pure function of the iteration index. The trainer calls it
//! fresh every iteration, so swapping schedules never touches the loop.
//!
//! Two closed forms are provided:
//!
//! | Schedule            | rate(t)                     | radius(t)                                  |
//! |---------------------|-----------------------------|--------------------------------------------|
//! | [`ReferenceDecay`]  | `r0 * exp(-t / (T - t))`    | `R0 * exp(-t * ln(max(R0, 1)) / (T - t))`  |
//! | [`TimeConstantDecay`] | `r0 * exp(-t / T)`        | `R0 * exp(-t / λ)`, `λ = T / ln(max(R0, e))` |
//!
//! `ReferenceDecay` reaches zero exactly at `t = T`; `TimeConstantDecay` ends at
//! `r0 / e` and `R0 / max(R0, e)`.

use std::sync::Arc;

/// Inputs every schedule is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecayParams {
  /// Final iteration (exclusive).
  pub tmax: u32,
  /// Learning rate at `t = 0`.
  pub initial_rate: f32,
  /// Neighborhood radius at `t = 0`, in lattice grid units.
  pub initial_radius: f32,
}

/// Pluggable decay strategy.
pub trait DecaySchedule: Send + Sync {
  fn learning_rate(&self, params: &DecayParams, t: u32) -> f32;

  fn neighborhood_radius(&self, params: &DecayParams, t: u32) -> f32;
}

/// Decay that collapses to zero as `t` approaches `tmax`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceDecay;

impl DecaySchedule for ReferenceDecay {
  #[inline]
  fn learning_rate(&self, params: &DecayParams, t: u32) -> f32 {
    if t >= params.tmax {
      return 0.0;
    }
    let t = t as f32;
    params.initial_rate * (-t / (params.tmax as f32 - t)).exp()
  }

  #[inline]
  fn neighborhood_radius(&self, params: &DecayParams, t: u32) -> f32 {
    if t >= params.tmax {
      return 0.0;
    }
    let t = t as f32;
    // ln(R0) goes negative below 1, which would make the radius grow.
    let log_radius = params.initial_radius.max(1.0).ln();
    params.initial_radius * (-t * log_radius / (params.tmax as f32 - t)).exp()
  }
}

/// Classic Kohonen exponential decay with a fixed time constant.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeConstantDecay;

impl DecaySchedule for TimeConstantDecay {
  #[inline]
  fn learning_rate(&self, params: &DecayParams, t: u32) -> f32 {
    let t = t.min(params.tmax) as f32;
    params.initial_rate * (-t / params.tmax.max(1) as f32).exp()
  }

  #[inline]
  fn neighborhood_radius(&self, params: &DecayParams, t: u32) -> f32 {
    let t = t.min(params.tmax) as f32;
    let lambda = params.tmax.max(1) as f32 / params.initial_radius.max(std::f32::consts::E).ln();
    params.initial_radius * (-t / lambda).exp()
  }
}

/// Named schedule selection for configuration files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecayKind {
  #[default]
  Reference,
  TimeConstant,
}

impl DecayKind {
  /// Shared schedule for this kind.
  pub fn schedule(self) -> Arc<dyn DecaySchedule> {
    match self {
      DecayKind::Reference => Arc::new(ReferenceDecay),
      DecayKind::TimeConstant => Arc::new(TimeConstantDecay),
    }
  }
}

/// Half the lattice diagonal, the default starting radius.
#[inline]
pub fn default_initial_radius(width: usize, height: usize) -> f32 {
  let (w, h) = (width as f32, height as f32);
  0.5 * (w * w + h * h).sqrt()
}

#[cfg(test)]
#[path = "decay_test.rs"]
mod decay_test;
