//! Immutable training point cloud with uniform random sampling.

use rand::Rng;

use crate::error::{Result, SomError};
use crate::types::{Bounds, SamplePoint};

/// Input points the lattice is fitted to.
#[derive(Clone, Debug)]
pub struct Dataset<const D: usize> {
  points: Vec<[f32; D]>,
}

impl<const D: usize> Dataset<D> {
  /// Wrap a point list. Fails on an empty list since sampling would be
  /// undefined.
  pub fn new(points: Vec<[f32; D]>) -> Result<Self> {
    if points.is_empty() {
      return Err(SomError::EmptyDataset);
    }
    Ok(Self { points })
  }

  #[inline]
  pub fn points(&self) -> &[[f32; D]] {
    &self.points
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.points.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// One uniformly chosen point.
  #[inline]
  pub fn sample<R: Rng>(&self, rng: &mut R) -> &[f32; D] {
    &self.points[rng.random_range(0..self.points.len())]
  }

  /// Tight bounds around every point.
  pub fn bounds(&self) -> Bounds<D> {
    let mut bounds = Bounds::empty();
    for point in &self.points {
      bounds.encapsulate(point);
    }
    bounds
  }
}

impl Dataset<3> {
  /// Build a dataset from sample point positions.
  pub fn from_samples(samples: &[SamplePoint]) -> Result<Self> {
    Self::new(samples.iter().map(|s| s.pos.to_array()).collect())
  }
}
