//! Core data types shared by the lattice, trainer and parameterizer.

use std::ops::{BitOr, BitOrAssign};

use glam::{Vec2, Vec3};

/// Lattice border wrapping flags.
///
/// A cyclic axis treats its last row/column as a duplicate of the first,
/// folding the lattice into a cylinder (one flag) or torus (both flags).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Topology(u8);

impl Topology {
  /// Plain sheet, no wrapping.
  pub const CYCLIC_NONE: Topology = Topology(0);
  /// Column `width - 1` mirrors column 0.
  pub const CYCLIC_X: Topology = Topology(1 << 0);
  /// Row `height - 1` mirrors row 0.
  pub const CYCLIC_Y: Topology = Topology(1 << 1);

  /// Raw bit mask.
  #[inline]
  pub fn bits(self) -> u8 {
    self.0
  }

  /// True if every flag in `other` is set.
  #[inline]
  pub fn contains(self, other: Topology) -> bool {
    self.0 & other.0 == other.0
  }

  #[inline]
  pub fn cyclic_x(self) -> bool {
    self.contains(Topology::CYCLIC_X)
  }

  #[inline]
  pub fn cyclic_y(self) -> bool {
    self.contains(Topology::CYCLIC_Y)
  }
}

impl BitOr for Topology {
  type Output = Topology;

  fn bitor(self, rhs: Topology) -> Topology {
    Topology(self.0 | rhs.0)
  }
}

impl BitOrAssign for Topology {
  fn bitor_assign(&mut self, rhs: Topology) {
    self.0 |= rhs.0;
  }
}

/// Axis-aligned bounding box in the lattice input space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds<const D: usize> {
  pub min: [f32; D],
  pub max: [f32; D],
}

impl<const D: usize> Bounds<D> {
  /// Create bounds with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; D],
      max: [f32::NEG_INFINITY; D],
    }
  }

  /// Create bounds from min/max corners.
  pub fn new(min: [f32; D], max: [f32; D]) -> Self {
    Self { min, max }
  }

  /// Expand bounds to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: &[f32; D]) {
    for i in 0..D {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Check if bounds are valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    (0..D).all(|i| self.min[i] <= self.max[i])
  }

  /// Length of the box along `axis`.
  #[inline]
  pub fn extent(&self, axis: usize) -> f32 {
    self.max[axis] - self.min[axis]
  }
}

impl<const D: usize> Default for Bounds<D> {
  fn default() -> Self {
    Self::empty()
  }
}

impl Bounds<3> {
  pub fn min_vec3(&self) -> Vec3 {
    Vec3::from_array(self.min)
  }

  pub fn max_vec3(&self) -> Vec3 {
    Vec3::from_array(self.max)
  }
}

/// Triangulated lattice surface: one vertex per node, shared by up to six
/// triangles.
#[derive(Clone, Debug, Default)]
pub struct LatticeMesh {
  /// Node positions (the trained weights).
  pub positions: Vec<Vec3>,

  /// Node UVs, parallel to `positions`.
  pub uvs: Vec<Vec2>,

  /// Triangle indices (3 indices per triangle).
  pub indices: Vec<u32>,
}

impl LatticeMesh {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns true if no triangles were generated.
  pub fn is_empty(&self) -> bool {
    self.indices.is_empty()
  }

  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Vertex indices of triangle `i`.
  #[inline]
  pub fn triangle(&self, i: usize) -> [usize; 3] {
    let base = i * 3;
    [
      self.indices[base] as usize,
      self.indices[base + 1] as usize,
      self.indices[base + 2] as usize,
    ]
  }
}

/// A point to be parameterized, e.g. a surface voxel center.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SamplePoint {
  pub pos: Vec3,
  /// Assigned texture coordinate, zero until parameterized.
  pub uv: Vec2,
}

impl SamplePoint {
  pub fn new(pos: Vec3) -> Self {
    Self { pos, uv: Vec2::ZERO }
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
