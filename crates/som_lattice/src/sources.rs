//! Analytic SDF point sources and voxel surface extraction.
//!
//! A [`PointSource`] is a signed distance function (negative inside) with a
//! finite region of interest. [`voxel_surface`] samples it on a regular grid
//! and keeps every cell whose corners straddle the zero level set, giving a
//! shell of cell centers that serves both as training data and as the point
//! set to parameterize.

use glam::Vec3;
use rayon::prelude::*;

use crate::error::{Result, SomError};
use crate::types::{Bounds, SamplePoint};

/// Signed distance field with a bounded region of interest.
pub trait PointSource: Send + Sync {
  /// Signed distance to the surface, negative inside.
  fn distance(&self, p: Vec3) -> f32;

  /// Box enclosing the part of the surface worth sampling.
  fn bounds(&self) -> Bounds<3>;
}

/// Sphere SDF.
#[derive(Clone, Debug, PartialEq)]
pub struct SphereSource {
  pub center: Vec3,
  pub radius: f32,
}

impl Default for SphereSource {
  fn default() -> Self {
    Self {
      center: Vec3::ZERO,
      radius: 1.0,
    }
  }
}

impl SphereSource {
  pub fn new(radius: f32) -> Self {
    Self {
      center: Vec3::ZERO,
      radius,
    }
  }

  pub fn with_center(mut self, center: Vec3) -> Self {
    self.center = center;
    self
  }
}

impl PointSource for SphereSource {
  fn distance(&self, p: Vec3) -> f32 {
    p.distance(self.center) - self.radius
  }

  fn bounds(&self) -> Bounds<3> {
    Bounds::new(
      (self.center - self.radius).to_array(),
      (self.center + self.radius).to_array(),
    )
  }
}

/// Torus around the Y axis.
///
/// SDF: `|(|p.xz| - major, p.y)| - minor`
#[derive(Clone, Debug, PartialEq)]
pub struct TorusSource {
  pub center: Vec3,
  /// Distance from the center to the tube center.
  pub major_radius: f32,
  /// Tube radius.
  pub minor_radius: f32,
}

impl Default for TorusSource {
  fn default() -> Self {
    Self {
      center: Vec3::ZERO,
      major_radius: 1.0,
      minor_radius: 0.35,
    }
  }
}

impl TorusSource {
  pub fn new(major_radius: f32, minor_radius: f32) -> Self {
    Self {
      center: Vec3::ZERO,
      major_radius,
      minor_radius,
    }
  }

  pub fn with_center(mut self, center: Vec3) -> Self {
    self.center = center;
    self
  }
}

impl PointSource for TorusSource {
  fn distance(&self, p: Vec3) -> f32 {
    let local = p - self.center;
    let ring = local.x.hypot(local.z) - self.major_radius;
    ring.hypot(local.y) - self.minor_radius
  }

  fn bounds(&self) -> Bounds<3> {
    let outer = self.major_radius + self.minor_radius;
    let half = Vec3::new(outer, self.minor_radius, outer);
    Bounds::new((self.center - half).to_array(), (self.center + half).to_array())
  }
}

/// Plane through `height` on Y, tilted around Z, clipped to a square patch.
///
/// SDF: `(y - height) * cos(angle) - x * sin(angle)`
#[derive(Clone, Debug, PartialEq)]
pub struct TiltedPlaneSource {
  pub height: f32,
  /// Tilt in radians.
  pub angle: f32,
  /// Half-size of the sampled patch on every axis.
  pub half_extent: f32,
}

impl Default for TiltedPlaneSource {
  fn default() -> Self {
    Self {
      height: 0.0,
      angle: std::f32::consts::FRAC_PI_4,
      half_extent: 1.0,
    }
  }
}

impl TiltedPlaneSource {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_height(mut self, height: f32) -> Self {
    self.height = height;
    self
  }

  pub fn with_angle_degrees(mut self, degrees: f32) -> Self {
    self.angle = degrees.to_radians();
    self
  }

  pub fn with_half_extent(mut self, half_extent: f32) -> Self {
    self.half_extent = half_extent;
    self
  }
}

impl PointSource for TiltedPlaneSource {
  fn distance(&self, p: Vec3) -> f32 {
    (p.y - self.height) * self.angle.cos() - p.x * self.angle.sin()
  }

  fn bounds(&self) -> Bounds<3> {
    let e = self.half_extent;
    Bounds::new([-e, self.height - e, -e], [e, self.height + e, e])
  }
}

/// Cell centers of every voxel crossed by the surface.
///
/// The grid covers `bounds` padded by one voxel so surfaces touching the
/// box are still bracketed. Output is ordered x-fastest, then y, then z.
pub fn voxel_surface<S: PointSource + ?Sized>(
  source: &S,
  bounds: &Bounds<3>,
  voxel_size: f32,
) -> Result<Vec<SamplePoint>> {
  if !(voxel_size.is_finite() && voxel_size > 0.0) {
    return Err(SomError::invalid_param(
      "voxel_size",
      voxel_size,
      "must be finite and positive",
    ));
  }
  if !bounds.is_valid() {
    return Err(SomError::invalid_param(
      "bounds",
      format!("{:?}..{:?}", bounds.min, bounds.max),
      "min must not exceed max",
    ));
  }

  let origin = bounds.min_vec3() - Vec3::splat(voxel_size);
  let span = bounds.max_vec3() - bounds.min_vec3() + Vec3::splat(2.0 * voxel_size);
  let cells = (span / voxel_size).ceil().as_uvec3().max(glam::UVec3::ONE);
  let [nx, ny, nz] = cells.to_array().map(|n| n as usize);
  let (cx, cy) = (nx + 1, ny + 1);

  // SDF at every grid corner, x-fastest.
  let corners: Vec<f32> = (0..cx * cy * (nz + 1))
    .into_par_iter()
    .map(|i| {
      let (x, y, z) = (i % cx, (i / cx) % cy, i / (cx * cy));
      source.distance(origin + Vec3::new(x as f32, y as f32, z as f32) * voxel_size)
    })
    .collect();

  let corner = |x: usize, y: usize, z: usize| corners[x + y * cx + z * cx * cy];

  let samples = (0..nx * ny * nz)
    .into_par_iter()
    .filter_map(|i| {
      let (x, y, z) = (i % nx, (i / nx) % ny, i / (nx * ny));
      let inside = corner(x, y, z) < 0.0;
      let crosses = (1..8).any(|c| {
        let s = corner(x + (c & 1), y + ((c >> 1) & 1), z + ((c >> 2) & 1));
        (s < 0.0) != inside
      });
      crosses.then(|| {
        let center = origin + (Vec3::new(x as f32, y as f32, z as f32) + 0.5) * voxel_size;
        SamplePoint::new(center)
      })
    })
    .collect();

  Ok(samples)
}
