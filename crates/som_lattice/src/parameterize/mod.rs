//! UV parameterization against a triangulated lattice.
//!
//! Each query point is matched to its closest point on the mesh surface
//! (exhaustive scan over every triangle), and the hit's barycentric weights
//! blend the triangle's vertex UVs.
//!
//! ```text
//!   p ──► for each triangle ──► closest_point ──► keep min distance
//!                                (face/edge/vertex)        │
//!                                                          ▼
//!                                   uv = wa*uv_a + wb*uv_b + wc*uv_c
//! ```

pub mod closest;
pub mod job;

use glam::{Vec2, Vec3};
use rayon::prelude::*;

pub use closest::{closest_point, HitKind, SurfaceHit, Triangle};
pub use job::{parameterize, JobProgress, ParameterizeJob, ParameterizeResult};

use crate::types::{LatticeMesh, SamplePoint};

/// Closest hit on a mesh, with the triangle it came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshHit {
  pub triangle: usize,
  pub hit: SurfaceHit,
}

impl LatticeMesh {
  /// Corner positions of triangle `i`.
  #[inline]
  pub fn triangle_positions(&self, i: usize) -> Triangle {
    let [a, b, c] = self.triangle(i);
    Triangle::new(self.positions[a], self.positions[b], self.positions[c])
  }
}

/// Globally closest surface hit. `None` for a mesh without triangles.
///
/// Ties keep the earliest triangle.
pub fn closest_hit(mesh: &LatticeMesh, p: Vec3) -> Option<MeshHit> {
  let mut best: Option<MeshHit> = None;
  for triangle in 0..mesh.triangle_count() {
    let hit = closest_point(&mesh.triangle_positions(triangle), p);
    match best {
      Some(current) if current.hit.distance <= hit.distance => {}
      _ => best = Some(MeshHit { triangle, hit }),
    }
  }
  best
}

/// Interpolated UV at the closest surface point to `p`.
///
/// A mesh without triangles maps every point to `Vec2::ZERO`.
pub fn parameterize_point(mesh: &LatticeMesh, p: Vec3) -> Vec2 {
  let Some(MeshHit { triangle, hit }) = closest_hit(mesh, p) else {
    return Vec2::ZERO;
  };
  let [a, b, c] = mesh.triangle(triangle);
  mesh.uvs[a] * hit.weights.x + mesh.uvs[b] * hit.weights.y + mesh.uvs[c] * hit.weights.z
}

/// UV for every point, computed in parallel. Output order matches input.
#[tracing::instrument(skip_all, name = "parameterize::points", fields(points = points.len()))]
pub fn parameterize_points(mesh: &LatticeMesh, points: &[Vec3]) -> Vec<Vec2> {
  points.par_iter().map(|&p| parameterize_point(mesh, p)).collect()
}

/// Fill `uv` on every sample in place.
#[tracing::instrument(skip_all, name = "parameterize::assign_uvs", fields(samples = samples.len()))]
pub fn assign_uvs(mesh: &LatticeMesh, samples: &mut [SamplePoint]) {
  samples.par_iter_mut().for_each(|sample| {
    sample.uv = parameterize_point(mesh, sample.pos);
  });
}
