//! Closest point on a triangle with barycentric weights.
//!
//! Three tiers, tried in order:
//!
//! 1. **Face** - the plane projection lies inside the triangle.
//! 2. **Edge** - the projection onto an edge line falls strictly inside the
//!    segment; the nearest such edge is compared against the nearest vertex.
//! 3. **Vertex** - nearest corner. Always available, so degenerate
//!    triangles (zero area, zero-length edges) still produce a hit.

use glam::Vec3;

/// Which tier produced a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitKind {
  Face,
  Edge,
  Vertex,
}

/// Triangle corners in mesh order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
  pub a: Vec3,
  pub b: Vec3,
  pub c: Vec3,
}

impl Triangle {
  pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
    Self { a, b, c }
  }

  #[inline]
  pub fn corners(&self) -> [Vec3; 3] {
    [self.a, self.b, self.c]
  }

  /// Unit normal, or zero for a degenerate triangle.
  #[inline]
  pub fn normal(&self) -> Vec3 {
    (self.b - self.a).cross(self.c - self.a).normalize_or_zero()
  }
}

/// Closest surface point to a query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
  pub kind: HitKind,
  pub point: Vec3,
  /// Euclidean distance from the query to `point`.
  pub distance: f32,
  /// Barycentric weights for `(a, b, c)`, summing to 1.
  pub weights: Vec3,
}

/// Edges as `(start, end)` corner indices.
const EDGES: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 0)];

/// Closest point on `tri` to `p`.
pub fn closest_point(tri: &Triangle, p: Vec3) -> SurfaceHit {
  if let Some(hit) = face_hit(tri, p) {
    return hit;
  }

  let vertex = vertex_hit(tri, p);
  match edge_hit(tri, p) {
    Some(edge) if edge.distance <= vertex.distance => edge,
    _ => vertex,
  }
}

/// Plane projection if it lands inside (or on the border of) the triangle.
fn face_hit(tri: &Triangle, p: Vec3) -> Option<SurfaceHit> {
  let normal = tri.normal();
  if normal == Vec3::ZERO {
    return None;
  }

  let Triangle { a, b, c } = *tri;
  let projected = p - normal * (p - a).dot(normal);

  // Twice the signed areas of the sub-triangles opposite a, b and c. The
  // normal comes from the same winding, so inside means all non-negative.
  let area_a = (c - b).cross(projected - b).dot(normal);
  let area_b = (a - c).cross(projected - c).dot(normal);
  let area_c = (b - a).cross(projected - a).dot(normal);
  if area_a < 0.0 || area_b < 0.0 || area_c < 0.0 {
    return None;
  }

  let area = (b - a).cross(c - a).dot(normal);
  let u = area_a / area;
  let v = area_b / area;

  Some(SurfaceHit {
    kind: HitKind::Face,
    point: projected,
    distance: p.distance(projected),
    weights: Vec3::new(u, v, 1.0 - u - v),
  })
}

/// Nearest edge whose unclamped projection parameter is in `(0, 1)`.
fn edge_hit(tri: &Triangle, p: Vec3) -> Option<SurfaceHit> {
  let corners = tri.corners();
  let mut best: Option<SurfaceHit> = None;

  for (i, j) in EDGES {
    let (start, end) = (corners[i], corners[j]);
    let edge = end - start;
    let len_sq = edge.length_squared();
    if len_sq == 0.0 {
      continue;
    }

    let s = (p - start).dot(edge) / len_sq;
    if !(s > 0.0 && s < 1.0) {
      continue;
    }

    let point = start + edge * s;
    let distance = p.distance(point);
    if best.is_some_and(|hit| hit.distance <= distance) {
      continue;
    }

    let mut weights = Vec3::ZERO;
    weights[i] = 1.0 - s;
    weights[j] = s;
    best = Some(SurfaceHit {
      kind: HitKind::Edge,
      point,
      distance,
      weights,
    });
  }

  best
}

/// Nearest corner, first corner on ties.
fn vertex_hit(tri: &Triangle, p: Vec3) -> SurfaceHit {
  let corners = tri.corners();
  let mut nearest = 0;
  let mut nearest_sq = p.distance_squared(corners[0]);
  for (i, corner) in corners.iter().enumerate().skip(1) {
    let dist_sq = p.distance_squared(*corner);
    if dist_sq < nearest_sq {
      nearest = i;
      nearest_sq = dist_sq;
    }
  }

  let mut weights = Vec3::ZERO;
  weights[nearest] = 1.0;
  SurfaceHit {
    kind: HitKind::Vertex,
    point: corners[nearest],
    distance: nearest_sq.sqrt(),
    weights,
  }
}

#[cfg(test)]
#[path = "closest_test.rs"]
mod closest_test;
