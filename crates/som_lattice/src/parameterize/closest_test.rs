use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

const EPS: f32 = 1e-5;

fn unit_triangle() -> Triangle {
  Triangle::new(
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
  )
}

fn assert_weights(hit: &SurfaceHit, expected: Vec3) {
  assert!(
    hit.weights.abs_diff_eq(expected, EPS),
    "weights {:?} != {:?}",
    hit.weights,
    expected
  );
}

#[test]
fn test_vertex_query_is_one_hot() {
  let tri = unit_triangle();
  for (i, corner) in tri.corners().into_iter().enumerate() {
    let hit = closest_point(&tri, corner);
    let mut expected = Vec3::ZERO;
    expected[i] = 1.0;
    assert_weights(&hit, expected);
    assert!(hit.distance < EPS);
  }
}

#[test]
fn test_edge_midpoint() {
  let tri = unit_triangle();
  let hit = closest_point(&tri, Vec3::new(0.5, 0.0, 0.0));
  assert_weights(&hit, Vec3::new(0.5, 0.5, 0.0));
  assert!(hit.distance < EPS);
}

#[test]
fn test_interior_projection() {
  let tri = unit_triangle();
  let hit = closest_point(&tri, Vec3::new(0.25, 0.25, 5.0));

  assert_eq!(hit.kind, HitKind::Face);
  assert!(hit.point.abs_diff_eq(Vec3::new(0.25, 0.25, 0.0), EPS));
  assert!((hit.distance - 5.0).abs() < EPS);
  assert_weights(&hit, Vec3::new(0.5, 0.25, 0.25));
}

#[test]
fn test_winding_does_not_matter() {
  let tri = unit_triangle();
  let flipped = Triangle::new(tri.a, tri.c, tri.b);
  let p = Vec3::new(0.2, 0.3, -2.0);

  let hit = closest_point(&tri, p);
  let flipped_hit = closest_point(&flipped, p);
  assert_eq!(flipped_hit.kind, HitKind::Face);
  assert!(hit.point.abs_diff_eq(flipped_hit.point, EPS));
  assert!((hit.weights.y - flipped_hit.weights.z).abs() < EPS);
  assert!((hit.weights.z - flipped_hit.weights.y).abs() < EPS);
}

#[test]
fn test_outside_near_edge() {
  let tri = unit_triangle();
  let hit = closest_point(&tri, Vec3::new(0.5, -1.0, 0.0));

  assert_eq!(hit.kind, HitKind::Edge);
  assert!(hit.point.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), EPS));
  assert!((hit.distance - 1.0).abs() < EPS);
  assert_weights(&hit, Vec3::new(0.5, 0.5, 0.0));
}

#[test]
fn test_edge_weights_follow_parameter() {
  let tri = unit_triangle();
  // Beyond edge BC, a quarter of the way from B to C.
  let hit = closest_point(&tri, Vec3::new(1.75, 1.25, 0.0));

  assert_eq!(hit.kind, HitKind::Edge);
  assert!(hit.point.abs_diff_eq(Vec3::new(0.75, 0.25, 0.0), EPS));
  assert_weights(&hit, Vec3::new(0.0, 0.75, 0.25));
}

#[test]
fn test_outside_corner_snaps_to_vertex() {
  let tri = unit_triangle();
  // Edge BC's projection is interior here, but corner A is closer.
  let hit = closest_point(&tri, Vec3::new(-1.0, -1.0, 0.0));

  assert_eq!(hit.kind, HitKind::Vertex);
  assert_eq!(hit.point, tri.a);
  assert!((hit.distance - 2.0f32.sqrt()).abs() < EPS);
  assert_weights(&hit, Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_collapsed_triangle_falls_back_to_vertex() {
  let point = Vec3::new(1.0, 1.0, 1.0);
  let tri = Triangle::new(point, point, point);
  assert_eq!(tri.normal(), Vec3::ZERO);

  let hit = closest_point(&tri, Vec3::ZERO);
  assert_eq!(hit.kind, HitKind::Vertex);
  assert_weights(&hit, Vec3::new(1.0, 0.0, 0.0));
  assert!((hit.distance - 3.0f32.sqrt()).abs() < EPS);
}

#[test]
fn test_collinear_triangle_uses_edges() {
  let tri = Triangle::new(
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(2.0, 0.0, 0.0),
  );
  let hit = closest_point(&tri, Vec3::new(0.5, 1.0, 0.0));

  // AB and CA tie at distance 1; the first edge wins.
  assert_eq!(hit.kind, HitKind::Edge);
  assert_weights(&hit, Vec3::new(0.5, 0.5, 0.0));
}

#[test]
fn test_weights_reconstruct_point() {
  let mut rng = StdRng::seed_from_u64(21);
  let tri = Triangle::new(
    Vec3::new(0.1, -0.3, 0.2),
    Vec3::new(1.2, 0.4, -0.1),
    Vec3::new(-0.2, 0.9, 0.6),
  );

  for _ in 0..500 {
    let p = Vec3::new(
      rng.random_range(-2.0..2.0),
      rng.random_range(-2.0..2.0),
      rng.random_range(-2.0..2.0),
    );
    let hit = closest_point(&tri, p);

    let sum = hit.weights.x + hit.weights.y + hit.weights.z;
    assert!((sum - 1.0).abs() < 1e-4, "weights sum {sum}");
    assert!(hit.weights.min_element() > -1e-4);

    let rebuilt = tri.a * hit.weights.x + tri.b * hit.weights.y + tri.c * hit.weights.z;
    assert!(rebuilt.abs_diff_eq(hit.point, 1e-4), "{rebuilt:?} vs {:?}", hit.point);
    assert!((p.distance(hit.point) - hit.distance).abs() < 1e-4);

    // Nothing on the triangle is closer than any corner.
    for corner in tri.corners() {
      assert!(hit.distance <= p.distance(corner) + 1e-5);
    }
  }
}
