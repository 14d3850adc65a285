use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::lattice::{InitState, LatticeConfig};
use crate::types::{Bounds, Topology};

fn lattice(width: usize, height: usize, topology: Topology) -> Lattice<3> {
  let mut rng = StdRng::seed_from_u64(42);
  let config = LatticeConfig::new(width, height)
    .with_topology(topology)
    .with_init(InitState::Random);
  let bounds = Bounds::new([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]);
  Lattice::new(&config, &bounds, &mut rng).unwrap()
}

#[test]
fn test_distance_sq() {
  assert_eq!(distance_sq(&[0.0, 0.0, 0.0], &[1.0, 2.0, 2.0]), 9.0);
  assert_eq!(distance_sq(&[1.5], &[1.5]), 0.0);
}

#[test]
fn test_find_bmu_is_argmin() {
  let lattice = lattice(6, 5, Topology::CYCLIC_NONE);
  let input = [0.3, -0.2, 0.7];

  let bmu = find_bmu(&lattice, &input);
  let best = distance_sq(&lattice.nodes()[bmu].weights, &input);
  for node in lattice.nodes() {
    assert!(best <= distance_sq(&node.weights, &input));
  }

  let (index, dist) = nearest_node(&lattice, &input);
  assert_eq!(index, bmu);
  assert_eq!(dist, best);
}

#[test]
fn test_find_bmu_ties_pick_lowest_index() {
  let mut lattice = lattice(3, 3, Topology::CYCLIC_NONE);
  for node in &mut lattice.nodes {
    node.weights = [5.0, 5.0, 5.0];
  }
  // Two exact matches; the earlier one in row-major order must win.
  lattice.at_mut(2, 0).unwrap().weights = [0.0, 0.0, 0.0];
  lattice.at_mut(1, 2).unwrap().weights = [0.0, 0.0, 0.0];

  assert_eq!(find_bmu(&lattice, &[0.0, 0.0, 0.0]), 2);

  for node in &mut lattice.nodes {
    node.weights = [1.0, 1.0, 1.0];
  }
  assert_eq!(find_bmu(&lattice, &[0.0, 0.0, 0.0]), 0);
}

#[test]
fn test_update_moves_bmu_by_rate() {
  let mut lattice = lattice(5, 5, Topology::CYCLIC_NONE);
  let bmu = lattice.index_of(2, 2);
  let before = lattice.nodes()[bmu].weights;
  let input = [0.0, 0.0, 0.0];

  update_neighborhood(&mut lattice, bmu, &input, 0.5, 1.5);

  // Influence at the BMU itself is exp(0) = 1.
  let after = lattice.nodes()[bmu].weights;
  for k in 0..3 {
    assert!((after[k] - before[k] * 0.5).abs() < 1e-6);
  }
}

#[test]
fn test_update_respects_radius() {
  let mut lattice = lattice(7, 7, Topology::CYCLIC_NONE);
  let before = lattice.clone();
  let bmu = lattice.index_of(3, 3);

  update_neighborhood(&mut lattice, bmu, &[0.0, 0.0, 0.0], 0.5, 2.0);

  for y in 0..7 {
    for x in 0..7 {
      let (dx, dy) = (x as i32 - 3, y as i32 - 3);
      let changed = lattice.at(x, y).unwrap().weights != before.at(x, y).unwrap().weights;
      // Strictly inside the radius: d² < 4.
      assert_eq!(changed, dx * dx + dy * dy < 4, "node ({x}, {y})");
    }
  }
}

#[test]
fn test_update_falls_off_with_distance() {
  let mut lattice = lattice(9, 1, Topology::CYCLIC_NONE);
  for node in &mut lattice.nodes {
    node.weights = [1.0, 0.0, 0.0];
  }
  let bmu = lattice.index_of(4, 0);

  update_neighborhood(&mut lattice, bmu, &[0.0, 0.0, 0.0], 1.0, 3.0);

  let pulled = |x: usize| 1.0 - lattice.at(x, 0).unwrap().weights[0];
  assert!(pulled(4) > pulled(5));
  assert!(pulled(5) > pulled(6));
  assert!(pulled(6) > pulled(7));
  assert_eq!(pulled(3), pulled(5));
  assert_eq!(pulled(8), 0.0);
}

#[test]
fn test_zero_radius_is_noop() {
  let mut lattice = lattice(4, 4, Topology::CYCLIC_NONE);
  let before = lattice.clone();
  update_neighborhood(&mut lattice, 5, &[0.0, 0.0, 0.0], 0.5, 0.0);
  assert_eq!(lattice.nodes(), before.nodes());
}

#[test]
fn test_non_cyclic_edges_are_skipped() {
  let mut lattice = lattice(5, 5, Topology::CYCLIC_NONE);
  let before = lattice.clone();
  let bmu = lattice.index_of(0, 0);

  update_neighborhood(&mut lattice, bmu, &[0.0, 0.0, 0.0], 0.5, 1.5);

  // Nothing on the far side may be touched.
  for y in 0..5 {
    assert_eq!(lattice.at(4, y).unwrap(), before.at(4, y).unwrap());
    assert_eq!(lattice.at(3, y).unwrap(), before.at(3, y).unwrap());
  }
}

#[test]
fn test_cyclic_x_update_wraps_to_far_side() {
  let mut lattice = lattice(5, 5, Topology::CYCLIC_X);
  let before = lattice.clone();
  let bmu = lattice.index_of(0, 2);

  update_neighborhood(&mut lattice, bmu, &[0.0, 0.0, 0.0], 0.5, 1.5);

  // Offset -1 from column 0 wraps to column (len - 1) - 1 = 3.
  assert_ne!(lattice.at(3, 2).unwrap(), before.at(3, 2).unwrap());
  // The duplicated border column is only written by wrap_borders.
  assert_eq!(lattice.at(4, 2).unwrap(), before.at(4, 2).unwrap());
}

#[test]
fn test_cyclic_borders_match_after_wrap() {
  let topologies = [
    Topology::CYCLIC_X,
    Topology::CYCLIC_Y,
    Topology::CYCLIC_X | Topology::CYCLIC_Y,
  ];
  let inputs = [[0.9, -0.4, 0.1], [-0.8, 0.8, 0.0], [0.0, 0.2, -0.6]];

  for topology in topologies {
    let mut lattice = lattice(6, 4, topology);
    for (i, input) in inputs.iter().enumerate() {
      let bmu = find_bmu(&lattice, input);
      update_neighborhood(&mut lattice, bmu, input, 0.4, 2.5 - i as f32 * 0.5);
      wrap_borders(&mut lattice);

      if topology.cyclic_x() {
        for y in 0..4 {
          assert_eq!(lattice.at(0, y).unwrap().weights, lattice.at(5, y).unwrap().weights);
        }
      }
      if topology.cyclic_y() {
        for x in 0..6 {
          assert_eq!(lattice.at(x, 0).unwrap().weights, lattice.at(x, 3).unwrap().weights);
        }
      }
    }
  }
}

#[test]
fn test_wrap_borders_without_flags_is_noop() {
  let mut lattice = lattice(4, 4, Topology::CYCLIC_NONE);
  let before = lattice.clone();
  wrap_borders(&mut lattice);
  assert_eq!(lattice.nodes(), before.nodes());
}
