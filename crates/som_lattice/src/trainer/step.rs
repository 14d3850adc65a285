//! Single-iteration SOM operations.
//!
//! ```text
//!  sample ──► find_bmu ──► update_neighborhood ──► wrap_borders
//!              (argmin)     (gaussian pull,          (copy col 0 → col w-1,
//!                            cyclic wrap)             row 0 → row h-1)
//! ```

use crate::lattice::Lattice;

/// Squared Euclidean distance.
#[inline]
pub fn distance_sq<const D: usize>(a: &[f32; D], b: &[f32; D]) -> f32 {
  let mut sum = 0.0;
  for k in 0..D {
    let d = a[k] - b[k];
    sum += d * d;
  }
  sum
}

/// Index and squared distance of the node nearest to `input`.
///
/// Exhaustive row-major scan; the first node wins ties.
pub fn nearest_node<const D: usize>(lattice: &Lattice<D>, input: &[f32; D]) -> (usize, f32) {
  let mut best = (0, f32::INFINITY);
  for (index, node) in lattice.nodes().iter().enumerate() {
    let dist = distance_sq(&node.weights, input);
    if dist < best.1 {
      best = (index, dist);
    }
  }
  best
}

/// Best matching unit for `input`.
#[inline]
pub fn find_bmu<const D: usize>(lattice: &Lattice<D>, input: &[f32; D]) -> usize {
  nearest_node(lattice, input).0
}

/// Map an offset grid coordinate back onto the lattice.
///
/// A cyclic axis wraps with period `len - 1` (the last row/column is a copy
/// of the first); otherwise out-of-range coordinates are dropped.
#[inline]
fn wrap_axis(coord: i64, len: usize, cyclic: bool) -> Option<usize> {
  if cyclic {
    Some(coord.rem_euclid(len as i64 - 1) as usize)
  } else if (0..len as i64).contains(&coord) {
    Some(coord as usize)
  } else {
    None
  }
}

/// Pull every node within `radius` grid units of the BMU toward `input`.
///
/// `w += rate * exp(-d² / 2r²) * (input - w)` where `d` is the grid offset
/// from the BMU. Offsets with `d² >= r²` are untouched.
pub fn update_neighborhood<const D: usize>(
  lattice: &mut Lattice<D>,
  bmu: usize,
  input: &[f32; D],
  rate: f32,
  radius: f32,
) {
  let radius_sq = radius * radius;
  if !(radius_sq > 0.0) {
    return;
  }

  let (width, height) = (lattice.width(), lattice.height());
  let topology = lattice.topology();
  let (bx, by) = lattice.coord_of(bmu);
  let reach = radius.ceil() as i64;
  let two_radius_sq = 2.0 * radius_sq;

  for dy in -reach..=reach {
    let Some(y) = wrap_axis(by as i64 + dy, height, topology.cyclic_y()) else {
      continue;
    };
    for dx in -reach..=reach {
      let dist_sq = (dx * dx + dy * dy) as f32;
      if dist_sq >= radius_sq {
        continue;
      }
      let Some(x) = wrap_axis(bx as i64 + dx, width, topology.cyclic_x()) else {
        continue;
      };

      let influence = (-dist_sq / two_radius_sq).exp();
      let step = rate * influence;
      let index = lattice.index_of(x, y);
      let weights = &mut lattice.nodes[index].weights;
      for k in 0..D {
        weights[k] += step * (input[k] - weights[k]);
      }
    }
  }
}

/// Duplicate the first column/row into the last for cyclic axes.
pub fn wrap_borders<const D: usize>(lattice: &mut Lattice<D>) {
  let (width, height) = (lattice.width(), lattice.height());
  let topology = lattice.topology();

  if topology.cyclic_x() && width > 1 {
    for y in 0..height {
      let src = lattice.index_of(0, y);
      let dst = lattice.index_of(width - 1, y);
      lattice.nodes[dst].weights = lattice.nodes[src].weights;
    }
  }

  if topology.cyclic_y() && height > 1 {
    for x in 0..width {
      let src = lattice.index_of(x, 0);
      let dst = lattice.index_of(x, height - 1);
      lattice.nodes[dst].weights = lattice.nodes[src].weights;
    }
  }
}

#[cfg(test)]
#[path = "step_test.rs"]
mod step_test;
