//! Fixed-size 2D lattice of nodes living in a `D`-dimensional input space.
//!
//! Nodes are stored row-major (`index = y * width + x`). A node's grid
//! coordinate and UV are fixed at creation; only its weight vector changes
//! during training.
//!
//! ```text
//!   y
//!   ▲  (0,2)──(1,2)──(2,2)      uv = (x / (width-1), y / (height-1))
//!   │    │  ╲   │  ╲   │
//!   │  (0,1)──(1,1)──(2,1)      each 2x2 block → two triangles split
//!   │    │  ╲   │  ╲   │        along the (x,y)-(x+1,y+1) diagonal
//!   │  (0,0)──(1,0)──(2,0)
//!   └──────────────────────► x
//! ```

use glam::{IVec2, Vec2, Vec3};
use rand::Rng;

use crate::error::{Result, SomError};
use crate::types::{Bounds, LatticeMesh, Topology};

/// Weight initialization strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InitState {
  /// Regular sheet spanning the first two axes, pinned to the upper bound of
  /// the remaining axes.
  #[default]
  Planar,
  /// Every weight component uniform inside the bounds.
  Random,
}

/// One lattice node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node<const D: usize> {
  /// Position in input space.
  pub weights: [f32; D],
  /// Fixed grid coordinate (column, row).
  pub coord: IVec2,
  /// Texture coordinate derived from the grid coordinate.
  pub uv: Vec2,
}

/// Lattice shape and initialization settings.
#[derive(Clone, Debug)]
pub struct LatticeConfig {
  pub width: usize,
  pub height: usize,
  pub topology: Topology,
  pub init: InitState,
}

impl Default for LatticeConfig {
  fn default() -> Self {
    Self {
      width: 32,
      height: 32,
      topology: Topology::CYCLIC_NONE,
      init: InitState::Planar,
    }
  }
}

impl LatticeConfig {
  pub fn new(width: usize, height: usize) -> Self {
    Self {
      width,
      height,
      ..Self::default()
    }
  }

  pub fn with_topology(mut self, topology: Topology) -> Self {
    self.topology = topology;
    self
  }

  pub fn with_init(mut self, init: InitState) -> Self {
    self.init = init;
    self
  }

  /// Check the shape can hold a lattice with the requested wrapping.
  pub fn validate(&self) -> Result<()> {
    if self.width == 0 {
      return Err(SomError::invalid_param("width", self.width, "must be at least 1"));
    }
    if self.height == 0 {
      return Err(SomError::invalid_param("height", self.height, "must be at least 1"));
    }
    match self.width.checked_mul(self.height) {
      Some(count) if count <= u32::MAX as usize => {}
      _ => {
        return Err(SomError::invalid_param(
          "width * height",
          format!("{}x{}", self.width, self.height),
          "node count must fit in u32 indices",
        ))
      }
    }
    if self.topology.cyclic_x() && self.width < 2 {
      return Err(SomError::invalid_param("width", self.width, "cyclic x needs at least 2 columns"));
    }
    if self.topology.cyclic_y() && self.height < 2 {
      return Err(SomError::invalid_param("height", self.height, "cyclic y needs at least 2 rows"));
    }
    Ok(())
  }
}

/// A `width x height` grid of nodes in `D`-dimensional input space.
#[derive(Clone, Debug)]
pub struct Lattice<const D: usize> {
  width: usize,
  height: usize,
  topology: Topology,
  pub(crate) nodes: Vec<Node<D>>,
}

impl<const D: usize> Lattice<D> {
  /// Allocate and initialize `width * height` nodes.
  ///
  /// `rng` is only drawn from for [`InitState::Random`].
  pub fn new<R: Rng>(config: &LatticeConfig, bounds: &Bounds<D>, rng: &mut R) -> Result<Self> {
    config.validate()?;
    if !bounds.is_valid() {
      return Err(SomError::invalid_param(
        "bounds",
        format!("{:?}..{:?}", bounds.min, bounds.max),
        "min must not exceed max",
      ));
    }

    let LatticeConfig {
      width,
      height,
      topology,
      init,
    } = *config;

    let dx = if D > 0 { bounds.extent(0) / width as f32 } else { 0.0 };
    let dy = if D > 1 { bounds.extent(1) / height as f32 } else { 0.0 };

    let mut nodes = Vec::with_capacity(width * height);
    for y in 0..height {
      for x in 0..width {
        let mut weights = [0.0f32; D];
        match init {
          InitState::Planar => {
            for (k, w) in weights.iter_mut().enumerate() {
              *w = match k {
                0 => x as f32 * dx,
                1 => y as f32 * dy,
                _ => bounds.max[k],
              };
            }
          }
          InitState::Random => {
            for (k, w) in weights.iter_mut().enumerate() {
              *w = bounds.min[k] + rng.random::<f32>() * bounds.extent(k);
            }
          }
        }

        nodes.push(Node {
          weights,
          coord: IVec2::new(x as i32, y as i32),
          uv: Vec2::new(unit_coord(x, width), unit_coord(y, height)),
        });
      }
    }

    Ok(Self {
      width,
      height,
      topology,
      nodes,
    })
  }

  #[inline]
  pub fn width(&self) -> usize {
    self.width
  }

  #[inline]
  pub fn height(&self) -> usize {
    self.height
  }

  #[inline]
  pub fn topology(&self) -> Topology {
    self.topology
  }

  /// Number of nodes (`width * height`).
  #[inline]
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  #[inline]
  pub fn nodes(&self) -> &[Node<D>] {
    &self.nodes
  }

  /// Row-major index of grid coordinate `(x, y)`. Does not bounds check.
  #[inline]
  pub fn index_of(&self, x: usize, y: usize) -> usize {
    y * self.width + x
  }

  /// Grid coordinate of a row-major index.
  #[inline]
  pub fn coord_of(&self, index: usize) -> (usize, usize) {
    (index % self.width, index / self.width)
  }

  /// Node at `(x, y)`.
  pub fn at(&self, x: usize, y: usize) -> Result<&Node<D>> {
    self.check_bounds(x, y)?;
    Ok(&self.nodes[self.index_of(x, y)])
  }

  /// Mutable node at `(x, y)`.
  pub fn at_mut(&mut self, x: usize, y: usize) -> Result<&mut Node<D>> {
    self.check_bounds(x, y)?;
    let index = self.index_of(x, y);
    Ok(&mut self.nodes[index])
  }

  fn check_bounds(&self, x: usize, y: usize) -> Result<()> {
    if x >= self.width || y >= self.height {
      return Err(SomError::OutOfBounds {
        x,
        y,
        width: self.width,
        height: self.height,
      });
    }
    Ok(())
  }
}

impl Lattice<3> {
  /// Triangulate the lattice using node weights as positions.
  ///
  /// A lattice narrower than 2 nodes on either axis yields no triangles.
  pub fn triangulated_mesh(&self) -> LatticeMesh {
    let mut mesh = LatticeMesh {
      positions: self.nodes.iter().map(|n| Vec3::from_array(n.weights)).collect(),
      uvs: self.nodes.iter().map(|n| n.uv).collect(),
      indices: Vec::with_capacity(
        self.width.saturating_sub(1) * self.height.saturating_sub(1) * 6,
      ),
    };

    for y in 0..self.height.saturating_sub(1) {
      for x in 0..self.width.saturating_sub(1) {
        let i00 = self.index_of(x, y) as u32;
        let i10 = self.index_of(x + 1, y) as u32;
        let i01 = self.index_of(x, y + 1) as u32;
        let i11 = self.index_of(x + 1, y + 1) as u32;

        mesh.indices.extend_from_slice(&[i00, i10, i11, i00, i11, i01]);
      }
    }

    mesh
  }
}

/// `i / (n - 1)`, or 0 for a single-node axis.
#[inline]
fn unit_coord(i: usize, n: usize) -> f32 {
  if n > 1 {
    i as f32 / (n - 1) as f32
  } else {
    0.0
  }
}

#[cfg(test)]
#[path = "lattice_test.rs"]
mod lattice_test;
