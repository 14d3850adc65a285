//! som_lattice - Self-organizing lattice folding and UV parameterization
//!
//! A 2D lattice of nodes is trained as a Kohonen self-organizing map until it
//! drapes over a 3D point cloud. The trained lattice is then triangulated and
//! used to assign a texture coordinate to arbitrary points by snapping each
//! one to the nearest point on the lattice surface.
//!
//! # Features
//!
//! - **Lattice**: row-major grid with planar or random initialization and
//!   optional cyclic borders (cylinder/torus)
//! - **Pluggable decay**: learning rate and neighborhood radius schedules
//!   behind the [`DecaySchedule`] trait
//! - **Background training**: pause/resume/stop a worker thread while
//!   reading counters and lattice snapshots from any thread
//! - **Parameterizer**: face/edge/vertex closest-point search with
//!   barycentric UV blending, data-parallel on rayon
//! - **Metrics** (`metrics` feature): rolling iteration timing and
//!   quantization error
//!
//! # Example
//!
//! ```ignore
//! use som_lattice::*;
//!
//! let sphere = SphereSource::new(1.0);
//! let shell = voxel_surface(&sphere, &sphere.bounds(), 0.05)?;
//! let dataset = Dataset::from_samples(&shell)?;
//!
//! let mut rng = rand::rng();
//! let lattice = Lattice::new(&LatticeConfig::new(32, 32), &dataset.bounds(), &mut rng)?;
//!
//! let mut session = TrainingSession::spawn(lattice, dataset, &TrainingConfig::new())?;
//! session.resume();
//! // ... poll session.iterations() ...
//! let mesh = session.into_lattice()?.triangulated_mesh();
//!
//! let points = shell.iter().map(|s| s.pos).collect();
//! let uvs = parameterize(mesh, points).wait()?.uvs;
//! ```

pub use glam;

pub mod config;
pub mod dataset;
pub mod decay;
pub mod error;
pub mod lattice;
pub mod types;

pub use config::TrainingConfig;
pub use dataset::Dataset;
pub use decay::{DecayKind, DecayParams, DecaySchedule, ReferenceDecay, TimeConstantDecay};
pub use error::{Result, SomError};
pub use lattice::{InitState, Lattice, LatticeConfig, Node};
pub use types::{Bounds, LatticeMesh, SamplePoint, Topology};

// Training loop and background session
pub mod trainer;
pub use trainer::{SessionId, SessionMonitor, SessionState, Snapshot, StepResult, Trainer, TrainingSession};

// Nearest-surface UV assignment
pub mod parameterize;
pub use parameterize::{
  assign_uvs, parameterize, parameterize_point, parameterize_points, ParameterizeJob,
  ParameterizeResult,
};

// Analytic surfaces for generating training data
pub mod sources;
pub use sources::{voxel_surface, PointSource, SphereSource, TiltedPlaneSource, TorusSource};

// Training statistics (feature-gated)
pub mod metrics;
pub use metrics::TrainingMetrics;
