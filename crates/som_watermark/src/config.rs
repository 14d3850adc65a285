//! Configuration parsing for lattice training and watermark output.

use anyhow::{Context, Result};
use serde::Deserialize;
use som_lattice::{
	DecayKind, InitState, LatticeConfig, PointSource, SphereSource, TiltedPlaneSource, Topology,
	TorusSource, TrainingConfig,
};
use std::path::{Path, PathBuf};

/// Root configuration. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub lattice: LatticeSection,
	pub training: TrainingSection,
	pub source: SourceSection,
	pub output: OutputSection,
}

/// Lattice shape and initialization.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatticeSection {
	pub width: usize,
	pub height: usize,
	pub topology: TopologyName,
	pub init: InitName,
}

impl Default for LatticeSection {
	fn default() -> Self {
		Self {
			width: 32,
			height: 32,
			topology: TopologyName::None,
			init: InitName::Random,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyName {
	None,
	CyclicX,
	CyclicY,
	Torus,
}

impl From<TopologyName> for Topology {
	fn from(name: TopologyName) -> Self {
		match name {
			TopologyName::None => Topology::CYCLIC_NONE,
			TopologyName::CyclicX => Topology::CYCLIC_X,
			TopologyName::CyclicY => Topology::CYCLIC_Y,
			TopologyName::Torus => Topology::CYCLIC_X | Topology::CYCLIC_Y,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitName {
	Planar,
	Random,
}

impl From<InitName> for InitState {
	fn from(name: InitName) -> Self {
		match name {
			InitName::Planar => InitState::Planar,
			InitName::Random => InitState::Random,
		}
	}
}

impl LatticeSection {
	pub fn to_lattice_config(&self) -> LatticeConfig {
		LatticeConfig::new(self.width, self.height)
			.with_topology(self.topology.into())
			.with_init(self.init.into())
	}
}

/// Iteration budget and decay.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingSection {
	pub max_iterations: u32,
	pub learning_rate: f32,
	/// Starting radius in grid units (default: half the lattice diagonal).
	pub initial_radius: Option<f32>,
	pub decay: DecayName,
	pub seed: Option<u64>,
	pub snapshot_interval: u32,
}

impl Default for TrainingSection {
	fn default() -> Self {
		let defaults = TrainingConfig::default();
		Self {
			max_iterations: defaults.max_iterations,
			learning_rate: defaults.learning_rate,
			initial_radius: None,
			decay: DecayName::Reference,
			seed: None,
			snapshot_interval: defaults.snapshot_interval,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayName {
	Reference,
	TimeConstant,
}

impl From<DecayName> for DecayKind {
	fn from(name: DecayName) -> Self {
		match name {
			DecayName::Reference => DecayKind::Reference,
			DecayName::TimeConstant => DecayKind::TimeConstant,
		}
	}
}

impl TrainingSection {
	pub fn to_training_config(&self) -> TrainingConfig {
		let mut config = TrainingConfig::new()
			.with_max_iterations(self.max_iterations)
			.with_learning_rate(self.learning_rate)
			.with_decay(self.decay.into())
			.with_snapshot_interval(self.snapshot_interval);
		config.initial_radius = self.initial_radius;
		config.seed = self.seed;
		config
	}
}

/// Surface to voxelize into training data.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSection {
	/// Edge length of one voxel cell.
	pub voxel_size: f32,
	pub shape: ShapeConfig,
}

impl Default for SourceSection {
	fn default() -> Self {
		Self {
			voxel_size: 0.05,
			shape: ShapeConfig::Sphere {
				radius: 1.0,
				center: [0.0; 3],
			},
		}
	}
}

/// Analytic SDF shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeConfig {
	Sphere {
		radius: f32,
		#[serde(default)]
		center: [f32; 3],
	},
	Torus {
		major_radius: f32,
		minor_radius: f32,
		#[serde(default)]
		center: [f32; 3],
	},
	TiltedPlane {
		#[serde(default)]
		height: f32,
		#[serde(default = "default_angle_degrees")]
		angle_degrees: f32,
		#[serde(default = "default_half_extent")]
		half_extent: f32,
	},
}

fn default_angle_degrees() -> f32 {
	45.0
}

fn default_half_extent() -> f32 {
	1.0
}

impl ShapeConfig {
	pub fn build(&self) -> Box<dyn PointSource> {
		match *self {
			ShapeConfig::Sphere { radius, center } => {
				Box::new(SphereSource::new(radius).with_center(center.into()))
			}
			ShapeConfig::Torus {
				major_radius,
				minor_radius,
				center,
			} => Box::new(TorusSource::new(major_radius, minor_radius).with_center(center.into())),
			ShapeConfig::TiltedPlane {
				height,
				angle_degrees,
				half_extent,
			} => Box::new(
				TiltedPlaneSource::new()
					.with_height(height)
					.with_angle_degrees(angle_degrees)
					.with_half_extent(half_extent),
			),
		}
	}
}

/// Where the `x y z u v` lines go.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
	pub path: PathBuf,
}

impl Default for OutputSection {
	fn default() -> Self {
		Self {
			path: PathBuf::from("watermark.txt"),
		}
	}
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content)
	}

	/// Parse and validate configuration text.
	pub fn parse(content: &str) -> Result<Self> {
		let config: Config = toml::from_str(content).context("Failed to parse config TOML")?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<()> {
		self.lattice.to_lattice_config().validate()?;
		self.training.to_training_config().validate()?;

		if !(self.source.voxel_size.is_finite() && self.source.voxel_size > 0.0) {
			anyhow::bail!(
				"source.voxel_size must be positive, got {}",
				self.source.voxel_size
			);
		}
		match self.source.shape {
			ShapeConfig::Sphere { radius, .. } if radius <= 0.0 => {
				anyhow::bail!("sphere radius must be positive, got {radius}")
			}
			ShapeConfig::Torus {
				major_radius,
				minor_radius,
				..
			} if minor_radius <= 0.0 || major_radius <= minor_radius => {
				anyhow::bail!(
					"torus needs 0 < minor_radius < major_radius, got {minor_radius} / {major_radius}"
				)
			}
			ShapeConfig::TiltedPlane { half_extent, .. } if half_extent <= 0.0 => {
				anyhow::bail!("tilted plane half_extent must be positive, got {half_extent}")
			}
			_ => {}
		}

		Ok(())
	}
}
