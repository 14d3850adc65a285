//! SOM watermark generator.
//!
//! Voxelizes an analytic surface, trains a self-organizing lattice over the
//! surface voxels on a background worker, then assigns every voxel the UV of
//! its closest point on the trained lattice.
//!
//! Output is one line per voxel: `x y z u v`.

mod config;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use som_lattice::glam::Vec2;
use som_lattice::{
	parameterize, voxel_surface, Dataset, Lattice, LatticeMesh, PointSource, SamplePoint,
	TrainingConfig, TrainingSession,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use config::Config;

/// UI-style polling cadence for progress reporting.
const POLL_INTERVAL: Duration = Duration::from_millis(16);
/// Log progress roughly once a second.
const LOG_EVERY_POLLS: u32 = 60;

/// Trains a SOM lattice over a voxel surface and writes per-voxel UVs.
#[derive(Parser, Debug)]
#[command(name = "som_watermark")]
#[command(about = "Folds a lattice onto a surface and writes x y z u v per voxel")]
struct Args {
	/// Path to configuration TOML file (defaults are used when omitted).
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Output file (overrides `[output] path`).
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// RNG seed (overrides `[training] seed`).
	#[arg(short, long)]
	seed: Option<u64>,
}

fn main() -> Result<()> {
	init_tracing();
	let args = Args::parse();

	let mut config = match &args.config {
		Some(path) => {
			info!(path = %path.display(), "loading config");
			Config::load(path)?
		}
		None => Config::default(),
	};
	if let Some(seed) = args.seed {
		config.training.seed = Some(seed);
	}
	let output = args.output.unwrap_or_else(|| config.output.path.clone());

	// Input surface
	let source = config.source.shape.build();
	let shell = voxel_surface(source.as_ref(), &source.bounds(), config.source.voxel_size)
		.context("Failed to voxelize source")?;
	ensure!(!shell.is_empty(), "source surface produced no voxels");
	info!(voxels = shell.len(), voxel_size = config.source.voxel_size, "voxel surface extracted");

	// Lattice over the data bounds
	let dataset = Dataset::from_samples(&shell)?;
	let mut rng = match config.training.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	};
	let lattice = Lattice::new(&config.lattice.to_lattice_config(), &dataset.bounds(), &mut rng)?;

	let training = config.training.to_training_config();
	let lattice = train(lattice, dataset, &training)?;

	let mesh = lattice.triangulated_mesh();
	info!(triangles = mesh.triangle_count(), "lattice triangulated");

	let uvs = assign(mesh, &shell)?;
	write_output(&output, &shell, &uvs)?;

	info!(path = %output.display(), lines = shell.len(), "watermark written");
	Ok(())
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
	Registry::default().with(filter).with(fmt_layer).init();
}

/// Run a background session to completion, logging progress as it goes.
fn train(lattice: Lattice<3>, dataset: Dataset<3>, config: &TrainingConfig) -> Result<Lattice<3>> {
	let mut session = TrainingSession::spawn(lattice, dataset, config)?;
	let monitor = session.monitor();
	session.resume();

	let mut polls = 0u32;
	while !monitor.is_done() {
		thread::sleep(POLL_INTERVAL);
		polls += 1;
		if polls % LOG_EVERY_POLLS == 0 {
			let iterations = monitor.iterations();
			info!(
				iterations,
				percent = %format!("{:.1}", iterations as f64 * 100.0 / monitor.max_iterations() as f64),
				learning_rate = monitor.learning_rate(),
				radius = monitor.neighborhood(),
				"training"
			);
		}
	}

	let snapshot = monitor.snapshot();
	info!(
		iterations = snapshot.iteration,
		avg_iteration_us = %format!("{:.2}", snapshot.metrics.avg_iteration_us()),
		avg_quantization_error = %format!("{:.6}", snapshot.metrics.avg_quantization_error()),
		"training complete"
	);

	Ok(session.into_lattice()?)
}

/// Parameterize every voxel center against the trained mesh.
fn assign(mesh: LatticeMesh, shell: &[SamplePoint]) -> Result<Vec<Vec2>> {
	let points = shell.iter().map(|s| s.pos).collect();
	let mut job = parameterize(mesh, points);

	let mut polls = 0u32;
	let result = loop {
		if let Some(result) = job.poll() {
			break result;
		}
		ensure!(job.is_busy(), "parameterization worker exited without a result");
		thread::sleep(POLL_INTERVAL);
		polls += 1;
		if polls % LOG_EVERY_POLLS == 0 {
			info!(percent = %format!("{:.1}", job.progress()), "parameterizing");
		}
	};

	info!(points = result.uvs.len(), elapsed_ms = result.elapsed_us / 1000, "parameterization complete");
	Ok(result.uvs)
}

fn write_output(path: &Path, shell: &[SamplePoint], uvs: &[Vec2]) -> Result<()> {
	let file = File::create(path)
		.with_context(|| format!("Failed to create output file: {}", path.display()))?;
	let mut writer = BufWriter::new(file);

	for (sample, uv) in shell.iter().zip(uvs) {
		writeln!(
			writer,
			"{} {} {} {} {}",
			sample.pos.x, sample.pos.y, sample.pos.z, uv.x, uv.y
		)?;
	}
	writer.flush().context("Failed to flush output")?;
	Ok(())
}
