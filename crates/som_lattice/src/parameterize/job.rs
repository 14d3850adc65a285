//! Background parameterization with progress reporting.
//!
//! ```text
//! Caller                              rayon pool
//! ┌──────────────────┐
//! │ parameterize()   │ ──spawn──►  par_iter over points
//! └────────┬─────────┘             ├─ parameterize_point
//!          │                       └─ completed.fetch_add(1)
//! ┌────────▼─────────┐                      │
//! │ progress() 0-100 │ ◄── AtomicUsize ─────┤
//! │ poll() / wait()  │ ◄── bounded(1) ──────┘
//! └──────────────────┘
//! ```
//!
//! There is no cancellation. Dropping the job discards the result once the
//! batch finishes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{self as channel, Receiver, TryRecvError};
use glam::{Vec2, Vec3};
use rayon::prelude::*;
use tracing::info;
use web_time::Instant;

use super::parameterize_point;
use crate::error::{Result, SomError};
use crate::types::LatticeMesh;

/// Completed-point counter shared with the worker tasks.
#[derive(Debug)]
pub struct JobProgress {
  completed: AtomicUsize,
  total: usize,
}

impl JobProgress {
  fn new(total: usize) -> Self {
    Self {
      completed: AtomicUsize::new(0),
      total,
    }
  }

  #[inline]
  pub fn completed(&self) -> usize {
    self.completed.load(Ordering::Relaxed)
  }

  #[inline]
  pub fn total(&self) -> usize {
    self.total
  }

  /// Percentage of points done, 0 to 100. An empty batch reports 100.
  pub fn percent(&self) -> f32 {
    if self.total == 0 {
      return 100.0;
    }
    self.completed() as f32 * 100.0 / self.total as f32
  }
}

/// Output of a finished job.
#[derive(Clone, Debug)]
pub struct ParameterizeResult {
  /// One UV per input point, in input order.
  pub uvs: Vec<Vec2>,
  /// Wall time of the batch in microseconds.
  pub elapsed_us: u64,
}

/// Handle to a parameterization running on the rayon pool.
pub struct ParameterizeJob {
  progress: Arc<JobProgress>,
  receiver: Option<Receiver<ParameterizeResult>>,
}

impl ParameterizeJob {
  /// Percentage of points done, 0 to 100.
  #[inline]
  pub fn progress(&self) -> f32 {
    self.progress.percent()
  }

  /// Shared progress counter, for observers on other threads.
  pub fn progress_handle(&self) -> Arc<JobProgress> {
    Arc::clone(&self.progress)
  }

  /// True until the result has been taken.
  pub fn is_busy(&self) -> bool {
    self.receiver.is_some()
  }

  /// Take the result if the batch has finished (non-blocking).
  pub fn poll(&mut self) -> Option<ParameterizeResult> {
    let receiver = self.receiver.as_ref()?;

    match receiver.try_recv() {
      Ok(result) => {
        self.receiver = None;
        Some(result)
      }
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Disconnected) => {
        self.receiver = None;
        None
      }
    }
  }

  /// Block until the batch finishes.
  pub fn wait(mut self) -> Result<ParameterizeResult> {
    let receiver = self.receiver.take().ok_or(SomError::JobDisconnected)?;
    receiver.recv().map_err(|_| SomError::JobDisconnected)
  }
}

/// Start parameterizing `points` against `mesh` in the background.
pub fn parameterize(mesh: LatticeMesh, points: Vec<Vec3>) -> ParameterizeJob {
  let progress = Arc::new(JobProgress::new(points.len()));
  let (sender, receiver) = channel::bounded(1);

  let worker_progress = Arc::clone(&progress);
  rayon::spawn(move || {
    let result = run_parameterize(&mesh, &points, &worker_progress);
    // Receiver dropped = result discarded.
    let _ = sender.send(result);
  });

  ParameterizeJob {
    progress,
    receiver: Some(receiver),
  }
}

#[tracing::instrument(skip_all, name = "parameterize::job", fields(points = points.len(), triangles = mesh.triangle_count()))]
fn run_parameterize(mesh: &LatticeMesh, points: &[Vec3], progress: &JobProgress) -> ParameterizeResult {
  let start = Instant::now();

  let uvs = points
    .par_iter()
    .map(|&p| {
      let uv = parameterize_point(mesh, p);
      progress.completed.fetch_add(1, Ordering::Relaxed);
      uv
    })
    .collect();

  let elapsed_us = start.elapsed().as_micros() as u64;
  info!(points = points.len(), elapsed_us, "parameterization finished");

  ParameterizeResult { uvs, elapsed_us }
}

#[cfg(test)]
#[path = "job_test.rs"]
mod job_test;
