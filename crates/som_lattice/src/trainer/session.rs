//! Background training session.
//!
//! A [`TrainingSession`] owns one worker thread that runs a [`Trainer`]. The
//! controlling thread steers it with commands; any thread can observe it
//! through a [`SessionMonitor`].
//!
//! # Flow
//!
//! ```text
//! Controller                          Worker thread
//! ┌──────────────┐   Resume/Pause/Stop   ┌─────────────────────────┐
//! │ resume()     │ ────(rendezvous)────► │ Idle/Paused: recv()     │
//! │ pause()      │ ◄──────(ack)───────── │ Training:    try_recv() │
//! │ stop()       │                       │   step() → t += 1       │
//! └──────────────┘                       │   publish counters      │
//!                                        │   publish snapshot      │
//! SessionMonitor (any thread)            │   (every N, pause, end) │
//! ┌──────────────┐                       └────────────┬────────────┘
//! │ iterations() │ ◄── atomics ─────────────────────────┤
//! │ snapshot()   │ ◄── Arc<Snapshot> ─────────────────────┘
//! └──────────────┘
//! ```
//!
//! Commands travel over a zero-capacity channel and the worker acknowledges
//! each one, so a control call returns only after the worker has applied it.
//! Lattice weights are never shared while being mutated; readers get an
//! immutable [`Snapshot`].
//!
//! # Usage
//!
//! ```ignore
//! let mut session = TrainingSession::spawn(lattice, dataset, &config)?;
//! let monitor = session.monitor();
//! session.resume();
//!
//! while !monitor.is_done() {
//!     println!("t={} radius={:.2}", monitor.iterations(), monitor.neighborhood());
//!     std::thread::sleep(Duration::from_millis(16));
//! }
//! let lattice = session.into_lattice()?;
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{self as channel, Receiver, Sender, TryRecvError};
use tracing::{debug, info, info_span, warn};
use web_time::Instant;

use super::Trainer;
use crate::config::TrainingConfig;
use crate::dataset::Dataset;
use crate::decay::{DecayParams, DecaySchedule};
use crate::error::{Result, SomError};
use crate::lattice::Lattice;
use crate::metrics::TrainingMetrics;

// =============================================================================
// SessionId - unique identifier
// =============================================================================

static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque session identifier, unique within the process.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SessionId(u64);

impl SessionId {
  pub fn new() -> Self {
    Self(SESSION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

impl Default for SessionId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for SessionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "session#{}", self.0)
  }
}

// =============================================================================
// State machine
// =============================================================================

/// Lifecycle of a session: `Idle → Training ⇄ Paused → Done`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionState {
  /// Spawned, never resumed.
  Idle = 0,
  Training = 1,
  Paused = 2,
  /// Terminal. Reached at `tmax` or on stop.
  Done = 3,
}

impl SessionState {
  #[inline]
  fn from_u8(value: u8) -> Self {
    match value {
      0 => SessionState::Idle,
      1 => SessionState::Training,
      2 => SessionState::Paused,
      _ => SessionState::Done,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
  Resume,
  Pause,
  Stop,
}

/// Read-only copy of the lattice published by the worker.
#[derive(Clone, Debug)]
pub struct Snapshot<const D: usize> {
  /// Iterations completed when the copy was taken.
  pub iteration: u32,
  pub lattice: Lattice<D>,
  pub metrics: TrainingMetrics,
}

/// State shared between the worker and observers.
struct Shared<const D: usize> {
  id: SessionId,
  iterations: AtomicU32,
  state: AtomicU8,
  params: DecayParams,
  schedule: Arc<dyn DecaySchedule>,
  snapshot: Mutex<Arc<Snapshot<D>>>,
}

impl<const D: usize> Shared<D> {
  #[inline]
  fn state(&self) -> SessionState {
    SessionState::from_u8(self.state.load(Ordering::Acquire))
  }

  #[inline]
  fn set_state(&self, state: SessionState) {
    self.state.store(state as u8, Ordering::Release);
  }

  fn publish(&self, snapshot: Snapshot<D>) {
    let mut slot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
    *slot = Arc::new(snapshot);
  }
}

// =============================================================================
// SessionMonitor - cloneable read-only view
// =============================================================================

/// Thread-safe, non-blocking view of a running session.
pub struct SessionMonitor<const D: usize> {
  shared: Arc<Shared<D>>,
}

impl<const D: usize> Clone for SessionMonitor<D> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<const D: usize> SessionMonitor<D> {
  pub fn id(&self) -> SessionId {
    self.shared.id
  }

  /// Iterations completed so far.
  #[inline]
  pub fn iterations(&self) -> u32 {
    self.shared.iterations.load(Ordering::Acquire)
  }

  #[inline]
  pub fn max_iterations(&self) -> u32 {
    self.shared.params.tmax
  }

  /// Learning rate at the current iteration.
  pub fn learning_rate(&self) -> f32 {
    self
      .shared
      .schedule
      .learning_rate(&self.shared.params, self.iterations())
  }

  /// Neighborhood radius at the current iteration.
  pub fn neighborhood(&self) -> f32 {
    self
      .shared
      .schedule
      .neighborhood_radius(&self.shared.params, self.iterations())
  }

  #[inline]
  pub fn initial_neighborhood(&self) -> f32 {
    self.shared.params.initial_radius
  }

  #[inline]
  pub fn state(&self) -> SessionState {
    self.shared.state()
  }

  #[inline]
  pub fn is_done(&self) -> bool {
    self.state() == SessionState::Done
  }

  #[inline]
  pub fn is_training(&self) -> bool {
    self.state() == SessionState::Training
  }

  /// Most recently published lattice copy.
  pub fn snapshot(&self) -> Arc<Snapshot<D>> {
    let slot = self.shared.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&slot)
  }
}

// =============================================================================
// TrainingSession - owner of the worker thread
// =============================================================================

/// A trainer running on its own thread.
///
/// Dropping the session stops and joins the worker.
pub struct TrainingSession<const D: usize> {
  monitor: SessionMonitor<D>,
  commands: Sender<Command>,
  acks: Receiver<SessionState>,
  worker: Option<JoinHandle<Lattice<D>>>,
  lattice: Option<Lattice<D>>,
}

impl<const D: usize> TrainingSession<D> {
  /// Spawn a paused worker using the schedule named by `config.decay`.
  pub fn spawn(lattice: Lattice<D>, dataset: Dataset<D>, config: &TrainingConfig) -> Result<Self> {
    Self::spawn_with_schedule(lattice, dataset, config, config.decay.schedule())
  }

  /// Spawn a paused worker with a caller-supplied decay schedule.
  pub fn spawn_with_schedule(
    lattice: Lattice<D>,
    dataset: Dataset<D>,
    config: &TrainingConfig,
    schedule: Arc<dyn DecaySchedule>,
  ) -> Result<Self> {
    let trainer = Trainer::with_schedule(lattice, dataset, config, schedule)?;
    let id = SessionId::new();

    let initial = Snapshot {
      iteration: 0,
      lattice: trainer.lattice().clone(),
      metrics: TrainingMetrics::new(),
    };
    let shared = Arc::new(Shared {
      id,
      iterations: AtomicU32::new(0),
      state: AtomicU8::new(SessionState::Idle as u8),
      params: *trainer.params(),
      schedule: Arc::clone(trainer.schedule()),
      snapshot: Mutex::new(Arc::new(initial)),
    });

    let (command_tx, command_rx) = channel::bounded(0);
    let (ack_tx, ack_rx) = channel::bounded(1);
    let worker_shared = Arc::clone(&shared);
    let snapshot_interval = config.snapshot_interval;

    let worker = thread::Builder::new()
      .name(format!("som-train-{}", id.raw()))
      .spawn(move || run_worker(trainer, worker_shared, command_rx, ack_tx, snapshot_interval))?;

    info!(
      session = id.raw(),
      tmax = shared.params.tmax,
      initial_rate = shared.params.initial_rate,
      initial_radius = shared.params.initial_radius,
      "training session spawned"
    );

    Ok(Self {
      monitor: SessionMonitor { shared },
      commands: command_tx,
      acks: ack_rx,
      worker: Some(worker),
      lattice: None,
    })
  }

  /// Cloneable read-only handle for other threads.
  pub fn monitor(&self) -> SessionMonitor<D> {
    self.monitor.clone()
  }

  pub fn id(&self) -> SessionId {
    self.monitor.id()
  }

  /// Start or continue training. No effect once done.
  pub fn resume(&mut self) -> SessionState {
    self.send(Command::Resume)
  }

  /// Suspend training. Once this returns, `iterations()` no longer changes
  /// until the next resume. Pausing an idle session leaves it idle.
  pub fn pause(&mut self) -> SessionState {
    self.send(Command::Pause)
  }

  /// Pause if training, resume otherwise.
  pub fn toggle_training(&mut self) -> SessionState {
    if self.is_training() {
      self.pause()
    } else {
      self.resume()
    }
  }

  /// Stop the worker and join it.
  ///
  /// Safe on a never-resumed session and safe to call repeatedly.
  pub fn stop(&mut self) -> Result<()> {
    let Some(worker) = self.worker.take() else {
      return Ok(());
    };

    self.send(Command::Stop);

    match worker.join() {
      Ok(lattice) => {
        self.lattice = Some(lattice);
        Ok(())
      }
      Err(_) => {
        self.monitor.shared.set_state(SessionState::Done);
        warn!(session = self.id().raw(), "training worker panicked");
        Err(SomError::WorkerPanicked)
      }
    }
  }

  /// Stop the worker and take the trained lattice.
  pub fn into_lattice(mut self) -> Result<Lattice<D>> {
    self.stop()?;
    self.lattice.take().ok_or(SomError::WorkerPanicked)
  }

  /// Deliver a command and wait for the worker to apply it.
  fn send(&mut self, command: Command) -> SessionState {
    if self.worker.is_none() || self.commands.send(command).is_err() {
      // Worker already exited.
      return self.state();
    }
    self.acks.recv().unwrap_or(SessionState::Done)
  }

  #[inline]
  pub fn iterations(&self) -> u32 {
    self.monitor.iterations()
  }

  #[inline]
  pub fn max_iterations(&self) -> u32 {
    self.monitor.max_iterations()
  }

  pub fn learning_rate(&self) -> f32 {
    self.monitor.learning_rate()
  }

  pub fn neighborhood(&self) -> f32 {
    self.monitor.neighborhood()
  }

  pub fn initial_neighborhood(&self) -> f32 {
    self.monitor.initial_neighborhood()
  }

  #[inline]
  pub fn state(&self) -> SessionState {
    self.monitor.state()
  }

  #[inline]
  pub fn is_done(&self) -> bool {
    self.monitor.is_done()
  }

  #[inline]
  pub fn is_training(&self) -> bool {
    self.monitor.is_training()
  }

  pub fn snapshot(&self) -> Arc<Snapshot<D>> {
    self.monitor.snapshot()
  }
}

impl<const D: usize> Drop for TrainingSession<D> {
  fn drop(&mut self) {
    let _ = self.stop();
  }
}

// =============================================================================
// Worker loop
// =============================================================================

fn run_worker<const D: usize>(
  mut trainer: Trainer<D>,
  shared: Arc<Shared<D>>,
  commands: Receiver<Command>,
  acks: Sender<SessionState>,
  snapshot_interval: u32,
) -> Lattice<D> {
  let _span = info_span!("training_worker", session = shared.id.raw()).entered();
  let started = Instant::now();
  let mut metrics = TrainingMetrics::new();
  let mut state = SessionState::Idle;

  let stopped = loop {
    let command = if state == SessionState::Training {
      match commands.try_recv() {
        Ok(command) => Some(command),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => Some(Command::Stop),
      }
    } else {
      // Idle or paused: block until told otherwise.
      Some(commands.recv().unwrap_or(Command::Stop))
    };

    if let Some(command) = command {
      let next = match command {
        Command::Stop => break true,
        Command::Resume => SessionState::Training,
        Command::Pause if state == SessionState::Idle => SessionState::Idle,
        Command::Pause => SessionState::Paused,
      };

      if next != state {
        debug!(from = ?state, to = ?next, iteration = trainer.iteration(), "session state change");
        if next == SessionState::Paused {
          shared.publish(take_snapshot(&trainer, &metrics));
        }
        state = next;
        shared.set_state(state);
      }
      let _ = acks.send(state);

      if state != SessionState::Training {
        continue;
      }
    }

    let step_start = Instant::now();
    let Some(result) = trainer.step() else {
      break false;
    };
    metrics.record_iteration(step_start.elapsed().as_micros() as u64, result.bmu_distance_sq);

    let t = trainer.iteration();
    shared.iterations.store(t, Ordering::Release);

    if trainer.is_finished() {
      break false;
    }
    if t % snapshot_interval == 0 {
      shared.publish(take_snapshot(&trainer, &metrics));
    }
  };

  shared.publish(take_snapshot(&trainer, &metrics));
  shared.set_state(SessionState::Done);
  if stopped {
    let _ = acks.send(SessionState::Done);
  }

  info!(
    iterations = trainer.iteration(),
    stopped,
    elapsed_ms = started.elapsed().as_millis() as u64,
    "training finished"
  );

  trainer.into_lattice()
}

fn take_snapshot<const D: usize>(trainer: &Trainer<D>, metrics: &TrainingMetrics) -> Snapshot<D> {
  Snapshot {
    iteration: trainer.iteration(),
    lattice: trainer.lattice().clone(),
    metrics: metrics.clone(),
  }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
