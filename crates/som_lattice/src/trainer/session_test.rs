use std::thread;
use std::time::Duration;

use crossbeam_channel as channel;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::lattice::{InitState, LatticeConfig};
use crate::types::Bounds;

const TIMEOUT: Duration = Duration::from_secs(10);

fn lattice() -> Lattice<3> {
  let mut rng = StdRng::seed_from_u64(4);
  Lattice::new(
    &LatticeConfig::new(4, 4).with_init(InitState::Random),
    &Bounds::new([0.0; 3], [1.0; 3]),
    &mut rng,
  )
  .unwrap()
}

fn dataset() -> Dataset<3> {
  Dataset::new(vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]).unwrap()
}

fn config(tmax: u32) -> TrainingConfig {
  TrainingConfig::new()
    .with_max_iterations(tmax)
    .with_learning_rate(0.5)
    .with_seed(17)
    .with_snapshot_interval(16)
}

/// Poll `condition` every millisecond until it holds or the timeout expires.
fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
  let deadline = Instant::now() + TIMEOUT;
  while Instant::now() < deadline {
    if condition() {
      return true;
    }
    thread::sleep(Duration::from_millis(1));
  }
  condition()
}

#[test]
fn test_stop_without_resume_joins() {
  let session = TrainingSession::spawn(lattice(), dataset(), &config(100)).unwrap();
  let monitor = session.monitor();

  assert_eq!(session.iterations(), 0);
  assert!(!session.is_done());
  assert_eq!(session.state(), SessionState::Idle);

  thread::sleep(Duration::from_millis(20));
  assert_eq!(session.iterations(), 0);
  assert!(!session.is_done());

  // Join on another thread so a deadlock fails the test instead of hanging it.
  let (tx, rx) = channel::bounded(1);
  thread::spawn(move || {
    let mut session = session;
    let stopped = session.stop().is_ok();
    let _ = tx.send((stopped, session.is_done(), session.iterations()));
  });

  let (stopped, done, iterations) = rx.recv_timeout(TIMEOUT).expect("stop deadlocked");
  assert!(stopped);
  assert!(done);
  assert_eq!(iterations, 0);
  assert!(monitor.is_done());
  assert!(!monitor.is_training());
}

#[test]
fn test_runs_to_completion() {
  let mut session = TrainingSession::spawn(lattice(), dataset(), &config(500)).unwrap();
  let monitor = session.monitor();

  assert_eq!(session.resume(), SessionState::Training);
  assert!(wait_for(|| monitor.is_done()));

  assert_eq!(monitor.iterations(), 500);
  assert_eq!(monitor.state(), SessionState::Done);
  assert_eq!(monitor.learning_rate(), 0.0);
  assert_eq!(monitor.neighborhood(), 0.0);

  let snapshot = monitor.snapshot();
  assert_eq!(snapshot.iteration, 500);

  // Control calls after completion are harmless.
  assert_eq!(session.resume(), SessionState::Done);
  assert_eq!(session.toggle_training(), SessionState::Done);

  let lattice = session.into_lattice().unwrap();
  assert_eq!(lattice.nodes(), snapshot.lattice.nodes());
}

#[test]
fn test_pause_freezes_iterations() {
  let mut session = TrainingSession::spawn(lattice(), dataset(), &config(u32::MAX)).unwrap();

  session.resume();
  assert!(wait_for(|| session.iterations() > 0));

  assert_eq!(session.pause(), SessionState::Paused);
  assert!(!session.is_training());
  let first = session.iterations();
  thread::sleep(Duration::from_millis(20));
  let second = session.iterations();
  assert_eq!(first, second);

  // Pausing publishes the frozen lattice.
  assert_eq!(session.snapshot().iteration, first);

  assert_eq!(session.toggle_training(), SessionState::Training);
  assert!(wait_for(|| session.iterations() > second));

  assert_eq!(session.toggle_training(), SessionState::Paused);
  session.stop().unwrap();
  assert!(session.is_done());
}

#[test]
fn test_pause_while_idle_stays_idle() {
  let mut session = TrainingSession::spawn(lattice(), dataset(), &config(100)).unwrap();
  assert_eq!(session.pause(), SessionState::Idle);
  assert_eq!(session.toggle_training(), SessionState::Training);
  session.stop().unwrap();
}

#[test]
fn test_stop_is_idempotent() {
  let mut session = TrainingSession::spawn(lattice(), dataset(), &config(1_000)).unwrap();
  session.resume();
  session.stop().unwrap();
  let iterations = session.iterations();
  session.stop().unwrap();
  assert_eq!(session.iterations(), iterations);
  assert!(session.is_done());
  assert_eq!(session.snapshot().iteration, iterations);
}

#[test]
fn test_matches_single_threaded_trainer() {
  let config = config(300);

  let mut trainer = Trainer::new(lattice(), dataset(), &config).unwrap();
  trainer.run();

  let mut session = TrainingSession::spawn(lattice(), dataset(), &config).unwrap();
  let monitor = session.monitor();
  session.resume();
  assert!(wait_for(|| monitor.is_done()));
  let trained = session.into_lattice().unwrap();

  assert_eq!(trained.nodes(), trainer.lattice().nodes());
}

#[test]
fn test_monitor_reports_initial_values() {
  let session = TrainingSession::spawn(lattice(), dataset(), &config(100)).unwrap();
  let monitor = session.monitor();

  let expected_radius = crate::decay::default_initial_radius(4, 4);
  assert_eq!(monitor.initial_neighborhood(), expected_radius);
  assert_eq!(monitor.neighborhood(), expected_radius);
  assert_eq!(monitor.learning_rate(), 0.5);
  assert_eq!(monitor.max_iterations(), 100);

  let snapshot = monitor.snapshot();
  assert_eq!(snapshot.iteration, 0);
  assert_eq!(snapshot.lattice.nodes(), lattice().nodes());
}

#[test]
fn test_monitor_from_other_thread() {
  let mut session = TrainingSession::spawn(lattice(), dataset(), &config(2_000)).unwrap();
  let monitor = session.monitor();

  let observer = thread::spawn(move || {
    let mut last = 0;
    while !monitor.is_done() {
      let now = monitor.iterations();
      assert!(now >= last, "iterations went backwards");
      last = now;
      let snapshot = monitor.snapshot();
      assert_eq!(snapshot.lattice.len(), 16);
      thread::yield_now();
    }
    monitor.iterations()
  });

  session.resume();
  let seen = observer.join().unwrap();
  assert_eq!(seen, 2_000);
}

#[test]
fn test_drop_stops_worker() {
  let mut session = TrainingSession::spawn(lattice(), dataset(), &config(u32::MAX)).unwrap();
  let monitor = session.monitor();
  session.resume();
  assert!(wait_for(|| monitor.iterations() > 0));

  drop(session);
  assert!(monitor.is_done());
  let frozen = monitor.iterations();
  thread::sleep(Duration::from_millis(5));
  assert_eq!(monitor.iterations(), frozen);
}

#[test]
fn test_session_ids_are_unique() {
  let a = TrainingSession::spawn(lattice(), dataset(), &config(10)).unwrap();
  let b = TrainingSession::spawn(lattice(), dataset(), &config(10)).unwrap();
  assert_ne!(a.id(), b.id());
  assert!(b.id().raw() > a.id().raw());
}

#[test]
fn test_invalid_config_fails_fast() {
  let result = TrainingSession::spawn(lattice(), dataset(), &TrainingConfig::new().with_learning_rate(-1.0));
  assert!(matches!(result, Err(SomError::InvalidParameter { .. })));
}
