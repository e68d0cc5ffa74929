//! Virtual time scheduler for deterministic tests of time based operators.
//!
//! Time only moves when told to with [`ManualScheduler::advance_by`]; due
//! tasks then run synchronously on the calling thread, in order of their due
//! time and FIFO for tasks due at the same instant.
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let scheduler = ManualScheduler::now();
//! let seen = std::sync::Arc::new(std::sync::Mutex::new(vec![]));
//! let c_seen = seen.clone();
//! observable::interval(Duration::from_millis(10), scheduler.clone())
//!   .take(3)
//!   .subscribe(move |v| c_seen.lock().unwrap().push(v));
//!
//! scheduler.advance_by(Duration::from_millis(25));
//! assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
//! ```

use std::{
  cmp::Ordering,
  collections::BinaryHeap,
  future::Future,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use super::{run_task, Duration, Instant, Scheduler, SpawnHandle};
use crate::subscription::SubscriptionLike;

#[derive(Clone)]
pub struct ManualScheduler(Arc<Mutex<ManualState>>);

struct ManualState {
  now: Instant,
  next_task_id: usize,
  task_queue: BinaryHeap<ScheduledTask>,
}

enum Work {
  Once(Box<dyn FnOnce() + Send>),
  Repeating {
    task: Box<dyn FnMut(usize) -> bool + Send>,
    period: Duration,
    invokes: usize,
  },
}

struct ScheduledTask {
  due: Instant,
  task_id: usize,
  handle: SpawnHandle,
  work: Work,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.task_id == other.task_id }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

impl ManualState {
  fn push(&mut self, due: Instant, handle: SpawnHandle, work: Work) {
    let task_id = self.next_task_id;
    self.next_task_id += 1;
    self.task_queue.push(ScheduledTask { due, task_id, handle, work });
  }
}

impl ManualScheduler {
  pub fn new(now: Instant) -> Self {
    ManualScheduler(Arc::new(Mutex::new(ManualState {
      now,
      next_task_id: 0,
      task_queue: BinaryHeap::new(),
    })))
  }

  /// A scheduler whose virtual clock starts at the current instant.
  pub fn now() -> Self { Self::new(Instant::now()) }

  pub fn current_time(&self) -> Instant { self.state().now }

  /// Number of scheduled tasks that are neither finished nor cancelled.
  pub fn pending_count(&self) -> usize {
    self
      .state()
      .task_queue
      .iter()
      .filter(|t| !t.handle.is_closed())
      .count()
  }

  /// Runs the tasks due at the current virtual time.
  pub fn run_tasks(&self) { self.advance_by(Duration::ZERO) }

  /// Moves the virtual clock forward by `time`, running every task that
  /// becomes due on the way. Tasks scheduled by running tasks are honored if
  /// they fall inside the window.
  pub fn advance_by(&self, time: Duration) {
    let target = self.state().now + time;
    while let Some(task) = self.pop_due(target) {
      let ScheduledTask { due, handle, work, .. } = task;
      match work {
        Work::Once(task) => {
          run_task(task);
          handle.finish();
        }
        Work::Repeating { mut task, period, invokes } => {
          let keep_going = run_task(|| task(invokes)).unwrap_or(false);
          if keep_going && !handle.is_closed() {
            let work = Work::Repeating { task, period, invokes: invokes + 1 };
            self.state().push(due + period, handle, work);
          } else {
            handle.finish();
          }
        }
      }
    }
    let mut state = self.state();
    if state.now < target {
      state.now = target;
    }
  }

  fn pop_due(&self, target: Instant) -> Option<ScheduledTask> {
    let mut state = self.state();
    loop {
      if state.task_queue.peek()?.due > target {
        return None;
      }
      let task = state.task_queue.pop()?;
      if task.handle.is_closed() {
        continue;
      }
      if state.now < task.due {
        state.now = task.due;
      }
      return Some(task);
    }
  }

  fn state(&self) -> MutexGuard<'_, ManualState> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl Scheduler for ManualScheduler {
  fn spawn<Fut>(&self, future: Fut)
  where
    Fut: Future<Output = ()> + Send + 'static,
  {
    futures::executor::block_on(future)
  }

  fn schedule<T>(&self, task: T, delay: Option<Duration>) -> SpawnHandle
  where
    T: FnOnce() + Send + 'static,
  {
    let handle = SpawnHandle::detached();
    let mut state = self.state();
    let due = state.now + delay.unwrap_or_default();
    state.push(due, handle.clone(), Work::Once(Box::new(task)));
    handle
  }

  fn schedule_repeating<T>(&self, task: T, period: Duration, at: Option<Instant>) -> SpawnHandle
  where
    T: FnMut(usize) -> bool + Send + 'static,
  {
    let handle = SpawnHandle::detached();
    let mut state = self.state();
    let due = at.unwrap_or(state.now + period);
    let work = Work::Repeating { task: Box::new(task), period, invokes: 0 };
    state.push(due, handle.clone(), work);
    handle
  }
}
