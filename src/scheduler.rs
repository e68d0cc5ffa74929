//! Execution contexts.
//!
//! A [`Scheduler`] runs units of work, immediately, after a delay or
//! repeatedly. Operators such as `subscribe_on`, `observe_on` and `interval`
//! are generic over it, so a chain can mix several contexts:
//!
//! | Scheduler | Context |
//! |-----------|---------|
//! | [`computation()`] | bounded pool sized to the CPU count |
//! | [`io()`] | large pool for blocking work |
//! | [`new_thread()`] | a fresh OS thread per unit of work |
//! | [`immediate()`] | the caller's thread, inline |
//! | [`ManualScheduler`] | virtual time, driven by tests |
//!
//! Any `futures::executor::ThreadPool` is a scheduler as well, and with the
//! `tokio-scheduler` feature so is a `tokio::runtime::Handle`.

use std::{
  future::Future,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use futures::{
  future::{AbortHandle, Abortable},
  FutureExt,
};
use futures_time::task::sleep;
use tracing::trace;

use crate::{error::catch_task, subscription::SubscriptionLike};

pub use std::time::{Duration, Instant};

mod immediate_scheduler;
mod manual_scheduler;
mod thread_scheduler;
#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;

pub use immediate_scheduler::ImmediateScheduler;
pub use manual_scheduler::ManualScheduler;
pub use thread_scheduler::NewThreadScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::{
  computation, init_pools, io, try_computation, try_io, PoolConfig,
};

/// A Scheduler is an object to order task and schedule their execution.
///
/// Implementors only provide `spawn`; delayed and repeating work are built
/// on top of it. A panic escaping a scheduled task is caught by the runner,
/// logged, and never takes a worker thread down.
pub trait Scheduler: Clone + Send + Sync + 'static {
  fn spawn<Fut>(&self, future: Fut)
  where
    Fut: Future<Output = ()> + Send + 'static;

  /// Runs `task` once on this scheduler, after `delay` if one is given.
  fn schedule<T>(&self, task: T, delay: Option<Duration>) -> SpawnHandle
  where
    T: FnOnce() + Send + 'static,
  {
    trace!(?delay, "task scheduled");
    let (abort, registration) = AbortHandle::new_pair();
    let handle = SpawnHandle::new(abort);
    let finished = handle.clone();
    let scheduler = self.clone();
    let fut = async move {
      // The executor must stay alive while the work is pending.
      let _scheduler = scheduler;
      if let Some(delay) = delay {
        sleep(delay.into()).await;
      }
      run_task(task);
      finished.finish();
    };
    self.spawn(Abortable::new(fut, registration).map(|_| ()));
    handle
  }

  /// Runs `task` every `period`, first at `at` (or one period from now).
  /// The task receives the invocation index and returns whether it wants to
  /// keep running; it also stops once the returned handle is unsubscribed.
  fn schedule_repeating<T>(
    &self,
    mut task: T,
    period: Duration,
    at: Option<Instant>,
  ) -> SpawnHandle
  where
    T: FnMut(usize) -> bool + Send + 'static,
  {
    trace!(?period, "repeating task scheduled");
    let (abort, registration) = AbortHandle::new_pair();
    let handle = SpawnHandle::new(abort);
    let finished = handle.clone();
    let scheduler = self.clone();
    let fut = async move {
      let _scheduler = scheduler;
      let mut deadline = at.unwrap_or_else(|| Instant::now() + period);
      let mut seq = 0;
      loop {
        let now = Instant::now();
        if deadline > now {
          sleep((deadline - now).into()).await;
        }
        if finished.is_closed() || !run_task(|| task(seq)).unwrap_or(false) {
          break;
        }
        seq += 1;
        deadline += period;
      }
      finished.finish();
    };
    self.spawn(Abortable::new(fut, registration).map(|_| ()));
    handle
  }
}

/// Handle of a unit of work submitted to a [`Scheduler`].
///
/// It is closed once the work ran to its end or was cancelled; cancelling
/// drops the pending future without waiting for a running task.
#[derive(Clone, Debug)]
pub struct SpawnHandle {
  abort: AbortHandle,
  closed: Arc<AtomicBool>,
}

impl SpawnHandle {
  pub fn new(abort: AbortHandle) -> Self {
    SpawnHandle {
      abort,
      closed: Arc::new(AtomicBool::new(false)),
    }
  }

  /// A handle not bound to any future, for schedulers that keep their own
  /// task queue.
  pub fn detached() -> Self { Self::new(AbortHandle::new_pair().0) }

  pub(crate) fn finish(&self) { self.closed.store(true, Ordering::Release); }
}

impl SubscriptionLike for SpawnHandle {
  fn unsubscribe(&self) {
    self.closed.store(true, Ordering::Release);
    self.abort.abort();
  }

  #[inline]
  fn is_closed(&self) -> bool { self.closed.load(Ordering::Acquire) }
}

/// A [`Scheduler`] with its type erased, for code that only runs one-shot
/// work on it.
#[derive(Clone)]
pub struct DynScheduler(Arc<dyn Fn(Box<dyn FnOnce() + Send>) -> SpawnHandle + Send + Sync>);

impl DynScheduler {
  pub fn new<SD: Scheduler>(scheduler: SD) -> Self {
    DynScheduler(Arc::new(move |task: Box<dyn FnOnce() + Send>| scheduler.schedule(task, None)))
  }

  pub fn schedule<T>(&self, task: T) -> SpawnHandle
  where
    T: FnOnce() + Send + 'static,
  {
    (self.0)(Box::new(task))
  }
}

pub(crate) fn run_task<R>(task: impl FnOnce() -> R) -> Option<R> { catch_task(task).ok() }

/// Returns a Scheduler instance that creates a new thread for each unit of
/// work.
pub fn new_thread() -> NewThreadScheduler { NewThreadScheduler::default() }

/// Returns the scheduler running work synchronously on the caller's thread.
pub fn immediate() -> ImmediateScheduler { ImmediateScheduler }
