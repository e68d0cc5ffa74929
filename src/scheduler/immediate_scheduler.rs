use std::{future::Future, thread};

use tracing::trace;

use super::{run_task, Duration, Instant, Scheduler, SpawnHandle};

/// Runs every unit of work synchronously, on the thread that scheduled it.
///
/// Delays block that thread and a repeating task keeps the caller busy until
/// it asks to stop. `schedule` and `schedule_repeating` never enter an
/// executor, so this scheduler composes with work already running inside
/// `block_on` or on a pool worker.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  /// Drives `future` to completion on the calling thread. Panics when called
  /// from within another executor.
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
    trace!(?delay, "task run inline");
    if let Some(delay) = delay {
      thread::sleep(delay);
    }
    run_task(task);
    let handle = SpawnHandle::detached();
    handle.finish();
    handle
  }

  fn schedule_repeating<T>(
    &self,
    mut task: T,
    period: Duration,
    at: Option<Instant>,
  ) -> SpawnHandle
  where
    T: FnMut(usize) -> bool + Send + 'static,
  {
    trace!(?period, "repeating task run inline");
    let mut deadline = at.unwrap_or_else(|| Instant::now() + period);
    let mut seq = 0;
    loop {
      let now = Instant::now();
      if deadline > now {
        thread::sleep(deadline - now);
      }
      if !run_task(|| task(seq)).unwrap_or(false) {
        break;
      }
      seq += 1;
      deadline += period;
    }
    let handle = SpawnHandle::detached();
    handle.finish();
    handle
  }
}
