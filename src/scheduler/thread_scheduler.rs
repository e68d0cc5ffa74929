use std::{
  future::Future,
  sync::atomic::{AtomicUsize, Ordering},
  thread,
};

use tracing::error;

use super::Scheduler;

static THREAD_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Starts a dedicated OS thread for each unit of work.
#[derive(Clone, Copy, Debug, Default)]
pub struct NewThreadScheduler;

impl Scheduler for NewThreadScheduler {
  fn spawn<Fut>(&self, future: Fut)
  where
    Fut: Future<Output = ()> + Send + 'static,
  {
    let name = format!("rx-new-thread-{}", THREAD_SEQ.fetch_add(1, Ordering::Relaxed));
    if let Err(err) = thread::Builder::new()
      .name(name)
      .spawn(move || futures::executor::block_on(future))
    {
      error!(%err, "failed to spawn a scheduler thread, task dropped");
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::{sync::mpsc::channel, time::Duration};

  #[test]
  fn each_task_gets_a_thread() {
    let (tx, rx) = channel();
    for _ in 0..3 {
      let tx = tx.clone();
      NewThreadScheduler.schedule(
        move || tx.send(thread::current().name().map(str::to_owned)).unwrap(),
        None,
      );
    }
    let mut names: Vec<String> = (0..3)
      .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap())
      .collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 3);
    assert!(names.iter().all(|n| n.starts_with("rx-new-thread-")));
  }
}
