use std::future::Future;

use tokio::runtime::Handle;

use super::Scheduler;

impl Scheduler for Handle {
  fn spawn<Fut>(&self, future: Fut)
  where
    Fut: Future<Output = ()> + Send + 'static,
  {
    drop(Handle::spawn(self, future));
  }
}
