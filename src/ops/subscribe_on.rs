use std::sync::Arc;

use crate::{
  error::catch_task,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  scheduler::{DynScheduler, Scheduler},
  subscriber::Subscriber,
};

pub struct SubscribeOnOp<S, SD> {
  source: Arc<S>,
  scheduler: SD,
}

impl<S, SD> SubscribeOnOp<S, SD> {
  pub(crate) fn new(source: S, scheduler: SD) -> Self {
    SubscribeOnOp { source: Arc::new(source), scheduler }
  }
}

impl<S, SD: Clone> Clone for SubscribeOnOp<S, SD> {
  fn clone(&self) -> Self {
    SubscribeOnOp { source: self.source.clone(), scheduler: self.scheduler.clone() }
  }
}

impl<S, SD> Observable for SubscribeOnOp<S, SD>
where
  S: Observable,
  SD: Scheduler,
{
  type Item = S::Item;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item>) {
    let source = self.source.clone();
    let subscription = subscriber.subscription().clone();
    let c_subscription = subscription.clone();
    let downstream = MutArc::own(subscriber);
    let handle = self.scheduler.schedule(
      move || {
        if downstream.rc_deref().is_finished() {
          return;
        }
        let upstream = Subscriber::new(downstream.clone(), c_subscription);
        if let Err(err) = catch_task(|| source.actual_subscribe(upstream)) {
          let mut downstream = downstream;
          downstream.error(err);
        }
      },
      None,
    );
    subscription.add(handle);
  }

  fn delivery_scheduler(&self) -> Option<DynScheduler> { self.source.delivery_scheduler() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use futures::executor::ThreadPool;
  use std::{
    sync::{mpsc::channel, Arc, Mutex},
    thread,
    time::Duration,
  };

  fn named_pool(prefix: &str) -> ThreadPool {
    ThreadPool::builder().pool_size(1).name_prefix(prefix).create().unwrap()
  }

  fn thread_name() -> String { thread::current().name().unwrap_or_default().to_owned() }

  #[test]
  fn thread_pool() {
    let (tx, rx) = channel();
    observable::from_iter(1..5)
      .map(|v| (v, thread_name()))
      .subscribe_on(named_pool("sub-on-"))
      .subscribe_all(
        {
          let tx = tx.clone();
          move |v| tx.send(Some(v)).unwrap()
        },
        |_| {},
        move || tx.send(None).unwrap(),
      );
    let mut values = vec![];
    while let Some((v, name)) = rx.recv_timeout(Duration::from_secs(5)).unwrap() {
      assert!(name.starts_with("sub-on-"), "{}", name);
      values.push(v);
    }
    assert_eq!(values, vec![1, 2, 3, 4]);
  }

  #[test]
  fn first_subscribe_on_wins() {
    let (tx, rx) = channel();
    observable::create(move |emitter: Emitter<String>| {
      emitter.next(thread_name());
      emitter.complete();
    })
    .subscribe_on(named_pool("first-"))
    .subscribe_on(named_pool("second-"))
    .subscribe(move |name| tx.send(name).unwrap());
    let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(name.starts_with("first-"), "{}", name);
  }

  #[test]
  fn disposed_before_start_never_subscribes() {
    let scheduler = ManualScheduler::now();
    let subscribed = Arc::new(Mutex::new(false));
    let c_subscribed = subscribed.clone();
    let subscription = observable::of(1)
      .do_on_subscribe(move || *c_subscribed.lock().unwrap() = true)
      .subscribe_on(scheduler.clone())
      .subscribe(|_| {});
    subscription.unsubscribe();
    scheduler.run_tasks();
    assert!(!*subscribed.lock().unwrap());
  }

  #[test]
  fn source_panic_becomes_task_error() {
    let scheduler = ManualScheduler::now();
    let errors = Arc::new(Mutex::new(vec![]));
    let c_errors = errors.clone();
    observable::from_iter(PanickingIter)
      .subscribe_on(scheduler.clone())
      .subscribe_err(|_: i32| {}, move |e| c_errors.lock().unwrap().push(e));
    scheduler.run_tasks();
    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], RxError::TaskPanic(_)));
  }

  #[derive(Clone)]
  struct PanickingIter;

  impl Iterator for PanickingIter {
    type Item = i32;

    fn next(&mut self) -> Option<i32> { panic!("iterator failure") }
  }
}
