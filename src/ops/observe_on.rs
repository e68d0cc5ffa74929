use std::{
  collections::VecDeque,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex, PoisonError,
  },
  thread,
};

use tracing::warn;

use crate::{
  error::{catch_task, RxError},
  observable::Observable,
  observer::{Notification, Observer},
  rc::MutArc,
  scheduler::{DynScheduler, Scheduler},
  subscriber::Subscriber,
  subscription::{SharedSubscription, SubscriptionLike},
};

#[derive(Clone)]
pub struct ObserveOnOp<S, SD> {
  source: S,
  scheduler: SD,
}

impl<S, SD> ObserveOnOp<S, SD> {
  pub(crate) fn new(source: S, scheduler: SD) -> Self { ObserveOnOp { source, scheduler } }
}

impl<S, SD> Observable for ObserveOnOp<S, SD>
where
  S: Observable,
  SD: Scheduler,
{
  type Item = S::Item;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item>) {
    let subscription = subscriber.subscription().clone();
    // The upstream terminates on its own subscription so that its completion
    // does not discard notifications still waiting in the queue.
    let upstream = SharedSubscription::default();
    subscription.add(upstream.clone());
    let observer = ObserveOnObserver(Arc::new(DeliveryQueue {
      queue: Mutex::new(VecDeque::new()),
      wip: AtomicUsize::new(0),
      downstream: MutArc::own(subscriber),
      subscription,
      scheduler: self.scheduler.clone(),
    }));
    self.source.actual_subscribe(Subscriber::new(observer, upstream));
  }

  fn delivery_scheduler(&self) -> Option<DynScheduler> {
    Some(DynScheduler::new(self.scheduler.clone()))
  }
}

struct DeliveryQueue<Item, SD> {
  queue: Mutex<VecDeque<Notification<Item>>>,
  wip: AtomicUsize,
  downstream: MutArc<Subscriber<Item>>,
  subscription: SharedSubscription,
  scheduler: SD,
}

pub struct ObserveOnObserver<Item, SD>(Arc<DeliveryQueue<Item, SD>>);

impl<Item, SD> ObserveOnObserver<Item, SD>
where
  Item: Send + 'static,
  SD: Scheduler,
{
  fn enqueue(&self, notification: Notification<Item>) {
    let state = &self.0;
    if state.subscription.is_closed() {
      return;
    }
    state
      .queue
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push_back(notification);
    if state.wip.fetch_add(1, Ordering::AcqRel) == 0 {
      let task = DrainTask { state: Some(state.clone()) };
      match catch_task(|| state.scheduler.schedule(move || task.run(), None)) {
        Ok(handle) => state.subscription.add(handle),
        Err(err) => state.abandon(err),
      }
    }
  }
}

/// The scheduled half of a [`DeliveryQueue`]. Dropping it unrun, because the
/// scheduler refused the work, fails the downstream so the subscription does
/// not hang.
struct DrainTask<Item, SD> {
  state: Option<Arc<DeliveryQueue<Item, SD>>>,
}

impl<Item, SD> DrainTask<Item, SD> {
  fn run(mut self) {
    if let Some(state) = self.state.take() {
      state.drain();
    }
  }
}

impl<Item, SD> Drop for DrainTask<Item, SD> {
  fn drop(&mut self) {
    // While unwinding, the caller of `schedule` reports the panic itself.
    if thread::panicking() {
      return;
    }
    if let Some(state) = self.state.take() {
      state.abandon(RxError::TaskPanic("delivery task was dropped before it ran".to_owned()));
    }
  }
}

impl<Item, SD> DeliveryQueue<Item, SD> {
  /// Gives up the drain role after scheduling failed and reports `err`.
  fn abandon(&self, err: RxError) {
    self.queue.lock().unwrap_or_else(PoisonError::into_inner).clear();
    self.wip.store(0, Ordering::Release);
    if !self.subscription.is_closed() {
      warn!(%err, "observe_on could not schedule its delivery");
      self.downstream.rc_deref_mut().error(err);
    }
  }

  /// Delivers everything queued, serially, then gives up the drain role
  /// unless notifications arrived meanwhile.
  fn drain(&self) {
    let mut missed = 1;
    loop {
      loop {
        let next = self.queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        let Some(notification) = next else { break };
        let mut downstream = self.downstream.rc_deref_mut();
        if downstream.is_finished() {
          drop(downstream);
          self.queue.lock().unwrap_or_else(PoisonError::into_inner).clear();
          break;
        }
        notification.accept(&mut *downstream);
      }
      missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
      if missed == 0 {
        break;
      }
    }
  }
}

impl<Item, SD> Observer<Item> for ObserveOnObserver<Item, SD>
where
  Item: Send + 'static,
  SD: Scheduler,
{
  fn next(&mut self, value: Item) { self.enqueue(Notification::Next(value)) }

  fn error(&mut self, err: RxError) { self.enqueue(Notification::Error(err)) }

  fn complete(&mut self) { self.enqueue(Notification::Complete) }
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

  fn thread_name() -> String { thread::current().name().unwrap_or_default().to_owned() }

  #[test]
  fn switch_thread() {
    let pool = ThreadPool::builder().name_prefix("observe-").create().unwrap();
    let (tx, rx) = channel();
    let emit_thread = Arc::new(Mutex::new(String::new()));
    let c_emit_thread = emit_thread.clone();
    observable::create(move |emitter: Emitter<i32>| {
      *c_emit_thread.lock().unwrap() = thread_name();
      (0..100).for_each(|v| emitter.next(v));
      emitter.complete();
    })
    .observe_on(pool)
    .subscribe_all(
      {
        let tx = tx.clone();
        move |v| tx.send(Some((v, thread_name()))).unwrap()
      },
      |_| {},
      move || tx.send(None).unwrap(),
    );

    let mut values = vec![];
    while let Some((v, name)) = rx.recv_timeout(Duration::from_secs(5)).unwrap() {
      assert!(name.starts_with("observe-"), "{}", name);
      values.push(v);
    }
    // Ordered even though the pool has several threads.
    assert_eq!(values, (0..100).collect::<Vec<_>>());
    assert_eq!(*emit_thread.lock().unwrap(), thread_name());
  }

  #[test]
  fn queued_items_survive_upstream_completion() {
    let scheduler = ManualScheduler::now();
    let seen = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(false));
    let (c_seen, c_completed) = (seen.clone(), completed.clone());
    observable::from_iter(0..3).observe_on(scheduler.clone()).subscribe_all(
      move |v| c_seen.lock().unwrap().push(v),
      |_| {},
      move || *c_completed.lock().unwrap() = true,
    );

    assert!(seen.lock().unwrap().is_empty());
    scheduler.run_tasks();
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    assert!(*completed.lock().unwrap());
  }

  #[test]
  fn dispose_drops_pending_deliveries() {
    let scheduler = ManualScheduler::now();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let subscription = observable::from_iter(0..3)
      .observe_on(scheduler.clone())
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    subscription.unsubscribe();
    scheduler.run_tasks();
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[test]
  fn segments_run_on_their_scheduler() {
    let first = ThreadPool::builder().pool_size(1).name_prefix("seg-one-").create().unwrap();
    let second = ThreadPool::builder().pool_size(1).name_prefix("seg-two-").create().unwrap();
    let (tx, rx) = channel();
    observable::from_iter(0..10)
      .observe_on(first)
      .map(|v| (v, thread_name()))
      .observe_on(second)
      .subscribe(move |(v, mapped_on)| tx.send((v, mapped_on, thread_name())).unwrap());

    for expected in 0..10 {
      let (v, mapped_on, delivered_on) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
      assert_eq!(v, expected);
      assert!(mapped_on.starts_with("seg-one-"));
      assert!(delivered_on.starts_with("seg-two-"));
    }
  }

  #[test]
  fn immediate_inside_immediate() {
    let seen = Arc::new(Mutex::new(vec![]));
    let errors = Arc::new(Mutex::new(vec![]));
    let (c_seen, c_errors) = (seen.clone(), errors.clone());
    observable::from_iter(0..3)
      .subscribe_on(scheduler::immediate())
      .observe_on(scheduler::immediate())
      .subscribe_err(
        move |v| c_seen.lock().unwrap().push(v),
        move |e| c_errors.lock().unwrap().push(e),
      );
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    assert!(errors.lock().unwrap().is_empty());
  }

  #[test]
  fn immediate_on_a_pool_worker() {
    let pool = ThreadPool::builder().pool_size(1).name_prefix("worker-").create().unwrap();
    let (tx, rx) = channel();
    let c_tx = tx.clone();
    observable::from_iter(0..3)
      .subscribe_on(pool)
      .observe_on(scheduler::immediate())
      .subscribe_all(
        move |v| c_tx.send(Some((v, thread_name()))).unwrap(),
        |e| panic!("unexpected error {}", e),
        move || tx.send(None).unwrap(),
      );

    let mut values = vec![];
    while let Some((v, name)) = rx.recv_timeout(Duration::from_secs(5)).unwrap() {
      assert!(name.starts_with("worker-"), "{}", name);
      values.push(v);
    }
    assert_eq!(values, vec![0, 1, 2]);
  }

  #[derive(Clone)]
  struct RefusingScheduler;

  impl Scheduler for RefusingScheduler {
    fn spawn<Fut>(&self, _future: Fut)
    where
      Fut: std::future::Future<Output = ()> + Send + 'static,
    {
    }
  }

  #[derive(Clone)]
  struct BrokenScheduler;

  impl Scheduler for BrokenScheduler {
    fn spawn<Fut>(&self, _future: Fut)
    where
      Fut: std::future::Future<Output = ()> + Send + 'static,
    {
      panic!("executor unavailable")
    }
  }

  fn errors_of<SD: Scheduler>(scheduler: SD) -> Vec<RxError> {
    let errors = Arc::new(Mutex::new(vec![]));
    let c_errors = errors.clone();
    observable::from_iter(0..3)
      .observe_on(scheduler)
      .subscribe_err(
        |v| panic!("unexpected item {}", v),
        move |e| c_errors.lock().unwrap().push(e),
      );
    let errors = errors.lock().unwrap().clone();
    errors
  }

  #[test]
  fn dropped_delivery_task_fails_the_subscription() {
    let errors = errors_of(RefusingScheduler);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], RxError::TaskPanic(_)));
  }

  #[test]
  fn panicking_scheduler_fails_the_subscription() {
    let errors = errors_of(BrokenScheduler);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], RxError::TaskPanic(msg) if msg.contains("executor unavailable")));
  }
}
