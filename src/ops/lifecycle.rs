use std::{collections::VecDeque, sync::Arc, thread};

use crate::{
  error::{catch_callback, catch_task, RxError},
  observable::Observable,
  observer::{Notification, Observer},
  rc::MutArc,
  scheduler::DynScheduler,
  subscriber::Subscriber,
};

/// Runs an action each time the chain is subscribed.
///
/// Without a preceding `observe_on` the action runs on the subscribing
/// context before the upstream is subscribed, and a panicking action fails
/// that subscription without subscribing the upstream. After an `observe_on`
/// the action runs on that operator's scheduler, and notifications reach the
/// downstream only once it has run.
pub struct DoOnSubscribeOp<S, F> {
  source: S,
  action: Arc<F>,
}

impl<S, F> DoOnSubscribeOp<S, F> {
  pub(crate) fn new(source: S, action: F) -> Self {
    DoOnSubscribeOp { source, action: Arc::new(action) }
  }
}

impl<S: Clone, F> Clone for DoOnSubscribeOp<S, F> {
  fn clone(&self) -> Self {
    DoOnSubscribeOp { source: self.source.clone(), action: self.action.clone() }
  }
}

impl<S, F> Observable for DoOnSubscribeOp<S, F>
where
  S: Observable,
  F: Fn() + Send + Sync + 'static,
{
  type Item = S::Item;

  fn actual_subscribe(&self, mut subscriber: Subscriber<S::Item>) {
    if let Some(scheduler) = self.source.delivery_scheduler() {
      return self.subscribe_gated(scheduler, subscriber);
    }
    match catch_callback(|| (self.action)()) {
      Ok(()) => self.source.actual_subscribe(subscriber),
      Err(err) => subscriber.error(err),
    }
  }

  fn delivery_scheduler(&self) -> Option<DynScheduler> { self.source.delivery_scheduler() }
}

impl<S, F> DoOnSubscribeOp<S, F>
where
  S: Observable,
  F: Fn() + Send + Sync + 'static,
{
  fn subscribe_gated(&self, scheduler: DynScheduler, subscriber: Subscriber<S::Item>) {
    let subscription = subscriber.subscription().clone();
    let gate = MutArc::own(Gate { open: false, pending: VecDeque::new(), downstream: subscriber });
    let task = OpenGate { gate: Some(gate.clone()), action: self.action.clone() };
    let handle = match catch_task(|| scheduler.schedule(move || task.run())) {
      Ok(handle) => handle,
      Err(err) => {
        gate.rc_deref_mut().downstream.error(err);
        return;
      }
    };
    subscription.add(handle);
    self.source.actual_subscribe(Subscriber::new(GateObserver(gate), subscription));
  }
}

/// The scheduled subscribe action. Dropped unrun, it fails the downstream.
struct OpenGate<Item, F> {
  gate: Option<MutArc<Gate<Item>>>,
  action: Arc<F>,
}

impl<Item, F: Fn()> OpenGate<Item, F> {
  fn run(mut self) {
    let Some(gate) = self.gate.take() else { return };
    let mut gate = gate.rc_deref_mut();
    let gate = &mut *gate;
    match catch_callback(|| (self.action)()) {
      Ok(()) => {
        gate.open = true;
        while let Some(notification) = gate.pending.pop_front() {
          notification.accept(&mut gate.downstream);
        }
      }
      Err(err) => {
        gate.pending.clear();
        gate.downstream.error(err);
      }
    }
  }
}

impl<Item, F> Drop for OpenGate<Item, F> {
  fn drop(&mut self) {
    if thread::panicking() {
      return;
    }
    if let Some(gate) = self.gate.take() {
      let mut gate = gate.rc_deref_mut();
      if !gate.downstream.is_finished() {
        gate.pending.clear();
        let err = RxError::TaskPanic("subscribe action was dropped before it ran".to_owned());
        gate.downstream.error(err);
      }
    }
  }
}

/// Holds notifications back until the subscribe action has run.
struct Gate<Item> {
  open: bool,
  pending: VecDeque<Notification<Item>>,
  downstream: Subscriber<Item>,
}

struct GateObserver<Item>(MutArc<Gate<Item>>);

impl<Item> GateObserver<Item> {
  fn pass(&self, notification: Notification<Item>) {
    let mut gate = self.0.rc_deref_mut();
    if gate.open {
      notification.accept(&mut gate.downstream);
    } else {
      gate.pending.push_back(notification);
    }
  }
}

impl<Item: Send + 'static> Observer<Item> for GateObserver<Item> {
  fn next(&mut self, value: Item) { self.pass(Notification::Next(value)) }

  fn error(&mut self, err: RxError) { self.pass(Notification::Error(err)) }

  fn complete(&mut self) { self.pass(Notification::Complete) }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::{
    sync::{mpsc::channel, Arc, Mutex},
    thread,
    time::Duration,
  };

  #[test]
  fn runs_once_per_subscription() {
    let count = Arc::new(Mutex::new(0));
    let c_count = count.clone();
    let chain = observable::of(1).do_on_subscribe(move || *c_count.lock().unwrap() += 1);
    chain.subscribe(|_| {});
    chain.subscribe(|_| {});
    assert_eq!(*count.lock().unwrap(), 2);
  }

  #[test]
  fn runs_before_production() {
    let log = Arc::new(Mutex::new(vec![]));
    let (c1, c2) = (log.clone(), log.clone());
    observable::of("item")
      .do_on_subscribe(move || c1.lock().unwrap().push("subscribe"))
      .subscribe(move |v| c2.lock().unwrap().push(v));
    assert_eq!(*log.lock().unwrap(), vec!["subscribe", "item"]);
  }

  #[test]
  fn runs_on_downstream_subscribe_on_context() {
    let pool = futures::executor::ThreadPool::builder()
      .pool_size(1)
      .name_prefix("subscribe-ctx-")
      .create()
      .unwrap();
    let (tx, rx) = channel();
    observable::of(1)
      .do_on_subscribe(move || {
        tx.send(thread::current().name().map(str::to_owned)).unwrap();
      })
      .subscribe_on(pool)
      .subscribe(|_| {});
    let name = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert!(name.starts_with("subscribe-ctx-"));
  }

  #[test]
  fn panicking_action_errors() {
    let errors = Arc::new(Mutex::new(vec![]));
    let c_errors = errors.clone();
    observable::of(1)
      .do_on_subscribe(|| panic!("refused"))
      .subscribe_err(
        |_| panic!("no item expected"),
        move |e| c_errors.lock().unwrap().push(e),
      );
    assert_eq!(errors.lock().unwrap().len(), 1);
  }

  #[test]
  fn runs_on_preceding_observe_on_scheduler() {
    let pool = futures::executor::ThreadPool::builder()
      .pool_size(1)
      .name_prefix("delivery-ctx-")
      .create()
      .unwrap();
    let (tx, rx) = channel();
    observable::of(1)
      .observe_on(pool)
      .map(|v| v + 1)
      .do_on_subscribe(move || {
        tx.send(thread::current().name().map(str::to_owned)).unwrap();
      })
      .subscribe(|_| {});
    let name = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert!(name.starts_with("delivery-ctx-"), "{}", name);
  }

  #[test]
  fn scheduled_action_precedes_deliveries() {
    let scheduler = ManualScheduler::now();
    let log = Arc::new(Mutex::new(vec![]));
    let (c1, c2) = (log.clone(), log.clone());
    observable::from_iter(0..2)
      .observe_on(scheduler.clone())
      .do_on_subscribe(move || c1.lock().unwrap().push("subscribe".to_owned()))
      .subscribe(move |v| c2.lock().unwrap().push(v.to_string()));

    assert!(log.lock().unwrap().is_empty());
    scheduler.run_tasks();
    assert_eq!(*log.lock().unwrap(), vec!["subscribe", "0", "1"]);
  }

  #[test]
  fn scheduled_action_panic_errors() {
    let scheduler = ManualScheduler::now();
    let errors = Arc::new(Mutex::new(vec![]));
    let c_errors = errors.clone();
    observable::from_iter(0..2)
      .observe_on(scheduler.clone())
      .do_on_subscribe(|| panic!("refused"))
      .subscribe_err(
        |v| panic!("unexpected item {}", v),
        move |e| c_errors.lock().unwrap().push(e),
      );
    scheduler.run_tasks();
    assert_eq!(errors.lock().unwrap().len(), 1);
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

  #[test]
  fn refused_action_fails_the_subscription() {
    let errors = Arc::new(Mutex::new(vec![]));
    let c_errors = errors.clone();
    observable::of(1)
      .observe_on(RefusingScheduler)
      .do_on_subscribe(|| panic!("must not run"))
      .subscribe_err(
        |_| panic!("no item expected"),
        move |e| c_errors.lock().unwrap().push(e),
      );
    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], RxError::TaskPanic(_)));
  }
}
