use std::{marker::PhantomData, sync::Arc};

use crate::{
  error::{catch_callback, RxError},
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscriber::Subscriber,
  subscription::ClosureSubscription,
};

/// Creates an observable from the production logic `subscribe`.
///
/// `subscribe` runs once per subscription with a fresh [`Emitter`]. Calls made
/// on the emitter after `error` or `complete`, or after the subscription was
/// released, are ignored. A panic inside `subscribe` is delivered as an error.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::create(|emitter: Emitter<&'static str>| {
///   emitter.next("1");
///   emitter.next("2");
///   emitter.complete();
///   emitter.next("never delivered");
/// })
/// .subscribe(|v| println!("{}", v));
/// ```
pub fn create<F, Item>(subscribe: F) -> CreateOp<F, Item>
where
  F: Fn(Emitter<Item>) + Send + Sync + 'static,
{
  CreateOp { func: Arc::new(subscribe), _marker: PhantomData }
}

pub struct CreateOp<F, Item> {
  func: Arc<F>,
  _marker: PhantomData<fn() -> Item>,
}

impl<F, Item> Clone for CreateOp<F, Item> {
  fn clone(&self) -> Self { CreateOp { func: self.func.clone(), _marker: PhantomData } }
}

impl<F, Item> Observable for CreateOp<F, Item>
where
  F: Fn(Emitter<Item>) + Send + Sync + 'static,
  Item: Send + 'static,
{
  type Item = Item;

  fn actual_subscribe(&self, subscriber: Subscriber<Item>) {
    let emitter = Emitter(MutArc::own(subscriber));
    let c_emitter = emitter.clone();
    if let Err(err) = catch_callback(|| (self.func)(c_emitter)) {
      emitter.error(err);
    }
  }
}

/// Handle given to the production logic of [`create`]. It can be cloned and
/// moved to other threads; all clones feed the same subscription.
pub struct Emitter<Item>(MutArc<Subscriber<Item>>);

impl<Item> Clone for Emitter<Item> {
  fn clone(&self) -> Self { Emitter(self.0.clone()) }
}

impl<Item> Emitter<Item> {
  pub fn next(&self, value: Item) { self.0.rc_deref_mut().next(value) }

  pub fn error(&self, err: impl Into<RxError>) { self.0.rc_deref_mut().error(err.into()) }

  pub fn complete(&self) { self.0.rc_deref_mut().complete() }

  /// Whether emitting is pointless: the subscription was released or a
  /// terminal notification was already sent. Long running producers should
  /// poll it and stop.
  pub fn is_disposed(&self) -> bool { self.0.rc_deref().is_finished() }

  /// Registers `cleanup` to run when the subscription is released, either by
  /// the subscriber or by termination. Runs at once if it already was.
  pub fn on_dispose(&self, cleanup: impl FnOnce() + Send + 'static) {
    let subscription = self.0.rc_deref().subscription().clone();
    subscription.add(ClosureSubscription::new(cleanup));
  }
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
  fn nothing_after_terminal() {
    let log = Arc::new(Mutex::new(vec![]));
    let (n, e, c) = (log.clone(), log.clone(), log.clone());
    observable::create(|emitter: Emitter<&'static str>| {
      emitter.next("1");
      emitter.next("2");
      emitter.next("3");
      emitter.complete();
      emitter.next("4");
      emitter.error("late");
    })
    .subscribe_all(
      move |v| n.lock().unwrap().push(v.to_owned()),
      move |err| e.lock().unwrap().push(format!("error {}", err)),
      move || c.lock().unwrap().push("complete".to_owned()),
    );
    assert_eq!(*log.lock().unwrap(), vec!["1", "2", "3", "complete"]);
  }

  #[test]
  fn panic_in_logic_is_an_error() {
    let errors = Arc::new(Mutex::new(vec![]));
    let c_errors = errors.clone();
    observable::create(|emitter: Emitter<i32>| {
      emitter.next(1);
      panic!("producer failure");
    })
    .subscribe_err(|_| {}, move |e| c_errors.lock().unwrap().push(e.to_string()));
    assert_eq!(*errors.lock().unwrap(), vec!["callback panicked: producer failure"]);
  }

  #[test]
  fn cleanup_runs_on_unsubscribe() {
    let cleaned = Arc::new(Mutex::new(0));
    let c_cleaned = cleaned.clone();
    let subscription = observable::create(move |emitter: Emitter<i32>| {
      let c_cleaned = c_cleaned.clone();
      emitter.on_dispose(move || *c_cleaned.lock().unwrap() += 1);
      emitter.next(1);
    })
    .subscribe(|_| {});
    assert_eq!(*cleaned.lock().unwrap(), 0);
    subscription.unsubscribe();
    subscription.unsubscribe();
    assert_eq!(*cleaned.lock().unwrap(), 1);
  }

  #[test]
  fn emit_from_another_thread() {
    let (tx, rx) = channel();
    observable::create(|emitter: Emitter<i32>| {
      thread::spawn(move || {
        (0..3).for_each(|v| emitter.next(v));
        emitter.complete();
      });
    })
    .subscribe_all(
      {
        let tx = tx.clone();
        move |v| tx.send(Some(v)).unwrap()
      },
      |_| {},
      move || tx.send(None).unwrap(),
    );
    let mut values = vec![];
    while let Some(v) = rx.recv_timeout(Duration::from_secs(5)).unwrap() {
      values.push(v);
    }
    assert_eq!(values, vec![0, 1, 2]);
  }

  #[test]
  fn disposed_emitter_reports_it() {
    let emitter_slot = Arc::new(Mutex::new(None));
    let c_slot = emitter_slot.clone();
    let subscription = observable::create(move |emitter: Emitter<i32>| {
      *c_slot.lock().unwrap() = Some(emitter);
    })
    .subscribe(|_| panic!("nothing emitted after dispose"));
    subscription.unsubscribe();
    let emitter = emitter_slot.lock().unwrap().take().unwrap();
    assert!(emitter.is_disposed());
    emitter.next(1);
  }
}
