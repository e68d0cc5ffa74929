//! Side effect taps, passing every notification through unchanged.

use std::sync::Arc;

use crate::{
  error::{catch_callback, RxError},
  observable::Observable,
  observer::Observer,
  scheduler::DynScheduler,
  subscriber::Subscriber,
};

macro_rules! tap_op {
  ($name:ident, $observer:ident) => {
    pub struct $name<S, F> {
      source: S,
      func: Arc<F>,
    }

    impl<S, F> $name<S, F> {
      pub(crate) fn new(source: S, func: F) -> Self { $name { source, func: Arc::new(func) } }
    }

    impl<S: Clone, F> Clone for $name<S, F> {
      fn clone(&self) -> Self { $name { source: self.source.clone(), func: self.func.clone() } }
    }

    struct $observer<O, F> {
      observer: O,
      func: Arc<F>,
    }
  };
}

macro_rules! tap_observable {
  ($name:ident, $observer:ident, $($bound:tt)*) => {
    impl<S, F> Observable for $name<S, F>
    where
      S: Observable,
      F: $($bound)* + Send + Sync + 'static,
    {
      type Item = S::Item;

      fn actual_subscribe(&self, subscriber: Subscriber<S::Item>) {
        let subscription = subscriber.subscription().clone();
        self.source.actual_subscribe(Subscriber::new(
          $observer { observer: subscriber, func: self.func.clone() },
          subscription,
        ))
      }

      fn delivery_scheduler(&self) -> Option<DynScheduler> { self.source.delivery_scheduler() }
    }
  };
}

tap_op!(DoOnNextOp, DoOnNextObserver);
tap_op!(DoOnErrorOp, DoOnErrorObserver);
tap_op!(DoOnCompleteOp, DoOnCompleteObserver);

tap_observable!(DoOnNextOp, DoOnNextObserver, Fn(&S::Item));
tap_observable!(DoOnErrorOp, DoOnErrorObserver, Fn(&RxError));
tap_observable!(DoOnCompleteOp, DoOnCompleteObserver, Fn());

impl<Item, O, F> Observer<Item> for DoOnNextObserver<O, F>
where
  O: Observer<Item>,
  F: Fn(&Item) + Send + Sync,
{
  fn next(&mut self, value: Item) {
    (self.func)(&value);
    self.observer.next(value)
  }

  fn error(&mut self, err: RxError) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }
}

impl<Item, O, F> Observer<Item> for DoOnErrorObserver<O, F>
where
  O: Observer<Item>,
  F: Fn(&RxError) + Send + Sync,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(&mut self, err: RxError) {
    // A failing tap is logged, the original error still goes downstream.
    let _ = catch_callback(|| (self.func)(&err));
    self.observer.error(err)
  }

  fn complete(&mut self) { self.observer.complete() }
}

impl<Item, O, F> Observer<Item> for DoOnCompleteObserver<O, F>
where
  O: Observer<Item>,
  F: Fn() + Send + Sync,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(&mut self, err: RxError) { self.observer.error(err) }

  fn complete(&mut self) {
    match catch_callback(|| (self.func)()) {
      Ok(()) => self.observer.complete(),
      Err(err) => self.observer.error(err),
    }
  }
}
