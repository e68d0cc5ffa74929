use std::sync::Arc;

use crate::{
  error::RxError,
  observable::Observable,
  observer::Observer,
  scheduler::DynScheduler,
  subscriber::Subscriber,
};

/// Emit only those items from an Observable that pass a predicate test.
pub struct FilterOp<S, F> {
  source: S,
  filter: Arc<F>,
}

impl<S, F> FilterOp<S, F> {
  pub(crate) fn new(source: S, filter: F) -> Self { FilterOp { source, filter: Arc::new(filter) } }
}

impl<S: Clone, F> Clone for FilterOp<S, F> {
  fn clone(&self) -> Self { FilterOp { source: self.source.clone(), filter: self.filter.clone() } }
}

impl<S, F> Observable for FilterOp<S, F>
where
  S: Observable,
  F: Fn(&S::Item) -> bool + Send + Sync + 'static,
{
  type Item = S::Item;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item>) {
    let subscription = subscriber.subscription().clone();
    self.source.actual_subscribe(Subscriber::new(
      FilterObserver { observer: subscriber, filter: self.filter.clone() },
      subscription,
    ))
  }

  fn delivery_scheduler(&self) -> Option<DynScheduler> { self.source.delivery_scheduler() }
}

struct FilterObserver<O, F> {
  observer: O,
  filter: Arc<F>,
}

impl<Item, O, F> Observer<Item> for FilterObserver<O, F>
where
  O: Observer<Item>,
  F: Fn(&Item) -> bool + Send + Sync,
{
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

  fn error(&mut self, err: RxError) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn even_numbers() {
    let coll = Arc::new(Mutex::new(vec![]));
    let c_coll = coll.clone();
    observable::from_iter(0..10)
      .filter(|v| v % 2 == 0)
      .subscribe(move |v| c_coll.lock().unwrap().push(v));
    assert_eq!(*coll.lock().unwrap(), vec![0, 2, 4, 6, 8]);
  }

  #[test]
  fn complete_passes_through() {
    let completed = Arc::new(Mutex::new(false));
    let c_completed = completed.clone();
    observable::from_iter(0..3).filter(|_| false).subscribe_all(
      |_| panic!("nothing passes"),
      |_| {},
      move || *c_completed.lock().unwrap() = true,
    );
    assert!(*completed.lock().unwrap());
  }
}
