use std::sync::Arc;

use crate::{observable::Observable, scheduler::DynScheduler, subscriber::Subscriber};

/// A type erased observable, so chains of different shapes can be stored or
/// returned together.
pub struct BoxOp<Item>(Arc<dyn Observable<Item = Item>>);

impl<Item: Send + 'static> BoxOp<Item> {
  pub(crate) fn new<S>(source: S) -> Self
  where
    S: Observable<Item = Item>,
  {
    BoxOp(Arc::new(source))
  }
}

impl<Item> Clone for BoxOp<Item> {
  fn clone(&self) -> Self { BoxOp(self.0.clone()) }
}

impl<Item: Send + 'static> Observable for BoxOp<Item> {
  type Item = Item;

  #[inline]
  fn actual_subscribe(&self, subscriber: Subscriber<Item>) { self.0.actual_subscribe(subscriber) }

  fn delivery_scheduler(&self) -> Option<DynScheduler> { self.0.delivery_scheduler() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn box_observable() {
    let seen = Arc::new(Mutex::new(vec![]));
    let sources: Vec<BoxOp<i32>> = vec![
      observable::of(1).box_it(),
      observable::from_iter(2..4).map(|v| v * 10).box_it(),
      observable::empty().box_it(),
    ];
    for source in sources {
      let c_seen = seen.clone();
      source.subscribe(move |v| c_seen.lock().unwrap().push(v));
    }
    assert_eq!(*seen.lock().unwrap(), vec![1, 20, 30]);
  }
}
