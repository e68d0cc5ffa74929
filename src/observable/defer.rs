use std::sync::Arc;

use crate::{
  error::catch_callback,
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
};

/// Creates an observable that will on subscription defer to another observable
/// that is supplied by a supplier-function which will be run once at each
/// subscription
///
/// ```rust
/// # use rxcore::prelude::*;
///
/// observable::defer(|| {
///   println!("Hi!");
///   observable::of("Hello!")
/// })
/// .subscribe(move |v| {
///   println!("{}", v);
/// });
/// // Prints: Hi!\nHello!\n
/// ```
pub fn defer<F, S>(observable_supplier: F) -> DeferOp<F>
where
  F: Fn() -> S + Send + Sync + 'static,
  S: Observable,
{
  DeferOp(Arc::new(observable_supplier))
}

pub struct DeferOp<F>(Arc<F>);

impl<F> Clone for DeferOp<F> {
  fn clone(&self) -> Self { DeferOp(self.0.clone()) }
}

impl<F, S> Observable for DeferOp<F>
where
  F: Fn() -> S + Send + Sync + 'static,
  S: Observable,
{
  type Item = S::Item;

  fn actual_subscribe(&self, mut subscriber: Subscriber<S::Item>) {
    match catch_callback(|| (self.0)()) {
      Ok(source) => source.actual_subscribe(subscriber),
      Err(err) => subscriber.error(err),
    }
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn supplier_runs_per_subscription() {
    let hits = Arc::new(Mutex::new(0));
    let c_hits = hits.clone();
    let source = observable::defer(move || {
      *c_hits.lock().unwrap() += 1;
      observable::of(())
    });
    assert_eq!(*hits.lock().unwrap(), 0);
    source.subscribe(|_| {});
    source.subscribe(|_| {});
    assert_eq!(*hits.lock().unwrap(), 2);
  }
}
