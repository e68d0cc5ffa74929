use std::sync::Arc;

use crate::{
  error::{catch_callback, RxError},
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
};

/// Calls `f` lazily, once per subscription, and emits its return value
/// followed by completion.
pub fn from_fn<F, Item>(f: F) -> FromFnOp<F>
where
  F: Fn() -> Item + Send + Sync + 'static,
  Item: Send + 'static,
{
  FromFnOp(Arc::new(f))
}

pub struct FromFnOp<F>(Arc<F>);

impl<F> Clone for FromFnOp<F> {
  fn clone(&self) -> Self { FromFnOp(self.0.clone()) }
}

impl<F, Item> Observable for FromFnOp<F>
where
  F: Fn() -> Item + Send + Sync + 'static,
  Item: Send + 'static,
{
  type Item = Item;

  fn actual_subscribe(&self, mut subscriber: Subscriber<Item>) {
    match catch_callback(|| (self.0)()) {
      Ok(v) => {
        subscriber.next(v);
        subscriber.complete();
      }
      Err(err) => subscriber.error(err),
    }
  }
}

/// Like [`from_fn`] for a fallible computation: `Ok` becomes the single item,
/// `Err` (or a panic) becomes the error notification.
pub fn from_callable<F, Item, E>(f: F) -> FromCallableOp<F>
where
  F: Fn() -> Result<Item, E> + Send + Sync + 'static,
  Item: Send + 'static,
  E: Into<RxError>,
{
  FromCallableOp(Arc::new(f))
}

pub struct FromCallableOp<F>(Arc<F>);

impl<F> Clone for FromCallableOp<F> {
  fn clone(&self) -> Self { FromCallableOp(self.0.clone()) }
}

impl<F, Item, E> Observable for FromCallableOp<F>
where
  F: Fn() -> Result<Item, E> + Send + Sync + 'static,
  Item: Send + 'static,
  E: Into<RxError>,
{
  type Item = Item;

  fn actual_subscribe(&self, mut subscriber: Subscriber<Item>) {
    match catch_callback(|| (self.0)()).and_then(|res| res.map_err(Into::into)) {
      Ok(v) => {
        subscriber.next(v);
        subscriber.complete();
      }
      Err(err) => subscriber.error(err),
    }
  }
}
