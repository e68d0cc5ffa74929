use std::sync::Arc;

use crate::{
  error::RxError,
  observable::Observable,
  observer::Observer,
  scheduler::DynScheduler,
  subscriber::Subscriber,
};

pub struct MapOp<S, F> {
  source: S,
  func: Arc<F>,
}

impl<S, F> MapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { MapOp { source, func: Arc::new(func) } }
}

impl<S: Clone, F> Clone for MapOp<S, F> {
  fn clone(&self) -> Self { MapOp { source: self.source.clone(), func: self.func.clone() } }
}

impl<S, F, B> Observable for MapOp<S, F>
where
  S: Observable,
  F: Fn(S::Item) -> B + Send + Sync + 'static,
  B: Send + 'static,
{
  type Item = B;

  fn actual_subscribe(&self, subscriber: Subscriber<B>) {
    let subscription = subscriber.subscription().clone();
    self.source.actual_subscribe(Subscriber::new(
      MapObserver { observer: subscriber, func: self.func.clone() },
      subscription,
    ))
  }

  fn delivery_scheduler(&self) -> Option<DynScheduler> { self.source.delivery_scheduler() }
}

struct MapObserver<O, F> {
  observer: O,
  func: Arc<F>,
}

impl<Item, B, O, F> Observer<Item> for MapObserver<O, F>
where
  O: Observer<B>,
  F: Fn(Item) -> B + Send + Sync,
{
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  fn error(&mut self, err: RxError) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }
}

pub struct TryMapOp<S, F> {
  source: S,
  func: Arc<F>,
}

impl<S, F> TryMapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { TryMapOp { source, func: Arc::new(func) } }
}

impl<S: Clone, F> Clone for TryMapOp<S, F> {
  fn clone(&self) -> Self { TryMapOp { source: self.source.clone(), func: self.func.clone() } }
}

impl<S, F, B, E> Observable for TryMapOp<S, F>
where
  S: Observable,
  F: Fn(S::Item) -> Result<B, E> + Send + Sync + 'static,
  B: Send + 'static,
  E: Into<RxError>,
{
  type Item = B;

  fn actual_subscribe(&self, subscriber: Subscriber<B>) {
    let subscription = subscriber.subscription().clone();
    self.source.actual_subscribe(Subscriber::new(
      TryMapObserver { observer: subscriber, func: self.func.clone() },
      subscription,
    ))
  }

  fn delivery_scheduler(&self) -> Option<DynScheduler> { self.source.delivery_scheduler() }
}

struct TryMapObserver<O, F> {
  observer: O,
  func: Arc<F>,
}

impl<Item, B, E, O, F> Observer<Item> for TryMapObserver<O, F>
where
  O: Observer<B>,
  F: Fn(Item) -> Result<B, E> + Send + Sync,
  E: Into<RxError>,
{
  fn next(&mut self, value: Item) {
    match (self.func)(value) {
      Ok(v) => self.observer.next(v),
      Err(err) => self.observer.error(err.into()),
    }
  }

  fn error(&mut self, err: RxError) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }
}
