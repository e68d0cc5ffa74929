//! Zero or one value, or an error.
//!
//! A [`Maybe`] forwards the first item of the wrapped source followed by
//! completion, and releases the source. Unlike a [`Single`](crate::single),
//! a source completing without an item simply completes the maybe.

use crate::{
  error::RxError,
  observable::{EmptyOp, Observable, OfOp},
  observer::Observer,
  ops::{map::MapOp, observe_on::ObserveOnOp, subscribe_on::SubscribeOnOp},
  scheduler::{DynScheduler, Scheduler},
  subscriber::Subscriber,
  subscription::{SharedSubscription, SubscriptionWrapper},
};

#[derive(Clone)]
pub struct Maybe<S>(S);

impl<S: Observable> Maybe<S> {
  pub fn map<B, F>(self, f: F) -> Maybe<MapOp<Self, F>>
  where
    F: Fn(S::Item) -> B + Send + Sync + 'static,
    B: Send + 'static,
  {
    Maybe(MapOp::new(self, f))
  }

  pub fn subscribe_on<SD: Scheduler>(self, scheduler: SD) -> Maybe<SubscribeOnOp<Self, SD>> {
    Maybe(SubscribeOnOp::new(self, scheduler))
  }

  pub fn observe_on<SD: Scheduler>(self, scheduler: SD) -> Maybe<ObserveOnOp<Self, SD>> {
    Maybe(ObserveOnOp::new(self, scheduler))
  }

  /// Subscribes with one callback receiving the outcome: `Ok(Some(_))` for
  /// an item, `Ok(None)` for an empty completion.
  pub fn subscribe_maybe<F>(&self, on_result: F) -> SubscriptionWrapper<SharedSubscription>
  where
    F: FnOnce(Result<Option<S::Item>, RxError>) + Send + 'static,
  {
    let subscription = SharedSubscription::default();
    self.actual_subscribe(Subscriber::new(OutcomeObserver(Some(on_result)), subscription.clone()));
    SubscriptionWrapper(subscription)
  }
}

impl<S: Observable> Observable for Maybe<S> {
  type Item = S::Item;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item>) {
    let subscription = subscriber.subscription().clone();
    self.0.actual_subscribe(Subscriber::new(MaybeObserver(subscriber), subscription))
  }

  fn delivery_scheduler(&self) -> Option<DynScheduler> { self.0.delivery_scheduler() }
}

struct MaybeObserver<O>(O);

impl<Item, O: Observer<Item>> Observer<Item> for MaybeObserver<O> {
  fn next(&mut self, value: Item) {
    self.0.next(value);
    self.0.complete();
  }

  fn error(&mut self, err: RxError) { self.0.error(err) }

  fn complete(&mut self) { self.0.complete() }
}

struct OutcomeObserver<F>(Option<F>);

impl<Item, F> Observer<Item> for OutcomeObserver<F>
where
  F: FnOnce(Result<Option<Item>, RxError>) + Send,
{
  fn next(&mut self, value: Item) {
    if let Some(f) = self.0.take() {
      f(Ok(Some(value)))
    }
  }

  fn error(&mut self, err: RxError) {
    if let Some(f) = self.0.take() {
      f(Err(err))
    }
  }

  fn complete(&mut self) {
    if let Some(f) = self.0.take() {
      f(Ok(None))
    }
  }
}

/// A maybe emitting `value`.
pub fn just<Item>(value: Item) -> Maybe<OfOp<Item>>
where
  Item: Clone + Send + Sync + 'static,
{
  Maybe(crate::observable::of(value))
}

/// A maybe completing without an item.
pub fn empty<Item: Send + 'static>() -> Maybe<EmptyOp<Item>> { Maybe(crate::observable::empty()) }

/// The first item of `source`, or an empty completion.
pub fn from_observable<S: Observable>(source: S) -> Maybe<S> { Maybe(source) }
