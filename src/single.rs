//! One value or an error.
//!
//! A [`Single`] wraps any observable and guarantees its subscribers either
//! exactly one item followed by completion, or one error. The first item of
//! the wrapped source wins and releases the source; a source completing
//! without an item yields `RxError::NoElements`.

use crate::{
  error::RxError,
  observable::{create as create_observable, Emitter, FromCallableOp, Observable, OfOp},
  observer::Observer,
  ops::{flat_map::FlatMapOp, map::MapOp, observe_on::ObserveOnOp, subscribe_on::SubscribeOnOp},
  scheduler::{DynScheduler, Scheduler},
  subscriber::Subscriber,
  subscription::{SharedSubscription, SubscriptionWrapper},
};

#[derive(Clone)]
pub struct Single<S>(S);

impl<S: Observable> Single<S> {
  pub(crate) fn new(source: S) -> Self { Single(source) }

  pub fn map<B, F>(self, f: F) -> Single<MapOp<Self, F>>
  where
    F: Fn(S::Item) -> B + Send + Sync + 'static,
    B: Send + 'static,
  {
    Single(MapOp::new(self, f))
  }

  /// Chains a second single computation on the value of this one.
  pub fn flat_map<S2, F>(self, f: F) -> Single<FlatMapOp<Self, F>>
  where
    S2: Observable,
    F: Fn(S::Item) -> Single<S2> + Send + Sync + 'static,
  {
    Single(FlatMapOp::new(self, f))
  }

  pub fn subscribe_on<SD: Scheduler>(self, scheduler: SD) -> Single<SubscribeOnOp<Self, SD>> {
    Single(SubscribeOnOp::new(self, scheduler))
  }

  pub fn observe_on<SD: Scheduler>(self, scheduler: SD) -> Single<ObserveOnOp<Self, SD>> {
    Single(ObserveOnOp::new(self, scheduler))
  }

  /// Subscribes with one callback receiving the outcome, called at most once.
  pub fn subscribe_result<F>(&self, on_result: F) -> SubscriptionWrapper<SharedSubscription>
  where
    F: FnOnce(Result<S::Item, RxError>) + Send + 'static,
  {
    let subscription = SharedSubscription::default();
    self.actual_subscribe(Subscriber::new(
      ResultObserver(Some(on_result)),
      subscription.clone(),
    ));
    SubscriptionWrapper(subscription)
  }
}

impl<S: Observable> Observable for Single<S> {
  type Item = S::Item;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item>) {
    let subscription = subscriber.subscription().clone();
    self.0.actual_subscribe(Subscriber::new(
      SingleObserver { observer: subscriber, emitted: false },
      subscription,
    ))
  }

  fn delivery_scheduler(&self) -> Option<DynScheduler> { self.0.delivery_scheduler() }
}

struct SingleObserver<O> {
  observer: O,
  emitted: bool,
}

impl<Item, O: Observer<Item>> Observer<Item> for SingleObserver<O> {
  fn next(&mut self, value: Item) {
    if !self.emitted {
      self.emitted = true;
      self.observer.next(value);
      self.observer.complete();
    }
  }

  fn error(&mut self, err: RxError) { self.observer.error(err) }

  fn complete(&mut self) {
    if !self.emitted {
      self.observer.error(RxError::NoElements)
    }
  }
}

struct ResultObserver<F>(Option<F>);

impl<Item, F> Observer<Item> for ResultObserver<F>
where
  F: FnOnce(Result<Item, RxError>) + Send,
{
  fn next(&mut self, value: Item) {
    if let Some(f) = self.0.take() {
      f(Ok(value))
    }
  }

  fn error(&mut self, err: RxError) {
    if let Some(f) = self.0.take() {
      f(Err(err))
    }
  }

  fn complete(&mut self) {}
}

/// A single emitting `value`.
pub fn just<Item>(value: Item) -> Single<OfOp<Item>>
where
  Item: Clone + Send + Sync + 'static,
{
  Single(crate::observable::of(value))
}

/// A single computed lazily, per subscription, by `f`.
pub fn from_callable<F, Item, E>(f: F) -> Single<FromCallableOp<F>>
where
  F: Fn() -> Result<Item, E> + Send + Sync + 'static,
  Item: Send + 'static,
  E: Into<RxError>,
{
  Single(crate::observable::from_callable(f))
}

/// The first item of `source`, or `RxError::NoElements`.
pub fn from_observable<S: Observable>(source: S) -> Single<S> { Single(source) }

/// Handle given to the production logic of [`create`].
pub struct SingleEmitter<Item>(Emitter<Item>);

impl<Item> Clone for SingleEmitter<Item> {
  fn clone(&self) -> Self { SingleEmitter(self.0.clone()) }
}

impl<Item> SingleEmitter<Item> {
  pub fn success(&self, value: Item) {
    self.0.next(value);
    self.0.complete();
  }

  pub fn error(&self, err: impl Into<RxError>) { self.0.error(err) }

  pub fn is_disposed(&self) -> bool { self.0.is_disposed() }

  pub fn on_dispose(&self, cleanup: impl FnOnce() + Send + 'static) { self.0.on_dispose(cleanup) }
}

/// A single from production logic, which calls `success` or `error` on the
/// emitter it receives.
pub fn create<F, Item>(subscribe: F) -> Single<impl Observable<Item = Item>>
where
  F: Fn(SingleEmitter<Item>) + Send + Sync + 'static,
  Item: Send + 'static,
{
  Single(create_observable(move |emitter: Emitter<Item>| {
    subscribe(SingleEmitter(emitter))
  }))
}
