//! Completion or an error, without items.
//!
//! A [`Completable`] runs the wrapped source for its side effects and drops
//! every item it emits; subscribers only learn whether it completed.

use std::sync::Arc;

use crate::{
  error::RxError,
  observable::{EmptyOp, FromFnOp, Observable, ThrowOp},
  observer::Observer,
  ops::{observe_on::ObserveOnOp, subscribe_on::SubscribeOnOp},
  scheduler::{DynScheduler, Scheduler},
  subscriber::Subscriber,
  subscription::{SharedSubscription, SubscriptionWrapper},
};

#[derive(Clone)]
pub struct Completable<S>(S);

impl<S: Observable> Completable<S> {
  pub fn subscribe_on<SD: Scheduler>(self, scheduler: SD) -> Completable<SubscribeOnOp<Self, SD>> {
    Completable(SubscribeOnOp::new(self, scheduler))
  }

  pub fn observe_on<SD: Scheduler>(self, scheduler: SD) -> Completable<ObserveOnOp<Self, SD>> {
    Completable(ObserveOnOp::new(self, scheduler))
  }

  /// Subscribes `next` once this completable completed. An error skips it.
  pub fn and_then<S2: Observable>(self, next: Completable<S2>) -> Completable<AndThenOp<Self, S2>> {
    Completable(AndThenOp { first: self, second: Arc::new(next) })
  }

  /// Subscribes with one callback receiving `Ok(())` on completion or the
  /// error.
  pub fn subscribe_completion<F>(&self, on_result: F) -> SubscriptionWrapper<SharedSubscription>
  where
    F: FnOnce(Result<(), RxError>) + Send + 'static,
  {
    let subscription = SharedSubscription::default();
    self.actual_subscribe(Subscriber::new(
      CompletionObserver(Some(on_result)),
      subscription.clone(),
    ));
    SubscriptionWrapper(subscription)
  }
}

impl<S: Observable> Observable for Completable<S> {
  type Item = ();

  fn actual_subscribe(&self, subscriber: Subscriber<()>) {
    let subscription = subscriber.subscription().clone();
    self.0.actual_subscribe(Subscriber::new(IgnoreItems(subscriber), subscription))
  }

  fn delivery_scheduler(&self) -> Option<DynScheduler> { self.0.delivery_scheduler() }
}

struct IgnoreItems<O>(O);

impl<Item, O: Observer<()>> Observer<Item> for IgnoreItems<O> {
  fn next(&mut self, _value: Item) {}

  fn error(&mut self, err: RxError) { self.0.error(err) }

  fn complete(&mut self) { self.0.complete() }
}

struct CompletionObserver<F>(Option<F>);

impl<F> Observer<()> for CompletionObserver<F>
where
  F: FnOnce(Result<(), RxError>) + Send,
{
  fn next(&mut self, _value: ()) {}

  fn error(&mut self, err: RxError) {
    if let Some(f) = self.0.take() {
      f(Err(err))
    }
  }

  fn complete(&mut self) {
    if let Some(f) = self.0.take() {
      f(Ok(()))
    }
  }
}

/// Runs two completables one after the other.
pub struct AndThenOp<A, B> {
  first: A,
  second: Arc<Completable<B>>,
}

impl<A: Clone, B> Clone for AndThenOp<A, B> {
  fn clone(&self) -> Self { AndThenOp { first: self.first.clone(), second: self.second.clone() } }
}

impl<A, B> Observable for AndThenOp<A, B>
where
  A: Observable<Item = ()>,
  B: Observable,
{
  type Item = ();

  fn actual_subscribe(&self, subscriber: Subscriber<()>) {
    // The first part terminates on its own subscription, so its completion
    // leaves the shared one open for the second part.
    let first = SharedSubscription::default();
    subscriber.subscription().add(first.clone());
    self.first.actual_subscribe(Subscriber::new(
      AndThenObserver { downstream: Some(subscriber), second: self.second.clone() },
      first,
    ))
  }
}

struct AndThenObserver<B> {
  downstream: Option<Subscriber<()>>,
  second: Arc<Completable<B>>,
}

impl<B: Observable> Observer<()> for AndThenObserver<B> {
  fn next(&mut self, _value: ()) {}

  fn error(&mut self, err: RxError) {
    if let Some(mut downstream) = self.downstream.take() {
      downstream.error(err)
    }
  }

  fn complete(&mut self) {
    if let Some(downstream) = self.downstream.take() {
      if !downstream.is_finished() {
        self.second.actual_subscribe(downstream)
      }
    }
  }
}

/// A completable that completes at once.
pub fn complete() -> Completable<EmptyOp<()>> { Completable(crate::observable::empty()) }

/// A completable failing with `err`.
pub fn error(err: impl Into<RxError>) -> Completable<ThrowOp<()>> {
  Completable(crate::observable::throw_err(err))
}

/// Runs `action` once per subscription, then completes. A panicking action
/// becomes the error.
pub fn from_fn<F>(action: F) -> Completable<FromFnOp<F>>
where
  F: Fn() + Send + Sync + 'static,
{
  Completable(crate::observable::from_fn(action))
}

/// Runs `source` to its end, ignoring its items.
pub fn from_observable<S: Observable>(source: S) -> Completable<S> { Completable(source) }
