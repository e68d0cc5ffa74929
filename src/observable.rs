//! Sources and the composition surface shared by every observable.
//!
//! An observable is an immutable description of a stream. Nothing runs when
//! a chain is built; every `subscribe` call starts a new, independent
//! execution of the whole chain with its own state and its own subscription.

use tracing::trace;

use crate::{
  error::RxError,
  observer::{ignore_complete, unhandled_error, Observer, ObserverAll},
  ops::{
    filter::FilterOp,
    flat_map::FlatMapOp,
    lifecycle::DoOnSubscribeOp,
    map::{MapOp, TryMapOp},
    observe_on::ObserveOnOp,
    subscribe_on::SubscribeOnOp,
    take::TakeOp,
    tap::{DoOnCompleteOp, DoOnErrorOp, DoOnNextOp},
    zip::ZipOp,
  },
  scheduler::{DynScheduler, Scheduler},
  single::Single,
  subscriber::Subscriber,
  subscription::{SharedSubscription, SubscriptionWrapper},
};

mod boxed;
mod create;
mod defer;
mod from_fn;
mod from_iter;
mod interval;
mod of;
mod timer;
mod trivial;

pub use boxed::BoxOp;
pub use create::{create, CreateOp, Emitter};
pub use defer::{defer, DeferOp};
pub use from_fn::{from_callable, from_fn, FromCallableOp, FromFnOp};
pub use from_iter::{from_array, from_iter, range, repeat, FromIterOp};
#[cfg(feature = "futures-scheduler")]
pub use interval::interval_on_computation;
pub use interval::{interval, interval_at, IntervalOp};
pub use of::{just, of, OfOp};
pub use timer::{timer, TimerOp};
pub use trivial::{empty, never, throw_err, EmptyOp, NeverOp, ThrowOp};

pub use crate::ops::zip::{zip, ZipAllOp};

/// A representation of any set of values over any amount of time.
///
/// `actual_subscribe` starts one execution, pushing notifications into
/// `subscriber`. Implementations must be re-invocable: the same value may be
/// subscribed many times, concurrently, from several threads.
pub trait Observable: Send + Sync + 'static {
  type Item: Send + 'static;

  fn actual_subscribe(&self, subscriber: Subscriber<Self::Item>);

  /// The scheduler notifications leave this observable on, when a preceding
  /// `observe_on` chose one. Operators passing notifications through
  /// unchanged report their source's.
  fn delivery_scheduler(&self) -> Option<DynScheduler> { None }
}

pub trait ObservableExt: Observable + Sized {
  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  fn map<B, F>(self, f: F) -> MapOp<Self, F>
  where
    F: Fn(Self::Item) -> B + Send + Sync + 'static,
    B: Send + 'static,
  {
    MapOp::new(self, f)
  }

  /// Like `map`, but an `Err` returned by `f` terminates the stream with
  /// that error.
  fn try_map<B, E, F>(self, f: F) -> TryMapOp<Self, F>
  where
    F: Fn(Self::Item) -> Result<B, E> + Send + Sync + 'static,
    B: Send + 'static,
    E: Into<RxError>,
  {
    TryMapOp::new(self, f)
  }

  /// Emit only those items that pass the predicate.
  fn filter<F>(self, predicate: F) -> FilterOp<Self, F>
  where
    F: Fn(&Self::Item) -> bool + Send + Sync + 'static,
  {
    FilterOp::new(self, predicate)
  }

  /// Emits only the first `count` values, then completes.
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp::new(self, count) }

  /// Maps every item to an inner observable and merges the items of all
  /// inner observables, subscribed concurrently. Completes once the source
  /// and every inner observable have completed.
  fn flat_map<S, F>(self, f: F) -> FlatMapOp<Self, F>
  where
    S: Observable,
    F: Fn(Self::Item) -> S + Send + Sync + 'static,
  {
    FlatMapOp::new(self, f)
  }

  /// `flat_map` whose inner sources each produce one value or an error.
  fn flat_map_single<S, F>(self, f: F) -> FlatMapOp<Self, F>
  where
    S: Observable,
    F: Fn(Self::Item) -> Single<S> + Send + Sync + 'static,
  {
    FlatMapOp::new(self, f)
  }

  /// Pairs items of `self` and `other` by position.
  #[allow(clippy::type_complexity)]
  fn zip<B>(self, other: B) -> ZipOp<Self, B, fn(Self::Item, B::Item) -> (Self::Item, B::Item)>
  where
    B: Observable,
  {
    let pair: fn(Self::Item, B::Item) -> (Self::Item, B::Item) = |a, b| (a, b);
    ZipOp::new(self, other, pair)
  }

  /// Combines items of `self` and `other` by position with `f`.
  fn zip_with<B, R, F>(self, other: B, f: F) -> ZipOp<Self, B, F>
  where
    B: Observable,
    F: Fn(Self::Item, B::Item) -> R + Send + Sync + 'static,
    R: Send + 'static,
  {
    ZipOp::new(self, other, f)
  }

  /// Runs the subscription to the source, and so its production, on
  /// `scheduler`. Only the `subscribe_on` closest to the source matters.
  fn subscribe_on<SD: Scheduler>(self, scheduler: SD) -> SubscribeOnOp<Self, SD> {
    SubscribeOnOp::new(self, scheduler)
  }

  /// Delivers every notification, and so runs everything downstream, on
  /// `scheduler`. Delivery stays serial and in order.
  fn observe_on<SD: Scheduler>(self, scheduler: SD) -> ObserveOnOp<Self, SD> {
    ObserveOnOp::new(self, scheduler)
  }

  fn do_on_next<F>(self, action: F) -> DoOnNextOp<Self, F>
  where
    F: Fn(&Self::Item) + Send + Sync + 'static,
  {
    DoOnNextOp::new(self, action)
  }

  fn do_on_error<F>(self, action: F) -> DoOnErrorOp<Self, F>
  where
    F: Fn(&RxError) + Send + Sync + 'static,
  {
    DoOnErrorOp::new(self, action)
  }

  fn do_on_complete<F>(self, action: F) -> DoOnCompleteOp<Self, F>
  where
    F: Fn() + Send + Sync + 'static,
  {
    DoOnCompleteOp::new(self, action)
  }

  /// Runs `action` each time the chain is subscribed, on the context the
  /// subscription reaches this stage on, before the source is subscribed.
  fn do_on_subscribe<F>(self, action: F) -> DoOnSubscribeOp<Self, F>
  where
    F: Fn() + Send + Sync + 'static,
  {
    DoOnSubscribeOp::new(self, action)
  }

  /// The first item as a [`Single`], or `RxError::NoElements` if the source
  /// completes empty.
  fn first_or_error(self) -> Single<Self> { Single::new(self) }

  /// Erases the concrete type of the chain.
  fn box_it(self) -> BoxOp<Self::Item> { BoxOp::new(self) }

  fn subscribe<N>(&self, next: N) -> SubscriptionWrapper<SharedSubscription>
  where
    N: FnMut(Self::Item) + Send + 'static,
  {
    self.subscribe_with(ObserverAll::new(next, unhandled_error, ignore_complete))
  }

  fn subscribe_err<N, E>(&self, next: N, error: E) -> SubscriptionWrapper<SharedSubscription>
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnMut(RxError) + Send + 'static,
  {
    self.subscribe_with(ObserverAll::new(next, error, ignore_complete))
  }

  fn subscribe_all<N, E, C>(
    &self,
    next: N,
    error: E,
    complete: C,
  ) -> SubscriptionWrapper<SharedSubscription>
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnMut(RxError) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    self.subscribe_with(ObserverAll::new(next, error, complete))
  }

  fn subscribe_with<O>(&self, observer: O) -> SubscriptionWrapper<SharedSubscription>
  where
    O: Observer<Self::Item> + 'static,
  {
    let subscription = SharedSubscription::default();
    trace!(item = std::any::type_name::<Self::Item>(), "subscribe");
    self.actual_subscribe(Subscriber::new(observer, subscription.clone()));
    SubscriptionWrapper(subscription)
  }
}

impl<T: Observable> ObservableExt for T {}
