use std::sync::Arc;

use crate::{
  error::RxError,
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscriber::Subscriber,
  subscription::SharedSubscription,
};

/// Fan-out and merge: every source item is mapped to an inner observable,
/// all inner observables run concurrently and their items are forwarded as
/// they arrive.
///
/// The result completes once the source completed and every inner
/// observable completed. Any error, from the source or an inner observable,
/// is forwarded at once and releases everything still running.
pub struct FlatMapOp<S, F> {
  source: S,
  func: Arc<F>,
}

impl<S, F> FlatMapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { FlatMapOp { source, func: Arc::new(func) } }
}

impl<S: Clone, F> Clone for FlatMapOp<S, F> {
  fn clone(&self) -> Self { FlatMapOp { source: self.source.clone(), func: self.func.clone() } }
}

impl<S, F, Inner> Observable for FlatMapOp<S, F>
where
  S: Observable,
  F: Fn(S::Item) -> Inner + Send + Sync + 'static,
  Inner: Observable,
{
  type Item = Inner::Item;

  fn actual_subscribe(&self, subscriber: Subscriber<Inner::Item>) {
    let subscription = subscriber.subscription().clone();
    let outer = SharedSubscription::default();
    subscription.add(outer.clone());
    let state = MutArc::own(FlatMapState {
      downstream: subscriber,
      active: 0,
      outer_completed: false,
    });
    self.source.actual_subscribe(Subscriber::new(
      OuterObserver { state, func: self.func.clone(), subscription },
      outer,
    ))
  }
}

struct FlatMapState<Item> {
  downstream: Subscriber<Item>,
  active: usize,
  outer_completed: bool,
}

impl<Item> FlatMapState<Item> {
  fn complete_if_done(&mut self) {
    if self.outer_completed && self.active == 0 {
      self.downstream.complete();
    }
  }
}

struct OuterObserver<Item, F> {
  state: MutArc<FlatMapState<Item>>,
  func: Arc<F>,
  subscription: SharedSubscription,
}

impl<Item, Out, F, Inner> Observer<Item> for OuterObserver<Out, F>
where
  F: Fn(Item) -> Inner + Send + Sync,
  Inner: Observable<Item = Out>,
  Out: Send + 'static,
{
  fn next(&mut self, value: Item) {
    let inner = (self.func)(value);
    self.state.rc_deref_mut().active += 1;
    let inner_subscription = SharedSubscription::default();
    self.subscription.add(inner_subscription.clone());
    // Not holding the state lock: a synchronous inner emits right here.
    inner.actual_subscribe(Subscriber::new(
      InnerObserver { state: self.state.clone() },
      inner_subscription,
    ));
  }

  fn error(&mut self, err: RxError) { self.state.rc_deref_mut().downstream.error(err) }

  fn complete(&mut self) {
    let mut state = self.state.rc_deref_mut();
    state.outer_completed = true;
    state.complete_if_done();
  }
}

struct InnerObserver<Item> {
  state: MutArc<FlatMapState<Item>>,
}

impl<Item: Send> Observer<Item> for InnerObserver<Item> {
  fn next(&mut self, value: Item) { self.state.rc_deref_mut().downstream.next(value) }

  fn error(&mut self, err: RxError) { self.state.rc_deref_mut().downstream.error(err) }

  fn complete(&mut self) {
    let mut state = self.state.rc_deref_mut();
    state.active -= 1;
    state.complete_if_done();
  }
}
