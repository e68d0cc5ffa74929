use crate::{
  error::RxError,
  observable::Observable,
  observer::Observer,
  scheduler::DynScheduler,
  subscriber::Subscriber,
};

/// Emits only the first `count` values emitted by the source Observable.
///
/// If the source emits fewer than `count` values then all of its values are
/// emitted. After that, it completes, regardless if the source completes,
/// and the source is released.
#[derive(Clone)]
pub struct TakeOp<S> {
  source: S,
  count: usize,
}

impl<S> TakeOp<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { TakeOp { source, count } }
}

impl<S: Observable> Observable for TakeOp<S> {
  type Item = S::Item;

  fn actual_subscribe(&self, mut subscriber: Subscriber<S::Item>) {
    if self.count == 0 {
      subscriber.complete();
      return;
    }
    let subscription = subscriber.subscription().clone();
    self.source.actual_subscribe(Subscriber::new(
      TakeObserver { observer: subscriber, remaining: self.count },
      subscription,
    ))
  }

  fn delivery_scheduler(&self) -> Option<DynScheduler> { self.source.delivery_scheduler() }
}

struct TakeObserver<O> {
  observer: O,
  remaining: usize,
}

impl<Item, O: Observer<Item>> Observer<Item> for TakeObserver<O> {
  fn next(&mut self, value: Item) {
    if self.remaining > 0 {
      self.remaining -= 1;
      self.observer.next(value);
      if self.remaining == 0 {
        self.observer.complete();
      }
    }
  }

  fn error(&mut self, err: RxError) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }
}
