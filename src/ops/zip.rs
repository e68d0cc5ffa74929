//! Positional pairing of several sources.
//!
//! Every source is subscribed concurrently and its unconsumed items are
//! buffered. A combined item is emitted as soon as each source has one
//! buffered item, consuming exactly one item per source. The result
//! completes as soon as one source has completed and has nothing left to
//! pair; an error from any source is forwarded at once and releases the
//! others.

use std::{collections::VecDeque, sync::Arc};

use crate::{
  error::{catch_callback, RxError},
  observable::Observable,
  observer::Observer,
  rc::MutArc,
  subscriber::Subscriber,
  subscription::SharedSubscription,
};

pub struct ZipOp<A, B, F> {
  a: A,
  b: B,
  func: Arc<F>,
}

impl<A, B, F> ZipOp<A, B, F> {
  pub(crate) fn new(a: A, b: B, func: F) -> Self { ZipOp { a, b, func: Arc::new(func) } }
}

impl<A: Clone, B: Clone, F> Clone for ZipOp<A, B, F> {
  fn clone(&self) -> Self {
    ZipOp { a: self.a.clone(), b: self.b.clone(), func: self.func.clone() }
  }
}

impl<A, B, F, R> Observable for ZipOp<A, B, F>
where
  A: Observable,
  B: Observable,
  F: Fn(A::Item, B::Item) -> R + Send + Sync + 'static,
  R: Send + 'static,
{
  type Item = R;

  fn actual_subscribe(&self, subscriber: Subscriber<R>) {
    let subscription = subscriber.subscription().clone();
    let state = MutArc::own(ZipState {
      downstream: subscriber,
      a: VecDeque::new(),
      b: VecDeque::new(),
      a_done: false,
      b_done: false,
      func: self.func.clone(),
    });

    let a_subscription = SharedSubscription::default();
    subscription.add(a_subscription.clone());
    self.a.actual_subscribe(Subscriber::new(ZipA(state.clone()), a_subscription));

    let b_subscription = SharedSubscription::default();
    subscription.add(b_subscription.clone());
    self.b.actual_subscribe(Subscriber::new(ZipB(state), b_subscription));
  }
}

struct ZipState<A, B, R, F> {
  downstream: Subscriber<R>,
  a: VecDeque<A>,
  b: VecDeque<B>,
  a_done: bool,
  b_done: bool,
  func: Arc<F>,
}

impl<A, B, R, F> ZipState<A, B, R, F>
where
  F: Fn(A, B) -> R,
{
  fn emit_pairs(&mut self) {
    while !self.a.is_empty() && !self.b.is_empty() {
      let (Some(a), Some(b)) = (self.a.pop_front(), self.b.pop_front()) else { break };
      match catch_callback(|| (self.func)(a, b)) {
        Ok(v) => self.downstream.next(v),
        Err(err) => {
          self.downstream.error(err);
          return;
        }
      }
    }
    if (self.a_done && self.a.is_empty()) || (self.b_done && self.b.is_empty()) {
      self.a.clear();
      self.b.clear();
      self.downstream.complete();
    }
  }
}

struct ZipA<A, B, R, F>(MutArc<ZipState<A, B, R, F>>);
struct ZipB<A, B, R, F>(MutArc<ZipState<A, B, R, F>>);

impl<A, B, R, F> Observer<A> for ZipA<A, B, R, F>
where
  A: Send,
  B: Send,
  F: Fn(A, B) -> R + Send + Sync,
{
  fn next(&mut self, value: A) {
    let mut state = self.0.rc_deref_mut();
    state.a.push_back(value);
    state.emit_pairs();
  }

  fn error(&mut self, err: RxError) { self.0.rc_deref_mut().downstream.error(err) }

  fn complete(&mut self) {
    let mut state = self.0.rc_deref_mut();
    state.a_done = true;
    state.emit_pairs();
  }
}

impl<A, B, R, F> Observer<B> for ZipB<A, B, R, F>
where
  A: Send,
  B: Send,
  F: Fn(A, B) -> R + Send + Sync,
{
  fn next(&mut self, value: B) {
    let mut state = self.0.rc_deref_mut();
    state.b.push_back(value);
    state.emit_pairs();
  }

  fn error(&mut self, err: RxError) { self.0.rc_deref_mut().downstream.error(err) }

  fn complete(&mut self) {
    let mut state = self.0.rc_deref_mut();
    state.b_done = true;
    state.emit_pairs();
  }
}

/// Zips any number of sources of the same item type, combining one item of
/// each source, in source order, with `combiner`.
///
/// With no source at all the result completes immediately.
pub fn zip<S, F, R>(sources: Vec<S>, combiner: F) -> ZipAllOp<S, F>
where
  S: Observable,
  F: Fn(Vec<S::Item>) -> R + Send + Sync + 'static,
  R: Send + 'static,
{
  ZipAllOp { sources: Arc::new(sources), func: Arc::new(combiner) }
}

pub struct ZipAllOp<S, F> {
  sources: Arc<Vec<S>>,
  func: Arc<F>,
}

impl<S, F> Clone for ZipAllOp<S, F> {
  fn clone(&self) -> Self { ZipAllOp { sources: self.sources.clone(), func: self.func.clone() } }
}

impl<S, F, R> Observable for ZipAllOp<S, F>
where
  S: Observable,
  F: Fn(Vec<S::Item>) -> R + Send + Sync + 'static,
  R: Send + 'static,
{
  type Item = R;

  fn actual_subscribe(&self, mut subscriber: Subscriber<R>) {
    if self.sources.is_empty() {
      subscriber.complete();
      return;
    }
    let subscription = subscriber.subscription().clone();
    let count = self.sources.len();
    let state = MutArc::own(ZipAllState {
      downstream: subscriber,
      buffers: (0..count).map(|_| VecDeque::new()).collect(),
      done: vec![false; count],
      func: self.func.clone(),
    });
    for (index, source) in self.sources.iter().enumerate() {
      let source_subscription = SharedSubscription::default();
      subscription.add(source_subscription.clone());
      source.actual_subscribe(Subscriber::new(
        ZipAllObserver { state: state.clone(), index },
        source_subscription,
      ));
    }
  }
}

struct ZipAllState<Item, R, F> {
  downstream: Subscriber<R>,
  buffers: Vec<VecDeque<Item>>,
  done: Vec<bool>,
  func: Arc<F>,
}

impl<Item, R, F> ZipAllState<Item, R, F>
where
  F: Fn(Vec<Item>) -> R,
{
  fn emit_rows(&mut self) {
    while self.buffers.iter().all(|b| !b.is_empty()) {
      let row: Vec<Item> = self.buffers.iter_mut().filter_map(VecDeque::pop_front).collect();
      match catch_callback(|| (self.func)(row)) {
        Ok(v) => self.downstream.next(v),
        Err(err) => {
          self.downstream.error(err);
          return;
        }
      }
    }
    let exhausted = self
      .buffers
      .iter()
      .zip(&self.done)
      .any(|(buffer, done)| *done && buffer.is_empty());
    if exhausted {
      self.buffers.iter_mut().for_each(VecDeque::clear);
      self.downstream.complete();
    }
  }
}

struct ZipAllObserver<Item, R, F> {
  state: MutArc<ZipAllState<Item, R, F>>,
  index: usize,
}

impl<Item, R, F> Observer<Item> for ZipAllObserver<Item, R, F>
where
  Item: Send,
  F: Fn(Vec<Item>) -> R + Send + Sync,
{
  fn next(&mut self, value: Item) {
    let mut state = self.state.rc_deref_mut();
    state.buffers[self.index].push_back(value);
    state.emit_rows();
  }

  fn error(&mut self, err: RxError) { self.state.rc_deref_mut().downstream.error(err) }

  fn complete(&mut self) {
    let mut state = self.state.rc_deref_mut();
    state.done[self.index] = true;
    state.emit_rows();
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::{
    sync::{mpsc::channel, Arc, Mutex},
    time::Duration,
  };

  #[test]
  fn pairs_by_position() {
    let seen = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(false));
    let (c_seen, c_completed) = (seen.clone(), completed.clone());
    observable::from_array([1, 2, 3])
      .zip(observable::from_array(["a", "b"]))
      .subscribe_all(
        move |v| c_seen.lock().unwrap().push(v),
        |_| {},
        move || *c_completed.lock().unwrap() = true,
      );
    assert_eq!(*seen.lock().unwrap(), vec![(1, "a"), (2, "b")]);
    assert!(*completed.lock().unwrap());
  }

  #[test]
  fn combiner_sees_values_in_source_order() {
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::zip(
      vec![
        observable::from_iter(vec![1, 2, 3]).box_it(),
        observable::from_iter(vec![10, 20, 30]).box_it(),
        observable::from_iter(vec![100, 200]).box_it(),
      ],
      |row: Vec<i32>| row.iter().sum::<i32>(),
    )
    .subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![111, 222]);
  }

  #[test]
  fn no_sources_completes() {
    let completed = Arc::new(Mutex::new(false));
    let c_completed = completed.clone();
    observable::zip(Vec::<BoxOp<i32>>::new(), |row| row.len()).subscribe_all(
      |_| panic!("no rows"),
      |_| {},
      move || *c_completed.lock().unwrap() = true,
    );
    assert!(*completed.lock().unwrap());
  }

  #[test]
  fn completes_while_other_source_still_runs() {
    let scheduler = ManualScheduler::now();
    let seen = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(false));
    let (c_seen, c_completed) = (seen.clone(), completed.clone());
    observable::interval(Duration::from_millis(10), scheduler.clone())
      .zip_with(observable::from_iter(vec!["x", "y"]), |i, s| format!("{}{}", s, i))
      .subscribe_all(
        move |v| c_seen.lock().unwrap().push(v),
        |_| {},
        move || *c_completed.lock().unwrap() = true,
      );

    scheduler.advance_by(Duration::from_millis(15));
    assert!(!*completed.lock().unwrap());
    scheduler.advance_by(Duration::from_millis(10));
    assert_eq!(*seen.lock().unwrap(), vec!["x0", "y1"]);
    assert!(*completed.lock().unwrap());
    assert_eq!(scheduler.pending_count(), 0);
  }

  #[test]
  fn error_from_one_source() {
    let errors = Arc::new(Mutex::new(vec![]));
    let c_errors = errors.clone();
    observable::from_iter(0..3)
      .zip(observable::throw_err::<i32>("broken"))
      .subscribe_err(
        |_| panic!("nothing to pair"),
        move |e| c_errors.lock().unwrap().push(e.to_string()),
      );
    assert_eq!(*errors.lock().unwrap(), vec!["broken"]);
  }

  #[test]
  fn sources_on_different_threads() {
    let pool = futures::executor::ThreadPool::new().unwrap();
    let (tx, rx) = channel();
    observable::from_iter(0..50)
      .subscribe_on(pool.clone())
      .zip(observable::from_iter(100..150).subscribe_on(pool))
      .subscribe_all(
        {
          let tx = tx.clone();
          move |v| tx.send(Some(v)).unwrap()
        },
        |_| {},
        move || tx.send(None).unwrap(),
      );

    let mut pairs = vec![];
    while let Some(pair) = rx.recv_timeout(Duration::from_secs(5)).unwrap() {
      pairs.push(pair);
    }
    assert_eq!(pairs, (0..50).map(|i| (i, i + 100)).collect::<Vec<_>>());
  }
}
