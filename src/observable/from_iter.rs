use std::iter::{Repeat, Take};

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error. The
/// iterable is cloned for every subscription, and emission stops early,
/// without completion, once the subscription is released.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter(vec![0, 1, 2, 3]).subscribe(|v| println!("{},", v));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> FromIterOp<Iter>
where
  Iter: IntoIterator + Clone + Send + Sync + 'static,
  Iter::Item: Send + 'static,
{
  FromIterOp(iter)
}

/// Emits the elements of `items` in order, then completes.
pub fn from_array<T, const N: usize>(items: [T; N]) -> FromIterOp<[T; N]>
where
  T: Clone + Send + Sync + 'static,
{
  FromIterOp(items)
}

/// Emits `count` consecutive integers starting at `start`.
pub fn range(start: i64, count: usize) -> FromIterOp<std::ops::Range<i64>> {
  FromIterOp(start..start.saturating_add(count as i64))
}

/// Emits `value` `n` times.
pub fn repeat<T>(value: T, n: usize) -> FromIterOp<Take<Repeat<T>>>
where
  T: Clone + Send + Sync + 'static,
{
  FromIterOp(std::iter::repeat(value).take(n))
}

#[derive(Clone)]
pub struct FromIterOp<Iter>(Iter);

impl<Iter> Observable for FromIterOp<Iter>
where
  Iter: IntoIterator + Clone + Send + Sync + 'static,
  Iter::Item: Send + 'static,
{
  type Item = Iter::Item;

  fn actual_subscribe(&self, mut subscriber: Subscriber<Iter::Item>) {
    let mut iter = self.0.clone().into_iter();
    while !subscriber.is_finished() {
      match iter.next() {
        Some(v) => subscriber.next(v),
        None => subscriber.complete(),
      }
    }
  }
}
