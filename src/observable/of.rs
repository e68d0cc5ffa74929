use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Creates an observable producing a single value, then completing.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::of(123).subscribe(|v| println!("{},", v));
/// ```
pub fn of<Item>(v: Item) -> OfOp<Item>
where
  Item: Clone + Send + Sync + 'static,
{
  OfOp(v)
}

/// Alias of [`of`].
pub fn just<Item>(v: Item) -> OfOp<Item>
where
  Item: Clone + Send + Sync + 'static,
{
  OfOp(v)
}

#[derive(Clone)]
pub struct OfOp<Item>(Item);

impl<Item> Observable for OfOp<Item>
where
  Item: Clone + Send + Sync + 'static,
{
  type Item = Item;

  fn actual_subscribe(&self, mut subscriber: Subscriber<Item>) {
    subscriber.next(self.0.clone());
    subscriber.complete();
  }
}
