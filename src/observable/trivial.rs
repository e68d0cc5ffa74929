use std::marker::PhantomData;

use crate::{error::RxError, observable::Observable, observer::Observer, subscriber::Subscriber};

/// Creates an observable that emits no items, just terminates with an error.
pub fn throw_err<Item>(err: impl Into<RxError>) -> ThrowOp<Item> {
  ThrowOp { err: err.into(), _marker: PhantomData }
}

pub struct ThrowOp<Item> {
  err: RxError,
  _marker: PhantomData<fn() -> Item>,
}

impl<Item> Clone for ThrowOp<Item> {
  fn clone(&self) -> Self { ThrowOp { err: self.err.clone(), _marker: PhantomData } }
}

impl<Item: Send + 'static> Observable for ThrowOp<Item> {
  type Item = Item;

  fn actual_subscribe(&self, mut subscriber: Subscriber<Item>) {
    subscriber.error(self.err.clone());
  }
}

/// Creates an observable that produces no values, it only completes.
pub fn empty<Item>() -> EmptyOp<Item> { EmptyOp(PhantomData) }

pub struct EmptyOp<Item>(PhantomData<fn() -> Item>);

impl<Item> Clone for EmptyOp<Item> {
  fn clone(&self) -> Self { EmptyOp(PhantomData) }
}

impl<Item: Send + 'static> Observable for EmptyOp<Item> {
  type Item = Item;

  fn actual_subscribe(&self, mut subscriber: Subscriber<Item>) { subscriber.complete(); }
}

/// Creates an observable that never emits anything, not even a terminal
/// notification.
pub fn never<Item>() -> NeverOp<Item> { NeverOp(PhantomData) }

pub struct NeverOp<Item>(PhantomData<fn() -> Item>);

impl<Item> Clone for NeverOp<Item> {
  fn clone(&self) -> Self { NeverOp(PhantomData) }
}

impl<Item: Send + 'static> Observable for NeverOp<Item> {
  type Item = Item;

  fn actual_subscribe(&self, _subscriber: Subscriber<Item>) {}
}
