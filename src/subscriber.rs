use tracing::trace;

use crate::{
  error::{catch_callback, RxError},
  observer::{BoxObserver, Observer},
  subscription::{SharedSubscription, SubscriptionLike},
};

/// The observer handed to a source for one subscription.
///
/// Couples the downstream observer with the subscription of that execution
/// and enforces the notification protocol for it:
///
/// - nothing is delivered once the subscription is closed (disposed);
/// - nothing is delivered after the first `error` or `complete`;
/// - a terminal notification is delivered first, then the subscription is
///   released, which stops the upstream and cancels its scheduled work;
/// - a panic raised downstream while handling `next` is converted into an
///   `error` notification for that downstream.
pub struct Subscriber<Item> {
  observer: Option<BoxObserver<Item>>,
  subscription: SharedSubscription,
}

impl<Item> Subscriber<Item> {
  pub fn new<O>(observer: O, subscription: SharedSubscription) -> Self
  where
    O: Observer<Item> + 'static,
  {
    Subscriber {
      observer: Some(Box::new(observer)),
      subscription,
    }
  }

  #[inline]
  pub fn subscription(&self) -> &SharedSubscription { &self.subscription }

  /// Whether this subscriber will accept no further notification. Sources
  /// poll it between emissions to stop early.
  #[inline]
  pub fn is_finished(&self) -> bool {
    self.observer.is_none() || self.subscription.is_closed()
  }

  fn take_terminal(&mut self) -> Option<BoxObserver<Item>> {
    if self.subscription.is_closed() {
      self.observer = None;
    }
    let observer = self.observer.take();
    if observer.is_none() {
      trace!("terminal notification after termination dropped");
    }
    observer
  }
}

impl<Item> Observer<Item> for Subscriber<Item> {
  fn next(&mut self, value: Item) {
    if self.subscription.is_closed() {
      self.observer = None;
    }
    let Some(observer) = self.observer.as_mut() else {
      trace!("next after termination dropped");
      return;
    };
    if let Err(err) = catch_callback(|| observer.next(value)) {
      self.error(err);
    }
  }

  fn error(&mut self, err: RxError) {
    if let Some(mut observer) = self.take_terminal() {
      let _ = catch_callback(|| observer.error(err));
      self.subscription.unsubscribe();
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.take_terminal() {
      let _ = catch_callback(|| observer.complete());
      self.subscription.unsubscribe();
    }
  }
}
