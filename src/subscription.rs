use std::{
  any::Any,
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
  },
};

use smallvec::SmallVec;
use tracing::debug;

use crate::error::catch_callback;

/// Subscription returns from `Observable.subscribe(Subscriber)` to allow
///  unsubscribing.
///
/// `unsubscribe` is idempotent and may be called concurrently from several
/// threads; only the first call has an effect. Running work checks
/// `is_closed` cooperatively, nothing is ever killed forcibly.
pub trait SubscriptionLike: Send + Sync {
  /// This allows deregistering an stream before it has finished receiving all
  /// events (i.e. before onCompleted is called).
  fn unsubscribe(&self);

  fn is_closed(&self) -> bool;
}

impl Debug for Box<dyn SubscriptionLike> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Box<dyn SubscriptionLike>")
      .field("is_closed", &self.is_closed())
      .finish()
  }
}

impl<T: ?Sized + SubscriptionLike> SubscriptionLike for Box<T> {
  #[inline]
  fn unsubscribe(&self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

impl<T: ?Sized + SubscriptionLike> SubscriptionLike for Arc<T> {
  #[inline]
  fn unsubscribe(&self) { (**self).unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// A composite subscription: owns a set of teardowns and releases all of
/// them, exactly once, when it is unsubscribed.
///
/// Adding to an already closed subscription unsubscribes the added member
/// immediately, so no member is ever left registered but orphaned.
#[derive(Clone, Default)]
pub struct SharedSubscription(Arc<Inner>);

#[derive(Default)]
struct Inner {
  closed: AtomicBool,
  teardown: Mutex<SmallVec<[Box<dyn SubscriptionLike>; 1]>>,
}

impl SharedSubscription {
  pub fn add<S: SubscriptionLike + 'static>(&self, subscription: S) {
    if self.is_same(&subscription) || subscription.is_closed() {
      return;
    }
    let mut teardown = self.0.teardown.lock().unwrap_or_else(PoisonError::into_inner);
    if self.0.closed.load(Ordering::Acquire) {
      drop(teardown);
      subscription.unsubscribe();
    } else {
      teardown.retain(|v| !v.is_closed());
      teardown.push(Box::new(subscription));
    }
  }

  /// Number of still registered teardowns.
  pub fn teardown_size(&self) -> usize {
    self.0.teardown.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  fn is_same(&self, other: &dyn Any) -> bool {
    if let Some(other) = other.downcast_ref::<Self>() {
      Arc::ptr_eq(&self.0, &other.0)
    } else {
      false
    }
  }
}

impl SubscriptionLike for SharedSubscription {
  fn unsubscribe(&self) {
    if self.0.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    let teardown = std::mem::take(
      &mut *self.0.teardown.lock().unwrap_or_else(PoisonError::into_inner),
    );
    debug!(members = teardown.len(), "subscription disposed");
    for v in teardown {
      // One member failing must not keep the others alive.
      let _ = catch_callback(|| v.unsubscribe());
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.closed.load(Ordering::Acquire) }
}

impl Debug for SharedSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SharedSubscription")
      .field("closed", &self.is_closed())
      .field("teardown_count", &self.teardown_size())
      .finish()
  }
}

/// A one-shot cleanup action, run at most once on the first `unsubscribe`.
pub struct ClosureSubscription {
  closed: AtomicBool,
  teardown: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl ClosureSubscription {
  pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
    ClosureSubscription {
      closed: AtomicBool::new(false),
      teardown: Mutex::new(Some(Box::new(teardown))),
    }
  }
}

impl SubscriptionLike for ClosureSubscription {
  fn unsubscribe(&self) {
    if self.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    let teardown = self.teardown.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(teardown) = teardown {
      teardown();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.closed.load(Ordering::Acquire) }
}

/// Wrapper around a subscription which provides the
/// `unsubscribe_when_dropped()` method.
#[derive(Clone, Debug)]
pub struct SubscriptionWrapper<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionWrapper<T> {
  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<T> {
    SubscriptionGuard(self.0)
  }

  /// Consumes this wrapper and returns the underlying subscription.
  pub fn into_inner(self) -> T { self.0 }
}

impl<T: SubscriptionLike> SubscriptionLike for SubscriptionWrapper<T> {
  #[inline]
  fn unsubscribe(&self) { self.0.unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(subscription) }
}

impl<T: SubscriptionLike> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::{sync::atomic::AtomicUsize, thread};

  fn counting(counter: &Arc<AtomicUsize>) -> ClosureSubscription {
    let c = counter.clone();
    ClosureSubscription::new(move || {
      c.fetch_add(1, Ordering::SeqCst);
    })
  }

  #[test]
  fn add_members() {
    let shared = SharedSubscription::default();
    shared.add(SharedSubscription::default());
    assert_eq!(shared.teardown_size(), 1);
    shared.add(SharedSubscription::default());
    assert_eq!(shared.teardown_size(), 2);
    shared.add(SharedSubscription::default());
    assert_eq!(shared.teardown_size(), 3);
  }

  #[test]
  fn closed_members_are_pruned() {
    let shared = SharedSubscription::default();
    let member = SharedSubscription::default();
    shared.add(member.clone());
    member.unsubscribe();
    shared.add(SharedSubscription::default());
    assert_eq!(shared.teardown_size(), 1);
  }

  #[test]
  fn adding_self_is_ignored() {
    let shared = SharedSubscription::default();
    shared.add(shared.clone());
    assert_eq!(shared.teardown_size(), 0);
  }

  #[test]
  fn dispose_twice_runs_cleanup_once() {
    let counter = Arc::new(AtomicUsize::new(0));
    let shared = SharedSubscription::default();
    shared.add(counting(&counter));
    shared.add(counting(&counter));

    shared.unsubscribe();
    shared.unsubscribe();

    assert!(shared.is_closed());
    assert_eq!(counter.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn add_after_dispose_disposes_member() {
    let counter = Arc::new(AtomicUsize::new(0));
    let shared = SharedSubscription::default();
    shared.unsubscribe();

    let member = SharedSubscription::default();
    shared.add(member.clone());
    shared.add(counting(&counter));

    assert!(member.is_closed());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(shared.teardown_size(), 0);
  }

  #[test]
  fn panicking_member_does_not_block_others() {
    let counter = Arc::new(AtomicUsize::new(0));
    let shared = SharedSubscription::default();
    shared.add(ClosureSubscription::new(|| panic!("teardown failure")));
    shared.add(counting(&counter));

    shared.unsubscribe();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn concurrent_dispose_collapses() {
    let counter = Arc::new(AtomicUsize::new(0));
    let shared = SharedSubscription::default();
    shared.add(counting(&counter));

    let handles: Vec<_> = (0..8)
      .map(|_| {
        let s = shared.clone();
        thread::spawn(move || s.unsubscribe())
      })
      .collect();
    handles.into_iter().for_each(|h| h.join().unwrap());

    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn nested_composites_cascade() {
    let parent = SharedSubscription::default();
    let child = SharedSubscription::default();
    let grand_child = SharedSubscription::default();
    child.add(grand_child.clone());
    parent.add(child.clone());

    parent.unsubscribe();
    assert!(child.is_closed());
    assert!(grand_child.is_closed());
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let shared = SharedSubscription::default();
    {
      let _guard = SubscriptionWrapper(shared.clone()).unsubscribe_when_dropped();
      assert!(!shared.is_closed());
    }
    assert!(shared.is_closed());
  }
}
