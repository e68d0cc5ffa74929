use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{error::RxError, observer::Observer};

/// Shared, mutex guarded state used by operators whose observers are driven
/// from more than one thread.
///
/// A poisoned lock is recovered rather than propagated: every user callback
/// runs under `catch_unwind`, so a poisoned lock only means a panic was
/// already converted into an error notification.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  #[inline]
  pub fn rc_deref(&self) -> MutexGuard<'_, T> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }

  #[inline]
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> { self.rc_deref() }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Item, O> Observer<Item> for MutArc<O>
where
  O: Observer<Item>,
{
  fn next(&mut self, value: Item) { self.rc_deref_mut().next(value) }

  fn error(&mut self, err: RxError) { self.rc_deref_mut().error(err) }

  fn complete(&mut self) { self.rc_deref_mut().complete() }
}
