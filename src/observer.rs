//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use tracing::warn;

use crate::error::RxError;

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable. After `error` or `complete` no further call is made on the
/// same observer; the [`Subscriber`](crate::subscriber::Subscriber) wrapping
/// every stage of a chain enforces this.
pub trait Observer<Item>: Send {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable
  fn error(&mut self, err: RxError);

  /// Handle completion of the observable
  fn complete(&mut self);
}

impl<Item, O> Observer<Item> for Box<O>
where
  O: Observer<Item> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }

  #[inline]
  fn error(&mut self, err: RxError) { (**self).error(err) }

  #[inline]
  fn complete(&mut self) { (**self).complete() }
}

/// Boxed observer, the unit passed between the stages of a chain.
pub type BoxObserver<Item> = Box<dyn Observer<Item>>;

/// One notification of the observer protocol.
#[derive(Debug)]
pub enum Notification<Item> {
  Next(Item),
  Error(RxError),
  Complete,
}

impl<Item> Notification<Item> {
  /// Delivers this notification to `observer`.
  pub fn accept<O>(self, observer: &mut O)
  where
    O: Observer<Item> + ?Sized,
  {
    match self {
      Notification::Next(value) => observer.next(value),
      Notification::Error(err) => observer.error(err),
      Notification::Complete => observer.complete(),
    }
  }

  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }
}

/// Observer built from three closures, created by the `subscribe*` family.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverAll<N, E, C> {
  #[inline]
  pub fn new(next: N, error: E, complete: C) -> Self { ObserverAll { next, error, complete } }
}

impl<Item, N, E, C> Observer<Item> for ObserverAll<N, E, C>
where
  N: FnMut(Item) + Send,
  E: FnMut(RxError) + Send,
  C: FnMut() + Send,
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(&mut self, err: RxError) { (self.error)(err) }

  #[inline]
  fn complete(&mut self) { (self.complete)() }
}

/// Error handler used when a subscriber gives none.
pub(crate) fn unhandled_error(err: RxError) {
  warn!(error = %err, "error reached a subscriber without an error handler");
}

pub(crate) fn ignore_complete() {}
