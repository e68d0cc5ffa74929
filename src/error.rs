//! Error channel carried by every observer.
//!
//! User callbacks never unwind through the engine: a panic raised inside an
//! operator closure, a source's production logic or a scheduled task is
//! captured and converted into an [`RxError`] delivered to the `error`
//! channel of the subscription that produced it.

use std::{
  any::Any,
  panic::{self, AssertUnwindSafe},
  sync::Arc,
};

use thiserror::Error;
use tracing::warn;

/// The error type flowing through the `error` channel of an [`Observer`].
///
/// [`Observer`]: crate::observer::Observer
#[derive(Debug, Clone, Error)]
pub enum RxError {
  /// A user callback (`map`, a `flat_map` factory, a zip combiner, a tap, a
  /// source's emitter logic or a subscriber callback) panicked.
  #[error("callback panicked: {0}")]
  CallbackPanic(String),

  /// A unit of work run by a scheduler panicked outside any user callback.
  #[error("scheduled task panicked: {0}")]
  TaskPanic(String),

  /// A `Single` source completed without emitting a value.
  #[error("sequence contains no elements")]
  NoElements,

  #[error("{0}")]
  Message(String),

  #[error("{0}")]
  Other(Arc<dyn std::error::Error + Send + Sync>),
}

pub type RxResult<T> = Result<T, RxError>;

impl RxError {
  pub fn msg(message: impl Into<String>) -> Self { RxError::Message(message.into()) }

  pub fn other<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    RxError::Other(Arc::new(err))
  }
}

impl From<&str> for RxError {
  fn from(message: &str) -> Self { RxError::Message(message.to_owned()) }
}

impl From<String> for RxError {
  fn from(message: String) -> Self { RxError::Message(message) }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    (*s).to_owned()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "non-string panic payload".to_owned()
  }
}

/// Runs a user callback, turning a panic into `RxError::CallbackPanic`.
pub(crate) fn catch_callback<R>(f: impl FnOnce() -> R) -> RxResult<R> {
  panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
    let message = panic_message(&*payload);
    warn!(%message, "user callback panicked");
    RxError::CallbackPanic(message)
  })
}

/// Runs a unit of scheduled work, turning a panic into `RxError::TaskPanic`.
pub(crate) fn catch_task<R>(f: impl FnOnce() -> R) -> RxResult<R> {
  panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
    let message = panic_message(&*payload);
    warn!(%message, "scheduled task panicked");
    RxError::TaskPanic(message)
  })
}
