//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use crate::{completable, maybe, observable, scheduler, single};

// Core traits
pub use crate::observable::{BoxOp, Emitter, Observable, ObservableExt};
pub use crate::observer::{Notification, Observer, ObserverAll};
// Errors
pub use crate::error::{RxError, RxResult};
// Schedulers
pub use crate::scheduler::{
  Duration, DynScheduler, ImmediateScheduler, Instant, ManualScheduler, NewThreadScheduler,
  Scheduler, SpawnHandle,
};
// Single, Maybe, Completable
pub use crate::completable::Completable;
pub use crate::maybe::Maybe;
pub use crate::single::{Single, SingleEmitter};
// Subscription
pub use crate::subscriber::Subscriber;
pub use crate::subscription::{
  ClosureSubscription, SharedSubscription, SubscriptionGuard, SubscriptionLike,
  SubscriptionWrapper,
};
