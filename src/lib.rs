//! # rxcore: a push-based reactive stream engine
//!
//! Sources emit values, operator chains transform them, schedulers move
//! production and delivery across execution contexts, and every execution
//! can be released through its subscription.
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | An immutable, re-subscribable description of a stream |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` notifications |
//! | [`Scheduler`] | An execution context for immediate, delayed or repeating work |
//! | [`SubscriptionLike`] | Handle to release a running execution |
//! | [`Single`] | One value or an error |
//! | [`Maybe`] | Zero or one value, or an error |
//! | [`Completable`] | Completion or an error, no values |
//!
//! Notifications obey the usual protocol: any number of `next`, then at most
//! one `error` or `complete`, and nothing after that or after the
//! subscription was released. Panics raised by user callbacks are delivered
//! as [`RxError`] on the error channel of the subscription that raised them.
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `futures` thread pools, including the
//!   shared [`scheduler::computation()`] and [`scheduler::io()`] pools
//! - **`tokio-scheduler`**: a `tokio::runtime::Handle` is a [`Scheduler`]
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Scheduler`]: scheduler::Scheduler
//! [`SubscriptionLike`]: subscription::SubscriptionLike
//! [`Single`]: single::Single
//! [`Maybe`]: maybe::Maybe
//! [`Completable`]: completable::Completable
//! [`RxError`]: error::RxError

pub mod completable;
pub mod error;
pub mod maybe;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod single;
pub mod subscriber;
pub mod subscription;

pub use prelude::*;
