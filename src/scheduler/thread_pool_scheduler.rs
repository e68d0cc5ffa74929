use std::{future::Future, num::NonZeroUsize, thread};

use futures::executor::ThreadPool;
use once_cell::sync::OnceCell;
use tracing::debug;

use super::Scheduler;
use crate::error::{RxError, RxResult};

pub const COMPUTATION_THREADS_ENV: &str = "RXCORE_COMPUTATION_THREADS";
pub const IO_THREADS_ENV: &str = "RXCORE_IO_THREADS";

impl Scheduler for ThreadPool {
  fn spawn<Fut>(&self, future: Fut)
  where
    Fut: Future<Output = ()> + Send + 'static,
  {
    self.spawn_ok(future)
  }
}

/// Sizes of the shared pools behind [`computation()`] and [`io()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
  pub computation_threads: usize,
  pub io_threads: usize,
}

impl Default for PoolConfig {
  fn default() -> Self {
    PoolConfig {
      computation_threads: thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(4),
      io_threads: 64,
    }
  }
}

impl PoolConfig {
  /// The default sizes, overridden by `RXCORE_COMPUTATION_THREADS` and
  /// `RXCORE_IO_THREADS` when they hold a positive number.
  pub fn from_env() -> Self {
    let mut config = Self::default();
    if let Some(n) = env_threads(COMPUTATION_THREADS_ENV) {
      config.computation_threads = n;
    }
    if let Some(n) = env_threads(IO_THREADS_ENV) {
      config.io_threads = n;
    }
    config
  }
}

fn env_threads(key: &str) -> Option<usize> {
  std::env::var(key)
    .ok()
    .and_then(|v| v.trim().parse::<usize>().ok())
    .filter(|n| *n > 0)
}

struct Pools {
  computation: ThreadPool,
  io: ThreadPool,
}

impl Pools {
  fn create(config: &PoolConfig) -> RxResult<Self> {
    let computation = ThreadPool::builder()
      .pool_size(config.computation_threads.max(1))
      .name_prefix("rx-computation-")
      .create()
      .map_err(RxError::other)?;
    let io = ThreadPool::builder()
      .pool_size(config.io_threads.max(1))
      .name_prefix("rx-io-")
      .create()
      .map_err(RxError::other)?;
    debug!(
      computation = config.computation_threads,
      io = config.io_threads,
      "scheduler pools created"
    );
    Ok(Pools { computation, io })
  }
}

static POOLS: OnceCell<Pools> = OnceCell::new();

/// Installs the shared pools with `config`. Fails if they already exist,
/// either from an earlier call or because a scheduler was already used.
pub fn init_pools(config: PoolConfig) -> RxResult<()> {
  let pools = Pools::create(&config)?;
  POOLS
    .set(pools)
    .map_err(|_| RxError::msg("scheduler pools are already initialized"))
}

fn pools() -> RxResult<&'static Pools> {
  POOLS.get_or_try_init(|| Pools::create(&PoolConfig::from_env()))
}

/// Like [`computation()`], reporting a failure to create the pools.
pub fn try_computation() -> RxResult<ThreadPool> { pools().map(|p| p.computation.clone()) }

/// Like [`io()`], reporting a failure to create the pools.
pub fn try_io() -> RxResult<ThreadPool> { pools().map(|p| p.io.clone()) }

/// Bounded pool for CPU bound work, one thread per core by default.
///
/// # Panics
///
/// The shared pools are created on first use; if the OS refuses their
/// threads this panics. Use [`try_computation()`] to handle that case.
pub fn computation() -> ThreadPool {
  try_computation().unwrap_or_else(|err| panic!("scheduler pools unavailable: {}", err))
}

/// Large pool for blocking work.
///
/// # Panics
///
/// Same as [`computation()`]; [`try_io()`] reports the failure instead.
pub fn io() -> ThreadPool {
  try_io().unwrap_or_else(|err| panic!("scheduler pools unavailable: {}", err))
}
