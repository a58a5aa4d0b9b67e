use std::time::Duration;

use crate::resource::Resource;

use super::error::ConfigError;
use super::pool::{Pool, PoolInner};

/// Interval between reaper passes when none is configured explicitly.
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Builder for a [`Pool`].
pub struct PoolConfig<T: Resource, E: 'static> {
    capacity: usize,
    max_idle: usize,
    factory: Box<dyn Fn() -> Result<T, E> + Send + Sync>,
    reap_interval: Duration,
}

impl<T: Resource, E: 'static> PoolConfig<T, E> {
    /// Start configuring a pool holding at most `capacity` live resources,
    /// with parked resources trimmed down to `max_idle` by the reaper.
    ///
    /// `factory` is invoked lazily, only when a caller needs a resource and
    /// the free-list is empty while the pool is below capacity.
    pub fn new<F>(capacity: usize, max_idle: usize, factory: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            capacity,
            max_idle,
            factory: Box::new(factory),
            reap_interval: DEFAULT_REAP_INTERVAL,
        }
    }

    /// Override the interval between reaper passes.
    pub fn reap_interval(mut self, val: Duration) -> Self {
        self.reap_interval = val;
        self
    }

    /// Validate the configuration and start the pool, including its
    /// background reaper thread.
    pub fn build(self) -> Result<Pool<T, E>, ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError("pool capacity must be at least 1".into()));
        }
        let inner = PoolInner::new(
            self.capacity,
            self.max_idle,
            self.factory,
            self.reap_interval,
        );
        Ok(Pool::new(inner))
    }
}
