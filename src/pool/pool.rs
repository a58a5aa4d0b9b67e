use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use concurrent_queue::{ConcurrentQueue, PopError};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::resource::Resource;

use super::error::PoolError;
use super::reaper;

type Factory<T, E> = Box<dyn Fn() -> Result<T, E> + Send + Sync>;

/// Counters kept consistent with the free-list only while this lock is held.
struct PoolState {
    count: usize,
    closed: bool,
}

pub(crate) struct PoolInner<T: Resource, E: 'static> {
    capacity: usize,
    max_idle: usize,
    idle: ConcurrentQueue<T>,
    state: RwLock<PoolState>,
    factory: Factory<T, E>,
    reap_interval: Duration,
}

impl<T: Resource, E> PoolInner<T, E> {
    pub(crate) fn new(
        capacity: usize,
        max_idle: usize,
        factory: Factory<T, E>,
        reap_interval: Duration,
    ) -> Self {
        Self {
            capacity,
            max_idle,
            idle: ConcurrentQueue::bounded(capacity),
            state: RwLock::new(PoolState {
                count: 0,
                closed: false,
            }),
            factory,
            reap_interval,
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    pub(crate) fn reap_interval(&self) -> Duration {
        self.reap_interval
    }

    /// Create one resource if the pool is below capacity, parking it
    /// directly into the free-list. A no-op success when the pool is full
    /// or closed signals the caller to retry the free-list instead.
    fn try_grow(&self) -> Result<(), E> {
        let mut state = self.state.write();
        if state.closed || state.count >= self.capacity {
            return Ok(());
        }
        let res = (self.factory)()?;
        // The queue cannot be full or closed while `count < capacity` and
        // the write lock is held; dispose rather than lose the resource if
        // that assumption is ever violated.
        if let Err(err) = self.idle.push(res) {
            err.into_inner().dispose();
            return Ok(());
        }
        state.count += 1;
        trace!(count = state.count, "created resource");
        Ok(())
    }

    /// Dispose of a resource that failed its usability probe.
    fn discard(&self, res: T) {
        res.dispose();
        let mut state = self.state.write();
        state.count = state.count.saturating_sub(1);
        trace!(count = state.count, "discarded unusable resource");
    }

    /// Return a borrowed resource after its callback has run.
    ///
    /// Holding the read lock across the push keeps the closed flag and the
    /// queue's own closed state in sync: `release` flips both under the
    /// write lock.
    fn restore(&self, mut res: T) {
        let state = self.state.read();
        if state.closed {
            drop(state);
            // Shutdown raced an in-flight call; the resource can no longer
            // be parked, so dispose it rather than leak it.
            res.dispose();
            return;
        }
        res.reset();
        if let Err(err) = self.idle.push(res) {
            drop(state);
            err.into_inner().dispose();
            let mut state = self.state.write();
            state.count = state.count.saturating_sub(1);
        }
    }

    /// One reaper pass: trim parked resources above the `max_idle`
    /// watermark. Never creates resources.
    pub(crate) fn reap(&self) {
        let mut state = self.state.write();
        if state.closed {
            return;
        }
        let excess = self.idle.len().saturating_sub(self.max_idle);
        let mut trimmed = 0;
        for _ in 0..excess {
            // Fast-path dequeues run outside the lock, so check each pop
            // instead of trusting the length snapshot.
            match self.idle.pop() {
                Ok(res) => {
                    res.dispose();
                    state.count -= 1;
                    trimmed += 1;
                }
                Err(_) => break,
            }
        }
        if trimmed > 0 {
            trace!(trimmed, count = state.count, "reaped idle resources");
        }
    }

    fn release(&self) {
        let mut state = self.state.write();
        if state.closed {
            return;
        }
        state.closed = true;
        self.idle.close();
        let mut disposed = 0;
        while let Ok(res) = self.idle.pop() {
            res.dispose();
            disposed += 1;
        }
        state.count = 0;
        debug!(disposed, "resource pool released");
    }
}

impl<T: Resource, E> Drop for PoolInner<T, E> {
    fn drop(&mut self) {
        // Dropping the last handle without an explicit release still runs
        // every parked resource through `dispose`.
        while let Ok(res) = self.idle.pop() {
            res.dispose();
        }
    }
}

/// A shared handle to a bounded resource pool.
///
/// Handles are cheap to clone; all clones refer to the same pool. Resources
/// of type `T` are produced by the configured factory (which may fail with
/// `E`) and borrowed through [`Pool::call`].
pub struct Pool<T: Resource, E: 'static> {
    inner: Arc<PoolInner<T, E>>,
}

impl<T: Resource, E> Pool<T, E> {
    pub(crate) fn new(inner: PoolInner<T, E>) -> Self {
        let inner = Arc::new(inner);
        reaper::spawn(&inner);
        Self { inner }
    }

    /// Borrow a resource, run `callback` against it, and return the result.
    ///
    /// This is the sole borrowing primitive: the resource is returned to the
    /// free-list (or disposed, if the pool closed meanwhile) on every exit
    /// path, including a panicking callback, whose payload is converted into
    /// [`PoolError::Panicked`] instead of unwinding through the caller.
    ///
    /// When the pool is saturated, the call spins with cooperative yields
    /// until another caller parks a resource; there is no timeout and no
    /// fairness guarantee among spinning callers.
    pub fn call<R, F>(&self, callback: F) -> Result<R, PoolError<E>>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        let mut res = loop {
            if self.inner.is_closed() {
                return Err(PoolError::Closed);
            }
            match self.inner.idle.pop() {
                Ok(res) => {
                    if res.is_usable() {
                        break res;
                    }
                    self.inner.discard(res);
                }
                Err(PopError::Empty) => {
                    self.inner.try_grow().map_err(PoolError::Factory)?;
                    thread::yield_now();
                }
                // Raced a shutdown; the closed check above reports it.
                Err(PopError::Closed) => continue,
            }
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(&mut res)));
        self.inner.restore(res);
        match outcome {
            Ok(result) => result.map_err(PoolError::Callback),
            Err(payload) => Err(PoolError::Panicked(panic_message(payload))),
        }
    }

    /// Shut down the pool: mark it closed, invalidate the free-list, and
    /// dispose of every parked resource. Idempotent; later calls are no-ops
    /// and later [`Pool::call`]s fail fast with [`PoolError::Closed`].
    ///
    /// A resource borrowed by an in-flight `call` at this moment is outside
    /// the pool's reach; it is disposed when that call returns it.
    pub fn release(&self) {
        self.inner.release();
    }

    /// Current number of live resources, borrowed and idle combined.
    pub fn count(&self) -> usize {
        self.inner.state.read().count
    }

    /// Current number of resources parked in the free-list.
    pub fn idle_count(&self) -> usize {
        self.inner.idle.len()
    }
}

impl<T: Resource, E> Clone for Pool<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Resource, E> Debug for Pool<T, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("count", &self.count())
            .field("idle", &self.idle_count())
            .finish()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "opaque panic payload".to_owned()
    }
}
