use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::resource::Resource;

use super::pool::PoolInner;

/// Spawn the background trimming thread for a newly built pool.
///
/// The thread holds only a `Weak` reference, so dropping the last `Pool`
/// handle lets it exit on its next pass instead of keeping the pool alive
/// for the remainder of the process.
pub(crate) fn spawn<T: Resource, E: 'static>(inner: &Arc<PoolInner<T, E>>) {
    let pool = Arc::downgrade(inner);
    let interval = inner.reap_interval();
    thread::spawn(move || run(pool, interval));
}

fn run<T: Resource, E: 'static>(pool: Weak<PoolInner<T, E>>, interval: Duration) {
    loop {
        // Closed is checked at the top of each pass; an in-flight sleep is
        // not interrupted by shutdown.
        match pool.upgrade() {
            Some(inner) if !inner.is_closed() => inner.reap(),
            _ => break,
        }
        thread::sleep(interval);
    }
    debug!("pool reaper exiting");
}
