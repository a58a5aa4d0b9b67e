use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct AtomicCounter(AtomicUsize);

impl AtomicCounter {
    pub fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn value(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
