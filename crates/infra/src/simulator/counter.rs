use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Call counter shared by the counter-based simulator endpoints
///
/// Clones share the same count. Tests inject a fresh counter per simulator
/// so runs do not observe each other.
#[derive(Debug, Clone, Default)]
pub struct FlakyCounter(Arc<AtomicU64>);

impl FlakyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing shared count.
    pub fn shared(count: Arc<AtomicU64>) -> Self {
        Self(count)
    }

    /// Increment and return the new value.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Reset to zero, returning the previous value.
    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::SeqCst)
    }
}
