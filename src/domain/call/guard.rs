//! One-shot notification guard

use std::sync::atomic::{AtomicBool, Ordering};

/// Flag consumed at most once per call instance
///
/// `try_fire` is a compare-and-set, so concurrent callers agree on a single
/// winner.
#[derive(Debug, Default)]
pub struct OneShot {
    fired: AtomicBool,
}

impl OneShot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true for exactly one caller
    pub fn try_fire(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}
