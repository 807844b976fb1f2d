//! Single-bit wake-up event.
//!
//! Fire-and-forget signal from interrupt context to one consumer task.
//! The state is a flag, not a counter: raising an already-raised event is
//! idempotent, so a burst of signals before the consumer wakes produces
//! exactly one wake.

use core::sync::atomic::{AtomicBool, Ordering};

/// Binary event flag owned by the scheduler glue, raised by the interrupt
/// handler, waited on and cleared by the consumer task.
///
/// Waiting lives on [`crate::sched::TaskContext`]; interrupt-context code
/// has no way to suspend on this type.
pub struct Event {
    raised: AtomicBool,
}

impl Event {
    /// Create a new event in the lowered state.
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Raise the event.
    ///
    /// Returns `true` if this call raised it, `false` if it was already
    /// raised (redundant raise, absorbed). Never blocks; safe from
    /// interrupt context.
    #[inline]
    pub fn signal(&self) -> bool {
        !self.raised.swap(true, Ordering::AcqRel)
    }

    /// Check whether the event is raised.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Lower the event. Called by the consumer after acting on it.
    #[inline]
    pub fn clear(&self) {
        self.raised.store(false, Ordering::Release);
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_and_clear() {
        let event = Event::new();
        assert!(!event.is_raised());

        assert!(event.signal());
        assert!(event.is_raised());

        event.clear();
        assert!(!event.is_raised());
    }

    #[test]
    fn test_redundant_signal_is_idempotent() {
        let event = Event::new();

        assert!(event.signal());
        assert!(!event.signal());
        assert!(!event.signal());
        assert!(event.is_raised());

        // One clear lowers it regardless of how often it was signaled.
        event.clear();
        assert!(!event.is_raised());
    }
}
