//! Priority-ceiling lock over the shared output channel.
//!
//! Exactly one physical output channel exists and several tasks write to
//! it; [`OutputResource`] owns the channel and hands out scoped access
//! through [`OutputGuard`]. On a single core with immediate ceiling
//! priority a correctly-configured system can never see real contention,
//! so a failed [`OutputResource::acquire`] always means protocol misuse
//! (ceiling violation or nested acquire) and the caller must skip the
//! protected section instead of retrying.
//!
//! The guard releases on drop, on every exit path. It also keeps the
//! caller's [`TaskContext`] mutably borrowed, so `wait()` inside a
//! protected section is rejected at compile time. Interrupt handlers hold
//! no [`TaskContext`] at all and therefore cannot acquire.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::hal::OutputChannel;
use crate::sched::{Priority, Scheduler, TaskContext};
use crate::status::ErrorCode;

/// Mutual-exclusion resource binding one output channel to a ceiling
/// priority.
pub struct OutputResource<C: OutputChannel> {
    channel: UnsafeCell<C>,
    locked: AtomicBool,
    ceiling: Priority,
}

// SAFETY: the channel is only reachable through a guard, and the `locked`
// flag admits at most one guard at a time.
unsafe impl<C: OutputChannel + Send> Sync for OutputResource<C> {}

impl<C: OutputChannel> OutputResource<C> {
    /// Bind `channel` to this resource with the given ceiling priority.
    ///
    /// The ceiling must be at least the priority of every task that will
    /// acquire the resource; callers above it are refused.
    pub const fn new(channel: C, ceiling: Priority) -> Self {
        Self {
            channel: UnsafeCell::new(channel),
            locked: AtomicBool::new(false),
            ceiling,
        }
    }

    /// Take exclusive access to the channel for the current task run.
    ///
    /// Fails with [`ErrorCode::Access`] if the caller's priority exceeds
    /// the ceiling, or if the resource is already held (nested acquire).
    /// On failure the caller must not write to the channel and must not
    /// retry.
    ///
    /// The guard borrows `ctx` mutably for its whole lifetime: the task
    /// cannot suspend while holding the resource.
    pub fn acquire<'a, S: Scheduler>(
        &'a self,
        ctx: &'a mut TaskContext<'_, S>,
    ) -> Result<OutputGuard<'a, C>, ErrorCode> {
        if ctx.priority() > self.ceiling {
            return Err(ErrorCode::Access);
        }
        if self.locked.swap(true, Ordering::AcqRel) {
            return Err(ErrorCode::Access);
        }
        Ok(OutputGuard { resource: self })
    }

    /// Whether the resource is currently held.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Configured ceiling priority.
    pub fn ceiling(&self) -> Priority {
        self.ceiling
    }
}

/// Scoped access to the protected channel. Releases the resource on drop.
pub struct OutputGuard<'a, C: OutputChannel> {
    resource: &'a OutputResource<C>,
}

impl<C: OutputChannel> Deref for OutputGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        // SAFETY: the lock flag guarantees this guard is the only access.
        unsafe { &*self.resource.channel.get() }
    }
}

impl<C: OutputChannel> DerefMut for OutputGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        // SAFETY: the lock flag guarantees this guard is the only access.
        unsafe { &mut *self.resource.channel.get() }
    }
}

impl<C: OutputChannel> Drop for OutputGuard<'_, C> {
    fn drop(&mut self) {
        self.resource.locked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::TaskId;
    use crate::status::Status;

    struct NopScheduler;

    impl Scheduler for NopScheduler {
        fn activate(&self, _task: TaskId) -> Status {
            Ok(())
        }
        fn park(&self) {}
    }

    struct Capture(Vec<u8>);

    impl OutputChannel for Capture {
        fn putc(&mut self, byte: u8) {
            self.0.push(byte);
        }
    }

    fn ctx(priority: u8) -> TaskContext<'static, NopScheduler> {
        static SCHED: NopScheduler = NopScheduler;
        TaskContext::new(&SCHED, TaskId(1), Priority(priority))
    }

    #[test]
    fn test_acquire_write_release() {
        let resource = OutputResource::new(Capture(Vec::new()), Priority(5));
        let mut task = ctx(2);

        {
            let mut out = resource.acquire(&mut task).unwrap();
            out.puts("hello");
            assert!(resource.is_locked());
        }

        // Guard dropped: resource free again.
        assert!(!resource.is_locked());
        let out = resource.acquire(&mut task).unwrap();
        assert_eq!(out.0, b"hello");
    }

    #[test]
    fn test_ceiling_violation_refused() {
        let resource = OutputResource::new(Capture(Vec::new()), Priority(3));
        let mut task = ctx(4);

        assert_eq!(
            resource.acquire(&mut task).err(),
            Some(ErrorCode::Access)
        );
        assert!(!resource.is_locked());
    }

    #[test]
    fn test_priority_at_ceiling_allowed() {
        let resource = OutputResource::new(Capture(Vec::new()), Priority(3));
        let mut task = ctx(3);
        assert!(resource.acquire(&mut task).is_ok());
    }

    #[test]
    fn test_contended_acquire_refused() {
        let resource = OutputResource::new(Capture(Vec::new()), Priority(5));
        let mut first = ctx(2);
        let mut second = ctx(2);

        let guard = resource.acquire(&mut first).unwrap();
        assert_eq!(
            resource.acquire(&mut second).err(),
            Some(ErrorCode::Access)
        );

        drop(guard);
        assert!(resource.acquire(&mut second).is_ok());
    }

    #[test]
    fn test_failed_acquire_does_not_unlock() {
        let resource = OutputResource::new(Capture(Vec::new()), Priority(5));
        let mut holder = ctx(2);
        let mut intruder = ctx(6);

        let _guard = resource.acquire(&mut holder).unwrap();
        // Ceiling violation while held must leave the lock alone.
        assert!(resource.acquire(&mut intruder).is_err());
        assert!(resource.is_locked());
    }
}
