//! Host-scheduler capability interface and execution-context tokens.
//!
//! The fixed-priority scheduler itself (dispatch, priorities, context
//! switch) lives outside this crate; the core only needs two primitives
//! from it, expressed by the [`Scheduler`] trait.
//!
//! Execution contexts are split at the type level:
//!
//! - [`IsrContext`] is the non-suspending capability handed to interrupt
//!   handlers. It has no `wait` and cannot acquire the output resource,
//!   so a blocking call from the receive interrupt is a compile error.
//! - [`TaskContext`] is the suspending capability handed to task bodies.
//!   [`TaskContext::wait`] is the only suspension point in the core, and
//!   it takes `&mut self` so a held resource guard (which borrows the
//!   context mutably) statically forbids waiting inside a protected
//!   section.

use crate::event::Event;
use crate::status::Status;

/// Identifier of a schedulable unit of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskId(pub u8);

/// Fixed task priority. Higher value means more urgent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority(pub u8);

/// Narrow capability interface onto the host scheduler.
pub trait Scheduler {
    /// Make `task` runnable at its assigned priority.
    ///
    /// Non-blocking and callable from interrupt context. Activating an
    /// already-runnable task is idempotent. An `Err` means the scheduler
    /// hit an unrecoverable condition; the caller escalates it to the
    /// fatal path.
    fn activate(&self, task: TaskId) -> Status;

    /// Yield the processor until the current unit of work is resumed.
    ///
    /// Callable from task context only. The core calls this in a loop
    /// around an event check, so spurious wake-ups are harmless.
    fn park(&self);
}

/// Non-suspending capability token for interrupt handlers.
///
/// Must only be constructed by the interrupt entry glue, immediately
/// before invoking a handler.
pub struct IsrContext {
    _private: (),
}

impl IsrContext {
    /// Create the token. Caller asserts it runs in interrupt context.
    #[inline]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

/// Suspending capability token for task bodies.
pub struct TaskContext<'a, S: Scheduler> {
    sched: &'a S,
    task: TaskId,
    priority: Priority,
}

impl<'a, S: Scheduler> TaskContext<'a, S> {
    /// Create the token for one run of `task`. Built by the dispatch glue.
    pub fn new(sched: &'a S, task: TaskId, priority: Priority) -> Self {
        Self {
            sched,
            task,
            priority,
        }
    }

    /// Task this context belongs to.
    pub fn task(&self) -> TaskId {
        self.task
    }

    /// Assigned priority of the running task.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Suspend until `event` is raised.
    ///
    /// The only suspension point in the core. No timeout: blocks until
    /// the matching signal arrives. Takes `&mut self` so it cannot be
    /// called while an [`crate::resource::OutputGuard`] is alive.
    pub fn wait(&mut self, event: &Event) {
        while !event.is_raised() {
            self.sched.park();
        }
    }
}
