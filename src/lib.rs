//! # SerialLineBridge
//!
//! Interrupt-driven UART line bridge for a fixed-priority preemptive
//! scheduler on Raspberry Pi.
//!
//! ## Architecture
//!
//! ```text
//! RX interrupt ──▶ LineAssembler ──▶ activate + signal ──▶ LineConsumer
//!  (echo, never                                            (waits, prints
//!   blocks)                                                 under lock)
//!
//! PeriodicReporter ──────────────▶ OutputResource ◀────────────┘
//!  (1 s period)                     (priority-ceiling lock,
//!                                    one output channel)
//! ```
//!
//! The interrupt path and the task path are separated at the type level:
//! interrupt handlers get an [`IsrContext`] which cannot wait or acquire,
//! task bodies get a [`TaskContext`] whose `wait` is the only suspension
//! point in the system.

#![cfg_attr(not(test), no_std)]

pub mod event;
pub mod hal;
pub mod hooks;
pub mod line;
pub mod resource;
pub mod rx;
pub mod sched;
pub mod status;
pub mod tasks;

pub use event::Event;
pub use line::{Feed, LineAssembler, LineState, SharedLineAssembler, LINE_CAPACITY};
pub use resource::{OutputGuard, OutputResource};
pub use rx::RxInterrupt;
pub use sched::{IsrContext, Priority, Scheduler, TaskContext, TaskId};
pub use status::{ErrorCode, Status};
pub use tasks::{Blinker, LineConsumer, PeriodicReporter};
