//! Receive-interrupt handler: echo, line assembly, consumer activation.
//!
//! Runs once per receive interrupt, at a priority above every task.
//!
//! # Contract
//!
//! - Reads exactly one byte, and only after the non-blocking probe.
//! - Echoes every received byte unchanged, terminators included, before
//!   any termination handling.
//! - On a completed line: CR+LF echo pair, then activate the consumer,
//!   then raise its event, in that order.
//! - Never blocks, never acquires the output resource, never allocates.

use crate::event::Event;
use crate::line::{Feed, SharedLineAssembler};
use crate::hal::SerialPort;
use crate::sched::{IsrContext, Scheduler, TaskId};
use crate::status::Status;

/// The interrupt-side half of the line handoff.
pub struct RxInterrupt<'a, P: SerialPort, S: Scheduler> {
    serial: &'a P,
    assembler: &'a SharedLineAssembler,
    sched: &'a S,
    consumer: TaskId,
    line_ready: &'a Event,
}

impl<'a, P: SerialPort, S: Scheduler> RxInterrupt<'a, P, S> {
    pub const fn new(
        serial: &'a P,
        assembler: &'a SharedLineAssembler,
        sched: &'a S,
        consumer: TaskId,
        line_ready: &'a Event,
    ) -> Self {
        Self {
            serial,
            assembler,
            sched,
            consumer,
            line_ready,
        }
    }

    /// Handle one receive interrupt.
    ///
    /// An `Err` comes from the scheduler's `activate` and is
    /// unrecoverable; the interrupt entry glue escalates it to the fatal
    /// path.
    pub fn on_receive(&self, _ctx: &IsrContext) -> Status {
        if !self.serial.byte_available() {
            return Ok(());
        }

        let byte = self.serial.receive_byte();

        // Echo back, terminator included.
        self.serial.send_byte(byte);

        let feed = critical_section::with(|cs| self.assembler.borrow_ref_mut(cs).feed(byte));

        if feed == Feed::Completed {
            self.serial.send_byte(b'\r');
            self.serial.send_byte(b'\n');

            // Wake the consumer: activation first, then the event. Both
            // are idempotent, so a line completed while the previous one
            // is still in flight cannot double-wake.
            self.sched.activate(self.consumer)?;
            self.line_ready.signal();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::{shared_assembler, LineState};
    use crate::sched::TaskId;
    use core::cell::RefCell;
    use core::sync::atomic::{AtomicU32, Ordering};

    struct FakeSerial {
        rx: RefCell<Vec<u8>>,
        tx: RefCell<Vec<u8>>,
    }

    impl FakeSerial {
        fn with_input(bytes: &[u8]) -> Self {
            let mut rx: Vec<u8> = bytes.to_vec();
            rx.reverse(); // pop from the back
            Self {
                rx: RefCell::new(rx),
                tx: RefCell::new(Vec::new()),
            }
        }
    }

    impl SerialPort for FakeSerial {
        fn send_byte(&self, byte: u8) {
            self.tx.borrow_mut().push(byte);
        }
        fn byte_available(&self) -> bool {
            !self.rx.borrow().is_empty()
        }
        fn receive_byte(&self) -> u8 {
            self.rx.borrow_mut().pop().expect("probe before read")
        }
    }

    struct CountingScheduler {
        activations: AtomicU32,
    }

    impl Scheduler for CountingScheduler {
        fn activate(&self, _task: TaskId) -> Status {
            self.activations.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
        fn park(&self) {}
    }

    #[test]
    fn test_byte_echoed_and_stored() {
        let serial = FakeSerial::with_input(b"A");
        let assembler = shared_assembler();
        let sched = CountingScheduler {
            activations: AtomicU32::new(0),
        };
        let event = Event::new();
        let rx = RxInterrupt::new(&serial, &assembler, &sched, TaskId(1), &event);

        rx.on_receive(&IsrContext::new()).unwrap();

        assert_eq!(*serial.tx.borrow(), b"A");
        assert!(!event.is_raised());
        assert_eq!(sched.activations.load(Ordering::Relaxed), 0);
        critical_section::with(|cs| {
            assert_eq!(assembler.borrow_ref(cs).state(), LineState::Filling);
        });
    }

    #[test]
    fn test_terminator_echo_then_crlf_then_wake() {
        let serial = FakeSerial::with_input(b"Hi\n");
        let assembler = shared_assembler();
        let sched = CountingScheduler {
            activations: AtomicU32::new(0),
        };
        let event = Event::new();
        let rx = RxInterrupt::new(&serial, &assembler, &sched, TaskId(1), &event);

        let ctx = IsrContext::new();
        for _ in 0..3 {
            rx.on_receive(&ctx).unwrap();
        }

        // Raw echo of all three bytes, then the CR+LF pair.
        assert_eq!(*serial.tx.borrow(), b"Hi\n\r\n");
        assert_eq!(sched.activations.load(Ordering::Relaxed), 1);
        assert!(event.is_raised());
        critical_section::with(|cs| {
            assert_eq!(assembler.borrow_ref(cs).ready_line(), Some(&b"Hi"[..]));
        });
    }

    #[test]
    fn test_no_data_is_noop() {
        let serial = FakeSerial::with_input(b"");
        let assembler = shared_assembler();
        let sched = CountingScheduler {
            activations: AtomicU32::new(0),
        };
        let event = Event::new();
        let rx = RxInterrupt::new(&serial, &assembler, &sched, TaskId(1), &event);

        rx.on_receive(&IsrContext::new()).unwrap();

        assert!(serial.tx.borrow().is_empty());
        assert_eq!(sched.activations.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_input_while_ready_still_echoed() {
        let serial = FakeSerial::with_input(b"a\nzz\n");
        let assembler = shared_assembler();
        let sched = CountingScheduler {
            activations: AtomicU32::new(0),
        };
        let event = Event::new();
        let rx = RxInterrupt::new(&serial, &assembler, &sched, TaskId(1), &event);

        let ctx = IsrContext::new();
        for _ in 0..5 {
            rx.on_receive(&ctx).unwrap();
        }

        // Everything is echoed, but only the first line completed.
        assert_eq!(*serial.tx.borrow(), b"a\n\r\nzz\n");
        assert_eq!(sched.activations.load(Ordering::Relaxed), 1);
        critical_section::with(|cs| {
            assert_eq!(assembler.borrow_ref(cs).ready_line(), Some(&b"a"[..]));
        });
    }

    #[test]
    fn test_scheduler_error_propagates() {
        struct FailingScheduler;
        impl Scheduler for FailingScheduler {
            fn activate(&self, _task: TaskId) -> Status {
                Err(crate::status::ErrorCode::Limit)
            }
            fn park(&self) {}
        }

        let serial = FakeSerial::with_input(b"\n");
        let assembler = shared_assembler();
        let sched = FailingScheduler;
        let event = Event::new();
        let rx = RxInterrupt::new(&serial, &assembler, &sched, TaskId(1), &event);

        let result = rx.on_receive(&IsrContext::new());
        assert_eq!(result, Err(crate::status::ErrorCode::Limit));
        // Event is not raised when activation failed.
        assert!(!event.is_raised());
    }
}
