//! SerialLineBridge - firmware entry point.
//!
//! Target-only wiring: static state, the single-core critical-section
//! implementation, the interrupt entry symbol, and a minimal run-to-
//! completion dispatch loop standing in for the host scheduler. The boot
//! stub is expected to set up the stack and exception vectors, route the
//! UART interrupt to [`firmware::isr_uart_rx`], and branch to
//! [`firmware::kernel_main`].
//!
//! On a host build this binary compiles to an empty `main` so the test
//! suite builds cleanly.

#![cfg_attr(all(target_os = "none", target_arch = "aarch64"), no_std)]
#![cfg_attr(all(target_os = "none", target_arch = "aarch64"), no_main)]

#[cfg(all(target_os = "none", target_arch = "aarch64"))]
mod firmware {
    use core::panic::PanicInfo;
    use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use serial_line_bridge::hal::{BusyDelay, Delay, LedPin, Pl011Uart};
    use serial_line_bridge::{
        hooks, line, Event, ErrorCode, IsrContext, LineConsumer, PeriodicReporter, Priority,
        RxInterrupt, Scheduler, SharedLineAssembler, Status, TaskContext, TaskId, Blinker,
    };

    /// Version string (set by build.rs, includes git hash).
    const VERSION: &str = env!("VERSION_STRING");

    const BAUD_RATE: u32 = 115_200;

    // Task identities and priorities, mirroring the host scheduler's
    // static configuration.
    const TASK_PROCESS: TaskId = TaskId(1);
    const TASK_SERIAL: TaskId = TaskId(2);
    const PRIO_PROCESS: Priority = Priority(3);
    const PRIO_SERIAL: Priority = Priority(2);

    /// Output resource ceiling: at least the priority of every acquirer.
    const OUTPUT_CEILING: Priority = Priority(3);

    /// Dispatch tick, milliseconds.
    const TICK_MS: u32 = 100;
    const REPORT_PERIOD_TICKS: u32 = 10; // 1 s
    const BLINK_PERIOD_TICKS: u32 = 5; // 500 ms

    // Static allocations; no heap exists in this system.
    static UART: Pl011Uart = Pl011Uart::new();
    static LINE: SharedLineAssembler = line::shared_assembler();
    static LINE_READY: Event = Event::new();
    static REPORT_COUNT: AtomicU32 = AtomicU32::new(0);
    static OUTPUT: serial_line_bridge::OutputResource<Pl011Uart> =
        serial_line_bridge::OutputResource::new(Pl011Uart::new(), OUTPUT_CEILING);
    static SCHED: BridgeScheduler = BridgeScheduler {
        process_pending: AtomicBool::new(false),
    };

    /// Single-core glue standing in for the host scheduler: activation is
    /// a pending flag the dispatch loop polls, parking is a WFE.
    struct BridgeScheduler {
        process_pending: AtomicBool,
    }

    impl Scheduler for BridgeScheduler {
        fn activate(&self, task: TaskId) -> Status {
            match task {
                TASK_PROCESS => {
                    // Idempotent: re-activating a pending task is a no-op.
                    self.process_pending.store(true, Ordering::Release);
                    Ok(())
                }
                _ => Err(ErrorCode::NoFunc),
            }
        }

        fn park(&self) {
            // SAFETY: WFE only pauses the core until the next event.
            unsafe { core::arch::asm!("wfe", options(nomem, nostack)) };
        }
    }

    // Single-core critical section: mask IRQs, restore on exit.
    mod cs {
        use critical_section::{set_impl, Impl, RawRestoreState};

        struct SingleCoreCriticalSection;
        set_impl!(SingleCoreCriticalSection);

        unsafe impl Impl for SingleCoreCriticalSection {
            unsafe fn acquire() -> RawRestoreState {
                let daif: u64;
                core::arch::asm!("mrs {}, daif", out(reg) daif, options(nomem, nostack));
                core::arch::asm!("msr daifset, #2", options(nomem, nostack));
                // True if IRQs were enabled before masking.
                daif & (1 << 7) == 0
            }

            unsafe fn release(was_enabled: RawRestoreState) {
                if was_enabled {
                    core::arch::asm!("msr daifclr, #2", options(nomem, nostack));
                }
            }
        }
    }

    /// UART receive interrupt entry. Invoked by the vector glue while
    /// IRQs are masked; preempts every task, never blocks.
    #[no_mangle]
    pub extern "C" fn isr_uart_rx() {
        let ctx = IsrContext::new();
        let rx = RxInterrupt::new(&UART, &LINE, &SCHED, TASK_PROCESS, &LINE_READY);
        if let Err(code) = rx.on_receive(&ctx) {
            fatal(code);
        }
    }

    /// Report the error and blink forever. Never returns.
    fn fatal(code: ErrorCode) -> ! {
        let mut out = Pl011Uart::new();
        let mut led = LedPin::new();
        led.init();
        hooks::error_hook(&mut out, &mut led, &BusyDelay, code)
    }

    #[panic_handler]
    fn panic(_info: &PanicInfo) -> ! {
        fatal(ErrorCode::Panic)
    }

    /// Boot entry, branched to by the boot stub after dropping to EL1
    /// with a stack and exception vectors in place.
    #[no_mangle]
    pub extern "C" fn kernel_main() -> ! {
        UART.init(BAUD_RATE);

        let mut led = LedPin::new();
        led.init();

        let mut banner_out = Pl011Uart::new();
        hooks::startup_banner(&mut banner_out, VERSION);

        dispatch_forever(led)
    }

    /// Run-to-completion dispatch loop. Each task body runs to its end
    /// (or to its wait) before the next is considered.
    fn dispatch_forever(mut led: LedPin) -> ! {
        let delay = BusyDelay;
        let consumer = LineConsumer::new(&LINE, &LINE_READY, &OUTPUT);
        let reporter = PeriodicReporter::new(&OUTPUT, &REPORT_COUNT);
        let mut blinker = Blinker::new(&mut led);

        let mut tick: u32 = 0;
        loop {
            if SCHED.process_pending.swap(false, Ordering::AcqRel) {
                let mut ctx = TaskContext::new(&SCHED, TASK_PROCESS, PRIO_PROCESS);
                consumer.run(&mut ctx);
            }

            if tick % REPORT_PERIOD_TICKS == 0 {
                let mut ctx = TaskContext::new(&SCHED, TASK_SERIAL, PRIO_SERIAL);
                reporter.run(&mut ctx);
            }

            if tick % BLINK_PERIOD_TICKS == 0 {
                blinker.run();
            }

            delay.delay_ms(TICK_MS);
            tick = tick.wrapping_add(1);
        }
    }
}

#[cfg(not(all(target_os = "none", target_arch = "aarch64")))]
mod host_cs {
    // The host stub never enters a critical section; this only satisfies
    // the linker.
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct NoopCriticalSection;
    set_impl!(NoopCriticalSection);

    unsafe impl Impl for NoopCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            false
        }
        unsafe fn release(_restore: RawRestoreState) {}
    }
}

#[cfg(not(all(target_os = "none", target_arch = "aarch64")))]
fn main() {
    // The firmware only runs on the target; a host build of this binary
    // exists so `cargo test` can build the whole package.
}
