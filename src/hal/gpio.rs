//! GPIO register driver: UART pin mux, indicator LED, busy-wait delay.
//!
//! BCM283x/BCM2711 GPIO block. The indicator LED sits on GPIO17; the
//! UART uses GPIO14/15 in alternate function 0.

use crate::hal::{Delay, Led, PERIPHERAL_BASE};

const GPIO_BASE: usize = PERIPHERAL_BASE + 0x20_0000;

const GPFSEL1: usize = GPIO_BASE + 0x04;
const GPSET0: usize = GPIO_BASE + 0x1C;
const GPCLR0: usize = GPIO_BASE + 0x28;
const GPPUD: usize = GPIO_BASE + 0x94;
const GPPUDCLK0: usize = GPIO_BASE + 0x98;

/// Indicator LED pin.
const LED_GPIO: u32 = 17;

#[inline]
fn write_reg(addr: usize, value: u32) {
    // SAFETY: fixed MMIO address inside the GPIO register block.
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

#[inline]
fn read_reg(addr: usize) -> u32 {
    // SAFETY: fixed MMIO address inside the GPIO register block.
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Coarse cycle-counting delay for register sequencing.
fn spin(count: u32) {
    for _ in 0..count {
        core::hint::spin_loop();
    }
}

/// Route GPIO14/15 to the PL011 (alternate function 0) and disable their
/// pull resistors. Called once from UART init.
pub(crate) fn configure_uart_pins() {
    let mut ra = read_reg(GPFSEL1);
    ra &= !((7 << 12) | (7 << 15));
    ra |= (4 << 12) | (4 << 15); // Alt0
    write_reg(GPFSEL1, ra);

    // Pull-up/down disable sequence per the datasheet: set control,
    // wait 150 cycles, clock it into the pins, wait, release.
    write_reg(GPPUD, 0);
    spin(150);
    write_reg(GPPUDCLK0, (1 << 14) | (1 << 15));
    spin(150);
    write_reg(GPPUDCLK0, 0);
}

/// Indicator LED on GPIO17, driven as a plain output.
pub struct LedPin {
    on: bool,
}

impl LedPin {
    pub const fn new() -> Self {
        Self { on: false }
    }

    /// Configure the pin as an output, initially off.
    pub fn init(&mut self) {
        let mut ra = read_reg(GPFSEL1);
        ra &= !(7 << 21);
        ra |= 1 << 21; // output
        write_reg(GPFSEL1, ra);

        write_reg(GPCLR0, 1 << LED_GPIO);
        self.on = false;
    }
}

impl Default for LedPin {
    fn default() -> Self {
        Self::new()
    }
}

impl Led for LedPin {
    fn set(&mut self, on: bool) {
        if on {
            write_reg(GPSET0, 1 << LED_GPIO);
        } else {
            write_reg(GPCLR0, 1 << LED_GPIO);
        }
        self.on = on;
    }

    fn toggle(&mut self) {
        let next = !self.on;
        self.set(next);
    }
}

/// Approximate millisecond busy-wait. Uncalibrated, like the indicator
/// blink it paces; good enough for the fatal-path blink period.
pub struct BusyDelay;

impl Delay for BusyDelay {
    fn delay_ms(&self, ms: u32) {
        spin(ms.saturating_mul(1000));
    }
}
