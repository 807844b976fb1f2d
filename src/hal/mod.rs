//! Hardware abstraction: the narrow trait surfaces the core consumes,
//! plus the Raspberry Pi register drivers behind them.
//!
//! The core never touches a register directly; it only sees
//! [`SerialPort`] (byte-level serial I/O, interrupt-safe),
//! [`OutputChannel`] (the shared text output guarded by the resource),
//! [`Led`] and [`Delay`].

pub mod gpio;
pub mod uart;

pub use gpio::{BusyDelay, LedPin};
pub use uart::Pl011Uart;

/// MMIO base of the peripheral window, selected by the chip feature.
#[cfg(feature = "rpi4")]
pub(crate) const PERIPHERAL_BASE: usize = 0xFE00_0000; // BCM2711
#[cfg(all(feature = "rpi3", not(feature = "rpi4")))]
pub(crate) const PERIPHERAL_BASE: usize = 0x3F00_0000; // BCM2837
#[cfg(not(any(feature = "rpi4", feature = "rpi3")))]
pub(crate) const PERIPHERAL_BASE: usize = 0x2000_0000; // BCM2835/BCM2836

/// Byte-level serial transceiver.
///
/// All methods take `&self` and are callable from interrupt context.
pub trait SerialPort {
    /// Send one byte, blocking until the transmit path is free.
    fn send_byte(&self, byte: u8);

    /// Non-blocking probe for received data.
    fn byte_available(&self) -> bool;

    /// Read one received byte. Only valid after [`byte_available`]
    /// returned `true`; the core never calls it unchecked.
    ///
    /// [`byte_available`]: SerialPort::byte_available
    fn receive_byte(&self) -> u8;
}

/// Text output channel shared between tasks.
///
/// Concurrent access is arbitrated by [`crate::resource::OutputResource`];
/// implementations need no locking of their own. Line-ending translation
/// (if the transport wants one) is the implementation's business; the
/// default helpers emit bytes exactly as given.
pub trait OutputChannel {
    /// Write one byte.
    fn putc(&mut self, byte: u8);

    /// Write raw bytes.
    fn put_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.putc(b);
        }
    }

    /// Write a string.
    fn puts(&mut self, s: &str) {
        self.put_bytes(s.as_bytes());
    }

    /// Write a decimal number: no leading zeros, `0` as a single digit.
    fn put_dec(&mut self, value: u32) {
        if value == 0 {
            self.putc(b'0');
            return;
        }

        let mut digits = [0u8; 10];
        let mut i = 0;
        let mut v = value;
        while v > 0 {
            digits[i] = b'0' + (v % 10) as u8;
            i += 1;
            v /= 10;
        }
        while i > 0 {
            i -= 1;
            self.putc(digits[i]);
        }
    }

    /// Write a hex number as `0x` + exactly 8 uppercase digits.
    fn put_hex(&mut self, value: u32) {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        self.puts("0x");
        for shift in (0..8).rev() {
            self.putc(HEX[((value >> (shift * 4)) & 0xF) as usize]);
        }
    }
}

/// Indicator LED.
pub trait Led {
    /// Drive the LED on or off.
    fn set(&mut self, on: bool);

    /// Invert the LED state.
    fn toggle(&mut self);
}

/// Millisecond busy-wait.
pub trait Delay {
    fn delay_ms(&self, ms: u32);
}
