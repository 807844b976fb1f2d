//! PL011 UART driver (UART0 on GPIO14/15).
//!
//! Serial wire format: 8 data bits, no parity, 1 stop bit, FIFOs
//! enabled. The receive interrupt is armed on "receive FIFO not empty";
//! the handler itself lives in [`crate::rx`], this module only touches
//! registers.

use crate::hal::{gpio, OutputChannel, SerialPort, PERIPHERAL_BASE};

const UART0_BASE: usize = PERIPHERAL_BASE + 0x20_1000;

const UART0_DR: usize = UART0_BASE + 0x00;
const UART0_FR: usize = UART0_BASE + 0x18;
const UART0_IBRD: usize = UART0_BASE + 0x24;
const UART0_FBRD: usize = UART0_BASE + 0x28;
const UART0_LCRH: usize = UART0_BASE + 0x2C;
const UART0_CR: usize = UART0_BASE + 0x30;
const UART0_IMSC: usize = UART0_BASE + 0x38;
const UART0_ICR: usize = UART0_BASE + 0x44;

/// Flag register bits.
const FR_RXFE: u32 = 1 << 4; // receive FIFO empty
const FR_TXFF: u32 = 1 << 5; // transmit FIFO full

/// Line control: 8-bit words, FIFOs enabled.
const LCRH_8N1_FIFO: u32 = (1 << 4) | (1 << 5) | (1 << 6);

/// Interrupt mask: receive interrupt only.
const IMSC_RXIM: u32 = 1 << 4;

/// Control: UART enable, TX enable, RX enable.
const CR_ENABLE: u32 = (1 << 0) | (1 << 8) | (1 << 9);

/// UART reference clock feeding the baud divisor.
const UART_CLOCK_HZ: u32 = 3_000_000;

#[inline]
fn write_reg(addr: usize, value: u32) {
    // SAFETY: fixed MMIO address inside the PL011 register block.
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

#[inline]
fn read_reg(addr: usize) -> u32 {
    // SAFETY: fixed MMIO address inside the PL011 register block.
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// PL011 UART0. All I/O goes through fixed MMIO addresses, so the type
/// itself is stateless and interrupt-safe.
pub struct Pl011Uart;

impl Pl011Uart {
    pub const fn new() -> Self {
        Self
    }

    /// Bring the UART up at `baud_rate`, 8N1 with FIFOs, receive
    /// interrupt unmasked.
    pub fn init(&self, baud_rate: u32) {
        write_reg(UART0_CR, 0);

        gpio::configure_uart_pins();

        write_reg(UART0_ICR, 0x7FF);

        // divisor = UARTCLK / (16 * baud), kept in 22.6 fixed point:
        // integer part in IBRD, fractional sixty-fourths in FBRD.
        let divisor = (UART_CLOCK_HZ * 4) / baud_rate;
        write_reg(UART0_IBRD, divisor >> 6);
        write_reg(UART0_FBRD, divisor & 0x3F);

        write_reg(UART0_LCRH, LCRH_8N1_FIFO);
        write_reg(UART0_IMSC, IMSC_RXIM);
        write_reg(UART0_CR, CR_ENABLE);
    }

    fn putc_raw(&self, byte: u8) {
        while read_reg(UART0_FR) & FR_TXFF != 0 {
            core::hint::spin_loop();
        }
        write_reg(UART0_DR, byte as u32);
    }
}

impl Default for Pl011Uart {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialPort for Pl011Uart {
    fn send_byte(&self, byte: u8) {
        self.putc_raw(byte);
    }

    fn byte_available(&self) -> bool {
        read_reg(UART0_FR) & FR_RXFE == 0
    }

    fn receive_byte(&self) -> u8 {
        (read_reg(UART0_DR) & 0xFF) as u8
    }
}

impl OutputChannel for Pl011Uart {
    /// Terminal discipline on the wire: `\n` goes out as `\r\n`.
    fn putc(&mut self, byte: u8) {
        if byte == b'\n' {
            self.putc_raw(b'\r');
        }
        self.putc_raw(byte);
    }
}
