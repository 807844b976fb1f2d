//! Lifecycle hooks invoked by the scheduler glue.
//!
//! These write directly to the output channel, bypassing the resource:
//! startup runs before any task exists, and the error/shutdown hooks run
//! after scheduling has already failed, when lock state can no longer be
//! trusted.

use crate::hal::{Delay, Led, OutputChannel};
use crate::status::ErrorCode;

/// Fatal-path blink period in milliseconds.
const ERROR_BLINK_MS: u32 = 100;

/// One-time boot banner.
pub fn startup_banner(out: &mut impl OutputChannel, version: &str) {
    out.puts("\n");
    out.puts("================================================\n");
    out.puts(" ");
    out.puts(version);
    out.puts("\n");
    out.puts(" UART line bridge ready\n");
    out.puts("================================================\n");
    out.puts("\n");
}

/// Report an unrecoverable error.
///
/// Split from [`error_hook`] so the report format is testable; the
/// non-returning blink loop is not.
pub fn write_error_report(out: &mut impl OutputChannel, code: ErrorCode) {
    out.puts("ERROR: ");
    out.put_hex(code.code());
    out.puts("\n");
}

/// Unrecoverable scheduler error: report once, then blink forever.
///
/// The system's only crash path; every other failure is silently
/// absorbed (dropped reports, dropped overflow bytes).
pub fn error_hook(
    out: &mut impl OutputChannel,
    led: &mut impl Led,
    delay: &impl Delay,
    code: ErrorCode,
) -> ! {
    write_error_report(out, code);

    loop {
        led.toggle();
        delay.delay_ms(ERROR_BLINK_MS);
    }
}

/// Orderly shutdown report.
pub fn shutdown_hook(out: &mut impl OutputChannel, code: u32) {
    out.puts("\nSystem Shutdown. Error code: ");
    out.put_hex(code);
    out.puts("\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Capture(Vec<u8>);

    impl OutputChannel for Capture {
        fn putc(&mut self, byte: u8) {
            self.0.push(byte);
        }
    }

    #[test]
    fn test_error_report_format() {
        let mut out = Capture(Vec::new());
        write_error_report(&mut out, ErrorCode::Access);
        assert_eq!(out.0, b"ERROR: 0x00000001\n");
    }

    #[test]
    fn test_shutdown_report_format() {
        let mut out = Capture(Vec::new());
        shutdown_hook(&mut out, 0x2A);
        assert_eq!(out.0, b"\nSystem Shutdown. Error code: 0x0000002A\n");
    }

    #[test]
    fn test_banner_contains_version() {
        let mut out = Capture(Vec::new());
        startup_banner(&mut out, "SerialLineBridge v0.1.0");
        let text = String::from_utf8(out.0).unwrap();
        assert!(text.contains("SerialLineBridge v0.1.0"));
        assert!(text.contains("UART line bridge ready"));
    }
}
