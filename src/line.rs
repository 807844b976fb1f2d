//! Receive-line assembler.
//!
//! Runs at interrupt priority: one byte per receive interrupt is fed in,
//! and complete lines are handed to the consumer task through the
//! `Empty -> Filling -> Ready -> Empty` state machine. The assembler does
//! no I/O itself; echoing is the caller's job (see [`crate::rx`]).
//!
//! # Ownership
//!
//! While `Filling`, the buffer belongs to the interrupt handler. Between
//! `Ready` and [`LineAssembler::consume`] it belongs to the consumer task;
//! during that window the assembler ignores all input (the unconsumed line
//! is never overwritten), so the ready flag is the only synchronization
//! the two sides need.

use core::cell::RefCell;

use critical_section::Mutex;

/// Receive buffer capacity in bytes, including the terminating NUL.
pub const LINE_CAPACITY: usize = 128;

/// Assembler shared between the receive interrupt and the consumer task.
///
/// The critical section covers the multi-word buffer mutation; the
/// `Ready` state carries the ownership handoff itself.
pub type SharedLineAssembler = Mutex<RefCell<LineAssembler>>;

/// Create a [`SharedLineAssembler`] suitable for a `static`.
pub const fn shared_assembler() -> SharedLineAssembler {
    Mutex::new(RefCell::new(LineAssembler::new()))
}

/// Longest line the assembler stores. Input beyond this is echoed but
/// dropped (silent overflow policy).
pub const MAX_LINE_LEN: usize = LINE_CAPACITY - 2;

/// Buffer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineState {
    /// No data accumulated.
    Empty,
    /// Partial line accumulated, owned by the interrupt handler.
    Filling,
    /// Complete line waiting for the consumer, owned by the consumer.
    Ready,
}

/// Outcome of feeding one byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feed {
    /// Byte stored at the cursor.
    Stored,
    /// Line full: byte discarded (still echoed by the caller).
    Dropped,
    /// Terminator seen: a complete line is now `Ready`.
    Completed,
    /// A previous line is still `Ready` and unconsumed: byte discarded.
    Ignored,
}

/// Fixed-capacity line assembler.
pub struct LineAssembler {
    buf: [u8; LINE_CAPACITY],
    cursor: usize,
    ready_len: usize,
    state: LineState,
}

impl LineAssembler {
    /// Create an empty assembler.
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_CAPACITY],
            cursor: 0,
            ready_len: 0,
            state: LineState::Empty,
        }
    }

    /// Feed one received byte.
    ///
    /// `\r` and `\n` terminate the line: a NUL is written at the cursor,
    /// the cursor resets, and the state becomes `Ready`. Other bytes are
    /// stored while the line is shorter than [`MAX_LINE_LEN`] and dropped
    /// afterwards. While a completed line is still `Ready`, every byte
    /// (terminators included) is `Ignored` so the unconsumed line survives.
    ///
    /// Never blocks, never allocates.
    pub fn feed(&mut self, byte: u8) -> Feed {
        if self.state == LineState::Ready {
            return Feed::Ignored;
        }

        if byte == b'\r' || byte == b'\n' {
            self.buf[self.cursor] = 0;
            self.ready_len = self.cursor;
            self.cursor = 0;
            self.state = LineState::Ready;
            return Feed::Completed;
        }

        if self.cursor < MAX_LINE_LEN {
            self.buf[self.cursor] = byte;
            self.cursor += 1;
            self.state = LineState::Filling;
            Feed::Stored
        } else {
            Feed::Dropped
        }
    }

    /// Completed line contents (without the NUL), or `None` unless `Ready`.
    pub fn ready_line(&self) -> Option<&[u8]> {
        match self.state {
            LineState::Ready => Some(&self.buf[..self.ready_len]),
            _ => None,
        }
    }

    /// Release the buffer back to the interrupt handler (`Ready -> Empty`).
    ///
    /// No-op unless a line is `Ready`, so a consumer that wakes without a
    /// line to its name can call it unconditionally.
    pub fn consume(&mut self) {
        if self.state == LineState::Ready {
            self.state = LineState::Empty;
            self.ready_len = 0;
        }
    }

    /// Current buffer state.
    pub fn state(&self) -> LineState {
        self.state
    }
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}
