//! Status codes for scheduler and resource operations.
//!
//! The codes follow the OSEK convention the host scheduler speaks: `E_OK`
//! is represented by `Ok(())` on the Rust side, everything else is an
//! [`ErrorCode`]. The numeric values are stable because they appear on the
//! wire in fatal error reports (`ERROR: 0x00000001`).

/// Non-OK status of a scheduler or resource primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    /// Resource access violation: ceiling lower than the caller's
    /// priority, or a nested acquire of an already-held resource.
    Access = 1,

    /// Too many pending activations for a task.
    Limit = 4,

    /// Operation on a task or event that does not exist.
    NoFunc = 5,

    /// Task is in a state that forbids the operation.
    State = 7,

    /// Out-of-range argument.
    Value = 8,

    /// Rust panic escalated to the fatal path.
    Panic = 0x50,
}

impl ErrorCode {
    /// Numeric code as reported on the output channel.
    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Convert from a raw status word (unknown values map to `State`).
    pub fn from_code(value: u32) -> Self {
        match value {
            1 => ErrorCode::Access,
            4 => ErrorCode::Limit,
            5 => ErrorCode::NoFunc,
            7 => ErrorCode::State,
            8 => ErrorCode::Value,
            0x50 => ErrorCode::Panic,
            _ => ErrorCode::State,
        }
    }
}

/// Result of a scheduler or resource primitive.
pub type Status = Result<(), ErrorCode>;
