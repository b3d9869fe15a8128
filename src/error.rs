//! Error kinds for the engine surface.
//!
//! The signal-path modules ([`crate::pulse`], [`crate::catalog`],
//! [`crate::protocols`]) never produce hardware or storage errors - only the
//! transmitter, the AC controller, and the stores do.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value is out of range (temperature, mode, action).
    /// Rejected with no side effect.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Load or execute against a missing (device, action) or AC state.
    #[error("not found: {0}")]
    NotFound(String),

    /// The decoder cascade and the universal decoder both refused the buffer.
    #[error("no protocol decoded the pulse buffer")]
    DecodeFailed,

    /// Decode succeeded but the protocol checksum did not verify and the
    /// caller asked for strict checking.
    #[error("{0} checksum mismatch")]
    ChecksumFailed(&'static str),

    /// The learner deadline elapsed.
    #[error("learn timed out")]
    Timeout,

    /// A request targeted a protocol without an encoder, or a non-AC protocol
    /// was passed to `set_protocol`.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The sink is mid-transmission.
    #[error("transmitter busy")]
    HardwareBusy,

    /// Transmission timed out waiting for sink completion, or the sink
    /// reported a fault.
    #[error("hardware fault: {0}")]
    HardwareFault(String),

    /// Persistent store failure; surfaced unchanged after logging.
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }
}
