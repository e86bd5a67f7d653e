use thiserror::Error;

/// Errors returned by envelope validation.
///
/// Note: this error type is re-exported at the crate root; the example is
/// illustrative and not compiled as a public doctest.
///
/// # Examples
/// ```text
/// use bthome_core::FrameError;
///
/// let err = FrameError::UnsupportedVersion { version: 3 };
/// assert!(err.to_string().contains("unsupported"));
/// ```
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame too short: need {needed} bytes, got {actual}")]
    ShortFrame { needed: usize, actual: usize },
    #[error("service identifier mismatch: expected {expected:#06x}, got {actual:#06x}")]
    ServiceIdMismatch { expected: u16, actual: u16 },
    #[error("unsupported advertisement version: {version}")]
    UnsupportedVersion { version: u8 },
}

/// Why a payload scan stopped before consuming every byte.
///
/// Object ids imply the value length, so an unknown id (or a value cut off
/// by the end of the payload) makes the remaining bytes unparseable. The
/// measurements decoded before the stop point are still returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Truncated {
    #[error("unknown object id {object_id:#04x} at offset {offset}")]
    UnknownObjectId { object_id: u8, offset: usize },
    #[error("incomplete value for object id {object_id:#04x}: need {needed} bytes, got {remaining}")]
    IncompleteValue {
        object_id: u8,
        needed: usize,
        remaining: usize,
    },
}
