//! Status codes and error types for dataplane calls.
//!
//! Every configuration call into the dataplane returns a flat integer status.
//! The exact codes are defined by the engine, so this module never
//! reinterprets them: a failed call surfaces as [`XlateError::Status`] with
//! the raw value intact.

use std::fmt;
use std::io;
use thiserror::Error;

/// Raw status returned by a dataplane call (0 = success).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VppStatus(i32);

impl VppStatus {
    pub const SUCCESS: VppStatus = VppStatus(0);

    pub const fn from_raw(status: i32) -> Self {
        VppStatus(status)
    }

    pub const fn as_raw(&self) -> i32 {
        self.0
    }

    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_error(&self) -> bool {
        self.0 != 0
    }

    /// Converts to a Result, attributing a failure to `op`.
    pub fn into_result(self, op: &'static str) -> XlateResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(XlateError::Status { op, status: self })
        }
    }
}

impl fmt::Display for VppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for VppStatus {
    fn from(status: i32) -> Self {
        VppStatus(status)
    }
}

/// Error type for translation layer operations.
#[derive(Debug, Error)]
pub enum XlateError {
    /// The dataplane rejected the call.
    #[error("{op} failed with status {status}")]
    Status { op: &'static str, status: VppStatus },

    /// The request could not be marshalled for the dataplane.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// A dataplane session already exists in this process.
    #[error("dataplane session already active")]
    SessionActive,

    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl XlateError {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        XlateError::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        XlateError::Config {
            message: message.into(),
        }
    }

    /// Returns the raw dataplane status if this is a Status error.
    pub fn status(&self) -> Option<VppStatus> {
        match self {
            XlateError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the name of the failed dataplane call, if any.
    pub fn op(&self) -> Option<&'static str> {
        match self {
            XlateError::Status { op, .. } => Some(op),
            _ => None,
        }
    }
}

/// Result type for translation layer operations.
pub type XlateResult<T> = Result<T, XlateError>;

/// Extension trait for converting raw integer statuses.
pub trait VppStatusExt {
    fn to_result(self, op: &'static str) -> XlateResult<()>;
}

impl VppStatusExt for i32 {
    fn to_result(self, op: &'static str) -> XlateResult<()> {
        VppStatus::from_raw(self).into_result(op)
    }
}
