/*!
 * Error types for ganeshactl
 */

use std::fmt;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CtlError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_FATAL: i32 = 2;
pub const EXIT_DECODE: i32 = 3;

/// Top-level error for one invocation of the tool
#[derive(Error, Debug)]
pub enum CtlError {
    /// The server's bus name could not be reached; no call was issued
    #[error("Can't talk to {service} on the {bus} bus, is the NFS server running? ({reason})")]
    Connectivity {
        service: String,
        bus: String,
        reason: String,
    },

    /// A required command-line argument is missing or malformed
    #[error("{0} Try \"ganeshactl help\" for more info")]
    Argument(String),

    /// The server (or the transport) answered with an error
    #[error("operation failed: {0}")]
    Remote(String),

    /// The reply did not match the wire contract
    #[error("malformed reply: {0}")]
    Decode(#[from] DecodeError),

    /// The server acknowledged the request with a failure status
    #[error("server returned status = false: {0}")]
    Rejected(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The event loop could not be started
    #[error("Runtime error: {0}")]
    Runtime(#[from] io::Error),

    /// Completion signal used outside its single-shot contract
    #[error("Completion signal error: {0}")]
    Signal(#[from] crate::signal::SignalError),
}

impl CtlError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CtlError::Remote(_) | CtlError::Rejected(_) => EXIT_FAILED,
            CtlError::Decode(_) => EXIT_DECODE,
            CtlError::Connectivity { .. }
            | CtlError::Argument(_)
            | CtlError::Config(_)
            | CtlError::Runtime(_)
            | CtlError::Signal(_) => EXIT_FATAL,
        }
    }

    /// Whether the error happened before any remote call was issued
    pub fn is_pre_call(&self) -> bool {
        matches!(
            self,
            CtlError::Connectivity { .. } | CtlError::Argument(_) | CtlError::Config(_)
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            CtlError::Connectivity { .. } => ErrorCategory::Connectivity,
            CtlError::Argument(_) => ErrorCategory::Validation,
            CtlError::Remote(_) | CtlError::Rejected(_) => ErrorCategory::Remote,
            CtlError::Decode(_) => ErrorCategory::Decode,
            CtlError::Config(_) => ErrorCategory::Configuration,
            CtlError::Runtime(_) | CtlError::Signal(_) => ErrorCategory::Internal,
        }
    }
}

impl From<OperationError> for CtlError {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::Remote(e) => CtlError::Remote(e.to_string()),
            OperationError::Decode(e) => CtlError::Decode(e),
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bus or service unreachable
    Connectivity,
    /// Command-line validation
    Validation,
    /// Remote or transport failure during the call
    Remote,
    /// Reply shape mismatch
    Decode,
    /// Configuration errors
    Configuration,
    /// Runtime and programming errors
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Connectivity => write!(f, "connectivity"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Remote => write!(f, "remote"),
            ErrorCategory::Decode => write!(f, "decode"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

/// Error delivered by the bus transport for a single call.
///
/// Remote exceptions and transport failures are kept apart here for logging,
/// but facades surface both the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("{name}: {message}")]
    Remote { name: String, message: String },

    #[error("{0}")]
    Transport(String),
}

/// Error opening a connection to a remote object
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot reach {service} at {path}: {reason}")]
pub struct ConnectError {
    pub service: String,
    pub path: String,
    pub reason: String,
}

/// A reply that does not match the expected wire shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{context}: expected {expected} fields, found {found}")]
    Arity {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{context}: expected {expected}, found {found}")]
    Type {
        context: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{context}: value {value} does not fit in {target}")]
    OutOfRange {
        context: &'static str,
        value: String,
        target: &'static str,
    },

    #[error("{context}: duplicate key {key:?}")]
    DuplicateKey { context: &'static str, key: String },
}

/// Failure branch of a completion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("operation failed: {0}")]
    Remote(#[from] BusError),

    #[error("malformed reply: {0}")]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinguishable() {
        let connectivity = CtlError::Connectivity {
            service: "org.ganesha.nfsd".to_string(),
            bus: "system".to_string(),
            reason: "name has no owner".to_string(),
        };
        let remote = CtlError::Remote("org.freedesktop.DBus.Error.Failed: boom".to_string());
        let decode = CtlError::Decode(DecodeError::Arity {
            context: "client",
            expected: 10,
            found: 9,
        });

        assert_eq!(connectivity.exit_code(), EXIT_FATAL);
        assert_eq!(remote.exit_code(), EXIT_FAILED);
        assert_eq!(decode.exit_code(), EXIT_DECODE);
        assert_eq!(CtlError::Argument("x".to_string()).exit_code(), EXIT_FATAL);
    }

    #[test]
    fn test_pre_call_errors() {
        assert!(CtlError::Argument("missing".to_string()).is_pre_call());
        assert!(CtlError::Config("bad".to_string()).is_pre_call());
        assert!(!CtlError::Remote("x".to_string()).is_pre_call());
    }

    #[test]
    fn test_operation_error_display_distinguishes_decode() {
        let remote = OperationError::from(BusError::Remote {
            name: "org.freedesktop.DBus.Error.Failed".to_string(),
            message: "no such export".to_string(),
        });
        let decode = OperationError::from(DecodeError::Type {
            context: "export id",
            expected: "unsigned",
            found: "text",
        });

        assert_eq!(
            remote.to_string(),
            "operation failed: org.freedesktop.DBus.Error.Failed: no such export"
        );
        assert_eq!(
            decode.to_string(),
            "malformed reply: export id: expected unsigned, found text"
        );
    }

    #[test]
    fn test_operation_error_into_ctl_error() {
        let err: CtlError = OperationError::Remote(BusError::Transport("timed out".to_string())).into();
        assert_eq!(err.category(), ErrorCategory::Remote);
        assert_eq!(err.to_string(), "operation failed: timed out");
    }

    #[test]
    fn test_argument_error_display() {
        let err = CtlError::Argument("add_client requires an IP.".to_string());
        assert_eq!(
            err.to_string(),
            "add_client requires an IP. Try \"ganeshactl help\" for more info"
        );
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Connectivity.to_string(), "connectivity");
        assert_eq!(ErrorCategory::Decode.to_string(), "decode");
    }
}
