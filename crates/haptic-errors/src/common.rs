//! Top-level error type and classification shared by all crates.

use core::fmt;

use crate::{DeviceError, ValidationError};

/// Top-level error that wraps every servo sub-error.
#[derive(Debug, thiserror::Error)]
pub enum ServoError {
    /// Device session errors
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation not allowed in the current loop state
    #[error("Invalid loop state: expected {expected}, found {actual}")]
    InvalidState {
        /// Required state
        expected: &'static str,
        /// Observed state
        actual: &'static str,
    },

    /// Too many consecutive force command failures
    #[error("Circuit breaker open after {failures} consecutive command failures (last: {last_error})")]
    CircuitOpen {
        /// Consecutive failures observed
        failures: u32,
        /// Most recent command failure
        #[source]
        last_error: DeviceError,
    },

    /// A running loop was ended by a fatal error
    #[error("Servo loop aborted: {source}")]
    Aborted {
        /// The error that ended the loop
        #[source]
        source: Box<ServoError>,
        /// Outcome of the single `stop()` attempt made while stopping
        stop_error: Option<DeviceError>,
    },
}

impl ServoError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ServoError::Device(_) => ErrorCategory::Device,
            ServoError::Validation(_) => ErrorCategory::Validation,
            ServoError::Io(_) => ErrorCategory::IO,
            ServoError::Config(_) => ErrorCategory::Config,
            ServoError::InvalidState { .. } => ErrorCategory::Loop,
            ServoError::CircuitOpen { .. } => ErrorCategory::Device,
            ServoError::Aborted { source, .. } => source.category(),
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ServoError::Device(e) => e.severity(),
            ServoError::Validation(e) => e.severity(),
            ServoError::Io(_) => ErrorSeverity::Error,
            ServoError::Config(_) => ErrorSeverity::Error,
            ServoError::InvalidState { .. } => ErrorSeverity::Error,
            ServoError::CircuitOpen { .. } => ErrorSeverity::Critical,
            ServoError::Aborted { .. } => ErrorSeverity::Critical,
        }
    }

    /// Check if this error came from device bring-up (init/start/not ready).
    pub fn is_startup_failure(&self) -> bool {
        matches!(self, ServoError::Device(e) if e.is_startup())
    }

    /// The device error at the root of this error, if any.
    pub fn device_error(&self) -> Option<&DeviceError> {
        match self {
            ServoError::Device(e) => Some(e),
            ServoError::Aborted { source, .. } => source.device_error(),
            _ => None,
        }
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        ServoError::Config(msg.into())
    }

    /// Wrap a fatal error together with the stop outcome.
    pub fn aborted(source: ServoError, stop_error: Option<DeviceError>) -> Self {
        ServoError::Aborted {
            source: Box::new(source),
            stop_error,
        }
    }
}

impl From<std::io::Error> for ServoError {
    fn from(e: std::io::Error) -> Self {
        ServoError::Io(e)
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Device session errors
    Device = 1,
    /// Configuration errors
    Config = 3,
    /// I/O errors
    IO = 4,
    /// Validation errors
    Validation = 5,
    /// Control loop lifecycle errors
    Loop = 6,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Device => write!(f, "Device"),
            ErrorCategory::Config => write!(f, "Config"),
            ErrorCategory::IO => write!(f, "IO"),
            ErrorCategory::Validation => write!(f, "Validation"),
            ErrorCategory::Loop => write!(f, "Loop"),
        }
    }
}

/// Error severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational, no action required
    Info = 0,
    /// Warning, may require attention
    Warning = 1,
    /// Error, operation failed
    Error = 2,
    /// Critical, the loop cannot continue
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
