//! Device session error types.
//!
//! A device session owns the hardware lifecycle. Startup failures are fatal,
//! force command rejections are not: the servo loop retries on the next
//! processed sample.

use core::fmt;

use crate::common::ErrorSeverity;

/// Why a device refused a force command.
///
/// Kept `Copy + Eq + Hash` so the servo loop can compare causes cheaply and
/// log only when the cause changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionCause {
    /// The session is not servoing (never started, or already stopped)
    SessionStopped,
    /// Motors are too warm; force output is suspended until they cool
    MotorsWarm,
    /// The command contained a value the device cannot render
    InvalidForce,
    /// Vendor specific device fault code
    Fault(i32),
}

impl fmt::Display for RejectionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionCause::SessionStopped => write!(f, "session stopped"),
            RejectionCause::MotorsWarm => write!(f, "motors warm"),
            RejectionCause::InvalidForce => write!(f, "invalid force"),
            RejectionCause::Fault(code) => write!(f, "device fault {code}"),
        }
    }
}

/// Device session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// Session was never started
    #[error("Device not ready: session has not been started")]
    NotReady,

    /// `init()` failed
    #[error("Failed to initialize device: {reason}")]
    InitFailed {
        /// Failure reason
        reason: String,
    },

    /// `start()` failed
    #[error("Failed to start servo scheduler: {reason}")]
    StartFailed {
        /// Failure reason
        reason: String,
    },

    /// Force command rejected by the session
    #[error("Force command rejected: {cause}")]
    CommandRejected {
        /// Rejection cause
        cause: RejectionCause,
    },

    /// `stop()` could not release the device cleanly
    #[error("Failed to stop device: {reason}")]
    StopFailed {
        /// Failure reason
        reason: String,
    },

    /// Device went away while servoing
    #[error("Device disconnected: {0}")]
    Disconnected(String),
}

impl DeviceError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeviceError::NotReady => ErrorSeverity::Error,
            DeviceError::InitFailed { .. } => ErrorSeverity::Critical,
            DeviceError::StartFailed { .. } => ErrorSeverity::Critical,
            DeviceError::CommandRejected { .. } => ErrorSeverity::Warning,
            DeviceError::StopFailed { .. } => ErrorSeverity::Error,
            DeviceError::Disconnected(_) => ErrorSeverity::Critical,
        }
    }

    /// Check if this error must end a running servo loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeviceError::Disconnected(_))
    }

    /// Check if this error happened while bringing the session up.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            DeviceError::NotReady | DeviceError::InitFailed { .. } | DeviceError::StartFailed { .. }
        )
    }

    /// The rejection cause, if this is a command rejection.
    pub fn rejection_cause(&self) -> Option<RejectionCause> {
        match self {
            DeviceError::CommandRejected { cause } => Some(*cause),
            _ => None,
        }
    }

    /// Create an init failure.
    pub fn init_failed(reason: impl Into<String>) -> Self {
        DeviceError::InitFailed {
            reason: reason.into(),
        }
    }

    /// Create a start failure.
    pub fn start_failed(reason: impl Into<String>) -> Self {
        DeviceError::StartFailed {
            reason: reason.into(),
        }
    }

    /// Create a stop failure.
    pub fn stop_failed(reason: impl Into<String>) -> Self {
        DeviceError::StopFailed {
            reason: reason.into(),
        }
    }

    /// Create a command rejection.
    pub fn rejected(cause: RejectionCause) -> Self {
        DeviceError::CommandRejected { cause }
    }

    /// Create a disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        DeviceError::Disconnected(device.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_severity() {
        assert_eq!(
            DeviceError::disconnected("touch").severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            DeviceError::rejected(RejectionCause::MotorsWarm).severity(),
            ErrorSeverity::Warning
        );
    }

    #[test]
    fn test_only_disconnect_is_fatal() {
        assert!(DeviceError::disconnected("touch").is_fatal());
        assert!(!DeviceError::rejected(RejectionCause::SessionStopped).is_fatal());
        assert!(!DeviceError::stop_failed("busy").is_fatal());
    }

    #[test]
    fn test_startup_classification() {
        assert!(DeviceError::NotReady.is_startup());
        assert!(DeviceError::init_failed("no cable").is_startup());
        assert!(DeviceError::start_failed("scheduler").is_startup());
        assert!(!DeviceError::rejected(RejectionCause::InvalidForce).is_startup());
    }

    #[test]
    fn test_rejection_cause_extraction() {
        let err = DeviceError::rejected(RejectionCause::Fault(0x0401));
        assert_eq!(err.rejection_cause(), Some(RejectionCause::Fault(0x0401)));
        assert_eq!(DeviceError::NotReady.rejection_cause(), None);
    }

    #[test]
    fn test_rejection_cause_display() {
        assert_eq!(RejectionCause::MotorsWarm.to_string(), "motors warm");
        assert_eq!(RejectionCause::Fault(7).to_string(), "device fault 7");
    }

    #[test]
    fn test_device_error_is_std_error() {
        let err = DeviceError::NotReady;
        let _: &dyn std::error::Error = &err;
    }
}
