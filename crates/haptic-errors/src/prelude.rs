//! Prelude module for convenient error handling imports.
//!
//! ```
//! use haptic_errors::prelude::*;
//!
//! fn stop_reason(err: &ServoError) -> ErrorCategory {
//!     err.category()
//! }
//!
//! let err: ServoError = DeviceError::NotReady.into();
//! assert_eq!(stop_reason(&err), ErrorCategory::Device);
//! ```

pub use crate::{
    DeviceResult, Result,
    common::{ErrorCategory, ErrorSeverity, ServoError},
    device::{DeviceError, RejectionCause},
    display::DisplayError,
    validation::ValidationError,
};

/// Return early with a validation error when a condition fails.
#[macro_export]
macro_rules! validate {
    ($condition:expr, $error:expr) => {
        if !$condition {
            return Err($error.into());
        }
    };
}
