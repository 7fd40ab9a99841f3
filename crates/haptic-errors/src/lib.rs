//! Centralized error types for the haptic servo suite.
//!
//! The servo loop talks to an external device session and a best-effort
//! display; both can fail in ways the loop must tell apart. This crate keeps
//! that classification in one place.
//!
//! # Architecture
//!
//! - [`common`]: the top-level [`ServoError`], severity and category
//! - [`device`]: device session failures and force command rejection causes
//! - [`display`]: best-effort display sink failures
//! - [`validation`]: configuration and input validation failures
//!
//! # Example
//!
//! ```
//! use haptic_errors::prelude::*;
//!
//! fn check_stiffness(k: f64) -> Result<f64> {
//!     if !(k >= 0.0) {
//!         return Err(ValidationError::out_of_range("stiffness", k, 0.0, f64::MAX).into());
//!     }
//!     Ok(k)
//! }
//!
//! assert!(matches!(check_stiffness(0.1), Ok(_)));
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod common;
pub mod device;
pub mod display;
pub mod prelude;
pub mod validation;

pub use common::{ErrorCategory, ErrorSeverity, ServoError};
pub use device::{DeviceError, RejectionCause};
pub use display::DisplayError;
pub use validation::ValidationError;

/// A specialized `Result` type for servo operations.
pub type Result<T> = std::result::Result<T, ServoError>;

/// A specialized `Result` type for device session calls.
pub type DeviceResult<T = ()> = std::result::Result<T, DeviceError>;
