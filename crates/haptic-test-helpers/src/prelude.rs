//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use haptic_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_some};

pub use crate::{assert_approx_eq, assert_force_approx, assert_monotonic};

#[cfg(feature = "mock")]
pub use crate::mock::{
    RecordingObserver, RecordingSink, ScriptedSession, SessionCall, SessionProbe, sample_at,
};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
