//! Shared test utilities for the haptic servo suite.
//!
//! This crate provides common test helpers, assertions, and scripted test
//! doubles to reduce code duplication across the test suite.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with good error messages and `#[track_caller]`
//! - [`assertions`] - Assertion macros for floats, forces and sequences
//! - [`mock`] - Scripted device sessions, recording sinks and observers
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! haptic-test-helpers = { workspace = true }
//! ```
//!
//! Then import the prelude:
//!
//! ```rust,ignore
//! use haptic_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod assertions;
pub mod must;
pub mod prelude;

#[cfg(feature = "mock")]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;

pub use must::*;
