//! # haptic-atomic
//!
//! Concurrency primitives shared between the servo control thread, the
//! device acquisition context and the display consumer.
//!
//! ## Guarantees
//!
//! - **No heap allocations** after construction
//! - **No torn values**: multi-field values move as whole snapshots
//! - **Publisher never blocks** on the display mailbox
//!
//! ## Modules
//!
//! - [`counters`] - Relaxed atomic counters describing loop activity
//! - [`cell`] - Lock-protected snapshot cell for `Copy` values
//! - [`mailbox`] - Single-slot latest-value hand-off
//!
//! ## Usage
//!
//! ```rust
//! use haptic_atomic::{LatestMailbox, LoopCounters, SnapshotCell};
//!
//! let counters = LoopCounters::new();
//! let cell = SnapshotCell::new([0.0_f64; 3]);
//! let mailbox = LatestMailbox::new();
//!
//! cell.store([1.0, 2.0, 3.0]);
//! let overwrote = mailbox.publish(cell.load());
//! counters.record_display_publish(overwrote);
//!
//! assert_eq!(counters.snapshot().display_published, 1);
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cell;
pub mod counters;
pub mod mailbox;

pub mod prelude;

pub use cell::SnapshotCell;
pub use counters::{CounterSnapshot, LoopCounters};
pub use mailbox::LatestMailbox;
