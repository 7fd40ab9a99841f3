//! Prelude for haptic-atomic.
//!
//! ```rust
//! use haptic_atomic::prelude::*;
//!
//! let counters = LoopCounters::new();
//! counters.inc_processed();
//! ```

pub use crate::cell::SnapshotCell;
pub use crate::counters::{CounterSnapshot, LoopCounters};
pub use crate::mailbox::LatestMailbox;
