//! Atomic counters for the servo loop.
//!
//! [`LoopCounters`] is shared between the control thread (writer) and any
//! number of observers (readers). Every method is a single relaxed atomic
//! operation, so the control thread never blocks on a reader.

use core::sync::atomic::{AtomicU64, Ordering};

/// Counter snapshot returned by [`LoopCounters::snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Samples that passed novelty detection and were processed
    pub processed_samples: u64,
    /// Iterations that found no new sample and throttled
    pub idle_polls: u64,
    /// Force commands accepted by the device
    pub force_commands: u64,
    /// Force commands rejected by the device
    pub command_rejections: u64,
    /// Edge events emitted (contact and button transitions)
    pub edge_events: u64,
    /// Frames offered to the display mailbox
    pub display_published: u64,
    /// Frames overwritten in the mailbox before the display consumed them
    pub display_dropped: u64,
}

impl CounterSnapshot {
    /// Total force commands attempted, accepted or not.
    #[must_use]
    pub fn force_attempts(&self) -> u64 {
        self.force_commands.saturating_add(self.command_rejections)
    }
}

/// Atomic counters for the servo loop.
///
/// All counters use `Ordering::Relaxed`: they are statistics, never used to
/// synchronize other memory.
///
/// # Example
///
/// ```rust
/// use haptic_atomic::LoopCounters;
///
/// let counters = LoopCounters::new();
/// counters.inc_processed();
/// counters.inc_idle_poll();
///
/// let snapshot = counters.snapshot();
/// assert_eq!(snapshot.processed_samples, 1);
/// assert_eq!(snapshot.idle_polls, 1);
/// ```
#[derive(Debug)]
pub struct LoopCounters {
    processed_samples: AtomicU64,
    idle_polls: AtomicU64,
    force_commands: AtomicU64,
    command_rejections: AtomicU64,
    edge_events: AtomicU64,
    display_published: AtomicU64,
    display_dropped: AtomicU64,
}

impl Default for LoopCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopCounters {
    /// Create a new set of counters, all zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            processed_samples: AtomicU64::new(0),
            idle_polls: AtomicU64::new(0),
            force_commands: AtomicU64::new(0),
            command_rejections: AtomicU64::new(0),
            edge_events: AtomicU64::new(0),
            display_published: AtomicU64::new(0),
            display_dropped: AtomicU64::new(0),
        }
    }

    /// Record a processed sample.
    #[inline]
    pub fn inc_processed(&self) {
        self.processed_samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an iteration that found no new sample.
    #[inline]
    pub fn inc_idle_poll(&self) {
        self.idle_polls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one force command.
    #[inline]
    pub fn record_force_command(&self, accepted: bool) {
        if accepted {
            self.force_commands.fetch_add(1, Ordering::Relaxed);
        } else {
            self.command_rejections.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record `count` edge events.
    #[inline]
    pub fn add_edge_events(&self, count: u64) {
        self.edge_events.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a display publication; `overwrote` is true when an unread frame was replaced.
    #[inline]
    pub fn record_display_publish(&self, overwrote: bool) {
        self.display_published.fetch_add(1, Ordering::Relaxed);
        if overwrote {
            self.display_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get a snapshot of all counter values.
    ///
    /// Values are individually consistent; there is no atomic snapshot
    /// across all counters.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            processed_samples: self.processed_samples.load(Ordering::Relaxed),
            idle_polls: self.idle_polls.load(Ordering::Relaxed),
            force_commands: self.force_commands.load(Ordering::Relaxed),
            command_rejections: self.command_rejections.load(Ordering::Relaxed),
            edge_events: self.edge_events.load(Ordering::Relaxed),
            display_published: self.display_published.load(Ordering::Relaxed),
            display_dropped: self.display_dropped.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.processed_samples.store(0, Ordering::Relaxed);
        self.idle_polls.store(0, Ordering::Relaxed);
        self.force_commands.store(0, Ordering::Relaxed);
        self.command_rejections.store(0, Ordering::Relaxed);
        self.edge_events.store(0, Ordering::Relaxed);
        self.display_published.store(0, Ordering::Relaxed);
        self.display_dropped.store(0, Ordering::Relaxed);
    }

    /// Current processed sample count.
    #[inline]
    #[must_use]
    pub fn processed_samples(&self) -> u64 {
        self.processed_samples.load(Ordering::Relaxed)
    }

    /// Current idle poll count.
    #[inline]
    #[must_use]
    pub fn idle_polls(&self) -> u64 {
        self.idle_polls.load(Ordering::Relaxed)
    }

    /// Current rejected command count.
    #[inline]
    #[must_use]
    pub fn command_rejections(&self) -> u64 {
        self.command_rejections.load(Ordering::Relaxed)
    }
}
