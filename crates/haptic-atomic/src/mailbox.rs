//! Latest-value mailbox for rate decoupling.
//!
//! The control thread publishes at servo rate; a display consumer reads at
//! its own, slower cadence. The mailbox holds at most one value: publishing
//! over an unread value replaces it, so the consumer always sees the newest
//! frame and the publisher never waits.
//!
//! # RT Safety
//!
//! - Bounded storage allocated once at construction
//! - `publish` is lock-free and never blocks
//! - Stale frames are dropped, not queued

use crossbeam::queue::ArrayQueue;

/// Single-slot, lock-free, latest-value hand-off.
///
/// # Example
///
/// ```rust
/// use haptic_atomic::LatestMailbox;
///
/// let mailbox = LatestMailbox::new();
/// assert!(!mailbox.publish(1_u32));
/// assert!(mailbox.publish(2));      // 1 was never read and is dropped
/// assert_eq!(mailbox.take(), Some(2));
/// assert_eq!(mailbox.take(), None);
/// ```
#[derive(Debug)]
pub struct LatestMailbox<T> {
    slot: ArrayQueue<T>,
}

impl<T> Default for LatestMailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestMailbox<T> {
    /// Create an empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: ArrayQueue::new(1),
        }
    }

    /// Publish a value, replacing any unread one.
    ///
    /// Returns `true` when an unread value was overwritten.
    #[inline]
    pub fn publish(&self, value: T) -> bool {
        self.slot.force_push(value).is_some()
    }

    /// Take the latest value, leaving the mailbox empty.
    #[inline]
    pub fn take(&self) -> Option<T> {
        self.slot.pop()
    }

    /// Check whether an unread value is waiting.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.slot.is_empty()
    }
}
