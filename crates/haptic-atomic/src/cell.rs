//! Lock-protected snapshot cell.
//!
//! The device acquisition context writes whole samples while the control
//! thread reads them. A sample is several `f64` coordinates plus a sequence
//! number, which no single atomic can hold, so the cell keeps the value
//! behind a `parking_lot` mutex and only ever copies it in or out. The
//! critical section is a `memcpy` of a `Copy` value; it never allocates and
//! never calls out.

use parking_lot::Mutex;

/// A cell holding one `Copy` value, exchanged as a whole.
///
/// Readers always observe a value that some writer stored in full; fields
/// from two different writes are never mixed.
///
/// # Example
///
/// ```rust
/// use haptic_atomic::SnapshotCell;
///
/// let cell = SnapshotCell::new((1.0_f64, 2.0_f64, 3.0_f64));
/// cell.store((4.0, 5.0, 6.0));
/// assert_eq!(cell.load(), (4.0, 5.0, 6.0));
/// ```
#[derive(Debug, Default)]
pub struct SnapshotCell<T: Copy> {
    value: Mutex<T>,
}

impl<T: Copy> SnapshotCell<T> {
    /// Create a cell holding `value`.
    pub const fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    /// Copy the current value out.
    #[inline]
    pub fn load(&self) -> T {
        *self.value.lock()
    }

    /// Replace the current value.
    #[inline]
    pub fn store(&self, value: T) {
        *self.value.lock() = value;
    }

    /// Copy the current value out without waiting.
    ///
    /// Returns `None` when a writer holds the lock right now.
    #[inline]
    pub fn try_load(&self) -> Option<T> {
        self.value.try_lock().map(|guard| *guard)
    }

    /// Read-modify-write under the lock and return the stored value.
    #[inline]
    pub fn update<F>(&self, f: F) -> T
    where
        F: FnOnce(&mut T),
    {
        let mut guard = self.value.lock();
        f(&mut *guard);
        *guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    struct Frame {
        seq: u64,
        xyz: [f64; 3],
    }

    #[test]
    fn test_store_then_load() {
        let cell = SnapshotCell::new(Frame::default());
        cell.store(Frame {
            seq: 7,
            xyz: [1.0, 2.0, 3.0],
        });
        assert_eq!(cell.load().seq, 7);
    }

    #[test]
    fn test_update_returns_new_value() {
        let cell = SnapshotCell::new(Frame::default());
        let stored = cell.update(|f| f.seq += 1);
        assert_eq!(stored.seq, 1);
        assert_eq!(cell.load().seq, 1);
    }

    #[test]
    fn test_try_load_uncontended() {
        let cell = SnapshotCell::new(5_u64);
        assert_eq!(cell.try_load(), Some(5));
    }
}
