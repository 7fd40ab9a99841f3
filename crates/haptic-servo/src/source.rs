//! Sample source with novelty detection.
//!
//! Wraps the device session and gates reads on the session having been
//! started. Polling never blocks; the acquisition context may overwrite the
//! sample between two polls, and only the latest value is ever visible.

use haptic_errors::{DeviceError, DeviceResult};

use crate::ports::DeviceSession;
use crate::types::Sample;

/// Latest-sample view over a [`DeviceSession`].
///
/// Reads fail with [`DeviceError::NotReady`] until [`arm`](Self::arm) is
/// called, which the control loop does only after `start()` succeeded.
#[derive(Debug)]
pub struct SampleSource<S> {
    session: S,
    armed: bool,
}

impl<S: DeviceSession> SampleSource<S> {
    /// Wrap `session`; reads are refused until armed.
    pub fn new(session: S) -> Self {
        Self {
            session,
            armed: false,
        }
    }

    /// Allow reads. Call once the session has started.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    /// Refuse reads again. Call before stopping the session.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Whether reads are allowed.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// The latest sample.
    ///
    /// # Errors
    ///
    /// [`DeviceError::NotReady`] if the source is not armed.
    #[inline]
    pub fn poll(&self) -> DeviceResult<Sample> {
        self.ensure_armed()?;
        Ok(self.session.poll_sample())
    }

    /// Sequence of the latest sample.
    ///
    /// # Errors
    ///
    /// [`DeviceError::NotReady`] if the source is not armed.
    #[inline]
    pub fn latest_sequence(&self) -> DeviceResult<u64> {
        self.ensure_armed()?;
        Ok(self.session.sample_sequence())
    }

    /// Whether a sample newer than `last_seen` is available.
    ///
    /// # Errors
    ///
    /// [`DeviceError::NotReady`] if the source is not armed.
    #[inline]
    pub fn has_new_sample(&self, last_seen: u64) -> DeviceResult<bool> {
        Ok(self.latest_sequence()? > last_seen)
    }

    /// The wrapped session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// The wrapped session, mutably, for lifecycle and force commands.
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Unwrap the session.
    pub fn into_inner(self) -> S {
        self.session
    }

    fn ensure_armed(&self) -> DeviceResult {
        if self.armed {
            Ok(())
        } else {
            Err(DeviceError::NotReady)
        }
    }
}
