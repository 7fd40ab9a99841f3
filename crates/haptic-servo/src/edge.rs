//! Edge-triggered reporting.
//!
//! A processed sample carries level values: contact is true for as long as
//! the stylus is in the surface and a button bit stays set while it is held.
//! Downstream consumers only want transitions, so each signal keeps its last
//! reported value and emits on change.

use crate::types::{ContactState, DeviceStatus, EdgeEvent, Sample, SignalId};

/// Default number of tracked buttons.
pub const DEFAULT_BUTTON_COUNT: u8 = 2;

/// Remembers the last reported value of one signal.
///
/// The first observation always reports, since nothing has been reported
/// yet.
///
/// # Example
///
/// ```rust
/// use haptic_servo::edge::EdgeReporter;
///
/// let mut contact = EdgeReporter::new();
/// assert_eq!(contact.observe(false), Some(false));
/// assert_eq!(contact.observe(false), None);
/// assert_eq!(contact.observe(true), Some(true));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeReporter<T> {
    last: Option<T>,
}

impl<T> Default for EdgeReporter<T> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<T: Copy + PartialEq> EdgeReporter<T> {
    /// A reporter that has not reported anything yet.
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Record `value`, returning it when it differs from the last report.
    #[inline]
    pub fn observe(&mut self, value: T) -> Option<T> {
        if self.last == Some(value) {
            return None;
        }
        self.last = Some(value);
        Some(value)
    }

    /// The last reported value.
    pub fn last(&self) -> Option<T> {
        self.last
    }

    /// Forget the last report so the next observation reports again.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Edge state for everything the loop reports: contact, each tracked
/// button, and the device status.
#[derive(Debug, Clone)]
pub struct EdgeTracker {
    contact: EdgeReporter<bool>,
    buttons: Vec<EdgeReporter<bool>>,
    status: EdgeReporter<DeviceStatus>,
}

impl Default for EdgeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_BUTTON_COUNT)
    }
}

impl EdgeTracker {
    /// Track contact plus buttons `0..button_count`.
    ///
    /// `button_count` is capped at [`Sample::MAX_BUTTONS`].
    pub fn new(button_count: u8) -> Self {
        let count = button_count.min(Sample::MAX_BUTTONS);
        Self {
            contact: EdgeReporter::new(),
            buttons: vec![EdgeReporter::new(); usize::from(count)],
            status: EdgeReporter::new(),
        }
    }

    /// Number of tracked buttons.
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    /// Maximum number of events a single [`observe`](Self::observe) can emit.
    pub fn max_events(&self) -> usize {
        self.buttons.len() + 1
    }

    /// Append the transitions in `sample`/`contact` to `events`.
    ///
    /// Contact is reported first, then buttons in index order. Returns the
    /// number of events appended. `events` is not cleared, so the caller can
    /// reuse one buffer across iterations.
    pub fn observe(
        &mut self,
        sample: &Sample,
        contact: &ContactState,
        events: &mut Vec<EdgeEvent>,
    ) -> usize {
        let before = events.len();

        if let Some(value) = self.contact.observe(contact.in_contact) {
            events.push(EdgeEvent {
                signal: SignalId::Contact,
                value,
            });
        }

        for (index, reporter) in (0_u8..).zip(self.buttons.iter_mut()) {
            if let Some(value) = reporter.observe(sample.button_pressed(index)) {
                events.push(EdgeEvent {
                    signal: SignalId::Button(index),
                    value,
                });
            }
        }

        events.len().saturating_sub(before)
    }

    /// Record the device status, returning it when it changed.
    pub fn observe_status(&mut self, status: DeviceStatus) -> Option<DeviceStatus> {
        self.status.observe(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(buttons: u32) -> Sample {
        Sample {
            buttons,
            ..Sample::default()
        }
    }

    fn free() -> ContactState {
        ContactState::free(1.0)
    }

    #[test]
    fn test_first_observation_reports() {
        let mut reporter = EdgeReporter::<u32>::new();
        assert_eq!(reporter.last(), None);
        assert_eq!(reporter.observe(0), Some(0));
        assert_eq!(reporter.last(), Some(0));
    }

    #[test]
    fn test_reset_reports_again() {
        let mut reporter = EdgeReporter::new();
        assert_eq!(reporter.observe(true), Some(true));
        reporter.reset();
        assert_eq!(reporter.observe(true), Some(true));
    }

    #[test]
    fn test_button_transitions_only() {
        let mut tracker = EdgeTracker::default();
        let mut events = Vec::new();

        // Initial state is reported once.
        assert_eq!(tracker.observe(&sample(0b00), &free(), &mut events), 3);
        events.clear();

        let mut per_transition = Vec::new();
        for mask in [0b01, 0b01, 0b11] {
            let n = tracker.observe(&sample(mask), &free(), &mut events);
            per_transition.push(n);
        }
        assert_eq!(per_transition, vec![1, 0, 1]);
        assert_eq!(
            events,
            vec![
                EdgeEvent {
                    signal: SignalId::Button(0),
                    value: true,
                },
                EdgeEvent {
                    signal: SignalId::Button(1),
                    value: true,
                },
            ]
        );
    }

    #[test]
    fn test_contact_reported_first() {
        let mut tracker = EdgeTracker::new(1);
        let mut events = Vec::new();
        let touching = ContactState {
            in_contact: true,
            ..ContactState::default()
        };
        tracker.observe(&sample(0b1), &touching, &mut events);
        assert_eq!(
            events.first(),
            Some(&EdgeEvent {
                signal: SignalId::Contact,
                value: true,
            })
        );
        assert_eq!(events.len(), tracker.max_events());
    }

    #[test]
    fn test_untracked_buttons_ignored() {
        let mut tracker = EdgeTracker::new(1);
        let mut events = Vec::new();
        tracker.observe(&sample(0), &free(), &mut events);
        events.clear();
        assert_eq!(tracker.observe(&sample(0b110), &free(), &mut events), 0);
    }

    #[test]
    fn test_button_count_capped() {
        assert_eq!(EdgeTracker::new(200).button_count(), 32);
    }

    #[test]
    fn test_status_changes() {
        let mut tracker = EdgeTracker::default();
        assert_eq!(tracker.observe_status(DeviceStatus::Ok), Some(DeviceStatus::Ok));
        assert_eq!(tracker.observe_status(DeviceStatus::Ok), None);
        assert_eq!(
            tracker.observe_status(DeviceStatus::MotorsWarm),
            Some(DeviceStatus::MotorsWarm)
        );
        assert_eq!(tracker.observe_status(DeviceStatus::MotorsWarm), None);
    }
}
