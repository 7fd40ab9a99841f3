//! Force dispatch with clamping and rejection bookkeeping.
//!
//! Every processed sample produces exactly one force command, zero vectors
//! included, so the device output always follows the latest contact state.
//! A rejected command is retried implicitly by the next processed sample.
//! Logging is keyed on the failure kind: each kind is reported once until the
//! device has accepted [`RECOVERY_ACCEPTS`] commands in a row, which is then
//! reported once as a recovery. A device whose refusals come and go therefore
//! produces one warning per cause, not one per sample.

use core::mem::{Discriminant, discriminant};

use haptic_errors::{DeviceError, DeviceResult, RejectionCause, ValidationError};
use tracing::{info, warn};

use crate::ports::DeviceSession;
use crate::types::ForceVector3;

/// Default per-axis force limit (N).
pub const DEFAULT_MAX_FORCE_N: f64 = 2.0;

/// Consecutive accepted commands that count as a recovery.
pub const RECOVERY_ACCEPTS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    Rejected(RejectionCause),
    Other(Discriminant<DeviceError>),
}

impl FailureKind {
    fn of(err: &DeviceError) -> Self {
        match err.rejection_cause() {
            Some(cause) => FailureKind::Rejected(cause),
            None => FailureKind::Other(discriminant(err)),
        }
    }
}

/// Forwards clamped force vectors to a device session.
#[derive(Debug, Clone)]
pub struct ForceActuator {
    max_force_n: f64,
    current_failure: Option<FailureKind>,
    consecutive_failures: u32,
    // Kinds already reported since the last recovery; a handful at most.
    reported: Vec<FailureKind>,
    consecutive_accepts: u32,
    failure_reports: u64,
    last_commanded: ForceVector3,
}

impl Default for ForceActuator {
    fn default() -> Self {
        Self {
            max_force_n: DEFAULT_MAX_FORCE_N,
            current_failure: None,
            consecutive_failures: 0,
            reported: Vec::new(),
            consecutive_accepts: 0,
            failure_reports: 0,
            last_commanded: ForceVector3::ZERO,
        }
    }
}

impl ForceActuator {
    /// Actuator limiting each axis to `max_force_n` newtons.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] unless `max_force_n` is finite and positive.
    pub fn new(max_force_n: f64) -> Result<Self, ValidationError> {
        let max_force_n = ValidationError::require_finite("max_force_n", max_force_n)?;
        if max_force_n <= 0.0 {
            return Err(ValidationError::not_positive("max_force_n"));
        }
        Ok(Self {
            max_force_n,
            ..Self::default()
        })
    }

    /// Per-axis limit in newtons.
    pub fn max_force_n(&self) -> f64 {
        self.max_force_n
    }

    /// The vector that would be commanded for `force`.
    #[inline]
    pub fn prepare(&self, force: ForceVector3) -> ForceVector3 {
        force.clamp_per_axis(self.max_force_n)
    }

    /// Clamp `force` and forward it to `session`.
    ///
    /// Returns the vector actually commanded.
    ///
    /// # Errors
    ///
    /// Returns the session's error unchanged. Callers decide whether it is
    /// fatal; the actuator only tracks it.
    pub fn set_force<S>(&mut self, session: &mut S, force: ForceVector3) -> DeviceResult<ForceVector3>
    where
        S: DeviceSession + ?Sized,
    {
        let command = self.prepare(force);
        match session.command_force(command) {
            Ok(()) => {
                self.record_success();
                self.last_commanded = command;
                Ok(command)
            }
            Err(err) => {
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    fn record_success(&mut self) {
        self.current_failure = None;
        self.consecutive_failures = 0;
        if self.reported.is_empty() {
            return;
        }

        self.consecutive_accepts = self.consecutive_accepts.saturating_add(1);
        if self.consecutive_accepts >= RECOVERY_ACCEPTS {
            info!(
                causes = self.reported.len(),
                accepted = self.consecutive_accepts,
                "force commands accepted again"
            );
            self.reported.clear();
            self.consecutive_accepts = 0;
        }
    }

    fn record_failure(&mut self, err: &DeviceError) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_accepts = 0;

        let kind = FailureKind::of(err);
        self.current_failure = Some(kind);
        if !self.reported.contains(&kind) {
            self.reported.push(kind);
            self.failure_reports = self.failure_reports.saturating_add(1);
            warn!(
                error = %err,
                "force command failed; retrying with the next sample"
            );
        }
    }

    /// Failures since the last accepted command.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Rejection cause of the last command, if it was rejected.
    pub fn current_rejection(&self) -> Option<RejectionCause> {
        match self.current_failure {
            Some(FailureKind::Rejected(cause)) => Some(cause),
            _ => None,
        }
    }

    /// Whether the last command failed.
    pub fn is_failing(&self) -> bool {
        self.current_failure.is_some()
    }

    /// How many failure kinds were reported.
    pub fn failure_reports(&self) -> u64 {
        self.failure_reports
    }

    /// Last vector the session accepted.
    pub fn last_commanded(&self) -> ForceVector3 {
        self.last_commanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{SurfaceConfig, evaluate};
    use crate::types::{Axis, Pose3, Sample};
    use std::collections::VecDeque;
    use tracing_test::traced_test;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[derive(Debug, Default)]
    struct RecordingSession {
        results: VecDeque<DeviceResult>,
        commands: Vec<ForceVector3>,
    }

    impl RecordingSession {
        fn with_results(results: impl IntoIterator<Item = DeviceResult>) -> Self {
            Self {
                results: results.into_iter().collect(),
                commands: Vec::new(),
            }
        }
    }

    impl DeviceSession for RecordingSession {
        fn init(&mut self) -> DeviceResult {
            Ok(())
        }
        fn start(&mut self) -> DeviceResult {
            Ok(())
        }
        fn stop(&mut self) -> DeviceResult {
            Ok(())
        }
        fn poll_sample(&self) -> Sample {
            Sample::default()
        }
        fn sample_sequence(&self) -> u64 {
            0
        }
        fn command_force(&mut self, force: ForceVector3) -> DeviceResult {
            self.commands.push(force);
            self.results.pop_front().unwrap_or(Ok(()))
        }
    }

    fn warm() -> DeviceResult {
        Err(DeviceError::rejected(RejectionCause::MotorsWarm))
    }

    #[test]
    fn test_clamps_each_axis() -> TestResult {
        let mut actuator = ForceActuator::default();
        let mut session = RecordingSession::default();

        let sent = actuator.set_force(&mut session, ForceVector3::new(0.5, 9.0, -9.0))?;
        assert!((sent.fx - 0.5).abs() < f64::EPSILON);
        assert!((sent.fy - 2.0).abs() < f64::EPSILON);
        assert!((sent.fz + 2.0).abs() < f64::EPSILON);
        assert_eq!(session.commands, vec![sent]);
        Ok(())
    }

    #[test]
    fn test_nan_becomes_zero_and_infinity_saturates() -> TestResult {
        let mut actuator = ForceActuator::default();
        let mut session = RecordingSession::default();
        let sent = actuator.set_force(&mut session, ForceVector3::new(f64::NAN, f64::INFINITY, 1.0))?;
        assert!(sent.fx.abs() < f64::EPSILON);
        assert!((sent.fy - 2.0).abs() < f64::EPSILON);
        assert!((sent.fz - 1.0).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_overflowing_surface_force_saturates() -> TestResult {
        let surface = SurfaceConfig::new(Axis::Y, 0.0, 1e300)?;
        let contact = evaluate(&Pose3::new(0.0, -1e10, 0.0), &surface);
        assert!(contact.in_contact);
        assert!(contact.force.fy.is_infinite());

        let mut actuator = ForceActuator::default();
        let mut session = RecordingSession::default();
        let sent = actuator.set_force(&mut session, contact.force)?;
        assert!((sent.fy - 2.0).abs() < f64::EPSILON);
        assert!(sent.fx.abs() < f64::EPSILON);
        assert!(sent.fz.abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_zero_force_still_dispatched() -> TestResult {
        let mut actuator = ForceActuator::default();
        let mut session = RecordingSession::default();
        actuator.set_force(&mut session, ForceVector3::ZERO)?;
        actuator.set_force(&mut session, ForceVector3::ZERO)?;
        assert_eq!(session.commands.len(), 2);
        Ok(())
    }

    #[test]
    fn test_invalid_limit_rejected() {
        assert!(matches!(ForceActuator::new(0.0), Err(_)));
        assert!(matches!(ForceActuator::new(-1.0), Err(_)));
        assert!(matches!(ForceActuator::new(f64::NAN), Err(_)));
    }

    #[test]
    fn test_consecutive_failures_reset_on_success() {
        let mut actuator = ForceActuator::default();
        let mut session = RecordingSession::with_results([warm(), warm(), Ok(()), warm()]);

        for _ in 0..2 {
            assert!(matches!(actuator.set_force(&mut session, ForceVector3::ZERO), Err(_)));
        }
        assert_eq!(actuator.consecutive_failures(), 2);
        assert_eq!(actuator.current_rejection(), Some(RejectionCause::MotorsWarm));

        assert!(matches!(actuator.set_force(&mut session, ForceVector3::ZERO), Ok(_)));
        assert_eq!(actuator.consecutive_failures(), 0);
        assert!(!actuator.is_failing());

        assert!(matches!(actuator.set_force(&mut session, ForceVector3::ZERO), Err(_)));
        assert_eq!(actuator.consecutive_failures(), 1);
    }

    #[test]
    #[traced_test]
    fn test_same_cause_logged_once() {
        let mut actuator = ForceActuator::default();
        let mut session = RecordingSession::with_results([
            warm(),
            warm(),
            warm(),
            Err(DeviceError::rejected(RejectionCause::SessionStopped)),
            Err(DeviceError::rejected(RejectionCause::SessionStopped)),
        ]);

        // Remaining commands are accepted by default.
        for _ in 0..(5 + RECOVERY_ACCEPTS) {
            let _sent = actuator.set_force(&mut session, ForceVector3::ZERO);
        }

        assert_eq!(actuator.failure_reports(), 2);
        logs_assert(|lines: &[&str]| {
            let warm = lines.iter().filter(|l| l.contains("motors warm")).count();
            let stopped = lines.iter().filter(|l| l.contains("session stopped")).count();
            let recovered = lines
                .iter()
                .filter(|l| l.contains("force commands accepted again"))
                .count();
            if (warm, stopped, recovered) == (1, 1, 1) {
                Ok(())
            } else {
                Err(format!("warm={warm} stopped={stopped} recovered={recovered}"))
            }
        });
    }

    #[test]
    #[traced_test]
    fn test_intermittent_rejections_logged_once() {
        let mut actuator = ForceActuator::default();
        let mut session = RecordingSession::with_results(
            (0..100).map(|i| if i % 2 == 0 { warm() } else { Ok(()) }),
        );

        for _ in 0..100 {
            let _sent = actuator.set_force(&mut session, ForceVector3::ZERO);
        }

        assert_eq!(actuator.failure_reports(), 1);
        assert!(!actuator.is_failing());
        logs_assert(|lines: &[&str]| {
            let warm = lines.iter().filter(|l| l.contains("motors warm")).count();
            let recovered = lines
                .iter()
                .filter(|l| l.contains("force commands accepted again"))
                .count();
            if (warm, recovered) == (1, 0) {
                Ok(())
            } else {
                Err(format!("warm={warm} recovered={recovered}"))
            }
        });
    }

    #[test]
    fn test_cause_reported_again_after_sustained_recovery() {
        let mut actuator = ForceActuator::default();
        let mut session = RecordingSession::with_results(
            std::iter::once(warm())
                .chain((0..RECOVERY_ACCEPTS).map(|_| Ok(())))
                .chain(std::iter::once(warm())),
        );

        for _ in 0..(RECOVERY_ACCEPTS + 1) {
            let _sent = actuator.set_force(&mut session, ForceVector3::ZERO);
        }
        assert_eq!(actuator.failure_reports(), 1);

        assert!(matches!(actuator.set_force(&mut session, ForceVector3::ZERO), Err(_)));
        assert_eq!(actuator.failure_reports(), 2);
    }
}
