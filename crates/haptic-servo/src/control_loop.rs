//! The servo loop.
//!
//! One control thread polls the device for new samples, evaluates the
//! surface, commands the restoring force, reports transitions and hands a
//! frame to the display. When no new sample is available it waits one
//! throttle interval on the cancellation token.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --init+start ok--> Running --cancel | fatal | breaker--> Stopping --stop()--> Stopped
//!   |                                                                                  ^
//!   +----------------------------- init/start failed ----------------------------------+
//! ```
//!
//! `stop()` is called exactly once for every run that reached `Running`, and
//! never for a run that did not. A stopped loop cannot be restarted.

use std::sync::Arc;
use std::time::Duration;

use haptic_atomic::{CounterSnapshot, LatestMailbox, LoopCounters};
use haptic_errors::{DeviceError, ServoError};
use tracing::{debug, error, info, warn};

use crate::actuator::ForceActuator;
use crate::cancel::CancellationToken;
use crate::config::ServoConfig;
use crate::edge::EdgeTracker;
use crate::ports::{DeviceSession, DisplayFrame, ProcessedSample, ServoObserver};
use crate::source::SampleSource;
use crate::surface::SurfaceModel;
use crate::types::{DeviceStatus, EdgeEvent, Sample};

/// Loop lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// Constructed, device untouched
    Idle,
    /// Servoing
    Running,
    /// Releasing the device
    Stopping,
    /// Finished; terminal
    Stopped,
}

impl LoopState {
    /// Lowercase state name.
    pub fn as_str(self) -> &'static str {
        match self {
            LoopState::Idle => "idle",
            LoopState::Running => "running",
            LoopState::Stopping => "stopping",
            LoopState::Stopped => "stopped",
        }
    }
}

/// Why a run that reached `Running` ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    /// The cancellation token was cancelled
    Cancelled,
}

/// Outcome of a run that ended by cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Why the loop ended
    pub exit: ExitReason,
    /// Counters at the end of the run
    pub counters: CounterSnapshot,
    /// Sequence of the last processed sample, `0` if none
    pub last_sequence: u64,
    /// Error returned by the single `stop()` call, if any
    pub stop_error: Option<DeviceError>,
}

impl RunReport {
    /// Samples processed during the run.
    pub fn processed_samples(&self) -> u64 {
        self.counters.processed_samples
    }

    /// Polls that found no new sample.
    pub fn idle_polls(&self) -> u64 {
        self.counters.idle_polls
    }

    /// Force commands the device rejected.
    pub fn rejected_commands(&self) -> u64 {
        self.counters.command_rejections
    }

    /// Whether the device was released cleanly.
    pub fn stopped_cleanly(&self) -> bool {
        self.stop_error.is_none()
    }
}

/// Polling servo loop over one device session.
#[derive(Debug)]
pub struct ControlLoop<S: DeviceSession> {
    config: ServoConfig,
    state: LoopState,
    source: SampleSource<S>,
    surface: SurfaceModel,
    actuator: ForceActuator,
    edges: EdgeTracker,
    edge_buffer: Vec<EdgeEvent>,
    display: Option<Arc<LatestMailbox<DisplayFrame>>>,
    counters: Arc<LoopCounters>,
    throttle: Duration,
    last_processed: u64,
}

impl<S: DeviceSession> ControlLoop<S> {
    /// A loop over `session` with a validated `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::Validation`] if `config` is invalid.
    pub fn new(session: S, config: ServoConfig) -> Result<Self, ServoError> {
        config.validate()?;
        let surface = SurfaceModel::new(config.surface)?;
        let actuator = ForceActuator::new(config.max_force_n)?;
        let edges = EdgeTracker::new(config.button_count);
        let edge_buffer = Vec::with_capacity(edges.max_events());
        let throttle = config.throttle_interval();

        Ok(Self {
            config,
            state: LoopState::Idle,
            source: SampleSource::new(session),
            surface,
            actuator,
            edges,
            edge_buffer,
            display: None,
            counters: Arc::new(LoopCounters::new()),
            throttle,
            last_processed: 0,
        })
    }

    /// Publish a display frame for every processed sample into `mailbox`.
    #[must_use]
    pub fn with_display(mut self, mailbox: Arc<LatestMailbox<DisplayFrame>>) -> Self {
        self.display = Some(mailbox);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The loop configuration.
    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    /// Shared counters, readable from other threads while running.
    pub fn counters(&self) -> Arc<LoopCounters> {
        Arc::clone(&self.counters)
    }

    /// The device session.
    pub fn session(&self) -> &S {
        self.source.session()
    }

    /// Give the device session back.
    pub fn into_session(self) -> S {
        self.source.into_inner()
    }

    /// Run until `cancel` fires or a fatal error occurs.
    ///
    /// # Errors
    ///
    /// - [`ServoError::InvalidState`] if the loop has already run
    /// - [`ServoError::Device`] if `init()` or `start()` failed; `stop()` was not called
    /// - [`ServoError::Aborted`] if a fatal error ended a running loop; it
    ///   carries the outcome of the `stop()` call
    pub fn run<O>(&mut self, cancel: &CancellationToken, observer: &mut O) -> Result<RunReport, ServoError>
    where
        O: ServoObserver + ?Sized,
    {
        if self.state != LoopState::Idle {
            return Err(ServoError::InvalidState {
                expected: LoopState::Idle.as_str(),
                actual: self.state.as_str(),
            });
        }

        if let Err(err) = self.bring_up() {
            error!(error = %err, "device bring-up failed");
            self.state = LoopState::Stopped;
            return Err(err.into());
        }

        self.source.arm();
        self.state = LoopState::Running;
        info!(
            throttle_ms = self.config.throttle_interval_ms,
            axis = %self.config.surface.axis,
            plane_offset_mm = self.config.surface.plane_offset_mm,
            stiffness = self.config.surface.stiffness_n_per_mm,
            "servo loop running"
        );

        let outcome = self.servo(cancel, observer);

        self.state = LoopState::Stopping;
        self.source.disarm();
        let stop_error = self.source.session_mut().stop().err();
        if let Some(err) = &stop_error {
            warn!(error = %err, "device did not stop cleanly");
        }
        self.state = LoopState::Stopped;

        let counters = self.counters.snapshot();
        info!(
            processed = counters.processed_samples,
            idle_polls = counters.idle_polls,
            rejected = counters.command_rejections,
            last_sequence = self.last_processed,
            "servo loop stopped"
        );

        match outcome {
            Ok(exit) => Ok(RunReport {
                exit,
                counters,
                last_sequence: self.last_processed,
                stop_error,
            }),
            Err(err) => {
                error!(error = %err, "servo loop aborted");
                Err(ServoError::aborted(err, stop_error))
            }
        }
    }

    fn bring_up(&mut self) -> Result<(), DeviceError> {
        let session = self.source.session_mut();
        session.init()?;
        debug!("device initialized");
        session.start()?;
        debug!("device started");
        Ok(())
    }

    fn servo<O>(&mut self, cancel: &CancellationToken, observer: &mut O) -> Result<ExitReason, ServoError>
    where
        O: ServoObserver + ?Sized,
    {
        loop {
            if cancel.is_cancelled() {
                return Ok(ExitReason::Cancelled);
            }

            let sample = if self.source.has_new_sample(self.last_processed)? {
                self.source.poll()?
            } else {
                Sample::default()
            };

            if !sample.is_newer_than(self.last_processed) {
                self.counters.inc_idle_poll();
                if cancel.wait_timeout(self.throttle) {
                    return Ok(ExitReason::Cancelled);
                }
                continue;
            }

            self.process(sample, observer)?;
        }
    }

    fn process<O>(&mut self, sample: Sample, observer: &mut O) -> Result<(), ServoError>
    where
        O: ServoObserver + ?Sized,
    {
        let contact = self.surface.evaluate(&sample.pose);

        let commanded = match self.actuator.set_force(self.source.session_mut(), contact.force) {
            Ok(applied) => {
                self.counters.record_force_command(true);
                Some(applied)
            }
            Err(err) => {
                self.counters.record_force_command(false);
                if err.is_fatal() {
                    return Err(err.into());
                }
                let failures = self.actuator.consecutive_failures();
                if self
                    .config
                    .max_consecutive_command_failures
                    .is_some_and(|limit| failures >= limit)
                {
                    return Err(ServoError::CircuitOpen {
                        failures,
                        last_error: err,
                    });
                }
                None
            }
        };

        self.report_status(sample.status);

        self.edge_buffer.clear();
        let emitted = self.edges.observe(&sample, &contact, &mut self.edge_buffer);
        self.counters.add_edge_events(emitted as u64);
        for event in &self.edge_buffer {
            debug!(signal = %event.signal, value = event.value, sequence = sample.sequence, "edge");
            observer.on_edge(event, &sample);
        }

        let processed = ProcessedSample {
            sample,
            contact,
            commanded,
        };
        observer.on_sample(&processed);

        if let Some(mailbox) = &self.display {
            let overwrote = mailbox.publish(processed.display_frame());
            self.counters.record_display_publish(overwrote);
        }

        self.last_processed = sample.sequence;
        self.counters.inc_processed();
        Ok(())
    }

    fn report_status(&mut self, status: DeviceStatus) {
        match self.edges.observe_status(status) {
            Some(DeviceStatus::Ok) if self.counters.processed_samples() > 0 => {
                info!("device status back to ok");
            }
            Some(DeviceStatus::Ok) | None => {}
            Some(other) => warn!(status = %other, "device reported a fault"),
        }
    }
}
