//! Mock implementations for testing.
//!
//! [`ScriptedSession`] plays back a fixed list of samples, one per loop
//! iteration, and records every call it receives in a shared
//! [`SessionProbe`]. The probe stays readable after the session has been
//! moved into a control loop or another thread.

use std::collections::VecDeque;
use std::sync::Arc;

use haptic_errors::{DeviceError, DeviceResult, DisplayError, RejectionCause};
use haptic_servo::{
    CancellationToken, DeviceSession, DisplayFrame, DisplaySink, EdgeEvent, ForceVector3, Pose3,
    ProcessedSample, Sample, ServoObserver, SignalId,
};
use parking_lot::Mutex;

/// A sample with the given sequence, pose and button mask.
pub fn sample_at(sequence: u64, pose: Pose3, buttons: u32) -> Sample {
    Sample {
        pose,
        buttons,
        sequence,
        ..Sample::default()
    }
}

/// A lifecycle or command call seen by a [`ScriptedSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCall {
    /// `init()`
    Init,
    /// `start()`
    Start,
    /// `stop()`
    Stop,
    /// `command_force()`
    Command,
}

#[derive(Debug, Default)]
struct ProbeState {
    calls: Vec<SessionCall>,
    commands: Vec<ForceVector3>,
    sequence_reads: u64,
    polls: u64,
}

/// Shared record of the calls a [`ScriptedSession`] received.
#[derive(Debug, Clone, Default)]
pub struct SessionProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl SessionProbe {
    fn record(&self, call: SessionCall) {
        self.state.lock().calls.push(call);
    }

    /// How many times `call` was made.
    pub fn count(&self, call: SessionCall) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == call).count()
    }

    /// Lifecycle calls in order, without force commands.
    pub fn lifecycle(&self) -> Vec<SessionCall> {
        self.state
            .lock()
            .calls
            .iter()
            .copied()
            .filter(|c| *c != SessionCall::Command)
            .collect()
    }

    /// Every force passed to `command_force`, accepted or not.
    pub fn commands(&self) -> Vec<ForceVector3> {
        self.state.lock().commands.clone()
    }

    /// Number of `sample_sequence` calls.
    pub fn sequence_reads(&self) -> u64 {
        self.state.lock().sequence_reads
    }

    /// Number of `poll_sample` calls.
    pub fn polls(&self) -> u64 {
        self.state.lock().polls
    }
}

#[derive(Debug)]
struct Playback {
    script: VecDeque<Sample>,
    current: Sample,
}

/// A [`DeviceSession`] that plays back scripted samples.
///
/// Each `sample_sequence` call advances to the next scripted sample, so a
/// control loop sees exactly one script entry per iteration. Once the script
/// is used up the sample stays on the last entry; if a cancellation token was
/// attached, it is cancelled on the first read past the end.
#[derive(Debug)]
pub struct ScriptedSession {
    playback: Mutex<Playback>,
    probe: SessionProbe,
    cancel_when_exhausted: Option<CancellationToken>,
    init_result: DeviceResult,
    start_result: DeviceResult,
    stop_result: DeviceResult,
    command_results: VecDeque<DeviceResult>,
    default_command_result: DeviceResult,
}

impl ScriptedSession {
    /// Session that will play back `samples` in order.
    pub fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            playback: Mutex::new(Playback {
                script: samples.into_iter().collect(),
                current: Sample::default(),
            }),
            probe: SessionProbe::default(),
            cancel_when_exhausted: None,
            init_result: Ok(()),
            start_result: Ok(()),
            stop_result: Ok(()),
            command_results: VecDeque::new(),
            default_command_result: Ok(()),
        }
    }

    /// Session whose sample never changes from the initial, sequence `0` one.
    pub fn idle() -> Self {
        Self::new([])
    }

    /// Cancel `token` once the script has been played back.
    #[must_use]
    pub fn cancel_when_exhausted(mut self, token: &CancellationToken) -> Self {
        self.cancel_when_exhausted = Some(token.clone());
        self
    }

    /// Make `init()` fail with `err`.
    #[must_use]
    pub fn fail_init(mut self, err: DeviceError) -> Self {
        self.init_result = Err(err);
        self
    }

    /// Make `start()` fail with `err`.
    #[must_use]
    pub fn fail_start(mut self, err: DeviceError) -> Self {
        self.start_result = Err(err);
        self
    }

    /// Make `stop()` fail with `err`.
    #[must_use]
    pub fn fail_stop(mut self, err: DeviceError) -> Self {
        self.stop_result = Err(err);
        self
    }

    /// Results for the next force commands, in order.
    #[must_use]
    pub fn command_results(mut self, results: impl IntoIterator<Item = DeviceResult>) -> Self {
        self.command_results.extend(results);
        self
    }

    /// Reject every command not covered by [`command_results`](Self::command_results).
    #[must_use]
    pub fn reject_all(mut self, cause: RejectionCause) -> Self {
        self.default_command_result = Err(DeviceError::rejected(cause));
        self
    }

    /// Handle for inspecting calls after the session has been moved.
    pub fn probe(&self) -> SessionProbe {
        self.probe.clone()
    }
}

impl DeviceSession for ScriptedSession {
    fn init(&mut self) -> DeviceResult {
        self.probe.record(SessionCall::Init);
        self.init_result.clone()
    }

    fn start(&mut self) -> DeviceResult {
        self.probe.record(SessionCall::Start);
        self.start_result.clone()
    }

    fn stop(&mut self) -> DeviceResult {
        self.probe.record(SessionCall::Stop);
        self.stop_result.clone()
    }

    fn poll_sample(&self) -> Sample {
        self.probe.state.lock().polls += 1;
        self.playback.lock().current
    }

    fn sample_sequence(&self) -> u64 {
        self.probe.state.lock().sequence_reads += 1;

        let mut playback = self.playback.lock();
        match playback.script.pop_front() {
            Some(next) => playback.current = next,
            None => {
                if let Some(token) = &self.cancel_when_exhausted {
                    token.cancel();
                }
            }
        }
        playback.current.sequence
    }

    fn command_force(&mut self, force: ForceVector3) -> DeviceResult {
        {
            let mut state = self.probe.state.lock();
            state.calls.push(SessionCall::Command);
            state.commands.push(force);
        }
        self.command_results
            .pop_front()
            .unwrap_or_else(|| self.default_command_result.clone())
    }
}

/// A [`DisplaySink`] that keeps every frame it is given.
///
/// Clones share the same frame list.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<DisplayFrame>>>,
    fail_with: Option<DisplayError>,
}

impl RecordingSink {
    /// A sink that accepts every frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that records every frame and then reports `err`.
    pub fn failing(err: DisplayError) -> Self {
        Self {
            frames: Arc::default(),
            fail_with: Some(err),
        }
    }

    /// Frames received so far.
    pub fn frames(&self) -> Vec<DisplayFrame> {
        self.frames.lock().clone()
    }
}

impl DisplaySink for RecordingSink {
    fn update(&mut self, frame: DisplayFrame) -> Result<(), DisplayError> {
        self.frames.lock().push(frame);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// A [`ServoObserver`] that keeps everything it sees.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// Processed samples in order
    pub processed: Vec<ProcessedSample>,
    /// Edge events with the sequence of the sample that caused them
    pub edges: Vec<(EdgeEvent, u64)>,
}

impl RecordingObserver {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequences of processed samples.
    pub fn sequences(&self) -> Vec<u64> {
        self.processed.iter().map(|p| p.sample.sequence).collect()
    }

    /// Edge events for `signal`, as `(value, sequence)`.
    pub fn edges_for(&self, signal: SignalId) -> Vec<(bool, u64)> {
        self.edges
            .iter()
            .filter(|(event, _)| event.signal == signal)
            .map(|(event, sequence)| (event.value, *sequence))
            .collect()
    }

    /// Forces that reached the device, one per processed sample that was accepted.
    pub fn commanded(&self) -> Vec<ForceVector3> {
        self.processed.iter().filter_map(|p| p.commanded).collect()
    }
}

impl ServoObserver for RecordingObserver {
    fn on_sample(&mut self, processed: &ProcessedSample) {
        self.processed.push(*processed);
    }

    fn on_edge(&mut self, event: &EdgeEvent, sample: &Sample) {
        self.edges.push((*event, sample.sequence));
    }
}
