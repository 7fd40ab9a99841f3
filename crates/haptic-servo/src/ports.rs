//! Port traits at the boundaries of the servo loop.
//!
//! The loop owns neither the device driver nor any visualization. It talks
//! to them through these traits so hardware sessions, the virtual session
//! and test doubles are interchangeable.

use haptic_errors::{DeviceResult, DisplayError};

use crate::types::{ContactState, EdgeEvent, ForceVector3, Pose3, Sample};

/// Lifecycle and I/O of one haptic device.
///
/// The session runs its own acquisition context (a vendor scheduler or a
/// thread) that keeps the latest sample current. The servo loop polls it
/// from a single control thread.
///
/// # Contract
///
/// - `init` then `start` must both succeed before samples are meaningful
/// - `poll_sample` and `sample_sequence` never block and never fail
/// - `sample_sequence` never decreases
/// - `command_force` may reject a command without ending the session; a
///   [`DeviceError::Disconnected`](haptic_errors::DeviceError::Disconnected)
///   means the session is gone
pub trait DeviceSession: Send {
    /// Open and configure the device.
    fn init(&mut self) -> DeviceResult;

    /// Start the acquisition context.
    fn start(&mut self) -> DeviceResult;

    /// Stop acquisition and release the device.
    fn stop(&mut self) -> DeviceResult;

    /// Copy of the latest sample.
    fn poll_sample(&self) -> Sample;

    /// Sequence number of the latest sample.
    fn sample_sequence(&self) -> u64;

    /// Ask the device to render `force`.
    fn command_force(&mut self, force: ForceVector3) -> DeviceResult;
}

impl<S: DeviceSession + ?Sized> DeviceSession for Box<S> {
    fn init(&mut self) -> DeviceResult {
        (**self).init()
    }

    fn start(&mut self) -> DeviceResult {
        (**self).start()
    }

    fn stop(&mut self) -> DeviceResult {
        (**self).stop()
    }

    fn poll_sample(&self) -> Sample {
        (**self).poll_sample()
    }

    fn sample_sequence(&self) -> u64 {
        (**self).sample_sequence()
    }

    fn command_force(&mut self, force: ForceVector3) -> DeviceResult {
        (**self).command_force(force)
    }
}

/// What the display needs from one processed sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayFrame {
    /// Stylus position
    pub pose: Pose3,
    /// Whether the stylus touches the surface
    pub in_contact: bool,
    /// Sequence of the sample this frame came from
    pub sequence: u64,
}

/// Best-effort consumer of display frames.
///
/// Called from the display worker, never from the control thread. Errors
/// are logged and the next frame is attempted anyway.
pub trait DisplaySink: Send {
    /// Show `frame`.
    fn update(&mut self, frame: DisplayFrame) -> Result<(), DisplayError>;
}

impl<D: DisplaySink + ?Sized> DisplaySink for Box<D> {
    fn update(&mut self, frame: DisplayFrame) -> Result<(), DisplayError> {
        (**self).update(frame)
    }
}

/// Everything the loop derived from one new sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessedSample {
    /// The sample as read
    pub sample: Sample,
    /// Surface evaluation of the sample pose
    pub contact: ContactState,
    /// Force forwarded to the device, or `None` if the command was rejected
    pub commanded: Option<ForceVector3>,
}

impl ProcessedSample {
    /// The display frame for this sample.
    pub fn display_frame(&self) -> DisplayFrame {
        DisplayFrame {
            pose: self.sample.pose,
            in_contact: self.contact.in_contact,
            sequence: self.sample.sequence,
        }
    }
}

/// Synchronous hooks called on the control thread.
///
/// Implementations must return quickly; anything slow belongs behind a
/// [`DisplaySink`].
pub trait ServoObserver {
    /// A sample was processed.
    fn on_sample(&mut self, _processed: &ProcessedSample) {}

    /// A signal changed; called before `on_sample` for the same sample.
    fn on_edge(&mut self, _event: &EdgeEvent, _sample: &Sample) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ServoObserver for NoopObserver {}

impl<O: ServoObserver + ?Sized> ServoObserver for &mut O {
    fn on_sample(&mut self, processed: &ProcessedSample) {
        (**self).on_sample(processed);
    }

    fn on_edge(&mut self, event: &EdgeEvent, sample: &Sample) {
        (**self).on_edge(event, sample);
    }
}
