//! Haptic Servo - polling control loop for a 3-DOF force-feedback stylus
//!
//! Reads pose/button samples from a device session, renders a virtual plane
//! as a linear spring, commands the restoring force and reports state
//! transitions. Display output is decoupled from the control rate through a
//! latest-value mailbox.
//!
//! # Example
//!
//! ```rust,no_run
//! use haptic_servo::prelude::*;
//!
//! # fn main() -> Result<(), ServoError> {
//! let config = ServoConfig::default();
//! let session = VirtualSession::new(config.device);
//! let mut servo = ControlLoop::new(session, config)?;
//!
//! let cancel = CancellationToken::new();
//! let report = servo.run(&cancel, &mut NoopObserver)?;
//! println!("processed {} samples", report.processed_samples());
//! # Ok(())
//! # }
//! ```

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod actuator;
pub mod cancel;
pub mod config;
pub mod control_loop;
pub mod display;
pub mod edge;
pub mod ports;
pub mod prelude;
pub mod source;
pub mod surface;
pub mod types;
pub mod virtual_device;

pub use actuator::ForceActuator;
pub use cancel::CancellationToken;
pub use config::{ServoConfig, ServoConfigBuilder};
pub use control_loop::{ControlLoop, ExitReason, LoopState, RunReport};
pub use display::{DisplayConfig, DisplayStats, DisplayWorker};
pub use edge::{EdgeReporter, EdgeTracker};
pub use ports::{
    DeviceSession, DisplayFrame, DisplaySink, NoopObserver, ProcessedSample, ServoObserver,
};
pub use source::SampleSource;
pub use surface::{SurfaceConfig, SurfaceModel};
pub use types::{
    Axis, ContactState, DeviceStatus, EdgeEvent, ForceVector3, Pose3, Sample, SignalId,
};
pub use virtual_device::{VirtualDeviceConfig, VirtualDeviceHandle, VirtualSession};
