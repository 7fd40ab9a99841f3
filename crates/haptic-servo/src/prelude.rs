//! Prelude module for common servo types
//!
//! ```rust
//! use haptic_servo::prelude::*;
//!
//! let state = SurfaceModel::default().evaluate(&Pose3::new(0.0, -3.0, 0.0));
//! assert!(state.in_contact);
//! ```

// Value types
pub use crate::types::{
    Axis, ContactState, DeviceStatus, EdgeEvent, ForceVector3, Pose3, Sample, SignalId,
};

// Loop and its parts
pub use crate::actuator::ForceActuator;
pub use crate::cancel::CancellationToken;
pub use crate::control_loop::{ControlLoop, ExitReason, LoopState, RunReport};
pub use crate::edge::{EdgeReporter, EdgeTracker};
pub use crate::source::SampleSource;
pub use crate::surface::{SurfaceConfig, SurfaceModel};

// Ports
pub use crate::ports::{
    DeviceSession, DisplayFrame, DisplaySink, NoopObserver, ProcessedSample, ServoObserver,
};

// Configuration, display and the virtual device
pub use crate::config::ServoConfig;
pub use crate::display::{DisplayConfig, DisplayWorker};
pub use crate::virtual_device::{VirtualDeviceConfig, VirtualSession};

// Errors
pub use haptic_errors::{DeviceError, DisplayError, RejectionCause, ServoError};
