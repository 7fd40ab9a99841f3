//! Core value types exchanged between the device session and the loop.
//!
//! Positions are millimetres in the device workspace frame, forces are
//! newtons in the same frame. All types are `Copy` so they can be handed
//! across threads through a snapshot cell without allocation.

use core::fmt;

use serde::{Deserialize, Serialize};

/// One of the three workspace axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Left/right
    X,
    /// Up/down
    #[default]
    Y,
    /// Towards/away from the user
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Lowercase axis name.
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stylus position in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose3 {
    /// X coordinate (mm)
    pub x: f64,
    /// Y coordinate (mm)
    pub y: f64,
    /// Z coordinate (mm)
    pub z: f64,
}

impl Pose3 {
    /// The workspace origin.
    pub const ORIGIN: Pose3 = Pose3::new(0.0, 0.0, 0.0);

    /// Create a pose from its coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Coordinate along `axis`.
    #[inline]
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// True when every coordinate is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Force in newtons.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForceVector3 {
    /// Force along X (N)
    pub fx: f64,
    /// Force along Y (N)
    pub fy: f64,
    /// Force along Z (N)
    pub fz: f64,
}

impl ForceVector3 {
    /// No force on any axis.
    pub const ZERO: ForceVector3 = ForceVector3::new(0.0, 0.0, 0.0);

    /// Create a force from its components.
    pub const fn new(fx: f64, fy: f64, fz: f64) -> Self {
        Self { fx, fy, fz }
    }

    /// A force of `magnitude` newtons along the positive direction of `axis`.
    pub fn along(axis: Axis, magnitude: f64) -> Self {
        let mut force = Self::ZERO;
        *force.component_mut(axis) = magnitude;
        force
    }

    /// Component along `axis`.
    #[inline]
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.fx,
            Axis::Y => self.fy,
            Axis::Z => self.fz,
        }
    }

    fn component_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::X => &mut self.fx,
            Axis::Y => &mut self.fy,
            Axis::Z => &mut self.fz,
        }
    }

    /// Euclidean norm in newtons.
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Squared norm, used by the virtual device heat model.
    pub fn magnitude_squared(&self) -> f64 {
        self.fx * self.fx + self.fy * self.fy + self.fz * self.fz
    }

    /// True when every component is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.fx.is_finite() && self.fy.is_finite() && self.fz.is_finite()
    }

    /// True when every component is zero.
    pub fn is_zero(&self) -> bool {
        Axis::ALL
            .iter()
            .all(|&axis| self.get(axis).abs() < f64::MIN_POSITIVE)
    }

    /// Clamp each component to `[-limit, limit]`.
    ///
    /// Infinite components saturate at the limit with their sign kept.
    /// NaN components become zero.
    pub fn clamp_per_axis(&self, limit: f64) -> Self {
        let limit = if limit.is_nan() { 0.0 } else { limit.abs() };
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(-limit, limit) };
        Self::new(clamp(self.fx), clamp(self.fy), clamp(self.fz))
    }
}

/// Device-reported health attached to every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceStatus {
    /// No error reported
    #[default]
    Ok,
    /// Motors are too warm; force commands are refused until they cool
    MotorsWarm,
    /// Any other device-side error code
    Fault {
        /// Device error code
        code: i32,
        /// Vendor-internal error code
        internal_code: i32,
    },
}

impl DeviceStatus {
    /// True for [`DeviceStatus::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, DeviceStatus::Ok)
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Ok => f.write_str("ok"),
            DeviceStatus::MotorsWarm => f.write_str("motors warm"),
            DeviceStatus::Fault {
                code,
                internal_code,
            } => write!(f, "fault {code} (internal {internal_code})"),
        }
    }
}

/// One device readout.
///
/// `sequence` increases by at least one for every new readout; a sample
/// with a sequence the loop has already processed carries no new
/// information.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    /// Stylus position
    pub pose: Pose3,
    /// Button bitmask, bit `n` set while button `n` is held
    pub buttons: u32,
    /// Readout counter, `0` before the first readout
    pub sequence: u64,
    /// Force the device reports as currently rendered
    pub device_force: ForceVector3,
    /// Device-reported health
    pub status: DeviceStatus,
}

impl Sample {
    /// Maximum number of buttons a sample can carry.
    pub const MAX_BUTTONS: u8 = 32;

    /// Whether button `index` (zero-based) is held.
    pub fn button_pressed(&self, index: u8) -> bool {
        index < Self::MAX_BUTTONS && self.buttons & (1_u32 << index) != 0
    }

    /// Whether this sample is newer than `last_processed`.
    #[inline]
    pub fn is_newer_than(&self, last_processed: u64) -> bool {
        self.sequence > last_processed
    }
}

/// Result of evaluating a pose against the surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactState {
    /// Stylus is on or below the surface
    pub in_contact: bool,
    /// Signed depth below the surface (mm); negative while above it
    pub penetration_mm: f64,
    /// Restoring force to render
    pub force: ForceVector3,
}

impl ContactState {
    /// Out of contact, `separation_mm` above the surface.
    pub fn free(separation_mm: f64) -> Self {
        Self {
            in_contact: false,
            penetration_mm: -separation_mm,
            force: ForceVector3::ZERO,
        }
    }
}

/// A boolean signal whose transitions are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalId {
    /// Stylus contact with the surface
    Contact,
    /// Button by zero-based index
    Button(u8),
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalId::Contact => f.write_str("contact"),
            SignalId::Button(index) => write!(f, "button {}", u16::from(*index) + 1),
        }
    }
}

/// A transition of a [`SignalId`] to `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeEvent {
    /// Which signal changed
    pub signal: SignalId,
    /// The new value
    pub value: bool,
}
