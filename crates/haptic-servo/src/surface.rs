//! Virtual surface contact model.
//!
//! The surface is a single half-space bounded by the plane
//! `pose[axis] == plane_offset_mm`. The free side is `pose[axis] > offset`;
//! reaching or crossing the plane is contact. Inside contact the model acts
//! as a linear spring pushing the stylus back out along `+axis`.
//!
//! Evaluation is a pure function of the pose and the configuration, so it
//! can run on the control thread without locks or allocation.

use haptic_errors::ValidationError;
use serde::{Deserialize, Serialize};

use crate::types::{Axis, ContactState, ForceVector3, Pose3};

/// Default spring constant (N/mm).
pub const DEFAULT_STIFFNESS_N_PER_MM: f64 = 0.1;

/// Geometry and stiffness of the virtual surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Axis normal to the plane
    pub axis: Axis,
    /// Plane position along `axis` (mm)
    pub plane_offset_mm: f64,
    /// Spring constant (N/mm), never negative
    pub stiffness_n_per_mm: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Y,
            plane_offset_mm: 0.0,
            stiffness_n_per_mm: DEFAULT_STIFFNESS_N_PER_MM,
        }
    }
}

impl SurfaceConfig {
    /// Plane normal to `axis` at `plane_offset_mm` with the given stiffness.
    pub fn new(
        axis: Axis,
        plane_offset_mm: f64,
        stiffness_n_per_mm: f64,
    ) -> Result<Self, ValidationError> {
        let config = Self {
            axis,
            plane_offset_mm,
            stiffness_n_per_mm,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that offset and stiffness are finite and stiffness is not negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::require_finite("surface.plane_offset_mm", self.plane_offset_mm)?;
        ValidationError::require_finite("surface.stiffness_n_per_mm", self.stiffness_n_per_mm)?;
        ValidationError::require_non_negative("surface.stiffness_n_per_mm", self.stiffness_n_per_mm)?;
        Ok(())
    }
}

/// Evaluate `pose` against the surface described by `config`.
///
/// Assumes a validated `config`. A pose with a non-finite coordinate on the
/// plane axis is reported as out of contact with zero force.
pub fn evaluate(pose: &Pose3, config: &SurfaceConfig) -> ContactState {
    let penetration = config.plane_offset_mm - pose.get(config.axis);

    if !penetration.is_finite() {
        return ContactState::free(0.0);
    }
    if penetration < 0.0 {
        return ContactState::free(-penetration);
    }

    ContactState {
        in_contact: true,
        penetration_mm: penetration,
        force: ForceVector3::along(config.axis, config.stiffness_n_per_mm * penetration),
    }
}

/// A validated surface, evaluated once per processed sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceModel {
    config: SurfaceConfig,
}

impl SurfaceModel {
    /// Build a model from `config`, rejecting invalid geometry.
    pub fn new(config: SurfaceConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Contact state for `pose`.
    #[inline]
    pub fn evaluate(&self, pose: &Pose3) -> ContactState {
        evaluate(pose, &self.config)
    }

    /// The surface configuration.
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }
}

impl Default for SurfaceModel {
    fn default() -> Self {
        Self {
            config: SurfaceConfig::default(),
        }
    }
}
