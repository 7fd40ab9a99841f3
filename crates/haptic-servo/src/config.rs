//! Servo loop configuration.
//!
//! One YAML document configures the whole suite. Every field has a default,
//! so an empty document is a valid configuration:
//!
//! ```yaml
//! throttle_interval_ms: 10
//! max_force_n: 2.0
//! max_consecutive_command_failures: 500
//! button_count: 2
//! surface:
//!   axis: y
//!   plane_offset_mm: 0.0
//!   stiffness_n_per_mm: 0.1
//! display:
//!   refresh_interval_ms: 33
//! device:
//!   rate_hz: 1000
//! ```

use std::path::Path;
use std::time::Duration;

use haptic_errors::{ServoError, ValidationError};
use serde::{Deserialize, Serialize};

use crate::actuator::DEFAULT_MAX_FORCE_N;
use crate::display::DisplayConfig;
use crate::edge::DEFAULT_BUTTON_COUNT;
use crate::surface::SurfaceConfig;
use crate::types::Sample;
use crate::virtual_device::VirtualDeviceConfig;

/// Default wait between polls that found no new sample (ms).
pub const DEFAULT_THROTTLE_INTERVAL_MS: u64 = 10;

/// Default circuit breaker threshold.
pub const DEFAULT_MAX_CONSECUTIVE_COMMAND_FAILURES: u32 = 500;

/// Complete configuration of the servo loop and its collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    /// Virtual surface geometry
    pub surface: SurfaceConfig,
    /// Wait after a poll that found no new sample (ms)
    pub throttle_interval_ms: u64,
    /// Per-axis force limit (N)
    pub max_force_n: f64,
    /// Stop after this many consecutive failed force commands; `None` never stops
    pub max_consecutive_command_failures: Option<u32>,
    /// Number of stylus buttons to report
    pub button_count: u8,
    /// Display worker settings
    pub display: DisplayConfig,
    /// Virtual device settings
    pub device: VirtualDeviceConfig,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            throttle_interval_ms: DEFAULT_THROTTLE_INTERVAL_MS,
            max_force_n: DEFAULT_MAX_FORCE_N,
            max_consecutive_command_failures: Some(DEFAULT_MAX_CONSECUTIVE_COMMAND_FAILURES),
            button_count: DEFAULT_BUTTON_COUNT,
            display: DisplayConfig::default(),
            device: VirtualDeviceConfig::default(),
        }
    }
}

impl ServoConfig {
    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> ServoConfigBuilder {
        ServoConfigBuilder::default()
    }

    /// Validate the loop settings.
    ///
    /// The `device` section belongs to the virtual device and is checked by
    /// [`validate_all`](Self::validate_all) or when a virtual session is
    /// initialized, so a loop driving another session never depends on it.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.surface.validate()?;

        if !(1..=1000).contains(&self.throttle_interval_ms) {
            return Err(ValidationError::out_of_range(
                "throttle_interval_ms",
                self.throttle_interval_ms,
                1,
                1000,
            ));
        }

        let max_force_n = ValidationError::require_finite("max_force_n", self.max_force_n)?;
        if max_force_n <= 0.0 {
            return Err(ValidationError::not_positive("max_force_n"));
        }

        if self.max_consecutive_command_failures == Some(0) {
            return Err(ValidationError::not_positive("max_consecutive_command_failures"));
        }

        if self.button_count > Sample::MAX_BUTTONS {
            return Err(ValidationError::out_of_range(
                "button_count",
                self.button_count,
                0,
                Sample::MAX_BUTTONS,
            ));
        }

        self.display.validate()?;
        Ok(())
    }

    /// Validate the loop settings and the virtual device settings.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate_all(&self) -> Result<(), ValidationError> {
        self.validate()?;
        self.device.validate()
    }

    /// Throttle interval as a duration.
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }

    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::Config`] for malformed YAML and
    /// [`ServoError::Validation`] for invalid values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ServoError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| ServoError::config(format!("invalid servo config: {e}")))?;
        config.validate_all()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::Io`] if the file cannot be read, otherwise as
    /// [`from_yaml_str`](Self::from_yaml_str).
    pub fn load(path: &Path) -> Result<Self, ServoError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Render as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::Config`] if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, ServoError> {
        serde_yaml::to_string(self)
            .map_err(|e| ServoError::config(format!("cannot serialize servo config: {e}")))
    }
}

/// Builder for [`ServoConfig`].
#[derive(Debug, Default)]
pub struct ServoConfigBuilder {
    config: ServoConfig,
}

impl ServoConfigBuilder {
    /// Set the surface geometry.
    #[must_use]
    pub fn surface(mut self, surface: SurfaceConfig) -> Self {
        self.config.surface = surface;
        self
    }

    /// Set the throttle interval in milliseconds.
    #[must_use]
    pub fn throttle_interval_ms(mut self, ms: u64) -> Self {
        self.config.throttle_interval_ms = ms;
        self
    }

    /// Set the per-axis force limit in newtons.
    #[must_use]
    pub fn max_force_n(mut self, newtons: f64) -> Self {
        self.config.max_force_n = newtons;
        self
    }

    /// Set the circuit breaker threshold; `None` disables it.
    #[must_use]
    pub fn max_consecutive_command_failures(mut self, limit: Option<u32>) -> Self {
        self.config.max_consecutive_command_failures = limit;
        self
    }

    /// Set the number of reported buttons.
    #[must_use]
    pub fn button_count(mut self, count: u8) -> Self {
        self.config.button_count = count;
        self
    }

    /// Set the display worker settings.
    #[must_use]
    pub fn display(mut self, display: DisplayConfig) -> Self {
        self.config.display = display;
        self
    }

    /// Set the virtual device settings.
    #[must_use]
    pub fn device(mut self, device: VirtualDeviceConfig) -> Self {
        self.config.device = device;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<ServoConfig, ValidationError> {
        self.config.validate_all()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Axis;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_defaults_are_valid() -> TestResult {
        let config = ServoConfig::default();
        config.validate()?;
        assert_eq!(config.throttle_interval(), Duration::from_millis(10));
        assert_eq!(config.max_consecutive_command_failures, Some(500));
        assert_eq!(config.button_count, 2);
        Ok(())
    }

    #[test]
    fn test_empty_yaml_is_default() -> TestResult {
        assert_eq!(ServoConfig::from_yaml_str("{}")?, ServoConfig::default());
        Ok(())
    }

    #[test]
    fn test_partial_yaml_overrides() -> TestResult {
        let config = ServoConfig::from_yaml_str(
            "throttle_interval_ms: 2\nmax_consecutive_command_failures: null\nsurface:\n  axis: z\n  plane_offset_mm: -4.5\n",
        )?;
        assert_eq!(config.throttle_interval_ms, 2);
        assert_eq!(config.max_consecutive_command_failures, None);
        assert_eq!(config.surface.axis, Axis::Z);
        assert!((config.surface.plane_offset_mm + 4.5).abs() < f64::EPSILON);
        assert!((config.surface.stiffness_n_per_mm - 0.1).abs() < f64::EPSILON);
        Ok(())
    }

    #[test]
    fn test_negative_stiffness_rejected() {
        let result = ServoConfig::from_yaml_str("surface:\n  stiffness_n_per_mm: -1.0\n");
        assert!(matches!(result, Err(ServoError::Validation(_))));
    }

    #[test]
    fn test_device_settings_checked_separately() {
        let config = ServoConfig {
            device: VirtualDeviceConfig {
                rate_hz: 0,
                ..VirtualDeviceConfig::default()
            },
            ..ServoConfig::default()
        };
        assert!(matches!(config.validate(), Ok(())));
        assert!(matches!(config.validate_all(), Err(_)));
        assert!(matches!(
            ServoConfig::from_yaml_str("device:\n  rate_hz: 0\n"),
            Err(ServoError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let result = ServoConfig::from_yaml_str("throttle_interval_ms: [fast]");
        assert!(matches!(result, Err(ServoError::Config(_))));
    }

    #[test]
    fn test_builder_validates() {
        assert!(matches!(ServoConfig::builder().throttle_interval_ms(0).build(), Err(_)));
        assert!(matches!(ServoConfig::builder().max_force_n(0.0).build(), Err(_)));
        assert!(matches!(
            ServoConfig::builder()
                .max_consecutive_command_failures(Some(0))
                .build(),
            Err(_)
        ));
        assert!(matches!(ServoConfig::builder().button_count(33).build(), Err(_)));
        assert!(matches!(
            ServoConfig::builder()
                .max_consecutive_command_failures(None)
                .throttle_interval_ms(1)
                .build(),
            Ok(_)
        ));
    }
}
