//! Simulated haptic device.
//!
//! [`VirtualSession`] stands in for a vendor driver. Once started, it runs
//! an acquisition thread at `rate_hz` that moves the stylus along a scripted
//! trajectory, presses buttons on a fixed pattern, echoes the last accepted
//! force into each sample and models motor heating. Samples and forces
//! cross threads through [`SnapshotCell`]s so coordinates are never torn.

use std::f64::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use haptic_atomic::SnapshotCell;
use haptic_errors::{DeviceError, DeviceResult, RejectionCause, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ports::DeviceSession;
use crate::types::{DeviceStatus, ForceVector3, Pose3, Sample};

/// Virtual device settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualDeviceConfig {
    /// Acquisition rate (Hz)
    pub rate_hz: u32,
    /// Centre of the vertical sweep (mm)
    pub sweep_center_mm: f64,
    /// Half-height of the vertical sweep (mm)
    pub sweep_amplitude_mm: f64,
    /// Duration of one vertical sweep (ms)
    pub sweep_period_ms: u64,
    /// Radius of the horizontal circle traced while sweeping (mm)
    pub lateral_radius_mm: f64,
    /// Duration of one button pattern cycle (ms)
    pub button_period_ms: u64,
    /// Heat at which the motors are reported warm (N²·s)
    pub heat_limit: f64,
    /// Time constant of passive cooling (ms)
    pub cooling_time_constant_ms: u64,
}

impl Default for VirtualDeviceConfig {
    fn default() -> Self {
        Self {
            rate_hz: 1000,
            sweep_center_mm: 5.0,
            sweep_amplitude_mm: 15.0,
            sweep_period_ms: 4000,
            lateral_radius_mm: 10.0,
            button_period_ms: 3000,
            heat_limit: 15.0,
            cooling_time_constant_ms: 5000,
        }
    }
}

impl VirtualDeviceConfig {
    /// Check rates, periods and geometry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=10_000).contains(&self.rate_hz) {
            return Err(ValidationError::out_of_range(
                "device.rate_hz",
                self.rate_hz,
                1,
                10_000,
            ));
        }
        ValidationError::require_finite("device.sweep_center_mm", self.sweep_center_mm)?;
        ValidationError::require_non_negative("device.sweep_amplitude_mm", self.sweep_amplitude_mm)?;
        ValidationError::require_non_negative("device.lateral_radius_mm", self.lateral_radius_mm)?;
        if self.sweep_period_ms == 0 {
            return Err(ValidationError::not_positive("device.sweep_period_ms"));
        }
        if self.button_period_ms == 0 {
            return Err(ValidationError::not_positive("device.button_period_ms"));
        }
        let heat_limit = ValidationError::require_finite("device.heat_limit", self.heat_limit)?;
        if heat_limit <= 0.0 {
            return Err(ValidationError::not_positive("device.heat_limit"));
        }
        if self.cooling_time_constant_ms == 0 {
            return Err(ValidationError::not_positive("device.cooling_time_constant_ms"));
        }
        Ok(())
    }

    /// Acquisition period.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.rate_hz.max(1)))
    }

    /// Scripted stylus position `elapsed` after start.
    pub fn pose_at(&self, elapsed: Duration) -> Pose3 {
        let t = elapsed.as_secs_f64();
        let phase = TAU * t / period_secs(self.sweep_period_ms);
        Pose3::new(
            self.lateral_radius_mm * phase.cos(),
            self.sweep_center_mm + self.sweep_amplitude_mm * phase.sin(),
            self.lateral_radius_mm * phase.sin(),
        )
    }

    /// Scripted button mask `elapsed` after start.
    ///
    /// Button 1 is held for the 10-30% slice of each cycle, button 2 for the
    /// 20-60% slice, so both orders of press and release occur.
    pub fn buttons_at(&self, elapsed: Duration) -> u32 {
        let cycle = period_secs(self.button_period_ms);
        let phase = (elapsed.as_secs_f64() % cycle) / cycle;
        let mut mask = 0;
        if (0.1..0.3).contains(&phase) {
            mask |= 0b01;
        }
        if (0.2..0.6).contains(&phase) {
            mask |= 0b10;
        }
        mask
    }
}

fn period_secs(ms: u64) -> f64 {
    Duration::from_millis(ms.max(1)).as_secs_f64()
}

/// First-order motor heat model with hysteresis.
///
/// Heat rises with the square of the rendered force and decays
/// exponentially. Crossing `limit` marks the motors warm; they stay warm
/// until heat falls below half the limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorHeat {
    heat: f64,
    limit: f64,
    time_constant_s: f64,
    warm: bool,
}

impl MotorHeat {
    /// Cold motors with the given limit and cooling time constant.
    pub fn new(limit: f64, cooling_time_constant: Duration) -> Self {
        Self {
            heat: 0.0,
            limit,
            time_constant_s: cooling_time_constant.as_secs_f64().max(f64::EPSILON),
            warm: false,
        }
    }

    /// Advance by `dt` while rendering `force`; returns whether the motors are warm.
    pub fn step(&mut self, force: ForceVector3, dt: Duration) -> bool {
        let dt_s = dt.as_secs_f64();
        self.heat = self.heat * (-dt_s / self.time_constant_s).exp() + force.magnitude_squared() * dt_s;

        if !self.warm && self.heat > self.limit {
            self.warm = true;
        } else if self.warm && self.heat < self.limit / 2.0 {
            self.warm = false;
        }
        self.warm
    }

    /// Current heat (N²·s).
    pub fn heat(&self) -> f64 {
        self.heat
    }

    /// Whether the motors are warm.
    pub fn is_warm(&self) -> bool {
        self.warm
    }
}

#[derive(Debug)]
struct Shared {
    sample: SnapshotCell<Sample>,
    commanded: SnapshotCell<ForceVector3>,
    sequence: AtomicU64,
    running: AtomicBool,
    connected: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        Self {
            sample: SnapshotCell::new(Sample {
                pose: Pose3::ORIGIN,
                buttons: 0,
                sequence: 0,
                device_force: ForceVector3::ZERO,
                status: DeviceStatus::Ok,
            }),
            commanded: SnapshotCell::new(ForceVector3::ZERO),
            sequence: AtomicU64::new(0),
            running: AtomicBool::new(false),
            connected: AtomicBool::new(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Initialized,
    Running,
    Stopped,
}

/// Control handle for fault injection and inspection from another thread.
#[derive(Debug, Clone)]
pub struct VirtualDeviceHandle {
    shared: Arc<Shared>,
}

impl VirtualDeviceHandle {
    /// Simulate the device being unplugged.
    pub fn disconnect(&self) {
        self.shared.connected.store(false, Ordering::Release);
    }

    /// Whether the acquisition thread is producing samples.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Last force the session accepted.
    pub fn commanded_force(&self) -> ForceVector3 {
        self.shared.commanded.load()
    }

    /// Latest published sample.
    pub fn latest_sample(&self) -> Sample {
        self.shared.sample.load()
    }
}

/// A [`DeviceSession`] backed by a simulation thread.
#[derive(Debug)]
pub struct VirtualSession {
    config: VirtualDeviceConfig,
    shared: Arc<Shared>,
    phase: Phase,
    worker: Option<JoinHandle<()>>,
}

impl Default for VirtualSession {
    fn default() -> Self {
        Self::new(VirtualDeviceConfig::default())
    }
}

impl VirtualSession {
    /// A session that will simulate `config` once started.
    pub fn new(config: VirtualDeviceConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared::new()),
            phase: Phase::Created,
            worker: None,
        }
    }

    /// Handle for fault injection and inspection.
    pub fn handle(&self) -> VirtualDeviceHandle {
        VirtualDeviceHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// The simulation settings.
    pub fn config(&self) -> &VirtualDeviceConfig {
        &self.config
    }

    fn join_worker(&mut self) -> DeviceResult {
        self.shared.running.store(false, Ordering::Release);
        match self.worker.take().map(JoinHandle::join) {
            Some(Err(_)) => Err(DeviceError::stop_failed("acquisition thread panicked")),
            _ => Ok(()),
        }
    }
}

impl DeviceSession for VirtualSession {
    fn init(&mut self) -> DeviceResult {
        if self.phase != Phase::Created {
            return Err(DeviceError::init_failed("session already initialized"));
        }
        self.config
            .validate()
            .map_err(|e| DeviceError::init_failed(e.to_string()))?;

        self.shared.sample.update(|s| {
            s.pose = self.config.pose_at(Duration::ZERO);
            s.buttons = self.config.buttons_at(Duration::ZERO);
        });
        self.phase = Phase::Initialized;
        info!(rate_hz = self.config.rate_hz, "virtual device initialized");
        Ok(())
    }

    fn start(&mut self) -> DeviceResult {
        match self.phase {
            Phase::Initialized => {}
            Phase::Created => return Err(DeviceError::start_failed("device not initialized")),
            Phase::Running => return Err(DeviceError::start_failed("already started")),
            Phase::Stopped => return Err(DeviceError::start_failed("session stopped")),
        }

        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let config = self.config;
        let spawned = thread::Builder::new()
            .name("haptic-acquisition".into())
            .spawn(move || acquire(&shared, &config));

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                self.phase = Phase::Running;
                info!("virtual device servo started");
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                Err(DeviceError::start_failed(e.to_string()))
            }
        }
    }

    fn stop(&mut self) -> DeviceResult {
        let previous = self.phase;
        self.phase = Phase::Stopped;
        match previous {
            Phase::Running => {
                let result = self.join_worker();
                info!(
                    samples = self.shared.sequence.load(Ordering::Acquire),
                    "virtual device stopped"
                );
                result
            }
            Phase::Stopped => {
                debug!("virtual device already stopped");
                Ok(())
            }
            Phase::Created | Phase::Initialized => Ok(()),
        }
    }

    fn poll_sample(&self) -> Sample {
        self.shared.sample.load()
    }

    fn sample_sequence(&self) -> u64 {
        self.shared.sequence.load(Ordering::Acquire)
    }

    fn command_force(&mut self, force: ForceVector3) -> DeviceResult {
        if !self.shared.connected.load(Ordering::Acquire) {
            return Err(DeviceError::disconnected("virtual device"));
        }
        if self.phase != Phase::Running {
            return Err(DeviceError::rejected(RejectionCause::SessionStopped));
        }
        if !force.is_finite() {
            return Err(DeviceError::rejected(RejectionCause::InvalidForce));
        }
        if self.shared.sample.load().status == DeviceStatus::MotorsWarm {
            return Err(DeviceError::rejected(RejectionCause::MotorsWarm));
        }
        self.shared.commanded.store(force);
        Ok(())
    }
}

impl Drop for VirtualSession {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _joined = self.join_worker();
        }
    }
}

fn acquire(shared: &Shared, config: &VirtualDeviceConfig) {
    let period = config.period();
    let epoch = Instant::now();
    let mut last_tick = epoch;
    let mut next = epoch;
    let mut heat = MotorHeat::new(
        config.heat_limit,
        Duration::from_millis(config.cooling_time_constant_ms),
    );
    let mut sequence = shared.sequence.load(Ordering::Acquire);

    while shared.running.load(Ordering::Acquire) {
        if !shared.connected.load(Ordering::Acquire) {
            warn!("virtual device disconnected; acquisition halted");
            break;
        }

        let now = Instant::now();
        let elapsed = now.saturating_duration_since(epoch);
        let dt = now.saturating_duration_since(last_tick);
        last_tick = now;

        let commanded = shared.commanded.load();
        let was_warm = heat.is_warm();
        let warm = heat.step(if was_warm { ForceVector3::ZERO } else { commanded }, dt);
        if warm != was_warm {
            if warm {
                warn!(heat = heat.heat(), "virtual motors warm; output suspended");
            } else {
                info!(heat = heat.heat(), "virtual motors cooled");
            }
        }

        sequence = sequence.wrapping_add(1);
        shared.sample.store(Sample {
            pose: config.pose_at(elapsed),
            buttons: config.buttons_at(elapsed),
            sequence,
            device_force: if warm { ForceVector3::ZERO } else { commanded },
            status: if warm {
                DeviceStatus::MotorsWarm
            } else {
                DeviceStatus::Ok
            },
        });
        shared.sequence.store(sequence, Ordering::Release);

        next = next.checked_add(period).unwrap_or(now);
        let after = Instant::now();
        if next > after {
            thread::sleep(next.saturating_duration_since(after));
        } else {
            next = after;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        condition()
    }

    #[test]
    fn test_trajectory_crosses_plane() {
        let config = VirtualDeviceConfig::default();
        let ys: Vec<f64> = (0..40)
            .map(|i| config.pose_at(Duration::from_millis(i * 100)).y)
            .collect();
        assert!(ys.iter().any(|&y| y < 0.0));
        assert!(ys.iter().any(|&y| y > 0.0));
    }

    #[test]
    fn test_button_pattern() {
        let config = VirtualDeviceConfig {
            button_period_ms: 1000,
            ..VirtualDeviceConfig::default()
        };
        assert_eq!(config.buttons_at(Duration::from_millis(50)), 0b00);
        assert_eq!(config.buttons_at(Duration::from_millis(150)), 0b01);
        assert_eq!(config.buttons_at(Duration::from_millis(250)), 0b11);
        assert_eq!(config.buttons_at(Duration::from_millis(450)), 0b10);
        assert_eq!(config.buttons_at(Duration::from_millis(1150)), 0b01);
    }

    #[test]
    fn test_heat_hysteresis() {
        let mut heat = MotorHeat::new(1.0, Duration::from_secs(1));
        let push = ForceVector3::new(0.0, 2.0, 0.0);
        let tick = Duration::from_millis(10);

        let mut ticks_to_warm = 0;
        while !heat.step(push, tick) {
            ticks_to_warm += 1;
            assert!(ticks_to_warm < 1000, "never warmed");
        }

        // Still warm just below the limit.
        heat.step(ForceVector3::ZERO, Duration::from_millis(50));
        assert!(heat.is_warm());

        let mut ticks_to_cool = 0;
        while heat.step(ForceVector3::ZERO, tick) {
            ticks_to_cool += 1;
            assert!(ticks_to_cool < 10_000, "never cooled");
        }
        assert!(heat.heat() < 0.5);
    }

    #[test]
    fn test_lifecycle_order_enforced() {
        let mut session = VirtualSession::default();
        assert!(matches!(session.start(), Err(DeviceError::StartFailed { .. })));
        assert!(matches!(session.init(), Ok(())));
        assert!(matches!(session.init(), Err(DeviceError::InitFailed { .. })));
    }

    #[test]
    fn test_invalid_config_fails_init() {
        let mut session = VirtualSession::new(VirtualDeviceConfig {
            rate_hz: 0,
            ..VirtualDeviceConfig::default()
        });
        assert!(matches!(session.init(), Err(DeviceError::InitFailed { .. })));
    }

    #[test]
    fn test_command_before_start_rejected() {
        let mut session = VirtualSession::default();
        assert_eq!(
            session.command_force(ForceVector3::ZERO),
            Err(DeviceError::rejected(RejectionCause::SessionStopped))
        );
    }

    #[test]
    fn test_running_session_echoes_force() -> TestResult {
        let mut session = VirtualSession::default();
        session.init()?;
        session.start()?;
        let handle = session.handle();
        assert!(handle.is_running());

        assert!(wait_for(|| session.sample_sequence() > 5));
        let push = ForceVector3::new(0.0, 0.25, 0.0);
        session.command_force(push)?;
        assert!(wait_for(|| {
            (session.poll_sample().device_force.fy - 0.25).abs() < f64::EPSILON
        }));

        session.stop()?;
        assert!(!handle.is_running());
        let frozen = session.sample_sequence();
        thread::sleep(Duration::from_millis(10));
        assert_eq!(session.sample_sequence(), frozen);
        assert_eq!(
            session.command_force(push),
            Err(DeviceError::rejected(RejectionCause::SessionStopped))
        );
        Ok(())
    }

    #[test]
    fn test_warm_motors_reject_commands() -> TestResult {
        let mut session = VirtualSession::new(VirtualDeviceConfig {
            heat_limit: 0.001,
            cooling_time_constant_ms: 60_000,
            ..VirtualDeviceConfig::default()
        });
        session.init()?;
        session.start()?;
        session.command_force(ForceVector3::new(0.0, 2.0, 0.0))?;

        assert!(wait_for(|| session.poll_sample().status == DeviceStatus::MotorsWarm));
        assert!(session.poll_sample().device_force.is_zero());
        assert_eq!(
            session.command_force(ForceVector3::ZERO),
            Err(DeviceError::rejected(RejectionCause::MotorsWarm))
        );
        session.stop()?;
        Ok(())
    }

    #[test]
    fn test_disconnect_is_reported() -> TestResult {
        let mut session = VirtualSession::default();
        session.init()?;
        session.start()?;
        session.handle().disconnect();
        assert!(matches!(
            session.command_force(ForceVector3::ZERO),
            Err(DeviceError::Disconnected(_))
        ));
        session.stop()?;
        Ok(())
    }

    #[test]
    fn test_stop_is_idempotent() -> TestResult {
        let mut session = VirtualSession::default();
        session.init()?;
        session.start()?;
        session.stop()?;
        session.stop()?;
        Ok(())
    }
}
