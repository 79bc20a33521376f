//! Flight system services the console drives.
//!
//! Everything behind [`FlightSystem`] lives outside the console: parameter
//! storage, the mixer engine, sensor drivers and their calibration
//! routines, attitude estimation. The console calls in by name and only
//! formats what comes back.
//!
//! Restarting is not part of this trait. Commands that end in a restart
//! return [`PollOutcome::Restart`](crate::console::PollOutcome) and the
//! owner of the main loop performs it.

use crate::config::FlightConfig;
use crate::console::Transport;

/// Sensor calibration routines reachable from `calibrate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationRoutine {
    /// Accelerometer bias; board placed level and fixed
    Accel,
    /// Gyro temperature compensation (long running)
    GyroTemperature,
    /// Gyro runtime bias; board fixed
    GyroRuntime,
    /// Magnetometer bias; rotate around all axes
    Mag,
}

/// Live estimator state for telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateData {
    /// Acceleration per axis (roll, pitch, yaw)
    pub accel: [f32; 3],
    /// Angular rate per axis
    pub gyro: [f32; 3],
    /// Magnetic field per axis
    pub mag: [f32; 3],
    /// Barometric altitude
    pub altitude: i32,
    /// Attitude in radians
    pub roll: f32,
    pub pitch: f32,
    pub heading: f32,
}

/// Health counters shown by `status`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemStatus {
    pub uptime_ms: u32,
    pub battery_voltage: f32,
    pub battery_cells: u8,
    /// Main loop period in microseconds
    pub cycle_time_us: u32,
    pub i2c_errors: u32,
}

/// Collaborator interface of the console.
pub trait FlightSystem {
    /// Persist the configuration.
    fn write_params(&mut self, cfg: &FlightConfig);

    /// Replace the configuration with stock values and persist it.
    fn reset_to_defaults(&mut self, cfg: &mut FlightConfig);

    /// Enabled feature bits (see [`FEATURE_NAMES`](crate::config::FEATURE_NAMES)).
    fn feature_mask(&self) -> u32;
    fn feature_set(&mut self, mask: u32);
    fn feature_clear(&mut self, mask: u32);

    /// Detected sensor bits (see [`SENSOR_NAMES`](crate::config::SENSOR_NAMES)).
    fn sensors_mask(&self) -> u32;

    /// Copy the preset table of `mixer` (1-based) into `cfg.custom_mixer`.
    fn load_mix(&mut self, mixer: u8, cfg: &mut FlightConfig);

    /// Rebuild output mixer coefficients from `cfg.mixer_configuration`.
    fn reload_mixer(&mut self, cfg: &FlightConfig);

    /// Run a calibration routine; results land in `cfg`.
    fn calibrate(&mut self, routine: CalibrationRoutine, cfg: &mut FlightConfig);

    /// Gyro runtime bias measured since boot (not persisted).
    fn gyro_runtime_bias(&self) -> [i16; 3];

    /// Current estimator state.
    fn state(&self) -> StateData;

    /// Current health counters.
    fn status(&self) -> SystemStatus;

    /// Write the scheduler event timing report (one or more lines).
    fn write_event_deltas(&self, out: &mut dyn Transport);
}
