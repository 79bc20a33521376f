//! Simulated flight system
//!
//! Stands in for storage, mixer engine and sensors. Every side effect the
//! console triggers is recorded so tests can assert on it.

use heapless::Vec;

use crate::config::{FlightConfig, MotorMix};
use crate::console::Transport;
use crate::system::{CalibrationRoutine, FlightSystem, StateData, SystemStatus};

/// Bit of ACC in the sensor mask
pub const SENSOR_ACC: u32 = 1 << 0;
/// Bit of BARO in the sensor mask
pub const SENSOR_BARO: u32 = 1 << 1;
/// Bit of MAG in the sensor mask
pub const SENSOR_MAG: u32 = 1 << 2;

static MIX_TRI: [MotorMix; 3] = [
    MotorMix::new(1.0, 0.0, 1.333333, 0.0),
    MotorMix::new(1.0, -1.0, -0.666667, 0.0),
    MotorMix::new(1.0, 1.0, -0.666667, 0.0),
];

static MIX_QUADP: [MotorMix; 4] = [
    MotorMix::new(1.0, 0.0, 1.0, -1.0),
    MotorMix::new(1.0, -1.0, 0.0, 1.0),
    MotorMix::new(1.0, 1.0, 0.0, 1.0),
    MotorMix::new(1.0, 0.0, -1.0, -1.0),
];

static MIX_QUADX: [MotorMix; 4] = [
    MotorMix::new(1.0, -1.0, 1.0, -1.0),
    MotorMix::new(1.0, -1.0, -1.0, 1.0),
    MotorMix::new(1.0, 1.0, 1.0, 1.0),
    MotorMix::new(1.0, 1.0, -1.0, -1.0),
];

static MIX_BI: [MotorMix; 2] = [MotorMix::new(1.0, 1.0, 0.0, 0.0), MotorMix::new(1.0, -1.0, 0.0, 0.0)];

static MIX_Y4: [MotorMix; 4] = [
    MotorMix::new(1.0, 0.0, 1.0, -1.0),
    MotorMix::new(1.0, -1.0, -1.0, 0.0),
    MotorMix::new(1.0, 0.0, 1.0, 1.0),
    MotorMix::new(1.0, 1.0, -1.0, 0.0),
];

/// Index of CUSTOM in the 1-based mixer enumeration
const MIXER_CUSTOM: u8 = 18;

/// Motor table of a stock mixer, 1-based; unknown or motorless mixers
/// have an empty table.
pub fn preset(mixer: u8) -> &'static [MotorMix] {
    match mixer {
        1 => &MIX_TRI,
        2 => &MIX_QUADP,
        3 => &MIX_QUADX,
        4 => &MIX_BI,
        9 => &MIX_Y4,
        _ => &[],
    }
}

/// Recording flight system
#[derive(Debug, Clone)]
pub struct SimSystem {
    pub features: u32,
    pub sensors: u32,
    pub state: StateData,
    pub status: SystemStatus,
    pub gyro_rt_bias: [i16; 3],
    /// Configuration as last persisted
    pub saved: Option<FlightConfig>,
    pub save_count: u32,
    pub reset_count: u32,
    /// Mixer each `reload_mixer` call saw, oldest first
    pub reloaded_mixers: Vec<u8, 16>,
    pub calibrations: Vec<CalibrationRoutine, 16>,
}

impl SimSystem {
    pub fn new() -> Self {
        Self {
            features: 0,
            sensors: SENSOR_ACC | SENSOR_BARO | SENSOR_MAG,
            state: StateData::default(),
            status: SystemStatus {
                uptime_ms: 0,
                battery_voltage: 11.1,
                battery_cells: 3,
                cycle_time_us: 3500,
                i2c_errors: 0,
            },
            gyro_rt_bias: [0; 3],
            saved: None,
            save_count: 0,
            reset_count: 0,
            reloaded_mixers: Vec::new(),
            calibrations: Vec::new(),
        }
    }

    /// Advance simulated time
    pub fn advance(&mut self, ms: u32) {
        self.status.uptime_ms = self.status.uptime_ms.wrapping_add(ms);
    }
}

impl Default for SimSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FlightSystem for SimSystem {
    fn write_params(&mut self, cfg: &FlightConfig) {
        self.saved = Some(cfg.clone());
        self.save_count += 1;
    }

    fn reset_to_defaults(&mut self, cfg: &mut FlightConfig) {
        *cfg = FlightConfig::default();
        self.reset_count += 1;
        self.write_params(cfg);
    }

    fn feature_mask(&self) -> u32 {
        self.features
    }

    fn feature_set(&mut self, mask: u32) {
        self.features |= mask;
    }

    fn feature_clear(&mut self, mask: u32) {
        self.features &= !mask;
    }

    fn sensors_mask(&self) -> u32 {
        self.sensors
    }

    fn load_mix(&mut self, mixer: u8, cfg: &mut FlightConfig) {
        if mixer == MIXER_CUSTOM {
            return;
        }
        let rows = preset(mixer);
        for (i, row) in cfg.custom_mixer.iter_mut().enumerate() {
            *row = rows.get(i).copied().unwrap_or_default();
        }
    }

    fn reload_mixer(&mut self, cfg: &FlightConfig) {
        let _ = self.reloaded_mixers.push(cfg.mixer_configuration);
    }

    fn calibrate(&mut self, routine: CalibrationRoutine, cfg: &mut FlightConfig) {
        match routine {
            CalibrationRoutine::Accel => cfg.accel_bias = [12, -7, 510],
            CalibrationRoutine::GyroTemperature => {
                cfg.gyro_tc_bias_slope = [0.5, -0.25, 0.125];
                cfg.gyro_tc_bias_intercept = [10.0, -4.0, 2.5];
            }
            CalibrationRoutine::GyroRuntime => self.gyro_rt_bias = [3, -2, 1],
            CalibrationRoutine::Mag => cfg.mag_bias = [-40, 25, 8],
        }
        let _ = self.calibrations.push(routine);
    }

    fn gyro_runtime_bias(&self) -> [i16; 3] {
        self.gyro_rt_bias
    }

    fn state(&self) -> StateData {
        self.state
    }

    fn status(&self) -> SystemStatus {
        self.status
    }

    fn write_event_deltas(&self, out: &mut dyn Transport) {
        let _ = write!(out, "loop: {} us\r\n", self.status.cycle_time_us);
    }
}
