//! Module: config
//!
//! Purpose: Flight configuration aggregate edited by the console.
//!
//! Architecture:
//! - [`FlightConfig`]: plain owned struct, owned by the firmware main loop
//! - [`params`]: typed name → field registry used by `set`
//! - [`names`]: mixer / feature / sensor / rc channel name tables
//! - [`nvs`]: parameter blob codec and ESP-IDF persistence
//!
//! The console never holds the config; it borrows it for one poll at a time.

pub mod names;
pub mod nvs;
pub mod params;

pub use names::{feature_bit, FEATURE_NAMES, MIXER_NAMES, RC_CHANNEL_LETTERS, SENSOR_NAMES};
pub use nvs::{decode_params, encode_params, load_from_nvs, save_to_nvs, NvsError};
pub use params::{
    find_assignment_target, find_param, format_value, set_value, ParamAccess,
    ParamDescriptor, ParamError, ParamKind, ParamValue, PARAMS,
};

/// Maximum number of motors in a custom mixer.
pub const MAX_MOTORS: usize = 8;

/// Number of rc input channels covered by the channel map.
pub const RC_CHANNELS: usize = 8;

/// Axis index: roll / X.
pub const ROLL: usize = 0;
/// Axis index: pitch / Y.
pub const PITCH: usize = 1;
/// Axis index: yaw / Z.
pub const YAW: usize = 2;

// PID controller slots
pub const PID_ROLL_RATE: usize = 0;
pub const PID_PITCH_RATE: usize = 1;
pub const PID_YAW_RATE: usize = 2;
pub const PID_ROLL_LEVEL: usize = 3;
pub const PID_PITCH_LEVEL: usize = 4;
pub const PID_HEADING: usize = 5;
pub const PID_ALTITUDE: usize = 6;
pub const PID_COUNT: usize = 7;

/// One row of the custom mixer: contribution of each control axis to a motor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorMix {
    pub throttle: f32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl MotorMix {
    pub const fn new(throttle: f32, roll: f32, pitch: f32, yaw: f32) -> Self {
        Self { throttle, roll, pitch, yaw }
    }
}

/// PID gains for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pid {
    pub p: f32,
    pub i: f32,
    pub d: f32,
    /// Integrator limit.
    pub i_lim: f32,
}

impl Pid {
    pub const fn new(p: f32, i: f32, d: f32, i_lim: f32) -> Self {
        Self { p, i, d, i_lim }
    }
}

/// Complete persistent flight configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightConfig {
    // Output rates and rc command window
    pub esc_pwm_rate: u16,
    pub servo_pwm_rate: u16,
    pub failsafe_on_delay: u16,
    pub failsafe_off_delay: u16,
    pub failsafe_throttle: u16,
    pub min_command: u16,
    pub mid_command: u16,
    pub max_command: u16,
    pub min_check: u16,
    pub max_check: u16,
    pub min_throttle: u16,
    pub max_throttle: u16,
    pub spektrum_hi_res: u8,
    pub deadband: [u8; 3],
    pub yaw_direction: i8,

    // Servo mixers
    pub tri_yaw_servo_min: u16,
    pub tri_yaw_servo_mid: u16,
    pub tri_yaw_servo_max: u16,
    pub bi_left_servo_min: u16,
    pub bi_left_servo_mid: u16,
    pub bi_left_servo_max: u16,
    pub bi_right_servo_min: u16,
    pub bi_right_servo_mid: u16,
    pub bi_right_servo_max: u16,
    pub wing_left_min: u16,
    pub wing_left_mid: u16,
    pub wing_left_max: u16,
    pub wing_right_min: u16,
    pub wing_right_mid: u16,
    pub wing_right_max: u16,
    pub pitch_direction_left: i8,
    pub pitch_direction_right: i8,
    pub roll_direction_left: i8,
    pub roll_direction_right: i8,

    // Gimbal
    pub gimbal_flags: u8,
    pub gimbal_smooth_factor: f32,
    pub gimbal_roll_servo_min: u16,
    pub gimbal_roll_servo_mid: u16,
    pub gimbal_roll_servo_max: u16,
    pub gimbal_roll_servo_gain: f32,
    pub gimbal_pitch_servo_min: u16,
    pub gimbal_pitch_servo_mid: u16,
    pub gimbal_pitch_servo_max: u16,
    pub gimbal_pitch_servo_gain: f32,

    pub pids: [Pid; PID_COUNT],

    // Sensors and attitude estimation
    pub mpu6050_scale: u8,
    pub accel_kp: f32,
    pub accel_ki: f32,
    pub mag_kp: f32,
    pub mag_ki: f32,
    pub mag_drift_compensation: u8,
    /// Magnetic declination in hundredths of a degree.
    pub mag_declination: f32,
    pub accel_lpf: u8,
    pub accel_smooth_factor: f32,
    pub gyro_bias_on_startup: u8,
    pub gyro_smooth_factor: f32,

    // Battery
    pub bat_scale: f32,
    pub bat_min_cell_voltage: f32,
    pub bat_max_cell_voltage: f32,

    /// Milliseconds to wait before arming sensors after boot.
    pub startup_delay: u16,

    /// 1-based index into [`MIXER_NAMES`].
    pub mixer_configuration: u8,
    pub custom_mixer: [MotorMix; MAX_MOTORS],
    /// `rc_map[f]` is the input channel carrying function `f` (AETR1234 order).
    pub rc_map: [u8; RC_CHANNELS],

    // Calibration results
    pub accel_bias: [i16; 3],
    pub gyro_tc_bias_slope: [f32; 3],
    pub gyro_tc_bias_intercept: [f32; 3],
    pub mag_bias: [i16; 3],
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            esc_pwm_rate: 400,
            servo_pwm_rate: 50,
            failsafe_on_delay: 10,
            failsafe_off_delay: 200,
            failsafe_throttle: 1200,
            min_command: 1000,
            mid_command: 1500,
            max_command: 2000,
            min_check: 1100,
            max_check: 1900,
            min_throttle: 1150,
            max_throttle: 1850,
            spektrum_hi_res: 0,
            deadband: [0; 3],
            yaw_direction: 1,

            tri_yaw_servo_min: 1020,
            tri_yaw_servo_mid: 1500,
            tri_yaw_servo_max: 2000,
            bi_left_servo_min: 1070,
            bi_left_servo_mid: 1500,
            bi_left_servo_max: 2000,
            bi_right_servo_min: 1070,
            bi_right_servo_mid: 1500,
            bi_right_servo_max: 2000,
            wing_left_min: 1020,
            wing_left_mid: 1500,
            wing_left_max: 2000,
            wing_right_min: 1020,
            wing_right_mid: 1500,
            wing_right_max: 2000,
            pitch_direction_left: 1,
            pitch_direction_right: -1,
            roll_direction_left: 1,
            roll_direction_right: 1,

            gimbal_flags: 0,
            gimbal_smooth_factor: 1.0,
            gimbal_roll_servo_min: 1020,
            gimbal_roll_servo_mid: 1500,
            gimbal_roll_servo_max: 2000,
            gimbal_roll_servo_gain: 10.0,
            gimbal_pitch_servo_min: 1020,
            gimbal_pitch_servo_mid: 1500,
            gimbal_pitch_servo_max: 2000,
            gimbal_pitch_servo_gain: 10.0,

            pids: [
                Pid::new(250.0, 5.0, 0.0, 50.0),   // roll rate
                Pid::new(250.0, 5.0, 0.0, 50.0),   // pitch rate
                Pid::new(350.0, 5.0, 0.0, 50.0),   // yaw rate
                Pid::new(3.0, 0.0, 0.0, 0.0),      // roll level
                Pid::new(3.0, 0.0, 0.0, 0.0),      // pitch level
                Pid::new(3.0, 0.0, 0.0, 0.0),      // heading
                Pid::new(2.0, 0.0, 0.0, 1000.0),   // altitude
            ],

            mpu6050_scale: 0,
            accel_kp: 1.0,
            accel_ki: 0.0,
            mag_kp: 5.0,
            mag_ki: 0.0,
            mag_drift_compensation: 1,
            mag_declination: 0.0,
            accel_lpf: 0,
            accel_smooth_factor: 1.0,
            gyro_bias_on_startup: 1,
            gyro_smooth_factor: 0.5,

            bat_scale: 11.0,
            bat_min_cell_voltage: 3.3,
            bat_max_cell_voltage: 4.2,

            startup_delay: 1500,

            mixer_configuration: 3, // QUADX
            custom_mixer: [MotorMix::default(); MAX_MOTORS],
            rc_map: [0, 1, 2, 3, 4, 5, 6, 7],

            accel_bias: [0; 3],
            gyro_tc_bias_slope: [0.0; 3],
            gyro_tc_bias_intercept: [0.0; 3],
            mag_bias: [0; 3],
        }
    }
}

impl FlightConfig {
    /// Name of the configured mixer, if the index is valid.
    pub fn mixer_name(&self) -> Option<&'static str> {
        (self.mixer_configuration as usize)
            .checked_sub(1)
            .and_then(|idx| MIXER_NAMES.get(idx))
            .copied()
    }
}
