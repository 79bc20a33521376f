//! Typed parameter registry
//!
//! Maps a console-visible name to one field of [`FlightConfig`], the
//! field's numeric type and an inclusive `[min, max]` range.
//!
//! The field type and the accessor are one value ([`ParamAccess`]), so an
//! entry cannot read or write a field as the wrong width.
//!
//! Bounds are integers for every kind, floats included. Float values are
//! compared against the integer bounds promoted to `f32`, which makes
//! fractional bounds unrepresentable (a `0..1` gain accepts exactly the
//! closed interval 0.0..=1.0 and nothing finer can be expressed).

use core::fmt::{self, Write};

use heapless::String;

use super::*;

/// Numeric type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    F32,
}

/// A parameter value (union of supported types).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    F32(f32),
}

impl ParamValue {
    /// Type of this value.
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::U8(_) => ParamKind::U8,
            ParamValue::I8(_) => ParamKind::I8,
            ParamValue::U16(_) => ParamKind::U16,
            ParamValue::I16(_) => ParamKind::I16,
            ParamValue::U32(_) => ParamKind::U32,
            ParamValue::F32(_) => ParamKind::F32,
        }
    }

    /// 32-bit storage word: integers sign/zero-extended, floats as IEEE bits.
    pub fn to_bits(self) -> u32 {
        match self {
            ParamValue::U8(v) => v as u32,
            ParamValue::I8(v) => v as i32 as u32,
            ParamValue::U16(v) => v as u32,
            ParamValue::I16(v) => v as i32 as u32,
            ParamValue::U32(v) => v,
            ParamValue::F32(v) => v.to_bits(),
        }
    }

    /// Inverse of [`to_bits`](Self::to_bits).
    pub fn from_bits(bits: u32, kind: ParamKind) -> Self {
        match kind {
            ParamKind::U8 => ParamValue::U8(bits as u8),
            ParamKind::I8 => ParamValue::I8(bits as u8 as i8),
            ParamKind::U16 => ParamValue::U16(bits as u16),
            ParamKind::I16 => ParamValue::I16(bits as u16 as i16),
            ParamKind::U32 => ParamValue::U32(bits),
            ParamKind::F32 => ParamValue::F32(f32::from_bits(bits)),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::U8(v) => write!(f, "{}", v),
            ParamValue::I8(v) => write!(f, "{}", v),
            ParamValue::U16(v) => write!(f, "{}", v),
            ParamValue::I16(v) => write!(f, "{}", v),
            ParamValue::U32(v) => write!(f, "{}", v),
            ParamValue::F32(v) => write!(f, "{}", v),
        }
    }
}

/// Typed accessor pair for one config field.
#[derive(Clone, Copy)]
pub enum ParamAccess {
    U8 { get: fn(&FlightConfig) -> &u8, get_mut: fn(&mut FlightConfig) -> &mut u8 },
    I8 { get: fn(&FlightConfig) -> &i8, get_mut: fn(&mut FlightConfig) -> &mut i8 },
    U16 { get: fn(&FlightConfig) -> &u16, get_mut: fn(&mut FlightConfig) -> &mut u16 },
    I16 { get: fn(&FlightConfig) -> &i16, get_mut: fn(&mut FlightConfig) -> &mut i16 },
    U32 { get: fn(&FlightConfig) -> &u32, get_mut: fn(&mut FlightConfig) -> &mut u32 },
    F32 { get: fn(&FlightConfig) -> &f32, get_mut: fn(&mut FlightConfig) -> &mut f32 },
}

/// Registry error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    /// Parsed value lies outside `[min, max]`; the field was not touched
    OutOfRange,
}

/// One settable parameter.
#[derive(Clone, Copy)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub min: i32,
    pub max: i32,
    access: ParamAccess,
}

impl fmt::Debug for ParamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}

impl ParamDescriptor {
    pub const fn new(name: &'static str, access: ParamAccess, min: i32, max: i32) -> Self {
        Self { name, min, max, access }
    }

    /// Numeric type of the bound field.
    pub fn kind(&self) -> ParamKind {
        match self.access {
            ParamAccess::U8 { .. } => ParamKind::U8,
            ParamAccess::I8 { .. } => ParamKind::I8,
            ParamAccess::U16 { .. } => ParamKind::U16,
            ParamAccess::I16 { .. } => ParamKind::I16,
            ParamAccess::U32 { .. } => ParamKind::U32,
            ParamAccess::F32 { .. } => ParamKind::F32,
        }
    }

    /// Current value of the bound field.
    pub fn get(&self, cfg: &FlightConfig) -> ParamValue {
        match self.access {
            ParamAccess::U8 { get, .. } => ParamValue::U8(*get(cfg)),
            ParamAccess::I8 { get, .. } => ParamValue::I8(*get(cfg)),
            ParamAccess::U16 { get, .. } => ParamValue::U16(*get(cfg)),
            ParamAccess::I16 { get, .. } => ParamValue::I16(*get(cfg)),
            ParamAccess::U32 { get, .. } => ParamValue::U32(*get(cfg)),
            ParamAccess::F32 { get, .. } => ParamValue::F32(*get(cfg)),
        }
    }

    /// Store a 32-bit storage word without range checking.
    ///
    /// Used when restoring persisted values.
    pub fn store_bits(&self, cfg: &mut FlightConfig, bits: u32) {
        match (self.access, ParamValue::from_bits(bits, self.kind())) {
            (ParamAccess::U8 { get_mut, .. }, ParamValue::U8(v)) => *get_mut(cfg) = v,
            (ParamAccess::I8 { get_mut, .. }, ParamValue::I8(v)) => *get_mut(cfg) = v,
            (ParamAccess::U16 { get_mut, .. }, ParamValue::U16(v)) => *get_mut(cfg) = v,
            (ParamAccess::I16 { get_mut, .. }, ParamValue::I16(v)) => *get_mut(cfg) = v,
            (ParamAccess::U32 { get_mut, .. }, ParamValue::U32(v)) => *get_mut(cfg) = v,
            (ParamAccess::F32 { get_mut, .. }, ParamValue::F32(v)) => *get_mut(cfg) = v,
            // from_bits yields the variant of self.kind()
            _ => {}
        }
    }

    /// Integer assignment, narrowed to the field width by truncation.
    fn store_int(&self, cfg: &mut FlightConfig, value: i32) {
        match self.access {
            ParamAccess::U8 { get_mut, .. } => *get_mut(cfg) = value as u8,
            ParamAccess::I8 { get_mut, .. } => *get_mut(cfg) = value as i8,
            ParamAccess::U16 { get_mut, .. } => *get_mut(cfg) = value as u16,
            ParamAccess::I16 { get_mut, .. } => *get_mut(cfg) = value as i16,
            ParamAccess::U32 { get_mut, .. } => *get_mut(cfg) = value as u32,
            ParamAccess::F32 { get_mut, .. } => *get_mut(cfg) = value as f32,
        }
    }
}

/// Formatted parameter value (`value` or `value min max`).
pub type ValueText = String<48>;

/// Render the current value of `param`; with `include_bounds` append ` min max`.
pub fn format_value(param: &ParamDescriptor, cfg: &FlightConfig, include_bounds: bool) -> ValueText {
    let mut text = ValueText::new();
    let _ = write!(text, "{}", param.get(cfg));
    if include_bounds {
        let _ = write!(text, " {} {}", param.min, param.max);
    }
    text
}

/// Parse `text`, range-check it and assign it to the bound field.
///
/// Floats parse as floats and compare against the integer bounds as
/// `f32`; every other kind parses as a signed 32-bit integer, compares as
/// an integer and is then truncated to the field width (`300` into a
/// `u8` field whose range admits it stores 44).
///
/// On `Err` the field is left untouched.
pub fn set_value(param: &ParamDescriptor, cfg: &mut FlightConfig, text: &str) -> Result<ParamValue, ParamError> {
    use crate::console::parser::{parse_float, parse_int};

    if let ParamAccess::F32 { get_mut, .. } = param.access {
        let value = parse_float(text);
        if value < param.min as f32 || value > param.max as f32 {
            return Err(ParamError::OutOfRange);
        }
        *get_mut(cfg) = value;
    } else {
        let value = parse_int(text);
        if value < param.min || value > param.max {
            return Err(ParamError::OutOfRange);
        }
        param.store_int(cfg, value);
    }

    Ok(param.get(cfg))
}

/// Find parameter by exact name (ASCII case-insensitive).
pub fn find_param(name: &str) -> Option<&'static ParamDescriptor> {
    PARAMS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Find the parameter addressed by a `name=value` assignment.
///
/// First entry in table order whose full name is a case-insensitive
/// prefix of `assignment`; text between the name and `=` is not checked.
pub fn find_assignment_target(assignment: &str) -> Option<&'static ParamDescriptor> {
    use crate::console::parser::starts_with_ignore_case;

    PARAMS.iter().find(|p| starts_with_ignore_case(assignment, p.name))
}

macro_rules! param {
    ($name:literal, $kind:ident, $min:expr, $max:expr => $($field:tt)+) => {
        ParamDescriptor::new(
            $name,
            ParamAccess::$kind {
                get: |c| &c.$($field)+,
                get_mut: |c| &mut c.$($field)+,
            },
            $min,
            $max,
        )
    };
}

/// All console-settable parameters, in listing order.
pub static PARAMS: &[ParamDescriptor] = &[
    param!("escPwmRate", U16, 50, 498 => esc_pwm_rate),
    param!("servoPwmRate", U16, 50, 498 => servo_pwm_rate),
    param!("failsafeOnDelay", U16, 0, 1000 => failsafe_on_delay),
    param!("failsafeOffDelay", U16, 0, 100000 => failsafe_off_delay),
    param!("failsafeThrottle", U16, 1000, 2000 => failsafe_throttle),
    param!("minCommand", U16, 0, 2000 => min_command),
    param!("midCommand", U16, 1200, 1700 => mid_command),
    param!("maxCommand", U16, 0, 2000 => max_command),
    param!("minCheck", U16, 0, 2000 => min_check),
    param!("maxCheck", U16, 0, 2000 => max_check),
    param!("minThrottle", U16, 0, 2000 => min_throttle),
    param!("maxThrottle", U16, 0, 2000 => max_throttle),
    param!("spektrumHiRes", U8, 0, 1 => spektrum_hi_res),
    param!("rollDeadband", U8, 0, 32 => deadband[ROLL]),
    param!("pitchDeadband", U8, 0, 32 => deadband[PITCH]),
    param!("yawDeadband", U8, 0, 32 => deadband[YAW]),
    param!("yawDirection", I8, -1, 1 => yaw_direction),
    param!("triYawServoMin", U16, 0, 2000 => tri_yaw_servo_min),
    param!("triYawServoMid", U16, 0, 2000 => tri_yaw_servo_mid),
    param!("triYawServoMax", U16, 0, 2000 => tri_yaw_servo_max),
    param!("biLeftServoMin", U16, 0, 2000 => bi_left_servo_min),
    param!("biLeftServoMid", U16, 0, 2000 => bi_left_servo_mid),
    param!("biLeftServoMax", U16, 0, 2000 => bi_left_servo_max),
    param!("biRightServoMin", U16, 0, 2000 => bi_right_servo_min),
    param!("biRightServoMid", U16, 0, 2000 => bi_right_servo_mid),
    param!("biRightServoMax", U16, 0, 2000 => bi_right_servo_max),
    param!("wingLeftMin", U16, 0, 2000 => wing_left_min),
    param!("wingLeftMid", U16, 0, 2000 => wing_left_mid),
    param!("wingLeftMax", U16, 0, 2000 => wing_left_max),
    param!("wingRightMin", U16, 0, 2000 => wing_right_min),
    param!("wingRightMid", U16, 0, 2000 => wing_right_mid),
    param!("wingRightMax", U16, 0, 2000 => wing_right_max),
    param!("pitchDirectionLeft", I8, -1, 1 => pitch_direction_left),
    param!("pitchDirectionRight", I8, -1, 1 => pitch_direction_right),
    param!("rollDirectionLeft", I8, -1, 1 => roll_direction_left),
    param!("rollDirectionRight", I8, -1, 1 => roll_direction_right),
    param!("gimbalFlags", U8, 0, 255 => gimbal_flags),
    param!("gimbalSmoothFactor", F32, 0, 1 => gimbal_smooth_factor),
    param!("gimbalRollServoMin", U16, 0, 2000 => gimbal_roll_servo_min),
    param!("gimbalRollServoMid", U16, 0, 2000 => gimbal_roll_servo_mid),
    param!("gimbalRollServoMax", U16, 0, 2000 => gimbal_roll_servo_max),
    param!("gimbalRollServoGain", F32, -100, 100 => gimbal_roll_servo_gain),
    param!("gimbalPitchServoMin", U16, 0, 2000 => gimbal_pitch_servo_min),
    param!("gimbalPitchServoMid", U16, 0, 2000 => gimbal_pitch_servo_mid),
    param!("gimbalPitchServoMax", U16, 0, 2000 => gimbal_pitch_servo_max),
    param!("gimbalPitchServoGain", F32, -100, 100 => gimbal_pitch_servo_gain),
    param!("p_roll_rate", F32, 0, 400 => pids[PID_ROLL_RATE].p),
    param!("i_roll_rate", F32, 0, 400 => pids[PID_ROLL_RATE].i),
    param!("d_roll_rate", F32, 0, 400 => pids[PID_ROLL_RATE].d),
    param!("ilim_roll_rate", F32, 0, 200 => pids[PID_ROLL_RATE].i_lim),
    param!("p_pitch_rate", F32, 0, 400 => pids[PID_PITCH_RATE].p),
    param!("i_pitch_rate", F32, 0, 400 => pids[PID_PITCH_RATE].i),
    param!("d_pitch_rate", F32, 0, 400 => pids[PID_PITCH_RATE].d),
    param!("ilim_pitch_rate", F32, 0, 200 => pids[PID_PITCH_RATE].i_lim),
    param!("p_yaw_rate", F32, 0, 400 => pids[PID_YAW_RATE].p),
    param!("i_yaw_rate", F32, 0, 400 => pids[PID_YAW_RATE].i),
    param!("d_yaw_rate", F32, 0, 400 => pids[PID_YAW_RATE].d),
    param!("ilim_yaw_rate", F32, 0, 200 => pids[PID_YAW_RATE].i_lim),
    param!("p_roll_level", F32, 0, 400 => pids[PID_ROLL_LEVEL].p),
    param!("i_roll_level", F32, 0, 400 => pids[PID_ROLL_LEVEL].i),
    param!("d_roll_level", F32, 0, 400 => pids[PID_ROLL_LEVEL].d),
    param!("ilim_roll_level", F32, 0, 200 => pids[PID_ROLL_LEVEL].i_lim),
    param!("p_pitch_level", F32, 0, 400 => pids[PID_PITCH_LEVEL].p),
    param!("i_pitch_level", F32, 0, 400 => pids[PID_PITCH_LEVEL].i),
    param!("d_pitch_level", F32, 0, 400 => pids[PID_PITCH_LEVEL].d),
    param!("ilim_pitch_level", F32, 0, 200 => pids[PID_PITCH_LEVEL].i_lim),
    param!("p_heading", F32, 0, 400 => pids[PID_HEADING].p),
    param!("i_heading", F32, 0, 400 => pids[PID_HEADING].i),
    param!("d_heading", F32, 0, 400 => pids[PID_HEADING].d),
    param!("ilim_heading", F32, 0, 200 => pids[PID_HEADING].i_lim),
    param!("p_altitude", F32, 0, 400 => pids[PID_ALTITUDE].p),
    param!("i_altitude", F32, 0, 400 => pids[PID_ALTITUDE].i),
    param!("d_altitude", F32, 0, 400 => pids[PID_ALTITUDE].d),
    param!("ilim_altitude", F32, 0, 50000 => pids[PID_ALTITUDE].i_lim),
    param!("mpu6050Scale", U8, 0, 1 => mpu6050_scale),
    param!("accelKp", F32, 0, 50 => accel_kp),
    param!("accelKi", F32, 0, 50 => accel_ki),
    param!("magKp", F32, 0, 50 => mag_kp),
    param!("magKi", F32, 0, 50 => mag_ki),
    param!("magDriftCompensation", U8, 0, 1 => mag_drift_compensation),
    param!("magDeclination", F32, -18000, 18000 => mag_declination),
    param!("accelLPF", U8, 0, 1 => accel_lpf),
    param!("accelSmoothFactor", F32, 0, 1 => accel_smooth_factor),
    param!("gyroBiasOnStartup", U8, 0, 1 => gyro_bias_on_startup),
    param!("gyroSmoothFactor", F32, 0, 1 => gyro_smooth_factor),
    param!("batScale", F32, 0, 50 => bat_scale),
    param!("batMinCellVoltage", F32, 0, 5 => bat_min_cell_voltage),
    param!("batMaxCellVoltage", F32, 0, 5 => bat_max_cell_voltage),
    param!("startupDelay", U16, 0, 6000 => startup_delay),
];
