//! Name tables shared between the console and the flight code.
//!
//! Position in each table is load-bearing:
//! - [`MIXER_NAMES`]: index `i` is mixer enumerator `i + 1`
//! - [`FEATURE_NAMES`]: index `i` is bit `1 << i` of the feature mask
//! - [`SENSOR_NAMES`]: index `i` is bit `1 << i` of the sensor mask

/// Mixer topologies, in enumerator order.
pub static MIXER_NAMES: &[&str] = &[
    "TRI", "QUADP", "QUADX", "BI",
    "GIMBAL", "Y6", "HEX6P",
    "FLYING_WING", "Y4", "HEX6X", "OCTOX8", "OCTOFLATP", "OCTOFLATX",
    "AIRPLANE", "HELI_120_CCPM", "HELI_90_DEG", "VTAIL4", "CUSTOM",
];

/// Optional features, in bit order.
pub static FEATURE_NAMES: &[&str] = &[
    "PPM", "VBAT", "MOTOR_STOP", "SERVO_TILT", "FAILSAFE", "SONAR", "SPEKTRUM",
];

/// Detectable sensors, in bit order.
pub static SENSOR_NAMES: &[&str] = &["ACC", "BARO", "MAG", "SONAR", "GPS"];

/// Rc channel functions in map order: aileron, elevator, throttle, rudder, aux 1-4.
pub const RC_CHANNEL_LETTERS: &[u8; 8] = b"AETR1234";

/// Mask bit for a feature name, exact match ignoring case.
pub fn feature_bit(name: &str) -> Option<u32> {
    FEATURE_NAMES
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name))
        .map(|i| 1 << i)
}
