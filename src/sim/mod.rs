//! Simulated collaborators
//!
//! In-memory stand-ins for the serial port and the rest of the flight
//! controller, used by the host binary and by tests.

pub mod system;
pub mod transport;

pub use system::{preset, SimSystem, SENSOR_ACC, SENSOR_BARO, SENSOR_MAG};
pub use transport::MockTransport;
