//! Streaming telemetry
//!
//! Once armed, every poll emits one line for the last query byte the
//! operator sent. Sending another byte switches the stream, `#` stops it.

use super::transport::Transport;
use crate::system::{FlightSystem, StateData};

/// Query value after disarm; emits nothing.
pub const QUERY_IDLE: u8 = b'x';

/// Query byte that disarms the stream.
pub const QUERY_DISARM: u8 = b'#';

const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Result of one telemetry step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryStep {
    /// Not armed, nothing done
    Inactive,
    /// Armed; a line may or may not have been emitted
    Streaming,
    /// `#` received: stream stopped, caller reprints the prompt
    Disarmed,
}

/// Telemetry streamer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    armed: bool,
    query: u8,
}

impl Telemetry {
    pub const fn new() -> Self {
        Self { armed: false, query: 0 }
    }

    /// Start streaming; the stored query is kept.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Last query byte received
    pub fn query(&self) -> u8 {
        self.query
    }

    /// Run one poll step.
    ///
    /// Consumes at most one input byte as the new query, then emits the
    /// line for the current query.
    pub fn step(&mut self, transport: &mut dyn Transport, system: &dyn FlightSystem) -> TelemetryStep {
        if !self.armed {
            return TelemetryStep::Inactive;
        }

        if transport.is_input_available() {
            if let Some(byte) = transport.read_byte() {
                self.query = byte;
            }
        }

        let state = system.state();
        match self.query {
            QUERY_DISARM => {
                self.armed = false;
                self.query = QUERY_IDLE;
                return TelemetryStep::Disarmed;
            }
            b'a' => write_vector(transport, &state.accel),
            b'b' => {
                let _ = write!(transport, "{}\r\n", state.altitude);
            }
            b'g' => write_vector(transport, &state.gyro),
            b'm' => write_vector(transport, &state.mag),
            b'q' => write_vector(transport, &attitude_degrees(&state)),
            b't' => system.write_event_deltas(transport),
            _ => {}
        }

        TelemetryStep::Streaming
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

fn attitude_degrees(state: &StateData) -> [f32; 3] {
    [
        state.roll * RAD_TO_DEG,
        state.pitch * RAD_TO_DEG,
        state.heading * RAD_TO_DEG,
    ]
}

fn write_vector(out: &mut dyn Transport, v: &[f32; 3]) {
    let _ = write!(out, "{:.3},{:.3},{:.3}\r\n", v[0], v[1], v[2]);
}
