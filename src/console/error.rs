//! Console error types

use crate::config::{ParamError, MAX_MOTORS};

/// Name table an argument failed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Mixer,
    Feature,
    Calibration,
}

impl Selector {
    /// Table name as shown to the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mixer => "mixer type",
            Self::Feature => "feature name",
            Self::Calibration => "calibration command",
        }
    }
}

/// Console error with code and message.
///
/// Every variant is local to one command: it is reported inline and the
/// session continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// E01: No command table entry matches
    UnknownCommand,
    /// E02: Argument matches no entry of a name sub-table
    InvalidSelector(Selector),
    /// E03: `set` names no known parameter
    UnknownVariable,
    /// E04: Value out of allowed range, field left unmodified
    OutOfRange,
    /// E05: Wrong number of fields for a multi-field command
    MalformedArguments,
    /// E06: Custom mixer row outside 1..=MAX_MOTORS
    InvalidMotorIndex,
    /// E07: Channel map is not a permutation of AETR1234
    InvalidChannelMap,
}

impl ConsoleError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::InvalidSelector(_) => "E02",
            Self::UnknownVariable => "E03",
            Self::OutOfRange => "E04",
            Self::MalformedArguments => "E05",
            Self::InvalidMotorIndex => "E06",
            Self::InvalidChannelMap => "E07",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "Unknown command, try 'help'",
            Self::InvalidSelector(_) => "Invalid",
            Self::UnknownVariable => "Unknown variable name",
            Self::OutOfRange => "Value assignment out of range",
            Self::MalformedArguments => "Wrong number of arguments, needs idx thr roll pitch yaw",
            Self::InvalidMotorIndex => "Motor number must be between 1 and",
            Self::InvalidChannelMap => "Must be any order of AETR1234",
        }
    }
}

impl core::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidSelector(table) => write!(f, "ERR: {} {}", self.message(), table.as_str()),
            Self::InvalidMotorIndex => write!(f, "ERR: {} {}", self.message(), MAX_MOTORS),
            _ => write!(f, "ERR: {}", self.message()),
        }
    }
}

impl From<ParamError> for ConsoleError {
    fn from(e: ParamError) -> Self {
        match e {
            ParamError::OutOfRange => ConsoleError::OutOfRange,
        }
    }
}
