//! # FlightConsole
//!
//! Serial configuration console for a multirotor flight controller.
//!
//! ## Architecture
//!
//! The console is a polled state machine. The firmware main loop owns the
//! [`FlightConfig`] and a [`FlightSystem`] implementation and lends both to
//! [`Console::poll`] once per cycle:
//! - Input bytes are edited into a fixed line buffer, tab completes
//! - Complete lines dispatch through a sorted command table
//! - `set` reaches configuration fields through a typed parameter registry
//! - Everything else (storage, mixer, sensors) sits behind [`FlightSystem`]
//!
//! No heap, no locks, no blocking beyond a bounded transmit drain.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod console;
pub mod log_globals;
pub mod logging;
pub mod sim;
pub mod system;

pub use config::FlightConfig;
pub use console::{Console, PollOutcome, Transport};
pub use log_globals::CONSOLE_LOG;
pub use logging::LogStream;
pub use system::FlightSystem;
