//! Serial console for configuration and diagnostics
//!
//! Polled once per scheduler cycle - no dedicated task.
//! Zero heap allocation - all static buffers.

pub mod calibration;
pub mod commands;
pub mod completion;
#[allow(clippy::module_inception)]
pub mod console;
pub mod error;
pub mod line_buffer;
pub mod parser;
pub mod telemetry;
pub mod transport;

pub use commands::{command_names, execute, find_command, CommandContext, CommandOutcome, COMMANDS};
pub use completion::{complete, Completion};
pub use console::{Console, PollOutcome, Session, PROMPT, VERSION};
pub use error::{ConsoleError, Selector};
pub use line_buffer::{EditorEvent, LineBuffer, LINE_SIZE};
pub use telemetry::Telemetry;
pub use transport::Transport;
