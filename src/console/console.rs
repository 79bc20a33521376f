//! Console session and poll entry point

use heapless::String;

use super::commands::{self, command_names, CommandContext, CommandOutcome, COMMANDS};
use super::completion;
use super::line_buffer::{EditorEvent, LineBuffer, LINE_SIZE};
use super::telemetry::{Telemetry, TelemetryStep};
use super::transport::Transport;
use crate::config::FlightConfig;
use crate::log_globals::CONSOLE_LOG;
use crate::logging::LogStream;
use crate::system::FlightSystem;
use crate::{con_debug, con_info, con_warn};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Prompt printed before each input line
pub const PROMPT: &str = "\r\n# ";

const BANNER: &str = "\r\nEntering CLI Mode, type 'exit' to return, or 'help'\r\n";
const CLEAR_LINE: &str = "\r\x1b[K";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";
const ERASE_CHAR: &str = "\x08 \x08";

/// What the caller must do after a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing to do, poll again next cycle
    Idle,
    /// Settings were saved or reset: restart the system
    Restart,
}

/// Session state shared with command handlers
#[derive(Debug, Default)]
pub struct Session {
    /// Interactive mode; the banner is printed on the inactive to active edge
    pub active: bool,
    pub telemetry: Telemetry,
}

impl Session {
    pub const fn new() -> Self {
        Self { active: false, telemetry: Telemetry::new() }
    }
}

/// Console state machine
pub struct Console {
    line: LineBuffer,
    session: Session,
    tick: u32,
    log: &'static LogStream,
}

impl Console {
    /// Create a console logging to [`CONSOLE_LOG`]
    pub fn new() -> Self {
        Self::with_log_stream(&CONSOLE_LOG)
    }

    /// Create a console logging to `log`
    pub fn with_log_stream(log: &'static LogStream) -> Self {
        Self {
            line: LineBuffer::new(),
            session: Session::new(),
            tick: 0,
            log,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.active
    }

    /// Current (unsubmitted) input line
    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.session.telemetry
    }

    /// Process everything the transport has buffered.
    ///
    /// Called once per scheduler cycle; never blocks except for the bounded
    /// output drain of long listings.
    pub fn poll(
        &mut self,
        transport: &mut dyn Transport,
        config: &mut FlightConfig,
        system: &mut dyn FlightSystem,
    ) -> PollOutcome {
        self.tick = self.tick.wrapping_add(1);

        if !self.session.active {
            self.session.active = true;
            let _ = transport.write_str(BANNER);
            self.print_prompt(transport);
            con_info!(self.log, self.tick, "console session started");
        }

        if self.session.telemetry.step(transport, &*system) == TelemetryStep::Disarmed {
            self.print_prompt(transport);
            con_info!(self.log, self.tick, "telemetry disarmed");
        }

        while transport.is_input_available() {
            let Some(byte) = transport.read_byte() else {
                break;
            };

            match self.line.feed(byte) {
                EditorEvent::Appended(b) => transport.write_byte(b),
                EditorEvent::Erased => {
                    let _ = transport.write_str(ERASE_CHAR);
                }
                EditorEvent::Complete => self.complete(transport),
                EditorEvent::ClearScreen => {
                    let _ = transport.write_str(CLEAR_SCREEN);
                    self.print_prompt(transport);
                }
                EditorEvent::LineReady => {
                    if self.dispatch(transport, config, system) == PollOutcome::Restart {
                        return PollOutcome::Restart;
                    }
                }
                EditorEvent::Abort => {
                    self.line.clear();
                    if self.execute("exit", transport, config, system) == CommandOutcome::Restart {
                        return PollOutcome::Restart;
                    }
                }
                EditorEvent::Ignored => {}
            }
        }

        PollOutcome::Idle
    }

    /// Print the prompt
    pub fn print_prompt(&self, out: &mut dyn Transport) {
        let _ = out.write_str(PROMPT);
    }

    fn complete(&mut self, out: &mut dyn Transport) {
        let result = completion::complete(&mut self.line, command_names());

        let echo_from = if result.redraw {
            let _ = out.write_str(CLEAR_LINE);
            if let Some(range) = &result.candidates {
                for cmd in &COMMANDS[range.clone()] {
                    let _ = out.write_str(cmd.name);
                    out.write_byte(b'\t');
                }
            }
            self.print_prompt(out);
            0
        } else {
            result.start
        };

        for &b in &self.line.as_bytes()[echo_from..] {
            out.write_byte(b);
        }
    }

    fn dispatch(
        &mut self,
        transport: &mut dyn Transport,
        config: &mut FlightConfig,
        system: &mut dyn FlightSystem,
    ) -> PollOutcome {
        let _ = transport.write_str("\r\n");

        // Same capacity as the line buffer, cannot fail
        let mut line: String<LINE_SIZE> = String::new();
        let _ = line.push_str(self.line.as_str());
        self.line.clear();

        if self.execute(&line, transport, config, system) == CommandOutcome::Restart {
            return PollOutcome::Restart;
        }

        if self.session.active {
            self.print_prompt(transport);
        }
        PollOutcome::Idle
    }

    fn execute(
        &mut self,
        line: &str,
        transport: &mut dyn Transport,
        config: &mut FlightConfig,
        system: &mut dyn FlightSystem,
    ) -> CommandOutcome {
        con_debug!(self.log, self.tick, "> {}", line);

        let mut ctx = CommandContext {
            config,
            system,
            session: &mut self.session,
            log: self.log,
            tick: self.tick,
        };

        match commands::execute(&mut ctx, line, transport) {
            Ok(outcome) => outcome,
            Err(e) => {
                let _ = write!(transport, "{}\r\n", e);
                con_warn!(self.log, self.tick, "{}: {} ({})", e.code(), e.message(), line);
                CommandOutcome::Continue
            }
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
