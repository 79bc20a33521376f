//! Command table and handlers
//!
//! The table is sorted by name and looked up with a binary search. The
//! comparison only looks at as many bytes of the line as the table name
//! has, ignoring case, so a line matches an entry when it *starts with the
//! full name*: `set` and `settings` both reach `set` (with `ings` left
//! over as argument), while `se` matches nothing. Abbreviations are the
//! business of tab completion, not of lookup.

use core::cmp::Ordering;

use super::calibration::cmd_calibrate;
use super::console::{Session, VERSION};
use super::parser::{find_by_prefix, parse_float, parse_int, starts_with_ignore_case};
use super::transport::{wait_output_drained, Transport};
use super::{ConsoleError, Selector};
use crate::config::{
    find_assignment_target, find_param, format_value, set_value, FlightConfig, FEATURE_NAMES, MAX_MOTORS, MIXER_NAMES,
    PARAMS, RC_CHANNEL_LETTERS, RC_CHANNELS, SENSOR_NAMES,
};
use crate::logging::LogStream;
use crate::system::FlightSystem;
use crate::{con_info, con_warn};

/// What the owner of the console must do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Keep the session going
    Continue,
    /// Restart the system (settings were saved or reset)
    Restart,
}

/// Handler result
pub type CommandResult = Result<CommandOutcome, ConsoleError>;

/// Everything a handler may touch during one dispatch
pub struct CommandContext<'a> {
    pub config: &'a mut FlightConfig,
    pub system: &'a mut dyn FlightSystem,
    pub session: &'a mut Session,
    pub log: &'static LogStream,
    /// Console poll tick, for log timestamps
    pub tick: u32,
}

/// Command handler: context, argument text after the name, output
pub type CommandHandler = fn(&mut CommandContext<'_>, &str, &mut dyn Transport) -> CommandResult;

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub brief: &'static str,
    pub handler: CommandHandler,
}

/// All available commands, sorted a..z (lookup and completion rely on it)
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "calibrate", brief: "sensor calibration", handler: cmd_calibrate },
    CommandDescriptor { name: "cmix", brief: "design custom mixer", handler: cmd_cmix },
    CommandDescriptor { name: "defaults", brief: "reset to defaults and reboot", handler: cmd_defaults },
    CommandDescriptor { name: "exit", brief: "", handler: cmd_exit },
    CommandDescriptor { name: "feature", brief: "list or -val or val", handler: cmd_feature },
    CommandDescriptor { name: "help", brief: "", handler: cmd_help },
    CommandDescriptor { name: "map", brief: "mapping of rc channel order", handler: cmd_map },
    CommandDescriptor { name: "mixer", brief: "mixer name or list", handler: cmd_mixer },
    CommandDescriptor { name: "save", brief: "save and reboot", handler: cmd_save },
    CommandDescriptor { name: "set", brief: "name=value or blank or * for list", handler: cmd_set },
    CommandDescriptor { name: "status", brief: "show system status", handler: cmd_status },
    CommandDescriptor { name: "telemetry", brief: "", handler: cmd_telemetry },
    CommandDescriptor { name: "version", brief: "", handler: cmd_version },
];

/// Order of table entry `name` against `line`, over `name.len()` bytes.
///
/// Bytes missing from `line` compare as NUL, case is ignored.
fn compare_entry(name: &str, line: &str) -> Ordering {
    let line = line.as_bytes();
    for (i, &n) in name.as_bytes().iter().enumerate() {
        let l = line.get(i).copied().unwrap_or(0);
        match n.to_ascii_lowercase().cmp(&l.to_ascii_lowercase()) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

/// Resolve a complete input line to its command entry.
pub fn find_command(line: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS
        .binary_search_by(|c| compare_entry(c.name, line))
        .ok()
        .map(|idx| &COMMANDS[idx])
}

/// Execute a complete input line.
///
/// The handler receives the text after the command name and one
/// separator byte (empty if there is none).
pub fn execute(ctx: &mut CommandContext<'_>, line: &str, out: &mut dyn Transport) -> CommandResult {
    let cmd = find_command(line).ok_or(ConsoleError::UnknownCommand)?;
    let args = line.get(cmd.name.len() + 1..).unwrap_or("");
    (cmd.handler)(ctx, args, out)
}

/// Get all command names for completion
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|c| c.name)
}

// --- Command Implementations ---

fn cmd_cmix(ctx: &mut CommandContext<'_>, args: &str, out: &mut dyn Transport) -> CommandResult {
    if args.is_empty() {
        print_custom_mixer(ctx.config, out);
        return Ok(CommandOutcome::Continue);
    }

    if starts_with_ignore_case(args, "load") {
        if let Some((_, name)) = args.split_once(' ') {
            let idx = find_by_prefix(MIXER_NAMES, name)
                .ok_or(ConsoleError::InvalidSelector(Selector::Mixer))?;
            ctx.system.load_mix(idx as u8 + 1, ctx.config);
            let _ = write!(out, "Loaded {} mix...\r\n", MIXER_NAMES[idx]);
            print_custom_mixer(ctx.config, out);
        }
        return Ok(CommandOutcome::Continue);
    }

    let mut fields = args.split(' ');
    let motor = parse_int(fields.next().unwrap_or(""));
    if motor < 1 || motor as usize > MAX_MOTORS {
        return Err(ConsoleError::InvalidMotorIndex);
    }

    // Fields are stored as they are found; a short row stays partially written
    let row = &mut ctx.config.custom_mixer[motor as usize - 1];
    let mut found = 0;
    for (slot, text) in [&mut row.throttle, &mut row.roll, &mut row.pitch, &mut row.yaw]
        .into_iter()
        .zip(fields)
    {
        *slot = parse_float(text);
        found += 1;
    }

    if found != 4 {
        return Err(ConsoleError::MalformedArguments);
    }

    print_custom_mixer(ctx.config, out);
    Ok(CommandOutcome::Continue)
}

/// Print the custom mixer up to the first row without throttle, plus a
/// check that roll, pitch and yaw columns each sum to zero.
fn print_custom_mixer(cfg: &FlightConfig, out: &mut dyn Transport) {
    let _ = out.write_str("Custom mixer: \r\nMotor\tThr\tRoll\tPitch\tYaw\r\n");

    let mut sum = [0.0f32; 3];
    for (i, mix) in cfg.custom_mixer.iter().take_while(|m| m.throttle != 0.0).enumerate() {
        let _ = write!(
            out,
            "#{}:\t{:.3}\t{:.3}\t{:.3}\t{:.3}\r\n",
            i + 1,
            mix.throttle,
            mix.roll,
            mix.pitch,
            mix.yaw
        );
        sum[0] += mix.roll;
        sum[1] += mix.pitch;
        sum[2] += mix.yaw;
    }

    let _ = out.write_str("Sanity check:\t");
    for s in sum {
        let _ = out.write_str(if s.abs() > 0.01 { "NG\t" } else { "OK\t" });
    }
    let _ = out.write_str("\r\n");
}

fn cmd_defaults(ctx: &mut CommandContext<'_>, _args: &str, out: &mut dyn Transport) -> CommandResult {
    let _ = out.write_str("Resetting to defaults...\r\n");
    ctx.system.reset_to_defaults(ctx.config);
    let _ = out.write_str("Rebooting...");
    con_info!(ctx.log, ctx.tick, "defaults restored, restart requested");
    Ok(CommandOutcome::Restart)
}

fn cmd_exit(ctx: &mut CommandContext<'_>, args: &str, out: &mut dyn Transport) -> CommandResult {
    let _ = out.write_str("\r\nLeaving CLI mode...\r\n");
    ctx.session.active = false;
    con_info!(ctx.log, ctx.tick, "leaving console");
    cmd_save(ctx, args, out)
}

fn cmd_feature(ctx: &mut CommandContext<'_>, args: &str, out: &mut dyn Transport) -> CommandResult {
    let mask = ctx.system.feature_mask();

    if args.is_empty() {
        let _ = out.write_str("Enabled features: ");
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            if mask & (1 << i) != 0 {
                let _ = write!(out, "{} ", name);
            }
        }
        let _ = out.write_str("\r\n");
    } else if starts_with_ignore_case("list", args) {
        let _ = out.write_str("Available features: ");
        for name in FEATURE_NAMES {
            let _ = write!(out, "{} ", name);
        }
        let _ = out.write_str("\r\n");
    } else {
        let (remove, name) = match args.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, args),
        };

        let idx = find_by_prefix(FEATURE_NAMES, name)
            .ok_or(ConsoleError::InvalidSelector(Selector::Feature))?;
        if remove {
            ctx.system.feature_clear(1 << idx);
            let _ = out.write_str("Disabled ");
        } else {
            ctx.system.feature_set(1 << idx);
            let _ = out.write_str("Enabled ");
        }
        let _ = write!(out, "{}\r\n", FEATURE_NAMES[idx]);
        con_info!(ctx.log, ctx.tick, "feature {} {}", FEATURE_NAMES[idx], if remove { "off" } else { "on" });
    }

    Ok(CommandOutcome::Continue)
}

fn cmd_help(_ctx: &mut CommandContext<'_>, _args: &str, out: &mut dyn Transport) -> CommandResult {
    let _ = out.write_str("Available commands:\r\n");
    for c in COMMANDS {
        let _ = write!(out, "{}\t{}\r\n", c.name, c.brief);
        wait_output_drained(out);
    }
    Ok(CommandOutcome::Continue)
}

fn cmd_map(ctx: &mut CommandContext<'_>, args: &str, out: &mut dyn Transport) -> CommandResult {
    if args.len() == RC_CHANNELS {
        let mut order = [0u8; RC_CHANNELS];
        order.copy_from_slice(args.as_bytes());
        order.make_ascii_uppercase();

        for (i, c) in order.iter().enumerate() {
            if !RC_CHANNEL_LETTERS.contains(c) || order[i + 1..].contains(c) {
                return Err(ConsoleError::InvalidChannelMap);
            }
        }

        // Letter at input position i: that function is read from channel i
        for (channel, c) in order.iter().enumerate() {
            if let Some(function) = RC_CHANNEL_LETTERS.iter().position(|l| l == c) {
                ctx.config.rc_map[function] = channel as u8;
            }
        }
        con_info!(ctx.log, ctx.tick, "rc map updated");
    }

    let mut assignment = [b'-'; RC_CHANNELS];
    for (function, &channel) in ctx.config.rc_map.iter().enumerate() {
        if let Some(slot) = assignment.get_mut(channel as usize) {
            *slot = RC_CHANNEL_LETTERS[function];
        }
    }
    let _ = write!(
        out,
        "Current assignment: {}\r\n",
        core::str::from_utf8(&assignment).unwrap_or("")
    );
    Ok(CommandOutcome::Continue)
}

fn cmd_mixer(ctx: &mut CommandContext<'_>, args: &str, out: &mut dyn Transport) -> CommandResult {
    if args.is_empty() {
        let _ = write!(out, "Current mixer: {}\r\n", ctx.config.mixer_name().unwrap_or("unknown"));
        return Ok(CommandOutcome::Continue);
    } else if starts_with_ignore_case("list", args) {
        let _ = out.write_str("Available mixers: ");
        for name in MIXER_NAMES {
            let _ = write!(out, "{} ", name);
        }
        let _ = out.write_str("\r\n");
        return Ok(CommandOutcome::Continue);
    }

    let idx = find_by_prefix(MIXER_NAMES, args).ok_or(ConsoleError::InvalidSelector(Selector::Mixer))?;
    ctx.config.mixer_configuration = idx as u8 + 1;
    ctx.system.reload_mixer(ctx.config);
    let _ = write!(out, "Mixer set to {}\r\n", MIXER_NAMES[idx]);
    con_info!(ctx.log, ctx.tick, "mixer {}", MIXER_NAMES[idx]);
    Ok(CommandOutcome::Continue)
}

fn cmd_save(ctx: &mut CommandContext<'_>, _args: &str, out: &mut dyn Transport) -> CommandResult {
    let _ = out.write_str("Saving...");
    ctx.system.write_params(ctx.config);
    let _ = out.write_str("\r\nRebooting...");
    con_info!(ctx.log, ctx.tick, "settings saved, restart requested");
    Ok(CommandOutcome::Restart)
}

fn cmd_set(ctx: &mut CommandContext<'_>, args: &str, out: &mut dyn Transport) -> CommandResult {
    if args.is_empty() || args == "*" {
        // `*` adds min/max to every line, for configurator GUIs
        let full = !args.is_empty();
        let _ = out.write_str("Current settings: \r\n");
        for p in PARAMS {
            let _ = write!(out, "{} = {}\r\n", p.name, format_value(p, ctx.config, full));
            wait_output_drained(out);
        }
    } else if let Some((_, value)) = args.split_once('=') {
        let param = find_assignment_target(args).ok_or(ConsoleError::UnknownVariable)?;
        match set_value(param, ctx.config, value) {
            Ok(_) => {
                let _ = write!(out, "{} set to {}\r\n", param.name, format_value(param, ctx.config, false));
                con_info!(ctx.log, ctx.tick, "{} = {}", param.name, format_value(param, ctx.config, false));
            }
            Err(e) => {
                con_warn!(ctx.log, ctx.tick, "{} rejected '{}'", param.name, value.trim());
                return Err(e.into());
            }
        }
    } else {
        let param = find_param(args.trim()).ok_or(ConsoleError::UnknownVariable)?;
        let _ = write!(out, "{} = {}\r\n", param.name, format_value(param, ctx.config, true));
    }

    Ok(CommandOutcome::Continue)
}

fn cmd_status(ctx: &mut CommandContext<'_>, _args: &str, out: &mut dyn Transport) -> CommandResult {
    let status = ctx.system.status();

    let _ = write!(
        out,
        "System Uptime: {} seconds, Voltage: {:.2} ({}S battery)\r\n",
        status.uptime_ms / 1000,
        status.battery_voltage,
        status.battery_cells
    );

    let mask = ctx.system.sensors_mask();
    let _ = out.write_str("Detected sensors: ");
    for (i, name) in SENSOR_NAMES.iter().enumerate() {
        if mask & (1 << i) != 0 {
            let _ = write!(out, "{} ", name);
        }
    }
    let _ = out.write_str("\r\n");

    let _ = write!(
        out,
        "Cycle Time: {}, i2c Errors: {}\r\n",
        status.cycle_time_us, status.i2c_errors
    );
    Ok(CommandOutcome::Continue)
}

fn cmd_telemetry(ctx: &mut CommandContext<'_>, _args: &str, _out: &mut dyn Transport) -> CommandResult {
    ctx.session.telemetry.arm();
    con_info!(ctx.log, ctx.tick, "telemetry armed");
    Ok(CommandOutcome::Continue)
}

fn cmd_version(_ctx: &mut CommandContext<'_>, _args: &str, out: &mut dyn Transport) -> CommandResult {
    let _ = write!(out, "{}\r\n", VERSION);
    Ok(CommandOutcome::Continue)
}
