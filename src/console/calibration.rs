//! `calibrate` sub-commands
//!
//! Small unordered table, scanned linearly with an input-length bounded
//! prefix match: `g` selects `gyro`, `gyroR` selects `gyroRT`.

use super::commands::{CommandContext, CommandOutcome, CommandResult};
use super::parser::starts_with_ignore_case;
use super::transport::{wait_output_drained, Transport};
use super::{ConsoleError, Selector};
use crate::con_info;
use crate::system::CalibrationRoutine;

/// Calibration sub-command handler
pub type CalibrationHandler = fn(&mut CommandContext<'_>, &mut dyn Transport);

/// Calibration table entry
pub struct CalibrationEntry {
    pub name: &'static str,
    pub brief: &'static str,
    pub handler: CalibrationHandler,
}

pub static CALIBRATION_COMMANDS: &[CalibrationEntry] = &[
    CalibrationEntry { name: "accel", brief: "Placed level and fixed", handler: calibrate_accel },
    CalibrationEntry { name: "gyro", brief: "Temp compensation (15 min)", handler: calibrate_gyro },
    CalibrationEntry { name: "gyroRT", brief: "Placed fixed", handler: calibrate_gyro_runtime },
    CalibrationEntry { name: "help", brief: "", handler: calibration_help },
    CalibrationEntry { name: "mag", brief: "Rotate around all axis within 10 s", handler: calibrate_mag },
];

/// `calibrate` command: dump calibration data or run one routine.
pub fn cmd_calibrate(ctx: &mut CommandContext<'_>, args: &str, out: &mut dyn Transport) -> CommandResult {
    if args.is_empty() || args == "*" {
        print_calibration_data(ctx, out);
        return Ok(CommandOutcome::Continue);
    }

    let entry = CALIBRATION_COMMANDS
        .iter()
        .find(|e| starts_with_ignore_case(e.name, args))
        .ok_or(ConsoleError::InvalidSelector(Selector::Calibration))?;
    (entry.handler)(ctx, out);
    Ok(CommandOutcome::Continue)
}

fn print_calibration_data(ctx: &CommandContext<'_>, out: &mut dyn Transport) {
    let cfg = &*ctx.config;
    let rt = ctx.system.gyro_runtime_bias();

    let _ = out.write_str("Sensor calibration data: \r\n");
    let _ = write!(
        out,
        "ACCEL BIAS:\r\n{}, {}, {}\r\n",
        cfg.accel_bias[0], cfg.accel_bias[1], cfg.accel_bias[2]
    );
    let _ = write!(
        out,
        "GYRO TC BIAS:\r\n{}, {}, {}\r\n",
        cfg.gyro_tc_bias_slope[0], cfg.gyro_tc_bias_slope[1], cfg.gyro_tc_bias_slope[2]
    );
    let _ = write!(
        out,
        "GYRO TC BIAS INTERCEPT:\r\n{}, {}, {}\r\n",
        cfg.gyro_tc_bias_intercept[0], cfg.gyro_tc_bias_intercept[1], cfg.gyro_tc_bias_intercept[2]
    );
    let _ = write!(out, "GYRO RT BIAS:\r\n{}, {}, {}\r\n", rt[0], rt[1], rt[2]);
    let _ = write!(
        out,
        "MAG BIAS:\r\n{}, {}, {}\r\n",
        cfg.mag_bias[0], cfg.mag_bias[1], cfg.mag_bias[2]
    );
}

/// Announce and run one routine; the routine itself blocks the loop.
fn run_routine(ctx: &mut CommandContext<'_>, out: &mut dyn Transport, routine: CalibrationRoutine, brief: &str) {
    let _ = write!(out, "Calibrating: {}\r\n", brief);
    con_info!(ctx.log, ctx.tick, "calibration {:?} started", routine);
    ctx.system.calibrate(routine, ctx.config);
    let _ = out.write_str("Done\r\n");
}

fn calibrate_accel(ctx: &mut CommandContext<'_>, out: &mut dyn Transport) {
    run_routine(ctx, out, CalibrationRoutine::Accel, "Placed level and fixed");
}

fn calibrate_gyro(ctx: &mut CommandContext<'_>, out: &mut dyn Transport) {
    run_routine(ctx, out, CalibrationRoutine::GyroTemperature, "Temp compensation (15 min)");
}

fn calibrate_gyro_runtime(ctx: &mut CommandContext<'_>, out: &mut dyn Transport) {
    run_routine(ctx, out, CalibrationRoutine::GyroRuntime, "Placed fixed");
}

fn calibrate_mag(ctx: &mut CommandContext<'_>, out: &mut dyn Transport) {
    run_routine(ctx, out, CalibrationRoutine::Mag, "Rotate around all axis within 10 s");
}

fn calibration_help(_ctx: &mut CommandContext<'_>, out: &mut dyn Transport) {
    let _ = out.write_str("Available calibration commands: \r\n");
    for e in CALIBRATION_COMMANDS {
        let _ = write!(out, "{}\t{}\r\n", e.name, e.brief);
        wait_output_drained(out);
    }
}
