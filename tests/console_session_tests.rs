//! End-to-end console session tests
//!
//! Bytes go in through the mock transport, the console is polled like the
//! firmware main loop does, and the exact output bytes are checked.

use flight_console::config::{feature_bit, FlightConfig, MotorMix};
use flight_console::console::{Console, PollOutcome};
use flight_console::logging::{LogLevel, LogStream};
use flight_console::sim::{MockTransport, SimSystem};

const BANNER: &str = "\r\nEntering CLI Mode, type 'exit' to return, or 'help'\r\n\r\n# ";
const PROMPT: &str = "\r\n# ";

struct Rig {
    console: Console,
    io: MockTransport,
    config: FlightConfig,
    sim: SimSystem,
}

impl Rig {
    /// Console with the banner already consumed
    fn new(log: &'static LogStream) -> Self {
        let mut rig = Self {
            console: Console::with_log_stream(log),
            io: MockTransport::new(),
            config: FlightConfig::default(),
            sim: SimSystem::new(),
        };
        rig.poll();
        rig.io.clear_output();
        rig
    }

    fn poll(&mut self) -> PollOutcome {
        self.console.poll(&mut self.io, &mut self.config, &mut self.sim)
    }

    fn send(&mut self, input: &str) -> PollOutcome {
        self.io.push_input(input.as_bytes());
        self.poll()
    }

    fn take(&mut self) -> String {
        let out = self.io.output().to_string();
        self.io.clear_output();
        out
    }
}

#[test]
fn test_first_poll_prints_banner() {
    static LOG: LogStream = LogStream::new();
    let mut console = Console::with_log_stream(&LOG);
    let mut io = MockTransport::new();
    let mut config = FlightConfig::default();
    let mut sim = SimSystem::new();

    assert!(!console.is_active());
    assert_eq!(console.poll(&mut io, &mut config, &mut sim), PollOutcome::Idle);
    assert!(console.is_active());
    assert_eq!(io.output(), BANNER);

    io.clear_output();
    console.poll(&mut io, &mut config, &mut sim);
    assert_eq!(io.output(), "");

    let entry = LOG.drain().unwrap();
    assert_eq!(entry.level, LogLevel::Info);
    assert_eq!(entry.message(), "console session started");
}

#[test]
fn test_mixer_list_session() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    assert_eq!(rig.send("mixer list\r"), PollOutcome::Idle);
    assert_eq!(
        rig.take(),
        "mixer list\r\n\
         Available mixers: TRI QUADP QUADX BI GIMBAL Y6 HEX6P FLYING_WING Y4 HEX6X OCTOX8 \
         OCTOFLATP OCTOFLATX AIRPLANE HELI_120_CCPM HELI_90_DEG VTAIL4 CUSTOM \r\n\r\n# "
    );
    assert_eq!(rig.console.line(), "");
}

#[test]
fn test_feature_disable_session() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);
    let vbat = feature_bit("VBAT").unwrap();
    rig.sim.features = feature_bit("PPM").unwrap() | vbat;

    rig.send("feature -VBAT\r");
    assert_eq!(rig.sim.features & vbat, 0);
    assert_eq!(rig.sim.features, feature_bit("PPM").unwrap());
    assert!(rig.take().ends_with("\r\nDisabled VBAT\r\n\r\n# "));
}

#[test]
fn test_feature_list_after_disable() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);
    rig.sim.features = feature_bit("PPM").unwrap() | feature_bit("VBAT").unwrap();

    rig.send("feature\r");
    assert_eq!(rig.take(), "feature\r\nEnabled features: PPM VBAT \r\n\r\n# ");

    rig.send("feature -VBAT\r");
    rig.take();

    rig.send("feature\r");
    let out = rig.take();
    assert_eq!(out, "feature\r\nEnabled features: PPM \r\n\r\n# ");
    assert!(!out.contains("VBAT"));
}

#[test]
fn test_tab_completes_unique_command() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("he\t");
    assert_eq!(rig.console.line(), "help ");
    assert_eq!(rig.take(), "help ");
}

#[test]
fn test_tab_lists_ambiguous_matches() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("s?");
    assert_eq!(rig.console.line(), "s");
    assert_eq!(rig.take(), "s\r\x1b[Ksave\tset\tstatus\t\r\n# s");
}

#[test]
fn test_tab_on_empty_line_lists_all() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("\t");
    assert_eq!(
        rig.take(),
        "\r\x1b[Kcalibrate\tcmix\tdefaults\texit\tfeature\thelp\tmap\tmixer\tsave\tset\t\
         status\ttelemetry\tversion\t\r\n# "
    );
}

#[test]
fn test_completed_line_dispatches() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("ver\t\r");
    let out = rig.take();
    assert!(out.starts_with("version \r\nFlightConsole v"));
    assert!(out.ends_with(PROMPT));
}

#[test]
fn test_cmix_row_session() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("cmix 1 0.25 0.0 0.0 -1.0\r");
    assert_eq!(rig.config.custom_mixer[0], MotorMix::new(0.25, 0.0, 0.0, -1.0));
    assert!(rig.take().contains("#1:\t0.250\t0.000\t0.000\t-1.000\r\n"));

    // Listing shows the edited row and stops at the first unused one
    rig.send("cmix\r");
    let out = rig.take();
    assert!(out.starts_with("cmix\r\nCustom mixer: \r\nMotor\tThr\tRoll\tPitch\tYaw\r\n"));
    assert!(out.contains("#1:\t0.250\t0.000\t0.000\t-1.000\r\n"));
    assert!(!out.contains("#2:"));
    assert!(out.ends_with(PROMPT));
}

#[test]
fn test_set_is_idempotent() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("set escPwmRate=300\r");
    let first = rig.config.clone();
    let first_out = rig.take();

    rig.send("set escPwmRate=300\r");
    assert_eq!(rig.config, first);
    assert_eq!(rig.take(), first_out);
    assert_eq!(rig.config.esc_pwm_rate, 300);
}

#[test]
fn test_set_listing_is_idempotent() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("set\r");
    let first = rig.take();
    assert!(first.starts_with("set\r\nCurrent settings: \r\n"));
    assert!(first.contains("escPwmRate = 400\r\n"));

    rig.send("set\r");
    assert_eq!(rig.take(), first);
    assert_eq!(rig.config, FlightConfig::default());
}

#[test]
fn test_set_boundaries() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("set escPwmRate=498\r");
    assert_eq!(rig.config.esc_pwm_rate, 498);
    rig.send("set escPwmRate=50\r");
    assert_eq!(rig.config.esc_pwm_rate, 50);
    rig.take();

    rig.send("set escPwmRate=49\r");
    assert_eq!(rig.config.esc_pwm_rate, 50);
    assert_eq!(
        rig.take(),
        "set escPwmRate=49\r\nERR: Value assignment out of range\r\n\r\n# "
    );

    rig.send("set escPwmRate=499\r");
    assert_eq!(rig.config.esc_pwm_rate, 50);
}

#[test]
fn test_range_error_is_logged_with_code() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);
    while LOG.drain().is_some() {}

    rig.send("set yawDirection=2\r");

    let warnings: Vec<String> = std::iter::from_fn(|| LOG.drain())
        .filter(|e| e.level == LogLevel::Warn)
        .map(|e| e.message().to_string())
        .collect();
    assert!(warnings.iter().any(|m| m.starts_with("E04:")), "{:?}", warnings);
}

#[test]
fn test_unknown_command_keeps_session() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    assert_eq!(rig.send("foo\r"), PollOutcome::Idle);
    assert_eq!(rig.take(), "foo\r\nERR: Unknown command, try 'help'\r\n\r\n# ");
    assert!(rig.console.is_active());
}

#[test]
fn test_backspace_edits_line() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("mapx\x7f");
    assert_eq!(rig.console.line(), "map");
    assert_eq!(rig.take(), "mapx\x08 \x08");

    rig.send("\r");
    assert!(rig.take().contains("Current assignment: AETR1234\r\n"));
}

#[test]
fn test_blank_enter_does_nothing() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("\r\n   ");
    assert_eq!(rig.take(), "");
    assert_eq!(rig.console.line(), "");
}

#[test]
fn test_clear_screen() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("se\x0c");
    assert_eq!(rig.take(), "se\x1b[2J\x1b[1;1H\r\n# ");
    assert_eq!(rig.console.line(), "se");
}

#[test]
fn test_exit_requests_restart() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    assert_eq!(rig.send("exit\r"), PollOutcome::Restart);
    assert_eq!(
        rig.take(),
        "exit\r\n\r\nLeaving CLI mode...\r\nSaving...\r\nRebooting..."
    );
    assert!(!rig.console.is_active());
    assert_eq!(rig.sim.save_count, 1);
}

#[test]
fn test_eot_on_empty_line_exits() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    assert_eq!(rig.send("\x04"), PollOutcome::Restart);
    assert_eq!(rig.take(), "\r\nLeaving CLI mode...\r\nSaving...\r\nRebooting...");
    assert!(!rig.console.is_active());
}

#[test]
fn test_eot_with_text_is_ignored() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    assert_eq!(rig.send("ab\x04"), PollOutcome::Idle);
    assert_eq!(rig.console.line(), "ab");
    assert_eq!(rig.sim.save_count, 0);
}

#[test]
fn test_save_and_defaults_restart() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    assert_eq!(rig.send("save\r"), PollOutcome::Restart);
    assert!(rig.console.is_active());

    let mut rig = Rig::new(&LOG);
    rig.config.esc_pwm_rate = 100;
    assert_eq!(rig.send("defaults\r"), PollOutcome::Restart);
    assert_eq!(rig.config, FlightConfig::default());
}

#[test]
fn test_telemetry_streams_until_disarmed() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);
    rig.sim.state.accel = [1.0, 2.0, 3.0];
    rig.sim.state.altitude = 123;

    rig.send("telemetry\r");
    assert!(rig.console.telemetry().is_armed());
    assert_eq!(rig.take(), "telemetry\r\n\r\n# ");

    // No query yet: silent
    rig.poll();
    assert_eq!(rig.take(), "");

    rig.send("a");
    assert_eq!(rig.take(), "1.000,2.000,3.000\r\n");

    // Same query repeats every poll
    rig.poll();
    assert_eq!(rig.take(), "1.000,2.000,3.000\r\n");

    rig.send("b");
    assert_eq!(rig.take(), "123\r\n");

    rig.send("#");
    assert_eq!(rig.take(), PROMPT);
    assert!(!rig.console.telemetry().is_armed());
    assert_eq!(rig.console.telemetry().query(), b'x');

    rig.poll();
    assert_eq!(rig.take(), "");
}

#[test]
fn test_telemetry_attitude_in_degrees() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);
    rig.sim.state.roll = core::f32::consts::FRAC_PI_2;

    rig.send("telemetry\r");
    rig.take();
    rig.send("q");
    assert_eq!(rig.take(), "90.000,0.000,0.000\r\n");
}

#[test]
fn test_telemetry_query_byte_not_edited() {
    static LOG: LogStream = LogStream::new();
    let mut rig = Rig::new(&LOG);

    rig.send("telemetry\r");
    rig.take();

    // First byte is the query, the rest reaches the line editor
    rig.send("xhe");
    assert_eq!(rig.console.telemetry().query(), b'x');
    assert_eq!(rig.console.line(), "he");
    assert_eq!(rig.take(), "he");
}
