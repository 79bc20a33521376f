//! FlightConsole - Main entry point
//!
//! Host: the console runs on stdin/stdout against the simulated flight
//! system, the log stream is drained to stderr.
//!
//! ESP-IDF: the console runs on UART1 (GPIO17 TX, GPIO18 RX), parameters
//! are loaded from and saved to NVS, a restart request reboots the chip.

use core::fmt;
use std::time::Duration;

use flight_console::config::{load_from_nvs, save_to_nvs};
use flight_console::console::Transport;
use flight_console::logging::drain_into;
use flight_console::sim::SimSystem;
use flight_console::system::{CalibrationRoutine, FlightSystem, StateData, SystemStatus};
use flight_console::{con_info, con_warn, Console, FlightConfig, PollOutcome, CONSOLE_LOG};

/// Console poll period (100 Hz)
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Log sink on stderr
struct StderrLog;

impl fmt::Write for StderrLog {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        eprint!("{}", s);
        Ok(())
    }
}

/// Flight system of this binary: simulated sensors and mixer, real
/// parameter persistence where the target has it.
struct Board {
    sim: SimSystem,
}

impl FlightSystem for Board {
    fn write_params(&mut self, cfg: &FlightConfig) {
        match save_to_nvs(cfg) {
            Ok(()) => con_info!(CONSOLE_LOG, 0, "parameters saved"),
            Err(e) => con_warn!(CONSOLE_LOG, 0, "parameter save failed: {:?}", e),
        }
        self.sim.write_params(cfg);
    }

    fn reset_to_defaults(&mut self, cfg: &mut FlightConfig) {
        *cfg = FlightConfig::default();
        self.write_params(cfg);
    }

    fn feature_mask(&self) -> u32 {
        self.sim.feature_mask()
    }

    fn feature_set(&mut self, mask: u32) {
        self.sim.feature_set(mask);
    }

    fn feature_clear(&mut self, mask: u32) {
        self.sim.feature_clear(mask);
    }

    fn sensors_mask(&self) -> u32 {
        self.sim.sensors_mask()
    }

    fn load_mix(&mut self, mixer: u8, cfg: &mut FlightConfig) {
        self.sim.load_mix(mixer, cfg);
    }

    fn reload_mixer(&mut self, cfg: &FlightConfig) {
        self.sim.reload_mixer(cfg);
    }

    fn calibrate(&mut self, routine: CalibrationRoutine, cfg: &mut FlightConfig) {
        self.sim.calibrate(routine, cfg);
    }

    fn gyro_runtime_bias(&self) -> [i16; 3] {
        self.sim.gyro_runtime_bias()
    }

    fn state(&self) -> StateData {
        self.sim.state()
    }

    fn status(&self) -> SystemStatus {
        self.sim.status()
    }

    fn write_event_deltas(&self, out: &mut dyn Transport) {
        self.sim.write_event_deltas(out);
    }
}

/// Stored parameters, or defaults if there are none.
fn load_config() -> FlightConfig {
    let mut cfg = FlightConfig::default();
    match load_from_nvs(&mut cfg) {
        Ok(()) => con_info!(CONSOLE_LOG, 0, "parameters loaded"),
        Err(e) => {
            cfg = FlightConfig::default();
            con_warn!(CONSOLE_LOG, 0, "using default parameters: {:?}", e);
        }
    }
    cfg
}

/// Poll the console until it requests a restart.
fn run(transport: &mut dyn Transport) {
    let mut config = load_config();
    let mut board = Board { sim: SimSystem::new() };
    let mut console = Console::new();

    loop {
        let outcome = console.poll(transport, &mut config, &mut board);
        drain_into(&CONSOLE_LOG, &mut StderrLog);

        if outcome == PollOutcome::Restart {
            return;
        }

        board.sim.advance(POLL_INTERVAL.as_millis() as u32);
        std::thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::collections::VecDeque;
    use std::io::{Read, Write};
    use std::sync::{Arc, Mutex};

    use flight_console::console::Transport;

    /// Console transport on stdin/stdout.
    ///
    /// A reader thread moves stdin bytes into a shared queue; output goes
    /// straight to stdout.
    pub struct StdioTransport {
        rx: Arc<Mutex<VecDeque<u8>>>,
    }

    impl StdioTransport {
        pub fn spawn() -> Self {
            let rx = Arc::new(Mutex::new(VecDeque::new()));
            let queue = Arc::clone(&rx);
            std::thread::spawn(move || {
                let mut byte = [0u8; 1];
                let mut stdin = std::io::stdin();
                while let Ok(1) = stdin.read(&mut byte) {
                    match queue.lock() {
                        Ok(mut q) => q.push_back(byte[0]),
                        Err(_) => break,
                    }
                }
            });
            Self { rx }
        }
    }

    impl core::fmt::Write for StdioTransport {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let mut out = std::io::stdout().lock();
            out.write_all(s.as_bytes())
                .and_then(|_| out.flush())
                .map_err(|_| core::fmt::Error)
        }
    }

    impl Transport for StdioTransport {
        fn is_input_available(&self) -> bool {
            self.rx.lock().map(|q| !q.is_empty()).unwrap_or(false)
        }

        fn read_byte(&mut self) -> Option<u8> {
            self.rx.lock().ok().and_then(|mut q| q.pop_front())
        }

        fn write_byte(&mut self, byte: u8) {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(&[byte]).and_then(|_| out.flush());
        }

        fn is_output_queue_empty(&self) -> bool {
            true
        }
    }
}

#[cfg(target_os = "espidf")]
mod board {
    use esp_idf_svc::hal::delay::NON_BLOCK;
    use esp_idf_svc::hal::gpio::AnyIOPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{config::Config, UartDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys::EspError;

    use flight_console::console::Transport;

    const CONSOLE_BAUD: u32 = 115_200;

    /// Console transport on UART1.
    pub struct UartTransport {
        uart: UartDriver<'static>,
    }

    impl UartTransport {
        pub fn take() -> Result<Self, EspError> {
            let p = Peripherals::take()?;
            let config = Config::default().baudrate(Hertz(CONSOLE_BAUD));
            let uart = UartDriver::new(
                p.uart1,
                p.pins.gpio17,
                p.pins.gpio18,
                Option::<AnyIOPin>::None, // CTS
                Option::<AnyIOPin>::None, // RTS
                &config,
            )?;
            Ok(Self { uart })
        }
    }

    impl core::fmt::Write for UartTransport {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            self.uart.write(s.as_bytes()).map(|_| ()).map_err(|_| core::fmt::Error)
        }
    }

    impl Transport for UartTransport {
        fn is_input_available(&self) -> bool {
            self.uart.remaining_read().map(|n| n > 0).unwrap_or(false)
        }

        fn read_byte(&mut self) -> Option<u8> {
            let mut byte = [0u8; 1];
            match self.uart.read(&mut byte, NON_BLOCK) {
                Ok(1) => Some(byte[0]),
                _ => None,
            }
        }

        fn write_byte(&mut self, byte: u8) {
            let _ = self.uart.write(&[byte]);
        }

        fn is_output_queue_empty(&self) -> bool {
            self.uart.wait_tx_done(NON_BLOCK).is_ok()
        }
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    let mut transport = host::StdioTransport::spawn();
    run(&mut transport);
    println!();
    std::process::exit(0);
}

#[cfg(target_os = "espidf")]
fn main() {
    esp_idf_svc::sys::link_patches();

    match board::UartTransport::take() {
        Ok(mut transport) => run(&mut transport),
        Err(e) => eprintln!("console UART init failed: {:?}", e),
    }

    esp_idf_svc::hal::reset::restart();
}
