//! Byte transport the console runs on (UART, USB CDC, stdio).
//!
//! Text output goes through the [`core::fmt::Write`] supertrait, so
//! handlers use `write!(out, ...)` directly.

/// Half-duplex character stream.
pub trait Transport: core::fmt::Write {
    /// True if at least one received byte is waiting.
    fn is_input_available(&self) -> bool;

    /// Take one received byte.
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue one byte for transmission.
    fn write_byte(&mut self, byte: u8);

    /// True once everything queued has left the transmitter.
    fn is_output_queue_empty(&self) -> bool;
}

/// Upper bound on [`wait_output_drained`] polls.
pub const TX_DRAIN_SPIN_LIMIT: u32 = 100_000;

/// Spin until the output queue drains or the spin limit is hit.
///
/// Used between lines of long listings so they do not overrun the
/// transmit queue. Returns `false` if the limit was reached.
pub fn wait_output_drained(out: &mut dyn Transport) -> bool {
    for _ in 0..TX_DRAIN_SPIN_LIMIT {
        if out.is_output_queue_empty() {
            return true;
        }
        core::hint::spin_loop();
    }
    false
}
