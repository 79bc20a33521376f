//! In-memory transport for tests and the host binary

use heapless::{Deque, Vec};

use crate::console::Transport;

/// Receive queue capacity
pub const RX_CAPACITY: usize = 256;

/// Transmit buffer capacity; large enough for a full `set *` listing
pub const TX_CAPACITY: usize = 8192;

/// Mock transport
///
/// Received bytes are injected with [`push_input`](Self::push_input),
/// everything the console writes accumulates until cleared. Bytes beyond
/// either capacity are dropped and counted.
#[derive(Debug, Default)]
pub struct MockTransport {
    rx: Deque<u8, RX_CAPACITY>,
    tx: Vec<u8, TX_CAPACITY>,
    dropped_rx: usize,
    dropped_tx: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject received bytes. Returns how many were queued.
    pub fn push_input(&mut self, data: &[u8]) -> usize {
        let mut queued = 0;
        for &b in data {
            if self.rx.push_back(b).is_err() {
                self.dropped_rx += data.len() - queued;
                break;
            }
            queued += 1;
        }
        queued
    }

    /// Transmitted data as text (empty if not UTF-8)
    pub fn output(&self) -> &str {
        core::str::from_utf8(&self.tx).unwrap_or("")
    }

    /// Clear transmit buffer
    pub fn clear_output(&mut self) {
        self.tx.clear();
    }

    pub fn dropped_rx(&self) -> usize {
        self.dropped_rx
    }

    pub fn dropped_tx(&self) -> usize {
        self.dropped_tx
    }
}

impl core::fmt::Write for MockTransport {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
        Ok(())
    }
}

impl Transport for MockTransport {
    fn is_input_available(&self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write_byte(&mut self, byte: u8) {
        if self.tx.push(byte).is_err() {
            self.dropped_tx += 1;
        }
    }

    fn is_output_queue_empty(&self) -> bool {
        true
    }
}
