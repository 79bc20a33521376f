//! Non-blocking logging for the configuration console.
//!
//! # Architecture
//!
//! ```text
//! Console poll           LogStream            Log drain
//! ────────────           ─────────            ─────────
//!
//! con_log!() ─────────▶ [L0][L1][L2] ──────▶ stderr / UART
//! never blocks            lock-free           at leisure
//! ```
//!
//! # Rules
//!
//! - The poll path shall never block on log output
//! - Messages may be dropped if the ring is full (counted in `dropped()`)
//! - Timestamps are console poll ticks, not wall time

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 120;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
#[repr(C)]
pub struct LogEntry {
    /// Console poll tick at which the entry was produced.
    pub tick: u32,
    /// Log level.
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        tick: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text (lossy: invalid UTF-8 yields a placeholder).
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free log stream (multiple producers, single consumer).
///
/// - Producers reserve slots with a CAS on the write index
/// - A slot is published through its ready flag once the payload is written
/// - Push never blocks (drops message if full)
/// - Drain runs wherever the owner decides
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    ready: [AtomicBool; N],
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: Multiple producers (coordinated via atomics), single consumer.
// Slots are reserved through compare_exchange on write_idx and handed to
// the consumer through the per-slot ready flag.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            ready: [const { AtomicBool::new(false) }; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry (never blocks).
    ///
    /// Returns `true` if message was queued, `false` if dropped (ring full).
    #[inline]
    pub fn push(&self, tick: u32, level: LogLevel, msg: &[u8]) -> bool {
        let read = self.read_idx.load(Ordering::Acquire);
        let mut write = self.write_idx.load(Ordering::Acquire);

        // Reserve a slot only if one is free, so a full ring never
        // advances the write index past unread entries.
        loop {
            if write.wrapping_sub(read) >= N as u32 {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return false;
            }
            match self.write_idx.compare_exchange_weak(
                write,
                write.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(current) => write = current,
            }
        }

        let idx = (write as usize) & Self::MASK;

        // SAFETY: the CAS above hands each producer a unique slot.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            entry.tick = tick;
            entry.level = level;
            entry.len = msg.len().min(MAX_MSG_LEN) as u8;
            entry.msg[..entry.len as usize].copy_from_slice(&msg[..entry.len as usize]);
        }
        self.ready[idx].store(true, Ordering::Release);

        true
    }

    /// Drain next log entry.
    ///
    /// Returns `None` if no entries available, or if the oldest reserved
    /// slot is still being written by its producer.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;
        if !self.ready[idx].load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: Single consumer; the ready flag orders the producer's writes
        let entry = unsafe { (*self.entries.get())[idx] };

        // Free the slot before a producer can reserve it again
        self.ready[idx].store(false, Ordering::Relaxed);
        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Check if there are entries to drain.
    #[inline]
    pub fn has_entries(&self) -> bool {
        self.pending() != 0
    }

    /// Get number of entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer.
///
/// Returns the number of bytes written. Output past the buffer is cut.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl<'a> Write for BufWriter<'a> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Drain every pending entry into `out`.
///
/// Format: `[tick] LEVEL: message\r\n`. Returns the number of entries written.
pub fn drain_into<const N: usize>(stream: &LogStream<N>, out: &mut dyn core::fmt::Write) -> usize {
    let mut count = 0;
    while let Some(entry) = stream.drain() {
        let _ = write!(
            out,
            "[{:8}] {}: {}\r\n",
            entry.tick,
            entry.level.as_str(),
            entry.message()
        );
        count += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let _ = write!(out, "[--------] WARN: {} log messages dropped\r\n", dropped);
        stream.reset_dropped();
    }
    count
}


/// Console log macro.
///
/// # Example
///
/// ```ignore
/// con_log!(LogLevel::Info, stream, tick, "dispatch {}", name);
/// ```
#[macro_export]
macro_rules! con_log {
    ($level:expr, $stream:expr, $tick:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($tick, $level, &buf[..len]);
    }};
}

/// Info log.
#[macro_export]
macro_rules! con_info {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::con_log!($crate::logging::LogLevel::Info, $stream, $tick, $($arg)*)
    };
}

/// Warning log.
#[macro_export]
macro_rules! con_warn {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::con_log!($crate::logging::LogLevel::Warn, $stream, $tick, $($arg)*)
    };
}

/// Error log.
#[macro_export]
macro_rules! con_error {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::con_log!($crate::logging::LogLevel::Error, $stream, $tick, $($arg)*)
    };
}

/// Debug log.
#[macro_export]
macro_rules! con_debug {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::con_log!($crate::logging::LogLevel::Debug, $stream, $tick, $($arg)*)
    };
}

/// Trace log (maximum verbosity).
#[macro_export]
macro_rules! con_trace {
    ($stream:expr, $tick:expr, $($arg:tt)*) => {
        $crate::con_log!($crate::logging::LogLevel::Trace, $stream, $tick, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_stream_basic() {
        let stream = LogStream::<16>::new();

        assert!(stream.push(1000, LogLevel::Info, b"test message"));
        assert!(stream.has_entries());
        assert_eq!(stream.pending(), 1);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.tick, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message(), "test message");

        assert!(!stream.has_entries());
    }

    #[test]
    fn test_log_stream_full() {
        let stream = LogStream::<4>::new();

        assert!(stream.push(1, LogLevel::Info, b"1"));
        assert!(stream.push(2, LogLevel::Info, b"2"));
        assert!(stream.push(3, LogLevel::Info, b"3"));
        assert!(stream.push(4, LogLevel::Info, b"4"));

        // Should drop
        assert!(!stream.push(5, LogLevel::Info, b"5"));
        assert_eq!(stream.dropped(), 1);

        // Oldest entry survives the overflow
        assert_eq!(stream.drain().unwrap().message(), "1");
        assert!(stream.push(6, LogLevel::Info, b"6"));
    }

    #[test]
    fn test_format_to_buffer() {
        let mut buf = [0u8; 32];
        let len = format_to_buffer(&mut buf, format_args!("Hello {}", 42));
        assert_eq!(&buf[..len], b"Hello 42");
    }

    #[test]
    fn test_format_to_buffer_truncates() {
        let mut buf = [0u8; 4];
        let len = format_to_buffer(&mut buf, format_args!("{}", "abcdefgh"));
        assert_eq!(&buf[..len], b"abcd");
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_macro_pushes_formatted_entry() {
        let stream = LogStream::<8>::new();
        crate::con_warn!(stream, 7, "bad value {}", -3);

        let entry = stream.drain().unwrap();
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.tick, 7);
        assert_eq!(entry.message(), "bad value -3");
    }

    #[test]
    fn test_drain_into_formats_and_reports_drops() {
        let stream = LogStream::<2>::new();
        stream.push(1, LogLevel::Info, b"a");
        stream.push(2, LogLevel::Debug, b"b");
        stream.push(3, LogLevel::Info, b"c");

        let mut out = String::new();
        assert_eq!(drain_into(&stream, &mut out), 2);
        assert!(out.contains("INFO: a\r\n"));
        assert!(out.contains("DEBUG: b\r\n"));
        assert!(out.contains("1 log messages dropped"));
        assert_eq!(stream.dropped(), 0);
    }

    #[test]
    fn test_reserved_slot_not_drained_until_written() {
        let stream = LogStream::<4>::new();

        // A producer has reserved slot 0 but not written it yet
        stream.write_idx.fetch_add(1, Ordering::AcqRel);
        assert_eq!(stream.pending(), 1);
        assert!(stream.drain().is_none());

        // A later producer queues behind it
        assert!(stream.push(2, LogLevel::Info, b"second"));
        assert!(stream.drain().is_none());

        // First producer finishes and publishes
        unsafe {
            let entry = &mut (*stream.entries.get())[0];
            entry.tick = 1;
            entry.len = 5;
            entry.msg[..5].copy_from_slice(b"first");
        }
        stream.ready[0].store(true, Ordering::Release);

        assert_eq!(stream.drain().unwrap().message(), "first");
        assert_eq!(stream.drain().unwrap().message(), "second");
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_concurrent_drain_sees_whole_messages() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<8>::new());
        let producers: Vec<_> = (0..3)
            .map(|i| {
                let stream = Arc::clone(&stream);
                thread::spawn(move || {
                    for j in 0..200u32 {
                        let msg = format!("p{}-{:04}", i, j);
                        while !stream.push(j, LogLevel::Info, msg.as_bytes()) {
                            thread::yield_now();
                        }
                    }
                })
            })
            .collect();

        let mut seen = 0;
        while seen < 600 {
            match stream.drain() {
                Some(entry) => {
                    let text = entry.message();
                    assert_eq!(text.len(), 7, "torn entry {:?}", text);
                    assert_eq!(text[3..].parse::<u32>().unwrap(), entry.tick);
                    seen += 1;
                }
                None => thread::yield_now(),
            }
        }

        for p in producers {
            p.join().unwrap();
        }
        assert!(stream.drain().is_none());
    }

    #[test]
    fn test_multiple_producers() {
        use std::sync::Arc;
        use std::thread;

        let stream = Arc::new(LogStream::<64>::new());
        let mut handles = vec![];

        for i in 0..4 {
            let stream = Arc::clone(&stream);
            let handle = thread::spawn(move || {
                for j in 0..10 {
                    let msg = format!("Thread {} msg {}", i, j);
                    stream.push(j, LogLevel::Info, msg.as_bytes());
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let mut count = 0;
        while stream.drain().is_some() {
            count += 1;
        }
        assert_eq!(count, 40, "All messages should be present");
    }
}
