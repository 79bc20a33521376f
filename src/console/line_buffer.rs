//! Line buffer and editor for console input

/// Maximum line length
pub const LINE_SIZE: usize = 48;

/// ASCII end-of-transmission (Ctrl+D)
pub const EOT: u8 = 0x04;

/// ASCII form feed (Ctrl+L)
pub const FORM_FEED: u8 = 0x0C;

/// Result of feeding one input byte to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// Byte stored at the end of the line; echo it
    Appended(u8),
    /// Last byte removed; erase one column
    Erased,
    /// Tab or `?`: run completion
    Complete,
    /// Enter on a non-empty line
    LineReady,
    /// Ctrl+L: clear the screen, keep the line
    ClearScreen,
    /// Ctrl+D on an empty line: leave the console
    Abort,
    /// Byte had no effect
    Ignored,
}

/// Line input buffer
pub struct LineBuffer {
    buf: [u8; LINE_SIZE],
    len: usize,
}

impl LineBuffer {
    /// Create empty buffer
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_SIZE],
            len: 0,
        }
    }

    /// Interpret one input byte.
    ///
    /// Printable bytes are stored unless the line is full; a space typed
    /// on an empty line is dropped.
    pub fn feed(&mut self, byte: u8) -> EditorEvent {
        match byte {
            b'\t' | b'?' => EditorEvent::Complete,
            EOT if self.is_empty() => EditorEvent::Abort,
            FORM_FEED => EditorEvent::ClearScreen,
            b'\r' | b'\n' if !self.is_empty() => EditorEvent::LineReady,
            0x7F | 0x08 => {
                if self.backspace() {
                    EditorEvent::Erased
                } else {
                    EditorEvent::Ignored
                }
            }
            b' ' if self.is_empty() => EditorEvent::Ignored,
            0x20..=0x7E => {
                if self.push(byte) {
                    EditorEvent::Appended(byte)
                } else {
                    EditorEvent::Ignored
                }
            }
            _ => EditorEvent::Ignored,
        }
    }

    /// Push a character. Returns `false` if the buffer is full.
    pub fn push(&mut self, c: u8) -> bool {
        if self.len < LINE_SIZE {
            self.buf[self.len] = c;
            self.len += 1;
            true
        } else {
            false
        }
    }

    /// Remove last character. Returns `false` if the buffer was empty.
    pub fn backspace(&mut self) -> bool {
        if self.len > 0 {
            self.len -= 1;
            self.buf[self.len] = 0;
            true
        } else {
            false
        }
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.buf = [0u8; LINE_SIZE];
        self.len = 0;
    }

    /// Get buffer as string slice
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Get buffer length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if full
    pub fn is_full(&self) -> bool {
        self.len == LINE_SIZE
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
