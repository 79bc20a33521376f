//! Global log stream instance.

use crate::logging::LogStream;

/// Console log stream.
///
/// Default sink for every [`Console`](crate::console::Console) built with
/// `Console::new()`. Single consumer: whoever owns the log drain.
pub static CONSOLE_LOG: LogStream = LogStream::new();
