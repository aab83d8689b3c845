//! Shared output scratch buffer.

use core::fmt;

use heapless::Vec;

use super::OUTPUT_BUFFER_SIZE;
use crate::console::{ConsoleTransport, Error};

/// Fixed-capacity scratch space handlers render their output into.
///
/// There is exactly one of these per [`Interpreter`](super::Interpreter),
/// shared by every console served by it, and a handler gets it exclusively
/// for the duration of one command. Text is composed with `write!`; binary
/// content goes through [`push_bytes`](Self::push_bytes). Either way the
/// content reaches the console byte-exactly through [`flush`](Self::flush).
///
/// Output beyond [`OUTPUT_BUFFER_SIZE`] is truncated and
/// [`is_truncated`](Self::is_truncated) reports it; handlers producing long
/// output flush as they go.
///
/// # Examples
///
/// ```rust
/// use core::fmt::Write;
/// use libconsole::cli::OutputBuffer;
/// use libconsole::console::MemoryConsole;
///
/// let mut console: MemoryConsole = MemoryConsole::new();
/// let mut out = OutputBuffer::new();
/// write!(out, "{} ms\r\n", 12345).unwrap();
/// out.flush(&mut console).unwrap();
/// assert!(out.is_empty());
/// assert_eq!(console.output(), b"12345 ms\r\n");
/// ```
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8, OUTPUT_BUFFER_SIZE>,
    truncated: bool,
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBuffer {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            truncated: false,
        }
    }

    /// Append raw bytes, keeping as many as fit.
    ///
    /// Returns `false` if anything had to be dropped.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> bool {
        let room = self.buf.capacity() - self.buf.len();
        let take = bytes.len().min(room);
        // `take` never exceeds the free space.
        let _ = self.buf.extend_from_slice(&bytes[..take]);
        if take < bytes.len() {
            if !self.truncated {
                warn!("output buffer full, dropped {} bytes", bytes.len() - take);
            }
            self.truncated = true;
            return false;
        }
        true
    }

    /// Buffered content.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// `true` if output was dropped since the last [`clear`](Self::clear).
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Drop the content and reset the truncation flag.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.truncated = false;
    }

    /// Write the content to `console` and clear the buffer.
    ///
    /// The buffer is cleared even if the write fails, so a broken console
    /// never leaks stale output into the next command.
    pub fn flush(&mut self, console: &mut dyn ConsoleTransport) -> Result<(), Error> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let result = console.write(&self.buf);
        self.clear();
        result
    }
}

impl fmt::Write for OutputBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.push_bytes(s.as_bytes()) {
            Ok(())
        } else {
            Err(fmt::Error)
        }
    }
}
