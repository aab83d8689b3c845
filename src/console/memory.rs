//! In-memory virtual terminal.

use core::time::Duration;

use heapless::{Deque, Vec};

use super::{ConsoleTransport, Error};

/// Console backed by fixed-size memory queues.
///
/// Input is queued with [`feed`](Self::feed); everything written by the
/// interpreter or a handler is captured and can be inspected with
/// [`output`](Self::output). Reads never block: once the input queue is
/// drained, [`read`](ConsoleTransport::read) returns `Ok(0)`,
/// [`read_timeout`](ConsoleTransport::read_timeout) returns
/// [`Error::Timeout`] and [`read_line`](ConsoleTransport::read_line)
/// returns [`Error::Disconnected`].
///
/// Output beyond `OUT` bytes fails with [`Error::Write`].
#[derive(Debug)]
pub struct MemoryConsole<const IN: usize = 256, const OUT: usize = 1024> {
    input: Deque<u8, IN>,
    line: Vec<u8, IN>,
    output: Vec<u8, OUT>,
    lock_depth: usize,
    max_lock_depth: usize,
}

impl<const IN: usize, const OUT: usize> Default for MemoryConsole<IN, OUT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const IN: usize, const OUT: usize> MemoryConsole<IN, OUT> {
    /// Create an empty console.
    pub const fn new() -> Self {
        Self {
            input: Deque::new(),
            line: Vec::new(),
            output: Vec::new(),
            lock_depth: 0,
            max_lock_depth: 0,
        }
    }

    /// Queue `bytes` as pending input.
    ///
    /// Returns [`Error::LineTooLong`] if the input queue cannot take all of
    /// them; nothing is queued in that case.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if self.input.capacity() - self.input.len() < bytes.len() {
            return Err(Error::LineTooLong);
        }
        for &b in bytes {
            // Capacity checked above.
            let _ = self.input.push_back(b);
        }
        Ok(())
    }

    /// Everything written so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Written output as text, if it is valid UTF-8.
    pub fn output_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.output).ok()
    }

    /// Discard captured output.
    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Number of bytes still queued as input.
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Current lock nesting depth.
    pub fn lock_depth(&self) -> usize {
        self.lock_depth
    }

    /// Deepest lock nesting observed since creation.
    pub fn max_lock_depth(&self) -> usize {
        self.max_lock_depth
    }
}

impl<const IN: usize, const OUT: usize> ConsoleTransport for MemoryConsole<IN, OUT> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let mut n = 0;
        while n < buf.len() {
            match self.input.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn read_timeout(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, Error> {
        // Nothing can arrive while the caller waits, so an empty queue is a timeout.
        match self.read(buf)? {
            0 if !buf.is_empty() => Err(Error::Timeout),
            n => Ok(n),
        }
    }

    fn read_line(&mut self) -> Result<&str, Error> {
        self.line.clear();
        loop {
            match self.input.pop_front() {
                Some(b'\n') => break,
                Some(b'\r') => {
                    if self.input.front() == Some(&b'\n') {
                        self.input.pop_front();
                    }
                    break;
                }
                Some(b) => {
                    // `line` has the same capacity as the whole input queue.
                    let _ = self.line.push(b);
                }
                None if self.line.is_empty() => return Err(Error::Disconnected),
                // Last line without a terminator.
                None => break,
            }
        }
        core::str::from_utf8(&self.line).map_err(|_| Error::Read)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.output.extend_from_slice(bytes).map_err(|_| Error::Write)
    }

    fn lock(&mut self) {
        self.lock_depth += 1;
        self.max_lock_depth = self.max_lock_depth.max(self.lock_depth);
    }

    fn unlock(&mut self) {
        self.lock_depth = self.lock_depth.saturating_sub(1);
    }
}
