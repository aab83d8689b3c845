//! Line-disciplined console over a byte stream.

use core::time::Duration;

use heapless::Vec;
use lock_api::{Mutex, MutexGuard, RawMutex};

use super::{Clock, ConsoleTransport, Error};
use crate::cli::COMMAND_BUFFER_SIZE;
use crate::config::ConsoleConfig;
use crate::io::{self, Read, Write};
use crate::sync::RawSpinlock;

/// ASCII backspace character (0x08).
pub const ASCII_BACKSPACE: u8 = 0x08;
/// ASCII line feed character (0x0A).
pub const ASCII_LF: u8 = 0x0A;
/// ASCII carriage return character (0x0D).
pub const ASCII_CR: u8 = 0x0D;
/// ASCII delete character (0x7F).
pub const ASCII_DEL: u8 = 0x7F;

/// Console transport over any [`Read`] + [`Write`] stream.
///
/// This is the transport used for UARTs and sockets. It adds the line
/// discipline a raw serial link lacks:
///
/// - **CR/LF**: ends the line; an LF directly after a CR is swallowed so
///   `"\r\n"` terminals do not produce an extra empty line
/// - **Backspace/Delete**: removes the last character, echoing `"\x08 \x08"`
/// - **Printable ASCII**: appended to the line buffer and optionally echoed
/// - **Other control bytes**: ignored
///
/// A line longer than `LINE - 1` bytes is dropped up to its terminator and
/// reported once as [`Error::LineTooLong`]. A stream error for which
/// [`io::Error::is_disconnected`] holds is reported as
/// [`Error::Disconnected`].
///
/// The optional bus lock is a [`RawSpinlock`] mutex unless another
/// [`RawMutex`] is named as `R`.
///
/// # Examples
///
/// ```rust
/// use core::time::Duration;
/// use libconsole::console::{Clock, ConsoleTransport, StreamConsole};
/// use libconsole::io::{Read, Write};
///
/// struct Loopback { rx: &'static [u8] }
///
/// impl Read for Loopback {
///     type Error = ();
///     fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
///         let n = buf.len().min(self.rx.len());
///         buf[..n].copy_from_slice(&self.rx[..n]);
///         self.rx = &self.rx[n..];
///         Ok(n)
///     }
/// }
///
/// impl Write for Loopback {
///     type Error = ();
///     fn write(&mut self, buf: &[u8]) -> Result<usize, ()> { Ok(buf.len()) }
///     fn flush(&mut self) -> Result<(), ()> { Ok(()) }
/// }
///
/// struct Frozen;
/// impl Clock for Frozen {
///     fn now(&self) -> Duration { Duration::ZERO }
/// }
///
/// let mut console: StreamConsole<_, _> = StreamConsole::new(Loopback { rx: b"uptime\r\n" }, Frozen);
/// console.set_echo(false);
/// assert_eq!(console.read_line(), Ok("uptime"));
/// ```
pub struct StreamConsole<S, C, const LINE: usize = COMMAND_BUFFER_SIZE, R: RawMutex + 'static = RawSpinlock> {
    stream: S,
    clock: C,
    line: Vec<u8, LINE>,
    line_complete: bool,
    overflowed: bool,
    last_was_cr: bool,
    echo: bool,
    bus_lock: Option<&'static Mutex<R, ()>>,
    held: Option<MutexGuard<'static, R, ()>>,
    lock_depth: usize,
}

impl<S, C, const LINE: usize, R> core::fmt::Debug for StreamConsole<S, C, LINE, R>
where
    S: core::fmt::Debug,
    R: RawMutex + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamConsole")
            .field("stream", &self.stream)
            .field("line", &self.line)
            .field("echo", &self.echo)
            .field("lock_depth", &self.lock_depth)
            .finish_non_exhaustive()
    }
}

impl<S, C, const LINE: usize, R> StreamConsole<S, C, LINE, R>
where
    S: Read + Write,
    C: Clock,
    R: RawMutex + 'static,
{
    /// Create a console over `stream`, with echo enabled and no bus lock.
    pub fn new(stream: S, clock: C) -> Self {
        Self {
            stream,
            clock,
            line: Vec::new(),
            line_complete: false,
            overflowed: false,
            last_was_cr: false,
            echo: true,
            bus_lock: None,
            held: None,
            lock_depth: 0,
        }
    }

    /// Share `lock` with every other writer of the same physical channel.
    ///
    /// While this console is locked (see [`ConsoleTransport::lock`]) the bus
    /// lock is held, so e.g. a log sink on the same UART waits instead of
    /// interleaving with command output.
    pub fn with_bus_lock(mut self, lock: &'static Mutex<R, ()>) -> Self {
        self.bus_lock = Some(lock);
        self
    }

    /// Apply the transport-level session options (echo).
    pub fn configure(&mut self, config: &ConsoleConfig) {
        self.echo = config.echo;
    }

    /// Whether typed characters are echoed.
    pub fn echo(&self) -> bool {
        self.echo
    }

    /// Borrow the underlying stream.
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Mutably borrow the underlying stream.
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Give back the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    fn read_stream(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.stream.read(buf).map_err(|e| {
            if io::Error::is_disconnected(&e) {
                debug!("console stream closed");
                Error::Disconnected
            } else {
                warn!("console stream read failed");
                Error::Read
            }
        })
    }

    fn echo_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if self.echo {
            self.write(bytes)?;
        }
        Ok(())
    }

    /// Feed one received byte into the line discipline.
    ///
    /// Returns `Ok(true)` once a line terminator completed the line.
    fn accept(&mut self, byte: u8) -> Result<bool, Error> {
        let after_cr = core::mem::replace(&mut self.last_was_cr, byte == ASCII_CR);

        match byte {
            ASCII_LF if after_cr => Ok(false),
            ASCII_CR | ASCII_LF => {
                self.echo_bytes(b"\r\n")?;
                Ok(true)
            }
            ASCII_BACKSPACE | ASCII_DEL => {
                if !self.overflowed && self.line.pop().is_some() {
                    self.echo_bytes(b"\x08 \x08")?;
                }
                Ok(false)
            }
            0x20..=0x7E => {
                if self.overflowed {
                    return Ok(false);
                }
                // Keep one byte spare so callers can NUL-terminate a copy.
                if self.line.len() + 1 >= LINE || self.line.push(byte).is_err() {
                    self.overflowed = true;
                    return Ok(false);
                }
                self.echo_bytes(&[byte])?;
                Ok(false)
            }
            _ => Ok(false),
        }
    }
}

impl<S, C, const LINE: usize, R> ConsoleTransport for StreamConsole<S, C, LINE, R>
where
    S: Read + Write,
    C: Clock,
    R: RawMutex + 'static,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.read_stream(buf)
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Error> {
        let start = self.clock.now();
        loop {
            let n = self.read_stream(buf)?;
            if n > 0 || buf.is_empty() {
                return Ok(n);
            }
            if self.clock.now().saturating_sub(start) >= timeout {
                return Err(Error::Timeout);
            }
            core::hint::spin_loop();
        }
    }

    fn read_line(&mut self) -> Result<&str, Error> {
        if self.line_complete {
            self.line.clear();
            self.line_complete = false;
        }

        let mut byte = [0u8; 1];
        loop {
            if self.read_stream(&mut byte)? == 0 {
                core::hint::spin_loop();
                continue;
            }
            if self.accept(byte[0])? {
                self.line_complete = true;
                break;
            }
        }

        if core::mem::take(&mut self.overflowed) {
            debug!("console line exceeded {} bytes, discarded", LINE - 1);
            return Err(Error::LineTooLong);
        }

        // Only printable ASCII is ever stored.
        core::str::from_utf8(&self.line).map_err(|_| Error::Read)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let mut rest = bytes;
        while !rest.is_empty() {
            let n = self.stream.write(rest).map_err(|e| {
                if io::Error::is_disconnected(&e) {
                    debug!("console stream closed");
                    Error::Disconnected
                } else {
                    warn!("console stream write failed");
                    Error::Write
                }
            })?;
            if n == 0 {
                core::hint::spin_loop();
                continue;
            }
            rest = &rest[n.min(rest.len())..];
        }
        self.stream.flush().map_err(|e| {
            if io::Error::is_disconnected(&e) {
                Error::Disconnected
            } else {
                Error::Write
            }
        })
    }

    fn set_echo(&mut self, enabled: bool) {
        self.echo = enabled;
    }

    fn lock(&mut self) {
        if self.lock_depth == 0 {
            self.held = self.bus_lock.map(|lock| lock.lock());
        }
        self.lock_depth += 1;
    }

    fn unlock(&mut self) {
        match self.lock_depth {
            0 => {}
            1 => {
                self.lock_depth = 0;
                self.held = None;
            }
            _ => self.lock_depth -= 1,
        }
    }
}
