//! # Console transport abstraction
//!
//! A console is one physical or virtual channel (UART, network socket,
//! virtual terminal) that carries command lines in and command output back
//! out. The command interpreter only ever talks to a console through the
//! [`ConsoleTransport`] capability trait, so the same command set can be
//! served over several channels at once.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  UART / socket  │───▶│ ConsoleTransport│───▶│   Interpreter   │
//! │  (io::Read/     │    │  (line input,   │    │  (tokenize,     │
//! │   io::Write)    │◀───│   byte output)  │◀───│   dispatch)     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Provided transports
//!
//! - [`StreamConsole`]: line discipline (echo, backspace, CR/LF handling)
//!   over any [`io::Read`](crate::io::Read) + [`io::Write`](crate::io::Write)
//!   stream.
//! - [`MemoryConsole`]: an in-memory virtual terminal fed from a byte queue,
//!   used for scripted command execution and tests.
//!
//! # Locking
//!
//! [`ConsoleTransport::lock`] and [`ConsoleTransport::unlock`] serialize I/O
//! on *one* transport instance (for example against a log sink writing the
//! same UART). They do not serialize command execution; that is the job of
//! the [`Interpreter`](crate::cli::Interpreter)'s dispatch lock.
//!
//! ```rust
//! use libconsole::console::{ConsoleGuard, ConsoleTransport, MemoryConsole};
//!
//! let mut console: MemoryConsole = MemoryConsole::new();
//! {
//!     let mut io = ConsoleGuard::new(&mut console);
//!     io.print("locked write\r\n").unwrap();
//! } // unlocked here, on every exit path
//! assert_eq!(console.output(), b"locked write\r\n");
//! ```

#![deny(unsafe_code)]

use core::ops::{Deref, DerefMut};
use core::time::Duration;

/// Common error types for console transports
pub mod error;

mod memory;
mod stream;

pub use error::Error;
pub use memory::MemoryConsole;
pub use stream::{ASCII_BACKSPACE, ASCII_CR, ASCII_DEL, ASCII_LF, StreamConsole};

/// Monotonic time source used for bounded reads.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed epoch (usually boot).
    fn now(&self) -> Duration;
}

/// Capability set of one console channel.
///
/// Implementations hold no command state, only I/O primitives and a lock.
/// The trait is object safe; the interpreter and command handlers work with
/// `&mut dyn ConsoleTransport`.
pub trait ConsoleTransport {
    /// Best-effort read of at most `buf.len()` bytes.
    ///
    /// Whether this blocks or returns `Ok(0)` when nothing is available is
    /// up to the transport.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

    /// Read with an upper bound on the wait.
    ///
    /// Returns as soon as at least one byte is available, or
    /// [`Error::Timeout`] once `timeout` has elapsed without data.
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Error>;

    /// Accumulate input until a line terminator and return the line without it.
    ///
    /// The returned text lives in transport-owned storage and is only valid
    /// until the next read on this transport.
    fn read_line(&mut self) -> Result<&str, Error>;

    /// Write exactly `bytes`, verbatim, including embedded zero bytes.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Write `text`. Rust strings carry no terminator, so nothing extra is sent.
    fn print(&mut self, text: &str) -> Result<(), Error> {
        self.write(text.as_bytes())
    }

    /// Switch echo of typed characters on or off.
    ///
    /// Only meaningful for transports that echo; the default does nothing.
    fn set_echo(&mut self, _enabled: bool) {}

    /// Acquire exclusive access to this transport's I/O.
    ///
    /// Must be reentrant: nested `lock`/`unlock` pairs on the same instance
    /// are allowed. Prefer [`ConsoleGuard`] over calling this directly.
    fn lock(&mut self) {}

    /// Release one level of [`lock`](Self::lock).
    fn unlock(&mut self) {}
}

impl<T: ConsoleTransport + ?Sized> ConsoleTransport for &mut T {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        (**self).read(buf)
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Error> {
        (**self).read_timeout(buf, timeout)
    }

    fn read_line(&mut self) -> Result<&str, Error> {
        (**self).read_line()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        (**self).write(bytes)
    }

    fn print(&mut self, text: &str) -> Result<(), Error> {
        (**self).print(text)
    }

    fn set_echo(&mut self, enabled: bool) {
        (**self).set_echo(enabled)
    }

    fn lock(&mut self) {
        (**self).lock()
    }

    fn unlock(&mut self) {
        (**self).unlock()
    }
}

/// Scoped lock on a transport.
///
/// Locks on construction and unlocks when dropped, including on early
/// returns and `?` propagation out of a command handler.
#[derive(Debug)]
pub struct ConsoleGuard<'a, T: ConsoleTransport + ?Sized> {
    console: &'a mut T,
}

impl<'a, T: ConsoleTransport + ?Sized> ConsoleGuard<'a, T> {
    /// Lock `console` for the lifetime of the guard.
    pub fn new(console: &'a mut T) -> Self {
        console.lock();
        Self { console }
    }
}

impl<T: ConsoleTransport + ?Sized> Deref for ConsoleGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.console
    }
}

impl<T: ConsoleTransport + ?Sized> DerefMut for ConsoleGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.console
    }
}

impl<T: ConsoleTransport + ?Sized> Drop for ConsoleGuard<'_, T> {
    fn drop(&mut self) {
        self.console.unlock();
    }
}

#[cfg(feature = "std")]
pub use self::std_clock::StdClock;

#[cfg(feature = "std")]
mod std_clock {
    use core::time::Duration;
    use std::time::Instant;

    /// [`Clock`](super::Clock) backed by `std::time::Instant`.
    #[derive(Debug, Clone, Copy)]
    pub struct StdClock {
        epoch: Instant,
    }

    impl StdClock {
        /// Start a clock whose epoch is now.
        pub fn new() -> Self {
            Self {
                epoch: Instant::now(),
            }
        }
    }

    impl Default for StdClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl super::Clock for StdClock {
        fn now(&self) -> Duration {
            self.epoch.elapsed()
        }
    }
}
