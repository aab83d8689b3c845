//! Byte-stream traits that concrete console transports are built on.
//!
//! A UART driver, a TCP socket or a pseudo terminal only has to implement
//! [`Read`] and [`Write`] to be usable with
//! [`StreamConsole`](crate::console::StreamConsole).

#![deny(unsafe_code)]

/// Re-exports of the stream traits
pub mod prelude {
    pub use super::{Error, Read, Write};
}

/// Error of a byte stream.
pub trait Error: core::fmt::Debug {
    /// `true` if the peer closed the stream and no more data will ever flow.
    ///
    /// Transports report this as
    /// [`console::Error::Disconnected`](crate::console::Error::Disconnected)
    /// instead of a read or write failure.
    fn is_disconnected(&self) -> bool {
        false
    }
}

impl Error for () {}

impl Error for core::convert::Infallible {}

/// Non-blocking or blocking byte source.
pub trait Read {
    /// Associated error type
    type Error: Error;

    /// Read up to `buf.len()` bytes.
    ///
    /// Returns `Ok(0)` when no data is currently available. A blocking
    /// implementation may instead wait until at least one byte arrives.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Byte sink.
pub trait Write {
    /// Associated error type
    type Error: Error;

    /// Write some prefix of `buf`, returning how many bytes were accepted.
    ///
    /// Returning `Ok(0)` signals backpressure (e.g. a full hardware FIFO);
    /// callers retry.
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;

    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

#[cfg(feature = "std")]
pub use self::std_stream::StdStream;

#[cfg(feature = "std")]
mod std_stream {
    use std::io::ErrorKind;

    /// Adapter from `std::io` streams (sockets, ptys, serial device files).
    ///
    /// A `WouldBlock` read on a non-blocking stream reads as zero bytes and a
    /// `WouldBlock` write as backpressure. End of stream (the peer closed the
    /// socket) is reported as an `UnexpectedEof` error rather than as an
    /// endless run of empty reads; it and a reset or broken connection count
    /// as [`is_disconnected`](super::Error::is_disconnected).
    #[derive(Debug)]
    pub struct StdStream<T>(pub T);

    impl super::Error for std::io::Error {
        fn is_disconnected(&self) -> bool {
            matches!(
                self.kind(),
                ErrorKind::UnexpectedEof
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::NotConnected
            )
        }
    }

    impl<T: std::io::Read> super::Read for StdStream<T> {
        type Error = std::io::Error;

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            match self.0.read(buf) {
                Ok(0) if !buf.is_empty() => Err(ErrorKind::UnexpectedEof.into()),
                Ok(n) => Ok(n),
                Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
                Err(e) if e.kind() == ErrorKind::Interrupted => Ok(0),
                Err(e) => Err(e),
            }
        }
    }

    impl<T: std::io::Write> super::Write for StdStream<T> {
        type Error = std::io::Error;

        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            match self.0.write(buf) {
                Ok(n) => Ok(n),
                Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
                Err(e) if e.kind() == ErrorKind::Interrupted => Ok(0),
                Err(e) => Err(e),
            }
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.0.flush()
        }
    }
}
