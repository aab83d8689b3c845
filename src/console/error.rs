//! Common error types for console transports

use core::fmt;

/// A common error type for console transport operations.
///
/// These are the transport-level failures of the error taxonomy: they are
/// propagated to the loop driving the console, which decides whether to
/// retry, reconnect or end the session. User-input mistakes (unknown
/// command, empty line) are never reported through this type.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The underlying stream failed while reading.
    Read,
    /// The underlying stream failed while writing.
    Write,
    /// A bounded read elapsed without receiving any data.
    Timeout,
    /// The transport has no more input and never will (peer closed, script exhausted).
    Disconnected,
    /// A received line did not fit the transport's line buffer and was discarded.
    LineTooLong,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Error::Read => "read error",
            Error::Write => "write error",
            Error::Timeout => "timed out",
            Error::Disconnected => "disconnected",
            Error::LineTooLong => "line too long",
        };
        f.write_str(text)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Read => defmt::write!(f, "Read"),
            Error::Write => defmt::write!(f, "Write"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::Disconnected => defmt::write!(f, "Disconnected"),
            Error::LineTooLong => defmt::write!(f, "LineTooLong"),
        }
    }
}
