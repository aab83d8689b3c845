//! Error types for command registration and tokenization

use core::fmt;

/// A registration was rejected.
///
/// These are programmer errors surfaced at startup; the registry is left
/// unchanged when one is returned.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// The command name is empty or contains whitespace.
    InvalidName,
    /// A command with the same name is already registered; the first one stays.
    AlreadyRegistered,
    /// The registry has no free slot.
    Full,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidName => f.write_str("invalid command name"),
            RegistryError::AlreadyRegistered => f.write_str("command already registered"),
            RegistryError::Full => f.write_str("command registry full"),
        }
    }
}

/// A command line could not be split into arguments.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TokenizeError {
    /// The line holds more than [`MAX_ARGS`](super::MAX_ARGS) tokens.
    TooManyArguments,
    /// A token is not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::TooManyArguments => f.write_str("too many arguments"),
            TokenizeError::InvalidUtf8 => f.write_str("invalid characters in command line"),
        }
    }
}
