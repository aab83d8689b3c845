//! Interpreter and console session configuration.
//!
//! Configuration is plain data with sensible defaults. It can be built in
//! code or loaded from a JSON blob, typically one kept in a flash
//! key-value store:
//!
//! ```rust
//! use libconsole::config::Config;
//!
//! let config = Config::from_json(br#"{"cli":{"quoting":true},"console":{"prompt":"dev> "}}"#).unwrap();
//! assert!(config.cli.quoting);
//! assert!(config.cli.help_command);
//! assert_eq!(config.console.prompt.as_str(), "dev> ");
//! ```

use core::fmt;

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::cli::{MAX_PROMPT_LEN, Quoting};

/// Configuration parse error.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The blob is not valid JSON for [`Config`], or a string is too long.
    Parse,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid console configuration")
    }
}

/// Dispatcher options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Provide the built-in `help` command listing every registered command.
    pub help_command: bool,
    /// Treat `<cmd> -h` and `<cmd> --help` as a request for that command's help text.
    pub help_flags: bool,
    /// Group `"quoted arguments"` into one token.
    pub quoting: bool,
}

impl CliConfig {
    /// Default options, usable in `const` context.
    pub const DEFAULT: Self = Self {
        help_command: true,
        help_flags: true,
        quoting: false,
    };

    /// Tokenizer mode selected by [`quoting`](Self::quoting).
    pub fn quoting_mode(&self) -> Quoting {
        if self.quoting {
            Quoting::Enabled
        } else {
            Quoting::Disabled
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-session options for a [`ConsoleTask`](crate::cli::ConsoleTask).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Echo typed characters back to the terminal.
    pub echo: bool,
    /// Printed before every command line.
    pub prompt: String<MAX_PROMPT_LEN>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let mut prompt = String::new();
        // Fits MAX_PROMPT_LEN.
        let _ = prompt.push_str("> ");
        Self { echo: true, prompt }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dispatcher options.
    pub cli: CliConfig,
    /// Console session options.
    pub console: ConsoleConfig,
}

impl Config {
    /// Parse a JSON configuration blob. Missing fields take their defaults.
    pub fn from_json(json: &[u8]) -> Result<Self, Error> {
        serde_json_core::from_slice::<Self>(json)
            .map(|(config, _)| config)
            .map_err(|_e| {
                warn!("failed to parse console configuration");
                Error::Parse
            })
    }

    /// Serialize into `buf`, returning the number of bytes written.
    pub fn to_json(&self, buf: &mut [u8]) -> Result<usize, Error> {
        serde_json_core::to_slice(self, buf).map_err(|_| Error::Parse)
    }
}
