//! Command-line interpreter for embedded device consoles.
//!
//! This module turns raw command lines into handler invocations and routes
//! handler output back to the console the line came from. It is designed for
//! `no_std` targets: every buffer is fixed-size and nothing is allocated.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  ConsoleTask    │───▶│   Tokenizer     │───▶│  Interpreter    │
//! │  (prompt, read  │    │  (in place,     │    │  (lookup in     │
//! │   line, copy)   │    │   argv spans)   │    │   registry)     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!          ▲                                             │
//!          │              ┌─────────────────┐            ▼
//!          └──────────────│  OutputBuffer   │◀───── handler(io, out, args)
//!                         │  (shared scratch│
//!                         └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use core::fmt::Write;
//! use libconsole::cli::{Args, CommandDefinition, CommandRegistry, Interpreter, OutputBuffer};
//! use libconsole::config::CliConfig;
//! use libconsole::console::{ConsoleTransport, Error, MemoryConsole};
//!
//! fn uptime(io: &mut dyn ConsoleTransport, out: &mut OutputBuffer, _: &Args<'_>) -> Result<(), Error> {
//!     let _ = write!(out, "{}\r\n", 12345);
//!     out.flush(io)
//! }
//!
//! let mut registry: CommandRegistry = CommandRegistry::new();
//! registry.register(CommandDefinition::new("uptime", "prints uptime\r\n", uptime)).unwrap();
//! let cli: Interpreter = Interpreter::new(registry, CliConfig::default());
//!
//! let mut console: MemoryConsole = MemoryConsole::new();
//! let mut line = *b"uptime";
//! cli.process(&mut console, &mut line).unwrap();
//! assert_eq!(console.output(), b"12345\r\n");
//! ```
//!
//! # Concurrency
//!
//! All handlers of one [`Interpreter`] share its single [`OutputBuffer`], so
//! command execution is not reentrant. [`Interpreter::process`] takes a
//! system-wide dispatch lock for the whole call, which makes it safe for
//! several console tasks to share one `&Interpreter`. The per-transport
//! [`ConsoleTransport::lock`](crate::console::ConsoleTransport::lock) is a
//! separate, narrower lock and is never a substitute for it.

use core::fmt;

use crate::console::{ConsoleTransport, Error};

/// Error types for registration and tokenization
pub mod error;

mod interpreter;
mod output;
mod registry;
mod task;
mod tokenizer;

pub use error::{RegistryError, TokenizeError};
pub use interpreter::Interpreter;
pub use output::OutputBuffer;
pub use registry::CommandRegistry;
pub use task::ConsoleTask;
pub use tokenizer::{Args, Quoting, tokenize};

/// Maximum number of arguments per command line, command name included.
pub const MAX_ARGS: usize = 16;

/// Default number of dynamically registered commands.
pub const MAX_COMMANDS: usize = 32;

/// Default size of a command line buffer, terminator included.
pub const COMMAND_BUFFER_SIZE: usize = 128;

/// Size of the shared output scratch buffer.
pub const OUTPUT_BUFFER_SIZE: usize = 512;

/// Maximum prompt length.
pub const MAX_PROMPT_LEN: usize = 16;

/// Command handler.
///
/// A handler receives the console the command came from, the shared output
/// scratch (already cleared) and the tokenized arguments; `args.get(0)` is
/// the command name. It writes all of its output through `io`, either
/// directly or by composing into `out` and calling
/// [`OutputBuffer::flush`]. Whatever is left in `out` when the handler
/// returns is flushed for it.
///
/// Handlers report their own failures as console text. The `Err` side is
/// for transport errors only, so console writes can use `?`. A handler must
/// not keep references to `args` beyond its own invocation; the borrow
/// checker enforces this.
pub type CommandFn =
    fn(io: &mut dyn ConsoleTransport, out: &mut OutputBuffer, args: &Args<'_>) -> Result<(), Error>;

/// A command: its name, its help text and the handler implementing it.
///
/// # Examples
///
/// ```rust
/// use libconsole::cli::{Args, CommandDefinition, OutputBuffer};
/// use libconsole::console::{ConsoleTransport, Error};
///
/// fn ps(io: &mut dyn ConsoleTransport, _: &mut OutputBuffer, _: &Args<'_>) -> Result<(), Error> {
///     io.print("TCB  Name  State\r\n")
/// }
///
/// const PS: CommandDefinition = CommandDefinition::new("ps", "ps: List tasks\r\n", ps);
/// assert_eq!(PS.name, "ps");
/// ```
#[derive(Clone, Copy)]
pub struct CommandDefinition {
    /// The command name as typed by the user.
    ///
    /// Matched case-sensitively against the first token of a line; by
    /// convention lower case. Must not be empty or contain whitespace.
    pub name: &'static str,

    /// Help text shown by `help` and `<cmd> --help`.
    ///
    /// By convention it starts with the command itself and may end with
    /// `"\r\n"`, e.g. `"uptime: Show time since boot\r\n"`.
    pub help: &'static str,

    /// The function that implements the command.
    pub handler: CommandFn,
}

impl CommandDefinition {
    /// Bundle a name, help text and handler.
    pub const fn new(name: &'static str, help: &'static str, handler: CommandFn) -> Self {
        Self {
            name,
            help,
            handler,
        }
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}
