//! Command dispatcher.

use core::fmt::{self, Write};

use lock_api::{Mutex, MutexGuard, RawMutex};

use super::tokenizer::split;
use super::{
    Args, CommandDefinition, CommandRegistry, MAX_COMMANDS, OutputBuffer, RegistryError,
    TokenizeError,
};
use crate::config::CliConfig;
use crate::console::{ConsoleGuard, ConsoleTransport, Error};
use crate::sync::RawSpinlock;

/// Longest command name echoed back in the "not recognised" message.
const MAX_ECHOED_NAME: usize = 64;

/// Resolves command lines against a [`CommandRegistry`] and runs handlers.
///
/// The interpreter owns the registry, its configuration and the single
/// [`OutputBuffer`] all handlers share. The buffer sits behind the dispatch
/// lock, so at most one command runs at a time across every console that
/// shares this interpreter.
///
/// Registration happens while the interpreter is still owned (`&mut self`);
/// once it is shared (`&self`, e.g. from a `static`) the table is read-only.
///
/// The dispatch lock is a [`RawSpinlock`] unless another
/// [`RawMutex`] is named as `R`, e.g. one wrapping an RTOS mutex.
///
/// # Examples
///
/// A process-wide interpreter with a static command table:
///
/// ```rust
/// use libconsole::cli::{Args, CommandDefinition, CommandRegistry, Interpreter, OutputBuffer};
/// use libconsole::config::CliConfig;
/// use libconsole::console::{ConsoleTransport, Error, MemoryConsole};
///
/// fn reset(io: &mut dyn ConsoleTransport, _: &mut OutputBuffer, _: &Args<'_>) -> Result<(), Error> {
///     io.print("Resetting device.\r\n")
/// }
///
/// static COMMANDS: [CommandDefinition; 1] = [
///     CommandDefinition::new("reset", "reset: Reset the device\r\n", reset),
/// ];
///
/// static CLI: Interpreter =
///     Interpreter::new(CommandRegistry::with_static(&COMMANDS), CliConfig::DEFAULT);
///
/// let mut console: MemoryConsole = MemoryConsole::new();
/// let mut line = *b"frobnicate --x";
/// CLI.process(&mut console, &mut line).unwrap();
/// assert!(console.output_str().unwrap().contains("\"frobnicate\" not recognised"));
/// ```
pub struct Interpreter<const N: usize = MAX_COMMANDS, R = RawSpinlock> {
    registry: CommandRegistry<N>,
    config: CliConfig,
    scratch: Mutex<R, OutputBuffer>,
}

impl<const N: usize, R: RawMutex> Interpreter<N, R> {
    /// Create an interpreter over `registry`.
    pub const fn new(registry: CommandRegistry<N>, config: CliConfig) -> Self {
        Self {
            registry,
            config,
            scratch: Mutex::new(OutputBuffer::new()),
        }
    }

    /// Register another command. Only possible before the interpreter is shared.
    pub fn register(&mut self, def: CommandDefinition) -> Result<(), RegistryError> {
        self.registry.register(def)
    }

    /// The command table.
    pub fn registry(&self) -> &CommandRegistry<N> {
        &self.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Exclusive access to the shared output buffer, if no command is running.
    ///
    /// Holding the returned guard holds the dispatch lock: no command can run
    /// on any console until it is dropped. Returns `None` while a command is
    /// being dispatched, including when called from inside a handler; a
    /// handler already owns the buffer through its `out` parameter.
    pub fn output_buffer(&self) -> Option<MutexGuard<'_, R, OutputBuffer>> {
        self.scratch.try_lock()
    }

    /// Run one command line received on `console`.
    ///
    /// `line` is tokenized in place (see [`tokenize`](super::tokenize)). Then:
    ///
    /// - an empty or whitespace-only line does nothing and writes nothing
    /// - a registered name runs its handler exactly once
    /// - `<cmd> -h` / `<cmd> --help` prints the help text, when enabled
    /// - `help` lists every command, when enabled and not overridden
    /// - anything else writes one "not recognised" message naming the token
    ///
    /// The command name is resolved before the rest of the line is judged. A
    /// registered command whose arguments the tokenizer rejects (too many, or
    /// not UTF-8) is not run and the parse error is reported instead; an
    /// unknown name is reported as not recognised either way.
    ///
    /// The dispatch lock is held for the whole call and the transport's
    /// [`ConsoleGuard`] while output is produced.
    ///
    /// # Errors
    ///
    /// Only transport failures are returned. Unknown commands, empty lines
    /// and lines the tokenizer rejects are ordinary outcomes reported on the
    /// console.
    pub fn process(&self, console: &mut dyn ConsoleTransport, line: &mut [u8]) -> Result<(), Error> {
        let mut scratch = self.scratch.lock();
        scratch.clear();

        let (args, parse_error) = split(line, self.config.quoting_mode());
        if args.is_empty() {
            return Ok(());
        }

        let mut io = ConsoleGuard::new(console);

        let Some(name) = args.command() else {
            // The command name itself is not UTF-8.
            return report_tokenize_error(&mut *io, &mut scratch, TokenizeError::InvalidUtf8);
        };

        if let Some(cmd) = self.registry.lookup(name) {
            if let Some(e) = parse_error {
                debug!("rejected arguments of {}: {}", name, e);
                return report_tokenize_error(&mut *io, &mut scratch, e);
            }
            if self.is_help_request(&args) {
                return print_help_entry(&mut *io, &mut scratch, cmd);
            }
            debug!("dispatching {} (argc {})", name, args.argc());
            (cmd.handler)(&mut *io, &mut scratch, &args)?;
            return scratch.flush(&mut *io);
        }

        if self.config.help_command && name == "help" {
            return self.list_commands(&mut *io, &mut scratch);
        }

        debug!("command not recognised: {}", name);
        let _ = write!(scratch, "Command \"{:.*}\" not recognised.", MAX_ECHOED_NAME, name);
        if self.config.help_command {
            let _ = scratch.write_str(" Enter 'help' to view a list of available commands.");
        }
        let _ = scratch.write_str("\r\n");
        scratch.flush(&mut *io)
    }

    fn is_help_request(&self, args: &Args<'_>) -> bool {
        self.config.help_flags
            && args.argc() == 2
            && matches!(args.get(1), Some("-h") | Some("--help"))
    }

    fn list_commands(&self, io: &mut dyn ConsoleTransport, out: &mut OutputBuffer) -> Result<(), Error> {
        let _ = out.write_str("Available commands:\r\n");
        out.flush(io)?;
        for cmd in self.registry.iter() {
            print_help_entry(io, out, cmd)?;
        }
        Ok(())
    }
}

impl<const N: usize, R: RawMutex> fmt::Debug for Interpreter<N, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("busy", &self.scratch.is_locked())
            .finish()
    }
}

/// Print the help text of `cmd` as written, which by convention starts with
/// the command itself. Commands without help text show their name.
fn print_help_entry(
    io: &mut dyn ConsoleTransport,
    out: &mut OutputBuffer,
    cmd: &CommandDefinition,
) -> Result<(), Error> {
    let help = cmd.help.trim_end_matches(['\r', '\n']);
    let text = if help.is_empty() { cmd.name } else { help };
    let _ = write!(out, "{}\r\n", text);
    out.flush(io)
}

fn report_tokenize_error(
    io: &mut dyn ConsoleTransport,
    out: &mut OutputBuffer,
    error: TokenizeError,
) -> Result<(), Error> {
    let _ = write!(out, "Error parsing command: {}\r\n", error);
    out.flush(io)
}
