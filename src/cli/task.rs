//! Read-dispatch loop for one console.

use heapless::{String, Vec};
use lock_api::RawMutex;

use super::{COMMAND_BUFFER_SIZE, Interpreter, MAX_COMMANDS, MAX_PROMPT_LEN};
use crate::config::ConsoleConfig;
use crate::console::{ConsoleGuard, ConsoleTransport, Error};
use crate::sync::RawSpinlock;

/// Drives one console: prompt, read a line, dispatch, repeat.
///
/// Each physical or virtual channel gets its own task; all of them may share
/// one `&Interpreter`, whose dispatch lock serializes command execution.
///
/// The transport's line storage is only valid until its next read, so each
/// line is copied into the task's own command buffer before it is tokenized.
///
/// # Examples
///
/// ```rust
/// use libconsole::cli::{CommandRegistry, ConsoleTask, Interpreter};
/// use libconsole::config::{CliConfig, ConsoleConfig};
/// use libconsole::console::{Error, MemoryConsole};
///
/// let cli: Interpreter = Interpreter::new(CommandRegistry::new(), CliConfig::DEFAULT);
///
/// let mut console: MemoryConsole = MemoryConsole::new();
/// console.feed(b"help\r\n").unwrap();
///
/// let mut task = ConsoleTask::new(&cli, console, &ConsoleConfig::default());
/// assert_eq!(task.run(), Error::Disconnected);
/// assert!(task.console().output_str().unwrap().contains("Available commands"));
/// ```
pub struct ConsoleTask<'a, T, const N: usize = MAX_COMMANDS, R = RawSpinlock> {
    interpreter: &'a Interpreter<N, R>,
    console: T,
    command: Vec<u8, COMMAND_BUFFER_SIZE>,
    prompt: String<MAX_PROMPT_LEN>,
    banner: Option<&'static str>,
}

impl<T: core::fmt::Debug, const N: usize, R: RawMutex> core::fmt::Debug for ConsoleTask<'_, T, N, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConsoleTask")
            .field("interpreter", self.interpreter)
            .field("console", &self.console)
            .field("prompt", &self.prompt)
            .field("banner", &self.banner)
            .finish_non_exhaustive()
    }
}

impl<'a, T: ConsoleTransport, const N: usize, R: RawMutex> ConsoleTask<'a, T, N, R> {
    /// Bind `console` to `interpreter` using the session options in `config`.
    ///
    /// The prompt is kept by the task; `config.echo` is handed to the
    /// transport through [`ConsoleTransport::set_echo`].
    pub fn new(interpreter: &'a Interpreter<N, R>, mut console: T, config: &ConsoleConfig) -> Self {
        console.set_echo(config.echo);
        Self {
            interpreter,
            console,
            command: Vec::new(),
            prompt: config.prompt.clone(),
            banner: None,
        }
    }

    /// Print `banner` once when [`run`](Self::run) starts.
    pub fn with_banner(mut self, banner: &'static str) -> Self {
        self.banner = Some(banner);
        self
    }

    /// The transport served by this task.
    pub fn console(&self) -> &T {
        &self.console
    }

    /// Mutable access to the transport.
    pub fn console_mut(&mut self) -> &mut T {
        &mut self.console
    }

    /// Stop serving and give the transport back.
    pub fn into_console(self) -> T {
        self.console
    }

    /// Prompt, read one line and dispatch it.
    pub fn poll(&mut self) -> Result<(), Error> {
        ConsoleGuard::new(&mut self.console).print(&self.prompt)?;

        let line = self.console.read_line()?;
        self.command.clear();
        self.command
            .extend_from_slice(line.as_bytes())
            .map_err(|_| Error::LineTooLong)?;

        self.interpreter.process(&mut self.console, &mut self.command)
    }

    /// Serve the console until the transport fails.
    ///
    /// A line that is too long is reported and skipped and a read timeout is
    /// ignored; every other error ends the session and is returned so the
    /// caller can reconnect or give up.
    pub fn run(&mut self) -> Error {
        info!("console session started");

        if let Some(banner) = self.banner {
            if let Err(e) = ConsoleGuard::new(&mut self.console).print(banner) {
                error!("console session ended: {}", e);
                return e;
            }
        }

        loop {
            match self.poll() {
                Ok(()) | Err(Error::Timeout) => {}
                Err(Error::LineTooLong) => {
                    let notice = ConsoleGuard::new(&mut self.console)
                        .print("Error: command line too long.\r\n");
                    if let Err(e) = notice {
                        error!("console session ended: {}", e);
                        return e;
                    }
                }
                Err(e) => {
                    info!("console session ended: {}", e);
                    return e;
                }
            }
        }
    }
}
