use core::fmt::Write;
use libconsole::cli::*;
use libconsole::config::CliConfig;
use libconsole::console::{ConsoleTransport, Error, MemoryConsole};
use libconsole::sync::{GuardSend, RawMutex, RawSpinlock};
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Test command handlers
fn uptime_handler(io: &mut dyn ConsoleTransport, out: &mut OutputBuffer, _args: &Args<'_>) -> Result<(), Error> {
    let _ = write!(out, "{}\r\n", 12345);
    out.flush(io)
}

/// Echoes argv as `[a|b|c]` so tests can check exactly what the handler saw.
fn argv_handler(io: &mut dyn ConsoleTransport, out: &mut OutputBuffer, args: &Args<'_>) -> Result<(), Error> {
    let _ = out.write_char('[');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            let _ = out.write_char('|');
        }
        let _ = out.write_str(arg);
    }
    let _ = out.write_str("]\r\n");
    out.flush(io)
}

fn first_handler(io: &mut dyn ConsoleTransport, _out: &mut OutputBuffer, _args: &Args<'_>) -> Result<(), Error> {
    io.print("first\r\n")
}

fn second_handler(io: &mut dyn ConsoleTransport, _out: &mut OutputBuffer, _args: &Args<'_>) -> Result<(), Error> {
    io.print("second\r\n")
}

/// Leaves its output in the scratch buffer for the dispatcher to flush.
fn unflushed_handler(_io: &mut dyn ConsoleTransport, out: &mut OutputBuffer, _args: &Args<'_>) -> Result<(), Error> {
    let _ = out.write_str("left in scratch\r\n");
    Ok(())
}

/// Fills the scratch with its argument, yielding between writes.
fn fill_handler(_io: &mut dyn ConsoleTransport, out: &mut OutputBuffer, args: &Args<'_>) -> Result<(), Error> {
    let token = args.get(1).unwrap_or("?");
    for _ in 0..32 {
        let _ = out.write_str(token);
        std::thread::yield_now();
    }
    Ok(())
}

/// Reports whether the shared output buffer can be reached from inside a handler.
fn accessor_handler(io: &mut dyn ConsoleTransport, _out: &mut OutputBuffer, _args: &Args<'_>) -> Result<(), Error> {
    match ACCESSOR_CLI.output_buffer() {
        Some(_) => io.print("reachable\r\n"),
        None => io.print("busy\r\n"),
    }
}

static ACCESSOR_COMMANDS: [CommandDefinition; 1] = [CommandDefinition::new("getbuf", "", accessor_handler)];
static ACCESSOR_CLI: Interpreter =
    Interpreter::new(CommandRegistry::with_static(&ACCESSOR_COMMANDS), CliConfig::DEFAULT);

/// Dispatch lock that counts acquisitions, standing in for an RTOS mutex.
struct CountingLock {
    inner: RawSpinlock,
}

static ACQUIRED: AtomicUsize = AtomicUsize::new(0);

unsafe impl RawMutex for CountingLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self {
        inner: RawSpinlock::INIT,
    };

    type GuardMarker = GuardSend;

    fn lock(&self) {
        ACQUIRED.fetch_add(1, Ordering::SeqCst);
        self.inner.lock();
    }

    fn try_lock(&self) -> bool {
        self.inner.try_lock()
    }

    unsafe fn unlock(&self) {
        unsafe { self.inner.unlock() }
    }
}

fn interpreter(config: CliConfig) -> Interpreter<8> {
    let mut cli: Interpreter<8> = Interpreter::new(CommandRegistry::new(), config);
    cli.register(CommandDefinition::new("uptime", "uptime: Show time since boot\r\n", uptime_handler))
        .unwrap();
    cli.register(CommandDefinition::new("kill", "kill: Kill a task\r\n", argv_handler))
        .unwrap();
    cli.register(CommandDefinition::new("ps", "ps: List tasks\r\n", first_handler))
        .unwrap();
    cli
}

fn run(cli: &Interpreter<8>, line: &str) -> String {
    let mut console: MemoryConsole = MemoryConsole::new();
    let mut buf = line.as_bytes().to_vec();
    cli.process(&mut console, &mut buf).unwrap();
    console.output_str().unwrap().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_scenario() {
        let cli = interpreter(CliConfig::default());
        assert_eq!(run(&cli, "uptime"), "12345\r\n");
    }

    #[test]
    fn test_two_spaces_is_noop() {
        let cli = interpreter(CliConfig::default());
        assert_eq!(run(&cli, "  "), "");
    }

    #[test]
    fn test_empty_and_whitespace_lines_write_nothing() {
        let cli = interpreter(CliConfig::default());
        for line in ["", " ", "\t", " \t \r\n ", "\0\0"] {
            assert_eq!(run(&cli, line), "", "line {:?} produced output", line);
        }
    }

    #[test]
    fn test_unknown_command_scenario() {
        let cli = interpreter(CliConfig::default());
        let out = run(&cli, "frobnicate --x");

        assert!(out.contains("frobnicate"));
        assert!(out.contains("not recognised"));
        assert!(out.contains("Enter 'help'"));
        assert_eq!(out.matches("not recognised").count(), 1);
        assert!(out.ends_with("\r\n"));
    }

    #[test]
    fn test_unknown_command_without_help_hint() {
        let config = CliConfig {
            help_command: false,
            ..CliConfig::default()
        };
        let cli = interpreter(config);
        let out = run(&cli, "frobnicate");

        assert!(out.contains("\"frobnicate\" not recognised"));
        assert!(!out.contains("help"));
    }

    #[test]
    fn test_lookup_is_case_sensitive_and_exact() {
        let cli = interpreter(CliConfig::default());
        assert!(run(&cli, "Uptime").contains("not recognised"));
        assert!(run(&cli, "up").contains("not recognised"));
        assert!(run(&cli, "uptimex").contains("not recognised"));
    }

    #[test]
    fn test_kill_scenario_argv() {
        let cli = interpreter(CliConfig::default());
        assert_eq!(run(&cli, "kill 42 -9"), "[kill|42|-9]\r\n");
    }

    #[test]
    fn test_handler_invoked_once_with_name_as_argv0() {
        let cli = interpreter(CliConfig::default());
        let out = run(&cli, "   kill\t 7   ");
        assert_eq!(out.matches('[').count(), 1);
        assert!(out.starts_with("[kill|"));
    }

    #[test]
    fn test_duplicate_registration_first_wins() {
        let mut cli: Interpreter<4> = Interpreter::new(CommandRegistry::new(), CliConfig::default());
        cli.register(CommandDefinition::new("conf", "first", first_handler))
            .unwrap();
        assert_eq!(
            cli.register(CommandDefinition::new("conf", "second", second_handler)),
            Err(RegistryError::AlreadyRegistered)
        );

        for _ in 0..3 {
            let mut console: MemoryConsole = MemoryConsole::new();
            let mut line = *b"conf";
            cli.process(&mut console, &mut line).unwrap();
            assert_eq!(console.output(), b"first\r\n");
        }
    }

    #[test]
    fn test_leftover_scratch_is_flushed() {
        let mut cli: Interpreter<4> = Interpreter::new(CommandRegistry::new(), CliConfig::default());
        cli.register(CommandDefinition::new("stat", "", unflushed_handler))
            .unwrap();

        let mut console: MemoryConsole = MemoryConsole::new();
        let mut line = *b"stat";
        cli.process(&mut console, &mut line).unwrap();
        assert_eq!(console.output(), b"left in scratch\r\n");
        assert!(cli.output_buffer().unwrap().is_empty());
    }

    #[test]
    fn test_help_lists_commands_in_registration_order() {
        let cli = interpreter(CliConfig::default());
        let out = run(&cli, "help");

        assert_eq!(
            out,
            "Available commands:\r\n\
             uptime: Show time since boot\r\n\
             kill: Kill a task\r\n\
             ps: List tasks\r\n"
        );
    }

    #[test]
    fn test_help_listing_without_help_text_shows_name() {
        let mut cli: Interpreter<4> = Interpreter::new(CommandRegistry::new(), CliConfig::default());
        cli.register(CommandDefinition::new("stat", "", unflushed_handler))
            .unwrap();

        let mut console: MemoryConsole = MemoryConsole::new();
        let mut line = *b"help";
        cli.process(&mut console, &mut line).unwrap();
        assert_eq!(console.output(), b"Available commands:\r\nstat\r\n");
    }

    #[test]
    fn test_help_command_disabled() {
        let config = CliConfig {
            help_command: false,
            ..CliConfig::default()
        };
        let cli = interpreter(config);
        assert!(run(&cli, "help").contains("not recognised"));
    }

    #[test]
    fn test_registered_help_overrides_builtin() {
        let mut cli: Interpreter<4> = Interpreter::new(CommandRegistry::new(), CliConfig::default());
        cli.register(CommandDefinition::new("help", "custom help", first_handler))
            .unwrap();

        let mut console: MemoryConsole = MemoryConsole::new();
        let mut line = *b"help";
        cli.process(&mut console, &mut line).unwrap();
        assert_eq!(console.output(), b"first\r\n");
    }

    #[test]
    fn test_help_flags() {
        let cli = interpreter(CliConfig::default());
        assert_eq!(run(&cli, "kill --help"), "kill: Kill a task\r\n");
        assert_eq!(run(&cli, "kill -h"), "kill: Kill a task\r\n");
        // Only a lone flag asks for help.
        assert_eq!(run(&cli, "kill -h 3"), "[kill|-h|3]\r\n");
        assert!(run(&cli, "nope --help").contains("not recognised"));
    }

    #[test]
    fn test_help_flags_disabled() {
        let config = CliConfig {
            help_flags: false,
            ..CliConfig::default()
        };
        let cli = interpreter(config);
        assert_eq!(run(&cli, "kill --help"), "[kill|--help]\r\n");
    }

    #[test]
    fn test_too_many_arguments_is_reported() {
        let cli = interpreter(CliConfig::default());
        let line = ["kill"; MAX_ARGS + 1].join(" ");
        let out = run(&cli, &line);
        assert_eq!(out, "Error parsing command: too many arguments\r\n");
        assert!(!out.contains('['));
    }

    #[test]
    fn test_unknown_command_with_too_many_arguments() {
        let cli = interpreter(CliConfig::default());
        let line = format!("frobnicate{}", " x".repeat(MAX_ARGS));
        let out = run(&cli, &line);
        assert!(out.starts_with("Command \"frobnicate\" not recognised."));
        assert_eq!(out.matches("not recognised").count(), 1);
    }

    #[test]
    fn test_unknown_command_with_invalid_utf8_argument() {
        let cli = interpreter(CliConfig::default());
        let mut console: MemoryConsole = MemoryConsole::new();
        let mut line = *b"frobnicate \xff\xfe 1";
        cli.process(&mut console, &mut line).unwrap();

        let out = console.output_str().unwrap();
        assert!(out.starts_with("Command \"frobnicate\" not recognised."));
        assert!(!out.contains("Error parsing command"));
    }

    #[test]
    fn test_invalid_utf8_command_name_is_reported() {
        let cli = interpreter(CliConfig::default());
        let mut console: MemoryConsole = MemoryConsole::new();
        let mut line = *b"\xc3 uptime";
        cli.process(&mut console, &mut line).unwrap();
        assert_eq!(
            console.output_str().unwrap(),
            "Error parsing command: invalid characters in command line\r\n"
        );
    }

    #[test]
    fn test_long_unknown_name_is_shortened() {
        let cli = interpreter(CliConfig::default());
        let name = "x".repeat(600);
        let out = run(&cli, &name);

        assert!(out.starts_with(&format!("Command \"{}\" not recognised.", "x".repeat(64))));
        assert!(out.ends_with("commands.\r\n"));
        assert!(out.len() < OUTPUT_BUFFER_SIZE);
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let cli = interpreter(CliConfig::default());
        let mut console: MemoryConsole = MemoryConsole::new();
        let mut line = *b"kill \xc3";
        cli.process(&mut console, &mut line).unwrap();
        assert!(console.output_str().unwrap().starts_with("Error parsing command"));
    }

    #[test]
    fn test_quoting_enabled() {
        let config = CliConfig {
            quoting: true,
            ..CliConfig::default()
        };
        let cli = interpreter(config);
        assert_eq!(run(&cli, r#"kill "a b" c"#), "[kill|a b|c]\r\n");

        let cli = interpreter(CliConfig::default());
        assert_eq!(run(&cli, r#"kill "a b" c"#), "[kill|\"a|b\"|c]\r\n");
    }

    #[test]
    fn test_transport_error_propagates() {
        let cli = interpreter(CliConfig::default());
        // Output capacity of 4 bytes cannot take "12345\r\n".
        let mut console: MemoryConsole<16, 4> = MemoryConsole::new();
        let mut line = *b"uptime";
        assert_eq!(cli.process(&mut console, &mut line), Err(Error::Write));
        assert_eq!(console.lock_depth(), 0);

        // The interpreter stays usable and the scratch does not leak.
        let mut console: MemoryConsole = MemoryConsole::new();
        let mut line = *b"ps";
        cli.process(&mut console, &mut line).unwrap();
        assert_eq!(console.output(), b"first\r\n");
    }

    #[test]
    fn test_transport_locked_while_handler_runs() {
        let cli = interpreter(CliConfig::default());
        let mut console: MemoryConsole = MemoryConsole::new();
        let mut line = *b"uptime";
        cli.process(&mut console, &mut line).unwrap();

        assert_eq!(console.max_lock_depth(), 1);
        assert_eq!(console.lock_depth(), 0);
    }

    #[test]
    fn test_line_is_tokenized_in_place() {
        let cli = interpreter(CliConfig::default());
        let mut console: MemoryConsole = MemoryConsole::new();
        let mut line = *b"kill 42";
        cli.process(&mut console, &mut line).unwrap();
        assert_eq!(&line, b"kill\x0042");
    }

    #[test]
    fn test_static_interpreter() {
        static COMMANDS: [CommandDefinition; 1] =
            [CommandDefinition::new("uptime", "uptime: Show time since boot\r\n", uptime_handler)];
        static CLI: Interpreter =
            Interpreter::new(CommandRegistry::with_static(&COMMANDS), CliConfig::DEFAULT);

        let mut console: MemoryConsole = MemoryConsole::new();
        let mut line = *b"uptime";
        CLI.process(&mut console, &mut line).unwrap();
        assert_eq!(console.output(), b"12345\r\n");
        assert_eq!(CLI.registry().len(), 1);
    }

    #[test]
    fn test_output_buffer_accessor() {
        let cli = interpreter(CliConfig::default());
        {
            let scratch = cli.output_buffer().unwrap();
            assert!(scratch.is_empty());
            assert_eq!(scratch.capacity(), OUTPUT_BUFFER_SIZE);
            // Held by the caller, so a second borrow is refused.
            assert!(cli.output_buffer().is_none());
        }
        assert!(cli.output_buffer().is_some());
    }

    #[test]
    fn test_output_buffer_from_inside_handler() {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let mut console: MemoryConsole = MemoryConsole::new();
            let mut line = *b"getbuf";
            let result = ACCESSOR_CLI.process(&mut console, &mut line);
            let _ = tx.send((result, console.output().to_vec()));
        });

        let (result, output) = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("handler blocked on the dispatch lock");
        assert_eq!(result, Ok(()));
        assert_eq!(output, b"busy\r\n");

        // The dispatch lock was released and the interpreter keeps working.
        assert!(ACCESSOR_CLI.output_buffer().is_some());
        let mut console: MemoryConsole = MemoryConsole::new();
        let mut line = *b"getbuf";
        ACCESSOR_CLI.process(&mut console, &mut line).unwrap();
        assert_eq!(console.output(), b"busy\r\n");
    }

    #[test]
    fn test_custom_dispatch_lock() {
        let mut cli: Interpreter<4, CountingLock> =
            Interpreter::new(CommandRegistry::new(), CliConfig::default());
        cli.register(CommandDefinition::new("uptime", "", uptime_handler))
            .unwrap();

        for _ in 0..3 {
            let mut console: MemoryConsole = MemoryConsole::new();
            let mut line = *b"uptime";
            cli.process(&mut console, &mut line).unwrap();
            assert_eq!(console.output(), b"12345\r\n");
        }
        assert_eq!(ACQUIRED.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_serialized_dispatch_does_not_interleave() {
        let mut cli: Interpreter<4> = Interpreter::new(CommandRegistry::new(), CliConfig::default());
        cli.register(CommandDefinition::new("fill", "", fill_handler))
            .unwrap();
        let cli = &cli;

        std::thread::scope(|s| {
            for token in ["a", "b", "c"] {
                s.spawn(move || {
                    for _ in 0..50 {
                        let mut console: MemoryConsole<64, 64> = MemoryConsole::new();
                        let mut line = format!("fill {}", token).into_bytes();
                        cli.process(&mut console, &mut line).unwrap();

                        let out = console.output_str().unwrap();
                        assert_eq!(out, token.repeat(32));
                    }
                });
            }
        });
    }

    #[test]
    fn test_retokenizing_joined_argv_is_stable() {
        const ALPHABET: &[u8] = b"abcxyz019-_=./\"\\";
        const SEPARATORS: &[u8] = b" \t\r\n\0";
        let mut rng = rand::thread_rng();

        for _ in 0..500 {
            let mut line = Vec::new();
            let tokens = rng.gen_range(0..MAX_ARGS);
            for _ in 0..tokens {
                for _ in 0..rng.gen_range(1..4) {
                    line.push(SEPARATORS[rng.gen_range(0..SEPARATORS.len())]);
                }
                for _ in 0..rng.gen_range(1..8) {
                    line.push(ALPHABET[rng.gen_range(0..ALPHABET.len())]);
                }
            }
            for _ in 0..rng.gen_range(0..4) {
                line.push(b' ');
            }

            let first: Vec<String> = tokenize(&mut line, Quoting::Disabled)
                .unwrap()
                .iter()
                .map(str::to_owned)
                .collect();
            assert_eq!(first.len(), tokens);
            assert!(first.iter().all(|t| !t.is_empty()));

            let mut joined = first.join(" ").into_bytes();
            let second: Vec<String> = tokenize(&mut joined, Quoting::Disabled)
                .unwrap()
                .iter()
                .map(str::to_owned)
                .collect();
            assert_eq!(first, second);
        }
    }
}
