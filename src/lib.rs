//! # libconsole - Embedded device management console
//!
//! A command-line interpreter for the administrative console of an embedded
//! device: it accepts text command lines from any transport (UART, network
//! socket, virtual terminal), resolves them against a table of registered
//! commands, invokes the matching handler and routes the handler's output
//! back through the same transport. It is designed for `no_std` firmware:
//! every buffer is fixed-size and nothing is heap allocated.
//!
//! ## Features
//!
//! ### Command Interpreter
//! - **Registry**: append-only command table, static or registered at startup
//! - **Tokenizer**: in-place, allocation-free argument splitting with optional quoting
//! - **Dispatcher**: exact-match lookup, built-in `help`, `<cmd> --help`
//! - **Shared output buffer**: one scratch buffer for all consoles, behind a dispatch lock
//!
//! ### Console Transports
//! - Object-safe `ConsoleTransport` capability trait with scoped locking
//! - `StreamConsole`: line discipline over any byte stream (echo, backspace, CR/LF)
//! - `MemoryConsole`: in-memory virtual terminal for scripted use and tests
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! libconsole = "0.1.0"
//! ```
//!
//! ### Serving a UART
//!
//! ```rust,no_run
//! use core::fmt::Write;
//! use core::time::Duration;
//! use libconsole::cli::{Args, CommandDefinition, CommandRegistry, ConsoleTask, Interpreter, OutputBuffer};
//! use libconsole::config::{CliConfig, ConsoleConfig};
//! use libconsole::console::{Clock, ConsoleTransport, Error, StreamConsole};
//! # struct Uart;
//! # impl libconsole::io::Read for Uart {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl libconsole::io::Write for Uart {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Ticks;
//! # impl Clock for Ticks {
//! #     fn now(&self) -> Duration { Duration::ZERO }
//! # }
//!
//! fn uptime(io: &mut dyn ConsoleTransport, out: &mut OutputBuffer, _: &Args<'_>) -> Result<(), Error> {
//!     let _ = write!(out, "{}\r\n", 12345);
//!     out.flush(io)
//! }
//!
//! static COMMANDS: [CommandDefinition; 1] = [
//!     CommandDefinition::new("uptime", "uptime: Show time since boot\r\n", uptime),
//! ];
//!
//! static CLI: Interpreter =
//!     Interpreter::new(CommandRegistry::with_static(&COMMANDS), CliConfig::DEFAULT);
//!
//! let console: StreamConsole<_, _> = StreamConsole::new(Uart, Ticks);
//! let mut task = ConsoleTask::new(&CLI, console, &ConsoleConfig::default());
//! let error = task.run();
//! ```
//!
//! ## Platform Support
//!
//! This library is designed to work on:
//! - Embedded microcontrollers (ARM Cortex-M, RISC-V, etc.)
//! - Linux-based devices, serving sockets or ptys with the `std` feature
//! - Any platform supporting Rust's `core` library
//!
//! ## Optional Features
//!
//! - `std`: Enable `std::io` stream and `Instant` clock adapters (default: disabled)
//! - `defmt`: Route internal logging to defmt
//! - `log`: Route internal logging to the `log` facade

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![doc(html_root_url = "https://shishir-dey.github.io/libconsole/")]

#[macro_use]
mod trace;

/// Command interpreter: registry, tokenizer, dispatcher and console task.
///
/// This is the layer that turns raw command lines into invoked handlers
/// and routes handler output back to the console.
pub mod cli;

/// Console transport abstraction and the provided transports.
pub mod console;

/// Byte-stream traits that stream-based transports are built on.
pub mod io;

/// Interpreter and session configuration.
pub mod config;

/// Lock primitives used for dispatch and transport locking.
pub mod sync;
