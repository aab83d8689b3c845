//! Append-only command table.

use heapless::Vec;

use super::{CommandDefinition, MAX_COMMANDS, RegistryError};

/// Ordered table of [`CommandDefinition`]s.
///
/// A registry is populated once during startup and read-only afterwards;
/// the [`Interpreter`](super::Interpreter) takes it by value, so no
/// registration can race with dispatch.
///
/// Commands come from two places, both kept in registration order:
///
/// 1. an optional static table given to [`with_static`](Self::with_static),
///    which costs no RAM and allows a registry to be built in a `const`
/// 2. up to `N` commands added with [`register`](Self::register)
///
/// # Examples
///
/// ```rust
/// use libconsole::cli::{Args, CommandDefinition, CommandRegistry, OutputBuffer};
/// use libconsole::console::{ConsoleTransport, Error};
///
/// fn reset(io: &mut dyn ConsoleTransport, _: &mut OutputBuffer, _: &Args<'_>) -> Result<(), Error> {
///     io.print("Resetting device...\r\n")
/// }
///
/// static BUILTINS: [CommandDefinition; 1] = [
///     CommandDefinition::new("reset", "reset: Reset the device\r\n", reset),
/// ];
///
/// let mut registry: CommandRegistry = CommandRegistry::with_static(&BUILTINS);
/// assert!(registry.lookup("reset").is_some());
/// assert!(registry.register(CommandDefinition::new("reset", "", reset)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CommandRegistry<const N: usize = MAX_COMMANDS> {
    static_commands: &'static [CommandDefinition],
    commands: Vec<CommandDefinition, N>,
}

impl<const N: usize> Default for CommandRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> CommandRegistry<N> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self::with_static(&[])
    }

    /// Create a registry whose first entries are `commands`.
    ///
    /// The table is trusted as-is; duplicate names inside it resolve to the
    /// first entry on lookup.
    pub const fn with_static(commands: &'static [CommandDefinition]) -> Self {
        Self {
            static_commands: commands,
            commands: Vec::new(),
        }
    }

    /// Append `def` to the table.
    ///
    /// # Errors
    ///
    /// * [`RegistryError::InvalidName`] - empty name or a name containing whitespace
    /// * [`RegistryError::AlreadyRegistered`] - the name is taken; the first definition stays
    /// * [`RegistryError::Full`] - all `N` dynamic slots are in use
    pub fn register(&mut self, def: CommandDefinition) -> Result<(), RegistryError> {
        if def.name.is_empty() || def.name.bytes().any(|b| b.is_ascii_whitespace() || b == 0) {
            warn!("rejected command with invalid name");
            return Err(RegistryError::InvalidName);
        }

        if self.lookup(def.name).is_some() {
            warn!("command {} already registered", def.name);
            return Err(RegistryError::AlreadyRegistered);
        }

        let name = def.name;
        self.commands.push(def).map_err(|_| {
            warn!("command registry full, dropping {}", name);
            RegistryError::Full
        })?;

        debug!("registered command {}", name);
        Ok(())
    }

    /// Register every definition in `defs`, in order, stopping at the first error.
    pub fn register_all(&mut self, defs: &[CommandDefinition]) -> Result<(), RegistryError> {
        defs.iter().try_for_each(|def| self.register(*def))
    }

    /// Find the command whose name equals `name` exactly (case-sensitive).
    ///
    /// No prefix or fuzzy matching is done. The first registered match wins.
    pub fn lookup(&self, name: &str) -> Option<&CommandDefinition> {
        self.iter().find(|cmd| cmd.name == name)
    }

    /// All commands in registration order.
    ///
    /// The iterator is lazy and cheap to recreate, so a help listing can walk
    /// the table as many times as it needs.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> + Clone + '_ {
        self.static_commands.iter().chain(self.commands.iter())
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.static_commands.len() + self.commands.len()
    }

    /// `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
