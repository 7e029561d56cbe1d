use crate::commands::{error::TreeCommandError, root::CommandCallable, CommandSource};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown command: /{command}")]
    UnknownCommand { command: String },
    #[error("You do not have permission to use /{command}")]
    PermissionDenied { command: String },
    #[error(transparent)]
    Command(#[from] TreeCommandError),
}

/// Routes full command lines to the registered command trees.
pub struct CommandRegistry<S> {
    commands: Vec<Box<dyn CommandCallable<S>>>,
    index: FxHashMap<String, usize>,
    custom_aliases: Vec<(String, String)>,
}

impl<S: CommandSource> Default for CommandRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CommandSource> CommandRegistry<S> {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            index: FxHashMap::default(),
            custom_aliases: Vec::new(),
        }
    }

    /// Registers a command under all of its aliases. An alias that is already taken
    /// keeps pointing at the command registered first.
    pub fn register(&mut self, command: impl CommandCallable<S> + 'static) {
        let position = self.commands.len();
        for alias in command.aliases() {
            let alias = alias.to_lowercase();
            if self.index.contains_key(&alias) {
                warn!("Command alias /{} is already registered, ignoring", alias);
                continue;
            }
            self.index.insert(alias, position);
        }
        self.commands.push(Box::new(command));
    }

    pub fn get(&self, alias: &str) -> Option<&dyn CommandCallable<S>> {
        self.index
            .get(&alias.to_lowercase())
            .map(|&i| self.commands[i].as_ref())
    }

    /// Rewrites command lines starting with `prefix`. A `{}` in `replacement` is
    /// substituted with the rest of the line, otherwise the rest is appended.
    pub fn add_custom_alias(&mut self, prefix: impl Into<String>, replacement: impl Into<String>) {
        let prefix = prefix.into();
        let replacement = replacement.into();
        if prefix.is_empty() || replacement.trim().is_empty() {
            warn!("Ignoring empty custom alias {:?} -> {:?}", prefix, replacement);
            return;
        }
        self.custom_aliases.push((prefix, replacement));
    }

    pub fn custom_aliases(&self) -> &[(String, String)] {
        &self.custom_aliases
    }

    fn expand_custom_aliases(&self, command_line: &str) -> String {
        for (alias, expansion) in &self.custom_aliases {
            let Some(rest) = command_line.strip_prefix(alias.as_str()) else {
                continue;
            };
            if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                continue;
            }
            if expansion.contains("{}") {
                return expansion.replace("{}", rest.trim_start());
            } else {
                return format!("{}{}", expansion, rest);
            }
        }

        command_line.to_string()
    }

    /// Runs a full command line such as `/sum 5 7`. Empty lines are ignored.
    pub fn execute(&self, source: &S, command_line: &str) -> Result<(), DispatchError> {
        let command_line = command_line.trim();
        let command_line = command_line.strip_prefix('/').unwrap_or(command_line);
        if command_line.is_empty() {
            return Ok(());
        }

        let command_line = self.expand_custom_aliases(command_line);
        let (label, rest) = split_label(&command_line);
        let Some(command) = self.get(label) else {
            return Err(DispatchError::UnknownCommand {
                command: label.to_string(),
            });
        };
        if !command.test_permission(source) {
            return Err(DispatchError::PermissionDenied {
                command: label.to_string(),
            });
        }

        debug!("{} issued command /{}", source.name(), command_line);
        command.process(source, rest.trim_start())?;
        Ok(())
    }

    /// Completions for a partially typed command line.
    pub fn suggestions(&self, source: &S, command_line: &str) -> Vec<String> {
        let command_line = command_line.trim_start();
        let command_line = command_line.strip_prefix('/').unwrap_or(command_line);
        let (label, rest) = split_label(command_line);

        if rest.is_empty() {
            let label = label.to_lowercase();
            let commands = self
                .index
                .iter()
                .filter(|&(_, &i)| self.commands[i].test_permission(source))
                .map(|(alias, _)| alias.clone());
            let custom = self
                .custom_aliases
                .iter()
                .map(|(alias, _)| alias.clone());
            return commands
                .chain(custom)
                .filter(|alias| alias.starts_with(&label))
                .sorted()
                .dedup()
                .collect();
        }

        match self.get(label) {
            Some(command) => command.suggestions(source, rest.trim_start()),
            None => Vec::new(),
        }
    }

    /// One line per command the source may use, sorted by name.
    pub fn help(&self, source: &S) -> Vec<String> {
        self.commands
            .iter()
            .filter(|command| command.test_permission(source))
            .sorted_by(|a, b| a.aliases().primary().cmp(b.aliases().primary()))
            .map(|command| {
                let aliases = command.aliases();
                let others = aliases.iter().skip(1).join(", ");
                if others.is_empty() {
                    format!("/{}", aliases.primary())
                } else {
                    format!("/{} (Aliases: {})", aliases.primary(), others)
                }
            })
            .collect()
    }
}

/// Splits off the first word. The rest keeps its leading whitespace.
fn split_label(command_line: &str) -> (&str, &str) {
    match command_line.find(char::is_whitespace) {
        Some(end) => command_line.split_at(end),
        None => (command_line, ""),
    }
}
