use crate::commands::{
    aliases::Aliases,
    args::CommandArgs,
    error::{CommandError, TreeCommandError},
    node::CommandNode,
    usage::Trail,
    CommandSource,
};
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// What the dispatcher needs from a registered command.
pub trait CommandCallable<S>: Send + Sync {
    fn aliases(&self) -> &Aliases;

    /// Runs the command with `raw`, the input following the command alias.
    fn process(&self, source: &S, raw: &str) -> Result<(), TreeCommandError>;

    /// Completions for the last (possibly empty) word of `raw`.
    fn suggestions(&self, source: &S, raw: &str) -> Vec<String>;

    fn usage(&self, source: &S) -> String;

    fn test_permission(&self, source: &S) -> bool;
}

/// The top of a command tree. Its accumulator is the principal itself.
pub struct CommandRoot<S> {
    aliases: Aliases,
    node: CommandNode<S, S>,
}

impl<S: CommandSource> CommandRoot<S> {
    pub fn new(aliases: impl Into<Aliases>) -> Self {
        Self {
            aliases: aliases.into(),
            node: CommandNode::new(),
        }
    }

    pub fn build(aliases: impl Into<Aliases>, build: impl FnOnce(&mut CommandNode<S, S>)) -> Self {
        let mut root = Self::new(aliases);
        build(&mut root.node);
        root
    }
}

impl<S> Deref for CommandRoot<S> {
    type Target = CommandNode<S, S>;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

impl<S> DerefMut for CommandRoot<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.node
    }
}

impl<S: CommandSource> CommandCallable<S> for CommandRoot<S> {
    fn aliases(&self) -> &Aliases {
        &self.aliases
    }

    fn process(&self, source: &S, raw: &str) -> Result<(), TreeCommandError> {
        let mut trail = Trail::new(self.aliases.primary());
        if !self.test_permission(source) {
            let error = CommandError::PermissionDenied {
                permission: self.aliases.required_permission().map(str::to_string),
            };
            return Err(trail.wrap(error, None, self.node.subcommands()));
        }
        let mut args = CommandArgs::parse(raw, false)
            .map_err(|err| trail.wrap(err.into(), None, self.node.subcommands()))?;
        debug!(
            command = self.aliases.primary(),
            source = source.name(),
            args = args.all().len(),
            "processing command"
        );
        self.node
            .traverse(source, &mut args, source.clone(), &mut trail)
    }

    fn suggestions(&self, source: &S, raw: &str) -> Vec<String> {
        if !self.test_permission(source) {
            return Vec::new();
        }
        match CommandArgs::parse(raw, true) {
            Ok(mut args) => self.node.complete(source, &mut args, source.clone()),
            Err(_) => Vec::new(),
        }
    }

    fn usage(&self, source: &S) -> String {
        self.node.shallow_usage(source, source)
    }

    fn test_permission(&self, source: &S) -> bool {
        self.aliases.permits(source)
    }
}
