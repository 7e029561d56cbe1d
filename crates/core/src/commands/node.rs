use crate::commands::{
    aliases::Aliases,
    args::CommandArgs,
    error::{CommandError, CommandResult, TreeCommandError},
    parameter::Parameter,
    usage::Trail,
    CommandSource,
};
use indexmap::IndexMap;
use itertools::Itertools;
use std::any::Any;
use tracing::{debug, trace};

/// The action run once a full path has been matched. Receives the accumulator.
pub type Executor<T> = Box<dyn Fn(T) -> CommandResult<()> + Send + Sync>;

/// A node of a command tree whose accumulator has type `T`.
///
/// A node owns its subcommands (reachable by alias), an ordered list of argument
/// candidates and at most one executor. During traversal a matching alias always wins
/// over the arguments, and the first argument that parses is followed for good.
pub struct CommandNode<S, T> {
    pub(super) children: Vec<ChildNode<S, T>>,
    pub(super) child_index: IndexMap<String, usize>,
    pub(super) arguments: Vec<Box<dyn ArgumentEdge<S, T>>>,
    pub(super) executor: Option<Executor<T>>,
}

pub(super) struct ChildNode<S, T> {
    pub(super) aliases: Aliases,
    pub(super) node: CommandNode<S, T>,
}

/// Outcome of trying one argument candidate during traversal.
pub(super) enum Attempt<T> {
    /// The parameter parsed; this is the result of the subtree below it.
    Accepted(Result<(), TreeCommandError>),
    /// The parameter failed. The cursor has been restored and the accumulator is handed back.
    Rejected(T, CommandError),
}

/// Outcome of trying one argument candidate during completion.
pub(super) enum Descent<T> {
    /// Input is left after the parameter; these are the completions of the subtree.
    Deeper(Vec<String>),
    /// The parameter reached the token being typed, so its own completions apply.
    Partial(T),
    Stop(T),
}

/// An argument edge with its value type erased, so one node can hold candidates
/// producing different types.
pub(super) trait ArgumentEdge<S, T>: Any + Send + Sync {
    fn traverse(
        &self,
        source: &S,
        args: &mut CommandArgs,
        acc: T,
        trail: &mut Trail,
    ) -> Attempt<T>;

    fn complete(&self, source: &S, args: &mut CommandArgs, acc: T) -> Descent<T>;

    /// Completions of the parameter itself at the cursor. Leaves the cursor untouched.
    fn suggest(&self, source: &S, args: &mut CommandArgs, acc: &T) -> Vec<String>;

    fn usage(&self, source: &S, acc: &T) -> String;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct ArgumentNode<S, T, V> {
    parameter: Parameter<S, T, V>,
    node: CommandNode<S, (V, T)>,
}

impl<S, T, V> ArgumentEdge<S, T> for ArgumentNode<S, T, V>
where
    S: CommandSource,
    T: 'static,
    V: 'static,
{
    fn traverse(
        &self,
        source: &S,
        args: &mut CommandArgs,
        acc: T,
        trail: &mut Trail,
    ) -> Attempt<T> {
        let snapshot = args.snapshot();
        match self.parameter.parse(source, args, &acc) {
            Ok(value) => {
                trail.push(self.parameter.usage(source, &acc));
                Attempt::Accepted(self.node.traverse(source, args, (value, acc), trail))
            }
            Err(err) => {
                args.restore(snapshot);
                Attempt::Rejected(acc, err)
            }
        }
    }

    fn complete(&self, source: &S, args: &mut CommandArgs, acc: T) -> Descent<T> {
        let snapshot = args.snapshot();
        let parsed = self.parameter.parse(source, args, &acc);
        if !args.has_next() {
            args.restore(snapshot);
            return Descent::Partial(acc);
        }
        match parsed {
            Ok(value) => Descent::Deeper(self.node.complete(source, args, (value, acc))),
            Err(_) => {
                args.restore(snapshot);
                Descent::Stop(acc)
            }
        }
    }

    fn suggest(&self, source: &S, args: &mut CommandArgs, acc: &T) -> Vec<String> {
        let snapshot = args.snapshot();
        let suggestions = self.parameter.complete(source, args, acc);
        args.restore(snapshot);
        suggestions
    }

    fn usage(&self, source: &S, acc: &T) -> String {
        self.parameter.usage(source, acc)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<S, T> Default for CommandNode<S, T> {
    fn default() -> Self {
        Self {
            children: Vec::new(),
            child_index: IndexMap::new(),
            arguments: Vec::new(),
            executor: None,
        }
    }
}

impl<S: CommandSource, T: 'static> CommandNode<S, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subcommand reachable by `aliases`.
    ///
    /// If a child with the same primary alias exists it is returned instead, and any
    /// new aliases are registered for it.
    pub fn add_child(&mut self, aliases: impl Into<Aliases>) -> &mut CommandNode<S, T> {
        let aliases = aliases.into();
        let position = match self.child_index.get(aliases.primary()) {
            Some(&position) => {
                debug!(alias = aliases.primary(), "reusing existing subcommand");
                position
            }
            None => {
                self.children.push(ChildNode {
                    aliases: aliases.clone(),
                    node: CommandNode::new(),
                });
                self.children.len() - 1
            }
        };
        for alias in &aliases {
            self.child_index.entry(alias.clone()).or_insert(position);
        }
        &mut self.children[position].node
    }

    /// Adds an argument candidate. Candidates are tried in the order they were added.
    pub fn add_argument<V: 'static>(
        &mut self,
        parameter: Parameter<S, T, V>,
    ) -> &mut CommandNode<S, (V, T)> {
        self.arguments.push(Box::new(ArgumentNode {
            parameter,
            node: CommandNode::new(),
        }));
        let Some(edge) = self.arguments.last_mut() else {
            unreachable!("argument was just pushed")
        };
        match edge.as_any_mut().downcast_mut::<ArgumentNode<S, T, V>>() {
            Some(argument) => &mut argument.node,
            None => unreachable!("argument edge has the type it was built with"),
        }
    }

    pub fn set_executor(
        &mut self,
        executor: impl Fn(T) -> CommandResult<()> + Send + Sync + 'static,
    ) -> &mut Self {
        self.executor = Some(Box::new(executor));
        self
    }

    /// Runs `build` on this node, for adding several edges in one expression.
    pub fn expand(&mut self, build: impl FnOnce(&mut Self)) -> &mut Self {
        build(self);
        self
    }

    /// Every alias of every subcommand, in registration order.
    pub fn subcommands(&self) -> Vec<String> {
        self.child_index.keys().cloned().collect()
    }

    pub(super) fn child(&self, alias: &str) -> Option<&ChildNode<S, T>> {
        self.child_index.get(alias).map(|&i| &self.children[i])
    }

    pub(super) fn traverse(
        &self,
        source: &S,
        args: &mut CommandArgs,
        acc: T,
        trail: &mut Trail,
    ) -> Result<(), TreeCommandError> {
        let snapshot = args.snapshot();
        if let Some(token) = args.next_if_present() {
            if let Some(child) = self.child(&token) {
                trail.push(child.aliases.primary());
                if !child.aliases.permits(source) {
                    let error = CommandError::PermissionDenied {
                        permission: child.aliases.required_permission().map(str::to_string),
                    };
                    return Err(trail.wrap(error, None, child.node.subcommands()));
                }
                return child.node.traverse(source, args, acc, trail);
            }
            if self.arguments.is_empty() && self.executor.is_none() {
                let error = CommandError::UnknownSubcommand { alias: token };
                return Err(trail.wrap(error, None, self.subcommands()));
            }
            args.restore(snapshot);
        }

        let mut acc = acc;
        let last = self.arguments.len().saturating_sub(1);
        for (i, argument) in self.arguments.iter().enumerate() {
            let (returned, error) = match argument.traverse(source, args, acc, trail) {
                Attempt::Accepted(result) => return result,
                Attempt::Rejected(returned, error) => (returned, error),
            };
            if !error.is_retryable() {
                let usage = argument.usage(source, &returned);
                return Err(trail.wrap(error, Some(&usage), self.subcommands()));
            }
            if i < last {
                trace!(%error, "argument candidate rejected, trying the next one");
                acc = returned;
                continue;
            }
            if !args.has_next() && !self.children.is_empty() && self.executor.is_none() {
                return Err(trail.wrap(CommandError::NoExecutor, None, self.subcommands()));
            }
            let usage = argument.usage(source, &returned);
            return Err(trail.wrap(error, Some(&usage), self.subcommands()));
        }

        if args.has_next() {
            let error = CommandError::TooManyArguments {
                remaining: args.rest().to_string(),
            };
            return Err(trail.wrap(error, None, self.subcommands()));
        }
        match &self.executor {
            Some(executor) => self.run(executor, acc, trail),
            None => Err(trail.wrap(CommandError::NoExecutor, None, self.subcommands())),
        }
    }

    fn run(
        &self,
        executor: &Executor<T>,
        acc: T,
        trail: &Trail,
    ) -> Result<(), TreeCommandError> {
        executor(acc).map_err(|error| trail.wrap(error, None, self.subcommands()))
    }

    /// Subcommand aliases followed by argument usages, all joined by pipes.
    pub fn shallow_usage(&self, source: &S, acc: &T) -> String {
        let children = self
            .child_index
            .iter()
            .filter(|&(_, &i)| self.children[i].aliases.permits(source))
            .map(|(alias, _)| alias)
            .join("|");
        let arguments = self
            .arguments
            .iter()
            .map(|argument| argument.usage(source, acc))
            .filter(|usage| !usage.is_empty())
            .join("|");
        [children, arguments]
            .into_iter()
            .filter(|part| !part.is_empty())
            .join("|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{
        standard::{int, string},
        testing::TestSource,
    };
    use std::sync::{Arc, Mutex};

    fn run(node: &CommandNode<TestSource, TestSource>, input: &str) -> Result<(), TreeCommandError> {
        let mut args = CommandArgs::parse(input, false).unwrap();
        let source = TestSource::op();
        node.traverse(&source, &mut args, source.clone(), &mut Trail::new("test"))
    }

    #[test]
    fn alias_wins_over_argument() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let mut root: CommandNode<TestSource, TestSource> = CommandNode::new();
        let alias_hits = Arc::clone(&hits);
        root.add_child("list").set_executor(move |_| {
            alias_hits.lock().unwrap().push("alias".to_string());
            Ok(())
        });
        let arg_hits = Arc::clone(&hits);
        root.add_argument(string("name")).set_executor(move |(name, _)| {
            arg_hits.lock().unwrap().push(name);
            Ok(())
        });

        run(&root, "list").unwrap();
        run(&root, "other").unwrap();
        assert_eq!(*hits.lock().unwrap(), ["alias", "other"]);
    }

    #[test]
    fn falls_through_to_next_candidate() {
        let seen = Arc::new(Mutex::new(String::new()));
        let mut root: CommandNode<TestSource, TestSource> = CommandNode::new();
        let as_int = Arc::clone(&seen);
        root.add_argument(int("number")).set_executor(move |(n, _)| {
            *as_int.lock().unwrap() = format!("int {n}");
            Ok(())
        });
        let as_string = Arc::clone(&seen);
        root.add_argument(string("word")).set_executor(move |(w, _)| {
            *as_string.lock().unwrap() = format!("string {w}");
            Ok(())
        });

        run(&root, "42").unwrap();
        assert_eq!(*seen.lock().unwrap(), "int 42");
        run(&root, "hello").unwrap();
        assert_eq!(*seen.lock().unwrap(), "string hello");
    }

    #[test]
    fn reusing_a_child_keeps_its_subtree() {
        let mut root: CommandNode<TestSource, TestSource> = CommandNode::new();
        root.add_child("kit").add_child("give").set_executor(|_| Ok(()));
        root.add_child(["kit", "kits"]).add_child("list").set_executor(|_| Ok(()));
        assert_eq!(root.subcommands(), ["kit", "kits"]);
        run(&root, "kits give").unwrap();
        run(&root, "kit list").unwrap();
    }

    #[test]
    fn unknown_subcommand_lists_siblings() {
        let mut root: CommandNode<TestSource, TestSource> = CommandNode::new();
        root.add_child(["start", "begin"]).set_executor(|_| Ok(()));
        root.add_child("stop").set_executor(|_| Ok(()));
        let err = run(&root, "pause").unwrap_err();
        assert!(matches!(
            err.error(),
            CommandError::UnknownSubcommand { alias } if alias == "pause"
        ));
        assert_eq!(err.subcommands(), ["start", "begin", "stop"]);
    }

    #[test]
    fn executor_errors_carry_the_leaf_path() {
        let mut root: CommandNode<TestSource, TestSource> = CommandNode::new();
        root.add_child("fail")
            .add_argument(int("code"))
            .set_executor(|(code, _)| Err(CommandError::runtime(format!("failed with {code}"))));
        let err = run(&root, "fail 3").unwrap_err();
        assert_eq!(err.usage(), "/test fail <code>");
        assert_eq!(err.error().to_string(), "failed with 3");
    }

    #[test]
    fn arguments_are_tried_before_the_executor() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut root: CommandNode<TestSource, TestSource> = CommandNode::new();
        let bare = Arc::clone(&seen);
        root.set_executor(move |_| {
            bare.lock().unwrap().push("root".to_string());
            Ok(())
        });
        let counted = Arc::clone(&seen);
        root.add_argument(int("n").optional(false))
            .set_executor(move |(n, _)| {
                counted.lock().unwrap().push(format!("argument {n:?}"));
                Ok(())
            });

        run(&root, "").unwrap();
        run(&root, "4").unwrap();
        assert_eq!(*seen.lock().unwrap(), ["argument None", "argument Some(4)"]);
    }

    #[test]
    fn failed_last_candidate_is_not_masked_by_the_executor() {
        let mut root: CommandNode<TestSource, TestSource> = CommandNode::new();
        root.set_executor(|_| Err(CommandError::runtime("executor ran")));
        root.add_argument(int("n")).set_executor(|_| Ok(()));

        let err = run(&root, "").unwrap_err();
        assert!(matches!(err.error(), CommandError::ArgumentParse(_)));
        assert_eq!(err.usage(), "/test <n>");
    }

    #[test]
    fn executor_runs_when_there_are_no_arguments() {
        let mut root: CommandNode<TestSource, TestSource> = CommandNode::new();
        root.set_executor(|_| Err(CommandError::runtime("executor ran")));
        root.add_child("sub").set_executor(|_| Ok(()));

        let err = run(&root, "").unwrap_err();
        assert_eq!(err.error().to_string(), "executor ran");
    }

    #[test]
    fn shallow_usage_lists_aliases_then_arguments() {
        let mut root: CommandNode<TestSource, TestSource> = CommandNode::new();
        root.add_child(["add", "plus"]);
        root.add_child("remove");
        root.add_argument(int("index"));
        root.add_argument(string("name"));
        let source = TestSource::op();
        assert_eq!(
            root.shallow_usage(&source, &source),
            "add|plus|remove|<index>|<name>"
        );
    }
}
