use crate::commands::{
    args::CommandArgs,
    node::{CommandNode, Descent},
    CommandSource,
};
use itertools::Itertools;

impl<S: CommandSource, T: 'static> CommandNode<S, T> {
    /// Completions for the last token of `args`. Never fails.
    ///
    /// While only the token being typed is left, the permitted subcommand aliases and
    /// argument completions are offered. Before that, completion follows the same path
    /// traversal would and silently gives up on branches that do not parse. A parameter
    /// spanning several tokens that runs into the token being typed completes it itself.
    pub(super) fn complete(&self, source: &S, args: &mut CommandArgs, acc: T) -> Vec<String> {
        if args.remaining() <= 1 {
            return self.suggestions(source, args, &acc);
        }

        let snapshot = args.snapshot();
        if let Some(token) = args.next_if_present() {
            if let Some(child) = self.child(&token) {
                if !child.aliases.permits(source) {
                    return Vec::new();
                }
                return child.node.complete(source, args, acc);
            }
        }
        args.restore(snapshot);

        let mut acc = acc;
        for argument in &self.arguments {
            match argument.complete(source, args, acc) {
                Descent::Deeper(suggestions) => return suggestions,
                Descent::Partial(returned) => {
                    let suggestions = argument.suggest(source, args, &returned);
                    return filter_partial(suggestions, args);
                }
                Descent::Stop(returned) => acc = returned,
            }
        }
        Vec::new()
    }

    /// Permitted subcommand aliases and argument completions at the cursor.
    fn suggestions(&self, source: &S, args: &mut CommandArgs, acc: &T) -> Vec<String> {
        let children = self
            .child_index
            .iter()
            .filter(|&(_, &i)| self.children[i].aliases.permits(source))
            .map(|(alias, _)| alias.clone());
        let arguments = self
            .arguments
            .iter()
            .flat_map(|argument| argument.suggest(source, args, acc))
            .collect::<Vec<_>>();
        filter_partial(children.chain(arguments), args)
    }
}

/// Keeps suggestions starting with the last token, compared case-insensitively.
/// Duplicates are dropped, keeping the first.
fn filter_partial(
    suggestions: impl IntoIterator<Item = String>,
    args: &CommandArgs,
) -> Vec<String> {
    let partial = args.last().unwrap_or_default().to_lowercase();
    suggestions
        .into_iter()
        .filter(|suggestion| suggestion.to_lowercase().starts_with(&partial))
        .unique()
        .collect()
}
