use cmdtree_text::{ColorCode, TextComponent};
use itertools::Itertools;
use thiserror::Error;

/// A parameter rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ArgumentParseError {
    message: String,
    token: Option<String>,
    position: usize,
    input: String,
}

impl ArgumentParseError {
    pub fn new(
        message: impl Into<String>,
        token: Option<String>,
        position: usize,
        input: &str,
    ) -> Self {
        Self {
            message: message.into(),
            token,
            position,
            input: input.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The offending token, if the failure was caused by one.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Byte offset of the failure in the raw input.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The message followed by the raw input with a caret under the failure position.
    pub fn annotated(&self) -> String {
        let column = self.input[..self.position.min(self.input.len())]
            .chars()
            .count();
        format!(
            "{}\n{}\n{}^",
            self.message,
            self.input,
            " ".repeat(column)
        )
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("You do not have permission to use this command!")]
    PermissionDenied { permission: Option<String> },
    #[error("Unknown subcommand: {alias}")]
    UnknownSubcommand { alias: String },
    #[error(transparent)]
    ArgumentParse(#[from] ArgumentParseError),
    #[error("Too many arguments: {remaining}")]
    TooManyArguments { remaining: String },
    #[error("No executor found for this subcommand.")]
    NoExecutor,
    #[error("{0}")]
    Runtime(String),
}

impl CommandError {
    pub fn runtime(message: impl Into<String>) -> Self {
        CommandError::Runtime(message.into())
    }

    pub fn permission_denied(permission: impl Into<String>) -> Self {
        CommandError::PermissionDenied {
            permission: Some(permission.into()),
        }
    }

    /// Whether the next argument candidate may be tried after this error.
    pub(super) fn is_retryable(&self) -> bool {
        matches!(self, CommandError::ArgumentParse(_))
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// A [`CommandError`] decorated with the command path it was raised on.
#[derive(Debug, Error)]
#[error("{}", render_plain(.root_alias, .usage, .subcommands, .error))]
pub struct TreeCommandError {
    root_alias: String,
    usage: String,
    subcommands: Vec<String>,
    #[source]
    error: CommandError,
}

fn render_plain(
    root_alias: &str,
    usage: &str,
    subcommands: &[String],
    error: &CommandError,
) -> String {
    let mut out = format!("Exception from /{root_alias}\n{error}\n\nUsage: {usage}");
    if !subcommands.is_empty() {
        out.push_str("\nSubcommands: ");
        out.push_str(&subcommands.iter().join(", "));
    }
    out
}

impl TreeCommandError {
    pub(super) fn new(
        root_alias: impl Into<String>,
        usage: impl Into<String>,
        subcommands: Vec<String>,
        error: CommandError,
    ) -> Self {
        Self {
            root_alias: root_alias.into(),
            usage: usage.into(),
            subcommands,
            error,
        }
    }

    pub fn root_alias(&self) -> &str {
        &self.root_alias
    }

    /// Usage from the root to the failure point, e.g. `/sum <value1> <value2>`.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn subcommands(&self) -> &[String] {
        &self.subcommands
    }

    pub fn error(&self) -> &CommandError {
        &self.error
    }

    pub fn into_inner(self) -> CommandError {
        self.error
    }

    pub fn to_text(&self) -> Vec<TextComponent> {
        let mut text = vec![
            TextComponent::builder("Exception from ")
                .color_code(ColorCode::Red)
                .italic(true)
                .finish(),
            TextComponent::colored(format!("/{}\n", self.root_alias), ColorCode::Yellow),
            TextComponent::colored(format!("{}\n\n", self.error), ColorCode::Red),
            TextComponent::colored("Usage: ", ColorCode::Red),
            TextComponent::colored(self.usage.clone(), ColorCode::Yellow),
        ];
        if !self.subcommands.is_empty() {
            text.push(TextComponent::colored("\nSubcommands: ", ColorCode::Red));
            let names = self
                .subcommands
                .iter()
                .map(|name| TextComponent::colored(name.clone(), ColorCode::Yellow));
            text.extend(Itertools::intersperse(
                names,
                TextComponent::colored(", ", ColorCode::Red),
            ));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotated_points_at_token() {
        let err = ArgumentParseError::new("Bad number", Some("foo".into()), 6, "add 5 foo");
        assert_eq!(err.annotated(), "Bad number\nadd 5 foo\n      ^");
    }

    #[test]
    fn tree_error_renders_footer() {
        let err = TreeCommandError::new(
            "kit",
            "/kit give",
            vec!["starter".into(), "pvp".into()],
            CommandError::NoExecutor,
        );
        assert_eq!(
            err.to_string(),
            "Exception from /kit\nNo executor found for this subcommand.\n\n\
             Usage: /kit give\nSubcommands: starter, pvp"
        );
    }

    #[test]
    fn tree_error_omits_empty_subcommands() {
        let err = TreeCommandError::new(
            "sum",
            "/sum",
            Vec::new(),
            CommandError::runtime("boom"),
        );
        assert!(!err.to_string().contains("Subcommands"));
        let plain: String = err.to_text().iter().map(TextComponent::to_plain).collect();
        assert_eq!(plain, err.to_string());
    }
}
