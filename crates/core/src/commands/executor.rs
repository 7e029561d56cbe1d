//! Adapters for building executors out of smaller blocks.
//!
//! Each helper takes the accumulator an executor would receive (the principal itself
//! when attached to a root) and returns a new executor for `set_executor`.

use crate::commands::error::{CommandError, CommandResult};

/// Prepends a value computed from the accumulator before running `block`.
pub fn compute<T: 'static, C: 'static>(
    compute: impl Fn(&T) -> C + Send + Sync + 'static,
    block: impl Fn((C, T)) -> CommandResult<()> + Send + Sync + 'static,
) -> impl Fn(T) -> CommandResult<()> + Send + Sync + 'static {
    move |acc| {
        let computed = compute(&acc);
        block((computed, acc))
    }
}

/// Maps the accumulator before running `block`.
pub fn transform<T: 'static, U: 'static>(
    transform: impl Fn(T) -> U + Send + Sync + 'static,
    block: impl Fn(U) -> CommandResult<()> + Send + Sync + 'static,
) -> impl Fn(T) -> CommandResult<()> + Send + Sync + 'static {
    move |acc| block(transform(acc))
}

/// Runs `block` only when `project` accepts the accumulator, failing with
/// "You must be a `kind` to use that command!" otherwise.
pub fn must_be<T: 'static, U: 'static>(
    kind: &'static str,
    project: impl Fn(T) -> Option<U> + Send + Sync + 'static,
    block: impl Fn(U) -> CommandResult<()> + Send + Sync + 'static,
) -> impl Fn(T) -> CommandResult<()> + Send + Sync + 'static {
    move |acc| match project(acc) {
        Some(projected) => block(projected),
        None => Err(CommandError::runtime(format!(
            "You must be a {kind} to use that command!"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Sender {
        Player(String),
        Console,
    }

    #[test]
    fn compute_prepends() {
        let executor = compute(
            |sender: &Sender| matches!(sender, Sender::Console),
            |(is_console, sender): (bool, Sender)| {
                assert!(is_console);
                assert_eq!(sender, Sender::Console);
                Ok(())
            },
        );
        executor(Sender::Console).unwrap();
    }

    #[test]
    fn transform_maps() {
        let executor = transform(
            |(count, _sender): (i32, Sender)| count * 2,
            |doubled: i32| {
                assert_eq!(doubled, 10);
                Ok(())
            },
        );
        executor((5, Sender::Console)).unwrap();
    }

    #[test]
    fn must_be_rejects_other_kinds() {
        let executor = must_be(
            "player",
            |sender: Sender| match sender {
                Sender::Player(name) => Some(name),
                Sender::Console => None,
            },
            |_name: String| Ok(()),
        );
        executor(Sender::Player("Steve".into())).unwrap();
        assert_eq!(
            executor(Sender::Console).unwrap_err().to_string(),
            "You must be a player to use that command!"
        );
    }
}
