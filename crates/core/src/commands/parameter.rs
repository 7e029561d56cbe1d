use crate::commands::{
    args::CommandArgs,
    error::{CommandError, CommandResult},
    standard::usages,
    CommandSource,
};
use std::{fmt::Display, ops::RangeInclusive, sync::Arc};

/// Reads a value of type `T` from the cursor, given the principal and everything parsed before it.
pub type ValueParser<S, P, T> =
    Arc<dyn Fn(&S, &mut CommandArgs, &P) -> CommandResult<T> + Send + Sync>;
/// Lists candidate completions. Has no consumption contract.
pub type ValueCompleter<S, P> = Arc<dyn Fn(&S, &mut CommandArgs, &P) -> Vec<String> + Send + Sync>;
/// Renders the usage fragment of a parameter from its key.
pub type ValueUsage<S, P> = Arc<dyn Fn(&S, &str, &P) -> String + Send + Sync>;

pub fn value_parser<S, P, T, F>(f: F) -> ValueParser<S, P, T>
where
    F: Fn(&S, &mut CommandArgs, &P) -> CommandResult<T> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn value_completer<S, P, F>(f: F) -> ValueCompleter<S, P>
where
    F: Fn(&S, &mut CommandArgs, &P) -> Vec<String> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn value_usage<S, P, F>(f: F) -> ValueUsage<S, P>
where
    F: Fn(&S, &str, &P) -> String + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A named, reusable argument type.
///
/// `S` is the principal type, `P` the accumulator the parameter is attached under and
/// `T` the produced value. Most standard parameters are generic over `P`; a parameter
/// that needs an earlier value names it in `P`, for example `(Collection, P)`.
///
/// Parsers may leave the cursor partially advanced when they fail. Restoring it is up
/// to the caller.
pub struct Parameter<S, P, T> {
    key: String,
    parser: ValueParser<S, P, T>,
    completer: ValueCompleter<S, P>,
    usage: ValueUsage<S, P>,
}

impl<S, P, T> Clone for Parameter<S, P, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            parser: Arc::clone(&self.parser),
            completer: Arc::clone(&self.completer),
            usage: Arc::clone(&self.usage),
        }
    }
}

impl<S: 'static, P: 'static, T: 'static> Parameter<S, P, T> {
    pub fn new(
        key: impl Into<String>,
        parser: ValueParser<S, P, T>,
        completer: ValueCompleter<S, P>,
        usage: ValueUsage<S, P>,
    ) -> Self {
        Self {
            key: key.into(),
            parser,
            completer,
            usage,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn parse(&self, source: &S, args: &mut CommandArgs, previous: &P) -> CommandResult<T> {
        (self.parser)(source, args, previous)
    }

    pub fn complete(&self, source: &S, args: &mut CommandArgs, previous: &P) -> Vec<String> {
        (self.completer)(source, args, previous)
    }

    pub fn usage(&self, source: &S, previous: &P) -> String {
        (self.usage)(source, &self.key, previous)
    }

    pub fn with_completer(mut self, completer: ValueCompleter<S, P>) -> Self {
        self.completer = completer;
        self
    }

    pub fn with_usage(mut self, usage: ValueUsage<S, P>) -> Self {
        self.usage = usage;
        self
    }

    /// Yields `None` when no input is left.
    ///
    /// A failed parse is swallowed (and the cursor restored) if more input follows the
    /// failure or `weak` is set; otherwise the error propagates.
    pub fn optional(self, weak: bool) -> Parameter<S, P, Option<T>> {
        let parser = self.parser;
        Parameter {
            key: self.key,
            parser: value_parser(move |source, args, previous| {
                if !args.has_next() {
                    return Ok(None);
                }
                let snapshot = args.snapshot();
                match parser(source, args, previous) {
                    Ok(value) => Ok(Some(value)),
                    Err(err) if err.is_retryable() && (weak || args.has_next()) => {
                        args.restore(snapshot);
                        Ok(None)
                    }
                    Err(err) => Err(err),
                }
            }),
            completer: self.completer,
            usage: usages::optional(self.usage),
        }
    }

    /// Like [`optional`](Parameter::optional), falling back to `default`.
    pub fn optional_or(self, default: T, weak: bool) -> Parameter<S, P, T>
    where
        T: Clone + Send + Sync,
    {
        let parser = self.parser;
        Parameter {
            key: self.key,
            parser: value_parser(move |source, args, previous| {
                if !args.has_next() {
                    return Ok(default.clone());
                }
                let snapshot = args.snapshot();
                match parser(source, args, previous) {
                    Ok(value) => Ok(value),
                    Err(err) if err.is_retryable() && (weak || args.has_next()) => {
                        args.restore(snapshot);
                        Ok(default.clone())
                    }
                    Err(err) => Err(err),
                }
            }),
            completer: self.completer,
            usage: usages::optional(self.usage),
        }
    }

    /// Parses values until the cursor is exhausted.
    pub fn remaining(self) -> Parameter<S, P, Vec<T>> {
        let parser = self.parser;
        let inner = Arc::clone(&parser);
        let completer = self.completer;
        Parameter {
            key: self.key,
            parser: value_parser(move |source, args, previous| {
                let mut values = Vec::new();
                while args.has_next() {
                    values.push(parser(source, args, previous)?);
                }
                Ok(values)
            }),
            completer: value_completer(move |source, args, previous| {
                while args.has_next() {
                    let snapshot = args.snapshot();
                    if inner(source, args, previous).is_err() {
                        args.restore(snapshot);
                        return completer(source, args, previous);
                    }
                }
                Vec::new()
            }),
            usage: usages::variadic(),
        }
    }

    /// Parses exactly `count` values.
    pub fn repeated(self, count: usize) -> Parameter<S, P, Vec<T>> {
        let parser = self.parser;
        let inner = Arc::clone(&parser);
        let completer = self.completer;
        Parameter {
            key: self.key,
            parser: value_parser(move |source, args, previous| {
                (0..count)
                    .map(|_| parser(source, args, previous))
                    .collect::<CommandResult<Vec<_>>>()
            }),
            completer: value_completer(move |source, args, previous| {
                for _ in 0..count {
                    let snapshot = args.snapshot();
                    if inner(source, args, previous).is_err() {
                        args.restore(snapshot);
                        return completer(source, args, previous);
                    }
                }
                Vec::new()
            }),
            usage: usages::variadic(),
        }
    }

    /// Rejects `value` outside of `range` with an error citing both bounds.
    pub fn bounded(self, range: RangeInclusive<T>) -> Parameter<S, P, T>
    where
        T: PartialOrd + Display + Send + Sync,
    {
        let parser = self.parser;
        Parameter {
            key: self.key,
            parser: value_parser(move |source, args, previous| {
                let value = parser(source, args, previous)?;
                if !range.contains(&value) {
                    return Err(args
                        .create_error(format!(
                            "Input must be between {} and {}",
                            range.start(),
                            range.end()
                        ))
                        .into());
                }
                Ok(value)
            }),
            completer: self.completer,
            usage: self.usage,
        }
    }

    /// Falls back to a value derived from the principal when the parse fails.
    pub fn or_source(
        self,
        from_source: impl Fn(&S) -> Option<T> + Send + Sync + 'static,
    ) -> Parameter<S, P, T> {
        let parser = self.parser;
        Parameter {
            key: self.key,
            parser: value_parser(move |source, args, previous| {
                let snapshot = args.snapshot();
                match parser(source, args, previous) {
                    Ok(value) => Ok(value),
                    Err(err) if err.is_retryable() => match from_source(source) {
                        Some(value) => {
                            args.restore(snapshot);
                            Ok(value)
                        }
                        None => Err(err),
                    },
                    Err(err) => Err(err),
                }
            }),
            completer: self.completer,
            usage: self.usage,
        }
    }
}

impl<S: CommandSource, P: 'static, T: 'static> Parameter<S, P, T> {
    /// Checks `permission` before attempting to parse.
    pub fn permission(self, permission: impl Into<String>) -> Parameter<S, P, T> {
        let permission = permission.into();
        let parser = self.parser;
        Parameter {
            key: self.key,
            parser: value_parser(move |source: &S, args, previous| {
                if !source.has_permission(&permission) {
                    return Err(CommandError::permission_denied(permission.clone()));
                }
                parser(source, args, previous)
            }),
            completer: self.completer,
            usage: self.usage,
        }
    }
}
