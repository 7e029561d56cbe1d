//! The standard parameter library.
//!
//! Every constructor is generic over the principal `S` and the accumulator `P`, so a
//! parameter can be attached anywhere in a tree.

use crate::commands::{
    args::CommandArgs,
    argument_parser::{
        boolean_choices, parse_big_decimal, parse_big_integer, parse_choice, parse_double,
        parse_float, parse_integer, parse_long, parse_string, parse_url, parse_uuid,
    },
    catalog::{Catalog, EnumValue, SubjectCollection},
    error::CommandResult,
    parameter::{value_completer, value_parser, Parameter},
};
use indexmap::IndexMap;
use std::sync::Arc;
use uuid::Uuid;

pub use bigdecimal::BigDecimal;
pub use num_bigint::BigInt;
pub use url::Url;

pub mod usages {
    use crate::commands::parameter::{value_usage, ValueUsage};

    /// `<key>`
    pub fn single<S: 'static, P: 'static>() -> ValueUsage<S, P> {
        value_usage(|_, key, _| format!("<{key}>"))
    }

    /// `<key...>`
    pub fn variadic<S: 'static, P: 'static>() -> ValueUsage<S, P> {
        value_usage(|_, key, _| format!("<{key}...>"))
    }

    /// Wraps another usage in brackets.
    pub fn optional<S: 'static, P: 'static>(inner: ValueUsage<S, P>) -> ValueUsage<S, P> {
        value_usage(move |source, key, previous| format!("[{}]", inner(source, key, previous)))
    }

    pub fn empty<S: 'static, P: 'static>() -> ValueUsage<S, P> {
        value_usage(|_, _, _| String::new())
    }
}

pub mod completers {
    use crate::commands::{
        catalog::{Catalog, EnumValue},
        parameter::{value_completer, ValueCompleter},
    };
    use std::sync::Arc;

    pub fn empty<S: 'static, P: 'static>() -> ValueCompleter<S, P> {
        value_completer(|_, _, _| Vec::new())
    }

    pub fn choices<S: 'static, P: 'static>(choices: Vec<String>) -> ValueCompleter<S, P> {
        value_completer(move |_, _, _| choices.clone())
    }

    pub fn catalog<S: 'static, P: 'static, T: 'static>(
        catalog: Arc<dyn Catalog<T>>,
    ) -> ValueCompleter<S, P> {
        value_completer(move |_, _, _| catalog.ids())
    }

    pub fn enum_ids<S: 'static, P: 'static, E: EnumValue>() -> ValueCompleter<S, P> {
        value_completer(|_, _, _| E::VARIANTS.iter().map(|v| v.id().to_string()).collect())
    }
}

fn simple<S: 'static, P: 'static, T: 'static>(
    key: impl Into<String>,
    parse: fn(&mut CommandArgs) -> CommandResult<T>,
) -> Parameter<S, P, T> {
    Parameter::new(
        key,
        value_parser(move |_, args, _| parse(args)),
        completers::empty(),
        usages::single(),
    )
}

/// A single token.
pub fn string<S: 'static, P: 'static>(key: impl Into<String>) -> Parameter<S, P, String> {
    simple(key, parse_string)
}

pub fn int<S: 'static, P: 'static>(key: impl Into<String>) -> Parameter<S, P, i32> {
    simple(key, parse_integer)
}

pub fn long<S: 'static, P: 'static>(key: impl Into<String>) -> Parameter<S, P, i64> {
    simple(key, parse_long)
}

pub fn float<S: 'static, P: 'static>(key: impl Into<String>) -> Parameter<S, P, f32> {
    simple(key, parse_float)
}

pub fn double<S: 'static, P: 'static>(key: impl Into<String>) -> Parameter<S, P, f64> {
    simple(key, parse_double)
}

pub fn bounded_int<S: 'static, P: 'static>(
    key: impl Into<String>,
    min: i32,
    max: i32,
) -> Parameter<S, P, i32> {
    int(key).bounded(min..=max)
}

pub fn bounded_long<S: 'static, P: 'static>(
    key: impl Into<String>,
    min: i64,
    max: i64,
) -> Parameter<S, P, i64> {
    long(key).bounded(min..=max)
}

pub fn bounded_double<S: 'static, P: 'static>(
    key: impl Into<String>,
    min: f64,
    max: f64,
) -> Parameter<S, P, f64> {
    double(key).bounded(min..=max)
}

pub fn uuid<S: 'static, P: 'static>(key: impl Into<String>) -> Parameter<S, P, Uuid> {
    simple(key, parse_uuid)
}

/// An integer of any size.
pub fn big_integer<S: 'static, P: 'static>(key: impl Into<String>) -> Parameter<S, P, BigInt> {
    simple(key, parse_big_integer)
}

/// A decimal number of any size and precision.
pub fn big_decimal<S: 'static, P: 'static>(key: impl Into<String>) -> Parameter<S, P, BigDecimal> {
    simple(key, parse_big_decimal)
}

/// An absolute url.
pub fn url<S: 'static, P: 'static>(key: impl Into<String>) -> Parameter<S, P, Url> {
    simple(key, parse_url)
}

/// One of a fixed set of words, matched case-insensitively.
pub fn choices<S, P, T, I, K>(key: impl Into<String>, choices: I) -> Parameter<S, P, T>
where
    S: 'static,
    P: 'static,
    T: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = (K, T)>,
    K: Into<String>,
{
    let choices: IndexMap<String, T> = choices
        .into_iter()
        .map(|(word, value)| (word.into().to_lowercase(), value))
        .collect();
    let words = choices.keys().cloned().collect();
    Parameter::new(
        key,
        value_parser(move |_, args, _| parse_choice(args, &choices)),
        completers::choices(words),
        usages::single(),
    )
}

/// `true`/`t`/`yes`/`y`/`1` or `false`/`f`/`no`/`n`/`0`.
pub fn boolean<S: 'static, P: 'static>(key: impl Into<String>) -> Parameter<S, P, bool> {
    choices(key, boolean_choices())
}

/// Yields the principal without consuming input.
pub fn command_source<S: Clone + 'static, P: 'static>(key: impl Into<String>) -> Parameter<S, P, S> {
    Parameter::new(
        key,
        value_parser(|source: &S, _, _| Ok(source.clone())),
        completers::empty(),
        usages::empty(),
    )
}

/// Resolves a token against `catalog`, failing with "`<kind> '<token>' was not found`".
pub fn catalog_type<S: 'static, P: 'static, T: 'static>(
    key: impl Into<String>,
    kind: &'static str,
    catalog: Arc<dyn Catalog<T>>,
) -> Parameter<S, P, T> {
    let completer = completers::catalog(Arc::clone(&catalog));
    Parameter::new(
        key,
        value_parser(move |_, args, _| {
            let token = args.next()?;
            catalog
                .get(&token)
                .ok_or_else(|| args.create_error(format!("{kind} '{token}' was not found")).into())
        }),
        completer,
        usages::single(),
    )
}

/// An online player.
pub fn player<S: 'static, P: 'static, T: 'static>(
    key: impl Into<String>,
    catalog: Arc<dyn Catalog<T>>,
) -> Parameter<S, P, T> {
    catalog_type(key, "Player", catalog)
}

/// Any known user, online or not.
pub fn user<S: 'static, P: 'static, T: 'static>(
    key: impl Into<String>,
    catalog: Arc<dyn Catalog<T>>,
) -> Parameter<S, P, T> {
    catalog_type(key, "User", catalog)
}

pub fn world<S: 'static, P: 'static, T: 'static>(
    key: impl Into<String>,
    catalog: Arc<dyn Catalog<T>>,
) -> Parameter<S, P, T> {
    catalog_type(key, "Loaded World", catalog)
}

/// A world whether it is loaded or not.
pub fn world_properties<S: 'static, P: 'static, T: 'static>(
    key: impl Into<String>,
    catalog: Arc<dyn Catalog<T>>,
) -> Parameter<S, P, T> {
    catalog_type(key, "World", catalog)
}

pub fn plugin<S: 'static, P: 'static, T: 'static>(
    key: impl Into<String>,
    catalog: Arc<dyn Catalog<T>>,
) -> Parameter<S, P, T> {
    catalog_type(key, "Plugin", catalog)
}

pub fn enum_value<S: 'static, P: 'static, E: EnumValue>(key: impl Into<String>) -> Parameter<S, P, E> {
    Parameter::new(
        key,
        value_parser(|_, args, _| {
            let token = args.next()?;
            E::from_id(&token).ok_or_else(|| {
                args.create_error(format!("{} '{token}' was not found", E::NAME))
                    .into()
            })
        }),
        completers::enum_ids::<S, P, E>(),
        usages::single(),
    )
}

pub fn subject_collection<S: 'static, P: 'static, T: 'static>(
    key: impl Into<String>,
    collections: Arc<dyn Catalog<SubjectCollection<T>>>,
) -> Parameter<S, P, SubjectCollection<T>> {
    let completer = completers::catalog(Arc::clone(&collections));
    Parameter::new(
        key,
        value_parser(move |_, args, _| {
            let token = args.next()?;
            collections.get(&token).ok_or_else(|| {
                args.create_error(format!("Could not find any subject collection named '{token}'"))
                    .into()
            })
        }),
        completer,
        usages::single(),
    )
}

/// A subject of the collection parsed just before it.
pub fn subject<S: 'static, P: 'static, T: 'static>(
    key: impl Into<String>,
) -> Parameter<S, (SubjectCollection<T>, P), T> {
    Parameter::new(
        key,
        value_parser(|_, args, (collection, _): &(SubjectCollection<T>, P)| {
            let token = args.next()?;
            collection.subjects().get(&token).ok_or_else(|| {
                args.create_error(format!(
                    "Could not find any {} subject named '{token}'",
                    collection.identifier()
                ))
                .into()
            })
        }),
        value_completer(|_, _, (collection, _): &(SubjectCollection<T>, P)| {
            collection.subjects().ids()
        }),
        usages::single(),
    )
}

/// A subject of the fixed collection `identifier`.
pub fn subject_of<S: 'static, P: 'static, T: 'static>(
    key: impl Into<String>,
    collections: Arc<dyn Catalog<SubjectCollection<T>>>,
    identifier: impl Into<String>,
) -> Parameter<S, P, T> {
    let identifier = identifier.into();
    let completions = Arc::clone(&collections);
    let completed = identifier.clone();
    Parameter::new(
        key,
        value_parser(move |_, args, _| {
            let token = args.next()?;
            collections
                .get(&identifier)
                .and_then(|collection| collection.subjects().get(&token))
                .ok_or_else(|| {
                    args.create_error(format!(
                        "Could not find any {identifier} subject named '{token}'"
                    ))
                    .into()
                })
        }),
        value_completer(move |_, _, _| {
            completions
                .get(&completed)
                .map(|collection| collection.subjects().ids())
                .unwrap_or_default()
        }),
        usages::single(),
    )
}
