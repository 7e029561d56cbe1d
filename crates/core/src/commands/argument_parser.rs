use crate::commands::{args::CommandArgs, error::CommandResult};
use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use itertools::Itertools;
use num_bigint::BigInt;
use std::fmt::Display;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;
use url::Url;
use uuid::Uuid;

pub fn parse_string(args: &mut CommandArgs) -> CommandResult<String> {
    Ok(args.next()?)
}

fn parse_number<N: FromStr>(args: &mut CommandArgs, kind: &str) -> CommandResult<N> {
    let token = args.next()?;
    token.parse::<N>().map_err(|_| {
        args.create_error(format!("Expected {kind}, but input '{token}' was not"))
            .into()
    })
}

/// Like `parse_number`, but an out of range token is reported with the type's bounds.
fn parse_integral<N>(args: &mut CommandArgs, kind: &str, min: N, max: N) -> CommandResult<N>
where
    N: FromStr<Err = ParseIntError> + Display,
{
    let token = args.next()?;
    token.parse::<N>().map_err(|err| {
        let message = match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                format!("Expected {kind} between {min} and {max}, but input '{token}' was not")
            }
            _ => format!("Expected {kind}, but input '{token}' was not"),
        };
        args.create_error(message).into()
    })
}

pub fn parse_integer(args: &mut CommandArgs) -> CommandResult<i32> {
    parse_integral(args, "an integer", i32::MIN, i32::MAX)
}

pub fn parse_long(args: &mut CommandArgs) -> CommandResult<i64> {
    parse_integral(args, "a long", i64::MIN, i64::MAX)
}

pub fn parse_float(args: &mut CommandArgs) -> CommandResult<f32> {
    parse_number(args, "a float")
}

pub fn parse_double(args: &mut CommandArgs) -> CommandResult<f64> {
    parse_number(args, "a double")
}

pub fn parse_big_integer(args: &mut CommandArgs) -> CommandResult<BigInt> {
    parse_number(args, "an integer")
}

pub fn parse_big_decimal(args: &mut CommandArgs) -> CommandResult<BigDecimal> {
    parse_number(args, "a number")
}

/// Looks the lowercased token up in `choices`.
pub fn parse_choice<T: Clone>(
    args: &mut CommandArgs,
    choices: &IndexMap<String, T>,
) -> CommandResult<T> {
    let token = args.next()?;
    match choices.get(&token.to_lowercase()) {
        Some(value) => Ok(value.clone()),
        None => Err(args
            .create_error(format!(
                "Argument was not a valid choice. Valid choices: {}",
                choices.keys().join(", ")
            ))
            .into()),
    }
}

pub fn boolean_choices() -> IndexMap<String, bool> {
    ["true", "t", "yes", "y", "1"]
        .into_iter()
        .map(|word| (word.to_string(), true))
        .chain(
            ["false", "f", "no", "n", "0"]
                .into_iter()
                .map(|word| (word.to_string(), false)),
        )
        .collect()
}

pub fn parse_uuid(args: &mut CommandArgs) -> CommandResult<Uuid> {
    let token = args.next()?;
    Uuid::parse_str(&token).map_err(|_| args.create_error("Invalid UUID").into())
}

pub fn parse_url(args: &mut CommandArgs) -> CommandResult<Url> {
    let token = args.next()?;
    Url::parse(&token).map_err(|_| args.create_error("Invalid url").into())
}
