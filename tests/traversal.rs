mod common;

use cmdtree_core::commands::parameter::{value_completer, value_parser};
use cmdtree_core::commands::standard::{int, string, usages};
use cmdtree_core::commands::{
    Aliases, CommandCallable, CommandError, CommandRoot, Parameter, TreeCommandError,
};
use common::{give, sum, Source};
use paste::paste;

fn process(
    root: &CommandRoot<Source>,
    source: &Source,
    input: &str,
) -> Result<Vec<String>, TreeCommandError> {
    root.process(source, input)?;
    Ok(source.take_log())
}

macro_rules! sum_accepts {
    ($($name:ident: $input:literal => $expected:literal,)*) => {
        paste! {
            $(
                #[test]
                fn [<sum_accepts_ $name>]() {
                    let source = Source::op();
                    assert_eq!(process(&sum(), &source, $input).unwrap(), [$expected]);
                }
            )*
        }
    };
}

sum_accepts! {
    two_values: "5 7" => "5 7",
    negative_values: "-3 4" => "-3 4",
    quoted_values: "\"5\" '7'" => "5 7",
    extra_whitespace: "  5    7 " => "5 7",
}

macro_rules! sum_rejects {
    ($($name:ident: $input:literal => $usage:literal, $error:pat,)*) => {
        paste! {
            $(
                #[test]
                fn [<sum_rejects_ $name>]() {
                    let err = process(&sum(), &Source::op(), $input).unwrap_err();
                    assert_eq!(err.root_alias(), "sum");
                    assert_eq!(err.usage(), $usage);
                    assert!(matches!(err.error(), $error), "unexpected error {:?}", err.error());
                }
            )*
        }
    };
}

sum_rejects! {
    bad_second_value: "5 foo" => "/sum <value1> <value2>", CommandError::ArgumentParse(_),
    bad_first_value: "foo 7" => "/sum <value1>", CommandError::ArgumentParse(_),
    missing_value: "5" => "/sum <value1> <value2>", CommandError::ArgumentParse(_),
    extra_value: "5 7 9" => "/sum <value1> <value2>", CommandError::TooManyArguments { .. },
    unterminated_quote: "5 \"7" => "/sum", CommandError::ArgumentParse(_),
}

#[test]
fn parse_errors_cite_the_token() {
    let err = process(&sum(), &Source::op(), "5 foo").unwrap_err();
    let CommandError::ArgumentParse(parse) = err.error() else {
        panic!("expected a parse error, got {:?}", err.error());
    };
    assert_eq!(parse.token(), Some("foo"));
    assert_eq!(parse.position(), 2);

    let rendered = err.to_string();
    assert!(rendered.contains("foo"));
    assert!(rendered.contains("/sum <value1> <value2>"));
}

#[test]
fn too_many_arguments_keeps_the_rest() {
    let err = process(&sum(), &Source::op(), "5 7 9 10").unwrap_err();
    assert!(matches!(
        err.error(),
        CommandError::TooManyArguments { remaining } if remaining == "9 10"
    ));
}

#[test]
fn empty_input_on_branching_root_has_no_executor() {
    let err = process(&give(), &Source::op(), "").unwrap_err();
    assert!(matches!(err.error(), CommandError::NoExecutor));
    assert_eq!(err.subcommands(), ["give"]);
    assert_eq!(err.usage(), "/item");
}

#[test]
fn alias_precedes_argument() {
    let source = Source::op();
    assert_eq!(process(&give(), &source, "give stone").unwrap(), ["give stone"]);
    assert_eq!(process(&give(), &source, "gift").unwrap(), ["name gift"]);
    assert_eq!(give().usage(&source), "give|<name>");

    let root = CommandRoot::<Source>::build("pick", |node| {
        node.add_child("5").set_executor(|source: Source| {
            source.record("alias");
            Ok(())
        });
        node.add_argument(int("number")).set_executor(|(number, source)| {
            source.record(format!("number {number}"));
            Ok(())
        });
    });
    assert_eq!(process(&root, &source, "5").unwrap(), ["alias"]);
    assert_eq!(process(&root, &source, "6").unwrap(), ["number 6"]);
}

#[test]
fn optional_argument_runs_before_the_root_executor() {
    let source = Source::op();
    let root = CommandRoot::<Source>::build("page", |node| {
        node.set_executor(|source: Source| {
            source.record("root executor");
            Ok(())
        });
        node.add_argument(int("n").optional(false))
            .set_executor(|(n, source): (Option<i32>, Source)| {
                source.record(format!("argument executor {n:?}"));
                Ok(())
            });
    });
    assert_eq!(process(&root, &source, "").unwrap(), ["argument executor None"]);
    assert_eq!(process(&root, &source, "2").unwrap(), ["argument executor Some(2)"]);

    let err = process(&root, &source, "two").unwrap_err();
    assert_eq!(err.usage(), "/page [<n>]");
}

#[test]
fn rejected_candidate_is_rolled_back() {
    let source = Source::op();
    let root = CommandRoot::<Source>::build("pair", |node| {
        // Consumes two tokens before failing on the second.
        node.add_argument(int("a").repeated(2))
            .set_executor(|(values, source)| {
                source.record(format!("ints {values:?}"));
                Ok(())
            });
        node.add_argument(string("word"))
            .add_argument(string("other"))
            .set_executor(|(other, (word, source))| {
                source.record(format!("words {word} {other}"));
                Ok(())
            });
    });
    assert_eq!(process(&root, &source, "1 2").unwrap(), ["ints [1, 2]"]);
    assert_eq!(process(&root, &source, "1 x").unwrap(), ["words 1 x"]);
}

#[test]
fn committed_argument_is_not_revisited() {
    let source = Source::op();
    let root = CommandRoot::<Source>::build("pick", |node| {
        node.add_argument(string("word"))
            .add_argument(int("count"))
            .set_executor(|_| Ok(()));
        node.add_argument(int("number"))
            .add_argument(string("label"))
            .set_executor(|(label, (number, source))| {
                source.record(format!("{number} {label}"));
                Ok(())
            });
    });
    // `3` parses as a word first, and the failure below it is final.
    let err = process(&root, &source, "3 label").unwrap_err();
    assert_eq!(err.usage(), "/pick <word> <count>");
    assert!(source.take_log().is_empty());
}

#[test]
fn branch_permission_is_checked() {
    let root = CommandRoot::<Source>::build("admin", |node| {
        node.add_child(Aliases::from("reload").permission("admin.reload"))
            .set_executor(|source: Source| {
                source.record("reloaded");
                Ok(())
            });
    });
    let guest = Source::with_permissions(&[]);
    let err = process(&root, &guest, "reload").unwrap_err();
    assert!(matches!(
        err.error(),
        CommandError::PermissionDenied { permission: Some(permission) } if permission == "admin.reload"
    ));
    assert_eq!(err.usage(), "/admin reload");

    let admin = Source::with_permissions(&["admin.reload"]);
    assert_eq!(process(&root, &admin, "reload").unwrap(), ["reloaded"]);
}

/// Accepts only numbers below the value parsed before it.
fn below() -> Parameter<Source, (i32, Source), i32> {
    Parameter::new(
        "below",
        value_parser(|_, args, (limit, _): &(i32, Source)| {
            let token = args.next()?;
            match token.parse::<i32>() {
                Ok(value) if value < *limit => Ok(value),
                _ => Err(args
                    .create_error(format!("Expected a number below {limit}"))
                    .into()),
            }
        }),
        value_completer(|_, _, (limit, _): &(i32, Source)| {
            (0..*limit).map(|value| value.to_string()).collect()
        }),
        usages::single(),
    )
}

#[test]
fn parameters_see_earlier_values() {
    let source = Source::op();
    let root = CommandRoot::<Source>::build("range", |node| {
        node.add_argument(int("limit"))
            .add_argument(below())
            .set_executor(|(value, (limit, source))| {
                source.record(format!("{value} < {limit}"));
                Ok(())
            });
    });
    assert_eq!(process(&root, &source, "10 3").unwrap(), ["3 < 10"]);

    let err = process(&root, &source, "3 10").unwrap_err();
    let CommandError::ArgumentParse(parse) = err.error() else {
        panic!("expected a parse error, got {:?}", err.error());
    };
    assert_eq!(parse.message(), "Expected a number below 3");
    assert_eq!(root.suggestions(&source, "3 "), ["0", "1", "2"]);
}

#[test]
fn usage_and_completion_have_no_side_effects() {
    let root = sum();
    let source = Source::op();
    let usage = root.usage(&source);
    let suggestions = root.suggestions(&source, "5 ");
    assert_eq!(root.usage(&source), usage);
    assert_eq!(root.suggestions(&source, "5 "), suggestions);
    assert!(source.take_log().is_empty());
}
