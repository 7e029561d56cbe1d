use crate::commands::error::ArgumentParseError;

/// A single token of a command line together with its byte span in the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleArg {
    pub value: String,
    pub start: usize,
    pub end: usize,
}

/// A restorable read position of a [`CommandArgs`] cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    index: usize,
}

/// Token cursor over a tokenized command line.
///
/// Parameters read tokens with [`CommandArgs::next`]; callers that need to backtrack
/// take a [`Snapshot`] first and [`restore`](CommandArgs::restore) it on failure.
#[derive(Debug, Clone)]
pub struct CommandArgs {
    raw: String,
    args: Vec<SingleArg>,
    index: usize,
}

impl CommandArgs {
    pub fn new(raw: impl Into<String>, args: Vec<SingleArg>) -> Self {
        Self {
            raw: raw.into(),
            args,
            index: 0,
        }
    }

    /// Tokenizes `raw` and wraps the tokens in a cursor.
    ///
    /// In lenient mode an unterminated quote is accepted and a trailing empty token is
    /// kept when the input is empty or ends in whitespace, so completion can see the
    /// word currently being typed.
    pub fn parse(raw: &str, lenient: bool) -> Result<Self, ArgumentParseError> {
        let args = tokenize(raw, lenient)?;
        Ok(Self::new(raw, args))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn all(&self) -> &[SingleArg] {
        &self.args
    }

    pub fn has_next(&self) -> bool {
        self.index < self.args.len()
    }

    /// Number of tokens not yet consumed.
    pub fn remaining(&self) -> usize {
        self.args.len() - self.index
    }

    pub fn peek(&self) -> Option<&str> {
        self.args.get(self.index).map(|arg| arg.value.as_str())
    }

    /// The final token of the input, whether consumed or not.
    pub fn last(&self) -> Option<&str> {
        self.args.last().map(|arg| arg.value.as_str())
    }

    pub fn next(&mut self) -> Result<String, ArgumentParseError> {
        match self.args.get(self.index) {
            Some(arg) => {
                self.index += 1;
                Ok(arg.value.clone())
            }
            None => Err(ArgumentParseError::new(
                "Not enough arguments!",
                None,
                self.raw.len(),
                &self.raw,
            )),
        }
    }

    pub fn next_if_present(&mut self) -> Option<String> {
        self.next().ok()
    }

    /// The unconsumed part of the raw input, starting at the next token.
    pub fn rest(&self) -> &str {
        match self.args.get(self.index) {
            Some(arg) => &self.raw[arg.start..],
            None => "",
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot { index: self.index }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.index = snapshot.index;
    }

    /// Creates a parse error pointing at the most recently consumed token.
    pub fn create_error(&self, message: impl Into<String>) -> ArgumentParseError {
        match self.index.checked_sub(1).and_then(|i| self.args.get(i)) {
            Some(arg) => {
                ArgumentParseError::new(message, Some(arg.value.clone()), arg.start, &self.raw)
            }
            None => ArgumentParseError::new(message, None, 0, &self.raw),
        }
    }
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Splits a command line into whitespace separated tokens.
///
/// Single or double quotes group whitespace into one token and a backslash escapes
/// the following character. Quoted and unquoted runs directly next to each other
/// form one token (`a"b c"` is `ab c`).
pub fn tokenize(input: &str, lenient: bool) -> Result<Vec<SingleArg>, ArgumentParseError> {
    let mut args = Vec::new();
    let mut chars = input.char_indices().peekable();

    loop {
        while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
        let Some(&(start, _)) = chars.peek() else {
            break;
        };

        let mut value = String::new();
        let mut end = input.len();
        while let Some(&(pos, c)) = chars.peek() {
            if c.is_whitespace() {
                end = pos;
                break;
            }
            chars.next();

            if c == '\\' {
                match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None if lenient => {}
                    None => {
                        return Err(ArgumentParseError::new(
                            "Trailing escape character",
                            Some(value),
                            pos,
                            input,
                        ))
                    }
                }
            } else if is_quote(c) {
                let mut terminated = false;
                while let Some((_, q)) = chars.next() {
                    if q == c {
                        terminated = true;
                        break;
                    }
                    if q == '\\' {
                        if let Some((_, escaped)) = chars.next() {
                            value.push(escaped);
                        }
                        continue;
                    }
                    value.push(q);
                }
                if !terminated && !lenient {
                    return Err(ArgumentParseError::new(
                        "Unterminated quoted string",
                        Some(value),
                        pos,
                        input,
                    ));
                }
            } else {
                value.push(c);
            }
        }

        args.push(SingleArg { value, start, end });
    }

    if lenient && input.chars().last().is_none_or(char::is_whitespace) {
        args.push(SingleArg {
            value: String::new(),
            start: input.len(),
            end: input.len(),
        });
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(input: &str, lenient: bool) -> Vec<String> {
        tokenize(input, lenient)
            .unwrap()
            .into_iter()
            .map(|arg| arg.value)
            .collect()
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(values("  give  Steve 64 ", false), ["give", "Steve", "64"]);
        assert!(values("", false).is_empty());
    }

    #[test]
    fn quotes_group_tokens() {
        assert_eq!(
            values(r#"say "hello world" 'it''s'"#, false),
            ["say", "hello world", "its"]
        );
        assert_eq!(values(r#"a"b c"d"#, false), ["ab cd"]);
        assert_eq!(values(r"one\ two", false), ["one two"]);
    }

    #[test]
    fn unterminated_quote_is_strict_error() {
        let err = tokenize(r#"say "oops"#, false).unwrap_err();
        assert_eq!(err.to_string(), "Unterminated quoted string");
        assert_eq!(values(r#"say "oops"#, true), ["say", "oops"]);
    }

    #[test]
    fn lenient_keeps_trailing_empty_token() {
        assert_eq!(values("give ", true), ["give", ""]);
        assert_eq!(values("give", true), ["give"]);
        assert_eq!(values("", true), [""]);
    }

    #[test]
    fn spans_point_into_raw_input() {
        let args = tokenize("tp  Alex", false).unwrap();
        assert_eq!((args[1].start, args[1].end), (4, 8));
    }

    #[test]
    fn snapshot_restores_position() {
        let mut args = CommandArgs::parse("a b c", false).unwrap();
        args.next().unwrap();
        let snapshot = args.snapshot();
        assert_eq!(args.next().unwrap(), "b");
        assert_eq!(args.rest(), "c");
        args.restore(snapshot);
        assert_eq!(args.peek(), Some("b"));
        assert_eq!(args.remaining(), 2);
    }

    #[test]
    fn exhausted_cursor_reports_not_enough_arguments() {
        let mut args = CommandArgs::parse("x", false).unwrap();
        args.next().unwrap();
        let err = args.next().unwrap_err();
        assert_eq!(err.to_string(), "Not enough arguments!");
        assert_eq!(err.position(), 1);
        assert!(args.next_if_present().is_none());
    }
}
