use super::CommandSource;

/// The names of one command tree edge, plus the permission needed to follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aliases {
    aliases: Vec<String>,
    permission: Option<String>,
}

impl Aliases {
    /// Panics if `aliases` is empty. Duplicates are dropped, keeping the first occurrence.
    pub fn new<I, A>(aliases: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for alias in aliases {
            let alias = alias.into();
            if !unique.contains(&alias) {
                unique.push(alias);
            }
        }
        assert!(!unique.is_empty(), "An alias set needs at least one alias");
        Self {
            aliases: unique,
            permission: None,
        }
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// The first alias, used when rendering usage.
    pub fn primary(&self) -> &str {
        &self.aliases[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }

    pub fn required_permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    pub fn permits<S: CommandSource>(&self, source: &S) -> bool {
        self.permission
            .as_deref()
            .is_none_or(|permission| source.has_permission(permission))
    }
}

impl<'a> IntoIterator for &'a Aliases {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.aliases.iter()
    }
}

impl From<&str> for Aliases {
    fn from(alias: &str) -> Self {
        Aliases::new([alias])
    }
}

impl From<String> for Aliases {
    fn from(alias: String) -> Self {
        Aliases::new([alias])
    }
}

impl From<Vec<String>> for Aliases {
    fn from(aliases: Vec<String>) -> Self {
        Aliases::new(aliases)
    }
}

impl From<Vec<&str>> for Aliases {
    fn from(aliases: Vec<&str>) -> Self {
        Aliases::new(aliases)
    }
}

impl<const N: usize> From<[&str; N]> for Aliases {
    fn from(aliases: [&str; N]) -> Self {
        Aliases::new(aliases)
    }
}
