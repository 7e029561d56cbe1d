pub mod aliases;
pub mod args;
mod argument_parser;
mod autocomplete;
pub mod catalog;
pub mod error;
pub mod executor;
mod node;
pub mod parameter;
pub mod registry;
mod root;
pub mod standard;
mod usage;

pub use aliases::Aliases;
pub use args::CommandArgs;
pub use catalog::{Catalog, EnumValue, MemoryCatalog, SubjectCollection};
pub use error::{ArgumentParseError, CommandError, CommandResult, TreeCommandError};
pub use node::{CommandNode, Executor};
pub use parameter::Parameter;
pub use registry::{CommandRegistry, DispatchError};
pub use root::{CommandCallable, CommandRoot};

/// The invoking entity of a command, checked against permissions.
pub trait CommandSource: Clone + Send + Sync + 'static {
    fn name(&self) -> &str;

    fn has_permission(&self, permission: &str) -> bool;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::CommandSource;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct TestSource {
        name: String,
        permissions: Option<Vec<String>>,
    }

    impl TestSource {
        /// Holds every permission.
        pub fn op() -> Self {
            Self::named("op")
        }

        pub fn named(name: &str) -> Self {
            Self {
                name: name.to_string(),
                permissions: None,
            }
        }

        pub fn with_permissions(permissions: &[&str]) -> Self {
            Self {
                name: "player".to_string(),
                permissions: Some(permissions.iter().map(|p| p.to_string()).collect()),
            }
        }
    }

    impl CommandSource for TestSource {
        fn name(&self) -> &str {
            &self.name
        }

        fn has_permission(&self, permission: &str) -> bool {
            match &self.permissions {
                Some(permissions) => permissions.iter().any(|p| p == permission),
                None => true,
            }
        }
    }
}
