use cmdtree_core::commands::standard::{int, string};
use cmdtree_core::commands::{CommandRoot, CommandSource};
use std::sync::{Arc, Mutex};

/// A principal that records what executors saw.
#[derive(Clone, Default)]
pub struct Source {
    name: String,
    /// `None` holds every permission.
    permissions: Option<Vec<String>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl Source {
    pub fn op() -> Source {
        Source {
            name: "op".to_string(),
            ..Default::default()
        }
    }

    pub fn with_permissions(permissions: &[&str]) -> Source {
        Source {
            name: "guest".to_string(),
            permissions: Some(permissions.iter().map(|p| p.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn record(&self, line: impl Into<String>) {
        self.log.lock().unwrap().push(line.into());
    }

    pub fn take_log(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }
}

impl CommandSource for Source {
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

/// `sum <value1> <value2>`, recording `"<value1> <value2>"`.
pub fn sum() -> CommandRoot<Source> {
    CommandRoot::<Source>::build(["sum", "add"], |node| {
        node.add_argument(int("value1"))
            .add_argument(int("value2"))
            .set_executor(|(value2, (value1, source))| {
                source.record(format!("{value1} {value2}"));
                Ok(())
            });
    })
}

/// A `give` subcommand next to a string argument, neither with an executor on the root.
pub fn give() -> CommandRoot<Source> {
    CommandRoot::<Source>::build("item", |node| {
        node.add_child("give")
            .add_argument(string("item"))
            .set_executor(|(item, source)| {
                source.record(format!("give {item}"));
                Ok(())
            });
        node.add_argument(string("name"))
            .set_executor(|(name, source)| {
                source.record(format!("name {name}"));
                Ok(())
            });
    })
}
