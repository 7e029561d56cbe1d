use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use toml_edit::{value, Array, DocumentMut, Item, Table};

trait ConfigSerializeDefault {
    fn fix_config(self, name: &str, doc: &mut DocumentMut);
}

macro_rules! impl_simple_default {
    ( $( $type:ty ),* ) => {
        $(
            impl ConfigSerializeDefault for $type {
                fn fix_config(self, name: &str, doc: &mut DocumentMut) {
                    doc.entry(name).or_insert_with(|| value(self));
                }
            }
        )*
    }
}

impl_simple_default!(String, bool);

impl ConfigSerializeDefault for Vec<String> {
    fn fix_config(self, name: &str, doc: &mut DocumentMut) {
        doc.entry(name)
            .or_insert_with(|| value(self.into_iter().collect::<Array>()));
    }
}

impl ConfigSerializeDefault for IndexMap<String, String> {
    fn fix_config(self, name: &str, doc: &mut DocumentMut) {
        doc.entry(name).or_insert_with(|| {
            let mut table = Table::new();
            for (key, replacement) in self {
                table.insert(&key, value(replacement));
            }
            Item::Table(table)
        });
    }
}

macro_rules! gen_config {
    (
        $( $(#[doc = $doc:literal])* $name:ident: $type:ty = $default:expr),*
    ) => {
        #[derive(Debug, Serialize, Deserialize)]
        pub struct ConsoleConfig {
            $(
                $(#[doc = $doc])*
                pub $name: $type,
            )*
        }

        impl ConsoleConfig {
            /// Loads `config_file`, writing any missing keys back with their defaults.
            pub fn load(config_file: impl AsRef<Path>) -> Result<ConsoleConfig> {
                let config_file = config_file.as_ref();
                let str = fs::read_to_string(config_file).unwrap_or_default();
                let mut doc = str
                    .parse::<DocumentMut>()
                    .with_context(|| format!("Failed to parse {}", config_file.display()))?;

                $(
                    <$type as ConfigSerializeDefault>::fix_config($default, stringify!($name), &mut doc);
                )*

                let patched = doc.to_string();
                if str != patched {
                    fs::write(config_file, &patched)
                        .with_context(|| format!("Failed to write {}", config_file.display()))?;
                }

                toml::from_str(&patched)
                    .with_context(|| format!("Invalid configuration in {}", config_file.display()))
            }
        }
    };
}

gen_config! {
    /// Printed before every line read from stdin.
    prompt: String = "> ".to_string(),
    console_name: String = "Console".to_string(),
    log_directory: String = "./logs".to_string(),
    color_output: bool = true,
    /// Permission nodes held by the console. `*` matches everything, a leading `-` denies.
    console_permissions: Vec<String> = vec!["*".to_string()],
    /// Command line prefixes and what they expand to, `{}` marking the rest of the line.
    command_aliases: IndexMap<String, String> = IndexMap::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");
        let config = ConsoleConfig::load(&path).unwrap();
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.console_permissions, ["*"]);
        assert!(config.command_aliases.is_empty());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("console_name = \"Console\""));
        assert!(written.contains("[command_aliases]"));
    }

    #[test]
    fn existing_keys_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");
        fs::write(
            &path,
            "prompt = \"$ \"\nconsole_permissions = [\"cmdtree.*\"]\n\n\
             [command_aliases]\n\"s\" = \"sum {} 1\"\n",
        )
        .unwrap();
        let config = ConsoleConfig::load(&path).unwrap();
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.console_permissions, ["cmdtree.*"]);
        assert_eq!(config.command_aliases["s"], "sum {} 1");
        assert_eq!(config.log_directory, "./logs");
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.toml");
        fs::write(&path, "prompt = ").unwrap();
        let err = ConsoleConfig::load(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
    }
}
