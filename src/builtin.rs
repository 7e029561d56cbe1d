use crate::config::ConsoleConfig;
use crate::console::{CommandSender, ConsoleState, Gamemode, Player, Position, SenderKind, World};
use cmdtree_core::commands::{
    executor::{compute, must_be, transform},
    parameter::{value_completer, value_parser},
    standard::{
        self, boolean, bounded_int, choices, double, enum_value, int, player, plugin, string,
        subject, subject_collection, usages, user, world,
    },
    Aliases, Catalog, CommandError, CommandRegistry, CommandResult, CommandRoot,
    CommandSource, EnumValue, Parameter,
};
use std::sync::{Arc, OnceLock, Weak};
use tracing::debug;

type Root = CommandRoot<CommandSender>;

/// Lets commands reach the registry they are registered in once it is built.
pub type RegistryHandle = Arc<OnceLock<Weak<CommandRegistry<CommandSender>>>>;

/// Builds the console registry: every built-in command plus the configured aliases.
pub fn build_registry(
    config: &ConsoleConfig,
    state: &ConsoleState,
) -> Arc<CommandRegistry<CommandSender>> {
    let handle = RegistryHandle::default();
    let mut registry = CommandRegistry::new();
    register_commands(&mut registry, state, Arc::clone(&handle));
    for (alias, replacement) in &config.command_aliases {
        registry.add_custom_alias(alias.trim(), replacement.trim());
    }

    let registry = Arc::new(registry);
    handle.get_or_init(|| Arc::downgrade(&registry));
    registry
}

pub fn register_commands(
    registry: &mut CommandRegistry<CommandSender>,
    state: &ConsoleState,
    handle: RegistryHandle,
) {
    register_chat_commands(registry);
    register_player_commands(registry, state);
    register_world_commands(registry, state);
    register_server_commands(registry, state);
    register_permission_commands(registry, state);

    register_help(registry, handle);
    debug!("Registered built-in commands");
}

fn register_chat_commands(registry: &mut CommandRegistry<CommandSender>) {
    registry.register(Root::build(["sum", "add"], |node| {
        node.add_argument(int("value1"))
            .add_argument(int("value2"))
            .set_executor(|(value2, (value1, sender))| {
                let sum = i64::from(value1) + i64::from(value2);
                sender.reply(&format!("{} + {} = {}", value1, value2, sum));
                Ok(())
            });
    }));

    registry.register(Root::build(["echo", "broadcast"], |node| {
        node.add_argument(string("message").remaining())
            .set_executor(|(words, sender)| {
                sender.reply_legacy(&words.join(" "));
                Ok(())
            });
    }));

    registry.register(Root::build("me", |node| {
        node.add_argument(string("action").remaining())
            .set_executor(transform(
                |(words, sender): (Vec<String>, CommandSender)| {
                    let line = format!("* {} {}", sender.name(), words.join(" "));
                    (line, sender)
                },
                |(line, sender): (String, CommandSender)| {
                    sender.reply(&line);
                    Ok(())
                },
            ));
    }));

    registry.register(Root::build("repeat", |node| {
        node.add_argument(bounded_int("count", 1, 10))
            .add_argument(string("message").remaining())
            .set_executor(|(words, (count, sender))| {
                if words.is_empty() {
                    return Err(CommandError::runtime("Nothing to repeat"));
                }
                let line = words.join(" ");
                for _ in 0..count {
                    sender.reply(&line);
                }
                Ok(())
            });
    }));

    registry.register(Root::build("whoami", |node| {
        node.set_executor(compute(
            |sender: &CommandSender| match sender.kind() {
                SenderKind::Player(_) => "player",
                SenderKind::Console => "console",
            },
            |(kind, sender): (&'static str, CommandSender)| {
                sender.reply(&format!("You are {} ({})", sender.name(), kind));
                Ok(())
            },
        ));
    }));
}

fn register_player_commands(registry: &mut CommandRegistry<CommandSender>, state: &ConsoleState) {
    let players = Arc::clone(&state.players);
    registry.register(Root::build(
        Aliases::new(["teleport", "tp"]).permission("cmdtree.teleport"),
        |node| {
            node.add_argument(double("x"))
                .add_argument(double("y"))
                .add_argument(double("z"))
                .set_executor(must_be(
                    "player",
                    |(z, (y, (x, sender))): (f64, (f64, (f64, CommandSender)))| {
                        let player = sender.as_player()?;
                        Some((player, Position { x, y, z }, sender))
                    },
                    |(player, pos, sender): (Player, Position, CommandSender)| {
                        sender.reply(&format!("Teleporting {} to {}", player.username, pos));
                        Ok(())
                    },
                ));

            node.add_argument(player("target", Arc::clone(&players)))
                .add_argument(player("destination", players).optional(false))
                .set_executor(must_be(
                    "player",
                    |(destination, (target, sender)): (Option<Player>, (Player, CommandSender))| {
                        match destination {
                            Some(destination) => Some((target, destination, sender)),
                            None => {
                                let player = sender.as_player()?;
                                Some((player, target, sender))
                            }
                        }
                    },
                    |(player, target, sender): (Player, Player, CommandSender)| {
                        sender.reply(&format!(
                            "Teleporting {} to {}",
                            player.username, target.username
                        ));
                        Ok(())
                    },
                ));
        },
    ));

    let players = Arc::clone(&state.players);
    registry.register(Root::build(
        Aliases::new(["gamemode", "gm"]).permission("cmdtree.gamemode"),
        |node| {
            node.add_argument(enum_value::<_, _, Gamemode>("mode"))
                .add_argument(player("target", players).or_source(CommandSender::as_player))
                .set_executor(|(target, (mode, sender))| {
                    sender.reply(&format!(
                        "Set {}'s game mode to {}",
                        target.username,
                        mode.id()
                    ));
                    Ok(())
                });
        },
    ));

    let users = Arc::clone(&state.users);
    let by_uuid = Arc::clone(&state.users);
    registry.register(Root::build("whois", |node| {
        node.add_argument(standard::uuid("uuid"))
            .set_executor(move |(uuid, sender)| {
                let found = by_uuid
                    .ids()
                    .iter()
                    .filter_map(|id| by_uuid.get(id))
                    .find(|user| user.uuid == uuid);
                match found {
                    Some(user) => {
                        describe_user(&sender, &user);
                        Ok(())
                    }
                    None => Err(CommandError::runtime(format!("No user has the UUID {uuid}"))),
                }
            });
        node.add_argument(user("user", users))
            .set_executor(|(user, sender)| {
                describe_user(&sender, &user);
                Ok(())
            });
    }));
}

fn describe_user(sender: &CommandSender, user: &Player) {
    let status = if user.online { "&aonline" } else { "&coffline" };
    sender.reply_legacy(&format!(
        "&6{} &7({}) &eis {}&e, last seen in {} at {}",
        user.username, user.uuid, status, user.world, user.pos
    ));
}

/// A player in the world parsed just before.
fn resident(
    players: Arc<dyn Catalog<Player>>,
) -> Parameter<CommandSender, (World, CommandSender), Player> {
    let completions = Arc::clone(&players);
    Parameter::new(
        "player",
        value_parser(move |_, args, (world, _): &(World, CommandSender)| {
            let token = args.next()?;
            match players.get(&token) {
                Some(player) if player.world == world.name => Ok(player),
                Some(player) => Err(args
                    .create_error(format!("{} is not in {}", player.username, world.name))
                    .into()),
                None => Err(args
                    .create_error(format!("Player '{token}' was not found"))
                    .into()),
            }
        }),
        value_completer(move |_, _, (world, _): &(World, CommandSender)| {
            completions
                .ids()
                .into_iter()
                .filter(|id| {
                    completions
                        .get(id)
                        .is_some_and(|player| player.world == world.name)
                })
                .collect()
        }),
        usages::single(),
    )
}

fn register_world_commands(registry: &mut CommandRegistry<CommandSender>, state: &ConsoleState) {
    let worlds = Arc::clone(&state.worlds);
    let players = Arc::clone(&state.players);
    registry.register(Root::build(
        Aliases::new(["world", "worlds"]).permission("cmdtree.world"),
        move |node| {
            let listed = Arc::clone(&worlds);
            let list = move |sender: CommandSender| -> CommandResult<()> {
                sender.reply_legacy(&format!("&6Loaded worlds: &e{}", listed.ids().join(", ")));
                Ok(())
            };
            node.set_executor(list.clone());
            node.add_child("list").set_executor(list);

            node.add_child("info")
                .add_argument(world("world", Arc::clone(&worlds)))
                .set_executor(|(world, sender)| {
                    sender.reply_legacy(&format!(
                        "&6{} &7seed &e{} &7spawn &e{}",
                        world.name, world.seed, world.spawn
                    ));
                    Ok(())
                });

            let in_world = Arc::clone(&players);
            node.add_child(["players", "who"])
                .add_argument(world("world", worlds))
                .add_argument(resident(in_world).optional(false))
                .set_executor(move |(resident, (world, sender))| {
                    if let Some(player) = resident {
                        sender.reply(&format!(
                            "{} is in {} at {}",
                            player.username, world.name, player.pos
                        ));
                        return Ok(());
                    }
                    let names: Vec<String> = players
                        .ids()
                        .into_iter()
                        .filter(|id| players.get(id).is_some_and(|p| p.world == world.name))
                        .collect();
                    sender.reply(&format!("Players in {}: {}", world.name, names.join(", ")));
                    Ok(())
                });
        },
    ));
}

fn register_server_commands(registry: &mut CommandRegistry<CommandSender>, state: &ConsoleState) {
    let plugins = Arc::clone(&state.plugins);
    registry.register(Root::build(["version", "ver"], |node| {
        node.add_argument(plugin("plugin", plugins).optional(false))
            .set_executor(|(plugin, sender)| {
                match plugin {
                    Some(plugin) => {
                        sender.reply(&format!("{} version {}", plugin.name, plugin.version))
                    }
                    None => sender.reply(&format!("Running cmdtree {}", env!("CARGO_PKG_VERSION"))),
                }
                Ok(())
            });
    }));

    registry.register(Root::build(
        Aliases::from("difficulty").permission("cmdtree.difficulty"),
        |node| {
            node.add_argument(choices(
                "level",
                [("peaceful", 0), ("easy", 1), ("normal", 2), ("hard", 3)],
            ))
            .set_executor(|(level, sender)| {
                sender.reply(&format!("Set the difficulty to level {}", level));
                Ok(())
            });
        },
    ));

    registry.register(Root::build(Aliases::from("pvp").permission("cmdtree.pvp"), |node| {
        node.add_argument(boolean("enabled").optional_or(true, false))
            .set_executor(|(enabled, sender)| {
                let state = if enabled { "&aenabled" } else { "&cdisabled" };
                sender.reply_legacy(&format!("&6PvP is now {}", state));
                Ok(())
            });
    }));
}

fn register_permission_commands(
    registry: &mut CommandRegistry<CommandSender>,
    state: &ConsoleState,
) {
    let collections = Arc::clone(&state.subjects);
    registry.register(Root::build(
        Aliases::new(["permission", "perm"]).permission("cmdtree.permission"),
        |node| {
            node.add_argument(subject_collection("collection", collections))
                .add_argument(subject("subject"))
                .set_executor(|(subject, (collection, sender))| {
                    let nodes = if subject.permissions.is_empty() {
                        "&7none".to_string()
                    } else {
                        subject.permissions.join("&7, &e")
                    };
                    sender.reply_legacy(&format!(
                        "&6{} {} &7has &e{}",
                        collection.identifier(),
                        subject.identifier,
                        nodes
                    ));
                    Ok(())
                });
        },
    ));
}

fn upgrade(handle: &RegistryHandle) -> CommandResult<Arc<CommandRegistry<CommandSender>>> {
    handle
        .get()
        .and_then(Weak::upgrade)
        .ok_or_else(|| CommandError::runtime("The command registry is not available"))
}

fn register_help(registry: &mut CommandRegistry<CommandSender>, handle: RegistryHandle) {
    let completion_handle = Arc::clone(&handle);
    registry.register(Root::build("help", move |node| {
        let command = string("command")
            .with_completer(value_completer(
                move |sender: &CommandSender, _, _| match upgrade(&completion_handle) {
                    Ok(registry) => registry.suggestions(sender, ""),
                    Err(_) => Vec::new(),
                },
            ))
            .optional(false);
        node.add_argument(command)
            .set_executor(move |(command, sender)| {
                let registry = upgrade(&handle)?;
                let Some(command) = command else {
                    sender.reply("Run /help <command> for more information.");
                    sender.reply("Available commands:");
                    for line in registry.help(&sender) {
                        sender.reply(&format!(" {}", line));
                    }
                    return Ok(());
                };
                let command = command.trim_start_matches('/');
                match registry.get(command) {
                    Some(callable) if callable.test_permission(&sender) => {
                        let usage = callable.usage(&sender);
                        let name = callable.aliases().primary();
                        if usage.is_empty() {
                            sender.reply(&format!("Usage: /{}", name));
                        } else {
                            sender.reply(&format!("Usage: /{} {}", name, usage));
                        }
                    }
                    _ => sender.reply(&format!("Command not found: {}", command)),
                }
                Ok(())
            });
    }));
}
