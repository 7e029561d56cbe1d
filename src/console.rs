use crate::permissions::PermissionSet;
use cmdtree_core::commands::{
    Catalog, CommandSource, EnumValue, MemoryCatalog, SubjectCollection,
};
use cmdtree_text::TextComponent;
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gamemode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl EnumValue for Gamemode {
    const NAME: &'static str = "Gamemode";
    const VARIANTS: &'static [Self] = &[
        Gamemode::Survival,
        Gamemode::Creative,
        Gamemode::Adventure,
        Gamemode::Spectator,
    ];

    fn id(&self) -> &'static str {
        match self {
            Gamemode::Survival => "survival",
            Gamemode::Creative => "creative",
            Gamemode::Adventure => "adventure",
            Gamemode::Spectator => "spectator",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub username: String,
    pub uuid: Uuid,
    pub world: String,
    pub pos: Position,
    pub gamemode: Gamemode,
    pub online: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub name: String,
    pub seed: i64,
    pub spawn: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    pub name: String,
    pub version: String,
}

/// A holder of permission nodes inside a subject collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub identifier: String,
    pub permissions: Vec<String>,
}

/// Messages sent to a sender, drained by whoever displays them.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    messages: Arc<Mutex<Vec<Vec<TextComponent>>>>,
}

impl Outbox {
    pub fn send(&self, message: Vec<TextComponent>) {
        self.messages.lock().unwrap().push(message);
    }

    pub fn drain(&self) -> Vec<Vec<TextComponent>> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }
}

#[derive(Debug, Clone)]
pub enum SenderKind {
    Player(Player),
    Console,
}

/// The principal commands are run as.
#[derive(Debug, Clone)]
pub struct CommandSender {
    name: String,
    kind: SenderKind,
    permissions: Arc<PermissionSet>,
    outbox: Outbox,
}

impl CommandSender {
    pub fn console(name: impl Into<String>, permissions: PermissionSet, outbox: Outbox) -> Self {
        Self {
            name: name.into(),
            kind: SenderKind::Console,
            permissions: Arc::new(permissions),
            outbox,
        }
    }

    pub fn player(player: Player, permissions: PermissionSet, outbox: Outbox) -> Self {
        Self {
            name: player.username.clone(),
            kind: SenderKind::Player(player),
            permissions: Arc::new(permissions),
            outbox,
        }
    }

    pub fn kind(&self) -> &SenderKind {
        &self.kind
    }

    pub fn as_player(&self) -> Option<Player> {
        match &self.kind {
            SenderKind::Player(player) => Some(player.clone()),
            SenderKind::Console => None,
        }
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn reply(&self, message: &str) {
        self.outbox.send(vec![TextComponent::from(message)]);
    }

    /// Sends a message with `&` color codes.
    pub fn reply_legacy(&self, message: &str) {
        self.outbox.send(TextComponent::from_legacy_text(message));
    }
}

impl CommandSource for CommandSender {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.has(permission)
    }
}

/// What the built-in commands look things up in.
#[derive(Clone)]
pub struct ConsoleState {
    pub players: Arc<dyn Catalog<Player>>,
    /// Every known player, online or not.
    pub users: Arc<dyn Catalog<Player>>,
    pub worlds: Arc<dyn Catalog<World>>,
    pub plugins: Arc<dyn Catalog<Plugin>>,
    /// Permission subjects grouped by collection.
    pub subjects: Arc<dyn Catalog<SubjectCollection<Subject>>>,
}

impl ConsoleState {
    pub fn new(players: Vec<Player>, worlds: Vec<World>, plugins: Vec<Plugin>) -> Self {
        let users: MemoryCatalog<Player> = players
            .iter()
            .map(|player| (player.username.clone(), player.clone()))
            .collect();
        let online: MemoryCatalog<Player> = players
            .into_iter()
            .filter(|player| player.online)
            .map(|player| (player.username.clone(), player))
            .collect();
        let worlds: MemoryCatalog<World> = worlds
            .into_iter()
            .map(|world| (world.name.clone(), world))
            .collect();
        let plugins: MemoryCatalog<Plugin> = plugins
            .into_iter()
            .map(|plugin| (plugin.name.clone(), plugin))
            .collect();
        Self {
            players: Arc::new(online),
            users: Arc::new(users),
            worlds: Arc::new(worlds),
            plugins: Arc::new(plugins),
            subjects: Arc::new(MemoryCatalog::new()),
        }
    }

    /// Replaces the subject collections with `collections`, each a list of subjects.
    pub fn with_subjects<'a>(
        mut self,
        collections: impl IntoIterator<Item = (&'a str, Vec<Subject>)>,
    ) -> Self {
        let collections: MemoryCatalog<SubjectCollection<Subject>> = collections
            .into_iter()
            .map(|(identifier, subjects)| {
                let subjects: MemoryCatalog<Subject> = subjects
                    .into_iter()
                    .map(|subject| (subject.identifier.clone(), subject))
                    .collect();
                (identifier, SubjectCollection::new(identifier, Arc::new(subjects)))
            })
            .collect();
        self.subjects = Arc::new(collections);
        self
    }

    /// A small fixed population for the interactive console.
    pub fn demo() -> Self {
        let subject = |identifier: &str, permissions: &[&str]| Subject {
            identifier: identifier.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        };
        let player = |username: &str, uuid: u128, world: &str, online: bool| Player {
            username: username.to_string(),
            uuid: Uuid::from_u128(uuid),
            world: world.to_string(),
            pos: Position {
                x: 0.5,
                y: 64.0,
                z: 0.5,
            },
            gamemode: Gamemode::Survival,
            online,
        };
        Self::new(
            vec![
                player("Steve", 0x8667ba71b85a4004af54457a9734eed7, "world", true),
                player("Alex", 0xec561538f3fd461daff5086b22154bce, "world_nether", true),
                player("Herobrine", 0xf84c6a790a4e45e0879bcd49ebd4c4e2, "world", false),
            ],
            vec![
                World {
                    name: "world".to_string(),
                    seed: 8_678_942_899_319_966_093,
                    spawn: Position {
                        x: 0.0,
                        y: 64.0,
                        z: 0.0,
                    },
                },
                World {
                    name: "world_nether".to_string(),
                    seed: -42,
                    spawn: Position {
                        x: 8.0,
                        y: 70.0,
                        z: -8.0,
                    },
                },
            ],
            vec![Plugin {
                name: "cmdtree".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            }],
        )
        .with_subjects([
            (
                "user",
                vec![
                    subject("Steve", &["cmdtree.teleport", "cmdtree.pvp"]),
                    subject("Alex", &[]),
                ],
            ),
            (
                "group",
                vec![subject("admin", &["*"]), subject("default", &["cmdtree.pvp"])],
            ),
        ])
    }
}
