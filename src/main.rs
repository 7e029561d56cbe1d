use anstream::ColorChoice;
use anyhow::{Context, Result};
use clap::Parser;
use cmdtree::builtin::build_registry;
use cmdtree::config::ConsoleConfig;
use cmdtree::console::{CommandSender, ConsoleState, Outbox};
use cmdtree::permissions::PermissionSet;
use cmdtree_core::commands::{CommandError, CommandRegistry, DispatchError};
use cmdtree_text::{ColorCode, TextComponent};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// An interactive console for the built-in command trees.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file, created with defaults if missing.
    #[arg(long, short, default_value = "console.toml")]
    config: PathBuf,

    /// Run a single command line and exit.
    #[arg(long, short = 'e')]
    command: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = ConsoleConfig::load(&args.config)?;

    // Setup logging
    let logfile = tracing_appender::rolling::daily(&config.log_directory, "cmdtree.log");
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("CMDTREE_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(logfile.and(std::io::stdout))
        .with_env_filter(env_filter)
        .init();

    if !config.color_output {
        ColorChoice::Never.write_global();
    }

    let outbox = Outbox::default();
    let sender = CommandSender::console(
        config.console_name.clone(),
        PermissionSet::new(&config.console_permissions),
        outbox.clone(),
    );
    let registry = build_registry(&config, &ConsoleState::demo());
    info!("Loaded {} command aliases", config.command_aliases.len());

    if let Some(line) = args.command {
        run_line(&registry, &sender, &line);
        flush_outbox(&outbox);
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        anstream::print!("{}", config.prompt);
        io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from stdin")?;
        let line = line.trim();
        if line == "exit" || line == "quit" {
            break;
        }

        match line.strip_prefix('?') {
            Some(partial) => {
                let suggestions = registry.suggestions(&sender, partial);
                anstream::println!("{}", suggestions.join(", "));
            }
            None => run_line(&registry, &sender, line),
        }
        flush_outbox(&outbox);
    }

    info!("Console closed");
    Ok(())
}

fn run_line(registry: &CommandRegistry<CommandSender>, sender: &CommandSender, line: &str) {
    let Err(err) = registry.execute(sender, line) else {
        return;
    };
    debug!("Command '{}' failed: {}", line, err);

    let outbox = sender.outbox();
    match err {
        DispatchError::Command(err) => {
            outbox.send(err.to_text());
            if let CommandError::ArgumentParse(parse_err) = err.error() {
                outbox.send(vec![TextComponent::colored(
                    parse_err.annotated(),
                    ColorCode::Gray,
                )]);
            }
        }
        err => outbox.send(vec![TextComponent::colored(err.to_string(), ColorCode::Red)]),
    }
}

fn flush_outbox(outbox: &Outbox) {
    for message in outbox.drain() {
        anstream::println!("{}", cmdtree_text::to_ansi(&message));
    }
}
