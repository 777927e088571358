//! # Hearthbot
//!
//! Community-chat bot core: adaptive channel slowmode + daily announcements.
//!
//! This binary wires the two control loops to local logging sinks and a
//! stdin admin console, which is enough to exercise everything end to end.
//! A production deployment swaps `sinks::LocalControl` / `LocalMessenger`
//! for an adapter over the chat platform client and feeds
//! `ActivityCounter::record` from the platform's message events.
//!
//! Console commands:
//!   add <text>        queue an announcement
//!   list              show the queue and next fire time
//!   clear             empty the queue
//!   post              flush the queue immediately
//!   say <chan> <user> simulate one message event
//!   quit              stop both loops and exit

mod sinks;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use hearthbot_broadcast::{commands, AnnouncementScheduler, BroadcastQueue, SqliteStore};
use hearthbot_core::HearthConfig;
use hearthbot_throttle::{ActivityCounter, ThrottleController};

#[derive(Parser)]
#[command(name = "hearthbot", version, about = "Community-chat bot core")]
struct Cli {
    /// Path to config.toml (default: ~/.hearthbot/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Channels to manage (repeatable)
    #[arg(long = "channel", default_value = "general")]
    channels: Vec<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => HearthConfig::load_from(path)?,
        None => HearthConfig::load()?,
    };

    let activity = Arc::new(ActivityCounter::new());
    let throttle = ThrottleController::new(
        Arc::clone(&activity),
        Arc::new(sinks::LocalControl::default()),
        config.throttle.clone(),
    );
    throttle.start(cli.channels.clone());

    let store = SqliteStore::open(&SqliteStore::default_path())?;
    let queue = Arc::new(BroadcastQueue::new(Arc::new(store)));
    let scheduler = AnnouncementScheduler::new(
        Arc::clone(&queue),
        Arc::new(sinks::LocalMessenger),
        config.announce.clone(),
    );
    scheduler.start();

    tracing::info!("Hearthbot ready. Type 'quit' to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                let line = line.trim();
                let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
                match cmd {
                    "add" => println!("{}", commands::add_item(&queue, &config.announce, rest)),
                    "list" => println!("{}", commands::list_items(&queue, &config.announce)),
                    "clear" => println!("{}", commands::clear_items(&queue)),
                    "post" => println!("{}", commands::post_now(&scheduler).await),
                    "say" => match rest.split_once(' ') {
                        Some((channel, user)) => activity.record(channel, user),
                        None => println!("usage: say <channel> <user>"),
                    },
                    "quit" | "exit" => break,
                    "" => {}
                    other => println!("unknown command: {other}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("Shutting down");
    throttle.stop().await;
    scheduler.stop().await;
    Ok(())
}
