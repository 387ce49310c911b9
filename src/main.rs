//! Drafty - a chat bot command framework, driven from the terminal.
//!
//! This is the entry point of the console bot: every line typed on stdin is a
//! message (or a reaction) sent to the bot, and everything the bot sends is
//! printed on stdout.
//!
//! # Configuration
//!
//! Create a `config.yaml` file with your settings (every section is optional):
//!
//! ```yaml
//! bot:
//!   prefix: "!"
//!
//! resolver:
//!   retry_delay: 30
//!   max_retries: 20
//!
//! pagination:
//!   timeout: 30
//!
//! console:
//!   user_id: "console"
//!   channel_id: "general"
//!   guild_id: "local"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Override any configuration value using environment variables with the `DRAFTY_` prefix:
//!
//! ```bash
//! export DRAFTY_BOT__PREFIX="?"
//! export DRAFTY_PAGINATION__TIMEOUT=60
//! ```
//!
//! # Usage
//!
//! ```bash
//! drafty --config config.yaml
//! ```
//!
//! Then type commands:
//!
//! ```text
//! !help
//! [general#1] Commands (page 1/1): ...
//! react 1 🗑️
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use std::sync::Arc;

use clap::Parser;
use drafty::{bot::Bot, config::Config, platform::console::ConsolePlatform};
use env_logger::Env;
use log::{error, info};
use tokio::sync::mpsc;

/// Capacity of the channel between the console reader and the bot.
const EVENT_BUFFER: usize = 64;

/// Command-line arguments for the drafty bot.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    ///
    /// A missing file is allowed: the defaults and the `DRAFTY_` environment
    /// variables are used instead.
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("Starting drafty {}...", env!("CARGO_PKG_VERSION"));

    // Parse command line arguments
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load config file: {}", e);
            return;
        }
    };

    let platform = Arc::new(ConsolePlatform::new(config.console.guild_id.clone()));
    let bot = Bot::new(platform.clone(), &config);
    bot.register_builtins().await;

    let (sender, receiver) = mpsc::channel(EVENT_BUFFER);

    // The bot stops once stdin is closed and the pending events are handled
    tokio::join!(
        platform.read_events(&config.console, sender),
        bot.run(receiver)
    );
}
