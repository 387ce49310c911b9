//! Bot module dispatching platform events.
//!
//! This module provides the main [`Bot`] implementation that connects a chat
//! platform with the command framework. It owns the shared services (collector,
//! registry, resolver, paginator) and routes every incoming event.
//!
//! # Event Processing Flow
//!
//! ```text
//! Event ─► collector.dispatch() ── consumed ──► done (a session or prompt was waiting)
//!                  │
//!                  └─ not consumed ─► Commander::route() ─► spawn handler(CommandContext)
//!                                            │
//!                                            └─ InvalidCommand ─► notice sent back
//! ```
//!
//! # Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use drafty::{bot::Bot, config::Config, platform::Platform};
//! # async fn run(platform: Arc<dyn Platform>) -> Result<(), anyhow::Error> {
//! let config = Config::load("config.yaml")?;
//! let (sender, receiver) = tokio::sync::mpsc::channel(64);
//!
//! let bot = Bot::new(platform, &config);
//! bot.register_builtins().await;
//! # drop(sender);
//! bot.run(receiver).await; // Runs until the event stream closes
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use futures::future::join_all;
use log::{debug, error, info, warn};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    collector::EventCollector,
    commands::{
        CommandContext, CommandParseError, CommandRegistry, Commander, Registration,
        SubcommandResolver, builtin,
    },
    config::Config,
    pagination::Paginator,
    platform::{Event, Platform},
};

/// Main bot structure dispatching platform events to commands.
///
/// # Thread Safety
///
/// Every service is wrapped in `Arc` so command handlers, running in their own
/// tasks, can keep using them after the event loop moved on.
pub struct Bot {
    /// Platform the bot talks to
    platform: Arc<dyn Platform>,
    /// Outstanding waits on follow-up events
    collector: Arc<EventCollector>,
    /// Registered commands
    registry: Arc<CommandRegistry>,
    /// Deferred subcommand registrations
    resolver: Arc<SubcommandResolver>,
    /// Pagination sessions
    paginator: Arc<Paginator>,
    /// Message router
    commander: Commander,
    /// Character starting every command
    prefix: char,
}

impl Bot {
    /// Creates a bot on `platform` with the settings of `config`.
    ///
    /// No command is registered.
    pub fn new(platform: Arc<dyn Platform>, config: &Config) -> Self {
        let collector = Arc::new(EventCollector::new());
        let registry = Arc::new(CommandRegistry::new());
        let resolver = Arc::new(SubcommandResolver::from_config(
            Arc::clone(&registry),
            &config.resolver,
        ));
        let paginator = Arc::new(Paginator::from_config(
            Arc::clone(&platform),
            Arc::clone(&collector),
            &config.pagination,
        ));
        let commander = Commander::new(config.bot.prefix, Arc::clone(&registry));

        Bot {
            platform,
            collector,
            registry,
            resolver,
            paginator,
            commander,
            prefix: config.bot.prefix,
        }
    }

    /// Registry commands are registered in.
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Resolver subcommands are registered through.
    pub fn resolver(&self) -> &Arc<SubcommandResolver> {
        &self.resolver
    }

    /// Collector fed by [`Bot::handle_event`].
    pub fn collector(&self) -> &Arc<EventCollector> {
        &self.collector
    }

    /// Registers the `ping` and `help` commands.
    pub async fn register_builtins(&self) -> Registration {
        builtin::register(&self.registry, &self.resolver, self.prefix).await
    }

    /// Handles events until `events` is closed.
    ///
    /// Returns once the command handlers still running at that point are done.
    pub async fn run(&self, mut events: mpsc::Receiver<Event>) {
        info!("listening for events");

        let mut handlers: Vec<JoinHandle<()>> = Vec::new();
        while let Some(event) = events.recv().await {
            handlers.retain(|handler| !handler.is_finished());
            if let Some(handler) = self.handle_event(event).await {
                handlers.push(handler);
            }
        }

        info!(
            "event stream closed, waiting for {} running command(s)",
            handlers.len()
        );

        for result in join_all(handlers).await {
            if let Err(e) = result {
                error!("command task aborted: {}", e);
            }
        }

        info!("stopping");
    }

    /// Handles one event.
    ///
    /// The event is first offered to the collector; only unclaimed messages are
    /// routed as commands. Returns the handle of the spawned handler, if any.
    pub async fn handle_event(&self, event: Event) -> Option<JoinHandle<()>> {
        if self.collector.dispatch(&event) {
            return None;
        }

        let message = match event {
            Event::Message(message) => message,
            other => {
                debug!("unclaimed {}", other);
                return None;
            }
        };

        let invocation = match self.commander.route(&message).await {
            Ok(invocation) => invocation,
            Err(CommandParseError::NotForBot) => return None,
            Err(CommandParseError::InvalidCommand(notice)) => {
                if let Err(e) = self
                    .platform
                    .send_message(&message.channel_id, &notice)
                    .await
                {
                    warn!("unable to send notice in {}: {}", message.channel_id, e);
                }
                return None;
            }
        };

        let name = invocation.path.join(" ");
        info!("{} invoked {}", message.author_id, name);

        let handler = Arc::clone(&invocation.command.handler);
        let context = CommandContext {
            event: message,
            args: invocation.args,
            raw_args: invocation.raw_args,
            platform: Arc::clone(&self.platform),
            collector: Arc::clone(&self.collector),
            registry: Arc::clone(&self.registry),
            paginator: Arc::clone(&self.paginator),
        };

        Some(tokio::spawn(async move {
            if let Err(e) = handler(context).await {
                error!("command {} failed: {:#}", name, e);
            }
        }))
    }
}
