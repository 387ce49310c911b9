//! Command definitions, registration and routing.
//!
//! # Overview
//!
//! The commands module handles the whole lifecycle of bot commands:
//! 1. **Definition** - [`CommandDefinition`]s declare names, arguments, guards and handlers
//! 2. **Registration** - top-level commands go in the [`CommandRegistry`], subcommands
//!    are attached through the [`SubcommandResolver`], even before their parent exists
//! 3. **Routing** - the [`Commander`] turns a message into an [`Invocation`]
//! 4. **Execution** - the handler runs with a [`CommandContext`]
//!
//! # Architecture
//!
//! ```text
//! start-up ── register() ──────────────► CommandRegistry ◄── lookup_path() ── Commander ◄── message
//!         └── register_subcommand() ──► SubcommandResolver ──(retries)──┘                    │
//!                                                                                           ▼
//!                                                                 handler(CommandContext)
//! ```
//!
//! # Error Handling
//!
//! The module distinguishes between two error categories:
//!
//! - **Silent Errors** ([`CommandParseError::NotForBot`]): messages that aren't commands.
//!   These should not generate responses.
//! - **User Errors** ([`CommandParseError::InvalidCommand`]): unknown commands, refused
//!   guards or invalid arguments. These carry the notice to send back.

use std::{collections::HashMap, sync::Arc};

use crate::{
    collector::EventCollector,
    pagination::Paginator,
    platform::{Message, MessageEvent, Platform},
};

mod arguments;
pub mod builtin;
mod commander;
mod definition;
mod registry;
mod resolver;
pub mod responses;

pub use crate::commands::{
    arguments::{ArgumentError, parse_arguments},
    commander::{Commander, Invocation},
    definition::{ArgumentKind, ArgumentSpec, CommandDefinition, Guard, Handler},
    registry::CommandRegistry,
    resolver::{
        PendingSubcommandRegistration, Registration, ResolutionFailure, SubcommandResolver,
    },
};

/// Everything a handler needs to run a command.
///
/// Built by the dispatcher for each invocation.
#[derive(Clone)]
pub struct CommandContext {
    /// Message that invoked the command
    pub event: MessageEvent,
    /// Arguments read following the command's argument specs
    pub args: HashMap<String, String>,
    /// Words left after the command path
    pub raw_args: Vec<String>,
    /// Platform the bot runs on
    pub platform: Arc<dyn Platform>,
    /// Collector for follow-up messages and reactions
    pub collector: Arc<EventCollector>,
    /// Registered commands
    pub registry: Arc<CommandRegistry>,
    /// Pagination sessions
    pub paginator: Arc<Paginator>,
}

impl CommandContext {
    /// Sends `content` in the channel of the invoking message.
    pub async fn reply(&self, content: &str) -> anyhow::Result<Message> {
        self.platform
            .send_message(&self.event.channel_id, content)
            .await
    }

    /// Value of the argument `name`.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    /// Value of the number argument `name`.
    pub fn number(&self, name: &str) -> Option<i64> {
        self.arg(name)?.parse().ok()
    }
}

/// Errors that can occur while routing a message.
///
/// # Variants
///
/// * `NotForBot` - Message is not a command.
///   Should be handled silently without responding to the user.
///
/// * `InvalidCommand` - Command unknown, refused or given invalid arguments.
///   Contains a user-friendly error message to display.
#[derive(Debug)]
pub enum CommandParseError {
    /// Message is not for this bot (silent error)
    NotForBot,
    /// Invalid command with error message
    InvalidCommand(String),
}
