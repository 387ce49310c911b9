//! Command parsing and routing.
//!
//! This module provides the [`Commander`] struct, which turns the text of an
//! incoming message into an [`Invocation`]: the definition to run and its
//! arguments.
//!
//! # Flow
//!
//! ```text
//! MessageEvent → parse() → words → registry.lookup_path() → guards → arguments → Invocation
//! ```
//!
//! # Examples
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use drafty::commands::{Commander, CommandRegistry};
//! # use drafty::platform::MessageEvent;
//! # async fn example(event: MessageEvent) {
//! let registry = Arc::new(CommandRegistry::new());
//! let commander = Commander::new('!', registry);
//!
//! match commander.route(&event).await {
//!     Ok(invocation) => println!("running {}", invocation.command.name),
//!     Err(e) => println!("not run: {:?}", e),
//! }
//! # }
//! ```

use std::{collections::HashMap, sync::Arc};

use command_parser::Parser;
use log::debug;

use crate::{
    commands::{
        CommandDefinition, CommandParseError, CommandRegistry,
        arguments::parse_arguments,
        responses::{
            format_argument_error, format_denied, format_guild_only, format_unknown_command,
            format_usage,
        },
    },
    platform::MessageEvent,
};

/// A routed command, ready to run.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Deepest definition matched by the message words
    pub command: CommandDefinition,
    /// Names leading to the command, starting with the top-level one
    pub path: Vec<String>,
    /// Arguments read following the command's argument specs
    pub args: HashMap<String, String>,
    /// Words left after the command path
    pub raw_args: Vec<String>,
}

/// Command router for incoming messages.
///
/// # Command Prefix
///
/// Commands must start with the configured prefix character. Messages without
/// it are silently ignored (returning [`CommandParseError::NotForBot`]).
pub struct Commander {
    /// Command parser for processing user commands
    parser: Parser,
    /// Character starting every command
    prefix: char,
    /// Commands the messages are routed to
    registry: Arc<CommandRegistry>,
}

impl Commander {
    /// Creates a commander recognizing commands starting with `prefix`.
    ///
    /// The parser uses `-` as the option prefix.
    pub fn new(prefix: char, registry: Arc<CommandRegistry>) -> Self {
        let parser = Parser::new(prefix, '-');
        Commander {
            parser,
            prefix,
            registry,
        }
    }

    /// Splits a message body into the command name followed by its words.
    ///
    /// Returns `None` when the body is not a command.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use drafty::commands::{Commander, CommandRegistry};
    /// let commander = Commander::new('!', Arc::new(CommandRegistry::new()));
    ///
    /// assert_eq!(
    ///     commander.parse("!stats current @bob"),
    ///     Some(vec!["stats".to_string(), "current".to_string(), "@bob".to_string()])
    /// );
    /// assert_eq!(commander.parse("Hello, world!"), None);
    /// ```
    pub fn parse(&self, body: &str) -> Option<Vec<String>> {
        // For an unknown reason the parser ignores the last word, so we add a dummy word at the end
        let body = body.to_string() + " dummy";

        // This is normal to fail if the message is not a command
        let command = self.parser.parse(&body).ok()?;

        if command.name.is_empty() {
            return None;
        }

        let mut words = vec![command.name];
        words.extend(command.arguments);
        Some(words)
    }

    /// Routes `event` to a registered command.
    ///
    /// # Errors
    ///
    /// * [`CommandParseError::NotForBot`] when the message is not a command
    /// * [`CommandParseError::InvalidCommand`] with the notice to send back when
    ///   the command is unknown, refused by a guard or given invalid arguments
    pub async fn route(&self, event: &MessageEvent) -> Result<Invocation, CommandParseError> {
        let words = self
            .parse(&event.content)
            .ok_or(CommandParseError::NotForBot)?;

        debug!("parsing command: {:?}", words);

        let Some((command, raw_args)) = self.registry.lookup_path(&words).await else {
            return Err(CommandParseError::InvalidCommand(format_unknown_command(
                self.prefix,
                &words[0],
            )));
        };

        let path: Vec<String> = words[..words.len() - raw_args.len()].to_vec();

        if command.guild_only && event.guild_id.is_none() {
            return Err(CommandParseError::InvalidCommand(format_guild_only(
                &command.name,
            )));
        }

        if !command.allows(event) {
            return Err(CommandParseError::InvalidCommand(format_denied(
                &command.name,
            )));
        }

        let args = parse_arguments(&command.arguments, &raw_args).map_err(|e| {
            let path: Vec<&str> = path.iter().map(String::as_str).collect();
            CommandParseError::InvalidCommand(format_argument_error(
                &e,
                &format_usage(self.prefix, &path, &command),
            ))
        })?;

        Ok(Invocation {
            command,
            path,
            args,
            raw_args,
        })
    }
}
