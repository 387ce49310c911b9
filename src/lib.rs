//! Drafty - a chat bot command framework.
//!
//! # Overview
//!
//! Drafty provides the plumbing a chat bot needs between the chat network and
//! its commands:
//!
//! - **Command registry**: commands and nested subcommands, replaceable at any time
//! - **Deferred subcommands**: a subcommand may be declared before its parent,
//!   it is attached as soon as the parent shows up (within a bounded window)
//! - **Collectors**: one-shot waits for a user's next message or reaction
//! - **Pagination**: multi page messages browsed with reactions
//!
//! # Modules
//!
//! - [`bot`] - Event dispatch to the collector and the commands
//! - [`collector`] - One-shot waits on platform events
//! - [`commands`] - Command definitions, registry, resolver and routing
//! - [`config`] - YAML configuration with environment variable overrides
//! - [`pagination`] - Reaction driven pagination sessions
//! - [`platform`] - Chat platform boundary and the console implementation

pub mod bot;
pub mod collector;
pub mod commands;
pub mod config;
pub mod pagination;
pub mod platform;
