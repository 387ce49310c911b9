//! Chat platform boundary.
//!
//! The bot core never talks to a chat network directly. Everything it needs
//! from the outside world goes through the [`Platform`] trait (send, edit and
//! delete messages, manage reactions) and the [`Event`] stream produced by the
//! platform integration.
//!
//! # Events
//!
//! ```text
//! platform ──► Event::Message(MessageEvent)  ──► collector / command dispatch
//!          └─► Event::Reaction(ReactionEvent) ──► collector (pagination)
//! ```
//!
//! The only implementation shipped with the crate is the line based
//! [`console::ConsolePlatform`] used by the binary. Tests use the generated
//! [`MockPlatform`].

use std::fmt;

use async_trait::async_trait;
use mockall::automock;

pub mod console;

/// A message the bot has sent and may later edit or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Platform message id
    pub id: String,
    /// Channel the message lives in
    pub channel_id: String,
    /// Guild (server) the channel belongs to, `None` for direct messages
    pub guild_id: Option<String>,
    /// Current text content
    pub content: String,
}

impl Message {
    /// Whether the message was posted in a guild channel.
    ///
    /// Reactions can only be removed on behalf of other users in guilds.
    pub fn is_guild_scoped(&self) -> bool {
        self.guild_id.is_some()
    }
}

/// An incoming text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Id of the incoming message
    pub message_id: String,
    /// Author of the message
    pub author_id: String,
    /// Channel where the message was posted
    pub channel_id: String,
    /// Guild of the channel, `None` for direct messages
    pub guild_id: Option<String>,
    /// Raw text content
    pub content: String,
}

impl MessageEvent {
    /// Builds the [`Message`] handle used to delete or edit this message.
    pub fn as_message(&self) -> Message {
        Message {
            id: self.message_id.clone(),
            channel_id: self.channel_id.clone(),
            guild_id: self.guild_id.clone(),
            content: self.content.clone(),
        }
    }
}

/// A reaction added to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    /// User who added the reaction
    pub user_id: String,
    /// Channel of the reacted message
    pub channel_id: String,
    /// Guild of the channel, `None` for direct messages
    pub guild_id: Option<String>,
    /// Reacted message
    pub message_id: String,
    /// Reaction symbol (unicode emoji)
    pub symbol: String,
}

/// Event yielded by the platform event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A text message was posted
    Message(MessageEvent),
    /// A reaction was added to a message
    Reaction(ReactionEvent),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Message(m) => write!(
                f,
                "message {} from {} in {}: {}",
                m.message_id, m.author_id, m.channel_id, m.content
            ),
            Event::Reaction(r) => write!(
                f,
                "reaction {} from {} on {}",
                r.symbol, r.user_id, r.message_id
            ),
        }
    }
}

/// Operations the bot needs from the chat platform.
///
/// Every call may fail; callers decide whether a failure is fatal for what
/// they are doing. Nothing in the core retries a platform call.
#[automock]
#[async_trait]
pub trait Platform: Send + Sync {
    /// Posts `content` in `channel_id` and returns the created message.
    async fn send_message(&self, channel_id: &str, content: &str) -> anyhow::Result<Message>;
    /// Replaces the content of `message`.
    async fn edit_message(&self, message: &Message, content: &str) -> anyhow::Result<Message>;
    /// Deletes `message`.
    async fn delete_message(&self, message: &Message) -> anyhow::Result<()>;
    /// Adds the bot's reactions to `message`, in order.
    async fn add_reactions(&self, message: &Message, symbols: &[String]) -> anyhow::Result<()>;
    /// Removes the reaction `symbol` added by `user_id` on `message`.
    async fn remove_user_reaction(
        &self,
        message: &Message,
        symbol: &str,
        user_id: &str,
    ) -> anyhow::Result<()>;
}
