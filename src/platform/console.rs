//! Line based console platform.
//!
//! Lets the bot run in a terminal: messages the bot sends are printed on
//! stdout and every line typed on stdin becomes an [`Event`] authored by the
//! configured console user.
//!
//! # Input syntax
//!
//! ```text
//! react <message_id> <symbol>   add a reaction to a bot message
//! <anything else>               post a text message
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use crate::{
    config::Console,
    platform::{Event, Message, MessageEvent, Platform, ReactionEvent},
};

/// [`Platform`] implementation writing to stdout.
pub struct ConsolePlatform {
    /// Guild attached to every sent message
    guild_id: Option<String>,
    /// Id generator shared by bot messages and console input
    next_id: AtomicU64,
}

impl ConsolePlatform {
    /// Creates a console platform whose messages belong to `guild_id`.
    pub fn new(guild_id: Option<String>) -> Self {
        ConsolePlatform {
            guild_id,
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> String {
        self.next_id.fetch_add(1, Ordering::Relaxed).to_string()
    }

    /// Reads stdin until EOF and forwards each line as an event.
    ///
    /// Returns when stdin is closed or the receiving side is dropped.
    pub async fn read_events(&self, console: &Console, sender: mpsc::Sender<Event>) {
        info!(
            "reading console input as {} in {}",
            console.user_id, console.channel_id
        );

        self.forward_lines(BufReader::new(tokio::io::stdin()), console, sender)
            .await;

        info!("console input closed");
    }

    /// Forwards each line of `reader` as an event until EOF.
    ///
    /// Lines that are not valid UTF-8 are skipped with a warning. A read
    /// failure stops the loop.
    async fn forward_lines<R>(
        &self,
        mut reader: R,
        console: &Console,
        sender: mpsc::Sender<Event>,
    ) where
        R: AsyncBufRead + Unpin,
    {
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    error!("unable to read console input: {}", e);
                    break;
                }
            }

            let line = match std::str::from_utf8(&buffer) {
                Ok(line) => line,
                Err(e) => {
                    warn!("skipping console line: {}", e);
                    continue;
                }
            };

            let Some(event) = self.parse_line(console, line) else {
                continue;
            };
            debug!("console event {}", event);
            if sender.send(event).await.is_err() {
                break;
            }
        }
    }

    /// Turns one input line into an event, `None` for blank lines.
    fn parse_line(&self, console: &Console, line: &str) -> Option<Event> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut words = line.split_whitespace();
        if words.next() == Some("react")
            && let (Some(message_id), Some(symbol), None) = (words.next(), words.next(), words.next())
        {
            return Some(Event::Reaction(ReactionEvent {
                user_id: console.user_id.clone(),
                channel_id: console.channel_id.clone(),
                guild_id: self.guild_id.clone(),
                message_id: message_id.to_string(),
                symbol: symbol.to_string(),
            }));
        }

        Some(Event::Message(MessageEvent {
            message_id: self.next_id(),
            author_id: console.user_id.clone(),
            channel_id: console.channel_id.clone(),
            guild_id: self.guild_id.clone(),
            content: line.to_string(),
        }))
    }
}

#[async_trait]
impl Platform for ConsolePlatform {
    async fn send_message(&self, channel_id: &str, content: &str) -> anyhow::Result<Message> {
        let message = Message {
            id: self.next_id(),
            channel_id: channel_id.to_string(),
            guild_id: self.guild_id.clone(),
            content: content.to_string(),
        };
        println!("[{}#{}] {}", message.channel_id, message.id, content);
        Ok(message)
    }

    async fn edit_message(&self, message: &Message, content: &str) -> anyhow::Result<Message> {
        println!("[{}#{} edited] {}", message.channel_id, message.id, content);
        Ok(Message {
            content: content.to_string(),
            ..message.clone()
        })
    }

    async fn delete_message(&self, message: &Message) -> anyhow::Result<()> {
        println!("[{}#{} deleted]", message.channel_id, message.id);
        Ok(())
    }

    async fn add_reactions(&self, message: &Message, symbols: &[String]) -> anyhow::Result<()> {
        println!(
            "[{}#{} reactions] {}",
            message.channel_id,
            message.id,
            symbols.join(" ")
        );
        Ok(())
    }

    async fn remove_user_reaction(
        &self,
        message: &Message,
        symbol: &str,
        user_id: &str,
    ) -> anyhow::Result<()> {
        debug!(
            "removed reaction {} of {} on message {}",
            symbol, user_id, message.id
        );
        Ok(())
    }
}
