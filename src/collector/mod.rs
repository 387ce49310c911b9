//! One-shot waits on platform events.
//!
//! A collector wait suspends a task until the platform delivers an event for a
//! given subject (a user reacting on a message, or a user writing in a
//! channel) or until a deadline elapses.
//!
//! # Flow
//!
//! ```text
//! task ── wait(key, predicate, timeout) ──► EventCollector ◄── dispatch(event) ── event loop
//!   ▲                                            │
//!   └──────────── Collected::Event / TimedOut ◄──┘
//! ```
//!
//! Only one wait may be outstanding per [`SubjectKey`]. A second wait for a
//! busy key fails with [`CollectorError::DuplicateWaiter`] instead of silently
//! replacing the first one.

use std::fmt;

use thiserror::Error;

use crate::platform::Event;

mod event_collector;

pub use crate::collector::event_collector::EventCollector;

/// Identifies whose event a wait is interested in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubjectKey {
    /// Reactions added by `user_id` on `message_id`
    Reaction {
        /// Reacting user
        user_id: String,
        /// Reacted message
        message_id: String,
    },
    /// Text messages written by `user_id` in `channel_id`
    Message {
        /// Author of the message
        user_id: String,
        /// Channel of the message
        channel_id: String,
    },
}

impl SubjectKey {
    /// Key matching reactions of `user_id` on `message_id`.
    pub fn reaction(user_id: &str, message_id: &str) -> Self {
        SubjectKey::Reaction {
            user_id: user_id.to_owned(),
            message_id: message_id.to_owned(),
        }
    }

    /// Key matching messages of `user_id` in `channel_id`.
    pub fn message(user_id: &str, channel_id: &str) -> Self {
        SubjectKey::Message {
            user_id: user_id.to_owned(),
            channel_id: channel_id.to_owned(),
        }
    }

    /// Key a waiter must hold to receive `event`.
    pub fn of(event: &Event) -> Self {
        match event {
            Event::Message(m) => SubjectKey::message(&m.author_id, &m.channel_id),
            Event::Reaction(r) => SubjectKey::reaction(&r.user_id, &r.message_id),
        }
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectKey::Reaction {
                user_id,
                message_id,
            } => write!(f, "reaction of {} on {}", user_id, message_id),
            SubjectKey::Message {
                user_id,
                channel_id,
            } => write!(f, "message of {} in {}", user_id, channel_id),
        }
    }
}

/// Outcome of a collector wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collected {
    /// A matching event arrived before the deadline
    Event(Event),
    /// The deadline elapsed first
    TimedOut,
}

/// Errors raised when issuing a wait.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectorError {
    /// A wait is already outstanding for this key.
    #[error("a wait is already pending for {0}")]
    DuplicateWaiter(SubjectKey),
}
