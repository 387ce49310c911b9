//! Reaction driven pagination.
//!
//! A pagination session shows one page of a pre-rendered page list in a
//! single message and lets the user who asked for it browse the list by
//! reacting on that message.
//!
//! # Session lifecycle
//!
//! ```text
//! start ──► render page ──► add reactions ──► wait for reaction ──┬─► TimedOut
//!                               ▲                                │
//!                               └──── edit message ◄── trigger ◄─┼─► Deleted
//!                                                                └─► RenderFailed
//! ```
//!
//! The default reactions are:
//!
//! | Symbol | Trigger |
//! |--------|---------|
//! | ◀️ | previous page |
//! | ↗️ | ask for a page number and jump to it |
//! | ▶️ | next page |
//! | 🗑️ | delete the message and end the session |

use std::time::Duration;

use thiserror::Error;

use crate::collector::CollectorError;

mod paginator;
mod session;

pub use crate::pagination::paginator::Paginator;

/// Question sent when the user asks to jump to a page.
pub const JUMP_PROMPT: &str =
    "To what page would you like to jump? Say `cancel` or `0` to cancel the prompt.";
/// Notice sent when the jump reply is not a number.
pub const INVALID_NUMBER_NOTICE: &str = "This is not a valid number!";
/// Notice sent when the jump reply is outside the page range.
pub const INVALID_PAGE_NOTICE: &str = "This is not a valid page!";

/// Default time a session waits for each reaction or jump reply.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Page transition bound to a reaction symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Go back one page, staying on the first one
    Previous,
    /// Go forward one page, staying on the last one
    Next,
    /// Go to the first page
    First,
    /// Go to the last page
    Last,
    /// Ask the user for a page number
    Jump,
    /// Delete the message and end the session
    Delete,
}

/// Ordered map from reaction symbol to [`Trigger`].
///
/// The order is the order the reactions are added to the message.
///
/// # Examples
///
/// ```
/// use drafty::pagination::{ReactionMap, Trigger};
///
/// let reactions = ReactionMap::new()
///     .with("⏮️", Trigger::First)
///     .with("▶️", Trigger::Next)
///     .with("⏭️", Trigger::Last);
///
/// assert_eq!(reactions.trigger("⏭️"), Some(Trigger::Last));
/// assert_eq!(reactions.symbols(), vec!["⏮️", "▶️", "⏭️"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionMap {
    entries: Vec<(String, Trigger)>,
}

impl ReactionMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        ReactionMap {
            entries: Vec::new(),
        }
    }

    /// Binds `symbol` to `trigger`, replacing a previous binding of `symbol`
    /// in place.
    pub fn with(mut self, symbol: &str, trigger: Trigger) -> Self {
        match self.entries.iter_mut().find(|(s, _)| s == symbol) {
            Some(entry) => entry.1 = trigger,
            None => self.entries.push((symbol.to_owned(), trigger)),
        }
        self
    }

    /// Trigger bound to `symbol`.
    pub fn trigger(&self, symbol: &str) -> Option<Trigger> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, trigger)| *trigger)
    }

    /// Whether `symbol` is bound.
    pub fn contains(&self, symbol: &str) -> bool {
        self.trigger(symbol).is_some()
    }

    /// Bound symbols, in order.
    pub fn symbols(&self) -> Vec<String> {
        self.entries.iter().map(|(s, _)| s.clone()).collect()
    }
}

impl Default for ReactionMap {
    fn default() -> Self {
        ReactionMap::new()
            .with("◀️", Trigger::Previous)
            .with("↗️", Trigger::Jump)
            .with("▶️", Trigger::Next)
            .with("🗑️", Trigger::Delete)
    }
}

/// Settings of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationOptions {
    /// 1-based page shown first, clamped into the page range
    pub initial_page: usize,
    /// Reactions offered to the user
    pub reactions: ReactionMap,
    /// Time waited for each reaction or jump reply
    pub per_wait_timeout: Duration,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        PaginationOptions {
            initial_page: 1,
            reactions: ReactionMap::default(),
            per_wait_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Errors returned by [`Paginator::start`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    /// No page was given, nothing was sent.
    #[error("no page to paginate")]
    EmptyPageSet,
    /// Another wait is already pending for the session's user and message.
    #[error(transparent)]
    DuplicateWaiter(#[from] CollectorError),
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Only one page, no reaction was added
    SinglePage,
    /// The first page could not be sent
    SendFailed,
    /// The reactions could not be added
    ReactFailed,
    /// The user stopped reacting
    TimedOut,
    /// The user deleted the message
    Deleted,
    /// A page could not be rendered
    RenderFailed,
}

/// Result of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Why the session ended
    pub end: SessionEnd,
    /// Page shown when it ended
    pub last_page: usize,
}
