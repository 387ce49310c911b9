//! One running pagination session.

use std::time::Duration;

use log::{debug, warn};

use crate::{
    collector::{Collected, EventCollector, SubjectKey},
    pagination::{
        INVALID_NUMBER_NOTICE, INVALID_PAGE_NOTICE, JUMP_PROMPT, PaginationError, ReactionMap,
        SessionEnd, SessionOutcome, Trigger,
    },
    platform::{Event, Message, Platform, ReactionEvent},
};

/// State of a session whose first page is rendered and reactions added.
///
/// `page` is 1-based and always within `1..=pages.len()`.
pub(crate) struct Session<'a> {
    pub(crate) platform: &'a dyn Platform,
    pub(crate) collector: &'a EventCollector,
    pub(crate) channel_id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) pages: Vec<String>,
    pub(crate) page: usize,
    /// Rendered message
    pub(crate) message: Message,
    pub(crate) reactions: ReactionMap,
    pub(crate) timeout: Duration,
}

impl Session<'_> {
    /// Applies the user's reactions until the session ends.
    pub(crate) async fn run(mut self) -> Result<SessionOutcome, PaginationError> {
        loop {
            let Some(reaction) = self.next_reaction().await? else {
                return Ok(self.end(SessionEnd::TimedOut));
            };

            // Keep the bot's reaction alone so the user can click again
            if self.message.is_guild_scoped()
                && let Err(e) = self
                    .platform
                    .remove_user_reaction(&self.message, &reaction.symbol, self.user_id)
                    .await
            {
                warn!(
                    "unable to remove reaction {} of {} on {}: {}",
                    reaction.symbol, self.user_id, self.message.id, e
                );
            }

            let Some(trigger) = self.reactions.trigger(&reaction.symbol) else {
                continue;
            };
            debug!("{:?} on page {} of {}", trigger, self.page, self.message.id);

            match trigger {
                Trigger::Previous => self.page = self.page.saturating_sub(1).max(1),
                Trigger::Next => self.page = (self.page + 1).min(self.pages.len()),
                Trigger::First => self.page = 1,
                Trigger::Last => self.page = self.pages.len(),
                Trigger::Jump => self.jump().await?,
                Trigger::Delete => {
                    if let Err(e) = self.platform.delete_message(&self.message).await {
                        warn!("unable to delete pagination {}: {}", self.message.id, e);
                    }
                    return Ok(self.end(SessionEnd::Deleted));
                }
            }

            match self
                .platform
                .edit_message(&self.message, &self.pages[self.page - 1])
                .await
            {
                Ok(message) => self.message = message,
                Err(e) => {
                    warn!("unable to render page {} on {}: {}", self.page, self.message.id, e);
                    return Ok(self.end(SessionEnd::RenderFailed));
                }
            }
        }
    }

    /// Waits for the owner's next reaction, `None` on timeout.
    async fn next_reaction(&self) -> Result<Option<ReactionEvent>, PaginationError> {
        loop {
            let owner = self.user_id.to_owned();
            let reactions = self.reactions.clone();
            let collected = self
                .collector
                .wait(
                    SubjectKey::reaction(self.user_id, &self.message.id),
                    move |event| {
                        matches!(event, Event::Reaction(r)
                            if r.user_id == owner && reactions.contains(&r.symbol))
                    },
                    self.timeout,
                )
                .await?;

            match collected {
                Collected::TimedOut => return Ok(None),
                Collected::Event(Event::Reaction(reaction)) if reaction.user_id == self.user_id => {
                    return Ok(Some(reaction));
                }
                Collected::Event(event) => debug!("ignoring {} on pagination", event),
            }
        }
    }

    /// Asks the owner for a page number and moves to it when valid.
    async fn jump(&mut self) -> Result<(), PaginationError> {
        let prompt = match self.platform.send_message(self.channel_id, JUMP_PROMPT).await {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("unable to send jump prompt in {}: {}", self.channel_id, e);
                return Ok(());
            }
        };

        let collected = self
            .collector
            .wait_for_message(self.user_id, self.channel_id, self.timeout)
            .await;

        self.delete_quietly(&prompt).await;

        let reply = match collected? {
            Collected::Event(Event::Message(reply)) => reply,
            Collected::Event(event) => {
                debug!("ignoring {} as jump reply", event);
                return Ok(());
            }
            Collected::TimedOut => {
                debug!("no jump target given by {}", self.user_id);
                return Ok(());
            }
        };

        self.delete_quietly(&reply.as_message()).await;

        match read_page_number(&reply.content, self.pages.len()) {
            PageNumber::Missing => self.notify(INVALID_NUMBER_NOTICE).await,
            PageNumber::OutOfRange => self.notify(INVALID_PAGE_NOTICE).await,
            PageNumber::Valid(target) => self.page = target,
        }

        Ok(())
    }

    async fn delete_quietly(&self, message: &Message) {
        if let Err(e) = self.platform.delete_message(message).await {
            warn!("unable to delete message {}: {}", message.id, e);
        }
    }

    async fn notify(&self, notice: &str) {
        if let Err(e) = self.platform.send_message(self.channel_id, notice).await {
            warn!("unable to send notice in {}: {}", self.channel_id, e);
        }
    }

    fn end(&self, end: SessionEnd) -> SessionOutcome {
        SessionOutcome {
            end,
            last_page: self.page,
        }
    }
}

/// Page number read from a jump reply.
#[derive(Debug, PartialEq, Eq)]
enum PageNumber {
    /// The reply does not start with a number
    Missing,
    /// 1-based page within the set
    Valid(usize),
    /// A number, but not one of the pages
    OutOfRange,
}

/// Reads the number a jump reply starts with.
///
/// Leading whitespace and a sign are accepted and anything after the digits is
/// ignored, so `3rd` reads as page 3.
fn read_page_number(reply: &str, page_count: usize) -> PageNumber {
    let reply = reply.trim_start();
    let (negative, unsigned) = match reply.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, reply.strip_prefix('+').unwrap_or(reply)),
    };

    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];
    if digits.is_empty() {
        return PageNumber::Missing;
    }

    if negative {
        return PageNumber::OutOfRange;
    }

    // Too many digits for a usize is out of range as well
    match digits.parse::<usize>() {
        Ok(page) if (1..=page_count).contains(&page) => PageNumber::Valid(page),
        _ => PageNumber::OutOfRange,
    }
}
