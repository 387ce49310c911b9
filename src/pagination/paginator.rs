//! Entry point of pagination sessions.

use std::{sync::Arc, time::Duration};

use log::{info, warn};

use crate::{
    collector::EventCollector,
    config,
    pagination::{
        DEFAULT_TIMEOUT, PaginationError, PaginationOptions, SessionEnd, SessionOutcome,
        session::Session,
    },
    platform::Platform,
};

/// Starts pagination sessions on a platform.
///
/// One paginator is shared by every command; each call to [`Paginator::start`]
/// drives its own session until it ends.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use drafty::{collector::EventCollector, pagination::Paginator, platform::Platform};
///
/// # async fn example(platform: Arc<dyn Platform>) -> Result<(), anyhow::Error> {
/// let paginator = Paginator::new(platform, Arc::new(EventCollector::new()));
/// let pages = vec!["Page 1".to_string(), "Page 2".to_string()];
///
/// let outcome = paginator
///     .start("general", "@alice", pages, paginator.options())
///     .await?;
/// println!("session ended on page {}: {:?}", outcome.last_page, outcome.end);
/// # Ok(())
/// # }
/// ```
pub struct Paginator {
    /// Platform the pages are rendered on
    platform: Arc<dyn Platform>,
    /// Collector receiving the user's reactions and replies
    collector: Arc<EventCollector>,
    /// Wait timeout used by [`Paginator::options`]
    default_timeout: Duration,
}

impl Paginator {
    /// Creates a paginator waiting [`DEFAULT_TIMEOUT`] for each reaction.
    pub fn new(platform: Arc<dyn Platform>, collector: Arc<EventCollector>) -> Self {
        Paginator {
            platform,
            collector,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates a paginator from the `pagination` configuration section.
    pub fn from_config(
        platform: Arc<dyn Platform>,
        collector: Arc<EventCollector>,
        config: &config::Pagination,
    ) -> Self {
        Paginator {
            platform,
            collector,
            default_timeout: config.timeout(),
        }
    }

    /// Default options with the configured wait timeout.
    pub fn options(&self) -> PaginationOptions {
        PaginationOptions {
            per_wait_timeout: self.default_timeout,
            ..PaginationOptions::default()
        }
    }

    /// Shows `pages` in `channel_id` and lets `user_id` browse them.
    ///
    /// Returns once the session ended. Platform failures end the session and
    /// are reported through [`SessionOutcome::end`], never as errors.
    ///
    /// # Errors
    ///
    /// * [`PaginationError::EmptyPageSet`] when `pages` is empty, nothing is sent
    /// * [`PaginationError::DuplicateWaiter`] when `user_id` already has a wait
    ///   pending on the rendered message or in the channel
    pub async fn start(
        &self,
        channel_id: &str,
        user_id: &str,
        pages: Vec<String>,
        options: PaginationOptions,
    ) -> Result<SessionOutcome, PaginationError> {
        if pages.is_empty() {
            return Err(PaginationError::EmptyPageSet);
        }

        let page = options.initial_page.clamp(1, pages.len());

        let message = match self
            .platform
            .send_message(channel_id, &pages[page - 1])
            .await
        {
            Ok(message) => message,
            Err(e) => {
                warn!("unable to send page {} in {}: {}", page, channel_id, e);
                return Ok(SessionOutcome {
                    end: SessionEnd::SendFailed,
                    last_page: page,
                });
            }
        };

        if pages.len() <= 1 {
            return Ok(SessionOutcome {
                end: SessionEnd::SinglePage,
                last_page: page,
            });
        }

        let symbols = options.reactions.symbols();
        if let Err(e) = self.platform.add_reactions(&message, &symbols).await {
            warn!("unable to add reactions on {}: {}", message.id, e);
            return Ok(SessionOutcome {
                end: SessionEnd::ReactFailed,
                last_page: page,
            });
        }

        info!(
            "pagination of {} pages started on {} for {}",
            pages.len(),
            message.id,
            user_id
        );

        let session = Session {
            platform: self.platform.as_ref(),
            collector: &self.collector,
            channel_id,
            user_id,
            pages,
            page,
            message,
            reactions: options.reactions,
            timeout: options.per_wait_timeout,
        };

        let outcome = session.run().await?;
        info!(
            "pagination for {} ended on page {}: {:?}",
            user_id, outcome.last_page, outcome.end
        );

        Ok(outcome)
    }
}
