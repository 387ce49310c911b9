//! Collector implementation backed by one-shot channels.
//!
//! This module provides the [`EventCollector`] which matches incoming platform
//! events against the outstanding waits and resolves them.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use dashmap::{DashMap, mapref::entry::Entry};
use log::debug;
use tokio::{sync::oneshot, time};

use crate::{
    collector::{Collected, CollectorError, SubjectKey},
    platform::Event,
};

type Predicate = Box<dyn Fn(&Event) -> bool + Send + Sync>;

/// An outstanding wait.
struct Waiter {
    /// Distinguishes this wait from a later one registered on the same key
    id: u64,
    /// Extra filter applied to events carrying the waiter's key
    predicate: Predicate,
    /// Resolves the waiting task
    sender: oneshot::Sender<Event>,
}

/// Removes the waiter when the wait ends, whatever the reason.
///
/// A wait cancelled by dropping its future would otherwise leave a stale
/// registration blocking its key forever.
struct WaiterGuard<'a> {
    waiters: &'a DashMap<SubjectKey, Waiter>,
    key: &'a SubjectKey,
    id: u64,
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        self.waiters.remove_if(self.key, |_, waiter| waiter.id == self.id);
    }
}

/// Registry of outstanding waits, fed by the platform event loop.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use drafty::collector::{Collected, EventCollector};
///
/// # async fn example(collector: EventCollector) -> Result<(), anyhow::Error> {
/// match collector
///     .wait_for_message("@alice", "general", Duration::from_secs(30))
///     .await?
/// {
///     Collected::Event(event) => println!("got {}", event),
///     Collected::TimedOut => println!("nobody answered"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct EventCollector {
    /// Outstanding waits, at most one per key
    waiters: DashMap<SubjectKey, Waiter>,
    /// Source of waiter ids
    next_id: AtomicU64,
}

impl EventCollector {
    /// Creates a collector with no outstanding wait.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for an event carrying `key` and accepted by `predicate`.
    ///
    /// The predicate runs while the waiter table is locked and must not call
    /// back into the collector.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::DuplicateWaiter`] if a wait is already
    /// outstanding for `key`. The existing wait is left untouched.
    pub async fn wait<F>(
        &self,
        key: SubjectKey,
        predicate: F,
        timeout: Duration,
    ) -> Result<Collected, CollectorError>
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        match self.waiters.entry(key.clone()) {
            Entry::Occupied(_) => return Err(CollectorError::DuplicateWaiter(key)),
            Entry::Vacant(entry) => {
                entry.insert(Waiter {
                    id,
                    predicate: Box::new(predicate),
                    sender,
                });
            }
        }

        let _guard = WaiterGuard {
            waiters: &self.waiters,
            key: &key,
            id,
        };

        debug!("waiting for {} during {:?}", key, timeout);

        match time::timeout(timeout, receiver).await {
            Ok(Ok(event)) => Ok(Collected::Event(event)),
            // The sender only disappears with its waiter
            Ok(Err(_)) => Ok(Collected::TimedOut),
            Err(_) => {
                debug!("wait for {} timed out", key);
                Ok(Collected::TimedOut)
            }
        }
    }

    /// Waits for any reaction of `user_id` on `message_id`.
    pub async fn wait_for_reaction(
        &self,
        user_id: &str,
        message_id: &str,
        timeout: Duration,
    ) -> Result<Collected, CollectorError> {
        self.wait(SubjectKey::reaction(user_id, message_id), |_| true, timeout)
            .await
    }

    /// Waits for the next message of `user_id` in `channel_id`.
    pub async fn wait_for_message(
        &self,
        user_id: &str,
        channel_id: &str,
        timeout: Duration,
    ) -> Result<Collected, CollectorError> {
        self.wait(SubjectKey::message(user_id, channel_id), |_| true, timeout)
            .await
    }

    /// Offers `event` to the outstanding waits.
    ///
    /// Returns `true` if a waiter consumed the event. An event rejected by the
    /// waiter's predicate leaves the waiter in place.
    pub fn dispatch(&self, event: &Event) -> bool {
        let key = SubjectKey::of(event);

        let Some((_, waiter)) = self
            .waiters
            .remove_if(&key, |_, waiter| (waiter.predicate)(event))
        else {
            return false;
        };

        if waiter.sender.send(event.clone()).is_err() {
            debug!("waiter for {} went away before delivery", key);
            return false;
        }

        debug!("delivered {} to waiter", event);
        true
    }

    /// Whether a wait is outstanding for `key`.
    pub fn is_waiting(&self, key: &SubjectKey) -> bool {
        self.waiters.contains_key(key)
    }

    /// Number of outstanding waits.
    pub fn pending(&self) -> usize {
        self.waiters.len()
    }
}

#[cfg(test)]
impl EventCollector {
    /// Yields until a wait is registered for `key`.
    pub(crate) async fn until_waiting(&self, key: &SubjectKey) {
        while !self.is_waiting(key) {
            tokio::task::yield_now().await;
        }
    }
}
