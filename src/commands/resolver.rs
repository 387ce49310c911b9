//! Deferred subcommand resolution.
//!
//! Commands are declared in no particular order, so a subcommand may be
//! registered before its parent command exists. The [`SubcommandResolver`]
//! tries to attach it right away and, when the parent chain is incomplete,
//! keeps retrying in a background task until the chain appears or the retry
//! ceiling is reached.
//!
//! # Timeline with the defaults
//!
//! ```text
//! t=0s     attempt, parent missing ──► pending
//! t=30s    retry 1
//! ...
//! t=600s   retry 20, parent still missing ──► ResolutionFailure logged, pending dropped
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use dashmap::DashMap;
use log::{debug, error, info};
use thiserror::Error;
use tokio::{task::JoinHandle, time};

use crate::{
    commands::{CommandDefinition, CommandRegistry},
    config,
};

/// Characters separating the segments of a parent path.
const PATH_SEPARATORS: [char; 2] = ['-', '.'];

/// A subcommand whose parent chain never appeared.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("subcommand {subcommand} unable to be created for {parent_path}")]
pub struct ResolutionFailure {
    /// Parent path as given at registration
    pub parent_path: String,
    /// Name of the abandoned subcommand
    pub subcommand: String,
}

/// A registration waiting for its parent chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubcommandRegistration {
    /// Parent path as given at registration
    pub parent_path: String,
    /// Name of the subcommand
    pub subcommand: String,
    /// Retries done so far
    pub attempts: u32,
}

/// Result of [`SubcommandResolver::register_subcommand`].
#[derive(Debug)]
pub enum Registration {
    /// The parent chain existed and the subcommand is attached
    Attached,
    /// The parent chain is incomplete; the handle resolves once the
    /// subcommand is attached or abandoned
    Deferred(JoinHandle<Result<(), ResolutionFailure>>),
}

/// Attaches subcommands to their parents, retrying while parents are missing.
pub struct SubcommandResolver {
    /// Registry holding the parent commands
    registry: Arc<CommandRegistry>,
    /// Delay between two attempts
    retry_delay: Duration,
    /// Retries before giving up
    max_retries: u32,
    /// Registrations waiting for their parent, by registration id
    pending: Arc<DashMap<u64, PendingSubcommandRegistration>>,
    /// Source of registration ids
    next_id: AtomicU64,
}

impl SubcommandResolver {
    /// Creates a resolver retrying every `retry_delay`, at most `max_retries` times.
    pub fn new(registry: Arc<CommandRegistry>, retry_delay: Duration, max_retries: u32) -> Self {
        SubcommandResolver {
            registry,
            retry_delay,
            max_retries,
            pending: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Creates a resolver from the `resolver` configuration section.
    pub fn from_config(registry: Arc<CommandRegistry>, config: &config::Resolver) -> Self {
        Self::new(registry, config.retry_delay(), config.max_retries)
    }

    /// Attaches `definition` under the command at `parent_path`.
    ///
    /// `parent_path` names the parent chain from the top-level command,
    /// segments being separated by `-` or `.` (`"stats"`, `"stats-season"`).
    /// Never blocks on a missing parent: the retries run in a spawned task.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::{sync::Arc, time::Duration};
    /// use drafty::commands::{CommandDefinition, CommandRegistry, Registration, SubcommandResolver};
    ///
    /// # async fn example() {
    /// let registry = Arc::new(CommandRegistry::new());
    /// let resolver = SubcommandResolver::new(Arc::clone(&registry), Duration::from_secs(30), 20);
    ///
    /// // "stats" is not registered yet: the subcommand waits for it
    /// let registration = resolver
    ///     .register_subcommand("stats", CommandDefinition::new("current", |_| async { Ok(()) }))
    ///     .await;
    /// assert!(matches!(registration, Registration::Deferred(_)));
    ///
    /// registry
    ///     .register(CommandDefinition::new("stats", |_| async { Ok(()) }))
    ///     .await;
    /// # }
    /// ```
    pub async fn register_subcommand(
        &self,
        parent_path: &str,
        definition: CommandDefinition,
    ) -> Registration {
        let path = split_path(parent_path);

        if self.registry.attach_subcommand(&path, &definition).await {
            info!(
                "registered subcommand {} of {}",
                definition.name, parent_path
            );
            return Registration::Attached;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.pending.insert(
            id,
            PendingSubcommandRegistration {
                parent_path: parent_path.to_owned(),
                subcommand: definition.name.clone(),
                attempts: 0,
            },
        );

        debug!(
            "parent {} of subcommand {} is not registered yet, retrying every {:?}",
            parent_path, definition.name, self.retry_delay
        );

        let retry = Retry {
            registry: Arc::clone(&self.registry),
            pending: Arc::clone(&self.pending),
            id,
            parent_path: parent_path.to_owned(),
            path,
            definition,
            retry_delay: self.retry_delay,
            max_retries: self.max_retries,
        };

        Registration::Deferred(tokio::spawn(retry.run()))
    }

    /// Registrations still waiting for their parent.
    pub fn pending(&self) -> Vec<PendingSubcommandRegistration> {
        self.pending
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

/// Background retries of one registration.
struct Retry {
    registry: Arc<CommandRegistry>,
    pending: Arc<DashMap<u64, PendingSubcommandRegistration>>,
    id: u64,
    parent_path: String,
    path: Vec<String>,
    definition: CommandDefinition,
    retry_delay: Duration,
    max_retries: u32,
}

impl Retry {
    async fn run(self) -> Result<(), ResolutionFailure> {
        let mut attempts = 0;

        while attempts < self.max_retries {
            time::sleep(self.retry_delay).await;
            attempts += 1;

            if let Some(mut pending) = self.pending.get_mut(&self.id) {
                pending.attempts = attempts;
            }

            if self
                .registry
                .attach_subcommand(&self.path, &self.definition)
                .await
            {
                self.pending.remove(&self.id);
                info!(
                    "registered subcommand {} of {} after {} retries",
                    self.definition.name, self.parent_path, attempts
                );
                return Ok(());
            }

            debug!(
                "parent {} of subcommand {} still missing after {} retries",
                self.parent_path, self.definition.name, attempts
            );
        }

        self.pending.remove(&self.id);

        let failure = ResolutionFailure {
            parent_path: self.parent_path,
            subcommand: self.definition.name,
        };
        error!("{}", failure);

        Err(failure)
    }
}

/// Splits a parent path into its segments, ignoring empty ones.
fn split_path(parent_path: &str) -> Vec<String> {
    parent_path
        .split(PATH_SEPARATORS)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    const DELAY: Duration = Duration::from_secs(30);

    fn noop(name: &str) -> CommandDefinition {
        CommandDefinition::new(name, |_| async { Ok(()) })
    }

    fn resolver() -> (Arc<CommandRegistry>, SubcommandResolver) {
        let registry = Arc::new(CommandRegistry::new());
        let resolver = SubcommandResolver::new(Arc::clone(&registry), DELAY, 20);
        (registry, resolver)
    }

    fn deferred(registration: Registration) -> JoinHandle<Result<(), ResolutionFailure>> {
        match registration {
            Registration::Deferred(handle) => handle,
            Registration::Attached => panic!("Expected deferred registration"),
        }
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("stats"), vec!["stats"]);
        assert_eq!(split_path("stats-season"), vec!["stats", "season"]);
        assert_eq!(split_path("stats.season-draft"), vec!["stats", "season", "draft"]);
        assert!(split_path("").is_empty());
    }

    #[tokio::test]
    async fn test_attached_when_parent_exists() {
        let (registry, resolver) = resolver();
        registry.register(noop("stats")).await;

        let registration = resolver.register_subcommand("stats", noop("current")).await;

        assert!(matches!(registration, Registration::Attached));
        assert!(resolver.pending().is_empty());
        let (command, _) = registry.lookup_path(&["stats", "current"]).await.unwrap();
        assert_eq!(command.name, "current");
    }

    #[tokio::test]
    async fn test_nested_path() {
        let (registry, resolver) = resolver();
        registry.register(noop("stats")).await;
        resolver.register_subcommand("stats", noop("season")).await;

        let registration = resolver
            .register_subcommand("stats-season", noop("draft"))
            .await;

        assert!(matches!(registration, Registration::Attached));
        let (command, rest) = registry
            .lookup_path(&["stats", "season", "draft"])
            .await
            .unwrap();
        assert_eq!(command.name, "draft");
        assert!(rest.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_attached_once_parent_registers() {
        let (registry, resolver) = resolver();
        let start = Instant::now();

        let handle = deferred(resolver.register_subcommand("stats", noop("current")).await);
        assert_eq!(resolver.pending().len(), 1);

        time::sleep(Duration::from_secs(45)).await;
        registry.register(noop("stats")).await;

        assert_eq!(handle.await.unwrap(), Ok(()));
        // Picked up by the second retry
        assert_eq!(start.elapsed(), Duration::from_secs(60));
        assert!(resolver.pending().is_empty());
        assert!(registry.lookup_path(&["stats", "current"]).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_registered_at_end_of_window() {
        let (registry, resolver) = resolver();

        let handle = deferred(resolver.register_subcommand("stats", noop("current")).await);

        time::sleep(Duration::from_secs(590)).await;
        assert_eq!(resolver.pending()[0].attempts, 19);
        registry.register(noop("stats")).await;

        assert_eq!(handle.await.unwrap(), Ok(()));
        let stats = registry.lookup("stats").await.unwrap();
        assert!(stats.subcommand("current").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_once_after_ceiling() {
        let (registry, resolver) = resolver();
        let start = Instant::now();

        let handle = deferred(resolver.register_subcommand("stats", noop("current")).await);

        assert_eq!(
            handle.await.unwrap(),
            Err(ResolutionFailure {
                parent_path: "stats".to_string(),
                subcommand: "current".to_string(),
            })
        );
        assert_eq!(start.elapsed(), DELAY * 20);
        assert!(resolver.pending().is_empty());

        // Registering the parent afterwards does not resurrect the subcommand
        registry.register(noop("stats")).await;
        time::sleep(DELAY * 2).await;
        assert!(registry.lookup("stats").await.unwrap().subcommands.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_intermediate_parent() {
        let (registry, resolver) = resolver();
        registry.register(noop("stats")).await;

        let handle = deferred(
            resolver
                .register_subcommand("stats-season", noop("draft"))
                .await,
        );

        time::sleep(Duration::from_secs(100)).await;
        resolver.register_subcommand("stats", noop("season")).await;

        assert_eq!(handle.await.unwrap(), Ok(()));
        assert!(
            registry
                .lookup_path(&["stats", "season", "draft"])
                .await
                .is_some_and(|(command, _)| command.name == "draft")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_pending_registrations() {
        let (registry, resolver) = resolver();

        let current = deferred(resolver.register_subcommand("stats", noop("current")).await);
        let season = deferred(resolver.register_subcommand("stats", noop("season")).await);
        let orphan = deferred(resolver.register_subcommand("drafts", noop("list")).await);
        assert_eq!(resolver.pending().len(), 3);

        registry.register(noop("stats")).await;

        assert_eq!(current.await.unwrap(), Ok(()));
        assert_eq!(season.await.unwrap(), Ok(()));
        assert!(orphan.await.unwrap().is_err());

        let stats = registry.lookup("stats").await.unwrap();
        assert_eq!(stats.subcommands.unwrap().len(), 2);
        assert!(resolver.pending().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retries_configured() {
        let registry = Arc::new(CommandRegistry::new());
        let resolver = SubcommandResolver::new(Arc::clone(&registry), DELAY, 0);
        let start = Instant::now();

        let handle = deferred(resolver.register_subcommand("stats", noop("current")).await);

        assert!(handle.await.unwrap().is_err());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
