//! Command registry.
//!
//! This module provides the [`CommandRegistry`], the shared map from command
//! name to [`CommandDefinition`]. Registration is last-write-wins so a command
//! can be reloaded at any time, and lookups walk nested subcommand maps.

use std::collections::HashMap;

use log::{debug, info};
use tokio::sync::RwLock;

use crate::commands::CommandDefinition;

/// Map of the top-level commands.
///
/// Writes are serialized behind a reader/writer lock; each lookup is a single
/// read and clones the definition it returns.
///
/// # Examples
///
/// ```
/// use drafty::commands::{CommandDefinition, CommandRegistry};
///
/// # async fn example() {
/// let registry = CommandRegistry::new();
/// registry
///     .register(CommandDefinition::new("ping", |_| async { Ok(()) }))
///     .await;
///
/// assert!(registry.lookup("ping").await.is_some());
/// # }
/// ```
#[derive(Default)]
pub struct CommandRegistry {
    /// Top-level commands by name
    commands: RwLock<HashMap<String, CommandDefinition>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `definition`, replacing any command with the same name.
    pub async fn register(&self, definition: CommandDefinition) {
        let name = definition.name.clone();
        let replaced = self
            .commands
            .write()
            .await
            .insert(name.clone(), definition)
            .is_some();

        if replaced {
            debug!("command {} replaced", name);
        }
        info!("registered command {}", name);
    }

    /// Returns the command named `name`, or answering to it as an alias.
    pub async fn lookup(&self, name: &str) -> Option<CommandDefinition> {
        let commands = self.commands.read().await;
        find(&commands, name).cloned()
    }

    /// Resolves `names` through nested subcommands.
    ///
    /// Returns the deepest matching definition and the names left unmatched,
    /// or `None` if the first name is not a registered command.
    ///
    /// # Examples
    ///
    /// ```
    /// use drafty::commands::CommandRegistry;
    ///
    /// # async fn example(registry: CommandRegistry) {
    /// // "stats" has a "current" subcommand
    /// if let Some((command, rest)) = registry.lookup_path(&["stats", "current", "@bob"]).await {
    ///     assert_eq!(command.name, "current");
    ///     assert_eq!(rest, vec!["@bob".to_string()]);
    /// }
    /// # }
    /// ```
    pub async fn lookup_path<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Option<(CommandDefinition, Vec<String>)> {
        let (first, rest) = names.split_first()?;

        let commands = self.commands.read().await;
        let mut current = find(&commands, first.as_ref())?;
        let mut matched = 1;

        for name in rest {
            let Some(subcommand) = current.subcommand(name.as_ref()) else {
                break;
            };
            current = subcommand;
            matched += 1;
        }

        let remainder = names[matched..]
            .iter()
            .map(|name| name.as_ref().to_owned())
            .collect();

        Some((current.clone(), remainder))
    }

    /// Attaches `subcommand` under the command at `path`.
    ///
    /// `path` lists the parent chain from the top-level command. Returns `false`
    /// without changing anything when a link of the chain is missing.
    pub(crate) async fn attach_subcommand(
        &self,
        path: &[String],
        subcommand: &CommandDefinition,
    ) -> bool {
        let Some((first, rest)) = path.split_first() else {
            return false;
        };

        let mut commands = self.commands.write().await;
        let Some(mut parent) = commands.get_mut(first) else {
            return false;
        };

        for segment in rest {
            let Some(next) = parent
                .subcommands
                .as_mut()
                .and_then(|subcommands| subcommands.get_mut(segment))
            else {
                return false;
            };
            parent = next;
        }

        parent
            .subcommands
            .get_or_insert_with(HashMap::new)
            .insert(subcommand.name.clone(), subcommand.clone());

        true
    }

    /// Names of the top-level commands, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Top-level commands, sorted by name.
    pub async fn commands(&self) -> Vec<CommandDefinition> {
        let mut commands: Vec<CommandDefinition> =
            self.commands.read().await.values().cloned().collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }
}

fn find<'a>(
    commands: &'a HashMap<String, CommandDefinition>,
    name: &str,
) -> Option<&'a CommandDefinition> {
    commands
        .get(name)
        .or_else(|| commands.values().find(|command| command.answers_to(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> CommandDefinition {
        CommandDefinition::new(name, |_| async { Ok(()) })
    }

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = CommandRegistry::new();
        registry.register(noop("stats")).await;

        assert_eq!(registry.lookup("stats").await.unwrap().name, "stats");
        assert!(registry.lookup("purge").await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_by_alias() {
        let registry = CommandRegistry::new();
        registry.register(noop("purge").with_alias("delete")).await;

        assert_eq!(registry.lookup("delete").await.unwrap().name, "purge");
    }

    #[tokio::test]
    async fn test_register_replaces_previous_definition() {
        let registry = CommandRegistry::new();
        registry
            .register(noop("stats").with_description("old"))
            .await;
        registry
            .register(noop("stats").with_description("new"))
            .await;

        assert_eq!(registry.lookup("stats").await.unwrap().description, "new");
        assert_eq!(registry.names().await, vec!["stats".to_string()]);
    }

    #[tokio::test]
    async fn test_lookup_path_walks_subcommands() {
        let registry = CommandRegistry::new();
        registry.register(noop("stats")).await;
        assert!(
            registry
                .attach_subcommand(&path(&["stats"]), &noop("season"))
                .await
        );
        assert!(
            registry
                .attach_subcommand(&path(&["stats", "season"]), &noop("draft"))
                .await
        );

        let (command, rest) = registry
            .lookup_path(&["stats", "season", "draft", "3"])
            .await
            .unwrap();
        assert_eq!(command.name, "draft");
        assert_eq!(rest, vec!["3".to_string()]);
    }

    #[tokio::test]
    async fn test_lookup_path_stops_at_unknown_subcommand() {
        let registry = CommandRegistry::new();
        registry.register(noop("stats")).await;

        let (command, rest) = registry
            .lookup_path(&["stats", "current", "@bob"])
            .await
            .unwrap();
        assert_eq!(command.name, "stats");
        assert_eq!(rest, path(&["current", "@bob"]));
    }

    #[tokio::test]
    async fn test_lookup_path_unknown_root() {
        let registry = CommandRegistry::new();
        assert!(registry.lookup_path(&["stats"]).await.is_none());
        assert!(registry.lookup_path::<&str>(&[]).await.is_none());
    }

    #[tokio::test]
    async fn test_attach_fails_without_parent() {
        let registry = CommandRegistry::new();
        registry.register(noop("stats")).await;

        assert!(!registry.attach_subcommand(&path(&["drafts"]), &noop("current")).await);
        assert!(
            !registry
                .attach_subcommand(&path(&["stats", "season"]), &noop("draft"))
                .await
        );
        assert!(!registry.attach_subcommand(&[], &noop("current")).await);
        assert!(registry.lookup("stats").await.unwrap().subcommands.is_none());
    }

    #[tokio::test]
    async fn test_attach_replaces_subcommand() {
        let registry = CommandRegistry::new();
        registry.register(noop("stats")).await;
        registry
            .attach_subcommand(&path(&["stats"]), &noop("current").with_description("old"))
            .await;
        registry
            .attach_subcommand(&path(&["stats"]), &noop("current").with_description("new"))
            .await;

        let stats = registry.lookup("stats").await.unwrap();
        assert_eq!(stats.subcommands.as_ref().unwrap().len(), 1);
        assert_eq!(stats.subcommand("current").unwrap().description, "new");
    }

    #[tokio::test]
    async fn test_commands_are_sorted() {
        let registry = CommandRegistry::new();
        registry.register(noop("stats")).await;
        registry.register(noop("help")).await;
        registry.register(noop("purge")).await;

        let names: Vec<String> = registry
            .commands()
            .await
            .into_iter()
            .map(|command| command.name)
            .collect();
        assert_eq!(names, path(&["help", "purge", "stats"]));
    }
}
