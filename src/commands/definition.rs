//! Command definitions.
//!
//! A [`CommandDefinition`] describes one command or subcommand: its name and
//! aliases, the arguments it expects, the guards checked before running it and
//! the async handler doing the work. Subcommands are definitions nested in
//! their parent's subcommand map.

use std::{collections::HashMap, fmt, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt};

use crate::{commands::CommandContext, platform::MessageEvent};

/// Async command handler.
pub type Handler = Arc<dyn Fn(CommandContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Predicate over the invoking message, e.g. a permission level check.
pub type Guard = Arc<dyn Fn(&MessageEvent) -> bool + Send + Sync>;

/// How an argument is read from the message words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// One word parsed as an integer
    Number,
    /// One word
    Word,
    /// Every remaining word, joined with spaces
    Rest,
}

/// Declaration of one positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    /// Name the handler reads the value with
    pub name: String,
    /// How the value is read
    pub kind: ArgumentKind,
    /// Whether the command is rejected when the value is missing
    pub required: bool,
    /// Value used when the word is missing
    pub default: Option<String>,
}

impl ArgumentSpec {
    /// Required argument without default.
    pub fn required(name: &str, kind: ArgumentKind) -> Self {
        ArgumentSpec {
            name: name.to_owned(),
            kind,
            required: true,
            default: None,
        }
    }

    /// Optional argument, falling back to `default` when given.
    pub fn optional(name: &str, kind: ArgumentKind, default: Option<&str>) -> Self {
        ArgumentSpec {
            name: name.to_owned(),
            kind,
            required: false,
            default: default.map(str::to_owned),
        }
    }
}

/// A command or subcommand.
///
/// # Examples
///
/// ```
/// use drafty::commands::{ArgumentKind, ArgumentSpec, CommandDefinition};
///
/// let purge = CommandDefinition::new("purge", |context| async move {
///     context.reply("Purged messages").await?;
///     Ok(())
/// })
/// .with_alias("delete")
/// .with_description("Deletes the last messages of the channel")
/// .with_argument(ArgumentSpec::optional("count", ArgumentKind::Number, Some("1")))
/// .guild_only();
///
/// assert_eq!(purge.name, "purge");
/// assert!(purge.guild_only);
/// ```
#[derive(Clone)]
pub struct CommandDefinition {
    /// Unique name in the parent scope
    pub name: String,
    /// Alternative names
    pub aliases: Vec<String>,
    /// One line description shown by `help`
    pub description: String,
    /// Positional arguments, in order
    pub arguments: Vec<ArgumentSpec>,
    /// Whether the command is refused in direct messages
    pub guild_only: bool,
    /// Extra checks, all of them must pass
    pub guards: Vec<Guard>,
    /// Code run when the command is invoked
    pub handler: Handler,
    /// Nested commands, created on the first attach
    pub subcommands: Option<HashMap<String, CommandDefinition>>,
}

impl CommandDefinition {
    /// Creates a definition named `name` running `handler`.
    pub fn new<F, Fut>(name: &str, handler: F) -> Self
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        CommandDefinition {
            name: name.to_owned(),
            aliases: Vec::new(),
            description: String::new(),
            arguments: Vec::new(),
            guild_only: false,
            guards: Vec::new(),
            handler: Arc::new(move |context| handler(context).boxed()),
            subcommands: None,
        }
    }

    /// Adds an alternative name.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_owned());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Appends a positional argument.
    pub fn with_argument(mut self, argument: ArgumentSpec) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Refuses the command outside guilds.
    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    /// Adds a guard.
    pub fn with_guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&MessageEvent) -> bool + Send + Sync + 'static,
    {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Whether `name` is the name or one of the aliases of this command.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }

    /// Finds a direct subcommand by name or alias.
    pub fn subcommand(&self, name: &str) -> Option<&CommandDefinition> {
        let subcommands = self.subcommands.as_ref()?;
        subcommands
            .get(name)
            .or_else(|| subcommands.values().find(|sub| sub.answers_to(name)))
    }

    /// Whether every guard accepts `event`.
    pub fn allows(&self, event: &MessageEvent) -> bool {
        self.guards.iter().all(|guard| guard(event))
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subcommands: Vec<&String> = self
            .subcommands
            .as_ref()
            .map(|subs| subs.keys().collect())
            .unwrap_or_default();

        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("arguments", &self.arguments)
            .field("guild_only", &self.guild_only)
            .field("guards", &self.guards.len())
            .field("subcommands", &subcommands)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> CommandDefinition {
        CommandDefinition::new(name, |_| async { Ok(()) })
    }

    fn event(author_id: &str) -> MessageEvent {
        MessageEvent {
            message_id: "1".to_string(),
            author_id: author_id.to_string(),
            channel_id: "general".to_string(),
            guild_id: Some("league".to_string()),
            content: "!stats".to_string(),
        }
    }

    #[test]
    fn test_answers_to_name_and_alias() {
        let command = noop("purge").with_alias("delete");
        assert!(command.answers_to("purge"));
        assert!(command.answers_to("delete"));
        assert!(!command.answers_to("stats"));
    }

    #[test]
    fn test_subcommand_lookup_by_alias() {
        let mut stats = noop("stats");
        stats.subcommands = Some(HashMap::from([(
            "current".to_string(),
            noop("current").with_alias("now"),
        )]));

        assert_eq!(stats.subcommand("current").unwrap().name, "current");
        assert_eq!(stats.subcommand("now").unwrap().name, "current");
        assert!(stats.subcommand("season").is_none());
    }

    #[test]
    fn test_subcommand_without_map() {
        assert!(noop("stats").subcommand("current").is_none());
    }

    #[test]
    fn test_guards() {
        let command = noop("purge").with_guard(|event| event.author_id == "@owner");
        assert!(command.allows(&event("@owner")));
        assert!(!command.allows(&event("@alice")));
        assert!(noop("stats").allows(&event("@alice")));
    }

    #[test]
    fn test_debug_hides_handler() {
        let output = format!("{:?}", noop("stats").with_description("Shows stats"));
        assert!(output.contains("stats"));
        assert!(!output.contains("handler"));
    }
}
