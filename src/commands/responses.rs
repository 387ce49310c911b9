//! Response formatters for the dispatcher and the built-in commands.
//!
//! Every user facing text produced by the command layer is built here so the
//! wording stays consistent.

use crate::commands::{ArgumentError, ArgumentKind, CommandDefinition};

/// Commands listed on each help page.
pub const COMMANDS_PER_PAGE: usize = 5;

/// Formats the reply of the `ping` command.
///
/// # Examples
///
/// ```
/// # use drafty::commands::responses::format_pong;
/// assert_eq!(format_pong(), "🏓 Pong!");
/// ```
pub fn format_pong() -> String {
    "🏓 Pong!".to_owned()
}

/// Formats a response for an unknown command.
///
/// # Examples
///
/// ```
/// # use drafty::commands::responses::format_unknown_command;
/// let msg = format_unknown_command('!', "purge");
/// assert!(msg.contains("Unknown command"));
/// assert!(msg.contains("!help"));
/// ```
pub fn format_unknown_command(prefix: char, name: &str) -> String {
    format!(
        "Unknown command `{}`. Type `{}help` for more information.",
        name, prefix
    )
}

/// Formats the refusal of a guild only command used in direct messages.
pub fn format_guild_only(name: &str) -> String {
    format!("The `{}` command can only be used in a server.", name)
}

/// Formats the refusal of a command whose guards rejected the user.
pub fn format_denied(name: &str) -> String {
    format!("You are not allowed to use the `{}` command.", name)
}

/// Formats an argument error followed by the command usage.
pub fn format_argument_error(error: &ArgumentError, usage: &str) -> String {
    format!("Invalid arguments: {}.\nUsage: `{}`", error, usage)
}

/// Formats the usage line of a command.
///
/// Required arguments are shown as `<name>`, optional ones as `[name]` and a
/// trailing `...` marks an argument taking every remaining word.
///
/// # Examples
///
/// ```
/// # use drafty::commands::responses::format_usage;
/// # use drafty::commands::{ArgumentKind, ArgumentSpec, CommandDefinition};
/// let purge = CommandDefinition::new("purge", |_| async { Ok(()) })
///     .with_argument(ArgumentSpec::required("count", ArgumentKind::Number))
///     .with_argument(ArgumentSpec::optional("reason", ArgumentKind::Rest, None));
///
/// assert_eq!(format_usage('!', &["purge"], &purge), "!purge <count> [reason...]");
/// ```
pub fn format_usage(prefix: char, path: &[&str], command: &CommandDefinition) -> String {
    let mut usage = format!("{}{}", prefix, path.join(" "));

    for argument in &command.arguments {
        let rest = if argument.kind == ArgumentKind::Rest {
            "..."
        } else {
            ""
        };
        if argument.required {
            usage.push_str(&format!(" <{}{}>", argument.name, rest));
        } else {
            usage.push_str(&format!(" [{}{}]", argument.name, rest));
        }
    }

    usage
}

/// Formats the help pages listing `commands`, [`COMMANDS_PER_PAGE`] per page.
///
/// Returns no page when there is no command.
pub fn format_help_pages(prefix: char, commands: &[CommandDefinition]) -> Vec<String> {
    let page_count = commands.len().div_ceil(COMMANDS_PER_PAGE);

    commands
        .chunks(COMMANDS_PER_PAGE)
        .enumerate()
        .map(|(index, chunk)| {
            let mut body = format!("Commands (page {}/{}):\n", index + 1, page_count);
            for command in chunk {
                body.push_str(&format!(
                    "- `{}`: {}\n",
                    format_usage(prefix, &[&command.name], command),
                    describe(command)
                ));
            }
            body.push_str(&format!(
                "\nType `{}help <command>` for the details of a command.",
                prefix
            ));
            body
        })
        .collect()
}

/// Formats the compact list of command names.
///
/// # Examples
///
/// ```
/// # use drafty::commands::responses::format_command_names;
/// let names = vec!["help".to_string(), "ping".to_string()];
/// assert_eq!(format_command_names('!', &names), "Commands: `!help`, `!ping`");
/// ```
pub fn format_command_names(prefix: char, names: &[String]) -> String {
    if names.is_empty() {
        return "No command registered.".to_owned();
    }

    let names: Vec<String> = names
        .iter()
        .map(|name| format!("`{}{}`", prefix, name))
        .collect();
    format!("Commands: {}", names.join(", "))
}

/// Formats the details of the command reached through `path`.
pub fn format_command_details(prefix: char, path: &[&str], command: &CommandDefinition) -> String {
    let mut body = format!(
        "`{}`\n{}\n",
        format_usage(prefix, path, command),
        describe(command)
    );

    if !command.aliases.is_empty() {
        body.push_str(&format!("Aliases: {}\n", command.aliases.join(", ")));
    }
    if command.guild_only {
        body.push_str("Only available in servers.\n");
    }
    if let Some(subcommands) = &command.subcommands {
        let mut names: Vec<&String> = subcommands.keys().collect();
        names.sort();
        let names: Vec<String> = names.iter().map(|name| format!("`{}`", name)).collect();
        body.push_str(&format!("Subcommands: {}\n", names.join(", ")));
    }

    body.trim_end().to_owned()
}

fn describe(command: &CommandDefinition) -> &str {
    if command.description.is_empty() {
        "No description"
    } else {
        &command.description
    }
}
