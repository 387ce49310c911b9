//! Commands shipped with the bot.
//!
//! - `ping` - replies with a pong
//! - `help [command...]` - paginated list of the commands, or the details of one
//! - `help commands` - compact list of the command names, attached through the
//!   [`SubcommandResolver`]

use log::debug;

use crate::commands::{
    ArgumentKind, ArgumentSpec, CommandContext, CommandDefinition, CommandRegistry, Registration,
    SubcommandResolver,
    responses::{
        format_command_details, format_command_names, format_help_pages, format_pong,
        format_unknown_command,
    },
};

/// Registers the built-in commands.
///
/// Returns the registration of the `help commands` subcommand.
pub async fn register(
    registry: &CommandRegistry,
    resolver: &SubcommandResolver,
    prefix: char,
) -> Registration {
    registry.register(ping()).await;
    registry.register(help(prefix)).await;
    resolver.register_subcommand("help", commands(prefix)).await
}

/// The `ping` command.
pub fn ping() -> CommandDefinition {
    CommandDefinition::new("ping", |context| async move {
        context.reply(&format_pong()).await?;
        Ok(())
    })
    .with_description("Checks that the bot is alive")
}

/// The `help` command.
pub fn help(prefix: char) -> CommandDefinition {
    CommandDefinition::new("help", move |context| run_help(context, prefix))
        .with_alias("h")
        .with_description("Lists the commands, or shows the details of one")
        .with_argument(ArgumentSpec::optional("command", ArgumentKind::Rest, None))
}

/// The `commands` subcommand of `help`.
pub fn commands(prefix: char) -> CommandDefinition {
    CommandDefinition::new("commands", move |context: CommandContext| async move {
        let names = context.registry.names().await;
        context.reply(&format_command_names(prefix, &names)).await?;
        Ok(())
    })
    .with_description("Lists the command names")
}

async fn run_help(context: CommandContext, prefix: char) -> anyhow::Result<()> {
    if let Some(name) = context.raw_args.first() {
        let Some((command, rest)) = context.registry.lookup_path(&context.raw_args).await else {
            context
                .reply(&format_unknown_command(prefix, name))
                .await?;
            return Ok(());
        };

        let depth = context.raw_args.len() - rest.len();
        let path: Vec<&str> = context.raw_args[..depth]
            .iter()
            .map(String::as_str)
            .collect();
        context
            .reply(&format_command_details(prefix, &path, &command))
            .await?;
        return Ok(());
    }

    let pages = format_help_pages(prefix, &context.registry.commands().await);
    let outcome = context
        .paginator
        .start(
            &context.event.channel_id,
            &context.event.author_id,
            pages,
            context.paginator.options(),
        )
        .await?;

    debug!("help for {} ended: {:?}", context.event.author_id, outcome.end);
    Ok(())
}
