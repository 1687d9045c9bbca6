pub mod moderation;
pub mod reply;
pub mod triggers;
pub mod utility;

use tracing::{debug, error};
use twilight_model::gateway::payload::incoming::MessageCreate;

use igris_core::{CollectedMessage, Context, MessageCollector};
use igris_utils::COMMAND_PREFIX;
use igris_utils::parse::parse_command_line;

/// Reply sent when a handler fails unexpectedly.
pub const COMMAND_FAILED_MESSAGE: &str = "⚠️ Something went wrong while running that command.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Arise,
    Avatar,
    Help,
    Calc,
    AddTrigger,
    RemoveTrigger,
    ListTriggers,
    ClearTriggers,
    Kick,
    Ban,
    Unban,
    Timeout,
}

const COMMAND_TABLE: [(&str, CommandKind); 12] = [
    (utility::arise::META.name, CommandKind::Arise),
    (utility::avatar::META.name, CommandKind::Avatar),
    (utility::help::META.name, CommandKind::Help),
    (utility::calc::META.name, CommandKind::Calc),
    (triggers::add::META.name, CommandKind::AddTrigger),
    (triggers::remove::META.name, CommandKind::RemoveTrigger),
    (triggers::list::META.name, CommandKind::ListTriggers),
    (triggers::clear::META.name, CommandKind::ClearTriggers),
    (moderation::kick::META.name, CommandKind::Kick),
    (moderation::ban::META.name, CommandKind::Ban),
    (moderation::unban::META.name, CommandKind::Unban),
    (moderation::timeout::META.name, CommandKind::Timeout),
];

/// Look up the handler for a lower-cased command name.
pub fn route_command(name: &str) -> Option<CommandKind> {
    COMMAND_TABLE
        .into_iter()
        .find_map(|(command, kind)| (command == name).then_some(kind))
}

// Global command meta data
pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::arise::META,
    utility::avatar::META,
    utility::help::META,
    utility::calc::META,
    triggers::add::META,
    triggers::remove::META,
    triggers::list::META,
    triggers::clear::META,
    moderation::kick::META,
    moderation::ban::META,
    moderation::unban::META,
    moderation::timeout::META,
    // Add new commands here
];

/// What the dispatcher does with one incoming message.
#[derive(Debug, PartialEq, Eq)]
pub enum MessageRoute<'a> {
    /// Sent by a bot; never answered.
    Ignored,
    /// Handed to a session waiting for this author's follow-up.
    Collected,
    /// Plain chat, checked against the trigger registry.
    Trigger,
    /// Prefixed, but no command has this name.
    Unknown(String),
    Command {
        kind: CommandKind,
        arg1: Option<&'a str>,
        arg_tail: Option<&'a str>,
    },
}

/// Decide how to handle `message`.
///
/// Waiting sessions see the message before command parsing, so a consumed
/// follow-up is neither a command nor a trigger.
pub fn route_message<'a>(
    collector: &MessageCollector,
    author_is_bot: bool,
    message: &'a CollectedMessage,
) -> MessageRoute<'a> {
    if author_is_bot {
        return MessageRoute::Ignored;
    }

    if collector.offer(message) {
        return MessageRoute::Collected;
    }

    let Some(line) = parse_command_line(&message.content, COMMAND_PREFIX) else {
        return MessageRoute::Trigger;
    };

    match route_command(&line.name) {
        Some(kind) => MessageRoute::Command {
            kind,
            arg1: line.arg1,
            arg_tail: line.arg_tail,
        },
        None => MessageRoute::Unknown(line.name),
    }
}

/// Entry point for every gateway message.
///
/// Command failures are logged and answered here; they never reach the event
/// loop.
pub async fn handle_message(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    let collected = CollectedMessage {
        channel_id: msg.channel_id,
        author_id: msg.author.id,
        content: msg.content.clone(),
    };
    let channel_id = msg.channel_id;

    let (kind, arg1, arg_tail) = match route_message(&ctx.collector, msg.author.bot, &collected)
    {
        MessageRoute::Ignored | MessageRoute::Collected => return Ok(()),
        MessageRoute::Trigger => {
            if let Err(source) = triggers::respond::run(ctx, msg).await {
                error!(?source, "trigger response failed");
            }
            return Ok(());
        }
        MessageRoute::Unknown(name) => {
            debug!(command = %name, "ignoring unknown command");
            return Ok(());
        }
        MessageRoute::Command {
            kind,
            arg1,
            arg_tail,
        } => (kind, arg1, arg_tail),
    };

    debug!(?kind, user_id = msg.author.id.get(), "running command");
    if let Err(source) = run_command(ctx.clone(), kind, msg, arg1, arg_tail).await {
        error!(?source, ?kind, "command failed");
        ctx.http
            .create_message(channel_id)
            .content(COMMAND_FAILED_MESSAGE)
            .await?;
    }

    Ok(())
}

async fn run_command(
    ctx: Context,
    kind: CommandKind,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
    arg_tail: Option<&str>,
) -> anyhow::Result<()> {
    match kind {
        CommandKind::Arise => utility::arise::run(ctx, msg).await,
        CommandKind::Avatar => utility::avatar::run(ctx, msg, arg1).await,
        CommandKind::Help => utility::help::run(ctx, msg, arg1).await,
        CommandKind::Calc => utility::calc::run(ctx, msg, arg1, arg_tail).await,

        CommandKind::AddTrigger => triggers::add::run(ctx, msg, arg1, arg_tail).await,
        CommandKind::RemoveTrigger => triggers::remove::run(ctx, msg, arg1, arg_tail).await,
        CommandKind::ListTriggers => triggers::list::run(ctx, msg).await,
        CommandKind::ClearTriggers => triggers::clear::run(ctx, msg).await,

        CommandKind::Kick => moderation::kick::run(ctx, msg, arg1, arg_tail).await,
        CommandKind::Ban => moderation::ban::run(ctx, msg, arg1, arg_tail).await,
        CommandKind::Unban => moderation::unban::run(ctx, msg, arg1, arg_tail).await,
        CommandKind::Timeout => moderation::timeout::run(ctx, msg, arg1, arg_tail).await,
    }
}
