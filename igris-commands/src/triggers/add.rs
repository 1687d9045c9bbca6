use twilight_model::gateway::payload::incoming::MessageCreate;

use igris_core::Context;
use igris_triggers::{TriggerError, TriggerKind};

use super::INVALID_KEY_MESSAGE;
use super::session::AuthoringSession;
use crate::CommandMeta;
use crate::reply::{ChannelReply, ReplyChannel};

pub const META: CommandMeta = CommandMeta {
    name: "addtrigger",
    desc: "Add a custom trigger.",
    category: "triggers",
    usage: "!addtrigger <word> [text|image]",
};

/// Start an authoring session for a new trigger.
///
/// The response content is taken from the invoker's next message in this
/// channel. `image` triggers only accept image URLs.
pub async fn run(
    ctx: Context,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
    arg_tail: Option<&str>,
) -> anyhow::Result<()> {
    let reply = ChannelReply::new(&ctx.http, msg.channel_id);

    let Some(raw_word) = arg1 else {
        reply.say(&format!("Usage: `{}`", META.usage)).await?;
        return Ok(());
    };

    let Some(kind) = parse_kind(arg_tail) else {
        reply.say(&format!("Usage: `{}`", META.usage)).await?;
        return Ok(());
    };

    let mut session = match AuthoringSession::start(msg.author.id, msg.channel_id, raw_word, kind)
    {
        Ok(session) => session,
        Err(TriggerError::InvalidKey(raw)) => {
            tracing::debug!(%raw, "rejected trigger word");
            reply.say(INVALID_KEY_MESSAGE).await?;
            return Ok(());
        }
        Err(source) => return Err(source.into()),
    };

    session.run(&reply, &ctx.collector, &ctx.triggers).await?;

    Ok(())
}

/// Trigger kind from the optional argument after the word; text by default.
fn parse_kind(arg_tail: Option<&str>) -> Option<TriggerKind> {
    match arg_tail {
        None => Some(TriggerKind::Text),
        Some(raw) => raw.parse().ok(),
    }
}
