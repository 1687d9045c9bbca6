use twilight_model::{
    channel::message::AllowedMentions, gateway::payload::incoming::MessageCreate,
};

use igris_core::Context;
use igris_triggers::TriggerKey;

use super::{NOT_FOUND_MESSAGE, removed_message};
use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "removetrigger",
    desc: "Remove a trigger.",
    category: "triggers",
    usage: "!removetrigger <word>",
};

pub async fn run(
    ctx: Context,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
    arg_tail: Option<&str>,
) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(raw_word) = arg1 else {
        let usage = format!("Usage: `{}`", META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    // Older trigger files may hold phrase keys, so the whole argument names the key.
    let raw_key = match arg_tail {
        Some(tail) => format!("{raw_word} {tail}"),
        None => raw_word.to_owned(),
    };
    let removed = match TriggerKey::parse_stored(&raw_key) {
        Ok(key) => ctx.triggers.remove(&key).await?.then_some(key),
        Err(_) => None,
    };

    let out = match removed {
        Some(key) => removed_message(&key),
        None => NOT_FOUND_MESSAGE.to_owned(),
    };
    http.create_message(msg.channel_id)
        .content(&out)
        .allowed_mentions(Some(&AllowedMentions::default()))
        .await?;

    Ok(())
}
