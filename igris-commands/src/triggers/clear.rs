use tracing::info;
use twilight_model::gateway::payload::incoming::MessageCreate;

use igris_core::Context;

use super::CLEARED_MESSAGE;
use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "cleartriggers",
    desc: "Clear all custom triggers.",
    category: "triggers",
    usage: "!cleartriggers",
};

pub async fn run(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    ctx.triggers.clear().await?;
    info!(user_id = msg.author.id.get(), "triggers cleared");

    ctx.http
        .create_message(msg.channel_id)
        .content(CLEARED_MESSAGE)
        .await?;

    Ok(())
}
