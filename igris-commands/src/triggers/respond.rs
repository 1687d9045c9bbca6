//! Automatic replies for messages that mention a registered trigger.

use tracing::debug;
use twilight_model::{
    channel::message::AllowedMentions, gateway::payload::incoming::MessageCreate,
};
use twilight_util::builder::embed::{EmbedBuilder, ImageSource};

use igris_core::Context;
use igris_triggers::TriggerKind;
use igris_utils::embed::DEFAULT_EMBED_COLOR;

/// Reply with the first trigger found in a plain (non-command) message.
///
/// Returns whether a trigger fired.
pub async fn run(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<bool> {
    let Some((key, definition)) = ctx.triggers.find_in(&msg.content).await else {
        return Ok(false);
    };

    debug!(%key, channel_id = msg.channel_id.get(), "trigger fired");
    let http = &ctx.http;

    match definition.kind {
        TriggerKind::Text => {
            // Stored responses never ping anyone.
            http.create_message(msg.channel_id)
                .content(&definition.content)
                .allowed_mentions(Some(&AllowedMentions::default()))
                .await?;
        }
        TriggerKind::Image => {
            let embed = EmbedBuilder::new()
                .color(DEFAULT_EMBED_COLOR)
                .image(ImageSource::url(definition.content.as_str())?)
                .validate()?
                .build();
            http.create_message(msg.channel_id).embeds(&[embed]).await?;
        }
    }

    Ok(true)
}
