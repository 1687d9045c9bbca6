use twilight_model::{gateway::payload::incoming::MessageCreate, util::Timestamp};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder, ImageSource};

use igris_core::Context;
use igris_utils::embed::{DARK_PURPLE, avatar_url};

use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "arise",
    desc: "Summon Igris from the shadows.",
    category: "utility",
    usage: "!arise",
};

/// Greet the invoker with the summoning embed.
pub async fn run(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    let icon = ImageSource::url(avatar_url(msg.author.id, msg.author.avatar, 128))?;
    let footer = EmbedFooterBuilder::new(format!("⚔️ {}", msg.author.name))
        .icon_url(icon)
        .build();

    let embed = EmbedBuilder::new()
        .title("⚔️ Igris Has Awakened!")
        .description(
            "Summoned by the shadows, Igris stands ready.\n\n**How can I assist you today, master?**",
        )
        .color(DARK_PURPLE)
        .footer(footer)
        .timestamp(now_timestamp()?)
        .validate()?
        .build();

    ctx.http
        .create_message(msg.channel_id)
        .embeds(&[embed])
        .await?;

    Ok(())
}

pub(crate) fn now_timestamp() -> anyhow::Result<Timestamp> {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs());

    Ok(Timestamp::from_secs(i64::try_from(secs)?)?)
}
