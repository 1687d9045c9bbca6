use tracing::debug;
use twilight_model::gateway::payload::incoming::MessageCreate;
use twilight_util::builder::embed::{EmbedBuilder, ImageSource};

use igris_core::Context;
use igris_utils::embed::{BLUE, avatar_url, sanitize_mentions};
use igris_utils::parse::parse_target_user_id;

use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "avatar",
    desc: "Get your or a mentioned user's avatar.",
    category: "utility",
    usage: "!avatar [user]",
};

/// Show the avatar of the invoker or of the given user.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;

    let target_id = match arg1 {
        Some(raw) => match parse_target_user_id(raw) {
            Some(id) => id,
            None => {
                let usage = format!("Usage: `{}`", META.usage);
                http.create_message(msg.channel_id).content(&usage).await?;
                return Ok(());
            }
        },
        None => msg.author.id,
    };

    let (name, avatar) = if target_id == msg.author.id {
        (msg.author.name.clone(), msg.author.avatar)
    } else {
        let user = match http.user(target_id).await {
            Ok(response) => response.model().await?,
            Err(source) => {
                debug!(?source, user_id = target_id.get(), "avatar lookup failed");
                http.create_message(msg.channel_id)
                    .content("❌ User not found.")
                    .await?;
                return Ok(());
            }
        };
        (user.name, user.avatar)
    };

    let embed = EmbedBuilder::new()
        .title(format!("{}'s Avatar", sanitize_mentions(&name)))
        .image(ImageSource::url(avatar_url(target_id, avatar, 1024))?)
        .color(BLUE)
        .validate()?
        .build();

    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}
