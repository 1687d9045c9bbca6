use twilight_model::{
    channel::message::embed::Embed,
    id::{Id, marker::UserMarker},
    util::ImageHash,
};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_54_30;
pub const DARK_PURPLE: u32 = 0x71_36_8A;
pub const PURPLE: u32 = 0x9B_59_B6;
pub const BLUE: u32 = 0x34_98_DB;
pub const GREEN: u32 = 0x57_F2_87;

/// Longest description Discord accepts on an embed.
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Build a standard embed with an optional footer.
pub fn build_embed(
    title: &str,
    description: impl Into<String>,
    color: u32,
    footer_note: Option<&str>,
) -> anyhow::Result<Embed> {
    let builder = EmbedBuilder::new()
        .title(title)
        .color(color)
        .description(description);

    let embed = match footer_note {
        Some(note) if !note.is_empty() => {
            let footer = EmbedFooterBuilder::new(note).build();
            builder.footer(footer).validate()?.build()
        }
        _ => builder.validate()?.build(),
    };

    Ok(embed)
}

/// Join lines into a description that fits an embed.
///
/// Lines that would overflow `limit` are dropped and summarized by a final
/// `…and N more` line.
pub fn fit_lines(lines: &[String], limit: usize) -> String {
    let mut description = String::new();

    for (index, line) in lines.iter().enumerate() {
        let remaining = lines.len() - index;
        let separator = usize::from(!description.is_empty());
        let tail = format!("\n…and {remaining} more");

        // Keep room for the summary line unless this is the last line.
        let reserve = if remaining > 1 { tail.chars().count() } else { 0 };
        let needed = description.chars().count() + separator + line.chars().count() + reserve;

        if needed > limit {
            if !description.is_empty() {
                description.push('\n');
            }
            description.push_str(&format!("…and {remaining} more"));
            return description;
        }

        if separator == 1 {
            description.push('\n');
        }
        description.push_str(line);
    }

    description
}

/// CDN URL for a user's avatar, falling back to the default avatar.
pub fn avatar_url(user_id: Id<UserMarker>, avatar: Option<ImageHash>, size: u16) -> String {
    match avatar {
        Some(hash) => {
            let extension = if hash.is_animated() { "gif" } else { "png" };
            format!(
                "https://cdn.discordapp.com/avatars/{}/{}.{}?size={}",
                user_id.get(),
                hash,
                extension,
                size
            )
        }
        None => {
            let default_avatar_index = (user_id.get() >> 22) % 6;
            format!(
                "https://cdn.discordapp.com/embed/avatars/{}.png",
                default_avatar_index
            )
        }
    }
}

/// Neutralize mentions in user-provided text shown back in a channel.
pub fn sanitize_mentions(raw: &str) -> String {
    raw.replace('@', "@\u{200B}")
}
