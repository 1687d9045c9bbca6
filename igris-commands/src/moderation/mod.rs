//! Guild moderation commands.

pub mod actions;
pub mod ban;
pub mod kick;
pub mod timeout;
pub mod unban;

use tracing::error;
use twilight_http::Client;
use twilight_model::{
    gateway::payload::incoming::MessageCreate,
    guild::Permissions,
    id::{
        Id,
        marker::{GuildMarker, UserMarker},
    },
};

use igris_core::Context;
use igris_utils::embed::sanitize_mentions;
use igris_utils::parse::parse_target_user_id;
use igris_utils::permissions::has_message_permission;

use crate::CommandMeta;
use actions::{GuildModerator, ModerationAction, ModerationError, apply};

pub const GUILD_ONLY_MESSAGE: &str = "❌ This command only works in servers.";
pub const PERMISSION_DENIED_MESSAGE: &str = "❌ You are not permitted to use this command.";

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

/// Resolve a readable name for a moderation target.
pub async fn fetch_target_name(http: &Client, user_id: Id<UserMarker>) -> String {
    let user = match http.user(user_id).await {
        Ok(response) => response.model().await.ok(),
        Err(_) => None,
    };

    match user {
        Some(user) => sanitize_mentions(&user.global_name.unwrap_or(user.name)),
        None => format!("User {}", user_id.get()),
    }
}

/// Check that the invoker may run a moderation command here.
///
/// Replies and returns `None` when the message is outside a guild or the
/// invoker lacks `required`.
pub(crate) async fn authorize(
    ctx: &Context,
    msg: &MessageCreate,
    required: Permissions,
) -> anyhow::Result<Option<Id<GuildMarker>>> {
    let http = &ctx.http;
    let Some(guild_id) = msg.guild_id else {
        http.create_message(msg.channel_id)
            .content(GUILD_ONLY_MESSAGE)
            .await?;
        return Ok(None);
    };

    if !has_message_permission(http, msg, required).await? {
        http.create_message(msg.channel_id)
            .content(PERMISSION_DENIED_MESSAGE)
            .await?;
        return Ok(None);
    }

    Ok(Some(guild_id))
}

/// Authorize a moderation request and apply it, replying with the outcome.
pub(crate) async fn run_action(
    ctx: &Context,
    msg: &MessageCreate,
    meta: &CommandMeta,
    required: Permissions,
    raw_target: Option<&str>,
    action: ModerationAction,
    reason: Option<&str>,
) -> anyhow::Result<()> {
    let Some(guild_id) = authorize(ctx, msg, required).await? else {
        return Ok(());
    };

    apply_to_target(ctx, msg, guild_id, meta, raw_target, action, reason).await
}

/// Apply an authorized action to the target named in `raw_target`.
pub(crate) async fn apply_to_target(
    ctx: &Context,
    msg: &MessageCreate,
    guild_id: Id<GuildMarker>,
    meta: &CommandMeta,
    raw_target: Option<&str>,
    action: ModerationAction,
    reason: Option<&str>,
) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(target_user_id) = raw_target.and_then(parse_target_user_id) else {
        let usage = usage_message(meta.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    if target_user_id == msg.author.id && action != ModerationAction::Unban {
        let out = format!("❌ You can't {} yourself.", action.verb());
        http.create_message(msg.channel_id).content(&out).await?;
        return Ok(());
    }

    let moderator = GuildModerator::new(http, guild_id);
    let result = apply(&moderator, action, target_user_id, reason).await;

    if let Err(ModerationError::Other(source)) = &result {
        error!(?source, action = action.verb(), "moderation request failed");
    }

    let target_name = match result {
        Ok(()) => fetch_target_name(http, target_user_id).await,
        Err(_) => String::new(),
    };

    let out = action.outcome_message(&target_name, &result);
    http.create_message(msg.channel_id).content(&out).await?;

    Ok(())
}
