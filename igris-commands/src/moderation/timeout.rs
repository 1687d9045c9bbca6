use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use igris_core::Context;
use igris_utils::parse::parse_duration_seconds;

use super::actions::ModerationAction;
use super::{apply_to_target, authorize, usage_message};
use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "timeout",
    desc: "Timeout a user.",
    category: "moderation",
    usage: "!timeout <user> <duration> [reason]",
};

/// Longest communication timeout Discord accepts.
const MAX_TIMEOUT_SECS: u64 = 28 * 24 * 60 * 60;

const TOO_LONG_MESSAGE: &str = "❌ Timeouts can last at most 28 days.";

/// Apply a temporary communication timeout to a target user.
pub async fn run(
    ctx: Context,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
    arg_tail: Option<&str>,
) -> anyhow::Result<()> {
    let Some(guild_id) = authorize(&ctx, &msg, Permissions::MODERATE_MEMBERS).await? else {
        return Ok(());
    };

    let (duration_secs, reason) = match timeout_arguments(arg_tail) {
        Ok(arguments) => arguments,
        Err(out) => {
            ctx.http
                .create_message(msg.channel_id)
                .content(&out)
                .await?;
            return Ok(());
        }
    };

    apply_to_target(
        &ctx,
        &msg,
        guild_id,
        &META,
        arg1,
        ModerationAction::Timeout { duration_secs },
        reason,
    )
    .await
}

/// Duration and reason of an authorized timeout, or the reply refusing it.
fn timeout_arguments(arg_tail: Option<&str>) -> Result<(u64, Option<&str>), String> {
    let Some((duration_secs, reason)) = arg_tail.and_then(split_duration) else {
        return Err(usage_message(META.usage));
    };

    if duration_secs > MAX_TIMEOUT_SECS {
        return Err(TOO_LONG_MESSAGE.to_owned());
    }

    Ok((duration_secs, reason))
}

/// Split `<duration> [reason]`.
fn split_duration(tail: &str) -> Option<(u64, Option<&str>)> {
    let mut parts = tail.splitn(2, char::is_whitespace);
    let duration_secs = parse_duration_seconds(parts.next()?)?;
    let reason = parts
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    Some((duration_secs, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_and_reason() {
        assert_eq!(split_duration("60"), Some((60, None)));
        assert_eq!(split_duration("10m  too loud "), Some((600, Some("too loud"))));
        assert_eq!(split_duration("forever"), None);
    }

    #[test]
    fn arguments_are_checked_after_authorization() {
        assert_eq!(timeout_arguments(Some("28d spam")), Ok((MAX_TIMEOUT_SECS, Some("spam"))));
        assert_eq!(timeout_arguments(Some("29d")), Err(TOO_LONG_MESSAGE.to_owned()));
        assert_eq!(timeout_arguments(None), Err(usage_message(META.usage)));
        assert_eq!(timeout_arguments(Some("soon")), Err(usage_message(META.usage)));
    }
}
