use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use igris_core::Context;

use super::actions::ModerationAction;
use super::run_action;
use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "kick",
    desc: "Kick a user from the server.",
    category: "moderation",
    usage: "!kick <user> [reason]",
};

/// Kick a target user after permission and input validation.
pub async fn run(
    ctx: Context,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
    arg_tail: Option<&str>,
) -> anyhow::Result<()> {
    run_action(
        &ctx,
        &msg,
        &META,
        Permissions::KICK_MEMBERS,
        arg1,
        ModerationAction::Kick,
        arg_tail,
    )
    .await
}
