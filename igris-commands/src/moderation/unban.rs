use twilight_model::{gateway::payload::incoming::MessageCreate, guild::Permissions};

use igris_core::Context;

use super::actions::ModerationAction;
use super::run_action;
use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "unban",
    desc: "Unban a user from the server.",
    category: "moderation",
    usage: "!unban <user> [reason]",
};

/// Remove an active ban for a target user.
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
        Permissions::BAN_MEMBERS,
        arg1,
        ModerationAction::Unban,
        arg_tail,
    )
    .await
}
