use twilight_model::gateway::payload::incoming::MessageCreate;

use igris_core::Context;
use igris_triggers::{TriggerDefinition, TriggerKey};
use igris_utils::embed::{EMBED_DESCRIPTION_LIMIT, PURPLE, build_embed, fit_lines};

use super::EMPTY_LIST_MESSAGE;
use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "listtriggers",
    desc: "List all custom triggers.",
    category: "triggers",
    usage: "!listtriggers",
};

pub async fn run(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let triggers = ctx.triggers.list().await;

    if triggers.is_empty() {
        http.create_message(msg.channel_id)
            .content(EMPTY_LIST_MESSAGE)
            .await?;
        return Ok(());
    }

    let description = fit_lines(&trigger_lines(&triggers), EMBED_DESCRIPTION_LIMIT);
    let footer = format!("{} trigger(s)", triggers.len());
    let embed = build_embed("🧠 Active Triggers", description, PURPLE, Some(&footer))?;
    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}

fn trigger_lines(triggers: &[(TriggerKey, TriggerDefinition)]) -> Vec<String> {
    triggers
        .iter()
        .map(|(key, definition)| format!("• **{}** → {}", key, definition.kind.label()))
        .collect()
}
