use twilight_model::gateway::payload::incoming::MessageCreate;

use igris_core::Context;
use igris_utils::embed::{BLUE, EMBED_DESCRIPTION_LIMIT, build_embed, fit_lines};

use crate::{COMMANDS, CommandMeta};

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "Show available bot commands.",
    category: "utility",
    usage: "!help [category]",
};

/// Render the command catalog, optionally filtered by category.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let category = arg1.map(str::to_lowercase);

    let categories = categories();
    if let Some(wanted) = category.as_deref()
        && !categories.iter().any(|known| *known == wanted)
    {
        let out = format!(
            "Unknown category `{}`. Available: {}",
            wanted,
            categories.join(", ")
        );
        http.create_message(msg.channel_id).content(&out).await?;
        return Ok(());
    }

    let lines = help_lines(category.as_deref());
    let description = fit_lines(&lines, EMBED_DESCRIPTION_LIMIT);
    let embed = build_embed(
        "🛡️ Igris Bot Help",
        description,
        BLUE,
        Some("Use !help <category> to narrow the list."),
    )?;

    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}

fn categories() -> Vec<&'static str> {
    let mut categories: Vec<&str> = COMMANDS.iter().map(|c| c.category).collect();
    categories.sort_unstable();
    categories.dedup();
    categories
}

/// Command lines grouped under bold category headings.
fn help_lines(category: Option<&str>) -> Vec<String> {
    let mut commands: Vec<&'static CommandMeta> = COMMANDS
        .iter()
        .filter(|cmd| category.is_none_or(|wanted| cmd.category == wanted))
        .collect();

    commands.sort_unstable_by(|left, right| {
        left.category
            .cmp(right.category)
            .then_with(|| left.name.cmp(right.name))
    });

    let mut lines = Vec::new();
    let mut current = None;
    for command in commands {
        if current != Some(command.category) {
            if current.is_some() {
                lines.push(String::new());
            }
            lines.push(format!("**{}**", command.category));
            current = Some(command.category);
        }
        lines.push(format!("`{}` — {}", command.usage, command.desc));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_is_listed() {
        let lines = help_lines(None);
        for command in COMMANDS {
            assert!(lines.iter().any(|line| line.contains(command.usage)));
        }
    }

    #[test]
    fn category_filter_narrows_output() {
        let lines = help_lines(Some("triggers"));
        assert_eq!(lines[0], "**triggers**");
        assert!(lines.iter().all(|line| !line.contains("!kick")));
        assert!(lines.iter().any(|line| line.contains("!addtrigger")));
    }

    #[test]
    fn categories_are_unique() {
        assert_eq!(categories(), vec!["moderation", "triggers", "utility"]);
    }
}
