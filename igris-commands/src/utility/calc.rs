use tracing::debug;
use twilight_model::gateway::payload::incoming::MessageCreate;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

use igris_core::Context;
use igris_utils::calc::{evaluate, format_number};
use igris_utils::embed::GREEN;

use super::arise::now_timestamp;
use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "calc",
    desc: "Perform a quick calculation.",
    category: "utility",
    usage: "!calc <expression>",
};

pub const INVALID_EXPRESSION_MESSAGE: &str = "❌ Invalid expression.";

/// Evaluate an arithmetic expression and show the result.
pub async fn run(
    ctx: Context,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
    arg_tail: Option<&str>,
) -> anyhow::Result<()> {
    let http = &ctx.http;
    let Some(expression) = join_expression(arg1, arg_tail) else {
        let usage = format!("Usage: `{}`", META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    let result = match evaluate(&expression) {
        Ok(value) => format_number(value),
        Err(source) => {
            debug!(%source, "calculation rejected");
            http.create_message(msg.channel_id)
                .content(INVALID_EXPRESSION_MESSAGE)
                .await?;
            return Ok(());
        }
    };

    let footer = EmbedFooterBuilder::new(format!("Requested by {}", msg.author.name)).build();
    let embed = EmbedBuilder::new()
        .title("🧮 Calculation Result")
        .description(format!("```{expression} = {result}```"))
        .color(GREEN)
        .footer(footer)
        .timestamp(now_timestamp()?)
        .validate()?
        .build();

    http.create_message(msg.channel_id).embeds(&[embed]).await?;

    Ok(())
}

fn join_expression(arg1: Option<&str>, arg_tail: Option<&str>) -> Option<String> {
    match (arg1, arg_tail) {
        (Some(head), Some(tail)) => Some(format!("{head} {tail}")),
        (Some(head), None) => Some(head.to_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_is_rebuilt_from_arguments() {
        assert_eq!(
            join_expression(Some("1"), Some("+ 2 * 3")).as_deref(),
            Some("1 + 2 * 3")
        );
        assert_eq!(join_expression(Some("2^8"), None).as_deref(), Some("2^8"));
        assert_eq!(join_expression(None, None), None);
    }
}
