use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};
use twilight_http::Client;
use twilight_model::gateway::event::Event;

use rustls::crypto::ring::default_provider;

use igris_commands::handle_message;
use igris_core::{Config, Context, CorruptPolicy};
use igris_triggers::{TriggerError, TriggerStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load the .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    let config = Config::from_env()?;
    let triggers = load_triggers(&config).await?;

    // Create a single shared HTTP Client
    let http = Arc::new(Client::new(config.discord_token.clone()));
    let ctx = Context::new(Arc::clone(&http), triggers);

    // Message content is needed to read commands and follow-up replies
    let intents = Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT;

    // A shard is one Gateway WebSocket connection to Discord
    let mut shard = Shard::new(ShardId::new(0, 1), config.discord_token, intents);

    info!("Igris is connecting...");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(source) => {
                error!(?source, "gateway event stream error");
                continue;
            }
        };

        match event {
            Event::Ready(ready) => {
                info!(user = %ready.user.name, "Igris has awakened");
            }
            Event::MessageCreate(msg) => {
                // Handlers may wait for follow-up messages; never block the loop on them.
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(source) = handle_message(ctx, msg).await {
                        error!(?source, "message handler failed");
                    }
                });
            }
            _ => {} // Ignore unused events
        }
    }

    Ok(()) // Return Success, shutdown cleanly
}

/// Load the trigger registry, applying the configured policy to corrupt files.
async fn load_triggers(config: &Config) -> anyhow::Result<TriggerStore> {
    match TriggerStore::load(&config.triggers_path).await {
        Ok(store) => Ok(store),
        Err(TriggerError::StorageCorrupt { path, source })
            if config.corrupt_policy == CorruptPolicy::Reset =>
        {
            warn!(?source, path = %path.display(), "trigger file corrupt, starting empty");
            TriggerStore::quarantine(&path).await?;
            Ok(TriggerStore::empty(path))
        }
        Err(source) => Err(anyhow::Error::new(source).context(format!(
            "refusing to start with unreadable triggers at {} \
             (set TRIGGERS_CORRUPT_POLICY=reset to move it aside)",
            config.triggers_path.display()
        ))),
    }
}
