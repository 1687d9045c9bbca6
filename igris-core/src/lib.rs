use std::sync::Arc;

use twilight_http::Client;

use igris_triggers::TriggerStore;

/// Follow-up message routing for interactive commands.
pub mod collector;
/// Environment-driven runtime settings.
pub mod config;

pub use collector::{CollectedMessage, MessageCollector, PendingMessage};
pub use config::{Config, CorruptPolicy};

/// Shared application context passed into command handlers.
///
/// Cheap to clone because it only stores reference-counted shared state.
#[derive(Clone)]
pub struct Context {
    pub http: Arc<Client>,
    pub triggers: TriggerStore,
    pub collector: MessageCollector,
}

impl Context {
    /// Create a new application context.
    pub fn new(http: Arc<Client>, triggers: TriggerStore) -> Self {
        Self {
            http,
            triggers,
            collector: MessageCollector::new(),
        }
    }
}
