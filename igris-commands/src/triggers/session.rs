//! Interactive flow that captures a trigger's response from a follow-up message.

use std::time::Duration;

use anyhow::bail;
use tokio::time::Instant;
use tracing::{debug, info};
use twilight_model::id::{
    Id,
    marker::{ChannelMarker, UserMarker},
};

use igris_core::MessageCollector;
use igris_triggers::{TriggerDefinition, TriggerError, TriggerKey, TriggerKind, TriggerStore};

use super::{
    CANCELLED_MESSAGE, INVALID_IMAGE_URL_MESSAGE, added_message, content_too_long_message,
};
use crate::reply::ReplyChannel;

/// How long the invoking user has to send the response content.
pub const AUTHORING_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitingResponse,
    Committed,
    Cancelled,
}

/// How a session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    Committed(TriggerDefinition),
    /// No qualifying message before the deadline.
    TimedOut,
    /// The qualifying message had no text.
    EmptyResponse,
    /// An image trigger got content that is not an image URL.
    InvalidImageUrl,
    /// The response would not fit in a single message.
    ContentTooLong,
}

/// One add-trigger exchange with a single user in a single channel.
#[derive(Debug)]
pub struct AuthoringSession {
    initiator: Id<UserMarker>,
    channel_id: Id<ChannelMarker>,
    key: TriggerKey,
    kind: TriggerKind,
    deadline: Instant,
    state: SessionState,
}

impl AuthoringSession {
    /// Open a session for `raw_key`.
    ///
    /// Fails with [`TriggerError::InvalidKey`] before anything is sent when the
    /// key does not normalize to a valid trigger word.
    pub fn start(
        initiator: Id<UserMarker>,
        channel_id: Id<ChannelMarker>,
        raw_key: &str,
        kind: TriggerKind,
    ) -> Result<Self, TriggerError> {
        let key = TriggerKey::parse(raw_key)?;

        Ok(Self {
            initiator,
            channel_id,
            key,
            kind,
            deadline: Instant::now() + AUTHORING_TIMEOUT,
            state: SessionState::AwaitingResponse,
        })
    }

    pub fn key(&self) -> &TriggerKey {
        &self.key
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Prompt the user, wait for their reply and commit it to `store`.
    ///
    /// The report for the outcome is always sent after the wait resolved.
    pub async fn run(
        &mut self,
        reply: &dyn ReplyChannel,
        collector: &MessageCollector,
        store: &TriggerStore,
    ) -> anyhow::Result<SessionOutcome> {
        if self.state != SessionState::AwaitingResponse {
            bail!("authoring session for `{}` already finished", self.key);
        }

        let pending = collector.register(self.channel_id, self.initiator);
        reply.say(prompt(self.kind)).await?;

        let Some(message) = pending.recv_until(self.deadline).await else {
            debug!(key = %self.key, "trigger authoring timed out");
            return self.cancel(reply, CANCELLED_MESSAGE, SessionOutcome::TimedOut).await;
        };

        let content = message.content.trim();
        if content.is_empty() {
            return self
                .cancel(reply, CANCELLED_MESSAGE, SessionOutcome::EmptyResponse)
                .await;
        }

        let definition = match TriggerDefinition::new(self.kind, content) {
            Ok(definition) => definition,
            Err(TriggerError::InvalidImageUrl(_)) => {
                return self
                    .cancel(
                        reply,
                        INVALID_IMAGE_URL_MESSAGE,
                        SessionOutcome::InvalidImageUrl,
                    )
                    .await;
            }
            Err(TriggerError::ContentTooLong(len)) => {
                debug!(key = %self.key, len, "trigger response too long");
                return self
                    .cancel(
                        reply,
                        &content_too_long_message(),
                        SessionOutcome::ContentTooLong,
                    )
                    .await;
            }
            Err(source) => {
                self.state = SessionState::Cancelled;
                return Err(source.into());
            }
        };

        if let Err(source) = store.put(self.key.clone(), definition.clone()).await {
            self.state = SessionState::Cancelled;
            return Err(source.into());
        }

        self.state = SessionState::Committed;
        info!(
            key = %self.key,
            kind = definition.kind.label(),
            user_id = self.initiator.get(),
            "trigger added"
        );
        reply.say(&added_message(&self.key)).await?;

        Ok(SessionOutcome::Committed(definition))
    }

    async fn cancel(
        &mut self,
        reply: &dyn ReplyChannel,
        notice: &str,
        outcome: SessionOutcome,
    ) -> anyhow::Result<SessionOutcome> {
        self.state = SessionState::Cancelled;
        reply.say(notice).await?;
        Ok(outcome)
    }
}

fn prompt(kind: TriggerKind) -> &'static str {
    match kind {
        TriggerKind::Text => "Enter the response content:",
        TriggerKind::Image => "Enter the image URL (.png, .jpg, .jpeg or .gif):",
    }
}
