//! Outbound side of a conversation with the invoking user.

use async_trait::async_trait;
use twilight_http::Client;
use twilight_model::{
    channel::message::AllowedMentions,
    id::{Id, marker::ChannelMarker},
};

/// Somewhere a handler can post plain-text replies.
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    async fn say(&self, content: &str) -> anyhow::Result<()>;
}

/// Replies posted as new messages in a Discord channel.
///
/// Replies echo user input, so they are sent with every mention disabled.
pub struct ChannelReply<'a> {
    http: &'a Client,
    channel_id: Id<ChannelMarker>,
}

impl<'a> ChannelReply<'a> {
    pub fn new(http: &'a Client, channel_id: Id<ChannelMarker>) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl ReplyChannel for ChannelReply<'_> {
    async fn say(&self, content: &str) -> anyhow::Result<()> {
        self.http
            .create_message(self.channel_id)
            .content(content)
            .allowed_mentions(Some(&AllowedMentions::default()))
            .await?;

        Ok(())
    }
}
