//! Moderation side effects and how their failures read to users.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use thiserror::Error;
use twilight_http::{Client, error::ErrorType, request::AuditLogReason as _};
use twilight_model::{
    id::{
        Id,
        marker::{GuildMarker, UserMarker},
    },
    util::Timestamp,
};

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("not permitted to act on this user")]
    Permission,
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModerationError {
    /// Classify a failed API call by its HTTP status.
    pub fn from_status(status: Option<u16>, source: anyhow::Error) -> Self {
        match status {
            Some(403) => Self::Permission,
            Some(404) => Self::NotFound,
            _ => Self::Other(source),
        }
    }
}

impl From<twilight_http::Error> for ModerationError {
    fn from(source: twilight_http::Error) -> Self {
        let status = match source.kind() {
            ErrorType::Response { status, .. } => Some(status.get()),
            _ => None,
        };

        Self::from_status(status, source.into())
    }
}

/// A moderation action against one guild member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModerationAction {
    Kick,
    Ban,
    Unban,
    Timeout { duration_secs: u64 },
}

impl ModerationAction {
    /// Verb used in "I cannot … this user."
    pub fn verb(self) -> &'static str {
        match self {
            Self::Kick => "kick",
            Self::Ban => "ban",
            Self::Unban => "unban",
            Self::Timeout { .. } => "timeout",
        }
    }

    /// User-facing reply for the result of applying this action to `target`.
    pub fn outcome_message(self, target: &str, result: &Result<(), ModerationError>) -> String {
        match result {
            Ok(()) => match self {
                Self::Kick => format!("✅ Kicked {target}."),
                Self::Ban => format!("✅ Banned {target}."),
                Self::Unban => format!("✅ Unbanned {target}."),
                Self::Timeout { duration_secs } => {
                    format!("✅ Timed out {target} for {duration_secs} seconds.")
                }
            },
            Err(ModerationError::Permission) => format!("❌ I cannot {} this user.", self.verb()),
            Err(ModerationError::NotFound) if self == Self::Unban => {
                "❌ User not found in banned list.".to_owned()
            }
            Err(ModerationError::NotFound) => "❌ User not found.".to_owned(),
            Err(ModerationError::Other(_)) => {
                format!("❌ I couldn't {} that user. Try again later.", self.verb())
            }
        }
    }
}

/// Platform operations the moderation commands rely on.
#[async_trait]
pub trait ModerationActions: Send + Sync {
    async fn kick(
        &self,
        user_id: Id<UserMarker>,
        reason: Option<&str>,
    ) -> Result<(), ModerationError>;

    async fn ban(
        &self,
        user_id: Id<UserMarker>,
        reason: Option<&str>,
    ) -> Result<(), ModerationError>;

    async fn unban(
        &self,
        user_id: Id<UserMarker>,
        reason: Option<&str>,
    ) -> Result<(), ModerationError>;

    async fn timeout(
        &self,
        user_id: Id<UserMarker>,
        duration_secs: u64,
        reason: Option<&str>,
    ) -> Result<(), ModerationError>;
}

/// Dispatch `action` to the matching operation.
pub async fn apply(
    actions: &dyn ModerationActions,
    action: ModerationAction,
    user_id: Id<UserMarker>,
    reason: Option<&str>,
) -> Result<(), ModerationError> {
    match action {
        ModerationAction::Kick => actions.kick(user_id, reason).await,
        ModerationAction::Ban => actions.ban(user_id, reason).await,
        ModerationAction::Unban => actions.unban(user_id, reason).await,
        ModerationAction::Timeout { duration_secs } => {
            actions.timeout(user_id, duration_secs, reason).await
        }
    }
}

/// Moderation through the Discord HTTP API for one guild.
pub struct GuildModerator<'a> {
    http: &'a Client,
    guild_id: Id<GuildMarker>,
}

impl<'a> GuildModerator<'a> {
    pub fn new(http: &'a Client, guild_id: Id<GuildMarker>) -> Self {
        Self { http, guild_id }
    }
}

#[async_trait]
impl ModerationActions for GuildModerator<'_> {
    async fn kick(
        &self,
        user_id: Id<UserMarker>,
        reason: Option<&str>,
    ) -> Result<(), ModerationError> {
        let mut request = self.http.remove_guild_member(self.guild_id, user_id);
        if let Some(reason) = reason {
            request = request.reason(reason);
        }

        request.await?;
        Ok(())
    }

    async fn ban(
        &self,
        user_id: Id<UserMarker>,
        reason: Option<&str>,
    ) -> Result<(), ModerationError> {
        let mut request = self.http.create_ban(self.guild_id, user_id);
        if let Some(reason) = reason {
            request = request.reason(reason);
        }

        request.await?;
        Ok(())
    }

    async fn unban(
        &self,
        user_id: Id<UserMarker>,
        reason: Option<&str>,
    ) -> Result<(), ModerationError> {
        let mut request = self.http.delete_ban(self.guild_id, user_id);
        if let Some(reason) = reason {
            request = request.reason(reason);
        }

        request.await?;
        Ok(())
    }

    async fn timeout(
        &self,
        user_id: Id<UserMarker>,
        duration_secs: u64,
        reason: Option<&str>,
    ) -> Result<(), ModerationError> {
        let expires_at_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_secs())
            .saturating_add(duration_secs);

        let expires_at = i64::try_from(expires_at_secs)
            .ok()
            .and_then(|secs| Timestamp::from_secs(secs).ok())
            .ok_or_else(|| anyhow::anyhow!("timeout expiry {expires_at_secs} is out of range"))?;

        let mut request = self
            .http
            .update_guild_member(self.guild_id, user_id)
            .communication_disabled_until(Some(expires_at));
        if let Some(reason) = reason {
            request = request.reason(reason);
        }

        request.await?;
        Ok(())
    }
}
