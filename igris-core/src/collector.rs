//! Routes incoming chat messages to handlers waiting for a follow-up reply.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use tokio::{sync::oneshot, time::Instant};
use tracing::debug;
use twilight_model::id::{
    Id,
    marker::{ChannelMarker, UserMarker},
};

/// A message handed to a waiting handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectedMessage {
    pub channel_id: Id<ChannelMarker>,
    pub author_id: Id<UserMarker>,
    pub content: String,
}

struct Waiter {
    id: u64,
    channel_id: Id<ChannelMarker>,
    author_id: Id<UserMarker>,
    sender: oneshot::Sender<CollectedMessage>,
}

#[derive(Default)]
struct Waiters {
    next_id: AtomicU64,
    entries: Mutex<Vec<Waiter>>,
}

/// Registry of pending "next message from this user in this channel" waits.
///
/// Cheap to clone; all clones share the same waiters.
#[derive(Clone, Default)]
pub struct MessageCollector {
    waiters: Arc<Waiters>,
}

impl MessageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start waiting for the next message by `author_id` in `channel_id`.
    ///
    /// Registration happens immediately, so a reply sent right after a prompt
    /// cannot be missed. The registration is dropped together with the
    /// returned handle.
    pub fn register(
        &self,
        channel_id: Id<ChannelMarker>,
        author_id: Id<UserMarker>,
    ) -> PendingMessage {
        let id = self.waiters.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();

        self.lock().push(Waiter {
            id,
            channel_id,
            author_id,
            sender,
        });

        PendingMessage {
            id,
            receiver,
            waiters: Arc::clone(&self.waiters),
        }
    }

    /// Offer a message to every matching waiter.
    ///
    /// Returns `true` when at least one waiter received it; the caller should
    /// then treat the message as consumed.
    pub fn offer(&self, message: &CollectedMessage) -> bool {
        let mut entries = self.lock();
        let mut delivered = false;
        let mut remaining = Vec::with_capacity(entries.len());

        for waiter in entries.drain(..) {
            if waiter.channel_id != message.channel_id || waiter.author_id != message.author_id {
                remaining.push(waiter);
                continue;
            }

            if waiter.sender.send(message.clone()).is_ok() {
                debug!(waiter = waiter.id, "follow-up message delivered");
                delivered = true;
            }
        }

        *entries = remaining;
        delivered
    }

    /// Number of registrations still waiting.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Waiter>> {
        self.waiters
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle for one registered wait.
pub struct PendingMessage {
    id: u64,
    receiver: oneshot::Receiver<CollectedMessage>,
    waiters: Arc<Waiters>,
}

impl PendingMessage {
    /// Wait for the message until `deadline`; `None` when the deadline passes first.
    pub async fn recv_until(mut self, deadline: Instant) -> Option<CollectedMessage> {
        tokio::time::timeout_at(deadline, &mut self.receiver)
            .await
            .ok()
            .and_then(Result::ok)
    }
}

impl Drop for PendingMessage {
    fn drop(&mut self) {
        self.waiters
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|waiter| waiter.id != self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn message(channel: u64, author: u64, content: &str) -> CollectedMessage {
        CollectedMessage {
            channel_id: Id::new(channel),
            author_id: Id::new(author),
            content: content.to_owned(),
        }
    }

    #[tokio::test]
    async fn delivers_to_matching_waiter() {
        let collector = MessageCollector::new();
        let pending = collector.register(Id::new(1), Id::new(7));

        assert!(collector.offer(&message(1, 7, "hello")));

        let received = pending
            .recv_until(Instant::now() + Duration::from_secs(1))
            .await;
        assert_eq!(received, Some(message(1, 7, "hello")));
        assert_eq!(collector.pending(), 0);
    }

    #[tokio::test]
    async fn ignores_other_users_and_channels() {
        let collector = MessageCollector::new();
        let _pending = collector.register(Id::new(1), Id::new(7));

        assert!(!collector.offer(&message(1, 8, "not you")));
        assert!(!collector.offer(&message(2, 7, "wrong place")));
        assert_eq!(collector.pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_and_unregisters() {
        let collector = MessageCollector::new();
        let pending = collector.register(Id::new(1), Id::new(7));

        let received = pending
            .recv_until(Instant::now() + Duration::from_secs(60))
            .await;

        assert!(received.is_none());
        assert_eq!(collector.pending(), 0);
        assert!(!collector.offer(&message(1, 7, "too late")));
    }

    #[tokio::test]
    async fn same_message_reaches_every_matching_waiter() {
        let collector = MessageCollector::new();
        let first = collector.register(Id::new(1), Id::new(7));
        let second = collector.register(Id::new(1), Id::new(7));

        assert!(collector.offer(&message(1, 7, "both")));

        let deadline = Instant::now() + Duration::from_secs(1);
        assert!(first.recv_until(deadline).await.is_some());
        assert!(second.recv_until(deadline).await.is_some());
    }

    #[test]
    fn dropping_handle_unregisters() {
        let collector = MessageCollector::new();
        let pending = collector.register(Id::new(1), Id::new(7));
        assert_eq!(collector.pending(), 1);

        drop(pending);
        assert_eq!(collector.pending(), 0);
    }
}
